//! Statement tree for parsed YANG and YIN documents.
//!
//! Both surface syntaxes produce the same shape: a tree of statements, each with a keyword,
//! an optional argument, a source position and an ordered list of substatements. The tree is
//! stored as an arena addressed by [`StmtId`]; parent links and children are indices, so
//! upward navigation is O(1) and there are no ownership cycles.
//!
//! Statements also carry *projected attributes*: typed slots filled by the attribute
//! projector (see [`crate::validation::projection`]). The set of slots a statement can hold is
//! fixed by its keyword's [`SlotLayout`], computed once when the grammar table is built.

use std::fmt;
use std::ops::Index;
use std::sync::Arc;

use serde::Serialize;

use crate::grammar::SlotLayout;

// ============================================================================
// CORE DATA STRUCTURES
// ============================================================================

/// Source reference of a statement, used only for diagnostics.
///
/// A line of `0` means the position refers to a whole file rather than a line in it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct Position {
    pub reference: Arc<str>,
    pub line: usize,
}

impl Position {
    pub fn new(reference: impl Into<Arc<str>>, line: usize) -> Self {
        Self {
            reference: reference.into(),
            line,
        }
    }

    /// A position naming a whole file.
    pub fn file(reference: impl Into<Arc<str>>) -> Self {
        Self::new(reference, 0)
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.line == 0 {
            write!(f, "{}", self.reference)
        } else {
            write!(f, "{}:{}", self.reference, self.line)
        }
    }
}

/// Index of a statement inside its [`StatementTree`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct StmtId(usize);

impl StmtId {
    pub fn index(self) -> usize {
        self.0
    }
}

/// One projected attribute on a statement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Slot {
    /// Attribute fed by a `?` or `1` substatement.
    Single(Option<StmtId>),
    /// Attribute fed by `*` or `+` substatements, in document order.
    Many(Vec<StmtId>),
}

/// A single statement node.
///
/// Identity is positional: two statements with the same keyword and argument are still
/// distinct nodes. `Statement` has no `PartialEq`.
#[derive(Debug, Clone)]
pub struct Statement {
    pub keyword: String,
    pub argument: Option<String>,
    pub position: Position,
    parent: Option<StmtId>,
    substatements: Vec<StmtId>,
    layout: Option<Arc<SlotLayout>>,
    slots: Vec<Slot>,
}

impl Statement {
    fn new(keyword: String, argument: Option<String>, position: Position, parent: Option<StmtId>) -> Self {
        Self {
            keyword,
            argument,
            position,
            parent,
            substatements: Vec::new(),
            layout: None,
            slots: Vec::new(),
        }
    }

    pub fn parent(&self) -> Option<StmtId> {
        self.parent
    }

    pub fn substatements(&self) -> &[StmtId] {
        &self.substatements
    }

    /// The argument, or the empty string when the statement has none.
    pub fn arg(&self) -> &str {
        self.argument.as_deref().unwrap_or("")
    }

    /// True for `prefix:name` extension statements.
    pub fn is_extension(&self) -> bool {
        is_prefixed(&self.keyword)
    }

    /// The slot layout installed by projection, if the keyword has a grammar entry.
    pub fn layout(&self) -> Option<&SlotLayout> {
        self.layout.as_deref()
    }

    /// Projected single-valued attribute, e.g. `namespace` on a module.
    pub fn single(&self, attr: &str) -> Option<StmtId> {
        match self.slot(attr)? {
            Slot::Single(id) => *id,
            Slot::Many(_) => None,
        }
    }

    /// Projected collection attribute, e.g. `children` or `import_`.
    pub fn many(&self, attr: &str) -> &[StmtId] {
        match self.slot(attr) {
            Some(Slot::Many(ids)) => ids,
            _ => &[],
        }
    }

    fn slot(&self, attr: &str) -> Option<&Slot> {
        let index = self.layout.as_ref()?.slot_index(attr)?;
        self.slots.get(index)
    }

    pub(crate) fn install_layout(&mut self, layout: Arc<SlotLayout>) {
        self.slots = layout.empty_slots();
        self.layout = Some(layout);
    }

    pub(crate) fn slot_at(&self, index: usize) -> Option<&Slot> {
        self.slots.get(index)
    }

    pub(crate) fn slot_mut(&mut self, index: usize) -> Option<&mut Slot> {
        self.slots.get_mut(index)
    }
}

/// True when `keyword` is module-qualified (`prefix:name`), i.e. an extension statement.
pub fn is_prefixed(keyword: &str) -> bool {
    keyword.contains(':')
}

// ============================================================================
// STATEMENT TREE
// ============================================================================

/// Arena of statements rooted at the first node.
#[derive(Debug, Clone)]
pub struct StatementTree {
    nodes: Vec<Statement>,
}

impl StatementTree {
    /// Creates a tree holding only a root statement.
    pub fn new(keyword: impl Into<String>, argument: Option<String>, position: Position) -> Self {
        Self {
            nodes: vec![Statement::new(keyword.into(), argument, position, None)],
        }
    }

    pub fn root(&self) -> StmtId {
        StmtId(0)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Appends a new statement as the last substatement of `parent`.
    pub fn push(
        &mut self,
        parent: StmtId,
        keyword: impl Into<String>,
        argument: Option<String>,
        position: Position,
    ) -> StmtId {
        let id = StmtId(self.nodes.len());
        self.nodes
            .push(Statement::new(keyword.into(), argument, position, Some(parent)));
        self.nodes[parent.0].substatements.push(id);
        id
    }

    pub fn get(&self, id: StmtId) -> Option<&Statement> {
        self.nodes.get(id.0)
    }

    pub(crate) fn get_mut(&mut self, id: StmtId) -> Option<&mut Statement> {
        self.nodes.get_mut(id.0)
    }

    /// Appends text to a statement's argument, creating it if absent.
    pub fn append_argument(&mut self, id: StmtId, text: &str) {
        if let Some(stmt) = self.nodes.get_mut(id.0) {
            stmt.argument.get_or_insert_with(String::new).push_str(text);
        }
    }

    /// Substatements of `id` in document order.
    pub fn children(&self, id: StmtId) -> impl Iterator<Item = &Statement> + '_ {
        self[id].substatements.iter().map(move |child| &self[*child])
    }

    /// First substatement of `id` with the given keyword.
    pub fn find_child(&self, id: StmtId, keyword: &str) -> Option<StmtId> {
        self[id]
            .substatements
            .iter()
            .copied()
            .find(|child| self[*child].keyword == keyword)
    }

    /// Pre-order walk starting at `start`, driven by an explicit stack.
    pub fn preorder(&self, start: StmtId) -> Preorder<'_> {
        Preorder {
            tree: self,
            stack: vec![start],
        }
    }
}

impl Index<StmtId> for StatementTree {
    type Output = Statement;

    fn index(&self, id: StmtId) -> &Statement {
        &self.nodes[id.0]
    }
}

/// Iterator returned by [`StatementTree::preorder`].
pub struct Preorder<'a> {
    tree: &'a StatementTree,
    stack: Vec<StmtId>,
}

impl Iterator for Preorder<'_> {
    type Item = StmtId;

    fn next(&mut self) -> Option<StmtId> {
        let id = self.stack.pop()?;
        self.stack
            .extend(self.tree[id].substatements.iter().rev().copied());
        Some(id)
    }
}
