//! Loaded modules.
//!
//! A [`Module`] is a projected, grammar-checked statement tree whose root is `module` or
//! `submodule`. Header fields are read from the root's projected attributes.

use crate::ast::{Position, Statement, StatementTree, StmtId};
use crate::repository::Format;
use crate::validation::Linkage;

#[derive(Debug)]
pub struct Module {
    tree: StatementTree,
    linkage: Linkage,
    reference: String,
    format: Format,
}

impl Module {
    pub(crate) fn new(tree: StatementTree, linkage: Linkage, reference: String, format: Format) -> Self {
        Self {
            tree,
            linkage,
            reference,
            format,
        }
    }

    /// The declared module name.
    pub fn name(&self) -> &str {
        self.root().arg()
    }

    /// `module` or `submodule`.
    pub fn keyword(&self) -> &str {
        &self.root().keyword
    }

    pub fn is_submodule(&self) -> bool {
        self.keyword() == "submodule"
    }

    pub fn reference(&self) -> &str {
        &self.reference
    }

    pub fn format(&self) -> Format {
        self.format
    }

    pub fn tree(&self) -> &StatementTree {
        &self.tree
    }

    pub fn root(&self) -> &Statement {
        &self.tree[self.tree.root()]
    }

    pub fn position(&self) -> &Position {
        &self.root().position
    }

    pub fn statement(&self, id: StmtId) -> &Statement {
        &self.tree[id]
    }

    /// Single-valued projected attribute of the root.
    pub fn single(&self, attr: &str) -> Option<&Statement> {
        self.root().single(attr).map(|id| &self.tree[id])
    }

    /// Collection attribute of the root, in document order.
    pub fn many(&self, attr: &str) -> impl Iterator<Item = &Statement> + '_ {
        self.root().many(attr).iter().map(move |id| &self.tree[*id])
    }

    pub fn namespace(&self) -> Option<&Statement> {
        self.single("namespace")
    }

    pub fn prefix(&self) -> Option<&Statement> {
        self.single("prefix")
    }

    pub fn belongs_to(&self) -> Option<&Statement> {
        self.single("belongs_to")
    }

    /// The prefix the module uses for itself; submodules take it from `belongs-to`.
    pub fn own_prefix(&self) -> Option<&str> {
        if self.is_submodule() {
            let belongs_to = self.root().single("belongs_to")?;
            let prefix = self.tree[belongs_to].single("prefix")?;
            Some(self.tree[prefix].arg())
        } else {
            self.prefix().map(Statement::arg)
        }
    }

    pub fn revisions(&self) -> impl Iterator<Item = &Statement> + '_ {
        self.many("revision")
    }

    pub fn children(&self) -> impl Iterator<Item = &Statement> + '_ {
        self.many("children")
    }

    /// Top-level `import` statements in document order.
    pub fn imports(&self) -> impl Iterator<Item = &Statement> + '_ {
        self.linkage.imports.iter().map(move |id| &self.tree[*id])
    }

    pub fn includes(&self) -> impl Iterator<Item = &Statement> + '_ {
        self.linkage.includes.iter().map(move |id| &self.tree[*id])
    }
}
