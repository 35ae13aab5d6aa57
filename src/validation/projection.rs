//! Attribute projection.
//!
//! Walks a tree in pre-order and files every substatement into a slot on its parent:
//! single-valued slots take the statement directly (a later one overwrites an earlier one,
//! cardinality is the grammar validator's concern), collection slots append in document
//! order. Before appending, an existing element with the same argument is reported as
//! `DUPLICATE_STATEMENT` unless the keyword is exempt in the grammar table.

use crate::ast::{Slot, StatementTree, StmtId};
use crate::errors::{DiagnosticSink, ErrorRecord, ErrorTag};
use crate::grammar::GrammarTable;

/// `import` and `include` statements of a module, in document order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Linkage {
    pub imports: Vec<StmtId>,
    pub includes: Vec<StmtId>,
}

pub struct AttributeProjector<'g> {
    grammar: &'g GrammarTable,
}

impl<'g> AttributeProjector<'g> {
    pub fn new(grammar: &'g GrammarTable) -> Self {
        Self { grammar }
    }

    /// Projects every statement of `tree` and returns the root's linkage statements.
    pub fn project(&self, tree: &mut StatementTree, sink: &mut dyn DiagnosticSink) -> Linkage {
        let mut linkage = Linkage::default();
        let root = tree.root();
        let order: Vec<StmtId> = tree.preorder(root).collect();

        // Each statement is filed into its parent before its own children are visited, so
        // the parent's layout is always installed by the time it is needed.
        for id in order {
            if let Some(entry) = self.grammar.entry(&tree[id].keyword) {
                let layout = entry.layout().clone();
                if let Some(stmt) = tree.get_mut(id) {
                    stmt.install_layout(layout);
                }
            }

            let Some(parent) = tree[id].parent() else {
                continue;
            };
            self.file_into_parent(tree, parent, id, sink);

            if parent == root {
                match tree[id].keyword.as_str() {
                    "import" => linkage.imports.push(id),
                    "include" => linkage.includes.push(id),
                    _ => {}
                }
            }
        }
        linkage
    }

    fn file_into_parent(
        &self,
        tree: &mut StatementTree,
        parent: StmtId,
        id: StmtId,
        sink: &mut dyn DiagnosticSink,
    ) {
        let Some(index) = tree[parent]
            .layout()
            .and_then(|layout| layout.slot_for_keyword(&tree[id].keyword))
        else {
            return;
        };

        let duplicate = match tree[parent].slot_at(index) {
            Some(Slot::Many(existing)) if !self.grammar.is_duplicate_exempt(&tree[id].keyword) => {
                existing
                    .iter()
                    .any(|other| tree[*other].argument == tree[id].argument)
            }
            _ => false,
        };
        if duplicate {
            let stmt = &tree[id];
            sink.report(ErrorRecord::new(
                stmt.position.clone(),
                ErrorTag::DuplicateStatement,
                [stmt.arg().to_string()],
            ));
        }

        match tree.get_mut(parent).and_then(|p| p.slot_mut(index)) {
            Some(Slot::Single(slot)) => *slot = Some(id),
            Some(Slot::Many(slot)) => slot.push(id),
            None => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::syntax::yang::parse_str;

    fn project(text: &str) -> (StatementTree, Linkage, Vec<ErrorRecord>) {
        let grammar = GrammarTable::yang();
        let mut errors = Vec::new();
        let mut tree = parse_str(&mut errors, "test.yang", text).unwrap();
        let linkage = AttributeProjector::new(&grammar).project(&mut tree, &mut errors);
        (tree, linkage, errors)
    }

    #[test]
    fn test_single_and_many_slots() {
        let (tree, _, errors) = project(
            "module m { namespace urn:m; prefix m; leaf a { type string; } container b; }",
        );
        assert!(errors.is_empty());
        let root = &tree[tree.root()];
        let namespace = root.single("namespace").unwrap();
        assert_eq!(tree[namespace].arg(), "urn:m");
        let children: Vec<_> = root.many("children").iter().map(|id| tree[*id].arg()).collect();
        assert_eq!(children, vec!["a", "b"]);
        assert_eq!(root.single("children"), None);
    }

    #[test]
    fn test_linkage_is_collected() {
        let (tree, linkage, _) = project(
            "module m { namespace urn:m; prefix m; import a { prefix a; } include s; import b { prefix b; } }",
        );
        let imports: Vec<_> = linkage.imports.iter().map(|id| tree[*id].arg()).collect();
        assert_eq!(imports, vec!["a", "b"]);
        assert_eq!(linkage.includes.len(), 1);
        assert_eq!(tree[tree.root()].many("import_").len(), 2);
    }

    #[test]
    fn test_nested_statements_are_projected() {
        let (tree, _, _) = project("module m { namespace urn:m; prefix m; leaf a { type string; } }");
        let leaf = tree[tree.root()].many("children")[0];
        let ty = tree[leaf].single("type").unwrap();
        assert_eq!(tree[ty].arg(), "string");
    }

    #[test]
    fn test_single_slot_keeps_last_statement() {
        let (tree, _, errors) = project("module m { namespace urn:a; namespace urn:b; prefix m; }");
        assert!(errors.is_empty());
        let namespace = tree[tree.root()].single("namespace").unwrap();
        assert_eq!(tree[namespace].arg(), "urn:b");
    }
}
