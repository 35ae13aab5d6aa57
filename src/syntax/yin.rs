//! YIN (XML) parser.
//!
//! Each element in the YIN namespace is a statement whose keyword is the element's local
//! name. The argument comes from the attribute named after the keyword's argument, or from a
//! child element of that name for yin-element keywords such as `description`. Elements in any
//! other namespace become `prefix:name` extension statements.

use std::collections::HashMap;
use std::sync::Arc;

use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

use crate::ast::{Position, StatementTree, StmtId};
use crate::errors::DiagnosticSink;
use crate::grammar::{keyword_info, YIN_NAMESPACE};
use crate::syntax::{syntax_error, StatementParser, MAX_DEPTH};

#[derive(Debug, Clone, Copy, Default)]
pub struct YinParser;

impl StatementParser for YinParser {
    fn parse(
        &self,
        sink: &mut dyn DiagnosticSink,
        reference: &str,
        text: &str,
    ) -> Option<StatementTree> {
        let mut builder = Builder::new(reference, text);
        match builder.run() {
            Ok(tree) => Some(tree),
            Err(failure) => {
                syntax_error(sink, reference, failure.line, failure.message);
                None
            }
        }
    }
}

/// Parses YIN text, collecting diagnostics into `sink`.
pub fn parse_str(sink: &mut dyn DiagnosticSink, reference: &str, text: &str) -> Option<StatementTree> {
    YinParser.parse(sink, reference, text)
}

// ============================================================================
// BUILDER
// ============================================================================

struct Failure {
    line: usize,
    message: String,
}

/// What an open element stands for.
#[derive(Debug, Clone, Copy)]
enum Open {
    Statement(StmtId),
    /// The argument element of a yin-element keyword; its text is the argument.
    ArgumentOf(StmtId),
    /// Markup nested inside an argument element.
    Ignored,
}

struct Builder<'a> {
    reference: Arc<str>,
    text: &'a str,
    tree: Option<StatementTree>,
    stack: Vec<Open>,
    namespaces: HashMap<String, String>,
}

impl<'a> Builder<'a> {
    fn new(reference: &str, text: &'a str) -> Self {
        Self {
            reference: reference.into(),
            text,
            tree: None,
            stack: Vec::new(),
            namespaces: HashMap::new(),
        }
    }

    fn run(&mut self) -> Result<StatementTree, Failure> {
        let mut reader = Reader::from_str(self.text);
        reader.config_mut().trim_text(true);

        loop {
            let offset = reader.buffer_position() as usize;
            let event = reader.read_event().map_err(|e| Failure {
                line: self.line_at(reader.buffer_position() as usize),
                message: e.to_string(),
            })?;
            match event {
                Event::Start(element) => self.open(&element, offset, false)?,
                Event::Empty(element) => self.open(&element, offset, true)?,
                Event::End(_) => {
                    self.stack.pop();
                }
                Event::Text(text) => {
                    let value = text.unescape().map_err(|e| Failure {
                        line: self.line_at(offset),
                        message: e.to_string(),
                    })?;
                    self.append_text(&value);
                }
                Event::CData(data) => {
                    let value = String::from_utf8_lossy(&data.into_inner()).into_owned();
                    self.append_text(&value);
                }
                Event::Eof => break,
                _ => {}
            }
        }

        if !self.stack.is_empty() {
            return Err(self.fail(self.text.len(), "unexpected end of document"));
        }
        self.tree
            .take()
            .ok_or_else(|| self.fail(0, "document contains no statements"))
    }

    fn open(&mut self, element: &BytesStart<'_>, offset: usize, empty: bool) -> Result<(), Failure> {
        if self.stack.len() >= MAX_DEPTH {
            return Err(self.fail(offset, format!("statements nested deeper than {MAX_DEPTH}")));
        }

        let qname = String::from_utf8_lossy(element.name().as_ref()).into_owned();
        let attributes = self.attributes(element, offset)?;
        let (prefix, local) = match qname.split_once(':') {
            Some((prefix, local)) => (Some(prefix), local),
            None => (None, qname.as_str()),
        };
        let native = prefix.map_or(true, |p| {
            self.namespaces.get(p).map(String::as_str) == Some(YIN_NAMESPACE)
        });

        let opened = match self.stack.last().copied() {
            Some(Open::ArgumentOf(_)) | Some(Open::Ignored) => Open::Ignored,
            Some(Open::Statement(parent)) if native && self.is_argument_element(parent, local) => {
                Open::ArgumentOf(parent)
            }
            parent => {
                let keyword = if native { local.to_string() } else { qname.clone() };
                let argument = if native {
                    keyword_info(local)
                        .filter(|info| !info.yin_element)
                        .and_then(|info| info.argument)
                        .and_then(|name| lookup(&attributes, name))
                } else {
                    attributes
                        .iter()
                        .find(|(key, _)| !is_namespace_declaration(key))
                        .map(|(_, value)| value.clone())
                };
                let position = Position::new(self.reference.clone(), self.line_at(offset));
                Open::Statement(self.add_statement(parent, keyword, argument, position, offset)?)
            }
        };

        if !empty {
            self.stack.push(opened);
        }
        Ok(())
    }

    fn add_statement(
        &mut self,
        parent: Option<Open>,
        keyword: String,
        argument: Option<String>,
        position: Position,
        offset: usize,
    ) -> Result<StmtId, Failure> {
        if let Some(Open::Statement(parent)) = parent {
            if let Some(tree) = self.tree.as_mut() {
                return Ok(tree.push(parent, keyword, argument, position));
            }
        }
        if parent.is_none() && self.tree.is_none() {
            let tree = StatementTree::new(keyword, argument, position);
            let root = tree.root();
            self.tree = Some(tree);
            return Ok(root);
        }
        Err(self.fail(offset, "more than one top-level statement"))
    }

    fn is_argument_element(&self, parent: StmtId, local: &str) -> bool {
        let Some(tree) = self.tree.as_ref() else {
            return false;
        };
        keyword_info(&tree[parent].keyword)
            .filter(|info| info.yin_element)
            .and_then(|info| info.argument)
            == Some(local)
    }

    fn append_text(&mut self, value: &str) {
        if let (Some(Open::ArgumentOf(id)), Some(tree)) = (self.stack.last(), self.tree.as_mut()) {
            tree.append_argument(*id, value);
        }
    }

    /// Collects attributes and records namespace declarations.
    fn attributes(
        &mut self,
        element: &BytesStart<'_>,
        offset: usize,
    ) -> Result<Vec<(String, String)>, Failure> {
        let mut collected = Vec::new();
        for attribute in element.attributes() {
            let attribute = attribute.map_err(|e| self.fail(offset, e.to_string()))?;
            let key = String::from_utf8_lossy(attribute.key.as_ref()).into_owned();
            let value = attribute
                .unescape_value()
                .map_err(|e| self.fail(offset, e.to_string()))?
                .into_owned();
            if let Some(prefix) = key.strip_prefix("xmlns:") {
                self.namespaces.insert(prefix.to_string(), value.clone());
            } else if key == "xmlns" {
                self.namespaces.insert(String::new(), value.clone());
            }
            collected.push((key, value));
        }
        Ok(collected)
    }

    fn line_at(&self, offset: usize) -> usize {
        let offset = offset.min(self.text.len());
        let rest = &self.text[offset..];
        // the reader reports the offset before any skipped whitespace
        let start = offset + (rest.len() - rest.trim_start().len());
        self.text.as_bytes()[..start]
            .iter()
            .filter(|b| **b == b'\n')
            .count()
            + 1
    }

    fn fail(&self, offset: usize, message: impl Into<String>) -> Failure {
        Failure {
            line: self.line_at(offset),
            message: message.into(),
        }
    }
}

fn lookup(attributes: &[(String, String)], name: &str) -> Option<String> {
    attributes
        .iter()
        .find(|(key, _)| key == name)
        .map(|(_, value)| value.clone())
}

fn is_namespace_declaration(key: &str) -> bool {
    key == "xmlns" || key.starts_with("xmlns:")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::{ErrorRecord, ErrorTag};

    const MODULE: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<module name="m"
        xmlns="urn:ietf:params:xml:ns:yang:yin:1"
        xmlns:ex="urn:example:ext">
  <namespace uri="urn:m"/>
  <prefix value="m"/>
  <description>
    <text>A &lt;small&gt; module</text>
  </description>
  <leaf name="x">
    <type name="string"/>
    <ex:note>kept</ex:note>
  </leaf>
</module>
"#;

    fn parse(text: &str) -> (Option<StatementTree>, Vec<ErrorRecord>) {
        let mut errors = Vec::new();
        let tree = parse_str(&mut errors, "test.yin", text);
        (tree, errors)
    }

    #[test]
    fn test_attribute_arguments() {
        let (tree, errors) = parse(MODULE);
        assert!(errors.is_empty(), "{errors:?}");
        let tree = tree.unwrap();
        assert_eq!(tree[tree.root()].arg(), "m");
        let namespace = tree.find_child(tree.root(), "namespace").unwrap();
        assert_eq!(tree[namespace].arg(), "urn:m");
        assert_eq!(tree[namespace].position.line, 5);
    }

    #[test]
    fn test_element_argument() {
        let (tree, _) = parse(MODULE);
        let tree = tree.unwrap();
        let description = tree.find_child(tree.root(), "description").unwrap();
        assert_eq!(tree[description].arg(), "A <small> module");
        assert!(tree[description].substatements().is_empty());
    }

    #[test]
    fn test_foreign_namespace_is_extension() {
        let (tree, _) = parse(MODULE);
        let tree = tree.unwrap();
        let leaf = tree.find_child(tree.root(), "leaf").unwrap();
        let note = tree.find_child(leaf, "ex:note").unwrap();
        assert!(tree[note].is_extension());
    }

    #[test]
    fn test_unclosed_element_fails() {
        let (tree, errors) = parse("<module name=\"m\">\n  <prefix value=\"m\"/>\n");
        assert!(tree.is_none());
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].tag, ErrorTag::SyntaxError);
    }

    #[test]
    fn test_empty_document_fails() {
        let (tree, errors) = parse("<?xml version=\"1.0\"?>");
        assert!(tree.is_none());
        assert_eq!(errors[0].tag, ErrorTag::SyntaxError);
    }
}
