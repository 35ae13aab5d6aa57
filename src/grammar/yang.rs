//! Built-in YANG grammar.
//!
//! [`KEYWORDS`] lists every keyword of the language with its argument name and whether the
//! YIN form carries the argument as a child element. [`GrammarTable::yang`] builds the
//! substatement rules on top of it.

use std::collections::HashMap;

use once_cell::sync::Lazy;

use crate::grammar::{GrammarTable, Rule};

/// XML namespace of YIN documents.
pub const YIN_NAMESPACE: &str = "urn:ietf:params:xml:ns:yang:yin:1";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeywordInfo {
    pub argument: Option<&'static str>,
    /// The YIN argument is a child element rather than an attribute.
    pub yin_element: bool,
}

// keyword, argument name, yin-element
pub const KEYWORDS: &[(&str, Option<&str>, bool)] = &[
    ("anyxml", Some("name"), false),
    ("argument", Some("name"), false),
    ("augment", Some("target-node"), false),
    ("belongs-to", Some("module"), false),
    ("bit", Some("name"), false),
    ("case", Some("name"), false),
    ("choice", Some("name"), false),
    ("config", Some("value"), false),
    ("contact", Some("info"), true),
    ("container", Some("name"), false),
    ("default", Some("value"), false),
    ("description", Some("text"), true),
    ("enum", Some("name"), false),
    ("error-app-tag", Some("value"), false),
    ("error-message", Some("value"), true),
    ("extension", Some("name"), false),
    ("grouping", Some("name"), false),
    ("import", Some("module"), false),
    ("include", Some("module"), false),
    ("input", None, false),
    ("key", Some("value"), false),
    ("leaf", Some("name"), false),
    ("leaf-list", Some("name"), false),
    ("length", Some("value"), false),
    ("list", Some("name"), false),
    ("mandatory", Some("value"), false),
    ("max-elements", Some("value"), false),
    ("min-elements", Some("value"), false),
    ("module", Some("name"), false),
    ("must", Some("condition"), false),
    ("namespace", Some("uri"), false),
    ("notification", Some("name"), false),
    ("ordered-by", Some("value"), false),
    ("organization", Some("info"), true),
    ("output", None, false),
    ("path", Some("value"), false),
    ("pattern", Some("value"), false),
    ("position", Some("value"), false),
    ("presence", Some("value"), false),
    ("prefix", Some("value"), false),
    ("range", Some("value"), false),
    ("reference", Some("info"), false),
    ("revision", Some("date"), false),
    ("rpc", Some("name"), false),
    ("status", Some("value"), false),
    ("submodule", Some("name"), false),
    ("type", Some("name"), false),
    ("typedef", Some("name"), false),
    ("unique", Some("tag"), false),
    ("units", Some("name"), false),
    ("uses", Some("name"), false),
    ("value", Some("value"), false),
    ("when", Some("condition"), false),
    ("yang-version", Some("value"), false),
    ("yin-element", Some("value"), false),
];

static KEYWORD_INFO: Lazy<HashMap<&'static str, KeywordInfo>> = Lazy::new(|| {
    KEYWORDS
        .iter()
        .map(|&(keyword, argument, yin_element)| {
            (
                keyword,
                KeywordInfo {
                    argument,
                    yin_element,
                },
            )
        })
        .collect()
});

pub fn keyword_info(keyword: &str) -> Option<KeywordInfo> {
    KEYWORD_INFO.get(keyword).copied()
}

// ============================================================================
// RULE GROUPS
// ============================================================================

fn optional(keywords: &[&str]) -> Vec<Rule> {
    keywords.iter().map(|kw| Rule::optional(*kw)).collect()
}

fn zero_or_more(keywords: &[&str]) -> Vec<Rule> {
    keywords.iter().map(|kw| Rule::zero_or_more(*kw)).collect()
}

fn data_def() -> Vec<Rule> {
    zero_or_more(&[
        "container",
        "leaf",
        "leaf-list",
        "list",
        "choice",
        "anyxml",
        "uses",
    ])
}

fn meta() -> Rule {
    Rule::interleave(optional(&["organization", "contact", "description", "reference"]))
}

fn linkage() -> Rule {
    Rule::interleave(zero_or_more(&["import", "include"]))
}

fn body() -> Rule {
    let mut rules = zero_or_more(&["extension", "typedef", "grouping"]);
    rules.extend(data_def());
    rules.extend(zero_or_more(&["augment", "rpc", "notification"]));
    Rule::interleave(rules)
}

/// `status`, `description`, `reference`, preceded by `extra`.
fn documented(extra: Vec<Rule>) -> Rule {
    let mut rules = extra;
    rules.extend(optional(&["status", "description", "reference"]));
    Rule::interleave(rules)
}

fn restriction() -> Vec<Rule> {
    vec![Rule::interleave(optional(&[
        "error-message",
        "error-app-tag",
        "description",
        "reference",
    ]))]
}

fn definitions() -> Vec<Rule> {
    zero_or_more(&["typedef", "grouping"])
}

impl GrammarTable {
    /// The grammar of the YANG language.
    pub fn yang() -> Self {
        let mut table = GrammarTable::new();
        let arg = |keyword: &str| keyword_info(keyword).and_then(|info| info.argument);

        table.define(
            "module",
            arg("module"),
            vec![
                Rule::interleave(vec![
                    Rule::optional("yang-version"),
                    Rule::one("namespace"),
                    Rule::one("prefix"),
                ]),
                linkage(),
                meta(),
                Rule::zero_or_more("revision"),
                body(),
            ],
        );
        table.define(
            "submodule",
            arg("submodule"),
            vec![
                Rule::interleave(vec![Rule::optional("yang-version"), Rule::one("belongs-to")]),
                linkage(),
                meta(),
                Rule::zero_or_more("revision"),
                body(),
            ],
        );

        table.define("import", arg("import"), vec![Rule::one("prefix")]);
        table.define("belongs-to", arg("belongs-to"), vec![Rule::one("prefix")]);
        table.define("revision", arg("revision"), optional(&["description"]));
        table.define(
            "extension",
            arg("extension"),
            vec![documented(optional(&["argument"]))],
        );
        table.define("argument", arg("argument"), optional(&["yin-element"]));

        let mut typedef = vec![Rule::one("type")];
        typedef.extend(optional(&["units", "default"]));
        table.define("typedef", arg("typedef"), vec![documented(typedef)]);

        table.define(
            "type",
            arg("type"),
            vec![Rule::choice(vec![
                optional(&["range"]),
                vec![Rule::interleave(vec![
                    Rule::optional("length"),
                    Rule::zero_or_more("pattern"),
                ])],
                vec![Rule::one_or_more("enum")],
                vec![Rule::one_or_more("bit")],
                vec![Rule::one("path")],
                vec![Rule::one_or_more("type")],
            ])],
        );
        for keyword in ["range", "length", "pattern", "must"] {
            table.define(keyword, arg(keyword), restriction());
        }
        table.define("enum", arg("enum"), vec![documented(optional(&["value"]))]);
        table.define("bit", arg("bit"), vec![documented(optional(&["position"]))]);
        table.define(
            "when",
            arg("when"),
            vec![Rule::interleave(optional(&["description", "reference"]))],
        );

        let mut grouping = definitions();
        grouping.extend(data_def());
        table.define("grouping", arg("grouping"), vec![documented(grouping)]);

        let mut container = vec![Rule::optional("when"), Rule::zero_or_more("must")];
        container.extend(optional(&["presence", "config"]));
        container.extend(definitions());
        container.extend(data_def());
        table.define("container", arg("container"), vec![documented(container)]);

        let mut leaf = vec![Rule::optional("when"), Rule::one("type")];
        leaf.extend(optional(&["units"]));
        leaf.push(Rule::zero_or_more("must"));
        leaf.extend(optional(&["default", "config", "mandatory"]));
        table.define("leaf", arg("leaf"), vec![documented(leaf)]);

        let mut leaf_list = vec![Rule::optional("when"), Rule::one("type")];
        leaf_list.extend(optional(&["units"]));
        leaf_list.push(Rule::zero_or_more("must"));
        leaf_list.extend(optional(&["config", "min-elements", "max-elements", "ordered-by"]));
        table.define("leaf-list", arg("leaf-list"), vec![documented(leaf_list)]);

        let mut list = vec![Rule::optional("when"), Rule::zero_or_more("must")];
        list.extend(optional(&["key"]));
        list.push(Rule::zero_or_more("unique"));
        list.extend(optional(&["config", "min-elements", "max-elements", "ordered-by"]));
        list.extend(definitions());
        list.extend(data_def());
        table.define("list", arg("list"), vec![documented(list)]);

        let mut choice = optional(&["when", "default", "config", "mandatory"]);
        choice.extend(zero_or_more(&[
            "case",
            "container",
            "leaf",
            "leaf-list",
            "list",
            "anyxml",
        ]));
        table.define("choice", arg("choice"), vec![documented(choice)]);

        let mut case = optional(&["when"]);
        case.extend(data_def());
        table.define("case", arg("case"), vec![documented(case)]);

        let mut anyxml = vec![Rule::optional("when"), Rule::zero_or_more("must")];
        anyxml.extend(optional(&["config", "mandatory"]));
        table.define("anyxml", arg("anyxml"), vec![documented(anyxml)]);

        let uses = vec![Rule::optional("when"), Rule::zero_or_more("augment")];
        table.define("uses", arg("uses"), vec![documented(uses)]);

        let mut augment = optional(&["when"]);
        augment.extend(data_def());
        augment.push(Rule::zero_or_more("case"));
        table.define("augment", arg("augment"), vec![documented(augment)]);

        let mut rpc = definitions();
        rpc.extend(optional(&["input", "output"]));
        table.define("rpc", arg("rpc"), vec![documented(rpc)]);

        let mut io = definitions();
        io.extend(data_def());
        table.define("input", None, vec![Rule::interleave(io.clone())]);
        table.define("output", None, vec![Rule::interleave(io)]);

        let mut notification = definitions();
        notification.extend(data_def());
        table.define("notification", arg("notification"), vec![documented(notification)]);

        for keyword in [
            "yang-version",
            "namespace",
            "prefix",
            "include",
            "organization",
            "contact",
            "description",
            "reference",
            "yin-element",
            "units",
            "default",
            "status",
            "config",
            "mandatory",
            "presence",
            "key",
            "unique",
            "ordered-by",
            "min-elements",
            "max-elements",
            "error-message",
            "error-app-tag",
            "value",
            "position",
            "path",
        ] {
            table.define(keyword, arg(keyword), Vec::new());
        }

        table.set_top_level(["module", "submodule"]);
        table
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grammar::{resolve_occurrence, Occurrence};

    #[test]
    fn test_every_keyword_has_an_entry() {
        let table = GrammarTable::yang();
        for (keyword, argument, _) in KEYWORDS {
            let entry = table
                .entry(keyword)
                .unwrap_or_else(|| panic!("missing entry for {keyword}"));
            assert_eq!(entry.argument_name(), *argument, "argument of {keyword}");
        }
        assert_eq!(table.len(), KEYWORDS.len());
    }

    #[test]
    fn test_module_header_occurrences() {
        let table = GrammarTable::yang();
        let module = table.entry("module").unwrap();
        assert_eq!(resolve_occurrence(module, "namespace"), Some(Occurrence::One));
        assert_eq!(resolve_occurrence(module, "import"), Some(Occurrence::ZeroOrMore));
        assert_eq!(resolve_occurrence(module, "belongs-to"), None);
    }

    #[test]
    fn test_yin_element_keywords() {
        assert!(keyword_info("description").unwrap().yin_element);
        assert!(!keyword_info("leaf").unwrap().yin_element);
        assert_eq!(keyword_info("input").unwrap().argument, None);
        assert!(keyword_info("frobnicate").is_none());
    }

    #[test]
    fn test_top_level_is_restricted() {
        let table = GrammarTable::yang();
        assert!(table.allows_top_level("module"));
        assert!(table.allows_top_level("submodule"));
        assert!(!table.allows_top_level("container"));
    }
}
