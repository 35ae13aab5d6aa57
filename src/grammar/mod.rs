//! # Grammar Table
//!
//! Per-keyword description of a statement's argument and the occurrence rules for its
//! substatements. A [`GrammarTable`] is an immutable value built once (usually via
//! [`GrammarTable::yang`]) and passed by reference to every parser, projector and validator
//! call, so independent sessions never share ambient state.
//!
//! ## Rule shapes
//! - `Rule::Keyword(kw, occ)`: child `kw` may occur as `occ` allows.
//! - `Rule::Choice(alternatives)`: exactly one alternative applies.
//! - `Rule::Interleave(rules)`: members may appear in any relative order.

use std::borrow::Cow;
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::ast::{is_prefixed, Slot};

pub mod occurrence;
pub mod yang;

pub use occurrence::{locate, resolve_occurrence, Located};
pub use yang::{keyword_info, KeywordInfo, YIN_NAMESPACE};

// ============================================================================
// OCCURRENCE
// ============================================================================

/// Cardinality class of a substatement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Occurrence {
    /// `?`: zero or one.
    Optional,
    /// `1`: exactly one.
    One,
    /// `*`: zero or more.
    ZeroOrMore,
    /// `+`: one or more.
    OneOrMore,
}

impl Occurrence {
    pub const fn symbol(self) -> char {
        match self {
            Self::Optional => '?',
            Self::One => '1',
            Self::ZeroOrMore => '*',
            Self::OneOrMore => '+',
        }
    }

    pub fn from_symbol(symbol: char) -> Option<Self> {
        match symbol {
            '?' => Some(Self::Optional),
            '1' => Some(Self::One),
            '*' => Some(Self::ZeroOrMore),
            '+' => Some(Self::OneOrMore),
            _ => None,
        }
    }

    /// `?` and `1` project into a single-valued attribute.
    pub const fn is_single(self) -> bool {
        matches!(self, Self::Optional | Self::One)
    }

    /// `1` and `+` need at least one occurrence.
    pub const fn is_required(self) -> bool {
        matches!(self, Self::One | Self::OneOrMore)
    }

    pub const fn admits(self, count: usize) -> bool {
        match self {
            Self::Optional => count <= 1,
            Self::One => count == 1,
            Self::ZeroOrMore => true,
            Self::OneOrMore => count >= 1,
        }
    }
}

impl fmt::Display for Occurrence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.symbol())
    }
}

// ============================================================================
// RULES
// ============================================================================

/// One entry of a keyword's substatement rules.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Rule {
    Keyword(String, Occurrence),
    Choice(Vec<Vec<Rule>>),
    Interleave(Vec<Rule>),
}

impl Rule {
    pub fn optional(keyword: impl Into<String>) -> Self {
        Self::Keyword(keyword.into(), Occurrence::Optional)
    }

    pub fn one(keyword: impl Into<String>) -> Self {
        Self::Keyword(keyword.into(), Occurrence::One)
    }

    pub fn zero_or_more(keyword: impl Into<String>) -> Self {
        Self::Keyword(keyword.into(), Occurrence::ZeroOrMore)
    }

    pub fn one_or_more(keyword: impl Into<String>) -> Self {
        Self::Keyword(keyword.into(), Occurrence::OneOrMore)
    }

    pub fn choice(alternatives: Vec<Vec<Rule>>) -> Self {
        Self::Choice(alternatives)
    }

    pub fn interleave(rules: Vec<Rule>) -> Self {
        Self::Interleave(rules)
    }
}

/// Collects every child keyword mentioned anywhere in `rules`, in declaration order.
pub fn rule_keywords<'a>(rules: &'a [Rule], out: &mut Vec<&'a str>) {
    for rule in rules {
        match rule {
            Rule::Keyword(keyword, _) => out.push(keyword),
            Rule::Choice(alternatives) => {
                for alternative in alternatives {
                    rule_keywords(alternative, out);
                }
            }
            Rule::Interleave(inner) => rule_keywords(inner, out),
        }
    }
}

/// True when `rules` is satisfied by a statement with no substatements.
pub fn accepts_empty(rules: &[Rule]) -> bool {
    rules.iter().all(|rule| match rule {
        Rule::Keyword(_, occurrence) => !occurrence.is_required(),
        Rule::Choice(alternatives) => alternatives.iter().any(|alt| accepts_empty(alt)),
        Rule::Interleave(inner) => accepts_empty(inner),
    })
}

// ============================================================================
// PROJECTED ATTRIBUTE LAYOUT
// ============================================================================

/// Keywords whose statements all project into the shared `children` collection.
pub const DATA_NODE_KEYWORDS: &[&str] = &[
    "leaf",
    "container",
    "leaf-list",
    "list",
    "anyxml",
    "case",
    "choice",
    "uses",
    "rpc",
    "notification",
];

/// Maps a substatement keyword to the attribute it projects into.
///
/// `import` becomes `import_`, data nodes share `children`, extension statements project
/// nowhere, everything else uses the keyword with `-` replaced by `_`.
pub fn attribute_name(keyword: &str) -> Option<Cow<'static, str>> {
    if keyword == "import" {
        return Some(Cow::Borrowed("import_"));
    }
    if DATA_NODE_KEYWORDS.contains(&keyword) {
        return Some(Cow::Borrowed("children"));
    }
    if is_prefixed(keyword) {
        return None;
    }
    Some(Cow::Owned(keyword.replace('-', "_")))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shape {
    Single,
    Many,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SlotSpec {
    pub attr: String,
    pub shape: Shape,
}

/// The closed set of attributes a keyword's statements can carry.
#[derive(Debug, Clone, Default)]
pub struct SlotLayout {
    slots: Vec<SlotSpec>,
    by_attr: HashMap<String, usize>,
    by_keyword: HashMap<String, usize>,
}

impl SlotLayout {
    fn build(rules: &[Rule]) -> Self {
        let mut layout = Self::default();
        let mut keywords = Vec::new();
        rule_keywords(rules, &mut keywords);

        for keyword in keywords {
            if layout.by_keyword.contains_key(keyword) {
                continue;
            }
            let Some(attr) = attribute_name(keyword) else {
                continue;
            };
            let Some(occurrence) = occurrence::resolve_in(rules, keyword) else {
                continue;
            };
            let shape = if occurrence.is_single() {
                Shape::Single
            } else {
                Shape::Many
            };

            let index = match layout.by_attr.get(attr.as_ref()) {
                Some(&index) => {
                    // a shared attribute fed by both shapes keeps every statement
                    if layout.slots[index].shape != shape {
                        layout.slots[index].shape = Shape::Many;
                    }
                    index
                }
                None => {
                    let index = layout.slots.len();
                    layout.slots.push(SlotSpec {
                        attr: attr.to_string(),
                        shape,
                    });
                    layout.by_attr.insert(attr.into_owned(), index);
                    index
                }
            };
            layout.by_keyword.insert(keyword.to_string(), index);
        }
        layout
    }

    pub fn slots(&self) -> &[SlotSpec] {
        &self.slots
    }

    pub fn slot_index(&self, attr: &str) -> Option<usize> {
        self.by_attr.get(attr).copied()
    }

    /// Slot fed by substatements with `keyword`.
    pub fn slot_for_keyword(&self, keyword: &str) -> Option<usize> {
        self.by_keyword.get(keyword).copied()
    }

    pub(crate) fn empty_slots(&self) -> Vec<Slot> {
        self.slots
            .iter()
            .map(|spec| match spec.shape {
                Shape::Single => Slot::Single(None),
                Shape::Many => Slot::Many(Vec::new()),
            })
            .collect()
    }
}

// ============================================================================
// GRAMMAR TABLE
// ============================================================================

#[derive(Debug, Clone)]
pub struct GrammarEntry {
    keyword: String,
    argument: Option<String>,
    rules: Vec<Rule>,
    layout: Arc<SlotLayout>,
}

impl GrammarEntry {
    pub fn keyword(&self) -> &str {
        &self.keyword
    }

    /// Name of the keyword's argument, `None` when it takes no argument.
    pub fn argument_name(&self) -> Option<&str> {
        self.argument.as_deref()
    }

    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    pub fn layout(&self) -> &Arc<SlotLayout> {
        &self.layout
    }
}

/// Keywords whose collections may legitimately hold repeated arguments.
pub const DEFAULT_DUPLICATE_EXEMPT: &[&str] = &["augment", "type"];

#[derive(Debug, Clone)]
pub struct GrammarTable {
    entries: HashMap<String, GrammarEntry>,
    top_level: HashSet<String>,
    duplicate_exempt: HashSet<String>,
}

impl Default for GrammarTable {
    fn default() -> Self {
        Self::new()
    }
}

impl GrammarTable {
    /// An empty table with the default duplicate exemptions and no top-level restriction.
    pub fn new() -> Self {
        Self {
            entries: HashMap::new(),
            top_level: HashSet::new(),
            duplicate_exempt: DEFAULT_DUPLICATE_EXEMPT
                .iter()
                .map(|kw| kw.to_string())
                .collect(),
        }
    }

    /// Adds or replaces the entry for `keyword`.
    pub fn define(
        &mut self,
        keyword: impl Into<String>,
        argument: Option<&str>,
        rules: Vec<Rule>,
    ) -> &mut Self {
        let keyword = keyword.into();
        let layout = Arc::new(SlotLayout::build(&rules));
        self.entries.insert(
            keyword.clone(),
            GrammarEntry {
                keyword,
                argument: argument.map(str::to_string),
                rules,
                layout,
            },
        );
        self
    }

    /// Restricts which keywords may be the root of a document.
    pub fn set_top_level<I, S>(&mut self, keywords: I) -> &mut Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.top_level = keywords.into_iter().map(Into::into).collect();
        self
    }

    pub fn set_duplicate_exempt<I, S>(&mut self, keywords: I) -> &mut Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.duplicate_exempt = keywords.into_iter().map(Into::into).collect();
        self
    }

    pub fn entry(&self, keyword: &str) -> Option<&GrammarEntry> {
        self.entries.get(keyword)
    }

    pub fn contains(&self, keyword: &str) -> bool {
        self.entries.contains_key(keyword)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn allows_top_level(&self, keyword: &str) -> bool {
        if self.top_level.is_empty() {
            self.contains(keyword)
        } else {
            self.top_level.contains(keyword)
        }
    }

    pub fn is_duplicate_exempt(&self, keyword: &str) -> bool {
        self.duplicate_exempt.contains(keyword)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_occurrence_symbols() {
        for symbol in ['?', '1', '*', '+'] {
            let occurrence = Occurrence::from_symbol(symbol).unwrap();
            assert_eq!(occurrence.symbol(), symbol);
        }
        assert_eq!(Occurrence::from_symbol('x'), None);
    }

    #[test]
    fn test_occurrence_admits() {
        assert!(Occurrence::One.admits(1));
        assert!(!Occurrence::One.admits(0));
        assert!(!Occurrence::One.admits(2));
        assert!(Occurrence::Optional.admits(0));
        assert!(!Occurrence::OneOrMore.admits(0));
        assert!(Occurrence::ZeroOrMore.admits(5));
    }

    #[test]
    fn test_attribute_names() {
        assert_eq!(attribute_name("import").as_deref(), Some("import_"));
        assert_eq!(attribute_name("leaf-list").as_deref(), Some("children"));
        assert_eq!(attribute_name("yang-version").as_deref(), Some("yang_version"));
        assert_eq!(attribute_name("ex:note"), None);
    }

    #[test]
    fn test_layout_shares_children_slot() {
        let mut table = GrammarTable::new();
        table.define(
            "container",
            Some("name"),
            vec![Rule::interleave(vec![
                Rule::optional("description"),
                Rule::zero_or_more("leaf"),
                Rule::zero_or_more("container"),
            ])],
        );
        let layout = table.entry("container").unwrap().layout();
        assert_eq!(layout.slots().len(), 2);
        assert_eq!(layout.slot_for_keyword("leaf"), layout.slot_for_keyword("container"));
        let description = layout.slot_index("description").unwrap();
        assert_eq!(layout.slots()[description].shape, Shape::Single);
    }

    #[test]
    fn test_accepts_empty() {
        assert!(accepts_empty(&[Rule::optional("a"), Rule::zero_or_more("b")]));
        assert!(!accepts_empty(&[Rule::one("a")]));
        assert!(accepts_empty(&[Rule::choice(vec![
            vec![Rule::one("a")],
            vec![Rule::optional("b")],
        ])]));
    }
}
