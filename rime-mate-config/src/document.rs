//! Order-preserving YAML document model.
//!
//! Rime custom files are edited by hand, so the order in which keys appear
//! matters to the people maintaining them. [`Document`] keeps its entries in
//! a `Vec` of key/value pairs: iteration order is read order, and new keys
//! are appended at the end of whichever section they were added to.
//!
//! Values are either a [`Scalar`] (string, integer, boolean), a nested
//! [`Document`] section, or an [`Value::Opaque`] YAML node for anything the
//! patch engine never needs to look inside (sequences, floats, nulls, tagged
//! values, mappings with non-string keys). Opaque nodes are written back
//! exactly as they were read. Top-level keys that are not strings keep their
//! original YAML node, so `1: one` is saved as `1: one`, not `'1': one`.
//!
//! Serialization is lossy for formatting: comments, blank lines, flow-style
//! mappings and anchors are not carried through a load/save cycle. Only key
//! order, values and scalar types survive. Rewrite a user's file only when
//! its content actually changed.

use serde_yaml_ng::{Mapping, Value as Yaml};
use std::fmt;

/// A scalar leaf value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Scalar {
    Str(String),
    Int(i64),
    Bool(bool),
}

impl Scalar {
    fn to_yaml(&self) -> Yaml {
        match self {
            Scalar::Str(s) => Yaml::String(s.clone()),
            Scalar::Int(i) => Yaml::Number((*i).into()),
            Scalar::Bool(b) => Yaml::Bool(*b),
        }
    }
}

impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scalar::Str(s) => write!(f, "{s}"),
            Scalar::Int(i) => write!(f, "{i}"),
            Scalar::Bool(b) => write!(f, "{b}"),
        }
    }
}

impl From<&str> for Scalar {
    fn from(s: &str) -> Self {
        Scalar::Str(s.to_string())
    }
}

impl From<String> for Scalar {
    fn from(s: String) -> Self {
        Scalar::Str(s)
    }
}

impl From<i64> for Scalar {
    fn from(i: i64) -> Self {
        Scalar::Int(i)
    }
}

impl From<bool> for Scalar {
    fn from(b: bool) -> Self {
        Scalar::Bool(b)
    }
}

/// A value stored under a document key.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Scalar(Scalar),
    /// Nested mapping whose keys are all strings.
    Section(Document),
    /// Any other YAML node, carried through untouched.
    Opaque(Yaml),
}

impl Value {
    /// Classify a parsed YAML node.
    pub fn from_yaml(node: Yaml) -> Self {
        match node {
            Yaml::String(s) => Value::Scalar(Scalar::Str(s)),
            Yaml::Bool(b) => Value::Scalar(Scalar::Bool(b)),
            Yaml::Number(n) => match n.as_i64() {
                Some(i) if !n.is_f64() => Value::Scalar(Scalar::Int(i)),
                _ => Value::Opaque(Yaml::Number(n)),
            },
            Yaml::Mapping(m) if m.keys().all(Yaml::is_string) => {
                Value::Section(Document::from_mapping(m))
            }
            other => Value::Opaque(other),
        }
    }

    /// Convert back into a YAML node.
    pub fn to_yaml(&self) -> Yaml {
        match self {
            Value::Scalar(s) => s.to_yaml(),
            Value::Section(doc) => Yaml::Mapping(doc.to_mapping()),
            Value::Opaque(node) => node.clone(),
        }
    }

    /// Short human-readable name of the value's shape, for error messages.
    pub fn kind(&self) -> &'static str {
        match self {
            Value::Scalar(Scalar::Str(_)) => "a string",
            Value::Scalar(Scalar::Int(_)) => "an integer",
            Value::Scalar(Scalar::Bool(_)) => "a boolean",
            Value::Section(_) => "a mapping",
            Value::Opaque(Yaml::Null) => "null",
            Value::Opaque(Yaml::Sequence(_)) => "a sequence",
            Value::Opaque(Yaml::Mapping(_)) => "a mapping with non-string keys",
            Value::Opaque(Yaml::Number(_)) => "a number",
            Value::Opaque(Yaml::Tagged(_)) => "a tagged value",
            Value::Opaque(_) => "a scalar",
        }
    }
}

impl From<Scalar> for Value {
    fn from(s: Scalar) -> Self {
        Value::Scalar(s)
    }
}

/// One key/value pair. String keys are the common case and carry no node;
/// any other key keeps the YAML node it was read from so it is written back
/// with its original type.
#[derive(Debug, Clone, PartialEq)]
struct Entry {
    name: String,
    node: Option<Yaml>,
    value: Value,
}

impl Entry {
    fn from_node(key: Yaml, value: Value) -> Self {
        match key {
            Yaml::String(name) => Entry {
                name,
                node: None,
                value,
            },
            other => Entry {
                name: key_to_string(&other),
                node: Some(other),
                value,
            },
        }
    }

    fn key_node(&self) -> Yaml {
        match &self.node {
            Some(node) => node.clone(),
            None => Yaml::String(self.name.clone()),
        }
    }

    fn is_string_key(&self, key: &str) -> bool {
        self.node.is_none() && self.name == key
    }
}

/// An ordered sequence of unique keys and their values.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Document {
    entries: Vec<Entry>,
}

impl Document {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse YAML text into a document.
    ///
    /// Empty input (or input containing only comments) yields an empty
    /// document. A top level that is not a mapping is rejected, as is a
    /// mapping with duplicate keys. Non-string keys at the top level are
    /// kept as they were read, so `1` and `'1'` stay two distinct keys.
    pub fn parse(bytes: &[u8]) -> Result<Self, serde_yaml_ng::Error> {
        let root: Yaml = serde_yaml_ng::from_slice(bytes)?;
        match root {
            Yaml::Null => Ok(Self::new()),
            Yaml::Mapping(m) => Ok(Self::from_mapping(m)),
            other => Err(<serde_yaml_ng::Error as serde::de::Error>::custom(format!(
                "expected a key/value mapping at the top level, found {}",
                Value::from_yaml(other).kind()
            ))),
        }
    }

    /// Render the document as YAML text. An empty document renders as an
    /// empty string so that a file emptied by removal stays empty on disk.
    ///
    /// The output is canonical block-style YAML: comments, flow-style
    /// mappings and custom quoting in the source file are not reproduced.
    /// Callers that want a hand-edited file left as it is must skip the save
    /// when nothing changed.
    pub fn to_yaml(&self) -> Result<String, serde_yaml_ng::Error> {
        if self.entries.is_empty() {
            return Ok(String::new());
        }
        serde_yaml_ng::to_string(&self.to_mapping())
    }

    /// Build a document from an arbitrary YAML mapping. Every key node is
    /// kept as is; YAML mapping keys are already unique, so nothing is lost.
    pub fn from_mapping(mapping: Mapping) -> Self {
        let entries = mapping
            .into_iter()
            .map(|(key, value)| Entry::from_node(key, Value::from_yaml(value)))
            .collect();
        Self { entries }
    }

    /// Convert into an insertion-ordered YAML mapping.
    pub fn to_mapping(&self) -> Mapping {
        let mut mapping = Mapping::with_capacity(self.entries.len());
        for entry in &self.entries {
            mapping.insert(entry.key_node(), entry.value.to_yaml());
        }
        mapping
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Position of the string key `key`, matched exactly and
    /// case-sensitively. Non-string keys never match, even when their
    /// textual form is equal.
    pub fn find_key(&self, key: &str) -> Option<usize> {
        self.entries.iter().position(|e| e.is_string_key(key))
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.find_key(key).is_some()
    }

    /// Whether an entry with exactly this key node exists.
    pub fn contains_node(&self, key: &Yaml) -> bool {
        match key {
            Yaml::String(s) => self.contains_key(s),
            other => self.entries.iter().any(|e| e.node.as_ref() == Some(other)),
        }
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.find_key(key).map(|i| &self.entries[i].value)
    }

    pub fn get_mut(&mut self, key: &str) -> Option<&mut Value> {
        self.find_key(key).map(move |i| &mut self.entries[i].value)
    }

    /// Insert `value` under `key`. An existing key keeps its position and
    /// has its value replaced (the old value is returned); a new key is
    /// appended at the end.
    pub fn insert(&mut self, key: impl Into<String>, value: Value) -> Option<Value> {
        self.insert_node(Yaml::String(key.into()), value)
    }

    /// Like [`insert`](Self::insert), keyed by an arbitrary YAML node.
    pub fn insert_node(&mut self, key: Yaml, value: Value) -> Option<Value> {
        let position = match &key {
            Yaml::String(s) => self.find_key(s),
            other => self.entries.iter().position(|e| e.node.as_ref() == Some(other)),
        };
        match position {
            Some(i) => Some(std::mem::replace(&mut self.entries[i].value, value)),
            None => {
                self.entries.push(Entry::from_node(key, value));
                None
            }
        }
    }

    /// Remove the string key `key`, keeping the relative order of everything
    /// else.
    pub fn remove(&mut self, key: &str) -> Option<Value> {
        self.find_key(key).map(|i| self.entries.remove(i).value)
    }

    /// Keep only the string-keyed entries for which `keep` returns true.
    /// Entries with non-string keys are always kept.
    pub fn retain(&mut self, mut keep: impl FnMut(&str, &Value) -> bool) {
        self.entries
            .retain(|e| e.node.is_some() || keep(&e.name, &e.value));
    }

    /// Entries in order. Non-string keys are shown in their textual form.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.entries.iter().map(|e| (e.name.as_str(), &e.value))
    }

    /// Keys in order. Non-string keys are shown in their textual form.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|e| e.name.as_str())
    }

    /// String keys in order, skipping keys of any other type.
    pub fn string_keys(&self) -> impl Iterator<Item = &str> {
        self.entries
            .iter()
            .filter(|e| e.node.is_none())
            .map(|e| e.name.as_str())
    }
}

impl FromIterator<(String, Value)> for Document {
    fn from_iter<I: IntoIterator<Item = (String, Value)>>(iter: I) -> Self {
        let mut doc = Self::new();
        for (key, value) in iter {
            doc.insert(key, value);
        }
        doc
    }
}

/// Textual form of a key node, used for lookups and messages.
pub(crate) fn key_to_string(key: &Yaml) -> String {
    match key {
        Yaml::String(s) => s.clone(),
        Yaml::Bool(b) => b.to_string(),
        Yaml::Number(n) => n.to_string(),
        Yaml::Null => "null".to_string(),
        other => serde_yaml_ng::to_string(other)
            .map(|s| s.trim_end().to_string())
            .unwrap_or_default(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "\
schema_list:
  - schema: rime_mint
menu:
  page_size: 8
switches:
  ascii_mode: false
ratio: 0.5
";

    #[test]
    fn test_parse_keeps_read_order() {
        let doc = Document::parse(SAMPLE.as_bytes()).unwrap();
        let keys: Vec<&str> = doc.keys().collect();
        assert_eq!(keys, vec!["schema_list", "menu", "switches", "ratio"]);
    }

    #[test]
    fn test_parse_classifies_values() {
        let doc = Document::parse(SAMPLE.as_bytes()).unwrap();
        assert!(matches!(
            doc.get("schema_list"),
            Some(Value::Opaque(Yaml::Sequence(_)))
        ));
        match doc.get("menu") {
            Some(Value::Section(menu)) => {
                assert_eq!(
                    menu.get("page_size"),
                    Some(&Value::Scalar(Scalar::Int(8)))
                );
            }
            other => panic!("menu should be a section, got {other:?}"),
        }
        assert!(matches!(doc.get("ratio"), Some(Value::Opaque(_))));
    }

    #[test]
    fn test_parse_empty_and_comment_only() {
        assert!(Document::parse(b"").unwrap().is_empty());
        assert!(Document::parse(b"# nothing here yet\n").unwrap().is_empty());
    }

    #[test]
    fn test_parse_rejects_malformed_yaml() {
        assert!(Document::parse(b"patch: [unclosed").is_err());
    }

    #[test]
    fn test_parse_rejects_non_mapping_top_level() {
        let err = Document::parse(b"- a\n- b\n").unwrap_err();
        assert!(err.to_string().contains("sequence"), "{err}");
    }

    #[test]
    fn test_parse_rejects_duplicate_keys() {
        assert!(Document::parse(b"a: 1\na: 2\n").is_err());
    }

    #[test]
    fn test_round_trip_is_stable() {
        let doc = Document::parse(SAMPLE.as_bytes()).unwrap();
        let first = doc.to_yaml().unwrap();
        let second = Document::parse(first.as_bytes())
            .unwrap()
            .to_yaml()
            .unwrap();
        assert_eq!(first, second);
        assert!(first.find("schema_list").unwrap() < first.find("menu").unwrap());
        assert!(first.find("switches").unwrap() < first.find("ratio").unwrap());
    }

    #[test]
    fn test_empty_document_serializes_to_empty_string() {
        assert_eq!(Document::new().to_yaml().unwrap(), "");
    }

    #[test]
    fn test_find_key_is_case_sensitive() {
        let doc = Document::parse(b"Patch: 1\npatch: 2\n").unwrap();
        assert_eq!(doc.find_key("Patch"), Some(0));
        assert_eq!(doc.find_key("patch"), Some(1));
        assert_eq!(doc.find_key("PATCH"), None);
    }

    #[test]
    fn test_insert_appends_new_and_replaces_in_place() {
        let mut doc = Document::new();
        doc.insert("a", Scalar::Int(1).into());
        doc.insert("b", Scalar::Int(2).into());
        let old = doc.insert("a", Scalar::Int(10).into());
        assert_eq!(old, Some(Value::Scalar(Scalar::Int(1))));
        let keys: Vec<&str> = doc.keys().collect();
        assert_eq!(keys, vec!["a", "b"]);
        assert_eq!(doc.get("a"), Some(&Value::Scalar(Scalar::Int(10))));
    }

    #[test]
    fn test_remove_preserves_order() {
        let mut doc = Document::parse(b"a: 1\nb: 2\nc: 3\n").unwrap();
        assert!(doc.remove("b").is_some());
        assert!(doc.remove("b").is_none());
        let keys: Vec<&str> = doc.keys().collect();
        assert_eq!(keys, vec!["a", "c"]);
    }

    #[test]
    fn test_non_string_top_level_keys_keep_their_type() {
        let text = "1: one\nmenu:\n  page_size: 8\n";
        let doc = Document::parse(text.as_bytes()).unwrap();
        assert!(!doc.contains_key("1"));
        assert!(doc.contains_node(&Yaml::Number(1.into())));
        assert_eq!(doc.keys().collect::<Vec<_>>(), vec!["1", "menu"]);
        assert_eq!(doc.to_yaml().unwrap(), text);
    }

    #[test]
    fn test_int_and_string_keys_with_same_text_stay_distinct() {
        let mut doc = Document::parse(b"1: int-keyed\n'1': str-keyed\n").unwrap();
        assert_eq!(doc.len(), 2);
        assert_eq!(
            doc.get("1"),
            Some(&Value::Scalar(Scalar::from("str-keyed")))
        );

        doc.insert("grammar/language", Scalar::from("x").into());
        let mapping = doc.to_mapping();
        assert_eq!(mapping.len(), 3);
        assert_eq!(
            mapping.get(Yaml::Number(1.into())),
            Some(&Yaml::String("int-keyed".into()))
        );
        assert_eq!(
            mapping.get("1"),
            Some(&Yaml::String("str-keyed".into()))
        );

        let reread = Document::parse(doc.to_yaml().unwrap().as_bytes()).unwrap();
        assert_eq!(reread, doc);
    }

    #[test]
    fn test_retain_skips_non_string_keys() {
        let mut doc = Document::parse(b"1: one\na: 1\nb: 2\n").unwrap();
        doc.retain(|key, _| key == "b");
        assert_eq!(doc.keys().collect::<Vec<_>>(), vec!["1", "b"]);
        assert_eq!(doc.string_keys().collect::<Vec<_>>(), vec!["b"]);
    }

    #[test]
    fn test_nested_mapping_with_int_keys_stays_opaque() {
        let doc = Document::parse(b"table:\n  1: one\n  2: two\n").unwrap();
        assert!(matches!(
            doc.get("table"),
            Some(Value::Opaque(Yaml::Mapping(_)))
        ));
        let out = doc.to_yaml().unwrap();
        assert!(out.contains("1: one"), "{out}");
    }

    #[test]
    fn test_scalar_types_survive_round_trip() {
        let doc =
            Document::parse(b"s: text\ni: 7\nb: true\nq: '5'\n").unwrap();
        let out = Document::parse(doc.to_yaml().unwrap().as_bytes()).unwrap();
        assert_eq!(out.get("s"), Some(&Value::Scalar(Scalar::from("text"))));
        assert_eq!(out.get("i"), Some(&Value::Scalar(Scalar::Int(7))));
        assert_eq!(out.get("b"), Some(&Value::Scalar(Scalar::Bool(true))));
        assert_eq!(out.get("q"), Some(&Value::Scalar(Scalar::from("5"))));
    }
}
