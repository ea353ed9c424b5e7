//! Configuration mutation trees
//!
//! A [`Uci`] tree describes intended changes to the configuration store:
//! configs hold named sections, sections hold options and lists. Every node
//! carries an [`Op`] tag. Nodes are keyed by name, so two trees built from the
//! same inputs compare equal regardless of the order they were assembled in.
//!
//! Adding a node at a path that already exists follows one rule, used both
//! while building a tree and when merging trees from several callbacks:
//! - a config or section tagged `Add` merges its children into the existing node
//! - any other node replaces the existing one (last write wins)

use crate::{ConfigPath, Result};
use serde::{Deserialize, Serialize};
use std::collections::btree_map::Entry as MapEntry;
use std::collections::BTreeMap;

/// Operation tag carried by every mutation node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Op {
    /// Create or update the node, leaving unmentioned children untouched
    #[default]
    Add,
    /// Upsert the whole subtree
    Replace,
    /// Delete the whole subtree
    Remove,
}

impl std::fmt::Display for Op {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Op::Add => write!(f, "add"),
            Op::Replace => write!(f, "replace"),
            Op::Remove => write!(f, "remove"),
        }
    }
}

/// Root of a mutation tree
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Uci {
    configs: BTreeMap<String, Config>,
}

impl Uci {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a config, merging with an existing one of the same name
    pub fn add(&mut self, config: Config) -> &mut Config {
        match self.configs.entry(config.name.clone()) {
            MapEntry::Vacant(slot) => slot.insert(config),
            MapEntry::Occupied(slot) => {
                let existing = slot.into_mut();
                existing.absorb(config);
                existing
            }
        }
    }

    /// Mark a whole config for replacement
    pub fn add_replace(&mut self, mut config: Config) -> &mut Config {
        config.op = Op::Replace;
        self.add(config)
    }

    /// Mark a whole config for removal
    pub fn add_removal(&mut self, mut config: Config) -> &mut Config {
        config.op = Op::Remove;
        config.sections.clear();
        self.add(config)
    }

    /// Merge another tree into this one
    pub fn merge(&mut self, other: Uci) {
        for config in other.configs.into_values() {
            self.add(config);
        }
    }

    /// Build a tree setting a single option, creating its section with `section_kind`
    pub fn option_at(path: &str, section_kind: &str, value: impl Into<String>) -> Result<Self> {
        let path = ConfigPath::parse(path)?;
        let mut uci = Uci::new();
        uci.add(Config::new(&path.config))
            .add(Section::new(&path.section, section_kind))
            .add(UciOption::new(&path.option, value));
        Ok(uci)
    }

    pub fn is_empty(&self) -> bool {
        self.configs.is_empty()
    }

    pub fn configs(&self) -> impl Iterator<Item = &Config> {
        self.configs.values()
    }

    pub fn config(&self, name: &str) -> Option<&Config> {
        self.configs.get(name)
    }

    /// Look up the option or list node at `path`
    pub fn find(&self, path: &ConfigPath) -> Option<&Entry> {
        self.config(&path.config)?
            .section(&path.section)?
            .entry(&path.option)
    }
}

/// Named top-level configuration group
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    pub name: String,
    pub op: Op,
    sections: BTreeMap<String, Section>,
}

impl Config {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            op: Op::Add,
            sections: BTreeMap::new(),
        }
    }

    /// Add a section, merging with an existing one of the same name
    pub fn add(&mut self, section: Section) -> &mut Section {
        match self.sections.entry(section.name.clone()) {
            MapEntry::Vacant(slot) => slot.insert(section),
            MapEntry::Occupied(slot) => {
                let existing = slot.into_mut();
                existing.absorb(section);
                existing
            }
        }
    }

    pub fn add_replace(&mut self, mut section: Section) -> &mut Section {
        section.op = Op::Replace;
        self.add(section)
    }

    pub fn add_removal(&mut self, mut section: Section) -> &mut Section {
        section.op = Op::Remove;
        section.entries.clear();
        self.add(section)
    }

    pub fn sections(&self) -> impl Iterator<Item = &Section> {
        self.sections.values()
    }

    pub fn section(&self, name: &str) -> Option<&Section> {
        self.sections.get(name)
    }

    fn absorb(&mut self, incoming: Config) {
        if incoming.op != Op::Add {
            *self = incoming;
            return;
        }
        if self.op == Op::Remove {
            self.op = Op::Replace;
        }
        for section in incoming.sections.into_values() {
            self.add(section);
        }
    }
}

/// Named, typed section inside a config
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Section {
    pub name: String,
    pub kind: String,
    pub op: Op,
    entries: BTreeMap<String, Entry>,
}

impl Section {
    pub fn new(name: impl Into<String>, kind: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: kind.into(),
            op: Op::Add,
            entries: BTreeMap::new(),
        }
    }

    /// Add an option or list; an existing entry of the same name is replaced
    pub fn add(&mut self, entry: impl Into<Entry>) -> &mut Entry {
        let entry = entry.into();
        match self.entries.entry(entry.name().to_string()) {
            MapEntry::Vacant(slot) => slot.insert(entry),
            MapEntry::Occupied(slot) => {
                let existing = slot.into_mut();
                *existing = entry;
                existing
            }
        }
    }

    pub fn add_replace(&mut self, entry: impl Into<Entry>) -> &mut Entry {
        let mut entry = entry.into();
        entry.set_op(Op::Replace);
        self.add(entry)
    }

    pub fn add_removal(&mut self, entry: impl Into<Entry>) -> &mut Entry {
        let mut entry = entry.into();
        entry.set_op(Op::Remove);
        if let Entry::List(list) = &mut entry {
            list.values.clear();
        }
        self.add(entry)
    }

    pub fn entries(&self) -> impl Iterator<Item = &Entry> {
        self.entries.values()
    }

    pub fn entry(&self, name: &str) -> Option<&Entry> {
        self.entries.get(name)
    }

    pub fn option(&self, name: &str) -> Option<&UciOption> {
        match self.entries.get(name)? {
            Entry::Option(option) => Some(option),
            Entry::List(_) => None,
        }
    }

    pub fn list(&self, name: &str) -> Option<&UciList> {
        match self.entries.get(name)? {
            Entry::List(list) => Some(list),
            Entry::Option(_) => None,
        }
    }

    fn absorb(&mut self, incoming: Section) {
        if incoming.op != Op::Add {
            *self = incoming;
            return;
        }
        if self.op == Op::Remove {
            self.op = Op::Replace;
        }
        self.kind = incoming.kind;
        for entry in incoming.entries.into_values() {
            self.add(entry);
        }
    }
}

/// Leaf node of a section
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Entry {
    Option(UciOption),
    List(UciList),
}

impl Entry {
    pub fn name(&self) -> &str {
        match self {
            Entry::Option(option) => &option.name,
            Entry::List(list) => &list.name,
        }
    }

    pub fn op(&self) -> Op {
        match self {
            Entry::Option(option) => option.op,
            Entry::List(list) => list.op,
        }
    }

    fn set_op(&mut self, op: Op) {
        match self {
            Entry::Option(option) => option.op = op,
            Entry::List(list) => list.op = op,
        }
    }
}

impl From<UciOption> for Entry {
    fn from(option: UciOption) -> Self {
        Entry::Option(option)
    }
}

impl From<UciList> for Entry {
    fn from(list: UciList) -> Self {
        Entry::List(list)
    }
}

/// Scalar name/value option
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UciOption {
    pub name: String,
    pub value: String,
    pub op: Op,
}

impl UciOption {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
            op: Op::Add,
        }
    }

    /// Boolean option encoded the way the store expects (`1`/`0`)
    pub fn boolean(name: impl Into<String>, value: bool) -> Self {
        Self::new(name, uci_bool(value))
    }
}

/// Ordered list of values
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UciList {
    pub name: String,
    pub op: Op,
    values: Vec<Value>,
}

impl UciList {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            op: Op::Add,
            values: Vec::new(),
        }
    }

    /// Build a list whose values are indexed in iteration order
    pub fn from_values<I, S>(name: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut list = Self::new(name);
        for value in values {
            list.push(value);
        }
        list
    }

    pub fn add(&mut self, value: Value) -> &mut Self {
        self.values.push(value);
        self
    }

    /// Append a value at the next positional index
    pub fn push(&mut self, content: impl Into<String>) -> &mut Self {
        let index = self.values.len();
        self.add(Value::new(index, content))
    }

    pub fn values(&self) -> &[Value] {
        &self.values
    }

    pub fn contents(&self) -> Vec<&str> {
        self.values.iter().map(|v| v.content.as_str()).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }
}

/// List value with its positional index
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Value {
    pub index: usize,
    pub content: String,
}

impl Value {
    pub fn new(index: usize, content: impl Into<String>) -> Self {
        Self {
            index,
            content: content.into(),
        }
    }
}

/// Store encoding of a boolean
pub fn uci_bool(value: bool) -> &'static str {
    if value {
        "1"
    } else {
        "0"
    }
}

/// Parse a store boolean (`1`, `true`, `yes`, `on`, `enabled`)
pub fn parse_uci_bool(raw: &str) -> bool {
    matches!(
        raw.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on" | "enabled"
    )
}
