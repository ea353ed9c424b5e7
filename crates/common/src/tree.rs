//! Configuration store contents as returned by a query
//!
//! The JSON form is compact: `{"config": {"section": {"type": "...",
//! "options": {"name": "value", "list": ["a", "b"]}}}}`.

use crate::uci::{Entry, Op, Section, Uci, Value};
use crate::{ConfigPath, Filter, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Snapshot of (part of) the configuration store
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ConfigTree {
    configs: BTreeMap<String, StoreConfig>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StoreConfig {
    sections: BTreeMap<String, StoreSection>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreSection {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    options: BTreeMap<String, StoreEntry>,
}

/// Option or list node read from the store
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum StoreEntry {
    Option(String),
    List(Vec<String>),
}

impl StoreEntry {
    /// Scalar content; lists read as their values joined by spaces
    pub fn content(&self) -> String {
        match self {
            StoreEntry::Option(value) => value.clone(),
            StoreEntry::List(values) => values.join(" "),
        }
    }

    /// Ordered child values; a scalar reads as a one-element list
    pub fn children(&self) -> Vec<Value> {
        match self {
            StoreEntry::Option(value) => vec![Value::new(0, value.clone())],
            StoreEntry::List(values) => values
                .iter()
                .enumerate()
                .map(|(i, v)| Value::new(i, v.clone()))
                .collect(),
        }
    }

    pub fn is_list(&self) -> bool {
        matches!(self, StoreEntry::List(_))
    }
}

impl ConfigTree {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn find(&self, path: &ConfigPath) -> Option<&StoreEntry> {
        self.configs
            .get(&path.config)?
            .sections
            .get(&path.section)?
            .options
            .get(&path.option)
    }

    /// Look up a dotted path; malformed paths read as absent
    pub fn get(&self, path: &str) -> Option<&StoreEntry> {
        ConfigPath::parse(path).ok().and_then(|p| self.find(&p))
    }

    pub fn section(&self, config: &str, section: &str) -> Option<&StoreSection> {
        self.configs.get(config)?.sections.get(section)
    }

    pub fn configs(&self) -> impl Iterator<Item = (&str, &StoreConfig)> {
        self.configs.iter().map(|(name, c)| (name.as_str(), c))
    }

    pub fn config_names(&self) -> impl Iterator<Item = &str> {
        self.configs.keys().map(String::as_str)
    }

    pub fn contains_config(&self, name: &str) -> bool {
        self.configs.contains_key(name)
    }

    pub fn is_empty(&self) -> bool {
        self.configs.is_empty()
    }

    /// Set an option, creating the section (typed after its name) if needed
    pub fn set_option(&mut self, path: &str, value: impl Into<String>) -> Result<()> {
        let path = ConfigPath::parse(path)?;
        self.entry_slot(&path)
            .insert(path.option.clone(), StoreEntry::Option(value.into()));
        Ok(())
    }

    /// Set a list, creating the section (typed after its name) if needed
    pub fn set_list<I, S>(&mut self, path: &str, values: I) -> Result<()>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let path = ConfigPath::parse(path)?;
        let values = values.into_iter().map(Into::into).collect();
        self.entry_slot(&path)
            .insert(path.option.clone(), StoreEntry::List(values));
        Ok(())
    }

    fn entry_slot(&mut self, path: &ConfigPath) -> &mut BTreeMap<String, StoreEntry> {
        &mut self
            .configs
            .entry(path.config.clone())
            .or_default()
            .sections
            .entry(path.section.clone())
            .or_insert_with(|| StoreSection::new(&path.section))
            .options
    }

    /// Copy of the configs selected by `filter`
    pub fn filtered(&self, filter: &Filter) -> ConfigTree {
        ConfigTree {
            configs: self
                .configs
                .iter()
                .filter(|(name, _)| filter.includes(name))
                .map(|(name, config)| (name.clone(), config.clone()))
                .collect(),
        }
    }

    /// Apply a mutation tree in place
    pub fn apply(&mut self, uci: &Uci) {
        for config in uci.configs() {
            if config.op == Op::Remove {
                self.configs.remove(&config.name);
                continue;
            }
            let target = self.configs.entry(config.name.clone()).or_default();
            if config.op == Op::Replace {
                *target = StoreConfig::default();
            }
            for section in config.sections() {
                target.apply_section(section);
            }
        }
    }
}

impl StoreConfig {
    pub fn sections(&self) -> impl Iterator<Item = (&str, &StoreSection)> {
        self.sections.iter().map(|(name, s)| (name.as_str(), s))
    }

    fn apply_section(&mut self, section: &Section) {
        if section.op == Op::Remove {
            self.sections.remove(&section.name);
            return;
        }
        let target = self
            .sections
            .entry(section.name.clone())
            .or_insert_with(|| StoreSection::new(&section.kind));
        if section.op == Op::Replace {
            target.options.clear();
        }
        target.kind = section.kind.clone();
        for entry in section.entries() {
            target.apply_entry(entry);
        }
    }
}

impl StoreSection {
    pub fn new(kind: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            options: BTreeMap::new(),
        }
    }

    pub fn options(&self) -> impl Iterator<Item = (&str, &StoreEntry)> {
        self.options.iter().map(|(name, e)| (name.as_str(), e))
    }

    fn apply_entry(&mut self, entry: &Entry) {
        let name = entry.name().to_string();
        match (entry, entry.op()) {
            (_, Op::Remove) => {
                self.options.remove(&name);
            }
            (Entry::Option(option), _) => {
                self.options
                    .insert(name, StoreEntry::Option(option.value.clone()));
            }
            (Entry::List(list), op) => {
                let mut values = match (op, self.options.remove(&name)) {
                    (Op::Add, Some(StoreEntry::List(values))) => values,
                    (Op::Add, Some(StoreEntry::Option(value))) => vec![value],
                    _ => Vec::new(),
                };
                values.extend(list.values().iter().map(|v| v.content.clone()));
                // a list without values is not kept
                if !values.is_empty() {
                    self.options.insert(name, StoreEntry::List(values));
                }
            }
        }
    }
}
