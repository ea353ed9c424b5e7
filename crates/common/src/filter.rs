//! Read filters describing which subtree of the store a form queries

use serde::{Deserialize, Serialize};

/// Selects configs from the configuration store
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Filter {
    All,
    Configs(Vec<String>),
}

impl Filter {
    pub fn all() -> Self {
        Filter::All
    }

    /// Select whole configs by name
    pub fn configs<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Filter::Configs(names.into_iter().map(Into::into).collect())
    }

    pub fn includes(&self, config: &str) -> bool {
        match self {
            Filter::All => true,
            Filter::Configs(names) => names.iter().any(|n| n == config),
        }
    }
}

impl Default for Filter {
    fn default() -> Self {
        Filter::All
    }
}
