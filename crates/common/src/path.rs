//! Dotted configuration paths (`config.section.option`)

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Address of a single option or list inside the configuration store
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ConfigPath {
    pub config: String,
    pub section: String,
    pub option: String,
}

impl ConfigPath {
    pub fn new(
        config: impl Into<String>,
        section: impl Into<String>,
        option: impl Into<String>,
    ) -> Self {
        Self {
            config: config.into(),
            section: section.into(),
            option: option.into(),
        }
    }

    /// Parse `config.section.option`; a leading `uci.` namespace is accepted.
    pub fn parse(path: &str) -> Result<Self> {
        let trimmed = path.strip_prefix("uci.").unwrap_or(path);
        let parts: Vec<&str> = trimmed.split('.').collect();
        if parts.len() != 3 || parts.iter().any(|p| p.is_empty()) {
            return Err(Error::InvalidPath(path.to_string()));
        }
        Ok(Self::new(parts[0], parts[1], parts[2]))
    }
}

impl FromStr for ConfigPath {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl fmt::Display for ConfigPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.config, self.section, self.option)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_plain_and_prefixed() {
        let plain = ConfigPath::parse("updater.pkglists.lists").unwrap();
        let prefixed = ConfigPath::parse("uci.updater.pkglists.lists").unwrap();
        assert_eq!(plain, prefixed);
        assert_eq!(plain.config, "updater");
        assert_eq!(plain.section, "pkglists");
        assert_eq!(plain.option, "lists");
        assert_eq!(plain.to_string(), "updater.pkglists.lists");
    }

    #[test]
    fn test_parse_rejects_malformed() {
        assert!(ConfigPath::parse("foris.eula").is_err());
        assert!(ConfigPath::parse("foris..agreed").is_err());
        assert!(ConfigPath::parse("a.b.c.d").is_err());
        assert!(matches!(
            "".parse::<ConfigPath>(),
            Err(Error::InvalidPath(_))
        ));
    }
}
