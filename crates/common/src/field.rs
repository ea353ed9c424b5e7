//! Form fields: kinds, coercion and display value sources

use crate::data::{FieldValue, Submission};
use crate::tree::{ConfigTree, StoreEntry};
use crate::uci::parse_uci_bool;
use crate::validators::{check_email, ValidationError, Validator};
use crate::{ConfigPath, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

// ============================================================================
// Value sources
// ============================================================================

/// Derives a field's displayed value from the raw store entry at its path
pub trait ValueSource: Send + Sync + fmt::Debug {
    fn derive(&self, raw: &StoreEntry) -> FieldValue;
}

/// Store boolean (`1`/`0`)
#[derive(Debug, Clone, Copy, Default)]
pub struct BoolSource;

impl ValueSource for BoolSource {
    fn derive(&self, raw: &StoreEntry) -> FieldValue {
        FieldValue::Bool(parse_uci_bool(&raw.content()))
    }
}

/// Negated store boolean, for options phrased the other way round (`ignore`, `disabled`)
#[derive(Debug, Clone, Copy, Default)]
pub struct InvertedBoolSource;

impl ValueSource for InvertedBoolSource {
    fn derive(&self, raw: &StoreEntry) -> FieldValue {
        FieldValue::Bool(!parse_uci_bool(&raw.content()))
    }
}

/// Scalar content as text
#[derive(Debug, Clone, Copy, Default)]
pub struct TextSource;

impl ValueSource for TextSource {
    fn derive(&self, raw: &StoreEntry) -> FieldValue {
        FieldValue::Text(raw.content())
    }
}

/// List contents in store order
#[derive(Debug, Clone, Copy, Default)]
pub struct ListSource;

impl ValueSource for ListSource {
    fn derive(&self, raw: &StoreEntry) -> FieldValue {
        FieldValue::List(raw.children().into_iter().map(|v| v.content).collect())
    }
}

/// Keys of a known universe that are *not* in the stored list
///
/// Used for "enabled" multi-selects backed by a "disabled" list: the result
/// keeps the declared order of the universe.
#[derive(Debug, Clone)]
pub struct ComplementSource {
    universe: Vec<String>,
}

impl ComplementSource {
    pub fn new<I, S>(universe: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            universe: universe.into_iter().map(Into::into).collect(),
        }
    }
}

impl ValueSource for ComplementSource {
    fn derive(&self, raw: &StoreEntry) -> FieldValue {
        let excluded: Vec<String> = raw.children().into_iter().map(|v| v.content).collect();
        FieldValue::List(
            self.universe
                .iter()
                .filter(|key| !excluded.contains(key))
                .cloned()
                .collect(),
        )
    }
}

// ============================================================================
// Field kinds
// ============================================================================

/// Selectable option of a dropdown or multi-select
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Choice {
    pub key: String,
    pub label: String,
}

fn choices<I, K, L>(options: I) -> Vec<Choice>
where
    I: IntoIterator<Item = (K, L)>,
    K: Into<String>,
    L: Into<String>,
{
    options
        .into_iter()
        .map(|(key, label)| Choice {
            key: key.into(),
            label: label.into(),
        })
        .collect()
}

/// Semantic type of a field
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum FieldKind {
    Textbox,
    Password,
    Email,
    Number,
    Hidden,
    Checkbox,
    MultiCheckbox { options: Vec<Choice> },
    Dropdown { options: Vec<Choice> },
}

impl FieldKind {
    pub fn name(&self) -> &'static str {
        match self {
            FieldKind::Textbox => "textbox",
            FieldKind::Password => "password",
            FieldKind::Email => "email",
            FieldKind::Number => "number",
            FieldKind::Hidden => "hidden",
            FieldKind::Checkbox => "checkbox",
            FieldKind::MultiCheckbox { .. } => "multi_checkbox",
            FieldKind::Dropdown { .. } => "dropdown",
        }
    }

    pub fn options(&self) -> &[Choice] {
        match self {
            FieldKind::MultiCheckbox { options } | FieldKind::Dropdown { options } => options,
            _ => &[],
        }
    }

    /// Value of an untouched field of this kind
    pub fn empty_value(&self) -> FieldValue {
        match self {
            FieldKind::Checkbox => FieldValue::Bool(false),
            FieldKind::MultiCheckbox { .. } => FieldValue::List(Vec::new()),
            _ => FieldValue::Text(String::new()),
        }
    }

    /// Coerce raw submitted values into the kind's semantic type
    pub fn coerce(&self, raw: Option<&[String]>) -> std::result::Result<FieldValue, ValidationError> {
        let raw = raw.unwrap_or(&[]);
        let first = raw.first().map(String::as_str).unwrap_or("");
        match self {
            FieldKind::Checkbox => Ok(FieldValue::Bool(raw.iter().any(|v| !v.trim().is_empty()))),
            FieldKind::MultiCheckbox { options } => {
                let selected: Vec<&str> = raw
                    .iter()
                    .map(String::as_str)
                    .filter(|v| !v.is_empty())
                    .collect();
                if let Some(unknown) = selected
                    .iter()
                    .find(|v| !options.iter().any(|c| c.key == **v))
                {
                    return Err(ValidationError::InvalidChoice {
                        value: unknown.to_string(),
                    });
                }
                Ok(FieldValue::List(
                    options
                        .iter()
                        .filter(|c| selected.contains(&c.key.as_str()))
                        .map(|c| c.key.clone())
                        .collect(),
                ))
            }
            FieldKind::Dropdown { options } => {
                if options.iter().any(|c| c.key == first) {
                    Ok(FieldValue::text(first))
                } else {
                    Err(ValidationError::InvalidChoice {
                        value: first.to_string(),
                    })
                }
            }
            FieldKind::Email => {
                if !first.is_empty() {
                    check_email(first)?;
                }
                Ok(FieldValue::text(first))
            }
            FieldKind::Number => {
                if first.trim().is_empty() {
                    return Err(ValidationError::Required);
                }
                first
                    .trim()
                    .parse()
                    .map(FieldValue::Int)
                    .map_err(|_| ValidationError::NotInteger)
            }
            FieldKind::Textbox | FieldKind::Password | FieldKind::Hidden => {
                Ok(FieldValue::text(first))
            }
        }
    }

    fn default_source(&self) -> Box<dyn ValueSource> {
        match self {
            FieldKind::Checkbox => Box::new(BoolSource),
            FieldKind::MultiCheckbox { .. } => Box::new(ListSource),
            _ => Box::new(TextSource),
        }
    }
}


// ============================================================================
// Field
// ============================================================================

/// Condition under which a field takes part in validation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Requirement {
    pub field: String,
    pub value: FieldValue,
}

/// Named, typed, validatable unit of user input
#[derive(Debug)]
pub struct Field {
    pub name: String,
    pub label: String,
    pub hint: Option<String>,
    pub kind: FieldKind,
    pub path: Option<ConfigPath>,
    pub default: Option<FieldValue>,
    pub validators: Vec<Validator>,
    pub requirement: Option<Requirement>,
    source: Option<Box<dyn ValueSource>>,
}

impl Field {
    pub fn new(kind: FieldKind, name: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            label: label.into(),
            hint: None,
            kind,
            path: None,
            default: None,
            validators: Vec::new(),
            requirement: None,
            source: None,
        }
    }

    pub fn textbox(name: impl Into<String>, label: impl Into<String>) -> Self {
        Self::new(FieldKind::Textbox, name, label)
    }

    pub fn password(name: impl Into<String>, label: impl Into<String>) -> Self {
        Self::new(FieldKind::Password, name, label)
    }

    pub fn email(name: impl Into<String>, label: impl Into<String>) -> Self {
        Self::new(FieldKind::Email, name, label)
    }

    pub fn number(name: impl Into<String>, label: impl Into<String>) -> Self {
        Self::new(FieldKind::Number, name, label)
    }

    pub fn hidden(name: impl Into<String>) -> Self {
        Self::new(FieldKind::Hidden, name, "")
    }

    pub fn checkbox(name: impl Into<String>, label: impl Into<String>) -> Self {
        Self::new(FieldKind::Checkbox, name, label)
    }

    pub fn multi_checkbox<I, K, L>(name: impl Into<String>, label: impl Into<String>, options: I) -> Self
    where
        I: IntoIterator<Item = (K, L)>,
        K: Into<String>,
        L: Into<String>,
    {
        Self::new(
            FieldKind::MultiCheckbox {
                options: choices(options),
            },
            name,
            label,
        )
    }

    pub fn dropdown<I, K, L>(name: impl Into<String>, label: impl Into<String>, options: I) -> Self
    where
        I: IntoIterator<Item = (K, L)>,
        K: Into<String>,
        L: Into<String>,
    {
        Self::new(
            FieldKind::Dropdown {
                options: choices(options),
            },
            name,
            label,
        )
    }

    /// Bind the field to a store path (`config.section.option`)
    pub fn with_path(mut self, path: &str) -> Result<Self> {
        self.path = Some(ConfigPath::parse(path)?);
        Ok(self)
    }

    pub fn with_source(mut self, source: impl ValueSource + 'static) -> Self {
        self.source = Some(Box::new(source));
        self
    }

    pub fn with_default(mut self, value: FieldValue) -> Self {
        self.default = Some(value);
        self
    }

    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }

    pub fn validator(mut self, validator: Validator) -> Self {
        self.validators.push(validator);
        self
    }

    pub fn required(self) -> Self {
        self.validator(Validator::Required)
    }

    /// Only take part when `field` currently holds `value`
    pub fn requires(mut self, field: impl Into<String>, value: FieldValue) -> Self {
        self.requirement = Some(Requirement {
            field: field.into(),
            value,
        });
        self
    }

    /// Value shown when the form is loaded without a submission
    pub fn display_value(&self, snapshot: &ConfigTree) -> FieldValue {
        let raw = self.path.as_ref().and_then(|path| snapshot.find(path));
        match raw {
            Some(raw) => match &self.source {
                Some(source) => source.derive(raw),
                None => self.kind.default_source().derive(raw),
            },
            None => self
                .default
                .clone()
                .unwrap_or_else(|| self.kind.empty_value()),
        }
    }

    /// Value echoed back after a rejected submission
    pub fn submitted_value(&self, submission: &Submission) -> FieldValue {
        match &self.kind {
            FieldKind::MultiCheckbox { .. } => FieldValue::List(
                submission
                    .get(&self.name)
                    .map(|values| values.iter().filter(|v| !v.is_empty()).cloned().collect())
                    .unwrap_or_default(),
            ),
            kind => kind
                .coerce(submission.get(&self.name))
                .unwrap_or_else(|_| FieldValue::Text(submission.text(&self.name))),
        }
    }

    pub fn is_required(&self) -> bool {
        self.validators.contains(&Validator::Required)
    }

    /// Run validators and coercion, yielding the semantic value
    ///
    /// `None` means an optional number left empty: there is no value of the
    /// field's type to report, so the field is absent from validated data.
    pub fn validate(
        &self,
        submission: &Submission,
    ) -> std::result::Result<Option<FieldValue>, ValidationError> {
        let raw = submission.get(&self.name);
        match &self.kind {
            FieldKind::Checkbox => {}
            FieldKind::MultiCheckbox { .. } => {
                let empty = raw.map_or(true, |values| values.iter().all(|v| v.is_empty()));
                if empty && self.is_required() {
                    return Err(ValidationError::Required);
                }
            }
            kind => {
                let text = submission.text(&self.name);
                for validator in &self.validators {
                    validator.check(&text)?;
                }
                if matches!(kind, FieldKind::Number) && text.trim().is_empty() {
                    return Ok(None);
                }
            }
        }
        self.kind.coerce(raw).map(Some)
    }
}
