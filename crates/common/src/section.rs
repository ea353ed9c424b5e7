//! Ordered groups of fields

use crate::data::{FormData, Submission};
use crate::field::Field;
use crate::validators::ValidationError;
use crate::{Error, Result};
use serde::{Deserialize, Serialize};

/// Validation failure attached to one field
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldError {
    pub field: String,
    pub message: String,
    pub error: ValidationError,
}

impl FieldError {
    pub fn new(field: impl Into<String>, error: ValidationError) -> Self {
        Self {
            field: field.into(),
            message: error.to_string(),
            error,
        }
    }
}

/// Named group of fields presented together
#[derive(Debug)]
pub struct Section {
    pub name: String,
    pub title: String,
    pub description: Option<String>,
    fields: Vec<Field>,
}

impl Section {
    pub fn new(name: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            title: title.into(),
            description: None,
            fields: Vec::new(),
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn set_description(&mut self, description: impl Into<String>) -> &mut Self {
        self.description = Some(description.into());
        self
    }

    /// Append a field; names must be unique within the section
    pub fn add_field(&mut self, field: Field) -> Result<&mut Field> {
        if self.field(&field.name).is_some() {
            return Err(Error::Duplicate {
                kind: "field".to_string(),
                name: field.name,
            });
        }
        self.fields.push(field);
        let index = self.fields.len() - 1;
        Ok(&mut self.fields[index])
    }

    pub fn fields(&self) -> &[Field] {
        &self.fields
    }

    pub fn field(&self, name: &str) -> Option<&Field> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Validate every field accepted by `active`, collecting all failures
    pub fn validate<F>(&self, submission: &Submission, active: F) -> std::result::Result<FormData, Vec<FieldError>>
    where
        F: Fn(&Field) -> bool,
    {
        let mut data = FormData::new();
        let mut errors = Vec::new();
        for field in self.fields.iter().filter(|f| active(f)) {
            match field.validate(submission) {
                Ok(Some(value)) => data.insert(field.name.clone(), value),
                Ok(None) => {}
                Err(error) => errors.push(FieldError::new(&field.name, error)),
            }
        }
        if errors.is_empty() {
            Ok(data)
        } else {
            Err(errors)
        }
    }
}
