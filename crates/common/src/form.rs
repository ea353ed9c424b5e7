//! Form lifecycle and the commit callback fold
//!
//! A form is built once per request. Its store query runs at construction.
//! Without a submission it only renders. With one it walks
//! `Unsubmitted -> Validating -> {Invalid, Committing} -> Done`:
//! every active field is validated, then the commit callbacks run in
//! registration order. Mutation trees returned by callbacks are merged into
//! one accumulated tree, applied to the store only after every callback has
//! returned successfully.

use crate::data::{FieldValue, FormData, Submission};
use crate::field::{Choice, Field};
use crate::section::{FieldError, Section};
use crate::store::ConfigStore;
use crate::validators::ValidationError;
use crate::{ConfigTree, Error, Filter, Result, Uci};
use serde::Serialize;
use std::collections::{BTreeMap, HashSet};
use tracing::{debug, info, warn};

// ============================================================================
// Callbacks
// ============================================================================

/// What a commit callback asks the form to do next
#[derive(Debug, Clone, PartialEq)]
pub enum CallbackResult {
    /// Merge this tree into the accumulated mutation
    EditConfig(Uci),
    /// Nothing to write; continue with the next callback
    None,
    /// Stop here and report `payload` to the user
    SaveResult(serde_json::Value),
}

/// Inputs visible to a commit callback
///
/// `snapshot` is the store state read when the form was built. Callbacks never
/// see each other's mutations.
#[derive(Debug, Clone, Copy)]
pub struct CommitContext<'a> {
    pub data: &'a FormData,
    pub snapshot: &'a ConfigTree,
}

/// Step executed once a submission validated
pub trait CommitCallback: Send + Sync {
    fn call(&self, ctx: &CommitContext<'_>) -> Result<CallbackResult>;
}

impl<F> CommitCallback for F
where
    F: Fn(&CommitContext<'_>) -> Result<CallbackResult> + Send + Sync,
{
    fn call(&self, ctx: &CommitContext<'_>) -> Result<CallbackResult> {
        self(ctx)
    }
}

/// Final result of processing a form
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "tag", rename_all = "snake_case")]
pub enum Outcome {
    /// Display only, or every callback returned `None`
    None,
    FormInvalid { errors: Vec<FieldError> },
    EditConfig { tree: Uci },
    /// `tree` holds mutations queued by callbacks that ran before the reporting one
    SaveResult {
        payload: serde_json::Value,
        tree: Option<Uci>,
    },
    CallbackFailed { callback: usize, reason: String },
}

impl Outcome {
    pub fn tag(&self) -> &'static str {
        match self {
            Outcome::None => "none",
            Outcome::FormInvalid { .. } => "form_invalid",
            Outcome::EditConfig { .. } => "edit_config",
            Outcome::SaveResult { .. } => "save_result",
            Outcome::CallbackFailed { .. } => "callback_failed",
        }
    }

    /// Mutation to hand to the store, if any
    pub fn tree(&self) -> Option<&Uci> {
        match self {
            Outcome::EditConfig { tree } => Some(tree),
            Outcome::SaveResult { tree, .. } => tree.as_ref(),
            _ => None,
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(
            self,
            Outcome::None | Outcome::EditConfig { .. } | Outcome::SaveResult { .. }
        )
    }
}

/// Run callbacks in order, merging their trees; the first failure discards everything
pub fn fold_callbacks(callbacks: &[Box<dyn CommitCallback>], ctx: &CommitContext<'_>) -> Outcome {
    let mut accumulated = Uci::new();
    let mut edited = false;

    for (index, callback) in callbacks.iter().enumerate() {
        match callback.call(ctx) {
            Ok(CallbackResult::EditConfig(tree)) => {
                debug!(callback = index, "Callback queued configuration change");
                accumulated.merge(tree);
                edited = true;
            }
            Ok(CallbackResult::None) => {
                debug!(callback = index, "Callback made no configuration change");
            }
            Ok(CallbackResult::SaveResult(payload)) => {
                debug!(callback = index, "Callback reported a result");
                return Outcome::SaveResult {
                    payload,
                    tree: edited.then_some(accumulated),
                };
            }
            Err(e) => {
                warn!(callback = index, "Commit callback failed: {}", e);
                return Outcome::CallbackFailed {
                    callback: index,
                    reason: e.to_string(),
                };
            }
        }
    }

    if edited {
        Outcome::EditConfig { tree: accumulated }
    } else {
        Outcome::None
    }
}

// ============================================================================
// Form-level validation
// ============================================================================

/// Check spanning several fields
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormValidator {
    /// `other` must hold the same value as `field`; reported on `other`
    EqualFields {
        field: String,
        other: String,
        message: String,
    },
}

impl FormValidator {
    pub fn equal_fields(
        field: impl Into<String>,
        other: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        FormValidator::EqualFields {
            field: field.into(),
            other: other.into(),
            message: message.into(),
        }
    }

    fn referenced_fields(&self) -> [&str; 2] {
        match self {
            FormValidator::EqualFields { field, other, .. } => [field.as_str(), other.as_str()],
        }
    }

    fn check(&self, data: &FormData) -> Option<FieldError> {
        match self {
            FormValidator::EqualFields {
                field,
                other,
                message,
            } => {
                let (a, b) = (data.get(field)?, data.get(other)?);
                (a != b).then(|| {
                    FieldError::new(
                        other,
                        ValidationError::Mismatch {
                            message: message.clone(),
                        },
                    )
                })
            }
        }
    }
}

// ============================================================================
// Form
// ============================================================================

/// Lifecycle state of a form
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FormState {
    Unsubmitted,
    Validating,
    Invalid,
    Committing,
    Done,
}

impl std::fmt::Display for FormState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FormState::Unsubmitted => write!(f, "unsubmitted"),
            FormState::Validating => write!(f, "validating"),
            FormState::Invalid => write!(f, "invalid"),
            FormState::Committing => write!(f, "committing"),
            FormState::Done => write!(f, "done"),
        }
    }
}

/// Declarative form bound to a configuration store snapshot
pub struct Form {
    pub name: String,
    data: Option<Submission>,
    filter: Filter,
    snapshot: ConfigTree,
    sections: Vec<Section>,
    callbacks: Vec<Box<dyn CommitCallback>>,
    validators: Vec<FormValidator>,
    state: FormState,
    errors: Vec<FieldError>,
}

impl Form {
    /// Build a form and query the store once through `filter`
    pub fn new(
        name: impl Into<String>,
        data: Option<Submission>,
        filter: Filter,
        store: &dyn ConfigStore,
    ) -> Result<Self> {
        let snapshot = store.query(&filter)?;
        Ok(Self::from_snapshot(name, data, filter, snapshot))
    }

    /// Build a form over an already fetched snapshot
    pub fn from_snapshot(
        name: impl Into<String>,
        data: Option<Submission>,
        filter: Filter,
        snapshot: ConfigTree,
    ) -> Self {
        Self {
            name: name.into(),
            data,
            filter,
            snapshot,
            sections: Vec::new(),
            callbacks: Vec::new(),
            validators: Vec::new(),
            state: FormState::Unsubmitted,
            errors: Vec::new(),
        }
    }

    /// Append a section; names must be unique within the form
    pub fn add_section(&mut self, name: impl Into<String>, title: impl Into<String>) -> Result<&mut Section> {
        let name = name.into();
        if self.sections.iter().any(|s| s.name == name) {
            return Err(Error::Duplicate {
                kind: "section".to_string(),
                name,
            });
        }
        self.sections.push(Section::new(name, title));
        let index = self.sections.len() - 1;
        Ok(&mut self.sections[index])
    }

    pub fn add_callback<F>(&mut self, callback: F) -> &mut Self
    where
        F: Fn(&CommitContext<'_>) -> Result<CallbackResult> + Send + Sync + 'static,
    {
        self.callbacks.push(Box::new(callback));
        self
    }

    pub fn add_validator(&mut self, validator: FormValidator) -> &mut Self {
        self.validators.push(validator);
        self
    }

    pub fn sections(&self) -> &[Section] {
        &self.sections
    }

    pub fn fields(&self) -> impl Iterator<Item = &Field> {
        self.sections.iter().flat_map(|s| s.fields().iter())
    }

    pub fn field(&self, name: &str) -> Option<&Field> {
        self.fields().find(|f| f.name == name)
    }

    pub fn filter(&self) -> &Filter {
        &self.filter
    }

    /// Store state read at construction
    pub fn snapshot(&self) -> &ConfigTree {
        &self.snapshot
    }

    pub fn is_submitted(&self) -> bool {
        self.data.is_some()
    }

    pub fn state(&self) -> FormState {
        self.state
    }

    pub fn errors(&self) -> &[FieldError] {
        &self.errors
    }

    /// Values shown to the user: submitted ones after a submission, stored ones otherwise
    pub fn current_values(&self) -> BTreeMap<String, FieldValue> {
        self.fields()
            .map(|field| {
                let value = match &self.data {
                    Some(submission) => field.submitted_value(submission),
                    None => field.display_value(&self.snapshot),
                };
                (field.name.clone(), value)
            })
            .collect()
    }

    /// Names of fields whose requirements hold for `values`
    fn active_fields(&self, values: &BTreeMap<String, FieldValue>) -> HashSet<String> {
        let mut active = HashSet::new();
        for field in self.fields() {
            let enabled = match &field.requirement {
                None => true,
                Some(req) => {
                    active.contains(&req.field) && values.get(&req.field) == Some(&req.value)
                }
            };
            if enabled {
                active.insert(field.name.clone());
            }
        }
        active
    }

    /// Field names are unique across the form, requirements name earlier
    /// fields and validators name declared ones
    fn check_references(&self) -> Result<()> {
        let mut declared = HashSet::new();
        for field in self.fields() {
            if let Some(req) = &field.requirement {
                if !declared.contains(req.field.as_str()) {
                    return Err(Error::UnknownField(req.field.clone()));
                }
            }
            if !declared.insert(field.name.as_str()) {
                return Err(Error::Duplicate {
                    kind: "field".to_string(),
                    name: field.name.clone(),
                });
            }
        }
        for validator in &self.validators {
            if let Some(name) = validator
                .referenced_fields()
                .into_iter()
                .find(|name| !declared.contains(name))
            {
                return Err(Error::UnknownField(name.to_string()));
            }
        }
        Ok(())
    }

    fn transition(&mut self, to: FormState) -> Result<()> {
        let allowed = matches!(
            (self.state, to),
            (FormState::Unsubmitted, FormState::Validating)
                | (FormState::Validating, FormState::Invalid)
                | (FormState::Validating, FormState::Committing)
                | (FormState::Committing, FormState::Done)
        );
        if !allowed {
            return Err(Error::InvalidStateTransition {
                from: self.state.to_string(),
                to: to.to_string(),
            });
        }
        debug!(form = %self.name, "{} -> {}", self.state, to);
        self.state = to;
        Ok(())
    }

    /// Validate every active field across all sections, then form-level checks
    fn validate(&self, submission: &Submission) -> std::result::Result<FormData, Vec<FieldError>> {
        let active = self.active_fields(&self.current_values());
        let mut data = FormData::new();
        let mut errors = Vec::new();

        for section in &self.sections {
            match section.validate(submission, |f| active.contains(&f.name)) {
                Ok(values) => data.extend(values),
                Err(mut failed) => errors.append(&mut failed),
            }
        }
        if !errors.is_empty() {
            return Err(errors);
        }

        errors.extend(self.validators.iter().filter_map(|v| v.check(&data)));
        if errors.is_empty() {
            Ok(data)
        } else {
            Err(errors)
        }
    }

    /// Validate and run callbacks without touching the store
    pub fn process(&mut self) -> Result<Outcome> {
        let outcome = self.evaluate()?;
        if self.state == FormState::Committing {
            self.transition(FormState::Done)?;
        }
        Ok(outcome)
    }

    /// Validate, run callbacks and apply the accumulated tree once
    pub fn commit(&mut self, store: &dyn ConfigStore) -> Result<Outcome> {
        let outcome = self.evaluate()?;
        if self.state != FormState::Committing {
            return Ok(outcome);
        }
        if let Some(tree) = outcome.tree() {
            debug!(form = %self.name, "Applying accumulated mutation");
            store.apply(tree)?;
        }
        self.transition(FormState::Done)?;
        Ok(outcome)
    }

    fn evaluate(&mut self) -> Result<Outcome> {
        let Some(submission) = self.data.clone() else {
            if self.state != FormState::Unsubmitted {
                return Err(Error::InvalidStateTransition {
                    from: self.state.to_string(),
                    to: FormState::Validating.to_string(),
                });
            }
            return Ok(Outcome::None);
        };

        self.check_references()?;
        self.transition(FormState::Validating)?;
        let data = match self.validate(&submission) {
            Ok(data) => data,
            Err(errors) => {
                info!(form = %self.name, errors = errors.len(), "Form submission rejected");
                self.errors = errors.clone();
                self.transition(FormState::Invalid)?;
                return Ok(Outcome::FormInvalid { errors });
            }
        };

        self.transition(FormState::Committing)?;
        let ctx = CommitContext {
            data: &data,
            snapshot: &self.snapshot,
        };
        Ok(fold_callbacks(&self.callbacks, &ctx))
    }

    /// Serializable view for templates and JSON responses
    pub fn render(&self) -> FormView {
        let values = self.current_values();
        let active = self.active_fields(&values);
        let sections = self
            .sections
            .iter()
            .map(|section| SectionView {
                name: section.name.clone(),
                title: section.title.clone(),
                description: section.description.clone(),
                fields: section
                    .fields()
                    .iter()
                    .map(|field| FieldView {
                        name: field.name.clone(),
                        label: field.label.clone(),
                        hint: field.hint.clone(),
                        kind: field.kind.name(),
                        options: field.kind.options().to_vec(),
                        value: values
                            .get(&field.name)
                            .cloned()
                            .unwrap_or_else(|| field.kind.empty_value()),
                        active: active.contains(&field.name),
                        errors: self
                            .errors
                            .iter()
                            .filter(|e| e.field == field.name)
                            .map(|e| e.message.clone())
                            .collect(),
                    })
                    .collect(),
            })
            .collect();

        FormView {
            name: self.name.clone(),
            state: self.state,
            sections,
        }
    }
}

impl std::fmt::Debug for Form {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Form")
            .field("name", &self.name)
            .field("state", &self.state)
            .field("sections", &self.sections.len())
            .field("callbacks", &self.callbacks.len())
            .finish()
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct FormView {
    pub name: String,
    pub state: FormState,
    pub sections: Vec<SectionView>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SectionView {
    pub name: String,
    pub title: String,
    pub description: Option<String>,
    pub fields: Vec<FieldView>,
}

#[derive(Debug, Clone, Serialize)]
pub struct FieldView {
    pub name: String,
    pub label: String,
    pub hint: Option<String>,
    pub kind: &'static str,
    pub options: Vec<Choice>,
    pub value: FieldValue,
    pub active: bool,
    pub errors: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;
    use crate::uci::{Config, Section as UciSection, UciOption};
    use crate::validators::Validator;
    use parking_lot::Mutex;
    use std::sync::Arc;

    /// Store recording every tree it is asked to apply
    #[derive(Default)]
    struct RecordingStore {
        inner: MemoryStore,
        applied: Mutex<Vec<Uci>>,
    }

    impl ConfigStore for RecordingStore {
        fn query(&self, filter: &Filter) -> Result<ConfigTree> {
            self.inner.query(filter)
        }

        fn apply(&self, uci: &Uci) -> Result<()> {
            self.applied.lock().push(uci.clone());
            self.inner.apply(uci)
        }
    }

    fn option_tree(path: &str, value: &str) -> Uci {
        Uci::option_at(path, "config", value).unwrap()
    }

    fn toggle_form(data: Option<Submission>, calls: Arc<Mutex<Vec<usize>>>) -> Form {
        let mut form = Form::from_snapshot("toggle", data, Filter::all(), ConfigTree::new());
        form.add_section("main", "Main")
            .unwrap()
            .add_field(Field::checkbox("enable", "Enable"))
            .unwrap();
        for index in 0..3 {
            let calls = calls.clone();
            form.add_callback(move |_: &CommitContext<'_>| {
                calls.lock().push(index);
                Ok(CallbackResult::None)
            });
        }
        form
    }

    #[test]
    fn test_display_mode_never_runs_callbacks() {
        let calls = Arc::new(Mutex::new(Vec::new()));
        let mut form = toggle_form(None, calls.clone());
        let outcome = form.process().unwrap();
        assert_eq!(outcome, Outcome::None);
        assert_eq!(outcome.tag(), "none");
        assert_eq!(form.state(), FormState::Unsubmitted);
        assert!(calls.lock().is_empty());
    }

    #[test]
    fn test_callbacks_run_in_registration_order() {
        let calls = Arc::new(Mutex::new(Vec::new()));
        let mut form = toggle_form(Some(Submission::new().with("enable", "1")), calls.clone());
        let outcome = form.process().unwrap();
        assert_eq!(outcome, Outcome::None);
        assert_eq!(*calls.lock(), vec![0, 1, 2]);
        assert_eq!(form.state(), FormState::Done);
    }

    #[test]
    fn test_second_process_is_rejected() {
        let calls = Arc::new(Mutex::new(Vec::new()));
        let mut form = toggle_form(Some(Submission::new()), calls);
        form.process().unwrap();
        assert!(matches!(
            form.process(),
            Err(Error::InvalidStateTransition { .. })
        ));
    }

    #[test]
    fn test_invalid_submission_skips_callbacks() {
        let calls = Arc::new(Mutex::new(Vec::new()));
        let mut form = toggle_form(Some(Submission::new().with("ip", "1.2.3")), calls.clone());
        form.sections[0]
            .add_field(Field::email("email", "Email").required())
            .unwrap();
        form.sections[0]
            .add_field(Field::textbox("ip", "IP").validator(Validator::Ipv4))
            .unwrap();

        let outcome = form.process().unwrap();
        assert_eq!(outcome.tag(), "form_invalid");
        match outcome {
            Outcome::FormInvalid { errors } => assert_eq!(errors.len(), 2),
            other => panic!("unexpected outcome {:?}", other),
        }
        assert_eq!(form.state(), FormState::Invalid);
        assert!(calls.lock().is_empty());

        let view = form.render();
        let ip = &view.sections[0].fields[2];
        assert_eq!(ip.value, FieldValue::text("1.2.3"));
        assert_eq!(ip.errors, vec!["This is not a valid IPv4 address.".to_string()]);
    }

    #[test]
    fn test_failure_discards_earlier_mutations() {
        let store = RecordingStore::default();
        let mut form = Form::new(
            "three",
            Some(Submission::new()),
            Filter::all(),
            &store,
        )
        .unwrap();
        form.add_callback(|_: &CommitContext<'_>| {
            Ok(CallbackResult::EditConfig(option_tree("foris.eula.agreed_collect", "1")))
        });
        form.add_callback(|_: &CommitContext<'_>| -> Result<CallbackResult> {
            Err(Error::Remote("updater unreachable".to_string()))
        });
        form.add_callback(|_: &CommitContext<'_>| {
            Ok(CallbackResult::EditConfig(option_tree("foris.eula.agreed_updater", "1")))
        });

        let outcome = form.commit(&store).unwrap();
        assert_eq!(outcome.tag(), "callback_failed");
        assert!(matches!(outcome, Outcome::CallbackFailed { callback: 1, .. }));
        assert!(!outcome.is_success());
        assert!(store.applied.lock().is_empty());
    }

    #[test]
    fn test_mutations_applied_once_merged() {
        let store = RecordingStore::default();
        let mut form = Form::new("two", Some(Submission::new()), Filter::all(), &store).unwrap();
        form.add_callback(|_: &CommitContext<'_>| {
            Ok(CallbackResult::EditConfig(option_tree("foris.eula.agreed_collect", "1")))
        });
        form.add_callback(|_: &CommitContext<'_>| Ok(CallbackResult::None));
        form.add_callback(|_: &CommitContext<'_>| {
            let mut uci = Uci::new();
            uci.add(Config::new("unbound"))
                .add(UciSection::new("server", "unbound"))
                .add(UciOption::boolean("forward_upstream", false));
            Ok(CallbackResult::EditConfig(uci))
        });

        let outcome = form.commit(&store).unwrap();
        assert_eq!(outcome.tag(), "edit_config");
        let applied = store.applied.lock();
        assert_eq!(applied.len(), 1);
        assert!(applied[0].config("foris").is_some());
        assert!(applied[0].config("unbound").is_some());
    }

    #[test]
    fn test_save_result_stops_the_fold() {
        let reached = Arc::new(Mutex::new(false));
        let flag = reached.clone();
        let callbacks: Vec<Box<dyn CommitCallback>> = vec![
            Box::new(|_: &CommitContext<'_>| -> Result<CallbackResult> {
                Ok(CallbackResult::SaveResult(serde_json::json!({"success": true})))
            }),
            Box::new(move |_: &CommitContext<'_>| -> Result<CallbackResult> {
                *flag.lock() = true;
                Ok(CallbackResult::None)
            }),
        ];
        let data = FormData::new();
        let snapshot = ConfigTree::new();
        let outcome = fold_callbacks(
            &callbacks,
            &CommitContext {
                data: &data,
                snapshot: &snapshot,
            },
        );
        assert_eq!(
            outcome,
            Outcome::SaveResult {
                payload: serde_json::json!({"success": true}),
                tree: None
            }
        );
        assert!(!*reached.lock());
    }

    #[test]
    fn test_requirements_gate_validation() {
        let mut form = Form::from_snapshot(
            "smtp",
            Some(Submission::new().with("use_turris_smtp", "1").with("to", "a@b.cz")),
            Filter::all(),
            ConfigTree::new(),
        );
        let section = form.add_section("smtp", "SMTP").unwrap();
        section
            .add_field(Field::checkbox("use_turris_smtp", "Use Turris SMTP"))
            .unwrap();
        section
            .add_field(Field::email("to", "Recipient").required())
            .unwrap();
        section
            .add_field(
                Field::textbox("server", "Server")
                    .required()
                    .requires("use_turris_smtp", FieldValue::Bool(false)),
            )
            .unwrap();
        let captured = Arc::new(Mutex::new(None));
        let sink = captured.clone();
        form.add_callback(move |ctx: &CommitContext<'_>| {
            *sink.lock() = Some(ctx.data.clone());
            Ok(CallbackResult::None)
        });

        assert_eq!(form.process().unwrap(), Outcome::None);
        let data = captured.lock().clone().unwrap();
        assert!(data.contains("to"));
        assert!(!data.contains("server"));
    }

    #[test]
    fn test_equal_fields_validator() {
        let mut form = Form::from_snapshot(
            "password",
            Some(
                Submission::new()
                    .with("password", "123456")
                    .with("password_validation", "111111"),
            ),
            Filter::all(),
            ConfigTree::new(),
        );
        let section = form.add_section("password", "Password").unwrap();
        section.add_field(Field::password("password", "Password")).unwrap();
        section
            .add_field(Field::password("password_validation", "Password (repeat)"))
            .unwrap();
        form.add_validator(FormValidator::equal_fields(
            "password",
            "password_validation",
            "Passwords are not equal.",
        ));

        match form.process().unwrap() {
            Outcome::FormInvalid { errors } => {
                assert_eq!(errors.len(), 1);
                assert_eq!(errors[0].field, "password_validation");
                assert_eq!(errors[0].message, "Passwords are not equal.");
            }
            other => panic!("unexpected outcome {:?}", other),
        }
    }

    #[test]
    fn test_duplicate_section_rejected() {
        let mut form = Form::from_snapshot("f", None, Filter::all(), ConfigTree::new());
        form.add_section("main", "Main").unwrap();
        assert!(matches!(
            form.add_section("main", "Again"),
            Err(Error::Duplicate { .. })
        ));
    }

    #[test]
    fn test_requirement_on_undeclared_field_fails() {
        let mut form = Form::from_snapshot(
            "f",
            Some(Submission::new().with("port", "25")),
            Filter::all(),
            ConfigTree::new(),
        );
        form.add_section("main", "Main")
            .unwrap()
            .add_field(Field::number("port", "Port").requires("custom", FieldValue::Bool(true)))
            .unwrap();
        assert!(matches!(form.process(), Err(Error::UnknownField(name)) if name == "custom"));
    }

    #[test]
    fn test_field_name_shared_across_sections_rejected() {
        let mut form = Form::from_snapshot(
            "f",
            Some(Submission::new().with("port", "25")),
            Filter::all(),
            ConfigTree::new(),
        );
        form.add_section("smtp", "SMTP")
            .unwrap()
            .add_field(Field::number("port", "Port"))
            .unwrap();
        form.add_section("relay", "Relay")
            .unwrap()
            .add_field(Field::number("port", "Port"))
            .unwrap();
        assert!(matches!(
            form.process(),
            Err(Error::Duplicate { name, .. }) if name == "port"
        ));
        assert_eq!(form.state(), FormState::Unsubmitted);
    }
}
