//! Foris Common Library
//!
//! Declarative forms bound to the router configuration store: fields,
//! validation, mutation trees and the commit pipeline that turns a valid
//! submission into one atomic configuration change.

pub mod data;
pub mod error;
pub mod field;
pub mod filter;
pub mod form;
pub mod path;
pub mod remote;
pub mod section;
pub mod store;
pub mod tree;
pub mod uci;
pub mod validators;

// Re-export commonly used types
pub use data::{FieldValue, FormData, Submission};
pub use error::{Error, Result};
pub use field::{Field, FieldKind};
pub use filter::Filter;
pub use form::{
    fold_callbacks, CallbackResult, CommitCallback, CommitContext, Form, FormState, FormValidator,
    FormView, Outcome,
};
pub use path::ConfigPath;
pub use remote::{RegistrationStatus, RemoteOps};
pub use section::{FieldError, Section};
pub use store::{ConfigStore, MemoryStore};
pub use tree::ConfigTree;
pub use uci::Uci;
pub use validators::{ValidationError, Validator};

/// Foris version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
