//! Remote operations invoked from commit callbacks
//!
//! These calls are opaque to the form pipeline: they block the request that
//! makes them and are never retried here.

use crate::Result;
use serde::{Deserialize, Serialize};

/// Answer of the registration server for a queried email address
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistrationStatus {
    pub success: bool,
    pub response: String,
}

/// Side-effecting operations outside the configuration store
pub trait RemoteOps: Send + Sync {
    /// Ask the updater to check for (and install) updates
    fn check_updates(&self) -> Result<()>;

    /// Look up registration state of the router for `email`
    fn registration_status(&self, email: &str, lang: &str) -> Result<RegistrationStatus>;

    /// Restart the device
    fn reboot(&self) -> Result<()>;
}
