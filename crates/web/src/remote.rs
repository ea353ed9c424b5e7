//! Remote operations backed by local commands and the registration server

use crate::config::RemoteConfig;
use foris_common::{Error, RegistrationStatus, RemoteOps, Result};
use std::process::Command;
use std::time::Duration;
use tracing::{debug, info};

/// [`RemoteOps`] running on the router itself
///
/// Every call blocks; callers on an async runtime must go through
/// `spawn_blocking`.
#[derive(Debug, Clone)]
pub struct SystemRemote {
    config: RemoteConfig,
}

impl SystemRemote {
    pub fn new(config: RemoteConfig) -> Self {
        Self { config }
    }

    fn run(&self, label: &str, command: &str) -> Result<()> {
        debug!("Running {} command: {}", label, command);
        let output = Command::new("sh")
            .arg("-c")
            .arg(command)
            .output()
            .map_err(|e| Error::Remote(format!("{}: failed to spawn: {}", label, e)))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(Error::Remote(format!(
                "{} exited with {}: {}",
                label,
                output.status,
                stderr.trim()
            )));
        }
        Ok(())
    }
}

impl RemoteOps for SystemRemote {
    fn check_updates(&self) -> Result<()> {
        info!("Checking for updates");
        self.run("updater", &self.config.updater_command)
    }

    fn registration_status(&self, email: &str, lang: &str) -> Result<RegistrationStatus> {
        // Built per call: the blocking client must not outlive the worker thread
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(self.config.timeout_secs))
            .build()
            .map_err(|e| Error::Remote(format!("registration client: {}", e)))?;

        let response = client
            .get(&self.config.registration_url)
            .query(&[("email", email), ("lang", lang)])
            .send()
            .map_err(|e| Error::Remote(format!("registration lookup: {}", e)))?;

        let success = response.status().is_success();
        let body = response
            .text()
            .map_err(|e| Error::Remote(format!("registration response: {}", e)))?;
        debug!(success, "Registration lookup finished");

        Ok(RegistrationStatus {
            success,
            response: body,
        })
    }

    fn reboot(&self) -> Result<()> {
        info!("Rebooting device");
        self.run("reboot", &self.config.reboot_command)
    }
}
