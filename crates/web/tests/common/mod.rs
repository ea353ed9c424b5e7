#![allow(dead_code)]

use foris_common::{
    ConfigStore, ConfigTree, Error, Filter, MemoryStore, RegistrationStatus, RemoteOps, Result,
    Uci,
};
use foris_web::PageContext;
use parking_lot::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

/// Remote double recording every call
#[derive(Default)]
pub struct RecordingRemote {
    pub fail_updates: bool,
    pub registration: Option<RegistrationStatus>,
    update_checks: AtomicUsize,
    reboots: AtomicUsize,
    lookups: Mutex<Vec<(String, String)>>,
}

impl RecordingRemote {
    pub fn failing_updates() -> Self {
        Self {
            fail_updates: true,
            ..Default::default()
        }
    }

    pub fn registered(response: &str) -> Self {
        Self {
            registration: Some(RegistrationStatus {
                success: true,
                response: response.to_string(),
            }),
            ..Default::default()
        }
    }

    pub fn update_checks(&self) -> usize {
        self.update_checks.load(Ordering::SeqCst)
    }

    pub fn reboots(&self) -> usize {
        self.reboots.load(Ordering::SeqCst)
    }

    pub fn lookups(&self) -> Vec<(String, String)> {
        self.lookups.lock().clone()
    }
}

impl RemoteOps for RecordingRemote {
    fn check_updates(&self) -> Result<()> {
        self.update_checks.fetch_add(1, Ordering::SeqCst);
        if self.fail_updates {
            return Err(Error::Remote("updater exited with status 1".to_string()));
        }
        Ok(())
    }

    fn registration_status(&self, email: &str, lang: &str) -> Result<RegistrationStatus> {
        self.lookups.lock().push((email.to_string(), lang.to_string()));
        self.registration
            .clone()
            .ok_or_else(|| Error::Remote("registration server unreachable".to_string()))
    }

    fn reboot(&self) -> Result<()> {
        self.reboots.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

/// Store wrapper counting applied mutation trees
#[derive(Default)]
pub struct RecordingStore {
    inner: MemoryStore,
    applied: Mutex<Vec<Uci>>,
    pub fail_apply: bool,
}

impl RecordingStore {
    pub fn with_tree(tree: ConfigTree) -> Self {
        Self {
            inner: MemoryStore::new(tree),
            ..Default::default()
        }
    }

    pub fn failing() -> Self {
        Self {
            fail_apply: true,
            ..Default::default()
        }
    }

    pub fn applied(&self) -> Vec<Uci> {
        self.applied.lock().clone()
    }

    pub fn snapshot(&self) -> ConfigTree {
        self.inner.snapshot()
    }

    /// Scalar content at `path`, if present
    pub fn value(&self, path: &str) -> Option<String> {
        self.snapshot().get(path).map(|entry| entry.content())
    }

    /// List contents at `path`, if present
    pub fn list(&self, path: &str) -> Option<Vec<String>> {
        self.snapshot()
            .get(path)
            .map(|entry| entry.children().into_iter().map(|v| v.content).collect())
    }
}

impl ConfigStore for RecordingStore {
    fn query(&self, filter: &Filter) -> Result<ConfigTree> {
        self.inner.query(filter)
    }

    fn apply(&self, uci: &Uci) -> Result<()> {
        if self.fail_apply {
            return Err(Error::Store("store is read-only".to_string()));
        }
        self.applied.lock().push(uci.clone());
        self.inner.apply(uci)
    }
}

pub fn context(store: &Arc<RecordingStore>, remote: &Arc<RecordingRemote>) -> PageContext {
    PageContext {
        store: store.clone(),
        remote: remote.clone(),
        lang: "cs".to_string(),
    }
}
