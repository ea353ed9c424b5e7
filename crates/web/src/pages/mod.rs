//! Configuration pages
//!
//! A page describes one form: its sections, fields and commit callbacks.
//! Pages are stateless; a fresh [`Form`] is built for every request.

mod collect;
mod network;
mod notifications;
mod password;
mod wifi;

pub use collect::{
    installed_lists, ucollect_tree, CollectionTogglePage, RegistrationCheckPage, UcollectPage,
    DATACOLLECT_LIST, SERVICES,
};
pub use network::{DnsPage, LanPage, WanPage};
pub use notifications::NotificationsPage;
pub use password::{hash_password, PasswordPage};
pub use wifi::WifiPage;

use foris_common::{ConfigStore, Form, RemoteOps, Result, Submission};
use serde::Serialize;
use std::sync::Arc;

/// Collaborators available while building a page's form
#[derive(Clone)]
pub struct PageContext {
    pub store: Arc<dyn ConfigStore>,
    pub remote: Arc<dyn RemoteOps>,
    pub lang: String,
}

/// One configuration page
pub trait ConfigPage: Send + Sync {
    /// URL segment under `/config/`
    fn slug(&self) -> &'static str;

    fn title(&self) -> &'static str;

    /// Build the page's form; `data` is `None` when only displaying
    fn build_form(&self, data: Option<Submission>, ctx: &PageContext) -> Result<Form>;
}

/// Summary shown in the page list
#[derive(Debug, Clone, Serialize)]
pub struct PageInfo {
    pub slug: &'static str,
    pub title: &'static str,
}

/// Ordered set of pages served by the interface
pub struct PageRegistry {
    pages: Vec<Box<dyn ConfigPage>>,
}

impl PageRegistry {
    pub fn new() -> Self {
        Self { pages: Vec::new() }
    }

    pub fn register(&mut self, page: impl ConfigPage + 'static) -> &mut Self {
        self.pages.push(Box::new(page));
        self
    }

    pub fn get(&self, slug: &str) -> Option<&dyn ConfigPage> {
        self.pages
            .iter()
            .find(|page| page.slug() == slug)
            .map(|page| page.as_ref())
    }

    pub fn list(&self) -> Vec<PageInfo> {
        self.pages
            .iter()
            .map(|page| PageInfo {
                slug: page.slug(),
                title: page.title(),
            })
            .collect()
    }
}

impl Default for PageRegistry {
    /// Every page of the administration interface
    fn default() -> Self {
        let mut registry = Self::new();
        registry
            .register(WanPage)
            .register(DnsPage)
            .register(LanPage)
            .register(WifiPage)
            .register(NotificationsPage)
            .register(PasswordPage)
            .register(UcollectPage)
            .register(CollectionTogglePage)
            .register(RegistrationCheckPage);
        registry
    }
}
