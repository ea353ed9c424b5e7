//! Foris Web Interface
//!
//! HTTP surface of the router administration forms, plus backup, restore and
//! reboot maintenance actions.

pub mod config;
pub mod maintenance;
pub mod pages;
pub mod remote;
pub mod server;

pub use config::WebConfig;
pub use pages::{ConfigPage, PageContext, PageRegistry};
pub use remote::SystemRemote;
pub use server::WebServer;
