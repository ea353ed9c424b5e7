//! Data collection pages: emulated services, the collection toggle and the
//! registration lookup

use super::{ConfigPage, PageContext};
use foris_common::field::ComplementSource;
use foris_common::uci::{self, uci_bool, Config, UciList, UciOption};
use foris_common::{
    CallbackResult, CommitContext, Field, FieldValue, Filter, Form, FormData, Result, Submission,
    Uci,
};
use serde_json::json;
use tracing::{debug, warn};

/// Services ucollect can emulate, in presentation order
pub const SERVICES: [(&str, &str); 6] = [
    ("23tcp", "Telnet (23/TCP)"),
    ("2323tcp", "Telnet - alternative port (2323/TCP)"),
    ("80tcp", "HTTP (80/TCP)"),
    ("3128tcp", "Squid HTTP proxy (3128/TCP)"),
    ("8123tcp", "Polipo HTTP proxy (8123/TCP)"),
    ("8080tcp", "HTTP proxy (8080/TCP)"),
];

const AGREEMENT_PREFIX: &str = "i_agree_";

/// Package list installed when the user agrees with data collection
pub const DATACOLLECT_LIST: &str = "i_agree_datacollect";

fn service_keys() -> impl Iterator<Item = &'static str> {
    SERVICES.iter().map(|(key, _)| *key)
}

/// Tree disabling every service not enabled in `data`
pub fn ucollect_tree(data: &FormData) -> Uci {
    let enabled = data.get_list("services");
    let disabled = service_keys().filter(|key| !enabled.iter().any(|e| e == key));
    let disable = UciList::from_values("disable", disabled);

    let mut tree = Uci::new();
    let fakes = tree
        .add(Config::new("ucollect"))
        .add(uci::Section::new("fakes", "fakes"));
    if disable.is_empty() {
        fakes.add_removal(disable);
    } else {
        fakes.add_replace(disable);
    }
    fakes.add(UciOption::boolean(
        "log_credentials",
        data.get_bool("log_credentials"),
    ));
    tree
}

/// Package lists to install given the currently enabled ones
///
/// Lists not requiring agreement are always kept. Agreement lists are kept
/// only with collection enabled, in which case the data collection list is
/// appended if missing.
pub fn installed_lists(enabled: &[String], collect: bool) -> Vec<String> {
    let (agreement, mut installed): (Vec<String>, Vec<String>) = enabled
        .iter()
        .cloned()
        .partition(|name| name.starts_with(AGREEMENT_PREFIX));

    if collect {
        installed.extend(agreement);
        if !installed.iter().any(|name| name == DATACOLLECT_LIST) {
            installed.push(DATACOLLECT_LIST.to_string());
        }
    }
    installed
}

/// Emulated services of the ucollect honeypot
#[derive(Debug, Clone, Copy, Default)]
pub struct UcollectPage;

impl ConfigPage for UcollectPage {
    fn slug(&self) -> &'static str {
        "ucollect"
    }

    fn title(&self) -> &'static str {
        "uCollect"
    }

    fn build_form(&self, data: Option<Submission>, ctx: &PageContext) -> Result<Form> {
        let mut form = Form::new(
            "ucollect",
            data,
            Filter::configs(["ucollect"]),
            ctx.store.as_ref(),
        )?;

        let fakes = form.add_section("fakes", "Emulated services")?;
        fakes.set_description(
            "One of uCollect's features is emulation of some commonly abused services. \
             If this function is enabled, uCollect is listening for incoming connection \
             attempts to these services. Enabling of the emulated services has no effect \
             if another service is already listening on its default port (port numbers \
             are listed below).",
        );
        fakes.add_field(
            Field::multi_checkbox("services", "Emulated services", SERVICES)
                .with_path("uci.ucollect.fakes.disable")?
                .with_source(ComplementSource::new(service_keys()))
                .with_default(FieldValue::list(service_keys())),
        )?;
        fakes.add_field(
            Field::checkbox("log_credentials", "Collect credentials")
                .with_hint(
                    "If this option is enabled, user names and passwords are collected and \
                     sent to server in addition to the IP address of the client.",
                )
                .with_path("uci.ucollect.fakes.log_credentials")?,
        )?;

        form.add_callback(|ctx: &CommitContext<'_>| {
            Ok(CallbackResult::EditConfig(ucollect_tree(ctx.data)))
        });
        Ok(form)
    }
}

/// Agreement with data collection and the matching updater package lists
#[derive(Debug, Clone, Copy, Default)]
pub struct CollectionTogglePage;

impl ConfigPage for CollectionTogglePage {
    fn slug(&self) -> &'static str {
        "collection-toggle"
    }

    fn title(&self) -> &'static str {
        "Data collection"
    }

    fn build_form(&self, data: Option<Submission>, ctx: &PageContext) -> Result<Form> {
        let mut form = Form::new(
            "enable_collection",
            data,
            Filter::configs(["foris", "updater"]),
            ctx.store.as_ref(),
        )?;

        form.add_section("collection_toggle", self.title())?
            .add_field(
                Field::checkbox("enable", "Enable data collection")
                    .with_path("uci.foris.eula.agreed_collect")?,
            )?;

        form.add_callback(|ctx: &CommitContext<'_>| {
            let tree = Uci::option_at(
                "foris.eula.agreed_collect",
                "config",
                uci_bool(ctx.data.get_bool("enable")),
            )?;
            Ok(CallbackResult::EditConfig(tree))
        });

        // Reads the snapshot taken before this submission
        form.add_callback(|ctx: &CommitContext<'_>| {
            let enabled: Vec<String> = ctx
                .snapshot
                .get("updater.pkglists.lists")
                .map(|entry| entry.children().into_iter().map(|v| v.content).collect())
                .unwrap_or_default();
            let installed = installed_lists(&enabled, ctx.data.get_bool("enable"));
            debug!(?enabled, ?installed, "Recomputed updater package lists");

            let lists = UciList::from_values("lists", installed);
            let mut tree = Uci::new();
            let pkglists = tree
                .add(Config::new("updater"))
                .add(uci::Section::new("pkglists", "pkglists"));
            if lists.is_empty() {
                pkglists.add_removal(lists);
            } else {
                pkglists.add_replace(lists);
            }
            Ok(CallbackResult::EditConfig(tree))
        });

        let remote = ctx.remote.clone();
        form.add_callback(move |_: &CommitContext<'_>| {
            remote.check_updates()?;
            Ok(CallbackResult::None)
        });
        Ok(form)
    }
}

/// Registration state lookup for an email address
#[derive(Debug, Clone, Copy, Default)]
pub struct RegistrationCheckPage;

impl ConfigPage for RegistrationCheckPage {
    fn slug(&self) -> &'static str {
        "registration-check"
    }

    fn title(&self) -> &'static str {
        "Data collection"
    }

    fn build_form(&self, data: Option<Submission>, ctx: &PageContext) -> Result<Form> {
        let mut form = Form::new(
            "registration_check",
            data,
            Filter::configs(["foris"]),
            ctx.store.as_ref(),
        )?;

        form.add_section("check_email", self.title())?
            .add_field(Field::email("email", "Email").required())?;

        let remote = ctx.remote.clone();
        let lang = ctx.lang.clone();
        form.add_callback(move |ctx: &CommitContext<'_>| {
            let email = ctx.data.get_str("email").unwrap_or_default();
            let payload = match remote.registration_status(email, &lang) {
                Ok(status) => json!({
                    "success": status.success,
                    "response": status.response,
                }),
                Err(e) => {
                    warn!("Registration lookup failed: {}", e);
                    json!({
                        "success": false,
                        "response": e.to_string(),
                    })
                }
            };
            Ok(CallbackResult::SaveResult(payload))
        });
        Ok(form)
    }
}
