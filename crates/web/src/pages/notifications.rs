//! Email notifications through the Turris SMTP relay or a custom server

use super::{ConfigPage, PageContext};
use foris_common::uci::{self, Config, UciOption};
use foris_common::{
    CallbackResult, CommitContext, Field, FieldValue, Filter, Form, FormData, Result, Submission,
    Uci, Validator,
};

pub fn smtp_tree(data: &FormData) -> Uci {
    let mut tree = Uci::new();
    let smtp = tree
        .add(Config::new("user_notify"))
        .add(uci::Section::new("smtp", "smtp"));

    let enabled = data.get_bool("enable_smtp");
    smtp.add(UciOption::boolean("enable", enabled));
    if !enabled {
        return tree;
    }

    let turris = data.get_bool("use_turris_smtp");
    smtp.add(UciOption::boolean("use_turris_smtp", turris));
    let mut fields = vec!["to"];
    if turris {
        fields.push("sender_name");
    } else {
        fields.extend(["server", "port", "from"]);
    }
    for name in fields {
        if let Some(value) = data.get(name) {
            smtp.add(UciOption::new(name, value.to_store_string()));
        }
    }
    tree
}

#[derive(Debug, Clone, Copy, Default)]
pub struct NotificationsPage;

impl ConfigPage for NotificationsPage {
    fn slug(&self) -> &'static str {
        "notifications"
    }

    fn title(&self) -> &'static str {
        "Notifications"
    }

    fn build_form(&self, data: Option<Submission>, ctx: &PageContext) -> Result<Form> {
        let mut form = Form::new(
            "notifications",
            data,
            Filter::configs(["user_notify"]),
            ctx.store.as_ref(),
        )?;
        let custom = FieldValue::Bool(false);
        let turris = FieldValue::Bool(true);

        let section = form.add_section("notifications", "Email notifications")?;
        section.add_field(
            Field::checkbox("enable_smtp", "Send emails")
                .with_path("user_notify.smtp.enable")?
                .with_hint(
                    "Enable this option to receive notifications and reports from the router \
                     by email.",
                ),
        )?;
        section.add_field(
            Field::checkbox("use_turris_smtp", "Use Turris SMTP")
                .with_path("user_notify.smtp.use_turris_smtp")?
                .with_default(turris.clone())
                .requires("enable_smtp", FieldValue::Bool(true)),
        )?;
        section.add_field(
            Field::email("to", "Recipient's email")
                .with_path("user_notify.smtp.to")?
                .required()
                .requires("enable_smtp", FieldValue::Bool(true)),
        )?;
        section.add_field(
            Field::textbox("sender_name", "Sender's name")
                .with_path("user_notify.smtp.sender_name")?
                .with_default(FieldValue::text("turris"))
                .with_hint("Name of the sender - will be used as a part of the sender's email address before the \"at\" sign.")
                .requires("use_turris_smtp", turris),
        )?;
        section.add_field(
            Field::textbox("server", "Server address")
                .with_path("user_notify.smtp.server")?
                .required()
                .requires("use_turris_smtp", custom.clone()),
        )?;
        section.add_field(
            Field::number("port", "Server port")
                .with_path("user_notify.smtp.port")?
                .validator(Validator::IntRange { min: 1, max: 65535 })
                .requires("use_turris_smtp", custom.clone()),
        )?;
        section.add_field(
            Field::email("from", "Sender's email")
                .with_path("user_notify.smtp.from")?
                .required()
                .requires("use_turris_smtp", custom),
        )?;

        form.add_callback(|ctx: &CommitContext<'_>| Ok(CallbackResult::EditConfig(smtp_tree(ctx.data))));
        Ok(form)
    }
}
