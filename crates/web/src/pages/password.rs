//! Administration password

use super::{ConfigPage, PageContext};
use foris_common::{
    CallbackResult, CommitContext, Error, Field, Filter, Form, FormValidator, Result, Submission,
    Uci, Validator,
};
use sha2::{Digest, Sha256};

/// Stored form of a password
pub fn hash_password(password: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(password.as_bytes());
    hex::encode(hasher.finalize())
}

#[derive(Debug, Clone, Copy, Default)]
pub struct PasswordPage;

impl ConfigPage for PasswordPage {
    fn slug(&self) -> &'static str {
        "password"
    }

    fn title(&self) -> &'static str {
        "Password"
    }

    fn build_form(&self, data: Option<Submission>, ctx: &PageContext) -> Result<Form> {
        let mut form = Form::new("password", data, Filter::configs(["foris"]), ctx.store.as_ref())?;

        let section = form.add_section("password", "Password")?;
        section.set_description("Set your password for this administration interface.");
        section.add_field(
            Field::password("password", "Password")
                .required()
                .validator(Validator::ByteRangeLength { min: 6, max: 128 }),
        )?;
        section.add_field(Field::password("password_validation", "Password (repeat)").required())?;
        form.add_validator(FormValidator::equal_fields(
            "password",
            "password_validation",
            "Passwords are not equal.",
        ));

        form.add_callback(|ctx: &CommitContext<'_>| {
            let password = ctx
                .data
                .get_str("password")
                .ok_or_else(|| Error::Callback("validated password missing".to_string()))?;
            let tree = Uci::option_at("foris.auth.password", "config", hash_password(password))?;
            Ok(CallbackResult::EditConfig(tree))
        });
        Ok(form)
    }
}
