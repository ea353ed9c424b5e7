//! Wireless access point

use super::{ConfigPage, PageContext};
use foris_common::field::InvertedBoolSource;
use foris_common::uci::{self, Config, UciOption};
use foris_common::{
    CallbackResult, CommitContext, Field, FieldValue, Filter, Form, FormData, Result, Submission,
    Uci, Validator,
};

const RADIO: &str = "radio0";
const INTERFACE: &str = "wifi0";

/// Tree toggling the radio and, when enabled, configuring its access point
pub fn wifi_tree(data: &FormData) -> Uci {
    let enabled = data.get_bool("wifi_enabled");
    let mut tree = Uci::new();
    let wireless = tree.add(Config::new("wireless"));
    wireless
        .add(uci::Section::new(RADIO, "wifi-device"))
        .add(UciOption::boolean("disabled", !enabled));

    if enabled {
        let iface = wireless.add(uci::Section::new(INTERFACE, "wifi-iface"));
        iface.add(UciOption::new("device", RADIO));
        iface.add(UciOption::new("network", "lan"));
        iface.add(UciOption::new("mode", "ap"));
        iface.add(UciOption::new("encryption", "psk2+ccmp"));
        iface.add(UciOption::new("ssid", data.get_str("ssid").unwrap_or_default()));
        iface.add(UciOption::new("key", data.get_str("key").unwrap_or_default()));
    }
    tree
}

#[derive(Debug, Clone, Copy, Default)]
pub struct WifiPage;

impl ConfigPage for WifiPage {
    fn slug(&self) -> &'static str {
        "wifi"
    }

    fn title(&self) -> &'static str {
        "Wi-Fi"
    }

    fn build_form(&self, data: Option<Submission>, ctx: &PageContext) -> Result<Form> {
        let mut form = Form::new("wifi", data, Filter::configs(["wireless"]), ctx.store.as_ref())?;

        let section = form.add_section("wifi", "Wi-Fi")?;
        section.set_description(
            "If you want to use your router as a Wi-Fi access point, enable Wi-Fi here and \
             fill in an SSID (the name of the access point) and a corresponding password.",
        );
        section.add_field(
            Field::checkbox("wifi_enabled", "Enable Wi-Fi")
                .with_path("wireless.radio0.disabled")?
                .with_source(InvertedBoolSource),
        )?;
        section.add_field(
            Field::textbox("ssid", "SSID")
                .with_path("wireless.wifi0.ssid")?
                .required()
                .validator(Validator::ByteRangeLength { min: 1, max: 32 })
                .requires("wifi_enabled", FieldValue::Bool(true)),
        )?;
        section.add_field(
            Field::password("key", "Network password")
                .with_path("wireless.wifi0.key")?
                .required()
                .validator(Validator::ByteRangeLength { min: 8, max: 63 })
                .with_hint("WPA2 pre-shared key, that is required to connect to the network.")
                .requires("wifi_enabled", FieldValue::Bool(true)),
        )?;

        form.add_callback(|ctx: &CommitContext<'_>| Ok(CallbackResult::EditConfig(wifi_tree(ctx.data))));
        Ok(form)
    }
}
