//! WAN, DNS and LAN pages

use super::{ConfigPage, PageContext};
use foris_common::field::InvertedBoolSource;
use foris_common::uci::{self, uci_bool, Config, UciOption};
use foris_common::{
    CallbackResult, CommitContext, Field, FieldValue, Filter, Form, FormData, Result, Submission,
    Uci, Validator,
};

const STATIC_OPTIONS: [&str; 3] = ["ipaddr", "netmask", "gateway"];

/// Tree for the WAN interface; leaving static addressing drops its options
pub fn wan_tree(data: &FormData) -> Uci {
    let proto = data.get_str("proto").unwrap_or("dhcp");
    let mut tree = Uci::new();
    let wan = tree
        .add(Config::new("network"))
        .add(uci::Section::new("wan", "interface"));
    wan.add(UciOption::new("proto", proto));
    for name in STATIC_OPTIONS {
        match data.get_str(name) {
            Some(value) if proto == "static" => {
                wan.add(UciOption::new(name, value));
            }
            _ => {
                wan.add_removal(UciOption::new(name, ""));
            }
        }
    }
    tree
}

/// WAN addressing
#[derive(Debug, Clone, Copy, Default)]
pub struct WanPage;

impl ConfigPage for WanPage {
    fn slug(&self) -> &'static str {
        "wan"
    }

    fn title(&self) -> &'static str {
        "WAN"
    }

    fn build_form(&self, data: Option<Submission>, ctx: &PageContext) -> Result<Form> {
        let mut form = Form::new("wan", data, Filter::configs(["network"]), ctx.store.as_ref())?;

        let section = form.add_section("wan", "WAN")?;
        section.set_description(
            "Here you specify your WAN port settings. Usually, you can leave these options \
             untouched unless instructed otherwise by your internet service provider.",
        );
        section.add_field(
            Field::dropdown(
                "proto",
                "IPv4 protocol",
                [("dhcp", "DHCP (automatic configuration)"), ("static", "Static IP address")],
            )
            .with_path("network.wan.proto")?
            .with_default(FieldValue::text("dhcp"))
            .required(),
        )?;
        for (name, label) in [
            ("ipaddr", "IP address"),
            ("netmask", "Network mask"),
            ("gateway", "Gateway"),
        ] {
            section.add_field(
                Field::textbox(name, label)
                    .with_path(&format!("network.wan.{}", name))?
                    .required()
                    .validator(Validator::Ipv4)
                    .requires("proto", FieldValue::text("static")),
            )?;
        }

        form.add_callback(|ctx: &CommitContext<'_>| Ok(CallbackResult::EditConfig(wan_tree(ctx.data))));
        Ok(form)
    }
}

/// Forwarding of DNS queries to the upstream resolver
#[derive(Debug, Clone, Copy, Default)]
pub struct DnsPage;

impl ConfigPage for DnsPage {
    fn slug(&self) -> &'static str {
        "dns"
    }

    fn title(&self) -> &'static str {
        "DNS"
    }

    fn build_form(&self, data: Option<Submission>, ctx: &PageContext) -> Result<Form> {
        let mut form = Form::new("dns", data, Filter::configs(["unbound"]), ctx.store.as_ref())?;

        form.add_section("dns", "DNS")?.add_field(
            Field::checkbox("forward_upstream", "Use forwarding")
                .with_hint(
                    "Forward DNS queries to the resolver of your internet service provider \
                     instead of resolving them directly.",
                )
                .with_path("unbound.server.forward_upstream")?
                .with_default(FieldValue::Bool(true)),
        )?;

        form.add_callback(|ctx: &CommitContext<'_>| {
            let tree = Uci::option_at(
                "unbound.server.forward_upstream",
                "unbound",
                uci_bool(ctx.data.get_bool("forward_upstream")),
            )?;
            Ok(CallbackResult::EditConfig(tree))
        });
        Ok(form)
    }
}

/// Router LAN address and its DHCP server
#[derive(Debug, Clone, Copy, Default)]
pub struct LanPage;

impl ConfigPage for LanPage {
    fn slug(&self) -> &'static str {
        "lan"
    }

    fn title(&self) -> &'static str {
        "LAN"
    }

    fn build_form(&self, data: Option<Submission>, ctx: &PageContext) -> Result<Form> {
        let mut form = Form::new(
            "lan",
            data,
            Filter::configs(["network", "dhcp"]),
            ctx.store.as_ref(),
        )?;

        let section = form.add_section("lan", "LAN")?;
        section.add_field(
            Field::textbox("lan_ipaddr", "Router IP address")
                .with_path("network.lan.ipaddr")?
                .required()
                .validator(Validator::Ipv4)
                .with_hint("Router's IP address in inner network. Also defines the range of assigned IP addresses."),
        )?;
        // Stored inverted as `dhcp.lan.ignore`; absent means the server runs
        section.add_field(
            Field::checkbox("dhcp_enabled", "Enable DHCP")
                .with_path("dhcp.lan.ignore")?
                .with_source(InvertedBoolSource)
                .with_default(FieldValue::Bool(true)),
        )?;

        form.add_callback(|ctx: &CommitContext<'_>| {
            let data = ctx.data;
            let mut tree = Uci::new();
            tree.add(Config::new("network"))
                .add(uci::Section::new("lan", "interface"))
                .add(UciOption::new(
                    "ipaddr",
                    data.get_str("lan_ipaddr").unwrap_or_default(),
                ));
            tree.add(Config::new("dhcp"))
                .add(uci::Section::new("lan", "dhcp"))
                .add(UciOption::boolean("ignore", !data.get_bool("dhcp_enabled")));
            Ok(CallbackResult::EditConfig(tree))
        });
        Ok(form)
    }
}
