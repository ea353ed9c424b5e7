//! Field validation rules
//!
//! Rules operate on the raw submitted text. Empty optional values are
//! accepted by every rule except [`Validator::Required`].

use ipnetwork::Ipv6Network;
use once_cell::sync::Lazy;
use regex_lite::Regex;
use serde::{Deserialize, Serialize};
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};
use thiserror::Error;

static MAC_ADDRESS: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^([0-9A-Fa-f]{2}:){5}[0-9A-Fa-f]{2}$").expect("valid MAC address pattern")
});

// WHATWG "valid e-mail address" grammar
static EMAIL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"^[a-zA-Z0-9.!#$%&'*+/=?^_`{|}~-]+@[a-zA-Z0-9](?:[a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?(?:\.[a-zA-Z0-9](?:[a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?)*$",
    )
    .expect("valid email pattern")
});

/// Field-level validation failure
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "code", rename_all = "snake_case")]
pub enum ValidationError {
    #[error("This field is required.")]
    Required,

    #[error("This is not a valid email address.")]
    MalformedEmail,

    #[error("'{value}' is not one of the available choices.")]
    InvalidChoice { value: String },

    #[error("This is not a valid IPv4 address.")]
    InvalidIpv4,

    #[error("This is not a valid IPv6 address.")]
    InvalidIpv6,

    #[error("This is not a valid IPv4 or IPv6 address.")]
    InvalidIp,

    #[error("This is not a valid IPv6 prefix.")]
    InvalidIpv6Prefix,

    #[error("This is not a valid MAC address.")]
    InvalidMacAddress,

    #[error("This value length is invalid. It should be between {min} and {max} characters long.")]
    Length { min: usize, max: usize },

    #[error("This value must be a whole number.")]
    NotInteger,

    #[error("This value must be between {min} and {max}.")]
    OutOfRange { min: i64, max: i64 },

    #[error("{message}")]
    Mismatch { message: String },
}

/// Rule attachable to a field
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Validator {
    Required,
    Ipv4,
    Ipv6,
    AnyIp,
    Ipv6Prefix,
    MacAddress,
    ByteRangeLength { min: usize, max: usize },
    IntRange { min: i64, max: i64 },
}

impl Validator {
    pub fn check(&self, value: &str) -> Result<(), ValidationError> {
        if value.is_empty() {
            return match self {
                Validator::Required => Err(ValidationError::Required),
                _ => Ok(()),
            };
        }
        match self {
            Validator::Required => Ok(()),
            Validator::Ipv4 => value
                .parse::<Ipv4Addr>()
                .map(|_| ())
                .map_err(|_| ValidationError::InvalidIpv4),
            Validator::Ipv6 => value
                .parse::<Ipv6Addr>()
                .map(|_| ())
                .map_err(|_| ValidationError::InvalidIpv6),
            Validator::AnyIp => value
                .parse::<IpAddr>()
                .map(|_| ())
                .map_err(|_| ValidationError::InvalidIp),
            Validator::Ipv6Prefix => check_ipv6_prefix(value),
            Validator::MacAddress => {
                if MAC_ADDRESS.is_match(value) {
                    Ok(())
                } else {
                    Err(ValidationError::InvalidMacAddress)
                }
            }
            Validator::ByteRangeLength { min, max } => {
                let len = value.len();
                if len >= *min && len <= *max {
                    Ok(())
                } else {
                    Err(ValidationError::Length {
                        min: *min,
                        max: *max,
                    })
                }
            }
            Validator::IntRange { min, max } => {
                let number: i64 = value
                    .trim()
                    .parse()
                    .map_err(|_| ValidationError::NotInteger)?;
                if number >= *min && number <= *max {
                    Ok(())
                } else {
                    Err(ValidationError::OutOfRange {
                        min: *min,
                        max: *max,
                    })
                }
            }
        }
    }
}

/// Prefix must be written explicitly as `address/length`
fn check_ipv6_prefix(value: &str) -> Result<(), ValidationError> {
    if !value.contains('/') {
        return Err(ValidationError::InvalidIpv6Prefix);
    }
    value
        .parse::<Ipv6Network>()
        .map(|_| ())
        .map_err(|_| ValidationError::InvalidIpv6Prefix)
}

/// Validate an email address
pub fn check_email(value: &str) -> Result<(), ValidationError> {
    if EMAIL.is_match(value) {
        Ok(())
    } else {
        Err(ValidationError::MalformedEmail)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_required() {
        assert_eq!(Validator::Required.check(""), Err(ValidationError::Required));
        assert!(Validator::Required.check("x").is_ok());
        // optional rules accept empty input
        assert!(Validator::Ipv4.check("").is_ok());
    }

    #[test]
    fn test_ip_rules() {
        assert!(Validator::Ipv4.check("192.168.1.2").is_ok());
        assert_eq!(
            Validator::Ipv4.check("192.168.1."),
            Err(ValidationError::InvalidIpv4)
        );
        assert_eq!(
            Validator::Ipv4.check("256.1.1.1"),
            Err(ValidationError::InvalidIpv4)
        );
        assert!(Validator::Ipv6.check("2001:db8::1").is_ok());
        assert!(Validator::Ipv6.check("10.0.0.1").is_err());
        assert!(Validator::AnyIp.check("10.0.0.1").is_ok());
        assert!(Validator::AnyIp.check("::1").is_ok());
        assert_eq!(
            Validator::AnyIp.check("router"),
            Err(ValidationError::InvalidIp)
        );
    }

    #[test]
    fn test_ipv6_prefix() {
        assert!(Validator::Ipv6Prefix.check("2001:db8::/64").is_ok());
        assert!(Validator::Ipv6Prefix.check("2001:db8::").is_err());
        assert!(Validator::Ipv6Prefix.check("2001:db8::/129").is_err());
    }

    #[test]
    fn test_mac_address() {
        assert!(Validator::MacAddress.check("00:11:22:aa:BB:cc").is_ok());
        assert!(Validator::MacAddress.check("00:11:22:aa:BB").is_err());
        assert!(Validator::MacAddress.check("00-11-22-aa-bb-cc").is_err());
    }

    #[test]
    fn test_byte_range_length_counts_bytes() {
        let rule = Validator::ByteRangeLength { min: 1, max: 4 };
        assert!(rule.check("abcd").is_ok());
        // 'č' is two bytes in UTF-8
        assert_eq!(
            rule.check("abčd"),
            Err(ValidationError::Length { min: 1, max: 4 })
        );
    }

    #[test]
    fn test_int_range() {
        let rule = Validator::IntRange { min: 1, max: 65535 };
        assert!(rule.check("25").is_ok());
        assert_eq!(rule.check("0"), Err(ValidationError::OutOfRange { min: 1, max: 65535 }));
        assert_eq!(rule.check("smtp"), Err(ValidationError::NotInteger));
    }

    #[test]
    fn test_email() {
        assert!(check_email("franta.novak@nic.cz").is_ok());
        assert!(check_email("user+tag@example.com").is_ok());
        assert_eq!(check_email("not-an-email"), Err(ValidationError::MalformedEmail));
        assert_eq!(check_email("a@@b.cz"), Err(ValidationError::MalformedEmail));
        assert_eq!(check_email("@nic.cz"), Err(ValidationError::MalformedEmail));
    }

    #[test]
    fn test_messages() {
        assert_eq!(
            ValidationError::MalformedEmail.to_string(),
            "This is not a valid email address."
        );
        assert_eq!(
            ValidationError::Length { min: 8, max: 63 }.to_string(),
            "This value length is invalid. It should be between 8 and 63 characters long."
        );
    }
}
