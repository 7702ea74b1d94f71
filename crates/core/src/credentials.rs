//! OTAA activation credentials
//!
//! DevEUI, JoinEUI (AppEUI) and AppKey are configured as hex strings and
//! parsed once at startup. Any malformed value is a [`ConfigError`] and the
//! device must not attempt activation with it.

use core::fmt;

/// Which credential a configuration error refers to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CredentialField {
    DevEui,
    JoinEui,
    AppKey,
}

impl fmt::Display for CredentialField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CredentialField::DevEui => write!(f, "DevEUI"),
            CredentialField::JoinEui => write!(f, "JoinEUI"),
            CredentialField::AppKey => write!(f, "AppKey"),
        }
    }
}

/// Startup configuration errors. None of these are recoverable at runtime.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigError {
    /// Hex string has the wrong number of characters
    InvalidLength {
        field: CredentialField,
        expected: usize,
        actual: usize,
    },
    /// Non-hex character at the given character index
    InvalidHex {
        field: CredentialField,
        position: usize,
    },
    /// A configuration parameter is missing or out of range
    InvalidValue { name: &'static str },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidLength {
                field,
                expected,
                actual,
            } => write!(
                f,
                "{} must be {} hex characters, got {}",
                field, expected, actual
            ),
            ConfigError::InvalidHex { field, position } => {
                write!(f, "{} has a non-hex character at index {}", field, position)
            }
            ConfigError::InvalidValue { name } => write!(f, "invalid configuration value: {}", name),
        }
    }
}

fn hex_nibble(c: u8) -> Option<u8> {
    match c {
        b'0'..=b'9' => Some(c - b'0'),
        b'a'..=b'f' => Some(c - b'a' + 10),
        b'A'..=b'F' => Some(c - b'A' + 10),
        _ => None,
    }
}

fn parse_hex<const N: usize>(field: CredentialField, hex: &str) -> Result<[u8; N], ConfigError> {
    let chars = hex.as_bytes();
    if chars.len() != N * 2 {
        return Err(ConfigError::InvalidLength {
            field,
            expected: N * 2,
            actual: chars.len(),
        });
    }

    let mut bytes = [0u8; N];
    for (i, pair) in chars.chunks_exact(2).enumerate() {
        let high = hex_nibble(pair[0]).ok_or(ConfigError::InvalidHex {
            field,
            position: i * 2,
        })?;
        let low = hex_nibble(pair[1]).ok_or(ConfigError::InvalidHex {
            field,
            position: i * 2 + 1,
        })?;
        bytes[i] = (high << 4) | low;
    }
    Ok(bytes)
}

fn write_hex(f: &mut fmt::Formatter<'_>, bytes: &[u8]) -> fmt::Result {
    for b in bytes {
        write!(f, "{:02X}", b)?;
    }
    Ok(())
}

/// 64-bit extended unique identifier, most significant byte first
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Eui(pub [u8; 8]);

impl Eui {
    /// Hex characters in a textual EUI
    pub const HEX_LEN: usize = 16;

    /// Interpret the EUI as a big-endian integer
    pub fn as_u64(&self) -> u64 {
        u64::from_be_bytes(self.0)
    }
}

impl fmt::Display for Eui {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_hex(f, &self.0)
    }
}

/// 128-bit root key. `Debug` never prints the key material.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct AppKey([u8; 16]);

impl AppKey {
    /// Hex characters in a textual AppKey
    pub const HEX_LEN: usize = 32;

    pub fn new(bytes: [u8; 16]) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; 16] {
        &self.0
    }
}

impl fmt::Debug for AppKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "AppKey(**redacted**)")
    }
}

/// Complete OTAA credential set
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Credentials {
    pub dev_eui: Eui,
    pub join_eui: Eui,
    pub app_key: AppKey,
}

impl Credentials {
    /// Parse the three hex strings (16, 16 and 32 characters, either case)
    ///
    /// # Errors
    ///
    /// [`ConfigError::InvalidLength`] or [`ConfigError::InvalidHex`] naming the
    /// first offending field.
    pub fn from_hex(dev_eui: &str, join_eui: &str, app_key: &str) -> Result<Self, ConfigError> {
        Ok(Self {
            dev_eui: Eui(parse_hex(CredentialField::DevEui, dev_eui)?),
            join_eui: Eui(parse_hex(CredentialField::JoinEui, join_eui)?),
            app_key: AppKey(parse_hex(CredentialField::AppKey, app_key)?),
        })
    }
}

#[cfg(test)]
mod tests {
    extern crate std;
    use std::format;

    use super::*;

    const DEV_EUI: &str = "58EC3C43CA480000";
    const JOIN_EUI: &str = "0000000000000000";
    const APP_KEY: &str = "CE8A96F54327D1CB20078F78D4746517";

    #[test]
    fn test_parse_valid_credentials() {
        let creds = Credentials::from_hex(DEV_EUI, JOIN_EUI, APP_KEY).unwrap();
        assert_eq!(creds.dev_eui.as_u64(), 0x58EC_3C43_CA48_0000);
        assert_eq!(creds.join_eui.as_u64(), 0);
        assert_eq!(creds.app_key.as_bytes()[0], 0xCE);
        assert_eq!(creds.app_key.as_bytes()[15], 0x17);
    }

    #[test]
    fn test_lowercase_hex_accepted() {
        let creds = Credentials::from_hex("58ec3c43ca480000", JOIN_EUI, APP_KEY).unwrap();
        assert_eq!(format!("{}", creds.dev_eui), DEV_EUI);
    }

    #[test]
    fn test_wrong_length_rejected() {
        let err = Credentials::from_hex("58EC3C43CA4800", JOIN_EUI, APP_KEY).unwrap_err();
        assert_eq!(
            err,
            ConfigError::InvalidLength {
                field: CredentialField::DevEui,
                expected: 16,
                actual: 14,
            }
        );
    }

    #[test]
    fn test_non_hex_rejected() {
        let err =
            Credentials::from_hex(DEV_EUI, JOIN_EUI, "CE8A96F54327D1CB20078F78D474651G").unwrap_err();
        assert_eq!(
            err,
            ConfigError::InvalidHex {
                field: CredentialField::AppKey,
                position: 31,
            }
        );
    }

    #[test]
    fn test_app_key_debug_is_redacted() {
        let creds = Credentials::from_hex(DEV_EUI, JOIN_EUI, APP_KEY).unwrap();
        let printed = format!("{:?}", creds);
        assert!(!printed.contains("CE8A"));
        assert!(printed.contains("redacted"));
    }

    #[test]
    fn test_config_error_display() {
        let err = ConfigError::InvalidLength {
            field: CredentialField::JoinEui,
            expected: 16,
            actual: 3,
        };
        assert_eq!(format!("{}", err), "JoinEUI must be 16 hex characters, got 3");
    }
}
