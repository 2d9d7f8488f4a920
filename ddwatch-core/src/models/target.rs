//! Monitored host model.

use std::fmt;

use secrecy::SecretString;
use serde::{Deserialize, Deserializer, Serialize};

/// Default SSH port used when an inventory entry omits one
pub const DEFAULT_SSH_PORT: u16 = 22;

/// Opaque identifier of a monitored server, unique across the fleet
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ServerId(pub i64);

impl fmt::Display for ServerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Identity and connection facts for one monitored host.
///
/// `address`, `port`, `username` and `password` are everything the remote
/// executor needs to open one session. The password is never printed by
/// `Debug` and is only exposed when handed to the transport.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerTarget {
    /// Inventory identifier
    pub id: ServerId,
    /// Display hostname
    pub hostname: String,
    /// Network address (IP or resolvable name) used to connect
    pub address: String,
    /// Remote login principal
    pub username: String,
    /// Remote login secret; `None` means key/agent authentication
    #[serde(default, deserialize_with = "deserialize_secret")]
    pub password: Option<SecretString>,
    /// Remote login port
    #[serde(default = "default_port")]
    pub port: u16,
}

const fn default_port() -> u16 {
    DEFAULT_SSH_PORT
}

fn deserialize_secret<'de, D>(deserializer: D) -> Result<Option<SecretString>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<String>::deserialize(deserializer)?;
    Ok(value.filter(|s| !s.is_empty()).map(SecretString::from))
}

impl ServerTarget {
    /// Creates a target that authenticates with the given password
    #[must_use]
    pub fn new(
        id: ServerId,
        hostname: impl Into<String>,
        address: impl Into<String>,
        username: impl Into<String>,
        password: Option<SecretString>,
        port: u16,
    ) -> Self {
        Self {
            id,
            hostname: hostname.into(),
            address: address.into(),
            username: username.into(),
            password,
            port,
        }
    }

    /// Returns the non-secret identity subset carried into reports
    #[must_use]
    pub fn identity(&self) -> TargetIdentity {
        TargetIdentity {
            id: self.id,
            hostname: self.hostname.clone(),
            address: self.address.clone(),
        }
    }

    /// Returns true if a password is configured for this target
    #[must_use]
    pub const fn has_password(&self) -> bool {
        self.password.is_some()
    }
}

/// The part of a [`ServerTarget`] that is safe to log, persist and mail
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TargetIdentity {
    /// Inventory identifier
    pub id: ServerId,
    /// Display hostname
    pub hostname: String,
    /// Network address
    pub address: String,
}

impl fmt::Display for TargetIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.hostname, self.address)
    }
}
