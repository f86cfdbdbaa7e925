//! Connection configuration.

use std::fmt;
use std::time::Duration;

use tracing::warn;

use crate::core::{
    DEFAULT_BAUD_RATE, DEFAULT_MAX_RETRANSMISSIONS, DEFAULT_TIMEOUT, LinkError, LinkResult,
    STANDARD_BAUD_RATES,
};

/// Which side of the handshake this endpoint plays.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Role {
    /// Drives the SET and DISC exchanges.
    Initiator,
    /// Answers them.
    Responder,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Initiator => f.write_str("initiator"),
            Self::Responder => f.write_str("responder"),
        }
    }
}

/// Parameters of one connection. Fixed for the lifetime of a [`Link`](super::Link).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkConfig {
    /// Local role.
    pub role: Role,
    /// Device identifier handed to the [`Connector`](crate::core::Connector).
    pub device: String,
    /// Line rate.
    pub baud_rate: u32,
    /// Time to wait for an acknowledgment before retransmitting.
    pub timeout: Duration,
    /// Retransmissions allowed after the first send.
    pub max_retransmissions: u32,
}

impl Default for LinkConfig {
    fn default() -> Self {
        Self {
            role: Role::Initiator,
            device: String::from("/dev/ttyS0"),
            baud_rate: DEFAULT_BAUD_RATE,
            timeout: DEFAULT_TIMEOUT,
            max_retransmissions: DEFAULT_MAX_RETRANSMISSIONS,
        }
    }
}

impl LinkConfig {
    /// Start building a configuration for `role`.
    pub fn builder(role: Role) -> LinkConfigBuilder {
        LinkConfigBuilder::new(role)
    }

    /// Total writes a retried frame may get: the first send plus retransmissions.
    pub fn max_attempts(&self) -> u32 {
        self.max_retransmissions.saturating_add(1)
    }

    /// Check that the configuration can drive a connection.
    pub fn validate(&self) -> LinkResult<()> {
        if self.device.trim().is_empty() {
            return Err(LinkError::Config("device identifier is empty".into()));
        }
        if self.baud_rate == 0 {
            return Err(LinkError::Config("baud rate must be positive".into()));
        }
        if self.timeout.is_zero() {
            return Err(LinkError::Config("timeout must be positive".into()));
        }
        if !STANDARD_BAUD_RATES.contains(&self.baud_rate) {
            warn!(baud_rate = self.baud_rate, "non-standard baud rate");
        }
        Ok(())
    }
}

/// Builder for [`LinkConfig`].
#[derive(Debug, Clone)]
pub struct LinkConfigBuilder {
    config: LinkConfig,
}

impl LinkConfigBuilder {
    /// Create a builder with default values for `role`.
    pub fn new(role: Role) -> Self {
        Self {
            config: LinkConfig {
                role,
                ..LinkConfig::default()
            },
        }
    }

    /// Set the device identifier.
    pub fn device(mut self, device: impl Into<String>) -> Self {
        self.config.device = device.into();
        self
    }

    /// Set the line rate.
    pub fn baud_rate(mut self, baud_rate: u32) -> Self {
        self.config.baud_rate = baud_rate;
        self
    }

    /// Set the acknowledgment timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.config.timeout = timeout;
        self
    }

    /// Set the acknowledgment timeout in whole seconds.
    pub fn timeout_secs(self, secs: u64) -> Self {
        self.timeout(Duration::from_secs(secs))
    }

    /// Set the number of retransmissions after the first send.
    pub fn max_retransmissions(mut self, count: u32) -> Self {
        self.config.max_retransmissions = count;
        self
    }

    /// Validate and return the configuration.
    pub fn build(self) -> LinkResult<LinkConfig> {
        self.config.validate()?;
        Ok(self.config)
    }
}
