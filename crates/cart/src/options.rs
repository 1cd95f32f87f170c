//! Store options.
//!
//! Both policies default to the literal cart contract. The alternatives are
//! explicit opt-ins and are never selected implicitly.

use core::fmt;
use core::str::FromStr;

use thiserror::Error;

/// Storage key holding the whole cart.
pub const DEFAULT_STORAGE_KEY: &str = "@GoMarketplace:cart";

/// What `decrement` does when a quantity reaches zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum DecrementPolicy {
    /// Decrement unconditionally. Items stay in the cart at zero and may go
    /// negative.
    #[default]
    Unbounded,
    /// Remove an item once a decrement leaves it at zero or below.
    RemoveAtZero,
}

/// What the load step does with a persisted payload it cannot parse.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum MalformedPayload {
    /// Log and start as if nothing had been persisted. The next write
    /// replaces the bad payload.
    #[default]
    Discard,
    /// Report the payload through `wait_loaded` and stop persisting, leaving
    /// the stored value untouched.
    Fail,
}

/// Error returned when parsing a policy name.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("unknown {kind} '{value}' (expected one of: {expected})")]
pub struct UnknownPolicy {
    kind: &'static str,
    value: String,
    expected: &'static str,
}

impl FromStr for DecrementPolicy {
    type Err = UnknownPolicy;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "unbounded" => Ok(Self::Unbounded),
            "remove-at-zero" | "remove_at_zero" => Ok(Self::RemoveAtZero),
            _ => Err(UnknownPolicy {
                kind: "decrement policy",
                value: s.to_string(),
                expected: "unbounded, remove-at-zero",
            }),
        }
    }
}

impl fmt::Display for DecrementPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Unbounded => "unbounded",
            Self::RemoveAtZero => "remove-at-zero",
        })
    }
}

impl FromStr for MalformedPayload {
    type Err = UnknownPolicy;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "discard" => Ok(Self::Discard),
            "fail" => Ok(Self::Fail),
            _ => Err(UnknownPolicy {
                kind: "malformed payload policy",
                value: s.to_string(),
                expected: "discard, fail",
            }),
        }
    }
}

impl fmt::Display for MalformedPayload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Discard => "discard",
            Self::Fail => "fail",
        })
    }
}

/// Options for a [`CartStore`](crate::CartStore).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CartOptions {
    /// Key the serialized cart is stored under.
    pub storage_key: String,
    /// Behavior of `decrement` at zero.
    pub decrement_policy: DecrementPolicy,
    /// Handling of an unparseable persisted cart.
    pub malformed_payload: MalformedPayload,
}

impl Default for CartOptions {
    fn default() -> Self {
        Self {
            storage_key: DEFAULT_STORAGE_KEY.to_string(),
            decrement_policy: DecrementPolicy::default(),
            malformed_payload: MalformedPayload::default(),
        }
    }
}

impl CartOptions {
    /// Use a different storage key.
    #[must_use]
    pub fn with_storage_key(mut self, key: impl Into<String>) -> Self {
        self.storage_key = key.into();
        self
    }

    /// Use a different decrement policy.
    #[must_use]
    pub const fn with_decrement_policy(mut self, policy: DecrementPolicy) -> Self {
        self.decrement_policy = policy;
        self
    }

    /// Use a different malformed payload policy.
    #[must_use]
    pub const fn with_malformed_payload(mut self, policy: MalformedPayload) -> Self {
        self.malformed_payload = policy;
        self
    }
}
