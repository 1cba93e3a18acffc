//! Decoder configuration.
//!
//! Options can be built in code or embedded in a service's own config file:
//!
//! ```text
//! decode:
//!   max_depth: 64
//!   wire_type_policy: lenient
//!   utf8: strict
//! ```

use crate::wire::WireTypePolicy;
use crate::DEFAULT_MAX_DEPTH;
use serde::{Deserialize, Serialize};

/// Handling of string fields that are not valid UTF-8.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Utf8Policy {
    /// Fail with [`CodecError::Utf8Invalid`](crate::CodecError::Utf8Invalid).
    #[default]
    Strict,
    /// Replace invalid sequences with U+FFFD.
    Lossy,
}

/// Limits and policies applied by a [`Reader`](crate::Reader).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DecodeOptions {
    /// Maximum number of nested embedded messages.
    pub max_depth: usize,
    /// Behavior on wire-type mismatches for known fields.
    pub wire_type_policy: WireTypePolicy,
    /// Behavior on invalid UTF-8 in string fields.
    pub utf8: Utf8Policy,
}

impl Default for DecodeOptions {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
            wire_type_policy: WireTypePolicy::Strict,
            utf8: Utf8Policy::Strict,
        }
    }
}

impl DecodeOptions {
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    pub fn with_wire_type_policy(mut self, policy: WireTypePolicy) -> Self {
        self.wire_type_policy = policy;
        self
    }

    pub fn with_utf8(mut self, utf8: Utf8Policy) -> Self {
        self.utf8 = utf8;
        self
    }
}
