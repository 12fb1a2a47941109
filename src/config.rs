//! Tunable construction parameters.
//!
//! The wire format's structural constants (superblock/block sizes, tag
//! bytes, the full-binary tree magic number) are fixed and are not
//! configurable. `Config` only covers one tunable numeric parameter: the
//! byte-dictionary ceiling for dense primitive columns (§4.2).

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Configuration for building [`crate::vec::Vec`] values and bitsets.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Config {
    /// Maximum number of distinct values a dense primitive column may use
    /// byte-dictionary encoding for before falling back to plain encoding.
    ///
    /// The wire format caps this at 256 (a `u8` index); values above that
    /// are rejected by [`Config::new`].
    pub max_dictionary_len: u32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            max_dictionary_len: 256,
        }
    }
}

impl Config {
    /// Construct a config, clamping `max_dictionary_len` to the wire
    /// format's 256-entry ceiling.
    pub fn new(max_dictionary_len: u32) -> Self {
        Self {
            max_dictionary_len: max_dictionary_len.min(256),
        }
    }
}
