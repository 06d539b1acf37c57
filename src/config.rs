//! Codec configuration.
//!
//! The KDF iteration count is not recorded inside a sealed token, so the
//! sealing and opening side must agree on it. The default matches every
//! token ever produced by the format and should only be raised when all
//! readers are raised together.

use std::env;

use crate::error::{Error, Result};

/// Iteration count every historical token was sealed with
pub const DEFAULT_PBKDF2_ITERATIONS: u32 = 250_000;

/// Lowest iteration count the codec will accept
pub const MIN_PBKDF2_ITERATIONS: u32 = 250_000;

/// Environment variable overriding the PBKDF2 iteration count
pub const ENV_KDF_ITERATIONS: &str = "SOLUTION_VAULT_KDF_ITERATIONS";

/// Environment variable toggling concurrent per-field processing
pub const ENV_CONCURRENT: &str = "SOLUTION_VAULT_CONCURRENT";

/// Parameters for password-based key derivation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KdfParams {
    iterations: u32,
}

impl KdfParams {
    /// Create parameters with an explicit iteration count
    ///
    /// Counts below [`MIN_PBKDF2_ITERATIONS`] are rejected; the KDF is the
    /// only brute-force deterrent the format has.
    pub fn new(iterations: u32) -> Result<Self> {
        if iterations < MIN_PBKDF2_ITERATIONS {
            return Err(Error::InvalidConfig(format!(
                "PBKDF2 iteration count {} is below the minimum of {}",
                iterations, MIN_PBKDF2_ITERATIONS
            )));
        }
        Ok(Self { iterations })
    }

    /// PBKDF2 round count
    pub fn iterations(&self) -> u32 {
        self.iterations
    }
}

impl Default for KdfParams {
    fn default() -> Self {
        Self {
            iterations: DEFAULT_PBKDF2_ITERATIONS,
        }
    }
}

/// Configuration for a [`Codec`](crate::Codec)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CodecConfig {
    /// Key derivation parameters used for every seal and open
    pub kdf: KdfParams,
    /// Fan out per-field work across the blocking pool in the async API
    pub concurrent: bool,
}

impl Default for CodecConfig {
    fn default() -> Self {
        Self {
            kdf: KdfParams::default(),
            concurrent: true,
        }
    }
}

impl CodecConfig {
    /// Load configuration from environment variables.
    ///
    /// Unset variables fall back to defaults; set but unparsable ones are
    /// an error rather than being silently ignored.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub(crate) fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(raw) = lookup(ENV_KDF_ITERATIONS) {
            let iterations = raw.trim().parse::<u32>().map_err(|e| {
                Error::InvalidConfig(format!("{}={:?}: {}", ENV_KDF_ITERATIONS, raw, e))
            })?;
            config.kdf = KdfParams::new(iterations)?;
        }

        if let Some(raw) = lookup(ENV_CONCURRENT) {
            config.concurrent = match raw.trim().to_ascii_lowercase().as_str() {
                "1" | "true" | "yes" | "on" => true,
                "0" | "false" | "no" | "off" => false,
                other => {
                    return Err(Error::InvalidConfig(format!(
                        "{}={:?} is not a boolean",
                        ENV_CONCURRENT, other
                    )))
                }
            };
        }

        tracing::debug!(
            iterations = config.kdf.iterations(),
            concurrent = config.concurrent,
            "Loaded codec configuration"
        );

        Ok(config)
    }
}
