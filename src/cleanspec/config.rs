//! # Configuration
//!
//! Error handler settings are managed by [`confique`], layered in priority
//! order:
//!
//! 1. **Environment variables**: `CLEANSPEC_UNEXPECTED_DETAIL`, etc.
//! 2. **TOML file**: only when the caller passes a path to [`HandlerConfig::load`].
//! 3. **Compiled defaults**: `#[config(default = ...)]`.
//!
//! ## Available Settings
//!
//! | Key | Default | Description |
//! |-----|---------|-------------|
//! | `unexpected_detail` | `Unknown exception occurred.` | `detail` of the generic fallback response |
//! | `unexpected_error_code` | `UnknownException` | `error_code` of the generic fallback response |
//! | `log_public_errors` | `false` | Log public errors at `warn` instead of `debug` |
//! | `expose_additional_info` | `true` | Include `additional_info` in kind-default responses |

use confique::Config;
use serde::{Deserialize, Serialize};
use std::path::Path;

const DEFAULT_UNEXPECTED_DETAIL: &str = "Unknown exception occurred.";
const DEFAULT_UNEXPECTED_ERROR_CODE: &str = "UnknownException";

/// Settings for [`ErrorHandler`](crate::handler::ErrorHandler).
#[derive(Config, Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct HandlerConfig {
    /// Detail shown to callers when an exception has no mapping.
    #[config(default = "Unknown exception occurred.", env = "CLEANSPEC_UNEXPECTED_DETAIL")]
    pub unexpected_detail: String,

    /// Error code shown to callers when an exception has no mapping.
    #[config(default = "UnknownException", env = "CLEANSPEC_UNEXPECTED_ERROR_CODE")]
    pub unexpected_error_code: String,

    /// Log public (expected) errors at `warn` level.
    #[config(default = false, env = "CLEANSPEC_LOG_PUBLIC_ERRORS")]
    pub log_public_errors: bool,

    /// Whether kind-default responses carry the exception's `additional_info`.
    #[config(default = true, env = "CLEANSPEC_EXPOSE_ADDITIONAL_INFO")]
    pub expose_additional_info: bool,
}

impl Default for HandlerConfig {
    fn default() -> Self {
        Self {
            unexpected_detail: DEFAULT_UNEXPECTED_DETAIL.to_string(),
            unexpected_error_code: DEFAULT_UNEXPECTED_ERROR_CODE.to_string(),
            log_public_errors: false,
            expose_additional_info: true,
        }
    }
}

impl HandlerConfig {
    /// Load from the environment, then `file` (if given), then defaults.
    pub fn load(file: Option<&Path>) -> Result<Self, confique::Error> {
        let mut builder = Self::builder().env();
        if let Some(path) = file {
            builder = builder.file(path);
        }
        builder.load()
    }
}
