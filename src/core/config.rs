//! Allocator configuration
//!
//! Loaded from a TOML file; every field has a default so an empty file (or
//! no file at all) gives a 1024-address space with the stock prompt.
//!
//! ```toml
//! capacity = 4096
//! prompt = "mem> "
//! json_status = false
//! ```

use crate::error::{AllocError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::debug;
use validator::Validate;

pub const DEFAULT_CAPACITY: u64 = 1024;
pub const DEFAULT_PROMPT: &str = "allocator> ";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
#[serde(default, deny_unknown_fields)]
pub struct AllocatorConfig {
    /// Number of addresses in the simulated space
    #[validate(range(min = 1))]
    pub capacity: u64,

    /// Prompt shown before each interactive command
    #[validate(length(max = 64))]
    pub prompt: String,

    /// Print STAT output as JSON instead of status lines
    pub json_status: bool,
}

impl Default for AllocatorConfig {
    fn default() -> Self {
        AllocatorConfig {
            capacity: DEFAULT_CAPACITY,
            prompt: DEFAULT_PROMPT.to_string(),
            json_status: false,
        }
    }
}

impl AllocatorConfig {
    /// Read and validate a TOML config file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        debug!("Loading config from {:?}", path);
        let text = std::fs::read_to_string(path)?;
        Self::from_toml_str(&text)
    }

    /// Parse and validate config from TOML text
    pub fn from_toml_str(text: &str) -> Result<Self> {
        let config: AllocatorConfig = toml::from_str(text)?;
        config.validate_config()?;
        Ok(config)
    }

    pub fn validate_config(&self) -> Result<()> {
        self.validate()
            .map_err(|errors| AllocError::Config(errors.to_string()))
    }

    pub fn to_toml_string(&self) -> Result<String> {
        toml::to_string(self).map_err(|e| AllocError::Config(e.to_string()))
    }
}
