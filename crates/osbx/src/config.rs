//! Optional `osbx.toml` configuration.
//!
//! ```toml
//! [log]
//! level = "debug"
//!
//! [export]
//! staging_parent = "/var/tmp"
//! keep_archive = true
//!
//! [extensions]
//! Pipeline = "pipe"
//!
//! [envelope]
//! locator = ["first-child", "next-sibling", "first-child"]
//! ```

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use anyhow::Context;
use osbx_normalize::{EnvelopeLocator, ExtensionRegistry, Step};
use serde::Deserialize;

pub const DEFAULT_CONFIG_FILE: &str = "osbx.toml";

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub log: LogConfig,
    pub export: ExportConfig,
    /// Resource-type tokens merged over the built-in extension table.
    pub extensions: BTreeMap<String, String>,
    pub envelope: EnvelopeConfig,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LogConfig {
    pub level: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ExportConfig {
    pub staging_parent: Option<PathBuf>,
    pub keep_archive: bool,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EnvelopeConfig {
    pub locator: Option<Vec<Step>>,
}

impl Config {
    /// Read `explicit`, or `osbx.toml` in the working directory when it
    /// exists, or fall back to defaults.
    pub fn load(explicit: Option<&Path>) -> anyhow::Result<Self> {
        let path = match explicit {
            Some(path) => path,
            None if Path::new(DEFAULT_CONFIG_FILE).is_file() => Path::new(DEFAULT_CONFIG_FILE),
            None => return Ok(Self::default()),
        };

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config '{}'", path.display()))?;
        Self::parse(&content).with_context(|| format!("invalid config '{}'", path.display()))
    }

    pub fn parse(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    pub fn registry(&self) -> ExtensionRegistry {
        if self.extensions.is_empty() {
            ExtensionRegistry::default()
        } else {
            ExtensionRegistry::with_overrides(&self.extensions)
        }
    }

    pub fn locator(&self) -> EnvelopeLocator {
        match &self.envelope.locator {
            Some(steps) => EnvelopeLocator::new(steps.clone()),
            None => EnvelopeLocator::default(),
        }
    }
}
