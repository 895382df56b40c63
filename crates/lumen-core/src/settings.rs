// Copyright 2025 eraflo
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Runtime settings for the wrapper layer.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// A collection of settings read once at start-up.
///
/// Settings are stored as RON. Every field has a default, so a partial file
/// (or an empty `()`) is valid.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LumenSettings {
    /// The `env_logger` filter used when no `RUST_LOG` is set.
    pub log_filter: String,
    /// Maximum number of queued events. `None` means unbounded.
    pub event_queue_capacity: Option<usize>,
    /// Timeout applied by waits that do not specify one. `None` blocks indefinitely.
    pub default_wait_timeout_ms: Option<u64>,
}

impl Default for LumenSettings {
    fn default() -> Self {
        Self {
            log_filter: "info".to_string(),
            event_queue_capacity: None,
            default_wait_timeout_ms: None,
        }
    }
}

impl LumenSettings {
    /// Parses settings from RON text.
    pub fn from_ron_str(text: &str) -> Result<Self> {
        ron::from_str(text).context("Failed to parse Lumen settings")
    }

    /// Loads settings from a RON file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read settings file '{}'", path.display()))?;
        let settings = Self::from_ron_str(&text)?;
        log::debug!("Loaded settings from '{}': {settings:?}", path.display());
        Ok(settings)
    }

    /// Serializes the settings as pretty-printed RON.
    pub fn to_ron_string(&self) -> Result<String> {
        ron::ser::to_string_pretty(self, ron::ser::PrettyConfig::default())
            .context("Failed to serialize Lumen settings")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn empty_struct_uses_defaults() {
        let settings = LumenSettings::from_ron_str("()").expect("valid RON");
        assert_eq!(settings, LumenSettings::default());
    }

    #[test]
    fn partial_settings_override_only_given_fields() {
        let settings =
            LumenSettings::from_ron_str("(event_queue_capacity: Some(64))").expect("valid RON");
        assert_eq!(settings.event_queue_capacity, Some(64));
        assert_eq!(settings.log_filter, "info");
        assert_eq!(settings.default_wait_timeout_ms, None);
    }

    #[test]
    fn malformed_text_is_an_error() {
        assert!(LumenSettings::from_ron_str("(log_filter: 12)").is_err());
    }

    #[test]
    fn load_from_file_roundtrips() {
        let settings = LumenSettings {
            log_filter: "debug".to_string(),
            event_queue_capacity: Some(8),
            default_wait_timeout_ms: Some(250),
        };
        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        file.write_all(settings.to_ron_string().expect("serialize").as_bytes())
            .expect("write settings");

        let loaded = LumenSettings::load(file.path()).expect("load settings");
        assert_eq!(loaded, settings);
    }
}
