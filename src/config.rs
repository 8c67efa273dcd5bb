// Copyright 2025 Fernando Borretti
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

use std::fs::read_to_string;
use std::path::Path;

use lexicards_core::EngineConfig;
use lexicards_core::Language;
use serde::Deserialize;

use crate::error::Fallible;
use crate::error::fail;

pub const CONFIG_FILE: &str = "lexicards.toml";

/// Per-collection settings, read from `lexicards.toml` at the collection
/// root. Every key is optional.
#[derive(Debug, Default, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    session_size: Option<usize>,
    mastery_ceiling: Option<u32>,
    max_rounds: Option<usize>,
    pub default_language: Option<Language>,
}

impl Config {
    /// Load the collection's configuration, or the defaults if it has none.
    pub fn load(directory: &Path) -> Fallible<Self> {
        let path = directory.join(CONFIG_FILE);
        if !path.exists() {
            return Ok(Self::default());
        }
        log::debug!("Reading configuration from {}", path.display());
        Self::parse(&read_to_string(path)?)
    }

    pub fn parse(text: &str) -> Fallible<Self> {
        let config: Config = toml::from_str(text)?;
        if config.session_size == Some(0) {
            return fail("session_size must be at least 1.");
        }
        if config.max_rounds == Some(0) {
            return fail("max_rounds must be at least 1.");
        }
        Ok(config)
    }

    pub fn engine(&self) -> EngineConfig {
        let defaults = EngineConfig::default();
        EngineConfig {
            session_size: self.session_size.unwrap_or(defaults.session_size),
            mastery_ceiling: self.mastery_ceiling.unwrap_or(defaults.mastery_ceiling),
            max_rounds: self.max_rounds.unwrap_or(defaults.max_rounds),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::helper::create_tmp_directory;

    #[test]
    fn test_missing_file_means_defaults() -> Fallible<()> {
        let dir = create_tmp_directory()?;
        let config = Config::load(&dir)?;
        assert_eq!(config, Config::default());
        assert_eq!(config.engine(), EngineConfig::default());
        Ok(())
    }

    #[test]
    fn test_parse() -> Fallible<()> {
        let config = Config::parse("session_size = 12\ndefault_language = \"DE\"\n")?;
        assert_eq!(config.default_language, Some(Language::new("de")));
        let engine = config.engine();
        assert_eq!(engine.session_size, 12);
        assert_eq!(engine.mastery_ceiling, EngineConfig::default().mastery_ceiling);
        Ok(())
    }

    #[test]
    fn test_rejects_bad_values() {
        assert!(Config::parse("session_size = 0").is_err());
        assert!(Config::parse("max_rounds = 0").is_err());
        assert!(Config::parse("colour = \"red\"").is_err());
    }
}
