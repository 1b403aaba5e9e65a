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

//! Static configuration of what the registry looks for and where.

use crate::asset::NameFilter;
use crate::platform::{PathResolver, Platform};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors raised while loading an [`AssetConfig`].
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The configuration file could not be read.
    #[error("Failed to read asset config '{}'", path.display())]
    Io {
        /// The file that failed to load.
        path: PathBuf,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },
    /// The configuration is not valid RON.
    #[error("Failed to parse asset config: {0}")]
    Parse(#[from] ron::error::SpannedError),
}

/// The static configuration of the asset registry.
///
/// Stored as RON; every field is optional in the file.
///
/// ```ron
/// (
///     desired_names: ["Abyss Vomit Glob", "mini_mawlek_spit"],
///     manual_bundles: ["localpoolprefabs_assets_laceboss"],
///     runtime_root: "aa",
/// )
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AssetConfig {
    /// Name substrings identifying the assets to register.
    pub desired_names: Vec<String>,
    /// Bundles to open explicitly when the host has not opened them.
    pub manual_bundles: Vec<String>,
    /// Directory that platform bundle folders live under.
    pub runtime_root: PathBuf,
    /// Match desired names ignoring ASCII case.
    pub ignore_case: bool,
    /// Platform override; `None` means the platform this binary runs on.
    pub platform: Option<Platform>,
}

impl Default for AssetConfig {
    fn default() -> Self {
        Self {
            desired_names: Vec::new(),
            manual_bundles: Vec::new(),
            runtime_root: PathBuf::from("."),
            ignore_case: false,
            platform: None,
        }
    }
}

impl AssetConfig {
    /// Parses a configuration from RON text.
    pub fn from_ron_str(text: &str) -> Result<Self, ConfigError> {
        Ok(ron::from_str(text)?)
    }

    /// Reads and parses a RON configuration file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_ron_str(&text)
    }

    /// The name filter built from `desired_names` and `ignore_case`.
    pub fn name_filter(&self) -> NameFilter {
        NameFilter::new(self.desired_names.iter().cloned()).ignore_case(self.ignore_case)
    }

    /// The path resolver built from `runtime_root` and `platform`.
    pub fn path_resolver(&self) -> PathResolver {
        match &self.platform {
            Some(platform) => PathResolver::new(self.runtime_root.clone(), platform.clone()),
            None => PathResolver::for_current_platform(self.runtime_root.clone()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn parses_full_config() {
        let config = AssetConfig::from_ron_str(
            r#"(
                desired_names: ["Abyss Vomit Glob", "mini_mawlek_spit"],
                manual_bundles: ["localpoolprefabs_assets_laceboss"],
                runtime_root: "aa",
                ignore_case: true,
                platform: Some(Linux),
            )"#,
        )
        .expect("config should parse");

        assert_eq!(config.desired_names.len(), 2);
        assert_eq!(config.manual_bundles, ["localpoolprefabs_assets_laceboss"]);
        assert_eq!(config.runtime_root, PathBuf::from("aa"));
        assert!(config.ignore_case);
        assert_eq!(
            config.path_resolver().resolve("b2"),
            Path::new("aa/StandaloneLinux64/b2.bundle")
        );
        assert_eq!(
            config.name_filter().match_path("x/MINI_MAWLEK_SPIT"),
            Some("mini_mawlek_spit")
        );
    }

    #[test]
    fn missing_fields_use_defaults() {
        let config = AssetConfig::from_ron_str(r#"(desired_names: ["X_bar"])"#).unwrap();
        assert_eq!(config.desired_names, ["X_bar"]);
        assert!(config.manual_bundles.is_empty());
        assert_eq!(config.runtime_root, PathBuf::from("."));
        assert!(config.platform.is_none());
    }

    #[test]
    fn invalid_text_is_a_parse_error() {
        let err = AssetConfig::from_ron_str("(desired_names: 3)").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn loads_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"(manual_bundles: ["b2"], platform: Some(Other("switch")))"#).unwrap();

        let config = AssetConfig::from_file(file.path()).unwrap();
        assert_eq!(config.manual_bundles, ["b2"]);
        assert_eq!(config.platform, Some(Platform::Other("switch".into())));
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let err = AssetConfig::from_file("definitely/not/here.ron").unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }
}
