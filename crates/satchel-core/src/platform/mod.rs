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

//! Platform detection and bundle path resolution.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};

/// The platform the host was built for.
///
/// Only the first three are recognised by bundle path resolution.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Platform {
    /// 64-bit Windows player.
    Windows,
    /// macOS player.
    MacOs,
    /// 64-bit Linux player.
    Linux,
    /// Any other platform, by name.
    Other(String),
}

impl Platform {
    /// The platform this binary was compiled for.
    pub fn current() -> Self {
        if cfg!(target_os = "windows") {
            Platform::Windows
        } else if cfg!(target_os = "macos") {
            Platform::MacOs
        } else if cfg!(target_os = "linux") {
            Platform::Linux
        } else {
            Platform::Other(std::env::consts::OS.to_string())
        }
    }

    /// The folder bundles for this platform are built into.
    ///
    /// Unrecognised platforms map to an empty segment.
    pub fn segment(&self) -> &'static str {
        match self {
            Platform::Windows => "StandaloneWindows64",
            Platform::MacOs => "StandaloneOSX",
            Platform::Linux => "StandaloneLinux64",
            Platform::Other(_) => "",
        }
    }

    /// Whether bundle path resolution knows this platform.
    pub fn is_recognized(&self) -> bool {
        !matches!(self, Platform::Other(_))
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Platform::Windows => f.write_str("Windows"),
            Platform::MacOs => f.write_str("macOS"),
            Platform::Linux => f.write_str("Linux"),
            Platform::Other(name) => f.write_str(name),
        }
    }
}

/// Resolves the on-disk path of a named bundle: `root/<segment>/<name>.bundle`.
///
/// An unrecognised platform does not fail; its empty segment simply drops out
/// of the path.
pub fn resolve_bundle_path(root: &Path, bundle_name: &str, platform: &Platform) -> PathBuf {
    let mut path = root.to_path_buf();
    let segment = platform.segment();
    if !segment.is_empty() {
        path.push(segment);
    }
    path.push(format!("{bundle_name}.bundle"));
    path
}

/// Holds the runtime root and platform so callers only pass bundle names.
#[derive(Debug, Clone)]
pub struct PathResolver {
    root: PathBuf,
    platform: Platform,
}

impl PathResolver {
    /// Creates a resolver for an explicit platform.
    pub fn new(root: impl Into<PathBuf>, platform: Platform) -> Self {
        Self {
            root: root.into(),
            platform,
        }
    }

    /// Creates a resolver for the platform this binary runs on.
    pub fn for_current_platform(root: impl Into<PathBuf>) -> Self {
        Self::new(root, Platform::current())
    }

    /// The runtime root bundles are resolved against.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// The platform bundles are resolved for.
    pub fn platform(&self) -> &Platform {
        &self.platform
    }

    /// Resolves the path of the bundle named `bundle_name`.
    pub fn resolve(&self, bundle_name: &str) -> PathBuf {
        if !self.platform.is_recognized() {
            log::warn!(
                "Platform \"{}\" has no bundle folder; resolving \"{bundle_name}\" directly under '{}'",
                self.platform,
                self.root.display()
            );
        }
        resolve_bundle_path(&self.root, bundle_name, &self.platform)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_platforms_map_to_their_folder() {
        let root = Path::new("aa");
        assert_eq!(
            resolve_bundle_path(root, "laceboss", &Platform::Windows),
            Path::new("aa/StandaloneWindows64/laceboss.bundle")
        );
        assert_eq!(
            resolve_bundle_path(root, "laceboss", &Platform::MacOs),
            Path::new("aa/StandaloneOSX/laceboss.bundle")
        );
        assert_eq!(
            resolve_bundle_path(root, "laceboss", &Platform::Linux),
            Path::new("aa/StandaloneLinux64/laceboss.bundle")
        );
    }

    #[test]
    fn unknown_platform_falls_through_to_root() {
        let platform = Platform::Other("switch".into());
        assert!(!platform.is_recognized());
        assert_eq!(platform.segment(), "");
        assert_eq!(
            resolve_bundle_path(Path::new("aa"), "laceboss", &platform),
            Path::new("aa/laceboss.bundle")
        );
    }

    #[test]
    fn resolver_uses_its_root_and_platform() {
        let resolver = PathResolver::new("runtime", Platform::Linux);
        assert_eq!(resolver.root(), Path::new("runtime"));
        assert_eq!(
            resolver.resolve("b2"),
            Path::new("runtime/StandaloneLinux64/b2.bundle")
        );
    }

    #[test]
    fn current_platform_is_recognized_on_desktop_targets() {
        let current = Platform::current();
        if cfg!(any(target_os = "windows", target_os = "macos", target_os = "linux")) {
            assert!(current.is_recognized());
        }
    }
}
