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

//! Decoding of payloads shipped with the subsystem itself.

use satchel_core::asset::{Asset, AssetLoader, LoadedAsset};
use std::borrow::Cow;
use std::collections::HashMap;
use std::error::Error as StdError;
use std::fmt;
use thiserror::Error;

/// A payload compiled into (or shipped next to) the subsystem.
///
/// The resource name is dot-separated, e.g. `"Satchel.Assets.Atlas.png"`: the
/// last segment is the format and the one before it is the asset name.
#[derive(Debug, Clone)]
pub struct EmbeddedResource {
    resource_name: String,
    bytes: Cow<'static, [u8]>,
}

impl EmbeddedResource {
    /// Creates a resource from its manifest name and raw bytes.
    pub fn new(resource_name: impl Into<String>, bytes: impl Into<Cow<'static, [u8]>>) -> Self {
        Self {
            resource_name: resource_name.into(),
            bytes: bytes.into(),
        }
    }

    /// The full manifest name.
    pub fn resource_name(&self) -> &str {
        &self.resource_name
    }

    /// The raw payload.
    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// The second-to-last dot-separated segment (`"Atlas"` above).
    pub fn asset_name(&self) -> Option<&str> {
        let mut segments = self.resource_name.rsplit('.');
        segments.next()?;
        segments.next().filter(|name| !name.is_empty())
    }

    /// The last dot-separated segment (`"png"` above), if there is more than one.
    pub fn extension(&self) -> Option<&str> {
        self.resource_name
            .rsplit_once('.')
            .map(|(_, extension)| extension)
            .filter(|extension| !extension.is_empty())
    }
}

/// Why an embedded resource could not be turned into an asset.
#[derive(Debug, Error)]
pub enum EmbeddedLoadError {
    /// The resource name has no asset-name segment.
    #[error("Embedded resource \"{resource}\" has no asset name segment")]
    MissingName {
        /// The offending manifest name.
        resource: String,
    },
    /// No loader is registered for the resource's extension.
    #[error("No loader registered for extension \"{extension}\" of embedded resource \"{resource}\"")]
    NoLoader {
        /// The offending manifest name.
        resource: String,
        /// The extension that had no loader (empty when there was none).
        extension: String,
    },
    /// The loader rejected the bytes.
    #[error("Failed to decode embedded resource \"{resource}\"")]
    Decode {
        /// The offending manifest name.
        resource: String,
        /// The loader's error.
        #[source]
        source: Box<dyn StdError + Send + Sync>,
    },
}

/// Internal trait for loading any asset type.
trait AnyAssetLoader: Send + Sync {
    fn load_any(&self, name: &str, bytes: &[u8]) -> Result<LoadedAsset, Box<dyn StdError + Send + Sync>>;
}

/// Wraps a typed `AssetLoader<A>` so loaders for different types share one map.
struct AssetLoaderWrapper<A: Asset, L: AssetLoader<A>>(L, std::marker::PhantomData<A>);

impl<A: Asset, L: AssetLoader<A> + Send + Sync> AnyAssetLoader for AssetLoaderWrapper<A, L> {
    fn load_any(&self, name: &str, bytes: &[u8]) -> Result<LoadedAsset, Box<dyn StdError + Send + Sync>> {
        let asset: A = self.0.load(bytes)?;
        Ok(LoadedAsset::new(name, asset))
    }
}

/// Loaders for embedded resources, keyed by lower-case file extension.
#[derive(Default)]
pub struct EmbeddedLoaderRegistry {
    loaders: HashMap<String, Box<dyn AnyAssetLoader>>,
}

impl EmbeddedLoaderRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `loader` for resources ending in `.{extension}`.
    ///
    /// Extensions are matched ignoring ASCII case. A later registration for
    /// the same extension replaces the earlier one.
    pub fn register<A: Asset>(
        &mut self,
        extension: &str,
        loader: impl AssetLoader<A> + Send + Sync + 'static,
    ) {
        let wrapped = AssetLoaderWrapper(loader, std::marker::PhantomData);
        if self
            .loaders
            .insert(extension.to_ascii_lowercase(), Box::new(wrapped))
            .is_some()
        {
            log::warn!("Replaced the embedded loader for extension \"{extension}\"");
        }
    }

    /// Decodes one resource into a named asset.
    pub fn load(&self, resource: &EmbeddedResource) -> Result<LoadedAsset, EmbeddedLoadError> {
        let name = resource
            .asset_name()
            .ok_or_else(|| EmbeddedLoadError::MissingName {
                resource: resource.resource_name().to_owned(),
            })?;

        let extension = resource.extension().unwrap_or_default();
        let loader = self
            .loaders
            .get(&extension.to_ascii_lowercase())
            .ok_or_else(|| EmbeddedLoadError::NoLoader {
                resource: resource.resource_name().to_owned(),
                extension: extension.to_owned(),
            })?;

        loader
            .load_any(name, resource.bytes())
            .map_err(|source| EmbeddedLoadError::Decode {
                resource: resource.resource_name().to_owned(),
                source,
            })
    }
}

impl fmt::Debug for EmbeddedLoaderRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EmbeddedLoaderRegistry")
            .field("extensions", &self.loaders.keys().collect::<Vec<_>>())
            .finish()
    }
}
