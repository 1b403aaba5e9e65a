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

//! Contracts for the host's bundle catalogue.
//!
//! A bundle is a container of packaged assets that the host engine opens as a
//! unit. The registry never reads bundle contents itself: it drives a
//! [`BundleSource`] and only ever sees [`BundleHandle`]s, asset paths, and
//! [`LoadedAsset`]s.

use crate::asset::LoadedAsset;
use async_trait::async_trait;
use std::fmt;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// An opaque identifier the host assigns to an open bundle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BundleId(pub u64);

impl fmt::Display for BundleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// An opaque reference to an open bundle.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct BundleHandle {
    id: BundleId,
    name: String,
}

impl BundleHandle {
    /// Creates a handle. Only bundle sources should need this.
    pub fn new(id: BundleId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
        }
    }

    /// The host-assigned identifier.
    pub fn id(&self) -> BundleId {
        self.id
    }

    /// The bundle's name, as reported by the host.
    pub fn name(&self) -> &str {
        &self.name
    }
}

/// Errors reported by a [`BundleSource`] for bundle-level operations.
#[derive(Debug, Error)]
pub enum BundleError {
    /// No bundle exists at the given path.
    #[error("No bundle found at '{}'", .0.display())]
    NotFound(PathBuf),
    /// A bundle with the same name is already open.
    #[error("Bundle \"{0}\" is already open")]
    AlreadyOpen(String),
    /// The bundle was not open (already closed, or never opened).
    #[error("Bundle \"{0}\" is not open")]
    NotOpen(String),
    /// Any other failure reported by the host.
    #[error("Host bundle operation failed: {0}")]
    Host(String),
}

/// The asynchronous bundle primitives provided by the host engine.
///
/// Listing operations are synchronous snapshots of the host's current state.
/// Opening, loading, and closing complete asynchronously; callers either await
/// them in sequence or hand them to a detached task.
#[async_trait]
pub trait BundleSource: Send + Sync {
    /// Every bundle currently open in the host, whoever opened it.
    fn list_open_bundles(&self) -> Vec<BundleHandle>;

    /// The paths of every asset contained in an open bundle.
    ///
    /// A bundle that is not open yields an empty list.
    fn list_asset_paths(&self, bundle: &BundleHandle) -> Vec<String>;

    /// Opens the bundle stored at `path`.
    async fn open_bundle(&self, path: &Path) -> Result<BundleHandle, BundleError>;

    /// Loads the asset at `path` out of an open bundle.
    ///
    /// Returns `None` when the load produced nothing at all, and a null
    /// [`LoadedAsset`] when the host reports a known key with a null value.
    async fn load_asset(&self, bundle: &BundleHandle, path: &str) -> Option<LoadedAsset>;

    /// Closes an open bundle, optionally destroying the objects loaded from it.
    async fn close_bundle(
        &self,
        bundle: &BundleHandle,
        with_contents: bool,
    ) -> Result<(), BundleError>;
}
