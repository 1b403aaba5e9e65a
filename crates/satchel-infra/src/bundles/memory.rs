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

use async_trait::async_trait;
use satchel_core::asset::{Asset, AssetType, LoadedAsset};
use satchel_core::bundle::{BundleError, BundleHandle, BundleId, BundleSource};
use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

type AssetFactory = Arc<dyn Fn() -> Option<LoadedAsset> + Send + Sync>;

/// One asset stored in a [`BundleDefinition`].
///
/// The factory runs on every load, so each load hands out a fresh payload the
/// way a host engine would.
#[derive(Clone)]
pub struct AssetEntry {
    path: String,
    latency: Option<Duration>,
    factory: AssetFactory,
}

impl AssetEntry {
    /// An asset at `path` whose loads produce `factory()` named `name`.
    pub fn new<A, F>(path: impl Into<String>, name: impl Into<String>, factory: F) -> Self
    where
        A: Asset,
        F: Fn() -> A + Send + Sync + 'static,
    {
        let name = name.into();
        Self {
            path: path.into(),
            latency: None,
            factory: Arc::new(move || Some(LoadedAsset::new(name.clone(), factory()))),
        }
    }

    /// An asset at `path` whose loads resolve to a null `A` called `name`.
    pub fn null<A: Asset>(path: impl Into<String>, name: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            path: path.into(),
            latency: None,
            factory: Arc::new(move || Some(LoadedAsset::null(AssetType::of::<A>(), name.clone()))),
        }
    }

    /// A path listed by the bundle whose loads produce nothing at all.
    pub fn missing(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            latency: None,
            factory: Arc::new(|| None),
        }
    }

    /// Overrides the source-wide load latency for this asset.
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    /// The asset's path inside its bundle.
    pub fn path(&self) -> &str {
        &self.path
    }
}

impl fmt::Debug for AssetEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AssetEntry")
            .field("path", &self.path)
            .field("latency", &self.latency)
            .finish_non_exhaustive()
    }
}

/// The contents of one bundle: its name and the assets inside it.
#[derive(Debug, Clone)]
pub struct BundleDefinition {
    name: String,
    assets: Vec<AssetEntry>,
}

impl BundleDefinition {
    /// An empty bundle called `name`.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            assets: Vec::new(),
        }
    }

    /// Appends an asset.
    pub fn with_asset(mut self, entry: AssetEntry) -> Self {
        self.assets.push(entry);
        self
    }

    /// The bundle's name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The assets in listing order.
    pub fn assets(&self) -> &[AssetEntry] {
        &self.assets
    }
}

#[derive(Default)]
struct CatalogueState {
    files: HashMap<PathBuf, Arc<BundleDefinition>>,
    open: Vec<(BundleHandle, Arc<BundleDefinition>)>,
    next_id: u64,
    close_latency: Duration,
}

impl CatalogueState {
    fn open(&mut self, definition: Arc<BundleDefinition>) -> Result<BundleHandle, BundleError> {
        if self
            .open
            .iter()
            .any(|(handle, _)| handle.name() == definition.name())
        {
            return Err(BundleError::AlreadyOpen(definition.name().to_owned()));
        }
        self.next_id += 1;
        let handle = BundleHandle::new(BundleId(self.next_id), definition.name());
        self.open.push((handle.clone(), definition));
        Ok(handle)
    }

    fn find_open(&self, bundle: &BundleHandle) -> Option<&Arc<BundleDefinition>> {
        self.open
            .iter()
            .find(|(handle, _)| handle.id() == bundle.id())
            .map(|(_, definition)| definition)
    }
}

/// An in-memory host bundle catalogue.
///
/// Bundles either exist "on disk" at a path (registered with
/// [`register_bundle_file`](Self::register_bundle_file) and opened through
/// [`BundleSource::open_bundle`]) or are already open in the host
/// ([`open_host_bundle`](Self::open_host_bundle)). Opens, loads and closes
/// sleep for their configured latency before completing, so concurrent
/// operations finish in latency order rather than issue order.
pub struct MemoryBundleSource {
    state: Mutex<CatalogueState>,
    open_latency: Duration,
    load_latency: Duration,
}

impl Default for MemoryBundleSource {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryBundleSource {
    /// An empty catalogue whose operations complete without delay.
    pub fn new() -> Self {
        Self {
            state: Mutex::new(CatalogueState::default()),
            open_latency: Duration::ZERO,
            load_latency: Duration::ZERO,
        }
    }

    /// Sets the default latency of bundle opens and asset loads.
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.open_latency = latency;
        self.load_latency = latency;
        self
    }

    /// Sets how long each close takes to complete from now on.
    pub fn set_close_latency(&self, latency: Duration) {
        self.lock().close_latency = latency;
    }

    /// Makes `definition` openable from `path`.
    pub fn register_bundle_file(&self, path: impl Into<PathBuf>, definition: BundleDefinition) {
        let path = path.into();
        log::debug!(
            "Registered bundle \"{}\" at '{}'",
            definition.name(),
            path.display()
        );
        self.lock().files.insert(path, Arc::new(definition));
    }

    /// Opens `definition` as the host would on its own, without going through a path.
    pub fn open_host_bundle(
        &self,
        definition: BundleDefinition,
    ) -> Result<BundleHandle, BundleError> {
        self.lock().open(Arc::new(definition))
    }

    /// Whether a bundle called `name` is currently open.
    pub fn is_open(&self, name: &str) -> bool {
        self.lock().open.iter().any(|(handle, _)| handle.name() == name)
    }

    fn lock(&self) -> MutexGuard<'_, CatalogueState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

async fn delay(latency: Duration) {
    if !latency.is_zero() {
        tokio::time::sleep(latency).await;
    }
}

#[async_trait]
impl BundleSource for MemoryBundleSource {
    fn list_open_bundles(&self) -> Vec<BundleHandle> {
        self.lock()
            .open
            .iter()
            .map(|(handle, _)| handle.clone())
            .collect()
    }

    fn list_asset_paths(&self, bundle: &BundleHandle) -> Vec<String> {
        self.lock()
            .find_open(bundle)
            .map(|definition| {
                definition
                    .assets()
                    .iter()
                    .map(|entry| entry.path().to_owned())
                    .collect()
            })
            .unwrap_or_default()
    }

    async fn open_bundle(&self, path: &Path) -> Result<BundleHandle, BundleError> {
        delay(self.open_latency).await;

        let mut state = self.lock();
        let definition = state
            .files
            .get(path)
            .cloned()
            .ok_or_else(|| BundleError::NotFound(path.to_path_buf()))?;
        let handle = state.open(definition)?;
        log::debug!("Opened bundle \"{}\" ({})", handle.name(), handle.id());
        Ok(handle)
    }

    async fn load_asset(&self, bundle: &BundleHandle, path: &str) -> Option<LoadedAsset> {
        let (latency, factory) = {
            let state = self.lock();
            let entry = state
                .find_open(bundle)?
                .assets()
                .iter()
                .find(|entry| entry.path() == path)?;
            (
                entry.latency.unwrap_or(self.load_latency),
                Arc::clone(&entry.factory),
            )
        };

        delay(latency).await;
        factory()
    }

    async fn close_bundle(
        &self,
        bundle: &BundleHandle,
        with_contents: bool,
    ) -> Result<(), BundleError> {
        let latency = self.lock().close_latency;
        delay(latency).await;

        let mut state = self.lock();
        let index = state
            .open
            .iter()
            .position(|(handle, _)| handle.id() == bundle.id())
            .ok_or_else(|| BundleError::NotOpen(bundle.name().to_owned()))?;
        state.open.remove(index);
        log::debug!(
            "Closed bundle \"{}\" (contents released: {with_contents})",
            bundle.name()
        );
        Ok(())
    }
}
