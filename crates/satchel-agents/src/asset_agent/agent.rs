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

//! The AssetAgent is responsible for populating, querying, and tearing down the
//! asset registry.
//!
//! It is the registry's only writer. Loads awaited in sequence are applied
//! directly; loads and closes handed to detached tasks report back through an
//! [`EventBus`] and are applied when the agent drains it.

use std::future::Future;
use std::sync::Arc;

use satchel_core::asset::{Asset, AssetHandle, AssetLoader, LoadedAsset, LookupError, NameFilter};
use satchel_core::bundle::{BundleHandle, BundleSource};
use satchel_core::config::AssetConfig;
use satchel_core::event::EventBus;
use satchel_core::platform::PathResolver;
use satchel_data::{AddOutcome, AssetRegistry, BundleTracker};
use satchel_telemetry::{CounterHandle, MetricsRegistry};

use super::embedded::{EmbeddedLoaderRegistry, EmbeddedResource};
use super::events::LoadEvent;
use super::hooks::{PostLoadHook, PostLoadHookRegistry};

/// Counter handles updated by the agent.
struct AgentMetrics {
    inserted: CounterHandle,
    conflicts: CounterHandle,
    lookup_misses: CounterHandle,
    stale_completions: CounterHandle,
    bundles_opened: CounterHandle,
    bundles_closed: CounterHandle,
    tasks_failed: CounterHandle,
}

impl AgentMetrics {
    fn new(registry: &MetricsRegistry) -> Self {
        Self {
            inserted: registry.register_counter(
                "assets",
                "inserted",
                "Assets added to the registry, placeholders filled included",
            ),
            conflicts: registry.register_counter(
                "assets",
                "conflicts",
                "Adds rejected because the name was already populated",
            ),
            lookup_misses: registry.register_counter(
                "assets",
                "lookup_misses",
                "Typed lookups that found no populated entry",
            ),
            stale_completions: registry.register_counter(
                "assets",
                "stale_completions",
                "Loads that completed after the registry was torn down",
            ),
            bundles_opened: registry.register_counter(
                "bundles",
                "opened",
                "Bundles opened by the agent",
            ),
            bundles_closed: registry.register_counter(
                "bundles",
                "closed",
                "Manually opened bundles closed successfully",
            ),
            tasks_failed: registry.register_counter(
                "tasks",
                "failed",
                "Detached loads or closes that ended without reporting",
            ),
        }
    }

    fn record(&self, outcome: AddOutcome) {
        match outcome {
            AddOutcome::Conflict => self.conflicts.increment(),
            outcome if outcome.is_populated() => self.inserted.increment(),
            _ => {}
        }
    }
}

/// The AssetAgent owns the asset registry and every source that feeds it.
pub struct AssetAgent {
    source: Arc<dyn BundleSource>,
    config: AssetConfig,
    filter: NameFilter,
    resolver: PathResolver,
    registry: AssetRegistry,
    tracker: BundleTracker,
    hooks: PostLoadHookRegistry,
    loaders: EmbeddedLoaderRegistry,
    embedded: Vec<EmbeddedResource>,
    events: EventBus<LoadEvent>,
    in_flight: usize,
    initialized: bool,
    metrics_registry: Arc<MetricsRegistry>,
    metrics: AgentMetrics,
}

impl AssetAgent {
    /// Creates an agent with an empty registry over the host's bundle source.
    pub fn new(source: Arc<dyn BundleSource>, config: AssetConfig) -> Self {
        let metrics_registry = Arc::new(MetricsRegistry::new());
        let metrics = AgentMetrics::new(&metrics_registry);

        Self {
            source,
            filter: config.name_filter(),
            resolver: config.path_resolver(),
            config,
            registry: AssetRegistry::new(),
            tracker: BundleTracker::new(),
            hooks: PostLoadHookRegistry::new(),
            loaders: EmbeddedLoaderRegistry::new(),
            embedded: Vec::new(),
            events: EventBus::new(),
            in_flight: 0,
            initialized: false,
            metrics_registry,
            metrics,
        }
    }

    /// Reports counters into a shared registry instead of a private one.
    pub fn with_metrics_registry(mut self, registry: Arc<MetricsRegistry>) -> Self {
        self.metrics = AgentMetrics::new(&registry);
        self.metrics_registry = registry;
        self
    }

    /// Adds a post-load hook, run on manually loaded assets before registration.
    pub fn with_hook(mut self, hook: impl PostLoadHook + 'static) -> Self {
        self.hooks.register(hook);
        self
    }

    /// Registers a decoder for embedded resources ending in `.{extension}`.
    pub fn with_embedded_loader<A: Asset>(
        mut self,
        extension: &str,
        loader: impl AssetLoader<A> + Send + Sync + 'static,
    ) -> Self {
        self.loaders.register::<A>(extension, loader);
        self
    }

    /// Adds embedded resources for [`load_embedded_resources`](Self::load_embedded_resources).
    pub fn with_embedded_resources(
        mut self,
        resources: impl IntoIterator<Item = EmbeddedResource>,
    ) -> Self {
        self.embedded.extend(resources);
        self
    }

    /// Loads every desired asset out of the bundles currently open in the host.
    ///
    /// Runs at most once per agent: the guard is set on entry and never
    /// cleared, so every later call returns immediately. The call borrows the
    /// agent mutably across its awaits, so no second call can start while the
    /// first is still suspended. Detached loads that already finished are
    /// applied before the scan.
    pub async fn initialize(&mut self) {
        if self.initialized {
            log::debug!("Asset registry already initialized; skipping.");
            return;
        }
        self.initialized = true;
        self.process_events();

        for bundle in self.source.list_open_bundles() {
            for path in self.source.list_asset_paths(&bundle) {
                if self.filter.match_path(&path).is_none() {
                    continue;
                }
                let loaded = self.source.load_asset(&bundle, &path).await;
                match loaded {
                    Some(loaded) => self.register(loaded),
                    None => log::debug!(
                        "Loading \"{path}\" from bundle \"{}\" produced nothing",
                        bundle.name()
                    ),
                }
            }
        }
        log::info!(
            "Asset registry initialized with {} entries.",
            self.registry.len()
        );
    }

    /// Opens every configured bundle the host has not opened on its own.
    ///
    /// Each bundle is opened in sequence. The desired assets inside it are
    /// then loaded by detached tasks; this method returns without waiting for
    /// them. Their results are applied by [`process_events`](Self::process_events)
    /// or [`settle`](Self::settle).
    pub async fn manually_load_bundles(&mut self) {
        let bundle_names = self.config.manual_bundles.clone();

        for bundle_name in bundle_names {
            if self.tracker.contains_name(&bundle_name) {
                log::debug!("Bundle \"{bundle_name}\" was already loaded manually.");
                continue;
            }
            if self
                .source
                .list_open_bundles()
                .iter()
                .any(|open| open.name() == bundle_name)
            {
                log::debug!("Bundle \"{bundle_name}\" is already open; not loading it manually.");
                continue;
            }

            let path = self.resolver.resolve(&bundle_name);
            let opened = self.source.open_bundle(&path).await;
            let bundle = match opened {
                Ok(bundle) => bundle,
                Err(e) => {
                    log::warn!("Failed to load bundle \"{bundle_name}\": {e}");
                    continue;
                }
            };
            log::info!(
                "Manually loaded bundle \"{}\" from '{}'",
                bundle.name(),
                path.display()
            );
            self.metrics.bundles_opened.increment();
            self.tracker.track(bundle.clone());

            for asset_path in self.source.list_asset_paths(&bundle) {
                if self.filter.match_path(&asset_path).is_some() {
                    self.spawn_load(bundle.clone(), asset_path);
                }
            }
        }
    }

    /// Decodes the embedded resources and adds them to the registry.
    ///
    /// Resources without a loader, or that fail to decode, are skipped with a
    /// warning. Returns how many assets were added.
    pub fn load_embedded_resources(&mut self) -> usize {
        let mut added = 0;
        for resource in &self.embedded {
            match self.loaders.load(resource) {
                Ok(loaded) => {
                    let outcome = self.registry.try_add(loaded.into_handle());
                    self.metrics.record(outcome);
                    if outcome.is_populated() {
                        added += 1;
                    }
                }
                Err(e) => log::warn!("Skipping embedded resource: {e}"),
            }
        }
        log::debug!("Loaded {added} embedded resource(s).");
        added
    }

    /// Closes every bundle the agent opened and recycles active templates.
    ///
    /// Closes complete in detached tasks, but the bookkeeping is cleared
    /// before this returns. Must be called from within a Tokio runtime for
    /// the closes to be issued.
    pub fn unload_manual_bundles(&mut self) {
        for bundle in self.tracker.drain() {
            let source = Arc::clone(&self.source);
            let sender = self.events.sender();
            let what = format!("closing bundle \"{}\"", bundle.name());

            self.spawn_detached(&what, async move {
                let result = source.close_bundle(&bundle, true).await;
                if sender.send(LoadEvent::Closed { bundle, result }).is_err() {
                    log::debug!("Asset agent dropped before a bundle close completed.");
                }
            });
        }

        for (name, template) in self.registry.templates() {
            if template.is_active() {
                log::info!("Recycling all instances of template \"{name}\"");
                template.recycle_all();
            }
        }
    }

    /// Destroys every stored asset and empties the registry.
    ///
    /// Loads still in flight are discarded when they complete.
    pub fn unload_all(&mut self) {
        self.registry.unload_all();
    }

    /// Looks up a populated asset by type and name.
    pub fn try_get<T: Asset>(&self, name: &str) -> Result<AssetHandle<T>, LookupError> {
        let result = self.registry.try_get::<T>(name);
        if result.is_err() {
            self.metrics.lookup_misses.increment();
        }
        result
    }

    /// Looks up a populated asset, discarding the failure cause.
    pub fn get<T: Asset>(&self, name: &str) -> Option<AssetHandle<T>> {
        self.try_get::<T>(name).ok()
    }

    /// Whether any type holds a populated asset called `name`.
    pub fn has(&self, name: &str) -> bool {
        self.registry.has(name)
    }

    /// Applies every completion already reported by detached tasks.
    ///
    /// Never blocks. Returns the number of events applied.
    pub fn process_events(&mut self) -> usize {
        let mut applied = 0;
        loop {
            let event = match self.events.receiver().try_recv() {
                Ok(event) => event,
                Err(_) => break,
            };
            self.apply_event(event);
            applied += 1;
        }
        applied
    }

    /// Waits for every detached task issued so far and applies its result.
    ///
    /// A task that panics is reported as failed rather than waited on forever.
    pub async fn settle(&mut self) {
        self.process_events();
        while self.in_flight > 0 {
            let next = self.events.receiver().recv_async().await;
            match next {
                Ok(event) => self.apply_event(event),
                Err(_) => break,
            }
        }
    }

    /// Detached loads and closes that have not reported back yet.
    pub fn in_flight(&self) -> usize {
        self.in_flight
    }

    /// Whether [`initialize`](Self::initialize) has been called.
    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    /// The registry, as of the last applied event.
    pub fn registry(&self) -> &AssetRegistry {
        &self.registry
    }

    /// The bundles the agent opened and has not closed yet.
    pub fn tracker(&self) -> &BundleTracker {
        &self.tracker
    }

    /// The configuration the agent was created with.
    pub fn config(&self) -> &AssetConfig {
        &self.config
    }

    /// The registry the agent's counters are reported into.
    pub fn metrics(&self) -> &Arc<MetricsRegistry> {
        &self.metrics_registry
    }

    fn register(&mut self, loaded: LoadedAsset) {
        let outcome = self.registry.try_add(loaded.into_handle());
        self.metrics.record(outcome);
    }

    fn spawn_load(&mut self, bundle: BundleHandle, path: String) {
        let source = Arc::clone(&self.source);
        let hooks = self.hooks.clone();
        let sender = self.events.sender();
        let generation = self.registry.generation();
        let what = format!("loading \"{path}\" from bundle \"{}\"", bundle.name());

        self.spawn_detached(&what, async move {
            let mut asset = source.load_asset(&bundle, &path).await;
            if let Some(loaded) = asset.as_mut() {
                hooks.apply(bundle.name(), loaded);
            }

            let event = LoadEvent::Loaded {
                generation,
                bundle,
                path,
                asset,
            };
            if let Err(flume::SendError(LoadEvent::Loaded {
                path,
                asset: Some(asset),
                ..
            })) = sender.send(event)
            {
                log::debug!("Asset agent dropped before \"{path}\" finished loading.");
                asset.destroy();
            }
        });
    }

    fn spawn_detached<F>(&mut self, what: &str, task: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        match tokio::runtime::Handle::try_current() {
            Ok(runtime) => {
                let task = runtime.spawn(task);
                let sender = self.events.sender();
                let what = what.to_owned();
                // Watches the task so a panic still reports back.
                runtime.spawn(async move {
                    if let Err(error) = task.await {
                        if sender.send(LoadEvent::Failed { what, error }).is_err() {
                            log::debug!("Asset agent dropped before a failed task reported.");
                        }
                    }
                });
                self.in_flight += 1;
            }
            Err(_) => log::warn!("No async runtime available; {what} was not started."),
        }
    }

    fn apply_event(&mut self, event: LoadEvent) {
        self.in_flight = self.in_flight.saturating_sub(1);

        match event {
            LoadEvent::Loaded {
                generation,
                bundle,
                path,
                asset,
            } => {
                if generation != self.registry.generation() {
                    log::debug!(
                        "Discarding \"{path}\" from bundle \"{}\"; the registry was unloaded while it was loading.",
                        bundle.name()
                    );
                    if let Some(asset) = asset {
                        asset.destroy();
                    }
                    self.metrics.stale_completions.increment();
                    return;
                }
                match asset {
                    Some(loaded) => self.register(loaded),
                    None => log::debug!(
                        "Loading \"{path}\" from bundle \"{}\" produced nothing",
                        bundle.name()
                    ),
                }
            }
            LoadEvent::Closed { bundle, result } => match result {
                Ok(()) => {
                    log::info!("Successfully unloaded bundle \"{}\"", bundle.name());
                    self.metrics.bundles_closed.increment();
                }
                Err(e) => log::warn!("Failed to unload bundle \"{}\": {e}", bundle.name()),
            },
            LoadEvent::Failed { what, error } => {
                log::warn!("Task {what} ended without reporting: {error}");
                self.metrics.tasks_failed.increment();
            }
        }
    }
}
