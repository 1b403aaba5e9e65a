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

// Satchel Runtime
// Demo binary running the asset registry through one full host session

mod demo;

use std::sync::Arc;

use anyhow::{Context, Result};
use satchel_agents::AssetAgent;
use satchel_core::config::AssetConfig;
use satchel_infra::{ImageTextureLoader, Texture};
use satchel_telemetry::{init_logging, MetricsRegistry};

use demo::{AudioClip, Prefab};

const DEFAULT_CONFIG: &str = include_str!("../assets.ron");

fn load_config() -> Result<AssetConfig> {
    match std::env::args().nth(1) {
        Some(path) => AssetConfig::from_file(&path)
            .with_context(|| format!("loading asset config from '{path}'")),
        None => AssetConfig::from_ron_str(DEFAULT_CONFIG).context("parsing the built-in asset config"),
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    init_logging("info");

    let config = load_config()?;
    let metrics = Arc::new(MetricsRegistry::new());
    let source = Arc::new(demo::host_catalogue(&config)?);

    let mut agent = AssetAgent::new(source, config)
        .with_metrics_registry(metrics.clone())
        .with_hook(demo::tendril_hook())
        .with_embedded_loader::<Texture>("png", ImageTextureLoader)
        .with_embedded_resources(demo::embedded_resources()?);

    // Scene entered: scan what the host has open, then open what it does not.
    agent.initialize().await;
    agent.load_embedded_resources();
    agent.manually_load_bundles().await;
    log::info!(
        "{} bundle(s) opened manually, {} load(s) in flight",
        agent.tracker().len(),
        agent.in_flight()
    );
    agent.settle().await;

    if let Some(tendril) = agent.get::<Prefab>("Lost Lace Ground Tendril") {
        log::info!(
            "Tendril bounds: x <= {}, {} <= y <= {}",
            tendril.x_max,
            tendril.y_min,
            tendril.y_max
        );
    }
    if let Some(clip) = agent.get::<AudioClip>("Audio Player Actor Simple") {
        log::info!("Audio player clip lasts {:.1}s", clip.seconds);
    }
    if let Some(atlas) = agent.get::<Texture>("Atlas") {
        log::info!("Atlas is {}x{}", atlas.width, atlas.height);
    }
    // Deliberate miss: the spit is a prefab, not a clip.
    let _ = agent.try_get::<AudioClip>("mini_mawlek_spit");

    // Scene exited: close our bundles, then drop everything.
    agent.unload_manual_bundles();
    agent.settle().await;
    agent.unload_all();

    println!("{}", serde_json::to_string_pretty(&metrics.snapshot())?);
    Ok(())
}
