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

//! A stand-in host: a handful of assets, one bundle the host has open and
//! one it leaves on disk for the agent to open.

use anyhow::{Context, Result};
use satchel_agents::asset_agent::{EmbeddedResource, NamedAssetHook};
use satchel_core::asset::{Asset, PooledTemplate};
use satchel_core::config::AssetConfig;
use satchel_infra::{AssetEntry, BundleDefinition, MemoryBundleSource};
use std::io::Cursor;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

/// A spawnable template with bounds its instances are constrained to.
#[derive(Debug, Clone)]
pub struct Prefab {
    pub x_max: f32,
    pub y_min: f32,
    pub y_max: f32,
    pub active: bool,
}

impl Prefab {
    fn new() -> Self {
        Self {
            x_max: 40.0,
            y_min: -10.0,
            y_max: 40.0,
            active: true,
        }
    }
}

impl PooledTemplate for Prefab {
    fn is_active(&self) -> bool {
        self.active
    }

    fn recycle_all(&self) {
        log::debug!("Returned every pooled instance to its pool");
    }
}

impl Asset for Prefab {
    fn as_template(&self) -> Option<&dyn PooledTemplate> {
        Some(self)
    }
}

#[derive(Debug)]
pub struct AudioClip {
    pub seconds: f32,
    released: AtomicBool,
}

impl AudioClip {
    fn new(seconds: f32) -> Self {
        Self {
            seconds,
            released: AtomicBool::new(false),
        }
    }
}

impl Asset for AudioClip {
    fn destroy(&self) {
        if !self.released.swap(true, Ordering::SeqCst) {
            log::debug!("Released {:.1}s of audio samples", self.seconds);
        }
    }
}

/// Widens the tendril's bounds once it is loaded out of the manual bundle.
pub fn tendril_hook() -> NamedAssetHook<Prefab, impl Fn(&mut Prefab) + Send + Sync + 'static> {
    NamedAssetHook::new("Lost Lace Ground Tendril", |tendril: &mut Prefab| {
        tendril.x_max = 100.0;
        tendril.y_min = 0.0;
        tendril.y_max = 100.0;
    })
}

/// Builds the host catalogue the configured names and bundles refer to.
pub fn host_catalogue(config: &AssetConfig) -> Result<MemoryBundleSource> {
    let source = MemoryBundleSource::new().with_latency(Duration::from_millis(5));

    source
        .open_host_bundle(
            BundleDefinition::new("shared_assets")
                .with_asset(AssetEntry::new(
                    "assets/audio/audio player actor simple",
                    "Audio Player Actor Simple",
                    || AudioClip::new(1.5),
                ))
                .with_asset(AssetEntry::new(
                    "assets/prefabs/enemies/mini_mawlek_spit",
                    "mini_mawlek_spit",
                    Prefab::new,
                ))
                .with_asset(AssetEntry::new(
                    "assets/prefabs/enemies/mini_mawlek",
                    "mini_mawlek",
                    Prefab::new,
                )),
        )
        .context("opening the shared host bundle")?;

    let resolver = config.path_resolver();
    for bundle_name in &config.manual_bundles {
        source.register_bundle_file(
            resolver.resolve(bundle_name),
            BundleDefinition::new(bundle_name.as_str())
                .with_asset(
                    AssetEntry::new(
                        "assets/prefabs/Lost Lace Ground Tendril",
                        "Lost Lace Ground Tendril",
                        Prefab::new,
                    )
                    .with_latency(Duration::from_millis(20)),
                )
                .with_asset(AssetEntry::new(
                    "assets/prefabs/Abyss Vomit Glob",
                    "Abyss Vomit Glob",
                    Prefab::new,
                ))
                // The host also ships the spit here; the agent keeps the first one.
                .with_asset(AssetEntry::new(
                    "assets/prefabs/enemies/mini_mawlek_spit",
                    "mini_mawlek_spit",
                    Prefab::new,
                )),
        );
    }
    Ok(source)
}

/// A texture atlas encoded at startup, standing in for a compiled-in resource.
pub fn embedded_resources() -> Result<Vec<EmbeddedResource>> {
    let atlas = image::RgbaImage::from_fn(16, 8, |x, y| {
        image::Rgba([(x * 16) as u8, (y * 32) as u8, 128, 255])
    });
    let mut bytes = Vec::new();
    atlas
        .write_to(&mut Cursor::new(&mut bytes), image::ImageFormat::Png)
        .context("encoding the demo atlas")?;

    Ok(vec![EmbeddedResource::new("Satchel.Assets.Atlas.png", bytes)])
}
