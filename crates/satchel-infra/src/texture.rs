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

//! Embedded textures decoded with the `image` crate.

use satchel_core::asset::{Asset, AssetLoader};
use std::error::Error;

/// A decoded texture in tightly packed 8-bit RGBA.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Texture {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    /// Row-major RGBA8 pixels, `width * height * 4` bytes.
    pub rgba: Vec<u8>,
}

impl Asset for Texture {}

impl Texture {
    /// The RGBA value of one pixel, or `None` outside the texture.
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let offset = (y as usize)
            .checked_mul(self.width as usize)?
            .checked_add(x as usize)?
            .checked_mul(4)?;
        let px = self.rgba.get(offset..offset.checked_add(4)?)?;
        Some([px[0], px[1], px[2], px[3]])
    }
}

/// Decodes any format `image` recognises (PNG, JPEG, ...) into a [`Texture`].
#[derive(Debug, Clone, Copy, Default)]
pub struct ImageTextureLoader;

impl AssetLoader<Texture> for ImageTextureLoader {
    fn load(&self, bytes: &[u8]) -> Result<Texture, Box<dyn Error + Send + Sync>> {
        let decoded = image::load_from_memory(bytes)?.to_rgba8();
        Ok(Texture {
            width: decoded.width(),
            height: decoded.height(),
            rgba: decoded.into_raw(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{ImageFormat, Rgba, RgbaImage};
    use std::io::Cursor;

    fn png(width: u32, height: u32) -> Vec<u8> {
        let mut img = RgbaImage::from_pixel(width, height, Rgba([10, 20, 30, 255]));
        img.put_pixel(1, 0, Rgba([255, 0, 0, 128]));
        let mut bytes = Vec::new();
        img.write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)
            .expect("encoding a PNG in memory should not fail");
        bytes
    }

    #[test]
    fn decodes_png_into_rgba() {
        let texture = ImageTextureLoader.load(&png(3, 2)).unwrap();
        assert_eq!((texture.width, texture.height), (3, 2));
        assert_eq!(texture.rgba.len(), 3 * 2 * 4);
        assert_eq!(texture.pixel(0, 0), Some([10, 20, 30, 255]));
        assert_eq!(texture.pixel(1, 0), Some([255, 0, 0, 128]));
        assert_eq!(texture.pixel(3, 0), None);
    }

    #[test]
    fn pixel_offset_does_not_overflow_on_huge_dimensions() {
        let texture = Texture {
            width: u32::MAX,
            height: 4,
            rgba: Vec::new(),
        };
        assert_eq!(texture.pixel(7, 3), None);
        assert_eq!(texture.pixel(u32::MAX - 1, 3), None);
    }

    #[test]
    fn rejects_garbage() {
        assert!(ImageTextureLoader.load(b"not an image").is_err());
    }
}
