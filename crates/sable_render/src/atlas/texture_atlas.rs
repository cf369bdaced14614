//! Single texture atlas
//!
//! Sprites are buffered as RGBA8 until [`TextureAtlas::generate`] packs them
//! largest-first, composites one image, uploads it with a full mip chain and
//! drops the buffered pixels. Generation is one-way: once it succeeds the
//! atlas is read-only.

use crate::atlas::mipmap::build_mip_chain;
use crate::atlas::packer::{AtlasPacker, PixelRect};
use crate::backend::{MipLevel, RenderBackend, TextureHandle};
use crate::error::AtlasError;
use glam::Vec2;
use std::collections::HashMap;
use std::path::Path;
use tracing::{debug, error, info};

/// Transparent border reserved on every side of a packed sprite.
pub const SPRITE_PADDING: u32 = 1;

/// Packed location of a sprite in normalized atlas coordinates.
///
/// `uv_min` is the top-left corner and `uv_max` the bottom-right; v grows
/// downward like the image rows. `size` is the unpadded size in pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpriteUv {
    pub uv_min: Vec2,
    pub uv_max: Vec2,
    pub size: Vec2,
}

impl SpriteUv {
    /// Rectangles touching only at an edge do not count as overlapping.
    pub fn overlaps(&self, other: &SpriteUv) -> bool {
        self.uv_min.x < other.uv_max.x
            && other.uv_min.x < self.uv_max.x
            && self.uv_min.y < other.uv_max.y
            && other.uv_min.y < self.uv_max.y
    }
}

/// Packing summary for diagnostics.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AtlasStats {
    pub width: u32,
    pub height: u32,
    pub sprite_count: usize,
    /// Pixels reserved by packed sprites, padding included.
    pub used_pixels: u64,
    /// `used_pixels` as a percentage of the atlas area.
    pub utilization: f32,
}

struct PendingSprite {
    name: String,
    width: u32,
    height: u32,
    rgba: Vec<u8>,
}

pub struct TextureAtlas {
    width: u32,
    height: u32,
    pending: Vec<PendingSprite>,
    uvs: HashMap<String, SpriteUv>,
    rects: HashMap<String, PixelRect>,
    texture: Option<TextureHandle>,
    used_pixels: u64,
}

impl TextureAtlas {
    pub fn new(width: u32, height: u32) -> Result<Self, AtlasError> {
        if width == 0 || height == 0 {
            return Err(AtlasError::InvalidDimensions { width, height });
        }
        Ok(Self {
            width,
            height,
            pending: Vec::new(),
            uvs: HashMap::new(),
            rects: HashMap::new(),
            texture: None,
            used_pixels: 0,
        })
    }

    /// Decode an image file (PNG, JPEG or BMP) into RGBA8 and buffer it.
    pub fn add_sprite_from_file(&mut self, name: &str, path: impl AsRef<Path>) -> Result<(), AtlasError> {
        let path = path.as_ref();
        self.check_can_add(name)?;

        let image = image::open(path)
            .map_err(|source| {
                error!(sprite = name, path = %path.display(), %source, "failed to load sprite");
                AtlasError::Load {
                    sprite: name.to_string(),
                    path: path.to_path_buf(),
                    source,
                }
            })?
            .to_rgba8();
        let (width, height) = image.dimensions();
        self.push_rgba(name, width, height, image.into_raw())
    }

    /// Buffer raw pixels. `channels` is 1 (gray), 2 (gray + alpha), 3 (RGB)
    /// or 4 (RGBA); rows run top to bottom.
    pub fn add_sprite(
        &mut self,
        name: &str,
        data: &[u8],
        width: u32,
        height: u32,
        channels: u32,
    ) -> Result<(), AtlasError> {
        self.check_can_add(name)?;
        if !(1..=4).contains(&channels) {
            return Err(AtlasError::UnsupportedChannels {
                sprite: name.to_string(),
                channels,
            });
        }
        let expected = width as usize * height as usize * channels as usize;
        if data.len() != expected {
            return Err(AtlasError::PixelDataSize {
                sprite: name.to_string(),
                expected,
                actual: data.len(),
            });
        }

        let rgba = to_rgba8(data, channels as usize);
        self.push_rgba(name, width, height, rgba)
    }

    fn check_can_add(&self, name: &str) -> Result<(), AtlasError> {
        if self.is_generated() {
            error!(sprite = name, "cannot add sprite to a generated atlas");
            return Err(AtlasError::AlreadyGenerated {
                sprite: name.to_string(),
            });
        }
        if self.pending.iter().any(|s| s.name == name) {
            error!(sprite = name, "sprite already exists in atlas");
            return Err(AtlasError::DuplicateSprite {
                sprite: name.to_string(),
            });
        }
        Ok(())
    }

    fn push_rgba(&mut self, name: &str, width: u32, height: u32, rgba: Vec<u8>) -> Result<(), AtlasError> {
        if width == 0 || height == 0 {
            return Err(AtlasError::EmptySprite {
                sprite: name.to_string(),
            });
        }
        debug!(sprite = name, width, height, "sprite buffered");
        self.pending.push(PendingSprite {
            name: name.to_string(),
            width,
            height,
            rgba,
        });
        Ok(())
    }

    /// Pack, composite and upload every buffered sprite.
    ///
    /// Calling this on a generated atlas is a no-op. On failure nothing is
    /// committed and the buffered sprites are kept.
    pub fn generate(&mut self, backend: &mut dyn RenderBackend) -> Result<(), AtlasError> {
        if self.is_generated() {
            return Ok(());
        }

        // Stable sort: equal areas keep insertion order.
        let mut order: Vec<usize> = (0..self.pending.len()).collect();
        order.sort_by_key(|&i| std::cmp::Reverse(self.pending[i].width as u64 * self.pending[i].height as u64));

        let mut packer = AtlasPacker::new(self.width, self.height);
        let mut placements = Vec::with_capacity(order.len());
        for &i in &order {
            let sprite = &self.pending[i];
            let padded = packer.insert(
                sprite.width + SPRITE_PADDING * 2,
                sprite.height + SPRITE_PADDING * 2,
            );
            let Some(padded) = padded else {
                error!(
                    sprite = %sprite.name,
                    width = sprite.width,
                    height = sprite.height,
                    atlas_width = self.width,
                    atlas_height = self.height,
                    "failed to pack sprite into atlas"
                );
                return Err(AtlasError::DoesNotFit {
                    sprite: sprite.name.clone(),
                    width: sprite.width,
                    height: sprite.height,
                    atlas_width: self.width,
                    atlas_height: self.height,
                });
            };
            placements.push((i, padded.inset(SPRITE_PADDING)));
        }

        let mut pixels = vec![0u8; self.width as usize * self.height as usize * 4];
        for &(i, rect) in &placements {
            blit(&mut pixels, self.width, &self.pending[i], rect);
        }

        let levels = build_mip_chain(MipLevel::new(self.width, self.height, pixels));
        let texture = backend.create_texture("sprite atlas", &levels)?;

        let (w, h) = (self.width as f32, self.height as f32);
        for (i, rect) in placements {
            let sprite = &self.pending[i];
            self.uvs.insert(
                sprite.name.clone(),
                SpriteUv {
                    uv_min: Vec2::new(rect.x as f32 / w, rect.y as f32 / h),
                    uv_max: Vec2::new(rect.right() as f32 / w, rect.bottom() as f32 / h),
                    size: Vec2::new(sprite.width as f32, sprite.height as f32),
                },
            );
            self.rects.insert(sprite.name.clone(), rect);
        }
        self.used_pixels = packer.used_area();
        self.texture = Some(texture);
        self.pending = Vec::new();

        info!(
            sprites = self.uvs.len(),
            width = self.width,
            height = self.height,
            mip_levels = levels.len(),
            %texture,
            "atlas generated"
        );
        Ok(())
    }

    /// UV rectangle of a packed sprite. `None` before generation.
    pub fn sprite_uv(&self, name: &str) -> Option<&SpriteUv> {
        self.uvs.get(name)
    }

    /// Unpadded pixel rectangle of a packed sprite.
    pub fn sprite_rect(&self, name: &str) -> Option<PixelRect> {
        self.rects.get(name).copied()
    }

    /// True if `name` is buffered or packed here.
    pub fn contains(&self, name: &str) -> bool {
        self.uvs.contains_key(name) || self.pending.iter().any(|s| s.name == name)
    }

    /// Packed sprite names, sorted.
    pub fn sprite_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.uvs.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    pub fn texture(&self) -> Option<TextureHandle> {
        self.texture
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn is_generated(&self) -> bool {
        self.texture.is_some()
    }

    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }

    pub fn stats(&self) -> AtlasStats {
        let total = self.width as u64 * self.height as u64;
        AtlasStats {
            width: self.width,
            height: self.height,
            sprite_count: self.uvs.len(),
            used_pixels: self.used_pixels,
            utilization: self.used_pixels as f32 / total as f32 * 100.0,
        }
    }
}

fn to_rgba8(data: &[u8], channels: usize) -> Vec<u8> {
    if channels == 4 {
        return data.to_vec();
    }
    let mut rgba = Vec::with_capacity(data.len() / channels * 4);
    for px in data.chunks_exact(channels) {
        let texel = match *px {
            [g] => [g, g, g, 255],
            [g, a] => [g, g, g, a],
            [r, g, b] => [r, g, b, 255],
            _ => [0, 0, 0, 0],
        };
        rgba.extend_from_slice(&texel);
    }
    rgba
}

fn blit(dst: &mut [u8], dst_width: u32, sprite: &PendingSprite, rect: PixelRect) {
    let row_bytes = sprite.width as usize * 4;
    for row in 0..sprite.height as usize {
        let src = row * row_bytes;
        let dst_start = ((rect.y as usize + row) * dst_width as usize + rect.x as usize) * 4;
        dst[dst_start..dst_start + row_bytes].copy_from_slice(&sprite.rgba[src..src + row_bytes]);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::headless::HeadlessBackend;

    fn solid(width: u32, height: u32, rgba: [u8; 4]) -> Vec<u8> {
        rgba.repeat((width * height) as usize)
    }

    #[test]
    fn generate_packs_and_uploads() {
        let mut backend = HeadlessBackend::new();
        let mut atlas = TextureAtlas::new(64, 64).unwrap();
        atlas.add_sprite("red", &solid(16, 16, [255, 0, 0, 255]), 16, 16, 4).unwrap();
        atlas.add_sprite("blue", &solid(8, 8, [0, 0, 255, 255]), 8, 8, 4).unwrap();

        assert!(atlas.sprite_uv("red").is_none());
        atlas.generate(&mut backend).unwrap();

        let tex = atlas.texture().unwrap();
        assert_eq!(backend.texture(tex).unwrap().levels.len(), 7);
        assert_eq!(atlas.pending_count(), 0);
        assert_eq!(atlas.sprite_names(), vec!["blue", "red"]);

        let red = atlas.sprite_uv("red").unwrap();
        let blue = atlas.sprite_uv("blue").unwrap();
        assert!(!red.overlaps(blue));
        assert_eq!(red.size, Vec2::new(16.0, 16.0));
    }

    #[test]
    fn largest_sprite_is_packed_first_with_padding() {
        let mut backend = HeadlessBackend::new();
        let mut atlas = TextureAtlas::new(64, 64).unwrap();
        atlas.add_sprite("small", &solid(4, 4, [1, 1, 1, 255]), 4, 4, 4).unwrap();
        atlas.add_sprite("big", &solid(20, 20, [2, 2, 2, 255]), 20, 20, 4).unwrap();
        atlas.generate(&mut backend).unwrap();

        assert_eq!(atlas.sprite_rect("big"), Some(PixelRect::new(1, 1, 20, 20)));
        let big = atlas.sprite_uv("big").unwrap();
        assert_eq!(big.uv_min, Vec2::new(1.0 / 64.0, 1.0 / 64.0));
        assert_eq!(big.uv_max, Vec2::new(21.0 / 64.0, 21.0 / 64.0));

        // padding stays transparent
        let tex = atlas.texture().unwrap();
        assert_eq!(backend.pixel(tex, 0, 0), Some([0, 0, 0, 0]));
        assert_eq!(backend.pixel(tex, 1, 1), Some([2, 2, 2, 255]));
    }

    #[test]
    fn sampled_pixels_match_source() {
        let mut backend = HeadlessBackend::new();
        let mut atlas = TextureAtlas::new(32, 32).unwrap();
        // 2x2 with distinct corners, rows top to bottom
        let quad = [
            10, 0, 0, 255, 20, 0, 0, 255, //
            30, 0, 0, 255, 40, 0, 0, 255,
        ];
        atlas.add_sprite("quad", &quad, 2, 2, 4).unwrap();
        atlas.generate(&mut backend).unwrap();

        let uv = atlas.sprite_uv("quad").unwrap();
        let tex = atlas.texture().unwrap();
        let texel = Vec2::new(1.0 / 32.0, 1.0 / 32.0);
        let top_left = uv.uv_min + texel * 0.5;
        let bottom_right = uv.uv_max - texel * 0.5;
        assert_eq!(backend.sample(tex, top_left), Some([10, 0, 0, 255]));
        assert_eq!(backend.sample(tex, bottom_right), Some([40, 0, 0, 255]));
    }

    #[test]
    fn mixed_sprite_sizes_keep_every_texel() {
        let sizes = [(7, 3), (13, 29), (1, 1), (31, 5), (9, 9), (17, 2)];
        let texel = |id: u8, x: u32, y: u32| [x as u8, y as u8, id, 255];

        let mut backend = HeadlessBackend::new();
        let mut atlas = TextureAtlas::new(128, 128).unwrap();
        for (id, &(w, h)) in sizes.iter().enumerate() {
            let pixels: Vec<u8> = (0..h)
                .flat_map(|y| (0..w).flat_map(move |x| texel(id as u8, x, y)))
                .collect();
            atlas.add_sprite(&format!("s{id}"), &pixels, w, h, 4).unwrap();
        }
        atlas.generate(&mut backend).unwrap();

        let tex = atlas.texture().unwrap();
        let mut off_origin = 0;
        for (id, &(w, h)) in sizes.iter().enumerate() {
            let rect = atlas.sprite_rect(&format!("s{id}")).unwrap();
            assert_eq!((rect.width, rect.height), (w, h));
            if rect.x > 1 || rect.y > 1 {
                off_origin += 1;
            }
            for y in 0..h {
                for x in 0..w {
                    assert_eq!(
                        backend.pixel(tex, rect.x + x, rect.y + y),
                        Some(texel(id as u8, x, y)),
                        "sprite s{id} texel ({x}, {y})"
                    );
                }
            }
        }
        assert_eq!(off_origin, sizes.len() - 1);
    }

    #[test]
    fn channel_counts_expand_to_rgba() {
        assert_eq!(to_rgba8(&[7], 1), vec![7, 7, 7, 255]);
        assert_eq!(to_rgba8(&[7, 9], 2), vec![7, 7, 7, 9]);
        assert_eq!(to_rgba8(&[1, 2, 3], 3), vec![1, 2, 3, 255]);
    }

    #[test]
    fn invalid_inputs_are_rejected() {
        let mut atlas = TextureAtlas::new(16, 16).unwrap();
        assert!(matches!(
            atlas.add_sprite("x", &[0; 3], 2, 2, 1),
            Err(AtlasError::PixelDataSize { expected: 4, actual: 3, .. })
        ));
        assert!(matches!(
            atlas.add_sprite("x", &[0; 20], 2, 2, 5),
            Err(AtlasError::UnsupportedChannels { channels: 5, .. })
        ));
        assert!(matches!(
            atlas.add_sprite("x", &[], 0, 2, 4),
            Err(AtlasError::EmptySprite { .. })
        ));
        assert!(TextureAtlas::new(0, 16).is_err());
    }

    #[test]
    fn duplicate_names_are_rejected() {
        let mut atlas = TextureAtlas::new(16, 16).unwrap();
        atlas.add_sprite("a", &[0; 4], 1, 1, 4).unwrap();
        assert!(matches!(
            atlas.add_sprite("a", &[0; 4], 1, 1, 4),
            Err(AtlasError::DuplicateSprite { .. })
        ));
    }

    #[test]
    fn adding_after_generation_fails() {
        let mut backend = HeadlessBackend::new();
        let mut atlas = TextureAtlas::new(16, 16).unwrap();
        atlas.add_sprite("a", &[0; 4], 1, 1, 4).unwrap();
        atlas.generate(&mut backend).unwrap();

        assert!(matches!(
            atlas.add_sprite("b", &[0; 4], 1, 1, 4),
            Err(AtlasError::AlreadyGenerated { .. })
        ));
        // second generate is a no-op
        atlas.generate(&mut backend).unwrap();
        assert_eq!(backend.texture_count(), 1);
    }

    #[test]
    fn oversized_sprite_fails_without_committing() {
        let mut backend = HeadlessBackend::new();
        let mut atlas = TextureAtlas::new(16, 16).unwrap();
        atlas.add_sprite("ok", &solid(4, 4, [1; 4]), 4, 4, 4).unwrap();
        atlas.add_sprite("huge", &solid(15, 15, [1; 4]), 15, 15, 4).unwrap();

        assert!(matches!(
            atlas.generate(&mut backend),
            Err(AtlasError::DoesNotFit { ref sprite, .. }) if sprite == "huge"
        ));
        assert!(!atlas.is_generated());
        assert!(atlas.sprite_uv("ok").is_none());
        assert_eq!(atlas.pending_count(), 2);
        assert_eq!(backend.texture_count(), 0);
    }

    #[test]
    fn stats_report_utilization() {
        let mut backend = HeadlessBackend::new();
        let mut atlas = TextureAtlas::new(10, 10).unwrap();
        atlas.add_sprite("a", &solid(3, 3, [9; 4]), 3, 3, 4).unwrap();
        atlas.generate(&mut backend).unwrap();

        let stats = atlas.stats();
        assert_eq!(stats.sprite_count, 1);
        assert_eq!(stats.used_pixels, 25);
        assert!((stats.utilization - 25.0).abs() < 1e-4);
    }
}
