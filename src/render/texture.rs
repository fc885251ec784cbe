use std::collections::HashMap;

use image::RgbaImage;
use image::imageops::{self, FilterType};

use crate::traits::render::TextureId;

/// GPU resources for an uploaded atlas image.
pub struct TextureEntry {
    pub wgpu_texture: wgpu::Texture,
    pub view: wgpu::TextureView,
    pub bind_group: wgpu::BindGroup,
    pub width: u32,
    pub height: u32,
    pub mip_levels: u32,
}

/// Owns uploaded textures and hands out ids.
pub struct TextureManager {
    textures: HashMap<TextureId, TextureEntry>,
    next_id: u64,
}

impl Default for TextureManager {
    fn default() -> Self {
        Self {
            textures: HashMap::new(),
            next_id: 1,
        }
    }
}

impl TextureManager {
    pub fn new() -> Self {
        Self::default()
    }

    fn alloc_id(&mut self) -> TextureId {
        let id = TextureId(self.next_id);
        self.next_id += 1;
        id
    }

    /// Upload an image with premultiplied alpha.
    ///
    /// Power-of-two images get a full mip chain and trilinear filtering;
    /// others get one level, clamp-to-edge and bilinear filtering.
    pub fn create(
        &mut self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        bind_group_layout: &wgpu::BindGroupLayout,
        image: &RgbaImage,
    ) -> TextureId {
        let mut base = image.clone();
        premultiply_alpha(&mut base);

        let levels = if is_power_of_two(base.width()) && is_power_of_two(base.height()) {
            build_mip_chain(base)
        } else {
            vec![base]
        };

        let id = self.alloc_id();
        let entry = create_texture_entry(device, queue, bind_group_layout, &levels);
        tracing::debug!(
            "uploaded texture {:?} {}x{} with {} mip level(s)",
            id,
            entry.width,
            entry.height,
            entry.mip_levels
        );
        self.textures.insert(id, entry);
        id
    }

    /// Get texture dimensions.
    pub fn size(&self, id: TextureId) -> Option<(u32, u32)> {
        self.textures.get(&id).map(|e| (e.width, e.height))
    }

    /// Get texture entry for rendering.
    pub fn get(&self, id: TextureId) -> Option<&TextureEntry> {
        self.textures.get(&id)
    }

    /// Remove a texture by ID, freeing GPU resources.
    pub fn remove(&mut self, id: TextureId) -> bool {
        self.textures.remove(&id).is_some()
    }
}

/// Scale colour channels by alpha in place.
pub fn premultiply_alpha(image: &mut RgbaImage) {
    for pixel in image.pixels_mut() {
        let a = pixel[3] as u32;
        for channel in &mut pixel.0[..3] {
            *channel = ((*channel as u32 * a + 127) / 255) as u8;
        }
    }
}

pub fn is_power_of_two(value: u32) -> bool {
    value != 0 && value & (value - 1) == 0
}

/// Number of levels down to 1x1.
pub fn mip_level_count(width: u32, height: u32) -> u32 {
    32 - width.max(height).max(1).leading_zeros()
}

/// Base level followed by successively halved levels down to 1x1.
pub fn build_mip_chain(base: RgbaImage) -> Vec<RgbaImage> {
    let count = mip_level_count(base.width(), base.height()) as usize;
    let mut levels = Vec::with_capacity(count);
    levels.push(base);
    while levels.len() < count {
        let Some(prev) = levels.last() else { break };
        let w = (prev.width() / 2).max(1);
        let h = (prev.height() / 2).max(1);
        let next = imageops::resize(prev, w, h, FilterType::Triangle);
        levels.push(next);
    }
    levels
}

fn create_texture_entry(
    device: &wgpu::Device,
    queue: &wgpu::Queue,
    bind_group_layout: &wgpu::BindGroupLayout,
    levels: &[RgbaImage],
) -> TextureEntry {
    let (width, height) = levels
        .first()
        .map(|l| l.dimensions())
        .unwrap_or((1, 1));
    let mip_levels = levels.len().max(1) as u32;
    let size = wgpu::Extent3d {
        width,
        height,
        depth_or_array_layers: 1,
    };

    let texture = device.create_texture(&wgpu::TextureDescriptor {
        label: Some("atlas_texture"),
        size,
        mip_level_count: mip_levels,
        sample_count: 1,
        dimension: wgpu::TextureDimension::D2,
        format: wgpu::TextureFormat::Rgba8Unorm,
        usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
        view_formats: &[],
    });

    for (level, data) in levels.iter().enumerate() {
        let (w, h) = data.dimensions();
        queue.write_texture(
            wgpu::TexelCopyTextureInfo {
                texture: &texture,
                mip_level: level as u32,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            data.as_raw(),
            wgpu::TexelCopyBufferLayout {
                offset: 0,
                bytes_per_row: Some(4 * w),
                rows_per_image: Some(h),
            },
            wgpu::Extent3d {
                width: w,
                height: h,
                depth_or_array_layers: 1,
            },
        );
    }

    let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
    let sampler = create_sampler(device, mip_levels > 1);

    let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
        label: Some("texture_bind_group"),
        layout: bind_group_layout,
        entries: &[
            wgpu::BindGroupEntry {
                binding: 0,
                resource: wgpu::BindingResource::TextureView(&view),
            },
            wgpu::BindGroupEntry {
                binding: 1,
                resource: wgpu::BindingResource::Sampler(&sampler),
            },
        ],
    });

    TextureEntry {
        wgpu_texture: texture,
        view,
        bind_group,
        width,
        height,
        mip_levels,
    }
}

fn create_sampler(device: &wgpu::Device, mipmapped: bool) -> wgpu::Sampler {
    if mipmapped {
        device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("atlas_sampler_mipmapped"),
            address_mode_u: wgpu::AddressMode::Repeat,
            address_mode_v: wgpu::AddressMode::Repeat,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            mipmap_filter: wgpu::FilterMode::Linear,
            ..Default::default()
        })
    } else {
        device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("atlas_sampler"),
            address_mode_u: wgpu::AddressMode::ClampToEdge,
            address_mode_v: wgpu::AddressMode::ClampToEdge,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            ..Default::default()
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;

    #[test]
    fn test_premultiply_alpha() {
        let mut img = RgbaImage::from_pixel(1, 1, Rgba([255, 128, 0, 128]));
        premultiply_alpha(&mut img);
        assert_eq!(img.get_pixel(0, 0).0, [128, 64, 0, 128]);

        let mut opaque = RgbaImage::from_pixel(1, 1, Rgba([10, 20, 30, 255]));
        premultiply_alpha(&mut opaque);
        assert_eq!(opaque.get_pixel(0, 0).0, [10, 20, 30, 255]);
    }

    #[test]
    fn test_is_power_of_two() {
        assert!(is_power_of_two(1));
        assert!(is_power_of_two(256));
        assert!(!is_power_of_two(0));
        assert!(!is_power_of_two(300));
    }

    #[test]
    fn test_mip_level_count() {
        assert_eq!(mip_level_count(1, 1), 1);
        assert_eq!(mip_level_count(256, 256), 9);
        assert_eq!(mip_level_count(512, 128), 10);
    }

    #[test]
    fn test_mip_chain_halves_to_one() {
        let levels = build_mip_chain(RgbaImage::new(8, 2));
        let sizes: Vec<(u32, u32)> = levels.iter().map(|l| l.dimensions()).collect();
        assert_eq!(sizes, vec![(8, 2), (4, 1), (2, 1), (1, 1)]);
    }
}
