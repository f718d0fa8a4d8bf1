//! GPU textures keyed by file path.
//!
//! Loading the same path twice returns the same handle. The cache holds one
//! handle per texture; [`TextureCache::release_unused`] drops every texture no
//! sprite holds a handle to any more.

use std::collections::HashMap;
use std::path::Path;

use gt_core::canvas::{TextureError, TextureHandle, TextureLoader};

use crate::batch::DrawTexture;
use crate::sprite_pipeline::SpritePipeline;
use crate::texture::Texture;

pub struct GpuSpriteTexture {
    pub texture: Texture,
    pub bind_group: wgpu::BindGroup,
}

struct CachedTexture {
    handle: TextureHandle,
    gpu: GpuSpriteTexture,
}

pub struct TextureCache {
    textures: HashMap<String, CachedTexture>,
    white: GpuSpriteTexture,
    format: wgpu::TextureFormat,
}

impl TextureCache {
    /// `format` is the texel format every loaded image is uploaded as; see
    /// [`crate::texture::texture_format_for`].
    pub fn new(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        pipeline: &SpritePipeline,
        format: wgpu::TextureFormat,
    ) -> Self {
        let texture =
            Texture::from_rgba8(device, queue, &[255, 255, 255, 255], 1, 1, format, "White Texel");
        let bind_group = pipeline.create_texture_bind_group(device, &texture);
        Self {
            textures: HashMap::new(),
            white: GpuSpriteTexture {
                texture,
                bind_group,
            },
            format,
        }
    }

    pub fn load(
        &mut self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        pipeline: &SpritePipeline,
        path: &Path,
    ) -> Result<TextureHandle, TextureError> {
        let key = path.to_string_lossy().into_owned();
        if let Some(cached) = self.textures.get(&key) {
            return Ok(cached.handle.clone());
        }

        let bytes = std::fs::read(path).map_err(|source| TextureError::NotFound {
            path: path.to_path_buf(),
            source,
        })?;
        let texture = Texture::from_bytes(device, queue, &bytes, self.format, &key).map_err(|e| {
            TextureError::Decode {
                path: path.to_path_buf(),
                message: e.to_string(),
            }
        })?;
        let bind_group = pipeline.create_texture_bind_group(device, &texture);
        log::info!(
            "Loaded texture '{}' ({}x{})",
            key,
            texture.size.0,
            texture.size.1
        );

        let handle = TextureHandle::new(&key);
        self.textures.insert(
            key,
            CachedTexture {
                handle: handle.clone(),
                gpu: GpuSpriteTexture {
                    texture,
                    bind_group,
                },
            },
        );
        Ok(handle)
    }

    /// Bind group for a draw call's texture.
    pub fn get(&self, texture: &DrawTexture) -> Option<&GpuSpriteTexture> {
        match texture {
            DrawTexture::White => Some(&self.white),
            DrawTexture::File(key) => self.textures.get(&**key).map(|cached| &cached.gpu),
        }
    }

    /// Drop textures whose only remaining handle is the cache's own.
    pub fn release_unused(&mut self) -> usize {
        let before = self.textures.len();
        self.textures.retain(|key, cached| {
            let in_use = cached.handle.holders() > 1;
            if !in_use {
                log::info!("Released texture '{}'", key);
            }
            in_use
        });
        before - self.textures.len()
    }

    pub fn len(&self) -> usize {
        self.textures.len()
    }

    pub fn is_empty(&self) -> bool {
        self.textures.is_empty()
    }

    pub fn memory_bytes(&self) -> usize {
        self.textures
            .values()
            .map(|cached| cached.gpu.texture.byte_size())
            .sum::<usize>()
            + self.white.texture.byte_size()
    }
}

/// [`TextureLoader`] backed by the GPU cache, for constructing sprites.
pub struct GpuTextureLoader<'a> {
    pub cache: &'a mut TextureCache,
    pub device: &'a wgpu::Device,
    pub queue: &'a wgpu::Queue,
    pub pipeline: &'a SpritePipeline,
}

impl TextureLoader for GpuTextureLoader<'_> {
    fn load(&mut self, path: &Path) -> Result<TextureHandle, TextureError> {
        self.cache.load(self.device, self.queue, self.pipeline, path)
    }
}
