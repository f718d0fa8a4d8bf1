//! GPU side of a [`FrameBatch`]: streamed vertex/index buffers plus the draw
//! loop that replays the batch's draw calls.
//!
//! Buffers grow to the next power of two and never shrink.

use crate::batch::{DrawTexture, FrameBatch};
use crate::sprite_pipeline::SpritePipeline;
use crate::texture_cache::TextureCache;
use crate::vertex::SpriteVertex;

pub struct FrameMesh {
    vertex_buffer: wgpu::Buffer,
    index_buffer: wgpu::Buffer,
    vertex_capacity: usize,
    index_capacity: usize,
}

impl FrameMesh {
    pub fn new(device: &wgpu::Device) -> Self {
        // Room for one quad.
        let (vertex_capacity, index_capacity) = (4, 6);
        Self {
            vertex_buffer: create_vertex_buffer(device, vertex_capacity),
            index_buffer: create_index_buffer(device, index_capacity),
            vertex_capacity,
            index_capacity,
        }
    }

    pub fn upload(&mut self, device: &wgpu::Device, queue: &wgpu::Queue, batch: &FrameBatch) {
        if batch.is_empty() {
            return;
        }
        if let Some(capacity) = grown_capacity(self.vertex_capacity, batch.vertices.len()) {
            log::debug!("Vertex buffer grows to {capacity} vertices");
            self.vertex_capacity = capacity;
            self.vertex_buffer = create_vertex_buffer(device, capacity);
        }
        if let Some(capacity) = grown_capacity(self.index_capacity, batch.indices.len()) {
            log::debug!("Index buffer grows to {capacity} indices");
            self.index_capacity = capacity;
            self.index_buffer = create_index_buffer(device, capacity);
        }
        queue.write_buffer(&self.vertex_buffer, 0, bytemuck::cast_slice(&batch.vertices));
        queue.write_buffer(&self.index_buffer, 0, bytemuck::cast_slice(&batch.indices));
    }

    /// Replay `batch` into `pass`, switching pipeline only when the blend mode
    /// changes and rebinding textures only when the texture changes. Draw calls
    /// whose texture is no longer cached are skipped.
    pub fn draw(
        &self,
        pass: &mut wgpu::RenderPass<'_>,
        pipeline: &SpritePipeline,
        camera_bind_group: &wgpu::BindGroup,
        textures: &TextureCache,
        batch: &FrameBatch,
    ) {
        if batch.is_empty() {
            return;
        }
        pass.set_bind_group(0, camera_bind_group, &[]);
        pass.set_vertex_buffer(0, self.vertex_buffer.slice(..));
        pass.set_index_buffer(self.index_buffer.slice(..), wgpu::IndexFormat::Uint32);

        let mut bound_blend: Option<bool> = None;
        let mut bound_texture: Option<&DrawTexture> = None;
        for draw in &batch.draw_calls {
            let Some(texture) = textures.get(&draw.texture) else {
                log::warn!("Skipping draw with unloaded texture '{}'", draw.texture);
                continue;
            };
            if bound_blend != Some(draw.blend) {
                pass.set_pipeline(pipeline.pipeline(draw.blend));
                bound_blend = Some(draw.blend);
            }
            if bound_texture != Some(&draw.texture) {
                pass.set_bind_group(1, &texture.bind_group, &[]);
                bound_texture = Some(&draw.texture);
            }
            pass.draw_indexed(draw.index_start..draw.index_start + draw.index_count, 0, 0..1);
        }
    }
}

/// New capacity when `needed` no longer fits, `None` otherwise.
fn grown_capacity(current: usize, needed: usize) -> Option<usize> {
    let needed = needed.max(1);
    (needed > current).then(|| needed.next_power_of_two())
}

fn create_vertex_buffer(device: &wgpu::Device, capacity: usize) -> wgpu::Buffer {
    device.create_buffer(&wgpu::BufferDescriptor {
        label: Some("Frame Vertex Buffer"),
        size: (capacity * std::mem::size_of::<SpriteVertex>()).max(1) as u64,
        usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
        mapped_at_creation: false,
    })
}

fn create_index_buffer(device: &wgpu::Device, capacity: usize) -> wgpu::Buffer {
    device.create_buffer(&wgpu::BufferDescriptor {
        label: Some("Frame Index Buffer"),
        size: (capacity * std::mem::size_of::<u32>()).max(1) as u64,
        usage: wgpu::BufferUsages::INDEX | wgpu::BufferUsages::COPY_DST,
        mapped_at_creation: false,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn capacity_grows_to_next_power_of_two() {
        assert_eq!(grown_capacity(4, 5), Some(8));
        assert_eq!(grown_capacity(8, 100), Some(128));
    }

    #[test]
    fn capacity_is_kept_when_it_fits() {
        assert_eq!(grown_capacity(8, 8), None);
        assert_eq!(grown_capacity(8, 0), None);
    }
}
