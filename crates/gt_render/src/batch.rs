//! CPU-side mesh for one frame.
//!
//! `FrameBatch` implements [`Canvas`]: every primitive is triangulated into a
//! shared vertex/index list as it arrives, so draw order is submission order.
//! Consecutive triangles with the same texture and blend mode collapse into a
//! single draw call.

use std::sync::Arc;

use glam::Vec2;
use gt_core::canvas::{Canvas, Rgb, TextureHandle};

use crate::vertex::SpriteVertex;

const WHITE_TEXEL: Vec2 = Vec2::new(0.5, 0.5);

/// Texture a draw call samples.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DrawTexture {
    /// The built-in 1x1 white texture untextured shapes sample.
    White,
    /// A texture loaded from this path.
    File(Arc<str>),
}

impl DrawTexture {
    fn matches_file(&self, key: &str) -> bool {
        matches!(self, DrawTexture::File(path) if &**path == key)
    }
}

impl std::fmt::Display for DrawTexture {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DrawTexture::White => f.write_str("<white>"),
            DrawTexture::File(path) => f.write_str(path),
        }
    }
}

/// A contiguous run of indices sharing one texture binding and pipeline.
#[derive(Debug, Clone, PartialEq)]
pub struct DrawCall {
    pub texture: DrawTexture,
    pub blend: bool,
    pub index_start: u32,
    pub index_count: u32,
}

#[derive(Default)]
pub struct FrameBatch {
    pub vertices: Vec<SpriteVertex>,
    pub indices: Vec<u32>,
    pub draw_calls: Vec<DrawCall>,
    linear_colors: bool,
}

impl FrameBatch {
    pub fn new() -> Self {
        Self::default()
    }

    /// Batch for a render target. On an sRGB target, shape colors are
    /// decoded to linear so they display as given.
    pub fn for_target(srgb: bool) -> Self {
        Self {
            linear_colors: srgb,
            ..Self::default()
        }
    }

    fn vertex_color(&self, color: Rgb) -> [f32; 4] {
        let color = if self.linear_colors {
            color.to_linear()
        } else {
            color
        };
        color.with_alpha(1.0)
    }

    pub fn clear(&mut self) {
        self.vertices.clear();
        self.indices.clear();
        self.draw_calls.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    /// Number of bind-group switches the draw calls will need.
    pub fn texture_binds(&self) -> usize {
        let mut binds = 0usize;
        let mut current: Option<&DrawTexture> = None;
        for draw in &self.draw_calls {
            if current != Some(&draw.texture) {
                current = Some(&draw.texture);
                binds += 1;
            }
        }
        binds
    }

    fn push_triangles(&mut self, texture: TextureRef<'_>, blend: bool, indices: &[u32]) {
        let index_start = self.indices.len() as u32;
        self.indices.extend_from_slice(indices);
        push_draw_call(
            &mut self.draw_calls,
            texture,
            blend,
            index_start,
            indices.len() as u32,
        );
    }

    fn push_solid_quad(&mut self, corners: [Vec2; 4], color: [f32; 4]) {
        let base = self.vertices.len() as u32;
        self.vertices
            .extend(corners.map(|c| SpriteVertex::new(c, WHITE_TEXEL, color)));
        self.push_triangles(
            TextureRef::White,
            true,
            &[base, base + 1, base + 2, base, base + 2, base + 3],
        );
    }
}

impl Canvas for FrameBatch {
    fn line_loop(&mut self, points: &[Vec2], color: Rgb, width: f32) {
        if points.len() < 2 {
            return;
        }
        let color = self.vertex_color(color);
        let half = width * 0.5;
        for (i, &start) in points.iter().enumerate() {
            let end = points[(i + 1) % points.len()];
            let Some(dir) = (end - start).try_normalize() else {
                continue;
            };
            let normal = dir.perp() * half;
            // Extend past both ends so adjacent segments overlap at the joints.
            let start = start - dir * half;
            let end = end + dir * half;
            self.push_solid_quad(
                [start - normal, end - normal, end + normal, start + normal],
                color,
            );
        }
    }

    fn polygon(&mut self, points: &[Vec2], color: Rgb) {
        if points.len() < 3 {
            return;
        }
        let color = self.vertex_color(color);
        let base = self.vertices.len() as u32;
        self.vertices
            .extend(points.iter().map(|&p| SpriteVertex::new(p, WHITE_TEXEL, color)));
        let fan: Vec<u32> = (1..points.len() as u32 - 1)
            .flat_map(|i| [base, base + i, base + i + 1])
            .collect();
        self.push_triangles(TextureRef::White, true, &fan);
    }

    fn textured_quad(
        &mut self,
        texture: &TextureHandle,
        corners: [Vec2; 4],
        uvs: [Vec2; 4],
        blend: bool,
    ) {
        let base = self.vertices.len() as u32;
        for (corner, uv) in corners.into_iter().zip(uvs) {
            self.vertices
                .push(SpriteVertex::new(corner, uv, Rgb::WHITE.with_alpha(1.0)));
        }
        self.push_triangles(
            TextureRef::File(texture.key()),
            blend,
            &[base, base + 1, base + 2, base, base + 2, base + 3],
        );
    }
}

/// Borrowed form of [`DrawTexture`], so merging into the previous call does
/// not allocate.
#[derive(Clone, Copy)]
enum TextureRef<'a> {
    White,
    File(&'a str),
}

impl TextureRef<'_> {
    fn matches(self, texture: &DrawTexture) -> bool {
        match self {
            TextureRef::White => *texture == DrawTexture::White,
            TextureRef::File(key) => texture.matches_file(key),
        }
    }

    fn into_draw_texture(self) -> DrawTexture {
        match self {
            TextureRef::White => DrawTexture::White,
            TextureRef::File(key) => DrawTexture::File(Arc::from(key)),
        }
    }
}

/// Append a draw call, merging with the previous one when texture and blend
/// mode match and the indices are contiguous.
fn push_draw_call(
    draw_calls: &mut Vec<DrawCall>,
    texture: TextureRef<'_>,
    blend: bool,
    index_start: u32,
    index_count: u32,
) {
    if let Some(last) = draw_calls.last_mut() {
        let contiguous = last.index_start + last.index_count == index_start;
        if texture.matches(&last.texture) && last.blend == blend && contiguous {
            last.index_count += index_count;
            return;
        }
    }
    draw_calls.push(DrawCall {
        texture: texture.into_draw_texture(),
        blend,
        index_start,
        index_count,
    });
}
