//! The narrow seam between simulation types and whatever draws them.
//!
//! `Canvas` is the only drawing surface game objects see. The wgpu backend in
//! `gt_render` batches these calls into a mesh; tests record them instead.
//! All points handed to a canvas are already in world space (pixels, origin at
//! the bottom-left corner of the viewport).

use std::path::{Path, PathBuf};
use std::sync::Arc;

use glam::Vec2;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rgb {
    pub r: f32,
    pub g: f32,
    pub b: f32,
}

impl Rgb {
    pub const WHITE: Rgb = Rgb::new(1.0, 1.0, 1.0);
    pub const BLACK: Rgb = Rgb::new(0.0, 0.0, 0.0);

    pub const fn new(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b }
    }

    pub fn from_u8(rgb: [u8; 3]) -> Self {
        Self::new(
            rgb[0] as f32 / 255.0,
            rgb[1] as f32 / 255.0,
            rgb[2] as f32 / 255.0,
        )
    }

    pub fn with_alpha(self, alpha: f32) -> [f32; 4] {
        [self.r, self.g, self.b, alpha]
    }

    /// Decode sRGB-encoded channels to linear light. A render target with an
    /// sRGB format re-encodes on write, so colors given in sRGB must be
    /// decoded first to come out unchanged on screen.
    pub fn to_linear(self) -> Self {
        fn decode(c: f32) -> f32 {
            if c <= 0.04045 {
                c / 12.92
            } else {
                ((c + 0.055) / 1.055).powf(2.4)
            }
        }
        Self::new(decode(self.r), decode(self.g), decode(self.b))
    }
}

/// Drawable area in pixels. Positions are clamped to `[0, width] x [0, height]`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub width: f32,
    pub height: f32,
}

impl Viewport {
    pub fn new(width: f32, height: f32) -> Self {
        Self {
            width: width.max(0.0),
            height: height.max(0.0),
        }
    }

    pub fn size(&self) -> Vec2 {
        Vec2::new(self.width, self.height)
    }

    pub fn center(&self) -> Vec2 {
        self.size() * 0.5
    }
}

/// Shared key of a loaded texture.
///
/// The backend keeps one clone in its cache; every sprite slot holding the
/// texture keeps another. Once only the cache is left the texture is released.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TextureHandle(Arc<str>);

impl TextureHandle {
    pub fn new(key: &str) -> Self {
        Self(Arc::from(key))
    }

    pub fn key(&self) -> &str {
        &self.0
    }

    /// Number of live handles to this texture, the cache's own included.
    pub fn holders(&self) -> usize {
        Arc::strong_count(&self.0)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum TextureError {
    #[error("failed to read texture {}: {source}", path.display())]
    NotFound {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to decode texture {}: {message}", path.display())]
    Decode { path: PathBuf, message: String },
}

pub trait TextureLoader {
    fn load(&mut self, path: &Path) -> Result<TextureHandle, TextureError>;
}

/// Immediate-mode drawing surface.
pub trait Canvas {
    /// Closed outline through `points`, `width` pixels thick.
    fn line_loop(&mut self, points: &[Vec2], color: Rgb, width: f32);

    /// Filled convex polygon.
    fn polygon(&mut self, points: &[Vec2], color: Rgb);

    /// Textured quad. `corners` and `uvs` are both ordered bottom-left,
    /// bottom-right, top-right, top-left.
    fn textured_quad(
        &mut self,
        texture: &TextureHandle,
        corners: [Vec2; 4],
        uvs: [Vec2; 4],
        blend: bool,
    );
}
