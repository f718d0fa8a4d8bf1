use std::collections::HashSet;
use std::path::{Path, PathBuf};

use glam::Vec2;

use crate::canvas::{Canvas, Rgb, TextureError, TextureHandle, TextureLoader};

#[derive(Debug, Clone, PartialEq)]
pub enum DrawOp {
    LineLoop {
        points: Vec<Vec2>,
        color: Rgb,
        width: f32,
    },
    Polygon {
        points: Vec<Vec2>,
        color: Rgb,
    },
    Quad {
        texture: String,
        corners: [Vec2; 4],
        uvs: [Vec2; 4],
        blend: bool,
    },
}

#[derive(Default)]
pub struct RecordingCanvas {
    pub ops: Vec<DrawOp>,
}

impl Canvas for RecordingCanvas {
    fn line_loop(&mut self, points: &[Vec2], color: Rgb, width: f32) {
        self.ops.push(DrawOp::LineLoop {
            points: points.to_vec(),
            color,
            width,
        });
    }

    fn polygon(&mut self, points: &[Vec2], color: Rgb) {
        self.ops.push(DrawOp::Polygon {
            points: points.to_vec(),
            color,
        });
    }

    fn textured_quad(
        &mut self,
        texture: &TextureHandle,
        corners: [Vec2; 4],
        uvs: [Vec2; 4],
        blend: bool,
    ) {
        self.ops.push(DrawOp::Quad {
            texture: texture.key().to_string(),
            corners,
            uvs,
            blend,
        });
    }
}

/// Loader that succeeds for every path except the ones listed as missing.
#[derive(Default)]
pub struct FakeLoader {
    pub missing: HashSet<PathBuf>,
    pub loaded: Vec<PathBuf>,
}

impl FakeLoader {
    pub fn with_missing(paths: &[&str]) -> Self {
        Self {
            missing: paths.iter().map(PathBuf::from).collect(),
            loaded: Vec::new(),
        }
    }
}

impl TextureLoader for FakeLoader {
    fn load(&mut self, path: &Path) -> Result<TextureHandle, TextureError> {
        if self.missing.contains(path) {
            return Err(TextureError::NotFound {
                path: path.to_path_buf(),
                source: std::io::Error::from(std::io::ErrorKind::NotFound),
            });
        }
        self.loaded.push(path.to_path_buf());
        Ok(TextureHandle::new(&path.to_string_lossy()))
    }
}

pub fn approx_eq(a: Vec2, b: Vec2) -> bool {
    (a - b).abs().max_element() < 1e-4
}
