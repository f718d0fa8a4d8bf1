//! Animated textured quads.
//!
//! A sprite is either a *sheet* (one texture cut into a `columns x rows` grid
//! of frames) or a *strip* (one texture per frame). A sprite with a single
//! frame is a still image.
//!
//! Frames are addressed row-major from the top-left cell of the sheet. The quad
//! spans `(0, 0)..(width, height)` in local space, so the object's position is
//! the sprite's bottom-left corner.
//!
//! Animation advances at most one frame per `advance` call, and any time left
//! over past the frame duration is dropped.

use std::path::Path;

use glam::{Affine2, UVec2, Vec2};

use crate::canvas::{Canvas, TextureHandle, TextureLoader};

pub const DEFAULT_FRAME_DURATION: f32 = 0.25;

/// Largest frame grid a sprite accepts (`columns * rows`).
pub const MAX_SPRITE_FRAMES: u32 = 4096;

/// Sub-rectangle of a texture in UV space (`v = 0` is the top edge).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct UvRect {
    pub u: f32,
    pub v: f32,
    pub width: f32,
    pub height: f32,
}

impl UvRect {
    pub const FULL: UvRect = UvRect {
        u: 0.0,
        v: 0.0,
        width: 1.0,
        height: 1.0,
    };
}

/// Exclusively owns its texture handles, so it is move-only.
#[derive(Debug)]
pub struct Sprite {
    textures: Vec<Option<TextureHandle>>,
    next_slot: usize,
    sheet: bool,
    frames: UVec2,
    frame_count: u32,
    current_frame: u32,
    elapsed: f32,
    frame_duration: f32,
    flip_horizontal: bool,
    flip_vertical: bool,
    size: Vec2,
    transparent: bool,
}

impl Sprite {
    /// Sprite drawn from one image. With a `frames` grid larger than 1x1 the
    /// image is treated as a sprite sheet.
    pub fn new(
        loader: &mut dyn TextureLoader,
        path: impl AsRef<Path>,
        size: Vec2,
        frames: UVec2,
        transparent: bool,
    ) -> Self {
        let mut sprite = Self::empty(size, frames, transparent, true);
        if let Err(err) = sprite.add_texture(loader, path.as_ref()) {
            log::error!("Texture loading failed: {err}");
        }
        sprite
    }

    /// Sprite with one image per animation frame, laid out as a single row.
    /// Path `i` goes to frame `i`; a path that fails to load leaves its frame
    /// blank.
    pub fn from_frames<P: AsRef<Path>>(
        loader: &mut dyn TextureLoader,
        paths: &[P],
        size: Vec2,
        transparent: bool,
    ) -> Self {
        let columns = u32::try_from(paths.len()).unwrap_or(u32::MAX).max(1);
        let mut sprite = Self::empty(size, UVec2::new(columns, 1), transparent, false);
        for path in paths {
            if let Err(err) = sprite.add_texture(loader, path.as_ref()) {
                log::error!("Texture loading failed: {err}");
            }
        }
        sprite
    }

    /// `sheet` cuts one texture into the frame grid; otherwise every frame
    /// has its own texture slot.
    fn empty(size: Vec2, frames: UVec2, transparent: bool, sheet: bool) -> Self {
        let (frames, frame_count) = match grid_frame_count(frames) {
            Some(count) => (frames, count),
            None => {
                log::warn!(
                    "Sprite frame grid {frames} is empty or exceeds {MAX_SPRITE_FRAMES} frames; using 1x1"
                );
                (UVec2::ONE, 1)
            }
        };
        let sheet = sheet && frame_count > 1;
        let slots = if sheet { 1 } else { frame_count as usize };
        Self {
            textures: vec![None; slots],
            next_slot: 0,
            sheet,
            frames,
            frame_count,
            current_frame: 0,
            elapsed: 0.0,
            frame_duration: DEFAULT_FRAME_DURATION,
            flip_horizontal: false,
            flip_vertical: false,
            size,
            transparent,
        }
    }

    /// Load `path` into the next texture slot.
    ///
    /// The slot is used up even when the load fails: it stays empty and later
    /// loads go to the slots after it, so frames never shift.
    pub fn add_texture(
        &mut self,
        loader: &mut dyn TextureLoader,
        path: &Path,
    ) -> Result<(), String> {
        let slot = self.next_slot;
        if slot >= self.textures.len() {
            return Err(format!(
                "sprite has no free texture slot for '{}' ({} of {} used)",
                path.display(),
                slot,
                self.textures.len()
            ));
        }
        self.next_slot += 1;
        let handle = loader.load(path).map_err(|e| e.to_string())?;
        self.textures[slot] = Some(handle);
        Ok(())
    }

    pub fn frame_count(&self) -> u32 {
        self.frame_count
    }

    pub fn frames(&self) -> UVec2 {
        self.frames
    }

    pub fn loaded_textures(&self) -> usize {
        self.textures.iter().flatten().count()
    }

    /// One texture holding more than one frame. Fixed at construction.
    pub fn is_sprite_sheet(&self) -> bool {
        self.sheet
    }

    pub fn current_frame(&self) -> u32 {
        self.current_frame
    }

    pub fn set_current_frame(&mut self, frame: u32) {
        self.current_frame = frame % self.frame_count();
    }

    pub fn elapsed(&self) -> f32 {
        self.elapsed
    }

    pub fn frame_duration(&self) -> f32 {
        self.frame_duration
    }

    pub fn set_frame_duration(&mut self, seconds: f32) {
        if seconds > 0.0 {
            self.frame_duration = seconds;
        } else {
            log::warn!("Ignoring non-positive sprite frame duration {seconds}");
        }
    }

    pub fn flip(&self) -> (bool, bool) {
        (self.flip_horizontal, self.flip_vertical)
    }

    pub fn set_flip(&mut self, horizontal: bool, vertical: bool) {
        self.flip_horizontal = horizontal;
        self.flip_vertical = vertical;
    }

    pub fn size(&self) -> Vec2 {
        self.size
    }

    pub fn set_size(&mut self, size: Vec2) {
        self.size = size;
    }

    pub fn is_transparent(&self) -> bool {
        self.transparent
    }

    pub fn set_transparent(&mut self, transparent: bool) {
        self.transparent = transparent;
    }

    pub fn advance(&mut self, dt: f32) {
        if self.frame_count() <= 1 {
            return;
        }
        self.elapsed += dt;
        if self.elapsed >= self.frame_duration {
            self.current_frame = (self.current_frame + 1) % self.frame_count();
            self.elapsed = 0.0;
        }
    }

    /// UV rectangle of the current frame.
    pub fn cell_uv(&self) -> UvRect {
        if !self.is_sprite_sheet() {
            return UvRect::FULL;
        }
        let columns = self.frames.x;
        let row = self.current_frame / columns;
        let col = self.current_frame - row * columns;
        let width = 1.0 / columns as f32;
        let height = 1.0 / self.frames.y as f32;
        UvRect {
            u: col as f32 * width,
            v: row as f32 * height,
            width,
            height,
        }
    }

    /// UVs for the quad corners (bottom-left, bottom-right, top-right,
    /// top-left), looked up by the flip flags.
    pub fn quad_uvs(&self) -> [Vec2; 4] {
        let UvRect {
            u,
            v,
            width: tw,
            height: th,
        } = self.cell_uv();
        match (self.flip_horizontal, self.flip_vertical) {
            (false, false) => [
                Vec2::new(u, v + th),
                Vec2::new(u + tw, v + th),
                Vec2::new(u + tw, v),
                Vec2::new(u, v),
            ],
            (false, true) => [
                Vec2::new(u, v),
                Vec2::new(u + tw, v),
                Vec2::new(u + tw, v + th),
                Vec2::new(u, v + th),
            ],
            (true, false) => [
                Vec2::new(u + tw, v + th),
                Vec2::new(u, v + th),
                Vec2::new(u, v),
                Vec2::new(u + tw, v),
            ],
            (true, true) => [
                Vec2::new(u + tw, v),
                Vec2::new(u, v),
                Vec2::new(u, v + th),
                Vec2::new(u + tw, v + th),
            ],
        }
    }

    /// Texture holding the current frame, if it loaded.
    pub fn current_texture(&self) -> Option<&TextureHandle> {
        let slot = if self.sheet {
            0
        } else {
            self.current_frame as usize
        };
        self.textures.get(slot).and_then(Option::as_ref)
    }

    pub fn draw(&self, transform: &Affine2, canvas: &mut dyn Canvas) {
        let Some(texture) = self.current_texture() else {
            return;
        };
        let (w, h) = (self.size.x, self.size.y);
        let corners = [
            Vec2::new(0.0, 0.0),
            Vec2::new(w, 0.0),
            Vec2::new(w, h),
            Vec2::new(0.0, h),
        ]
        .map(|c| transform.transform_point2(c));
        canvas.textured_quad(texture, corners, self.quad_uvs(), self.transparent);
    }
}

/// `columns * rows`, or `None` for an empty or oversized grid.
pub fn grid_frame_count(frames: UVec2) -> Option<u32> {
    frames
        .x
        .checked_mul(frames.y)
        .filter(|&count| count > 0 && count <= MAX_SPRITE_FRAMES)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{approx_eq, DrawOp, FakeLoader, RecordingCanvas};

    fn sheet(columns: u32, rows: u32) -> Sprite {
        let mut loader = FakeLoader::default();
        Sprite::new(
            &mut loader,
            "sprites/sheet.png",
            Vec2::new(26.0, 22.0),
            UVec2::new(columns, rows),
            true,
        )
    }

    fn assert_uvs(actual: [Vec2; 4], expected: [(f32, f32); 4]) {
        for (a, (eu, ev)) in actual.iter().zip(expected) {
            assert!(
                approx_eq(*a, Vec2::new(eu, ev)),
                "uv {a} != ({eu}, {ev}); full set {actual:?}"
            );
        }
    }

    #[test]
    fn advance_moves_one_frame_and_drops_remainder() {
        let mut sprite = sheet(8, 1);
        sprite.advance(0.3);
        assert_eq!(sprite.current_frame(), 1);
        assert_eq!(sprite.elapsed(), 0.0);
    }

    #[test]
    fn advance_below_duration_accumulates() {
        let mut sprite = sheet(8, 1);
        sprite.advance(0.125);
        assert_eq!(sprite.current_frame(), 0);
        assert!((sprite.elapsed() - 0.125).abs() < f32::EPSILON);
        sprite.advance(0.125);
        assert_eq!(sprite.current_frame(), 1);
        assert_eq!(sprite.elapsed(), 0.0);
    }

    #[test]
    fn advance_wraps_at_frame_count() {
        let mut sprite = sheet(8, 1);
        for step in 1..=20u32 {
            sprite.advance(DEFAULT_FRAME_DURATION);
            assert_eq!(sprite.current_frame(), step % 8);
        }
    }

    #[test]
    fn advance_is_no_op_for_single_frame() {
        let mut sprite = sheet(1, 1);
        sprite.advance(10.0);
        assert_eq!(sprite.current_frame(), 0);
        assert_eq!(sprite.elapsed(), 0.0);
    }

    #[test]
    fn zero_frame_grid_falls_back_to_still_image() {
        let sprite = sheet(0, 3);
        assert_eq!(sprite.frames(), UVec2::ONE);
        assert_eq!(sprite.frame_count(), 1);
        assert!(!sprite.is_sprite_sheet());
    }

    #[test]
    fn overflowing_frame_grid_falls_back_to_still_image() {
        let mut sprite = sheet(100_000, 100_000);
        assert_eq!(sprite.frames(), UVec2::ONE);
        assert_eq!(sprite.frame_count(), 1);
        sprite.set_current_frame(7);
        assert_eq!(sprite.current_frame(), 0);

        let sprite = sheet(u32::MAX, 2);
        assert_eq!(sprite.frame_count(), 1);
    }

    #[test]
    fn grid_frame_count_bounds() {
        assert_eq!(grid_frame_count(UVec2::new(8, 1)), Some(8));
        assert_eq!(grid_frame_count(UVec2::new(64, 64)), Some(MAX_SPRITE_FRAMES));
        assert_eq!(grid_frame_count(UVec2::new(65, 64)), None);
        assert_eq!(grid_frame_count(UVec2::new(0, 4)), None);
        assert_eq!(grid_frame_count(UVec2::new(100_000, 100_000)), None);
    }

    #[test]
    fn cell_uv_uses_row_major_grid() {
        let mut sprite = sheet(4, 2);
        assert!(sprite.is_sprite_sheet());
        sprite.set_current_frame(6);
        let cell = sprite.cell_uv();
        assert!((cell.u - 0.5).abs() < 1e-6);
        assert!((cell.v - 0.5).abs() < 1e-6);
        assert!((cell.width - 0.25).abs() < 1e-6);
        assert!((cell.height - 0.5).abs() < 1e-6);
    }

    #[test]
    fn still_image_uses_full_texture() {
        let sprite = sheet(1, 1);
        assert!(!sprite.is_sprite_sheet());
        assert_eq!(sprite.cell_uv(), UvRect::FULL);
    }

    #[test]
    fn set_current_frame_wraps() {
        let mut sprite = sheet(4, 1);
        sprite.set_current_frame(9);
        assert_eq!(sprite.current_frame(), 1);
    }

    // Frame 5 of a 4x2 sheet: u = 0.25, v = 0.5, tw = 0.25, th = 0.5.
    fn frame_five() -> Sprite {
        let mut sprite = sheet(4, 2);
        sprite.set_current_frame(5);
        sprite
    }

    #[test]
    fn uvs_without_flip() {
        let sprite = frame_five();
        assert_uvs(
            sprite.quad_uvs(),
            [(0.25, 1.0), (0.5, 1.0), (0.5, 0.5), (0.25, 0.5)],
        );
    }

    #[test]
    fn uvs_with_vertical_flip() {
        let mut sprite = frame_five();
        sprite.set_flip(false, true);
        assert_uvs(
            sprite.quad_uvs(),
            [(0.25, 0.5), (0.5, 0.5), (0.5, 1.0), (0.25, 1.0)],
        );
    }

    #[test]
    fn uvs_with_horizontal_flip() {
        let mut sprite = frame_five();
        sprite.set_flip(true, false);
        assert_uvs(
            sprite.quad_uvs(),
            [(0.5, 1.0), (0.25, 1.0), (0.25, 0.5), (0.5, 0.5)],
        );
    }

    #[test]
    fn uvs_with_both_flips() {
        let mut sprite = frame_five();
        sprite.set_flip(true, true);
        assert_uvs(
            sprite.quad_uvs(),
            [(0.5, 0.5), (0.25, 0.5), (0.25, 1.0), (0.5, 1.0)],
        );
    }

    #[test]
    fn draw_emits_quad_at_local_origin() {
        let sprite = sheet(8, 1);
        let mut canvas = RecordingCanvas::default();
        let transform = Affine2::from_translation(Vec2::new(10.0, 20.0));
        sprite.draw(&transform, &mut canvas);

        assert_eq!(canvas.ops.len(), 1);
        let DrawOp::Quad {
            texture,
            corners,
            uvs,
            blend,
        } = &canvas.ops[0]
        else {
            panic!("expected quad");
        };
        assert_eq!(texture, "sprites/sheet.png");
        assert!(*blend);
        assert!(approx_eq(corners[0], Vec2::new(10.0, 20.0)));
        assert!(approx_eq(corners[2], Vec2::new(36.0, 42.0)));
        assert!(approx_eq(uvs[0], Vec2::new(0.0, 1.0)));
        assert!(approx_eq(uvs[1], Vec2::new(0.125, 1.0)));
    }

    #[test]
    fn failed_load_leaves_slot_empty_and_skips_draw() {
        let mut loader = FakeLoader::with_missing(&["sprites/missing.png"]);
        let mut sprite = Sprite::new(
            &mut loader,
            "sprites/missing.png",
            Vec2::splat(16.0),
            UVec2::new(4, 1),
            true,
        );
        assert_eq!(sprite.loaded_textures(), 0);
        assert!(sprite.current_texture().is_none());

        sprite.advance(1.0);
        assert_eq!(sprite.current_frame(), 1);

        let mut canvas = RecordingCanvas::default();
        sprite.draw(&Affine2::IDENTITY, &mut canvas);
        assert!(canvas.ops.is_empty());
    }

    #[test]
    fn strip_sprite_binds_texture_per_frame() {
        let mut loader = FakeLoader::default();
        let mut sprite = Sprite::from_frames(
            &mut loader,
            &["walk_0.png", "walk_1.png", "walk_2.png"],
            Vec2::splat(8.0),
            false,
        );
        assert_eq!(sprite.frame_count(), 3);
        assert!(!sprite.is_sprite_sheet());
        assert_eq!(sprite.cell_uv(), UvRect::FULL);

        sprite.advance(DEFAULT_FRAME_DURATION);
        assert_eq!(
            sprite.current_texture().map(TextureHandle::key),
            Some("walk_1.png")
        );
    }

    #[test]
    fn missing_middle_frame_stays_blank() {
        let mut loader = FakeLoader::with_missing(&["b.png"]);
        let mut sprite =
            Sprite::from_frames(&mut loader, &["a.png", "b.png", "c.png"], Vec2::ONE, false);
        assert_eq!(sprite.loaded_textures(), 2);

        let keys: Vec<Option<String>> = (0..3)
            .map(|frame| {
                sprite.set_current_frame(frame);
                sprite.current_texture().map(|t| t.key().to_string())
            })
            .collect();
        assert_eq!(
            keys,
            vec![Some("a.png".to_string()), None, Some("c.png".to_string())]
        );
    }

    #[test]
    fn mostly_failed_strip_is_not_a_sheet() {
        let mut loader = FakeLoader::with_missing(&["b.png", "c.png"]);
        let mut sprite =
            Sprite::from_frames(&mut loader, &["a.png", "b.png", "c.png"], Vec2::ONE, true);
        assert_eq!(sprite.loaded_textures(), 1);
        assert!(!sprite.is_sprite_sheet());
        assert_eq!(sprite.cell_uv(), UvRect::FULL);

        sprite.set_current_frame(1);
        let mut canvas = RecordingCanvas::default();
        sprite.draw(&Affine2::IDENTITY, &mut canvas);
        assert!(canvas.ops.is_empty());
    }

    #[test]
    fn sheet_mode_survives_failed_load() {
        let mut loader = FakeLoader::with_missing(&["sheet.png"]);
        let sprite = Sprite::new(&mut loader, "sheet.png", Vec2::ONE, UVec2::new(4, 2), true);
        assert!(sprite.is_sprite_sheet());
        assert_eq!(sprite.loaded_textures(), 0);
    }

    #[test]
    fn add_texture_rejects_when_slots_full() {
        let mut loader = FakeLoader::default();
        let mut sprite = sheet(1, 1);
        let err = sprite
            .add_texture(&mut loader, Path::new("extra.png"))
            .expect_err("single slot already used");
        assert!(err.contains("no free texture slot"));
    }

    #[test]
    fn add_texture_reports_load_error() {
        let mut loader = FakeLoader::with_missing(&["gone.png"]);
        let mut sprite = Sprite::from_frames::<&str>(&mut loader, &[], Vec2::ONE, true);
        let err = sprite
            .add_texture(&mut loader, Path::new("gone.png"))
            .expect_err("missing file should fail");
        assert!(err.contains("gone.png"));
        assert_eq!(sprite.loaded_textures(), 0);
    }

    #[test]
    fn non_positive_frame_duration_is_ignored() {
        let mut sprite = sheet(2, 1);
        sprite.set_frame_duration(0.0);
        assert!((sprite.frame_duration() - DEFAULT_FRAME_DURATION).abs() < f32::EPSILON);
        sprite.set_frame_duration(0.1);
        assert!((sprite.frame_duration() - 0.1).abs() < f32::EPSILON);
    }
}
