//! egui debug window drawn over the game (toggled with F3).
//!
//! egui needs the frame split in phases because `egui_wgpu::Renderer::render()`
//! wants a `RenderPass<'static>` while `begin_render_pass` borrows the encoder:
//!
//!   1. `prepare()` -- run the UI, tessellate
//!   2. `upload()`  -- push textures and buffers (borrows the encoder)
//!   3. `paint()`   -- draw into a pass created with `forget_lifetime()`
//!   4. `cleanup()` -- free textures egui dropped
//!
//! Events are always forwarded so the window can take clicks while shown.

use gt_core::time::FrameClock;
use winit::window::Window;

#[derive(Debug, Clone, Default)]
pub struct OverlayStats {
    pub object_count: u32,
    pub draw_calls: u32,
    pub texture_binds: u32,
    pub vertex_count: u32,
    pub loaded_textures: u32,
    /// Texture memory in megabytes
    pub texture_memory_mb: f32,
    pub mouse_delta: (f32, f32),
    pub cursor_locked: bool,
    pub paused: bool,
}

impl OverlayStats {
    pub fn summary_lines(&self) -> Vec<String> {
        vec![
            format!("Objects: {}", self.object_count),
            format!(
                "Draw calls: {} ({} texture binds)",
                self.draw_calls, self.texture_binds
            ),
            format!("Vertices: {}", self.vertex_count),
            format!(
                "Textures: {} ({:.2} MB)",
                self.loaded_textures, self.texture_memory_mb
            ),
            format!(
                "Mouse delta: ({:.0}, {:.0})",
                self.mouse_delta.0, self.mouse_delta.1
            ),
        ]
    }
}

#[derive(Debug, Clone, Default)]
pub struct OverlayActions {
    pub toggle_cursor_lock: bool,
    pub toggle_pause: bool,
}

pub struct DebugOverlay {
    pub egui_ctx: egui::Context,
    pub egui_winit_state: egui_winit::State,
    pub egui_renderer: egui_wgpu::Renderer,
    pub visible: bool,
}

impl DebugOverlay {
    pub fn new(
        device: &wgpu::Device,
        surface_format: wgpu::TextureFormat,
        window: &Window,
    ) -> Self {
        let egui_ctx = egui::Context::default();
        let egui_winit_state = egui_winit::State::new(
            egui_ctx.clone(),
            egui_ctx.viewport_id(),
            window,
            None,
            None,
            None,
        );
        let egui_renderer = egui_wgpu::Renderer::new(device, surface_format, None, 1, false);

        Self {
            egui_ctx,
            egui_winit_state,
            egui_renderer,
            visible: false,
        }
    }

    /// Returns true when egui consumed the event.
    pub fn handle_window_event(
        &mut self,
        window: &Window,
        event: &winit::event::WindowEvent,
    ) -> bool {
        self.egui_winit_state.on_window_event(window, event).consumed
    }

    pub fn toggle(&mut self) {
        self.visible = !self.visible;
        log::info!("Debug overlay: {}", if self.visible { "ON" } else { "OFF" });
    }

    /// Run the UI for this frame and tessellate it. Button presses come back
    /// as [`OverlayActions`] for the caller to apply.
    pub fn prepare(
        &mut self,
        window: &Window,
        clock: &FrameClock,
        stats: &OverlayStats,
    ) -> (
        Vec<egui::ClippedPrimitive>,
        egui::TexturesDelta,
        OverlayActions,
    ) {
        let mut actions = OverlayActions::default();
        let visible = self.visible;
        let raw_input = self.egui_winit_state.take_egui_input(window);
        let output = self.egui_ctx.run(raw_input, |ctx| {
            if visible {
                egui::Window::new("Debug")
                    .default_pos([10.0, 10.0])
                    .resizable(false)
                    .show(ctx, |ui| stats_panel(ui, clock, stats, &mut actions));
            }
        });
        self.egui_winit_state
            .handle_platform_output(window, output.platform_output);

        let primitives = self
            .egui_ctx
            .tessellate(output.shapes, output.pixels_per_point);
        (primitives, output.textures_delta, actions)
    }

    /// Upload textures and update buffers. Call before creating the egui render pass.
    pub fn upload(
        &mut self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        encoder: &mut wgpu::CommandEncoder,
        primitives: &[egui::ClippedPrimitive],
        textures_delta: &egui::TexturesDelta,
        screen_descriptor: &egui_wgpu::ScreenDescriptor,
    ) {
        for (id, image_delta) in &textures_delta.set {
            self.egui_renderer
                .update_texture(device, queue, *id, image_delta);
        }

        self.egui_renderer
            .update_buffers(device, queue, encoder, primitives, screen_descriptor);
    }

    pub fn paint(
        &self,
        render_pass: &mut wgpu::RenderPass<'static>,
        primitives: &[egui::ClippedPrimitive],
        screen_descriptor: &egui_wgpu::ScreenDescriptor,
    ) {
        self.egui_renderer
            .render(render_pass, primitives, screen_descriptor);
    }

    pub fn cleanup(&mut self, textures_delta: &egui::TexturesDelta) {
        for id in &textures_delta.free {
            self.egui_renderer.free_texture(id);
        }
    }
}

fn stats_panel(
    ui: &mut egui::Ui,
    clock: &FrameClock,
    stats: &OverlayStats,
    actions: &mut OverlayActions,
) {
    ui.label(format!(
        "{:.1} fps ({:.2} ms)",
        clock.smoothed_fps, clock.smoothed_frame_time_ms
    ));
    ui.label(format!("Frame #{}", clock.frame_count));
    ui.separator();
    for line in stats.summary_lines() {
        ui.label(line);
    }
    ui.separator();
    ui.horizontal(|ui| {
        let lock = if stats.cursor_locked { "Unlock cursor" } else { "Lock cursor" };
        actions.toggle_cursor_lock = ui.button(lock).clicked();
        let pause = if stats.paused { "Resume" } else { "Pause" };
        actions.toggle_pause = ui.button(pause).clicked();
    });
}
