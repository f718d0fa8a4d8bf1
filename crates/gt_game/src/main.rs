//! Game template -- window, main loop and entry point.
//!
//! winit drives the event loop via `ApplicationHandler`; input events are
//! forwarded to the frame driver as they arrive. Every redraw runs one
//! variable-step frame:
//!
//!   1. `FrameClock::begin_frame` measures the wall-clock delta
//!   2. `FrameDriver::tick` runs game logic, updates objects, refreshes input
//!   3. objects are batched into one mesh and streamed to the GPU
//!   4. the scene pass replays the batch, then the egui overlay composites

mod driver;
mod keymap;

use std::path::Path;
use std::sync::Arc;

use wgpu::util::DeviceExt;
use winit::application::ApplicationHandler;
use winit::event::{ElementState, WindowEvent};
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::keyboard::PhysicalKey;
use winit::window::{Window, WindowId};

use driver::FrameDriver;
use gt_core::config::{load_config_or_default, GameConfig};
use gt_core::time::FrameClock;
use gt_devtools::{DebugOverlay, OverlayStats};
use gt_platform::window::{apply_cursor_lock, warp_cursor_to_center, PlatformConfig};
use gt_render::{
    texture_format_for, Camera2D, FrameBatch, FrameMesh, GpuContext, GpuTextureLoader,
    SpritePipeline, TextureCache,
};

const CONFIG_PATH: &str = "assets/config/game.json";

struct EngineState {
    window: Arc<Window>,
    gpu: GpuContext,
    clock: FrameClock,
    camera: Camera2D,
    camera_buffer: wgpu::Buffer,
    camera_bind_group: wgpu::BindGroup,
    sprite_pipeline: SpritePipeline,
    textures: TextureCache,
    batch: FrameBatch,
    mesh: FrameMesh,
    debug_overlay: DebugOverlay,
    driver: FrameDriver,
    clear_color: wgpu::Color,
}

enum FrameOutcome {
    Continue,
    Exit,
}

impl EngineState {
    fn new(window: Arc<Window>, config: &GameConfig) -> Result<Self, String> {
        let gpu = GpuContext::new(window.clone())?;
        let sprite_pipeline = SpritePipeline::new(&gpu.device, gpu.surface_format);
        let mut textures = TextureCache::new(
            &gpu.device,
            &gpu.queue,
            &sprite_pipeline,
            texture_format_for(gpu.surface_format),
        );

        // Sprites load their textures while the scene is built.
        let driver = FrameDriver::new(
            config,
            &mut GpuTextureLoader {
                cache: &mut textures,
                device: &gpu.device,
                queue: &gpu.queue,
                pipeline: &sprite_pipeline,
            },
        );
        if driver.input.is_cursor_locked() {
            apply_cursor_lock(&window, true);
        }

        let camera = Camera2D::new(gpu.size.0, gpu.size.1);
        let camera_buffer = gpu
            .device
            .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("Camera Uniform Buffer"),
                contents: bytemuck::cast_slice(&[camera.build_uniform()]),
                usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            });
        let camera_bind_group =
            sprite_pipeline.create_camera_bind_group(&gpu.device, &camera_buffer);

        let clear_color = gpu.clear_color(config.clear_color());
        let batch = FrameBatch::for_target(gpu.is_srgb());
        Ok(Self {
            debug_overlay: DebugOverlay::new(&gpu.device, gpu.surface_format, &window),
            mesh: FrameMesh::new(&gpu.device),
            window,
            gpu,
            clock: FrameClock::new(),
            camera,
            camera_buffer,
            camera_bind_group,
            sprite_pipeline,
            textures,
            batch,
            driver,
            clear_color,
        })
    }

    fn handle_input(&mut self, event: &WindowEvent) {
        let input = &mut self.driver.input;
        match event {
            WindowEvent::KeyboardInput { event, .. } => {
                let PhysicalKey::Code(code) = event.physical_key else {
                    return;
                };
                let Some(key) = keymap::map_key(code) else {
                    return;
                };
                match event.state {
                    ElementState::Pressed => input.key_down(key),
                    ElementState::Released => input.key_up(key),
                }
            }
            // Window coordinates: origin top-left, physical pixels.
            WindowEvent::CursorMoved { position, .. } => {
                input.mouse_moved(position.x as f32, position.y as f32);
            }
            WindowEvent::MouseInput { state, button, .. } => {
                let Some(btn) = keymap::map_mouse_button(*button) else {
                    return;
                };
                match state {
                    ElementState::Pressed => input.mouse_down(btn),
                    ElementState::Released => input.mouse_up(btn),
                }
            }
            _ => {}
        }
    }

    fn resize(&mut self, width: u32, height: u32) {
        if width == 0 || height == 0 {
            return;
        }
        self.gpu.resize(width, height);
        self.camera.viewport = (width, height);
        log::info!("Resized to {}x{}", width, height);
    }

    fn sync_cursor_lock(&self, changed: bool) {
        let locked = self.driver.input.is_cursor_locked();
        if changed {
            apply_cursor_lock(&self.window, locked);
        } else if locked {
            warp_cursor_to_center(&self.window);
        }
    }

    fn step(&mut self) -> FrameOutcome {
        self.clock.begin_frame();
        let commands = self
            .driver
            .tick(self.clock.dt_secs(), self.gpu.viewport());
        if commands.exit {
            return FrameOutcome::Exit;
        }
        if commands.toggle_overlay {
            self.debug_overlay.toggle();
        }
        self.sync_cursor_lock(commands.cursor_lock_changed);

        self.textures.release_unused();
        self.batch.clear();
        self.driver.render(&mut self.batch);
        self.mesh
            .upload(&self.gpu.device, &self.gpu.queue, &self.batch);
        FrameOutcome::Continue
    }

    fn render(&mut self) {
        self.gpu.queue.write_buffer(
            &self.camera_buffer,
            0,
            bytemuck::cast_slice(&[self.camera.build_uniform()]),
        );

        let Some((frame, view)) = self.gpu.begin_frame() else {
            return;
        };

        let stats = self.overlay_stats();
        let (egui_primitives, egui_textures_delta, actions) =
            self.debug_overlay
                .prepare(&self.window, &self.clock, &stats);
        if actions.toggle_cursor_lock {
            self.driver.toggle_cursor_lock();
            self.sync_cursor_lock(true);
        }
        if actions.toggle_pause {
            self.driver.toggle_pause();
        }

        let screen_descriptor = egui_wgpu::ScreenDescriptor {
            size_in_pixels: [self.gpu.size.0, self.gpu.size.1],
            pixels_per_point: self.window.scale_factor() as f32,
        };
        let mut encoder = self
            .gpu
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Frame Encoder"),
            });

        {
            let mut scene_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Scene Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(self.clear_color),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                ..Default::default()
            });
            self.mesh.draw(
                &mut scene_pass,
                &self.sprite_pipeline,
                &self.camera_bind_group,
                &self.textures,
                &self.batch,
            );
        }

        self.debug_overlay.upload(
            &self.gpu.device,
            &self.gpu.queue,
            &mut encoder,
            &egui_primitives,
            &egui_textures_delta,
            &screen_descriptor,
        );
        {
            let mut overlay_pass = encoder
                .begin_render_pass(&wgpu::RenderPassDescriptor {
                    label: Some("Overlay Pass"),
                    color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                        view: &view,
                        resolve_target: None,
                        ops: wgpu::Operations {
                            load: wgpu::LoadOp::Load,
                            store: wgpu::StoreOp::Store,
                        },
                    })],
                    ..Default::default()
                })
                .forget_lifetime();
            self.debug_overlay
                .paint(&mut overlay_pass, &egui_primitives, &screen_descriptor);
        }
        self.debug_overlay.cleanup(&egui_textures_delta);

        self.gpu.queue.submit(std::iter::once(encoder.finish()));
        frame.present();
    }

    fn overlay_stats(&self) -> OverlayStats {
        let delta = self.driver.input.mouse_delta();
        OverlayStats {
            object_count: self.driver.objects.len() as u32,
            draw_calls: self.batch.draw_calls.len() as u32,
            texture_binds: self.batch.texture_binds() as u32,
            vertex_count: self.batch.vertices.len() as u32,
            loaded_textures: self.textures.len() as u32,
            texture_memory_mb: self.textures.memory_bytes() as f32 / (1024.0 * 1024.0),
            mouse_delta: (delta.x, delta.y),
            cursor_locked: self.driver.input.is_cursor_locked(),
            paused: self.driver.paused,
        }
    }
}

struct App {
    config: GameConfig,
    state: Option<EngineState>,
}

impl App {
    fn platform_config(&self) -> PlatformConfig {
        PlatformConfig {
            title: self.config.window.title.clone(),
            width: self.config.window.width,
            height: self.config.window.height,
        }
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.state.is_some() {
            return;
        }
        let platform = self.platform_config();
        let window = gt_platform::window::create_window(event_loop, &platform);
        log::info!("Window created: {}x{}", platform.width, platform.height);
        match EngineState::new(window, &self.config) {
            Ok(state) => self.state = Some(state),
            Err(err) => {
                log::error!("Startup failed: {err}");
                event_loop.exit();
            }
        }
    }

    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(state) = &self.state {
            state.window.request_redraw();
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        let Some(state) = self.state.as_mut() else {
            return;
        };

        if state
            .debug_overlay
            .handle_window_event(&state.window, &event)
        {
            return;
        }

        match event {
            WindowEvent::CloseRequested => {
                log::info!("Close requested, exiting.");
                event_loop.exit();
            }
            WindowEvent::Resized(size) => state.resize(size.width, size.height),
            WindowEvent::RedrawRequested => {
                if state.gpu.size.0 == 0 || state.gpu.size.1 == 0 {
                    return;
                }
                match state.step() {
                    FrameOutcome::Continue => state.render(),
                    FrameOutcome::Exit => {
                        log::info!("Escape pressed, exiting.");
                        event_loop.exit();
                    }
                }
            }
            other => state.handle_input(&other),
        }
    }
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    log::info!("Game template starting...");

    let config = load_config_or_default(Path::new(CONFIG_PATH));

    let event_loop = EventLoop::new().expect("Failed to create event loop");
    event_loop.set_control_flow(ControlFlow::Poll);

    let mut app = App {
        config,
        state: None,
    };
    event_loop.run_app(&mut app).expect("Event loop error");
}
