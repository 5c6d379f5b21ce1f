use anyhow::{Context, Result, anyhow};
use clap::Parser;
use egui::Context as EguiContext;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Instant, SystemTime, UNIX_EPOCH};
use tracing_subscriber::EnvFilter;
use walkabout_input::{EmulatedXr, InputState, PRIMARY_CONTROLLER, XrEvent, XrSession};
use walkabout_locomotion::{FrameClock, Locomotion, LocomotionConfig, Mode, RigMotion};
use walkabout_render_wgpu::{FirstPersonCamera, WgpuRenderer};
use walkabout_scene::Scene;
use winit::application::ApplicationHandler;
use winit::dpi::PhysicalSize;
use winit::event::{DeviceEvent, ElementState, KeyEvent, MouseButton, WindowEvent};
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::keyboard::{KeyCode, PhysicalKey};
use winit::window::{CursorGrabMode, Window, WindowId};

#[derive(Parser)]
#[command(name = "walkabout-desktop", about = "First-person walkabout demo")]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Locomotion config file (YAML)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Seed for tree placement; random when omitted
    #[arg(long)]
    seed: Option<u64>,
}

/// Physical key identifier (`KeyW`, `ShiftLeft`, ...) for the shared key table.
fn key_code_name(key: KeyCode) -> String {
    format!("{key:?}")
}

/// Application state.
struct AppState {
    scene: Scene,
    camera: FirstPersonCamera,
    locomotion: Locomotion,
    input: InputState,
    xr: EmulatedXr,
    clock: FrameClock,
    last_motion: RigMotion,
    pointer_locked: bool,
    show_hud: bool,
}

impl AppState {
    fn new(config: LocomotionConfig, seed: u64) -> Self {
        let scene = Scene::demo(seed);
        tracing::info!(seed, objects = scene.object_count(), "scene ready");
        Self {
            scene,
            camera: FirstPersonCamera::default(),
            locomotion: Locomotion::new(config),
            input: InputState::new(),
            xr: EmulatedXr::new(),
            clock: FrameClock::start(),
            last_motion: RigMotion::Idle,
            pointer_locked: false,
            show_hud: true,
        }
    }

    fn update(&mut self, dt: f32) {
        if self.xr.is_presenting() {
            // The emulated controller points wherever the camera looks.
            self.xr
                .set_controller_orientation(PRIMARY_CONTROLLER, self.camera.pose.look_rotation());
        }
        let motion = self
            .locomotion
            .update_with_session(dt, &self.input, &self.xr);
        motion.apply(&mut self.camera);
        self.last_motion = motion;
    }

    fn handle_key(&mut self, key: KeyCode, pressed: bool) {
        self.input.handle_key(&key_code_name(key), pressed);
        if !pressed {
            return;
        }

        match key {
            KeyCode::F1 => {
                self.show_hud = !self.show_hud;
            }
            KeyCode::F2 => {
                self.xr.toggle_presenting();
            }
            _ => {}
        }
    }

    /// Left button: trigger while presenting and locked, otherwise nothing.
    fn handle_select(&mut self, pressed: bool) {
        if !self.xr.is_presenting() {
            return;
        }
        let controller = PRIMARY_CONTROLLER;
        let event = if pressed {
            XrEvent::SelectStart { controller }
        } else {
            XrEvent::SelectEnd { controller }
        };
        self.locomotion.handle_xr_event(event);
    }

    fn draw_ui(&self, ctx: &EguiContext) {
        if !self.show_hud {
            return;
        }

        egui::Window::new("Walkabout")
            .default_pos([12.0, 12.0])
            .resizable(false)
            .show(ctx, |ui| {
                let mode = match self.locomotion.mode() {
                    Some(Mode::Vr) => "XR glide",
                    Some(Mode::Desktop) | None => "Desktop walk",
                };
                ui.label(format!("Mode: {mode}"));
                let p = self.camera.position();
                ui.label(format!("Position: ({:.2}, {:.2}, {:.2})", p.x, p.y, p.z));
                let v = self.locomotion.desktop().velocity();
                ui.label(format!("Velocity: ({:.2}, {:.2})", v.x, v.y));
                if self.xr.is_presenting() {
                    ui.label(format!(
                        "Trigger: {}",
                        if self.locomotion.vr().trigger_held() {
                            "held"
                        } else {
                            "up"
                        }
                    ));
                }
                ui.label(format!("Last motion: {:?}", self.last_motion));
                ui.separator();
                ui.small(if self.pointer_locked {
                    "Esc: release pointer"
                } else {
                    "Click: capture pointer"
                });
                ui.small("WASD: Move | Shift: Run | F1: HUD | F2: XR emulation");
            });
    }
}

/// Window plus every GPU resource tied to it.
struct Gpu {
    window: Arc<Window>,
    surface: wgpu::Surface<'static>,
    device: wgpu::Device,
    queue: wgpu::Queue,
    config: wgpu::SurfaceConfiguration,
    renderer: WgpuRenderer,
    egui_winit: egui_winit::State,
    egui_renderer: egui_wgpu::Renderer,
}

impl Gpu {
    fn new(event_loop: &ActiveEventLoop, egui_ctx: &EguiContext) -> Result<Self> {
        let attrs = Window::default_attributes()
            .with_title("Walkabout")
            .with_inner_size(PhysicalSize::new(1280u32, 720));
        let window = Arc::new(
            event_loop
                .create_window(attrs)
                .context("create window")?,
        );

        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            ..Default::default()
        });

        let surface = instance
            .create_surface(window.clone())
            .context("create surface")?;

        let adapter = pollster::block_on(instance.request_adapter(&wgpu::RequestAdapterOptions {
            power_preference: wgpu::PowerPreference::HighPerformance,
            compatible_surface: Some(&surface),
            force_fallback_adapter: false,
        }))
        .ok_or_else(|| anyhow!("no compatible GPU adapter"))?;

        let (device, queue) = pollster::block_on(adapter.request_device(
            &wgpu::DeviceDescriptor {
                label: Some("walkabout_device"),
                required_features: wgpu::Features::empty(),
                required_limits: wgpu::Limits::default(),
                memory_hints: Default::default(),
            },
            None,
        ))
        .context("create device")?;

        let size = window.inner_size();
        let surface_caps = surface.get_capabilities(&adapter);
        let surface_format = surface_caps
            .formats
            .iter()
            .find(|f| f.is_srgb())
            .or_else(|| surface_caps.formats.first())
            .copied()
            .ok_or_else(|| anyhow!("surface reports no formats"))?;
        let alpha_mode = surface_caps
            .alpha_modes
            .first()
            .copied()
            .unwrap_or(wgpu::CompositeAlphaMode::Auto);

        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: surface_format,
            width: size.width.max(1),
            height: size.height.max(1),
            present_mode: wgpu::PresentMode::AutoVsync,
            alpha_mode,
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &config);

        let renderer = WgpuRenderer::new(&device, surface_format, config.width, config.height);

        let egui_winit = egui_winit::State::new(
            egui_ctx.clone(),
            egui::ViewportId::ROOT,
            &window,
            Some(window.scale_factor() as f32),
            None,
            None,
        );
        let egui_renderer = egui_wgpu::Renderer::new(&device, surface_format, None, 1, false);

        tracing::info!(
            "GPU initialized with {} backend",
            adapter.get_info().backend.to_str()
        );

        Ok(Self {
            window,
            surface,
            device,
            queue,
            config,
            renderer,
            egui_winit,
            egui_renderer,
        })
    }

    fn resize(&mut self, size: PhysicalSize<u32>) {
        self.config.width = size.width.max(1);
        self.config.height = size.height.max(1);
        self.surface.configure(&self.device, &self.config);
        self.renderer
            .resize(&self.device, self.config.width, self.config.height);
    }

    /// Capture the pointer for mouse look. Falls back to confining it.
    fn lock_pointer(&self) -> bool {
        let grabbed = self
            .window
            .set_cursor_grab(CursorGrabMode::Locked)
            .or_else(|_| self.window.set_cursor_grab(CursorGrabMode::Confined));
        match grabbed {
            Ok(()) => {
                self.window.set_cursor_visible(false);
                true
            }
            Err(e) => {
                tracing::warn!("pointer lock denied: {e}");
                false
            }
        }
    }

    fn release_pointer(&self) {
        if let Err(e) = self.window.set_cursor_grab(CursorGrabMode::None) {
            tracing::warn!("failed to release pointer: {e}");
        }
        self.window.set_cursor_visible(true);
    }

    fn render_frame(&mut self, state: &AppState, egui_ctx: &EguiContext) {
        let output = match self.surface.get_current_texture() {
            Ok(t) => t,
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                self.surface.configure(&self.device, &self.config);
                return;
            }
            Err(e) => {
                tracing::error!("surface error: {e}");
                return;
            }
        };

        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        self.renderer.render(
            &self.device,
            &self.queue,
            &view,
            &state.camera,
            &state.scene,
        );

        let raw_input = self.egui_winit.take_egui_input(&self.window);
        let full_output = egui_ctx.run(raw_input, |ctx| {
            state.draw_ui(ctx);
        });
        self.egui_winit
            .handle_platform_output(&self.window, full_output.platform_output);

        let paint_jobs = egui_ctx.tessellate(full_output.shapes, full_output.pixels_per_point);
        let screen_descriptor = egui_wgpu::ScreenDescriptor {
            size_in_pixels: [self.config.width, self.config.height],
            pixels_per_point: full_output.pixels_per_point,
        };

        for (id, image_delta) in &full_output.textures_delta.set {
            self.egui_renderer
                .update_texture(&self.device, &self.queue, *id, image_delta);
        }
        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("egui_encoder"),
            });
        self.egui_renderer.update_buffers(
            &self.device,
            &self.queue,
            &mut encoder,
            &paint_jobs,
            &screen_descriptor,
        );
        {
            let mut pass = encoder
                .begin_render_pass(&wgpu::RenderPassDescriptor {
                    label: Some("egui_pass"),
                    color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                        view: &view,
                        resolve_target: None,
                        ops: wgpu::Operations {
                            load: wgpu::LoadOp::Load,
                            store: wgpu::StoreOp::Store,
                        },
                    })],
                    depth_stencil_attachment: None,
                    ..Default::default()
                })
                .forget_lifetime();
            self.egui_renderer
                .render(&mut pass, &paint_jobs, &screen_descriptor);
        }
        self.queue.submit(std::iter::once(encoder.finish()));
        for id in &full_output.textures_delta.free {
            self.egui_renderer.free_texture(id);
        }

        output.present();
    }
}

struct App {
    state: AppState,
    gpu: Option<Gpu>,
    egui_ctx: EguiContext,
}

impl App {
    fn new(config: LocomotionConfig, seed: u64) -> Self {
        Self {
            state: AppState::new(config, seed),
            gpu: None,
            egui_ctx: EguiContext::default(),
        }
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.gpu.is_some() {
            return;
        }

        match Gpu::new(event_loop, &self.egui_ctx) {
            Ok(gpu) => {
                let size = gpu.window.inner_size();
                self.state.camera.set_viewport(size.width, size.height);
                self.gpu = Some(gpu);
                // Do not count start-up time as the first frame.
                self.state.clock = FrameClock::start();
            }
            Err(e) => {
                tracing::error!("failed to initialise graphics: {e:#}");
                event_loop.exit();
            }
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        let Some(gpu) = self.gpu.as_mut() else {
            return;
        };

        let response = gpu.egui_winit.on_window_event(&gpu.window, &event);
        if response.consumed && !self.state.pointer_locked {
            return;
        }

        match event {
            WindowEvent::CloseRequested => {
                event_loop.exit();
            }
            WindowEvent::Resized(new_size) => {
                gpu.resize(new_size);
                self.state
                    .camera
                    .set_viewport(gpu.config.width, gpu.config.height);
            }
            WindowEvent::Focused(false) if self.state.pointer_locked => {
                gpu.release_pointer();
                self.state.pointer_locked = false;
            }
            WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        physical_key: PhysicalKey::Code(key),
                        state: key_state,
                        repeat: false,
                        ..
                    },
                ..
            } => {
                let pressed = key_state == ElementState::Pressed;
                if key == KeyCode::Escape && pressed && self.state.pointer_locked {
                    gpu.release_pointer();
                    self.state.pointer_locked = false;
                }
                self.state.handle_key(key, pressed);
            }
            WindowEvent::MouseInput {
                button: MouseButton::Left,
                state: btn_state,
                ..
            } => {
                let pressed = btn_state == ElementState::Pressed;
                if !self.state.pointer_locked {
                    if pressed {
                        self.state.pointer_locked = gpu.lock_pointer();
                    }
                } else {
                    self.state.handle_select(pressed);
                }
            }
            WindowEvent::RedrawRequested => {
                let dt = self.state.clock.tick(Instant::now());
                self.state.update(dt);
                gpu.render_frame(&self.state, &self.egui_ctx);
                gpu.window.request_redraw();
            }
            _ => {}
        }
    }

    fn device_event(
        &mut self,
        _event_loop: &ActiveEventLoop,
        _device_id: winit::event::DeviceId,
        event: DeviceEvent,
    ) {
        if let DeviceEvent::MouseMotion { delta } = event {
            if self.state.pointer_locked {
                self.state.camera.look(delta.0 as f32, delta.1 as f32);
            }
        }
    }

    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(gpu) = &self.gpu {
            gpu.window.request_redraw();
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .init();

    tracing::info!("walkabout-desktop starting");

    let config = match &cli.config {
        Some(path) => LocomotionConfig::load(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => LocomotionConfig::default(),
    };
    let seed = cli.seed.unwrap_or_else(|| {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_nanos() as u64)
            .unwrap_or_default()
    });

    let event_loop = EventLoop::new()?;
    event_loop.set_control_flow(ControlFlow::Poll);

    let mut app = App::new(config, seed);
    event_loop.run_app(&mut app)?;

    Ok(())
}
