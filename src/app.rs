//! Application shell: window, event loop, and the per-frame draw step.
//!
//! The shell is a winit [`ApplicationHandler`] with three states: `Pending`
//! before the first resume, `Running` once every resource is initialized,
//! and `Failed` carrying the error that aborted startup. All state lives in
//! one struct passed to the handler; nothing is process-global.
//!
//! Each loop iteration performs exactly three steps in order: render the
//! frame, present it, poll and dispatch input/resize events. Input handling
//! mutates the orbit camera synchronously within the polling step, so
//! rendering and input never overlap.

use std::path::PathBuf;
use std::sync::Arc;

use winit::application::ApplicationHandler;
use winit::event::WindowEvent;
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::keyboard::KeyCode;
use winit::window::{Window, WindowAttributes, WindowId};

use crate::camera::Projection;
use crate::geometry::{GeometryError, RawGeometry};
use crate::gpu::{GpuContext, GpuError};
use crate::input::Input;
use crate::mesh::Mesh;
use crate::mesh_pass::MeshPass;
use crate::orbit_camera::{KEY_BINDINGS, OrbitCamera};
use crate::shader::{ShaderError, ShaderStage};

/// Fixed vertical field of view in radians.
const FOV_Y: f32 = 0.7;
/// Near clip plane distance.
const NEAR: f32 = 1.0;
/// Far clip plane distance.
const FAR: f32 = 800.0;
/// Orbit radius, fixed for the session.
const ORBIT_RADIUS: f32 = 500.0;
/// Starting polar angle in radians.
const START_THETA: f32 = 1.5;
/// Starting azimuthal angle in radians.
const START_PHI: f32 = 1.5;

/// Any failure that aborts viewer startup. All variants are fatal: the
/// policy is report and exit, no retry.
#[derive(Debug)]
pub enum ViewerError {
    /// Graphics stack initialization failed.
    Gpu(GpuError),
    /// The model could not be loaded or was structurally invalid.
    Geometry(GeometryError),
    /// A shader stage failed to load, compile, or link.
    Shader(ShaderError),
    /// The event loop could not be created or exited with an error.
    EventLoop(winit::error::EventLoopError),
    /// The window could not be created.
    Window(winit::error::OsError),
}

impl std::fmt::Display for ViewerError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ViewerError::Gpu(e) => write!(f, "{}", e),
            ViewerError::Geometry(e) => write!(f, "{}", e),
            ViewerError::Shader(e) => write!(f, "{}", e),
            ViewerError::EventLoop(e) => write!(f, "event loop error: {}", e),
            ViewerError::Window(e) => write!(f, "window creation failed: {}", e),
        }
    }
}

impl std::error::Error for ViewerError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ViewerError::Gpu(e) => Some(e),
            ViewerError::Geometry(e) => Some(e),
            ViewerError::Shader(e) => Some(e),
            ViewerError::EventLoop(e) => Some(e),
            ViewerError::Window(e) => Some(e),
        }
    }
}

impl From<GpuError> for ViewerError {
    fn from(e: GpuError) -> Self {
        ViewerError::Gpu(e)
    }
}

impl From<GeometryError> for ViewerError {
    fn from(e: GeometryError) -> Self {
        ViewerError::Geometry(e)
    }
}

impl From<ShaderError> for ViewerError {
    fn from(e: ShaderError) -> Self {
        ViewerError::Shader(e)
    }
}

impl From<winit::error::EventLoopError> for ViewerError {
    fn from(e: winit::error::EventLoopError) -> Self {
        ViewerError::EventLoop(e)
    }
}

impl From<winit::error::OsError> for ViewerError {
    fn from(e: winit::error::OsError) -> Self {
        ViewerError::Window(e)
    }
}

/// Configuration for the viewer window and asset paths.
pub struct ViewerConfig {
    pub title: String,
    pub width: u32,
    pub height: u32,
    pub model_path: PathBuf,
    pub vertex_shader: PathBuf,
    pub fragment_shader: PathBuf,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            title: "orbview".to_string(),
            width: 512,
            height: 512,
            model_path: PathBuf::from("assets/cube.obj"),
            vertex_shader: PathBuf::from("shaders/mesh.vert.wgsl"),
            fragment_shader: PathBuf::from("shaders/mesh.frag.wgsl"),
        }
    }
}

impl ViewerConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    pub fn size(mut self, width: u32, height: u32) -> Self {
        self.width = width;
        self.height = height;
        self
    }

    pub fn model(mut self, path: impl Into<PathBuf>) -> Self {
        self.model_path = path.into();
        self
    }

    pub fn shaders(mut self, vertex: impl Into<PathBuf>, fragment: impl Into<PathBuf>) -> Self {
        self.vertex_shader = vertex.into();
        self.fragment_shader = fragment.into();
        self
    }
}

/// Everything the running viewer owns.
struct State {
    window: Arc<Window>,
    gpu: GpuContext,
    mesh: Mesh,
    mesh_pass: MeshPass,
    orbit: OrbitCamera,
    projection: Projection,
    input: Input,
}

enum App {
    Pending { config: ViewerConfig },
    Running(State),
    Failed(ViewerError),
}

impl App {
    fn initialize(config: &ViewerConfig, event_loop: &ActiveEventLoop) -> Result<State, ViewerError> {
        let window_attrs = WindowAttributes::default()
            .with_title(&config.title)
            .with_inner_size(winit::dpi::LogicalSize::new(config.width, config.height));
        let window = Arc::new(event_loop.create_window(window_attrs)?);

        let gpu = GpuContext::new(window.clone())?;

        let geometry = RawGeometry::from_file(&config.model_path)?;
        let bounds = geometry.bounds()?;
        let center = bounds.center();

        log::info!(
            "loaded '{}': {} vertices, {} triangles",
            config.model_path.display(),
            geometry.vertex_count(),
            geometry.triangle_count()
        );
        log::info!("x range: {} {}", bounds.min.x, bounds.max.x);
        log::info!("y range: {} {}", bounds.min.y, bounds.max.y);
        log::info!("z range: {} {}", bounds.min.z, bounds.max.z);
        log::info!("center: {} {} {}", center.x, center.y, center.z);

        let mesh = geometry.upload(&gpu);

        let vertex = ShaderStage::from_file(&gpu, &config.vertex_shader)?;
        let fragment = ShaderStage::from_file(&gpu, &config.fragment_shader)?;
        let mesh_pass = MeshPass::new(&gpu, &vertex, &fragment)?;

        // The bounding-box center is the look-at target for the whole
        // session; only the orbit angles change after this point.
        let orbit = OrbitCamera::new(center, ORBIT_RADIUS, START_THETA, START_PHI);
        let projection = Projection::new(FOV_Y, NEAR, FAR, gpu.width(), gpu.height());

        Ok(State {
            window,
            gpu,
            mesh,
            mesh_pass,
            orbit,
            projection,
            input: Input::new(),
        })
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if let App::Pending { config } = self {
            let config = std::mem::take(config);
            match Self::initialize(&config, event_loop) {
                Ok(state) => *self = App::Running(state),
                Err(err) => {
                    log::error!("initialization failed: {}", err);
                    *self = App::Failed(err);
                    event_loop.exit();
                }
            }
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _id: WindowId, event: WindowEvent) {
        let App::Running(state) = self else {
            return;
        };

        state.input.handle_event(&event);

        match event {
            WindowEvent::CloseRequested => {
                event_loop.exit();
            }
            WindowEvent::Resized(size) => {
                state.gpu.resize(size.width, size.height);
                state.projection.resize(size.width, size.height);
            }
            WindowEvent::RedrawRequested => {
                state.frame(event_loop);
            }
            _ => {}
        }
    }
}

/// Applies pending key presses to the orbit camera and drains the press
/// state. Runs once per loop iteration, before the surface is acquired, so a
/// dropped frame neither repeats nor loses a press: each discrete press
/// moves its angle by exactly one step.
fn apply_orbit_input(input: &mut Input, orbit: &mut OrbitCamera) {
    for &(key, delta) in KEY_BINDINGS {
        for _ in 0..input.key_press_count(key) {
            orbit.apply(delta);
        }
    }
    input.begin_frame();
}

impl State {
    /// Renders one frame, presents it, and schedules the next redraw.
    fn frame(&mut self, event_loop: &ActiveEventLoop) {
        if self.input.key_pressed(KeyCode::Escape) {
            event_loop.exit();
            return;
        }

        apply_orbit_input(&mut self.input, &mut self.orbit);

        self.mesh_pass.ensure_depth_size(&self.gpu);

        let output = match self.gpu.surface.get_current_texture() {
            Ok(output) => output,
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                // Recoverable: reconfigure and try again next frame.
                self.gpu.surface.configure(&self.gpu.device, &self.gpu.config);
                self.window.request_redraw();
                return;
            }
            Err(wgpu::SurfaceError::OutOfMemory) => {
                log::error!("surface out of memory");
                event_loop.exit();
                return;
            }
            Err(err) => {
                log::warn!("dropping frame: {}", err);
                self.window.request_redraw();
                return;
            }
        };

        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let mut encoder = self
            .gpu
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Frame Encoder"),
            });

        {
            let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Mesh Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color::WHITE),
                        store: wgpu::StoreOp::Store,
                    },
                    depth_slice: None,
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &self.mesh_pass.depth_view,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                timestamp_writes: None,
                occlusion_query_set: None,
            });

            self.mesh_pass.render(
                &self.gpu,
                &mut render_pass,
                &self.orbit.camera(),
                self.projection.matrix(),
                &self.mesh,
            );
        }

        self.gpu.queue.submit(std::iter::once(encoder.finish()));
        output.present();

        self.window.request_redraw();
    }
}

/// Runs the viewer until the window is closed or Escape is pressed.
///
/// Returns the startup error if initialization failed; the per-frame loop
/// itself only terminates through a close request.
pub fn run(config: ViewerConfig) -> Result<(), ViewerError> {
    let event_loop = EventLoop::new()?;
    event_loop.set_control_flow(ControlFlow::Poll);

    let mut app = App::Pending { config };
    event_loop.run_app(&mut app)?;

    match app {
        App::Failed(err) => Err(err),
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::orbit_camera::ORBIT_STEP;
    use glam::Vec3;
    use winit::event::ElementState;

    #[test]
    fn config_builder_overrides_defaults() {
        let config = ViewerConfig::new()
            .title("vase viewer")
            .size(800, 600)
            .model("assets/vase.obj")
            .shaders("shaders/flat.vert.wgsl", "shaders/flat.frag.wgsl");

        assert_eq!(config.title, "vase viewer");
        assert_eq!((config.width, config.height), (800, 600));
        assert_eq!(config.model_path, PathBuf::from("assets/vase.obj"));
        assert_eq!(config.vertex_shader, PathBuf::from("shaders/flat.vert.wgsl"));
        assert_eq!(config.fragment_shader, PathBuf::from("shaders/flat.frag.wgsl"));
    }

    #[test]
    fn press_is_consumed_even_when_the_frame_is_dropped() {
        let mut input = Input::new();
        let mut orbit = OrbitCamera::new(Vec3::ZERO, 500.0, 1.5, 1.5);

        input.on_key(KeyCode::KeyW, ElementState::Pressed);
        apply_orbit_input(&mut input, &mut orbit);
        // The surface acquire that follows may fail and skip the present;
        // the next iteration must not re-apply the same physical press.
        apply_orbit_input(&mut input, &mut orbit);

        assert!((orbit.theta - (1.5 + ORBIT_STEP)).abs() < 1e-6);
    }

    #[test]
    fn two_discrete_presses_between_frames_step_twice() {
        let mut input = Input::new();
        let mut orbit = OrbitCamera::new(Vec3::ZERO, 500.0, 1.5, 1.5);

        input.on_key(KeyCode::KeyW, ElementState::Pressed);
        input.on_key(KeyCode::KeyW, ElementState::Released);
        input.on_key(KeyCode::KeyW, ElementState::Pressed);
        apply_orbit_input(&mut input, &mut orbit);

        assert!((orbit.theta - (1.5 + 2.0 * ORBIT_STEP)).abs() < 1e-6);
    }
}
