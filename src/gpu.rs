//! Core GPU context and device management.
//!
//! [`GpuContext`] holds the wgpu resources the rest of the viewer renders
//! with: the surface for presenting to the window, the logical device, the
//! command queue, and the current surface configuration. It is created once
//! at startup and passed by reference everywhere else.

use std::sync::Arc;
use winit::window::Window;

/// Failure while bringing up the graphics stack. All variants are fatal.
#[derive(Debug)]
pub enum GpuError {
    /// The window surface could not be created.
    CreateSurface(wgpu::CreateSurfaceError),
    /// No suitable GPU adapter was found.
    RequestAdapter(wgpu::RequestAdapterError),
    /// The logical device could not be created.
    RequestDevice(wgpu::RequestDeviceError),
}

impl std::fmt::Display for GpuError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GpuError::CreateSurface(e) => write!(f, "surface creation failed: {}", e),
            GpuError::RequestAdapter(e) => write!(f, "no suitable GPU adapter: {}", e),
            GpuError::RequestDevice(e) => write!(f, "device creation failed: {}", e),
        }
    }
}

impl std::error::Error for GpuError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            GpuError::CreateSurface(e) => Some(e),
            GpuError::RequestAdapter(e) => Some(e),
            GpuError::RequestDevice(e) => Some(e),
        }
    }
}

impl From<wgpu::CreateSurfaceError> for GpuError {
    fn from(e: wgpu::CreateSurfaceError) -> Self {
        GpuError::CreateSurface(e)
    }
}

impl From<wgpu::RequestAdapterError> for GpuError {
    fn from(e: wgpu::RequestAdapterError) -> Self {
        GpuError::RequestAdapter(e)
    }
}

impl From<wgpu::RequestDeviceError> for GpuError {
    fn from(e: wgpu::RequestDeviceError) -> Self {
        GpuError::RequestDevice(e)
    }
}

/// Core GPU context holding wgpu resources.
///
/// All fields are public to allow direct access to wgpu APIs when needed.
pub struct GpuContext {
    /// The surface for presenting rendered frames to the window.
    pub surface: wgpu::Surface<'static>,
    /// The logical GPU device for creating resources and pipelines.
    pub device: wgpu::Device,
    /// The command queue for submitting work to the GPU.
    pub queue: wgpu::Queue,
    /// Current surface configuration (format, size, present mode).
    pub config: wgpu::SurfaceConfiguration,
}

impl GpuContext {
    /// Create a new GPU context from a winit window.
    ///
    /// Performs all wgpu initialization in order: instance with primary
    /// backends, surface for the window, adapter, device and queue, then the
    /// surface configuration with an sRGB format. `Fifo` present mode
    /// throttles presentation to the display refresh rate (swap interval 1).
    pub fn new(window: Arc<Window>) -> Result<Self, GpuError> {
        let size = window.inner_size();

        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::PRIMARY,
            ..Default::default()
        });

        let surface = instance.create_surface(window)?;

        let adapter = pollster::block_on(instance.request_adapter(&wgpu::RequestAdapterOptions {
            power_preference: wgpu::PowerPreference::default(),
            compatible_surface: Some(&surface),
            force_fallback_adapter: false,
        }))?;

        log::info!("using adapter: {}", adapter.get_info().name);

        let (device, queue) = pollster::block_on(adapter.request_device(&wgpu::DeviceDescriptor {
            label: Some("Orbview Device"),
            required_features: wgpu::Features::empty(),
            required_limits: wgpu::Limits::default(),
            memory_hints: Default::default(),
            trace: Default::default(),
            experimental_features: Default::default(),
        }))?;

        // Uncaptured device errors during the running loop are diagnostics,
        // not termination conditions.
        device.on_uncaptured_error(Arc::new(|error| {
            log::error!("wgpu: {}", error);
        }));

        let surface_caps = surface.get_capabilities(&adapter);
        let surface_format = surface_caps
            .formats
            .iter()
            .find(|f| f.is_srgb())
            .copied()
            .unwrap_or(surface_caps.formats[0]);

        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: surface_format,
            width: size.width,
            height: size.height,
            present_mode: wgpu::PresentMode::Fifo,
            alpha_mode: surface_caps.alpha_modes[0],
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &config);

        Ok(Self {
            surface,
            device,
            queue,
            config,
        })
    }

    /// Resize the surface to new dimensions.
    ///
    /// Ignores zero-sized dimensions to avoid wgpu validation errors
    /// (which can occur during window minimize).
    pub fn resize(&mut self, width: u32, height: u32) {
        if width > 0 && height > 0 {
            self.config.width = width;
            self.config.height = height;
            self.surface.configure(&self.device, &self.config);
        }
    }

    /// Returns the current surface width in pixels.
    pub fn width(&self) -> u32 {
        self.config.width
    }

    /// Returns the current surface height in pixels.
    pub fn height(&self) -> u32 {
        self.config.height
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    #[test]
    fn error_logging_closure_is_a_valid_uncaptured_handler() {
        let handler: Arc<dyn wgpu::UncapturedErrorHandler> =
            Arc::new(|error: wgpu::Error| {
                log::error!("wgpu: {}", error);
            });
        drop(handler);
    }
}
