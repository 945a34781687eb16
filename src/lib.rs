//! # orbview
//!
//! **A minimal orbit-camera viewer for Wavefront OBJ meshes.**
//!
//! Loads one triangle mesh, frames it by its bounding-box center, and
//! renders it from a camera that orbits that center under keyboard control:
//! W/S move the polar angle, A/D move the azimuth, Escape quits.
//!
//! ```no_run
//! fn main() {
//!     env_logger::init();
//!     let config = orbview::ViewerConfig::new().model("assets/cube.obj");
//!     if let Err(err) = orbview::run(config) {
//!         log::error!("{err}");
//!         std::process::exit(1);
//!     }
//! }
//! ```
//!
//! The OBJ loader, bounding-box framing, and orbit-camera math live in
//! their own modules and are usable without a window or a GPU.

mod app;
mod camera;
mod geometry;
mod gpu;
mod input;
mod mesh;
mod mesh_pass;
mod orbit_camera;
mod shader;

pub use app::{ViewerConfig, ViewerError, run};
pub use camera::{Camera, Projection, normal_matrix};
pub use geometry::{Aabb, GeometryError, RawGeometry};
pub use gpu::{GpuContext, GpuError};
pub use input::Input;
pub use mesh::{Mesh, Vertex3d};
pub use mesh_pass::{FrameUniforms, MeshPass};
pub use orbit_camera::{KEY_BINDINGS, ORBIT_STEP, OrbitCamera, OrbitDelta};
pub use shader::{ShaderError, ShaderStage};

// Re-export glam math types for convenience
pub use glam::{Mat3, Mat4, Vec3};
