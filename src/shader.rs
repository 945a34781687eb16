//! Shader stage loading and compilation.
//!
//! The vertex and fragment stages are plain WGSL text files loaded from disk
//! at startup. Compilation runs inside a wgpu validation error scope so a
//! broken shader surfaces as a [`ShaderError`] instead of an uncaptured
//! device error; the same scope mechanism wraps pipeline creation, where a
//! shader whose interface does not match the vertex layout shows up as a
//! linkage failure.

use std::path::{Path, PathBuf};

use crate::gpu::GpuContext;

/// Failure while loading or compiling a shader stage. Fatal at init.
#[derive(Debug)]
pub enum ShaderError {
    /// The shader source file could not be read.
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    /// The WGSL failed validation.
    Compile { path: PathBuf, message: String },
    /// Pipeline creation rejected the compiled stages.
    Linkage(String),
}

impl std::fmt::Display for ShaderError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ShaderError::Io { path, source } => {
                write!(f, "cannot read shader '{}': {}", path.display(), source)
            }
            ShaderError::Compile { path, message } => {
                write!(f, "shader '{}' failed to compile: {}", path.display(), message)
            }
            ShaderError::Linkage(msg) => write!(f, "shader linkage error: {}", msg),
        }
    }
}

impl std::error::Error for ShaderError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ShaderError::Io { source, .. } => Some(source),
            _ => None,
        }
    }
}

/// A compiled WGSL shader stage and the path it came from.
pub struct ShaderStage {
    pub module: wgpu::ShaderModule,
    pub path: PathBuf,
}

impl ShaderStage {
    /// Reads WGSL source from a file and compiles it.
    pub fn from_file(gpu: &GpuContext, path: impl AsRef<Path>) -> Result<Self, ShaderError> {
        let path = path.as_ref().to_path_buf();
        let source = std::fs::read_to_string(&path).map_err(|e| ShaderError::Io {
            path: path.clone(),
            source: e,
        })?;

        let label = path.display().to_string();
        let module = validation_scope(gpu, || {
            gpu.device.create_shader_module(wgpu::ShaderModuleDescriptor {
                label: Some(&label),
                source: wgpu::ShaderSource::Wgsl(source.into()),
            })
        })
        .map_err(|message| ShaderError::Compile {
            path: path.clone(),
            message,
        })?;

        Ok(Self { module, path })
    }
}

/// Runs `f` inside a wgpu validation error scope.
///
/// Returns the captured validation message instead of letting the error
/// reach the uncaptured-error handler.
pub(crate) fn validation_scope<T>(gpu: &GpuContext, f: impl FnOnce() -> T) -> Result<T, String> {
    gpu.device.push_error_scope(wgpu::ErrorFilter::Validation);
    let value = f();
    match pollster::block_on(gpu.device.pop_error_scope()) {
        Some(error) => Err(error.to_string()),
        None => Ok(value),
    }
}
