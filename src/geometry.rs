//! Geometry loading and bounds computation.
//!
//! The loader parses a Wavefront OBJ file into [`RawGeometry`]: flat vertex
//! data plus triangle indices, validated before anything touches the GPU.
//! [`Aabb`] is the axis-aligned bounding box of that geometry; its center is
//! the fixed look-at target for the whole session.
//!
//! ```no_run
//! use orbview::RawGeometry;
//!
//! let geometry = RawGeometry::from_file("assets/cube.obj")?;
//! let bounds = geometry.bounds()?;
//! let target = bounds.center();
//! # Ok::<(), orbview::GeometryError>(())
//! ```

use std::path::Path;

use glam::Vec3;

use crate::gpu::GpuContext;
use crate::mesh::{Mesh, Vertex3d};

/// Errors that can occur when loading geometry.
#[derive(Debug)]
pub enum GeometryError {
    /// File could not be read.
    Io(std::io::Error),
    /// File format could not be determined from extension.
    UnknownFormat(String),
    /// The file could not be parsed as an OBJ.
    Parse(String),
    /// The geometry data was structurally invalid (empty, bad index, ...).
    Malformed(String),
}

impl std::fmt::Display for GeometryError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GeometryError::Io(e) => write!(f, "IO error: {}", e),
            GeometryError::UnknownFormat(ext) => {
                write!(f, "unknown geometry format: '{}'", ext)
            }
            GeometryError::Parse(msg) => write!(f, "parse error: {}", msg),
            GeometryError::Malformed(msg) => write!(f, "malformed mesh: {}", msg),
        }
    }
}

impl std::error::Error for GeometryError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            GeometryError::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<std::io::Error> for GeometryError {
    fn from(e: std::io::Error) -> Self {
        GeometryError::Io(e)
    }
}

/// Axis-aligned bounding box.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Aabb {
    /// Per-axis minimum corner.
    pub min: Vec3,
    /// Per-axis maximum corner.
    pub max: Vec3,
}

impl Aabb {
    /// Computes the bounding box of a point sequence in a single linear scan.
    ///
    /// A single point yields a zero-volume box at that point. An empty
    /// sequence is invalid input and is rejected rather than producing an
    /// infinite box.
    pub fn from_points<I>(points: I) -> Result<Self, GeometryError>
    where
        I: IntoIterator<Item = Vec3>,
    {
        let mut min = Vec3::splat(f32::INFINITY);
        let mut max = Vec3::splat(f32::NEG_INFINITY);
        let mut empty = true;

        for p in points {
            min = min.min(p);
            max = max.max(p);
            empty = false;
        }

        if empty {
            return Err(GeometryError::Malformed(
                "empty position list".to_string(),
            ));
        }

        Ok(Self { min, max })
    }

    /// The midpoint of min and max per axis.
    pub fn center(&self) -> Vec3 {
        (self.min + self.max) * 0.5
    }

    /// Extent of the box per axis.
    pub fn size(&self) -> Vec3 {
        self.max - self.min
    }
}

/// Validated geometry data before GPU upload.
///
/// Created once at startup by the loader; the buffers live only until
/// [`RawGeometry::upload`] hands them to the GPU.
#[derive(Clone, Debug)]
pub struct RawGeometry {
    /// Vertex positions and normals.
    pub vertices: Vec<Vertex3d>,
    /// Triangle indices, every one `< vertices.len()`.
    pub indices: Vec<u32>,
}

impl RawGeometry {
    /// Loads geometry from a file, detecting the format from the extension.
    ///
    /// Currently only `.obj` is supported.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, GeometryError> {
        let path = path.as_ref();
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|s| s.to_lowercase())
            .unwrap_or_default();

        match ext.as_str() {
            "obj" => Self::from_obj_file(path),
            _ => Err(GeometryError::UnknownFormat(ext)),
        }
    }

    /// Loads a Wavefront OBJ file.
    ///
    /// Faces are triangulated and re-indexed to a single index stream. Only
    /// the first model in a multi-object file is used.
    pub fn from_obj_file(path: &Path) -> Result<Self, GeometryError> {
        let (models, _materials) = tobj::load_obj(path, &tobj::GPU_LOAD_OPTIONS)
            .map_err(|e| GeometryError::Parse(format!("OBJ load error: {}", e)))?;

        let mesh = &models
            .first()
            .ok_or_else(|| GeometryError::Malformed("OBJ file contains no models".to_string()))?
            .mesh;

        Self::from_flat(&mesh.positions, &mesh.normals, &mesh.indices)
    }

    /// Builds validated geometry from flat position/normal/index arrays.
    ///
    /// Positions are triples of floats; normals must either match the
    /// position count or be absent, in which case smooth normals are
    /// recomputed from the faces. Every index must reference an existing
    /// vertex.
    pub fn from_flat(
        positions: &[f32],
        normals: &[f32],
        indices: &[u32],
    ) -> Result<Self, GeometryError> {
        if positions.is_empty() {
            return Err(GeometryError::Malformed(
                "empty position list".to_string(),
            ));
        }
        if positions.len() % 3 != 0 {
            return Err(GeometryError::Malformed(format!(
                "position array length {} is not a multiple of 3",
                positions.len()
            )));
        }
        if indices.len() % 3 != 0 {
            return Err(GeometryError::Malformed(format!(
                "index count {} is not a multiple of 3",
                indices.len()
            )));
        }

        let has_normals = !normals.is_empty();
        if has_normals && normals.len() != positions.len() {
            return Err(GeometryError::Malformed(format!(
                "{} normal components for {} position components",
                normals.len(),
                positions.len()
            )));
        }

        let vertices: Vec<Vertex3d> = if has_normals {
            positions
                .chunks_exact(3)
                .zip(normals.chunks_exact(3))
                .map(|(p, n)| Vertex3d::new([p[0], p[1], p[2]], [n[0], n[1], n[2]]))
                .collect()
        } else {
            positions
                .chunks_exact(3)
                .map(|p| Vertex3d::new([p[0], p[1], p[2]], [0.0, 0.0, 0.0]))
                .collect()
        };

        let vertex_count = vertices.len() as u32;
        for &index in indices {
            if index >= vertex_count {
                return Err(GeometryError::Malformed(format!(
                    "index {} out of range for {} vertices",
                    index, vertex_count
                )));
            }
        }

        let mut geometry = Self {
            vertices,
            indices: indices.to_owned(),
        };

        if !has_normals {
            geometry.recalculate_normals();
        }

        Ok(geometry)
    }

    /// Number of vertices.
    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    /// Number of triangles.
    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    /// Computes the axis-aligned bounding box of the vertex positions.
    pub fn bounds(&self) -> Result<Aabb, GeometryError> {
        Aabb::from_points(self.vertices.iter().map(|v| Vec3::from(v.position)))
    }

    /// Recalculates vertex normals from face geometry.
    ///
    /// Computes smooth normals by averaging the face normals of all
    /// triangles that share each vertex, weighted by face area.
    pub fn recalculate_normals(&mut self) {
        for v in &mut self.vertices {
            v.normal = [0.0, 0.0, 0.0];
        }

        for tri in self.indices.chunks_exact(3) {
            let i0 = tri[0] as usize;
            let i1 = tri[1] as usize;
            let i2 = tri[2] as usize;

            let p0 = Vec3::from(self.vertices[i0].position);
            let p1 = Vec3::from(self.vertices[i1].position);
            let p2 = Vec3::from(self.vertices[i2].position);

            let face_normal = (p1 - p0).cross(p2 - p0);

            for &i in &[i0, i1, i2] {
                self.vertices[i].normal[0] += face_normal.x;
                self.vertices[i].normal[1] += face_normal.y;
                self.vertices[i].normal[2] += face_normal.z;
            }
        }

        for v in &mut self.vertices {
            let n = Vec3::from(v.normal);
            v.normal = n.normalize_or_zero().into();
        }
    }

    /// Uploads this geometry to the GPU as a [`Mesh`].
    pub fn upload(&self, gpu: &GpuContext) -> Mesh {
        Mesh::new(gpu, &self.vertices, &self.indices)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bounds_of_known_points() {
        let points = vec![
            Vec3::new(0.0, 0.0, 0.0),
            Vec3::new(1.0, 2.0, 3.0),
            Vec3::new(-1.0, -1.0, -1.0),
        ];
        let aabb = Aabb::from_points(points).unwrap();

        assert_eq!(aabb.min, Vec3::new(-1.0, -1.0, -1.0));
        assert_eq!(aabb.max, Vec3::new(1.0, 2.0, 3.0));
    }

    #[test]
    fn center_is_midpoint_of_extremes() {
        let points = vec![Vec3::new(0.0, 0.0, 0.0), Vec3::new(2.0, 4.0, 6.0)];
        let aabb = Aabb::from_points(points).unwrap();

        assert_eq!(aabb.center(), Vec3::new(1.0, 2.0, 3.0));
        assert!(aabb.min.cmple(aabb.center()).all());
        assert!(aabb.center().cmple(aabb.max).all());
    }

    #[test]
    fn single_point_yields_zero_volume_box() {
        let p = Vec3::new(3.0, -2.0, 7.5);
        let aabb = Aabb::from_points(std::iter::once(p)).unwrap();

        assert_eq!(aabb.min, p);
        assert_eq!(aabb.max, p);
        assert_eq!(aabb.size(), Vec3::ZERO);
        assert_eq!(aabb.center(), p);
        assert!(!aabb.center().is_nan());
    }

    #[test]
    fn empty_point_list_is_rejected() {
        let result = Aabb::from_points(std::iter::empty::<Vec3>());
        assert!(matches!(result, Err(GeometryError::Malformed(_))));
    }

    #[test]
    fn tetra_corner_bounds() {
        // (0,0,0) (1,0,0) (0,1,0) (0,0,1) spans the unit box.
        #[rustfmt::skip]
        let positions = [
            0.0, 0.0, 0.0,
            1.0, 0.0, 0.0,
            0.0, 1.0, 0.0,
            0.0, 0.0, 1.0,
        ];
        let indices = [0, 1, 2, 0, 1, 3, 0, 2, 3, 1, 2, 3];
        let geometry = RawGeometry::from_flat(&positions, &[], &indices).unwrap();

        let aabb = geometry.bounds().unwrap();
        assert_eq!(aabb.min, Vec3::new(0.0, 0.0, 0.0));
        assert_eq!(aabb.max, Vec3::new(1.0, 1.0, 1.0));
        assert_eq!(aabb.center(), Vec3::new(0.5, 0.5, 0.5));
    }

    #[test]
    fn empty_positions_are_rejected() {
        let result = RawGeometry::from_flat(&[], &[], &[]);
        assert!(matches!(result, Err(GeometryError::Malformed(_))));
    }

    #[test]
    fn out_of_range_index_is_rejected() {
        let positions = [0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0, 0.0];
        let result = RawGeometry::from_flat(&positions, &[], &[0, 1, 3]);
        assert!(matches!(result, Err(GeometryError::Malformed(_))));
    }

    #[test]
    fn mismatched_normal_count_is_rejected() {
        let positions = [0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0, 0.0];
        let normals = [0.0, 0.0, 1.0];
        let result = RawGeometry::from_flat(&positions, &normals, &[0, 1, 2]);
        assert!(matches!(result, Err(GeometryError::Malformed(_))));
    }

    #[test]
    fn missing_normals_are_recomputed() {
        // One CCW triangle in the XY plane, normal should face +Z.
        let positions = [0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0, 0.0];
        let geometry = RawGeometry::from_flat(&positions, &[], &[0, 1, 2]).unwrap();

        for v in &geometry.vertices {
            assert!((v.normal[0]).abs() < 1e-6);
            assert!((v.normal[1]).abs() < 1e-6);
            assert!((v.normal[2] - 1.0).abs() < 1e-6);
        }
    }

    #[test]
    fn unknown_extension_is_rejected() {
        let result = RawGeometry::from_file("model.gltf");
        assert!(matches!(result, Err(GeometryError::UnknownFormat(_))));
    }

    #[test]
    fn obj_file_round_trip() {
        let obj = "\
v 0.0 0.0 0.0
v 1.0 0.0 0.0
v 0.0 1.0 0.0
v 0.0 0.0 1.0
f 1 2 3
f 1 2 4
f 1 3 4
f 2 3 4
";
        let path = std::env::temp_dir().join("orbview_test_tetra.obj");
        std::fs::write(&path, obj).unwrap();

        let geometry = RawGeometry::from_file(&path).unwrap();
        std::fs::remove_file(&path).ok();

        assert_eq!(geometry.triangle_count(), 4);
        let aabb = geometry.bounds().unwrap();
        assert_eq!(aabb.min, Vec3::new(0.0, 0.0, 0.0));
        assert_eq!(aabb.max, Vec3::new(1.0, 1.0, 1.0));
        assert_eq!(aabb.center(), Vec3::new(0.5, 0.5, 0.5));
    }
}
