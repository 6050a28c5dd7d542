//! Parametric box geometry.
//!
//! The box is centred on the origin and built face by face as a grid of
//! `segments_u × segments_v` quads. Each face gets its own vertices (hard
//! edges) and its own material group, in the order +X, −X, +Y, −Y, +Z, −Z.

#[cfg(test)]
#[path = "geometry_test.rs"]
mod geometry_test;

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::component::Component;

/// A contiguous index range drawn with one material.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MeshGroup {
    /// First index in `indices`.
    pub start: usize,
    /// Number of indices.
    pub count: usize,
    pub material_index: usize,
}

/// CPU-side vertex and index buffers, ready for upload by the renderer.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MeshBuffers {
    pub positions: Vec<[f32; 3]>,
    pub normals: Vec<[f32; 3]>,
    pub uvs: Vec<[f32; 2]>,
    pub indices: Vec<u32>,
    pub groups: Vec<MeshGroup>,
}

impl MeshBuffers {
    #[must_use]
    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    #[must_use]
    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    /// Axis-aligned bounds of the positions, `None` when empty.
    #[must_use]
    pub fn bounds(&self) -> Option<(Vec3, Vec3)> {
        let mut iter = self.positions.iter().map(|p| Vec3::from_array(*p));
        let first = iter.next()?;
        Some(iter.fold((first, first), |(lo, hi), p| (lo.min(p), hi.max(p))))
    }
}

/// Dimensions and tessellation of a box.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BoxParams {
    pub width: f32,
    pub height: f32,
    pub depth: f32,
    pub width_segments: u32,
    pub height_segments: u32,
    pub depth_segments: u32,
}

impl Default for BoxParams {
    fn default() -> Self {
        Self {
            width: 1.0,
            height: 1.0,
            depth: 1.0,
            width_segments: 1,
            height_segments: 1,
            depth_segments: 1,
        }
    }
}

impl BoxParams {
    #[must_use]
    pub fn sized(width: f32, height: f32, depth: f32) -> Self {
        Self { width, height, depth, ..Self::default() }
    }

    /// Segment counts below one are raised to one.
    #[must_use]
    fn normalized(self) -> Self {
        Self {
            width_segments: self.width_segments.max(1),
            height_segments: self.height_segments.max(1),
            depth_segments: self.depth_segments.max(1),
            ..self
        }
    }
}

/// Box geometry component. Owns its mesh buffers and rebuilds them whenever
/// the parameters change.
#[derive(Debug, Clone)]
pub struct BoxGeometry {
    params: BoxParams,
    mesh: MeshBuffers,
    version: u64,
}

impl Default for BoxGeometry {
    fn default() -> Self {
        Self::new(BoxParams::default())
    }
}

impl BoxGeometry {
    #[must_use]
    pub fn new(params: BoxParams) -> Self {
        let params = params.normalized();
        Self { params, mesh: build_box(&params), version: 0 }
    }

    #[must_use]
    pub fn params(&self) -> BoxParams {
        self.params
    }

    #[must_use]
    pub fn buffers(&self) -> &MeshBuffers {
        &self.mesh
    }

    /// Bumped on every rebuild so renderers know to re-upload.
    #[must_use]
    pub fn version(&self) -> u64 {
        self.version
    }

    /// Replace the parameters. Returns `false` (and keeps the buffers) when
    /// nothing changed.
    pub fn set_params(&mut self, params: BoxParams) -> bool {
        let params = params.normalized();
        if params == self.params {
            return false;
        }
        self.params = params;
        self.mesh = build_box(&params);
        self.version += 1;
        true
    }

    pub fn set_size(&mut self, width: f32, height: f32, depth: f32) -> bool {
        self.set_params(BoxParams { width, height, depth, ..self.params })
    }

    pub fn set_segments(&mut self, width_segments: u32, height_segments: u32, depth_segments: u32) -> bool {
        self.set_params(BoxParams { width_segments, height_segments, depth_segments, ..self.params })
    }
}

impl Component for BoxGeometry {
    fn name(&self) -> &'static str {
        "box_geometry"
    }

    fn mesh(&self) -> Option<&MeshBuffers> {
        Some(&self.mesh)
    }
}

/// One face of the box: which position axes the grid's u / v run along,
/// which axis the face is offset on, and the signs applied.
struct Face {
    u: usize,
    v: usize,
    w: usize,
    u_dir: f32,
    v_dir: f32,
    width: f32,
    height: f32,
    depth: f32,
    grid_x: u32,
    grid_y: u32,
}

fn build_box(p: &BoxParams) -> MeshBuffers {
    let (x, y, z) = (0, 1, 2);
    let faces = [
        // +X
        Face { u: z, v: y, w: x, u_dir: -1.0, v_dir: -1.0, width: p.depth, height: p.height, depth: p.width, grid_x: p.depth_segments, grid_y: p.height_segments },
        // −X
        Face { u: z, v: y, w: x, u_dir: 1.0, v_dir: -1.0, width: p.depth, height: p.height, depth: -p.width, grid_x: p.depth_segments, grid_y: p.height_segments },
        // +Y
        Face { u: x, v: z, w: y, u_dir: 1.0, v_dir: 1.0, width: p.width, height: p.depth, depth: p.height, grid_x: p.width_segments, grid_y: p.depth_segments },
        // −Y
        Face { u: x, v: z, w: y, u_dir: 1.0, v_dir: -1.0, width: p.width, height: p.depth, depth: -p.height, grid_x: p.width_segments, grid_y: p.depth_segments },
        // +Z
        Face { u: x, v: y, w: z, u_dir: 1.0, v_dir: -1.0, width: p.width, height: p.height, depth: p.depth, grid_x: p.width_segments, grid_y: p.height_segments },
        // −Z
        Face { u: x, v: y, w: z, u_dir: -1.0, v_dir: -1.0, width: p.width, height: p.height, depth: -p.depth, grid_x: p.width_segments, grid_y: p.height_segments },
    ];

    let mut mesh = MeshBuffers::default();
    for (material_index, face) in faces.iter().enumerate() {
        build_face(&mut mesh, face, material_index);
    }
    mesh
}

#[allow(clippy::cast_precision_loss)]
fn build_face(mesh: &mut MeshBuffers, face: &Face, material_index: usize) {
    let grid_x = face.grid_x;
    let grid_y = face.grid_y;
    let segment_width = face.width / grid_x as f32;
    let segment_height = face.height / grid_y as f32;
    let half_width = face.width / 2.0;
    let half_height = face.height / 2.0;
    let half_depth = face.depth / 2.0;
    let normal_sign = if face.depth > 0.0 { 1.0 } else { -1.0 };

    let first_vertex = u32::try_from(mesh.positions.len()).unwrap_or(u32::MAX);
    let first_index = mesh.indices.len();

    for iy in 0..=grid_y {
        let py = iy as f32 * segment_height - half_height;
        for ix in 0..=grid_x {
            let px = ix as f32 * segment_width - half_width;

            let mut position = [0.0_f32; 3];
            position[face.u] = px * face.u_dir;
            position[face.v] = py * face.v_dir;
            position[face.w] = half_depth;
            mesh.positions.push(position);

            let mut normal = [0.0_f32; 3];
            normal[face.w] = normal_sign;
            mesh.normals.push(normal);

            mesh.uvs.push([ix as f32 / grid_x as f32, 1.0 - iy as f32 / grid_y as f32]);
        }
    }

    let row = grid_x + 1;
    for iy in 0..grid_y {
        for ix in 0..grid_x {
            let a = first_vertex + ix + row * iy;
            let b = first_vertex + ix + row * (iy + 1);
            let c = first_vertex + (ix + 1) + row * (iy + 1);
            let d = first_vertex + (ix + 1) + row * iy;
            mesh.indices.extend_from_slice(&[a, b, d, b, c, d]);
        }
    }

    mesh.groups.push(MeshGroup {
        start: first_index,
        count: mesh.indices.len() - first_index,
        material_index,
    });
}
