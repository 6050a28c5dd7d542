//! Summary of the buffers a box with given parameters produces.

#[cfg(test)]
#[path = "inspect_test.rs"]
mod inspect_test;

use serde::Serialize;

use renderview::geometry::{BoxGeometry, BoxParams, MeshBuffers, MeshGroup};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BoxReport {
    pub params: BoxParams,
    pub vertices: usize,
    pub triangles: usize,
    pub groups: Vec<MeshGroup>,
    /// `[min, max]` corners, absent for an empty mesh.
    pub bounds: Option<[[f32; 3]; 2]>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub buffers: Option<MeshBuffers>,
}

impl BoxReport {
    /// Build the geometry and summarize it. With `full`, the raw buffers
    /// are included.
    #[must_use]
    pub fn new(params: BoxParams, full: bool) -> Self {
        let geometry = BoxGeometry::new(params);
        let mesh = geometry.buffers();
        Self {
            params: geometry.params(),
            vertices: mesh.vertex_count(),
            triangles: mesh.triangle_count(),
            groups: mesh.groups.clone(),
            bounds: mesh.bounds().map(|(min, max)| [min.to_array(), max.to_array()]),
            buffers: full.then(|| mesh.clone()),
        }
    }
}
