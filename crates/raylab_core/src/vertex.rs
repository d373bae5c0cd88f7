use bytemuck::{Pod, Zeroable};
use raylab_math::Vec3;

/// A mesh vertex with the material attributes the tracer shades with.
///
/// Colors are linear RGB. The layout is plain `f32`s so loaders can fill
/// buffers with `bytemuck::cast_slice`.
#[repr(C)]
#[derive(Copy, Clone, Debug, Default, PartialEq, Pod, Zeroable)]
pub struct Vertex {
    pub position: Vec3,
    pub normal: Vec3,
    pub diffuse: Vec3,
    pub emissive: Vec3,
}

impl Vertex {
    /// Grey, non-emissive vertex.
    pub fn new(position: Vec3, normal: Vec3) -> Self {
        Self {
            position,
            normal,
            diffuse: Vec3::splat(0.5),
            emissive: Vec3::ZERO,
        }
    }

    pub fn with_diffuse(mut self, diffuse: Vec3) -> Self {
        self.diffuse = diffuse;
        self
    }

    pub fn with_emissive(mut self, emissive: Vec3) -> Self {
        self.emissive = emissive;
        self
    }
}
