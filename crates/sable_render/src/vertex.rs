// vertex.rs - Interleaved sprite vertex shared by every backend

/// One corner of a sprite quad.
///
/// `texture_index` selects the texture slot of the batch the quad belongs
/// to. It is a float so the whole vertex is a single attribute block.
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Default, bytemuck::Pod, bytemuck::Zeroable)]
pub struct SpriteVertex {
    pub position: [f32; 3],
    pub uv: [f32; 2],
    pub color: [f32; 4],
    pub texture_index: f32,
}

impl SpriteVertex {
    pub const ATTRIBUTES: [wgpu::VertexAttribute; 4] =
        wgpu::vertex_attr_array![0 => Float32x3, 1 => Float32x2, 2 => Float32x4, 3 => Float32];

    pub fn layout() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<SpriteVertex>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &Self::ATTRIBUTES,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn vertex_is_tightly_packed() {
        assert_eq!(std::mem::size_of::<SpriteVertex>(), 40);
        let layout = SpriteVertex::layout();
        assert_eq!(layout.array_stride, 40);
        assert_eq!(layout.attributes[3].offset, 36);
    }
}
