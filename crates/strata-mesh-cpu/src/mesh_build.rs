use strata_geom::Vec3;
use strata_world::ChunkCoord;

/// Which index buffer a triangle goes to.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum RenderPass {
    Opaque,
    Transparent,
    Liquid,
}

/// Render buffers for one chunk. Positions are chunk-local; all three index
/// lists point into the same vertex arrays.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ChunkMesh {
    pub coord: ChunkCoord,
    pub positions: Vec<f32>,
    pub normals: Vec<f32>,
    pub uvs: Vec<f32>,
    /// RGBA per vertex. Only alpha is used: the light level in front of the face, `light / 16`.
    pub colors: Vec<f32>,
    pub opaque: Vec<u32>,
    pub transparent: Vec<u32>,
    pub liquid: Vec<u32>,
}

impl ChunkMesh {
    pub fn new(coord: ChunkCoord) -> Self {
        Self {
            coord,
            ..Self::default()
        }
    }

    /// Pre-reserve room for about `n_quads` cube faces.
    #[inline]
    pub fn reserve_quads(&mut self, n_quads: usize) {
        self.positions.reserve(n_quads * 4 * 3);
        self.normals.reserve(n_quads * 4 * 3);
        self.uvs.reserve(n_quads * 4 * 2);
        self.colors.reserve(n_quads * 4 * 4);
        self.opaque.reserve(n_quads * 6);
    }

    #[inline]
    pub fn vertex_count(&self) -> usize {
        self.positions.len() / 3
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    #[inline]
    pub fn indices(&self, pass: RenderPass) -> &[u32] {
        match pass {
            RenderPass::Opaque => &self.opaque,
            RenderPass::Transparent => &self.transparent,
            RenderPass::Liquid => &self.liquid,
        }
    }

    #[inline]
    pub fn triangle_count(&self, pass: RenderPass) -> usize {
        self.indices(pass).len() / 3
    }

    pub fn push_vertex(&mut self, pos: Vec3, normal: Vec3, uv: [f32; 2], light: f32) {
        self.positions.extend_from_slice(&pos.to_array());
        self.normals.extend_from_slice(&normal.to_array());
        self.uvs.extend_from_slice(&uv);
        self.colors.extend_from_slice(&[0.0, 0.0, 0.0, light]);
    }

    /// Appends template triangles offset by `base`, the index of the face's first vertex.
    pub fn push_tris(&mut self, pass: RenderPass, base: u32, tris: &[u32]) {
        let out = match pass {
            RenderPass::Opaque => &mut self.opaque,
            RenderPass::Transparent => &mut self.transparent,
            RenderPass::Liquid => &mut self.liquid,
        };
        out.extend(tris.iter().map(|t| base + t));
    }
}
