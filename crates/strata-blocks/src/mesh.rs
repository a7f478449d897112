use strata_geom::Vec3;

use crate::config::MeshDef;
use crate::types::Face;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct VertData {
    /// Position relative to the voxel origin, in the block's unrotated frame.
    pub pos: Vec3,
    /// Tile-relative uv in `[0,1]`.
    pub uv: [f32; 2],
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct FaceTemplate {
    pub verts: Vec<VertData>,
    /// Indices into `verts`.
    pub tris: Vec<u32>,
}

impl FaceTemplate {
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.verts.is_empty() || self.tris.is_empty()
    }
}

/// Per-face geometry for one block shape, indexed by [`Face::index`].
#[derive(Clone, Debug, PartialEq)]
pub struct MeshTemplate {
    pub name: String,
    pub faces: [FaceTemplate; 6],
}

// Unit cube corners.
const CUBE_VERTS: [[f32; 3]; 8] = [
    [0.0, 0.0, 0.0],
    [1.0, 0.0, 0.0],
    [1.0, 1.0, 0.0],
    [0.0, 1.0, 0.0],
    [0.0, 0.0, 1.0],
    [1.0, 0.0, 1.0],
    [1.0, 1.0, 1.0],
    [0.0, 1.0, 1.0],
];

// Corner indices per face, ordered to pair with CUBE_UVS.
const CUBE_FACE_CORNERS: [(Face, [usize; 4]); 6] = [
    (Face::PosY, [3, 7, 2, 6]),
    (Face::NegY, [1, 5, 0, 4]),
    (Face::PosX, [1, 2, 5, 6]),
    (Face::NegX, [4, 7, 0, 3]),
    (Face::PosZ, [5, 6, 4, 7]),
    (Face::NegZ, [0, 3, 1, 2]),
];

const CUBE_UVS: [[f32; 2]; 4] = [[0.0, 0.0], [0.0, 1.0], [1.0, 0.0], [1.0, 1.0]];
const QUAD_TRIS: [u32; 6] = [0, 1, 2, 2, 1, 3];

impl MeshTemplate {
    pub const CUBE: &'static str = "cube";

    pub fn cube() -> Self {
        let mut faces: [FaceTemplate; 6] = Default::default();
        for (face, corners) in CUBE_FACE_CORNERS {
            let verts = corners
                .iter()
                .zip(CUBE_UVS)
                .map(|(&c, uv)| VertData {
                    pos: Vec3::from_array(CUBE_VERTS[c]),
                    uv,
                })
                .collect();
            faces[face.index()] = FaceTemplate {
                verts,
                tris: QUAD_TRIS.to_vec(),
            };
        }
        MeshTemplate {
            name: Self::CUBE.to_string(),
            faces,
        }
    }

    #[inline]
    pub fn face(&self, face: Face) -> &FaceTemplate {
        &self.faces[face.index()]
    }

    pub fn from_def(def: MeshDef) -> Result<Self, String> {
        let mut faces: [FaceTemplate; 6] = Default::default();
        for fd in def.faces {
            let face = Face::from_name(&fd.face)
                .ok_or_else(|| format!("mesh '{}': unknown face '{}'", def.name, fd.face))?;
            if fd.tris.len() % 3 != 0 {
                return Err(format!(
                    "mesh '{}' face '{}': triangle list length {} is not a multiple of 3",
                    def.name,
                    fd.face,
                    fd.tris.len()
                ));
            }
            if let Some(bad) = fd.tris.iter().find(|&&i| i as usize >= fd.verts.len()) {
                return Err(format!(
                    "mesh '{}' face '{}': index {} out of range for {} vertices",
                    def.name,
                    fd.face,
                    bad,
                    fd.verts.len()
                ));
            }
            faces[face.index()] = FaceTemplate {
                verts: fd
                    .verts
                    .iter()
                    .map(|v| VertData {
                        pos: Vec3::from_array(v.pos),
                        uv: v.uv,
                    })
                    .collect(),
                tris: fd.tris,
            };
        }
        Ok(MeshTemplate {
            name: def.name,
            faces,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cube_faces_lie_on_their_planes() {
        let cube = MeshTemplate::cube();
        for face in Face::ALL {
            let ft = cube.face(face);
            assert_eq!(ft.verts.len(), 4);
            assert_eq!(ft.tris.len(), 6);
            let n = face.normal();
            // Every vertex of a +axis face sits at 1 on that axis, -axis faces at 0.
            let expect = if n.x + n.y + n.z > 0.0 { 1.0 } else { 0.0 };
            for v in &ft.verts {
                let along = v.pos.x * n.x.abs() + v.pos.y * n.y.abs() + v.pos.z * n.z.abs();
                assert_eq!(along, expect, "{face:?} {v:?}");
            }
        }
    }
}
