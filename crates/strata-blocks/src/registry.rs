use std::collections::HashMap;
use std::error::Error;
use std::fs;
use std::path::Path;
use std::sync::Arc;

use super::config::{BlockDef, BlocksConfig, TexturesDef};
use super::mesh::MeshTemplate;
use super::types::{AIR, BlockId, Face, FaceRole};

pub const MAX_LIGHT: u8 = 15;

#[derive(Clone, Debug)]
pub struct BlockType {
    pub id: BlockId,
    pub name: String,
    /// Collides with the player and gets meshed.
    pub solid: bool,
    /// Neighbours render the face they share with this block.
    pub transparent: bool,
    pub liquid: bool,
    /// Light absorbed when passing through, `0..=15`.
    pub opacity: u8,
    pub emission: u8,
    /// Has a per-tick behaviour.
    pub active: bool,
    /// Atlas tile per face, indexed by [`Face::index`].
    pub textures: [u16; 6],
    pub mesh: Arc<MeshTemplate>,
}

impl BlockType {
    fn air(mesh: Arc<MeshTemplate>) -> Self {
        BlockType {
            id: AIR,
            name: "air".to_string(),
            solid: false,
            transparent: true,
            liquid: false,
            opacity: 0,
            emission: 0,
            active: false,
            textures: [0; 6],
            mesh,
        }
    }

    /// Whether the block produces geometry at all.
    #[inline]
    pub fn is_meshed(&self) -> bool {
        self.solid || self.liquid
    }

    #[inline]
    pub fn texture(&self, face: Face) -> u16 {
        self.textures[face.index()]
    }
}

#[derive(Default, Clone, Debug)]
pub struct BlockRegistry {
    pub blocks: Vec<BlockType>,
    pub by_name: HashMap<String, BlockId>,
    pub meshes: HashMap<String, Arc<MeshTemplate>>,
}

impl BlockRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn get(&self, id: BlockId) -> Option<&BlockType> {
        self.blocks.get(id as usize)
    }

    pub fn id_by_name(&self, name: &str) -> Option<BlockId> {
        self.by_name.get(name).copied()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    /// Opacity lookup used by lighting; unknown ids are treated as fully opaque.
    #[inline]
    pub fn opacity(&self, id: BlockId) -> u8 {
        self.get(id).map(|t| t.opacity).unwrap_or(MAX_LIGHT)
    }

    #[inline]
    pub fn emission(&self, id: BlockId) -> u8 {
        self.get(id).map(|t| t.emission).unwrap_or(0)
    }

    #[inline]
    pub fn is_solid(&self, id: BlockId) -> bool {
        self.get(id).map(|t| t.solid).unwrap_or(false)
    }

    #[inline]
    pub fn is_active(&self, id: BlockId) -> bool {
        self.get(id).map(|t| t.active).unwrap_or(false)
    }

    pub fn load_from_path(blocks_path: impl AsRef<Path>) -> Result<Self, Box<dyn Error>> {
        let blocks_toml = fs::read_to_string(blocks_path)?;
        Self::from_toml_str(&blocks_toml)
    }

    pub fn from_toml_str(s: &str) -> Result<Self, Box<dyn Error>> {
        let cfg: BlocksConfig = toml::from_str(s)?;
        Self::from_configs(cfg)
    }

    /// Builds a registry; ids must end up contiguous from 0 so that `get` is a plain index.
    pub fn from_configs(cfg: BlocksConfig) -> Result<Self, Box<dyn Error>> {
        let mut meshes: HashMap<String, Arc<MeshTemplate>> = HashMap::new();
        meshes.insert(
            MeshTemplate::CUBE.to_string(),
            Arc::new(MeshTemplate::cube()),
        );
        for def in cfg.meshes {
            let tpl = MeshTemplate::from_def(def)?;
            meshes.insert(tpl.name.clone(), Arc::new(tpl));
        }
        let cube = Arc::clone(&meshes[MeshTemplate::CUBE]);

        let mut slots: Vec<Option<BlockType>> = Vec::new();
        let mut by_name = HashMap::new();
        let mut next_id: u16 = 0;
        for def in cfg.blocks {
            let id = def.id.unwrap_or(next_id);
            next_id = id.saturating_add(1).max(next_id);
            if by_name.insert(def.name.clone(), id).is_some() {
                return Err(format!("duplicate block name '{}'", def.name).into());
            }
            let ty = compile_block(id, def, &meshes)?;
            let idx = id as usize;
            if slots.len() <= idx {
                slots.resize(idx + 1, None);
            }
            if let Some(prev) = &slots[idx] {
                return Err(format!("block id {} used by both '{}' and '{}'", id, prev.name, ty.name).into());
            }
            slots[idx] = Some(ty);
        }

        if slots.is_empty() {
            slots.push(None);
        }
        if slots[0].is_none() {
            by_name.insert("air".to_string(), AIR);
            slots[0] = Some(BlockType::air(cube));
        }

        let mut blocks = Vec::with_capacity(slots.len());
        for (i, slot) in slots.into_iter().enumerate() {
            match slot {
                Some(ty) => blocks.push(ty),
                None => return Err(format!("block ids are not contiguous: {i} is missing").into()),
            }
        }
        Ok(BlockRegistry {
            blocks,
            by_name,
            meshes,
        })
    }
}

fn compile_block(
    id: BlockId,
    def: BlockDef,
    meshes: &HashMap<String, Arc<MeshTemplate>>,
) -> Result<BlockType, Box<dyn Error>> {
    let solid = def.solid.unwrap_or(true);
    let liquid = def.liquid.unwrap_or(false);
    let transparent = def.transparent.unwrap_or(!solid || liquid);
    let opacity = def.opacity.unwrap_or(if transparent { 0 } else { MAX_LIGHT });
    let emission = def.emission.unwrap_or(0);
    if opacity > MAX_LIGHT || emission > MAX_LIGHT {
        return Err(format!(
            "block '{}': opacity and emission must be within 0..={MAX_LIGHT}",
            def.name
        )
        .into());
    }
    let mesh_name = def.mesh.as_deref().unwrap_or(MeshTemplate::CUBE);
    let mesh = meshes
        .get(mesh_name)
        .cloned()
        .ok_or_else(|| format!("block '{}': unknown mesh '{}'", def.name, mesh_name))?;
    Ok(BlockType {
        id,
        name: def.name,
        solid,
        transparent,
        liquid,
        opacity,
        emission,
        active: def.active.unwrap_or(false),
        textures: compile_textures(def.textures.unwrap_or_default()),
        mesh,
    })
}

fn compile_textures(t: TexturesDef) -> [u16; 6] {
    let mut out = [0u16; 6];
    for face in Face::ALL {
        let by_role = match face.role() {
            FaceRole::Top => t.top,
            FaceRole::Bottom => t.bottom,
            FaceRole::Side | FaceRole::All => t.side,
        };
        let specific = match face {
            Face::PosZ => t.front,
            Face::NegZ => t.back,
            Face::NegX => t.left,
            Face::PosX => t.right,
            Face::PosY | Face::NegY => None,
        };
        out[face.index()] = specific.or(by_role).or(t.all).unwrap_or(0);
    }
    out
}
