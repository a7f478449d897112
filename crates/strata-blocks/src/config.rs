use serde::Deserialize;

// Top-level blocks config file
#[derive(Deserialize, Debug, Default)]
pub struct BlocksConfig {
    #[serde(default)]
    pub blocks: Vec<BlockDef>,
    // Extra mesh templates; "cube" is always available.
    #[serde(default)]
    pub meshes: Vec<MeshDef>,
}

#[derive(Deserialize, Debug, Clone, Default)]
pub struct BlockDef {
    pub name: String,
    #[serde(default)]
    pub id: Option<u16>,
    #[serde(default)]
    pub solid: Option<bool>,
    // "Renders neighbour faces": neighbours draw the face they share with this block.
    #[serde(default)]
    pub transparent: Option<bool>,
    #[serde(default)]
    pub liquid: Option<bool>,
    #[serde(default)]
    pub opacity: Option<u8>,
    #[serde(default)]
    pub emission: Option<u8>,
    #[serde(default)]
    pub active: Option<bool>,
    #[serde(default)]
    pub textures: Option<TexturesDef>,
    #[serde(default)]
    pub mesh: Option<String>,
}

// Atlas tile ids by face; specific faces override roles, roles override `all`.
#[derive(Deserialize, Debug, Clone, Default)]
pub struct TexturesDef {
    #[serde(default)]
    pub all: Option<u16>,
    #[serde(default)]
    pub top: Option<u16>,
    #[serde(default)]
    pub bottom: Option<u16>,
    #[serde(default)]
    pub side: Option<u16>,
    #[serde(default)]
    pub front: Option<u16>,
    #[serde(default)]
    pub back: Option<u16>,
    #[serde(default)]
    pub left: Option<u16>,
    #[serde(default)]
    pub right: Option<u16>,
}

#[derive(Deserialize, Debug, Clone)]
pub struct MeshDef {
    pub name: String,
    #[serde(default)]
    pub faces: Vec<FaceDef>,
}

#[derive(Deserialize, Debug, Clone)]
pub struct FaceDef {
    // "top", "bottom", "left", "right", "front", "back"
    pub face: String,
    pub verts: Vec<VertDef>,
    pub tris: Vec<u32>,
}

#[derive(Deserialize, Debug, Clone, Copy)]
pub struct VertDef {
    pub pos: [f32; 3],
    pub uv: [f32; 2],
}
