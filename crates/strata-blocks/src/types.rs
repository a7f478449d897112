use serde::{Deserialize, Serialize};
use strata_geom::Vec3;

pub type BlockId = u16;

/// Id 0 is always empty space.
pub const AIR: BlockId = 0;

/// Used by face texture selection.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum FaceRole {
    All,
    Top,
    Bottom,
    Side,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum Face {
    PosY = 0,
    NegY = 1,
    PosX = 2,
    NegX = 3,
    PosZ = 4,
    NegZ = 5,
}

impl Face {
    pub const ALL: [Face; 6] = [
        Face::PosY,
        Face::NegY,
        Face::PosX,
        Face::NegX,
        Face::PosZ,
        Face::NegZ,
    ];

    /// Returns the `[0..6)` index of this face.
    #[inline]
    pub fn index(self) -> usize {
        self as usize
    }

    /// Parses the names used in config files. Accepts both axis and compass names.
    pub fn from_name(s: &str) -> Option<Face> {
        match s {
            "top" | "up" | "+y" => Some(Face::PosY),
            "bottom" | "down" | "-y" => Some(Face::NegY),
            "right" | "east" | "+x" => Some(Face::PosX),
            "left" | "west" | "-x" => Some(Face::NegX),
            "front" | "north" | "+z" => Some(Face::PosZ),
            "back" | "south" | "-z" => Some(Face::NegZ),
            _ => None,
        }
    }

    /// Returns the integer grid delta `(dx,dy,dz)` when stepping out of this face.
    #[inline]
    pub fn delta(self) -> (i32, i32, i32) {
        match self {
            Face::PosY => (0, 1, 0),
            Face::NegY => (0, -1, 0),
            Face::PosX => (1, 0, 0),
            Face::NegX => (-1, 0, 0),
            Face::PosZ => (0, 0, 1),
            Face::NegZ => (0, 0, -1),
        }
    }

    #[inline]
    pub fn normal(self) -> Vec3 {
        let (x, y, z) = self.delta();
        Vec3::new(x as f32, y as f32, z as f32)
    }

    #[inline]
    pub fn opposite(self) -> Face {
        match self {
            Face::PosY => Face::NegY,
            Face::NegY => Face::PosY,
            Face::PosX => Face::NegX,
            Face::NegX => Face::PosX,
            Face::PosZ => Face::NegZ,
            Face::NegZ => Face::PosZ,
        }
    }

    /// The face this one points to after a yaw of `quarter_turns`, matching `Vec3::rotate_yaw`.
    #[inline]
    pub fn rotated(self, quarter_turns: u8) -> Face {
        let mut f = self;
        for _ in 0..(quarter_turns & 3) {
            f = match f {
                Face::PosZ => Face::PosX,
                Face::PosX => Face::NegZ,
                Face::NegZ => Face::NegX,
                Face::NegX => Face::PosZ,
                vertical => vertical,
            };
        }
        f
    }

    /// Classifies the face into top/bottom/side role for texture lookup.
    #[inline]
    pub fn role(self) -> FaceRole {
        match self {
            Face::PosY => FaceRole::Top,
            Face::NegY => FaceRole::Bottom,
            _ => FaceRole::Side,
        }
    }
}

/// Discrete facing stored per voxel.
///
/// The byte encoding is the on-disk value: south 0, north 1, up 2, down 3, west 4, east 5.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Orientation {
    South,
    #[default]
    North,
    Up,
    Down,
    West,
    East,
}

impl Orientation {
    #[inline]
    pub fn to_u8(self) -> u8 {
        match self {
            Orientation::South => 0,
            Orientation::North => 1,
            Orientation::Up => 2,
            Orientation::Down => 3,
            Orientation::West => 4,
            Orientation::East => 5,
        }
    }

    #[inline]
    pub fn from_u8(v: u8) -> Option<Orientation> {
        match v {
            0 => Some(Orientation::South),
            1 => Some(Orientation::North),
            2 => Some(Orientation::Up),
            3 => Some(Orientation::Down),
            4 => Some(Orientation::West),
            5 => Some(Orientation::East),
            _ => None,
        }
    }

    /// Yaw applied to the block's mesh template. Up and down do not rotate.
    #[inline]
    pub fn yaw_quarter_turns(self) -> u8 {
        match self {
            Orientation::North | Orientation::Up | Orientation::Down => 0,
            Orientation::West => 1,
            Orientation::South => 2,
            Orientation::East => 3,
        }
    }
}
