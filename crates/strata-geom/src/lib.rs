//! Minimal geometry types shared by the block, mesh, and runtime crates.
#![forbid(unsafe_code)]

use core::ops::{Add, AddAssign, Mul, Sub};

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Vec3 {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

/// Center of a unit voxel; templates rotate about this point.
pub const VOXEL_PIVOT: Vec3 = Vec3::new(0.5, 0.5, 0.5);

impl Vec3 {

    #[inline]
    pub const fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    #[inline]
    pub fn from_array(a: [f32; 3]) -> Self {
        Self::new(a[0], a[1], a[2])
    }

    #[inline]
    pub fn to_array(self) -> [f32; 3] {
        [self.x, self.y, self.z]
    }

    /// Rotates about the +Y axis by `quarter_turns * 90` degrees.
    ///
    /// Positive turns are clockwise seen from above: +Z goes to +X, then -Z, then -X.
    /// Quarter turns are exact, so integral inputs stay integral.
    #[inline]
    pub fn rotate_yaw(self, quarter_turns: u8) -> Vec3 {
        match quarter_turns & 3 {
            0 => self,
            1 => Vec3::new(self.z, self.y, -self.x),
            2 => Vec3::new(-self.x, self.y, -self.z),
            _ => Vec3::new(-self.z, self.y, self.x),
        }
    }

    /// Same as [`rotate_yaw`](Self::rotate_yaw) but about an arbitrary pivot.
    #[inline]
    pub fn rotate_yaw_about(self, pivot: Vec3, quarter_turns: u8) -> Vec3 {
        (self - pivot).rotate_yaw(quarter_turns) + pivot
    }

    /// Integer cell containing this point.
    #[inline]
    pub fn floor_cell(self) -> (i32, i32, i32) {
        (
            self.x.floor() as i32,
            self.y.floor() as i32,
            self.z.floor() as i32,
        )
    }
}

impl Add for Vec3 {
    type Output = Vec3;
    #[inline]
    fn add(self, rhs: Vec3) -> Vec3 {
        Vec3::new(self.x + rhs.x, self.y + rhs.y, self.z + rhs.z)
    }
}

impl AddAssign for Vec3 {
    #[inline]
    fn add_assign(&mut self, rhs: Vec3) {
        self.x += rhs.x;
        self.y += rhs.y;
        self.z += rhs.z;
    }
}

impl Sub for Vec3 {
    type Output = Vec3;
    #[inline]
    fn sub(self, rhs: Vec3) -> Vec3 {
        Vec3::new(self.x - rhs.x, self.y - rhs.y, self.z - rhs.z)
    }
}

impl Mul<f32> for Vec3 {
    type Output = Vec3;
    #[inline]
    fn mul(self, rhs: f32) -> Vec3 {
        Vec3::new(self.x * rhs, self.y * rhs, self.z * rhs)
    }
}
