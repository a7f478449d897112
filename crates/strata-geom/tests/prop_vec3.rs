use strata_geom::{VOXEL_PIVOT, Vec3};
use proptest::prelude::*;

fn approx(a: f32, b: f32, eps: f32) -> bool {
    (a - b).abs() <= eps
}

fn dist(a: Vec3, b: Vec3) -> f32 {
    let d = a - b;
    (d.x * d.x + d.y * d.y + d.z * d.z).sqrt()
}

fn vapprox(a: Vec3, b: Vec3, eps: f32) -> bool {
    approx(a.x, b.x, eps) && approx(a.y, b.y, eps) && approx(a.z, b.z, eps)
}

fn unit_coord() -> impl Strategy<Value = f32> {
    -4.0f32..=4.0
}

fn arb_vec3() -> impl Strategy<Value = Vec3> {
    (unit_coord(), unit_coord(), unit_coord()).prop_map(|(x, y, z)| Vec3::new(x, y, z))
}

proptest! {
    // Four quarter turns are the identity
    #[test]
    fn four_turns_identity(v in arb_vec3()) {
        let mut r = v;
        for _ in 0..4 {
            r = r.rotate_yaw(1);
        }
        prop_assert!(vapprox(r, v, 1e-6));
    }

    // Composing k and j turns matches a single (k+j) turn
    #[test]
    fn turns_compose(v in arb_vec3(), k in 0u8..4, j in 0u8..4) {
        let a = v.rotate_yaw(k).rotate_yaw(j);
        let b = v.rotate_yaw(k + j);
        prop_assert!(vapprox(a, b, 1e-6));
    }

    // Rotation about the voxel pivot keeps the distance to the pivot and the height
    #[test]
    fn pivot_rotation_preserves_distance(v in arb_vec3(), k in 0u8..4) {
        let r = v.rotate_yaw_about(VOXEL_PIVOT, k);
        prop_assert!(approx(dist(r, VOXEL_PIVOT), dist(v, VOXEL_PIVOT), 1e-4));
        prop_assert!(approx(r.y, v.y, 1e-6));
    }
}

#[test]
fn quarter_turn_maps_forward_to_right() {
    let fwd = Vec3::new(0.0, 0.0, 1.0);
    assert_eq!(fwd.rotate_yaw(1), Vec3::new(1.0, 0.0, 0.0));
    assert_eq!(fwd.rotate_yaw(2), Vec3::new(0.0, 0.0, -1.0));
    assert_eq!(fwd.rotate_yaw(3), Vec3::new(-1.0, 0.0, 0.0));
}

#[test]
fn unit_cube_corners_stay_in_cube() {
    for &c in &[
        Vec3::new(0.0, 0.0, 0.0),
        Vec3::new(1.0, 0.0, 0.0),
        Vec3::new(1.0, 1.0, 1.0),
        Vec3::new(0.0, 1.0, 1.0),
    ] {
        for k in 0..4 {
            let r = c.rotate_yaw_about(VOXEL_PIVOT, k);
            for v in r.to_array() {
                assert!(v == 0.0 || v == 1.0, "corner {c:?} turn {k} -> {r:?}");
            }
        }
    }
}

#[test]
fn floor_cell_handles_negatives() {
    assert_eq!(Vec3::new(-0.5, 3.2, 15.99).floor_cell(), (-1, 3, 15));
}
