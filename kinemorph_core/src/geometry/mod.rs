// kinemorph_core/src/geometry/mod.rs

//! Stateless vector, matrix and quaternion primitives.
//!
//! Matrices use the column-vector convention: a matrix `M` acts on a vector as
//! `M * v`, and chaining a child rotation under a parent is `parent * child`.

use crate::types::{Mat4, Vec3};
use nalgebra::Vector4;

pub mod camera;
pub mod quaternion;
pub mod transform;

pub use camera::CameraConfig;
pub use quaternion::{quaternion_from_rotation, rotation_from_quaternion, slerp};
pub use transform::{compose_matrix, decompose_matrix, Trs};

/// Below this cross-product length two unit directions are treated as parallel.
const PARALLEL_EPSILON: f64 = 1e-9;

/// Unit vector in the direction of `v`. The zero vector normalizes to zero.
pub fn normalize(v: &Vec3) -> Vec3 {
    let len = v.norm();
    if len == 0.0 {
        return Vec3::zeros();
    }
    v / len
}

/// A rotation-only 4x4 matrix whose columns are `x_axis`, `y_axis`, `z_axis`.
pub fn make_basis(x_axis: &Vec3, y_axis: &Vec3, z_axis: &Vec3) -> Mat4 {
    Mat4::new(
        x_axis.x, y_axis.x, z_axis.x, 0.0,
        x_axis.y, y_axis.y, z_axis.y, 0.0,
        x_axis.z, y_axis.z, z_axis.z, 0.0,
        0.0, 0.0, 0.0, 1.0,
    )
}

/// Transforms the point `v` by `m` in homogeneous coordinates, dividing by the
/// resulting `w`. A zero `w` leaves the result undivided.
pub fn apply_matrix(m: &Mat4, v: &Vec3) -> Vec3 {
    let h = m * Vector4::new(v.x, v.y, v.z, 1.0);
    if h.w == 0.0 {
        return h.xyz();
    }
    h.xyz() / h.w
}

/// The rotation matrix that turns direction `a` onto direction `b`.
///
/// Works in the orthonormal basis `u = â`, `v = normalize(b̂ - (â·b̂)â)`,
/// `w = normalize(b̂ × â)`, where the rotation is planar with cosine `â·b̂` and
/// sine `|â × b̂|`, and conjugates that planar rotation back into world axes.
///
/// Degenerate inputs never produce NaN:
/// * a zero-length `a` or `b` yields the identity;
/// * parallel directions yield the identity;
/// * anti-parallel directions yield a half turn about an axis orthogonal to `a`.
pub fn align_rotation(a: &Vec3, b: &Vec3) -> Mat4 {
    let a = normalize(a);
    let b = normalize(b);
    if a == Vec3::zeros() || b == Vec3::zeros() {
        return Mat4::identity();
    }

    let dot = a.dot(&b);
    let cross_len = a.cross(&b).norm();

    if cross_len < PARALLEL_EPSILON {
        if dot > 0.0 {
            return Mat4::identity();
        }
        return half_turn(&orthogonal_axis(&a));
    }

    let u = a;
    let v = normalize(&(b - a * dot));
    let w = normalize(&b.cross(&a));
    let basis = make_basis(&u, &v, &w);

    #[rustfmt::skip]
    let planar = Mat4::new(
        dot,       -cross_len, 0.0, 0.0,
        cross_len,  dot,       0.0, 0.0,
        0.0,        0.0,       1.0, 0.0,
        0.0,        0.0,       0.0, 1.0,
    );

    basis * planar * basis.transpose()
}

/// Some unit vector orthogonal to the unit vector `a`.
fn orthogonal_axis(a: &Vec3) -> Vec3 {
    // Cross with the world axis `a` is least aligned with.
    let abs = a.abs();
    let reference = if abs.x <= abs.y && abs.x <= abs.z {
        Vec3::x()
    } else if abs.y <= abs.z {
        Vec3::y()
    } else {
        Vec3::z()
    };
    normalize(&a.cross(&reference))
}

/// Rotation by π about the unit `axis`: `2·n·nᵀ − I`.
fn half_turn(axis: &Vec3) -> Mat4 {
    let r = axis * axis.transpose() * 2.0 - nalgebra::Matrix3::identity();
    r.to_homogeneous()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn rotate(m: &Mat4, v: &Vec3) -> Vec3 {
        (m * v.to_homogeneous()).xyz()
    }

    #[test]
    fn normalize_zero_is_zero() {
        assert_eq!(normalize(&Vec3::zeros()), Vec3::zeros());
        assert_abs_diff_eq!(normalize(&Vec3::new(3.0, 0.0, 4.0)).norm(), 1.0, epsilon = 1e-15);
    }

    #[test]
    fn align_rotation_matches_reference_matrix() {
        let r = align_rotation(&Vec3::new(23.0, 37.0, 43.0), &Vec3::new(34.0, 87.0, 12.0));
        #[rustfmt::skip]
        let expected = Mat4::new(
             0.96695466, -0.19485893, 0.16440403, 0.0,
             0.06291538,  0.80728901, 0.58679307, 0.0,
            -0.24706344, -0.55705875, 0.79287149, 0.0,
             0.0,         0.0,        0.0,        1.0,
        );
        assert_abs_diff_eq!(r, expected, epsilon = 1e-6);
    }

    #[test]
    fn align_rotation_maps_a_onto_b() {
        let cases = [
            (Vec3::new(1.0, 0.0, 0.0), Vec3::new(0.0, 1.0, 0.0)),
            (Vec3::new(0.3, -2.0, 5.0), Vec3::new(-4.0, 1.5, 0.2)),
            (Vec3::new(-1.0, -1.0, -1.0), Vec3::new(0.0, 0.0, 7.0)),
        ];
        for (a, b) in cases {
            let r = align_rotation(&a, &b);
            assert_abs_diff_eq!(rotate(&r, &normalize(&a)), normalize(&b), epsilon = 1e-12);
            assert_abs_diff_eq!(r.fixed_view::<3, 3>(0, 0).determinant(), 1.0, epsilon = 1e-12);
        }
    }

    #[test]
    fn align_rotation_parallel_is_identity() {
        let a = Vec3::new(1.0, 2.0, 3.0);
        assert_eq!(align_rotation(&a, &(a * 4.0)), Mat4::identity());
        assert_eq!(align_rotation(&a, &Vec3::zeros()), Mat4::identity());
    }

    #[test]
    fn align_rotation_anti_parallel_is_half_turn() {
        let a = Vec3::new(0.0, 2.0, 1.0);
        let r = align_rotation(&a, &(-a));
        assert_abs_diff_eq!(rotate(&r, &normalize(&a)), -normalize(&a), epsilon = 1e-12);
        assert_abs_diff_eq!(r.fixed_view::<3, 3>(0, 0).determinant(), 1.0, epsilon = 1e-12);
    }

    #[test]
    fn apply_matrix_divides_by_w() {
        #[rustfmt::skip]
        let m = Mat4::new(
            4.0,  5.0,  6.0,  7.0,
            8.0,  9.0,  10.0, 11.0,
            12.0, 13.0, 14.0, 15.0,
            16.0, 17.0, 18.0, 19.0,
        );
        let result = apply_matrix(&m, &Vec3::new(1.0, 2.0, 3.0));
        let expected = Vec3::new(0.3170731707317074, 0.5447154471544716, 0.7723577235772359);
        assert_abs_diff_eq!(result, expected, epsilon = 1e-12);
    }

    #[test]
    fn make_basis_places_axes_in_columns() {
        let m = make_basis(
            &Vec3::new(1.0, 2.0, 3.0),
            &Vec3::new(4.0, 5.0, 6.0),
            &Vec3::new(7.0, 8.0, 9.0),
        );
        assert_eq!(m.column(1).xyz(), Vec3::new(4.0, 5.0, 6.0));
        assert_eq!(m[(3, 3)], 1.0);
    }
}
