// kinemorph_core/src/geometry/transform.rs

use crate::geometry::quaternion::quaternion_from_rotation;
use crate::types::{Mat4, Quat, Vec3};
use nalgebra::Vector3;
use serde::{Deserialize, Serialize};

/// A translation / rotation / scale triple.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Trs {
    pub translation: Vec3,
    pub rotation: Quat,
    pub scale: Vec3,
}

impl Default for Trs {
    fn default() -> Self {
        Self {
            translation: Vec3::zeros(),
            rotation: Quat::identity(),
            scale: Vec3::repeat(1.0),
        }
    }
}

/// Builds `T * R * S` as a single 4x4 matrix.
pub fn compose_matrix(translation: &Vec3, rotation: &Quat, scale: &Vec3) -> Mat4 {
    let (w, x, y, z) = (rotation.w, rotation.i, rotation.j, rotation.k);
    let (x2, y2, z2) = (x + x, y + y, z + z);
    let (xx, xy, xz) = (x * x2, x * y2, x * z2);
    let (yy, yz, zz) = (y * y2, y * z2, z * z2);
    let (wx, wy, wz) = (w * x2, w * y2, w * z2);
    let (sx, sy, sz) = (scale.x, scale.y, scale.z);

    #[rustfmt::skip]
    let m = Mat4::new(
        (1.0 - (yy + zz)) * sx, (xy - wz) * sy,         (xz + wy) * sz,         translation.x,
        (xy + wz) * sx,         (1.0 - (xx + zz)) * sy, (yz - wx) * sz,         translation.y,
        (xz - wy) * sx,         (yz + wx) * sy,         (1.0 - (xx + yy)) * sz, translation.z,
        0.0,                    0.0,                    0.0,                    1.0,
    );
    m
}

/// Splits an affine matrix into translation, rotation and scale.
///
/// Scale magnitudes are the column lengths. A negative determinant means the
/// matrix mirrors, which is attributed to the x axis.
pub fn decompose_matrix(m: &Mat4) -> Trs {
    let mut sx = m.fixed_view::<3, 1>(0, 0).norm();
    let sy = m.fixed_view::<3, 1>(0, 1).norm();
    let sz = m.fixed_view::<3, 1>(0, 2).norm();

    if m.determinant() < 0.0 {
        sx = -sx;
    }

    let translation = Vector3::new(m[(0, 3)], m[(1, 3)], m[(2, 3)]);
    let scale = Vector3::new(sx, sy, sz);

    let mut rotation = Mat4::identity();
    for col in 0..3 {
        let s = scale[col];
        for row in 0..3 {
            rotation[(row, col)] = if s == 0.0 { 0.0 } else { m[(row, col)] / s };
        }
    }

    Trs {
        translation,
        rotation: quaternion_from_rotation(&rotation),
        scale,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::quaternion::normalize_quaternion;
    use approx::assert_abs_diff_eq;
    use nalgebra::Quaternion;

    #[test]
    fn compose_reference_matrix() {
        let pos = Vec3::new(0.0, 103.99147034, 2.07609391);
        let q = Quaternion::new(0.99561772, 0.09101666, 0.00978048, -0.01912292);
        let m = compose_matrix(&pos, &q, &Vec3::repeat(1.0));
        #[rustfmt::skip]
        let expected = Mat4::new(
             0.9990773122642652,   0.03985860925165068, 0.01599422977498581, 0.0,
            -0.036297862774000135, 0.9827005627154562, -0.18160966163283088, 103.99147034,
            -0.022956247011468537, 0.1808615362846678,  0.983240619286812,   2.07609391,
             0.0,                  0.0,                 0.0,                 1.0,
        );
        assert_abs_diff_eq!(m, expected, epsilon = 1e-8);
    }

    #[test]
    fn compose_decompose_round_trip() {
        let translation = Vec3::new(1.5, -2.0, 0.25);
        let rotation = normalize_quaternion(&Quaternion::new(0.8, -0.2, 0.4, 0.3));
        let scale = Vec3::repeat(2.5);
        let m = compose_matrix(&translation, &rotation, &scale);

        let trs = decompose_matrix(&m);
        assert_abs_diff_eq!(trs.translation, translation, epsilon = 1e-12);
        assert_abs_diff_eq!(trs.scale, scale, epsilon = 1e-12);
        let rebuilt = compose_matrix(&trs.translation, &trs.rotation, &trs.scale);
        assert_abs_diff_eq!(rebuilt, m, epsilon = 1e-12);
    }

    #[test]
    fn mirrored_matrix_gets_negative_x_scale() {
        let m = compose_matrix(&Vec3::zeros(), &Quat::identity(), &Vec3::new(-1.0, 1.0, 1.0));
        let trs = decompose_matrix(&m);
        assert_abs_diff_eq!(trs.scale, Vec3::new(-1.0, 1.0, 1.0), epsilon = 1e-12);
        assert_abs_diff_eq!(trs.rotation.coords, Quat::identity().coords, epsilon = 1e-12);
    }
}
