// kinemorph_core/src/geometry/quaternion.rs

use crate::geometry::transform::compose_matrix;
use crate::types::{Mat4, Quat, Vec3};
use nalgebra::Quaternion;

/// Converts the rotation part (upper-left 3x3) of `m` into a quaternion.
///
/// Branches on the trace; when the trace is not positive the largest diagonal
/// term is used as the pivot so the divisor never approaches zero.
pub fn quaternion_from_rotation(m: &Mat4) -> Quat {
    let (m11, m12, m13) = (m[(0, 0)], m[(0, 1)], m[(0, 2)]);
    let (m21, m22, m23) = (m[(1, 0)], m[(1, 1)], m[(1, 2)]);
    let (m31, m32, m33) = (m[(2, 0)], m[(2, 1)], m[(2, 2)]);

    let trace = m11 + m22 + m33;

    if trace > 0.0 {
        let s = 0.5 / (trace + 1.0).sqrt();
        Quaternion::new(0.25 / s, (m32 - m23) * s, (m13 - m31) * s, (m21 - m12) * s)
    } else if m11 > m22 && m11 > m33 {
        let s = 2.0 * (1.0 + m11 - m22 - m33).sqrt();
        Quaternion::new((m32 - m23) / s, 0.25 * s, (m12 + m21) / s, (m13 + m31) / s)
    } else if m22 > m33 {
        let s = 2.0 * (1.0 + m22 - m11 - m33).sqrt();
        Quaternion::new((m13 - m31) / s, (m12 + m21) / s, 0.25 * s, (m23 + m32) / s)
    } else {
        let s = 2.0 * (1.0 + m33 - m11 - m22).sqrt();
        Quaternion::new((m21 - m12) / s, (m13 + m31) / s, (m23 + m32) / s, 0.25 * s)
    }
}

/// The pure rotation matrix of `q`.
pub fn rotation_from_quaternion(q: &Quat) -> Mat4 {
    compose_matrix(&Vec3::zeros(), q, &Vec3::repeat(1.0))
}

/// Spherical interpolation from `qa` (t = 0) to `qb` (t = 1) along the shorter arc.
///
/// The end points are returned unchanged. When the two orientations are so
/// close that `sin²(θ/2)` is below machine epsilon the result is a normalized
/// linear blend instead.
pub fn slerp(qa: &Quat, qb: &Quat, t: f64) -> Quat {
    if t == 0.0 {
        return *qa;
    }
    if t == 1.0 {
        return *qb;
    }

    let mut qb = *qb;
    let mut cos_half_theta = qa.coords.dot(&qb.coords);

    // q and -q are the same orientation; take the short way round.
    if cos_half_theta < 0.0 {
        qb = -qb;
        cos_half_theta = -cos_half_theta;
    }

    if cos_half_theta >= 1.0 {
        return *qa;
    }

    let sqr_sin_half_theta = 1.0 - cos_half_theta * cos_half_theta;
    if sqr_sin_half_theta <= f64::EPSILON {
        let blended = qa * (1.0 - t) + qb * t;
        return normalize_quaternion(&blended);
    }

    let sin_half_theta = sqr_sin_half_theta.sqrt();
    let half_theta = sin_half_theta.atan2(cos_half_theta);
    let ratio_a = ((1.0 - t) * half_theta).sin() / sin_half_theta;
    let ratio_b = (t * half_theta).sin() / sin_half_theta;

    qa * ratio_a + qb * ratio_b
}

/// Unit quaternion in the direction of `q`; the zero quaternion stays zero.
pub fn normalize_quaternion(q: &Quat) -> Quat {
    let n = q.coords.norm();
    if n == 0.0 {
        return *q;
    }
    Quaternion::from(q.coords / n)
}
