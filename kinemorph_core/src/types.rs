// kinemorph_core/src/types.rs

use nalgebra::{Matrix3, Matrix3x6, Matrix4, Matrix6, Quaternion, Vector3, Vector6};

// --- Core Type Aliases ---
pub type Vec3 = Vector3<f64>;
pub type Mat4 = Matrix4<f64>;
/// Quaternions are (w, x, y, z); nalgebra's `Quaternion::new` takes `w` first.
pub type Quat = Quaternion<f64>;

// --- Tracking Aliases ---
/// A tracked point: `[x, y, z, vx, vy, vz]`.
pub type State = Vector6<f64>;
pub type StateCovariance = Matrix6<f64>;
/// Maps a tracked state onto an observed position.
pub type ObservationMatrix = Matrix3x6<f64>;
pub type ObservationCovariance = Matrix3<f64>;

/// Flat `[w, x, y, z]` value written into output slots that were not solved.
pub const SENTINEL_WXYZ: [f64; 4] = [0.0, 0.0, 0.0, 0.5];

/// The "identity-like, zero-confidence" quaternion marking a role with no data.
/// It is not a unit quaternion, so it can never be mistaken for a real pose.
pub fn sentinel_quaternion() -> Quat {
    from_wxyz(SENTINEL_WXYZ)
}

/// Returns `true` when `q` is exactly the sentinel value.
pub fn is_sentinel(q: &Quat) -> bool {
    to_wxyz(q) == SENTINEL_WXYZ
}

pub fn to_wxyz(q: &Quat) -> [f64; 4] {
    [q.w, q.i, q.j, q.k]
}

pub fn from_wxyz(v: [f64; 4]) -> Quat {
    Quaternion::new(v[0], v[1], v[2], v[3])
}

/// glTF stores rotations as `[x, y, z, w]`.
pub fn from_xyzw(v: [f64; 4]) -> Quat {
    Quaternion::new(v[3], v[0], v[1], v[2])
}
