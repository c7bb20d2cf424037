//! Placement and object transforms.
//!
//! Level data stores orientations as Euler angles in degrees. A rotation
//! `(x, y, z)` is applied as Z, then Y, then X:
//! `R = Rz(z) · Ry(y) · Rx(x)`.

use glam::{Affine3A, Quat, Vec3};

/// Converts stored Euler degrees to a rotation.
#[inline]
#[must_use]
pub fn euler_rotation(degrees: Vec3) -> Quat {
    let r = degrees * (std::f32::consts::PI / 180.0);
    Quat::from_rotation_z(r.z) * Quat::from_rotation_y(r.y) * Quat::from_rotation_x(r.x)
}

/// Local matrix of a zone placement: `T(position) · R(rotation)`.
#[inline]
#[must_use]
pub fn placement_matrix(position: Vec3, rotation: Vec3) -> Affine3A {
    Affine3A::from_rotation_translation(euler_rotation(rotation), position)
}

/// Local matrix of a placed object: `T · R · S`.
#[inline]
#[must_use]
pub fn object_matrix(position: Vec3, rotation: Vec3, scale: Vec3) -> Affine3A {
    Affine3A::from_scale_rotation_translation(scale, euler_rotation(rotation), position)
}

/// Brings a world-space direction into the local frame of a placement with
/// the given Euler rotation. Translation does not apply to deltas.
#[inline]
#[must_use]
pub fn inverse_rotate(delta: Vec3, rotation: Vec3) -> Vec3 {
    euler_rotation(rotation).inverse() * delta
}
