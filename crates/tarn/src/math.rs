//! Math types and glam re-exports.
//!
//! We re-export [glam](https://docs.rs/glam) types so users don't need to
//! depend on it directly. [`Transform`] is the local transform stored on every
//! scene component.
//!
//! Rotation is kept as Euler angles in **degrees** (what scene files and the
//! editor show), composed as:
//!
//! ```text
//! local = T(position) * Rx * Ry * Rz * S(scale)
//! ```

pub use glam::{Mat4, Quat, Vec3};

use serde::{Deserialize, Serialize};

/// A local transform: position, Euler rotation in degrees, and scale.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Transform {
    #[serde(with = "vec3_record")]
    pub position: Vec3,
    #[serde(with = "vec3_record")]
    pub rotation: Vec3,
    #[serde(with = "vec3_record", default = "one")]
    pub scale: Vec3,
}

fn one() -> Vec3 {
    Vec3::ONE
}

impl Transform {
    /// Identity transform (origin, no rotation, uniform scale of 1).
    pub const IDENTITY: Self = Self {
        position: Vec3::ZERO,
        rotation: Vec3::ZERO,
        scale: Vec3::ONE,
    };

    /// Create a transform at the given position.
    pub fn from_xyz(x: f32, y: f32, z: f32) -> Self {
        Self {
            position: Vec3::new(x, y, z),
            ..Self::IDENTITY
        }
    }

    /// Return a copy with the given rotation, in degrees.
    pub fn with_rotation(mut self, degrees: Vec3) -> Self {
        self.rotation = degrees;
        self
    }

    /// Return a copy with uniform scale applied.
    pub fn with_scale(mut self, scale: f32) -> Self {
        self.scale = Vec3::splat(scale);
        self
    }

    /// Rotation as a quaternion.
    pub fn rotation_quat(&self) -> Quat {
        Quat::from_rotation_x(self.rotation.x.to_radians())
            * Quat::from_rotation_y(self.rotation.y.to_radians())
            * Quat::from_rotation_z(self.rotation.z.to_radians())
    }

    /// Compute the 4x4 local matrix.
    pub fn matrix(&self) -> Mat4 {
        Mat4::from_scale_rotation_translation(self.scale, self.rotation_quat(), self.position)
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

/// `{ "x": .., "y": .., "z": .. }` on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Vec3Record {
    #[serde(default)]
    pub x: f32,
    #[serde(default)]
    pub y: f32,
    #[serde(default)]
    pub z: f32,
}

impl From<Vec3> for Vec3Record {
    fn from(v: Vec3) -> Self {
        Self { x: v.x, y: v.y, z: v.z }
    }
}

impl From<Vec3Record> for Vec3 {
    fn from(r: Vec3Record) -> Self {
        Vec3::new(r.x, r.y, r.z)
    }
}

/// Serde adapter that writes a `Vec3` as a [`Vec3Record`] object instead of
/// an array.
pub(crate) mod vec3_record {
    use super::{Vec3, Vec3Record};
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    pub fn serialize<S: Serializer>(v: &Vec3, s: S) -> Result<S::Ok, S::Error> {
        Vec3Record::from(*v).serialize(s)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Vec3, D::Error> {
        Vec3Record::deserialize(d).map(Vec3::from)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: Vec3, b: Vec3) -> bool {
        (a - b).length() < 1e-4
    }

    #[test]
    fn identity_matrix() {
        assert_eq!(Transform::IDENTITY.matrix(), Mat4::IDENTITY);
    }

    #[test]
    fn rotation_is_in_degrees() {
        let t = Transform::default().with_rotation(Vec3::new(0.0, 90.0, 0.0));
        // +X rotated 90° about Y lands on -Z.
        let p = t.matrix().transform_point3(Vec3::X);
        assert!(approx(p, Vec3::NEG_Z), "{p:?}");
    }

    #[test]
    fn scale_then_rotate_then_translate() {
        let t = Transform::from_xyz(10.0, 0.0, 0.0)
            .with_rotation(Vec3::new(0.0, 0.0, 90.0))
            .with_scale(2.0);
        // (1,0,0) → scaled (2,0,0) → rotated about Z (0,2,0) → moved (10,2,0)
        let p = t.matrix().transform_point3(Vec3::X);
        assert!(approx(p, Vec3::new(10.0, 2.0, 0.0)), "{p:?}");
    }

    #[test]
    fn wire_form_is_xyz_objects() {
        let t = Transform::from_xyz(1.0, 2.0, 3.0);
        let json = serde_json::to_value(t).unwrap();
        assert_eq!(json["position"], serde_json::json!({ "x": 1.0, "y": 2.0, "z": 3.0 }));

        let missing_scale = serde_json::json!({
            "position": { "x": 0.0, "y": 0.0, "z": 0.0 },
            "rotation": { "x": 0.0, "y": 0.0, "z": 0.0 },
        });
        let back: Transform = serde_json::from_value(missing_scale).unwrap();
        assert_eq!(back.scale, Vec3::ONE);
    }
}
