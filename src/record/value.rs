//! Typed key-value rows.
//!
//! A [`Record`] is one row of a level table: an ordered list of fields keyed
//! by the hash of the column name. The editor core never interprets most of
//! a record; it reads the handful of columns it needs (positions, names,
//! layer masks) and forwards everything else untouched.

use glam::Vec3;

use crate::errors::{Result, StarmapError};
use crate::settings::FieldDecodePolicy;

/// Hashes a column name the way the level tables key their fields.
#[must_use]
pub fn field_hash(name: &str) -> u32 {
    name.bytes()
        .fold(0u32, |h, b| h.wrapping_mul(31).wrapping_add(u32::from(b)))
}

/// A single typed field value.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Int32(i32),
    Int16(i16),
    Int8(i8),
    Float32(f32),
    String(String),
}

impl FieldValue {
    #[must_use]
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Int32(_) => "int32",
            Self::Int16(_) => "int16",
            Self::Int8(_) => "int8",
            Self::Float32(_) => "float32",
            Self::String(_) => "string",
        }
    }
}

impl From<i32> for FieldValue {
    fn from(v: i32) -> Self {
        Self::Int32(v)
    }
}

impl From<i16> for FieldValue {
    fn from(v: i16) -> Self {
        Self::Int16(v)
    }
}

impl From<i8> for FieldValue {
    fn from(v: i8) -> Self {
        Self::Int8(v)
    }
}

impl From<f32> for FieldValue {
    fn from(v: f32) -> Self {
        Self::Float32(v)
    }
}

impl From<&str> for FieldValue {
    fn from(v: &str) -> Self {
        Self::String(v.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(v: String) -> Self {
        Self::String(v)
    }
}

/// Rust types that can be read out of a [`FieldValue`].
pub trait FieldType: Sized + Default {
    const TYPE_NAME: &'static str;

    /// Returns `None` when the stored tag differs from `Self`.
    fn from_value(value: &FieldValue) -> Option<Self>;
}

macro_rules! impl_field_type {
    ($ty:ty, $variant:ident, $name:literal) => {
        impl FieldType for $ty {
            const TYPE_NAME: &'static str = $name;

            #[inline]
            fn from_value(value: &FieldValue) -> Option<Self> {
                match value {
                    FieldValue::$variant(v) => Some(v.clone()),
                    _ => None,
                }
            }
        }
    };
}

impl_field_type!(i32, Int32, "int32");
impl_field_type!(i16, Int16, "int16");
impl_field_type!(i8, Int8, "int8");
impl_field_type!(f32, Float32, "float32");
impl_field_type!(String, String, "string");

/// One row of a level table.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Record {
    fields: Vec<(u32, FieldValue)>,
}

impl Record {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Chainable [`put`](Self::put) for building rows.
    #[must_use]
    pub fn with(mut self, name: &str, value: impl Into<FieldValue>) -> Self {
        self.put(name, value);
        self
    }

    /// Writes a field, replacing an existing value in place so column order
    /// is preserved.
    pub fn put(&mut self, name: &str, value: impl Into<FieldValue>) {
        self.put_hashed(field_hash(name), value.into());
    }

    pub fn put_hashed(&mut self, hash: u32, value: FieldValue) {
        match self.fields.iter_mut().find(|(h, _)| *h == hash) {
            Some((_, slot)) => *slot = value,
            None => self.fields.push((hash, value)),
        }
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&FieldValue> {
        self.get_hashed(field_hash(name))
    }

    #[must_use]
    pub fn get_hashed(&self, hash: u32) -> Option<&FieldValue> {
        self.fields.iter().find(|(h, _)| *h == hash).map(|(_, v)| v)
    }

    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn iter(&self) -> impl Iterator<Item = (u32, &FieldValue)> {
        self.fields.iter().map(|(h, v)| (*h, v))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Reads a typed field.
    ///
    /// A missing field or a stored type that differs from `T` yields
    /// `T::default()` under [`FieldDecodePolicy::ZeroOnMismatch`] (with a
    /// warning for the mismatch case) and an error under
    /// [`FieldDecodePolicy::Strict`].
    pub fn read<T: FieldType>(&self, name: &str, policy: FieldDecodePolicy) -> Result<T> {
        let hash = field_hash(name);
        let Some(value) = self.get_hashed(hash) else {
            return match policy {
                FieldDecodePolicy::ZeroOnMismatch => Ok(T::default()),
                FieldDecodePolicy::Strict => Err(StarmapError::MissingField(name.to_string())),
            };
        };

        if let Some(v) = T::from_value(value) {
            return Ok(v);
        }

        match policy {
            FieldDecodePolicy::ZeroOnMismatch => {
                log::warn!(
                    "Field '{name}' ({hash:#010x}) stored as {}, read as {}; using zero",
                    value.type_name(),
                    T::TYPE_NAME
                );
                Ok(T::default())
            }
            FieldDecodePolicy::Strict => Err(StarmapError::FieldTypeMismatch {
                field: hash,
                expected: T::TYPE_NAME,
                found: value.type_name(),
            }),
        }
    }

    /// Reads `{prefix}_x`, `{prefix}_y`, `{prefix}_z` as a vector.
    pub fn read_vec3(&self, prefix: &str, policy: FieldDecodePolicy) -> Result<Vec3> {
        Ok(Vec3::new(
            self.read::<f32>(&format!("{prefix}_x"), policy)?,
            self.read::<f32>(&format!("{prefix}_y"), policy)?,
            self.read::<f32>(&format!("{prefix}_z"), policy)?,
        ))
    }

    pub fn put_vec3(&mut self, prefix: &str, v: Vec3) {
        self.put(&format!("{prefix}_x"), v.x);
        self.put(&format!("{prefix}_y"), v.y);
        self.put(&format!("{prefix}_z"), v.z);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_matches_table_convention() {
        assert_eq!(field_hash(""), 0);
        assert_eq!(field_hash("a"), 97);
        assert_eq!(field_hash("ab"), 97 * 31 + 98);
        // Long names wrap instead of overflowing.
        let _ = field_hash("ScenarioNameThatIsDefinitelyLongerThanEightCharacters");
    }

    #[test]
    fn put_replaces_in_place() {
        let mut r = Record::new().with("a", 1i32).with("b", 2i32);
        r.put("a", 5i32);
        let order: Vec<u32> = r.iter().map(|(h, _)| h).collect();
        assert_eq!(order, vec![field_hash("a"), field_hash("b")]);
        assert_eq!(r.get("a"), Some(&FieldValue::Int32(5)));
    }

    #[test]
    fn mismatch_defaults_to_zero_when_lenient() {
        // A malformed field silently reads as zero: the policy hides the
        // corruption from the caller.
        let r = Record::new().with("pos_x", "oops");
        let v: f32 = r.read("pos_x", FieldDecodePolicy::ZeroOnMismatch).unwrap();
        assert_eq!(v, 0.0);
    }

    #[test]
    fn mismatch_is_surfaced_when_strict() {
        let r = Record::new().with("pos_x", 3i16);
        let err = r.read::<f32>("pos_x", FieldDecodePolicy::Strict).unwrap_err();
        assert!(matches!(
            err,
            StarmapError::FieldTypeMismatch { expected: "float32", found: "int16", .. }
        ));
    }

    #[test]
    fn missing_field_policy() {
        let r = Record::new();
        assert_eq!(r.read::<i32>("x", FieldDecodePolicy::ZeroOnMismatch).unwrap(), 0);
        assert!(matches!(
            r.read::<i32>("x", FieldDecodePolicy::Strict),
            Err(StarmapError::MissingField(_))
        ));
    }

    #[test]
    fn vec3_columns() {
        let mut r = Record::new();
        r.put_vec3("dir", Vec3::new(1.0, 2.0, 3.0));
        let v = r.read_vec3("dir", FieldDecodePolicy::Strict).unwrap();
        assert_eq!(v, Vec3::new(1.0, 2.0, 3.0));
    }
}
