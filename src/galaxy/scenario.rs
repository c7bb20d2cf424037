use crate::errors::Result;
use crate::galaxy::LayerMask;
use crate::record::Record;
use crate::settings::FieldDecodePolicy;

/// A game-mode variant of a galaxy.
///
/// Backed by its scenario row: `ScenarioNo`, `ScenarioName` and one integer
/// column per zone holding that zone's [`LayerMask`]. Edits are written
/// straight into the row so saving forwards every other column untouched.
#[derive(Debug, Clone, PartialEq)]
pub struct Scenario {
    record: Record,
    policy: FieldDecodePolicy,
}

impl Scenario {
    #[must_use]
    pub fn new(number: i32, name: &str) -> Self {
        let record = Record::new()
            .with("ScenarioNo", number)
            .with("ScenarioName", name);
        Self {
            record,
            policy: FieldDecodePolicy::ZeroOnMismatch,
        }
    }

    /// Wraps a scenario row, checking that its own columns decode.
    pub fn from_record(record: Record, policy: FieldDecodePolicy) -> Result<Self> {
        record.read::<i32>("ScenarioNo", policy)?;
        record.read::<String>("ScenarioName", policy)?;
        Ok(Self { record, policy })
    }

    /// Chainable [`set_layer_mask`](Self::set_layer_mask).
    #[must_use]
    pub fn with_mask(mut self, zone: &str, mask: u16) -> Self {
        self.set_layer_mask(zone, LayerMask::from_bits_truncate(mask));
        self
    }

    #[must_use]
    pub fn number(&self) -> i32 {
        self.record
            .read("ScenarioNo", FieldDecodePolicy::ZeroOnMismatch)
            .unwrap_or_default()
    }

    #[must_use]
    pub fn name(&self) -> String {
        self.record
            .read("ScenarioName", FieldDecodePolicy::ZeroOnMismatch)
            .unwrap_or_default()
    }

    pub fn set_name(&mut self, name: &str) {
        self.record.put("ScenarioName", name);
    }

    /// Active lettered layers of `zone`. Zones without a column have none.
    ///
    /// Only bits 0..15 are meaningful; higher bits of the stored integer are
    /// ignored.
    pub fn layer_mask(&self, zone: &str) -> Result<LayerMask> {
        if !self.record.contains(zone) {
            return Ok(LayerMask::empty());
        }
        let raw = self.record.read::<i32>(zone, self.policy)?;
        Ok(LayerMask::from_bits_truncate((raw & 0xFFFF) as u16))
    }

    pub fn set_layer_mask(&mut self, zone: &str, mask: LayerMask) {
        self.record.put(zone, i32::from(mask.bits()));
    }

    #[must_use]
    pub fn record(&self) -> &Record {
        &self.record
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::StarmapError;

    #[test]
    fn mask_columns() {
        let s = Scenario::new(1, "Intro").with_mask("Main", 0b101);
        assert_eq!(s.layer_mask("Main").unwrap(), LayerMask::A | LayerMask::C);
        assert_eq!(s.layer_mask("Absent").unwrap(), LayerMask::empty());
    }

    #[test]
    fn high_bits_are_ignored() {
        let rec = Record::new()
            .with("ScenarioNo", 1i32)
            .with("ScenarioName", "x")
            .with("Main", 0x0003_0001i32);
        let s = Scenario::from_record(rec, FieldDecodePolicy::Strict).unwrap();
        assert_eq!(s.layer_mask("Main").unwrap(), LayerMask::A);
    }

    #[test]
    fn strict_mask_type_mismatch() {
        let rec = Record::new()
            .with("ScenarioNo", 1i32)
            .with("ScenarioName", "x")
            .with("Main", 1.5f32);
        let s = Scenario::from_record(rec, FieldDecodePolicy::Strict).unwrap();
        assert!(matches!(s.layer_mask("Main"), Err(StarmapError::FieldTypeMismatch { .. })));
    }

    #[test]
    fn rename_writes_field() {
        let mut s = Scenario::new(2, "Old");
        s.set_name("New");
        assert_eq!(s.name(), "New");
        assert_eq!(s.number(), 2);
    }
}
