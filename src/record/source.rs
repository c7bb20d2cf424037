//! Record source and sink interfaces.
//!
//! The archive and table codec that actually store level data live outside
//! this crate. The editor core sees them only through [`RecordSource`] for
//! loading and [`RecordSink`] for saving.

use crate::errors::Result;
use crate::galaxy::ObjectKind;
use crate::record::Record;

/// Rows of one layer of one zone.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LayerRecords {
    /// Placed objects, tagged with the list they were read from, in list order.
    pub objects: Vec<(ObjectKind, Record)>,
    /// Nested zone placements (`StageObjInfo` rows).
    pub placements: Vec<Record>,
}

/// One spline path: its header row and its point rows.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PathRecords {
    pub header: Record,
    pub points: Vec<Record>,
}

/// All rows making up one zone.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ZoneRecords {
    /// Keyed by layer name (`"common"`, `"layera"`, ...).
    pub layers: Vec<(String, LayerRecords)>,
    pub paths: Vec<PathRecords>,
}

impl ZoneRecords {
    #[must_use]
    pub fn layer(&self, name: &str) -> Option<&LayerRecords> {
        self.layers.iter().find(|(n, _)| n == name).map(|(_, l)| l)
    }

    /// Returns the named layer, creating it if absent.
    pub fn layer_mut(&mut self, name: &str) -> &mut LayerRecords {
        let pos = match self.layers.iter().position(|(n, _)| n == name) {
            Some(pos) => pos,
            None => {
                self.layers.push((name.to_string(), LayerRecords::default()));
                self.layers.len() - 1
            }
        };
        &mut self.layers[pos].1
    }
}

/// Supplies raw level rows.
pub trait RecordSource {
    /// Zone names belonging to a galaxy. The first entry is the main zone.
    fn zone_list(&self, galaxy: &str) -> Result<Vec<String>>;

    /// One row per scenario, with an integer layer-mask column per zone.
    fn scenario_rows(&self, galaxy: &str) -> Result<Vec<Record>>;

    fn open_zone(&self, zone: &str) -> Result<ZoneRecords>;
}

/// Receives level rows on save.
pub trait RecordSink {
    fn write_zone(&mut self, zone: &str, records: ZoneRecords) -> Result<()>;

    fn write_scenarios(&mut self, galaxy: &str, rows: Vec<Record>) -> Result<()>;
}
