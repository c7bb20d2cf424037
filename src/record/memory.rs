//! In-memory record store.
//!
//! Backs headless tools and tests. Implements both [`RecordSource`] and
//! [`RecordSink`], so a session can be saved into one and reopened from it.

use rustc_hash::FxHashMap;

use crate::errors::{Result, StarmapError};
use crate::record::{Record, RecordSink, RecordSource, ZoneRecords};

#[derive(Debug, Clone, Default)]
struct GalaxyRecords {
    zones: Vec<String>,
    scenarios: Vec<Record>,
}

#[derive(Debug, Clone, Default)]
pub struct MemoryRecordSource {
    galaxies: FxHashMap<String, GalaxyRecords>,
    zones: FxHashMap<String, ZoneRecords>,
}

impl MemoryRecordSource {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a galaxy with its zone list (main zone first) and scenario rows.
    pub fn insert_galaxy(
        &mut self,
        name: &str,
        zones: impl IntoIterator<Item = impl Into<String>>,
        scenarios: Vec<Record>,
    ) {
        self.galaxies.insert(
            name.to_string(),
            GalaxyRecords {
                zones: zones.into_iter().map(Into::into).collect(),
                scenarios,
            },
        );
    }

    pub fn insert_zone(&mut self, name: &str, records: ZoneRecords) {
        self.zones.insert(name.to_string(), records);
    }

    #[must_use]
    pub fn zone(&self, name: &str) -> Option<&ZoneRecords> {
        self.zones.get(name)
    }

    #[must_use]
    pub fn scenarios(&self, galaxy: &str) -> Option<&[Record]> {
        self.galaxies.get(galaxy).map(|g| g.scenarios.as_slice())
    }

    fn galaxy(&self, name: &str) -> Result<&GalaxyRecords> {
        self.galaxies
            .get(name)
            .ok_or_else(|| StarmapError::record_source(format!("opening galaxy '{name}'"), "no such galaxy"))
    }
}

impl RecordSource for MemoryRecordSource {
    fn zone_list(&self, galaxy: &str) -> Result<Vec<String>> {
        Ok(self.galaxy(galaxy)?.zones.clone())
    }

    fn scenario_rows(&self, galaxy: &str) -> Result<Vec<Record>> {
        Ok(self.galaxy(galaxy)?.scenarios.clone())
    }

    fn open_zone(&self, zone: &str) -> Result<ZoneRecords> {
        self.zones
            .get(zone)
            .cloned()
            .ok_or_else(|| StarmapError::ZoneNotFound(zone.to_string()))
    }
}

impl RecordSink for MemoryRecordSource {
    fn write_zone(&mut self, zone: &str, records: ZoneRecords) -> Result<()> {
        self.zones.insert(zone.to_string(), records);
        Ok(())
    }

    fn write_scenarios(&mut self, galaxy: &str, rows: Vec<Record>) -> Result<()> {
        self.galaxies.entry(galaxy.to_string()).or_default().scenarios = rows;
        Ok(())
    }
}
