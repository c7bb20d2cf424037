//! Writing a session back to rows.

use std::collections::BTreeSet;

use crate::errors::{Result, StarmapError};
use crate::galaxy::{Layer, Zone};
use crate::record::{LayerRecords, PathRecords, RecordSink, ZoneRecords};
use crate::session::{Session, SessionMode, SessionState};

impl Session {
    /// Writes every loaded zone, and in galaxy mode the scenario rows, to
    /// `sink`. Reopening the written rows reproduces the same identities.
    pub fn save(&self, sink: &mut dyn RecordSink) -> Result<()> {
        if self.state == SessionState::Closed {
            return Err(StarmapError::SessionClosed);
        }
        for zone in self.zones.values() {
            sink.write_zone(&zone.name, zone_records(zone))?;
        }
        if self.mode == SessionMode::Galaxy {
            let rows = self.galaxy.scenarios.iter().map(|s| s.record().clone()).collect();
            sink.write_scenarios(&self.galaxy.name, rows)?;
        }
        log::info!("Saved '{}': {} zones", self.galaxy.name, self.zones.len());
        Ok(())
    }
}

fn zone_records(zone: &Zone) -> ZoneRecords {
    // Empty buckets are written too: a layer's presence is meaningful.
    let layers: BTreeSet<Layer> = zone.layers.keys().chain(zone.placements.keys()).copied().collect();

    let layers = layers
        .into_iter()
        .map(|layer| {
            let objects: Vec<_> = zone
                .layers
                .get(&layer)
                .map(|objects| objects.iter().map(|o| (o.kind, o.to_record())).collect())
                .unwrap_or_default();
            let placements: Vec<_> = zone
                .placements
                .get(&layer)
                .map(|placements| placements.iter().map(|p| p.to_record()).collect())
                .unwrap_or_default();
            (layer.to_string(), LayerRecords { objects, placements })
        })
        .collect();

    let paths = zone
        .paths
        .iter()
        .map(|path| PathRecords {
            header: path.header_record(),
            points: path.points.values().map(|p| p.to_record()).collect(),
        })
        .collect();

    ZoneRecords { layers, paths }
}
