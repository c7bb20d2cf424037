//! Record Source Module
//!
//! The typed-row abstraction the level tables are read into and written
//! from, plus the traits the editor uses to reach the storage layer:
//!
//! - [`Record`] / [`FieldValue`]: one typed row keyed by hashed column names
//! - [`RecordSource`] / [`RecordSink`]: load and save interfaces
//! - [`MemoryRecordSource`]: in-memory store for tools and tests

pub mod memory;
pub mod source;
pub mod value;

pub use memory::MemoryRecordSource;
pub use source::{LayerRecords, PathRecords, RecordSink, RecordSource, ZoneRecords};
pub use value::{FieldType, FieldValue, Record, field_hash};
