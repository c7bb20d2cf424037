#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_possible_wrap)]
#![allow(clippy::cast_sign_loss)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]

pub mod compose;
pub mod errors;
pub mod galaxy;
pub mod ids;
pub mod record;
pub mod session;
pub mod settings;

pub use compose::{Composer, ResolvedZone, SubzoneIndex};
pub use errors::{Result, StarmapError};
pub use galaxy::{Galaxy, Layer, LayerMask, MapObject, ObjectKind, Path, PathPoint, Scenario, Zone, ZoneKey, ZonePlacement};
pub use ids::{EntityKind, EntityRef, Identity, IdentityRegistry};
pub use record::{FieldValue, MemoryRecordSource, Record, RecordSink, RecordSource, ZoneRecords};
pub use session::{ChangeEvent, Session, SessionMode, SessionState};
pub use settings::{EditorSettings, FieldDecodePolicy, GameVariant};
