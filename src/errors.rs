//! Error Types
//!
//! This module defines the error types used throughout the editor core.
//!
//! # Overview
//!
//! The main error type [`StarmapError`] covers the recoverable failure modes:
//! - Record source failures while opening a galaxy or zone
//! - Load-time index conflicts (duplicate subzone keys)
//! - Strict field decoding
//! - Session lifecycle violations (mutating before initialization, after close)
//!
//! Identity registry invariant violations are not represented here. They are
//! programmer errors and panic with a diagnostic, see
//! [`IdentityRegistry`](crate::ids::IdentityRegistry).
//!
//! # Usage
//!
//! All fallible public APIs return [`Result<T>`] which is an alias for
//! `std::result::Result<T, StarmapError>`.

use thiserror::Error;

use crate::galaxy::ObjectKind;

/// The main error type for the editor core.
#[derive(Error, Debug)]
pub enum StarmapError {
    // ========================================================================
    // Record Source Errors
    // ========================================================================
    /// The record source has no zone with this name.
    #[error("Zone not found: {0}")]
    ZoneNotFound(String),

    /// The underlying archive or record table could not be opened.
    #[error("Record source error while {context}: {message}")]
    RecordSource {
        /// What was being opened
        context: String,
        /// Message reported by the source
        message: String,
    },

    /// A layer bucket used a name outside `common` / `layera`..`layerp`.
    #[error("Unknown layer name: {0}")]
    UnknownLayer(String),

    // ========================================================================
    // Field Decoding Errors
    // ========================================================================
    /// A field was stored with a different type tag than the one requested.
    /// Only produced under [`FieldDecodePolicy::Strict`](crate::settings::FieldDecodePolicy).
    #[error("Field {field:#010x} has type {found}, expected {expected}")]
    FieldTypeMismatch {
        /// Hashed field name
        field: u32,
        /// Type requested by the reader
        expected: &'static str,
        /// Type stored in the record
        found: &'static str,
    },

    /// A required field is absent from a record.
    #[error("Missing field: {0}")]
    MissingField(String),

    // ========================================================================
    // Composition Errors
    // ========================================================================
    /// Two placements map to the same `"{scenario}/{zone}"` key.
    #[error("Duplicate subzone key: {0}")]
    DuplicateZoneKey(String),

    // ========================================================================
    // Editing Errors
    // ========================================================================
    /// The object kind has no list in the game being edited.
    #[error("Object kind {0:?} does not exist in this game")]
    UnsupportedKind(ObjectKind),

    /// No scenario with this index.
    #[error("Scenario index out of range: {0}")]
    ScenarioOutOfRange(usize),

    // ========================================================================
    // Session Lifecycle Errors
    // ========================================================================
    /// A mutation arrived before the initialization pass completed.
    #[error("Session is still loading")]
    NotReady,

    /// The session was closed and released its state.
    #[error("Session is closed")]
    SessionClosed,

    // ========================================================================
    // Configuration Errors
    // ========================================================================
    /// Settings failed validation.
    #[error("Invalid settings: {0}")]
    InvalidSettings(String),

    /// JSON parsing error.
    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),
}

impl StarmapError {
    /// Shorthand for a [`StarmapError::RecordSource`] error.
    pub fn record_source(context: impl Into<String>, message: impl Into<String>) -> Self {
        Self::RecordSource {
            context: context.into(),
            message: message.into(),
        }
    }
}

/// Alias for `Result<T, StarmapError>`.
pub type Result<T> = std::result::Result<T, StarmapError>;
