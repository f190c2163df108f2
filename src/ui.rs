//! Progress reporting for the conversion pipeline
//!
//! The loader never prints directly; it reports through a [`Ui`] so the
//! binary can log to the console while tests stay quiet or record calls.

use tracing::{info, warn};

use crate::parser::CoerceError;

/// Pipeline phases
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Phase {
    Loading,
    Indexing,
    Verifying,
    Complete,
}

impl std::fmt::Display for Phase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Phase::Loading => write!(f, "Loading records"),
            Phase::Indexing => write!(f, "Building indexes"),
            Phase::Verifying => write!(f, "Verifying database"),
            Phase::Complete => write!(f, "Complete"),
        }
    }
}

/// Trait for UI implementations - allows both console and silent/test modes
pub trait Ui {
    fn set_phase(&mut self, phase: Phase);
    /// Called each time another 1000 records have been inserted
    fn set_progress(&mut self, inserted: u64);
    /// A record was dropped because one of its fields failed coercion.
    /// `ordinal` is the 1-based position of the record after the header.
    fn record_skipped(&mut self, ordinal: u64, error: &CoerceError, raw: &str);
    fn log(&mut self, message: impl Into<String>);
}

/// Reports through `tracing`
#[derive(Default)]
pub struct ConsoleUi;

impl ConsoleUi {
    pub fn new() -> Self {
        Self
    }
}

impl Ui for ConsoleUi {
    fn set_phase(&mut self, phase: Phase) {
        info!(%phase, "{}...", phase);
    }

    fn set_progress(&mut self, inserted: u64) {
        info!(inserted, "Processed {} records...", inserted);
    }

    fn record_skipped(&mut self, ordinal: u64, error: &CoerceError, raw: &str) {
        warn!(record = ordinal, "Error processing record {}: {}", ordinal, error);
        warn!(record = ordinal, "Problematic record: {}", raw);
    }

    fn log(&mut self, message: impl Into<String>) {
        info!("{}", message.into());
    }
}

/// Silent UI implementation for testing and non-interactive use
#[derive(Default)]
pub struct SilentUi;

impl SilentUi {
    pub fn new() -> Self {
        Self
    }
}

impl Ui for SilentUi {
    fn set_phase(&mut self, _phase: Phase) {}
    fn set_progress(&mut self, _inserted: u64) {}
    fn record_skipped(&mut self, _ordinal: u64, _error: &CoerceError, _raw: &str) {}
    fn log(&mut self, _message: impl Into<String>) {}
}
