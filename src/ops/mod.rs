//! High-level operations built on CryptoCore and the EntryStore.
//!
//! This module provides the caller-facing workflows: transforming text and
//! recording the result, moving history between machines as a backup document,
//! and the housekeeping done at startup.

pub mod startup;
pub mod transfer;
pub mod transform;

// Re-export commonly used functions
pub use startup::{apply_limits, LimitReport};
pub use transfer::{export, import, BackupDocument, ExportReport, ImportReport};
pub use transform::{detect_operation, run, transform, Mode, TransformOutcome, TransformRequest};
