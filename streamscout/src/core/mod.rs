//! Core domain model types for streamscout.
//!
//! This module contains the plain values that flow through the pipeline:
//! - Link candidates and their kind/quality/provenance enums
//! - Fetch outcomes and failure classification
//! - The ranked result returned to callers

mod candidate;
mod outcome;
mod result;

pub use candidate::{LinkCandidate, LinkKind, Provenance, Quality};
pub use outcome::{FetchFailure, FetchFailureKind, FetchOutcome, FetchedContent};
pub use result::{ExtractionStatus, RankedResult};
