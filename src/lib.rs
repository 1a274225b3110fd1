//! # zonerisk: DNS Zone-Export Risk Analyzer
//!
//! An offline analyzer that ingests large DNS zone-export CSV files,
//! classifies every record against a configurable risk rubric, and emits a
//! structured report (table, JSON, or CSV).
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────────┐
//! │                         CLI front-end                             │
//! ├──────────────────────────────────────────────────────────────────┤
//! │  providers   │   io::csv_source   │   core::pipeline  │  report  │
//! │  (detect +   │   (RFC-4180        │   (chunking,      │  (table, │
//! │   decode)    │    tokenizer)      │    workers,       │   json,  │
//! │              │                    │    top-k)         │   csv)   │
//! ├──────────────────────────────────────────────────────────────────┤
//! │            core::record / core::catalog / core::classifier        │
//! └──────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The classifier (`core::classifier`) is a pure function of a record and a
//! [`core::catalog::PatternCatalog`]; the same classification result is
//! produced regardless of which [`core::pipeline::mode::ExecutionMode`] the
//! chunk pipeline runs in.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::too_many_arguments)]

/// Core analysis primitives: records, pattern catalog, classifier, pipeline.
pub mod core {
    //! Canonical data model, pattern catalog, classifier, and streaming pipeline.

    pub mod catalog;
    pub mod classifier;
    pub mod errors;
    pub mod pipeline;
    pub mod record;
    pub mod topk;
    pub mod validate;
}

/// Provider registry and per-format adapters (C2/C3).
pub mod providers;

/// CSV ingestion and report formatting (C4/C10).
pub mod io {
    //! CSV source tokenizer and report formatters.

    pub mod csv_source;
    pub mod reports;
}

pub use core::classifier::{ClassificationResult, RiskLevel};
pub use core::errors::{Result, ZoneRiskError};
pub use core::record::{Record, RecordType};

/// Library version, exposed for `--version` and report metadata.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
