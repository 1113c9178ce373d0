//! Domain types used throughout the pipeline.
//!
//! This module defines:
//!
//! - raw and cleaned series types (`RawSeries`, `CountrySeries`)
//! - the merged long-format table (`LongTable`, `LongRow`)
//! - run configuration passed explicitly into every stage (`PipelineConfig`)
//! - the static FRED series catalog (`SeriesCatalog`)

pub mod catalog;
pub mod types;

pub use catalog::*;
pub use types::*;
