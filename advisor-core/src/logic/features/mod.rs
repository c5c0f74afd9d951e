//! Features Module - the nine water-quality measurements
//!
//! Layout, field table, sample holder and range-enforcing input collector.

pub mod collector;
pub mod fields;
pub mod guidelines;
pub mod layout;
pub mod sample;


// Re-export common types
pub use collector::{InputCollector, InputError};
pub use fields::{Field, FieldSpec, FIELD_SPECS};
pub use guidelines::{guideline_for, Guideline, GUIDELINES};
pub use layout::{FEATURE_COUNT, FEATURE_LAYOUT};
pub use sample::WaterSample;
