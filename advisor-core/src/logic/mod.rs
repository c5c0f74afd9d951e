//! Logic Module - Business Logic & Engines
//!
//! - `features/` - layout, field specs, samples, input collection
//! - `model/` - scaler and classifier artifacts, loading, counters
//! - `pipeline` - sample → verdict
//! - `advisor` - everything wired together

pub mod advisor;
pub mod features;
pub mod model;
pub mod pipeline;
