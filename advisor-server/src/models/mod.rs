//! Data models

pub mod check;
pub mod field;
pub mod form;

pub use check::*;
pub use field::*;
pub use form::*;
