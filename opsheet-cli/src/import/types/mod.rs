//! Core types for bulk operation import

mod record;
mod candidate;
mod mode;

pub use record::*;
pub use candidate::*;
pub use mode::*;
