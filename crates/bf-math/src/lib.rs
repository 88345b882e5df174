//! BF-type math utilities.

pub mod math;

pub use math::equality::*;
pub use math::norm::*;
