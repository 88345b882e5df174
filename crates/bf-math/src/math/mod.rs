//! Core math modules.

pub mod equality;
pub mod norm;
