//! Error types and result extensions for sessionkv operations

mod builders;
mod conversions;
mod extensions;
mod types;

pub use builders::*;
pub use extensions::*;
pub use types::{Error, Missing, Result};
