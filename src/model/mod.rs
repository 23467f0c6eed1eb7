//! Model Descriptor Builder: schema → structural descriptor + kind registry.
//!
//! Building is two-phase: [`KindRegistry::from_schemas`] records every
//! schema's structural kind first, then descriptors (and later codecs) are
//! built in any order against that immutable table.

mod build;
mod types;

pub use build::*;
pub use types::*;
