//! Operation Context Builder: path operations → resolved call descriptors.
//!
//! Each operation resolves its parameters, request body, and success
//! response into one [`OperationDescriptor`]. Inline response schemas are
//! promoted to synthesized named models so the emitted client only ever
//! returns nominal types.

mod build;
mod types;

pub use build::*;
pub use types::*;
