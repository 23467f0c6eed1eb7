//! Type Resolver: schema node → resolved type expression.
//!
//! A pure function over the document's schema table. Every call produces a
//! fresh [`TypeExpr`] tree; resolving the same schema twice yields
//! structurally equal results.

mod resolve;
mod types;

pub use resolve::*;
pub use types::*;
