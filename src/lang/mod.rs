//! # Source-level data
//!
//! Values the front end produces and the presentation layer consumes:
//! parsed network blocks, derivation trees, and the subnet arithmetic shared
//! by the semantic analyzer and the renderers.

pub mod block;
pub mod tree;
pub mod vlsm;
