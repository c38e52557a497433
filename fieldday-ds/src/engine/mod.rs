//! The submission persistence and reconciliation engine
//!
//! Write path: wire document → row mapping → one transaction of upserts and
//! subtree replacement, under the contention retry layer. Read path:
//! normalized rows → nested document, with the evaluation reconciler
//! resolving the two schema generations into one shape.

pub mod document;
pub mod evaluation;
pub mod roster;
pub mod submit;
