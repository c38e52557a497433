//! HTTP API handlers
//!
//! Thin glue over the engine: each handler parses the request, calls one
//! engine or store operation, and wraps the result in the response envelope.

pub mod admin;
pub mod evaluations;
pub mod health;
pub mod media;
pub mod submit;
pub mod teams;
