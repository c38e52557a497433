//! Entity representations
//!
//! Three shapes per entity, with one pure mapping each way:
//! - `wire` — inbound submission documents (permissive serde DTOs)
//! - `rows` — storage rows (sqlx)
//! - `view` — outbound read-side documents

pub mod rows;
pub mod view;
pub mod wire;
