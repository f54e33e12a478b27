//! Repository modules implementing CRUD operations for all scrapbook entities.
//!
//! Each module adds methods to `MetadataStore` via `impl MetadataStore` blocks.
//! Mutations hold the write side of the store lock and reads hold the read
//! side. Code under the write guard reads through private `fetch_*` helpers.

pub mod asset;
pub mod object;
pub mod project;
pub mod shared_link;
