//! # scrap-core
//!
//! Core types, storage keys, pagination, and error types for the scrapbook store.
//!
//! This crate provides the foundational types shared across all scrapbook crates:
//! - Entity structs for projects, assets, scene objects, and shared links
//! - Frame size and lifecycle state enums
//! - Random identifier and share-token generation
//! - Validated blob storage keys (`projects/{id}/assets/{random}{ext}`)
//! - Pagination arithmetic
//! - Response envelopes returned to callers

pub mod entities;
pub mod enums;
pub mod errors;
pub mod ids;
pub mod keys;
pub mod pagination;
pub mod responses;
