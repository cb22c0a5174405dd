//! Transform implementations for FHIR payloads
//!
//! This module provides the concrete transformers applied to bundles before
//! they are sent to the server.

mod upsert;

pub use upsert::{RewrittenBundle, UpsertRewriter, rewrite_entry};
