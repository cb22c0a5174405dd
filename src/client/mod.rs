//! FHIR REST client and authentication.
//!
//! This module provides the [`FhirClient`] for talking to a FHIR server,
//! along with the [`Auth`] credentials it presents.

mod auth;
mod fhir;

pub use auth::Auth;
pub use fhir::{FHIR_JSON, FhirClient, UPSERT_CHECK_HEADER, describe_failure};
