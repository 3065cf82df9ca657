// src/errors/mod.rs
//! Structured error reporting for the Stoat mid-end.
//!
//! User-visible resolution errors carry miette diagnostics; internal
//! invariant violations live in the E9xxx code space so the driver can
//! render them as internal compiler errors and abort.

pub mod resolve;

pub use resolve::ResolveError;
