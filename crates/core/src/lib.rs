//! Tamarind Core - Shared types library.
//!
//! This crate provides common types used across the Tamarind components:
//! - `storefront` - Public-facing e-commerce site
//! - `integration-tests` - End-to-end tests against a mock backend
//!
//! # Architecture
//!
//! The core crate contains only types - no I/O, no HTTP clients. Every
//! entity it models is owned by the remote REST backend; these are the
//! transient, re-fetchable copies the storefront holds between requests.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for type-safe IDs, prices, emails,
//!   quantities, order statuses, and the bearer token pair

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
