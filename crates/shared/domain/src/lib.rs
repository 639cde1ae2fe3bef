//! # Domain Models
//!
//! Pure domain types for Conduit projects with minimal dependencies (`serde`, `bitflags`).
//! Keep it lean: no I/O, no registry or configuration plumbing, just data and simple helpers.

pub mod binding;
pub mod capability;
pub mod config;
pub mod constants;
pub mod project;
pub mod property;
pub mod registry;
