//! Kernel utilities shared across slices.
//! Keep this crate lightweight: configuration loading, the flat key space and the
//! descriptor decoder.
//!
//! ## Config loading
//! ```rust,no_run
//! use conduit_kernel::config::{ConfigSource, load_settings};
//!
//! let loaded = load_settings(Some("conduit.toml")).unwrap();
//! let timeout = loaded.config.binding.timeout();
//! let projects = loaded.space.get_array("project.projects").unwrap_or_default();
//! # let _ = (timeout, projects);
//! ```
//!
//! ## Decoding
//! ```rust
//! use conduit_kernel::decoder::decode;
//!
//! let entries = vec![
//!     ("project.a.connector.pid".to_owned(), "C1".into()),
//!     ("project.a.connector.type".to_owned(), "jira".into()),
//! ];
//! let connector = decode(entries, "project.a.connector").unwrap();
//! assert_eq!(connector.pid().unwrap().as_str(), "C1");
//! assert!(connector.property("pid").is_none());
//! ```
pub mod config;
pub mod decoder;

pub use conduit_domain as domain;
