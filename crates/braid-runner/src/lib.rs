//! Bounded driver loop and run configuration for Braid timelines.
//!
//! `braid-core` defines what a single firing means; this crate decides how
//! many of them to take. The split keeps the core free of stopping policy,
//! logging, and file formats.
//!
//! # Modules
//!
//! - [`config`] -- Configuration loading from `braid-config.yaml` into
//!   strongly-typed structs.
//! - [`runner`] -- The bounded [`run`] loop with stopping rules and step
//!   observation.
//! - [`timeline`] -- [`Timeline`] snapshots and single-step firing.
//!
//! [`run`]: runner::run
//! [`Timeline`]: timeline::Timeline

pub mod config;
pub mod runner;
pub mod timeline;
