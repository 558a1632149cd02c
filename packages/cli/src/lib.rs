#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Regional case summary widget.
//!
//! Wires the provider fetcher and the cache into a single
//! [`pipeline::run`] and renders the result for the requested
//! [`present::ExecutionContext`].

pub mod config;
pub mod pipeline;
pub mod present;
