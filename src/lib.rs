//! Reconstructs football results and league tables from an archive of
//! loosely formatted blog posts.
//!
//! Posts go through [`extract`] to become typed games, scorer lists and
//! standings snapshots; each season's games then run through the
//! [`reconcile`] pipeline and are checked against the published final table.

pub use client::SheetClient;
pub use error::{ArchiveError, Result};
pub use model::*;

pub mod client;
pub mod config;
pub mod error;
pub mod export;
pub mod extract;
pub mod model;
pub mod reconcile;
pub mod similarity;
