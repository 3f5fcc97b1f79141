//! Rendering aggregated results for the command line.
//!
//! # Submodules
//!
//! - [`json`]: serializes an [`ArticlesPage`](crate::models::ArticlesPage) and
//!   optionally writes it to a file
//! - [`markdown`]: a readable Markdown listing for the terminal

pub mod json;
pub mod markdown;
