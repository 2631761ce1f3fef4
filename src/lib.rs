//! codebase-flattener: turn a repository into a single AI-ready prompt
//!
//! Loads a repository tree through a [`fetch::Relay`], lets the caller pick
//! files through a tri-state folder [`selection`], fetches their contents via
//! a hash-validated [`cache`], and assembles an overview plus the selected
//! code into one prompt text.

pub mod cache;
pub mod cli;
pub mod config;
pub mod domain;
pub mod fetch;
pub mod render;
pub mod scan;
pub mod selection;
pub mod session;
pub mod utils;
