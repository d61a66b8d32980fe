//! CLI command implementations
//!
//! This module contains all CLI command implementations.

pub mod extract;
pub mod init;
pub mod inspect;
pub mod list;
pub mod trigger;
pub mod validate;
