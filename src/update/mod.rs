//! Update discovery for installed mods
//!
//! # Modules
//!
//! - [`scanner`]: Background scan comparing installed components against a remote catalog

pub mod scanner;
