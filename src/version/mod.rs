//! Version model and compatibility resolution
//!
//! ```text
//! ┌─────────────┐     ┌─────────────┐     ┌─────────────┐
//! │   semver    │────▶│ expression  │────▶│  resolver   │
//! │(parse, cmp) │     │ (ranges)    │     │  (latest)   │
//! └─────────────┘     └─────────────┘     └─────────────┘
//! ```
//!
//! # Modules
//!
//! - [`semver`]: Version parsing (strict and loose), normalization and ordering
//! - [`expression`]: Compatibility range expressions evaluated against a platform version
//! - [`resolver`]: Newest artifact of a mod compatible with the running platform
//! - [`error`]: Error types for malformed versions and expressions

pub mod error;
pub mod expression;
pub mod resolver;
pub mod semver;
