//! Local installation state
//!
//! - [`host`]: What the running platform has loaded and which version it runs
//! - [`storage`]: Which mods this tool installed, and at which version

pub mod host;
pub mod storage;
