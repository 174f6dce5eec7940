pub mod catalog;
pub mod config;
pub mod local;
pub mod logging;
pub mod service;
pub mod update;
pub mod version;
