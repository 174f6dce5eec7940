#![allow(dead_code)]

mod catalog;
mod host;
mod worker;

pub use catalog::*;
pub use host::*;
pub use worker::*;
