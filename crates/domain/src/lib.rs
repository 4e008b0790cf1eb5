#![forbid(unsafe_code)]

pub mod admission;
pub mod common;
pub mod search;
pub mod stats;
