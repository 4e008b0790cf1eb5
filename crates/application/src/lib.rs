#![forbid(unsafe_code)]

pub mod admission_service;
pub mod search_service;
pub mod stats_refresh;
