#![deny(unsafe_code)]

pub mod http;
pub mod storage;
