// src/lib.rs

//! Static export of a multi-locale news site.

pub mod error;
pub mod models;
pub mod pipeline;
pub mod services;
pub mod storage;
pub mod utils;
