// src/lib.rs

//! Endpoint Provisioner Library

pub mod error;
#[cfg(feature = "lambda")]
pub mod lambda;
pub mod models;
pub mod pipeline;
pub mod provider;
pub mod services;
pub mod utils;
