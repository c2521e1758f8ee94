//! Application layer: configuration and CLI

pub mod cli;
pub mod config;
