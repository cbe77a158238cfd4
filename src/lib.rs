// src/lib.rs
pub mod application;
pub mod cli;
pub mod config;
pub mod core;
pub mod delivery;
pub mod error;
pub mod infrastructure;

#[cfg(test)]
pub(crate) mod test_utils;
