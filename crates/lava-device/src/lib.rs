//! LAVA Device - device configuration for the dispatch pipeline
//!
//! This crate turns a device configuration document into a typed view that
//! dispatch code queries while running a job:
//! - Power, reset and pre-boot commands with safe defaults
//! - Primary console connection selection among tagged connections
//! - Constants lookup, optionally scoped by prefix
//! - The [`DeviceFamily`] contract for job compatibility checks

pub mod commands;
pub mod connection;
pub mod constants;
pub mod device;
pub mod error;
pub mod family;
mod loader;

pub use commands::Commands;
pub use connection::{Connection, Connections, Selection, PRIMARY_TAG};
pub use constants::Constants;
pub use device::{DeviceConfig, DEFAULT_POWER_STATE};
pub use error::ConfigurationError;
pub use family::DeviceFamily;
