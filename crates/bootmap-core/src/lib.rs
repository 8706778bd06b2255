// Copyright 2025 The Bootmap Authors
// SPDX-License-Identifier: Apache-2.0

//! Core types and utilities for the bootmap boot-parameter service.
//!
//! This crate provides the fundamental building blocks used across all
//! bootmap components:
//! - Error types with HTTP-mappable error kinds
//! - Common data types (host identifiers, boot configuration tuples, views)
//! - Configuration management

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod config;
pub mod error;
pub mod types;

pub use config::{Config, LogFormat, LoggingConfig, ScriptConfig, StoreConfig};
pub use error::{Error, ErrorKind, Result};
pub use types::{
    BootConfig, BootConfigUpdate, BootGroupView, Host, HostFilter, DEFAULT_TAG, GLOBAL_TAG,
};
