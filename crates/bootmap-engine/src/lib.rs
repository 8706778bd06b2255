// Copyright 2025 The Bootmap Authors
// SPDX-License-Identifier: Apache-2.0

//! Boot-parameter assignment engine.
//!
//! This crate maps host identifiers onto boot configuration tuples
//! (kernel, initrd, parameter string) and guarantees that every host is
//! associated with at most one tuple at any observable instant:
//! - assigning a configuration to hosts supersedes their prior assignments,
//!   splitting the overlapped groups and pruning any that empty out;
//! - hosts assigned identical tuples share a single group;
//! - reads see a consistent snapshot, never a host in two groups or none.
//!
//! # Architecture
//!
//! ```text
//! create / update / list / delete          (BootStore trait)
//!               │
//!        AssignmentEngine                  one RwLock over the whole store
//!        ┌──────┴───────┐
//!   HostSetIndex    ConfigGroup table      host → group, group → tuple+hosts
//!        └──────┬───────┘
//!         filter::resolve                  request → touched groups/hosts
//! ```
//!
//! The [`script`] module renders iPXE boot scripts from resolved
//! configurations.
//!
//! # Example
//!
//! ```
//! use std::collections::BTreeSet;
//!
//! use bootmap_core::{BootConfig, Host, HostFilter};
//! use bootmap_engine::{AssignmentEngine, BootStore};
//!
//! # tokio::runtime::Builder::new_current_thread().build().unwrap().block_on(async {
//! let engine = AssignmentEngine::default();
//!
//! let hosts: BTreeSet<Host> = ["n1", "n2"].into_iter().map(Host::from).collect();
//! let config = BootConfig::new("s3://boot/kernel", "s3://boot/initrd", "console=ttyS0");
//! engine.create(hosts, config).await.unwrap();
//!
//! // One view per assigned host, ordered by host identifier.
//! let views = engine.list(&HostFilter::All).await.unwrap();
//! assert_eq!(views.len(), 2);
//! assert_eq!(views[0].hosts[0].as_str(), "n1");
//! # });
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod engine;
pub mod filter;
pub mod group;
pub mod index;
pub mod script;
pub mod store;

pub use engine::AssignmentEngine;
pub use group::{ConfigGroup, GroupId};
pub use index::HostSetIndex;
pub use script::{render, ScriptParams};
pub use store::BootStore;
