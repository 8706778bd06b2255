// Copyright 2025 The Bootmap Authors
// SPDX-License-Identifier: Apache-2.0

//! Boot-parameter store trait definition.

use std::collections::BTreeSet;

use async_trait::async_trait;
use bootmap_core::{BootConfig, BootConfigUpdate, BootGroupView, Host, HostFilter, Result};

/// Trait for boot-parameter assignment stores.
///
/// This trait abstracts the assignment store, allowing different
/// implementations (in-memory, database-backed) to be used interchangeably.
/// The in-memory [`AssignmentEngine`](crate::AssignmentEngine) is the
/// reference implementation.
///
/// All operations are async to support both in-memory and truly async
/// backends. Every operation is atomic: a failed call leaves the store
/// exactly as it was, and no concurrent reader ever observes a host mapped
/// to two configurations or to none mid-mutation.
#[async_trait]
pub trait BootStore: Send + Sync + 'static {
    /// Assign a boot configuration to a set of hosts.
    ///
    /// After this call every host in `hosts` is associated with exactly the
    /// given tuple; any prior assignment of these hosts is superseded.
    /// Hosts sharing an identical tuple are kept in a single group.
    ///
    /// # Errors
    ///
    /// Returns `InvalidArgument` if `hosts` is empty, any host identifier is
    /// malformed, `kernel`/`initrd` is empty, or the request exceeds the
    /// configured host limit.
    async fn create(&self, hosts: BTreeSet<Host>, config: BootConfig) -> Result<()>;

    /// Apply a partial configuration update to a set of hosts.
    ///
    /// Provided fields override each host's current tuple field-wise; absent
    /// fields are preserved per host. Hosts of a group not named in the
    /// request keep their old tuple.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if any named host has no current assignment, and
    /// `InvalidArgument` on malformed input. Validation completes before any
    /// mutation.
    async fn update(&self, hosts: BTreeSet<Host>, patch: BootConfigUpdate) -> Result<()>;

    /// List assignments matching a filter.
    ///
    /// Returns one view per matched host, ascending by host identifier —
    /// stable and deterministic for a given store state. Requested hosts
    /// with no assignment are silently omitted; a filter matching nothing
    /// yields an empty sequence, not an error.
    ///
    /// # Errors
    ///
    /// Returns an error only if the backend cannot perform the query.
    async fn list(&self, filter: &HostFilter) -> Result<Vec<BootGroupView>>;

    /// Remove the assignments of the hosts matching a filter.
    ///
    /// Groups emptied as a result are destroyed. Hosts with no current
    /// assignment are no-ops, not errors; the operation is idempotent.
    ///
    /// # Errors
    ///
    /// Returns an error only if the backend cannot perform the removal.
    async fn delete(&self, filter: &HostFilter) -> Result<()>;

    /// Look up a single host's boot configuration.
    ///
    /// Returns `None` for an unassigned host.
    ///
    /// # Errors
    ///
    /// Returns an error only if the backend cannot perform the lookup.
    async fn lookup(&self, host: &Host) -> Result<Option<BootConfig>>;

    /// List all assigned host identifiers, ascending.
    ///
    /// # Errors
    ///
    /// Returns an error only if the backend cannot perform the query.
    async fn hosts(&self) -> Result<Vec<Host>>;
}
