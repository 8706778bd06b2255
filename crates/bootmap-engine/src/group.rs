//! Configuration groups: a boot tuple plus the hosts assigned to it.

use std::collections::BTreeSet;

use bootmap_core::{BootConfig, Host};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Identifier of a configuration group.
///
/// IDs are assigned monotonically by the engine and are never reused within
/// a store's lifetime.
pub type GroupId = u64;

/// A boot configuration tuple and the set of hosts currently assigned to it.
///
/// A persisted group always has at least one host; the engine deletes a
/// group the moment its host set empties.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfigGroup {
    /// Group identifier.
    pub id: GroupId,
    /// The boot configuration shared by every host in the group.
    pub config: BootConfig,
    /// Hosts assigned to this configuration, ascending.
    pub hosts: BTreeSet<Host>,
    /// When the group was created.
    pub created_at: DateTime<Utc>,
}

impl ConfigGroup {
    /// Creates a group with an initial host set.
    #[must_use]
    pub fn new(id: GroupId, config: BootConfig, hosts: BTreeSet<Host>) -> Self {
        Self { id, config, hosts, created_at: Utc::now() }
    }

    /// Unions hosts into the group.
    pub fn insert_hosts(&mut self, hosts: impl IntoIterator<Item = Host>) {
        self.hosts.extend(hosts);
    }

    /// Removes a host from the group. Returns whether it was a member.
    pub fn remove_host(&mut self, host: &Host) -> bool {
        self.hosts.remove(host)
    }

    /// Returns whether the host is assigned to this group.
    #[must_use]
    pub fn contains(&self, host: &Host) -> bool {
        self.hosts.contains(host)
    }

    /// Number of hosts in the group.
    #[must_use]
    pub fn len(&self) -> usize {
        self.hosts.len()
    }

    /// Returns whether the group has no hosts left.
    ///
    /// An empty group must not survive the mutation that emptied it.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.hosts.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hosts(names: &[&str]) -> BTreeSet<Host> {
        names.iter().copied().map(Host::from).collect()
    }

    #[test]
    fn test_insert_and_remove() {
        let mut group = ConfigGroup::new(1, BootConfig::new("k", "i", "p"), hosts(&["a", "b"]));
        assert_eq!(group.len(), 2);

        group.insert_hosts([Host::from("c"), Host::from("a")]);
        assert_eq!(group.len(), 3);

        assert!(group.remove_host(&Host::from("a")));
        assert!(!group.remove_host(&Host::from("a")));
        assert!(!group.is_empty());
    }

    #[test]
    fn test_hosts_are_ordered() {
        let group = ConfigGroup::new(1, BootConfig::new("k", "i", ""), hosts(&["b", "a", "c"]));
        let names: Vec<&str> = group.hosts.iter().map(Host::as_str).collect();
        assert_eq!(names, ["a", "b", "c"]);
    }
}
