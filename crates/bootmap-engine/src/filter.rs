//! Filter resolution: scoping a request to the groups and hosts it touches.

use std::collections::{BTreeMap, BTreeSet};

use bootmap_core::{Host, HostFilter};

use crate::group::GroupId;
use crate::index::HostSetIndex;

/// The groups touched by a request, each with the subset of requested hosts
/// it owns.
///
/// Keyed by group ID so iteration order is deterministic for a given store
/// state.
pub type Resolution = BTreeMap<GroupId, BTreeSet<Host>>;

/// Resolves a filter against the index.
///
/// An explicit host set is resolved with a single pass over the requested
/// hosts — never a scan of the group table, so cost tracks the request size
/// rather than the group count. Requested hosts with no assignment are
/// silently dropped.
#[must_use]
pub fn resolve(filter: &HostFilter, index: &HostSetIndex) -> Resolution {
    let mut resolution = Resolution::new();
    match filter {
        HostFilter::All => {
            for (host, group) in index.iter() {
                resolution.entry(group).or_default().insert(host.clone());
            }
        }
        HostFilter::Hosts(hosts) => {
            for host in hosts {
                if let Some(group) = index.lookup(host) {
                    resolution.entry(group).or_default().insert(host.clone());
                }
            }
        }
    }
    resolution
}

#[cfg(test)]
mod tests {
    use super::*;

    fn index_of(bindings: &[(&str, GroupId)]) -> HostSetIndex {
        let mut index = HostSetIndex::new();
        for (host, group) in bindings {
            index.bind(Host::from(*host), *group);
        }
        index
    }

    #[test]
    fn test_resolve_explicit_drops_unassigned() {
        let index = index_of(&[("a", 1), ("b", 2)]);
        let filter = HostFilter::from_list(["a", "b", "ghost"]).unwrap();

        let resolution = resolve(&filter, &index);
        assert_eq!(resolution.len(), 2);
        assert!(resolution[&1].contains(&Host::from("a")));
        assert!(resolution[&2].contains(&Host::from("b")));
    }

    #[test]
    fn test_resolve_groups_requested_hosts() {
        let index = index_of(&[("a", 1), ("b", 1), ("c", 2)]);
        let filter = HostFilter::from_list(["a", "b", "c"]).unwrap();

        let resolution = resolve(&filter, &index);
        assert_eq!(resolution[&1].len(), 2);
        assert_eq!(resolution[&2].len(), 1);
    }

    #[test]
    fn test_resolve_all() {
        let index = index_of(&[("a", 1), ("b", 2), ("c", 1)]);
        let resolution = resolve(&HostFilter::All, &index);
        assert_eq!(resolution.len(), 2);
        assert_eq!(resolution[&1].len(), 2);
    }

    #[test]
    fn test_resolve_empty_on_no_match() {
        let index = index_of(&[("a", 1)]);
        let filter = HostFilter::from_list(["x", "y"]).unwrap();
        assert!(resolve(&filter, &index).is_empty());
    }
}
