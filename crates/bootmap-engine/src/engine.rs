// Copyright 2025 The Bootmap Authors
// SPDX-License-Identifier: Apache-2.0

//! In-memory boot-parameter assignment engine.

use std::collections::{BTreeSet, HashMap};

use async_trait::async_trait;
use bootmap_core::{
    BootConfig, BootConfigUpdate, BootGroupView, Error, ErrorKind, Host, HostFilter, Result,
    StoreConfig, DEFAULT_TAG, GLOBAL_TAG,
};
use tokio::sync::RwLock;
use tracing::debug;

use crate::filter;
use crate::group::{ConfigGroup, GroupId};
use crate::index::HostSetIndex;
use crate::store::BootStore;

/// The in-memory assignment store.
///
/// One owned object holds the entire assignment state behind a single
/// reader-writer lock: mutations are serialized, reads run concurrently and
/// observe a consistent snapshot. Every mutating operation validates its
/// input completely before touching state, so a failed call never leaves a
/// partial split or merge behind.
pub struct AssignmentEngine {
    state: RwLock<EngineState>,
    config: StoreConfig,
}

/// Assignment state: the group table, the host index, and a structural-tuple
/// index used to merge identical configurations into one group.
///
/// The three maps are mutated together under the engine's write lock and are
/// consistent at every lock release: each index binding names a live group
/// containing that host, and `by_config` holds exactly one entry per group.
#[derive(Default)]
struct EngineState {
    groups: HashMap<GroupId, ConfigGroup>,
    index: HostSetIndex,
    by_config: HashMap<BootConfig, GroupId>,
    next_group_id: GroupId,
}

impl EngineState {
    /// Removes the hosts from whatever groups currently own them, deleting
    /// groups that empty out (the "split" of split-on-overlap).
    fn evict(&mut self, hosts: &BTreeSet<Host>) {
        for host in hosts {
            let Some(group_id) = self.index.unbind(host) else { continue };
            let emptied = match self.groups.get_mut(&group_id) {
                Some(group) => {
                    group.remove_host(host);
                    group.is_empty()
                }
                None => false,
            };
            if emptied {
                self.drop_group(group_id);
            }
        }
    }

    fn drop_group(&mut self, id: GroupId) {
        if let Some(group) = self.groups.remove(&id) {
            self.by_config.remove(&group.config);
        }
    }

    /// Binds the hosts to the group holding `config`, minting a new group if
    /// no exact-tuple group exists. Callers must have evicted the hosts
    /// first.
    fn assign(&mut self, hosts: BTreeSet<Host>, config: BootConfig) {
        let group_id = if let Some(group) =
            self.by_config.get(&config).copied().and_then(|id| self.groups.get_mut(&id))
        {
            group.insert_hosts(hosts.iter().cloned());
            group.id
        } else {
            self.next_group_id += 1;
            let id = self.next_group_id;
            self.by_config.insert(config.clone(), id);
            self.groups.insert(id, ConfigGroup::new(id, config, hosts.clone()));
            id
        };
        for host in hosts {
            self.index.bind(host, group_id);
        }
    }

    fn config_of(&self, host: &Host) -> Option<&BootConfig> {
        let group_id = self.index.lookup(host)?;
        self.groups.get(&group_id).map(|group| &group.config)
    }
}

impl AssignmentEngine {
    /// Creates an empty engine with the given store configuration.
    #[must_use]
    pub fn new(config: StoreConfig) -> Self {
        Self { state: RwLock::new(EngineState::default()), config }
    }

    /// Number of live configuration groups.
    ///
    /// Hosts created with identical tuples share a group, so this is at most
    /// the number of distinct tuples in the store.
    pub async fn group_count(&self) -> usize {
        self.state.read().await.groups.len()
    }

    /// Resolves a host's boot configuration through the fallback chain:
    /// the host's own assignment, else the `role` tag's assignment, else the
    /// [`DEFAULT_TAG`] assignment.
    ///
    /// Role and default tags are ordinary assignments stored under reserved
    /// host identifiers. The whole chain is evaluated against one snapshot.
    pub async fn resolve(&self, name: &Host, role: Option<&Host>) -> Option<BootConfig> {
        let state = self.state.read().await;
        state
            .config_of(name)
            .or_else(|| role.and_then(|tag| state.config_of(tag)))
            .or_else(|| state.config_of(&Host::from(DEFAULT_TAG)))
            .cloned()
    }

    /// Returns the system-wide boot data stored under the [`GLOBAL_TAG`]
    /// assignment, if any.
    pub async fn global(&self) -> Option<BootConfig> {
        let state = self.state.read().await;
        state.config_of(&Host::from(GLOBAL_TAG)).cloned()
    }

    /// Audits store consistency: every index binding names a live group
    /// containing that host, every group host is bound to that group, no
    /// group is empty, and the structural-tuple index matches the group
    /// table one-to-one.
    ///
    /// # Errors
    ///
    /// Returns an `Internal` error describing the first violation found.
    pub async fn audit(&self) -> Result<()> {
        let state = self.state.read().await;
        let violation = |message: String| Error::op(ErrorKind::Internal, message);

        for (host, group_id) in state.index.iter() {
            match state.groups.get(&group_id) {
                Some(group) if group.contains(host) => {}
                Some(_) => {
                    return Err(violation(format!(
                        "host '{host}' indexed to group {group_id} that does not contain it"
                    )))
                }
                None => {
                    return Err(violation(format!(
                        "host '{host}' indexed to missing group {group_id}"
                    )))
                }
            }
        }
        let mut bound = 0usize;
        for group in state.groups.values() {
            if group.is_empty() {
                return Err(violation(format!("group {} is empty", group.id)));
            }
            if state.by_config.get(&group.config) != Some(&group.id) {
                return Err(violation(format!(
                    "group {} missing from the structural-tuple index",
                    group.id
                )));
            }
            for host in &group.hosts {
                if state.index.lookup(host) != Some(group.id) {
                    return Err(violation(format!(
                        "host '{host}' of group {} not bound to it",
                        group.id
                    )));
                }
                bound += 1;
            }
        }
        if bound != state.index.len() {
            return Err(violation(format!(
                "index holds {} bindings for {bound} group members",
                state.index.len()
            )));
        }
        if state.by_config.len() != state.groups.len() {
            return Err(violation("structural-tuple index out of step with group table".into()));
        }
        Ok(())
    }

    fn validate_hosts(&self, hosts: &BTreeSet<Host>) -> Result<()> {
        if hosts.is_empty() {
            return Err(Error::invalid_argument("host set must not be empty"));
        }
        let limit = self.config.max_hosts_per_request;
        if limit != 0 && hosts.len() > limit {
            return Err(Error::invalid_argument(format!(
                "request names {} hosts, limit is {limit}",
                hosts.len()
            )));
        }
        validate_filter_hosts(hosts)
    }
}

impl Default for AssignmentEngine {
    fn default() -> Self {
        Self::new(StoreConfig::default())
    }
}

fn validate_filter_hosts(hosts: &BTreeSet<Host>) -> Result<()> {
    for host in hosts {
        if !host.is_well_formed() {
            return Err(Error::invalid_argument(format!("malformed host identifier '{host}'"))
                .with_resource(host.as_str()));
        }
    }
    Ok(())
}

fn validate_filter(filter: &HostFilter) -> Result<()> {
    match filter {
        HostFilter::All => Ok(()),
        HostFilter::Hosts(hosts) => validate_filter_hosts(hosts),
    }
}

#[async_trait]
impl BootStore for AssignmentEngine {
    async fn create(&self, hosts: BTreeSet<Host>, config: BootConfig) -> Result<()> {
        self.validate_hosts(&hosts)?;
        config.validate()?;

        let host_count = hosts.len();
        let mut state = self.state.write().await;
        state.evict(&hosts);
        state.assign(hosts, config);
        debug!(hosts = host_count, groups = state.groups.len(), "assigned boot configuration");
        Ok(())
    }

    async fn update(&self, hosts: BTreeSet<Host>, patch: BootConfigUpdate) -> Result<()> {
        self.validate_hosts(&hosts)?;
        patch.validate()?;
        if patch.is_empty() {
            return Ok(());
        }

        let mut state = self.state.write().await;

        // Every named host must already have an assignment; resolve the
        // per-host replacement tuples before mutating anything.
        let mut rehomed: Vec<(Host, BootConfig)> = Vec::new();
        for host in &hosts {
            let Some(current) = state.config_of(host) else {
                return Err(Error::not_found(format!("no assignment for host '{host}'"))
                    .with_resource(host.as_str()));
            };
            let next = patch.apply(current);
            if next != *current {
                rehomed.push((host.clone(), next));
            }
        }

        let changed = rehomed.len();
        for (host, next) in rehomed {
            let single = BTreeSet::from([host]);
            state.evict(&single);
            state.assign(single, next);
        }
        debug!(hosts = hosts.len(), changed, "patched boot configuration");
        Ok(())
    }

    async fn list(&self, filter: &HostFilter) -> Result<Vec<BootGroupView>> {
        validate_filter(filter)?;

        let state = self.state.read().await;
        let resolution = filter::resolve(filter, &state.index);
        let mut views = Vec::new();
        for (group_id, matched) in resolution {
            let Some(group) = state.groups.get(&group_id) else { continue };
            for host in matched {
                views.push(BootGroupView::for_host(host, &group.config));
            }
        }
        // One view per matched host; order by host so results are
        // reproducible for a given store state.
        views.sort_by(|a, b| a.hosts.cmp(&b.hosts));
        Ok(views)
    }

    async fn delete(&self, filter: &HostFilter) -> Result<()> {
        validate_filter(filter)?;

        let mut state = self.state.write().await;
        let resolution = filter::resolve(filter, &state.index);
        let mut removed = 0usize;
        for (group_id, matched) in resolution {
            for host in &matched {
                state.index.unbind(host);
            }
            removed += matched.len();
            let emptied = match state.groups.get_mut(&group_id) {
                Some(group) => {
                    for host in &matched {
                        group.remove_host(host);
                    }
                    group.is_empty()
                }
                None => false,
            };
            if emptied {
                state.drop_group(group_id);
            }
        }
        debug!(removed, groups = state.groups.len(), "removed assignments");
        Ok(())
    }

    async fn lookup(&self, host: &Host) -> Result<Option<BootConfig>> {
        let state = self.state.read().await;
        Ok(state.config_of(host).cloned())
    }

    async fn hosts(&self) -> Result<Vec<Host>> {
        let state = self.state.read().await;
        let mut hosts: Vec<Host> = state.index.iter().map(|(host, _)| host.clone()).collect();
        hosts.sort_unstable();
        Ok(hosts)
    }
}
