// Copyright 2025 The Bootmap Authors
// SPDX-License-Identifier: Apache-2.0

//! Common types used throughout bootmap.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Reserved tag consulted when a host has no assignment of its own and no
/// role-level assignment.
pub const DEFAULT_TAG: &str = "Default";

/// Reserved tag carrying system-wide boot data.
pub const GLOBAL_TAG: &str = "Global";

/// An opaque host identifier (node name, tag, or role name).
///
/// Hosts are compared and ordered by their string form; ordering is what
/// makes list results reproducible.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Host(String);

impl Host {
    /// Creates a host identifier, validating well-formedness.
    ///
    /// An identifier is well-formed iff it is non-empty and contains no
    /// whitespace, comma, or control characters. The comma is the transport's
    /// list separator; whitespace would corrupt rendered kernel parameter
    /// strings.
    ///
    /// # Errors
    ///
    /// Returns `InvalidArgument` for a malformed identifier.
    pub fn parse(value: impl Into<String>) -> Result<Self> {
        let host = Self(value.into());
        if !host.is_well_formed() {
            return Err(Error::invalid_argument(format!(
                "malformed host identifier '{host}': must be non-empty with no whitespace, \
                 comma, or control characters"
            )));
        }
        Ok(host)
    }

    /// Returns whether the identifier satisfies [`Host::parse`]'s rules.
    #[must_use]
    pub fn is_well_formed(&self) -> bool {
        !self.0.is_empty()
            && !self.0.chars().any(|c| c.is_whitespace() || c.is_control() || c == ',')
    }

    /// Returns the identifier as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for Host {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for Host {
    /// Infallible conversion for trusted identifiers (tags, test fixtures).
    /// Untrusted input goes through [`Host::parse`].
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for Host {
    fn from(value: String) -> Self {
        Self(value)
    }
}

/// A boot configuration tuple: kernel image, initrd image, and kernel
/// command-line parameters.
///
/// Identity is structural — two configs with identical fields are
/// interchangeable, which is what lets the engine merge assignments into a
/// single group. The paths are opaque to the core; no filesystem access is
/// ever performed on them.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BootConfig {
    /// URL or path of the kernel image.
    pub kernel: String,
    /// URL or path of the initrd image.
    pub initrd: String,
    /// Kernel command-line parameter string. May be empty.
    pub params: String,
}

impl BootConfig {
    /// Creates a new boot configuration.
    #[must_use]
    pub fn new(
        kernel: impl Into<String>,
        initrd: impl Into<String>,
        params: impl Into<String>,
    ) -> Self {
        Self { kernel: kernel.into(), initrd: initrd.into(), params: params.into() }
    }

    /// Validates that the required images are present.
    ///
    /// `params` may be empty; `kernel` and `initrd` may not.
    ///
    /// # Errors
    ///
    /// Returns `InvalidArgument` if `kernel` or `initrd` is empty.
    pub fn validate(&self) -> Result<()> {
        if self.kernel.is_empty() {
            return Err(Error::invalid_argument("kernel image must not be empty"));
        }
        if self.initrd.is_empty() {
            return Err(Error::invalid_argument("initrd image must not be empty"));
        }
        Ok(())
    }
}

/// A partial boot configuration, applied field-wise over an existing tuple.
///
/// `None` leaves the corresponding field untouched. `params` may be set to an
/// empty string to clear a parameter string; `kernel` and `initrd` may not.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BootConfigUpdate {
    /// Replacement kernel image, if any.
    pub kernel: Option<String>,
    /// Replacement initrd image, if any.
    pub initrd: Option<String>,
    /// Replacement parameter string, if any.
    pub params: Option<String>,
}

impl BootConfigUpdate {
    /// Returns whether this update changes nothing.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.kernel.is_none() && self.initrd.is_none() && self.params.is_none()
    }

    /// Validates the provided fields.
    ///
    /// # Errors
    ///
    /// Returns `InvalidArgument` if `kernel` or `initrd` is set to an empty
    /// string.
    pub fn validate(&self) -> Result<()> {
        if self.kernel.as_deref() == Some("") {
            return Err(Error::invalid_argument("kernel image must not be empty"));
        }
        if self.initrd.as_deref() == Some("") {
            return Err(Error::invalid_argument("initrd image must not be empty"));
        }
        Ok(())
    }

    /// Applies this update over an existing tuple, yielding the new tuple.
    #[must_use]
    pub fn apply(&self, base: &BootConfig) -> BootConfig {
        BootConfig {
            kernel: self.kernel.clone().unwrap_or_else(|| base.kernel.clone()),
            initrd: self.initrd.clone().unwrap_or_else(|| base.initrd.clone()),
            params: self.params.clone().unwrap_or_else(|| base.params.clone()),
        }
    }
}

/// One entry of a list result: the matched hosts and their boot tuple.
///
/// Serializes to exactly the four keys the transport contract exposes:
/// `hosts`, `kernel`, `initrd`, `params`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BootGroupView {
    /// Matched hosts, ascending.
    pub hosts: Vec<Host>,
    /// URL or path of the kernel image.
    pub kernel: String,
    /// URL or path of the initrd image.
    pub initrd: String,
    /// Kernel command-line parameter string.
    pub params: String,
}

impl BootGroupView {
    /// Builds a single-host view from an assignment.
    #[must_use]
    pub fn for_host(host: Host, config: &BootConfig) -> Self {
        Self {
            hosts: vec![host],
            kernel: config.kernel.clone(),
            initrd: config.initrd.clone(),
            params: config.params.clone(),
        }
    }
}

/// A selector scoping list/delete requests to a host set, or to every
/// assigned host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HostFilter {
    /// Every assigned host.
    All,
    /// An explicit host set.
    Hosts(BTreeSet<Host>),
}

impl HostFilter {
    /// Builds an explicit filter from raw identifiers, validating each.
    ///
    /// Duplicates collapse; the transport has already split its
    /// comma-separated form before the core is reached.
    ///
    /// # Errors
    ///
    /// Returns `InvalidArgument` if any identifier is malformed.
    pub fn from_list<I, S>(hosts: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let hosts = hosts
            .into_iter()
            .map(Host::parse)
            .collect::<Result<BTreeSet<_>>>()?;
        Ok(Self::Hosts(hosts))
    }

    /// Returns whether this filter selects every assigned host.
    #[must_use]
    pub const fn is_all(&self) -> bool {
        matches!(self, Self::All)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_host_parse_rejects_malformed() {
        assert!(Host::parse("").is_err());
        assert!(Host::parse("a b").is_err());
        assert!(Host::parse("a,b").is_err());
        assert!(Host::parse("a\tb").is_err());
        assert!(Host::parse("nid000001").is_ok());
    }

    #[test]
    fn test_host_ordering() {
        let mut hosts = vec![Host::from("h2"), Host::from("h10"), Host::from("h1")];
        hosts.sort();
        let names: Vec<&str> = hosts.iter().map(Host::as_str).collect();
        assert_eq!(names, ["h1", "h10", "h2"]);
    }

    #[test]
    fn test_boot_config_validate() {
        assert!(BootConfig::new("k", "i", "").validate().is_ok());
        assert!(BootConfig::new("", "i", "p").validate().is_err());
        assert!(BootConfig::new("k", "", "p").validate().is_err());
    }

    #[test]
    fn test_boot_config_structural_identity() {
        let a = BootConfig::new("k", "i", "p");
        let b = BootConfig::new("k", "i", "p");
        assert_eq!(a, b);
    }

    #[test]
    fn test_filter_from_list_collapses_duplicates() {
        let filter = HostFilter::from_list(["h1", "h2", "h1"]).unwrap();
        match filter {
            HostFilter::Hosts(hosts) => assert_eq!(hosts.len(), 2),
            HostFilter::All => panic!("expected explicit host set"),
        }
    }

    #[test]
    fn test_filter_from_list_rejects_malformed() {
        assert!(HostFilter::from_list(["h1", ""]).is_err());
    }

    #[test]
    fn test_update_apply_preserves_unset_fields() {
        let base = BootConfig::new("k1", "i1", "p1");
        let patch = BootConfigUpdate { params: Some("p2".to_string()), ..Default::default() };
        assert_eq!(patch.apply(&base), BootConfig::new("k1", "i1", "p2"));
        assert!(patch.validate().is_ok());
        assert!(BootConfigUpdate::default().is_empty());
    }

    #[test]
    fn test_update_rejects_empty_images() {
        let patch = BootConfigUpdate { kernel: Some(String::new()), ..Default::default() };
        assert!(patch.validate().is_err());
        // Clearing params is allowed.
        let patch = BootConfigUpdate { params: Some(String::new()), ..Default::default() };
        assert!(patch.validate().is_ok());
    }

    #[test]
    fn test_view_serialized_shape() {
        let view = BootGroupView::for_host(Host::from("h1"), &BootConfig::new("k", "i", "p"));
        let json = serde_json::to_value(&view).unwrap();
        let obj = json.as_object().unwrap();
        let mut keys: Vec<&str> = obj.keys().map(String::as_str).collect();
        keys.sort_unstable();
        assert_eq!(keys, ["hosts", "initrd", "kernel", "params"]);
        assert_eq!(json["hosts"], serde_json::json!(["h1"]));
    }
}
