//! Monitored targets.
//!
//! A target is a domain name or literal IP address. Targets are immutable once
//! loaded; the monitor only ever reads them.

use serde::Serialize;
use std::fmt;
use std::net::{IpAddr, SocketAddr};
use std::path::Path;
use thiserror::Error;

/// Errors that can occur while building a target list.
#[derive(Debug, Error)]
pub enum TargetError {
    #[error("at least one target must be defined")]
    Empty,

    #[error("target identifier cannot be empty")]
    EmptyIdentifier,

    #[error("failed to read targets file '{path}': {source}")]
    ReadError {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

/// What kind of endpoint a target identifier names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TargetKind {
    Domain,
    Ip,
}

/// A single endpoint to probe.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct Target {
    identifier: String,
    kind: TargetKind,
}

impl Target {
    /// Build a target from a raw identifier, detecting whether it is an IP literal.
    pub fn parse(identifier: impl Into<String>) -> Result<Self, TargetError> {
        let identifier: String = identifier.into();
        let identifier = identifier.trim().to_string();
        if identifier.is_empty() {
            return Err(TargetError::EmptyIdentifier);
        }

        let kind = if host_ip(&identifier).is_some() {
            TargetKind::Ip
        } else {
            TargetKind::Domain
        };

        Ok(Self { identifier, kind })
    }

    /// The raw identifier as it was loaded.
    pub fn identifier(&self) -> &str {
        &self.identifier
    }

    pub fn kind(&self) -> TargetKind {
        self.kind
    }

    /// URL to probe. Identifiers without a scheme get `https://`.
    pub fn url(&self) -> String {
        if has_scheme(&self.identifier) {
            return self.identifier.clone();
        }

        // Bare IPv6 literals need brackets to be a valid authority.
        match self.identifier.parse::<IpAddr>() {
            Ok(IpAddr::V6(v6)) => format!("https://[{}]", v6),
            _ => format!("https://{}", self.identifier),
        }
    }
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.identifier)
    }
}

fn has_scheme(identifier: &str) -> bool {
    identifier.starts_with("http://") || identifier.starts_with("https://")
}

/// Extract the IP address from an identifier's host part, if it is one.
fn host_ip(identifier: &str) -> Option<IpAddr> {
    if let Ok(ip) = identifier.parse::<IpAddr>() {
        return Some(ip);
    }

    let rest = identifier
        .strip_prefix("https://")
        .or_else(|| identifier.strip_prefix("http://"))
        .unwrap_or(identifier);
    let authority = rest.split(['/', '?', '#']).next().unwrap_or(rest);

    if let Ok(addr) = authority.parse::<SocketAddr>() {
        return Some(addr.ip());
    }
    if let Ok(ip) = authority.trim_start_matches('[').trim_end_matches(']').parse() {
        return Some(ip);
    }
    authority
        .rsplit_once(':')
        .and_then(|(host, _port)| host.parse().ok())
}

/// Ordered, non-empty list of targets.
#[derive(Debug, Clone)]
pub struct TargetList {
    targets: Vec<Target>,
}

impl TargetList {
    /// Create a target list. Refuses an empty list.
    pub fn new(targets: Vec<Target>) -> Result<Self, TargetError> {
        if targets.is_empty() {
            return Err(TargetError::Empty);
        }
        Ok(Self { targets })
    }

    /// Parse every identifier and build the list.
    pub fn from_identifiers<I, S>(identifiers: I) -> Result<Self, TargetError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let targets = identifiers
            .into_iter()
            .map(Target::parse)
            .collect::<Result<Vec<_>, _>>()?;
        Self::new(targets)
    }

    pub fn len(&self) -> usize {
        self.targets.len()
    }

    /// Always false; kept for API symmetry with `len`.
    pub fn is_empty(&self) -> bool {
        self.targets.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Target> {
        self.targets.iter()
    }

    pub fn as_slice(&self) -> &[Target] {
        &self.targets
    }
}

impl<'a> IntoIterator for &'a TargetList {
    type Item = &'a Target;
    type IntoIter = std::slice::Iter<'a, Target>;

    fn into_iter(self) -> Self::IntoIter {
        self.targets.iter()
    }
}

/// Parse a line-oriented targets file.
///
/// One identifier per line. Blank lines and lines starting with `#` are skipped.
pub fn parse_targets_text(contents: &str) -> Result<Vec<Target>, TargetError> {
    contents
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(Target::parse)
        .collect()
}

/// Read and parse a line-oriented targets file.
pub fn load_targets_file<P: AsRef<Path>>(path: P) -> Result<Vec<Target>, TargetError> {
    let path = path.as_ref();
    let contents = std::fs::read_to_string(path).map_err(|source| TargetError::ReadError {
        path: path.display().to_string(),
        source,
    })?;
    parse_targets_text(&contents)
}
