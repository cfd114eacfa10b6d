use std::fmt;
use std::path::PathBuf;

use chrono::{DateTime, SecondsFormat, Utc};

/// Label shown for services that have no working copy.
pub const UNTRACKED_LABEL: &str = "-";


/// Static identity of a monitored service, loaded once from config.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceDescriptor {
    pub name: String,
    pub directory: Option<PathBuf>,
    pub host: String,
    pub port: u16,
}


impl ServiceDescriptor {
    /// `host:port` as passed to the resolver.
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}


#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServiceStatus {
    Running,
    Down,
}


impl ServiceStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ServiceStatus::Running => "RUNNING",
            ServiceStatus::Down => "DOWN",
        }
    }
}


impl fmt::Display for ServiceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}


/// Checked-out revision of a service's working copy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Revision {
    /// Normalized branch label.
    Known(String),
    /// The query ran and failed.
    Unknown,
    /// No working copy configured; never queried.
    Untracked,
}


impl Revision {
    /// Text for the BRANCH column.
    pub fn label(&self) -> &str {
        match self {
            Revision::Known(label) => label,
            Revision::Unknown => "",
            Revision::Untracked => UNTRACKED_LABEL,
        }
    }
}


/// One watcher's observation of a service. Never mutated after publishing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceSnapshot {
    pub name: String,
    pub status: ServiceStatus,
    pub revision: Revision,
    pub checked_at: DateTime<Utc>,
}


impl ServiceSnapshot {
    pub fn new(name: &str, status: ServiceStatus, revision: Revision) -> Self {
        ServiceSnapshot {
            name: name.to_string(),
            status,
            revision,
            checked_at: Utc::now(),
        }
    }

    pub fn checked_at_rfc3339(&self) -> String {
        rfc3339(&self.checked_at)
    }
}


/// Second-precision RFC3339 in UTC, e.g. `2024-03-01T12:30:05Z`.
pub fn rfc3339(at: &DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Secs, true)
}


#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn address_joins_host_and_port() {
        let d = ServiceDescriptor {
            name: "web".into(),
            directory: None,
            host: "localhost".into(),
            port: 8080,
        };
        assert_eq!(d.address(), "localhost:8080");
    }

    #[test]
    fn status_display() {
        assert_eq!(ServiceStatus::Running.to_string(), "RUNNING");
        assert_eq!(ServiceStatus::Down.to_string(), "DOWN");
    }

    #[test]
    fn revision_labels() {
        assert_eq!(Revision::Known("main".into()).label(), "main");
        assert_eq!(Revision::Unknown.label(), "");
        assert_eq!(Revision::Untracked.label(), "-");
    }

    #[test]
    fn checked_at_is_rfc3339() {
        let mut snap = ServiceSnapshot::new("db", ServiceStatus::Down, Revision::Untracked);
        snap.checked_at = Utc.with_ymd_and_hms(2024, 3, 1, 12, 30, 5).unwrap();
        assert_eq!(snap.checked_at_rfc3339(), "2024-03-01T12:30:05Z");
    }
}
