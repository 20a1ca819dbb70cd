use serde::{Deserialize, Serialize};

/// Outcome classification for a single source fetch.
///
/// Unavailability is an expected, normal result for every source and drives
/// fallback tier selection; it is never surfaced as an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SourceStatus {
    Success,
    Degraded,
    Unavailable,
}

impl SourceStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            SourceStatus::Success => "Success",
            SourceStatus::Degraded => "Degraded",
            SourceStatus::Unavailable => "Unavailable",
        }
    }

    pub fn is_available(&self) -> bool {
        !matches!(self, SourceStatus::Unavailable)
    }
}

impl std::fmt::Display for SourceStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A source fetch result: payload plus status.
///
/// Invariant: the payload is present exactly when the status is not
/// `Unavailable`. Adapters construct these through the three constructors,
/// which makes the invariant hold everywhere downstream.
#[derive(Debug, Clone)]
pub struct SourceFetch<T> {
    value: Option<T>,
    status: SourceStatus,
    detail: Option<String>,
}

impl<T> SourceFetch<T> {
    pub fn success(value: T) -> Self {
        Self {
            value: Some(value),
            status: SourceStatus::Success,
            detail: None,
        }
    }

    pub fn degraded(value: T, detail: impl Into<String>) -> Self {
        Self {
            value: Some(value),
            status: SourceStatus::Degraded,
            detail: Some(detail.into()),
        }
    }

    pub fn unavailable(detail: impl Into<String>) -> Self {
        Self {
            value: None,
            status: SourceStatus::Unavailable,
            detail: Some(detail.into()),
        }
    }

    pub fn status(&self) -> SourceStatus {
        self.status
    }

    pub fn value(&self) -> Option<&T> {
        self.value.as_ref()
    }

    pub fn detail(&self) -> Option<&str> {
        self.detail.as_deref()
    }

    pub fn is_available(&self) -> bool {
        self.status.is_available()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn payload_presence_matches_status() {
        let ok: SourceFetch<u32> = SourceFetch::success(7);
        assert_eq!(ok.status(), SourceStatus::Success);
        assert_eq!(ok.value(), Some(&7));

        let degraded: SourceFetch<u32> = SourceFetch::degraded(3, "stale reading");
        assert_eq!(degraded.status(), SourceStatus::Degraded);
        assert_eq!(degraded.value(), Some(&3));
        assert_eq!(degraded.detail(), Some("stale reading"));

        let gone: SourceFetch<u32> = SourceFetch::unavailable("timed out");
        assert_eq!(gone.status(), SourceStatus::Unavailable);
        assert!(gone.value().is_none());
        assert!(!gone.is_available());
    }
}
