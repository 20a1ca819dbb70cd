use serde::{Deserialize, Serialize};

/// Rendered alert message length budget, in characters.
pub const ALERT_CHAR_BUDGET: usize = 200;
/// Appended when the rendered message exceeds the budget.
pub const TRUNCATION_MARKER: &str = "...";

/// Fixed message when no rule fires. The result is never an empty string.
pub const NOMINAL_MESSAGE: &str = "Nominal: all monitored parameters within expected ranges.";

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, Default,
)]
pub enum AlertLevel {
    #[default]
    Info,
    Caution,
    Warning,
    Critical,
}

impl AlertLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            AlertLevel::Info => "Info",
            AlertLevel::Caution => "Caution",
            AlertLevel::Warning => "Warning",
            AlertLevel::Critical => "Critical",
        }
    }

    /// Raise `self` to `other` if `other` is more severe. The level never
    /// moves down within one evaluation pass.
    pub fn escalate(&mut self, other: AlertLevel) {
        if other > *self {
            *self = other;
        }
    }
}

impl std::fmt::Display for AlertLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Which subsystem produced an alert candidate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AlertSource {
    Sensor,
    Imagery,
    Stress,
    Map,
    System,
}

impl AlertSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            AlertSource::Sensor => "sensor",
            AlertSource::Imagery => "imagery",
            AlertSource::Stress => "stress",
            AlertSource::Map => "map",
            AlertSource::System => "system",
        }
    }
}

/// One un-rendered alert produced by a rule.
#[derive(Debug, Clone, Serialize)]
pub struct AlertCandidate {
    pub message: String,
    pub level: AlertLevel,
    pub source: AlertSource,
    /// Deduplication key within a source (e.g. "temperature", "disease").
    pub category: &'static str,
}

impl AlertCandidate {
    pub fn new(
        source: AlertSource,
        category: &'static str,
        level: AlertLevel,
        message: impl Into<String>,
    ) -> Self {
        Self {
            message: message.into(),
            level,
            source,
            category,
        }
    }
}

/// Final alert output: one bounded, prioritized message plus its level.
#[derive(Debug, Clone, Serialize)]
pub struct AlertResult {
    pub level: AlertLevel,
    pub message: String,
    /// Candidates that survived deduplication, most severe first.
    pub candidates: Vec<AlertCandidate>,
}

impl AlertResult {
    pub fn nominal() -> Self {
        Self {
            level: AlertLevel::Info,
            message: NOMINAL_MESSAGE.to_string(),
            candidates: Vec::new(),
        }
    }
}
