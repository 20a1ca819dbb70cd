pub mod confidence;
pub mod engine;
pub mod imagery;
pub mod map_area;
pub mod stress;
pub mod thresholds;

pub use engine::AlertEngine;

use crate::models::{AlertCandidate, ImageryResult, MapSummary, SensorReading, StressResult};

/// Everything a rule may inspect for one invocation.
///
/// Sources that did not contribute to this invocation are `None`; rules keyed
/// to them produce no candidates rather than evaluating fallback stand-ins.
pub struct RuleContext<'a> {
    pub reading: Option<&'a SensorReading>,
    pub imagery: Option<&'a ImageryResult>,
    pub stress: Option<&'a StressResult>,
    pub fused_score: f64,
    pub map: &'a MapSummary,
    pub overall_confidence: f64,
}

/// One alert rule. Rules are independent and order-insensitive: each returns
/// its candidates and the engine handles merging, deduplication, and
/// escalation.
pub trait AlertRule: Send + Sync {
    /// Unique identifier for this rule
    fn id(&self) -> &'static str;

    /// Human-readable name
    fn name(&self) -> &'static str;

    /// Evaluate the rule, returning zero or more alert candidates
    fn evaluate(&self, ctx: &RuleContext) -> Vec<AlertCandidate>;
}
