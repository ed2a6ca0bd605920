use std::time::Duration;

use serde::{Deserialize, Serialize};

const FORCED_MOVE_CAP: usize = 100;
/// Columns (or rows) a line must cross, minus one.
const MIN_LINE_SPAN: i32 = 7;
const AI_TURN_DELAY_MS: u64 = 500;

#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RuleConfig {
    /// Passes the forced-move resolver may take before reporting a defect.
    pub forced_move_cap: usize,
    pub min_line_span: i32,
}

impl Default for RuleConfig {
    fn default() -> Self {
        Self {
            forced_move_cap: FORCED_MOVE_CAP,
            min_line_span: MIN_LINE_SPAN,
        }
    }
}

#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AiConfig {
    /// Fixed seed for the random tier. `None` draws from the OS.
    pub seed: Option<u64>,
    /// Pause the scheduler should take before asking for the AI's move.
    #[serde(with = "millis")]
    pub turn_delay: Duration,
}

impl Default for AiConfig {
    fn default() -> Self {
        Self {
            seed: None,
            turn_delay: Duration::from_millis(AI_TURN_DELAY_MS),
        }
    }
}

mod millis {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(value.as_millis() as u64)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        u64::deserialize(deserializer).map(Duration::from_millis)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_fields_fall_back_to_defaults() {
        let rules: RuleConfig = serde_json::from_str(r#"{"min_line_span": 5}"#).unwrap();
        assert_eq!(rules.min_line_span, 5);
        assert_eq!(rules.forced_move_cap, FORCED_MOVE_CAP);

        let ai: AiConfig = serde_json::from_str(r#"{"seed": 9, "turn_delay": 20}"#).unwrap();
        assert_eq!(ai.seed, Some(9));
        assert_eq!(ai.turn_delay, Duration::from_millis(20));
    }
}
