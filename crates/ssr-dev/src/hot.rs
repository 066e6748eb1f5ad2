//! Hot-update events published after every client build cycle.

use crate::compiler::CompileStats;
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

/// Capacity of the hot event channel; slow subscribers skip older events.
pub const HOT_EVENT_CAPACITY: usize = 64;

/// Event pushed to browsers connected to the hot-update endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "camelCase")]
pub enum HotEvent {
    /// A client build cycle finished
    #[serde(rename_all = "camelCase")]
    Built {
        name: String,
        time_ms: u64,
        errors: Vec<String>,
        warnings: Vec<String>,
    },
}

impl HotEvent {
    pub fn built(name: &str, stats: &CompileStats) -> Self {
        HotEvent::Built {
            name: name.to_string(),
            time_ms: stats.duration_ms,
            errors: stats.errors.clone(),
            warnings: stats.warnings.clone(),
        }
    }
}

/// Create the broadcast channel shared by the client source and the host.
pub fn hot_channel() -> broadcast::Sender<HotEvent> {
    broadcast::channel(HOT_EVENT_CAPACITY).0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_built_event_json_shape() {
        let stats = CompileStats {
            errors: vec![],
            warnings: vec!["warning: big chunk".to_string()],
            duration_ms: 42,
        };
        let json = serde_json::to_value(HotEvent::built("client", &stats)).unwrap();

        assert_eq!(json["action"], "built");
        assert_eq!(json["name"], "client");
        assert_eq!(json["timeMs"], 42);
        assert_eq!(json["warnings"][0], "warning: big chunk");
    }
}
