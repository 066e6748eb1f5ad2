//! Property-based tests for the readiness state machine.

use proptest::prelude::*;
use serde_json::json;
use ssr_dev::{Coordinator, Phase, Slot, SlotUpdate};
use std::collections::HashSet;
use std::sync::Arc;

fn update_strategy() -> impl Strategy<Value = SlotUpdate> {
    (0u8..4, 0u32..1000).prop_map(|(slot, n)| match slot {
        0 => SlotUpdate::Template(Arc::from(format!("<html>{n}</html>"))),
        1 => SlotUpdate::ClientManifest(Arc::new(json!({ "build": n }))),
        2 => SlotUpdate::ServerBundle(Arc::new(json!({ "build": n }))),
        _ => SlotUpdate::ErrorBundle(Arc::new(json!({ "build": n }))),
    })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(256))]

    /// A write dispatches iff all three gating slots are present afterwards
    #[test]
    fn prop_dispatch_iff_fully_populated(
        updates in prop::collection::vec(update_strategy(), 0..40)
    ) {
        let mut coordinator = Coordinator::new("<html></html>");
        let mut present = HashSet::new();

        for update in updates {
            let slot = update.slot();
            if slot.gates_readiness() {
                present.insert(slot);
            }
            let dispatch = coordinator.apply(update);
            prop_assert_eq!(dispatch.snapshot.is_some(), present.len() == 3);
        }
    }

    /// Readiness completes at most once and never regresses
    #[test]
    fn prop_ready_fires_once(
        updates in prop::collection::vec(update_strategy(), 0..40)
    ) {
        let mut coordinator = Coordinator::new("<html></html>");
        let mut completions = 0;
        let mut was_ready = false;

        for update in updates {
            let dispatch = coordinator.apply(update);
            if dispatch.became_ready {
                completions += 1;
            }
            if was_ready {
                prop_assert_eq!(coordinator.phase(), Phase::Ready);
            }
            was_ready = coordinator.phase() == Phase::Ready;
        }

        prop_assert!(completions <= 1);
        prop_assert_eq!(completions == 1, was_ready);
    }

    /// The snapshot always reflects the latest write to each slot
    #[test]
    fn prop_snapshot_holds_latest_values(
        updates in prop::collection::vec(update_strategy(), 1..40)
    ) {
        let mut coordinator = Coordinator::new("<html></html>");
        let mut latest_template: Arc<str> = Arc::from("<html></html>");
        let mut latest_server = None;

        for update in updates {
            match &update {
                SlotUpdate::Template(value) => latest_template = Arc::clone(value),
                SlotUpdate::ServerBundle(value) => latest_server = Some(Arc::clone(value)),
                _ => {}
            }

            if let Some(snapshot) = coordinator.apply(update).snapshot {
                prop_assert_eq!(&snapshot.context.template, &latest_template);
                prop_assert_eq!(Some(&snapshot.bundles.server_bundle), latest_server.as_ref());
            }
        }

        prop_assert_eq!(coordinator.missing().contains(&Slot::ServerBundle), latest_server.is_none());
    }
}
