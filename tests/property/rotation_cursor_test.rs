//! Property-based tests for the tab registry and its rotation cursor.
//!
//! The cursor must stay well-behaved under arbitrary registry mutation:
//! every step lands on a currently-registered tab, `None` comes back exactly
//! when the registry is empty, and a full sweep over a stable registry
//! visits each tab once.

use proptest::prelude::*;
use sessionkeeper::managers::tab_registry::{RotationCursor, TabRegistry};
use sessionkeeper::types::status::{TabId, TabSnapshot, WindowId};

fn snapshot(id: u32) -> TabSnapshot {
    TabSnapshot {
        id: TabId(id),
        window: WindowId(1),
        url: format!("https://colab.research.google.com/drive/{id}"),
        title: format!("notebook {id}"),
    }
}

#[derive(Debug, Clone)]
enum RegistryOp {
    Insert(u32),
    Remove(u32),
    Advance,
}

fn arb_ops() -> impl Strategy<Value = Vec<RegistryOp>> {
    prop::collection::vec(
        prop_oneof![
            3 => (0u32..12).prop_map(RegistryOp::Insert),
            2 => (0u32..12).prop_map(RegistryOp::Remove),
            4 => Just(RegistryOp::Advance),
        ],
        1..60,
    )
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(40))]

    #[test]
    fn advance_always_returns_a_live_member(ops in arb_ops()) {
        let mut registry = TabRegistry::new();
        let mut cursor = RotationCursor::new();

        for op in &ops {
            match op {
                RegistryOp::Insert(id) => registry.insert(snapshot(*id)),
                RegistryOp::Remove(id) => {
                    registry.remove(TabId(*id));
                }
                RegistryOp::Advance => match cursor.advance(&registry) {
                    Some(tab) => {
                        prop_assert!(!registry.is_empty());
                        prop_assert!(registry.contains(tab.id));
                    }
                    None => prop_assert!(registry.is_empty()),
                },
            }
        }
    }

    #[test]
    fn full_sweep_visits_each_tab_once(ids in prop::collection::hash_set(0u32..50, 1..10)) {
        let mut registry = TabRegistry::new();
        for id in &ids {
            registry.insert(snapshot(*id));
        }
        let mut cursor = RotationCursor::new();

        let mut visited = Vec::new();
        for _ in 0..registry.len() {
            let tab = cursor.advance(&registry);
            prop_assert!(tab.is_some());
            if let Some(tab) = tab {
                visited.push(tab.id);
            }
        }

        visited.sort_by_key(|t| t.0);
        visited.dedup();
        prop_assert_eq!(visited.len(), ids.len());
    }

    #[test]
    fn reinsertion_never_grows_the_registry(id in 0u32..20, times in 1usize..6) {
        let mut registry = TabRegistry::new();
        for _ in 0..times {
            registry.insert(snapshot(id));
        }
        prop_assert_eq!(registry.len(), 1);
    }
}
