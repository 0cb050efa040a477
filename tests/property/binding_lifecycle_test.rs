//! Property-based tests for the notification binding table.
//!
//! The binder is checked against a plain `HashMap` model through arbitrary
//! bind / unbind / tab-teardown sequences; dropping a tab must leave no
//! binding that targets it while sparing every other binding.

use std::collections::HashMap;

use proptest::prelude::*;
use sessionkeeper::managers::notification_binder::{ClickTarget, NotificationBinder};
use sessionkeeper::types::status::{NotificationId, TabId};

#[derive(Debug, Clone)]
enum BindOp {
    BindTab { note: u8, tab: u8 },
    BindUrl { note: u8 },
    Unbind(u8),
    DropTab(u8),
}

fn arb_ops() -> impl Strategy<Value = Vec<BindOp>> {
    prop::collection::vec(
        prop_oneof![
            3 => (0u8..16, 0u8..6).prop_map(|(note, tab)| BindOp::BindTab { note, tab }),
            1 => (0u8..16).prop_map(|note| BindOp::BindUrl { note }),
            2 => (0u8..16).prop_map(BindOp::Unbind),
            1 => (0u8..6).prop_map(BindOp::DropTab),
        ],
        1..50,
    )
}

fn note_id(n: u8) -> NotificationId {
    NotificationId(format!("note-{n}"))
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(40))]

    #[test]
    fn binder_matches_model(ops in arb_ops()) {
        let mut binder = NotificationBinder::new();
        let mut model: HashMap<NotificationId, ClickTarget> = HashMap::new();

        for op in &ops {
            match op {
                BindOp::BindTab { note, tab } => {
                    let target = ClickTarget::Tab(TabId(*tab as u32));
                    binder.bind(note_id(*note), target.clone());
                    model.insert(note_id(*note), target);
                }
                BindOp::BindUrl { note } => {
                    let target =
                        ClickTarget::Url(format!("https://colab.research.google.com/{note}"));
                    binder.bind(note_id(*note), target.clone());
                    model.insert(note_id(*note), target);
                }
                BindOp::Unbind(note) => {
                    let removed = binder.unbind(&note_id(*note));
                    prop_assert_eq!(removed, model.remove(&note_id(*note)));
                }
                BindOp::DropTab(tab) => {
                    binder.drop_tab(TabId(*tab as u32));
                    model.retain(|_, target| {
                        !matches!(target, ClickTarget::Tab(t) if t.0 == *tab as u32)
                    });
                }
            }

            prop_assert_eq!(binder.len(), model.len());
            for (id, target) in &model {
                prop_assert_eq!(binder.target(id), Some(target));
            }
        }
    }

    #[test]
    fn drop_tab_removes_every_binding_for_it(tab in 0u8..6, notes in prop::collection::hash_set(0u8..16, 0..8)) {
        let mut binder = NotificationBinder::new();
        for note in &notes {
            binder.bind(note_id(*note), ClickTarget::Tab(TabId(tab as u32)));
        }
        binder.drop_tab(TabId(tab as u32));
        prop_assert!(binder.is_empty());
    }
}
