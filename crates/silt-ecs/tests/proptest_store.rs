//! Property tests for the storage layer.
//!
//! These tests use `proptest` to generate random sequences of allocate /
//! free / attach / detach operations and verify the structural invariants the
//! engine relies on: generation monotonicity, sparse-set density, and
//! default-on-stale reads.

use proptest::prelude::*;
use silt_ecs::prelude::*;

const MARK: usize = 0;

/// Operations we can perform against the manager.
#[derive(Debug, Clone)]
enum StoreOp {
    Allocate,
    Free(usize),
    Attach(usize, u32),
    Set(usize, u32),
    Detach(usize),
    FreeStale,
}

fn store_op_strategy() -> impl Strategy<Value = StoreOp> {
    prop_oneof![
        Just(StoreOp::Allocate),
        (0..64usize).prop_map(StoreOp::Free),
        (0..64usize, any::<u32>()).prop_map(|(i, v)| StoreOp::Attach(i, v)),
        (0..64usize, any::<u32>()).prop_map(|(i, v)| StoreOp::Set(i, v)),
        (0..64usize).prop_map(StoreOp::Detach),
        Just(StoreOp::FreeStale),
    ]
}

fn fresh_manager() -> EntityManager {
    let table = ComponentTableBuilder::new(1)
        .register::<u32>(MARK, 32, 0)
        .build()
        .unwrap();
    EntityManager::new(table)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(2_000))]

    #[test]
    fn random_ops_preserve_invariants(ops in prop::collection::vec(store_op_strategy(), 1..80)) {
        let mut mgr = fresh_manager();
        let mut live: Vec<Entity> = Vec::new();
        let mut dead: Vec<Entity> = Vec::new();

        for op in ops {
            match op {
                StoreOp::Allocate => {
                    let e = mgr.allocate();
                    // A reused index must outrank every generation we saw die there.
                    for d in &dead {
                        if d.index() == e.index() {
                            prop_assert!(e.generation() > d.generation());
                        }
                    }
                    live.push(e);
                }
                StoreOp::Free(i) => {
                    if !live.is_empty() {
                        let e = live.remove(i % live.len());
                        prop_assert!(mgr.free(e));
                        dead.push(e);
                    }
                }
                StoreOp::Attach(i, v) => {
                    if !live.is_empty() {
                        let e = live[i % live.len()];
                        mgr.attach_component(e, MARK, v);
                        prop_assert!(mgr.has_component(e, MARK));
                        prop_assert_eq!(mgr.component_or_default::<u32>(e, MARK), v);
                    }
                }
                StoreOp::Set(i, v) => {
                    if !live.is_empty() {
                        let e = live[i % live.len()];
                        let had = mgr.has_component(e, MARK);
                        mgr.set_component(e, MARK, v);
                        if had {
                            prop_assert_eq!(mgr.component_or_default::<u32>(e, MARK), v);
                        } else {
                            // Setting an unattached component stays a no-op.
                            prop_assert!(!mgr.has_component(e, MARK));
                        }
                    }
                }
                StoreOp::Detach(i) => {
                    if !live.is_empty() {
                        let e = live[i % live.len()];
                        mgr.free_component(e, MARK);
                        prop_assert!(!mgr.has_component(e, MARK));
                        prop_assert_eq!(mgr.component_or_default::<u32>(e, MARK), 0);
                    }
                }
                StoreOp::FreeStale => {
                    if let Some(&e) = dead.first() {
                        // A dead handle stays dead no matter what reused its slot.
                        prop_assert!(!mgr.free(e));
                        prop_assert!(!mgr.is_live(e));
                        prop_assert!(!mgr.has_component(e, MARK));
                    }
                }
            }

            // Density: the manager tracks exactly the handles we believe live.
            prop_assert_eq!(mgr.live_count(), live.len());
            for e in &live {
                prop_assert!(mgr.is_live(*e));
            }
            for e in &dead {
                prop_assert!(!mgr.is_live(*e));
            }
        }
    }

    #[test]
    fn sparse_set_density(ids in prop::collection::hash_set(0u32..512, 0..200)) {
        let mut set = SparseSet::new();
        for &id in &ids {
            set.insert(id);
        }
        prop_assert_eq!(set.len(), ids.len());

        // Remove half of them.
        let removed: Vec<u32> = ids.iter().copied().filter(|id| id % 2 == 0).collect();
        for &id in &removed {
            prop_assert!(set.remove(id));
        }
        prop_assert_eq!(set.len(), ids.len() - removed.len());
        for &id in &ids {
            prop_assert_eq!(set.contains(id), id % 2 != 0);
        }
    }
}
