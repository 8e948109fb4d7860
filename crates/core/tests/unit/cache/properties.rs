//! Victim Selection Properties.
//!
//! Randomised sets (associativity 1..=16, arbitrary validity, locks, recency order
//! and counter history) checked against the guarantees both policies make.

use proptest::prelude::*;
use waysel_core::cache::policies::srrip::{INSERT_RRPV, RRPV_MAX};
use waysel_core::{Block, LruVictimFinder, Set, SrripVictimFinder, VictimFinder};

use crate::common::{flags, set_with_queue};

/// Counter history applied to a block before the search.
#[derive(Debug, Clone, Copy)]
enum History {
    Untouched,
    Filled,
    Hit,
}

fn history() -> impl Strategy<Value = History> {
    prop_oneof![Just(History::Untouched), Just(History::Filled), Just(History::Hit)]
}

/// Per-way `(valid, locked, history)` plus a recency order.
fn arb_set() -> impl Strategy<Value = (Vec<(bool, bool, History)>, Vec<usize>)> {
    (1usize..=16).prop_flat_map(|n| {
        (
            prop::collection::vec((any::<bool>(), any::<bool>(), history()), n),
            Just((0..n).collect::<Vec<usize>>()).prop_shuffle(),
        )
    })
}

fn build(ways: &[(bool, bool, History)], queue: &[usize]) -> Set {
    let flags: Vec<(bool, bool)> = ways.iter().map(|&(v, l, _)| (v, l)).collect();
    set_with_queue(&flags, queue)
}

fn srrip_with_history(ways: &[(bool, bool, History)], set: &mut Set) -> SrripVictimFinder {
    let mut policy = SrripVictimFinder::new();
    for (way, &(_, _, h)) in ways.iter().enumerate() {
        let block = set.block_mut(way).unwrap();
        match h {
            History::Untouched => {}
            History::Filled => policy.on_fill(block),
            History::Hit => policy.on_hit(block),
        }
    }
    policy
}

/// Expected victim when the set still has free or unlocked blocks, by queue order.
fn first_in_queue(set: &Set, pred: impl Fn(&Block) -> bool) -> Option<usize> {
    set.iter_lru().find(|(_, b)| pred(b)).map(|(way, _)| way)
}

proptest! {
    #[test]
    fn lru_free_then_lru_then_front((ways, queue) in arb_set()) {
        let mut set = build(&ways, &queue);
        let victim = LruVictimFinder::new().find_victim(&mut set);

        let expected = first_in_queue(&set, |b| !b.is_valid && !b.is_locked)
            .or_else(|| first_in_queue(&set, |b| !b.is_locked))
            .unwrap_or(queue[0]);
        prop_assert_eq!(victim, Some(expected));
    }

    #[test]
    fn srrip_prefers_free_blocks((ways, queue) in arb_set()) {
        let mut set = build(&ways, &queue);
        let mut policy = srrip_with_history(&ways, &mut set);
        let free = first_in_queue(&set, |b| !b.is_valid && !b.is_locked);

        let victim = policy.find_victim(&mut set);
        if let Some(way) = free {
            prop_assert_eq!(victim, Some(way));
            prop_assert_eq!(policy.last_aging_rounds(), 0);
        }
    }

    #[test]
    fn srrip_respects_locks_and_terminates((ways, queue) in arb_set()) {
        let mut set = build(&ways, &queue);
        let mut policy = srrip_with_history(&ways, &mut set);
        let any_unlocked = set.blocks().iter().any(|b| !b.is_locked);
        let before = flags(&set);

        let victim = policy.find_victim(&mut set).unwrap();

        prop_assert!(policy.last_aging_rounds() <= u32::from(RRPV_MAX) + 1);
        prop_assert_eq!(flags(&set), before);
        if any_unlocked {
            prop_assert!(!set.blocks()[victim].is_locked);
            if set.blocks()[victim].is_valid {
                prop_assert_eq!(policy.rrpv(&set.blocks()[victim]), RRPV_MAX);
            }
        } else {
            prop_assert_eq!(victim, queue[0]);
        }
    }

    #[test]
    fn victims_name_blocks_of_the_set((ways, queue) in arb_set()) {
        let mut set = build(&ways, &queue);
        let lru = LruVictimFinder::new().find_victim(&mut set).unwrap();
        let mut policy = srrip_with_history(&ways, &mut set);
        let srrip = policy.find_victim(&mut set).unwrap();

        for way in [lru, srrip] {
            prop_assert_eq!(set.block(way).map(Block::way_id), Some(way));
        }
    }

    #[test]
    fn srrip_counters_stay_in_range((ways, queue) in arb_set(), searches in 1usize..6) {
        let mut set = build(&ways, &queue);
        let mut policy = srrip_with_history(&ways, &mut set);
        for _ in 0..searches {
            let _ = policy.find_victim(&mut set);
        }
        for block in set.blocks() {
            prop_assert!(policy.rrpv(block) <= RRPV_MAX);
        }
    }

    #[test]
    fn srrip_reset_restores_insert_value((ways, queue) in arb_set()) {
        let mut set = build(&ways, &queue);
        let mut policy = srrip_with_history(&ways, &mut set);
        let _ = policy.find_victim(&mut set);

        policy.reset();
        for block in set.blocks() {
            prop_assert!(!policy.is_tracked(block));
            prop_assert_eq!(policy.rrpv(block), INSERT_RRPV);
        }
    }
}
