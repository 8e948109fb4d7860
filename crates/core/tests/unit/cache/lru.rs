//! LRU Victim Finder Tests.
//!
//! The LRU finder is stateless: it scans the recency queue from least to most
//! recently used, preferring free blocks, then unlocked blocks, then the front of
//! the queue.

use pretty_assertions::assert_eq;
use rstest::rstest;
use waysel_core::{Block, LruVictimFinder, Set, VictimFinder};

use crate::common::{FREE, LIVE, PINNED, PINNED_FREE, flags, set_with_queue};

// ══════════════════════════════════════════════════════════
// 1. Selection order
// ══════════════════════════════════════════════════════════

#[rstest]
#[case::free_slot_wins_over_lru(&[LIVE, FREE, LIVE, LIVE], &[0, 1, 2, 3], Some(1))]
#[case::first_free_in_queue_order(&[LIVE, FREE, LIVE, FREE], &[3, 2, 1, 0], Some(3))]
#[case::locked_free_slot_is_not_free(&[LIVE, PINNED_FREE, LIVE], &[1, 2, 0], Some(2))]
#[case::plain_lru(&[LIVE, LIVE, LIVE, LIVE], &[2, 0, 3, 1], Some(2))]
#[case::skips_locked_lru(&[PINNED, LIVE, LIVE, LIVE], &[0, 3, 1, 2], Some(3))]
#[case::all_locked_falls_back_to_front(&[PINNED, PINNED, PINNED], &[1, 2, 0], Some(1))]
#[case::all_locked_free_falls_back_to_front(&[PINNED_FREE, PINNED_FREE], &[1, 0], Some(1))]
#[case::single_way(&[LIVE], &[0], Some(0))]
fn selects_expected_way(
    #[case] ways: &[(bool, bool)],
    #[case] queue: &[usize],
    #[case] expected: Option<usize>,
) {
    let mut set = set_with_queue(ways, queue);
    assert_eq!(LruVictimFinder::new().find_victim(&mut set), expected);
}

/// Associativity zero is a configuration error in the caller; the finder reports it as `None`.
#[test]
fn empty_set_yields_none() {
    let mut set = Set::new(0, 0);
    assert_eq!(LruVictimFinder::new().find_victim(&mut set), None);
}

/// A recently touched block moves out of the victim position.
#[test]
fn touch_shifts_victim() {
    let mut set = set_with_queue(&[LIVE, LIVE, LIVE], &[0, 1, 2]);
    let mut lru = LruVictimFinder::new();

    assert_eq!(lru.find_victim(&mut set), Some(0));
    set.touch(0);
    assert_eq!(lru.find_victim(&mut set), Some(1));
    set.touch(1);
    assert_eq!(lru.find_victim(&mut set), Some(2));
}

// ══════════════════════════════════════════════════════════
// 2. No side effects
// ══════════════════════════════════════════════════════════

#[test]
fn leaves_set_untouched() {
    let mut set = set_with_queue(&[LIVE, PINNED, FREE, PINNED_FREE], &[3, 1, 0, 2]);
    let before = set.clone();

    let mut lru = LruVictimFinder::new();
    let _ = lru.find_victim(&mut set);
    let mut block = set.blocks()[0].clone();
    lru.on_hit(&mut block);
    lru.on_fill(&mut block);
    lru.reset();

    assert_eq!(set, before);
    assert_eq!(flags(&set), flags(&before));
}

/// Repeated calls on the same snapshot agree.
#[test]
fn deterministic() {
    let set = set_with_queue(&[LIVE, LIVE, PINNED, LIVE], &[2, 3, 1, 0]);
    let first = LruVictimFinder::select(&set);
    for _ in 0..8 {
        assert_eq!(LruVictimFinder::select(&set), first);
    }
    assert_eq!(first, Some(3));
}

/// Victims are reported by their position in the set, whatever ids the blocks were built with.
#[rstest]
#[case::free_pass(&[LIVE, FREE, LIVE], &[0, 1, 2], Some(1))]
#[case::unlocked_pass(&[PINNED, LIVE, LIVE], &[0, 2, 1], Some(2))]
fn victim_is_way_position(
    #[case] ways: &[(bool, bool)],
    #[case] queue: &[usize],
    #[case] expected: Option<usize>,
) {
    let blocks = ways
        .iter()
        .map(|&(valid, locked)| {
            let mut block = Block::new(5, 7);
            block.is_valid = valid;
            block.is_locked = locked;
            block
        })
        .collect();
    let mut set = Set::from_parts(0, blocks, queue.to_vec()).unwrap();

    let victim = LruVictimFinder::new().find_victim(&mut set);
    assert_eq!(victim, expected);
    let way = victim.unwrap();
    assert_eq!(set.block(way).map(Block::way_id), Some(way));
}
