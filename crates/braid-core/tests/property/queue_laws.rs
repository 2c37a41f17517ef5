//! Properties of the persistent occurrence queue.
//!
//! The reference semantics for extraction is a stable sort by time over
//! the arrival order. Every law here must hold for arbitrary contents,
//! including time ties and value-equal duplicates, and for arbitrary
//! construction histories.

use std::sync::Arc;

use braid_core::changes::Changes;
use braid_core::event::{Event, EventRef};
use braid_core::occurrence::Occurrence;
use braid_core::queue::Occurrences;
use braid_core::time::{Duration, Time};
use proptest::prelude::*;

/// Inert event distinguished only by its id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
struct Stamp(u32);

impl Event<()> for Stamp {
    fn affect(&self, (): &(), _at: Time) -> Changes<()> {
        Changes::none()
    }
}

type Entry = (i64, u32);

fn occurrence(entry: Entry) -> Occurrence<()> {
    let (tick, id) = entry;
    let event: EventRef<()> = Arc::new(Stamp(id));
    Occurrence::new(Time::EPOCH.after(Duration::new(tick)), event)
}

fn queue_of(entries: &[Entry]) -> Occurrences<()> {
    Occurrences::new().with_new(entries.iter().copied().map(occurrence))
}

fn drain(mut queue: Occurrences<()>) -> Vec<Occurrence<()>> {
    let mut drained = Vec::new();
    while let Some(next) = queue.next_occurrence() {
        drained.push(next);
        queue = queue.without_next_occurrence();
    }
    drained
}

/// Stable sort by tick over arrival order: the reference extraction
/// order.
fn stable_sorted(entries: &[Entry]) -> Vec<Occurrence<()>> {
    let mut sorted = entries.to_vec();
    sorted.sort_by_key(|&(tick, _)| tick);
    sorted.into_iter().map(occurrence).collect()
}

// Small tick and id spaces force time ties and value-equal duplicates.
fn entry() -> impl Strategy<Value = Entry> {
    (-50i64..50, 0u32..6)
}

fn entries() -> impl Strategy<Value = Vec<Entry>> {
    prop::collection::vec(entry(), 0..40)
}

fn non_empty_entries() -> impl Strategy<Value = Vec<Entry>> {
    prop::collection::vec(entry(), 1..40)
}

/// Batch entries draw from an id space disjoint from `entry()`, so
/// removing the batch can only ever match batch entries.
fn disjoint_batch() -> impl Strategy<Value = Vec<Entry>> {
    prop::collection::vec((-50i64..50, 100u32..106), 0..20)
}

/// A non-empty entry vector plus a valid index into it.
fn entries_with_victim() -> impl Strategy<Value = (Vec<Entry>, usize)> {
    non_empty_entries().prop_flat_map(|picked| {
        let len = picked.len();
        (Just(picked), 0..len)
    })
}

proptest! {
    /// Extraction drains by time, ties in insertion order.
    #[test]
    fn prop_extraction_is_stable_time_sort(entries in entries()) {
        prop_assert_eq!(drain(queue_of(&entries)), stable_sorted(&entries));
    }

    /// The head of the queue is the head of the reference order, and
    /// reading it repeatedly always gives the same answer.
    #[test]
    fn prop_next_occurrence_matches_reference_head(entries in entries()) {
        let queue = queue_of(&entries);
        let head = stable_sorted(&entries).into_iter().next();
        prop_assert_eq!(queue.next_occurrence(), head.clone());
        prop_assert_eq!(queue.next_occurrence(), head);
    }

    /// Deriving new snapshots never changes the source snapshot.
    #[test]
    fn prop_snapshots_are_isolated(entries in entries(), batch in disjoint_batch()) {
        let queue = queue_of(&entries);
        let before = drain(queue.clone());

        let _expanded = queue.with_new(batch.iter().copied().map(occurrence));
        let _shrunk = queue.without_next_occurrence();

        prop_assert_eq!(drain(queue), before);
    }

    /// Adding a batch and then removing that batch restores the
    /// original snapshot, including tie order.
    #[test]
    fn prop_add_remove_round_trip(entries in entries(), batch in disjoint_batch()) {
        let queue = queue_of(&entries);
        let expanded = queue.with_new(batch.iter().copied().map(occurrence));
        prop_assert_eq!(expanded.without(batch.iter().copied().map(occurrence)), queue);
    }

    /// `without` removes exactly the earliest-inserted entry matching
    /// the given occurrence by value.
    #[test]
    fn prop_without_removes_earliest_match((entries, victim) in entries_with_victim()) {
        let target = entries[victim];
        let queue = queue_of(&entries);

        let mut expected = entries.clone();
        let first = expected.iter().position(|&entry| entry == target).unwrap();
        expected.remove(first);

        prop_assert_eq!(drain(queue.without([occurrence(target)])), stable_sorted(&expected));
    }

    /// Removing the head through either API yields the same snapshot.
    #[test]
    fn prop_without_next_matches_general_form(entries in entries()) {
        let queue = queue_of(&entries);
        prop_assert_eq!(
            queue.without_next_occurrence(),
            queue.without(queue.next_occurrence()),
        );
    }

    /// Value-equal snapshots behave identically regardless of the
    /// history that produced them.
    #[test]
    fn prop_equality_is_history_independent(entries in entries()) {
        let scaffold = occurrence((-1000, 0));
        let direct = queue_of(&entries);
        let via_scaffold = queue_of(&entries)
            .with_new([scaffold.clone()])
            .without([scaffold]);

        prop_assert_eq!(&direct, &via_scaffold);
        prop_assert_eq!(direct.next_occurrence(), via_scaffold.next_occurrence());
        prop_assert_eq!(drain(direct), drain(via_scaffold));
    }

    /// Iteration yields exactly the extraction order, with an exact
    /// size.
    #[test]
    fn prop_iteration_matches_extraction(entries in entries()) {
        let queue = queue_of(&entries);
        prop_assert_eq!(queue.iter().len(), entries.len());

        let iterated: Vec<_> = queue.iter().collect();
        prop_assert_eq!(iterated, drain(queue));
    }

    /// `at` slices exactly the entries scheduled at that time, in
    /// insertion order.
    #[test]
    fn prop_at_slices_by_exact_time(entries in entries(), probe in -50i64..50) {
        let queue = queue_of(&entries);
        let expected: Vec<_> = entries
            .iter()
            .copied()
            .filter(|&(tick, _)| tick == probe)
            .map(occurrence)
            .collect();
        prop_assert_eq!(queue.at(Time::EPOCH.after(Duration::new(probe))), expected);
    }

    /// Length tracks content through derivations.
    #[test]
    fn prop_len_tracks_content(entries in entries()) {
        let queue = queue_of(&entries);
        prop_assert_eq!(queue.len(), entries.len());
        prop_assert_eq!(queue.is_empty(), entries.is_empty());
        prop_assert_eq!(
            queue.without_next_occurrence().len(),
            entries.len().saturating_sub(1),
        );
    }
}
