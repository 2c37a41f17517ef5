//! The persistent occurrence queue.
//!
//! [`Occurrences`] is a snapshot value: every mutator returns a new queue
//! and leaves the receiver untouched, so a driver can hold many timeline
//! branches at once and step each independently. Snapshots derived from
//! one another share structure, which keeps a derived queue cheap no
//! matter how large the shared part is.
//!
//! # Implementation
//!
//! Entries live in a weight-balanced binary search tree in the style of
//! Adams' bounded-balance trees (delta 3, ratio 2), keyed by
//! `(time, insertion sequence)` and with nodes behind [`Arc`]. A mutator
//! copies only the path it touches, `O(log n)` nodes, and shares the
//! rest with its ancestor snapshot. Subtree sizes are cached on nodes,
//! so [`Occurrences::len`] is `O(1)` and rebalancing needs no extra
//! bookkeeping.
//!
//! # Tie-breaking
//!
//! Every entry is stamped with a sequence number drawn from a counter
//! carried on the queue, assigned once at insertion and preserved through
//! every derived snapshot. Entries at equal times therefore keep their
//! insertion order forever, which makes [`Occurrences::next_occurrence`]
//! deterministic: value-equal snapshots always agree on which occurrence
//! is next, no matter the history that produced them.

use std::cmp::Ordering;
use std::fmt;
use std::iter::FusedIterator;
use std::sync::Arc;

use crate::event::EventRef;
use crate::occurrence::Occurrence;
use crate::time::Time;

/// Maximum weight ratio between siblings before a rotation.
const DELTA: usize = 3;

/// Chooses between a single and a double rotation.
const RATIO: usize = 2;

type Link<State> = Option<Arc<Node<State>>>;

struct Node<State: 'static> {
    time: Time,
    seq: u64,
    event: EventRef<State>,
    size: usize,
    left: Link<State>,
    right: Link<State>,
}

/// An immutable priority queue of occurrences, ordered by time.
///
/// The queue is a persistent value. [`Occurrences::with_new`],
/// [`Occurrences::without`], and [`Occurrences::without_next_occurrence`]
/// return derived snapshots and never touch the receiver; reads never
/// allocate. Duplicate `(time, event)` entries are kept as distinct
/// entries, and entries at the same time come out in insertion order.
///
/// Equality compares contents in queue order and ignores the internal
/// sequence stamps, so a freshly built queue equals any derived queue
/// holding the same occurrences in the same tie order.
pub struct Occurrences<State: 'static> {
    root: Link<State>,
    next_seq: u64,
}

impl<State: 'static> Occurrences<State> {
    /// The empty queue.
    pub const fn new() -> Self {
        Self {
            root: None,
            next_seq: 0,
        }
    }

    /// The occurrence with the earliest time, or `None` when empty.
    ///
    /// Ties at the earliest time go to the entry inserted first. Repeated
    /// calls, and calls on value-equal snapshots, return the same answer.
    pub fn next_occurrence(&self) -> Option<Occurrence<State>> {
        self.root.as_deref().map(|root| {
            let node = min_node(root);
            Occurrence::new(node.time, EventRef::clone(&node.event))
        })
    }

    /// All occurrences scheduled at exactly `time`, in insertion order.
    ///
    /// Empty when nothing is scheduled at that time. The order is stable:
    /// value-equal snapshots return the same sequence.
    pub fn at(&self, time: Time) -> Vec<Occurrence<State>> {
        let mut found = Vec::new();
        collect_at(&self.root, time, &mut found);
        found
    }

    /// A snapshot with the given occurrences added.
    ///
    /// This is multiset union: occurrences equal to already-present ones
    /// are kept as additional distinct entries, never deduplicated. New
    /// entries tie-break after existing entries at the same time, in
    /// iteration order.
    #[must_use]
    pub fn with_new(&self, occurrences: impl IntoIterator<Item = Occurrence<State>>) -> Self {
        let mut root = self.root.clone();
        let mut next_seq = self.next_seq;
        for occurrence in occurrences {
            root = Some(insert(&root, occurrence.time(), next_seq, occurrence.event()));
            next_seq = next_seq.saturating_add(1);
        }
        Self { root, next_seq }
    }

    /// A snapshot with the given occurrences removed.
    ///
    /// Each given occurrence removes at most one entry, matched by value
    /// equality on `(time, event)`. When several entries match, the one
    /// inserted earliest is removed; the remaining entries keep their
    /// relative order. A given occurrence with no matching entry is
    /// skipped silently, so independently authored removals compose.
    #[must_use]
    pub fn without(&self, occurrences: impl IntoIterator<Item = Occurrence<State>>) -> Self {
        let mut root = self.root.clone();
        for occurrence in occurrences {
            let Some(seq) = earliest_match(&root, occurrence.time(), occurrence.event()) else {
                continue;
            };
            root = delete(&root, occurrence.time(), seq);
        }
        Self {
            root,
            next_seq: self.next_seq,
        }
    }

    /// A snapshot with the earliest occurrence removed.
    ///
    /// Identical in result to removing [`Occurrences::next_occurrence`]
    /// through [`Occurrences::without`], but skips the search for a
    /// matching entry. On an empty queue this is the empty queue.
    #[must_use]
    pub fn without_next_occurrence(&self) -> Self {
        Self {
            root: match self.root.as_deref() {
                None => None,
                Some(root) => delete_min(root),
            },
            next_seq: self.next_seq,
        }
    }

    /// Iterate all occurrences in queue order: by time, ties in insertion
    /// order. The order is stable across value-equal snapshots, which
    /// makes scans such as "collect every occurrence of event X" safe to
    /// feed back into [`Occurrences::without`].
    pub fn iter(&self) -> Iter<'_, State> {
        Iter::new(self)
    }

    /// Number of entries in the queue.
    pub fn len(&self) -> usize {
        link_size(&self.root)
    }

    /// Whether the queue holds no entries.
    pub const fn is_empty(&self) -> bool {
        self.root.is_none()
    }
}

impl<State: 'static> Default for Occurrences<State> {
    fn default() -> Self {
        Self::new()
    }
}

impl<State: 'static> Clone for Occurrences<State> {
    fn clone(&self) -> Self {
        Self {
            root: self.root.clone(),
            next_seq: self.next_seq,
        }
    }
}

impl<State: 'static> fmt::Debug for Occurrences<State> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.iter()).finish()
    }
}

impl<State: 'static> PartialEq for Occurrences<State> {
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len()
            && self.iter().zip(other.iter()).all(|(ours, theirs)| ours == theirs)
    }
}

impl<State: 'static> Eq for Occurrences<State> {}

impl<State: 'static> FromIterator<Occurrence<State>> for Occurrences<State> {
    fn from_iter<I: IntoIterator<Item = Occurrence<State>>>(occurrences: I) -> Self {
        Self::new().with_new(occurrences)
    }
}

impl<'a, State: 'static> IntoIterator for &'a Occurrences<State> {
    type Item = Occurrence<State>;
    type IntoIter = Iter<'a, State>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// In-order traversal of a queue snapshot.
///
/// Yields owned [`Occurrence`]s (the event handles are shared, not
/// copied) sorted by `(time, insertion order)`.
pub struct Iter<'a, State: 'static> {
    stack: Vec<&'a Node<State>>,
    remaining: usize,
}

impl<'a, State: 'static> Iter<'a, State> {
    fn new(queue: &'a Occurrences<State>) -> Self {
        let mut iter = Self {
            stack: Vec::new(),
            remaining: queue.len(),
        };
        iter.descend(queue.root.as_deref());
        iter
    }

    fn descend(&mut self, mut link: Option<&'a Node<State>>) {
        while let Some(node) = link {
            self.stack.push(node);
            link = node.left.as_deref();
        }
    }
}

impl<State: 'static> Iterator for Iter<'_, State> {
    type Item = Occurrence<State>;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.stack.pop()?;
        self.remaining = self.remaining.saturating_sub(1);
        self.descend(node.right.as_deref());
        Some(Occurrence::new(node.time, EventRef::clone(&node.event)))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<State: 'static> ExactSizeIterator for Iter<'_, State> {
    fn len(&self) -> usize {
        self.remaining
    }
}

impl<State: 'static> FusedIterator for Iter<'_, State> {}

fn link_size<State: 'static>(link: &Link<State>) -> usize {
    link.as_deref().map_or(0, |node| node.size)
}

fn make<State: 'static>(
    time: Time,
    seq: u64,
    event: EventRef<State>,
    left: Link<State>,
    right: Link<State>,
) -> Arc<Node<State>> {
    let size = link_size(&left)
        .saturating_add(link_size(&right))
        .saturating_add(1);
    Arc::new(Node {
        time,
        seq,
        event,
        size,
        left,
        right,
    })
}

/// Build a node and restore the weight invariant with at most one single
/// or double rotation. Only valid when `left` and `right` were balanced
/// and the weight of one side has changed by at most one entry.
///
/// The unreachable fallback arms rebuild the node unrotated; ordering
/// and content never depend on balance, only lookup cost does.
fn balanced_make<State: 'static>(
    time: Time,
    seq: u64,
    event: EventRef<State>,
    left: Link<State>,
    right: Link<State>,
) -> Arc<Node<State>> {
    let left_size = link_size(&left);
    let right_size = link_size(&right);
    if left_size.saturating_add(right_size) <= 1 {
        make(time, seq, event, left, right)
    } else if right_size > DELTA.saturating_mul(left_size) {
        rotate_left(time, seq, event, left, right)
    } else if left_size > DELTA.saturating_mul(right_size) {
        rotate_right(time, seq, event, left, right)
    } else {
        make(time, seq, event, left, right)
    }
}

fn rotate_left<State: 'static>(
    time: Time,
    seq: u64,
    event: EventRef<State>,
    left: Link<State>,
    right: Link<State>,
) -> Arc<Node<State>> {
    match right.as_deref() {
        Some(right_node) => {
            if link_size(&right_node.left) < RATIO.saturating_mul(link_size(&right_node.right)) {
                single_left(time, seq, event, left, right_node)
            } else {
                double_left(time, seq, event, left, right_node)
            }
        }
        None => make(time, seq, event, left, None),
    }
}

fn single_left<State: 'static>(
    time: Time,
    seq: u64,
    event: EventRef<State>,
    left: Link<State>,
    right_node: &Node<State>,
) -> Arc<Node<State>> {
    let inner = make(time, seq, event, left, right_node.left.clone());
    make(
        right_node.time,
        right_node.seq,
        EventRef::clone(&right_node.event),
        Some(inner),
        right_node.right.clone(),
    )
}

fn double_left<State: 'static>(
    time: Time,
    seq: u64,
    event: EventRef<State>,
    left: Link<State>,
    right_node: &Node<State>,
) -> Arc<Node<State>> {
    match right_node.left.as_deref() {
        Some(pivot) => {
            let new_left = make(time, seq, event, left, pivot.left.clone());
            let new_right = make(
                right_node.time,
                right_node.seq,
                EventRef::clone(&right_node.event),
                pivot.right.clone(),
                right_node.right.clone(),
            );
            make(
                pivot.time,
                pivot.seq,
                EventRef::clone(&pivot.event),
                Some(new_left),
                Some(new_right),
            )
        }
        None => single_left(time, seq, event, left, right_node),
    }
}

fn rotate_right<State: 'static>(
    time: Time,
    seq: u64,
    event: EventRef<State>,
    left: Link<State>,
    right: Link<State>,
) -> Arc<Node<State>> {
    match left.as_deref() {
        Some(left_node) => {
            if link_size(&left_node.right) < RATIO.saturating_mul(link_size(&left_node.left)) {
                single_right(time, seq, event, left_node, right)
            } else {
                double_right(time, seq, event, left_node, right)
            }
        }
        None => make(time, seq, event, None, right),
    }
}

fn single_right<State: 'static>(
    time: Time,
    seq: u64,
    event: EventRef<State>,
    left_node: &Node<State>,
    right: Link<State>,
) -> Arc<Node<State>> {
    let inner = make(time, seq, event, left_node.right.clone(), right);
    make(
        left_node.time,
        left_node.seq,
        EventRef::clone(&left_node.event),
        left_node.left.clone(),
        Some(inner),
    )
}

fn double_right<State: 'static>(
    time: Time,
    seq: u64,
    event: EventRef<State>,
    left_node: &Node<State>,
    right: Link<State>,
) -> Arc<Node<State>> {
    match left_node.right.as_deref() {
        Some(pivot) => {
            let new_left = make(
                left_node.time,
                left_node.seq,
                EventRef::clone(&left_node.event),
                left_node.left.clone(),
                pivot.left.clone(),
            );
            let new_right = make(time, seq, event, pivot.right.clone(), right);
            make(
                pivot.time,
                pivot.seq,
                EventRef::clone(&pivot.event),
                Some(new_left),
                Some(new_right),
            )
        }
        None => single_right(time, seq, event, left_node, right),
    }
}

fn insert<State: 'static>(
    link: &Link<State>,
    time: Time,
    seq: u64,
    event: &EventRef<State>,
) -> Arc<Node<State>> {
    match link.as_deref() {
        None => make(time, seq, EventRef::clone(event), None, None),
        Some(node) => {
            if (time, seq) < (node.time, node.seq) {
                balanced_make(
                    node.time,
                    node.seq,
                    EventRef::clone(&node.event),
                    Some(insert(&node.left, time, seq, event)),
                    node.right.clone(),
                )
            } else {
                balanced_make(
                    node.time,
                    node.seq,
                    EventRef::clone(&node.event),
                    node.left.clone(),
                    Some(insert(&node.right, time, seq, event)),
                )
            }
        }
    }
}

fn min_node<State: 'static>(node: &Node<State>) -> &Node<State> {
    let mut current = node;
    while let Some(left) = current.left.as_deref() {
        current = left;
    }
    current
}

/// Remove the minimum entry of a non-empty subtree.
fn delete_min<State: 'static>(node: &Node<State>) -> Link<State> {
    match node.left.as_deref() {
        None => node.right.clone(),
        Some(left) => Some(balanced_make(
            node.time,
            node.seq,
            EventRef::clone(&node.event),
            delete_min(left),
            node.right.clone(),
        )),
    }
}

/// Remove the entry with exactly this `(time, seq)` key, if present.
fn delete<State: 'static>(link: &Link<State>, time: Time, seq: u64) -> Link<State> {
    let node = link.as_deref()?;
    let rebuilt = match (time, seq).cmp(&(node.time, node.seq)) {
        Ordering::Less => balanced_make(
            node.time,
            node.seq,
            EventRef::clone(&node.event),
            delete(&node.left, time, seq),
            node.right.clone(),
        ),
        Ordering::Greater => balanced_make(
            node.time,
            node.seq,
            EventRef::clone(&node.event),
            node.left.clone(),
            delete(&node.right, time, seq),
        ),
        Ordering::Equal => return glue(&node.left, &node.right),
    };
    Some(rebuilt)
}

/// Join two subtrees whose parent was removed. Every key in `left` is
/// smaller than every key in `right`.
fn glue<State: 'static>(left: &Link<State>, right: &Link<State>) -> Link<State> {
    match (left.as_deref(), right.as_deref()) {
        (None, _) => right.clone(),
        (_, None) => left.clone(),
        (Some(_), Some(right_node)) => {
            let successor = min_node(right_node);
            Some(balanced_make(
                successor.time,
                successor.seq,
                EventRef::clone(&successor.event),
                left.clone(),
                delete_min(right_node),
            ))
        }
    }
}

/// The sequence stamp of the earliest-inserted entry matching the given
/// `(time, event)` by value, if any.
fn earliest_match<State: 'static>(
    link: &Link<State>,
    time: Time,
    event: &EventRef<State>,
) -> Option<u64> {
    let node = link.as_deref()?;
    match node.time.cmp(&time) {
        Ordering::Greater => earliest_match(&node.left, time, event),
        Ordering::Less => earliest_match(&node.right, time, event),
        Ordering::Equal => earliest_match(&node.left, time, event)
            .or_else(|| node.event.dyn_eq(event.as_ref()).then_some(node.seq))
            .or_else(|| earliest_match(&node.right, time, event)),
    }
}

fn collect_at<State: 'static>(link: &Link<State>, time: Time, found: &mut Vec<Occurrence<State>>) {
    let Some(node) = link.as_deref() else {
        return;
    };
    match node.time.cmp(&time) {
        Ordering::Greater => collect_at(&node.left, time, found),
        Ordering::Less => collect_at(&node.right, time, found),
        Ordering::Equal => {
            collect_at(&node.left, time, found);
            found.push(Occurrence::new(node.time, EventRef::clone(&node.event)));
            collect_at(&node.right, time, found);
        }
    }
}
