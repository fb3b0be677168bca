#![forbid(unsafe_code)]

//! Sibling ordering.

use crate::ids::ArticleId;
use std::cmp::{Ordering, Reverse};

/// Sequence for an article appended after siblings whose largest sequence is
/// `max`. The first sibling gets 0.
pub fn next_sequence(max: Option<i64>) -> i64 {
    max.map_or(0, |value| value + 1)
}

/// Sequences for `count` articles appended in order to the same parent.
pub fn append_sequences(max: Option<i64>, count: usize) -> Vec<i64> {
    (next_sequence(max)..).take(count).collect()
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SiblingSlot {
    pub id: ArticleId,
    pub sequence: i64,
    /// Set for the article(s) written by the current operation.
    pub just_written: bool,
    pub updated_at_ms: i64,
}

fn slot_order(a: &SiblingSlot, b: &SiblingSlot) -> Ordering {
    (a.sequence, Reverse(a.just_written), Reverse(a.updated_at_ms), Reverse(a.id)).cmp(&(
        b.sequence,
        Reverse(b.just_written),
        Reverse(b.updated_at_ms),
        Reverse(b.id),
    ))
}

/// Resolves duplicate sequences among siblings.
///
/// Siblings are ordered by sequence; ties go to the article just written,
/// then the most recently modified, then the highest id. From the first
/// duplicate on, every later sibling is renumbered consecutively starting
/// right after the duplicated value. Returns only the slots that change.
pub fn resequence(mut siblings: Vec<SiblingSlot>) -> Vec<(ArticleId, i64)> {
    siblings.sort_by(slot_order);
    let Some(first_dup) = siblings
        .windows(2)
        .position(|pair| pair[0].sequence == pair[1].sequence)
    else {
        return Vec::new();
    };

    let mut next = siblings[first_dup].sequence + 1;
    let mut changes = Vec::new();
    for slot in &siblings[first_dup + 1..] {
        if slot.sequence != next {
            changes.push((slot.id, next));
        }
        next += 1;
    }
    changes
}

#[cfg(test)]
mod tests {
    use super::*;

    fn slot(id: i64, sequence: i64, just_written: bool, updated_at_ms: i64) -> SiblingSlot {
        SiblingSlot {
            id: ArticleId::new(id),
            sequence,
            just_written,
            updated_at_ms,
        }
    }

    #[test]
    fn appended_siblings_count_from_zero() {
        assert_eq!(next_sequence(None), 0);
        assert_eq!(next_sequence(Some(4)), 5);
        assert_eq!(append_sequences(None, 4), vec![0, 1, 2, 3]);
        assert_eq!(append_sequences(Some(2), 2), vec![3, 4]);
    }

    #[test]
    fn no_duplicates_means_no_changes() {
        assert!(resequence(vec![slot(1, 0, false, 0), slot(2, 3, false, 0)]).is_empty());
        assert!(resequence(Vec::new()).is_empty());
    }

    #[test]
    fn just_written_article_takes_the_contested_slot() {
        let changes = resequence(vec![
            slot(1, 0, false, 10),
            slot(2, 1, false, 10),
            slot(3, 2, false, 10),
            slot(4, 1, true, 5),
        ]);
        // 4 keeps 1; 2 and 3 shift down.
        assert_eq!(changes, vec![(ArticleId::new(2), 2), (ArticleId::new(3), 3)]);
    }

    #[test]
    fn ties_fall_back_to_recency_then_id() {
        let changes = resequence(vec![
            slot(1, 0, false, 10),
            slot(2, 0, false, 20),
            slot(3, 0, false, 20),
        ]);
        // Order: 3 (newest, higher id), 2, 1.
        assert_eq!(changes, vec![(ArticleId::new(2), 1), (ArticleId::new(1), 2)]);
    }

    #[test]
    fn renumbering_starts_at_the_first_duplicate() {
        let changes = resequence(vec![
            slot(1, 0, false, 0),
            slot(2, 5, false, 0),
            slot(3, 5, true, 0),
            slot(4, 9, false, 0),
        ]);
        assert_eq!(changes, vec![(ArticleId::new(2), 6), (ArticleId::new(4), 7)]);
    }
}
