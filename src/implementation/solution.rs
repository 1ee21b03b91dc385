// Copyright 2020 Xavier Gillard
//
// Permission is hereby granted, free of charge, to any person obtaining a copy of
// this software and associated documentation files (the "Software"), to deal in
// the Software without restriction, including without limitation the rights to
// use, copy, modify, merge, publish, distribute, sublicense, and/or sell copies of
// the Software, and to permit persons to whom the Software is furnished to do so,
// subject to the following conditions:
//
// The above copyright notice and this permission notice shall be included in all
// copies or substantial portions of the Software.
//
// THE SOFTWARE IS PROVIDED "AS IS", WITHOUT WARRANTY OF ANY KIND, EXPRESS OR
// IMPLIED, INCLUDING BUT NOT LIMITED TO THE WARRANTIES OF MERCHANTABILITY, FITNESS
// FOR A PARTICULAR PURPOSE AND NONINFRINGEMENT. IN NO EVENT SHALL THE AUTHORS OR
// COPYRIGHT HOLDERS BE LIABLE FOR ANY CLAIM, DAMAGES OR OTHER LIABILITY, WHETHER
// IN AN ACTION OF CONTRACT, TORT OR OTHERWISE, ARISING FROM, OUT OF OR IN
// CONNECTION WITH THE SOFTWARE OR THE USE OR OTHER DEALINGS IN THE SOFTWARE.

//! Component C: a bounded, deduplicated, K-lowest-scoring pool of candidate
//! solutions (§4.3), backed by a max-heap on score so the current worst
//! kept solution is always a cheap peek away.

use std::cmp::Ordering;

use binary_heap_plus::BinaryHeap;
use compare::Compare;

use crate::Candidate;

/// One retained candidate, plus how many times an equivalent candidate
/// (same choices, end to end) was produced across merges.
#[derive(Clone, Debug, PartialEq)]
pub struct Solution {
    pub choices: Candidate,
    pub score: f64,
    pub times_seen: usize,
}

#[derive(Clone)]
struct WorstOnTop;
impl Compare<Solution> for WorstOnTop {
    fn compare(&self, a: &Solution, b: &Solution) -> Ordering {
        a.score.partial_cmp(&b.score).unwrap_or(Ordering::Equal)
    }
}

/// Keeps at most `capacity` solutions, always the lowest-scoring ones seen so
/// far, deduplicating by `choices` equality and accumulating `times_seen`.
pub struct SolutionSet {
    capacity: usize,
    heap: BinaryHeap<Solution, WorstOnTop>,
}

impl SolutionSet {
    pub fn new(capacity: usize) -> Self {
        SolutionSet {
            capacity,
            heap: BinaryHeap::from_vec_cmp(Vec::new(), WorstOnTop),
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.heap.len()
    }

    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }

    /// The score of the currently worst kept solution, or `None` if the set
    /// has not yet reached `capacity`. Useful to cheaply reject a candidate
    /// before paying for a full `absolute` recompute.
    pub fn worst_score(&self) -> Option<f64> {
        if self.heap.len() < self.capacity {
            None
        } else {
            self.heap.peek().map(|s| s.score)
        }
    }

    /// Merges one scored candidate into the set: bumps `times_seen` if an
    /// equivalent candidate is already kept, otherwise inserts it (evicting
    /// the current worst if the set is already at capacity and full).
    pub fn merge_one(&mut self, choices: Candidate, score: f64) {
        self.merge_one_with_count(choices, score, 1);
    }

    /// As `merge_one`, but the incoming candidate is itself already the
    /// aggregate of `seen` occurrences (used when merging refinement results
    /// that replace `times_seen` outright rather than adding to it).
    pub fn merge_one_with_count(&mut self, choices: Candidate, score: f64, seen: usize) {
        if self.capacity == 0 {
            return;
        }
        let mut items = self.drain_to_vec();

        if let Some(existing) = items.iter_mut().find(|s| s.choices == choices) {
            existing.times_seen += seen;
        } else if items.len() < self.capacity {
            items.push(Solution {
                choices,
                score,
                times_seen: seen,
            });
        } else {
            let worst_idx = items
                .iter()
                .enumerate()
                .max_by(|a, b| a.1.score.partial_cmp(&b.1.score).unwrap_or(Ordering::Equal))
                .map(|(i, _)| i)
                .expect("capacity > 0 implies items is non-empty once full");
            if score < items[worst_idx].score {
                items[worst_idx] = Solution {
                    choices,
                    score,
                    times_seen: seen,
                };
            }
        }

        self.heap = BinaryHeap::from_vec_cmp(items, WorstOnTop);
    }

    /// Merges every solution of `other` into `self`.
    pub fn merge_many(&mut self, other: &SolutionSet) {
        for s in other.heap.clone().into_vec() {
            self.merge_one_with_count(s.choices, s.score, s.times_seen);
        }
    }

    fn drain_to_vec(&mut self) -> Vec<Solution> {
        std::mem::replace(&mut self.heap, BinaryHeap::from_vec_cmp(Vec::new(), WorstOnTop)).into_vec()
    }

    /// Consumes the set, returning its solutions sorted best (lowest score)
    /// first.
    pub fn into_sorted_vec(self) -> Vec<Solution> {
        let mut v = self.heap.into_vec();
        v.sort_by(|a, b| a.score.partial_cmp(&b.score).unwrap_or(Ordering::Equal));
        v
    }
}

impl Clone for SolutionSet {
    fn clone(&self) -> Self {
        SolutionSet {
            capacity: self.capacity,
            heap: BinaryHeap::from_vec_cmp(self.heap.clone().into_vec(), WorstOnTop),
        }
    }
}

// ############################################################################
// #### TESTS #################################################################
// ############################################################################

#[cfg(test)]
mod test_solution_set {
    use super::*;

    #[test]
    fn keeps_only_the_k_lowest_scores() {
        let mut set = SolutionSet::new(2);
        set.merge_one(vec![0], 10.0);
        set.merge_one(vec![1], 5.0);
        set.merge_one(vec![2], 20.0);
        let kept = set.into_sorted_vec();
        assert_eq!(2, kept.len());
        assert_eq!(vec![1], kept[0].choices);
        assert_eq!(vec![0], kept[1].choices);
    }

    #[test]
    fn deduplicates_by_choices_and_accumulates_times_seen() {
        let mut set = SolutionSet::new(3);
        set.merge_one(vec![0, 1], 4.0);
        set.merge_one(vec![0, 1], 4.0);
        set.merge_one(vec![0, 1], 4.0);
        let kept = set.into_sorted_vec();
        assert_eq!(1, kept.len());
        assert_eq!(3, kept[0].times_seen);
    }

    #[test]
    fn worst_score_is_none_until_capacity_is_reached() {
        let mut set = SolutionSet::new(2);
        assert_eq!(None, set.worst_score());
        set.merge_one(vec![0], 9.0);
        assert_eq!(None, set.worst_score());
        set.merge_one(vec![1], 3.0);
        assert_eq!(Some(9.0), set.worst_score());
    }

    #[test]
    fn merge_many_combines_two_sets() {
        let mut a = SolutionSet::new(2);
        a.merge_one(vec![0], 1.0);
        a.merge_one(vec![1], 2.0);

        let mut b = SolutionSet::new(2);
        b.merge_one(vec![1], 2.0);
        b.merge_one(vec![2], 0.5);

        a.merge_many(&b);
        let kept = a.into_sorted_vec();
        assert_eq!(2, kept.len());
        assert_eq!(vec![2], kept[0].choices);
        assert_eq!(vec![1], kept[1].choices);
        assert_eq!(2, kept[1].times_seen);
    }

    #[test]
    fn merge_one_with_count_adds_its_count_to_an_existing_duplicate() {
        let mut set = SolutionSet::new(1);
        set.merge_one(vec![0], 5.0);
        set.merge_one(vec![0], 5.0);
        assert_eq!(2, set.heap.peek().unwrap().times_seen);

        // Merging an externally-aggregated duplicate (e.g. one produced by
        // another trajectory) still accumulates onto what is already kept;
        // replacing rather than adding is a choice the Monte-Carlo refinement
        // step makes before it ever calls into this set, not a SolutionSet rule.
        set.merge_one_with_count(vec![0], 5.0, 7);
        assert_eq!(9, set.heap.peek().unwrap().times_seen);
    }
}
