//! Reference solver: expand every bucket layout reachable after each element,
//! one element at a time, without any ordering heuristics.
//!
//! Layouts that only differ in the order of their buckets are merged after
//! every layer, otherwise the number of layouts grows as k^n. What is left is
//! still exponential in the worst case, so this is meant for small inputs and
//! for cross-checking [`crate::Solver`].

use std::cmp::Reverse;

use im::Vector;
use itertools::Itertools;
use tracing::trace;

use crate::{
    error::Result,
    target::Precheck,
    types::{Element, Infeasibility, Outcome, Partition, Steps},
};

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct Bucket {
    members: Vector<Element>,
    remaining: Element,
}

impl Bucket {
    fn empty(target: Element) -> Self {
        Self {
            members: Vector::new(),
            remaining: target,
        }
    }

    fn fits(&self, value: Element) -> bool {
        debug_assert_ne!(value, 0);
        value <= self.remaining
    }

    fn take(&self, value: Element) -> Self {
        debug_assert!(self.fits(value));
        let mut members = self.members.clone();
        members.push_back(value);
        Self {
            members,
            remaining: self.remaining - value,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Layout {
    buckets: Vector<Bucket>,
}

impl Layout {
    fn empty(k: usize, target: Element) -> Self {
        Self {
            buckets: (0..k).map(|_| Bucket::empty(target)).collect(),
        }
    }

    /// remaining capacities in ascending order, equal for layouts that are
    /// permutations of each other
    fn shape(&self) -> Vec<Element> {
        self.buckets
            .iter()
            .map(|bucket| bucket.remaining)
            .sorted_unstable()
            .collect_vec()
    }

    fn place(&self, idx: usize, value: Element) -> Self {
        Self {
            buckets: self.buckets.update(idx, self.buckets[idx].take(value)),
        }
    }

    fn is_complete(&self) -> bool {
        self.buckets.iter().all(|bucket| bucket.remaining == 0)
    }

    fn into_partition(self, target: Element, steps: Steps) -> Partition {
        let groups = self
            .buckets
            .iter()
            .map(|bucket| {
                bucket
                    .members
                    .iter()
                    .copied()
                    .sorted_unstable_by_key(|member| Reverse(*member))
                    .collect_vec()
            })
            .collect_vec();
        Partition::new(groups, target, steps)
    }
}

/// `elements` must already have passed [`Precheck`] with this `target`
pub(crate) fn search(
    elements: &[Element],
    k: usize,
    target: Element,
    budget: Option<Steps>,
) -> Outcome {
    let mut layouts = vec![Layout::empty(k, target)];
    let mut next_layouts = Vec::new();
    let mut steps: Steps = 0;

    for &element in elements {
        for layout in &layouts {
            for (idx, bucket) in layout.buckets.iter().enumerate() {
                if !bucket.fits(element) {
                    continue;
                }
                if budget.is_some_and(|budget| steps >= budget) {
                    return Outcome::Inconclusive { steps };
                }
                steps += 1;
                next_layouts.push(layout.place(idx, element));
            }
        }
        layouts.clear();
        layouts.extend(next_layouts.drain(..).unique_by(Layout::shape));
        trace!(element, layouts = layouts.len(), "expanded layer");

        if layouts.is_empty() {
            return Outcome::Infeasible(Infeasibility::Exhausted { steps });
        }
    }

    match layouts.into_iter().find(Layout::is_complete) {
        Some(layout) => Outcome::Partitioned(layout.into_partition(target, steps)),
        None => Outcome::Infeasible(Infeasibility::Exhausted { steps }),
    }
}

/// Unbounded feasibility check, independent of the backtracking search
pub fn feasible(elements: &[Element], k: usize) -> Result<bool> {
    let precheck = Precheck::new(elements, k)?;
    Ok(match precheck.feasible_target() {
        Ok(target) => matches!(
            search(elements, k, target, None),
            Outcome::Partitioned(_)
        ),
        Err(_) => false,
    })
}
