//! Backtracking search for a k-way equal-sum partition.
//!
//! Elements are placed largest first, so an impossible branch overflows a
//! bucket early. Buckets are only tracked by their running sum while the
//! search runs; the assignment stack remembers which bucket every placed
//! element went to, which is enough to rebuild the groups once all buckets
//! hit the target.
//!
//! Pruning:
//! 1. a bucket whose sum would exceed the target is never tried
//! 2. a bucket holding the same sum as a lower bucket is skipped, the lower
//!    one already explored that exact subtree (covers all the empty buckets)
//!
//! The recursion is unrolled into the assignment stack, so deep inputs don't
//! touch the call stack.

use std::cmp::Reverse;

use tracing::{debug, trace};

use crate::{
    error::Result,
    exhaustive,
    target::Precheck,
    types::{Element, Infeasibility, Outcome, Partition, Steps, Strategy},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Solver {
    k: usize,
    step_budget: Option<Steps>,
    strategy: Strategy,
}

impl Solver {
    pub fn new(k: usize) -> Self {
        Self {
            k,
            step_budget: None,
            strategy: Strategy::default(),
        }
    }

    /// Give up with [`Outcome::Inconclusive`] after `steps` placements
    pub fn with_step_budget(mut self, steps: Steps) -> Self {
        self.step_budget = Some(steps);
        self
    }

    pub fn with_strategy(mut self, strategy: Strategy) -> Self {
        self.strategy = strategy;
        self
    }

    pub fn k(&self) -> usize {
        self.k
    }

    pub fn solve(&self, elements: &[Element]) -> Result<Outcome> {
        let precheck = Precheck::new(elements, self.k)?;
        let target = match precheck.feasible_target() {
            Ok(target) => target,
            Err(reason) => {
                debug!(%reason, "rejected without searching");
                return Ok(Outcome::Infeasible(reason));
            }
        };
        trace!(
            k = self.k,
            n = elements.len(),
            target,
            strategy = ?self.strategy,
            "searching"
        );

        let outcome = match self.strategy {
            Strategy::Backtrack => Search::new(elements, self.k, target).run(self.step_budget),
            Strategy::Exhaustive => {
                exhaustive::search(elements, self.k, target, self.step_budget)
            }
        };
        match &outcome {
            Outcome::Partitioned(partition) => {
                debug!(steps = partition.steps(), %partition, "partitioned")
            }
            Outcome::Infeasible(reason) => debug!(%reason, "infeasible"),
            Outcome::Inconclusive { steps } => debug!(steps, "step budget exhausted"),
        }
        Ok(outcome)
    }
}

struct Search {
    /// descending
    sorted: Vec<Element>,
    buckets: Vec<Element>,
    target: Element,
}

impl Search {
    fn new(elements: &[Element], k: usize, target: Element) -> Self {
        let mut sorted = elements.to_vec();
        sorted.sort_unstable_by_key(|element| Reverse(*element));
        Self {
            sorted,
            buckets: vec![0; k],
            target,
        }
    }

    fn run(mut self, budget: Option<Steps>) -> Outcome {
        let mut assignment: Vec<usize> = Vec::with_capacity(self.sorted.len());
        let mut steps: Steps = 0;
        // first bucket index still untried at the current depth
        let mut from = 0;

        loop {
            let depth = assignment.len();
            let candidate = match self.sorted.get(depth).copied() {
                Some(element) => self
                    .next_bucket(element, from)
                    .map(|bucket| (element, bucket)),
                None if self.is_complete() => {
                    return Outcome::Partitioned(self.into_partition(&assignment, steps));
                }
                // all placed but some bucket short, can't happen while the
                // total is k * target and no bucket exceeds it
                None => None,
            };

            match candidate {
                Some((element, bucket)) => {
                    if budget.is_some_and(|budget| steps >= budget) {
                        return Outcome::Inconclusive { steps };
                    }
                    steps += 1;
                    self.buckets[bucket] += element;
                    assignment.push(bucket);
                    from = 0;
                }
                None => {
                    let Some(bucket) = assignment.pop() else {
                        return Outcome::Infeasible(Infeasibility::Exhausted { steps });
                    };
                    self.buckets[bucket] -= self.sorted[assignment.len()];
                    trace!(depth = assignment.len(), bucket, "backtrack");
                    from = bucket + 1;
                }
            }
        }
    }

    fn next_bucket(&self, element: Element, from: usize) -> Option<usize> {
        (from..self.buckets.len()).find(|&idx| {
            let sum = self.buckets[idx];
            sum + element <= self.target && !self.buckets[..idx].contains(&sum)
        })
    }

    fn is_complete(&self) -> bool {
        self.buckets.iter().all(|sum| *sum == self.target)
    }

    fn into_partition(self, assignment: &[usize], steps: Steps) -> Partition {
        let mut groups = vec![Vec::new(); self.buckets.len()];
        for (element, bucket) in self.sorted.into_iter().zip(assignment) {
            groups[*bucket].push(element);
        }
        Partition::new(groups, self.target, steps)
    }
}

#[cfg(test)]
mod test {
    use itertools::Itertools;
    use proptest::prelude::*;
    use rstest::rstest;

    use super::{Search, Solver};
    use crate::{
        error::Error,
        exhaustive,
        types::{Element, Infeasibility, Outcome, Strategy as SearchStrategy},
    };

    fn assert_valid_witness(elements: &[Element], k: usize, outcome: &Outcome) {
        let partition = outcome.partition().expect("expected a partition");
        assert_eq!(partition.k(), k);
        for group in partition.groups() {
            assert_eq!(group.iter().sum::<Element>(), partition.target());
        }
        let placed = partition.groups().iter().flatten().copied().sorted().collect_vec();
        let given = elements.iter().copied().sorted().collect_vec();
        assert_eq!(placed, given);
    }

    #[rstest]
    #[case(vec![1, 1, 2, 2, 2], 4, true)]
    #[case(vec![3, 3, 3, 3, 4], 4, false)]
    #[case(vec![1, 1, 1, 1], 4, true)]
    #[case(vec![5], 1, true)]
    #[case(vec![5, 5], 3, false)]
    #[case(vec![10, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1], 4, false)]
    #[case(vec![4, 3, 3, 2, 2, 1], 3, true)]
    #[case(vec![5, 4, 4, 3, 2, 2], 4, false)]
    #[case(vec![12, 12, 12, 12, 12, 12, 12, 12, 12, 12, 12, 12, 60], 4, false)]
    #[case(vec![5, 5, 5, 5, 4, 4, 4, 4, 3, 3, 3, 3], 4, true)]
    fn known_scenarios(#[case] elements: Vec<Element>, #[case] k: usize, #[case] expected: bool) {
        for strategy in [SearchStrategy::Backtrack, SearchStrategy::Exhaustive] {
            let outcome = Solver::new(k)
                .with_strategy(strategy)
                .solve(&elements)
                .unwrap();
            assert_eq!(outcome.is_feasible(), Some(expected), "{strategy:?}");
            if expected {
                assert_valid_witness(&elements, k, &outcome);
            }
        }
    }

    #[test]
    fn oversized_is_rejected_without_search() {
        let outcome = Solver::new(4)
            .solve(&[10, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1])
            .unwrap();
        assert_eq!(
            outcome,
            Outcome::Infeasible(Infeasibility::Oversized {
                element: 10,
                target: 5
            })
        );
    }

    #[test]
    fn exhausted_search_reports_steps() {
        // 4 then three 3s fill the buckets once; every retry lands in a bucket
        // equal to a lower one and is skipped
        let outcome = Solver::new(4).solve(&[3, 3, 3, 3, 4]).unwrap();
        assert_eq!(
            outcome,
            Outcome::Infeasible(Infeasibility::Exhausted { steps: 4 })
        );
    }

    #[test]
    fn equal_sums_are_tried_once() {
        let search = Search {
            sorted: vec![3],
            buckets: vec![2, 2, 0, 2],
            target: 5,
        };
        assert_eq!(search.next_bucket(3, 0), Some(0));
        // bucket 1 repeats bucket 0, bucket 3 repeats both
        assert_eq!(search.next_bucket(3, 1), Some(2));
        assert_eq!(search.next_bucket(3, 3), None);
        // too big for every non-empty bucket
        assert_eq!(search.next_bucket(4, 0), Some(2));
    }

    #[test]
    fn solver_keeps_its_partition_count() {
        let solver = Solver::new(3).with_step_budget(10);
        assert_eq!(solver.k(), 3);
        let outcome = solver.solve(&[4, 3, 3, 2, 2, 1]).unwrap();
        assert_eq!(outcome.partition().unwrap().k(), solver.k());
    }

    #[test]
    fn witness_groups_follow_bucket_order() {
        let outcome = Solver::new(4).solve(&[1, 2, 1, 2, 2]).unwrap();
        let partition = outcome.partition().unwrap();
        assert_eq!(
            partition.groups(),
            &[vec![2], vec![2], vec![2], vec![1, 1]]
        );
        assert_eq!(partition.to_string(), "{2} {2} {2} {1+1}");
        // one placement per element, no backtracking needed
        assert_eq!(partition.steps(), 5);
    }

    #[rstest]
    #[case(1)]
    #[case(2)]
    #[case(3)]
    #[case(4)]
    #[case(5)]
    fn empty_input_is_partitioned(#[case] k: usize) {
        let outcome = Solver::new(k).solve(&[]).unwrap();
        let partition = outcome.partition().unwrap();
        assert_eq!(partition.k(), k);
        assert_eq!(partition.target(), 0);
        assert!(partition.groups().iter().all(|group| group.is_empty()));
        assert_eq!(partition.steps(), 0);
    }

    #[test]
    fn invalid_arguments() {
        assert_eq!(Solver::new(0).solve(&[1, 2]), Err(Error::ZeroPartitions));
        assert_eq!(
            Solver::new(2).solve(&[1, 0]),
            Err(Error::NonPositiveElement { index: 1 })
        );
    }

    #[test]
    fn zero_budget_is_inconclusive() {
        let outcome = Solver::new(4)
            .with_step_budget(0)
            .solve(&[1, 1, 2, 2, 2])
            .unwrap();
        assert_eq!(outcome, Outcome::Inconclusive { steps: 0 });
        assert_eq!(outcome.is_feasible(), None);
    }

    #[test]
    fn budget_stops_hard_instance() {
        // every element needs at least one placement
        let elements = (1..=24).collect_vec();
        let outcome = Solver::new(4).with_step_budget(10).solve(&elements).unwrap();
        assert_eq!(outcome, Outcome::Inconclusive { steps: 10 });
    }

    #[test]
    fn generous_budget_matches_unbounded() {
        let elements = [5, 5, 5, 5, 4, 4, 4, 4, 3, 3, 3, 3];
        let bounded = Solver::new(4)
            .with_step_budget(1_000_000)
            .solve(&elements)
            .unwrap();
        let unbounded = Solver::new(4).solve(&elements).unwrap();
        assert_eq!(bounded, unbounded);
    }

    #[test]
    fn long_input_does_not_recurse() {
        let elements = vec![1; 100_000];
        let outcome = Solver::new(4).solve(&elements).unwrap();
        assert_eq!(outcome.is_feasible(), Some(true));
        assert_eq!(outcome.partition().unwrap().target(), 25_000);
    }

    #[test]
    fn single_partition_takes_everything() {
        let elements = [9, 3, 7, 1];
        let outcome = Solver::new(1).solve(&elements).unwrap();
        assert_eq!(outcome.partition().unwrap().groups(), &[vec![9, 7, 3, 1]]);
    }

    fn elements_and_k() -> impl Strategy<Value = (Vec<Element>, usize)> {
        (prop::collection::vec(1..12u64, 0..10), 1..5usize)
    }

    proptest! {
        #[test]
        fn agrees_with_exhaustive((elements, k) in elements_and_k()) {
            let outcome = Solver::new(k).solve(&elements).unwrap();
            let reference = exhaustive::feasible(&elements, k).unwrap();
            prop_assert_eq!(outcome.is_feasible(), Some(reference));
        }

        #[test]
        fn witness_is_a_partition((elements, k) in elements_and_k()) {
            let outcome = Solver::new(k).solve(&elements).unwrap();
            if outcome.is_feasible() == Some(true) {
                assert_valid_witness(&elements, k, &outcome);
            }
        }

        #[test]
        fn order_does_not_matter((elements, k) in elements_and_k()) {
            let forward = Solver::new(k).solve(&elements).unwrap();
            let reversed = elements.iter().rev().copied().collect_vec();
            let backward = Solver::new(k).solve(&reversed).unwrap();
            prop_assert_eq!(forward.is_feasible(), backward.is_feasible());
            // both sort first, so even the witness matches
            prop_assert_eq!(forward, backward);
        }

        #[test]
        fn deterministic((elements, k) in elements_and_k()) {
            let solver = Solver::new(k);
            prop_assert_eq!(solver.solve(&elements).unwrap(), solver.solve(&elements).unwrap());
        }

        #[test]
        fn single_partition_always_fits(elements in prop::collection::vec(1..1000u64, 1..30)) {
            prop_assert_eq!(Solver::new(1).solve(&elements).unwrap().is_feasible(), Some(true));
        }

        #[test]
        fn indivisible_total_is_infeasible((elements, k) in elements_and_k()) {
            let total: Element = elements.iter().sum();
            prop_assume!(total % k as Element != 0);
            prop_assert_eq!(Solver::new(k).solve(&elements).unwrap().is_feasible(), Some(false));
        }
    }
}
