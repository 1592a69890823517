use std::fmt::Display;

use itertools::Itertools;

pub type Element = u64;
/// number of tentative placements of an element into a bucket
pub type Steps = u64;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Strategy {
    /// sorted-descending depth first search with symmetry pruning
    #[default]
    Backtrack,
    /// layer by layer expansion of every distinct bucket state, see [`crate::exhaustive`]
    Exhaustive,
}

/// Why a well-formed input has no partition
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Infeasibility {
    /// total is not a multiple of k, no search was run
    Indivisible { total: Element, k: usize },
    /// a single element is larger than the target, no search was run
    Oversized { element: Element, target: Element },
    /// every bucket assignment was ruled out
    Exhausted { steps: Steps },
}

impl Display for Infeasibility {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Infeasibility::Indivisible { total, k } => {
                write!(f, "total {total} is not divisible by {k}")
            }
            Infeasibility::Oversized { element, target } => {
                write!(f, "element {element} exceeds the target {target}")
            }
            Infeasibility::Exhausted { steps } => {
                write!(f, "no partition found after {steps} steps")
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Partitioned(Partition),
    Infeasible(Infeasibility),
    /// the step budget ran out before the search was decided
    Inconclusive { steps: Steps },
}

impl Outcome {
    /// `None` if the search gave up
    pub fn is_feasible(&self) -> Option<bool> {
        match self {
            Outcome::Partitioned(_) => Some(true),
            Outcome::Infeasible(_) => Some(false),
            Outcome::Inconclusive { .. } => None,
        }
    }

    pub fn partition(&self) -> Option<&Partition> {
        match self {
            Outcome::Partitioned(partition) => Some(partition),
            _ => None,
        }
    }
}

/// A found partition: `k` groups that each sum to `target`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Partition {
    groups: Vec<Vec<Element>>,
    target: Element,
    steps: Steps,
}

impl Partition {
    pub(crate) fn new(groups: Vec<Vec<Element>>, target: Element, steps: Steps) -> Self {
        debug_assert!(groups
            .iter()
            .all(|group| group.iter().sum::<Element>() == target));
        Self {
            groups,
            target,
            steps,
        }
    }

    pub fn groups(&self) -> &[Vec<Element>] {
        &self.groups
    }

    pub fn target(&self) -> Element {
        self.target
    }

    pub fn k(&self) -> usize {
        self.groups.len()
    }

    pub fn steps(&self) -> Steps {
        self.steps
    }
}

impl Display for Partition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let groups = self
            .groups
            .iter()
            .map(|group| format!("{{{}}}", group.iter().join("+")))
            .join(" ");
        write!(f, "{groups}")
    }
}
