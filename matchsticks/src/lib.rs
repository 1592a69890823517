//! Decide whether a multiset of positive integers splits into `k` subsets of
//! equal sum, e.g. whether a bundle of matchsticks can be laid out as a square.
//!
//! ```
//! assert!(matchsticks::make_square(&[1, 1, 2, 2, 2]).unwrap());
//! assert!(!matchsticks::solve(&[3, 3, 3, 3, 4], 4).unwrap());
//! ```

mod error;
pub mod exhaustive;
mod solver;
mod target;
mod types;

pub use error::{Error, Result};
pub use solver::Solver;
pub use types::{Element, Infeasibility, Outcome, Partition, Steps, Strategy};

/// number of sides of a square
pub const SQUARE_SIDES: usize = 4;

/// Whether `elements` can be split into `k` groups with the same sum.
/// Empty input is always splittable, into `k` empty groups.
pub fn solve(elements: &[Element], k: usize) -> Result<bool> {
    let outcome = Solver::new(k).solve(elements)?;
    Ok(matches!(outcome, Outcome::Partitioned(_)))
}

/// Whether all `sticks` together form the four sides of a square
pub fn make_square(sticks: &[Element]) -> Result<bool> {
    solve(sticks, SQUARE_SIDES)
}
