use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

/// Rejected input. An input that simply cannot be partitioned is not an
/// error, see [`crate::Outcome::Infeasible`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    #[error("partition count must be at least 1")]
    ZeroPartitions,
    #[error("element at index {index} is not positive")]
    NonPositiveElement { index: usize },
    #[error("sum of elements does not fit in a u64")]
    Overflow,
}
