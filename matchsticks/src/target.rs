use crate::{
    error::{Error, Result},
    types::{Element, Infeasibility},
};

/// Validated input totals, shared by every strategy so the fast rejections
/// happen before any search.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Precheck {
    pub total: Element,
    pub k: usize,
    pub largest: Element,
}

impl Precheck {
    pub fn new(elements: &[Element], k: usize) -> Result<Self> {
        if k == 0 {
            return Err(Error::ZeroPartitions);
        }
        if let Some(index) = elements.iter().position(|element| *element == 0) {
            return Err(Error::NonPositiveElement { index });
        }
        let total = elements
            .iter()
            .try_fold(0 as Element, |acc, element| acc.checked_add(*element))
            .ok_or(Error::Overflow)?;
        let largest = elements.iter().copied().max().unwrap_or(0);

        Ok(Self { total, k, largest })
    }

    /// `None` if the total does not split evenly into `k` buckets
    pub fn target(&self) -> Option<Element> {
        let k = self.k as Element;
        (self.total % k == 0).then(|| self.total / k)
    }

    /// The bucket target, or the reason the input is rejected without search.
    /// Divisibility is checked before the largest element.
    pub fn feasible_target(&self) -> std::result::Result<Element, Infeasibility> {
        let target = self.target().ok_or(Infeasibility::Indivisible {
            total: self.total,
            k: self.k,
        })?;
        if self.largest > target {
            return Err(Infeasibility::Oversized {
                element: self.largest,
                target,
            });
        }
        Ok(target)
    }
}
