// SPDX-License-Identifier: MPL-2.0
//! Quality step domains.

use std::fmt;

/// The finite, ordered set of legal quality levels of a codec.
///
/// A domain is an arithmetic progression walked either upwards
/// (`0, 1, …, 100`, or `0, 5, …, 100` with a step of 5) or downwards
/// (`51, 50, …, 0`). Levels between two steps are not members. The order
/// matters: the default quality of a codec is the element in the middle
/// of the sequence, and [`QualitySteps::iter`] yields levels in domain
/// order.
///
/// # Example
///
/// ```
/// use codec_adapter::domain::codec::QualitySteps;
///
/// let steps = QualitySteps::descending(51, 0);
/// assert_eq!(steps.len(), 52);
/// assert_eq!(steps.iter().next(), Some(51));
/// assert!(steps.contains(0));
/// assert!(!steps.contains(52));
///
/// let coarse = QualitySteps::stepped(0, 100, 5);
/// assert_eq!(coarse.len(), 21);
/// assert!(coarse.contains(45));
/// assert!(!coarse.contains(43));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QualitySteps {
    first: i32,
    last: i32,
    step: i32,
}

#[allow(clippy::len_without_is_empty)] // a domain always holds at least one level
impl QualitySteps {
    /// Creates the domain `low, low + 1, …, high`.
    ///
    /// # Panics
    ///
    /// Panics if `low > high`.
    #[must_use]
    pub const fn ascending(low: i32, high: i32) -> Self {
        assert!(low <= high, "ascending quality domain must have low <= high");
        Self::stepped(low, high, 1)
    }

    /// Creates the domain `high, high - 1, …, low`.
    ///
    /// # Panics
    ///
    /// Panics if `high < low`.
    #[must_use]
    pub const fn descending(high: i32, low: i32) -> Self {
        assert!(high >= low, "descending quality domain must have high >= low");
        Self::stepped(high, low, 1)
    }

    /// Creates the domain `first, first ± step, …` towards `last`.
    ///
    /// The direction follows from `first` and `last`. When `last` is not
    /// reachable in whole steps the domain ends at the last level before it.
    ///
    /// # Panics
    ///
    /// Panics if `step` is not positive.
    #[must_use]
    pub const fn stepped(first: i32, last: i32, step: i32) -> Self {
        assert!(step > 0, "quality step must be positive");
        let span = (last as i64 - first as i64).abs();
        let reach = span - span % step as i64;
        let last = if last >= first {
            first as i64 + reach
        } else {
            first as i64 - reach
        };
        Self {
            first,
            last: last as i32,
            step,
        }
    }

    /// First level in domain order.
    #[must_use]
    pub fn first(self) -> i32 {
        self.first
    }

    /// Last level in domain order.
    #[must_use]
    pub fn last(self) -> i32 {
        self.last
    }

    /// Distance between neighbouring levels.
    #[must_use]
    pub fn step(self) -> i32 {
        self.step
    }

    /// Returns true if the domain walks downwards.
    #[must_use]
    pub fn is_descending(self) -> bool {
        self.first > self.last
    }

    /// Number of levels in the domain.
    #[must_use]
    pub fn len(self) -> usize {
        let span = (i64::from(self.first) - i64::from(self.last)).unsigned_abs();
        (span / u64::from(self.step.unsigned_abs())) as usize + 1
    }

    /// Returns true if `quality` is a member of the domain.
    #[must_use]
    pub fn contains(self, quality: i32) -> bool {
        let (low, high) = if self.is_descending() {
            (self.last, self.first)
        } else {
            (self.first, self.last)
        };
        let offset = (i64::from(quality) - i64::from(self.first)).abs();
        (low..=high).contains(&quality) && offset % i64::from(self.step) == 0
    }

    /// Returns the level at `index` in domain order.
    #[must_use]
    pub fn nth(self, index: usize) -> Option<i32> {
        if index >= self.len() {
            return None;
        }
        let offset = i32::try_from(index).ok()?.checked_mul(self.step)?;
        Some(if self.is_descending() {
            self.first - offset
        } else {
            self.first + offset
        })
    }

    /// The element in the middle of the sequence (index `len / 2`).
    #[must_use]
    pub fn midpoint(self) -> i32 {
        self.nth(self.len() / 2).unwrap_or(self.first)
    }

    /// Iterates the levels in domain order.
    pub fn iter(self) -> impl Iterator<Item = i32> {
        (0..self.len()).filter_map(move |index| self.nth(index))
    }
}

impl fmt::Display for QualitySteps {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}..={}", self.first, self.last)?;
        if self.step != 1 {
            write!(f, " step {}", self.step)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ascending_domain_iterates_upwards() {
        let steps = QualitySteps::ascending(0, 100);
        let levels: Vec<_> = steps.iter().collect();
        assert_eq!(levels.len(), 101);
        assert_eq!(levels.first(), Some(&0));
        assert_eq!(levels.last(), Some(&100));
        assert!(levels.windows(2).all(|pair| pair[0] < pair[1]));
    }

    #[test]
    fn descending_domain_iterates_downwards() {
        let steps = QualitySteps::descending(51, 0);
        let levels: Vec<_> = steps.iter().collect();
        assert_eq!(levels.len(), 52);
        assert_eq!(levels[0], 51);
        assert_eq!(levels[51], 0);
        assert!(steps.is_descending());
    }

    #[test]
    fn contains_respects_both_directions() {
        let descending = QualitySteps::descending(63, 0);
        assert!(descending.contains(63));
        assert!(descending.contains(0));
        assert!(!descending.contains(64));
        assert!(!descending.contains(-1));

        let ascending = QualitySteps::ascending(1, 100);
        assert!(!ascending.contains(0));
        assert!(ascending.contains(1));
        assert!(ascending.contains(100));
    }

    #[test]
    fn midpoint_is_middle_element_in_domain_order() {
        assert_eq!(QualitySteps::ascending(0, 100).midpoint(), 50);
        assert_eq!(QualitySteps::ascending(1, 100).midpoint(), 51);
        assert_eq!(QualitySteps::descending(51, 0).midpoint(), 25);
        assert_eq!(QualitySteps::descending(63, 0).midpoint(), 31);
        assert_eq!(QualitySteps::ascending(7, 7).midpoint(), 7);
    }

    #[test]
    fn midpoint_is_always_a_member() {
        for steps in [
            QualitySteps::ascending(0, 100),
            QualitySteps::descending(51, 0),
            QualitySteps::descending(51, 1),
            QualitySteps::ascending(-5, 5),
        ] {
            assert!(steps.contains(steps.midpoint()), "{steps}");
        }
    }

    #[test]
    fn nth_out_of_range_is_none() {
        let steps = QualitySteps::descending(2, 0);
        assert_eq!(steps.nth(2), Some(0));
        assert_eq!(steps.nth(3), None);
    }

    #[test]
    fn display_shows_domain_order() {
        assert_eq!(QualitySteps::descending(51, 0).to_string(), "51..=0");
        assert_eq!(QualitySteps::stepped(0, 100, 5).to_string(), "0..=100 step 5");
    }

    #[test]
    fn stepped_ascending_domain_skips_between_levels() {
        let steps = QualitySteps::stepped(0, 100, 5);
        assert_eq!(steps.len(), 21);
        assert_eq!(steps.nth(1), Some(5));
        assert_eq!(steps.last(), 100);
        assert!(steps.contains(0));
        assert!(steps.contains(55));
        assert!(!steps.contains(3));
        assert!(!steps.contains(105));
        assert_eq!(steps.midpoint(), 50);
        assert!(steps.iter().all(|level| steps.contains(level)));
    }

    #[test]
    fn stepped_descending_domain_walks_down() {
        let steps = QualitySteps::stepped(51, 0, 3);
        let levels: Vec<_> = steps.iter().collect();
        assert_eq!(levels.len(), 18);
        assert_eq!(levels[0], 51);
        assert_eq!(levels[17], 0);
        assert!(steps.is_descending());
        assert!(steps.contains(24));
        assert!(!steps.contains(25));
        assert_eq!(steps.midpoint(), 24);
    }

    #[test]
    fn stepped_domain_ends_at_last_reachable_level() {
        let ascending = QualitySteps::stepped(0, 98, 5);
        assert_eq!(ascending.last(), 95);
        assert!(!ascending.contains(98));

        let descending = QualitySteps::stepped(10, 0, 4);
        assert_eq!(descending.last(), 2);
        assert_eq!(descending.iter().collect::<Vec<_>>(), vec![10, 6, 2]);
    }

    #[test]
    fn unit_step_constructors_match_stepped() {
        assert_eq!(QualitySteps::ascending(1, 100), QualitySteps::stepped(1, 100, 1));
        assert_eq!(QualitySteps::descending(63, 0), QualitySteps::stepped(63, 0, 1));
    }
}
