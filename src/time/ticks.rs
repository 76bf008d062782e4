// SPDX-License-Identifier: Apache-2.0

//! A coarse, wrapping tick counter distinct from [`super::Timestamp`].
//!
//! Hosts that expose a jiffies-style clock (a 32-bit counter that wraps and
//! advances once per scheduler tick) hand it to the core as `Ticks` rather
//! than forcing a conversion to microseconds. Comparisons must go through
//! [`Ticks::after`] / [`Ticks::before`] rather than plain `<`/`>` so wraparound
//! is handled the same way the host's own jiffies comparisons are.

use core::fmt;

/// A monotonic, wrapping tick count, analogous to Linux's 32-bit jiffies.
#[derive(Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Ticks(u32);

impl fmt::Debug for Ticks {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "Ticks({})", self.0)
    }
}

impl Ticks {
    pub const ZERO: Ticks = Ticks(0);

    #[inline]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    #[inline]
    pub const fn get(self) -> u32 {
        self.0
    }

    /// True if `self` comes strictly after `other`, accounting for wraparound.
    #[inline]
    pub const fn after(self, other: Self) -> bool {
        (other.0.wrapping_sub(self.0) as i32) < 0
    }

    #[inline]
    pub const fn before(self, other: Self) -> bool {
        other.after(self)
    }

    /// Ticks elapsed since `earlier`, saturating at 0 if `earlier` is in the future.
    #[inline]
    pub const fn saturating_since(self, earlier: Self) -> u32 {
        if self.after(earlier) || self.0 == earlier.0 {
            self.0.wrapping_sub(earlier.0)
        } else {
            0
        }
    }

    #[inline]
    pub const fn wrapping_add(self, delta: u32) -> Self {
        Self(self.0.wrapping_add(delta))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wraparound_ordering() {
        let near_wrap = Ticks::new(u32::MAX);
        let after_wrap = Ticks::new(0);
        assert!(after_wrap.after(near_wrap));
        assert!(near_wrap.before(after_wrap));
        assert_eq!(after_wrap.saturating_since(near_wrap), 1);
    }

    #[test]
    fn saturates_when_earlier_is_ahead() {
        let earlier = Ticks::new(100);
        let now = Ticks::new(50);
        assert_eq!(now.saturating_since(earlier), 0);
    }
}
