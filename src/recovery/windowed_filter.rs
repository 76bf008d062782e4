// SPDX-License-Identifier: Apache-2.0

use core::marker::PhantomData;

/// Tracks the minimum or maximum value seen over a configurable time period
/// specified by `window_length`.
///
/// Based on https://git.kernel.org/pub/scm/linux/kernel/git/torvalds/linux.git/commit/?id=f672258391b42a5c7cc2732c9c063e56a85c8dbe
#[derive(Clone, Debug)]
pub(crate) struct WindowedFilter<T, TimeType, DurationType, FilterType> {
    current_value: Option<T>,
    last_updated: Option<TimeType>,
    window_length: DurationType,
    filter: PhantomData<FilterType>,
}

pub(crate) trait Filter<T> {
    /// Returns true if the `new` value should replace the `current` value
    fn supersedes(new: T, current: Option<T>) -> bool;
}

#[derive(Clone, Debug)]
pub(crate) struct MaxFilter;
#[derive(Clone, Debug)]
pub(crate) struct MinFilter;

impl<T: core::cmp::PartialOrd> Filter<T> for MaxFilter {
    fn supersedes(new: T, current: Option<T>) -> bool {
        current.map_or(true, |current| new >= current)
    }
}

impl<T: core::cmp::PartialOrd> Filter<T> for MinFilter {
    fn supersedes(new: T, current: Option<T>) -> bool {
        current.map_or(true, |current| new <= current)
    }
}

/// Filter that maintains the maximum value seen over the window
pub(crate) type WindowedMaxFilter<T, TimeType, DurationType> =
    WindowedFilter<T, TimeType, DurationType, MaxFilter>;
/// Filter that maintains the minimum value seen over the window
pub(crate) type WindowedMinFilter<T, TimeType, DurationType> =
    WindowedFilter<T, TimeType, DurationType, MinFilter>;

impl<
        T: Copy + PartialOrd,
        TimeType: Copy + PartialOrd + core::ops::Sub<Output = DurationType>,
        DurationType: PartialOrd,
        FilterType: Filter<T>,
    > WindowedFilter<T, TimeType, DurationType, FilterType>
{
    /// Constructs a new `WindowedFilter` with the specified `window_length`
    pub fn new(window_length: DurationType) -> Self {
        Self {
            current_value: None,
            last_updated: None,
            window_length,
            filter: Default::default(),
        }
    }

    /// Updates the `WindowedFilter` with the given sample.
    ///
    /// If `new_sample` supersedes the current value according to the
    /// `Filter`, or the current value has expired according to the window
    /// length and `now`, the new sample becomes the current value.
    ///
    /// `now` must be monotonically increasing, unless `TimeType` supports
    /// wrapping (such as `core::num::Wrapping`).
    pub fn update(&mut self, new_sample: T, now: TimeType) {
        let current_value_expired = self.last_updated.map_or(true, |last_updated| {
            now - last_updated >= self.window_length
        });

        if current_value_expired || FilterType::supersedes(new_sample, self.current_value) {
            self.current_value = Some(new_sample);
            self.last_updated = Some(now);
        }
    }

    /// Returns the current value if one has been recorded yet
    pub fn value(&self) -> Option<T> {
        self.current_value
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn max_filter() {
        let mut filter = WindowedMaxFilter::new(10);

        assert_eq!(None, filter.value());

        let mut now = 0;
        filter.update(7, now);
        assert_eq!(Some(7), filter.value());

        now += 1;
        filter.update(8, now);
        assert_eq!(Some(8), filter.value());

        now += 9;
        filter.update(4, now);
        assert_eq!(Some(8), filter.value());

        now += 1;
        filter.update(4, now);
        assert_eq!(Some(4), filter.value());
    }

    #[test]
    fn min_filter_respects_window_expiry() {
        let mut filter = WindowedMinFilter::new(10);

        let mut now = 0;
        filter.update(7, now);
        now += 5;
        filter.update(3, now);
        assert_eq!(Some(3), filter.value());

        now += 9;
        filter.update(4, now);
        assert_eq!(Some(3), filter.value());

        now += 1;
        filter.update(4, now);
        assert_eq!(Some(4), filter.value());
    }
}
