// SPDX-License-Identifier: Apache-2.0

//! RTT tracking (§4.3): smoothed/current/last RTT and the windowed minimum.

use crate::{
    recovery::{constants::*, state::ConnectionState},
    time::Ticks,
};

/// Ticks-per-second used to convert [`SCC_MIN_RTT_WIN`] into a tick count.
/// The host's jiffies rate is conventionally 1000 Hz (1ms ticks); hosts with a
/// different rate should scale this at the boundary before handing `Ticks` in.
const TICKS_PER_SEC: u32 = 1000;

/// Stateless RTT-tracking step, acting on [`ConnectionState`].
pub(crate) struct RttEstimator;

impl RttEstimator {
    /// Updates `curr_rtt`/`last_rtt`/`last_min_rtt` from the host's smoothed
    /// RTT and this sample's RTT measurement.
    pub(crate) fn update(
        state: &mut ConnectionState,
        srtt_us: u32,
        rtt_us_sample: u32,
        is_ack_delayed: bool,
        now: Ticks,
    ) {
        state.last_rtt = state.curr_rtt;

        state.curr_rtt = if srtt_us > 0 {
            state.has_seen_rtt = true;
            srtt_us / 8
        } else {
            MIN_RTT_US
        };

        Self::update_min_rtt(state, rtt_us_sample, is_ack_delayed, now);

        // Final clamp: the windowed minimum can never exceed the current
        // sample, and must never be zero.
        if state.last_min_rtt > state.curr_rtt {
            state.last_min_rtt = state.curr_rtt;
        }
        if state.last_min_rtt == 0 {
            state.last_min_rtt = MIN_RTT_US;
        }

        state.epp = state.epp.wrapping_add(1);
    }

    fn update_min_rtt(state: &mut ConnectionState, rtt_us_sample: u32, is_ack_delayed: bool, now: Ticks) {
        let window_ticks = SCC_MIN_RTT_WIN.as_secs() as u32 * TICKS_PER_SEC;
        let window_expired = now.saturating_since(state.last_min_rtt_stamp) >= window_ticks;

        let candidate = if rtt_us_sample > 0 && rtt_us_sample < state.last_min_rtt {
            Some(rtt_us_sample)
        } else if state.curr_rtt < state.last_min_rtt {
            Some(state.curr_rtt)
        } else if window_expired && !is_ack_delayed {
            Some(if rtt_us_sample > 0 {
                rtt_us_sample
            } else {
                state.curr_rtt
            })
        } else {
            None
        };

        if let Some(value) = candidate {
            state.last_min_rtt = value;
            state.last_min_rtt_stamp = now;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::time::Timestamp;

    fn state() -> ConnectionState {
        ConnectionState::new(unsafe { Timestamp::from_duration(core::time::Duration::from_secs(1)) }, Ticks::ZERO)
    }

    #[test]
    fn falls_back_to_min_rtt_when_no_srtt() {
        let mut state = state();
        RttEstimator::update(&mut state, 0, 0, false, Ticks::new(1));
        assert_eq!(state.curr_rtt, MIN_RTT_US);
    }

    #[test]
    fn min_rtt_never_zero_and_never_exceeds_curr_rtt() {
        let mut state = state();
        RttEstimator::update(&mut state, 8 * 50_000, 40_000, false, Ticks::new(1));
        assert!(state.last_min_rtt > 0);
        assert!(state.last_min_rtt <= state.curr_rtt);
        assert_eq!(state.last_min_rtt, 40_000);
    }

    #[test]
    fn window_expiry_refreshes_min_rtt_when_not_delayed() {
        let mut state = state();
        RttEstimator::update(&mut state, 8 * 50_000, 40_000, false, Ticks::new(1));
        let stamp_after_first = state.last_min_rtt_stamp;

        // A higher RTT sample after the window expires should refresh the
        // stamp even though it doesn't lower the minimum.
        let later = Ticks::new(1 + 10_000 + 1);
        RttEstimator::update(&mut state, 8 * 60_000, 60_000, false, later);
        assert_ne!(state.last_min_rtt_stamp, stamp_after_first);
    }
}
