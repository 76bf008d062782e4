// SPDX-License-Identifier: Apache-2.0

//! Pacing rate computation (§4.11): gain applied to the bandwidth estimate,
//! capped by the host, and never allowed to regress while ramping up.

use crate::{
    fixed_point::{BBR_SCALE, BW_SCALE},
    recovery::{constants::PACING_MARGIN, gain::Gain, state::ConnectionState},
};

pub(crate) struct PacingRate;

impl PacingRate {
    /// Computes the next pacing rate, in bytes/sec, from `bw` (the same
    /// bandwidth estimate handed to [`super::cwnd::CwndEngine`]), `mss`, and
    /// the mode's pacing gain: `((bw * mss * gain) >> BBR_SCALE) * margin >>
    /// BW_SCALE`, where `margin` shaves the raw estimate to ~99%.
    ///
    /// During `Start` the rate is monotonically non-decreasing: a transient
    /// dip in the bandwidth sample must not throttle a sender that hasn't
    /// finished ramping up.
    pub(crate) fn update(
        state: &mut ConnectionState,
        pacing_gain: Gain,
        bw: u32,
        mss: u32,
        max_pacing_rate: u64,
        is_startup: bool,
    ) -> u64 {
        let gain = pacing_gain.raw() as u128;
        let scaled = ((bw as u128) * (mss as u128) * gain) >> BBR_SCALE;
        let with_margin = scaled.saturating_mul(PACING_MARGIN as u128);
        let rate_scaled = with_margin >> BW_SCALE;

        let mut rate = if rate_scaled > u64::MAX as u128 { u64::MAX } else { rate_scaled as u64 };

        if is_startup {
            rate = rate.max(state.pacing_rate);
        }

        if max_pacing_rate > 0 {
            rate = rate.min(max_pacing_rate);
        }

        state.pacing_rate = rate;
        rate
    }
}
