// SPDX-License-Identifier: Apache-2.0

//! Pacing/cwnd gain selection (§4.9).
//!
//! Gains come from two incompatible scales: `BBR_SCALE` (per-mode pacing
//! gain table) and `BW_SCALE` (the fairness-ratio-derived cwnd gain, and
//! `DRAIN`'s cwnd gain). `Gain` tags which scale a value is in so callers in
//! [`super::cwnd`]/[`super::pacing`] never have to guess which shift to
//! apply.
use crate::{
    fixed_point::{clamp_u32, mul_shr, narrow_u128, BBR_SCALE, BW_SCALE},
    recovery::{bandwidth::BandwidthEstimator, constants::*, phase::Mode, state::ConnectionState},
};

/// A gain value tagged with the fixed-point scale it's expressed in.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Gain {
    /// `BBR_SCALE` (2^8) units; unity is [`crate::fixed_point::BBR_UNIT`].
    Bbr(u32),
    /// `BW_SCALE` (2^24) units; unity is [`crate::fixed_point::BW_UNIT`].
    Bw(u32),
}

impl Gain {
    /// Applies this gain to `value`, a plain (unscaled) quantity, returning
    /// a plain quantity of the same unit as `value`.
    pub fn apply(self, value: u32) -> u32 {
        match self {
            Gain::Bbr(gain) => mul_shr(value, gain, BBR_SCALE),
            Gain::Bw(gain) => mul_shr(value, gain, BW_SCALE),
        }
    }

    /// The raw scaled value, regardless of which scale it's tagged with.
    pub(crate) fn raw(self) -> u32 {
        match self {
            Gain::Bbr(gain) => gain,
            Gain::Bw(gain) => gain,
        }
    }
}

pub(crate) struct GainSelector;

impl GainSelector {
    /// Sets `state.pacing_gain`/`state.cwnd_gain`/`state.gain` for the
    /// current mode, honouring `lt_use_bw`'s forced-unity override.
    pub(crate) fn update(state: &mut ConnectionState) {
        if state.lt_use_bw {
            state.pacing_gain = PACING_GAIN_START;
        } else {
            state.pacing_gain = match state.current_mode {
                Mode::Start => PACING_GAIN_START,
                Mode::ProbeBw => PACING_GAIN_PROBE_BW,
                Mode::Drain => PACING_GAIN_DRAIN,
                Mode::ProbeRtt => PACING_GAIN_PROBE_RTT,
            };
        }

        state.cwnd_gain = match state.current_mode {
            Mode::Drain => DRAIN_CWND_GAIN,
            _ => Self::cwnd_gain(state),
        };
        state.gain = state.cwnd_gain;
    }

    /// `spline_cwnd_gain`: `curr_ack * 2^24 / ((bw * 1e6) / rtt)`, clamped to
    /// `[CWND_GAIN_MIN, CWND_GAIN_MAX]`. Carried through as a single `u128`
    /// expression so the two nested divisions don't saturate early and
    /// distort the ratio.
    fn cwnd_gain(state: &ConnectionState) -> u32 {
        let bw = BandwidthEstimator::max_bw(state).max(1) as u128;
        let rtt = state.last_min_rtt.max(1) as u128;
        let bw_per_sec = ((bw * 1_000_000) / rtt).max(1);

        let raw = ((state.curr_ack as u128) << BW_SCALE) / bw_per_sec;
        clamp_u32(narrow_u128(raw), CWND_GAIN_MIN, CWND_GAIN_MAX)
    }

    /// The pacing gain's scale tag, for use by [`super::pacing`].
    pub(crate) fn pacing_gain(state: &ConnectionState) -> Gain {
        Gain::Bbr(state.pacing_gain)
    }

    /// The cwnd gain's scale tag, for use by [`super::cwnd`]. `Drain` uses
    /// `BW_SCALE`; every other mode's cwnd gain is also expressed in
    /// `BW_SCALE` because it's derived from `fairness_rat`.
    pub(crate) fn cwnd_gain_tagged(state: &ConnectionState) -> Gain {
        Gain::Bw(state.cwnd_gain)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::time::{Ticks, Timestamp};

    fn state() -> ConnectionState {
        ConnectionState::new(unsafe { Timestamp::from_duration(core::time::Duration::from_secs(1)) }, Ticks::ZERO)
    }

    #[test]
    fn drain_uses_fixed_bw_scale_cwnd_gain() {
        let mut state = state();
        state.current_mode = Mode::Drain;
        GainSelector::update(&mut state);
        assert_eq!(state.cwnd_gain, DRAIN_CWND_GAIN);
        assert_eq!(state.pacing_gain, PACING_GAIN_DRAIN);
    }

    #[test]
    fn lt_use_bw_forces_unity_pacing_gain() {
        let mut state = state();
        state.current_mode = Mode::ProbeBw;
        state.lt_use_bw = true;
        GainSelector::update(&mut state);
        assert_eq!(state.pacing_gain, PACING_GAIN_START);
    }

    #[test]
    fn cwnd_gain_is_clamped_to_bounds() {
        // A zero curr_ack drives the raw ratio to 0, under CWND_GAIN_MIN.
        let mut low_state = state();
        low_state.curr_ack = 0;
        GainSelector::update(&mut low_state);
        assert_eq!(low_state.cwnd_gain, CWND_GAIN_MIN);

        // loss_cnt past the trust threshold pins max_bw to state.bw, so a
        // tiny bw against a huge curr_ack/rtt ratio overshoots CWND_GAIN_MAX.
        let mut high_state = state();
        high_state.bw = 1;
        high_state.last_min_rtt = 1;
        high_state.curr_ack = u32::MAX;
        high_state.loss_cnt = crate::counter::Counter::new(LOSS_CNT_TRUST_FILTERED_ONLY);
        GainSelector::update(&mut high_state);
        assert_eq!(high_state.cwnd_gain, CWND_GAIN_MAX);
    }

    #[test]
    fn gain_apply_uses_the_tagged_scale() {
        let bbr = Gain::Bbr(crate::fixed_point::BBR_UNIT * 2);
        assert_eq!(bbr.apply(100), 200);

        let bw = Gain::Bw(crate::fixed_point::BW_UNIT / 2);
        assert_eq!(bw.apply(100), 50);
    }
}
