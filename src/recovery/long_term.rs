// SPDX-License-Identifier: Apache-2.0

//! Long-term (policed-link) bandwidth detector (§4.5).
//!
//! A traffic policer looks, from the sender's perspective, like a link that
//! delivers at a near-constant rate no matter how hard the sender probes,
//! shedding the excess as loss. `LongTermBwDetector` samples delivery rate
//! across loss events and, once two consecutive interval estimates agree,
//! locks pacing onto the averaged rate (`lt_bw`) instead of continuing to
//! probe.

use crate::{
    fixed_point::{div_or_floor_u32, BW_SCALE},
    log::trace_event,
    recovery::{constants::*, state::ConnectionState, state::LtPhase},
};

pub(crate) struct LongTermBwDetector;

impl LongTermBwDetector {
    /// Runs one step of the detector. Intended to be called once per rtt
    /// round (`state.round_start`).
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn update(
        state: &mut ConnectionState,
        losses: bool,
        is_app_limited: bool,
        host_delivered: u32,
        host_lost: u32,
        now_ms: u32,
        in_probe_bw: bool,
    ) {
        if state.lt_use_bw && matches!(state.lt_phase, LtPhase::Using) {
            state.pacing_gain = PACING_GAIN_START;
            if in_probe_bw {
                state.lt_rtt_cnt = state.lt_rtt_cnt.saturating_add(1);
                if state.lt_rtt_cnt as u32 > LT_BW_USE_ROUNDS as u32 {
                    Self::reset_to_idle(state);
                    trace_event!(debug, "spline.lt.exit_using");
                }
            }
            return;
        }

        if is_app_limited {
            if !matches!(state.lt_phase, LtPhase::Idle) {
                Self::reset_to_idle(state);
            }
            return;
        }

        if matches!(state.lt_phase, LtPhase::Idle) {
            if !losses {
                return;
            }
            Self::begin_sampling(state, host_delivered, host_lost, now_ms);
            trace_event!(debug, "spline.lt.begin_sampling");
            return;
        }

        // Sampling.
        state.lt_rtt_cnt = state.lt_rtt_cnt.saturating_add(1);
        if state.lt_rtt_cnt > LT_MAX_RTT_ROUNDS {
            Self::begin_sampling(state, host_delivered, host_lost, now_ms);
            return;
        }
        if state.lt_rtt_cnt < LT_MIN_RTT_ROUNDS {
            return;
        }

        let delivered = host_delivered.wrapping_sub(state.lt_last_delivered);
        let lost = host_lost.wrapping_sub(state.lt_last_lost);
        if delivered == 0
            || lost.saturating_mul(LT_LOSS_THRESH_DENOM) < delivered.saturating_mul(LT_LOSS_THRESH_NUM)
        {
            // Not enough loss yet to conclude; keep sampling.
            return;
        }

        let elapsed_ms = now_ms.wrapping_sub(state.lt_last_stamp);
        if elapsed_ms == 0 {
            // Excessive/degenerate interval; restart sampling rather than divide by zero.
            Self::begin_sampling(state, host_delivered, host_lost, now_ms);
            return;
        }
        let interval_us = elapsed_ms.saturating_mul(1000);
        let interval_bw = div_or_floor_u32((delivered as u64) << BW_SCALE, interval_us, MIN_BW);

        if state.lt_bw != 0 {
            let diff = interval_bw.abs_diff(state.lt_bw);
            let ratio_floor = state.lt_bw / LT_BW_RATIO_DENOM;
            if diff <= ratio_floor || diff <= LT_BW_DIFF_FLOOR {
                state.lt_bw = (state.lt_bw / 2).saturating_add(interval_bw / 2);
                state.lt_use_bw = true;
                state.lt_phase = LtPhase::Using;
                state.pacing_gain = PACING_GAIN_START;
                state.lt_rtt_cnt = 0;
                trace_event!(debug, "spline.lt.locked");
                return;
            }
        }

        state.lt_bw = interval_bw;
        Self::begin_sampling(state, host_delivered, host_lost, now_ms);
    }

    fn begin_sampling(state: &mut ConnectionState, host_delivered: u32, host_lost: u32, now_ms: u32) {
        state.lt_phase = LtPhase::Sampling;
        state.lt_rtt_cnt = 0;
        state.lt_last_stamp = now_ms;
        state.lt_last_delivered = host_delivered;
        state.lt_last_lost = host_lost;
    }

    fn reset_to_idle(state: &mut ConnectionState) {
        state.lt_phase = LtPhase::Idle;
        state.lt_use_bw = false;
        state.lt_bw = 0;
        state.lt_rtt_cnt = 0;
    }

    /// Invoked by `undo_cwnd`: rolls back an in-progress LT episode.
    pub(crate) fn undo(state: &mut ConnectionState) {
        Self::reset_to_idle(state);
    }
}
