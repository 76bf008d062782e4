// SPDX-License-Identifier: Apache-2.0

//! Loss accounting and the loss-count-driven window backoff (§4.7).

use crate::recovery::{constants::*, state::ConnectionState};

pub(crate) struct LossAccounting;

impl LossAccounting {
    /// Updates `loss_cnt` from the delivered/lost deltas since the last
    /// long-term-detector interval boundary (`state.lt_last_delivered`/
    /// `state.lt_last_lost`, owned and advanced by
    /// [`super::long_term::LongTermBwDetector`]) and returns the trust factor
    /// for this step, `BW_SCALE` units.
    pub(crate) fn update(state: &mut ConnectionState, host_delivered: u32, host_lost: u32) -> u32 {
        let delivered = host_delivered.wrapping_sub(state.lt_last_delivered);
        let lost = host_lost.wrapping_sub(state.lt_last_lost);

        // loss ratio > 1/2048
        if lost.saturating_mul(256) > delivered / 8 {
            state.loss_cnt += 1u8;
        }
        if *state.loss_cnt > 1 && Self::trust_factor(state, lost) > THRESH_TF {
            state.loss_cnt -= 1u8;
        }

        Self::trust_factor(state, lost)
    }

    /// `percent_gain`: `(stable * 3/4 * 2^24) / ((last_lost + unfair) * 3/2)`,
    /// with `stable`/`unfair` floored at 1 so a brand-new connection (no
    /// votes yet) reads as moderately, not infinitely, trustworthy.
    fn trust_factor(state: &ConnectionState, last_lost: u32) -> u32 {
        let stable = (*state.stable_flag as u64).max(1);
        let unfair = (*state.unfair_flag as u64).max(1);

        let numerator = stable.saturating_mul(3).saturating_mul(crate::fixed_point::BW_UNIT as u64) / 4;
        let denominator = ((last_lost as u64).saturating_add(unfair).saturating_mul(3) / 2).max(1);

        let result = numerator / denominator;
        if result > u32::MAX as u64 {
            u32::MAX
        } else {
            result as u32
        }
    }

    /// Applies the cubic loss backoff to `curr_cwnd` once `loss_cnt` has
    /// crossed [`LOSS_CNT_BACKOFF_START`], capped at [`LOSS_CNT_BACKOFF_CAP`].
    pub(crate) fn loss_backoff_cwnd(state: &ConnectionState, cwnd: u32) -> u32 {
        let loss_cnt = (*state.loss_cnt).min(LOSS_CNT_BACKOFF_CAP);
        if loss_cnt <= LOSS_CNT_BACKOFF_START {
            return cwnd;
        }

        let n = (loss_cnt - LOSS_CNT_BACKOFF_START) as u32;
        // cwnd *= n^3 / 2^n, clamped so the shift never exceeds the width of u64.
        let numerator = (cwnd as u64).saturating_mul((n as u64).pow(3));
        let shift = n.min(63);
        let reduced = numerator >> shift;
        reduced.min(cwnd as u64) as u32
    }
}
