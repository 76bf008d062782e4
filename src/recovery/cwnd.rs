// SPDX-License-Identifier: Apache-2.0

//! Congestion window computation (§4.10): bandwidth-delay-product target,
//! loss backoff, trust-factor scaling and final clamping.

use crate::{
    fixed_point::{clamp_u32, mul_shr, narrow_u128, nonzero_u32, saturating_shr_u32, widening_mul, BW_SCALE},
    recovery::{
        bandwidth::BandwidthEstimator, constants::*, fairness::StabilityChecks, gain::Gain, loss::LossAccounting,
        state::ConnectionState,
    },
};

/// Floor applied to the `cwnd_gain * bw_ack * rtt_avg` product before it's
/// divided back down, so a near-zero gain or bandwidth doesn't collapse the
/// stable/loss variant to zero outright.
const GAIN_PRODUCT_FLOOR: u128 = 646_946;

pub(crate) struct CwndEngine;

impl CwndEngine {
    /// Computes the next `curr_cwnd`, in bytes (§4.10).
    ///
    /// `bdp_bw` is the bandwidth estimate to target (callers pick between
    /// the regular filtered max and `lt_bw` beforehand). `tf` is this step's
    /// trust factor from [`LossAccounting`]. `acked_sacked` is the
    /// additive-increase credit from this ack, in bytes. `checks` is this
    /// step's stability predicates from [`super::fairness::FairnessEstimator`].
    pub(crate) fn update(
        state: &mut ConnectionState,
        cwnd_gain: Gain,
        checks: StabilityChecks,
        bdp_bw: u32,
        tf: u32,
        acked_sacked: u32,
        mss: u32,
        snd_cwnd_clamp: u32,
    ) -> u32 {
        let cwnd_gain_raw = cwnd_gain.raw();

        let bw_ack = BandwidthEstimator::ack_driven_bw(state);
        let rtt_avg = nonzero_u32((state.last_min_rtt.saturating_add(state.curr_rtt)) / 2, MIN_RTT_US);

        let gain = (cwnd_gain_raw as u128)
            .saturating_mul(bw_ack as u128)
            .saturating_mul(rtt_avg as u128)
            .max(GAIN_PRODUCT_FLOOR);

        // Stable variant: BDP at the blended gain, spread over the average
        // of the windowed-min and current RTT.
        let cwnd_stable = narrow_u128((gain / rtt_avg as u128) >> BW_SCALE);

        // Loss variant: the same gain spread over the average of the
        // windowed-min and this step's current RTT, scaled by fairness.
        let loss_rtt_avg = nonzero_u32(((rtt_avg as u64 + state.curr_rtt as u64) / 2) as u32, MIN_RTT_US);
        let cwnd_loss = narrow_u128(((gain / loss_rtt_avg as u128) * state.fairness_rat as u128) >> BW_SCALE);

        let use_loss_variant = *state.unfair_flag > UNFAIR_FLAG_HIGH
            || !checks.high_rtt_check
            || *state.loss_cnt > LOSS_CNT_VARIANT_SELECT;

        let mut computed = if use_loss_variant { cwnd_loss } else { cwnd_stable };

        computed = LossAccounting::loss_backoff_cwnd(state, computed);

        // Scale down proportionally to how untrustworthy this step's
        // delivery has been; a clean step (tf == BW_UNIT) is a no-op.
        computed = mul_shr(computed, tf.max(MIN_THRESH_TF), BW_SCALE);

        // Lower bound: never let the computed variant fall beneath an eighth
        // of the fairness-scaled ceiling on the existing window.
        let spline_max_cwnd =
            mul_shr(state.curr_cwnd, state.fairness_rat, BW_SCALE).max(2 * SCC_MIN_SND_CWND * mss.max(1));
        computed = computed.max(spline_max_cwnd / 8);

        let target = Self::scc_bdp(bdp_bw, state.last_min_rtt, cwnd_gain_raw);
        let fused = Self::next_cwnd(state, tf, computed, target);

        let floor = SCC_MIN_SND_CWND.saturating_mul(mss.max(1));
        let ceiling = snd_cwnd_clamp.max(floor);
        state.curr_cwnd = clamp_u32(fused.saturating_add(acked_sacked), floor, ceiling);
        state.curr_cwnd
    }

    /// `next_cwnd`'s three-way fusion: an untrustworthy, long-unsettled path
    /// trusts only the computed variant; an aggressively unfair one under
    /// loss blends computed and target down; otherwise the larger of the two
    /// wins, biasing growth toward whichever estimate is more optimistic.
    fn next_cwnd(state: &ConnectionState, tf: u32, computed: u32, target: u32) -> u32 {
        if tf < THRESH_TF && !state.start_phase && *state.loss_cnt > LOSS_CNT_TRUST_ONLY {
            return computed;
        }

        let unfair = *state.unfair_flag;
        let stable = *state.stable_flag;
        let aggressively_unfair = (unfair > UNFAIR_FLAG_HIGH && stable < 300) || unfair > stable.saturating_add(500);

        if aggressively_unfair && *state.loss_cnt > 5 {
            return ((target as u64 + computed as u64) * 7 / 16) as u32;
        }

        target.max(computed)
    }

    /// `scc_bdp`: `ceil(bw * rtt_us * cwnd_gain / 2^48)`, floored at
    /// [`SCC_MIN_SEGMENT_SIZE`]. `bw` and `cwnd_gain` are both `BW_SCALE`
    /// (2^24) quantities, hence the doubled shift.
    fn scc_bdp(bw: u32, rtt_us: u32, cwnd_gain: u32) -> u32 {
        let numerator = widening_mul(bw, rtt_us) as u128 * cwnd_gain as u128;
        let denominator = 1u128 << (2 * BW_SCALE);
        narrow_u128(numerator.div_ceil(denominator)).max(SCC_MIN_SEGMENT_SIZE)
    }

    /// `(bw_bytes_per_sec * rtt_us) / 1e6`. `bw` is `BW_SCALE`-scaled; the
    /// scale is divided back out after the microsecond-to-second conversion,
    /// not before, so the division by 1e6 doesn't itself need a `2^24`-times
    /// wider denominator.
    pub(crate) fn bdp(bw: u32, rtt_us: u32) -> u32 {
        let product = widening_mul(bw, rtt_us);
        let per_second = product / 1_000_000;
        saturating_shr_u32(per_second, BW_SCALE).max(SCC_MIN_SEGMENT_SIZE)
    }

    /// Snapshots `curr_cwnd` into `prior_cwnd`, for `undo_cwnd`/`ssthresh`.
    pub(crate) fn save_cwnd(state: &mut ConnectionState) {
        state.prior_cwnd = state.curr_cwnd;
    }

    /// Restores `curr_cwnd` from `prior_cwnd` (`undo_cwnd`).
    pub(crate) fn restore_cwnd(state: &mut ConnectionState) -> u32 {
        state.curr_cwnd = state.curr_cwnd.max(state.prior_cwnd);
        state.curr_cwnd
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        fixed_point::BW_UNIT,
        time::{Ticks, Timestamp},
    };

    fn state() -> ConnectionState {
        ConnectionState::new(unsafe { Timestamp::from_duration(core::time::Duration::from_secs(1)) }, Ticks::ZERO)
    }

    fn checks() -> StabilityChecks {
        StabilityChecks::default()
    }

    #[test]
    fn cwnd_never_drops_below_the_floor() {
        let mut state = state();
        let cwnd = CwndEngine::update(
            &mut state,
            Gain::Bw(0),
            checks(),
            MIN_BW,
            0,
            0,
            SCC_MIN_SEGMENT_SIZE,
            u32::MAX,
        );
        assert!(cwnd >= SCC_MIN_SND_CWND * SCC_MIN_SEGMENT_SIZE);
    }

    #[test]
    fn cwnd_never_exceeds_the_host_clamp() {
        let mut state = state();
        let clamp = 20_000u32;
        let cwnd = CwndEngine::update(
            &mut state,
            Gain::Bw(CWND_GAIN_MAX),
            checks(),
            MIN_BW * 1000,
            BW_UNIT,
            0,
            SCC_MIN_SEGMENT_SIZE,
            clamp,
        );
        assert!(cwnd <= clamp);
    }

    #[test]
    fn acked_sacked_credit_is_additive() {
        let mut state = state();
        let without = CwndEngine::update(
            &mut state,
            Gain::Bw(CWND_GAIN_MIN),
            checks(),
            MIN_BW,
            BW_UNIT,
            0,
            SCC_MIN_SEGMENT_SIZE,
            u32::MAX,
        );
        let with = CwndEngine::update(
            &mut state,
            Gain::Bw(CWND_GAIN_MIN),
            checks(),
            MIN_BW,
            BW_UNIT,
            5000,
            SCC_MIN_SEGMENT_SIZE,
            u32::MAX,
        );
        assert!(with >= without);
    }

    #[test]
    fn save_and_restore_round_trip() {
        let mut state = state();
        state.curr_cwnd = 50_000;
        CwndEngine::save_cwnd(&mut state);
        state.curr_cwnd = 10_000;
        let restored = CwndEngine::restore_cwnd(&mut state);
        assert_eq!(restored, 50_000);
    }
}
