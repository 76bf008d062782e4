// SPDX-License-Identifier: Apache-2.0

//! Bandwidth estimation (§4.4): sample/ack-driven delivery rate, inflight
//! throughput, and round-trip boundary detection.

use crate::{
    fixed_point::{div_or_floor_u32, nonzero_u32, BW_SCALE},
    recovery::{constants::*, state::ConnectionState, windowed_filter::WindowedMaxFilter},
};

/// Stateless bandwidth-tracking step, plus the max-bw filter it owns.
pub(crate) struct BandwidthEstimator {
    max_bw: WindowedMaxFilter<u32, u32, u32>,
}

impl Default for BandwidthEstimator {
    fn default() -> Self {
        Self {
            max_bw: WindowedMaxFilter::new(MAX_BW_FILTER_ROUNDS),
        }
    }
}

impl BandwidthEstimator {
    /// Declares a new rtt round if `prior_delivered >= state.delivered`, and
    /// refreshes `state.bw` from the sample and `state.curr_ack`/`last_ack`
    /// from the host's cumulative delivered count.
    pub(crate) fn update(
        &mut self,
        state: &mut ConnectionState,
        delivered_bytes: u32,
        interval_us: u32,
        is_sample_valid: bool,
        prior_delivered: u32,
        is_app_limited: bool,
        host_delivered_packets: u32,
    ) {
        state.round_start = false;
        if prior_delivered >= state.delivered {
            state.delivered = host_delivered_packets.saturating_mul(SCC_MIN_SEGMENT_SIZE);
            state.rtt_cnt = state.rtt_cnt.wrapping_add(1);
            state.round_start = true;
        }

        state.last_ack = state.curr_ack;
        state.curr_ack = delivered_bytes;

        if is_sample_valid && interval_us > 0 {
            let sample_bw = div_or_floor_u32(
                (delivered_bytes as u64) << BW_SCALE,
                interval_us,
                MIN_RTT_US,
            );
            let current_max = self.max_bw.value().unwrap_or(0);
            if !is_app_limited || sample_bw >= current_max {
                self.max_bw.update(sample_bw, state.rtt_cnt);
            }
        }

        state.bw = self.max_bw.value().unwrap_or(MIN_BW).max(MIN_BW);
    }

    /// Ack-driven bandwidth: `(curr_ack * 2^24 * 10000) / last_min_rtt`, floored at `MIN_BW`.
    pub(crate) fn ack_driven_bw(state: &ConnectionState) -> u32 {
        let scaled = (state.curr_ack as u64) << BW_SCALE;
        let scaled = scaled.saturating_mul(10_000);
        div_or_floor_u32(scaled, state.last_min_rtt, MIN_BW).max(MIN_BW)
    }

    /// Inflight throughput: `(bytes_in_flight * 10000) / last_min_rtt`.
    pub(crate) fn throughput(state: &ConnectionState, inflight_pkts: u32, mss: u32) -> u32 {
        let bytes_in_flight = inflight_pkts.saturating_mul(nonzero_u32(mss, SCC_MIN_SEGMENT_SIZE));
        div_or_floor_u32((bytes_in_flight as u64) * 10_000, state.last_min_rtt, 1)
    }

    /// `scc_max_bw`: prefers the larger of the filtered max and the
    /// ack-driven bandwidth, unless `loss_cnt` has crossed the trust
    /// threshold, in which case only the filtered max is used.
    pub(crate) fn max_bw(state: &ConnectionState) -> u32 {
        let ack_driven = Self::ack_driven_bw(state);
        if *state.loss_cnt >= LOSS_CNT_TRUST_FILTERED_ONLY {
            state.bw
        } else {
            state.bw.max(ack_driven)
        }
    }

    /// Current value of the max-bandwidth filter, `BW_SCALE` units.
    pub(crate) fn filtered_max(&self) -> u32 {
        self.max_bw.value().unwrap_or(MIN_BW)
    }
}
