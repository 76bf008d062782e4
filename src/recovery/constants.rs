// SPDX-License-Identifier: Apache-2.0

//! Constants that are part of the external contract (§6): tunables a host
//! integration may rely on by value, not just by name.

use core::time::Duration;

/// Minimum `snd_cwnd`, in segments.
pub const SCC_MIN_SND_CWND: u32 = 10;
/// Default segment size, in bytes, used when the host doesn't report one.
pub const SCC_MIN_SEGMENT_SIZE: u32 = 1448;
/// Nominal floor substituted for a zero bandwidth sample.
pub const MIN_BW: u32 = 14_480;
/// Nominal floor substituted for a zero/unknown RTT, in microseconds.
pub const MIN_RTT_US: u32 = 100_000;
/// Width of the windowed-minimum-RTT filter.
pub const SCC_MIN_RTT_WIN: Duration = Duration::from_secs(10);

/// Trust-factor threshold above which the path is considered healthy.
pub const THRESH_TF: u32 = 3_413_567;
/// Floor applied to the trust factor before it's used as a multiplier.
pub const MIN_THRESH_TF: u32 = 1_713_567;

/// Minimum rtt rounds of loss sampling before the LT detector can conclude.
pub const LT_MIN_RTT_ROUNDS: u8 = 4;
/// Maximum rtt rounds of loss sampling before a sampling interval resets.
pub const LT_MAX_RTT_ROUNDS: u8 = 16;
/// Rounds spent in `PROBE_BW` with `lt_use_bw` active before reverting to `Idle`.
pub const LT_BW_USE_ROUNDS: u32 = 48;
/// Two interval-bw samples within this fraction of each other are considered stable.
pub const LT_BW_RATIO_DENOM: u32 = 8;
/// Absolute bandwidth difference, bytes/sec (BW_SCALE units), also accepted as stable.
pub const LT_BW_DIFF_FLOOR: u32 = 500 << crate::fixed_point::BW_SCALE;
/// Loss ratio numerator/denominator (50/256) above which LT sampling may begin.
pub const LT_LOSS_THRESH_NUM: u32 = 50;
pub const LT_LOSS_THRESH_DENOM: u32 = 256;
/// Base used by the drain trigger: `lt_last_lost > (LT_LOSS_THRESH + 1) * 6`.
pub const LT_LOSS_THRESH: u32 = LT_LOSS_THRESH_NUM;

/// `fairness_rat` clamp bounds, `BW_SCALE` units.
pub const FAIRNESS_MIN: u32 = 16_646_946;
pub const FAIRNESS_MAX: u32 = 21_989_530;

/// `cwnd_gain()` clamp bounds, `BW_SCALE` units.
pub const CWND_GAIN_MIN: u32 = 6_646_946;
pub const CWND_GAIN_MAX: u32 = 37_390_997;

/// Pacing/cwnd gains by mode, in `BBR_SCALE` units unless noted.
pub const PACING_GAIN_PROBE_BW: u32 = 550;
pub const PACING_GAIN_PROBE_RTT: u32 = 250;
pub const PACING_GAIN_DRAIN: u32 = 100;
pub const PACING_GAIN_START: u32 = 256;
/// `DRAIN`'s cwnd gain, `BW_SCALE` units (coexists with the `BBR_SCALE`
/// pacing gains above — see [`crate::recovery::Gain`]).
pub const DRAIN_CWND_GAIN: u32 = 5_646_946;

pub const USEC_PER_SEC: u32 = 1_000_000;
/// Pacing rate is shaved to ~99% of the raw gained estimate, leaving the host
/// a little headroom before its own send buffer/scheduler queues up.
pub const PACING_MARGIN: u64 = (USEC_PER_SEC as u64 / 100) * 99;

/// Bootstrap epoch length.
pub const BOOTSTRAP_EPOCH_ROUND: u8 = 20;
/// Lower/upper bound of the randomised post-bootstrap epoch length.
pub const EPOCH_ROUND_MIN: u8 = 1;
pub const EPOCH_ROUND_RAND_SPAN: u32 = 30;
/// Lower/upper bound of the randomised initial (pre-bootstrap) epoch length.
pub const INIT_EPOCH_ROUND_BASE: u8 = 10;

/// Loss counter thresholds.
pub const LOSS_CNT_BACKOFF_START: u8 = 9;
pub const LOSS_CNT_BACKOFF_CAP: u8 = 12;
pub const LOSS_CNT_TRUST_ONLY: u8 = 50;

/// `rtt_epoch` growth step and cap, microseconds.
pub const RTT_EPOCH_STEP: u32 = 4000;
pub const RTT_EPOCH_CAP: u32 = 1 << 15;
/// Initial `rtt_epoch`.
pub const RTT_EPOCH_INIT: u32 = 4000;

/// Consecutive high-RTT rounds (passing `ack_check`, with inflight above
/// `curr_cwnd * SCC_MIN_SEGMENT_SIZE`) required to grow `rtt_epoch`.
pub const HIGH_RTT_STREAK_FOR_EPOCH_GROWTH: u8 = 50;

/// `unfair_flag` threshold used by the cwnd-variant selector and `next_cwnd` fusion.
pub const UNFAIR_FLAG_HIGH: u16 = 2000;
/// `loss_cnt` threshold used by the cwnd-variant selector.
pub const LOSS_CNT_VARIANT_SELECT: u8 = 10;

/// Round-trip horizon of the max-bandwidth filter, in rtt rounds.
pub const MAX_BW_FILTER_ROUNDS: u32 = 10;
/// `loss_cnt` at/above which `scc_max_bw` trusts only the filtered max, not the ack-driven bw.
pub const LOSS_CNT_TRUST_FILTERED_ONLY: u8 = 50;
