// SPDX-License-Identifier: Apache-2.0

//! The per-connection state record (§3). Owned exclusively by one connection;
//! no field here is ever shared across connections.

use crate::{
    counter::{Counter, Saturating},
    recovery::{constants::*, phase::Mode},
    time::{Ticks, Timestamp},
};

/// Mirrors the sender state machine the host reports through `set_state`,
/// named after the Linux `tcp_ca_state` values this crate's congestion-control
/// bindings expose.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum CaState {
    #[default]
    Open,
    Disorder,
    Cwr,
    Recovery,
    Loss,
}

/// Events passed to `cwnd_event`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CwndEvent {
    /// First transmit when no packets are in flight.
    TxStart,
    CwndRestart,
    CompleteCwr,
    Loss,
    EcnNoCe,
    EcnIsCe,
}

/// Long-term (policed-link) bandwidth detector phase.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub(crate) enum LtPhase {
    #[default]
    Idle,
    Sampling,
    Using,
}

/// The per-connection state block (§3).
#[derive(Clone, Debug)]
pub struct ConnectionState {
    pub(crate) curr_cwnd: u32,
    pub(crate) prior_cwnd: u32,

    pub(crate) last_min_rtt: u32,
    pub(crate) last_min_rtt_stamp: Ticks,
    pub(crate) curr_rtt: u32,
    pub(crate) last_rtt: u32,
    pub(crate) rtt_epoch: u32,
    pub(crate) has_seen_rtt: bool,

    pub(crate) last_ack: u32,
    pub(crate) curr_ack: u32,

    pub(crate) bw: u32,
    pub(crate) lt_bw: u32,
    pub(crate) lt_use_bw: bool,
    pub(crate) lt_phase: LtPhase,
    pub(crate) lt_last_stamp: u32,
    pub(crate) lt_last_delivered: u32,
    pub(crate) lt_last_lost: u32,
    pub(crate) lt_rtt_cnt: u8,

    pub(crate) delivered: u32,

    pub(crate) pacing_gain: u32,
    pub(crate) cwnd_gain: u32,
    pub(crate) gain: u32,

    pub(crate) fairness_rat: u32,
    pub(crate) stable_flag: Counter<u16, Saturating>,
    pub(crate) unfair_flag: Counter<u16, Saturating>,
    pub(crate) loss_cnt: Counter<u8, Saturating>,
    pub(crate) high_round: Counter<u8, Saturating>,

    pub(crate) rtt_cnt: u32,
    pub(crate) epp: u8,
    pub(crate) epoch_round: u8,
    pub(crate) cycle_mstamp: Timestamp,

    pub(crate) current_mode: Mode,
    pub(crate) prev_ca_state: CaState,
    pub(crate) start_phase: bool,
    pub(crate) round_start: bool,

    pub(crate) pacing_rate: u64,
}

impl ConnectionState {
    /// The congestion window last written to the host, in bytes.
    pub fn curr_cwnd(&self) -> u32 {
        self.curr_cwnd
    }

    /// The pacing rate last installed on the host, in bytes/sec.
    pub fn pacing_rate(&self) -> u64 {
        self.pacing_rate
    }

    /// The current phase.
    pub fn mode(&self) -> Mode {
        self.current_mode
    }

    /// Whether the long-term (policed-link) bandwidth is currently in effect.
    pub fn lt_use_bw(&self) -> bool {
        self.lt_use_bw
    }

    /// Windowed-minimum RTT, in microseconds.
    pub fn min_rtt_us(&self) -> u32 {
        self.last_min_rtt
    }

    /// `bw/throughput`, `BW_SCALE` units.
    pub fn fairness_rat(&self) -> u32 {
        self.fairness_rat
    }

    /// The current mode's pacing gain, `BBR_SCALE` units.
    pub fn pacing_gain(&self) -> u32 {
        self.pacing_gain
    }

    pub(crate) fn new(now: Timestamp, jiffies: Ticks) -> Self {
        Self {
            curr_cwnd: SCC_MIN_SND_CWND * SCC_MIN_SEGMENT_SIZE,
            prior_cwnd: SCC_MIN_SND_CWND * SCC_MIN_SEGMENT_SIZE,

            last_min_rtt: MIN_RTT_US,
            last_min_rtt_stamp: jiffies,
            curr_rtt: MIN_RTT_US,
            last_rtt: MIN_RTT_US,
            rtt_epoch: RTT_EPOCH_INIT,
            has_seen_rtt: false,

            last_ack: 0,
            curr_ack: 0,

            bw: MIN_BW,
            lt_bw: 0,
            lt_use_bw: false,
            lt_phase: LtPhase::Idle,
            lt_last_stamp: 0,
            lt_last_delivered: 0,
            lt_last_lost: 0,
            lt_rtt_cnt: 0,

            delivered: 0,

            pacing_gain: PACING_GAIN_START,
            cwnd_gain: CWND_GAIN_MIN,
            gain: CWND_GAIN_MIN,

            fairness_rat: FAIRNESS_MAX,
            stable_flag: Counter::new(0),
            unfair_flag: Counter::new(0),
            loss_cnt: Counter::new(0),
            high_round: Counter::new(0),

            rtt_cnt: 0,
            epp: 0,
            epoch_round: INIT_EPOCH_ROUND_BASE,
            cycle_mstamp: now,

            current_mode: Mode::Start,
            prev_ca_state: CaState::Open,
            start_phase: true,
            round_start: false,

            pacing_rate: 0,
        }
    }
}
