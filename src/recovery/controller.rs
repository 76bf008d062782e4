// SPDX-License-Identifier: Apache-2.0

//! Orchestration (§4.12): wires the pipeline stages together behind the
//! handful of entry points a host actually calls.

use crate::{
    fixed_point::BBR_UNIT,
    log::trace_event,
    random::Generator,
    recovery::{
        bandwidth::BandwidthEstimator,
        constants::*,
        cwnd::CwndEngine,
        fairness::{FairnessEstimator, StabilityChecks},
        gain::{Gain, GainSelector},
        host::Host,
        long_term::LongTermBwDetector,
        loss::LossAccounting,
        pacing::PacingRate,
        phase::{Mode, PhaseMachine},
        state::{CaState, ConnectionState, CwndEvent},
    },
    sample::SampleInputs,
    time::{Duration, Timestamp},
};

/// The per-connection congestion control core.
///
/// Owns [`ConnectionState`] and the stages' working memory (currently just
/// the bandwidth max-filter); everything else is pure functions over
/// `ConnectionState`. Generic over the host's PRNG so a test can inject a
/// deterministic one.
pub struct Controller<G: Generator> {
    state: ConnectionState,
    bandwidth: BandwidthEstimator,
    rng: G,
    /// The stability checks from the last cycle in which they were actually
    /// refreshed; reused verbatim on acks [`Self::is_next_cycle_phase`] gates
    /// out, so the phase machine's drain override still sees a coherent
    /// (if stale) read rather than a default-false one.
    last_checks: StabilityChecks,
}

impl<G: Generator> Controller<G> {
    /// `init`: called once when the host selects this algorithm for a
    /// connection.
    pub fn init(host: &impl Host, now: Timestamp, mut rng: G) -> Self {
        let mut state = ConnectionState::new(now, host.tcp_jiffies32());
        state.epoch_round = (INIT_EPOCH_ROUND_BASE as u32 + rng.next_u32_below(EPOCH_ROUND_RAND_SPAN)) as u8;
        Self {
            state,
            bandwidth: BandwidthEstimator::default(),
            rng,
            last_checks: StabilityChecks::default(),
        }
    }

    pub fn state(&self) -> &ConnectionState {
        &self.state
    }

    /// `cong_control`: the main entry point, driven by one rate sample.
    pub fn on_ack(&mut self, host: &mut impl Host, sample: SampleInputs) {
        if !sample.is_valid() {
            return;
        }

        let now = host.tcp_jiffies32();
        let wall_now = unsafe { Timestamp::from_duration(Duration::from_nanos(host.tcp_clock_cache())) };
        let delivered_bytes = sample.delivered_bytes(host.mss());

        crate::recovery::rtt::RttEstimator::update(
            &mut self.state,
            host.srtt_us(),
            if sample.has_rtt_sample() {
                sample.rtt_us as u32
            } else {
                0
            },
            sample.is_ack_delayed,
            now,
        );

        self.bandwidth.update(
            &mut self.state,
            delivered_bytes,
            sample.interval_us.max(0) as u32,
            sample.interval_us > 0,
            sample.prior_delivered,
            sample.is_app_limited,
            host.delivered() / host.mss().max(1),
        );

        let in_probe_bw = matches!(self.state.current_mode, Mode::ProbeBw);
        LongTermBwDetector::update(
            &mut self.state,
            sample.losses,
            sample.is_app_limited,
            host.delivered(),
            host.lost(),
            now.get(),
            in_probe_bw,
        );

        let bw = self.bw_estimate();

        let checks = if Self::is_next_cycle_phase(&self.state, bw, sample.losses, wall_now) {
            self.state.cycle_mstamp = wall_now;
            let throughput = BandwidthEstimator::throughput(&self.state, self.state.curr_cwnd(), host.mss());
            self.last_checks = FairnessEstimator::update(&mut self.state, throughput);
            self.last_checks
        } else {
            self.last_checks
        };

        let tf = LossAccounting::update(&mut self.state, host.delivered(), host.lost());

        PhaseMachine::update(&mut self.state, tf, checks, &mut self.rng);
        let inflight_bytes = self.state.curr_ack;
        let bdp_bytes = self.bdp_estimate();
        PhaseMachine::exit_drain_if_settled(&mut self.state, inflight_bytes, bdp_bytes);

        GainSelector::update(&mut self.state);
        let bw = self.bw_estimate();

        let acked_sacked = sample.acked_sacked.saturating_mul(host.mss().max(1));
        let cwnd_gain = GainSelector::cwnd_gain_tagged(&self.state);
        let snd_cwnd_clamp_bytes = host.snd_cwnd_clamp().saturating_mul(host.mss().max(1));
        CwndEngine::update(
            &mut self.state,
            cwnd_gain,
            checks,
            bw,
            tf,
            acked_sacked,
            host.mss(),
            snd_cwnd_clamp_bytes,
        );

        let pacing_gain = GainSelector::pacing_gain(&self.state);
        let is_startup = matches!(self.state.current_mode, Mode::Start);
        let rate = PacingRate::update(&mut self.state, pacing_gain, bw, host.mss(), host.max_pacing_rate(), is_startup);

        host.set_snd_cwnd(self.state.curr_cwnd / host.mss().max(1));
        host.set_pacing_rate(rate);

        trace_event!(debug, "spline.controller.on_ack");
    }

    fn bw_estimate(&self) -> u32 {
        if self.state.lt_use_bw {
            self.state.lt_bw
        } else {
            BandwidthEstimator::max_bw(&self.state)
        }
    }

    fn bdp_estimate(&self) -> u32 {
        CwndEngine::bdp(self.bw_estimate(), self.state.last_min_rtt)
    }

    /// `scc_is_next_cycle_phase` (§4.12): gates how often the fairness/bw
    /// refresh runs, rather than letting it run on every ack. At unity
    /// pacing gain, one full min-rtt interval must have elapsed since
    /// `cycle_mstamp`. Above unity, either this step saw losses or inflight
    /// has already caught up to the gained BDP target. Below unity, either
    /// the interval elapsed or inflight has already drained below the
    /// (cwnd-gained) BDP target.
    fn is_next_cycle_phase(state: &ConnectionState, bw: u32, has_losses: bool, now: Timestamp) -> bool {
        let full_length = now.saturating_duration_since(state.cycle_mstamp) >= Duration::from_micros(state.last_min_rtt as u64);
        let bdp_bytes = CwndEngine::bdp(bw, state.last_min_rtt);

        if state.pacing_gain == BBR_UNIT {
            full_length
        } else if state.pacing_gain > BBR_UNIT {
            let target = Gain::Bbr(state.pacing_gain).apply(bdp_bytes);
            has_losses || state.curr_ack >= target
        } else {
            let target = Gain::Bw(state.cwnd_gain).apply(bdp_bytes);
            full_length || state.curr_ack <= target
        }
    }

    /// `sndbuf_expand`: the socket send buffer multiplier the host should
    /// apply on top of `curr_cwnd`.
    pub fn sndbuf_expand(&self) -> u32 {
        3
    }

    /// `ssthresh`: saves `curr_cwnd` and returns the value the host should
    /// use as `ssthresh` (half the saved window, floored at the minimum).
    pub fn ssthresh(&mut self, mss: u32) -> u32 {
        CwndEngine::save_cwnd(&mut self.state);
        (self.state.curr_cwnd / 2).max(SCC_MIN_SND_CWND * mss.max(1))
    }

    /// `undo_cwnd`: rolls back to the pre-loss-event window.
    pub fn undo_cwnd(&mut self) -> u32 {
        LongTermBwDetector::undo(&mut self.state);
        CwndEngine::restore_cwnd(&mut self.state)
    }

    /// `set_state`: the host's loss-recovery state machine changed state.
    pub fn on_state_change(&mut self, new_state: CaState) {
        if matches!(new_state, CaState::Loss) && !matches!(self.state.prev_ca_state, CaState::Loss) {
            trace_event!(debug, "spline.controller.enter_loss");
        }
        self.state.prev_ca_state = new_state;
    }

    /// `cwnd_event`: a transmission-lifecycle event the host wants to
    /// report (restart after idle, ECN signal, etc).
    pub fn on_cwnd_event(&mut self, event: CwndEvent) {
        match event {
            CwndEvent::TxStart | CwndEvent::CwndRestart => {
                self.state.current_mode = Mode::Start;
                self.state.start_phase = true;
                self.state.epp = 0;
            }
            CwndEvent::Loss => {
                trace_event!(debug, "spline.controller.cwnd_event_loss");
            }
            CwndEvent::CompleteCwr | CwndEvent::EcnNoCe | CwndEvent::EcnIsCe => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{recovery::host::testing::TestHost, sample::SampleInputs, time::Ticks};

    fn controller() -> Controller<crate::random::testing::Generator> {
        let host = TestHost::default();
        Controller::init(&host, unsafe { Timestamp::from_duration(core::time::Duration::from_secs(1)) }, crate::random::testing::Generator::default())
    }

    #[test]
    fn init_sets_start_mode_and_floor_cwnd() {
        let controller = controller();
        assert_eq!(controller.state().mode(), Mode::Start);
        assert_eq!(controller.state().curr_cwnd(), SCC_MIN_SND_CWND * SCC_MIN_SEGMENT_SIZE);
    }

    #[test]
    fn on_ack_with_invalid_sample_is_a_noop() {
        let mut controller = controller();
        let mut host = TestHost::default();
        let before = controller.state().curr_cwnd();
        controller.on_ack(&mut host, SampleInputs { delivered: -1, interval_us: 1, ..Default::default() });
        assert_eq!(controller.state().curr_cwnd(), before);
    }

    #[test]
    fn on_ack_updates_pacing_rate_and_cwnd() {
        let mut controller = controller();
        let mut host = TestHost::default();
        host.srtt_us = 80_000;
        host.delivered = 100_000;
        host.tcp_jiffies32 = Ticks::new(10);

        controller.on_ack(
            &mut host,
            SampleInputs {
                delivered: 50,
                interval_us: 50_000,
                rtt_us: 40_000,
                acked_sacked: 10,
                prior_in_flight: 0,
                prior_delivered: 0,
                losses: false,
                is_app_limited: false,
                is_ack_delayed: false,
            },
        );

        assert!(controller.state().pacing_rate() > 0 || controller.state().curr_cwnd() > 0);
    }

    #[test]
    fn cwnd_restart_event_resets_to_start_mode() {
        let mut controller = controller();
        controller.state.current_mode = Mode::ProbeBw;
        controller.on_cwnd_event(CwndEvent::CwndRestart);
        assert_eq!(controller.state().mode(), Mode::Start);
    }

    #[test]
    fn ssthresh_halves_and_floors_cwnd() {
        let mut controller = controller();
        controller.state.curr_cwnd = 100_000;
        let ss = controller.ssthresh(1448);
        assert_eq!(ss, 50_000);
        assert_eq!(controller.state().curr_cwnd(), 100_000);
    }
}
