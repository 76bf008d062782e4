// SPDX-License-Identifier: Apache-2.0

//! The phase machine (§4.8): epoch-driven transitions between startup,
//! bandwidth probing, RTT probing and drain.

use crate::{
    log::trace_event,
    random::Generator,
    recovery::{constants::*, fairness::StabilityChecks, state::ConnectionState},
};

/// The connection's current phase.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Mode {
    /// Initial ramp: pacing gain above unity, no loss/fairness signal yet.
    #[default]
    Start,
    /// Steady-state bandwidth probing.
    ProbeBw,
    /// Draining the queue built up by `Start`'s overshoot.
    Drain,
    /// Deliberately shrinking `inflight` to re-sample the path's min RTT.
    ProbeRtt,
}

pub(crate) struct PhaseMachine;

impl PhaseMachine {
    /// Runs one step of the phase machine. Only evaluated on round
    /// boundaries (`state.round_start`); returns the (possibly unchanged)
    /// mode for the caller to feed into `GainSelector`.
    pub(crate) fn update(
        state: &mut ConnectionState,
        tf: u32,
        checks: StabilityChecks,
        rng: &mut dyn Generator,
    ) -> Mode {
        if !state.round_start {
            return state.current_mode;
        }

        if state.epp as u32 >= state.epoch_round as u32 {
            Self::advance_epoch(state, tf, checks, rng);
        }

        state.current_mode
    }

    /// Fires at every epoch boundary (`epp == epoch_round`): resets `epp`,
    /// re-seeds `epoch_round` (`BOOTSTRAP_EPOCH_ROUND` once, leaving
    /// bootstrap, then a fresh random length each time after), picks
    /// `PROBE_RTT`/`PROBE_BW` from the trust factor and fairness votes, then
    /// overrides to `DRAIN` if none of the stability checks held and the
    /// long-term loss count is far past its threshold.
    fn advance_epoch(state: &mut ConnectionState, tf: u32, checks: StabilityChecks, rng: &mut dyn Generator) {
        state.epp = 0;

        if state.start_phase {
            state.epoch_round = BOOTSTRAP_EPOCH_ROUND;
            state.start_phase = false;
        } else {
            state.epoch_round = (EPOCH_ROUND_MIN as u32 + rng.next_u32_below(EPOCH_ROUND_RAND_SPAN)) as u8;
        }

        let mut next = if tf < THRESH_TF || *state.unfair_flag > *state.stable_flag {
            Mode::ProbeRtt
        } else {
            Mode::ProbeBw
        };

        if checks.none() && state.lt_last_lost > (LT_LOSS_THRESH + 1) * 6 {
            next = Mode::Drain;
        }

        if next != state.current_mode {
            trace_event!(debug, "spline.phase.transition");
        }
        state.current_mode = next;
        state.stable_flag.set(0);
        state.unfair_flag.set(0);
    }

    /// Called by `CwndEngine`/`PacingRate` once `Drain` has shed its excess
    /// inflight, to fall through to `ProbeBw`.
    pub(crate) fn exit_drain_if_settled(state: &mut ConnectionState, inflight_bytes: u32, bdp_bytes: u32) {
        if matches!(state.current_mode, Mode::Drain) && inflight_bytes <= bdp_bytes {
            state.current_mode = Mode::ProbeBw;
            trace_event!(debug, "spline.phase.drain_exit");
        }
    }
}
