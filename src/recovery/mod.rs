// SPDX-License-Identifier: Apache-2.0

//! The congestion control core: a per-connection state machine driven by
//! rate samples from a host transport.
//!
//! Control flow per ack, in order (later stages read earlier stages'
//! output, so the order is load-bearing):
//! Input → [`rtt`] → [`bandwidth`] → [`long_term`] → [`fairness`] →
//! [`loss`] → [`phase`] → [`gain`] → [`cwnd`] → [`pacing`].
//! [`controller`] orchestrates the sequence.

mod bandwidth;
mod constants;
mod controller;
mod cwnd;
mod fairness;
mod gain;
mod host;
mod long_term;
mod loss;
mod pacing;
mod phase;
mod rtt;
mod state;
mod windowed_filter;

pub use constants::*;
pub use controller::Controller;
pub use gain::Gain;
pub use host::Host;
pub use phase::Mode;
pub use state::{CaState, ConnectionState, CwndEvent};

#[cfg(any(test, feature = "testing"))]
pub mod testing {
    pub use super::host::testing::*;
}
