// SPDX-License-Identifier: Apache-2.0

//! The boundary between the congestion-control core and a transport's
//! socket state. Modeled on the kernel's `tcp_congestion_ops` vtable: the
//! core never touches a socket or packet buffer, it only reads/writes
//! through this trait.

use crate::{recovery::state::CaState, time::Ticks};

/// Host-side accessors the core needs to read a sample and write back its
/// decisions. A host implementation typically wraps a single TCP socket's
/// control block.
pub trait Host {
    /// Smoothed RTT, microseconds (`srtt_us` in Linux's `tcp_sock`, already
    /// in the kernel's `<< 3` fixed-point form).
    fn srtt_us(&self) -> u32;

    /// Current `snd_cwnd`, in segments.
    fn snd_cwnd(&self) -> u32;

    /// Installs a new `snd_cwnd`, in segments.
    fn set_snd_cwnd(&mut self, segments: u32);

    /// The ceiling `snd_cwnd` may never exceed, in segments.
    fn snd_cwnd_clamp(&self) -> u32;

    /// Current MSS, in bytes.
    fn mss(&self) -> u32;

    /// Cumulative bytes delivered over the life of the connection.
    fn delivered(&self) -> u32;

    /// Cumulative bytes declared lost over the life of the connection.
    fn lost(&self) -> u32;

    /// Timestamp of the last delivered-count update.
    fn delivered_mstamp(&self) -> Ticks;

    /// Host's write-clock cache, nanoseconds; used to pace transmits.
    fn tcp_wstamp_ns(&self) -> u64;

    /// Host's cached wall clock, nanoseconds.
    fn tcp_clock_cache(&self) -> u64;

    /// Host-imposed ceiling on pacing rate, bytes/sec. `0` means uncapped.
    fn max_pacing_rate(&self) -> u64;

    /// Installs a new pacing rate, bytes/sec.
    fn set_pacing_rate(&mut self, bytes_per_sec: u64);

    /// The sender state the host's loss-recovery state machine reports.
    fn ca_state(&self) -> CaState;

    /// Host's jiffies counter (coarse, wrapping), for windowed timers.
    fn tcp_jiffies32(&self) -> Ticks;
}

#[cfg(any(test, feature = "testing"))]
pub mod testing {
    use super::Host;
    use crate::{recovery::state::CaState, time::Ticks};

    /// An in-memory [`Host`] double for tests: every field is directly
    /// writable so a test can script a sequence of host-visible states.
    #[derive(Clone, Debug)]
    pub struct TestHost {
        pub srtt_us: u32,
        pub snd_cwnd: u32,
        pub snd_cwnd_clamp: u32,
        pub mss: u32,
        pub delivered: u32,
        pub lost: u32,
        pub delivered_mstamp: Ticks,
        pub tcp_wstamp_ns: u64,
        pub tcp_clock_cache: u64,
        pub max_pacing_rate: u64,
        pub pacing_rate: u64,
        pub ca_state: CaState,
        pub tcp_jiffies32: Ticks,
    }

    impl Default for TestHost {
        fn default() -> Self {
            Self {
                srtt_us: 0,
                snd_cwnd: 10,
                snd_cwnd_clamp: u32::MAX,
                mss: 1448,
                delivered: 0,
                lost: 0,
                delivered_mstamp: Ticks::ZERO,
                tcp_wstamp_ns: 0,
                tcp_clock_cache: 0,
                max_pacing_rate: 0,
                pacing_rate: 0,
                ca_state: CaState::Open,
                tcp_jiffies32: Ticks::ZERO,
            }
        }
    }

    impl Host for TestHost {
        fn srtt_us(&self) -> u32 {
            self.srtt_us
        }

        fn snd_cwnd(&self) -> u32 {
            self.snd_cwnd
        }

        fn set_snd_cwnd(&mut self, segments: u32) {
            self.snd_cwnd = segments;
        }

        fn snd_cwnd_clamp(&self) -> u32 {
            self.snd_cwnd_clamp
        }

        fn mss(&self) -> u32 {
            self.mss
        }

        fn delivered(&self) -> u32 {
            self.delivered
        }

        fn lost(&self) -> u32 {
            self.lost
        }

        fn delivered_mstamp(&self) -> Ticks {
            self.delivered_mstamp
        }

        fn tcp_wstamp_ns(&self) -> u64 {
            self.tcp_wstamp_ns
        }

        fn tcp_clock_cache(&self) -> u64 {
            self.tcp_clock_cache
        }

        fn max_pacing_rate(&self) -> u64 {
            self.max_pacing_rate
        }

        fn set_pacing_rate(&mut self, bytes_per_sec: u64) {
            self.pacing_rate = bytes_per_sec;
        }

        fn ca_state(&self) -> CaState {
            self.ca_state
        }

        fn tcp_jiffies32(&self) -> Ticks {
            self.tcp_jiffies32
        }
    }
}
