// SPDX-License-Identifier: Apache-2.0

//! The rate-sample contract the host hands in on every ack.

/// Per-ack feedback from the host transport.
///
/// Mirrors the wire contract in the external-interface table: `delivered` and
/// `rtt_us`/`interval_us` are signed because the host may report an invalid
/// sample (negative `delivered`, non-positive `interval_us`/`rtt_us`) rather
/// than omit the call.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SampleInputs {
    /// Packets newly delivered since the last sample. Negative is invalid.
    pub delivered: i32,
    /// Length of the sampling interval, in microseconds. Must be `> 0` to be valid.
    pub interval_us: i64,
    /// RTT measurement carried by this ack, in microseconds. `0` means "no sample".
    pub rtt_us: i64,
    /// Segments acked or sacked by this ack.
    pub acked_sacked: u32,
    /// Bytes in flight prior to this ack being processed.
    pub prior_in_flight: u32,
    /// `delivered` total as of the last rate sample, used to detect a new rtt round.
    pub prior_delivered: u32,
    /// Whether any packets covered by this sample were marked lost.
    pub losses: bool,
    /// Whether the sender was app-limited, not cwnd-limited, during the interval.
    pub is_app_limited: bool,
    /// Whether this ack was a delayed ack.
    pub is_ack_delayed: bool,
}

impl SampleInputs {
    /// Whether `delivered`/`interval_us` are usable for a bandwidth update.
    #[inline]
    pub fn is_valid(&self) -> bool {
        self.delivered >= 0 && self.interval_us > 0
    }

    /// `delivered`, converted to bytes using the host's current MSS and
    /// floored at zero for invalid (negative) samples.
    #[inline]
    pub fn delivered_bytes(&self, mss: u32) -> u32 {
        if self.delivered <= 0 {
            0
        } else {
            (self.delivered as u32).saturating_mul(mss)
        }
    }

    /// Whether the host reported an RTT measurement on this ack.
    #[inline]
    pub fn has_rtt_sample(&self) -> bool {
        self.rtt_us > 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_delivered_is_floored_to_zero_bytes() {
        let sample = SampleInputs {
            delivered: -1,
            ..Default::default()
        };
        assert!(!sample.is_valid());
        assert_eq!(sample.delivered_bytes(1448), 0);
    }

    #[test]
    fn valid_delivered_converts_to_bytes() {
        let sample = SampleInputs {
            delivered: 10,
            interval_us: 10_000,
            ..Default::default()
        };
        assert!(sample.is_valid());
        assert_eq!(sample.delivered_bytes(1448), 14_480);
    }
}
