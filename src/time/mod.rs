// SPDX-License-Identifier: Apache-2.0

//! Time related datatypes.
//!
//! The host exposes two incompatible notions of "now": a wall-clock
//! [`Timestamp`] in microseconds since an arbitrary epoch, and a coarse
//! wrapping [`Ticks`] counter. The two are never compared directly;
//! conversions happen only where a component reads them from the host.

mod clock;
mod ticks;
mod timestamp;

pub use clock::*;
pub use core::time::Duration;
pub use ticks::*;
pub use timestamp::*;
