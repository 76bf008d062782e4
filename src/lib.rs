// SPDX-License-Identifier: Apache-2.0

//! Spline: a per-connection congestion control core.
//!
//! The core is host-agnostic: it never touches sockets or packet buffers
//! directly. A host drives it through [`recovery::Host`] and the samples
//! fed in via [`sample::SampleInputs`].

#![cfg_attr(not(any(test, feature = "std")), no_std)]

#[cfg(feature = "alloc")]
extern crate alloc;

pub mod counter;
pub mod fixed_point;
pub mod log;
pub mod number;
pub mod random;
pub mod recovery;
pub mod sample;
pub mod time;
