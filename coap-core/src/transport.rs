// Copyright 2019 Google LLC
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     https://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.
//

//! Sans-I/O collaborator traits: the datagram transport, timer scheduler, and random
//! source the endpoint is driven by. The endpoint never performs I/O itself; a host
//! (such as `coap-tokio`) implements these traits against a real socket and clock and
//! pumps bytes and timer fires into the endpoint's synchronous entry points.

use crate::message::MsgToken;
use crate::Error;
use core::time::Duration;

/// Opaque per-datagram metadata forwarded unchanged between inbound and outbound calls
/// (for example, peer address). The core never inspects it.
pub trait DatagramMetadata: core::fmt::Debug + Clone {}

impl<T: core::fmt::Debug + Clone> DatagramMetadata for T {}

/// The write half of a datagram transport.
///
/// `put` may return `Err(Error::WouldBlock)`; the caller is expected to retry the same
/// datagram once [`DatagramSink::set_listener`]'s callback fires.
pub trait DatagramSink<M: DatagramMetadata> {
    /// Attempts to write `buffer` to the transport, optionally addressed to `destination`.
    fn put(&mut self, buffer: &[u8], destination: Option<&M>) -> Result<(), Error>;
}

/// The read half of a datagram transport. A host polls or is notified by the platform
/// when datagrams are available and feeds them to [`crate::endpoint::Endpoint::receive_datagram`].
pub trait DatagramSource<M: DatagramMetadata> {
    /// Metadata describing the peer a received datagram came from.
    type Metadata: DatagramMetadata;
}

/// A monotonic scheduler of one-shot timers on the endpoint's single execution context.
///
/// The core never spawns a task or blocks; it calls `schedule` to request a future
/// callback and `cancel` to retract one. `token` identifies which outstanding request
/// the timer belongs to — the scheduler is expected to remember it so that, when the
/// deadline elapses, the host can call back into the endpoint with
/// [`crate::endpoint::Endpoint::timer_fired`] for the right request without the endpoint
/// having to expose its outstanding-request table for the lookup.
pub trait TimerScheduler {
    /// An opaque handle identifying one scheduled timer, usable with [`TimerScheduler::cancel`].
    type TimerId: Copy + Eq + core::fmt::Debug;

    /// Schedules a one-shot timer for `token` to fire no sooner than `delay` from now.
    fn schedule(&mut self, delay: Duration, token: MsgToken) -> Self::TimerId;

    /// Cancels a previously scheduled timer. A no-op if it already fired or was cancelled.
    fn cancel(&mut self, id: Self::TimerId);
}

/// An entropy source used to seed message-ids and tokens (§3 `Endpoint`).
pub trait RandomSource {
    /// Fills `buffer` with random bytes.
    fn fill_bytes(&mut self, buffer: &mut [u8]);

    /// Returns a random `u16`, used to seed `next_message_id`.
    fn next_u16(&mut self) -> u16 {
        let mut buf = [0u8; 2];
        self.fill_bytes(&mut buf);
        u16::from_be_bytes(buf)
    }

    /// Returns a random `u64`, used to seed `next_token_counter`.
    fn next_u64(&mut self) -> u64 {
        let mut buf = [0u8; 8];
        self.fill_bytes(&mut buf);
        u64::from_be_bytes(buf)
    }
}

/// A [`RandomSource`] backed by the `rand` crate's thread-local generator.
#[derive(Debug, Default, Copy, Clone)]
pub struct ThreadRngSource;

impl RandomSource for ThreadRngSource {
    fn fill_bytes(&mut self, buffer: &mut [u8]) {
        use rand::RngCore;
        rand::thread_rng().fill_bytes(buffer);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn thread_rng_source_fills_nonzero_length() {
        let mut src = ThreadRngSource;
        let a = src.next_u16();
        let b = src.next_u16();
        // Not a strict correctness test (randomness), just a smoke test that the
        // plumbing returns values of the right width without panicking.
        let _ = a;
        let _ = b;
    }
}
