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

use std::time::Duration;

/// Per-endpoint [CoAP transmission parameters][tp].
///
/// An [`Endpoint`](crate::endpoint::Endpoint) is generic over this trait; hosts with
/// non-default timing needs (faster test suites, tuning for a lossy link) implement it
/// themselves instead of `StandardCoapConstants`.
///
/// [tp]: https://tools.ietf.org/html/rfc7252#section-4.8
pub trait EndpointConstants: Default + Copy + Sync + Send + Unpin {
    fn coap_max_retransmit(&self) -> u32 {
        Self::COAP_MAX_RETRANSMIT
    }

    fn coap_ack_timeout(&self) -> Duration {
        Self::COAP_ACK_TIMEOUT
    }

    fn coap_ack_random_factor(&self) -> f32 {
        Self::COAP_ACK_RANDOM_FACTOR
    }

    fn coap_nstart(&self) -> u32 {
        Self::COAP_NSTART
    }

    fn coap_default_max_age(&self) -> Duration {
        Self::COAP_DEFAULT_MAX_AGE
    }

    fn coap_max_latency(&self) -> Duration {
        Self::COAP_MAX_LATENCY
    }

    fn coap_processing_delay(&self) -> Duration {
        self.coap_ack_timeout()
    }

    fn coap_max_transmit_span(&self) -> Duration {
        Self::COAP_MAX_TRANSMIT_SPAN
    }

    fn coap_max_transmit_wait(&self) -> Duration {
        Self::COAP_MAX_TRANSMIT_WAIT
    }

    fn coap_exchange_lifetime(&self) -> Duration {
        Self::COAP_EXCHANGE_LIFETIME
    }

    const COAP_MAX_RETRANSMIT: u32 = 4;

    const COAP_ACK_TIMEOUT: Duration = Duration::from_secs(2);

    const COAP_ACK_RANDOM_FACTOR: f32 = 1.5;

    const COAP_NSTART: u32 = 1;

    /// Default value advertised in a `Max-Age` option when the handler doesn't set one.
    const COAP_DEFAULT_MAX_AGE: Duration = Duration::from_secs(60);

    /// From RFC7252: the maximum time a datagram is expected to take from the start of
    /// its transmission to the completion of its reception.
    const COAP_MAX_LATENCY: Duration = Duration::from_secs(100);

    const COAP_PROCESSING_DELAY: Duration = Self::COAP_ACK_TIMEOUT;

    /// `ACK_TIMEOUT * ((2 ** MAX_RETRANSMIT) - 1) * ACK_RANDOM_FACTOR`; 45s with defaults.
    const COAP_MAX_TRANSMIT_SPAN: Duration = Duration::from_millis(
        (Self::COAP_ACK_TIMEOUT.as_millis() as f32
            * (Self::COAP_MAX_RETRANSMIT * 2 - 1) as f32
            * Self::COAP_ACK_RANDOM_FACTOR) as u64,
    );

    /// `ACK_TIMEOUT * ((2 ** (MAX_RETRANSMIT + 1)) - 1) * ACK_RANDOM_FACTOR`; 93s with defaults.
    const COAP_MAX_TRANSMIT_WAIT: Duration = Duration::from_millis(
        (Self::COAP_ACK_TIMEOUT.as_millis() as f32
            * ((Self::COAP_MAX_RETRANSMIT + 1) * 2 - 1) as f32
            * Self::COAP_ACK_RANDOM_FACTOR) as u64,
    );

    /// `MAX_TRANSMIT_SPAN + (2 * MAX_LATENCY) + PROCESSING_DELAY`; 247s with defaults.
    /// Bounds the message-id deduplication window (§4.2).
    const COAP_EXCHANGE_LIFETIME: Duration = Duration::from_millis(
        Self::COAP_MAX_TRANSMIT_SPAN.as_millis() as u64
            + 2 * Self::COAP_MAX_LATENCY.as_millis() as u64
            + Self::COAP_PROCESSING_DELAY.as_millis() as u64,
    );

    /// Delay before the `attempt`-th retransmission (1-based: `attempt=1` is the gap
    /// between the first transmission and the first retransmission). `attempt=0` returns
    /// zero. The backoff doubles per attempt and a jitter factor drawn once per message is
    /// implied by the caller re-using the same `T` across a message's retransmissions, per
    /// RFC7252 §4.8 ("Random-Interval" is drawn once, not re-drawn per retry).
    fn calc_retransmit_duration(&self, mut attempt: u32) -> Duration {
        if attempt == 0 {
            return Duration::from_secs(0);
        }

        if attempt > self.coap_max_retransmit() {
            attempt = self.coap_max_retransmit();
        }

        attempt -= 1;

        let ret = (self.coap_ack_timeout().as_millis() as u64) << attempt;

        const JDIV: u64 = 512u64;
        let rmod: u64 = (JDIV as f32 * (Self::COAP_ACK_RANDOM_FACTOR - 1.0)) as u64;
        let jmul = JDIV + rand::random::<u64>() % rmod;

        Duration::from_millis(ret * jmul / JDIV)
    }
}

/// Set of the standard transmission parameters as recommended by [IETF-RFC7252 Section 4.8].
///
/// [IETF-RFC7252 Section 4.8]: https://tools.ietf.org/html/rfc7252#section-4.8
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Default)]
pub struct StandardCoapConstants;

impl EndpointConstants for StandardCoapConstants {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exchange_lifetime_is_247_seconds() {
        assert_eq!(
            StandardCoapConstants::COAP_EXCHANGE_LIFETIME,
            Duration::from_secs(247)
        );
    }

    #[test]
    fn max_transmit_span_is_45_seconds() {
        assert_eq!(
            StandardCoapConstants::COAP_MAX_TRANSMIT_SPAN,
            Duration::from_secs(45)
        );
    }

    #[test]
    fn retransmit_zero_is_immediate() {
        let c = StandardCoapConstants;
        assert_eq!(c.calc_retransmit_duration(0), Duration::from_secs(0));
    }

    #[test]
    fn retransmit_backoff_doubles_within_jitter_bounds() {
        let c = StandardCoapConstants;
        for attempt in 1..=4 {
            let d = c.calc_retransmit_duration(attempt).as_millis() as u64;
            let base = 2000u64 << (attempt - 1);
            assert!(d >= base, "attempt {attempt}: {d} < {base}");
            assert!(d <= (base as f32 * 1.5) as u64 + 1, "attempt {attempt}: {d} too large");
        }
    }
}
