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

//! Inbound message-id deduplication, per RFC7252 §4.5: a `Confirmable` or
//! `NonConfirmable` message sharing a (source, message-id) pair with one already seen
//! within `COAP_EXCHANGE_LIFETIME` is a duplicate and must not be re-dispatched to a
//! handler, though a `Confirmable` duplicate still gets its `Ack`/`Reset` re-sent.

use crate::message::MsgId;
use std::collections::VecDeque;
use std::time::{Duration, Instant};

/// One remembered (peer, message-id) pair and when it expires.
#[derive(Debug, Clone)]
struct Entry<P> {
    peer: P,
    msg_id: MsgId,
    expires_at: Instant,
    cached_reply: Option<Vec<u8>>,
}

/// The result of observing one inbound message-id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Observation {
    /// Not seen before within the dedup window; the caller should dispatch normally.
    New,
    /// Already seen. Carries whatever reply the first dispatch produced via
    /// [`Deduplicator::cache_reply`], if any, so the caller can resend it verbatim for
    /// a `Confirmable` duplicate instead of invoking a handler a second time.
    Duplicate {
        /// The cached reply datagram, if the first dispatch produced one before this
        /// duplicate arrived.
        cached_reply: Option<Vec<u8>>,
    },
}

/// A time-bounded cache of recently seen inbound message-ids, keyed by peer.
///
/// Entries are stored in arrival order and expire in the same order, so eviction is a
/// cheap pop from the front rather than a scan.
#[derive(Debug)]
pub struct Deduplicator<P> {
    entries: VecDeque<Entry<P>>,
    lifetime: Duration,
}

impl<P: PartialEq + Clone> Deduplicator<P> {
    /// Creates a new deduplicator that remembers entries for `lifetime`
    /// (typically [`crate::EndpointConstants::coap_exchange_lifetime`]).
    pub fn new(lifetime: Duration) -> Self {
        Deduplicator {
            entries: VecDeque::new(),
            lifetime,
        }
    }

    /// Drops all entries that have expired as of `now`.
    pub fn evict_expired(&mut self, now: Instant) {
        while let Some(front) = self.entries.front() {
            if front.expires_at <= now {
                self.entries.pop_front();
            } else {
                break;
            }
        }
    }

    /// Records `(peer, msg_id)` as seen at `now`, returning whether it was already
    /// present — i.e. this inbound message is a duplicate — and, if so, whatever reply
    /// was cached for it.
    pub fn observe(&mut self, peer: P, msg_id: MsgId, now: Instant) -> Observation {
        self.evict_expired(now);

        if let Some(entry) = self
            .entries
            .iter()
            .find(|e| e.msg_id == msg_id && e.peer == peer)
        {
            return Observation::Duplicate {
                cached_reply: entry.cached_reply.clone(),
            };
        }

        self.entries.push_back(Entry {
            peer,
            msg_id,
            expires_at: now + self.lifetime,
            cached_reply: None,
        });
        Observation::New
    }

    /// Records the reply datagram produced for `(peer, msg_id)`'s first dispatch, so a
    /// later duplicate of the same `Confirmable` request resends exactly this datagram
    /// instead of a bare empty `Ack`. A no-op if the entry already expired.
    pub fn cache_reply(&mut self, peer: &P, msg_id: MsgId, datagram: Vec<u8>) {
        if let Some(entry) = self
            .entries
            .iter_mut()
            .find(|e| e.msg_id == msg_id && &e.peer == peer)
        {
            entry.cached_reply = Some(datagram);
        }
    }

    /// Number of entries currently retained.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if no entries are currently retained.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn second_observation_of_same_pair_is_duplicate() {
        let mut dedup: Deduplicator<u32> = Deduplicator::new(Duration::from_secs(247));
        let now = Instant::now();
        assert_eq!(dedup.observe(1, 42, now), Observation::New);
        assert_eq!(
            dedup.observe(1, 42, now),
            Observation::Duplicate { cached_reply: None }
        );
    }

    #[test]
    fn duplicate_carries_cached_reply() {
        let mut dedup: Deduplicator<u32> = Deduplicator::new(Duration::from_secs(247));
        let now = Instant::now();
        assert_eq!(dedup.observe(1, 42, now), Observation::New);
        dedup.cache_reply(&1, 42, vec![1, 2, 3]);
        assert_eq!(
            dedup.observe(1, 42, now),
            Observation::Duplicate {
                cached_reply: Some(vec![1, 2, 3])
            }
        );
    }

    #[test]
    fn different_peers_do_not_collide() {
        let mut dedup: Deduplicator<u32> = Deduplicator::new(Duration::from_secs(247));
        let now = Instant::now();
        assert_eq!(dedup.observe(1, 42, now), Observation::New);
        assert_eq!(dedup.observe(2, 42, now), Observation::New);
    }

    #[test]
    fn entries_expire_after_lifetime() {
        let mut dedup: Deduplicator<u32> = Deduplicator::new(Duration::from_secs(247));
        let now = Instant::now();
        assert_eq!(dedup.observe(1, 42, now), Observation::New);
        let later = now + Duration::from_secs(248);
        assert_eq!(dedup.observe(1, 42, later), Observation::New);
    }
}
