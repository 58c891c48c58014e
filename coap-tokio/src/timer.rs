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

//! A [`TimerScheduler`] backed by wall-clock deadlines, driven by [`run`](crate::run)'s
//! event loop rather than by spawning a `tokio::time::sleep` task per timer.

use coap_core::message::MsgToken;
use coap_core::transport::TimerScheduler;
use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;
use std::time::{Duration, Instant};

#[derive(Debug, Default)]
struct Inner {
    next_id: u64,
    timers: HashMap<u64, (Instant, MsgToken)>,
}

/// A [`TimerScheduler`] for a single-threaded Tokio endpoint.
///
/// Cloning shares the same underlying timer set: the clone embedded in the
/// [`Endpoint`](coap_core::endpoint::Endpoint) via [`TimerScheduler::schedule`]/`cancel`
/// and the clone retained by [`crate::run`]'s event loop (to find the next deadline and
/// drain expired timers) are the same set of pending timers.
#[derive(Debug, Clone, Default)]
pub struct TokioTimerScheduler {
    inner: Rc<RefCell<Inner>>,
}

impl TokioTimerScheduler {
    /// Creates an empty timer set.
    pub fn new() -> Self {
        TokioTimerScheduler::default()
    }

    /// The earliest deadline among all pending timers, if any.
    pub fn next_deadline(&self) -> Option<Instant> {
        self.inner.borrow().timers.values().map(|(deadline, _)| *deadline).min()
    }

    /// Removes and returns the token of every timer whose deadline has elapsed by `now`.
    pub fn drain_expired(&self, now: Instant) -> Vec<MsgToken> {
        let mut inner = self.inner.borrow_mut();
        let expired_ids: Vec<u64> = inner
            .timers
            .iter()
            .filter(|(_, (deadline, _))| *deadline <= now)
            .map(|(id, _)| *id)
            .collect();
        expired_ids
            .into_iter()
            .map(|id| inner.timers.remove(&id).expect("id came from timers").1)
            .collect()
    }
}

impl TimerScheduler for TokioTimerScheduler {
    type TimerId = u64;

    fn schedule(&mut self, delay: Duration, token: MsgToken) -> u64 {
        let mut inner = self.inner.borrow_mut();
        let id = inner.next_id;
        inner.next_id += 1;
        let deadline = Instant::now() + delay;
        inner.timers.insert(id, (deadline, token));
        id
    }

    fn cancel(&mut self, id: u64) {
        self.inner.borrow_mut().timers.remove(&id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn schedule_and_cancel_remove_from_the_pending_set() {
        let mut timers = TokioTimerScheduler::new();
        let a = timers.schedule(Duration::from_secs(10), MsgToken::new(&[1]));
        let _b = timers.schedule(Duration::from_millis(1), MsgToken::new(&[2]));
        assert!(timers.next_deadline().is_some());

        timers.cancel(a);
        let expired = timers.drain_expired(Instant::now() + Duration::from_secs(1));
        assert_eq!(expired, vec![MsgToken::new(&[2])]);
        assert!(timers.next_deadline().is_none());
    }

    #[test]
    fn drain_expired_only_takes_elapsed_timers() {
        let mut timers = TokioTimerScheduler::new();
        timers.schedule(Duration::from_secs(60), MsgToken::new(&[9]));
        assert!(timers.drain_expired(Instant::now()).is_empty());
    }
}
