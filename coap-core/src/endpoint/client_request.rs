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

//! The per-outstanding-request bookkeeping an [`Endpoint`](super::Endpoint) keeps
//! between `send_request` and the moment a listener is released.

use crate::handler::ResponseListener;
use crate::message::MsgToken;
use crate::transport::TimerScheduler;

/// One request the endpoint is still waiting on a response (or ACK) for.
pub struct ClientRequest<M, T: TimerScheduler> {
    /// The token this request was sent with; doubles as its key in the outstanding table.
    pub(super) token: MsgToken,

    /// The message-id of the original (and, for retransmissions, most recent) transmission.
    pub(super) msg_id: u16,

    /// Peer address metadata, retained so a reply can be matched and a retransmission
    /// re-targeted.
    pub(super) remote: M,

    /// The serialized datagram, retained verbatim for retransmission.
    pub(super) datagram: Vec<u8>,

    /// Whether the original send was Confirmable (only CON requests retransmit).
    pub(super) confirmable: bool,

    /// Remaining retransmission attempts.
    pub(super) retries_remaining: u32,

    /// Attempt count so far, used to compute the next backoff via
    /// [`crate::EndpointConstants::calc_retransmit_duration`].
    pub(super) attempt: u32,

    /// Opaque timer handle for the currently scheduled retransmission, if any.
    pub(super) timer_id: Option<T::TimerId>,

    /// Set once an ACK (or a piggybacked response, which implies one) has been seen.
    pub(super) ack_received: bool,

    /// Set once a final response has been delivered to the listener.
    pub(super) response_received: bool,

    /// The callback to invoke when a response, error, or reset arrives.
    pub(super) listener: Box<dyn ResponseListener>,
}

impl<M: core::fmt::Debug, T: TimerScheduler> core::fmt::Debug for ClientRequest<M, T> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("ClientRequest")
            .field("token", &self.token)
            .field("msg_id", &self.msg_id)
            .field("remote", &self.remote)
            .field("confirmable", &self.confirmable)
            .field("retries_remaining", &self.retries_remaining)
            .field("attempt", &self.attempt)
            .field("ack_received", &self.ack_received)
            .field("response_received", &self.response_received)
            .finish()
    }
}
