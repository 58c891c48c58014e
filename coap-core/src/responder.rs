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

//! The handle a server handler uses to produce a reply, either inline or after
//! returning [`HandlerOutcome::Deferred`](crate::handler::HandlerOutcome::Deferred).

use crate::message::{MessageWrite, MsgCode, MsgToken, VecMessageEncoder};
use crate::Error;

/// A handle for producing exactly one reply to an inbound request.
///
/// Exactly one of [`Responder::send_response`] or [`Responder::release`] must be called
/// over the handle's lifetime; an `Endpoint` implementation enforces this by tracking
/// whether the retained exchange slot has already been answered.
pub trait Responder {
    /// Builds a response message pre-populated with the type/token/message-id needed to
    /// match the original request, with `code` and `payload` set and ready for the
    /// caller to add options to before calling [`Responder::send_response`].
    fn create_response(&self, code: MsgCode, payload: &[u8]) -> Result<VecMessageEncoder, Error>;

    /// Sends a response previously built with [`Responder::create_response`]. Consumes
    /// this responder's reply slot; calling it twice is a programming error.
    fn send_response(&mut self, message: VecMessageEncoder) -> Result<(), Error>;

    /// Convenience: builds and sends a response with `code` and `payload` and no
    /// additional options in one call.
    fn respond(&mut self, code: MsgCode, payload: &[u8]) -> Result<(), Error> {
        let message = self.create_response(code, payload)?;
        self.send_response(message)
    }

    /// Releases this responder without producing a reply. The peer eventually times out
    /// or retries, per RFC7252 retransmission semantics.
    ///
    /// Excluded from the `dyn Responder` vtable (a by-value `self` receiver can't be
    /// dispatched through a trait object); callers holding a `&mut dyn Responder` instead
    /// simply let it drop without calling [`Responder::send_response`].
    fn release(self)
    where
        Self: Sized;

    /// The token of the request this responder will reply to.
    fn request_token(&self) -> MsgToken;
}

/// A [`Responder`] backed by a retained copy of the originating request's type, token,
/// and message-id, writing into an owned [`VecMessageEncoder`].
#[derive(Debug)]
pub struct BufferedResponder {
    msg_type: crate::message::MsgType,
    msg_id: u16,
    token: MsgToken,
    replied: bool,
    sent_datagram: Option<Vec<u8>>,
}

impl BufferedResponder {
    /// Creates a responder for a request with the given type, message-id, and token.
    /// `msg_type` is already resolved by the caller into the correct reply type
    /// (`Acknowledgement` for a piggy-backed reply to a `Confirmable` request, or the
    /// matching `Confirmable`/`NonConfirmable` for a separate response).
    pub fn new(msg_type: crate::message::MsgType, msg_id: u16, token: MsgToken) -> Self {
        BufferedResponder {
            msg_type,
            msg_id,
            token,
            replied: false,
            sent_datagram: None,
        }
    }

    /// Takes the datagram built by a prior [`Responder::send_response`] call, if any, so
    /// the endpoint can hand it off to its transport. Returns `None` if
    /// [`Responder::release`] was called instead, or if nothing has been sent yet.
    pub(crate) fn take_sent_datagram(&mut self) -> Option<Vec<u8>> {
        self.sent_datagram.take()
    }
}

impl Responder for BufferedResponder {
    fn create_response(&self, code: MsgCode, payload: &[u8]) -> Result<VecMessageEncoder, Error> {
        let mut message = VecMessageEncoder::default();
        message.set_msg_type(self.msg_type);
        message.set_msg_id(self.msg_id);
        message.set_msg_code(code);
        message.set_msg_token(self.token);
        message.append_payload_bytes(payload)?;
        Ok(message)
    }

    fn send_response(&mut self, message: VecMessageEncoder) -> Result<(), Error> {
        if self.replied {
            return Err(Error::InvalidState);
        }
        self.replied = true;
        self.sent_datagram = Some(message.into());
        Ok(())
    }

    fn release(self) {}

    fn request_token(&self) -> MsgToken {
        self.token
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::message::{MessageRead, MsgType, StandardMessageParser};

    #[test]
    fn create_response_carries_token_and_code() {
        let responder = BufferedResponder::new(MsgType::Acknowledgement, 7, MsgToken::from(3u32));
        let response = responder
            .create_response(MsgCode::SuccessChanged, b"ok")
            .unwrap();
        let parsed = StandardMessageParser::new(response.as_bytes()).unwrap();
        assert_eq!(parsed.msg_code(), MsgCode::SuccessChanged);
        assert_eq!(parsed.msg_token(), MsgToken::from(3u32));
        assert_eq!(parsed.payload(), b"ok");
    }

    #[test]
    fn send_response_twice_is_rejected() {
        let mut responder = BufferedResponder::new(MsgType::Acknowledgement, 7, MsgToken::EMPTY);
        assert!(responder.respond(MsgCode::SuccessChanged, b"").is_ok());
        let second = responder.create_response(MsgCode::SuccessChanged, b"").unwrap();
        assert_eq!(responder.send_response(second), Err(Error::InvalidState));
    }

    #[test]
    fn sent_datagram_is_retained_for_the_endpoint_to_collect() {
        let mut responder = BufferedResponder::new(MsgType::Acknowledgement, 7, MsgToken::EMPTY);
        assert!(responder.take_sent_datagram().is_none());
        responder.respond(MsgCode::SuccessChanged, b"ok").unwrap();
        let datagram = responder.take_sent_datagram().unwrap();
        let parsed = StandardMessageParser::new(&datagram).unwrap();
        assert_eq!(parsed.msg_code(), MsgCode::SuccessChanged);
        assert_eq!(parsed.payload(), b"ok");
        assert!(responder.take_sent_datagram().is_none());
    }
}
