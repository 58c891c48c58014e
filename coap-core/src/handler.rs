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

//! Server-side dispatch traits: the capability sets a path-registered handler, a
//! request filter, and a response listener each implement, plus the outcome protocol
//! a handler hands back to the endpoint's dispatch loop.

use crate::message::{MsgCode, MsgToken};
use crate::responder::Responder;
use crate::{BlockInfo, Error};
use bitflags::bitflags;

bitflags! {
    /// Method-gate bitflags a registered handler advertises, controlling which request
    /// methods the dispatcher will route to it before ever calling into it.
    #[derive(Default)]
    pub struct AllowedMethods: u8 {
        /// Allow `GET`.
        const GET = 0b0001;
        /// Allow `POST`.
        const POST = 0b0010;
        /// Allow `PUT`.
        const PUT = 0b0100;
        /// Allow `DELETE`.
        const DELETE = 0b1000;
        /// Allow all four standard methods.
        const ALL = Self::GET.bits | Self::POST.bits | Self::PUT.bits | Self::DELETE.bits;
    }
}

impl AllowedMethods {
    /// Returns true if `code` names a method this mask allows.
    pub fn permits(&self, code: MsgCode) -> bool {
        match code {
            MsgCode::MethodGet => self.contains(AllowedMethods::GET),
            MsgCode::MethodPost => self.contains(AllowedMethods::POST),
            MsgCode::MethodPut => self.contains(AllowedMethods::PUT),
            MsgCode::MethodDelete => self.contains(AllowedMethods::DELETE),
            _ => false,
        }
    }
}

/// What a handler or filter hands back to the dispatch loop after processing one
/// inbound request.
#[derive(Debug)]
pub enum HandlerOutcome {
    /// A response has already been written via the [`Responder`]; dispatch is complete.
    Responded,

    /// No response body was written; reply with this bare response code
    /// (e.g. `2.04 Changed` for a `PUT` that doesn't echo a representation).
    Code(MsgCode),

    /// This handler cannot produce a response synchronously (e.g. it is waiting on a
    /// blockwise continuation); the exchange's `Responder` is retained for a later call.
    Deferred,

    /// Processing failed; the dispatcher maps this to a CoAP error response.
    Error(Error),
}

/// A handler registered against one path prefix in an [`Endpoint`](crate::endpoint::Endpoint)'s
/// request table (§4.3 "Server dispatch").
pub trait RequestHandler {
    /// Bitmask of methods this handler accepts; requests with any other method never
    /// reach [`RequestHandler::handle_request`] and are answered `4.05 Method Not Allowed`
    /// by the dispatcher directly.
    fn allowed_methods(&self) -> AllowedMethods {
        AllowedMethods::ALL
    }

    /// Processes one inbound request, writing a response (if any) through `responder`.
    ///
    /// `block1`/`block2` are this request's `Block1`/`Block2` option values, if present
    /// — a handler servicing a blockwise transfer (§4.5.2) needs them to drive a
    /// [`crate::blockwise::BlockwiseServerHelper`]; a handler that never produces or
    /// accepts a multi-block body can ignore both.
    fn handle_request(
        &mut self,
        code: MsgCode,
        path: &[&str],
        query: &[&str],
        payload: &[u8],
        token: MsgToken,
        block1: Option<BlockInfo>,
        block2: Option<BlockInfo>,
        responder: &mut dyn Responder,
    ) -> HandlerOutcome;
}

/// A filter consulted before dispatch reaches the matching [`RequestHandler`] (§4.3).
/// Filters run in registration order. Returning `None` lets the request continue to the
/// next filter (or the matched handler); returning `Some` terminates dispatch with that
/// outcome.
pub trait RequestFilter {
    /// Inspects (and may short-circuit) one inbound request. Returning `None` lets
    /// dispatch continue to the next filter or the matched handler; returning `Some`
    /// terminates dispatch with that outcome.
    fn filter_request(
        &mut self,
        code: MsgCode,
        path: &[&str],
        query: &[&str],
        payload: &[u8],
        token: MsgToken,
        block1: Option<BlockInfo>,
        block2: Option<BlockInfo>,
        responder: &mut dyn Responder,
    ) -> Option<HandlerOutcome>;
}

/// Receives the outcome of a single-shot client request issued via
/// [`Endpoint::send_request`](crate::endpoint::Endpoint::send_request).
pub trait ResponseListener {
    /// Called when the empty `Ack` for a `Confirmable` request arrives, strictly before
    /// any [`ResponseListener::on_response`] call for the same request (§5 Ordering). A
    /// piggybacked response still fires this first. No-op by default for listeners that
    /// don't care about the distinction.
    fn on_ack(&mut self) {}

    /// Called when a response (or an error in lieu of one) arrives for this request.
    fn on_response(&mut self, result: Result<ResponseView<'_>, Error>);
}

/// Extension of [`ResponseListener`] for requests driven through the blockwise client
/// state machine (§4.5.1): called once per received block rather than once overall.
pub trait BlockwiseResponseListener {
    /// Called for each response block as it arrives. `block` is `None` for a
    /// non-blockwise (single-datagram) response.
    fn on_response_block(
        &mut self,
        result: Result<ResponseView<'_>, Error>,
        block: Option<BlockInfo>,
    );
}

/// A borrowed view of an inbound response, handed to a [`ResponseListener`].
#[derive(Debug, Copy, Clone)]
pub struct ResponseView<'a> {
    /// The response's message code.
    pub code: MsgCode,
    /// The response payload (one block's worth, if blockwise).
    pub payload: &'a [u8],
    /// The response's `ETag`, if any.
    pub etag: Option<crate::ETag>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn allowed_methods_permits_only_set_bits() {
        let mask = AllowedMethods::GET | AllowedMethods::PUT;
        assert!(mask.permits(MsgCode::MethodGet));
        assert!(mask.permits(MsgCode::MethodPut));
        assert!(!mask.permits(MsgCode::MethodPost));
        assert!(!mask.permits(MsgCode::MethodDelete));
    }

    #[test]
    fn all_mask_permits_every_method() {
        let mask = AllowedMethods::ALL;
        assert!(mask.permits(MsgCode::MethodGet));
        assert!(mask.permits(MsgCode::MethodPost));
        assert!(mask.permits(MsgCode::MethodPut));
        assert!(mask.permits(MsgCode::MethodDelete));
    }

    #[test]
    fn non_method_code_is_never_permitted() {
        let mask = AllowedMethods::ALL;
        assert!(!mask.permits(MsgCode::SuccessChanged));
    }
}
