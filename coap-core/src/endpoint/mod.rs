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

//! The endpoint: owns the transport attachment, message-id/token allocation, the
//! outstanding-request table, the registered-handler list, the filter chain, and drives
//! dispatch, ACK/CON/NON semantics, and retransmission timers.

mod client_request;
pub use client_request::ClientRequest;

use crate::handler::{
    AllowedMethods, HandlerOutcome, RequestFilter, RequestHandler, ResponseListener, ResponseView,
};
use crate::message::{
    MessageRead, MessageWrite, MsgCode, MsgToken, MsgType, StandardMessageParser, VecMessageEncoder,
};
use crate::option::{self, OptionInsertExt};
use crate::responder::{BufferedResponder, Responder};
use crate::splitter;
use crate::transport::{DatagramMetadata, DatagramSink, RandomSource, TimerScheduler};
use crate::{
    dedup::{Deduplicator, Observation},
    EndpointConstants, Error,
};
use std::collections::HashMap;
use std::time::Instant;

struct HandlerEntry {
    path: Vec<String>,
    allowed: AllowedMethods,
    handler: Box<dyn RequestHandler>,
}

/// A CoAP protocol endpoint: a sans-I/O state machine that a host drives by feeding it
/// inbound datagrams ([`Endpoint::receive_datagram`]) and firing timers
/// ([`Endpoint::timer_fired`]), and which in turn calls out through a [`DatagramSink`]
/// and [`TimerScheduler`] it was created with.
pub struct Endpoint<C, M, T, S>
where
    C: EndpointConstants,
    M: DatagramMetadata + PartialEq,
    T: TimerScheduler,
    S: DatagramSink<M>,
{
    constants: C,
    sink: Option<S>,
    source_attached: bool,
    timer: T,
    random: Box<dyn RandomSource>,
    next_message_id: u16,
    next_token_counter: u64,
    token_prefix: Vec<u8>,
    outstanding: HashMap<MsgToken, ClientRequest<M, T>>,
    handlers: Vec<HandlerEntry>,
    default_handler: Option<Box<dyn RequestHandler>>,
    filters: Vec<Box<dyn RequestFilter>>,
    dedup: Deduplicator<M>,
}

impl<C, M, T, S> core::fmt::Debug for Endpoint<C, M, T, S>
where
    C: EndpointConstants,
    M: DatagramMetadata + PartialEq,
    T: TimerScheduler,
    S: DatagramSink<M>,
{
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Endpoint")
            .field("next_message_id", &self.next_message_id)
            .field("next_token_counter", &self.next_token_counter)
            .field("token_prefix", &self.token_prefix)
            .field("outstanding_count", &self.outstanding.len())
            .field("handler_count", &self.handlers.len())
            .field("filter_count", &self.filters.len())
            .finish()
    }
}

impl<C, M, T, S> Endpoint<C, M, T, S>
where
    C: EndpointConstants,
    M: DatagramMetadata + PartialEq,
    T: TimerScheduler,
    S: DatagramSink<M>,
{
    /// Creates a new endpoint, seeding its message-id and token counters from `random`.
    pub fn create(timer: T, mut random: Box<dyn RandomSource>, constants: C) -> Self {
        let next_message_id = random.next_u16();
        let next_token_counter = random.next_u64();

        Endpoint {
            constants,
            sink: None,
            source_attached: false,
            timer,
            random,
            next_message_id,
            next_token_counter,
            token_prefix: Vec::new(),
            outstanding: HashMap::new(),
            handlers: Vec::new(),
            default_handler: None,
            filters: Vec::new(),
            dedup: Deduplicator::new(C::COAP_EXCHANGE_LIFETIME),
        }
    }

    /// Attaches the write half of the transport. Only one sink may be attached.
    pub fn attach_sink(&mut self, sink: S) -> Result<(), Error> {
        if self.sink.is_some() {
            return Err(Error::InvalidState);
        }
        self.sink = Some(sink);
        Ok(())
    }

    /// Marks the read half of the transport as attached. The endpoint does not hold the
    /// source itself; the host instead calls [`Endpoint::receive_datagram`] as datagrams
    /// arrive. This call exists to detect a double-attach per the operation contract.
    pub fn attach_source(&mut self) -> Result<(), Error> {
        if self.source_attached {
            return Err(Error::InvalidState);
        }
        self.source_attached = true;
        Ok(())
    }

    /// Sets the 0-4 byte prefix prepended to every token this endpoint emits, used to
    /// disambiguate coexisting endpoints sharing one transport.
    pub fn set_token_prefix(&mut self, prefix: &[u8]) -> Result<(), Error> {
        if prefix.len() > 4 {
            return Err(Error::InvalidArgument);
        }
        self.token_prefix = prefix.to_vec();
        Ok(())
    }

    /// Appends `handler` to the handler table, matched against requests whose path is
    /// `path` or a descendant of it (first registered, first matched).
    pub fn register_handler(
        &mut self,
        path: &str,
        allowed: AllowedMethods,
        handler: Box<dyn RequestHandler>,
    ) -> Result<(), Error> {
        let mut segments = Vec::new();
        splitter::split_path(path, &mut segments)?;
        self.handlers.push(HandlerEntry {
            path: segments.into_iter().map(String::from).collect(),
            allowed,
            handler,
        });
        Ok(())
    }

    /// Removes the first handler registered under exactly `path`.
    pub fn unregister_handler(&mut self, path: &str) -> Result<(), Error> {
        let mut segments = Vec::new();
        splitter::split_path(path, &mut segments)?;
        let index = self
            .handlers
            .iter()
            .position(|entry| entry.path.iter().map(String::as_str).eq(segments.iter().copied()))
            .ok_or(Error::NoSuchItem)?;
        self.handlers.remove(index);
        Ok(())
    }

    /// Installs (replacing any previous) the handler invoked when no registered path
    /// matches a request.
    pub fn set_default_handler(&mut self, handler: Option<Box<dyn RequestHandler>>) {
        self.default_handler = handler;
    }

    /// Appends `filter` to the filter chain, run in registration order before dispatch.
    pub fn register_filter(&mut self, filter: Box<dyn RequestFilter>) {
        self.filters.push(filter);
    }

    /// Removes the last-registered filter. (Filters are anonymous trait objects, so
    /// there is no stronger identity to match against without an explicit key; hosts
    /// that need selective removal should wrap filters to expose one.)
    pub fn unregister_filter(&mut self) -> Result<(), Error> {
        if self.filters.pop().is_some() {
            Ok(())
        } else {
            Err(Error::NoSuchItem)
        }
    }

    fn next_token(&mut self) -> MsgToken {
        let counter = self.next_token_counter;
        self.next_token_counter = self.next_token_counter.wrapping_add(1);
        MsgToken::with_prefix_and_counter(&self.token_prefix, counter)
    }

    fn next_msg_id(&mut self) -> u16 {
        let id = self.next_message_id;
        self.next_message_id = self.next_message_id.wrapping_add(1);
        id
    }

    fn try_write(&mut self, datagram: &[u8], destination: Option<&M>) -> Result<(), Error> {
        match &mut self.sink {
            Some(sink) => match sink.put(datagram, destination) {
                Err(Error::WouldBlock) => Ok(()),
                other => other,
            },
            None => Err(Error::InvalidState),
        }
    }

    /// Sends a non-blockwise request, returning the token it was assigned.
    ///
    /// Follows the outbound path (§4.2): allocate token and message-id, serialize,
    /// install in the outstanding table, attempt a transport write, and — for
    /// Confirmable requests — arm the retransmission timer.
    pub fn send_request(
        &mut self,
        confirmable: bool,
        code: MsgCode,
        remote: M,
        path: &[&str],
        query: &[&str],
        payload: &[u8],
        listener: Box<dyn ResponseListener>,
    ) -> Result<MsgToken, Error> {
        let token = self.next_token();
        let msg_id = self.next_msg_id();

        let mut message = VecMessageEncoder::new();
        message.set_msg_type(if confirmable {
            MsgType::Confirmable
        } else {
            MsgType::NonConfirmable
        });
        message.set_msg_code(code);
        message.set_msg_id(msg_id);
        message.set_msg_token(token);
        for segment in path {
            message.insert_option(option::URI_PATH, *segment)?;
        }
        for segment in query {
            message.insert_option(option::URI_QUERY, *segment)?;
        }
        message.append_payload_bytes(payload)?;

        let datagram: Vec<u8> = message.into();

        self.try_write(&datagram, Some(&remote))?;

        let timer_id = if confirmable {
            Some(
                self.timer
                    .schedule(self.constants.calc_retransmit_duration(1), token),
            )
        } else {
            None
        };

        self.outstanding.insert(
            token,
            ClientRequest {
                token,
                msg_id,
                remote,
                datagram,
                confirmable,
                retries_remaining: self.constants.coap_max_retransmit(),
                attempt: 1,
                timer_id,
                ack_received: !confirmable,
                response_received: false,
                listener,
            },
        );

        Ok(token)
    }

    /// Removes `token` from the outstanding table, cancels its retransmission timer, and
    /// guarantees no further listener callback will fire for it.
    pub fn cancel_request(&mut self, token: MsgToken) -> Result<(), Error> {
        let request = self.outstanding.remove(&token).ok_or(Error::NoSuchItem)?;
        if let Some(timer_id) = request.timer_id {
            self.timer.cancel(timer_id);
        }
        Ok(())
    }

    /// Called by the host when `token`'s retransmission timer fires.
    pub fn timer_fired(&mut self, token: MsgToken) {
        let resend = {
            let request = match self.outstanding.get_mut(&token) {
                Some(r) => r,
                None => return,
            };

            if request.ack_received {
                request.timer_id = None;
                return;
            }

            if request.retries_remaining == 0 {
                None
            } else {
                request.retries_remaining -= 1;
                request.attempt += 1;
                Some((request.datagram.clone(), request.remote.clone(), request.attempt))
            }
        };

        match resend {
            Some((datagram, remote, attempt)) => {
                let _ = self.try_write(&datagram, Some(&remote));
                let delay = self.constants.calc_retransmit_duration(attempt);
                let timer_id = self.timer.schedule(delay, token);
                if let Some(request) = self.outstanding.get_mut(&token) {
                    request.timer_id = Some(timer_id);
                }
            }
            None => {
                if let Some(mut request) = self.outstanding.remove(&token) {
                    request.listener.on_response(Err(Error::Timeout));
                }
            }
        }
    }

    /// Feeds one inbound datagram from `remote` into the endpoint.
    ///
    /// Malformed datagrams are logged and dropped rather than surfaced as an error,
    /// except that a `Reset` for a known token is delivered to that request's listener.
    pub fn receive_datagram(&mut self, buffer: &[u8], remote: M, now: Instant) {
        let parsed = match StandardMessageParser::new(buffer) {
            Ok(p) => p,
            Err(e) => {
                log::debug!("dropping unparsable datagram: {:?}", e);
                return;
            }
        };

        if parsed.msg_code().is_method() {
            self.handle_request(&parsed, remote, now);
        } else if parsed.msg_type().is_reset() {
            self.handle_reset(&parsed);
        } else {
            self.handle_response(&parsed, remote);
        }
    }

    fn handle_reset(&mut self, parsed: &StandardMessageParser<'_>) {
        let token = parsed.msg_token();
        if let Some(mut request) = self.outstanding.remove(&token) {
            if let Some(timer_id) = request.timer_id {
                self.timer.cancel(timer_id);
            }
            request.listener.on_response(Err(Error::Reset));
        }
    }

    fn handle_response(&mut self, parsed: &StandardMessageParser<'_>, remote: M) {
        let token = parsed.msg_token();

        let is_empty_ack = parsed.msg_type().is_ack() && parsed.msg_code().is_empty();

        if is_empty_ack {
            if let Some(request) = self.outstanding.get_mut(&token) {
                request.ack_received = true;
                if let Some(timer_id) = request.timer_id.take() {
                    self.timer.cancel(timer_id);
                }
                request.listener.on_ack();
            }
            return;
        }

        if parsed.msg_type().is_con() {
            let ack = self.build_empty_ack(parsed.msg_id());
            let _ = self.try_write(&ack, Some(&remote));
        }

        let view = ResponseView {
            code: parsed.msg_code(),
            payload: parsed.payload(),
            etag: parsed.options().find_next_of(option::ETAG).and_then(|r| r.ok()),
        };

        if let Some(mut request) = self.outstanding.remove(&token) {
            if let Some(timer_id) = request.timer_id.take() {
                self.timer.cancel(timer_id);
            }
            request.response_received = true;
            request.listener.on_ack();
            request.listener.on_response(Ok(view));
        }
    }

    fn build_empty_ack(&self, msg_id: u16) -> Vec<u8> {
        let mut message = VecMessageEncoder::new();
        message.set_msg_type(MsgType::Acknowledgement);
        message.set_msg_code(MsgCode::Empty);
        message.set_msg_id(msg_id);
        message.into()
    }

    fn handle_request(&mut self, parsed: &StandardMessageParser<'_>, remote: M, now: Instant) {
        let msg_id = parsed.msg_id();

        match self.dedup.observe(remote.clone(), msg_id, now) {
            Observation::New => {}
            Observation::Duplicate { cached_reply } => {
                if parsed.msg_type().is_con() {
                    let datagram = cached_reply.unwrap_or_else(|| self.build_empty_ack(msg_id));
                    let _ = self.try_write(&datagram, Some(&remote));
                }
                return;
            }
        }

        let mut path_segments = Vec::new();
        let mut query_segments = Vec::new();
        let mut iter = parsed.options();
        if iter.extract_uri_path_segments(&mut path_segments).is_err() {
            return;
        }
        while let Some(Ok(q)) = iter.find_next_of(option::URI_QUERY) {
            query_segments.push(q);
        }
        let block1 = parsed.options().find_next_of(option::BLOCK1).and_then(|r| r.ok());
        let block2 = parsed.options().find_next_of(option::BLOCK2).and_then(|r| r.ok());

        let reply_type = if parsed.msg_type().is_con() {
            MsgType::Acknowledgement
        } else {
            MsgType::NonConfirmable
        };
        let mut responder = BufferedResponder::new(reply_type, msg_id, parsed.msg_token());

        let code = parsed.msg_code();
        let payload = parsed.payload();
        let token = parsed.msg_token();

        for filter in self.filters.iter_mut() {
            if let Some(outcome) = filter.filter_request(
                code,
                &path_segments,
                &query_segments,
                payload,
                token,
                block1,
                block2,
                &mut responder,
            ) {
                self.dispatch_outcome(outcome, &mut responder, reply_type, msg_id, token, &remote);
                return;
            }
        }

        let matched = self
            .handlers
            .iter_mut()
            .find(|entry| is_path_prefix(&entry.path, &path_segments));

        let outcome = match matched {
            Some(entry) => {
                if !entry.allowed.permits(code) {
                    HandlerOutcome::Code(MsgCode::ClientErrorMethodNotAllowed)
                } else {
                    entry.handler.handle_request(
                        code,
                        &path_segments,
                        &query_segments,
                        payload,
                        token,
                        block1,
                        block2,
                        &mut responder,
                    )
                }
            }
            None => match &mut self.default_handler {
                Some(handler) => handler.handle_request(
                    code,
                    &path_segments,
                    &query_segments,
                    payload,
                    token,
                    block1,
                    block2,
                    &mut responder,
                ),
                None => HandlerOutcome::Code(MsgCode::ClientErrorNotFound),
            },
        };

        self.dispatch_outcome(outcome, &mut responder, reply_type, msg_id, token, &remote);
    }

    /// Resolves a [`HandlerOutcome`] into (at most) one outbound datagram: a
    /// [`HandlerOutcome::Responded`] hands back whatever `responder` already buffered via
    /// [`Responder::send_response`]; a bare [`HandlerOutcome::Code`] or
    /// [`HandlerOutcome::Error`] gets an empty response built from the original
    /// type/message-id/token; [`HandlerOutcome::Deferred`] sends nothing.
    fn dispatch_outcome(
        &mut self,
        outcome: HandlerOutcome,
        responder: &mut BufferedResponder,
        reply_type: MsgType,
        msg_id: u16,
        token: MsgToken,
        remote: &M,
    ) {
        let datagram = match outcome {
            HandlerOutcome::Responded => match responder.take_sent_datagram() {
                Some(datagram) => datagram,
                None => return,
            },
            HandlerOutcome::Deferred => return,
            HandlerOutcome::Code(code) => self.build_empty_reply(reply_type, msg_id, token, code),
            HandlerOutcome::Error(_) => self.build_empty_reply(
                reply_type,
                msg_id,
                token,
                MsgCode::ServerErrorInternalServerError,
            ),
        };

        let _ = self.try_write(&datagram, Some(remote));

        // Only a Confirmable exchange can see a retransmitted duplicate request; a cached
        // reply for a NonConfirmable one would never be read back out.
        if reply_type == MsgType::Acknowledgement {
            self.dedup.cache_reply(remote, msg_id, datagram);
        }
    }

    fn build_empty_reply(
        &self,
        reply_type: MsgType,
        msg_id: u16,
        token: MsgToken,
        code: MsgCode,
    ) -> Vec<u8> {
        let mut message = VecMessageEncoder::new();
        message.set_msg_type(reply_type);
        message.set_msg_code(code);
        message.set_msg_id(msg_id);
        message.set_msg_token(token);
        message.into()
    }
}

fn is_path_prefix(registered: &[String], request: &[&str]) -> bool {
    registered.len() <= request.len()
        && registered
            .iter()
            .zip(request.iter())
            .all(|(a, b)| a.as_str() == *b)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::ThreadRngSource;
    use crate::{BlockInfo, StandardCoapConstants};
    use std::cell::{Cell, RefCell};
    use std::rc::Rc;

    #[test]
    fn path_prefix_matches_exact_and_descendant_paths() {
        let registered = vec!["sensors".to_string(), "temp".to_string()];
        assert!(is_path_prefix(&registered, &["sensors", "temp"]));
        assert!(is_path_prefix(&registered, &["sensors", "temp", "celsius"]));
        assert!(!is_path_prefix(&registered, &["sensors"]));
        assert!(!is_path_prefix(&registered, &["sensors", "humidity"]));
    }

    #[test]
    fn empty_registered_path_matches_anything() {
        assert!(is_path_prefix(&[], &["anything", "goes"]));
        assert!(is_path_prefix(&[], &[]));
    }

    type Addr = u8;

    #[derive(Debug, Default)]
    struct FakeSink {
        outbox: Rc<RefCell<Vec<(Option<Addr>, Vec<u8>)>>>,
    }

    impl DatagramSink<Addr> for FakeSink {
        fn put(&mut self, buffer: &[u8], destination: Option<&Addr>) -> Result<(), Error> {
            self.outbox
                .borrow_mut()
                .push((destination.copied(), buffer.to_vec()));
            Ok(())
        }
    }

    #[derive(Debug, Default)]
    struct FakeTimer {
        next_id: u64,
    }

    impl TimerScheduler for FakeTimer {
        type TimerId = u64;

        fn schedule(&mut self, _delay: core::time::Duration, _token: MsgToken) -> u64 {
            self.next_id += 1;
            self.next_id
        }

        fn cancel(&mut self, _id: u64) {}
    }

    type TestEndpoint = Endpoint<StandardCoapConstants, Addr, FakeTimer, FakeSink>;

    fn make_endpoint() -> (TestEndpoint, Rc<RefCell<Vec<(Option<Addr>, Vec<u8>)>>>) {
        let outbox = Rc::new(RefCell::new(Vec::new()));
        let sink = FakeSink {
            outbox: outbox.clone(),
        };
        let mut endpoint = Endpoint::create(
            FakeTimer::default(),
            Box::new(ThreadRngSource),
            StandardCoapConstants::default(),
        );
        endpoint.attach_sink(sink).unwrap();
        (endpoint, outbox)
    }

    /// A handler that counts how many times it was actually invoked, so a test can tell
    /// a deduped retransmission (which must not reach the handler) from a fresh request.
    struct CountingHandler {
        calls: Rc<Cell<u32>>,
        reply: &'static [u8],
    }

    impl RequestHandler for CountingHandler {
        fn allowed_methods(&self) -> AllowedMethods {
            AllowedMethods::ALL
        }

        fn handle_request(
            &mut self,
            _code: MsgCode,
            _path: &[&str],
            _query: &[&str],
            _payload: &[u8],
            _token: MsgToken,
            _block1: Option<BlockInfo>,
            _block2: Option<BlockInfo>,
            responder: &mut dyn Responder,
        ) -> HandlerOutcome {
            self.calls.set(self.calls.get() + 1);
            match responder.respond(MsgCode::SuccessContent, self.reply) {
                Ok(()) => HandlerOutcome::Responded,
                Err(e) => HandlerOutcome::Error(e),
            }
        }
    }

    #[derive(Default)]
    struct CapturingListener {
        results: Rc<RefCell<Vec<Result<Vec<u8>, Error>>>>,
    }

    impl ResponseListener for CapturingListener {
        fn on_response(&mut self, result: Result<ResponseView<'_>, Error>) {
            self.results
                .borrow_mut()
                .push(result.map(|view| view.payload.to_vec()));
        }
    }

    const SERVER_ADDR: Addr = 1;
    const CLIENT_ADDR: Addr = 9;

    #[test]
    fn duplicate_confirmable_request_replays_cached_response() {
        let (mut server, server_outbox) = make_endpoint();
        let calls = Rc::new(Cell::new(0u32));
        server
            .register_handler(
                "echo",
                AllowedMethods::GET,
                Box::new(CountingHandler {
                    calls: calls.clone(),
                    reply: b"hi",
                }),
            )
            .unwrap();

        let (mut client, client_outbox) = make_endpoint();
        let results = Rc::new(RefCell::new(Vec::new()));
        client
            .send_request(
                true,
                MsgCode::MethodGet,
                SERVER_ADDR,
                &["echo"],
                &[],
                b"",
                Box::new(CapturingListener {
                    results: results.clone(),
                }),
            )
            .unwrap();

        let request_bytes = client_outbox.borrow()[0].1.clone();
        let now = Instant::now();

        server.receive_datagram(&request_bytes, CLIENT_ADDR, now);
        assert_eq!(calls.get(), 1);
        assert_eq!(server_outbox.borrow().len(), 1);

        // The client's ACK is lost in transit, so it retransmits the identical request
        // (same message-id and token) — the server must not invoke the handler again,
        // and must resend exactly the reply the first dispatch produced.
        server.receive_datagram(&request_bytes, CLIENT_ADDR, now);
        assert_eq!(calls.get(), 1, "duplicate must not reach the handler");
        let outbox = server_outbox.borrow();
        assert_eq!(outbox.len(), 2);
        assert_eq!(
            outbox[0].1, outbox[1].1,
            "duplicate must replay the exact cached reply"
        );
    }

    #[test]
    fn duplicate_non_confirmable_request_is_not_redispatched() {
        let (mut server, server_outbox) = make_endpoint();
        let calls = Rc::new(Cell::new(0u32));
        server
            .register_handler(
                "echo",
                AllowedMethods::GET,
                Box::new(CountingHandler {
                    calls: calls.clone(),
                    reply: b"hi",
                }),
            )
            .unwrap();

        let (mut client, client_outbox) = make_endpoint();
        client
            .send_request(
                false,
                MsgCode::MethodGet,
                SERVER_ADDR,
                &["echo"],
                &[],
                b"",
                Box::new(CapturingListener::default()),
            )
            .unwrap();

        let request_bytes = client_outbox.borrow()[0].1.clone();
        let now = Instant::now();

        server.receive_datagram(&request_bytes, CLIENT_ADDR, now);
        assert_eq!(calls.get(), 1);
        assert_eq!(server_outbox.borrow().len(), 1);

        server.receive_datagram(&request_bytes, CLIENT_ADDR, now);
        assert_eq!(calls.get(), 1, "NonConfirmable duplicate must not be redispatched");
        assert_eq!(
            server_outbox.borrow().len(),
            1,
            "no additional reply is sent for a NonConfirmable duplicate"
        );
    }

    #[test]
    fn retransmission_exhaustion_reports_timeout_to_listener() {
        let (mut client, outbox) = make_endpoint();
        let results = Rc::new(RefCell::new(Vec::new()));
        let token = client
            .send_request(
                true,
                MsgCode::MethodGet,
                SERVER_ADDR,
                &["echo"],
                &[],
                b"",
                Box::new(CapturingListener {
                    results: results.clone(),
                }),
            )
            .unwrap();

        assert_eq!(outbox.borrow().len(), 1);

        // StandardCoapConstants::COAP_MAX_RETRANSMIT is 4: four retransmissions follow
        // the initial send before the exchange gives up.
        for _ in 0..4 {
            client.timer_fired(token);
        }
        assert_eq!(outbox.borrow().len(), 5, "initial send plus 4 retransmissions");
        assert!(results.borrow().is_empty(), "no outcome before retries are exhausted");

        client.timer_fired(token);
        assert_eq!(results.borrow().len(), 1);
        assert!(matches!(results.borrow()[0], Err(Error::Timeout)));
    }

    #[test]
    fn request_to_descendant_of_registered_path_reaches_handler() {
        let (mut server, server_outbox) = make_endpoint();
        let calls = Rc::new(Cell::new(0u32));
        server
            .register_handler(
                "sensors",
                AllowedMethods::GET,
                Box::new(CountingHandler {
                    calls: calls.clone(),
                    reply: b"21C",
                }),
            )
            .unwrap();

        let (mut client, client_outbox) = make_endpoint();
        client
            .send_request(
                true,
                MsgCode::MethodGet,
                SERVER_ADDR,
                &["sensors", "temp"],
                &[],
                b"",
                Box::new(CapturingListener::default()),
            )
            .unwrap();

        let request_bytes = client_outbox.borrow()[0].1.clone();
        server.receive_datagram(&request_bytes, CLIENT_ADDR, Instant::now());

        assert_eq!(calls.get(), 1);
        assert!(!server_outbox.borrow()[0].1.is_empty());
    }
}
