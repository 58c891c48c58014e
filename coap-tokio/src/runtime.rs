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

//! Wires a [`TokioUdpSocket`] and a [`TokioTimerScheduler`] to an
//! [`Endpoint`](coap_core::endpoint::Endpoint) and drives it from a Tokio event loop.
//!
//! The endpoint is single-threaded cooperative: every state transition (dispatch,
//! retransmission, timer schedule/cancel, handler registration) happens on whichever
//! task currently holds the `RefCell` borrow, so [`TokioEndpoint`] is meant to live on
//! one [`tokio::task::LocalSet`] (e.g. behind `#[tokio::main(flavor = "current_thread")]`
//! or spawned with [`tokio::task::spawn_local`]).

use crate::timer::TokioTimerScheduler;
use crate::udp_socket::{TokioDatagramSink, TokioUdpSocket};
use coap_core::endpoint::Endpoint;
use coap_core::handler::{AllowedMethods, RequestFilter, RequestHandler, ResponseListener};
use coap_core::message::{MsgCode, MsgToken};
use coap_core::transport::ThreadRngSource;
use coap_core::{EndpointConstants, Error};
use std::cell::RefCell;
use std::io;
use std::net::SocketAddr;
use std::rc::Rc;
use std::time::{Duration, Instant};

type CoreEndpoint<C> = Endpoint<C, SocketAddr, TokioTimerScheduler, TokioDatagramSink>;

/// How long the event loop waits for I/O when no retransmission timer is pending.
const IDLE_POLL_INTERVAL: Duration = Duration::from_secs(60);

/// A CoAP endpoint bound to a real UDP socket and driven by Tokio's clock.
///
/// Cloning shares the same endpoint, socket, and timer set — cheap, and the usual way
/// to hand a handle to [`TokioEndpoint::run`]'s background task while keeping one to
/// register handlers or send requests from elsewhere on the same `LocalSet`.
#[derive(Clone)]
pub struct TokioEndpoint<C: EndpointConstants> {
    endpoint: Rc<RefCell<CoreEndpoint<C>>>,
    socket: TokioUdpSocket,
    timers: TokioTimerScheduler,
}

impl<C: EndpointConstants> TokioEndpoint<C> {
    /// Binds a UDP socket at `addr` and creates an endpoint with `constants` and a fresh
    /// [`ThreadRngSource`]-seeded token/message-id space.
    pub async fn bind<A: tokio::net::ToSocketAddrs>(addr: A, constants: C) -> io::Result<Self> {
        let socket = TokioUdpSocket::bind(addr).await?;
        Ok(Self::new(socket, constants))
    }

    /// Builds an endpoint around an already-bound socket.
    pub fn new(socket: TokioUdpSocket, constants: C) -> Self {
        let timers = TokioTimerScheduler::new();
        let mut endpoint = Endpoint::create(timers.clone(), Box::new(ThreadRngSource), constants);
        endpoint
            .attach_sink(socket.sink())
            .expect("freshly created endpoint has no sink attached yet");
        endpoint
            .attach_source()
            .expect("freshly created endpoint has no source attached yet");

        TokioEndpoint {
            endpoint: Rc::new(RefCell::new(endpoint)),
            socket,
            timers,
        }
    }

    /// The local address this endpoint's socket is bound to.
    pub fn local_addr(&self) -> io::Result<SocketAddr> {
        self.socket.local_addr()
    }

    /// Sets the 0-4 byte prefix prepended to every token this endpoint emits.
    pub fn set_token_prefix(&self, prefix: &[u8]) -> Result<(), Error> {
        self.endpoint.borrow_mut().set_token_prefix(prefix)
    }

    /// Registers `handler` under `path` for the given `allowed` methods.
    pub fn register_handler(
        &self,
        path: &str,
        allowed: AllowedMethods,
        handler: Box<dyn RequestHandler>,
    ) -> Result<(), Error> {
        self.endpoint.borrow_mut().register_handler(path, allowed, handler)
    }

    /// Removes the handler registered at exactly `path`.
    pub fn unregister_handler(&self, path: &str) -> Result<(), Error> {
        self.endpoint.borrow_mut().unregister_handler(path)
    }

    /// Installs (or clears) the handler invoked when no registered path matches.
    pub fn set_default_handler(&self, handler: Option<Box<dyn RequestHandler>>) {
        self.endpoint.borrow_mut().set_default_handler(handler)
    }

    /// Appends `filter` to the filter chain.
    pub fn register_filter(&self, filter: Box<dyn RequestFilter>) {
        self.endpoint.borrow_mut().register_filter(filter)
    }

    /// Removes the last-registered filter.
    pub fn unregister_filter(&self) -> Result<(), Error> {
        self.endpoint.borrow_mut().unregister_filter()
    }

    /// Sends a request to `remote`, returning the token it was assigned.
    pub fn send_request(
        &self,
        confirmable: bool,
        code: MsgCode,
        remote: SocketAddr,
        path: &[&str],
        query: &[&str],
        payload: &[u8],
        listener: Box<dyn ResponseListener>,
    ) -> Result<MsgToken, Error> {
        self.endpoint
            .borrow_mut()
            .send_request(confirmable, code, remote, path, query, payload, listener)
    }

    /// Cancels an outstanding request, silencing its listener.
    pub fn cancel_request(&self, token: MsgToken) -> Result<(), Error> {
        self.endpoint.borrow_mut().cancel_request(token)
    }

    /// Runs the event loop: alternates between reading datagrams off the socket and
    /// firing elapsed retransmission timers, forever (or until the socket errors).
    ///
    /// Meant to be driven via `tokio::task::spawn_local` or awaited directly inside a
    /// `#[tokio::main(flavor = "current_thread")]` function; see the crate-level
    /// example.
    pub async fn run(&self) -> io::Result<()> {
        let mut buf = [0u8; coap_core::MAX_OUTBOUND_PACKET_LENGTH];
        loop {
            let sleep_for = match self.timers.next_deadline() {
                Some(deadline) => deadline.saturating_duration_since(Instant::now()),
                None => IDLE_POLL_INTERVAL,
            };

            tokio::select! {
                _ = tokio::time::sleep(sleep_for) => {
                    self.fire_expired_timers();
                }
                readable = self.socket.readable() => {
                    readable?;
                    self.drain_socket(&mut buf);
                }
            }
        }
    }

    fn fire_expired_timers(&self) {
        for token in self.timers.drain_expired(Instant::now()) {
            self.endpoint.borrow_mut().timer_fired(token);
        }
    }

    fn drain_socket(&self, buf: &mut [u8]) {
        loop {
            match self.socket.try_recv_from(buf) {
                Ok((len, remote)) => {
                    self.endpoint
                        .borrow_mut()
                        .receive_datagram(&buf[..len], remote, Instant::now());
                }
                Err(e) if e.kind() == io::ErrorKind::WouldBlock => break,
                Err(e) => {
                    log::warn!("udp recv error: {:?}", e);
                    break;
                }
            }
        }
    }
}

impl<C: EndpointConstants> core::fmt::Debug for TokioEndpoint<C> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("TokioEndpoint")
            .field("local_addr", &self.local_addr().ok())
            .finish()
    }
}
