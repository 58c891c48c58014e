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

//! A small CoAP test server exercising both the plain responder path and the
//! blockwise server helper:
//!
//! - `/echo` answers with a line describing the method, path, and payload it received.
//! - `/large` serves a fixed multi-kilobyte resource, forcing `Block2` pagination on any
//!   client that doesn't ask for the whole thing in one datagram.

use coap_core::blockwise::BlockwiseServerHelper;
use coap_core::handler::{AllowedMethods, HandlerOutcome, RequestHandler};
use coap_core::message::{MsgCode, MsgToken};
use coap_core::option;
use coap_core::responder::Responder;
use coap_core::{BlockInfo, ETag, StandardCoapConstants};
use coap_tokio::TokioEndpoint;
use std::collections::HashMap;

struct EchoHandler;

impl RequestHandler for EchoHandler {
    fn allowed_methods(&self) -> AllowedMethods {
        AllowedMethods::ALL
    }

    fn handle_request(
        &mut self,
        code: MsgCode,
        path: &[&str],
        _query: &[&str],
        payload: &[u8],
        _token: MsgToken,
        _block1: Option<BlockInfo>,
        _block2: Option<BlockInfo>,
        responder: &mut dyn Responder,
    ) -> HandlerOutcome {
        let body = format!(
            "{:?} /{} ({} byte payload)",
            code,
            path.join("/"),
            payload.len()
        );
        match responder.respond(MsgCode::SuccessContent, body.as_bytes()) {
            Ok(()) => HandlerOutcome::Responded,
            Err(e) => HandlerOutcome::Error(e),
        }
    }
}

/// Bytes served by [`LargeResourceHandler`], large enough to force several `Block2`
/// pages at the default 1024-byte negotiated size.
fn large_resource_body() -> Vec<u8> {
    (0..4096).map(|i| (i % 26) as u8 + b'a').collect()
}

/// Serves a resource too large for one datagram, one `BlockwiseServerHelper` per
/// outstanding exchange, keyed on the request token (stable across a client's blocks
/// for one blockwise session, per the blockwise client's token reuse).
struct LargeResourceHandler {
    body: Vec<u8>,
    sessions: HashMap<MsgToken, BlockwiseServerHelper>,
}

impl LargeResourceHandler {
    fn new() -> Self {
        LargeResourceHandler {
            body: large_resource_body(),
            sessions: HashMap::new(),
        }
    }
}

impl RequestHandler for LargeResourceHandler {
    fn allowed_methods(&self) -> AllowedMethods {
        AllowedMethods::GET
    }

    fn handle_request(
        &mut self,
        _code: MsgCode,
        _path: &[&str],
        _query: &[&str],
        _payload: &[u8],
        token: MsgToken,
        _block1: Option<BlockInfo>,
        block2: Option<BlockInfo>,
        responder: &mut dyn Responder,
    ) -> HandlerOutcome {
        let helper = self.sessions.entry(token).or_insert_with(|| {
            let mut helper = BlockwiseServerHelper::new(option::BLOCK2, 1024);
            helper.set_etag(ETag::new(b"large-v1"));
            helper
        });

        let mut message = match responder.create_response(MsgCode::SuccessContent, b"") {
            Ok(message) => message,
            Err(e) => return HandlerOutcome::Error(e),
        };

        let outcome = helper.create_block2_response(
            &mut message,
            block2,
            MsgCode::SuccessContent,
            &self.body,
        );

        if helper.is_done() {
            self.sessions.remove(&token);
        }

        match outcome {
            Ok(()) => match responder.send_response(message) {
                Ok(()) => HandlerOutcome::Responded,
                Err(e) => HandlerOutcome::Error(e),
            },
            Err(e) => HandlerOutcome::Error(e),
        }
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> std::io::Result<()> {
    env_logger::init();

    let endpoint = TokioEndpoint::bind(
        (std::net::Ipv6Addr::UNSPECIFIED, coap_core::DEFAULT_PORT_COAP_UDP),
        StandardCoapConstants::default(),
    )
    .await?;

    endpoint
        .register_handler("echo", AllowedMethods::ALL, Box::new(EchoHandler))
        .expect("fresh endpoint has no conflicting handler registered yet");
    endpoint
        .register_handler("large", AllowedMethods::GET, Box::new(LargeResourceHandler::new()))
        .expect("fresh endpoint has no conflicting handler registered yet");

    log::info!("listening on {}", endpoint.local_addr()?);
    endpoint.run().await
}
