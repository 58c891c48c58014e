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

//! The simplest possible server: one handler, registered at `/hello`, answering every
//! `GET` with a fixed greeting. Run it, then `coap-client -m get coap://localhost/hello`.

use coap_core::handler::{AllowedMethods, HandlerOutcome, RequestHandler};
use coap_core::message::MsgCode;
use coap_core::responder::Responder;
use coap_core::{BlockInfo, StandardCoapConstants};
use coap_tokio::TokioEndpoint;

struct HelloWorldHandler;

impl RequestHandler for HelloWorldHandler {
    fn allowed_methods(&self) -> AllowedMethods {
        AllowedMethods::GET
    }

    fn handle_request(
        &mut self,
        _code: MsgCode,
        _path: &[&str],
        _query: &[&str],
        _payload: &[u8],
        _token: coap_core::message::MsgToken,
        _block1: Option<BlockInfo>,
        _block2: Option<BlockInfo>,
        responder: &mut dyn Responder,
    ) -> HandlerOutcome {
        match responder.respond(MsgCode::SuccessContent, b"Hello, world!") {
            Ok(()) => HandlerOutcome::Responded,
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
        .register_handler("hello", AllowedMethods::GET, Box::new(HelloWorldHandler))
        .expect("fresh endpoint has no conflicting handler registered yet");

    log::info!("listening on {}", endpoint.local_addr()?);
    endpoint.run().await
}
