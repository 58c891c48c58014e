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

//! [Tokio][]-based transport and timer driver for [`coap_core`]: [`TokioUdpSocket`]
//! implements [`coap_core::transport::DatagramSink`], [`TokioTimerScheduler`]
//! implements [`coap_core::transport::TimerScheduler`], and [`TokioEndpoint`] wires the
//! two together and drives an [`Endpoint`](coap_core::endpoint::Endpoint) from a
//! single-threaded event loop.
//!
//! # Example
//!
//! ```no_run
//! use coap_tokio::TokioEndpoint;
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> std::io::Result<()> {
//!     let endpoint = TokioEndpoint::bind(
//!         "[::]:5683",
//!         coap_core::StandardCoapConstants::default(),
//!     )
//!     .await?;
//!
//!     // Register handlers, send requests, etc. through `endpoint` here, then hand
//!     // control to the event loop:
//!     endpoint.run().await
//! }
//! ```
//!
//! [Tokio]: https://tokio.rs/

pub mod consts;
mod runtime;
mod timer;
mod udp_socket;

pub use consts::{
    ALL_COAP_DEVICES_HOSTNAME, ALL_COAP_DEVICES_V4, ALL_COAP_DEVICES_V6_LL, ALL_COAP_DEVICES_V6_RL,
};
pub use runtime::TokioEndpoint;
pub use timer::TokioTimerScheduler;
pub use udp_socket::{TokioDatagramSink, TokioUdpSocket};
