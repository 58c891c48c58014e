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

//! A sans-I/O implementation of the Constrained Application Protocol
//! ([RFC7252](https://tools.ietf.org/html/rfc7252)).
//!
//! This crate contains the protocol core only: the message codec, an [`endpoint::Endpoint`]
//! that multiplexes requests and responses over an abstract datagram transport, the
//! client-side retransmission/correlation engine, server-side path dispatch, and the
//! blockwise transfer engine ([RFC7959](https://tools.ietf.org/html/rfc7959)). It
//! performs no I/O itself: a host crate (such as `coap-tokio`) implements
//! [`transport::DatagramSink`], [`transport::DatagramSource`], and
//! [`transport::TimerScheduler`] against a real socket and clock and drives the endpoint
//! from its event loop.
//!
//! ```
//! use coap_core::prelude::*;
//! use coap_core::message::{MessageWrite, VecMessageEncoder};
//!
//! let mut request = VecMessageEncoder::new();
//! request.set_msg_type(MsgType::Confirmable);
//! request.set_msg_code(MsgCode::MethodGet);
//! request.set_msg_id(1);
//! request.insert_option(option::URI_PATH, "sensors").unwrap();
//! request.insert_option(option::URI_PATH, "temperature").unwrap();
//! ```

#![cfg_attr(not(feature = "std"), no_std)]
#![warn(rust_2018_idioms)]
#![warn(missing_debug_implementations)]
#![warn(clippy::all)]
#![warn(missing_docs)]

#[cfg(any(feature = "std", test))]
extern crate std;

#[cfg(not(feature = "std"))]
extern crate alloc;

mod block;
pub use block::*;

pub mod blockwise;

pub mod consts;
pub use consts::*;

mod content_format;
pub use content_format::ContentFormat;

pub mod dedup;

mod error;
pub use error::*;

mod etag;
pub use etag::ETag;

pub mod ext_error;

pub mod handler;

pub mod message;

pub mod option;

pub mod responder;

pub mod splitter;

mod trans_params;
pub use trans_params::*;

pub mod transport;

mod util;
use util::*;

pub mod endpoint;

/// Commonly used types, re-exported for `use coap_core::prelude::*;`.
pub mod prelude {
    pub use crate::blockwise::{BlockwiseClient, BlockwiseServerHelper, BlockwiseState};
    pub use crate::endpoint::{ClientRequest, Endpoint};
    pub use crate::handler::{
        AllowedMethods, HandlerOutcome, RequestFilter, RequestHandler, ResponseListener,
        ResponseView,
    };
    pub use crate::message::{MsgCode, MsgCodeClass, MsgId, MsgToken, MsgType};
    pub use crate::option::{
        self, OptionInsert, OptionInsertExt, OptionIteratorExt, OptionKey, OptionNumber,
    };
    pub use crate::responder::Responder;
    pub use crate::transport::{DatagramSink, DatagramSource, RandomSource, TimerScheduler};
    pub use crate::{BlockInfo, ContentFormat, EndpointConstants, Error, ETag};
}
