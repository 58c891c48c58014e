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

//! Module defining various CoAP-related constants.

/// The standard default IP port number used for CoAP-over-UDP.
pub const DEFAULT_PORT_COAP_UDP: u16 = 5683;

/// The standard default IP port number used for CoAP-over-DTLS.
pub const DEFAULT_PORT_COAP_DTLS: u16 = 5684;

/// The standard default IP port number used for CoAP-over-TCP.
pub const DEFAULT_PORT_COAP_TCP: u16 = 5683;

/// The standard default IP port number used for CoAP-over-TLS.
pub const DEFAULT_PORT_COAP_TLS: u16 = 5684;

/// Maximum size, in bytes, of an outbound CoAP-over-UDP datagram this crate will produce.
pub const MAX_OUTBOUND_PACKET_LENGTH: usize = 1152;

/// Hard ceiling on the number of options a single message may carry.
pub const MAX_OPTION_COUNT: usize = 1024;
