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

//! Well-known multicast names and addresses for CoAP ([RFC7252 §12.8](https://tools.ietf.org/html/rfc7252#section-12.8)).

/// The conventional hostname used to address all CoAP devices on the local network.
///
/// [`TokioUdpSocket::lookup_host`](crate::TokioUdpSocket::lookup_host) recognizes this
/// name specially and resolves it to the three multicast addresses below rather than
/// performing a real DNS lookup.
pub const ALL_COAP_DEVICES_HOSTNAME: &str = "all-coap-devices.";

/// IPv4 "all CoAP devices" multicast address.
pub const ALL_COAP_DEVICES_V4: &str = "224.0.1.187";

/// IPv6 "all CoAP devices" multicast address, link-local scope.
pub const ALL_COAP_DEVICES_V6_LL: &str = "FF02::FD";

/// IPv6 "all CoAP devices" multicast address, realm-local scope.
pub const ALL_COAP_DEVICES_V6_RL: &str = "FF03::FD";
