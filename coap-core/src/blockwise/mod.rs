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

//! The blockwise transfer engine ([RFC7959](https://tools.ietf.org/html/rfc7959)):
//! a client-side state machine that drives a sequence of single-block requests
//! ([`client::BlockwiseClient`]) and a server-side helper that tracks the block
//! currently in flight for one exchange ([`server::BlockwiseServerHelper`]).
//!
//! Both sides work in terms of [`crate::BlockInfo`] and the chunk arithmetic in
//! [`crate::adjust_and_get_chunk_size`]; neither owns a transport or a token, so a host
//! wires them to an [`crate::endpoint::Endpoint`] by feeding outbound requests to
//! [`crate::endpoint::Endpoint::send_request`] and inbound response blocks back in.

pub mod client;
pub mod server;

pub use client::{BlockwiseClient, BlockwiseOutboundRequest, BlockwiseProgress, BlockwiseState};
pub use server::BlockwiseServerHelper;

/// Default block size (in bytes) a blockwise session starts at before any negotiation,
/// per §4.5.1 ("start at `preferred_size` (default 1024)").
pub const DEFAULT_BLOCK_SIZE: usize = 1024;

/// Converts a block size in bytes (one of `16, 32, 64, ..., 1024`) to its `SZX` exponent.
///
/// Returns `None` for a size outside that set.
pub(crate) fn block_size_to_szx(size: usize) -> Option<u8> {
    if !size.is_power_of_two() {
        return None;
    }
    let exponent = size.trailing_zeros();
    if (4..=10).contains(&exponent) {
        Some((exponent - 4) as u8)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn block_size_to_szx_round_trips_the_documented_sizes() {
        assert_eq!(block_size_to_szx(16), Some(0));
        assert_eq!(block_size_to_szx(1024), Some(6));
        assert_eq!(block_size_to_szx(1), None);
        assert_eq!(block_size_to_szx(3), None);
        assert_eq!(block_size_to_szx(2048), None);
    }
}
