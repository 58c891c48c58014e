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

use crate::util::encode_u32;
use core::convert::From;
use core::ops::Deref;

/// A CoAP message token: 0 to 8 bytes correlating a response with its request.
#[derive(Debug, Eq, PartialEq, Hash, Copy, Clone, Ord, PartialOrd)]
pub struct MsgToken {
    len: u8,
    bytes: [u8; 8],
}

impl MsgToken {
    /// Constant representing an empty token.
    pub const EMPTY: MsgToken = MsgToken {
        len: 0u8,
        bytes: [0; 8],
    };

    /// Creates a new token from the given byte slice. Panics if `x.len() > 8`.
    pub fn new(x: &[u8]) -> MsgToken {
        MsgToken::from(x)
    }

    /// Returns the length of this token.
    pub fn len(&self) -> usize {
        self.len as usize
    }

    /// Returns true if the length of this token is zero.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Returns a byte slice containing this token.
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes[..self.len as usize]
    }

    /// Builds a token by prepending `prefix` (the endpoint's token prefix, 0-4 bytes) to
    /// the big-endian encoding of `counter` (§4.2 outbound path, step 1).
    pub fn with_prefix_and_counter(prefix: &[u8], counter: u64) -> MsgToken {
        let mut bytes = [0u8; 8];
        let plen = prefix.len().min(8);
        bytes[..plen].copy_from_slice(&prefix[..plen]);
        let mut counter_buf = [0u8; 8];
        let counter_bytes = {
            let hi = (counter >> 32) as u32;
            let lo = counter as u32;
            if hi != 0 {
                counter_buf[..4].copy_from_slice(&hi.to_be_bytes());
                counter_buf[4..8].copy_from_slice(&lo.to_be_bytes());
                &counter_buf[..8]
            } else {
                encode_u32(lo, &mut counter_buf)
            }
        };
        let remaining = (8 - plen).min(counter_bytes.len());
        let start = counter_bytes.len() - remaining;
        bytes[plen..plen + remaining].copy_from_slice(&counter_bytes[start..]);
        MsgToken {
            len: (plen + remaining) as u8,
            bytes,
        }
    }
}

impl std::fmt::Display for MsgToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for b in self.as_bytes() {
            write!(f, "{:02X}", b)?;
        }
        Ok(())
    }
}

impl Default for MsgToken {
    fn default() -> Self {
        MsgToken::EMPTY
    }
}

impl Deref for MsgToken {
    type Target = [u8];

    fn deref(&self) -> &Self::Target {
        self.as_bytes()
    }
}

impl core::cmp::PartialEq<[u8]> for MsgToken {
    fn eq(&self, other: &[u8]) -> bool {
        self.as_bytes() == other
    }
}

impl core::convert::From<u32> for MsgToken {
    fn from(x: u32) -> Self {
        let mut bytes = [0u8; 8];
        let len = encode_u32(x, &mut bytes).len();
        MsgToken { len: len as u8, bytes }
    }
}

impl core::convert::From<&[u8]> for MsgToken {
    /// Panics if `x.len() > 8`.
    fn from(x: &[u8]) -> Self {
        let mut bytes = [0u8; 8];
        let len = x.len();
        bytes[..len].copy_from_slice(x);
        MsgToken { len: len as u8, bytes }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_token_round_trips() {
        assert!(MsgToken::EMPTY.is_empty());
        assert_eq!(MsgToken::EMPTY.as_bytes(), &[] as &[u8]);
    }

    #[test]
    fn prefix_and_counter_compose() {
        let t = MsgToken::with_prefix_and_counter(&[0xAB, 0xCD], 1);
        assert_eq!(t.as_bytes(), &[0xAB, 0xCD, 0x01]);
    }

    #[test]
    fn counter_only_when_no_prefix() {
        let t = MsgToken::with_prefix_and_counter(&[], 0x1234);
        assert_eq!(t.as_bytes(), &[0x12, 0x34]);
    }
}
