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

//! Server-side helper for one blockwise exchange (§4.5.2): tracks whether an incoming
//! block is new or a retransmission of the previous one, and chunks an outgoing
//! representation into `Block2` responses.

use super::block_size_to_szx;
use crate::block::adjust_and_get_chunk_size;
use crate::message::{MessageWrite, MsgCode};
use crate::option::{self, OptionInsertExt, OptionKey};
use crate::{BlockInfo, ETag, Error};

/// Per-exchange bookkeeping for a server handler servicing a blockwise transfer.
///
/// One instance covers either the `Block1` side of a fragmented upload or the `Block2`
/// side of a fragmented download, never both; a handler that does both (e.g. a
/// large-resource `PUT` that replies with a large-resource body) keeps one of each.
#[derive(Debug)]
pub struct BlockwiseServerHelper {
    block_option: OptionKey<BlockInfo>,
    next_expected_offset: usize,
    last_block_size: usize,
    done: bool,
    preferred_block_size: usize,
    etag: ETag,
}

impl BlockwiseServerHelper {
    /// Creates a helper tracking `block_option` (`option::BLOCK1` or `option::BLOCK2`),
    /// starting from offset zero with responses chunked at `preferred_block_size` bytes
    /// until the peer's own requested size narrows it.
    pub fn new(block_option: OptionKey<BlockInfo>, preferred_block_size: usize) -> Self {
        BlockwiseServerHelper {
            block_option,
            next_expected_offset: 0,
            last_block_size: 0,
            done: false,
            preferred_block_size,
            etag: ETag::EMPTY,
        }
    }

    /// True once the tracked transfer has seen its final block.
    pub fn is_done(&self) -> bool {
        self.done
    }

    /// The `ETag` installed for this exchange, if any.
    pub fn etag(&self) -> ETag {
        self.etag
    }

    /// Installs the `ETag` a handler chooses at block 0, per §4.5.2 step 1.
    pub fn set_etag(&mut self, etag: ETag) {
        self.etag = etag;
    }

    /// Inspects one incoming block of a fragmented upload or re-request, per §4.5.2
    /// step 1. `block` is the request's `Block1`/`Block2` option value, if present;
    /// `payload_len` is the number of bytes this block actually carried.
    ///
    /// Returns `Ok(true)` if this is a retransmission of the immediately preceding
    /// block (the handler should simply re-send its previous response), `Ok(false)` if
    /// it is the next new block, or `Err(Error::InvalidState)` if it is neither — in
    /// which case the handler must reply `4.08 Request Entity Incomplete`.
    pub fn on_request(&mut self, block: Option<BlockInfo>, payload_len: usize) -> Result<bool, Error> {
        let offset = block.map(BlockInfo::offset).unwrap_or(0);

        if offset == self.next_expected_offset {
            self.last_block_size = payload_len;
            self.next_expected_offset += payload_len;
            self.done = block.map(|b| !b.more_flag()).unwrap_or(true);
            Ok(false)
        } else if self
            .next_expected_offset
            .checked_sub(self.last_block_size)
            == Some(offset)
        {
            Ok(true)
        } else {
            Err(Error::InvalidState)
        }
    }

    /// Acknowledges one received `Block1` chunk by echoing its block option (without
    /// the `more` flag, which carries no meaning in a response) into `writer`, per
    /// §4.5.2 step 2.
    pub fn ack_block1(
        &self,
        writer: &mut dyn MessageWrite,
        received: BlockInfo,
    ) -> Result<(), Error> {
        writer.insert_option(self.block_option, received.without_more_flag())
    }

    /// Writes the next chunk of `full_payload` as a `Block2` response into `writer`,
    /// per §4.5.2 step 2 and the chunk arithmetic of §4.5.3.
    ///
    /// `requested` is the `Block2` option on the request this response answers, if the
    /// peer sent one; its `SZX` (when present) overrides `preferred_block_size`. On
    /// success, advances this helper's offset tracking so a subsequent call continues
    /// from the next chunk.
    pub fn create_block2_response(
        &mut self,
        writer: &mut dyn MessageWrite,
        requested: Option<BlockInfo>,
        code: MsgCode,
        full_payload: &[u8],
    ) -> Result<(), Error> {
        let offset = requested.map(BlockInfo::offset).unwrap_or(0);
        let szx = requested
            .map(BlockInfo::szx)
            .or_else(|| block_size_to_szx(self.preferred_block_size))
            .ok_or(Error::InvalidArgument)?;
        let size = 1usize << (szx as usize + 4);

        let (chunk_len, more) = adjust_and_get_chunk_size(offset, size, full_payload.len())?;
        let num = (offset / size) as u32;
        let block = BlockInfo::new(num, more, szx).ok_or(Error::InvalidArgument)?;

        writer.set_msg_code(code);
        if offset == 0 && !self.etag.is_empty() {
            writer.insert_option(option::ETAG, self.etag)?;
        }
        writer.insert_option(self.block_option, block)?;
        writer.append_payload_bytes(&full_payload[offset..offset + chunk_len])?;

        self.next_expected_offset = offset + chunk_len;
        self.last_block_size = chunk_len;
        self.done = !more;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::message::VecMessageEncoder;

    #[test]
    fn on_request_advances_for_sequential_blocks() {
        let mut helper = BlockwiseServerHelper::new(option::BLOCK1, 64);
        let block0 = BlockInfo::new(0, true, 2).unwrap(); // szx=2 -> 64 bytes
        assert_eq!(helper.on_request(Some(block0), 64).unwrap(), false);
        assert!(!helper.is_done());

        let block1 = BlockInfo::new(1, false, 2).unwrap();
        assert_eq!(helper.on_request(Some(block1), 32).unwrap(), false);
        assert!(helper.is_done());
    }

    #[test]
    fn on_request_detects_retransmission_of_previous_block() {
        let mut helper = BlockwiseServerHelper::new(option::BLOCK1, 64);
        let block0 = BlockInfo::new(0, true, 2).unwrap();
        assert_eq!(helper.on_request(Some(block0), 64).unwrap(), false);

        // Peer retransmits block 0 (its ACK must have been lost).
        assert_eq!(helper.on_request(Some(block0), 64).unwrap(), true);
    }

    #[test]
    fn on_request_rejects_a_gap() {
        let mut helper = BlockwiseServerHelper::new(option::BLOCK1, 64);
        let block2 = BlockInfo::new(2, false, 2).unwrap();
        assert_eq!(helper.on_request(Some(block2), 64), Err(Error::InvalidState));
    }

    #[test]
    fn create_block2_response_chunks_a_large_payload() {
        let mut helper = BlockwiseServerHelper::new(option::BLOCK2, 64);
        helper.set_etag(ETag::new(b"v1"));
        let payload = vec![0xABu8; 150];

        let mut first = VecMessageEncoder::new();
        helper
            .create_block2_response(&mut first, None, MsgCode::SuccessContent, &payload)
            .unwrap();
        assert!(!helper.is_done());
        assert_eq!(helper.etag().as_bytes(), b"v1");

        let requested_next = BlockInfo::new(1, false, 2).unwrap();
        let mut second = VecMessageEncoder::new();
        helper
            .create_block2_response(
                &mut second,
                Some(requested_next),
                MsgCode::SuccessContent,
                &payload,
            )
            .unwrap();
        assert!(!helper.is_done());

        let requested_last = BlockInfo::new(2, false, 2).unwrap();
        let mut third = VecMessageEncoder::new();
        helper
            .create_block2_response(
                &mut third,
                Some(requested_last),
                MsgCode::SuccessContent,
                &payload,
            )
            .unwrap();
        assert!(helper.is_done());
    }
}
