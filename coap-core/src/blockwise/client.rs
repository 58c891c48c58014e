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

//! Client-side blockwise state machine (§4.5.1): drives a sequence of single-block
//! requests — `Block1` for a fragmented upload, `Block2` for a fragmented download —
//! correlating each with the previous one's offset and (for downloads) `ETag`.
//!
//! This type owns no token and touches no transport; a host drives it by calling
//! [`BlockwiseClient::next_request`] to get the next datagram to send through
//! [`crate::endpoint::Endpoint::send_request`], and feeds the matching response back
//! through [`BlockwiseClient::on_response`].

use super::block_size_to_szx;
use crate::block::adjust_and_get_chunk_size;
use crate::message::MsgCode;
use crate::option::{self, OptionKey};
use crate::{BlockInfo, ETag, Error};

/// Where a [`BlockwiseClient`] session currently stands.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum BlockwiseState {
    /// Ready to build and send the next block.
    Idle,
    /// A block has been sent; waiting for its response.
    WaitResponse,
    /// Suspended by [`BlockwiseClient::pause`] from within a response callback; no
    /// further requests are produced until [`BlockwiseClient::resume`].
    Paused,
    /// The transfer finished, successfully or not; the session is inert.
    Done,
}

/// One request [`BlockwiseClient::next_request`] wants sent next.
#[derive(Debug)]
pub struct BlockwiseOutboundRequest<'a> {
    /// The request method (constant across the session).
    pub method: MsgCode,
    /// `Uri-Path` components (constant across the session).
    pub path: &'a [String],
    /// `Uri-Query` components (constant across the session).
    pub query: &'a [String],
    /// This block's payload (empty for a download request).
    pub payload: &'a [u8],
    /// Which block option (`Block1` or `Block2`) this session negotiates.
    pub block_option: OptionKey<BlockInfo>,
    /// The block option value to attach to the request.
    pub block: BlockInfo,
}

/// The result of feeding one response into [`BlockwiseClient::on_response`].
#[derive(Debug)]
pub enum BlockwiseProgress<'a> {
    /// More blocks remain; call [`BlockwiseClient::next_request`] again.
    Continue,
    /// The transfer is complete. `body` is the full reassembled payload for a
    /// download, or the server's final response payload for an upload.
    Done {
        /// The response code of the terminal exchange.
        code: MsgCode,
        /// The reassembled (download) or final (upload) response payload.
        body: &'a [u8],
    },
}

/// Drives one blockwise transfer: either a `Block1` upload of an in-memory payload, or
/// a `Block2` download reassembled into an in-memory buffer.
#[derive(Debug)]
pub struct BlockwiseClient {
    method: MsgCode,
    path: Vec<String>,
    query: Vec<String>,
    upload: Option<Vec<u8>>,
    block_option: OptionKey<BlockInfo>,
    offset: usize,
    block_size: usize,
    pending_chunk_len: usize,
    expected_etag: Option<ETag>,
    buffer: Vec<u8>,
    state: BlockwiseState,
}

impl BlockwiseClient {
    /// Starts a `Block2` download of `path`/`query` at `preferred_block_size` bytes
    /// (default 1024 per §4.5.1), narrowing on the server's first response if it picks
    /// a smaller size.
    pub fn new_download(
        method: MsgCode,
        path: Vec<String>,
        query: Vec<String>,
        preferred_block_size: usize,
    ) -> Self {
        BlockwiseClient {
            method,
            path,
            query,
            upload: None,
            block_option: option::BLOCK2,
            offset: 0,
            block_size: preferred_block_size,
            pending_chunk_len: 0,
            expected_etag: None,
            buffer: Vec::new(),
            state: BlockwiseState::Idle,
        }
    }

    /// Starts a `Block1` upload of `payload` to `path`/`query`, chunked at
    /// `preferred_block_size` bytes.
    pub fn new_upload(
        method: MsgCode,
        path: Vec<String>,
        query: Vec<String>,
        payload: Vec<u8>,
        preferred_block_size: usize,
    ) -> Self {
        BlockwiseClient {
            method,
            path,
            query,
            upload: Some(payload),
            block_option: option::BLOCK1,
            offset: 0,
            block_size: preferred_block_size,
            pending_chunk_len: 0,
            expected_etag: None,
            buffer: Vec::new(),
            state: BlockwiseState::Idle,
        }
    }

    /// This session's current state.
    pub fn state(&self) -> BlockwiseState {
        self.state
    }

    /// Suspends further requests. Only meaningful while awaiting a response; a no-op
    /// otherwise.
    pub fn pause(&mut self) {
        if self.state == BlockwiseState::WaitResponse {
            self.state = BlockwiseState::Paused;
        }
    }

    /// Lifts a previous [`BlockwiseClient::pause`], allowing the next
    /// [`BlockwiseClient::next_request`] to proceed.
    pub fn resume(&mut self) {
        if self.state == BlockwiseState::Paused {
            self.state = BlockwiseState::Idle;
        }
    }

    /// Builds the next block's request, if the session is ready to send one.
    pub fn next_request(&mut self) -> Option<BlockwiseOutboundRequest<'_>> {
        if self.state != BlockwiseState::Idle {
            return None;
        }

        let szx = block_size_to_szx(self.block_size).unwrap_or(6);
        let size = 1usize << (szx as usize + 4);
        let num = (self.offset / size) as u32;

        let (chunk_len, more) = match &self.upload {
            Some(full) => adjust_and_get_chunk_size(self.offset, size, full.len()).ok()?,
            // The `more` bit carries no meaning in a download request (RFC7959 §2.9.1).
            None => (0, false),
        };
        let block = BlockInfo::new(num, more, szx)?;

        self.pending_chunk_len = chunk_len;
        self.state = BlockwiseState::WaitResponse;

        let payload: &[u8] = match &self.upload {
            Some(full) => &full[self.offset..self.offset + chunk_len],
            None => &[],
        };

        Some(BlockwiseOutboundRequest {
            method: self.method,
            path: &self.path,
            query: &self.query,
            payload,
            block_option: self.block_option,
            block,
        })
    }

    /// Feeds the response to the block most recently produced by
    /// [`BlockwiseClient::next_request`].
    ///
    /// `block` is the response's echoed `Block1`/`Block2` option, if any; `etag` is its
    /// `ETag` option, if any (meaningful for `Block2` downloads only).
    pub fn on_response(
        &mut self,
        code: MsgCode,
        payload: &[u8],
        block: Option<BlockInfo>,
        etag: Option<ETag>,
    ) -> Result<BlockwiseProgress<'_>, Error> {
        if self.state != BlockwiseState::WaitResponse {
            return Err(Error::InvalidState);
        }

        if let Some(b) = block {
            if b.offset() != self.offset {
                self.state = BlockwiseState::Done;
                return Err(Error::UnexpectedBlock);
            }
            if self.upload.is_none() {
                if let Some(expected) = self.expected_etag {
                    if etag != Some(expected) {
                        self.state = BlockwiseState::Done;
                        return Err(Error::EtagMismatch);
                    }
                } else if let Some(etag) = etag {
                    self.expected_etag = Some(etag);
                }
            }
            let negotiated = 1usize << (b.szx() as usize + 4);
            if negotiated < self.block_size {
                self.block_size = negotiated;
            }
        }

        let is_continuation = code == MsgCode::SuccessContinue;

        if self.upload.is_none() {
            self.buffer.extend_from_slice(payload);
        }

        let more = match block {
            Some(b) => b.more_flag(),
            None => false,
        };

        if more || (self.upload.is_some() && is_continuation) {
            self.offset += match &self.upload {
                Some(_) => self.pending_chunk_len,
                None => payload.len(),
            };
            self.state = BlockwiseState::Idle;
            return Ok(BlockwiseProgress::Continue);
        }

        self.state = BlockwiseState::Done;
        if self.upload.is_some() {
            self.buffer.clear();
            self.buffer.extend_from_slice(payload);
        }
        Ok(BlockwiseProgress::Done {
            code,
            body: &self.buffer,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn download_reassembles_three_blocks_in_order() {
        let mut client =
            BlockwiseClient::new_download(MsgCode::MethodGet, vec!["big".into()], vec![], 64);

        let req = client.next_request().unwrap();
        assert_eq!(req.block.offset(), 0);
        assert!(client.next_request().is_none());

        let block0 = BlockInfo::new(0, true, 2).unwrap();
        let progress = client
            .on_response(MsgCode::SuccessContent, &[0u8; 64], Some(block0), Some(ETag::new(b"v1")))
            .unwrap();
        assert!(matches!(progress, BlockwiseProgress::Continue));

        let req = client.next_request().unwrap();
        assert_eq!(req.block.offset(), 64);

        let block1 = BlockInfo::new(1, true, 2).unwrap();
        client
            .on_response(MsgCode::SuccessContent, &[1u8; 64], Some(block1), Some(ETag::new(b"v1")))
            .unwrap();

        let req = client.next_request().unwrap();
        assert_eq!(req.block.offset(), 128);

        let block2 = BlockInfo::new(2, false, 2).unwrap();
        let progress = client
            .on_response(MsgCode::SuccessContent, &[2u8; 10], Some(block2), Some(ETag::new(b"v1")))
            .unwrap();
        match progress {
            BlockwiseProgress::Done { code, body } => {
                assert_eq!(code, MsgCode::SuccessContent);
                assert_eq!(body.len(), 138);
            }
            _ => panic!("expected Done"),
        }
        assert_eq!(client.state(), BlockwiseState::Done);
    }

    #[test]
    fn download_rejects_etag_change_mid_transfer() {
        let mut client =
            BlockwiseClient::new_download(MsgCode::MethodGet, vec!["big".into()], vec![], 64);
        client.next_request().unwrap();
        let block0 = BlockInfo::new(0, true, 2).unwrap();
        client
            .on_response(MsgCode::SuccessContent, &[0u8; 64], Some(block0), Some(ETag::new(b"v1")))
            .unwrap();

        client.next_request().unwrap();
        let block1 = BlockInfo::new(1, false, 2).unwrap();
        let err = client
            .on_response(MsgCode::SuccessContent, &[1u8; 10], Some(block1), Some(ETag::new(b"v2")))
            .unwrap_err();
        assert_eq!(err, Error::EtagMismatch);
    }

    #[test]
    fn download_rejects_an_out_of_order_block() {
        let mut client =
            BlockwiseClient::new_download(MsgCode::MethodGet, vec!["big".into()], vec![], 64);
        client.next_request().unwrap();
        let wrong_block = BlockInfo::new(5, false, 2).unwrap();
        let err = client
            .on_response(MsgCode::SuccessContent, &[0u8; 64], Some(wrong_block), None)
            .unwrap_err();
        assert_eq!(err, Error::UnexpectedBlock);
    }

    #[test]
    fn upload_sends_payload_in_blocks_until_final_response() {
        let payload = vec![7u8; 100];
        let mut client = BlockwiseClient::new_upload(
            MsgCode::MethodPut,
            vec!["big".into()],
            vec![],
            payload,
            64,
        );

        let req = client.next_request().unwrap();
        assert_eq!(req.payload.len(), 64);
        assert!(req.block.more_flag());

        let echoed0 = BlockInfo::new(0, false, 2).unwrap();
        let progress = client
            .on_response(MsgCode::SuccessContinue, &[], Some(echoed0), None)
            .unwrap();
        assert!(matches!(progress, BlockwiseProgress::Continue));

        let req = client.next_request().unwrap();
        assert_eq!(req.payload.len(), 36);
        assert!(!req.block.more_flag());

        let echoed1 = BlockInfo::new(1, false, 2).unwrap();
        let progress = client
            .on_response(MsgCode::SuccessChanged, b"stored", Some(echoed1), None)
            .unwrap();
        match progress {
            BlockwiseProgress::Done { code, body } => {
                assert_eq!(code, MsgCode::SuccessChanged);
                assert_eq!(body, b"stored");
            }
            _ => panic!("expected Done"),
        }
    }
}
