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

use std::fmt::{Debug, Display, Formatter};

/// Errors produced while parsing, serializing, sending, or dispatching CoAP traffic.
#[derive(Debug, Eq, PartialEq, Hash, Copy, Clone)]
pub enum Error {
    /// One or more of the supplied arguments are not valid for the given operation.
    InvalidArgument,

    /// There is not enough space in the given buffer to complete the operation.
    OutOfSpace,

    /// An error was encountered while attempting to parse a datagram.
    ParseFailure,

    /// The CoAP version field was not 1.
    UnsupportedVersion,

    /// An option that does not allow repetition was inserted more than once in a row.
    OptionNotRepeatable,

    /// Operation timed out waiting for an acknowledgement or response.
    Timeout,

    /// A `Reset` message was received for a known token.
    Reset,

    /// A response or acknowledgement arrived that does not match any outstanding request.
    UnexpectedMessage,

    /// The transport rejected the datagram for a reason other than back-pressure.
    SendFailure,

    /// A blockwise response block arrived at an offset other than the one expected.
    UnexpectedBlock,

    /// A blockwise response was otherwise malformed (missing block option, inconsistent size).
    InvalidResponse,

    /// The `ETag` of a blockwise session changed between blocks.
    EtagMismatch,

    /// The operation cannot proceed right now; the caller should retry after the
    /// corresponding "can write" notification.
    WouldBlock,

    /// The object is not in a state that permits this operation (e.g. double-attach).
    InvalidState,

    /// No entry matches the given handle, token, or path.
    NoSuchItem,

    /// A numeric value (offset, length) is outside the range this operation accepts.
    OutOfRange,

    /// Input violates the syntax this operation expects (e.g. an empty path segment).
    InvalidSyntax,

    /// Input is not well-formed for its declared format (e.g. a malformed protobuf blob).
    InvalidFormat,

    /// This operation, while well-formed, is not supported by this implementation.
    NotSupported,

    /// This operation has been cancelled.
    Cancelled,

    /// An I/O error occurred on the underlying transport.
    IoError,

    /// An unspecified internal error. The core never returns this in response to
    /// well-formed peer input, only for truly exceptional conditions.
    Internal,
}

impl std::convert::From<std::io::Error> for Error {
    fn from(_: std::io::Error) -> Self {
        Error::IoError
    }
}

impl Display for Error {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result<(), std::fmt::Error> {
        <Self as Debug>::fmt(self, f)
    }
}

impl std::error::Error for Error {}

impl Default for Error {
    fn default() -> Self {
        Error::Internal
    }
}
