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

/// The *class* of a CoAP message code: `c` in the `c.dd` notation.
#[derive(Debug, Copy, Eq, PartialEq, Clone)]
pub enum MsgCodeClass {
    /// Class for methods (request codes 1.xx in the `c.dd` sense, i.e. class 0).
    Method = 0,

    /// Class for successful responses.
    Success = 2,

    /// Class for client error responses.
    ClientError = 4,

    /// Class for server error responses.
    ServerError = 5,
}

impl MsgCodeClass {
    /// Tries to compute the message code class from a raw class nibble.
    pub fn try_from(x: u8) -> Option<MsgCodeClass> {
        match x {
            0 => Some(MsgCodeClass::Method),
            2 => Some(MsgCodeClass::Success),
            4 => Some(MsgCodeClass::ClientError),
            5 => Some(MsgCodeClass::ServerError),
            _ => None,
        }
    }

    /// Returns true if the given raw message code byte is in this class.
    pub fn contains(self, code: u8) -> bool {
        code != 0 && (code >> 5) == self as u8
    }
}

/// Computes the raw message code byte for a given `(class, detail)` pair.
pub const fn calc_code(class: u8, detail: u8) -> u8 {
    ((class & 0x7) << 5) + detail
}

/// Well-known CoAP message codes (RFC7252 §5.8/§5.9 and §12.1).
///
/// Method codes occupy 0x01-0x04 (GET/POST/PUT/DELETE, per §3 of this crate's
/// specification); response codes are `c.dd` encoded as `(class << 5) | detail`.
#[derive(Debug, Copy, Eq, PartialEq, Clone)]
pub enum MsgCode {
    /// Empty message code. Used for ping requests, resets, and empty acknowledgements.
    Empty = 0x00,

    /// CoAP GET method.
    MethodGet = 0x01,

    /// CoAP POST method.
    MethodPost = 0x02,

    /// CoAP PUT method.
    MethodPut = 0x03,

    /// CoAP DELETE method.
    MethodDelete = 0x04,

    /// 2.01 Created.
    SuccessCreated = 0x41,

    /// 2.02 Deleted.
    SuccessDeleted = 0x42,

    /// 2.03 Valid.
    SuccessValid = 0x43,

    /// 2.04 Changed.
    SuccessChanged = 0x44,

    /// 2.05 Content.
    SuccessContent = 0x45,

    /// 2.31 Continue (blockwise, RFC7959 §2.9.1).
    SuccessContinue = 0x5F,

    /// 4.00 Bad Request.
    ClientErrorBadRequest = 0x80,

    /// 4.01 Unauthorized.
    ClientErrorUnauthorized = 0x81,

    /// 4.02 Bad Option.
    ClientErrorBadOption = 0x82,

    /// 4.03 Forbidden.
    ClientErrorForbidden = 0x83,

    /// 4.04 Not Found.
    ClientErrorNotFound = 0x84,

    /// 4.05 Method Not Allowed.
    ClientErrorMethodNotAllowed = 0x85,

    /// 4.06 Not Acceptable.
    ClientErrorNotAcceptable = 0x86,

    /// 4.08 Request Entity Incomplete (blockwise, RFC7959 §2.9.2).
    ClientErrorRequestEntityIncomplete = 0x88,

    /// 4.09 Conflict (blockwise ETag mismatch, RFC7959 §2.9.3).
    ClientErrorConflict = 0x89,

    /// 4.12 Precondition Failed.
    ClientErrorPreconditionFailed = 0x8C,

    /// 4.13 Request Entity Too Large.
    ClientErrorRequestEntityTooLarge = 0x8D,

    /// 4.15 Unsupported Content-Format.
    ClientErrorUnsupportedMediaType = 0x8F,

    /// 5.00 Internal Server Error.
    ServerErrorInternalServerError = 0xA0,

    /// 5.01 Not Implemented.
    ServerErrorNotImplemented = 0xA1,

    /// 5.02 Bad Gateway.
    ServerErrorBadGateway = 0xA2,

    /// 5.03 Service Unavailable.
    ServerErrorServiceUnavailable = 0xA3,

    /// 5.04 Gateway Timeout.
    ServerErrorGatewayTimeout = 0xA4,

    /// 5.05 Proxying Not Supported.
    ServerErrorProxyingNotSupported = 0xA5,
}

impl MsgCode {
    /// Tries to convert a raw code byte into a `MsgCode`. Unrecognized-but-well-formed
    /// codes (§7 `UnknownMessageCode`-equivalent condition) are not an error at the codec
    /// layer; callers that need the raw value use [`MsgCode::class_and_detail`] instead.
    pub fn try_from(x: u8) -> Option<MsgCode> {
        use MsgCode::*;
        match x {
            0x00 => Some(Empty),
            0x01 => Some(MethodGet),
            0x02 => Some(MethodPost),
            0x03 => Some(MethodPut),
            0x04 => Some(MethodDelete),

            0x41 => Some(SuccessCreated),
            0x42 => Some(SuccessDeleted),
            0x43 => Some(SuccessValid),
            0x44 => Some(SuccessChanged),
            0x45 => Some(SuccessContent),
            0x5F => Some(SuccessContinue),

            0x80 => Some(ClientErrorBadRequest),
            0x81 => Some(ClientErrorUnauthorized),
            0x82 => Some(ClientErrorBadOption),
            0x83 => Some(ClientErrorForbidden),
            0x84 => Some(ClientErrorNotFound),
            0x85 => Some(ClientErrorMethodNotAllowed),
            0x86 => Some(ClientErrorNotAcceptable),
            0x88 => Some(ClientErrorRequestEntityIncomplete),
            0x89 => Some(ClientErrorConflict),
            0x8C => Some(ClientErrorPreconditionFailed),
            0x8D => Some(ClientErrorRequestEntityTooLarge),
            0x8F => Some(ClientErrorUnsupportedMediaType),

            0xA0 => Some(ServerErrorInternalServerError),
            0xA1 => Some(ServerErrorNotImplemented),
            0xA2 => Some(ServerErrorBadGateway),
            0xA3 => Some(ServerErrorServiceUnavailable),
            0xA4 => Some(ServerErrorGatewayTimeout),
            0xA5 => Some(ServerErrorProxyingNotSupported),

            _ => None,
        }
    }

    /// Splits a raw code byte into `(class, detail)`.
    pub fn class_and_detail(raw: u8) -> (u8, u8) {
        (raw >> 5, raw & 0b11111)
    }

    /// Returns true if this is the empty code.
    pub fn is_empty(self) -> bool {
        self as u8 == 0
    }

    /// Returns true if this code is a request method.
    pub fn is_method(self) -> bool {
        MsgCodeClass::Method.contains(self as u8)
    }

    /// Returns true if this code is a client error.
    pub fn is_client_error(self) -> bool {
        MsgCodeClass::ClientError.contains(self as u8)
    }

    /// Returns true if this code is a server error.
    pub fn is_server_error(self) -> bool {
        MsgCodeClass::ServerError.contains(self as u8)
    }

    /// Returns true if this code is any sort of error.
    pub fn is_error(self) -> bool {
        self.is_client_error() || self.is_server_error()
    }

    /// Returns true if this code indicates success.
    pub fn is_success(self) -> bool {
        MsgCodeClass::Success.contains(self as u8)
    }
}

impl Default for MsgCode {
    fn default() -> Self {
        MsgCode::Empty
    }
}

impl core::convert::From<MsgCode> for u8 {
    fn from(code: MsgCode) -> Self {
        code as u8
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn method_codes_are_1_through_4() {
        assert_eq!(MsgCode::MethodGet as u8, 1);
        assert_eq!(MsgCode::MethodDelete as u8, 4);
    }

    #[test]
    fn response_codes_are_class_dot_detail() {
        assert_eq!(MsgCode::class_and_detail(MsgCode::SuccessChanged as u8), (2, 4));
        assert_eq!(
            MsgCode::class_and_detail(MsgCode::ClientErrorMethodNotAllowed as u8),
            (4, 5)
        );
        assert_eq!(
            MsgCode::class_and_detail(MsgCode::ServerErrorInternalServerError as u8),
            (5, 0)
        );
    }

    #[test]
    fn calc_code_matches_known_constants() {
        assert_eq!(calc_code(2, 4), MsgCode::SuccessChanged as u8);
        assert_eq!(calc_code(4, 5), MsgCode::ClientErrorMethodNotAllowed as u8);
    }
}
