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

use std::borrow::Cow;

/// A type for representing a CoAP Content-Format value (`Content-Format` / `Accept` options).
#[derive(Debug, Copy, Eq, PartialEq, Hash, Clone, Ord, PartialOrd)]
pub struct ContentFormat(pub u16);

impl ContentFormat {
    /// From IETF-RFC7252.
    pub const TEXT_PLAIN_UTF8: ContentFormat = ContentFormat(0);

    /// From IETF-RFC7252.
    pub const APPLICATION_LINK_FORMAT: ContentFormat = ContentFormat(40);

    /// From IETF-RFC7252.
    pub const APPLICATION_XML: ContentFormat = ContentFormat(41);

    /// From IETF-RFC7252.
    pub const APPLICATION_OCTET_STREAM: ContentFormat = ContentFormat(42);

    /// From IETF-RFC7252.
    pub const APPLICATION_EXI: ContentFormat = ContentFormat(47);

    /// From IETF-RFC7252.
    pub const APPLICATION_JSON: ContentFormat = ContentFormat(50);

    /// From IETF-RFC7049 Concise Binary Object Representation (CBOR)
    pub const APPLICATION_CBOR: ContentFormat = ContentFormat(60);

    /// Returns the MIME name of this content format as a `&'static str`, if known.
    pub fn static_name(self) -> Option<&'static str> {
        Some(match self {
            Self::TEXT_PLAIN_UTF8 => "text/plain;charset=utf-8",
            Self::APPLICATION_LINK_FORMAT => "application/link-format",
            Self::APPLICATION_XML => "application/xml",
            Self::APPLICATION_OCTET_STREAM => "application/octet-stream",
            Self::APPLICATION_EXI => "application/exi",
            Self::APPLICATION_JSON => "application/json",
            Self::APPLICATION_CBOR => "application/cbor",
            _ => return None,
        })
    }

    /// Returns a MIME name for this content format, falling back to a synthesized
    /// `application/x-coap-<n>` for unrecognized values.
    pub fn name(&self) -> Cow<'static, str> {
        if let Some(name) = self.static_name() {
            Cow::from(name)
        } else {
            Cow::from(self.to_string())
        }
    }

    /// Returns true if this content format is known to contain UTF8 text.
    pub fn is_utf8(self) -> bool {
        match self {
            Self::TEXT_PLAIN_UTF8 | Self::APPLICATION_LINK_FORMAT => true,
            _ => self.is_xml() || self.is_json(),
        }
    }

    /// Returns true if this content format is known to contain JSON.
    pub fn is_json(self) -> bool {
        self == Self::APPLICATION_JSON
    }

    /// Returns true if this content format is known to contain XML.
    pub fn is_xml(self) -> bool {
        self == Self::APPLICATION_XML
    }

    /// Returns true if this content format is known to contain EXI.
    pub fn is_exi(self) -> bool {
        self == Self::APPLICATION_EXI
    }

    /// Returns true if this content format is known to contain CBOR.
    pub fn is_cbor(self) -> bool {
        self == Self::APPLICATION_CBOR
    }
}

impl core::fmt::Display for ContentFormat {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        if let Some(n) = self.static_name() {
            f.write_str(n)
        } else {
            write!(f, "application/x-coap-{}", self.0)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_names_round_trip() {
        assert_eq!(ContentFormat::APPLICATION_JSON.name(), "application/json");
        assert_eq!(ContentFormat::APPLICATION_CBOR.name(), "application/cbor");
    }

    #[test]
    fn unknown_format_synthesizes_name() {
        assert_eq!(ContentFormat(9999).to_string(), "application/x-coap-9999");
    }
}
