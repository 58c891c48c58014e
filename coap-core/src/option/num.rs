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

use super::*;

/// A CoAP option number (RFC7252 §5.10, plus the two vendor options of §6).
#[derive(Copy, Eq, PartialEq, Hash, Clone, Ord, PartialOrd)]
pub struct OptionNumber(pub u16);

impl OptionNumber {
    /// If-Match option.
    pub const IF_MATCH: OptionNumber = OptionNumber(1);

    /// Uri-Host option.
    pub const URI_HOST: OptionNumber = OptionNumber(3);

    /// ETag option.
    pub const ETAG: OptionNumber = OptionNumber(4);

    /// If-None-Match option.
    pub const IF_NONE_MATCH: OptionNumber = OptionNumber(5);

    /// Uri-Port option.
    pub const URI_PORT: OptionNumber = OptionNumber(7);

    /// Location-Path option.
    pub const LOCATION_PATH: OptionNumber = OptionNumber(8);

    /// Uri-Path option.
    pub const URI_PATH: OptionNumber = OptionNumber(11);

    /// Content-Format option.
    pub const CONTENT_FORMAT: OptionNumber = OptionNumber(12);

    /// Max-Age option.
    pub const MAX_AGE: OptionNumber = OptionNumber(14);

    /// Uri-Query option.
    pub const URI_QUERY: OptionNumber = OptionNumber(15);

    /// Accept option.
    pub const ACCEPT: OptionNumber = OptionNumber(17);

    /// Location-Query option.
    pub const LOCATION_QUERY: OptionNumber = OptionNumber(20);

    /// Block2 option (RFC7959).
    pub const BLOCK2: OptionNumber = OptionNumber(23);

    /// Block1 option (RFC7959).
    pub const BLOCK1: OptionNumber = OptionNumber(27);

    /// Size2 option (RFC7959).
    pub const SIZE2: OptionNumber = OptionNumber(28);

    /// Proxy-Uri option.
    pub const PROXY_URI: OptionNumber = OptionNumber(35);

    /// Proxy-Scheme option.
    pub const PROXY_SCHEME: OptionNumber = OptionNumber(39);

    /// Size1 option (RFC7959).
    pub const SIZE1: OptionNumber = OptionNumber(60);

    /// Vendor "Start-Offset" option (§6); transparent to this core, per the §9 Open Question.
    pub const START_OFFSET: OptionNumber = OptionNumber(2048);

    /// Vendor "Extended-Error" option carrying the protobuf-lite payload of §4.6.
    pub const EXTENDED_ERROR: OptionNumber = OptionNumber(2049);

    /// Returns true if this option number is critical.
    pub fn is_critical(self) -> bool {
        const FLAG_CRITICAL: u16 = 1;
        self.0 & FLAG_CRITICAL == FLAG_CRITICAL
    }

    /// Returns true if this option is "un-safe" to forward across a proxy.
    pub fn is_un_safe(self) -> bool {
        const FLAG_UN_SAFE: u16 = 2;
        self.0 & FLAG_UN_SAFE == FLAG_UN_SAFE
    }

    /// Returns true if this option is a "no-cache-key" option.
    pub fn is_no_cache_key(self) -> bool {
        const FLAG_NO_CACHE_KEY_MASK: u16 = 0x1e;
        const FLAG_NO_CACHE_KEY_MAGIC: u16 = 0x1c;
        self.0 & FLAG_NO_CACHE_KEY_MASK == FLAG_NO_CACHE_KEY_MAGIC
    }

    /// Returns the semantic value type for this option number (§3 Option data model).
    pub fn option_value_type(self) -> OptionValueType {
        match self {
            OptionNumber::IF_MATCH => OptionValueType::Opaque,
            OptionNumber::URI_HOST => OptionValueType::String,
            OptionNumber::ETAG => OptionValueType::Opaque,
            OptionNumber::IF_NONE_MATCH => OptionValueType::Empty,
            OptionNumber::URI_PORT => OptionValueType::UInt,
            OptionNumber::LOCATION_PATH => OptionValueType::String,
            OptionNumber::URI_PATH => OptionValueType::String,
            OptionNumber::CONTENT_FORMAT => OptionValueType::ContentFormat,
            OptionNumber::MAX_AGE => OptionValueType::UInt,
            OptionNumber::URI_QUERY => OptionValueType::String,
            OptionNumber::ACCEPT => OptionValueType::ContentFormat,
            OptionNumber::LOCATION_QUERY => OptionValueType::String,
            OptionNumber::BLOCK2 => OptionValueType::Block,
            OptionNumber::BLOCK1 => OptionValueType::Block,
            OptionNumber::SIZE2 => OptionValueType::UInt,
            OptionNumber::PROXY_URI => OptionValueType::String,
            OptionNumber::PROXY_SCHEME => OptionValueType::String,
            OptionNumber::SIZE1 => OptionValueType::UInt,
            OptionNumber::START_OFFSET => OptionValueType::UInt,
            OptionNumber::EXTENDED_ERROR => OptionValueType::Opaque,
            OptionNumber(_) => OptionValueType::Opaque,
        }
    }

    /// Returns true if this option is allowed to appear in requests.
    pub fn is_ok_in_request(self) -> bool {
        match self {
            OptionNumber::LOCATION_PATH => false,
            OptionNumber::MAX_AGE => false,
            OptionNumber::LOCATION_QUERY => false,
            OptionNumber::SIZE2 => false,
            OptionNumber(_) => true,
        }
    }

    /// Returns true if this option is allowed to appear in responses.
    pub fn is_ok_in_response(self) -> bool {
        match self {
            OptionNumber::IF_MATCH => false,
            OptionNumber::URI_HOST => false,
            OptionNumber::IF_NONE_MATCH => false,
            OptionNumber::URI_PORT => false,
            OptionNumber::URI_PATH => false,
            OptionNumber::URI_QUERY => false,
            OptionNumber::ACCEPT => false,
            OptionNumber::PROXY_URI => false,
            OptionNumber::PROXY_SCHEME => false,
            OptionNumber::SIZE1 => false,
            OptionNumber(_) => true,
        }
    }

    /// Returns true if multiple instances of this option number are permitted in one message.
    pub fn is_repeatable(self) -> bool {
        match self {
            OptionNumber::IF_MATCH
            | OptionNumber::ETAG
            | OptionNumber::LOCATION_PATH
            | OptionNumber::URI_PATH
            | OptionNumber::URI_QUERY
            | OptionNumber::LOCATION_QUERY => true,
            OptionNumber::URI_HOST
            | OptionNumber::IF_NONE_MATCH
            | OptionNumber::URI_PORT
            | OptionNumber::CONTENT_FORMAT
            | OptionNumber::MAX_AGE
            | OptionNumber::ACCEPT
            | OptionNumber::BLOCK2
            | OptionNumber::BLOCK1
            | OptionNumber::SIZE2
            | OptionNumber::PROXY_URI
            | OptionNumber::PROXY_SCHEME
            | OptionNumber::SIZE1 => false,
            OptionNumber(_) => true,
        }
    }

    /// Returns the RFC7252-assigned name of this option, if known.
    pub fn static_name(self) -> Option<&'static str> {
        match self {
            OptionNumber::IF_MATCH => Some("If-Match"),
            OptionNumber::URI_HOST => Some("Uri-Host"),
            OptionNumber::ETAG => Some("ETag"),
            OptionNumber::IF_NONE_MATCH => Some("If-None-Match"),
            OptionNumber::URI_PORT => Some("Uri-Port"),
            OptionNumber::LOCATION_PATH => Some("Location-Path"),
            OptionNumber::URI_PATH => Some("Uri-Path"),
            OptionNumber::CONTENT_FORMAT => Some("Content-Format"),
            OptionNumber::MAX_AGE => Some("Max-Age"),
            OptionNumber::URI_QUERY => Some("Uri-Query"),
            OptionNumber::ACCEPT => Some("Accept"),
            OptionNumber::LOCATION_QUERY => Some("Location-Query"),
            OptionNumber::BLOCK2 => Some("Block2"),
            OptionNumber::BLOCK1 => Some("Block1"),
            OptionNumber::SIZE2 => Some("Size2"),
            OptionNumber::PROXY_URI => Some("Proxy-Uri"),
            OptionNumber::PROXY_SCHEME => Some("Proxy-Scheme"),
            OptionNumber::SIZE1 => Some("Size1"),
            OptionNumber::START_OFFSET => Some("Start-Offset"),
            OptionNumber::EXTENDED_ERROR => Some("Extended-Error"),
            _ => None,
        }
    }

    /// Writes this option's name followed by a debug rendering of `value`.
    pub fn fmt_with_value(self, f: &mut std::fmt::Formatter<'_>, value: &[u8]) -> std::fmt::Result {
        write!(f, "{}", self)?;
        match self.option_value_type() {
            OptionValueType::Opaque | OptionValueType::Empty => {
                if !value.is_empty() {
                    f.write_str(":")?;
                    for b in value {
                        write!(f, "{:02X}", b)?;
                    }
                }
            }
            OptionValueType::UInt => {
                if let Some(i) = crate::util::try_decode_u32(value) {
                    write!(f, ":{}", i)?;
                } else {
                    f.write_str("ERR")?;
                }
            }
            OptionValueType::Block => {
                if let Some(i) = crate::util::try_decode_u32(value) {
                    write!(f, ":{}", crate::block::BlockInfo(i))?;
                } else {
                    f.write_str("ERR")?;
                }
            }
            OptionValueType::ContentFormat => {
                if let Some(i) = crate::util::try_decode_u16(value) {
                    write!(f, ":{}", crate::content_format::ContentFormat(i))?;
                } else {
                    f.write_str("ERR")?;
                }
            }
            OptionValueType::String => {
                if let Ok(s) = std::str::from_utf8(value) {
                    write!(f, ":{:?}", s)?;
                } else {
                    f.write_str("ERR")?;
                }
            }
        }

        Ok(())
    }
}

impl core::fmt::Display for OptionNumber {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        if let Some(name) = self.static_name() {
            f.write_str(name)
        } else {
            write!(f, "Opt-{}", self.0)
        }
    }
}

impl core::fmt::Debug for OptionNumber {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}({})", self.0, self)
    }
}

impl core::ops::Sub<OptionNumber> for OptionNumber {
    type Output = u16;

    fn sub(self, other: OptionNumber) -> u16 {
        self.0 - other.0
    }
}

impl core::ops::Add<u16> for OptionNumber {
    type Output = OptionNumber;

    fn add(self, other: u16) -> OptionNumber {
        OptionNumber(self.0 + other)
    }
}

impl core::cmp::PartialOrd<u16> for OptionNumber {
    fn partial_cmp(&self, other: &u16) -> Option<core::cmp::Ordering> {
        Some(self.0.cmp(other))
    }
}

impl core::cmp::PartialEq<u16> for OptionNumber {
    fn eq(&self, other: &u16) -> bool {
        self.0.eq(other)
    }
}

impl Default for OptionNumber {
    fn default() -> Self {
        OptionNumber(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn well_known_numbers_match_rfc7252() {
        assert_eq!(OptionNumber::URI_PATH.0, 11);
        assert_eq!(OptionNumber::URI_QUERY.0, 15);
        assert_eq!(OptionNumber::BLOCK1.0, 27);
        assert_eq!(OptionNumber::BLOCK2.0, 23);
    }

    #[test]
    fn vendor_options_match_this_crate() {
        assert_eq!(OptionNumber::START_OFFSET.0, 2048);
        assert_eq!(OptionNumber::EXTENDED_ERROR.0, 2049);
    }

    #[test]
    fn repeatable_flags_match_spec() {
        assert!(OptionNumber::URI_PATH.is_repeatable());
        assert!(!OptionNumber::CONTENT_FORMAT.is_repeatable());
    }
}
