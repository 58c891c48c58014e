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

//! Codec for the vendor `Extended-Error` option's payload: a minimal protobuf-lite
//! encoding carrying a namespace string (field 1), a signed sub-code (field 2), and a
//! human-readable message (field 3). Hand-rolled rather than pulled in from a full
//! protobuf crate since the wire shape is fixed and tiny: varint tags, zigzag-encoded
//! signed integers, length-delimited strings, nothing else.

use crate::Error;

/// A decoded `Extended-Error` payload. Borrows its string fields from the source buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ExtendedError<'a> {
    /// Field 1: a short machine-readable namespace for `code` (e.g. `"app"`).
    pub namespace: Option<&'a str>,

    /// Field 2: a signed, namespace-scoped sub-code.
    pub code: Option<i32>,

    /// Field 3: a human-readable diagnostic message.
    pub message: Option<&'a str>,
}

const FIELD_NAMESPACE: u32 = 1;
const FIELD_CODE: u32 = 2;
const FIELD_MESSAGE: u32 = 3;

const WIRE_TYPE_VARINT: u32 = 0;
const WIRE_TYPE_LEN: u32 = 2;

fn zigzag_encode(v: i32) -> u32 {
    ((v << 1) ^ (v >> 31)) as u32
}

fn zigzag_decode(v: u32) -> i32 {
    ((v >> 1) as i32) ^ -((v & 1) as i32)
}

fn write_varint(buffer: &mut Vec<u8>, mut value: u64) {
    loop {
        let byte = (value & 0x7f) as u8;
        value >>= 7;
        if value == 0 {
            buffer.push(byte);
            break;
        } else {
            buffer.push(byte | 0x80);
        }
    }
}

fn read_varint(buffer: &[u8], pos: &mut usize) -> Result<u64, Error> {
    let mut result: u64 = 0;
    let mut shift = 0;
    loop {
        let byte = *buffer.get(*pos).ok_or(Error::ParseFailure)?;
        *pos += 1;
        result |= ((byte & 0x7f) as u64) << shift;
        if byte & 0x80 == 0 {
            return Ok(result);
        }
        shift += 7;
        if shift >= 64 {
            return Err(Error::ParseFailure);
        }
    }
}

fn write_tag(buffer: &mut Vec<u8>, field: u32, wire_type: u32) {
    write_varint(buffer, ((field << 3) | wire_type) as u64);
}

fn write_len_delimited(buffer: &mut Vec<u8>, field: u32, value: &[u8]) {
    write_tag(buffer, field, WIRE_TYPE_LEN);
    write_varint(buffer, value.len() as u64);
    buffer.extend_from_slice(value);
}

impl<'a> ExtendedError<'a> {
    /// Returns the number of bytes [`ExtendedError::encode`] would produce.
    pub fn encoded_size(&self) -> usize {
        let mut buf = Vec::new();
        // Cheap enough for the option-value sizes this protocol deals with (a few tens
        // of bytes); avoids hand-duplicating the varint length math.
        let _ = self.encode(&mut buf);
        buf.len()
    }

    /// Serializes this value into protobuf-lite wire format, appending to `buffer`.
    pub fn encode(&self, buffer: &mut Vec<u8>) -> Result<(), Error> {
        if let Some(namespace) = self.namespace {
            write_len_delimited(buffer, FIELD_NAMESPACE, namespace.as_bytes());
        }
        if let Some(code) = self.code {
            write_tag(buffer, FIELD_CODE, WIRE_TYPE_VARINT);
            write_varint(buffer, zigzag_encode(code) as u64);
        }
        if let Some(message) = self.message {
            write_len_delimited(buffer, FIELD_MESSAGE, message.as_bytes());
        }
        Ok(())
    }

    /// Parses a protobuf-lite payload previously produced by [`ExtendedError::encode`].
    /// Unknown fields are skipped rather than rejected, matching protobuf's
    /// forward-compatibility contract.
    pub fn decode(buffer: &'a [u8]) -> Result<Self, Error> {
        let mut result = ExtendedError::default();
        let mut pos = 0;

        while pos < buffer.len() {
            let tag = read_varint(buffer, &mut pos)?;
            let field = (tag >> 3) as u32;
            let wire_type = (tag & 0x7) as u32;

            match wire_type {
                WIRE_TYPE_VARINT => {
                    let value = read_varint(buffer, &mut pos)?;
                    if field == FIELD_CODE {
                        result.code = Some(zigzag_decode(value as u32));
                    }
                }
                WIRE_TYPE_LEN => {
                    let len = read_varint(buffer, &mut pos)? as usize;
                    let end = pos.checked_add(len).ok_or(Error::ParseFailure)?;
                    let bytes = buffer.get(pos..end).ok_or(Error::ParseFailure)?;
                    pos = end;

                    let text = core::str::from_utf8(bytes).map_err(|_| Error::InvalidFormat)?;
                    match field {
                        FIELD_NAMESPACE => result.namespace = Some(text),
                        FIELD_MESSAGE => result.message = Some(text),
                        _ => {}
                    }
                }
                _ => return Err(Error::ParseFailure),
            }
        }

        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_all_fields() {
        let original = ExtendedError {
            namespace: Some("app"),
            code: Some(-7),
            message: Some("quota exceeded"),
        };
        let mut buf = Vec::new();
        original.encode(&mut buf).unwrap();
        assert_eq!(buf.len(), original.encoded_size());

        let decoded = ExtendedError::decode(&buf).unwrap();
        assert_eq!(decoded, original);
    }

    #[test]
    fn round_trips_partial_fields() {
        let original = ExtendedError {
            namespace: None,
            code: Some(3),
            message: None,
        };
        let mut buf = Vec::new();
        original.encode(&mut buf).unwrap();
        let decoded = ExtendedError::decode(&buf).unwrap();
        assert_eq!(decoded, original);
    }

    #[test]
    fn negative_codes_round_trip_through_zigzag() {
        for code in [-1, -2, 0, 1, i32::MIN + 1, i32::MAX] {
            assert_eq!(zigzag_decode(zigzag_encode(code)), code);
        }
    }

    #[test]
    fn empty_buffer_decodes_to_default() {
        let decoded = ExtendedError::decode(&[]).unwrap();
        assert_eq!(decoded, ExtendedError::default());
    }

    #[test]
    fn truncated_buffer_is_a_parse_failure() {
        let original = ExtendedError {
            namespace: Some("app"),
            code: None,
            message: None,
        };
        let mut buf = Vec::new();
        original.encode(&mut buf).unwrap();
        buf.pop();
        assert_eq!(ExtendedError::decode(&buf), Err(Error::ParseFailure));
    }
}
