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
use std::convert::Into;

/// A convenience iterator for parsing options from a byte buffer.
#[derive(Debug, Clone)]
pub struct OptionIterator<'a> {
    iter: core::slice::Iter<'a, u8>,
    last_option: OptionNumber,
    payload_marker_seen: bool,
}

impl<'a> Default for OptionIterator<'a> {
    fn default() -> Self {
        OptionIterator::new(&[])
    }
}

impl<'a> OptionIterator<'a> {
    /// Creates a new instance of an `OptionIterator` with the given byte slice.
    pub fn new(buffer: &'a [u8]) -> OptionIterator<'a> {
        OptionIterator {
            iter: buffer.iter(),
            last_option: Default::default(),
            payload_marker_seen: false,
        }
    }

    /// Returns the unread remaining options as a byte slice.
    pub fn as_slice(&self) -> &'a [u8] {
        self.iter.as_slice()
    }

    /// True if iteration stopped because it saw the payload marker (`0xFF`), as opposed
    /// to simply running out of option bytes. Set once `next()` consumes the marker.
    pub fn saw_payload_marker(&self) -> bool {
        self.payload_marker_seen
    }

    /// Peek ahead to the next option without moving the iterator forward.
    pub fn peek(&mut self) -> Option<Result<(OptionNumber, &'a [u8]), Error>> {
        decode_option(&mut self.iter.clone(), self.last_option).transpose()
    }

    /// Determine if the next option has a specific number and value without moving the
    /// iterator forward.
    pub fn peek_eq<T>(&mut self, key: OptionKey<T>, value: T) -> bool
    where
        T: Into<OptionValue<'a>>,
    {
        let mut temp_array = [0; 8];
        match decode_option(&mut self.iter.clone(), self.last_option) {
            Ok(Some((number, iter_value))) => {
                number == key.0
                    && (match value.into() {
                        OptionValue::Integer(x) => encode_u32(x, &mut temp_array),
                        OptionValue::Bytes(x) => x,
                        OptionValue::ETag(x) => {
                            let temp_slice = &mut temp_array[0..x.len()];
                            temp_slice.copy_from_slice(x.as_bytes());
                            temp_slice
                        }
                    } == iter_value)
            }
            _ => false,
        }
    }
}

impl<'a> Iterator for OptionIterator<'a> {
    type Item = Result<(OptionNumber, &'a [u8]), Error>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.iter.as_slice().first() == Some(&0xFF) {
            self.payload_marker_seen = true;
        }
        let ret = decode_option(&mut self.iter, self.last_option).transpose();
        if let Some(Ok((key, _))) = ret {
            self.last_option = key;
        }
        ret
    }
}

impl AsRef<[u8]> for OptionIterator<'_> {
    fn as_ref(&self) -> &[u8] {
        self.as_slice()
    }
}

/// Extension trait for option iterators that provide additional convenient accessors.
pub trait OptionIteratorExt<'a>: Iterator<Item = Result<(OptionNumber, &'a [u8]), Error>> {
    /// Moves the iterator forward until it finds a matching key or the
    /// spot where it should have been.
    ///
    /// If found, returns the option number and a byte slice of the value.
    ///
    /// Does not consume any options after
    /// the matching key.
    fn find_next(&mut self, key: OptionNumber) -> Option<Result<(OptionNumber, &'a [u8]), Error>>;

    /// Typed version of [`OptionIteratorExt::find_next`].
    ///
    /// Moves the iterator forward until it finds a matching key or the
    /// spot where it should have been.
    ///
    /// If found, returns the value of the option key.
    ///
    /// Does not consume any options after
    /// the matching key.
    fn find_next_of<T>(&mut self, key: OptionKey<T>) -> Option<Result<T, Error>>
    where
        T: TryOptionValueFrom<'a> + Sized,
    {
        if let Some(result) = self.find_next(key.0) {
            match result {
                Ok((_, value)) => {
                    if let Some(x) = T::try_option_value_from(value) {
                        return Some(Ok(x));
                    } else {
                        return Some(Err(Error::ParseFailure));
                    }
                }
                Err(e) => return Some(Err(e)),
            }
        }

        None
    }

    /// Collects the remaining URI_PATH segments into `segments`, moving the iterator past
    /// them. Segments are pushed in wire order; callers that need a joined path string
    /// use [`crate::splitter::split`] conventions on the result.
    fn extract_uri_path_segments(&mut self, segments: &mut Vec<&'a str>) -> Result<(), Error>
    where
        Self: Sized,
    {
        while let Some(seg) = self.find_next_of(option::URI_PATH).transpose()? {
            segments.push(seg);
        }
        Ok(())
    }
}

impl<'a, I> OptionIteratorExt<'a> for I
where
    I: Iterator<Item = Result<(OptionNumber, &'a [u8]), Error>> + Sized + Clone,
{
    fn find_next(&mut self, key: OptionNumber) -> Option<Result<(OptionNumber, &'a [u8]), Error>> {
        let next_value = loop {
            let mut iter = self.clone();

            match iter.next()? {
                Err(x) => return Some(Err(x)),
                Ok((number, value)) => {
                    if number == key {
                        *self = iter;
                        break (key, value);
                    }
                    if number < key.0 {
                        *self = iter;
                        continue;
                    }
                }
            };

            return None;
        };

        Some(Ok(next_value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// `Uri-Path: "foo"` followed by `Uri-Path: "bar"` (delta 0) then end-of-options.
    fn two_path_segments() -> Vec<u8> {
        let mut buf = vec![0xB3];
        buf.extend_from_slice(b"foo");
        buf.push(0x03);
        buf.extend_from_slice(b"bar");
        buf
    }

    #[test]
    fn iterates_in_wire_order() {
        let buf = two_path_segments();
        let mut iter = OptionIterator::new(&buf);
        let (num, val) = iter.next().unwrap().unwrap();
        assert_eq!(num, OptionNumber::URI_PATH);
        assert_eq!(val, b"foo");
        let (num, val) = iter.next().unwrap().unwrap();
        assert_eq!(num, OptionNumber::URI_PATH);
        assert_eq!(val, b"bar");
        assert!(iter.next().is_none());
    }

    #[test]
    fn extract_uri_path_segments_collects_all() {
        let buf = two_path_segments();
        let mut iter = OptionIterator::new(&buf);
        let mut segments = Vec::new();
        iter.extract_uri_path_segments(&mut segments).unwrap();
        assert_eq!(segments, vec!["foo", "bar"]);
    }

    #[test]
    fn find_next_skips_to_requested_option() {
        let buf = two_path_segments();
        let mut iter = OptionIterator::new(&buf);
        let found = iter.find_next(OptionNumber::URI_PATH).unwrap().unwrap();
        assert_eq!(found.1, b"foo");
    }
}
