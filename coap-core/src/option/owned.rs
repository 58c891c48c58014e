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

//! An owned snapshot of a message's options, for a handler that needs to retain a
//! request's options past the synchronous call to `handle_request` — for example to
//! answer it later from a [`crate::handler::HandlerOutcome::Deferred`] continuation.

use super::OptionNumber;
use crate::Error;

/// One option, deep-copied out of the message buffer it was parsed from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OwnedOption {
    pub number: OptionNumber,
    pub value: Vec<u8>,
}

/// A deep clone of every option on a request, safe to hold past the lifetime of the
/// datagram it was parsed from.
///
/// Where the option iterator borrows from the inbound datagram buffer — which a host
/// typically reuses on the next `recv` — `clone_from` copies every option's bytes into
/// an owned `Vec`, one per option, so the caller can stash the snapshot and drop it
/// whenever it's done rather than tying it to any particular buffer's lifetime.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OwnedOptions(Vec<OwnedOption>);

impl OwnedOptions {
    /// Clones every option yielded by `iter` into an owned snapshot.
    pub fn clone_from<'a, I>(iter: I) -> Result<Self, Error>
    where
        I: Iterator<Item = Result<(OptionNumber, &'a [u8]), Error>>,
    {
        let mut options = Vec::new();
        for result in iter {
            let (number, value) = result?;
            options.push(OwnedOption {
                number,
                value: value.to_vec(),
            });
        }
        Ok(OwnedOptions(options))
    }

    pub fn as_slice(&self) -> &[OwnedOption] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::option::encoder::OptionEncoder;
    use crate::option::{OptionInsert, OptionIterator};

    fn encode(options: &[(u16, &[u8])]) -> Vec<u8> {
        let mut storage = [0u8; 64];
        let mut encoder = OptionEncoder::new(&mut storage);
        for (number, value) in options {
            encoder
                .insert_option_with_bytes(OptionNumber(*number), value)
                .unwrap();
        }
        encoder.finish().0.to_vec()
    }

    #[test]
    fn clone_from_deep_copies_every_option() {
        let buf = encode(&[(11, b"a"), (15, b"bc")]);
        let snapshot = OwnedOptions::clone_from(OptionIterator::new(&buf)).unwrap();
        assert_eq!(snapshot.len(), 2);
        assert_eq!(snapshot.as_slice()[0].number, OptionNumber(11));
        assert_eq!(snapshot.as_slice()[0].value, b"a");
        assert_eq!(snapshot.as_slice()[1].value, b"bc");
    }

    #[test]
    fn clone_from_survives_the_source_buffer_dropping() {
        let snapshot = {
            let buf = encode(&[(11, b"transient")]);
            OwnedOptions::clone_from(OptionIterator::new(&buf)).unwrap()
        };
        assert_eq!(snapshot.as_slice()[0].value, b"transient");
    }
}
