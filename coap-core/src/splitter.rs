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

//! Splits a slash- or ampersand-joined string (a request path or query string supplied
//! by a caller building a request) into the sequence of repeated `Uri-Path`/`Uri-Query`
//! option values RFC7252 §6.4/§6.5 requires on the wire: one option instance per segment,
//! never a single option carrying an embedded delimiter.

use crate::Error;

/// Splits `input` on `delim`, pushing each non-empty segment onto `out`. An input of `""`
/// produces zero segments (a request with no path at all). A leading or trailing `delim`,
/// or two consecutive delimiters, produces an empty segment, which is rejected: RFC7252
/// forbids an empty `Uri-Path` segment other than the degenerate "no path" case.
pub fn split<'a>(input: &'a str, delim: char, out: &mut Vec<&'a str>) -> Result<(), Error> {
    if input.is_empty() {
        return Ok(());
    }

    for segment in input.split(delim) {
        if segment.is_empty() {
            return Err(Error::InvalidSyntax);
        }
        out.push(segment);
    }

    Ok(())
}

/// Convenience wrapper over [`split`] for `/`-joined paths.
pub fn split_path(input: &str, out: &mut Vec<&str>) -> Result<(), Error> {
    split(input, '/', out)
}

/// Convenience wrapper over [`split`] for `&`-joined query strings.
pub fn split_query(input: &str, out: &mut Vec<&str>) -> Result<(), Error> {
    split(input, '&', out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_input_yields_no_segments() {
        let mut out = Vec::new();
        split_path("", &mut out).unwrap();
        assert!(out.is_empty());
    }

    #[test]
    fn splits_path_into_segments() {
        let mut out = Vec::new();
        split_path("foo/bar/baz", &mut out).unwrap();
        assert_eq!(out, vec!["foo", "bar", "baz"]);
    }

    #[test]
    fn splits_query_into_segments() {
        let mut out = Vec::new();
        split_query("a=1&b=2", &mut out).unwrap();
        assert_eq!(out, vec!["a=1", "b=2"]);
    }

    #[test]
    fn leading_delimiter_is_rejected() {
        let mut out = Vec::new();
        assert_eq!(split_path("/foo", &mut out), Err(Error::InvalidSyntax));
    }

    #[test]
    fn double_delimiter_is_rejected() {
        let mut out = Vec::new();
        assert_eq!(split_path("foo//bar", &mut out), Err(Error::InvalidSyntax));
    }
}
