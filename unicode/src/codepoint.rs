// Copyright 2016 The xi-editor Authors.
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Scalar boundaries and code unit counts on raw UTF-8 bytes.

const CONT_MASK: u8 = 0b1100_0000;
const CONT_TAG: u8 = 0b1000_0000;

#[inline(always)]
fn is_continuation(byte: u8) -> bool {
    (byte & CONT_MASK) == CONT_TAG
}

/// Width in bytes of the scalar whose encoding starts with `b`.
#[inline(always)]
pub fn len_utf8_from_first_byte(b: u8) -> usize {
    match b {
        b if b < 0x80 => 1,
        b if b < 0xe0 => 2,
        b if b < 0xf0 => 3,
        _ => 4,
    }
}

/// Width in UTF-16 code units of the scalar whose encoding starts with `b`.
#[inline(always)]
pub fn utf16_len_from_first_byte(b: u8) -> usize {
    if b >= 0xf0 {
        2
    } else {
        1
    }
}

/// Both ends of `bytes` count as boundaries.
#[inline]
pub fn is_codepoint_boundary(bytes: &[u8], offset: usize) -> bool {
    debug_assert!(offset <= bytes.len());
    if offset == 0 || offset == bytes.len() {
        return true;
    }
    !is_continuation(bytes[offset])
}

/// The start of the scalar ending at or spanning `offset - 1`.
#[inline]
pub fn prev_codepoint_boundary(bytes: &[u8], offset: usize) -> Option<usize> {
    debug_assert!(offset <= bytes.len());
    if offset == 0 {
        return None;
    }
    let mut cursor = offset - 1;
    while cursor > 0 && is_continuation(bytes[cursor]) {
        cursor -= 1;
    }
    Some(cursor)
}

/// The end of the scalar starting at `offset`, which must be a boundary.
#[inline]
pub fn next_codepoint_boundary(bytes: &[u8], offset: usize) -> Option<usize> {
    debug_assert!(offset <= bytes.len());
    if offset == bytes.len() {
        return None;
    }
    let width = len_utf8_from_first_byte(bytes[offset]);
    Some((offset + width).min(bytes.len()))
}

/// Number of UTF-16 code units needed to encode `s`.
///
/// Every non-continuation byte starts a scalar worth one unit, and four byte
/// sequences need a second one.
#[inline]
pub fn count_utf16_code_units(s: &str) -> usize {
    let mut utf16_count = 0;
    for &b in s.as_bytes() {
        if (b as i8) >= -0x40 {
            utf16_count += 1;
        }
        if b >= 0xf0 {
            utf16_count += 1;
        }
    }
    utf16_count
}
