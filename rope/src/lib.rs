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

//! A Unicode string built on top of B-trees.
//!
//! [`BigString`] stores text in a balanced tree of small chunks, so that
//! edits anywhere in a large text are cheap and copies share storage. It
//! can be addressed in UTF-8 bytes, UTF-16 code units, Unicode scalars and
//! characters (extended grapheme clusters), all through a single [`Index`]
//! type.
//!
//! The tree itself is generic and available in the [`tree`] module.

#![allow(
    clippy::collapsible_if,
    clippy::len_without_is_empty,
    clippy::many_single_char_names,
    clippy::needless_range_loop,
    clippy::new_without_default,
    clippy::should_implement_trait,
    clippy::wrong_self_convention
)]

extern crate bigstring_unicode;
extern crate bytecount;
extern crate memchr;
extern crate unicode_segmentation;

#[cfg(feature = "serde")]
extern crate serde;

#[cfg(test)]
extern crate serde_json;
#[cfg(test)]
extern crate serde_test;

mod big_string;
mod bstring;
pub mod chunk;
pub(crate) mod helpers;
pub mod metrics;
#[cfg(feature = "serde")]
mod serde_impls;
mod substring;
pub mod tree;
mod views;

pub use crate::big_string::BigString;
pub use crate::bstring::{Bytes, Characters, Chars, Chunks, Index, Utf16Units};
pub use crate::chunk::{Chunk, ResyncOutcome};
pub use crate::metrics::{CharacterMetric, Summary, UnicodeScalarMetric, Utf16Metric, Utf8Metric};
pub use crate::substring::{BigSubstring, SubstringCharacters};
pub use crate::tree::{Rope, RopeElement, RopeMetric, RopeSummary};
pub use crate::views::{UnicodeScalarView, Utf16View, Utf8View};
pub use bigstring_unicode::GraphemeRecognizer;
