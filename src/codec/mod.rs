//! Patch definition file format.
//!
//! A patch file is a YAML stream of one or more documents, each describing a
//! single patch set:
//!
//! ```yaml
//! ---
//! name: Skip Intro
//! author: alice
//! group: ui
//! description: Skips the intro movie.
//! patch:
//! - offset: '00001A2B'
//!   bytes: EB 10
//! ```

pub mod decode;
pub mod encode;
pub mod errors;
pub mod hex;

pub use decode::{decode_documents, decode_str, load_from_path, load_from_paths};
pub use encode::{append_document, encode_document};
pub use errors::{CodecError, PatchFileError};
pub use hex::{format_bytes, format_offset, parse_bytes, parse_offset, HexError};
