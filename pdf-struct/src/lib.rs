//! Decodes the structural skeleton of a PDF file — header, cross-reference
//! table, trailer, and top-level indirect objects — and compares two such
//! skeletons for structural equivalence.
//!
//! Stream filters, encryption, object streams (PDF 1.5 compressed xref),
//! and linearization are not supported; files relying on them either fail
//! to parse or yield an incomplete skeleton.

pub mod base;
pub mod byteimage;
pub mod document;
pub mod error;
pub mod parser;

pub use base::{Dict, Name, Object, XrefEntry};
pub use byteimage::{ByteImage, SeekPos};
pub use document::{Document, Trailer};
pub use error::Error;
