use std::collections::HashSet;
use std::fmt::Write as _;
use std::sync::OnceLock;

use regex::bytes::Regex;

use crate::base::dict::Dict;
use crate::base::object::Object;
use crate::base::xref::XrefEntry;
use crate::byteimage::{ByteImage, SeekPos};
use crate::error::Error;
use crate::parser::lexer::{Lexed, Lexer, Tok};
use crate::parser::parse::Parser;

/// The aggregated trailer facts across a `/Prev` chain:
/// `size` is the largest `/Size` declared by any trailer encountered,
/// `root`/`info` are the dereferenced dictionaries behind the final
/// `/Root`/`/Info` (empty if the file never declares one).
#[derive(Debug, Clone, Default)]
pub struct Trailer {
    pub size: usize,
    pub root: Dict,
    pub info: Dict,
}

/// Running state threaded through the `/Prev` recursion while the raw
/// `/Root`/`/Info` object numbers are collected; dereferencing happens
/// only once the full xref table is materialized; see
/// [`Document::finalize_trailer`].
#[derive(Default)]
struct TrailerState {
    size: usize,
    root: Option<u32>,
    info: Option<u32>,
}

/// A decoded PDF structural skeleton: version, xref table, and trailer.
/// Owns the source bytes for as long as it lives — every
/// `String`/`Stream` offset recorded in `xref` is only meaningful
/// relative to this document's own buffer.
#[derive(Debug)]
pub struct Document {
    image: ByteImage,
    pub version: String,
    pub xref: Vec<XrefEntry>,
    pub trailer: Trailer,
}

impl Document {
    pub fn open(path: &std::path::Path) -> Result<Document, Error> {
        let buf = std::fs::read(path)?;
        Document::from_bytes(buf)
    }

    pub fn from_bytes(buf: Vec<u8>) -> Result<Document, Error> {
        let mut doc = Document {
            image: ByteImage::new(buf),
            version: String::new(),
            xref: Vec::new(),
            trailer: Trailer::default(),
        };
        doc.analyze()?;
        Ok(doc)
    }

    pub fn buffer(&self) -> &[u8] {
        self.image.bytes()
    }

    fn analyze(&mut self) -> Result<(), Error> {
        self.image.seek(SeekPos::Start(0));
        let header = self.image.get_line();
        if !header.starts_with(b"%PDF-") {
            return Err(Error::Parse("missing %PDF- header"));
        }
        self.version = String::from_utf8_lossy(&header[b"%PDF-".len()..]).into_owned();

        self.image.seek(SeekPos::End);
        let eof_line = self.image.get_line_back();
        if eof_line != b"%%EOF" {
            return Err(Error::Parse("missing %%EOF trailer marker"));
        }
        let offset_line = self.image.get_line_back();
        let xref_offset: usize = std::str::from_utf8(&offset_line)
            .ok()
            .and_then(|s| s.trim().parse().ok())
            .ok_or(Error::Parse("malformed startxref offset"))?;
        let startxref_line = self.image.get_line_back();
        if startxref_line != b"startxref" {
            return Err(Error::Parse("missing startxref keyword"));
        }

        let mut state = TrailerState::default();
        let mut visited = HashSet::new();
        self.parse_xref(xref_offset, &mut state, &mut visited)?;

        for num in 0..self.xref.len() {
            self.get_object(num)?;
        }

        self.finalize_trailer(state)?;
        Ok(())
    }

    fn parse_xref(
        &mut self,
        offset: usize,
        state: &mut TrailerState,
        visited: &mut HashSet<usize>,
    ) -> Result<(), Error> {
        if !visited.insert(offset) {
            log::warn!("xref /Prev chain revisits offset {offset}, breaking cycle");
            return Ok(());
        }

        self.image.seek(SeekPos::Start(offset));
        if !self.image.check(b"xref", true) {
            return Err(Error::Parse("expected 'xref' keyword"));
        }

        loop {
            let line = self.image.get_line();
            if line == b"trailer" {
                break;
            }
            if let Some((begin, count)) = parse_subsection_header(&line) {
                if begin + count > self.xref.len() {
                    self.xref.resize(begin + count, XrefEntry::default());
                }
                for i in 0..count {
                    let row = self.image.get_line_sized(20, true);
                    match parse_xref_row(&row) {
                        Some((row_offset, revision, used)) => {
                            let entry = &mut self.xref[begin + i];
                            entry.offset = row_offset;
                            entry.revision = revision;
                            entry.used = used;
                        }
                        None => {
                            log::warn!("malformed xref row at subsection {begin}+{i}, skipping");
                        }
                    }
                }
            }
            // Any other line (stray whitespace, comments) is silently skipped.
        }

        let trailer_obj = Parser::new(&mut self.image).parse(None)?;
        let Object::Dictionary(dict) = trailer_obj else {
            return Err(Error::Parse("trailer is not a dictionary"));
        };

        if let Some(Object::Numeric(n)) = dict.get(b"Size") {
            state.size = state.size.max(*n as usize);
        }
        if let Some(root_val) = dict.get(b"Root") {
            let Object::Indirect(n) = root_val else {
                return Err(Error::Parse("/Root must be an indirect reference"));
            };
            if state.root.is_some() {
                return Err(Error::Parse("duplicate /Root across trailer chain"));
            }
            state.root = Some(*n);
        }
        if let Some(info_val) = dict.get(b"Info") {
            let Object::Indirect(n) = info_val else {
                return Err(Error::Parse("/Info must be an indirect reference"));
            };
            if state.info.is_some() {
                return Err(Error::Parse("duplicate /Info across trailer chain"));
            }
            state.info = Some(*n);
        }
        // /Encrypt and /ID are recognized but carry no further obligation here.

        if let Some(Object::Numeric(prev)) = dict.get(b"Prev") {
            self.parse_xref(*prev as usize, state, visited)?;
        }
        Ok(())
    }

    fn finalize_trailer(&mut self, state: TrailerState) -> Result<(), Error> {
        self.trailer.size = state.size;
        self.trailer.root = match state.root {
            Some(n) => self.dereference_dict(n)?,
            None => Dict::new(),
        };
        self.trailer.info = match state.info {
            Some(n) => self.dereference_dict(n)?,
            None => Dict::new(),
        };
        Ok(())
    }

    fn dereference_dict(&self, num: u32) -> Result<Dict, Error> {
        match self.xref.get(num as usize).map(|e| &e.object) {
            Some(Object::Dictionary(d)) => Ok(d.clone()),
            _ => Err(Error::Parse("trailer reference did not resolve to a dictionary")),
        }
    }

    /// Materializes xref entry `num` in place: idempotent, and a no-op
    /// for unused entries.
    fn get_object(&mut self, num: usize) -> Result<(), Error> {
        if !self.xref[num].used {
            return Ok(());
        }
        if !matches!(self.xref[num].object, Object::Nil) {
            return Ok(());
        }

        let offset = self.xref[num].offset;
        self.image.seek(SeekPos::Start(offset));

        let obj_num = read_unsigned(&mut self.image)?;
        let _generation = read_unsigned(&mut self.image)?;
        if obj_num != num as u64 {
            log::warn!("xref entry {num} points at object header for {obj_num}");
        }
        self.image.skip_ws();
        if !self.image.check(b"obj", true) {
            return Err(Error::Parse("expected 'obj' keyword"));
        }

        let obj = Parser::new(&mut self.image).parse(None)?;
        self.xref[num].object = obj;

        match Lexer::new(&mut self.image).lex()? {
            Lexed::Token(Tok::StreamBegin) => {
                let dict = match &self.xref[num].object {
                    Object::Dictionary(d) => d.clone(),
                    _ => return Err(Error::Parse("stream body without a preceding dictionary")),
                };
                let length = self.resolve_length(&dict)?;
                let begin = self.image.tell();
                self.xref[num].stream = Some((begin, length));
                self.image.skip(length)?;

                match Lexer::new(&mut self.image).lex()? {
                    Lexed::Token(Tok::StreamEnd) => {}
                    _ => return Err(Error::Parse("expected 'endstream'")),
                }
                match Lexer::new(&mut self.image).lex()? {
                    Lexed::Token(Tok::ObjectEnd) => {}
                    _ => return Err(Error::Parse("expected 'endobj'")),
                }
            }
            Lexed::Token(Tok::ObjectEnd) => {}
            _ => return Err(Error::Parse("expected 'stream' or 'endobj'")),
        }
        Ok(())
    }

    fn resolve_length(&mut self, dict: &Dict) -> Result<usize, Error> {
        match dict.get(b"Length") {
            Some(Object::Numeric(n)) => Ok(*n as usize),
            Some(Object::Indirect(n)) => {
                let n = *n as usize;
                let saved = self.image.tell();
                self.get_object(n)?;
                let resolved = self.xref.get(n).map(|e| e.object.clone());
                self.image.seek(SeekPos::Start(saved));
                match resolved {
                    Some(Object::Numeric(l)) => Ok(l as usize),
                    _ => Err(Error::Parse("/Length indirect reference did not resolve to a number")),
                }
            }
            _ => Err(Error::Parse("missing or non-numeric /Length")),
        }
    }

    /// Compact per-entry table matching the external front-end's row format:
    /// `no(10) offset(10) revision(5) used|unused(6) object [stream[size]]`.
    pub fn render_table(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "%PDF-{}", self.version);
        let _ = writeln!(out, "{:>10} {:>10} {:>5} {:<6} object", "no", "xref", "rev", "used");
        for (i, entry) in self.xref.iter().enumerate() {
            let used = if entry.used { "used" } else { "unused" };
            let _ = write!(out, "{i:>10} {:>10} {:>5} {used:<6}", entry.offset, entry.revision);
            let _ = write!(out, " {}", entry.object.render(self.image.bytes()));
            if let Some((_, size)) = entry.stream {
                let _ = write!(out, " stream[{size}]");
            }
            let _ = writeln!(out);
        }
        out
    }

    /// Writes a hierarchical diff against `other`:
    /// version, xref table size, per-index entry mismatches, trailer size.
    /// Root/Info dictionaries are compared only via [`PartialEq`], never
    /// rendered here, matching the reference's observable output. Top-level
    /// mismatches are single inline lines, as in the reference's
    /// `Document::diff`; only the per-entry descent indents.
    pub fn diff(&self, other: &Document) -> String {
        let mut out = String::new();
        let buf_a = self.image.bytes();
        let buf_b = other.image.bytes();

        if self.version != other.version {
            let _ = writeln!(out, "Version: {} / {}", self.version, other.version);
        }
        if self.xref.len() != other.xref.len() {
            let _ = writeln!(out, "Xref table size: {} / {}", self.xref.len(), other.xref.len());
        } else {
            for (i, (a, b)) in self.xref.iter().zip(&other.xref).enumerate() {
                if a.eq_in(b, buf_a, buf_b) {
                    continue;
                }
                let _ = writeln!(out, "Xref table [{i}]");
                a.diff(b, buf_a, buf_b, 1, &mut out);
            }
        }
        if self.trailer.size != other.trailer.size {
            let _ = writeln!(out, "File trailer size: {} / {}", self.trailer.size, other.trailer.size);
        }
        out
    }
}

impl PartialEq for Document {
    fn eq(&self, other: &Document) -> bool {
        let buf_a = self.image.bytes();
        let buf_b = other.image.bytes();
        self.version == other.version
            && self.xref.len() == other.xref.len()
            && self.xref.iter().zip(&other.xref).all(|(a, b)| a.eq_in(b, buf_a, buf_b))
            && self.trailer.size == other.trailer.size
            && self.trailer.root.eq_in(&other.trailer.root, buf_a, buf_b)
            && self.trailer.info.eq_in(&other.trailer.info, buf_a, buf_b)
    }
}

fn read_unsigned(img: &mut ByteImage) -> Result<u64, Error> {
    img.skip_ws();
    let digits = img.skip_while_regular();
    std::str::from_utf8(&digits)
        .ok()
        .and_then(|s| s.parse().ok())
        .ok_or(Error::Parse("expected an unsigned integer"))
}

fn parse_subsection_header(line: &[u8]) -> Option<(usize, usize)> {
    static RE: OnceLock<Regex> = OnceLock::new();
    let re = RE.get_or_init(|| Regex::new(r"^([0-9]+) ([0-9]+)$").unwrap());
    let caps = re.captures(line)?;
    let begin: usize = std::str::from_utf8(caps.get(1)?.as_bytes()).ok()?.parse().ok()?;
    let count: usize = std::str::from_utf8(caps.get(2)?.as_bytes()).ok()?.parse().ok()?;
    Some((begin, count))
}

fn parse_xref_row(row: &[u8]) -> Option<(usize, u16, bool)> {
    static RE: OnceLock<Regex> = OnceLock::new();
    let re = RE.get_or_init(|| Regex::new(r"^([0-9]{10}) ([0-9]{5}) ([fn])[ \r][\r\n]").unwrap());
    let caps = re.captures(row)?;
    let offset: usize = std::str::from_utf8(caps.get(1)?.as_bytes()).ok()?.parse().ok()?;
    let revision: u16 = std::str::from_utf8(caps.get(2)?.as_bytes()).ok()?.parse().ok()?;
    let used = caps.get(3)?.as_bytes() == b"n";
    Some((offset, revision, used))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn minimal_pdf() -> Vec<u8> {
        let mut buf = Vec::new();
        buf.extend_from_slice(b"%PDF-1.4\n");
        let obj_offset = buf.len();
        buf.extend_from_slice(b"1 0 obj\n<< /Type /Catalog >>\nendobj\n");
        let xref_offset = buf.len();
        buf.extend_from_slice(b"xref\n0 2\n");
        buf.extend_from_slice(b"0000000000 65535 f \n");
        buf.extend_from_slice(format!("{obj_offset:010} 00000 n \n").as_bytes());
        buf.extend_from_slice(b"trailer\n<< /Size 2 /Root 1 0 R >>\n");
        buf.extend_from_slice(b"startxref\n");
        buf.extend_from_slice(format!("{xref_offset}\n").as_bytes());
        buf.extend_from_slice(b"%%EOF");
        buf
    }

    #[test]
    fn test_minimal_document() {
        let doc = Document::from_bytes(minimal_pdf()).unwrap();
        assert_eq!(doc.version, "1.4");
        assert_eq!(doc.xref.len(), 2);
        assert!(!doc.xref[0].used);
        assert!(doc.xref[1].used);
        assert_eq!(doc.trailer.size, 2);
        assert_eq!(doc.trailer.root.get(b"Type"), Some(&Object::Name(crate::base::name::Name(b"Catalog".to_vec()))));
    }

    #[test]
    fn test_equality_is_reflexive() {
        let doc = Document::from_bytes(minimal_pdf()).unwrap();
        let doc2 = Document::from_bytes(minimal_pdf()).unwrap();
        assert_eq!(doc, doc2);
        assert_eq!(doc.diff(&doc2), "");
    }

    #[test]
    fn test_missing_eof_fails() {
        let mut buf = minimal_pdf();
        let len = buf.len();
        buf.truncate(len - 5); // drop trailing %%EOF
        assert!(Document::from_bytes(buf).is_err());
    }

    #[test]
    fn test_missing_header_fails() {
        let mut buf = minimal_pdf();
        buf.drain(0..1);
        assert!(Document::from_bytes(buf).is_err());
    }
}
