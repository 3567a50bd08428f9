use std::sync::OnceLock;

use regex::bytes::Regex;

use crate::base::object::Object;
use crate::byteimage::ByteImage;
use crate::error::Error;

use super::cc::CharClass;

/// A token sentinel produced by [`Lexer::lex`] that is not itself a leaf
/// value — structural punctuation the parser assembles into arrays and
/// dictionaries.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum Tok {
    ArrayBegin,
    ArrayEnd,
    DictionaryBegin,
    DictionaryEnd,
    StreamBegin,
    StreamEnd,
    ObjectEnd,
}

#[derive(Debug)]
pub enum Lexed {
    Token(Tok),
    Leaf(Object),
}

fn indirect_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^([0-9]+) ([0-9]+) R").unwrap())
}

/// Classifies the next lexeme under the cursor. Holds no
/// state of its own beyond the borrowed cursor — constructing one per
/// call is cheap and keeps `ByteImage` the sole owner of position.
pub struct Lexer<'a> {
    img: &'a mut ByteImage,
}

impl<'a> Lexer<'a> {
    pub fn new(img: &'a mut ByteImage) -> Self {
        Lexer { img }
    }

    pub fn lex(&mut self) -> Result<Lexed, Error> {
        loop {
            self.img.skip_ws();
            if self.img.peek() == Some(b'%') {
                self.img.skip_until(&[b'\r', b'\n']);
                continue;
            }
            break;
        }
        let c = self.img.peek().ok_or(Error::Parse("unexpected end of file"))?;
        match c {
            b't' => {
                self.expect(b"true")?;
                Ok(Lexed::Leaf(Object::Bool(true)))
            }
            b'f' => {
                self.expect(b"false")?;
                Ok(Lexed::Leaf(Object::Bool(false)))
            }
            b'+' | b'-' | b'0'..=b'9' => self.lex_number_or_indirect().map(Lexed::Leaf),
            b'(' => self.lex_literal_string().map(Lexed::Leaf),
            b'<' => self.lex_angle(),
            b'>' => {
                self.expect(b">>")?;
                Ok(Lexed::Token(Tok::DictionaryEnd))
            }
            b'/' => self.lex_name().map(Lexed::Leaf),
            b'[' => {
                self.img.skip(1)?;
                Ok(Lexed::Token(Tok::ArrayBegin))
            }
            b']' => {
                self.img.skip(1)?;
                Ok(Lexed::Token(Tok::ArrayEnd))
            }
            b's' => self.lex_stream_begin(),
            b'e' => self.lex_endstream_or_endobj(),
            _ => Err(Error::Parse("unrecognized token")),
        }
    }

    fn expect(&mut self, token: &[u8]) -> Result<(), Error> {
        if self.img.check(token, true) {
            Ok(())
        } else {
            Err(Error::Parse("expected literal token not found"))
        }
    }

    fn lex_number_or_indirect(&mut self) -> Result<Object, Error> {
        if self.img.peek().is_some_and(|c| c.is_ascii_digit()) {
            if let Some((num, gen, matched_len)) = self.try_indirect_ref() {
                if gen != 0 {
                    return Err(Error::Parse("non-zero generation in indirect reference"));
                }
                self.img.skip(matched_len)?;
                return Ok(Object::Indirect(num));
            }
        }
        let tok = self.img.skip_while_regular();
        let s = std::str::from_utf8(&tok).map_err(|_| Error::Parse("malformed number"))?;
        let n: f64 = s.parse().map_err(|_| Error::Parse("malformed number"))?;
        Ok(Object::Numeric(n))
    }

    /// Returns `(object_number, generation, bytes_matched)` if the
    /// cursor sits at a well-formed `n g R` whose trailing `R` is
    /// immediately followed by a delimiter, whitespace, or EOF.
    fn try_indirect_ref(&self) -> Option<(u32, u16, usize)> {
        let caps = self.img.check_regex(indirect_re())?;
        let whole = caps.get(0)?;
        let num: u32 = std::str::from_utf8(caps.get(1)?.as_bytes()).ok()?.parse().ok()?;
        let gen: u16 = std::str::from_utf8(caps.get(2)?.as_bytes()).ok()?.parse().ok()?;
        let after = self.img.bytes().get(self.img.tell() + whole.end());
        match after {
            None => Some((num, gen, whole.end())),
            Some(&c) if CharClass::of(c) != CharClass::Reg => Some((num, gen, whole.end())),
            _ => None,
        }
    }

    fn lex_literal_string(&mut self) -> Result<Object, Error> {
        let begin = self.img.tell();
        self.img.next_byte();
        let mut depth = 1u32;
        loop {
            let c = self
                .img
                .next_byte()
                .ok_or(Error::Parse("unterminated literal string"))?;
            match c {
                b'\\' => match self.img.next_byte() {
                    Some(b'n' | b'r' | b't' | b'b' | b'f' | b'(' | b')' | b'\\') => {}
                    Some(d) if (b'0'..=b'7').contains(&d) => {
                        for _ in 0..2 {
                            match self.img.peek() {
                                Some(o) if (b'0'..=b'7').contains(&o) => {
                                    self.img.next_byte();
                                }
                                _ => break,
                            }
                        }
                    }
                    Some(_) => {
                        // not a recognized escape: keep the backslash and this
                        // byte literally by re-processing the byte next iteration.
                        self.step_back_one();
                    }
                    None => return Err(Error::Parse("unterminated literal string")),
                },
                b'(' => depth += 1,
                b')' => {
                    depth -= 1;
                    if depth == 0 {
                        break;
                    }
                }
                _ => {}
            }
        }
        Ok(Object::String(begin, self.img.tell()))
    }

    fn step_back_one(&mut self) {
        let pos = self.img.tell();
        self.img.seek(crate::byteimage::SeekPos::Start(pos.saturating_sub(1)));
    }

    fn lex_angle(&mut self) -> Result<Lexed, Error> {
        if self.img.check(b"<<", true) {
            return Ok(Lexed::Token(Tok::DictionaryBegin));
        }
        self.lex_hex_string().map(Lexed::Leaf)
    }

    fn lex_hex_string(&mut self) -> Result<Object, Error> {
        let begin = self.img.tell();
        self.img.next_byte();
        let mut depth = 1u32;
        loop {
            let c = self.img.next_byte().ok_or(Error::Parse("unterminated hex string"))?;
            match c {
                b'<' => depth += 1,
                b'>' => {
                    depth -= 1;
                    if depth == 0 {
                        break;
                    }
                }
                c if c.is_ascii_hexdigit() => {}
                c if CharClass::of(c) == CharClass::Space => {}
                _ => return Err(Error::Parse("illegal byte in hex string")),
            }
        }
        Ok(Object::String(begin, self.img.tell()))
    }

    fn lex_name(&mut self) -> Result<Object, Error> {
        self.img.skip(1)?;
        let bytes = self.img.skip_while_regular();
        Ok(Object::Name(crate::base::name::Name(bytes)))
    }

    fn lex_stream_begin(&mut self) -> Result<Lexed, Error> {
        self.expect(b"stream")?;
        loop {
            match self.img.next_byte() {
                Some(b'\n') => break,
                Some(_) => continue,
                None => return Err(Error::Parse("unterminated stream keyword line")),
            }
        }
        Ok(Lexed::Token(Tok::StreamBegin))
    }

    fn lex_endstream_or_endobj(&mut self) -> Result<Lexed, Error> {
        if self.img.check(b"endstream", true) {
            Ok(Lexed::Token(Tok::StreamEnd))
        } else if self.img.check(b"endobj", true) {
            Ok(Lexed::Token(Tok::ObjectEnd))
        } else {
            Err(Error::Parse("expected endstream or endobj"))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::byteimage::ByteImage;

    fn lex_one(input: &[u8]) -> (Lexed, usize) {
        let mut img = ByteImage::new(input.to_vec());
        let result = Lexer::new(&mut img).lex().unwrap();
        (result, img.tell())
    }

    #[test]
    fn test_name_round_trips_bytes_after_slash() {
        let (lexed, pos) = lex_one(b"/Foo ");
        match lexed {
            Lexed::Leaf(Object::Name(name)) => assert_eq!(name.0, b"Foo"),
            _ => panic!("expected name"),
        }
        assert_eq!(pos, 4);
    }

    #[test]
    fn test_literal_string_spans_full_source_range() {
        let input = b"(ab\\)c)";
        let (lexed, pos) = lex_one(input);
        match lexed {
            Lexed::Leaf(Object::String(begin, end)) => {
                assert_eq!((begin, end), (0, input.len()));
            }
            _ => panic!("expected string"),
        }
        assert_eq!(pos, input.len());
    }

    #[test]
    fn test_indirect_reference_requires_zero_generation() {
        let mut img = ByteImage::new(b"3 1 R".to_vec());
        let err = Lexer::new(&mut img).lex();
        assert!(err.is_err());
    }

    #[test]
    fn test_indirect_reference() {
        let (lexed, _) = lex_one(b"12 0 R");
        assert!(matches!(lexed, Lexed::Leaf(Object::Indirect(12))));
    }

    #[test]
    fn test_number_with_sign() {
        let (lexed, _) = lex_one(b"-3.5 ");
        match lexed {
            Lexed::Leaf(Object::Numeric(n)) => assert_eq!(n, -3.5),
            _ => panic!("expected numeric"),
        }
    }

    #[test]
    fn test_hex_string_with_nesting() {
        let (lexed, pos) = lex_one(b"<AB <CD> EF>");
        match lexed {
            Lexed::Leaf(Object::String(begin, end)) => assert_eq!((begin, end), (0, 12)),
            _ => panic!("expected string"),
        }
        assert_eq!(pos, 12);
    }

    #[test]
    fn test_dict_begin_vs_hex_string() {
        let (lexed, _) = lex_one(b"<<");
        assert!(matches!(lexed, Lexed::Token(Tok::DictionaryBegin)));
    }

    #[test]
    fn test_comment_is_skipped() {
        let (lexed, _) = lex_one(b"% a comment\ntrue");
        assert!(matches!(lexed, Lexed::Leaf(Object::Bool(true))));
    }

    #[test]
    fn test_stream_begin_consumes_through_newline() {
        let mut img = ByteImage::new(b"stream\r\nBODY".to_vec());
        let lexed = Lexer::new(&mut img).lex().unwrap();
        assert!(matches!(lexed, Lexed::Token(Tok::StreamBegin)));
        assert_eq!(img.tell(), 8);
    }
}
