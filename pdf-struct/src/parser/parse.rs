use crate::base::dict::Dict;
use crate::base::object::Object;
use crate::byteimage::ByteImage;
use crate::error::Error;

use super::lexer::{Lexed, Lexer, Tok};

/// Recursive-descent assembler over [`Lexer`] tokens.
pub struct Parser<'a> {
    img: &'a mut ByteImage,
}

impl<'a> Parser<'a> {
    pub fn new(img: &'a mut ByteImage) -> Self {
        Parser { img }
    }

    /// Parses one object. If `stock` is given, it is used as the first
    /// token instead of calling `lex()` again — the caller has already
    /// peeked a token it now wants handed back into the recursion.
    pub fn parse(&mut self, stock: Option<Lexed>) -> Result<Object, Error> {
        let first = match stock {
            Some(l) => l,
            None => Lexer::new(self.img).lex()?,
        };
        match first {
            Lexed::Leaf(obj) => Ok(obj),
            Lexed::Token(Tok::ArrayBegin) => self.parse_array(),
            Lexed::Token(Tok::DictionaryBegin) => self.parse_dict(),
            Lexed::Token(_) => Err(Error::Parse("unexpected structural token")),
        }
    }

    fn parse_array(&mut self) -> Result<Object, Error> {
        let mut items = Vec::new();
        loop {
            let tok = Lexer::new(self.img).lex()?;
            match tok {
                Lexed::Token(Tok::ArrayEnd) => break,
                Lexed::Token(Tok::ArrayBegin) | Lexed::Token(Tok::DictionaryBegin) => {
                    items.push(self.parse(Some(tok))?);
                }
                Lexed::Leaf(obj) => items.push(obj),
                Lexed::Token(_) => return Err(Error::Parse("unexpected token inside array")),
            }
        }
        Ok(Object::Array(items))
    }

    fn parse_dict(&mut self) -> Result<Object, Error> {
        let mut dict = Dict::new();
        loop {
            let key_tok = Lexer::new(self.img).lex()?;
            let key = match key_tok {
                Lexed::Token(Tok::DictionaryEnd) => break,
                Lexed::Leaf(Object::Name(name)) => name,
                _ => return Err(Error::Parse("dictionary key must be a name")),
            };
            let val_tok = Lexer::new(self.img).lex()?;
            let value = match val_tok {
                Lexed::Token(Tok::ArrayBegin) | Lexed::Token(Tok::DictionaryBegin) => {
                    self.parse(Some(val_tok))?
                }
                Lexed::Leaf(obj) => obj,
                Lexed::Token(_) => return Err(Error::Parse("unexpected token as dictionary value")),
            };
            dict.insert(key, value);
        }
        Ok(Object::Dictionary(dict))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse_str(input: &[u8]) -> Object {
        let mut img = ByteImage::new(input.to_vec());
        Parser::new(&mut img).parse(None).unwrap()
    }

    #[test]
    fn test_parse_flat_array() {
        let obj = parse_str(b"[ 1 2 true ]");
        match obj {
            Object::Array(items) => {
                assert_eq!(items.len(), 3);
                assert_eq!(items[0], Object::Numeric(1.0));
                assert_eq!(items[2], Object::Bool(true));
            }
            _ => panic!("expected array"),
        }
    }

    #[test]
    fn test_parse_nested_array() {
        let obj = parse_str(b"[ [ 1 ] [ 2 3 ] ]");
        match obj {
            Object::Array(items) => assert_eq!(items.len(), 2),
            _ => panic!("expected array"),
        }
    }

    #[test]
    fn test_parse_dict() {
        let obj = parse_str(b"<< /Type /Catalog /Count 3 >>");
        match obj {
            Object::Dictionary(dict) => {
                assert_eq!(dict.get(b"Type"), Some(&Object::Name(crate::base::name::Name(b"Catalog".to_vec()))));
                assert_eq!(dict.get(b"Count"), Some(&Object::Numeric(3.0)));
            }
            _ => panic!("expected dictionary"),
        }
    }

    #[test]
    fn test_parse_dict_rejects_non_name_key() {
        let mut img = ByteImage::new(b"<< 1 2 >>".to_vec());
        assert!(Parser::new(&mut img).parse(None).is_err());
    }

    #[test]
    fn test_parse_dict_duplicate_key_overwrites() {
        let obj = parse_str(b"<< /A 1 /A 2 >>");
        match obj {
            Object::Dictionary(dict) => {
                assert_eq!(dict.len(), 1);
                assert_eq!(dict.get(b"A"), Some(&Object::Numeric(2.0)));
            }
            _ => panic!("expected dictionary"),
        }
    }
}
