pub mod cc;
pub mod lexer;
pub mod parse;

pub use lexer::{Lexed, Lexer, Tok};
pub use parse::Parser;
