pub mod diagnostic;
pub mod lexer;
pub mod parser;
pub mod source;
pub mod token;
pub mod token_dumper;
