//! # Integer BASIC module
//!
//! Token table and (de)tokenizer for Integer BASIC programs.  The
//! tokenized form is per line: a length byte, a line number, the token
//! stream, and an 0x01 end-of-line token.  Integer constants are encoded
//! behind 0xB0..0xB9 marker bytes, variable names are high-bit ASCII
//! runs, and quoted strings are delimited by 0x28/0x29.

mod token_maps;
#[cfg(test)]
mod tokenize_test;
#[cfg(test)]
mod detokenize_test;
pub mod tokenizer;
