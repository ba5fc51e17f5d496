//! # Applesoft BASIC module
//!
//! Token table and (de)tokenizer for Applesoft programs.  The tokenized
//! form is the in-memory image starting at $801: per line, a next-line
//! address, a line number, the token stream, and a zero terminator, with
//! two zero bytes ending the program.

mod token_maps;
#[cfg(test)]
mod tokenize_test;
#[cfg(test)]
mod detokenize_test;
pub mod tokenizer;
