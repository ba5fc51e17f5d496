//! # Language Module
//!
//! Tokenization and detokenization of the BASIC dialects found on
//! Apple II disks:
//! * `lang::applesoft` handles Applesoft BASIC
//! * `lang::integer` handles Integer BASIC
//!
//! Both are table driven.  Detokenizers accept the raw program bytes as
//! stored on disk (sans the DOS length header) and render UTF8 lines;
//! tokenizers accept lines and produce bytes ready to be wrapped in the
//! on-disk header by a file system codec.

pub mod applesoft;
pub mod integer;

/// Split source text into lines, tolerating CRLF and bare CR.
pub fn split_lines(src: &str) -> Vec<String> {
    src.replace("\r\n","\n").replace("\r","\n")
        .split('\n')
        .map(|s| s.to_string())
        .filter(|s| s.len() > 0)
        .collect()
}

/// Characters that end a token accumulation in either dialect.
pub fn is_breaking_char(ch: char) -> bool {
    ch == '(' || ch == ')' || ch == '.' || ch == ',' || ch == ';' || ch == ':' || ch == ' '
}
