//! Module containing the Applesoft tokenizer and detokenizer.

use std::collections::HashMap;
use super::token_maps;
use crate::lang;

/// Handles tokenization of Applesoft BASIC.
pub struct Tokenizer {
    detok_map: HashMap<u8,&'static str>,
    /// token texts longest first, for the greedy scan
    tok_list: Vec<(&'static str,u8)>
}

impl Tokenizer {
    /// Create a new `Tokenizer` structure
    pub fn new() -> Self {
        let mut detok_map = HashMap::new();
        let mut tok_list = Vec::new();
        for (code,text) in token_maps::TOKENS {
            detok_map.insert(code,text);
            tok_list.push((text,code));
        }
        tok_list.sort_by(|a,b| b.0.len().cmp(&a.0.len()));
        Self { detok_map, tok_list }
    }
    /// longest token matching the upcoming characters, if any
    fn match_token(&self,upcoming: &[u8]) -> Option<(&'static str,u8)> {
        for (text,code) in &self.tok_list {
            let tok = text.as_bytes();
            if upcoming.len() >= tok.len() && upcoming[0..tok.len()].eq_ignore_ascii_case(tok) {
                return Some((text,*code));
            }
        }
        None
    }
    fn tokenize_line(&self,line: &str,curr_addr: u16) -> Option<Vec<u8>> {
        let trimmed = line.trim();
        if trimmed.len() == 0 {
            return None;
        }
        let num_str: String = trimmed.chars().take_while(|c| c.is_ascii_digit()).collect();
        let line_num: u16 = num_str.parse().unwrap_or(0);
        let rest = trimmed[num_str.len()..].trim_start().as_bytes();

        let mut buf: Vec<u8> = vec![0;4];
        buf[2..4].copy_from_slice(&u16::to_le_bytes(line_num));
        let mut in_quote = false;
        let mut in_rem = false;
        let mut i = 0;
        while i < rest.len() {
            let ch = rest[i];
            if in_rem {
                buf.push(ch);
                i += 1;
                continue;
            }
            if in_quote {
                buf.push(ch);
                if ch == b'"' {
                    in_quote = false;
                }
                i += 1;
                continue;
            }
            if ch == b'"' {
                buf.push(ch);
                in_quote = true;
                i += 1;
                continue;
            }
            if !lang::is_breaking_char(ch as char) {
                if let Some((text,code)) = self.match_token(&rest[i..]) {
                    buf.push(code);
                    i += text.len();
                    if code == 0xb2 {
                        in_rem = true;
                    }
                    continue;
                }
            }
            buf.push(ch);
            i += 1;
        }
        buf.push(0x00);
        let next_addr = curr_addr + buf.len() as u16;
        buf[0..2].copy_from_slice(&u16::to_le_bytes(next_addr));
        Some(buf)
    }
    /// Tokenize a program.  The next-address links assume the standard
    /// load point of $801.
    pub fn tokenize(&self,src: &str) -> Vec<u8> {
        let mut curr_addr: u16 = 0x801;
        let mut buffer: Vec<u8> = Vec::new();
        for line in lang::split_lines(src) {
            if let Some(mut linebuf) = self.tokenize_line(&line,curr_addr) {
                curr_addr += linebuf.len() as u16;
                buffer.append(&mut linebuf);
            }
        }
        buffer.push(0x00);
        buffer.push(0x00);
        return buffer;
    }
    /// Render tokenized bytes as text, one line per program line.
    /// A zero next-address terminates the program.
    pub fn detokenize(&self,data: &[u8]) -> String {
        let n = data.len();
        let mut out = String::new();
        let mut p = 0;
        while p + 4 <= n {
            let next_addr = u16::from_le_bytes([data[p],data[p+1]]);
            p += 2;
            if next_addr == 0 {
                break;
            }
            let line_num = u16::from_le_bytes([data[p],data[p+1]]);
            p += 2;
            out += &format!(" {} ",line_num);
            let mut in_rem = false;
            while p < n {
                let t = data[p];
                p += 1;
                if t == 0 {
                    break;
                }
                if t & 0x80 != 0 {
                    match self.detok_map.get(&t) {
                        Some(text) => out += &format!(" {} ",text),
                        None => out += " ERROR "
                    };
                    if t == 0xb2 {
                        in_rem = true;
                    }
                    continue;
                }
                let ch = t as char;
                if in_rem && (ch == '\r' || ch == '\n') {
                    out.push('*');
                } else {
                    out.push(ch);
                }
            }
            out += "\r\n";
        }
        return out;
    }
}
