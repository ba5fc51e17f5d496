//! Module containing the Integer BASIC tokenizer and detokenizer.

use std::collections::HashMap;
use regex::Regex;
use super::token_maps;
use crate::lang;

/// Handles tokenization of Integer BASIC.
pub struct Tokenizer {
    detok_map: HashMap<u8,&'static str>,
    /// reverse map; where texts repeat, the lowest code wins
    tok_map: HashMap<&'static str,u8>,
    int_patt: Regex
}

impl Tokenizer {
    /// Create a new `Tokenizer` structure
    pub fn new() -> Self {
        let mut detok_map = HashMap::new();
        let mut tok_map = HashMap::new();
        for (code,text) in token_maps::TOKENS {
            detok_map.insert(code,text);
            if !tok_map.contains_key(text) {
                tok_map.insert(text,code);
            }
        }
        Self {
            detok_map,
            tok_map,
            int_patt: Regex::new(r"^-?[0-9]+$").expect("unreachable")
        }
    }
    /// flush a literal run as an integer constant or a high-bit string
    fn push_chunk(&self,buf: &mut Vec<u8>,chunk: &str) {
        if chunk.len() == 0 {
            return;
        }
        if self.int_patt.is_match(chunk) {
            if let Ok(val) = chunk.parse::<i32>() {
                buf.push(0xb9);
                buf.push((val & 0xff) as u8);
                buf.push(((val >> 8) & 0xff) as u8);
                return;
            }
        }
        for b in chunk.to_uppercase().bytes() {
            buf.push(b | 0x80);
        }
    }
    fn tokenize_line(&self,line: &str) -> Option<Vec<u8>> {
        let trimmed = line.trim();
        if trimmed.len() == 0 {
            return None;
        }
        let num_str: String = trimmed.chars().take_while(|c| c.is_ascii_digit()).collect();
        let line_num: u16 = num_str.parse().unwrap_or(0);
        let rest = trimmed[num_str.len()..].trim_start();

        let mut buf: Vec<u8> = vec![0;3];
        buf[1..3].copy_from_slice(&u16::to_le_bytes(line_num));
        let mut chunk = String::new();
        let mut in_quote = false;
        for ch in rest.chars() {
            if in_quote && ch != '"' {
                buf.push(ch as u8 | 0x80);
                continue;
            }
            match ch {
                '"' => {
                    in_quote = !in_quote;
                    self.push_chunk(&mut buf,&chunk);
                    chunk.clear();
                    buf.push(match in_quote { true => 0x28, false => 0x29 });
                },
                ':' => { self.push_chunk(&mut buf,&chunk); chunk.clear(); buf.push(0x03); },
                ',' => { self.push_chunk(&mut buf,&chunk); chunk.clear(); buf.push(0x0a); },
                ';' => { self.push_chunk(&mut buf,&chunk); chunk.clear(); buf.push(0x45); },
                '(' => { self.push_chunk(&mut buf,&chunk); chunk.clear(); buf.push(0x22); },
                ')' => { self.push_chunk(&mut buf,&chunk); chunk.clear(); buf.push(0x72); },
                '+' => { self.push_chunk(&mut buf,&chunk); chunk.clear(); buf.push(0x12); },
                _ if lang::is_breaking_char(ch) => {
                    self.push_chunk(&mut buf,&chunk);
                    chunk.clear();
                },
                _ => {
                    chunk.push(ch);
                    if let Some(code) = self.tok_map.get(chunk.to_uppercase().as_str()) {
                        buf.push(*code);
                        chunk.clear();
                    }
                }
            }
        }
        self.push_chunk(&mut buf,&chunk);
        buf.push(0x01); // end of line
        buf[0] = buf.len() as u8;
        Some(buf)
    }
    /// Tokenize a program, one length-prefixed line after another.
    pub fn tokenize(&self,src: &str) -> Vec<u8> {
        let mut buffer: Vec<u8> = Vec::new();
        for line in lang::split_lines(src) {
            if let Some(mut linebuf) = self.tokenize_line(&line) {
                buffer.append(&mut linebuf);
            }
        }
        return buffer;
    }
    /// Render tokenized bytes as text.  A zero length byte terminates
    /// the program.
    pub fn detokenize(&self,data: &[u8]) -> String {
        let n = data.len();
        let mut out = String::new();
        let mut p = 0;
        while p + 3 <= n {
            let line_len = data[p];
            p += 1;
            if line_len == 0 {
                break;
            }
            let line_num = u16::from_le_bytes([data[p],data[p+1]]);
            p += 2;
            out += &format!("{} ",line_num);
            let mut trailing_space = false;
            while p < n {
                let mut new_trailing_space = false;
                let t = data[p];
                p += 1;
                if t == 0x01 {
                    break;
                }
                if t == 0x03 {
                    out += " :";
                } else if t == 0x28 {
                    // quoted text runs to the closing marker
                    out.push('"');
                    while p < n && data[p] != 0x29 {
                        out.push((data[p] & 0x7f) as char);
                        p += 1;
                    }
                    if p < n {
                        p += 1;
                    }
                    out.push('"');
                } else if t == 0x5d {
                    // REM runs to end of line
                    if trailing_space {
                        out.push(' ');
                    }
                    out += "REM ";
                    while p < n && data[p] != 0x01 {
                        out.push((data[p] & 0x7f) as char);
                        p += 1;
                    }
                    if p < n {
                        p += 1;
                    }
                    break;
                } else if t >= 0xb0 && t <= 0xb9 {
                    // 16 bit integer constant
                    if p + 2 > n {
                        break;
                    }
                    let val = u16::from_le_bytes([data[p],data[p+1]]);
                    p += 2;
                    out += &format!("{}",val);
                } else if t >= 0xc1 && t <= 0xda {
                    // variable name: letters then optional digits
                    out.push((t & 0x7f) as char);
                    while p < n && ((data[p] >= 0xc1 && data[p] <= 0xda) || (data[p] >= 0xb0 && data[p] <= 0xb9)) {
                        out.push((data[p] & 0x7f) as char);
                        p += 1;
                    }
                } else if t < 0x80 {
                    let text = match self.detok_map.get(&t) {
                        Some(tok) => *tok,
                        None => ""
                    };
                    let first = text.bytes().next().unwrap_or(0x20);
                    if (first >= 0x21 && first <= 0x3f) || t < 0x12 {
                        // does not need leading space
                        out += text;
                    } else {
                        if !trailing_space {
                            out.push(' ');
                        }
                        out += text;
                        out.push(' ');
                        new_trailing_space = true;
                    }
                }
                trailing_space = new_trailing_space;
            }
            out += "\r\n";
        }
        return out;
    }
}
