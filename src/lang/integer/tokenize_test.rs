// Token streams below follow the Integer BASIC in-memory line format:
// length byte, line number, tokens, 0x01.

use std::fmt::Write;
use super::tokenizer::Tokenizer;

fn test_tokenizer(test_code: &str,expected: &str) {
    let tokenizer = Tokenizer::new();
    let bytes = tokenizer.tokenize(test_code);
    let mut listfmt = String::new();
    for b in &bytes {
        write!(&mut listfmt,"{:02X}",b).expect("formatting error");
    }
    assert_eq!(listfmt,expected);
}

#[test]
fn print_string() {
    test_tokenizer("10 PRINT \"HELLO WORLD!\"","130A006128C8C5CCCCCFA0D7CFD2CCC4A12901");
}

#[test]
fn goto_line() {
    test_tokenizer("20 GOTO 10","0814005FB90A0001");
}

#[test]
fn integer_constant_encoding() {
    // 1000 = 0x03E8 little endian behind the constant marker
    test_tokenizer("5 CALL 1000","0805004DB9E80301");
}

#[test]
fn variable_names_are_high_bit() {
    let tokenizer = Tokenizer::new();
    let bytes = tokenizer.tokenize("10 X = 5");
    // X encodes as 0xD8, the = as a token, 5 as a constant
    assert!(bytes.contains(&0xd8));
    assert!(bytes.contains(&0x16));
    assert!(bytes.contains(&0xb9));
}

#[test]
fn quotes_use_markers() {
    let tokenizer = Tokenizer::new();
    let bytes = tokenizer.tokenize("10 PRINT \"A\"");
    let open = bytes.iter().position(|b| *b == 0x28).expect("no open marker");
    assert_eq!(bytes[open+1],0xc1);
    assert_eq!(bytes[open+2],0x29);
}
