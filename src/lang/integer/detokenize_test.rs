use super::tokenizer::Tokenizer;

fn test_detokenizer(bytes: &[u8],expected: &str) {
    let tokenizer = Tokenizer::new();
    assert_eq!(tokenizer.detokenize(bytes),expected);
}

#[test]
fn print_string() {
    test_detokenizer(
        &[0x13,0x0a,0x00,0x61,0x28,0xc8,0xc5,0xcc,0xcc,0xcf,0xa0,0xd7,0xcf,0xd2,0xcc,0xc4,0xa1,0x29,0x01],
        "10  PRINT \"HELLO WORLD!\"\r\n");
}

#[test]
fn goto_with_constant() {
    test_detokenizer(&[0x08,0x14,0x00,0x5f,0xb9,0x0a,0x00,0x01],"20  GOTO 10\r\n");
}

#[test]
fn zero_length_terminates() {
    let bytes = [0x08,0x14,0x00,0x5f,0xb9,0x0a,0x00,0x01,0x00,0xff,0xff];
    test_detokenizer(&bytes,"20  GOTO 10\r\n");
}

#[test]
fn rem_runs_to_end_of_line() {
    // REM then high-bit text to the end of line marker
    let bytes = [0x0a,0x05,0x00,0x5d,0xc8,0xc9,0xa0,0xc8,0xcf,0x01];
    test_detokenizer(&bytes,"5 REM HI HO\r\n");
}

#[test]
fn variable_run_includes_digits() {
    // X1 = 2
    let tokenizer = Tokenizer::new();
    let bytes = tokenizer.tokenize("10 X1 = 2");
    let text = tokenizer.detokenize(&bytes);
    assert!(text.contains("X1"));
    assert!(text.contains("2"));
}

#[test]
fn canonical_re_rendering() {
    // tokenize, detokenize, tokenize again: the byte stream is stable
    let tokenizer = Tokenizer::new();
    let first = tokenizer.tokenize("10 PRINT \"A\"\n20 GOTO 10");
    let rendered = tokenizer.detokenize(&first);
    let second = tokenizer.tokenize(&rendered);
    assert_eq!(first,second);
}
