use super::tokenizer::Tokenizer;

fn test_detokenizer(bytes: &[u8],expected: &str) {
    let tokenizer = Tokenizer::new();
    assert_eq!(tokenizer.detokenize(bytes),expected);
}

#[test]
fn print_string() {
    test_detokenizer(
        &[0x0f,0x08,0x0a,0x00,0xba,0x20,0x22,0x48,0x45,0x4c,0x4c,0x4f,0x22,0x00,0x00,0x00],
        " 10  PRINT  \"HELLO\"\r\n");
}

#[test]
fn zero_next_address_terminates() {
    // the second line is unreachable behind a zero link
    let bytes = [
        0x0a,0x08,0x0a,0x00,0x80,0x00, // 10 END
        0x00,0x00,                     // terminator
        0x10,0x08,0x14,0x00,0x80,0x00  // junk beyond the program
    ];
    test_detokenizer(&bytes," 10  END \r\n");
}

#[test]
fn rem_replaces_line_breaks() {
    // a CR embedded in a comment renders as '*'
    let bytes = [0x0c,0x08,0x0a,0x00,0xb2,0x41,0x0d,0x42,0x00,0x00,0x00];
    test_detokenizer(&bytes," 10  REM A*B\r\n");
}

#[test]
fn unknown_token_renders_error() {
    let bytes = [0x09,0x08,0x0a,0x00,0xfb,0x00,0x00,0x00];
    test_detokenizer(&bytes," 10  ERROR \r\n");
}

#[test]
fn scenario_hgr2_rem() {
    let tokenizer = Tokenizer::new();
    let tokens = tokenizer.tokenize("10 HGR2 : REM SOMETHING\n20 REM SOMETHING ELSE");
    let text = tokenizer.detokenize(&tokens);
    assert!(text.contains("HGR2 "));
    assert!(text.contains("REM"));
    assert!(text.contains("SOMETHING ELSE"));
}
