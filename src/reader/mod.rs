//! Byte cursor over EIR source text.
//!
//! Mirrors the `Reader` class in `examples/original_source/my_ir/ir.cc`:
//! a flat byte buffer with a position and a line counter, plus the small set
//! of primitives the parser drives directly (`token_word`, `literal`,
//! `expect`, `accept`). Unlike `examples/adhirajagarwala-lc3-assembler`'s
//! `lexer::cursor::Cursor`, there is no separate tokenizing pass upstream of
//! the parser — EIR's grammar is reader-driven recursive descent, so the
//! reader itself has to expose identifier and literal scanning, not just
//! single-byte `peek`/`advance`.


use crate::error::EirError;

/// A fully restorable cursor position, including the line counter. `accept`
/// and `mark`/`reset` must restore both fields atomically or a rewound parse
/// attempt would report the wrong line number for a later, real error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Position {
    pos: usize,
    line: usize,
}

pub struct Reader<'a> {
    bytes: &'a [u8],
    pos: usize,
    line: usize,
}

/// Identifier characters: alphanumeric plus `_` and `.` (so `.edata`-style
/// dotted labels and directive names both tokenize as one word).
fn is_ident_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'_' || b == b'.'
}

impl<'a> Reader<'a> {
    pub fn new(bytes: &'a [u8]) -> Self {
        Reader {
            bytes,
            pos: 0,
            line: 1,
        }
    }

    pub fn line(&self) -> usize {
        self.line
    }

    pub fn is_end(&self) -> bool {
        self.pos >= self.bytes.len()
    }

    pub fn peek(&self) -> Option<u8> {
        self.bytes.get(self.pos).copied()
    }

    /// Consume and return the next byte, tracking the line counter.
    pub fn getc(&mut self) -> Option<u8> {
        let b = *self.bytes.get(self.pos)?;
        self.pos += 1;
        if b == b'\n' {
            self.line += 1;
        }
        Some(b)
    }

    pub fn get_pos(&self) -> Position {
        Position {
            pos: self.pos,
            line: self.line,
        }
    }

    pub fn set_pos(&mut self, mark: Position) {
        self.pos = mark.pos;
        self.line = mark.line;
    }

    /// Consume a maximal run of whitespace bytes.
    pub fn skip_spaces(&mut self) -> usize {
        let mut count = 0;
        while matches!(self.peek(), Some(b) if b.is_ascii_whitespace()) {
            self.getc();
            count += 1;
        }
        count
    }

    /// Skip leading whitespace, consume a maximal run of identifier bytes,
    /// then skip trailing whitespace. May return an empty string if the next
    /// non-space byte isn't an identifier byte at all.
    pub fn token_word(&mut self) -> String {
        self.skip_spaces();
        let mut result = String::new();
        while matches!(self.peek(), Some(b) if is_ident_byte(b)) {
            result.push(self.getc().unwrap() as char);
        }
        self.skip_spaces();
        result
    }

    /// Parse a `"…"` string literal (the opening quote must already be the
    /// next byte — callers use `accept("\"")` or check `peek()` first).
    /// Recognizes `\n \t \\ \" \b` and the passthrough escape `\xAB` (the two
    /// bytes following `\x` are copied through literally, not decoded as
    /// hex). Appends a trailing NUL, matching the EIR `.string` directive's
    /// contract of emitting a null-terminated byte sequence.
    /// Read a `"..."`-delimited string literal as its raw bytes (not a UTF-8
    /// `String` — EIR's `.string` data holds bytes, and a byte >= 0x80 read
    /// back with `char`/`String` would get re-encoded into two UTF-8 bytes
    /// instead of staying one). The terminating NUL is appended.
    pub fn literal(&mut self) -> Result<Vec<u8>, EirError> {
        let start_line = self.line;
        if self.getc() != Some(b'"') {
            return Err(EirError::parse(start_line, "expected opening '\"'"));
        }
        let mut result = Vec::new();
        loop {
            match self.getc() {
                None => {
                    return Err(EirError::parse(start_line, "unterminated string literal"));
                }
                Some(b'"') => {
                    result.push(0);
                    return Ok(result);
                }
                Some(b'\\') => {
                    let esc = self
                        .getc()
                        .ok_or_else(|| EirError::parse(start_line, "unterminated string literal"))?;
                    match esc {
                        b'n' => result.push(b'\n'),
                        b't' => result.push(b'\t'),
                        b'\\' => result.push(b'\\'),
                        b'"' => result.push(b'"'),
                        b'b' => result.push(0x08),
                        b'x' => {
                            for _ in 0..2 {
                                let c = self.getc().ok_or_else(|| {
                                    EirError::parse(start_line, "unterminated \\x escape")
                                })?;
                                result.push(c);
                            }
                        }
                        other => {
                            return Err(EirError::parse(
                                self.line,
                                format!("invalid escape sequence: \\{}", other as char),
                            ));
                        }
                    }
                }
                Some(c) => result.push(c),
            }
        }
    }

    /// Skip whitespace, then require the exact byte sequence `expected`.
    pub fn expect(&mut self, expected: &str) -> Result<(), EirError> {
        self.skip_spaces();
        for &want in expected.as_bytes() {
            match self.getc() {
                Some(got) if got == want => {}
                _ => {
                    return Err(EirError::parse(
                        self.line,
                        format!("expected `{}`", expected),
                    ));
                }
            }
        }
        Ok(())
    }

    /// Atomic lookahead: skip whitespace, then try to consume `possible`
    /// exactly. On mismatch, restore the cursor (including the line counter)
    /// to where it stood before whitespace was skipped.
    pub fn accept(&mut self, possible: &str) -> bool {
        let mark = self.get_pos();
        self.skip_spaces();
        for &want in possible.as_bytes() {
            match self.peek() {
                Some(got) if got == want => {
                    self.getc();
                }
                _ => {
                    self.set_pos(mark);
                    return false;
                }
            }
        }
        true
    }

    /// Speculative parse: run `f`, rewinding to the pre-call position if it
    /// returns `None`. A closure-based alternative to manual `get_pos`/
    /// `set_pos` pairs for call sites that don't need `accept`'s fixed-string
    /// matching.
    pub fn try_parse<T>(&mut self, f: impl FnOnce(&mut Reader<'a>) -> Option<T>) -> Option<T> {
        let mark = self.get_pos();
        match f(self) {
            Some(v) => Some(v),
            None => {
                self.set_pos(mark);
                None
            }
        }
    }

    /// Consume bytes through and including the next `\n` or `\r` (used to
    /// discard `#`/`.loc`/`.file` comment lines).
    pub fn skip_until_ret(&mut self) {
        while let Some(c) = self.getc() {
            if c == b'\n' || c == b'\r' {
                break;
            }
        }
    }
}
