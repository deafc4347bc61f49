//! Streaming UTF-8 line decoding
//!
//! Child process output arrives in arbitrary chunks. A chunk boundary may
//! fall inside a multi-byte character or in the middle of a line, so the
//! decoder keeps undecoded bytes and the partial line between calls and only
//! hands complete lines to its [`LineHandler`].

use std::io;

/// Capacity of the pending byte buffer
pub const BYTE_BUFFER_SIZE: usize = 8192;

/// Maximum characters produced by one decode pass
pub const CHAR_BUFFER_SIZE: usize = 8192;

/// Receives complete lines, each ending in `\n`
pub trait LineHandler {
    fn handle_line(&mut self, line: &str);
}

impl<F: FnMut(&str)> LineHandler for F {
    fn handle_line(&mut self, line: &str) {
        self(line)
    }
}

impl LineHandler for Vec<String> {
    fn handle_line(&mut self, line: &str) {
        self.push(line.to_string());
    }
}

/// Forwards lines to the process's own stdout or stderr
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConsoleSink {
    Stdout,
    Stderr,
}

impl LineHandler for ConsoleSink {
    fn handle_line(&mut self, line: &str) {
        match self {
            Self::Stdout => print!("{}", line),
            Self::Stderr => eprint!("{}", line),
        }
    }
}

/// Outcome of one decode pass
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Pass {
    /// Every decodable byte was consumed
    Underflow,
    /// The character limit was hit with decodable bytes left
    Overflow,
}

/// Incremental byte → line decoder
#[derive(Debug)]
pub struct LineDecoder<H> {
    bytes: Vec<u8>,
    line: String,
    handler: H,
}

impl<H: LineHandler> LineDecoder<H> {
    pub fn new(handler: H) -> Self {
        Self {
            bytes: Vec::with_capacity(BYTE_BUFFER_SIZE),
            line: String::new(),
            handler,
        }
    }

    /// Accept more bytes, dispatching every line they complete.
    ///
    /// Input larger than the free buffer space is taken in slices, decoding
    /// between slices so the buffer never grows past its capacity.
    pub fn feed(&mut self, mut input: &[u8]) {
        while !input.is_empty() {
            let room = BYTE_BUFFER_SIZE - self.bytes.len();
            let (head, tail) = input.split_at(room.min(input.len()));
            self.bytes.extend_from_slice(head);
            input = tail;
            self.process(false);
        }
    }

    /// Flush everything: a dangling partial character becomes U+FFFD and an
    /// unterminated last line is dispatched with a `\n` appended.
    pub fn close(&mut self) {
        self.process(true);
        if !self.line.is_empty() {
            self.line.push('\n');
            self.handler.handle_line(&self.line);
            self.line.clear();
        }
    }

    /// Close the decoder and hand back its handler
    pub fn finish(mut self) -> H {
        self.close();
        self.handler
    }

    pub fn handler(&self) -> &H {
        &self.handler
    }

    fn process(&mut self, end_of_input: bool) {
        while self.decode_pass(end_of_input) == Pass::Overflow {}
    }

    fn decode_pass(&mut self, end_of_input: bool) -> Pass {
        let Self {
            bytes,
            line,
            handler,
        } = self;

        let mut consumed = 0;
        let mut decoded = 0;
        let mut pass = Pass::Underflow;

        'decode: while consumed < bytes.len() {
            let (text, error) = valid_prefix(&bytes[consumed..]);

            for ch in text.chars() {
                if decoded == CHAR_BUFFER_SIZE {
                    pass = Pass::Overflow;
                    break 'decode;
                }
                push_char(line, handler, ch);
                consumed += ch.len_utf8();
                decoded += 1;
            }

            let Some(error) = error else {
                break;
            };

            match error.error_len() {
                // Malformed sequence: substitute and skip it
                Some(len) => {
                    if decoded == CHAR_BUFFER_SIZE {
                        pass = Pass::Overflow;
                        break;
                    }
                    push_char(line, handler, char::REPLACEMENT_CHARACTER);
                    consumed += len;
                    decoded += 1;
                }
                // Truncated sequence at the end of the buffer
                None if end_of_input => {
                    push_char(line, handler, char::REPLACEMENT_CHARACTER);
                    consumed = bytes.len();
                }
                None => break,
            }
        }

        bytes.drain(..consumed);
        pass
    }
}

fn push_char<H: LineHandler>(line: &mut String, handler: &mut H, ch: char) {
    line.push(ch);
    if ch == '\n' {
        handler.handle_line(line);
        line.clear();
    }
}

/// Longest valid UTF-8 prefix of `bytes`, plus the error that ended it
fn valid_prefix(bytes: &[u8]) -> (&str, Option<std::str::Utf8Error>) {
    match std::str::from_utf8(bytes) {
        Ok(text) => (text, None),
        Err(error) => {
            let text = std::str::from_utf8(&bytes[..error.valid_up_to()]).unwrap_or_default();
            (text, Some(error))
        }
    }
}

impl<H: LineHandler> io::Write for LineDecoder<H> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.feed(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}
