//! Byte-level token scanner for haiku source text.
//!
//! Tokens are runs of printable ASCII delimited by whitespace. The
//! scanner also implements the input-consuming side of the two comment
//! words, which discard bytes up to a terminator.

use crate::error::{CompileError, Result};
use nom::combinator::all_consuming;
use nom::number::complete::double;

/// Longest accepted token, in octets.
pub const MAX_WORD_LEN: usize = 64;

pub struct Scanner<'a> {
    input: &'a str,
    pos: usize,
}

/// The C locale whitespace set; `u8::is_ascii_whitespace` omits VT.
fn is_space(b: u8) -> bool {
    matches!(b, b' ' | b'\t' | b'\n' | b'\x0b' | b'\x0c' | b'\r')
}

impl<'a> Scanner<'a> {
    pub fn new(input: &'a str) -> Self {
        Self { input, pos: 0 }
    }

    /// The next whitespace-delimited token, or `None` at end of input.
    pub fn next_token(&mut self) -> Result<Option<&'a str>> {
        let bytes = self.input.as_bytes();
        while self.pos < bytes.len() && is_space(bytes[self.pos]) {
            self.pos += 1;
        }
        let start = self.pos;
        while self.pos < bytes.len() {
            let b = bytes[self.pos];
            if is_space(b) {
                break;
            }
            if !(0x21..=0x7e).contains(&b) {
                return Err(CompileError::UnprintableByte { byte: b });
            }
            self.pos += 1;
        }
        if self.pos == start {
            return Ok(None);
        }
        let length = self.pos - start;
        if length > MAX_WORD_LEN {
            return Err(CompileError::TokenTooLong { length });
        }
        // Tokens are printable ASCII by construction, so the slice
        // boundaries are valid.
        Ok(Some(&self.input[start..self.pos]))
    }

    /// Discard input through the next newline (`\` comment).
    pub fn skip_line_comment(&mut self) -> Result<()> {
        self.skip_through(b'\n')
    }

    /// Discard input through the next `)` (`(` comment).
    pub fn skip_paren_comment(&mut self) -> Result<()> {
        self.skip_through(b')')
    }

    fn skip_through(&mut self, terminator: u8) -> Result<()> {
        match self.input.as_bytes()[self.pos..]
            .iter()
            .position(|&b| b == terminator)
        {
            Some(i) => {
                self.pos += i + 1;
                Ok(())
            }
            None => Err(CompileError::UnterminatedComment),
        }
    }
}

/// Locale-independent full-token numeric scan: standard decimal and
/// exponent forms (plus `inf`/`nan`), the entire token must be
/// consumed. Out-of-range literals behave like unknown words, as with
/// `strtod` setting `ERANGE`: a nonzero significand that overflows to
/// infinity, or underflows to zero or a subnormal, is rejected.
pub fn parse_number(token: &str) -> Option<f64> {
    let (_, value) = all_consuming(double::<_, nom::error::Error<&str>>)(token).ok()?;
    let significand_nonzero = token
        .split(|c: char| c == 'e' || c == 'E')
        .next()
        .is_some_and(|digits| digits.bytes().any(|b| (b'1'..=b'9').contains(&b)));
    if significand_nonzero && (value.is_infinite() || value == 0.0 || value.is_subnormal()) {
        return None;
    }
    Some(value)
}
