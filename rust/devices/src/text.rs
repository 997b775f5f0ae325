//! Token helpers for the operation text form.

use std::str::SplitWhitespace;

use crate::alphabet::{Alphabet, Symbol};
use crate::device::DeviceKind;
use crate::error::DeviceError;

pub(crate) struct Tokens<'a> {
    kind: DeviceKind,
    text: &'a str,
    words: SplitWhitespace<'a>,
}

impl<'a> Tokens<'a> {
    pub(crate) fn new(kind: DeviceKind, text: &'a str) -> Self {
        Self {
            kind,
            text,
            words: text.split_whitespace(),
        }
    }

    pub(crate) fn error(&self, reason: impl Into<String>) -> DeviceError {
        DeviceError::Syntax {
            kind: self.kind,
            text: self.text.to_string(),
            reason: reason.into(),
        }
    }

    pub(crate) fn next_word(&mut self) -> Option<&'a str> {
        self.words.next()
    }

    pub(crate) fn expect(&mut self, what: &str) -> Result<&'a str, DeviceError> {
        self.words
            .next()
            .ok_or_else(|| self.error(format!("expected {what}")))
    }

    pub(crate) fn keyword(&mut self, word: &str) -> Result<(), DeviceError> {
        match self.words.next() {
            Some(found) if found == word => Ok(()),
            Some(found) => Err(self.error(format!("expected `{word}`, found `{found}`"))),
            None => Err(self.error(format!("expected `{word}`"))),
        }
    }

    pub(crate) fn symbol(&mut self, alphabet: &Alphabet) -> Result<Symbol, DeviceError> {
        let word = self.expect("a symbol")?;
        let mut chars = word.chars();
        match (chars.next(), chars.next()) {
            (Some(ch), None) => alphabet.encode(ch),
            _ => Err(self.error(format!("`{word}` is not a single symbol"))),
        }
    }

    pub(crate) fn number<T: std::str::FromStr>(&mut self, what: &str) -> Result<T, DeviceError> {
        let word = self.expect(what)?;
        word.parse()
            .map_err(|_| self.error(format!("`{word}` is not {what}")))
    }

    pub(crate) fn register(&mut self) -> Result<usize, DeviceError> {
        let word = self.expect("a register")?;
        word.strip_prefix('r')
            .and_then(|digits| digits.parse().ok())
            .ok_or_else(|| self.error(format!("`{word}` is not a register")))
    }

    pub(crate) fn finish(mut self) -> Result<(), DeviceError> {
        match self.words.next() {
            None => Ok(()),
            Some(extra) => Err(self.error(format!("unexpected `{extra}`"))),
        }
    }
}
