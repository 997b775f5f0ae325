//! Symbol alphabets.
//!
//! An alphabet bounds the range of symbol codes a device may hold and
//! converts between characters and codes. Symbol `i` is the `i`-th
//! declared character; codes are meaningless outside their alphabet.

use std::collections::HashMap;
use std::fmt;

use crate::error::DeviceError;

/// Symbol code.
pub type Symbol = u32;

/// Ordered, duplicate-free set of characters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Alphabet {
    chars: Vec<char>,
    index: HashMap<char, Symbol>,
}

impl Alphabet {
    /// Build an alphabet from its characters, in symbol order.
    ///
    /// # Errors
    ///
    /// Fails on an empty character list or a repeated character.
    pub fn new(chars: impl IntoIterator<Item = char>) -> Result<Self, DeviceError> {
        let mut alphabet = Self {
            chars: Vec::new(),
            index: HashMap::new(),
        };
        for ch in chars {
            let code = Symbol::try_from(alphabet.chars.len()).expect("alphabet overflow");
            if alphabet.index.insert(ch, code).is_some() {
                return Err(DeviceError::DuplicateSymbol(ch));
            }
            alphabet.chars.push(ch);
        }
        if alphabet.chars.is_empty() {
            return Err(DeviceError::EmptyAlphabet);
        }
        Ok(alphabet)
    }

    /// Exclusive upper bound on symbol codes.
    #[must_use]
    #[allow(clippy::as_conversions)]
    pub fn bound(&self) -> u32 {
        // construction caps the length at u32 codes
        self.chars.len() as u32
    }

    /// Declared characters in symbol order.
    #[must_use]
    pub fn chars(&self) -> &[char] {
        &self.chars
    }

    /// Check that a code lies inside the alphabet.
    ///
    /// # Errors
    ///
    /// Returns `SymbolOutOfRange` for codes at or above the bound.
    pub fn check(&self, symbol: Symbol) -> Result<(), DeviceError> {
        if symbol < self.bound() {
            Ok(())
        } else {
            Err(DeviceError::SymbolOutOfRange {
                symbol,
                bound: self.bound(),
            })
        }
    }

    /// Encode one character.
    ///
    /// # Errors
    ///
    /// Returns `UnknownSymbol` for characters outside the alphabet.
    pub fn encode(&self, ch: char) -> Result<Symbol, DeviceError> {
        self.index
            .get(&ch)
            .copied()
            .ok_or_else(|| DeviceError::UnknownSymbol {
                symbol: ch,
                alphabet: self.to_string(),
            })
    }

    /// Encode a whole string.
    ///
    /// # Errors
    ///
    /// Returns `UnknownSymbol` for the first character outside the alphabet.
    pub fn encode_str(&self, text: &str) -> Result<Vec<Symbol>, DeviceError> {
        text.chars().map(|ch| self.encode(ch)).collect()
    }

    /// Decode one symbol, if it is in range.
    #[must_use]
    #[allow(clippy::as_conversions)]
    pub fn decode(&self, symbol: Symbol) -> Option<char> {
        self.chars.get(symbol as usize).copied()
    }

    /// Render a symbol sequence.
    #[must_use]
    pub fn render(&self, symbols: &[Symbol]) -> String {
        symbols
            .iter()
            .map(|&s| self.decode(s).unwrap_or(char::REPLACEMENT_CHARACTER))
            .collect()
    }
}

impl TryFrom<&str> for Alphabet {
    type Error = DeviceError;

    fn try_from(text: &str) -> Result<Self, Self::Error> {
        Self::new(text.chars())
    }
}

impl fmt::Display for Alphabet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for ch in &self.chars {
            write!(f, "{ch}")?;
        }
        Ok(())
    }
}
