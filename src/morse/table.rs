//! Character → dot/dash lookup.
//!
//! The table is a process-wide constant; patterns are borrowed `'static`
//! slices, so a [`SymbolPattern`] is `Copy` and never allocates.

use std::fmt;

/// One Morse element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Symbol {
    Dot,
    Dash,
}

impl Symbol {
    /// Tone length in dot units.
    pub const fn units(self) -> usize {
        match self {
            Symbol::Dot => 1,
            Symbol::Dash => 3,
        }
    }

    /// Conventional notation character (`.` or `-`).
    pub const fn notation(self) -> char {
        match self {
            Symbol::Dot => '.',
            Symbol::Dash => '-',
        }
    }
}

/// The dot/dash sequence for one character.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SymbolPattern(&'static [Symbol]);

impl SymbolPattern {
    pub fn symbols(&self) -> &'static [Symbol] {
        self.0
    }

    /// Total tone units across all symbols (gaps excluded).
    pub fn tone_units(&self) -> usize {
        self.0.iter().map(|s| s.units()).sum()
    }
}

impl fmt::Display for SymbolPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for symbol in self.0 {
            write!(f, "{}", symbol.notation())?;
        }
        Ok(())
    }
}

use Symbol::{Dash, Dot};

/// International Morse for A–Z and 0–9.
const TABLE: [(char, &[Symbol]); 36] = [
    ('A', &[Dot, Dash]),
    ('B', &[Dash, Dot, Dot, Dot]),
    ('C', &[Dash, Dot, Dash, Dot]),
    ('D', &[Dash, Dot, Dot]),
    ('E', &[Dot]),
    ('F', &[Dot, Dot, Dash, Dot]),
    ('G', &[Dash, Dash, Dot]),
    ('H', &[Dot, Dot, Dot, Dot]),
    ('I', &[Dot, Dot]),
    ('J', &[Dot, Dash, Dash, Dash]),
    ('K', &[Dash, Dot, Dash]),
    ('L', &[Dot, Dash, Dot, Dot]),
    ('M', &[Dash, Dash]),
    ('N', &[Dash, Dot]),
    ('O', &[Dash, Dash, Dash]),
    ('P', &[Dot, Dash, Dash, Dot]),
    ('Q', &[Dash, Dash, Dot, Dash]),
    ('R', &[Dot, Dash, Dot]),
    ('S', &[Dot, Dot, Dot]),
    ('T', &[Dash]),
    ('U', &[Dot, Dot, Dash]),
    ('V', &[Dot, Dot, Dot, Dash]),
    ('W', &[Dot, Dash, Dash]),
    ('X', &[Dash, Dot, Dot, Dash]),
    ('Y', &[Dash, Dot, Dash, Dash]),
    ('Z', &[Dash, Dash, Dot, Dot]),
    ('0', &[Dash, Dash, Dash, Dash, Dash]),
    ('1', &[Dot, Dash, Dash, Dash, Dash]),
    ('2', &[Dot, Dot, Dash, Dash, Dash]),
    ('3', &[Dot, Dot, Dot, Dash, Dash]),
    ('4', &[Dot, Dot, Dot, Dot, Dash]),
    ('5', &[Dot, Dot, Dot, Dot, Dot]),
    ('6', &[Dash, Dot, Dot, Dot, Dot]),
    ('7', &[Dash, Dash, Dot, Dot, Dot]),
    ('8', &[Dash, Dash, Dash, Dot, Dot]),
    ('9', &[Dash, Dash, Dash, Dash, Dot]),
];

/// Look up the pattern for an upper-case letter or digit.
///
/// Lower-case input is not folded here; the encoder upper-cases the whole
/// text first.
pub fn lookup(c: char) -> Option<SymbolPattern> {
    let index = match c {
        'A'..='Z' => c as usize - 'A' as usize,
        '0'..='9' => 26 + (c as usize - '0' as usize),
        _ => return None,
    };
    let (key, symbols) = TABLE[index];
    debug_assert_eq!(key, c);
    Some(SymbolPattern(symbols))
}

/// Iterate over every `(char, pattern)` entry in table order.
pub fn entries() -> impl Iterator<Item = (char, SymbolPattern)> {
    TABLE.iter().map(|&(c, symbols)| (c, SymbolPattern(symbols)))
}
