//! Text → [`EncodedMessage`].

use crate::morse::table::{self, SymbolPattern};
use std::fmt;

/// One element of an encoded message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mark {
    Letter(SymbolPattern),
    WordBreak,
}

/// Letters and word breaks for one piece of text.
///
/// Word breaks only ever sit between two letters; [`encode`] never emits a
/// leading, trailing or repeated break, so equal text yields equal values.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EncodedMessage {
    marks: Vec<Mark>,
}

impl EncodedMessage {
    pub fn marks(&self) -> &[Mark] {
        &self.marks
    }

    pub fn is_empty(&self) -> bool {
        self.marks.is_empty()
    }

    /// Letters grouped into words.
    pub fn words(&self) -> impl Iterator<Item = Vec<SymbolPattern>> + '_ {
        self.marks
            .split(|m| *m == Mark::WordBreak)
            .filter(|word| !word.is_empty())
            .map(|word| {
                word.iter()
                    .filter_map(|m| match m {
                        Mark::Letter(p) => Some(*p),
                        Mark::WordBreak => None,
                    })
                    .collect()
            })
    }

    pub fn letter_count(&self) -> usize {
        self.marks
            .iter()
            .filter(|m| matches!(m, Mark::Letter(_)))
            .count()
    }
}

/// Letters separated by spaces, words by ` / `.
impl fmt::Display for EncodedMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for mark in &self.marks {
            match mark {
                Mark::Letter(p) => {
                    if !first {
                        f.write_str(" ")?;
                    }
                    write!(f, "{}", p)?;
                    first = false;
                }
                Mark::WordBreak => {
                    f.write_str(" /")?;
                }
            }
        }
        Ok(())
    }
}

/// Encode text, dropping every character outside the table.
pub fn encode(text: &str) -> EncodedMessage {
    let mut marks = Vec::new();
    // A break is only written once another letter follows it
    let mut pending_break = false;
    for c in text.to_uppercase().chars() {
        if c == ' ' {
            pending_break = !marks.is_empty();
        } else if let Some(pattern) = table::lookup(c) {
            if pending_break {
                marks.push(Mark::WordBreak);
                pending_break = false;
            }
            marks.push(Mark::Letter(pattern));
        }
    }
    EncodedMessage { marks }
}
