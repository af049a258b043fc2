//! [`EncodedMessage`] → beat timeline.
//!
//! Every beat lasts exactly one dot unit. Durations follow the standard
//! 1/3/7 ratio:
//!
//! ```text
//! dot           ■
//! dash          ■■■
//! element gap   □            (after every symbol)
//! letter gap    □ + □□       (3 units total)
//! word gap      □□□ + □□□□   (7 units total, also after the last word)
//! ```

use crate::morse::encoder::EncodedMessage;
use std::time::Duration;

/// Silence beats after every symbol.
pub const ELEMENT_GAP_UNITS: usize = 1;

/// Extra silence after a letter, on top of the element gap.
pub const LETTER_GAP_EXTRA_UNITS: usize = 2;

/// Extra silence after a word, on top of the letter gap.
pub const WORD_GAP_EXTRA_UNITS: usize = 4;

/// One dot-unit time slice.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Beat {
    Tone,
    Silence,
}

/// Ordered beats for one message.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Timeline {
    beats: Vec<Beat>,
}

impl Timeline {
    pub fn beats(&self) -> &[Beat] {
        &self.beats
    }

    /// Total duration in dot units.
    pub fn len(&self) -> usize {
        self.beats.len()
    }

    pub fn is_empty(&self) -> bool {
        self.beats.is_empty()
    }

    pub fn tone_units(&self) -> usize {
        self.beats.iter().filter(|b| **b == Beat::Tone).count()
    }

    /// Wall-clock length for a given dot duration.
    pub fn duration(&self, dot: Duration) -> Duration {
        dot.saturating_mul(u32::try_from(self.beats.len()).unwrap_or(u32::MAX))
    }

    /// Consecutive runs of identical beats as `(beat, length)`.
    pub fn runs(&self) -> Runs<'_> {
        Runs {
            beats: &self.beats,
            position: 0,
        }
    }

    fn push(&mut self, beat: Beat, count: usize) {
        self.beats.extend(std::iter::repeat_n(beat, count));
    }
}

/// Iterator over beat runs, see [`Timeline::runs`].
pub struct Runs<'a> {
    beats: &'a [Beat],
    position: usize,
}

impl Iterator for Runs<'_> {
    type Item = (Beat, usize);

    fn next(&mut self) -> Option<Self::Item> {
        let rest = &self.beats[self.position..];
        let first = *rest.first()?;
        let len = rest.iter().take_while(|b| **b == first).count();
        self.position += len;
        Some((first, len))
    }
}

/// Expand an encoded message into its beat timeline.
pub fn expand(message: &EncodedMessage) -> Timeline {
    let mut timeline = Timeline::default();
    for word in message.words() {
        for pattern in word {
            for symbol in pattern.symbols() {
                timeline.push(Beat::Tone, symbol.units());
                timeline.push(Beat::Silence, ELEMENT_GAP_UNITS);
            }
            timeline.push(Beat::Silence, LETTER_GAP_EXTRA_UNITS);
        }
        timeline.push(Beat::Silence, WORD_GAP_EXTRA_UNITS);
    }
    timeline
}
