//! Morse encoding: text → letters → beat timeline.

pub mod encoder;
pub mod table;
pub mod timeline;

pub use encoder::{EncodedMessage, Mark, encode};
pub use table::{Symbol, SymbolPattern, lookup};
pub use timeline::{Beat, Timeline, expand};
