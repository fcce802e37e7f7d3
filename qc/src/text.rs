//! Composite text generators built from the corpora and the primitive
//! generators.
//!
//! Text comes in three shapes depending on the length arguments:
//!
//! * an exact `length`: random content of that length,
//! * a `maxlen`: an authored passage, word salad or a bounded byte string,
//!   whichever is strictly shorter than `maxlen`,
//! * neither: word salad or an authored passage.

use rand::{Rng, RngCore};

use crate::corpus::{PASSAGES, WORDS};
use crate::error::GenerationError;
use crate::generator::Generator;
use crate::primitives::{ByteStringGenerator, FromList, IntGenerator, random_bytes};

/// Most words in one word-salad string
pub const MAX_SALAD_WORDS: usize = 8;

/// How lengths are measured
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LengthUnit {
    Bytes,
    Chars,
}

impl LengthUnit {
    pub fn measure(self, text: &str) -> usize {
        match self {
            LengthUnit::Bytes => text.len(),
            LengthUnit::Chars => text.chars().count(),
        }
    }
}

/// Between one and [`MAX_SALAD_WORDS`] corpus words joined by single spaces
#[derive(Debug, Clone)]
pub struct WordSalad {
    count: IntGenerator<usize>,
    words: FromList<&'static str>,
}

impl WordSalad {
    pub fn new(rng: &mut dyn RngCore) -> Result<Self, GenerationError> {
        Ok(Self {
            count: IntGenerator::with_kind("text", 1, MAX_SALAD_WORDS + 1, rng)?,
            words: FromList::new(WORDS.to_vec())?,
        })
    }
}

impl Generator<String> for WordSalad {
    fn generate(&mut self, rng: &mut dyn RngCore) -> String {
        let n = self.count.generate(rng);
        let words: Vec<&str> = (0..n).map(|_| self.words.generate(rng)).collect();
        words.join(" ")
    }
}

#[derive(Debug, Clone)]
enum Shape {
    Fixed {
        length: usize,
    },
    Bounded {
        max_len: usize,
        /// Passages shorter than `max_len`; `None` when none fit
        passages: Option<FromList<&'static str>>,
        salad: WordSalad,
        bytes: ByteStringGenerator,
    },
    Free {
        salad: WordSalad,
        passages: FromList<&'static str>,
    },
}

/// The composite generator behind both text entry points; yields bytes
#[derive(Debug, Clone)]
pub struct ComposedText {
    shape: Shape,
    unit: LengthUnit,
}

impl ComposedText {
    /// `length` takes precedence over `max_len` when both are given
    pub fn new(
        length: Option<usize>,
        max_len: Option<usize>,
        unit: LengthUnit,
        rng: &mut dyn RngCore,
    ) -> Result<Self, GenerationError> {
        let shape = match (length, max_len) {
            (Some(length), _) => Shape::Fixed { length },
            (None, Some(max_len)) => {
                let fitting: Vec<&'static str> = PASSAGES
                    .iter()
                    .copied()
                    .filter(|passage| unit.measure(passage) < max_len)
                    .collect();
                Shape::Bounded {
                    max_len,
                    passages: FromList::new(fitting).ok(),
                    salad: WordSalad::new(rng)?,
                    bytes: ByteStringGenerator::new(Some(max_len), rng)?,
                }
            }
            (None, None) => Shape::Free {
                salad: WordSalad::new(rng)?,
                passages: FromList::new(PASSAGES.to_vec())?,
            },
        };
        Ok(Self { shape, unit })
    }

    pub fn unit(&self) -> LengthUnit {
        self.unit
    }
}

impl Generator<Vec<u8>> for ComposedText {
    fn generate(&mut self, rng: &mut dyn RngCore) -> Vec<u8> {
        let unit = self.unit;
        match &mut self.shape {
            Shape::Fixed { length } => match unit {
                LengthUnit::Bytes => random_bytes(rng, *length),
                LengthUnit::Chars => {
                    let text: String = (0..*length).map(|_| rng.r#gen::<char>()).collect();
                    text.into_bytes()
                }
            },
            Shape::Bounded {
                max_len,
                passages,
                salad,
                bytes,
            } => {
                let picked = match rng.gen_range(0..3) {
                    0 => passages.as_mut().map(|p| p.generate(rng).to_string()),
                    1 => Some(salad.generate(rng)).filter(|s| unit.measure(s) < *max_len),
                    _ => None,
                };
                match picked {
                    Some(text) => text.into_bytes(),
                    None => bytes.generate(rng),
                }
            }
            Shape::Free { salad, passages } => {
                if rng.gen_bool(0.5) {
                    salad.generate(rng).into_bytes()
                } else {
                    passages.generate(rng).as_bytes().to_vec()
                }
            }
        }
    }
}

/// Composite text as raw UTF-8 bytes; lengths count bytes
#[derive(Debug, Clone)]
pub struct ByteTextGenerator {
    inner: ComposedText,
}

impl ByteTextGenerator {
    pub fn new(
        length: Option<usize>,
        max_len: Option<usize>,
        rng: &mut dyn RngCore,
    ) -> Result<Self, GenerationError> {
        Ok(Self {
            inner: ComposedText::new(length, max_len, LengthUnit::Bytes, rng)?,
        })
    }
}

impl Generator<Vec<u8>> for ByteTextGenerator {
    fn generate(&mut self, rng: &mut dyn RngCore) -> Vec<u8> {
        self.inner.generate(rng)
    }
}

/// Composite text decoded to a `String`; lengths count characters
///
/// Random bytes that are not valid UTF-8 decode to U+FFFD.
#[derive(Debug, Clone)]
pub struct TextGenerator {
    inner: ComposedText,
}

impl TextGenerator {
    pub fn new(
        length: Option<usize>,
        max_len: Option<usize>,
        rng: &mut dyn RngCore,
    ) -> Result<Self, GenerationError> {
        Ok(Self {
            inner: ComposedText::new(length, max_len, LengthUnit::Chars, rng)?,
        })
    }
}

impl Generator<String> for TextGenerator {
    fn generate(&mut self, rng: &mut dyn RngCore) -> String {
        String::from_utf8_lossy(&self.inner.generate(rng)).into_owned()
    }
}
