//! Definitions of error related things.

use std::fmt;

/// Errors of this crate
#[derive(Debug)]
#[non_exhaustive]
pub enum CodecError {
    /// The frame did not start with the expected magic bytes
    BadMagic {
        expected: &'static [u8],
        actual: Vec<u8>,
    },
    /// The frame's mode byte is not one the tool knows
    UnknownMode(u8),
    /// The input ended before the expected number of bits could be read
    Underflow,
    /// No symbol of the model covers the decoded target frequency
    InvalidSymbol(u32),
    /// The variable-width writer was asked to grow the code width by
    /// more than one bit at once
    CodeWidth { code: u32, width: u32 },
    /// The first code of an LZW stream must map to a single-byte entry
    BadFirstCode(u32),
    /// The code has no dictionary entry
    UnknownCode(u32),
    /// The frequency total cannot be represented by the interval
    /// arithmetic (it must be in `1..=2^29`)
    FrequencyOverflow(u64),
    /// Wrapper around an io error from the std lib
    IoError(std::io::Error),
}

impl From<std::io::Error> for CodecError {
    fn from(e: std::io::Error) -> Self {
        CodecError::IoError(e)
    }
}

impl fmt::Display for CodecError {
    fn fmt(&self, f: &mut fmt::Formatter) -> Result<(), fmt::Error> {
        match self {
            CodecError::BadMagic { expected, actual } => write!(
                f,
                "Bad magic bytes: expected {:02X?}, found {:02X?}",
                expected, actual
            ),
            CodecError::UnknownMode(mode) => write!(f, "Mode byte {:#04X} is not valid", mode),
            CodecError::Underflow => write!(f, "Input exhausted before the expected bits"),
            CodecError::InvalidSymbol(target) => write!(
                f,
                "Decoded target {} is outside the model's alphabet",
                target
            ),
            CodecError::CodeWidth { code, width } => write!(
                f,
                "Code {} does not fit the current width of {} bits grown by one",
                code, width
            ),
            CodecError::BadFirstCode(code) => write!(
                f,
                "First code {} does not correspond to one byte only",
                code
            ),
            CodecError::UnknownCode(code) => write!(f, "Code {} has no dictionary entry", code),
            CodecError::FrequencyOverflow(total) => write!(
                f,
                "Frequency total {} cannot be coded with 32-bit intervals",
                total
            ),
            CodecError::IoError(e) => write!(f, "IoError: {}", e),
        }
    }
}

impl std::error::Error for CodecError {}
