//! LZW dictionary coder.
//!
//! The encoder grows a phrase -> code dictionary over the input and
//! emits one code per longest known phrase; the decoder rebuilds the
//! same dictionary from the code stream alone. How codes travel is
//! delegated to a [`CodeWriter`]/[`CodeReader`] strategy pair from
//! [`codes`].
//!
//! ```
//! use lzac::lzw::codes::{VariableCodeReader, VariableCodeWriter};
//! use lzac::lzw::{LzwDecoder, LzwEncoder};
//!
//! # fn main() -> Result<(), lzac::CodecError> {
//! let mut encoder = LzwEncoder::new(VariableCodeWriter::new(Vec::new()));
//! for &byte in b"abracadabra" {
//!     encoder.encode(byte)?;
//! }
//! encoder.done()?;
//! let compressed = encoder.into_writer().into_inner();
//!
//! let mut output = Vec::new();
//! let reader = VariableCodeReader::new(std::io::Cursor::new(compressed));
//! LzwDecoder::new(reader).decode(&mut output)?;
//! assert_eq!(output, b"abracadabra");
//! # Ok(())
//! # }
//! ```

pub mod codes;

use std::collections::HashMap;
use std::io::Write;

use crate::errors::CodecError;
use codes::{CodeReader, CodeWriter};

/// Encoder for the LZW algorithm, parameterized by how codes are
/// written out.
pub struct LzwEncoder<Cw: CodeWriter> {
    writer: Cw,
    dictionary: HashMap<Vec<u8>, u32>,
    // longest matched phrase and its code
    current: Vec<u8>,
    current_code: Option<u32>,
}

impl<Cw: CodeWriter> LzwEncoder<Cw> {
    pub fn new(writer: Cw) -> Self {
        let mut encoder = Self {
            writer,
            dictionary: HashMap::new(),
            current: Vec::new(),
            current_code: None,
        };
        encoder.init_dictionary();
        encoder
    }

    fn init_dictionary(&mut self) {
        self.dictionary.clear();
        for byte in 0..=u8::max_value() {
            let code = self.writer.generator().next();
            self.dictionary.insert(vec![byte], code);
        }
    }

    /// Consumes one input byte, extending the current phrase or
    /// emitting its code.
    pub fn encode(&mut self, byte: u8) -> Result<(), CodecError> {
        self.current.push(byte);
        if let Some(&code) = self.dictionary.get(&self.current) {
            self.current_code = Some(code);
            return Ok(());
        }

        let extended = std::mem::replace(&mut self.current, vec![byte]);
        if let Some(code) = self.current_code.take() {
            self.writer.write_code(code)?;
        }
        self.current_code = self.dictionary.get(&self.current).copied();

        if self.writer.generator().have_next() {
            let fresh = self.writer.generator().next();
            self.dictionary.insert(extended, fresh);
        }
        Ok(())
    }

    /// Drops every learned phrase and tells the reading side to do the
    /// same. The pending phrase is emitted first.
    pub fn erase_dictionary(&mut self) -> Result<(), CodecError> {
        self.emit_pending()?;
        self.writer.generator().reset();
        self.init_dictionary();
        self.writer.write_dict_reset()
    }

    /// Emits the pending phrase and finalizes the code stream. Must be
    /// called exactly once, after the last input byte.
    pub fn done(&mut self) -> Result<(), CodecError> {
        self.emit_pending()?;
        self.writer.flush()
    }

    fn emit_pending(&mut self) -> Result<(), CodecError> {
        if let Some(code) = self.current_code.take() {
            self.writer.write_code(code)?;
        }
        self.current.clear();
        Ok(())
    }

    pub fn into_writer(self) -> Cw {
        self.writer
    }
}

/// Decoder for the LZW algorithm, parameterized by how codes are read.
pub struct LzwDecoder<Cr: CodeReader> {
    reader: Cr,
    dictionary: HashMap<u32, Vec<u8>>,
}

impl<Cr: CodeReader> LzwDecoder<Cr> {
    pub fn new(reader: Cr) -> Self {
        let mut decoder = Self {
            reader,
            dictionary: HashMap::new(),
        };
        decoder.init_dictionary();
        decoder
    }

    fn init_dictionary(&mut self) {
        self.dictionary.clear();
        for byte in 0..=u8::max_value() {
            let code = self.reader.generator().next();
            self.dictionary.insert(code, vec![byte]);
        }
    }

    /// Replays the whole code stream into `dest`.
    pub fn decode<W: Write>(&mut self, dest: &mut W) -> Result<(), CodecError> {
        // previous code and the first byte of its phrase; cleared again
        // whenever the dictionary is reset
        let mut previous: Option<u32> = None;
        let mut first_byte = 0u8;

        while let Some(code) = self.reader.read_next_code()? {
            if code == self.reader.dict_reset_code() {
                self.reader.generator().reset();
                self.init_dictionary();
                previous = None;
                continue;
            }

            let previous_code = match previous {
                Some(previous_code) => previous_code,
                None => {
                    let phrase = self
                        .dictionary
                        .get(&code)
                        .ok_or(CodecError::UnknownCode(code))?;
                    if phrase.len() != 1 {
                        return Err(CodecError::BadFirstCode(code));
                    }
                    dest.write_all(phrase)?;
                    first_byte = phrase[0];
                    previous = Some(code);
                    continue;
                }
            };

            let phrase = match self.dictionary.get(&code) {
                Some(phrase) => phrase.clone(),
                None => {
                    // the encoder used this code in the same step it was
                    // allocated: previous phrase plus its own first byte
                    let mut phrase = self
                        .dictionary
                        .get(&previous_code)
                        .ok_or(CodecError::UnknownCode(previous_code))?
                        .clone();
                    phrase.push(first_byte);
                    phrase
                }
            };
            dest.write_all(&phrase)?;

            if self.reader.generator().have_next() {
                let fresh = self.reader.generator().next();
                let mut entry = self
                    .dictionary
                    .get(&previous_code)
                    .ok_or(CodecError::UnknownCode(previous_code))?
                    .clone();
                entry.push(phrase[0]);
                self.dictionary.insert(fresh, entry);
            }

            first_byte = phrase[0];
            previous = Some(code);
        }
        Ok(())
    }
}
