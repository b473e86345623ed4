//! Code generation and the three code I/O strategies.
//!
//! A [`CodeWriter`]/[`CodeReader`] pair owns the dictionary code space:
//! it hands fresh codes to the LZW layer through its [`CodeGenerator`]
//! and moves coded values across the stream. The three strategies are
//! symmetric pairs; a stream written by one is only readable by its
//! counterpart.

use std::io::{BufRead, Read, Write};

use crate::bitstream::{BitReader, BitWriter};
use crate::decoders::ArithmeticDecoder;
use crate::encoders::ArithmeticEncoder;
use crate::errors::CodecError;
use crate::models::AdaptiveDataModel;

/// Code announcing that the width of all following codes grew by one
/// (variable strategy) or that the code stream has ended (arithmetic
/// strategy).
pub const CODE_MARK: u32 = 0;
/// Code announcing that the dictionary was rebuilt from scratch.
pub const CODE_DICT_RESET: u32 = 1;

/// First code the variable and arithmetic strategies may hand out; the
/// two below are reserved.
pub const VARIABLE_FIRST_CODE: u32 = 2;
pub const VARIABLE_MAX_CODE: u32 = (1 << 16) - 1;

/// The simple strategy only reserves its reset code.
pub const SIMPLE_RESET_CODE: u32 = 0;
pub const SIMPLE_FIRST_CODE: u32 = 1;
pub const SIMPLE_MAX_CODE: u32 = (1 << 30) - 1;

const INIT_CODE_WIDTH: u32 = 9;
const MAX_CODE_WIDTH: u32 = 16;

/// Hands out dictionary codes `first, first + 1, ..` up to (excluding)
/// `max`.
pub struct CodeGenerator {
    next: u32,
    first: u32,
    max: u32,
}

impl CodeGenerator {
    pub fn new(first: u32, max: u32) -> Self {
        Self {
            next: first,
            first,
            max,
        }
    }

    pub fn have_next(&self) -> bool {
        self.next < self.max
    }

    pub fn next(&mut self) -> u32 {
        debug_assert!(self.have_next());
        let code = self.next;
        self.next += 1;
        code
    }

    /// Rewinds to the first code, forgetting everything handed out.
    pub fn reset(&mut self) {
        self.next = self.first;
    }
}

/// Sink for LZW codes.
pub trait CodeWriter {
    fn generator(&mut self) -> &mut CodeGenerator;

    fn write_code(&mut self, code: u32) -> Result<(), CodecError>;

    /// Signals a dictionary rebuild to the reading side.
    fn write_dict_reset(&mut self) -> Result<(), CodecError>;

    /// Terminates the code stream. Must be called exactly once, after
    /// the last code.
    fn flush(&mut self) -> Result<(), CodecError>;
}

/// Source of LZW codes.
pub trait CodeReader {
    fn generator(&mut self) -> &mut CodeGenerator;

    /// The code value that signals a dictionary rebuild.
    fn dict_reset_code(&self) -> u32;

    /// Next code, or `None` at the clean end of the stream.
    fn read_next_code(&mut self) -> Result<Option<u32>, CodecError>;
}

/// Simple LZW code writer.
/// Writes codes as decimal text, one per line.
pub struct SimpleCodeWriter<W: Write> {
    dest: W,
    generator: CodeGenerator,
}

impl<W: Write> SimpleCodeWriter<W> {
    pub fn new(dest: W) -> Self {
        Self {
            dest,
            generator: CodeGenerator::new(SIMPLE_FIRST_CODE, SIMPLE_MAX_CODE),
        }
    }

    pub fn into_inner(self) -> W {
        self.dest
    }
}

impl<W: Write> CodeWriter for SimpleCodeWriter<W> {
    fn generator(&mut self) -> &mut CodeGenerator {
        &mut self.generator
    }

    fn write_code(&mut self, code: u32) -> Result<(), CodecError> {
        writeln!(self.dest, "{}", code)?;
        Ok(())
    }

    fn write_dict_reset(&mut self) -> Result<(), CodecError> {
        writeln!(self.dest, "{}", SIMPLE_RESET_CODE)?;
        Ok(())
    }

    fn flush(&mut self) -> Result<(), CodecError> {
        self.dest.flush()?;
        Ok(())
    }
}

/// Reader counterpart of [`SimpleCodeWriter`].
pub struct SimpleCodeReader<R: BufRead> {
    src: R,
    generator: CodeGenerator,
    line: String,
}

impl<R: BufRead> SimpleCodeReader<R> {
    pub fn new(src: R) -> Self {
        Self {
            src,
            generator: CodeGenerator::new(SIMPLE_FIRST_CODE, SIMPLE_MAX_CODE),
            line: String::new(),
        }
    }
}

impl<R: BufRead> CodeReader for SimpleCodeReader<R> {
    fn generator(&mut self) -> &mut CodeGenerator {
        &mut self.generator
    }

    fn dict_reset_code(&self) -> u32 {
        SIMPLE_RESET_CODE
    }

    fn read_next_code(&mut self) -> Result<Option<u32>, CodecError> {
        loop {
            self.line.clear();
            if self.src.read_line(&mut self.line)? == 0 {
                return Ok(None);
            }
            let token = self.line.trim();
            if token.is_empty() {
                continue;
            }
            // anything that fails to parse ends the stream cleanly
            return Ok(token.parse::<u32>().ok());
        }
    }
}

/// LZW codes writer.
/// Variable code length starting from 9 bits; before the first code
/// that needs an extra bit, [`CODE_MARK`] is sent at the old width.
pub struct VariableCodeWriter<W: Write> {
    writer: BitWriter<W>,
    cur_width: u32,
    generator: CodeGenerator,
}

impl<W: Write> VariableCodeWriter<W> {
    pub fn new(dest: W) -> Self {
        Self {
            writer: BitWriter::new(dest),
            cur_width: INIT_CODE_WIDTH,
            generator: CodeGenerator::new(VARIABLE_FIRST_CODE, VARIABLE_MAX_CODE),
        }
    }

    pub fn into_inner(self) -> W {
        self.writer.into_inner()
    }

    fn code_bit_width(code: u32) -> u32 {
        (32 - code.leading_zeros()).max(1)
    }
}

impl<W: Write> CodeWriter for VariableCodeWriter<W> {
    fn generator(&mut self) -> &mut CodeGenerator {
        &mut self.generator
    }

    fn write_code(&mut self, code: u32) -> Result<(), CodecError> {
        let width = Self::code_bit_width(code);
        if width > self.cur_width {
            if width != self.cur_width + 1 || width > MAX_CODE_WIDTH {
                return Err(CodecError::CodeWidth {
                    code,
                    width: self.cur_width,
                });
            }
            self.writer.write_bits(CODE_MARK, self.cur_width)?;
            self.cur_width = width;
        }
        self.writer.write_bits(code, self.cur_width)
    }

    fn write_dict_reset(&mut self) -> Result<(), CodecError> {
        self.writer.write_bits(CODE_DICT_RESET, self.cur_width)?;
        self.cur_width = INIT_CODE_WIDTH;
        Ok(())
    }

    fn flush(&mut self) -> Result<(), CodecError> {
        self.writer.flush()
    }
}

/// Reader counterpart of [`VariableCodeWriter`].
pub struct VariableCodeReader<R: Read> {
    reader: BitReader<R>,
    cur_width: u32,
    generator: CodeGenerator,
}

impl<R: Read> VariableCodeReader<R> {
    pub fn new(src: R) -> Self {
        Self {
            reader: BitReader::new(src),
            cur_width: INIT_CODE_WIDTH,
            generator: CodeGenerator::new(VARIABLE_FIRST_CODE, VARIABLE_MAX_CODE),
        }
    }
}

impl<R: Read> CodeReader for VariableCodeReader<R> {
    fn generator(&mut self) -> &mut CodeGenerator {
        &mut self.generator
    }

    fn dict_reset_code(&self) -> u32 {
        CODE_DICT_RESET
    }

    fn read_next_code(&mut self) -> Result<Option<u32>, CodecError> {
        loop {
            let code = match self.reader.read_bits(self.cur_width) {
                Ok(code) => code,
                // out of bits at a code boundary: clean end
                Err(CodecError::Underflow) => return Ok(None),
                Err(e) => return Err(e),
            };
            if code == CODE_MARK {
                if self.cur_width >= MAX_CODE_WIDTH {
                    // flush padding can only look like a mark
                    return Ok(None);
                }
                self.cur_width += 1;
                continue;
            }
            if code == CODE_DICT_RESET {
                self.cur_width = INIT_CODE_WIDTH;
            }
            return Ok(Some(code));
        }
    }
}

/// Writer that entropy-codes the LZW codes: each code is encoded as a
/// symbol against an adaptive model over the whole code space.
pub struct ArithmeticCodeWriter<W: Write> {
    encoder: ArithmeticEncoder<W>,
    model: AdaptiveDataModel,
    generator: CodeGenerator,
}

impl<W: Write> ArithmeticCodeWriter<W> {
    pub fn new(dest: W) -> Self {
        Self {
            encoder: ArithmeticEncoder::new(dest),
            model: AdaptiveDataModel::new(VARIABLE_MAX_CODE),
            generator: CodeGenerator::new(VARIABLE_FIRST_CODE, VARIABLE_MAX_CODE),
        }
    }

    pub fn into_inner(self) -> W {
        self.encoder.into_inner()
    }
}

impl<W: Write> CodeWriter for ArithmeticCodeWriter<W> {
    fn generator(&mut self) -> &mut CodeGenerator {
        &mut self.generator
    }

    fn write_code(&mut self, code: u32) -> Result<(), CodecError> {
        self.encoder.encode(code, &mut self.model)
    }

    fn write_dict_reset(&mut self) -> Result<(), CodecError> {
        self.encoder.encode(CODE_DICT_RESET, &mut self.model)?;
        self.model.reset();
        Ok(())
    }

    fn flush(&mut self) -> Result<(), CodecError> {
        // the mark is unused as a width signal here; it terminates the
        // code stream instead
        self.encoder.encode(CODE_MARK, &mut self.model)?;
        self.encoder.done()
    }
}

/// Reader counterpart of [`ArithmeticCodeWriter`].
pub struct ArithmeticCodeReader<R: Read> {
    decoder: ArithmeticDecoder<R>,
    model: AdaptiveDataModel,
    generator: CodeGenerator,
    started: bool,
}

impl<R: Read> ArithmeticCodeReader<R> {
    pub fn new(src: R) -> Self {
        Self {
            decoder: ArithmeticDecoder::new(src),
            model: AdaptiveDataModel::new(VARIABLE_MAX_CODE),
            generator: CodeGenerator::new(VARIABLE_FIRST_CODE, VARIABLE_MAX_CODE),
            started: false,
        }
    }
}

impl<R: Read> CodeReader for ArithmeticCodeReader<R> {
    fn generator(&mut self) -> &mut CodeGenerator {
        &mut self.generator
    }

    fn dict_reset_code(&self) -> u32 {
        CODE_DICT_RESET
    }

    fn read_next_code(&mut self) -> Result<Option<u32>, CodecError> {
        if !self.started {
            self.decoder.read_init_bits()?;
            self.started = true;
        }
        match self.decoder.decode(&mut self.model) {
            Ok(CODE_MARK) => Ok(None),
            Ok(code) => {
                if code == CODE_DICT_RESET {
                    self.model.reset();
                }
                Ok(Some(code))
            }
            Err(CodecError::Underflow) => Ok(None),
            Err(e) => Err(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_generator_sequence_and_reset() {
        let mut generator = CodeGenerator::new(2, 5);
        assert!(generator.have_next());
        assert_eq!(generator.next(), 2);
        assert_eq!(generator.next(), 3);
        assert_eq!(generator.next(), 4);
        assert!(!generator.have_next());
        generator.reset();
        assert_eq!(generator.next(), 2);
    }

    #[test]
    fn test_simple_writer_one_code_per_line() {
        let mut writer = SimpleCodeWriter::new(Vec::new());
        writer.write_code(85).unwrap();
        writer.write_code(257).unwrap();
        writer.write_dict_reset().unwrap();
        writer.flush().unwrap();
        assert_eq!(writer.into_inner(), b"85\n257\n0\n");
    }

    #[test]
    fn test_simple_reader_stops_on_garbage() {
        let mut reader = SimpleCodeReader::new(Cursor::new(&b"12\n\n34\nnot-a-code\n56\n"[..]));
        assert_eq!(reader.read_next_code().unwrap(), Some(12));
        assert_eq!(reader.read_next_code().unwrap(), Some(34));
        assert_eq!(reader.read_next_code().unwrap(), None);
    }

    #[test]
    fn test_variable_codes_round_trip_across_width_growth() {
        // each code needs at most one more bit than its predecessor, so
        // the writer grows from 9 up to the full 16 bits mark by mark
        let codes = [
            2, 17, 511, 512, 700, 1023, 1024, 2000, 4000, 8000, 16_000, 32_000, 60_000, 65_534,
        ];
        let mut writer = VariableCodeWriter::new(Vec::new());
        for &code in &codes {
            writer.write_code(code).unwrap();
        }
        assert_eq!(writer.cur_width, MAX_CODE_WIDTH);
        writer.flush().unwrap();

        let mut reader = VariableCodeReader::new(Cursor::new(writer.into_inner()));
        let mut read_back = Vec::new();
        while let Some(code) = reader.read_next_code().unwrap() {
            read_back.push(code);
        }
        assert_eq!(read_back, codes);
    }

    #[test]
    fn test_variable_writer_grows_width_by_single_mark() {
        let mut writer = VariableCodeWriter::new(Vec::new());
        writer.write_code(511).unwrap();
        writer.write_code(512).unwrap();
        writer.flush().unwrap();
        // 511 at 9 bits, a 9-bit mark, then 512 at 10 bits
        let mut reader = BitReader::new(Cursor::new(writer.into_inner()));
        assert_eq!(reader.read_bits(9).unwrap(), 511);
        assert_eq!(reader.read_bits(9).unwrap(), CODE_MARK);
        assert_eq!(reader.read_bits(10).unwrap(), 512);
    }

    #[test]
    fn test_variable_writer_rejects_two_bit_jump() {
        let mut writer = VariableCodeWriter::new(Vec::new());
        assert!(matches!(
            writer.write_code(1024),
            Err(CodecError::CodeWidth { code: 1024, width: 9 })
        ));
    }

    #[test]
    fn test_variable_reset_returns_width_to_nine() {
        let mut writer = VariableCodeWriter::new(Vec::new());
        writer.write_code(511).unwrap();
        writer.write_code(512).unwrap();
        writer.write_dict_reset().unwrap();
        writer.write_code(300).unwrap();
        writer.flush().unwrap();

        let mut reader = VariableCodeReader::new(Cursor::new(writer.into_inner()));
        assert_eq!(reader.read_next_code().unwrap(), Some(511));
        assert_eq!(reader.read_next_code().unwrap(), Some(512));
        assert_eq!(reader.cur_width, 10);
        assert_eq!(reader.read_next_code().unwrap(), Some(CODE_DICT_RESET));
        assert_eq!(reader.cur_width, INIT_CODE_WIDTH);
        assert_eq!(reader.read_next_code().unwrap(), Some(300));
        assert_eq!(reader.read_next_code().unwrap(), None);
    }

    #[test]
    fn test_arithmetic_codes_round_trip() {
        let codes = [2, 300, 70, 65_000, 2, 2, 40_000];
        let mut writer = ArithmeticCodeWriter::new(Vec::new());
        for &code in &codes {
            writer.write_code(code).unwrap();
        }
        writer.flush().unwrap();

        let mut reader = ArithmeticCodeReader::new(Cursor::new(writer.into_inner()));
        for &code in &codes {
            assert_eq!(reader.read_next_code().unwrap(), Some(code));
        }
        assert_eq!(reader.read_next_code().unwrap(), None);
    }

    #[test]
    fn test_arithmetic_reset_keeps_models_in_step() {
        let mut writer = ArithmeticCodeWriter::new(Vec::new());
        writer.write_code(513).unwrap();
        writer.write_dict_reset().unwrap();
        writer.write_code(513).unwrap();
        writer.flush().unwrap();

        let mut reader = ArithmeticCodeReader::new(Cursor::new(writer.into_inner()));
        assert_eq!(reader.read_next_code().unwrap(), Some(513));
        assert_eq!(reader.read_next_code().unwrap(), Some(CODE_DICT_RESET));
        assert_eq!(reader.read_next_code().unwrap(), Some(513));
        assert_eq!(reader.read_next_code().unwrap(), None);
    }
}
