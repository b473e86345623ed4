//! Framed whole-stream operations of the two tools.
//!
//! A frame is a short magic, a mode byte, and the mode's payload. The
//! static AC mode additionally stores its 257-entry frequency table so
//! the decompressor can rebuild the model.

use std::io::{Read, Write};

use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};
use log::debug;

use crate::decoders::ArithmeticDecoder;
use crate::encoders::ArithmeticEncoder;
use crate::errors::CodecError;
use crate::lzw::codes::{
    ArithmeticCodeReader, ArithmeticCodeWriter, VariableCodeReader, VariableCodeWriter,
};
use crate::lzw::{LzwDecoder, LzwEncoder};
use crate::models::{AdaptiveDataModel, DataModel, StaticDataModel};

pub const AC_MAGIC: &[u8] = b"AC";
pub const LZW_MAGIC: &[u8] = b"LZW";

/// 256 octet values plus the end-of-stream symbol.
const AC_NUM_SYMBOLS: u32 = 257;
const AC_END_OF_STREAM: u32 = AC_NUM_SYMBOLS - 1;

/// Data model flavor of the `ac` tool.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AcMode {
    Adaptive,
    Static,
}

impl AcMode {
    fn to_byte(self) -> u8 {
        match self {
            AcMode::Adaptive => 0x00,
            AcMode::Static => 0x01,
        }
    }

    fn from_byte(byte: u8) -> Result<Self, CodecError> {
        match byte {
            0x00 => Ok(AcMode::Adaptive),
            0x01 => Ok(AcMode::Static),
            other => Err(CodecError::UnknownMode(other)),
        }
    }
}

/// Code strategy of the `lzw` tool.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LzwMode {
    Variable,
    Arithmetic,
}

impl LzwMode {
    fn to_byte(self) -> u8 {
        match self {
            LzwMode::Variable => 0x00,
            LzwMode::Arithmetic => 0x01,
        }
    }

    fn from_byte(byte: u8) -> Result<Self, CodecError> {
        match byte {
            0x00 => Ok(LzwMode::Variable),
            0x01 => Ok(LzwMode::Arithmetic),
            other => Err(CodecError::UnknownMode(other)),
        }
    }
}

/// Compresses `src` to the end as one arithmetic-coded frame.
pub fn compress_ac<R: Read, W: Write>(
    src: &mut R,
    dest: &mut W,
    mode: AcMode,
) -> Result<(), CodecError> {
    let mut data = Vec::new();
    src.read_to_end(&mut data)?;

    dest.write_all(AC_MAGIC)?;
    dest.write_u8(mode.to_byte())?;

    match mode {
        AcMode::Adaptive => {
            let mut model = AdaptiveDataModel::new(AC_NUM_SYMBOLS);
            encode_stream(&data, dest, &mut model)?;
        }
        AcMode::Static => {
            let mut frequencies = vec![0u32; AC_NUM_SYMBOLS as usize];
            for &byte in &data {
                frequencies[byte as usize] += 1;
            }
            frequencies[AC_END_OF_STREAM as usize] = 1;

            // the decompressor needs the table to rebuild the model
            for &frequency in &frequencies {
                dest.write_u32::<LittleEndian>(frequency)?;
            }

            let mut model = StaticDataModel::with_frequencies(&frequencies)?;
            encode_stream(&data, dest, &mut model)?;
        }
    }
    debug!("ac {:?}: compressed {} bytes", mode, data.len());
    Ok(())
}

/// Inverse of [`compress_ac`]; the mode is read back from the header.
pub fn decompress_ac<R: Read, W: Write>(src: &mut R, dest: &mut W) -> Result<(), CodecError> {
    expect_magic(src, AC_MAGIC)?;
    let mode = AcMode::from_byte(src.read_u8()?)?;

    match mode {
        AcMode::Adaptive => {
            let mut model = AdaptiveDataModel::new(AC_NUM_SYMBOLS);
            decode_stream(src, dest, &mut model)
        }
        AcMode::Static => {
            let mut frequencies = vec![0u32; AC_NUM_SYMBOLS as usize];
            for frequency in frequencies.iter_mut() {
                *frequency = src.read_u32::<LittleEndian>()?;
            }
            let mut model = StaticDataModel::with_frequencies(&frequencies)?;
            decode_stream(src, dest, &mut model)
        }
    }
}

fn encode_stream<W: Write, M: DataModel>(
    data: &[u8],
    dest: &mut W,
    model: &mut M,
) -> Result<(), CodecError> {
    let mut encoder = ArithmeticEncoder::new(dest);
    for &byte in data {
        encoder.encode(u32::from(byte), model)?;
    }
    encoder.encode(AC_END_OF_STREAM, model)?;
    encoder.done()
}

fn decode_stream<R: Read, W: Write, M: DataModel>(
    src: &mut R,
    dest: &mut W,
    model: &mut M,
) -> Result<(), CodecError> {
    let mut decoder = ArithmeticDecoder::new(src);
    decoder.read_init_bits()?;
    let mut decoded = 0u64;
    loop {
        let symbol = decoder.decode(model)?;
        if symbol == AC_END_OF_STREAM {
            break;
        }
        dest.write_all(&[symbol as u8])?;
        decoded += 1;
    }
    debug!("ac: decompressed {} bytes", decoded);
    Ok(())
}

/// Compresses `src` to the end as one LZW frame.
pub fn compress_lzw<R: Read, W: Write>(
    src: &mut R,
    dest: &mut W,
    mode: LzwMode,
) -> Result<(), CodecError> {
    let mut data = Vec::new();
    src.read_to_end(&mut data)?;

    dest.write_all(LZW_MAGIC)?;
    dest.write_u8(mode.to_byte())?;

    match mode {
        LzwMode::Variable => {
            let mut encoder = LzwEncoder::new(VariableCodeWriter::new(&mut *dest));
            for &byte in &data {
                encoder.encode(byte)?;
            }
            encoder.done()?;
        }
        LzwMode::Arithmetic => {
            let mut encoder = LzwEncoder::new(ArithmeticCodeWriter::new(&mut *dest));
            for &byte in &data {
                encoder.encode(byte)?;
            }
            encoder.done()?;
        }
    }
    debug!("lzw {:?}: compressed {} bytes", mode, data.len());
    Ok(())
}

/// Inverse of [`compress_lzw`]; the mode is read back from the header.
pub fn decompress_lzw<R: Read, W: Write>(src: &mut R, dest: &mut W) -> Result<(), CodecError> {
    expect_magic(src, LZW_MAGIC)?;
    let mode = LzwMode::from_byte(src.read_u8()?)?;

    match mode {
        LzwMode::Variable => {
            LzwDecoder::new(VariableCodeReader::new(src)).decode(dest)
        }
        LzwMode::Arithmetic => {
            LzwDecoder::new(ArithmeticCodeReader::new(src)).decode(dest)
        }
    }
}

fn expect_magic<R: Read>(src: &mut R, expected: &'static [u8]) -> Result<(), CodecError> {
    let mut actual = vec![0u8; expected.len()];
    src.read_exact(&mut actual)?;
    if actual != expected {
        return Err(CodecError::BadMagic { expected, actual });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn frame_round_trip_ac(data: &[u8], mode: AcMode) -> Vec<u8> {
        let mut compressed = Vec::new();
        compress_ac(&mut Cursor::new(data), &mut compressed, mode).unwrap();
        let mut output = Vec::new();
        decompress_ac(&mut Cursor::new(compressed), &mut output).unwrap();
        output
    }

    fn frame_round_trip_lzw(data: &[u8], mode: LzwMode) -> Vec<u8> {
        let mut compressed = Vec::new();
        compress_lzw(&mut Cursor::new(data), &mut compressed, mode).unwrap();
        let mut output = Vec::new();
        decompress_lzw(&mut Cursor::new(compressed), &mut output).unwrap();
        output
    }

    #[test]
    fn test_ac_frame_headers() {
        let mut compressed = Vec::new();
        compress_ac(&mut Cursor::new(b"x"), &mut compressed, AcMode::Adaptive).unwrap();
        assert_eq!(&compressed[..3], b"AC\x00");

        let mut compressed = Vec::new();
        compress_ac(&mut Cursor::new(b"x"), &mut compressed, AcMode::Static).unwrap();
        assert_eq!(&compressed[..3], b"AC\x01");
        // 257 little-endian u32 frequencies follow the header
        assert!(compressed.len() > 3 + 257 * 4);
        let x_freq = &compressed[3 + (b'x' as usize) * 4..][..4];
        assert_eq!(x_freq, [1, 0, 0, 0]);
    }

    #[test]
    fn test_lzw_frame_headers() {
        let mut compressed = Vec::new();
        compress_lzw(&mut Cursor::new(b"x"), &mut compressed, LzwMode::Variable).unwrap();
        assert_eq!(&compressed[..4], b"LZW\x00");

        let mut compressed = Vec::new();
        compress_lzw(&mut Cursor::new(b"x"), &mut compressed, LzwMode::Arithmetic).unwrap();
        assert_eq!(&compressed[..4], b"LZW\x01");
    }

    #[test]
    fn test_ac_frame_round_trips() {
        for &mode in &[AcMode::Adaptive, AcMode::Static] {
            for data in &[&b""[..], b"a", b"frame round trip", &[0u8, 255, 128, 7][..]] {
                assert_eq!(frame_round_trip_ac(data, mode), *data);
            }
        }
    }

    #[test]
    fn test_lzw_frame_round_trips() {
        for &mode in &[LzwMode::Variable, LzwMode::Arithmetic] {
            for data in &[&b""[..], b"a", b"frame round trip frame round trip"] {
                assert_eq!(frame_round_trip_lzw(data, mode), *data);
            }
        }
    }

    #[test]
    fn test_bad_magic_is_reported_with_observed_bytes() {
        let mut output = Vec::new();
        let outcome = decompress_ac(&mut Cursor::new(b"XY\x00rest"), &mut output);
        match outcome {
            Err(CodecError::BadMagic { expected, actual }) => {
                assert_eq!(expected, b"AC");
                assert_eq!(actual, b"XY");
            }
            other => panic!("expected BadMagic, got {:?}", other.map(|_| ())),
        }
    }

    #[test]
    fn test_unknown_mode_byte() {
        let mut output = Vec::new();
        let outcome = decompress_lzw(&mut Cursor::new(b"LZW\x07"), &mut output);
        assert!(matches!(outcome, Err(CodecError::UnknownMode(0x07))));
    }

    #[test]
    fn test_truncated_header_is_an_io_error() {
        let mut output = Vec::new();
        let outcome = decompress_ac(&mut Cursor::new(b"A"), &mut output);
        assert!(matches!(outcome, Err(CodecError::IoError(_))));
    }
}
