//! Per-bit reading and writing over octet streams.
//!
//! Bits are serialized MSB-first within each octet: bit 7 of the first
//! octet is the first bit written or read. Multi-bit fields are composed
//! LSB-first, bit 0 of the value travelling first.

use byteorder::ReadBytesExt;
use std::io::{ErrorKind, Read, Write};

use crate::errors::CodecError;

/// Writer for individual bits to any octet sink.
pub struct BitWriter<W: Write> {
    dest: W,
    byte: u8,
    mask: u8,
    bits_written: u64,
}

impl<W: Write> BitWriter<W> {
    pub fn new(dest: W) -> Self {
        Self {
            dest,
            byte: 0,
            mask: 0x80,
            bits_written: 0,
        }
    }

    pub fn write_bit(&mut self, bit: bool) -> Result<(), CodecError> {
        if bit {
            self.byte |= self.mask;
        }
        self.mask >>= 1;
        self.bits_written += 1;

        if self.mask == 0 {
            self.dest.write_all(&[self.byte])?;
            self.byte = 0;
            self.mask = 0x80;
        }
        Ok(())
    }

    /// Writes the low `count` bits of `bits`, bit 0 first.
    pub fn write_bits(&mut self, bits: u32, count: u32) -> Result<(), CodecError> {
        debug_assert!(count <= 32);
        for i in 0..count {
            self.write_bit(bits & (1 << i) != 0)?;
        }
        Ok(())
    }

    /// Writes the pending partial octet, right-padded with zeros.
    pub fn flush(&mut self) -> Result<(), CodecError> {
        if self.mask != 0x80 {
            self.dest.write_all(&[self.byte])?;
            self.byte = 0;
            self.mask = 0x80;
        }
        self.dest.flush()?;
        Ok(())
    }

    /// Total bits written so far, not counting flush padding.
    pub fn bits_written(&self) -> u64 {
        self.bits_written
    }

    pub fn get_mut(&mut self) -> &mut W {
        &mut self.dest
    }

    pub fn into_inner(self) -> W {
        self.dest
    }
}

/// Reader for individual bits from any octet source.
///
/// An octet is fetched the first time a bit is requested from it and
/// consumed MSB-first. Exhaustion of the source surfaces as
/// [`CodecError::Underflow`].
pub struct BitReader<R: Read> {
    src: R,
    byte: u8,
    mask: u8,
}

impl<R: Read> BitReader<R> {
    pub fn new(src: R) -> Self {
        Self {
            src,
            byte: 0,
            mask: 0,
        }
    }

    pub fn read_bit(&mut self) -> Result<bool, CodecError> {
        if self.mask == 0 {
            self.byte = match self.src.read_u8() {
                Ok(byte) => byte,
                Err(e) if e.kind() == ErrorKind::UnexpectedEof => {
                    return Err(CodecError::Underflow)
                }
                Err(e) => return Err(CodecError::IoError(e)),
            };
            self.mask = 0x80;
        }

        let bit = self.byte & self.mask != 0;
        self.mask >>= 1;
        Ok(bit)
    }

    /// Reads `count` bits, assembling them LSB-first.
    pub fn read_bits(&mut self, count: u32) -> Result<u32, CodecError> {
        debug_assert!(count <= 32);
        let mut bits = 0u32;
        for i in 0..count {
            if self.read_bit()? {
                bits |= 1 << i;
            }
        }
        Ok(bits)
    }

    pub fn get_mut(&mut self) -> &mut R {
        &mut self.src
    }

    pub fn into_inner(self) -> R {
        self.src
    }
}
