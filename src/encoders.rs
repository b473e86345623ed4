//! Arithmetic encoder.
//!
//! Integer implementation with E1/E2/E3 renormalization: the interval
//! `[low, high]` shrinks to the coded symbol's sub-range and is doubled
//! back out whenever it is confined to a half (emitting the determined
//! bit) or to the middle half (deferring the bit with a counter).

use std::io::Write;

use crate::bitstream::BitWriter;
use crate::errors::CodecError;
use crate::interval::IntervalValue;
use crate::models::DataModel;

pub struct ArithmeticEncoder<W: Write, V: IntervalValue = u32> {
    out: BitWriter<W>,
    low: V,
    high: V,
    pending: u64,
}

impl<W: Write> ArithmeticEncoder<W> {
    /// Encoder with the canonical 32-bit interval precision.
    pub fn new(dest: W) -> Self {
        Self::with_precision(dest)
    }
}

impl<W: Write, V: IntervalValue> ArithmeticEncoder<W, V> {
    pub fn with_precision(dest: W) -> Self {
        Self {
            out: BitWriter::new(dest),
            low: V::zero(),
            high: V::interval_max(),
            pending: 0,
        }
    }

    /// Narrows the interval to `symbol`'s sub-range and emits every bit
    /// the narrowing has fully determined.
    pub fn encode<M: DataModel + ?Sized>(
        &mut self,
        symbol: u32,
        model: &mut M,
    ) -> Result<(), CodecError> {
        debug_assert!(symbol < model.size());

        let range = self.high - self.low + V::one();
        let step = range / V::from_freq(model.total());

        // high must be derived from the interval base before low moves
        // up to the sub-range start
        self.high = self.low + scale::<V>(step, model.cum_freq(symbol)) - V::one();
        if symbol > 0 {
            self.low = self.low + scale::<V>(step, model.cum_freq(symbol - 1));
        }
        debug_assert!(self.low <= self.high && self.high <= V::interval_max());

        loop {
            if self.high < V::half() {
                // E1: lower half, a 0 bit is settled
                self.emit(false)?;
            } else if self.low >= V::half() {
                // E2: upper half, a 1 bit is settled
                self.emit(true)?;
                self.low = self.low - V::half();
                self.high = self.high - V::half();
            } else if self.low >= V::quarter() && self.high < V::three_quarters() {
                // E3: middle half, bit deferred until E1/E2 decides
                self.pending += 1;
                self.low = self.low - V::quarter();
                self.high = self.high - V::quarter();
            } else {
                break;
            }
            self.low = self.low << 1;
            self.high = (self.high << 1) + V::one();
        }

        model.inc_freq(symbol);
        Ok(())
    }

    /// Emits the bits that pin the final interval down and flushes the
    /// pending partial octet. Must be called once after the last symbol.
    pub fn done(&mut self) -> Result<(), CodecError> {
        self.pending += 1;
        let bit = self.low >= V::quarter();
        self.emit(bit)?;
        self.out.flush()
    }

    fn emit(&mut self, bit: bool) -> Result<(), CodecError> {
        self.out.write_bit(bit)?;
        for _ in 0..self.pending {
            self.out.write_bit(!bit)?;
        }
        self.pending = 0;
        Ok(())
    }

    pub fn bits_written(&self) -> u64 {
        self.out.bits_written()
    }

    pub fn get_mut(&mut self) -> &mut W {
        self.out.get_mut()
    }

    pub fn into_inner(self) -> W {
        self.out.into_inner()
    }
}

fn scale<V: IntervalValue>(step: V, cum_freq: u32) -> V {
    V::narrow(step.widen() * V::from_freq(cum_freq).widen())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{AdaptiveDataModel, StaticDataModel};

    fn histogram_model(data: &[u8], alphabet: u32) -> StaticDataModel {
        let mut frequencies = vec![0u32; alphabet as usize];
        for &byte in data {
            frequencies[byte as usize] += 1;
        }
        StaticDataModel::with_frequencies(&frequencies).unwrap()
    }

    #[test]
    fn test_known_stream_static_histogram() {
        // 6 distinct letters over a 128-symbol model; the renormalization
        // output is fully determined
        let data = b"ahojky";
        let mut model = histogram_model(data, 128);

        let mut encoder = ArithmeticEncoder::new(Vec::new());
        for &byte in data {
            encoder.encode(u32::from(byte), &mut model).unwrap();
        }
        // the six symbols settle exactly 10 bits
        assert_eq!(encoder.bits_written(), 10);

        encoder.done().unwrap();
        assert_eq!(encoder.bits_written(), 17);
        assert_eq!(encoder.into_inner(), vec![0x0C, 0x60, 0x00]);
    }

    #[test]
    fn test_known_stream_adaptive_empty() {
        let mut model = AdaptiveDataModel::new(257);
        let mut encoder = ArithmeticEncoder::new(Vec::new());
        encoder.encode(256, &mut model).unwrap();
        encoder.done().unwrap();
        assert_eq!(encoder.into_inner(), vec![0xFF, 0x40]);
    }

    #[test]
    fn test_known_stream_adaptive_single_byte() {
        let mut model = AdaptiveDataModel::new(257);
        let mut encoder = ArithmeticEncoder::new(Vec::new());
        encoder.encode(u32::from(b'a'), &mut model).unwrap();
        encoder.encode(256, &mut model).unwrap();
        encoder.done().unwrap();
        assert_eq!(encoder.into_inner(), vec![0x61, 0x9D, 0x80]);
    }
}
