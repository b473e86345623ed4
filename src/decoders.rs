//! Arithmetic decoder.
//!
//! Mirror of the encoder: it tracks the same `[low, high]` interval and
//! keeps a sliding register of the next `B - 1` stream bits; the
//! register's position inside the interval selects each symbol. Once
//! the source is exhausted the decoder substitutes zero bits so the
//! trailing symbols, which the encoder only pinned down to a quarter of
//! the interval, can still be completed.

use std::io::Read;

use crate::bitstream::BitReader;
use crate::errors::CodecError;
use crate::interval::IntervalValue;
use crate::models::DataModel;

pub struct ArithmeticDecoder<R: Read, V: IntervalValue = u32> {
    input: BitReader<R>,
    low: V,
    high: V,
    value: V,
    synthetic_bits: u32,
}

impl<R: Read> ArithmeticDecoder<R> {
    /// Decoder with the canonical 32-bit interval precision.
    pub fn new(src: R) -> Self {
        Self::with_precision(src)
    }
}

impl<R: Read, V: IntervalValue> ArithmeticDecoder<R, V> {
    pub fn with_precision(src: R) -> Self {
        Self {
            input: BitReader::new(src),
            low: V::zero(),
            high: V::interval_max(),
            value: V::zero(),
            synthetic_bits: 0,
        }
    }

    /// Fills the value register with the stream's first `B - 1` bits.
    /// Must be called once before the first [`decode`](Self::decode).
    pub fn read_init_bits(&mut self) -> Result<(), CodecError> {
        for _ in 0..V::VALUE_BITS {
            self.shift_in()?;
        }
        Ok(())
    }

    pub fn decode<M: DataModel + ?Sized>(&mut self, model: &mut M) -> Result<u32, CodecError> {
        let range = self.high - self.low + V::one();
        let step = range / V::from_freq(model.total());

        let target = ((self.value - self.low) / step).to_freq();
        let symbol = find_symbol(target, model)?;

        self.high = self.low + scale::<V>(step, model.cum_freq(symbol)) - V::one();
        if symbol > 0 {
            self.low = self.low + scale::<V>(step, model.cum_freq(symbol - 1));
        }

        loop {
            if self.high < V::half() {
                // E1
            } else if self.low >= V::half() {
                // E2
                self.low = self.low - V::half();
                self.high = self.high - V::half();
                self.value = self.value - V::half();
            } else if self.low >= V::quarter() && self.high < V::three_quarters() {
                // E3
                self.low = self.low - V::quarter();
                self.high = self.high - V::quarter();
                self.value = self.value - V::quarter();
            } else {
                break;
            }
            self.low = self.low << 1;
            self.high = (self.high << 1) + V::one();
            self.shift_in()?;
        }

        if self.synthetic_bits == 0 {
            debug_assert!(self.low <= self.value && self.value <= self.high);
        }

        model.inc_freq(symbol);
        Ok(symbol)
    }

    fn shift_in(&mut self) -> Result<(), CodecError> {
        let bit = match self.input.read_bit() {
            Ok(bit) => bit,
            Err(CodecError::Underflow) => {
                self.synthetic_bits += 1;
                if self.synthetic_bits > 3 * V::VALUE_BITS {
                    return Err(CodecError::Underflow);
                }
                false
            }
            Err(e) => return Err(e),
        };
        self.value = (self.value << 1) + if bit { V::one() } else { V::zero() };
        Ok(())
    }

    pub fn get_mut(&mut self) -> &mut R {
        self.input.get_mut()
    }

    pub fn into_inner(self) -> R {
        self.input.into_inner()
    }
}

/// Smallest symbol whose cumulative frequency exceeds `target`.
fn find_symbol<M: DataModel + ?Sized>(target: u32, model: &M) -> Result<u32, CodecError> {
    let mut lo = 0u32;
    let mut hi = model.size();
    while lo < hi {
        let mid = (lo + hi) / 2;
        if model.cum_freq(mid) <= target {
            lo = mid + 1;
        } else {
            hi = mid;
        }
    }
    if lo >= model.size() {
        return Err(CodecError::InvalidSymbol(target));
    }
    Ok(lo)
}

fn scale<V: IntervalValue>(step: V, cum_freq: u32) -> V {
    V::narrow(step.widen() * V::from_freq(cum_freq).widen())
}
