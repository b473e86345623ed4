//! Lossless compression of arbitrary byte streams with two codecs: an
//! integer arithmetic coder driven by static or adaptive probability
//! models, and an LZW dictionary coder with three interchangeable code
//! transports (plain text, variable-width bits, arithmetic-coded).
//!
//! The framed operations in [`frame`] are what the `ac` and `lzw`
//! command line tools call; they work over anything `Read`/`Write`.
//!
//! # Examples
//!
//! ```
//! use lzac::{compress_ac, decompress_ac, AcMode};
//!
//! # fn main() -> Result<(), lzac::CodecError> {
//! let mut compressed = std::io::Cursor::new(Vec::new());
//! compress_ac(
//!     &mut std::io::Cursor::new(&b"some bytes to shrink"[..]),
//!     &mut compressed,
//!     AcMode::Adaptive,
//! )?;
//!
//! compressed.set_position(0);
//! let mut restored = Vec::new();
//! decompress_ac(&mut compressed, &mut restored)?;
//! assert_eq!(restored, b"some bytes to shrink");
//! # Ok(())
//! # }
//! ```
//!
//! The codec layers compose directly as well, for instance to run the
//! arithmetic coder against a hand-built model:
//!
//! ```
//! use lzac::encoders::ArithmeticEncoder;
//! use lzac::decoders::ArithmeticDecoder;
//! use lzac::models::StaticDataModel;
//!
//! # fn main() -> Result<(), lzac::CodecError> {
//! let mut model = StaticDataModel::with_frequencies(&[4, 2, 1])?;
//! let mut encoder = ArithmeticEncoder::new(Vec::new());
//! for &symbol in &[0u32, 0, 1, 2, 0] {
//!     encoder.encode(symbol, &mut model)?;
//! }
//! encoder.done()?;
//!
//! let compressed = encoder.into_inner();
//! let mut decoder = ArithmeticDecoder::new(std::io::Cursor::new(compressed));
//! decoder.read_init_bits()?;
//! for &symbol in &[0, 0, 1, 2, 0] {
//!     assert_eq!(decoder.decode(&mut model)?, symbol);
//! }
//! # Ok(())
//! # }
//! ```

pub mod bitstream;
pub mod decoders;
pub mod encoders;
pub mod errors;
pub mod frame;
pub mod interval;
pub mod lzw;
pub mod models;

pub use errors::CodecError;
pub use frame::{compress_ac, compress_lzw, decompress_ac, decompress_lzw, AcMode, LzwMode};
