//! Low-level byte stream parser for signature blobs.
//!
//! This module provides the [`crate::file::parser::Parser`] type, a cursor-based binary data
//! parser for reading the compressed signature grammar of ECMA-335 II.23.2. It offers
//! bounds-checked access to the blob, so truncated or corrupted input surfaces as
//! [`crate::Error::OutOfBounds`] or [`crate::Error::Malformed`] instead of a panic.
//!
//! # Key Components
//!
//! ## Navigation Methods
//! - [`crate::file::parser::Parser::advance`] - Move forward by one byte
//! - [`crate::file::parser::Parser::pos`] - Get current position
//! - [`crate::file::parser::Parser::peek_byte`] - Peek at current byte without advancing
//!
//! ## Metadata Reading Methods
//! - [`crate::file::parser::Parser::read_compressed_uint`] - Read compressed unsigned integers
//! - [`crate::file::parser::Parser::read_compressed_int`] - Read compressed signed integers
//! - [`crate::file::parser::Parser::read_compressed_token`] - Read `TypeDefOrRef` coded tokens
//!
//! # Usage Examples
//!
//! ```rust
//! use dotsig::Parser;
//!
//! // Example metadata with compressed integers
//! let metadata = [0x0C, 0x80, 0x95, 0x49];
//! let mut parser = Parser::new(&metadata);
//!
//! let param_count = parser.read_compressed_uint()?;
//! assert_eq!(param_count, 12);
//! let type_len = parser.read_compressed_uint()?;
//! assert_eq!(type_len, 0x95);
//! let type_token = parser.read_compressed_token()?;
//! assert_eq!(type_token.value(), 0x0100_0012);
//! # Ok::<(), dotsig::Error>(())
//! ```

use crate::{metadata::token::Token, Error, Result};

/// A binary data parser for reading signature blobs.
///
/// `Parser` maintains an internal position cursor and provides bounds checking to prevent
/// buffer overruns when reading malformed or truncated data.
///
/// # Examples
///
/// ```rust
/// use dotsig::Parser;
///
/// let data = [0x01, 0x02];
/// let mut parser = Parser::new(&data);
///
/// assert_eq!(parser.read_u8()?, 0x01);
/// assert_eq!(parser.peek_byte()?, 0x02);
/// assert_eq!(parser.pos(), 1);
/// # Ok::<(), dotsig::Error>(())
/// ```
pub struct Parser<'a> {
    /// The binary data being parsed
    data: &'a [u8],
    /// Current position within the data buffer
    position: usize,
}

impl<'a> Parser<'a> {
    /// Create a new [`crate::file::parser::Parser`] from a byte slice.
    ///
    /// # Arguments
    /// * `data` - The byte slice to read from
    #[must_use]
    pub fn new(data: &'a [u8]) -> Self {
        Parser { data, position: 0 }
    }

    /// Returns the length of the underlying data buffer.
    #[must_use]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Returns `true` if the parser has no data.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Returns `true` if there is more data available to parse.
    #[must_use]
    pub fn has_more_data(&self) -> bool {
        self.position < self.data.len()
    }

    /// Returns the current position of the cursor.
    #[must_use]
    pub fn pos(&self) -> usize {
        self.position
    }

    /// Returns the number of bytes left to read.
    #[must_use]
    pub fn remaining(&self) -> usize {
        self.data.len().saturating_sub(self.position)
    }

    /// Move the position forward by one byte.
    ///
    /// # Errors
    /// Returns [`crate::Error::OutOfBounds`] if advancing would exceed the data length.
    pub fn advance(&mut self) -> Result<()> {
        if self.position >= self.data.len() {
            return Err(Error::OutOfBounds);
        }

        self.position += 1;
        Ok(())
    }

    /// Peek at the current byte without advancing the position.
    ///
    /// # Errors
    /// Returns [`crate::Error::OutOfBounds`] if the cursor is at the end of the data.
    pub fn peek_byte(&self) -> Result<u8> {
        self.data
            .get(self.position)
            .copied()
            .ok_or(Error::OutOfBounds)
    }

    /// Read a single byte and advance the position.
    ///
    /// # Errors
    /// Returns [`crate::Error::OutOfBounds`] if the cursor is at the end of the data.
    pub fn read_u8(&mut self) -> Result<u8> {
        let value = self.peek_byte()?;
        self.position += 1;
        Ok(value)
    }

    /// Read a compressed unsigned integer as defined in ECMA-335 II.23.2.
    ///
    /// | Prefix | Width | Value range |
    /// |--------|-------|-------------|
    /// | `0xxxxxxx` | 1 byte | `0x00 ..= 0x7F` |
    /// | `10xxxxxx` | 2 bytes | `0x80 ..= 0x3FFF` |
    /// | `110xxxxx` | 4 bytes | `0x4000 ..= 0x1FFF_FFFF` |
    ///
    /// # Errors
    /// Returns [`crate::Error::OutOfBounds`] if reading would exceed the data length or
    /// [`crate::Error::Malformed`] for an invalid prefix.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use dotsig::Parser;
    ///
    /// let mut parser = Parser::new(&[0x80, 0x80]);
    /// assert_eq!(parser.read_compressed_uint()?, 128);
    /// # Ok::<(), dotsig::Error>(())
    /// ```
    pub fn read_compressed_uint(&mut self) -> Result<u32> {
        self.read_compressed_uint_with_width().map(|(value, _)| value)
    }

    /// Reads a compressed unsigned integer and reports how many bytes it occupied.
    fn read_compressed_uint_with_width(&mut self) -> Result<(u32, usize)> {
        let first_byte = self.read_u8()?;

        // 1-byte encoding: 0xxxxxxx
        if (first_byte & 0x80) == 0 {
            return Ok((u32::from(first_byte), 1));
        }

        // 2-byte encoding: 10xxxxxx xxxxxxxx
        if (first_byte & 0xC0) == 0x80 {
            let second_byte = self.read_u8()?;
            let value = ((u32::from(first_byte) & 0x3F) << 8) | u32::from(second_byte);
            return Ok((value, 2));
        }

        // 4-byte encoding: 110xxxxx xxxxxxxx xxxxxxxx xxxxxxxx
        if (first_byte & 0xE0) == 0xC0 {
            let b1 = u32::from(self.read_u8()?);
            let b2 = u32::from(self.read_u8()?);
            let b3 = u32::from(self.read_u8()?);
            let value = ((u32::from(first_byte) & 0x1F) << 24) | (b1 << 16) | (b2 << 8) | b3;
            return Ok((value, 4));
        }

        Err(malformed_error!("Invalid compressed uint - {}", first_byte))
    }

    /// Read a compressed signed integer as defined in ECMA-335 II.23.2.
    ///
    /// The two's complement value is rotated left by one bit within the 7, 14 or 29 bits
    /// available for the chosen width, so the sign ends up in the least significant bit.
    ///
    /// # Errors
    /// Returns [`crate::Error::OutOfBounds`] if reading would exceed the data length or
    /// [`crate::Error::Malformed`] for invalid encoding.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use dotsig::Parser;
    ///
    /// let mut parser = Parser::new(&[0x06]);
    /// assert_eq!(parser.read_compressed_int()?, 3);
    ///
    /// let mut parser = Parser::new(&[0x7B]);
    /// assert_eq!(parser.read_compressed_int()?, -3);
    /// # Ok::<(), dotsig::Error>(())
    /// ```
    pub fn read_compressed_int(&mut self) -> Result<i32> {
        let (unsigned, width) = self.read_compressed_uint_with_width()?;

        let sign_extension: u32 = match width {
            1 => 0xFFFF_FFC0,
            2 => 0xFFFF_E000,
            _ => 0xF000_0000,
        };

        let magnitude = unsigned >> 1;
        let bits = if unsigned & 1 == 0 {
            magnitude
        } else {
            magnitude | sign_extension
        };

        #[allow(clippy::cast_possible_wrap)]
        Ok(bits as i32)
    }

    /// Read a compressed token as defined in ECMA-335 II.23.2.8 (`TypeDefOrRefOrSpecEncoded`).
    ///
    /// | Tag | Table | Token Prefix |
    /// |-----|-------|--------------|
    /// | 0x0 | TypeDef | 0x0200_0000 |
    /// | 0x1 | TypeRef | 0x0100_0000 |
    /// | 0x2 | TypeSpec | 0x1B00_0000 |
    /// | 0x3 | (reserved/invalid) | - |
    ///
    /// # Errors
    /// Returns [`crate::Error::OutOfBounds`] if reading would exceed the data length or
    /// [`crate::Error::Malformed`] if tag 0x3 is encountered or the row does not fit in 24 bits.
    pub fn read_compressed_token(&mut self) -> Result<Token> {
        let compressed_token = self.read_compressed_uint()?;

        let table: u32 = match compressed_token & 0x3 {
            0x0 => 0x0200_0000, // TypeDef
            0x1 => 0x0100_0000, // TypeRef
            0x2 => 0x1B00_0000, // TypeSpec
            _ => {
                return Err(malformed_error!(
                    "Invalid compressed token - {}",
                    compressed_token
                ))
            }
        };

        let table_index = compressed_token >> 2;
        if table_index > 0x00FF_FFFF {
            return Err(malformed_error!(
                "Compressed token row out of range - {}",
                table_index
            ));
        }

        Ok(Token::new(table + table_index))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Error;

    #[test]
    fn test_read_compressed_uint() {
        let test_cases = vec![
            (vec![0x03], 3),                             // 1-byte format
            (vec![0x7F], 0x7F),                          // 1-byte format, max value
            (vec![0x80, 0x80], 0x80),                    // 2-byte format, min value
            (vec![0xBF, 0xFF], 0x3FFF),                  // 2-byte format, max value
            (vec![0xC0, 0x00, 0x00, 0x00], 0x00),        // 4-byte format, min value
            (vec![0xDF, 0xFF, 0xFF, 0xFF], 0x1FFF_FFFF), // 4-byte format, max value
        ];

        for (input, expected) in test_cases {
            let mut parser = Parser::new(&input);
            let result = parser.read_compressed_uint().unwrap();
            assert_eq!(result, expected);
        }

        // Error on empty data
        let mut parser = Parser::new(&[]);
        assert!(matches!(
            parser.read_compressed_uint(),
            Err(Error::OutOfBounds)
        ));

        // 0xE0 prefix is not a valid width
        let mut parser = Parser::new(&[0xE0, 0x00, 0x00, 0x00]);
        assert!(matches!(
            parser.read_compressed_uint(),
            Err(Error::Malformed { .. })
        ));
    }

    #[test]
    fn test_read_compressed_int() {
        // Values from ECMA-335 II.23.2
        let test_cases: Vec<(Vec<u8>, i32)> = vec![
            (vec![0x06], 3),
            (vec![0x7B], -3),
            (vec![0x80, 0x80], 64),
            (vec![0x01], -64),
            (vec![0xC0, 0x00, 0x40, 0x00], 8192),
            (vec![0x80, 0x01], -8192),
            (vec![0xDF, 0xFF, 0xFF, 0xFE], 268_435_455),
            (vec![0xC0, 0x00, 0x00, 0x01], -268_435_456),
            (vec![0x00], 0),
        ];

        for (input, expected) in test_cases {
            let mut parser = Parser::new(&input);
            assert_eq!(parser.read_compressed_int().unwrap(), expected);
        }
    }

    #[test]
    fn test_read_compressed_token() {
        let mut parser = Parser::new(&[0x49, 0x42, 0x35, 0x03]);
        assert_eq!(parser.read_compressed_token().unwrap(), Token::new(0x0100_0012));
        assert_eq!(parser.read_compressed_token().unwrap(), Token::new(0x1B00_0010));
        assert_eq!(parser.read_compressed_token().unwrap(), Token::new(0x0100_000D));
        assert!(matches!(
            parser.read_compressed_token(),
            Err(Error::Malformed { .. })
        ));
    }

    #[test]
    fn test_read_compressed_token_row_overflow() {
        // Largest 4-byte value with tag 0, row 0x07FF_FFFF
        let mut parser = Parser::new(&[0xDF, 0xFF, 0xFF, 0xFC]);
        assert!(matches!(
            parser.read_compressed_token(),
            Err(Error::Malformed { .. })
        ));

        // Row 0x00FF_FFFF is the largest that fits
        let mut parser = Parser::new(&[0xC3, 0xFF, 0xFF, 0xFD]);
        assert_eq!(parser.read_compressed_token().unwrap(), Token::new(0x01FF_FFFF));
    }

    #[test]
    fn test_error_handling() {
        // Test unexpected end of data
        let mut parser = Parser::new(&[0x08]); // Just one byte
        assert!(matches!(parser.read_compressed_uint(), Ok(8)));
        assert!(matches!(
            parser.read_compressed_uint(),
            Err(Error::OutOfBounds)
        ));
        assert!(parser.advance().is_err());
        assert_eq!(parser.remaining(), 0);
    }
}
