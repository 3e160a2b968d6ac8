//! Encoding helpers shared by the signature writer.
//!
//! These are the write-side counterparts of
//! [`crate::file::parser::Parser::read_compressed_uint`],
//! [`crate::file::parser::Parser::read_compressed_int`] and
//! [`crate::file::parser::Parser::read_compressed_token`], implementing the compressed
//! integer forms of ECMA-335 II.23.2.

use crate::{metadata::token::Token, Error, Result};

/// Largest value representable as a compressed unsigned integer.
pub const MAX_COMPRESSED_UINT: u32 = 0x1FFF_FFFF;

/// Writes `value` as a compressed unsigned integer (1, 2 or 4 bytes).
///
/// Values above [`MAX_COMPRESSED_UINT`] can not be represented and are rejected.
///
/// # Errors
/// Returns [`crate::Error::InvalidSignature`] if `value` exceeds [`MAX_COMPRESSED_UINT`].
///
/// # Examples
///
/// ```rust
/// use dotsig::utils::write_compressed_uint;
///
/// let mut buffer = Vec::new();
/// write_compressed_uint(0x80, &mut buffer)?;
/// assert_eq!(buffer, vec![0x80, 0x80]);
/// # Ok::<(), dotsig::Error>(())
/// ```
pub fn write_compressed_uint(value: u32, buffer: &mut Vec<u8>) -> Result<()> {
    match value {
        0..=0x7F => buffer.push(value as u8),
        0x80..=0x3FFF => {
            buffer.push(((value >> 8) as u8) | 0x80);
            buffer.push(value as u8);
        }
        0x4000..=MAX_COMPRESSED_UINT => {
            buffer.push(((value >> 24) as u8) | 0xC0);
            buffer.push((value >> 16) as u8);
            buffer.push((value >> 8) as u8);
            buffer.push(value as u8);
        }
        _ => {
            return Err(Error::InvalidSignature(format!(
                "Value 0x{value:08X} exceeds the compressed integer range"
            )))
        }
    }

    Ok(())
}

/// Writes `value` as a compressed signed integer.
///
/// The width is chosen from the value range (7, 14 or 29 bits of two's complement) and the
/// sign bit is rotated into the least significant position.
///
/// # Errors
/// Returns [`crate::Error::InvalidSignature`] if `value` lies outside `-2^28 .. 2^28`.
pub fn write_compressed_int(value: i32, buffer: &mut Vec<u8>) -> Result<()> {
    #[allow(clippy::cast_sign_loss)]
    let bits = value as u32;
    let sign = u32::from(value < 0);

    match value {
        -0x40..=0x3F => {
            buffer.push((((bits & 0x3F) << 1) | sign) as u8);
        }
        -0x2000..=0x1FFF => {
            let encoded = ((bits & 0x1FFF) << 1) | sign;
            buffer.push(((encoded >> 8) as u8) | 0x80);
            buffer.push(encoded as u8);
        }
        -0x1000_0000..=0x0FFF_FFFF => {
            let encoded = ((bits & 0x0FFF_FFFF) << 1) | sign;
            buffer.push(((encoded >> 24) as u8) | 0xC0);
            buffer.push((encoded >> 16) as u8);
            buffer.push((encoded >> 8) as u8);
            buffer.push(encoded as u8);
        }
        _ => {
            return Err(Error::InvalidSignature(format!(
                "Value {value} exceeds the compressed signed integer range"
            )))
        }
    }

    Ok(())
}

/// Encodes a token as a `TypeDefOrRef` coded index according to ECMA-335 II.24.2.6.
///
/// - TypeDef (0x02): `(rid << 2) | 0`
/// - TypeRef (0x01): `(rid << 2) | 1`
/// - TypeSpec (0x1B): `(rid << 2) | 2`
///
/// # Errors
///
/// Returns [`crate::Error::InvalidToken`] if the token's table is not TypeDef, TypeRef or
/// TypeSpec.
pub fn encode_type_def_or_ref_coded_index(token: Token) -> Result<u32> {
    let rid = token.row();

    match token.table() {
        0x02 => Ok(rid << 2),       // TypeDef
        0x01 => Ok((rid << 2) | 1), // TypeRef
        0x1B => Ok((rid << 2) | 2), // TypeSpec
        _ => Err(Error::InvalidToken(token)),
    }
}

/// Writes a token as a compressed `TypeDefOrRef` coded index.
///
/// # Errors
///
/// Returns [`crate::Error::InvalidToken`] if the token can not be coded, or
/// [`crate::Error::InvalidSignature`] if the coded index overflows the compressed range.
pub fn write_compressed_token(token: Token, buffer: &mut Vec<u8>) -> Result<()> {
    let coded_index = encode_type_def_or_ref_coded_index(token)?;
    write_compressed_uint(coded_index, buffer)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::file::parser::Parser;

    #[test]
    fn test_write_compressed_uint() {
        let test_cases = vec![
            (0x03, vec![0x03]),
            (0x7F, vec![0x7F]),
            (0x80, vec![0x80, 0x80]),
            (0x2E57, vec![0xAE, 0x57]),
            (0x3FFF, vec![0xBF, 0xFF]),
            (0x4000, vec![0xC0, 0x00, 0x40, 0x00]),
            (0x1FFF_FFFF, vec![0xDF, 0xFF, 0xFF, 0xFF]),
        ];

        for (value, expected) in test_cases {
            let mut buffer = Vec::new();
            write_compressed_uint(value, &mut buffer).unwrap();
            assert_eq!(buffer, expected, "value 0x{value:X}");
        }

        let mut buffer = Vec::new();
        assert!(write_compressed_uint(0x2000_0000, &mut buffer).is_err());
    }

    #[test]
    fn test_write_compressed_int() {
        // Values from ECMA-335 II.23.2
        let test_cases: Vec<(i32, Vec<u8>)> = vec![
            (3, vec![0x06]),
            (-3, vec![0x7B]),
            (64, vec![0x80, 0x80]),
            (-64, vec![0x01]),
            (8192, vec![0xC0, 0x00, 0x40, 0x00]),
            (-8192, vec![0x80, 0x01]),
            (268_435_455, vec![0xDF, 0xFF, 0xFF, 0xFE]),
            (-268_435_456, vec![0xC0, 0x00, 0x00, 0x01]),
        ];

        for (value, expected) in test_cases {
            let mut buffer = Vec::new();
            write_compressed_int(value, &mut buffer).unwrap();
            assert_eq!(buffer, expected, "value {value}");

            let mut parser = Parser::new(&buffer);
            assert_eq!(parser.read_compressed_int().unwrap(), value);
        }

        let mut buffer = Vec::new();
        assert!(write_compressed_int(i32::MIN, &mut buffer).is_err());
    }

    #[test]
    fn test_write_compressed_token() {
        let mut buffer = Vec::new();
        write_compressed_token(Token::new(0x0100_0012), &mut buffer).unwrap();
        write_compressed_token(Token::new(0x1B00_0010), &mut buffer).unwrap();
        write_compressed_token(Token::new(0x0200_0001), &mut buffer).unwrap();
        assert_eq!(buffer, vec![0x49, 0x42, 0x04]);

        assert!(matches!(
            write_compressed_token(Token::new(0x0600_0001), &mut buffer),
            Err(Error::InvalidToken(_))
        ));
    }
}
