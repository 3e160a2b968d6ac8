//! Metadata tokens.
//!
//! A token is the 32-bit handle a signature blob uses to name a row of another metadata
//! table: the high byte selects the table, the low 24 bits index the row (1-based, row 0
//! is the null row).

use std::fmt;
use std::hash::{Hash, Hasher};

/// A metadata token representing a reference to a metadata table entry.
///
/// Tokens in .NET metadata consist of a 32-bit value where:
/// - The high byte (bits 24-31) indicates the table type
/// - The low 24 bits (bits 0-23) indicate the row index within that table
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Token(pub u32);

impl Token {
    /// Table byte of the `TypeRef` table
    pub const TYPE_REF: u8 = 0x01;
    /// Table byte of the `TypeDef` table
    pub const TYPE_DEF: u8 = 0x02;
    /// Table byte of the `TypeSpec` table
    pub const TYPE_SPEC: u8 = 0x1B;

    /// Creates a new token from a raw 32-bit value
    #[must_use]
    pub fn new(value: u32) -> Self {
        Token(value)
    }

    /// Builds a token from a table byte and a row index.
    ///
    /// Rows wider than 24 bits are truncated to the row field.
    #[must_use]
    pub fn from_parts(table: u8, row: u32) -> Self {
        Token((u32::from(table) << 24) | (row & 0x00FF_FFFF))
    }

    /// Returns the raw token value
    #[must_use]
    pub fn value(&self) -> u32 {
        self.0
    }

    /// Extracts the table type from the token (high byte)
    #[must_use]
    pub fn table(&self) -> u8 {
        (self.0 >> 24) as u8
    }

    /// Extracts the row index from the token (low 24 bits)
    #[must_use]
    pub fn row(&self) -> u32 {
        self.0 & 0x00FF_FFFF
    }

    /// Returns true if this is a null token (value 0)
    #[must_use]
    pub fn is_null(&self) -> bool {
        self.0 == 0
    }

    /// Returns true if the token targets the `TypeDef` table
    #[must_use]
    pub fn is_type_def(&self) -> bool {
        self.table() == Self::TYPE_DEF
    }

    /// Returns true if the token targets the `TypeRef` table
    #[must_use]
    pub fn is_type_ref(&self) -> bool {
        self.table() == Self::TYPE_REF
    }

    /// Returns true if the token targets the `TypeSpec` table
    #[must_use]
    pub fn is_type_spec(&self) -> bool {
        self.table() == Self::TYPE_SPEC
    }

    /// Returns true if the token can be written as a `TypeDefOrRef` coded index.
    #[must_use]
    pub fn is_type_def_or_ref(&self) -> bool {
        self.is_type_def() || self.is_type_ref() || self.is_type_spec()
    }
}

impl From<u32> for Token {
    fn from(value: u32) -> Self {
        Token(value)
    }
}

impl From<Token> for u32 {
    fn from(token: Token) -> Self {
        token.0
    }
}

impl fmt::Debug for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Token(0x{:08x}, table: 0x{:02x}, row: {})",
            self.0,
            self.table(),
            self.row()
        )
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{:08x}", self.0)
    }
}

impl Hash for Token {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.0.hash(state);
    }
}
