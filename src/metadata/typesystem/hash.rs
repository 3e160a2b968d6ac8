//! Structural hashing of type signatures.
//!
//! This module provides the `TypeSignatureHash` builder used by
//! [`crate::metadata::signatures::signature_hash`]. The hash function uses FNV-1a inspired
//! sequential mixing, so it is order sensitive and components never cancel each other out
//! the way XOR-based combination does.
//!
//! # Hash Design
//!
//! A signature is hashed by feeding, in pre-order:
//! - **Tag**: The grammar production of each node
//! - **Payload**: Tokens, generic parameter numbers, array shapes, sizes and indices
//! - **Structure**: Argument counts and absent-child markers, so `List<A,B>` and
//!   `List<A>` of `B` can not collide by concatenation
//!
//! # Example Usage
//!
//! ```rust
//! use dotsig::metadata::signatures::SignatureTag;
//! use dotsig::metadata::token::Token;
//! use dotsig::metadata::typesystem::TypeSignatureHash;
//!
//! let hash = TypeSignatureHash::new()
//!     .add_tag(SignatureTag::Class)
//!     .add_token(&Token::new(0x0100_0001))
//!     .finalize();
//! assert_ne!(hash, TypeSignatureHash::new().finalize());
//! ```

use std::hash::{DefaultHasher, Hash, Hasher};

use crate::metadata::{signatures::SignatureTag, token::Token};

/// High-quality hash builder for type signatures using FNV-1a inspired mixing
///
/// Each component is mixed into the hash state in a way that preserves order and prevents
/// self-cancellation.
pub struct TypeSignatureHash {
    /// Current hash state using FNV-1a algorithm principles
    state: u64,
}

impl TypeSignatureHash {
    /// Create a new signature hash builder
    ///
    /// Initializes with FNV-1a offset basis for good hash distribution
    #[must_use]
    pub fn new() -> Self {
        TypeSignatureHash {
            state: 0xcbf2_9ce4_8422_2325_u64, // FNV-1a 64-bit offset basis
        }
    }

    /// Mix a 64-bit value into the hash state using enhanced algorithm with better avalanche
    fn mix(&mut self, value: u64) {
        self.state ^= value;
        self.state = self.state.wrapping_mul(0x0100_0000_01b3_u64); // FNV-1a 64-bit prime

        // Additional mixing for better avalanche properties
        self.state ^= self.state >> 33;
        self.state = self.state.wrapping_mul(0xff51_afd7_ed55_8ccd_u64);
        self.state ^= self.state >> 33;
    }

    /// Add a hashable component to the signature
    ///
    /// ## Arguments
    /// * `component` - Any hashable component to include in the signature
    #[must_use]
    pub fn add_component<T: Hash + ?Sized>(mut self, component: &T) -> Self {
        let mut hasher = DefaultHasher::new();
        component.hash(&mut hasher);
        self.mix(hasher.finish());
        self
    }

    /// Add a node tag to the signature
    ///
    /// The tag distinguishes productions with identical payloads, e.g. a required and an
    /// optional modifier of the same type.
    #[must_use]
    pub fn add_tag(mut self, tag: SignatureTag) -> Self {
        self.mix(0x100 | tag as u64);
        self
    }

    /// Add a raw number (generic parameter index, rank, size, count, ...)
    #[must_use]
    pub fn add_u64(mut self, value: u64) -> Self {
        self.mix(value);
        self
    }

    /// Add a token to the signature
    ///
    /// ## Arguments
    /// * `token` - The metadata token to include in the signature
    #[must_use]
    pub fn add_token(mut self, token: &Token) -> Self {
        self.mix(u64::from(token.value()) | (1 << 40));
        self
    }

    /// Add the marker used in place of an absent child
    #[must_use]
    pub fn add_absent(mut self) -> Self {
        self.mix(u64::MAX);
        self
    }

    /// Finalize the hash and return the computed signature
    ///
    /// ## Returns
    /// A 64-bit hash value representing the complete type signature
    #[must_use]
    pub fn finalize(self) -> u64 {
        self.state
    }
}

impl Default for TypeSignatureHash {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_deterministic() {
        let hash1 = TypeSignatureHash::new()
            .add_tag(SignatureTag::Class)
            .add_token(&Token::new(0x0100_0001))
            .finalize();

        let hash2 = TypeSignatureHash::new()
            .add_tag(SignatureTag::Class)
            .add_token(&Token::new(0x0100_0001))
            .finalize();

        assert_eq!(hash1, hash2, "Hash should be deterministic");
    }

    #[test]
    fn test_hash_order_sensitive() {
        let hash1 = TypeSignatureHash::new()
            .add_component(&"first")
            .add_component(&"second")
            .finalize();

        let hash2 = TypeSignatureHash::new()
            .add_component(&"second")
            .add_component(&"first")
            .finalize();

        assert_ne!(hash1, hash2, "Hash should be order-sensitive");
    }

    #[test]
    fn test_tag_differentiation() {
        let token = Token::new(0x0100_0005);
        let required = TypeSignatureHash::new()
            .add_tag(SignatureTag::CModReqd)
            .add_token(&token)
            .finalize();
        let optional = TypeSignatureHash::new()
            .add_tag(SignatureTag::CModOpt)
            .add_token(&token)
            .finalize();

        assert_ne!(
            required, optional,
            "Different tags should produce different hashes"
        );
    }

    #[test]
    fn test_collision_resistance() {
        let tokens = [
            Token::new(0x0100_0001),
            Token::new(0x0100_0002),
            Token::new(0x0200_0001),
            Token::new(0x1B00_0001),
        ];

        let hashes: Vec<u64> = tokens
            .iter()
            .map(|token| {
                TypeSignatureHash::new()
                    .add_tag(SignatureTag::Class)
                    .add_token(token)
                    .finalize()
            })
            .collect();

        for i in 0..hashes.len() {
            for j in (i + 1)..hashes.len() {
                assert_ne!(hashes[i], hashes[j], "Different tokens should differ");
            }
        }
    }
}
