//! Bounds applied while decoding, resolving and rendering signatures
//!
//! Signature blobs and the type references they name come from untrusted input. Every
//! recursive walk in this crate is capped by one of the limits below, so a crafted blob or a
//! self-referential `TypeSpec` degrades to an error or an absent result instead of
//! exhausting the stack.

/// Configuration of the recursion and size bounds used across the crate.
///
/// [`crate::metadata::signatures::SignatureReader`],
/// [`crate::metadata::signatures::SignatureWriter`],
/// [`crate::metadata::signatures::OwnershipResolver`],
/// [`crate::metadata::signatures::FullNameFormatter`] and
/// [`crate::metadata::signatures::SigComparer`] all accept it through a `with_limits`
/// builder method.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SignatureLimits {
    /// Maximum nesting depth of a decoded or encoded type signature (default: 50)
    pub max_decode_depth: usize,

    /// Maximum number of steps of one walk over a signature graph (default: 4096)
    ///
    /// The ownership resolver counts each wrapper, `TypeSpec` indirection and nested `TypeRef`
    /// scope as one hop. Comparing, hashing and rendering count each visited node.
    pub max_resolution_steps: usize,

    /// Maximum recursion depth while rendering names or comparing signatures (default: 100)
    pub max_format_depth: usize,

    /// Maximum rank accepted for a multi-dimensional array (default: 64)
    pub max_array_rank: u32,
}

impl Default for SignatureLimits {
    fn default() -> Self {
        Self {
            max_decode_depth: 50,
            max_resolution_steps: 4096,
            max_format_depth: 100,
            max_array_rank: 64,
        }
    }
}

impl SignatureLimits {
    /// Creates a configuration with tight bounds for hostile input
    ///
    /// Legitimate signatures rarely nest deeper than a handful of levels; this preset still
    /// accepts everything the C# and F# compilers emit.
    #[must_use]
    pub fn strict() -> Self {
        Self {
            max_decode_depth: 16,
            max_resolution_steps: 256,
            max_format_depth: 32,
            max_array_rank: 32,
        }
    }

    /// Creates a configuration with generous bounds
    ///
    /// **Warning**: deep limits trade stack usage for completeness. Only use this on
    /// input known to be well-formed.
    #[must_use]
    pub fn permissive() -> Self {
        Self {
            max_decode_depth: 200,
            max_resolution_steps: 1 << 20,
            max_format_depth: 400,
            max_array_rank: 255,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_signature_limits_default() {
        let limits = SignatureLimits::default();
        assert_eq!(limits.max_decode_depth, 50);
        assert_eq!(limits.max_resolution_steps, 4096);
        assert_eq!(limits.max_format_depth, 100);
        assert_eq!(limits.max_array_rank, 64);
    }

    #[test]
    fn test_signature_limits_presets_are_ordered() {
        let strict = SignatureLimits::strict();
        let default = SignatureLimits::default();
        let permissive = SignatureLimits::permissive();

        assert!(strict.max_decode_depth < default.max_decode_depth);
        assert!(default.max_decode_depth < permissive.max_decode_depth);
        assert!(strict.max_resolution_steps < default.max_resolution_steps);
        assert!(default.max_resolution_steps < permissive.max_resolution_steps);
        assert!(strict.max_format_depth < permissive.max_format_depth);
        assert!(strict.max_array_rank < permissive.max_array_rank);
    }
}
