//! # dotsig Prelude
//!
//! This module provides a convenient prelude for the most commonly used types and traits
//! from the dotsig library. Import this module to get quick access to the essential
//! types for working with type signatures.

// ================================================================================================
// Core Types and Error Handling
// ================================================================================================

/// The main error type for all dotsig operations
pub use crate::Error;

/// The result type used throughout dotsig
pub use crate::Result;

/// Bounds applied while decoding, resolving and rendering
pub use crate::metadata::limits::SignatureLimits;

// ================================================================================================
// Signature Model
// ================================================================================================

/// Node storage, node ids and the node type
pub use crate::metadata::signatures::{SigId, SignatureArena, SignatureTag, TypeSig};

/// Node payloads
pub use crate::metadata::signatures::{ArraySig, GenericInstSig, ModifierSig};

/// Calling-convention signatures
pub use crate::metadata::signatures::{
    CallingConvention, CallingConventionKind, CallingConventionSig, FieldSig,
    GenericInstMethodSig, LocalSig, MethodSig,
};

// ================================================================================================
// Operations
// ================================================================================================

/// Traversal
pub use crate::metadata::signatures::{chain, leaf_sig, remove_modifiers, remove_pinned_and_modifiers};

/// Ownership resolution, comparison and naming
pub use crate::metadata::signatures::{
    signature_hash, FullNameFormatter, OwnershipResolver, SigComparer, TypeNameStyle,
};

/// Blob decoding and encoding
pub use crate::metadata::signatures::{
    encode_calling_convention_sig, encode_type_sig, parse_calling_convention_sig,
    parse_type_sig, SignatureReader, SignatureWriter,
};

// ================================================================================================
// Type References
// ================================================================================================

/// Table entries behind tokens
pub use crate::metadata::typesystem::{
    CorLibPrimitive, CorLibTypes, ResolutionScope, TypeReference, TypeReferenceSource,
    TypeRegistry,
};

/// Assembly identities
pub use crate::metadata::identity::{AssemblyIdentity, AssemblyVersion};

/// Metadata tokens
pub use crate::metadata::token::Token;
