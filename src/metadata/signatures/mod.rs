//! Type signature model for .NET metadata.
//!
//! Signatures describe types in a compact recursive grammar (ECMA-335 II.23.2). This module
//! holds one node per grammar production in a [`SignatureArena`], addressed by [`SigId`], and
//! provides the operations built on top of that tree.
//!
//! # Node Families
//!
//! - **Terminals** - Declared classes and value types, core library primitives, generic
//!   parameters, the vararg sentinel, function pointers and generic instantiations. A
//!   terminal never has a child.
//! - **Wrappers** - Pointers, by-refs, arrays, custom modifiers, pinned markers, fixed-size
//!   value arrays and module-qualified types. A wrapper has exactly the child it was
//!   constructed with, which may be absent.
//!
//! # Key Components
//!
//! - [`SignatureArena`] / [`TypeSig`] - Node storage and the tagged node type
//! - [`OwnershipResolver`] - Owning module and defining assembly of any node, cycle safe
//! - [`leaf_sig`] / [`chain`] - Iterative walks to the innermost terminal
//! - [`SigComparer`] / [`signature_hash`] - Structural equality and hashing
//! - [`SignatureReader`] / [`SignatureWriter`] - Blob decoder and encoder
//! - [`FullNameFormatter`] - Name rendering in source and reflection spelling
//!
//! # Examples
//!
//! ```rust
//! use dotsig::metadata::identity::{AssemblyIdentity, AssemblyVersion};
//! use dotsig::metadata::signatures::{encode_type_sig, leaf_sig, parse_type_sig, SignatureArena};
//! use dotsig::metadata::typesystem::{CorLibTypes, TypeRegistry};
//!
//! let mut arena = SignatureArena::new();
//! let mut registry = TypeRegistry::new();
//! let corlib = registry.add_assembly(AssemblyIdentity::new("mscorlib", AssemblyVersion::new(4, 0, 0, 0)));
//! let module = registry.add_module("App.dll", None);
//! let types = CorLibTypes::new(&mut arena, &mut registry, module, corlib);
//!
//! // string[]&
//! let blob = [0x10, 0x1D, 0x0E];
//! let id = parse_type_sig(&blob, &mut arena, &types)?.unwrap();
//!
//! assert_eq!(leaf_sig(&arena, id), Some(types.string()));
//! assert_eq!(encode_type_sig(&arena, Some(id))?, blob);
//! # Ok::<(), dotsig::Error>(())
//! ```
//!
//! # References
//!
//! - ECMA-335 6th Edition, Partition II, Section 23.2 - Blobs and Signatures

mod arena;
mod calling;
mod compare;
mod encoder;
mod fullname;
mod ownership;
mod parser;
mod traversal;
mod types;

pub use arena::*;
pub use calling::*;
pub use compare::*;
pub use encoder::*;
pub use fullname::*;
pub use ownership::*;
pub use parser::*;
pub use traversal::*;
pub use types::*;

use crate::{metadata::typesystem::CorLibTypes, Result};

/// Parse a type signature (`TypeSpec` blob or any embedded type) into `arena`
///
/// ## Arguments
/// * 'data' - The input slice to parse
/// * 'arena' - Arena receiving the decoded nodes
/// * 'corlib' - Shared primitive nodes of `arena`
///
/// # Errors
/// Returns an error if the signature data is malformed or parsing fails
pub fn parse_type_sig(
    data: &[u8],
    arena: &mut SignatureArena,
    corlib: &CorLibTypes,
) -> Result<Option<SigId>> {
    SignatureReader::new(data, arena, corlib).read_type()
}

/// Parse a `MethodSig` from a byte slice
///
/// # Errors
/// Returns an error if the signature data is malformed or parsing fails
pub fn parse_method_sig(
    data: &[u8],
    arena: &mut SignatureArena,
    corlib: &CorLibTypes,
) -> Result<MethodSig> {
    SignatureReader::new(data, arena, corlib).read_method_sig()
}

/// Parse a `FieldSig` from a byte slice
///
/// # Errors
/// Returns an error if the signature data is malformed or parsing fails
pub fn parse_field_sig(
    data: &[u8],
    arena: &mut SignatureArena,
    corlib: &CorLibTypes,
) -> Result<FieldSig> {
    SignatureReader::new(data, arena, corlib).read_field_sig()
}

/// Parse a property signature from a byte slice
///
/// # Errors
/// Returns an error if the signature data is malformed or parsing fails
pub fn parse_property_sig(
    data: &[u8],
    arena: &mut SignatureArena,
    corlib: &CorLibTypes,
) -> Result<MethodSig> {
    SignatureReader::new(data, arena, corlib).read_property_sig()
}

/// Parse a `LocalSig` from a byte slice
///
/// # Errors
/// Returns an error if the signature data is malformed or parsing fails
pub fn parse_local_var_sig(
    data: &[u8],
    arena: &mut SignatureArena,
    corlib: &CorLibTypes,
) -> Result<LocalSig> {
    SignatureReader::new(data, arena, corlib).read_local_var_sig()
}

/// Parse a `MethodSpec` instantiation from a byte slice
///
/// # Errors
/// Returns an error if the signature data is malformed or parsing fails
pub fn parse_method_spec_sig(
    data: &[u8],
    arena: &mut SignatureArena,
    corlib: &CorLibTypes,
) -> Result<GenericInstMethodSig> {
    SignatureReader::new(data, arena, corlib).read_method_spec_sig()
}

/// Parse any standalone signature, dispatching on its calling-convention byte
///
/// # Errors
/// Returns an error if the signature data is malformed or parsing fails
pub fn parse_calling_convention_sig(
    data: &[u8],
    arena: &mut SignatureArena,
    corlib: &CorLibTypes,
) -> Result<CallingConventionSig> {
    SignatureReader::new(data, arena, corlib).read_calling_convention_sig()
}

/// Encode a type signature, `None` encodes as `END`
///
/// # Errors
/// Returns an error if a token or an array shape can not be encoded
pub fn encode_type_sig(arena: &SignatureArena, id: Option<SigId>) -> Result<Vec<u8>> {
    let mut writer = SignatureWriter::new(arena);
    writer.write_type(id)?;
    Ok(writer.into_bytes())
}

/// Encode any standalone signature
///
/// # Errors
/// Returns an error if a referenced type can not be encoded
pub fn encode_calling_convention_sig(
    arena: &SignatureArena,
    signature: &CallingConventionSig,
) -> Result<Vec<u8>> {
    let mut writer = SignatureWriter::new(arena);
    writer.write_calling_convention_sig(signature)?;
    Ok(writer.into_bytes())
}
