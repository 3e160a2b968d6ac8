//! Type reference model behind signature tokens.
//!
//! Signature nodes name declared types and type specifications by [`crate::metadata::token::Token`].
//! This module provides what those tokens resolve to, and the primitive types of the core
//! library that blobs spell without a token.
//!
//! # Key Components
//!
//! - [`TypeRegistry`]: Table of assemblies, modules and type references
//! - [`TypeReferenceSource`]: The lookup contract consumed by ownership resolution and naming
//! - [`CorLibPrimitive`]: Built-in primitive types (int32, string, object, etc.)
//! - [`CorLibTypes`]: One shared signature node per primitive
//! - [`TypeSignatureHash`]: Order sensitive hash builder for structural signature hashing
//! - [`ELEMENT_TYPE`]: Element type bytes of the signature grammar
//!
//! # Examples
//!
//! ```rust
//! use dotsig::metadata::identity::{AssemblyIdentity, AssemblyVersion};
//! use dotsig::metadata::signatures::SignatureArena;
//! use dotsig::metadata::typesystem::{CorLibPrimitive, CorLibTypes, TypeRegistry};
//!
//! let mut arena = SignatureArena::new();
//! let mut registry = TypeRegistry::new();
//! let corlib = registry.add_assembly(AssemblyIdentity::new("mscorlib", AssemblyVersion::new(4, 0, 0, 0)));
//! let module = registry.add_module("App.dll", None);
//!
//! let types = CorLibTypes::new(&mut arena, &mut registry, module, corlib);
//! assert_eq!(types.get(CorLibPrimitive::I4), types.int32());
//! ```

mod base;
mod corlib;
mod hash;
mod registry;

pub use base::{CorLibPrimitive, ELEMENT_TYPE};
pub use corlib::CorLibTypes;
pub use hash::TypeSignatureHash;
pub use registry::{
    AssemblyId, ModuleDef, ModuleId, ResolutionScope, TypeReference, TypeReferenceSource,
    TypeRegistry,
};
