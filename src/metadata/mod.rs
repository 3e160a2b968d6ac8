//! Type signature metadata for .NET assemblies.
//!
//! This module contains the signature model and everything it resolves against. It follows
//! the ECMA-335 standard for blob layouts and token encodings.
//!
//! # Key Components
//!
//! - [`signatures`] - Signature nodes, traversal, ownership, codec and name rendering
//! - [`typesystem`] - Type references behind tokens and the core-library primitives
//! - [`token`] - Metadata table row references used throughout .NET
//! - [`identity`] - Assembly names and versions
//! - [`limits`] - Bounds for every recursive walk
//!
//! # Examples
//!
//! ```rust
//! use dotsig::metadata::{signatures::SignatureArena, token::Token};
//!
//! let mut arena = SignatureArena::new();
//! let class = arena.class(Token::new(0x0200_0001));
//! let array = arena.sz_array(class);
//! assert_eq!(arena.next(array), Some(class));
//! ```

/// Assembly identities referenced by resolution scopes
pub mod identity;

/// Recursion and size bounds
pub mod limits;

/// Type signature model
pub mod signatures;

/// Commonly used metadata token type
pub mod token;

/// Type references and core-library primitives
pub mod typesystem;
