// Copyright 2025 Johann Kempter
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.
//
// SPDX-License-Identifier: Apache-2.0

#![doc(html_no_source)]
#![deny(missing_docs)]
#![deny(unsafe_code)]

//! # dotsig
//!
//! The type-signature model of .NET metadata (ECMA-335 II.23.2), in pure Rust.
//!
//! `dotsig` represents every type signature production as a node of a tagged union stored in
//! an arena, and provides the operations that tools built on metadata need on top of it:
//! ownership resolution that survives self-referential type specifications, iterative
//! traversal to the innermost terminal, a bit-exact blob decoder and encoder, structural
//! comparison and hashing, and name rendering in source and reflection spelling.
//!
//! ## Features
//!
//! - **🌳 Arena-backed nodes** - Stable `u32` ids, no reference counting, no cycles by construction
//! - **🛡️ Bounded walks** - Every recursive or chained walk is capped by [`metadata::limits::SignatureLimits`]
//! - **🔁 Bit-exact codec** - Decode and re-encode blobs, absent nodes included
//! - **🏷️ Name rendering** - `List`1<System.Int32>` and `List`1[[System.Int32, mscorlib, ...]]`
//!
//! ## Quick Start
//!
//! ```rust
//! use dotsig::prelude::*;
//!
//! let mut registry = TypeRegistry::new();
//! let corlib = registry.add_assembly(AssemblyIdentity::new("mscorlib", AssemblyVersion::new(4, 0, 0, 0)));
//! let app = registry.add_assembly(AssemblyIdentity::new("App", AssemblyVersion::new(1, 0, 0, 0)));
//! let module = registry.add_module("App.dll", Some(app));
//!
//! let mut arena = SignatureArena::new();
//! let types = CorLibTypes::new(&mut arena, &mut registry, module, corlib);
//!
//! // int32[,]*
//! let id = parse_type_sig(&[0x0F, 0x14, 0x08, 0x02, 0x00, 0x00], &mut arena, &types)?.unwrap();
//!
//! assert_eq!(leaf_sig(&arena, id), Some(types.int32()));
//! assert_eq!(FullNameFormatter::new(&arena, &registry).full_name(id), "System.Int32[,]*");
//!
//! let resolver = OwnershipResolver::new(&arena, &registry);
//! assert_eq!(resolver.defining_assembly(id), Some(corlib));
//! # Ok::<(), dotsig::Error>(())
//! ```
//!
//! ## Architecture
//!
//! - [`prelude`] - Convenient re-exports of commonly used types and traits
//! - [`metadata::signatures`] - The node model, traversal, ownership, codec and naming
//! - [`metadata::typesystem`] - Type references, core-library primitives and element types
//! - [`metadata::identity`] - Assembly identities
//! - [`metadata::limits`] - Recursion and size bounds
//! - [`utils`] - Compressed integer and coded index encoding
//! - [`Error`] and [`Result`] - Error handling
//!
//! ## Logging
//!
//! Diagnostics are emitted through [`tracing`]. The crate never installs a subscriber; attach
//! one in your application to see cycle and recursion warnings from ownership resolution.
//!
//! ## Development and Testing
//!
//! ### Fuzzing
//!
//! ```bash
//! cargo install cargo-fuzz
//! cargo +nightly fuzz run signature --release
//! ```
//!
//! ### Testing
//!
//! ```bash
//! cargo test
//! cargo bench
//! ```
#[macro_use]
pub(crate) mod error;
pub(crate) mod file;

/// Convenient re-exports of the most commonly used types and traits.
///
/// # Example
///
/// ```rust
/// use dotsig::prelude::*;
///
/// let mut arena = SignatureArena::new();
/// let var = arena.var(0);
/// let ptr = arena.ptr(var);
/// assert_eq!(leaf_sig(&arena, ptr), Some(var));
/// ```
pub mod prelude;

/// Type signatures, type references and the limits that bound their processing
pub mod metadata;

/// Encoding helpers shared by the signature writer
pub mod utils;

/// `dotsig` Result type
///
/// A type alias for `std::result::Result<T, Error>` where the error type is always
/// [`Error`]. Used consistently throughout the crate for all fallible operations.
pub type Result<T> = std::result::Result<T, Error>;

/// `dotsig` Error type
///
/// The main error type for all operations in this crate. Derived model operations
/// (ownership, traversal, rendering) do not return it; they degrade to absent results
/// instead.
///
/// # Example
///
/// ```rust
/// use dotsig::{metadata::signatures::SignatureArena, prelude::*, Error};
///
/// let mut arena = SignatureArena::new();
/// let mut registry = TypeRegistry::new();
/// let corlib = registry.add_assembly(AssemblyIdentity::new("mscorlib", AssemblyVersion::new(4, 0, 0, 0)));
/// let module = registry.add_module("App.dll", None);
/// let types = CorLibTypes::new(&mut arena, &mut registry, module, corlib);
///
/// match parse_type_sig(&[0x0F], &mut arena, &types) {
///     Err(Error::OutOfBounds) => println!("truncated blob"),
///     Err(e) => println!("Error: {}", e),
///     Ok(id) => println!("decoded {:?}", id),
/// }
/// ```
pub use error::Error;

/// Provides access to the low-level blob reader.
///
/// The [`Parser`] type decodes the compressed integers and tokens of signature blobs.
///
/// # Example
///
/// ```rust
/// use dotsig::Parser;
///
/// let mut parser = Parser::new(&[0x81, 0x00]);
/// assert_eq!(parser.read_compressed_uint()?, 0x100);
/// # Ok::<(), dotsig::Error>(())
/// ```
pub use file::parser::Parser;
