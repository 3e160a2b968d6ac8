//! Low-level blob access for signature decoding.
//!
//! This module provides the cursor-based [`crate::file::parser::Parser`] used by the signature
//! decoder. It offers bounds-checked byte access together with the compressed integer and
//! compressed token encodings defined by ECMA-335 II.23.2.

pub mod parser;
