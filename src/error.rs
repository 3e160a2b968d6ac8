use thiserror::Error;

use crate::metadata::token::Token;

macro_rules! malformed_error {
    // Single string version
    ($msg:expr) => {
        crate::Error::Malformed {
            message: $msg.to_string(),
            file: file!(),
            line: line!(),
        }
    };

    // Format string with arguments version
    ($fmt:expr, $($arg:tt)*) => {
        crate::Error::Malformed {
            message: format!($fmt, $($arg)*),
            file: file!(),
            line: line!(),
        }
    };
}

/// The generic Error type, which provides coverage for all errors this library can potentially
/// return.
///
/// Only the codec surfaces (decoding, encoding) and the type registry produce errors. The
/// derived model operations (ownership resolution, traversal, name rendering) degrade to
/// `None` or empty output on malformed data instead; their checked `try_*` variants are the
/// only other place an [`Error`] is produced.
///
/// # Error Categories
///
/// ## Blob Decoding Errors
/// - [`Error::Malformed`] - Corrupted or invalid signature structure
/// - [`Error::OutOfBounds`] - Attempted to read beyond the end of the blob
/// - [`Error::RecursionLimit`] - Nesting or reference chain exceeded its configured bound
///
/// ## Type Reference Errors
/// - [`Error::TypeInsert`] - Token does not fit the table of the inserted reference
/// - [`Error::TypeNotFound`] - Requested token is not present in the registry
/// - [`Error::CyclicReference`] - A type reference chain revisited the named token
///
/// ## Encoding Errors
/// - [`Error::InvalidToken`] - Token cannot be written as a `TypeDefOrRef` coded index
/// - [`Error::InvalidSignature`] - Node shape cannot be written to a blob
///
/// # Examples
///
/// ```rust
/// use dotsig::{Error, Parser};
///
/// // A 4-byte compressed integer header with no payload
/// let mut parser = Parser::new(&[0xC0]);
/// match parser.read_compressed_uint() {
///     Err(Error::OutOfBounds) => println!("blob was truncated"),
///     Err(Error::Malformed { message, file, line }) => {
///         eprintln!("Malformed blob: {} ({}:{})", message, file, line);
///     }
///     Err(e) => eprintln!("Other error: {}", e),
///     Ok(value) => println!("decoded {}", value),
/// }
/// ```
#[derive(Error, Debug)]
pub enum Error {
    /// The blob is damaged and could not be decoded.
    ///
    /// The error includes the source location where the malformation was detected for
    /// debugging purposes.
    ///
    /// # Fields
    ///
    /// * `message` - Detailed description of what was malformed
    /// * `file` - Source file where the error was detected
    /// * `line` - Source line where the error was detected
    #[error("Malformed - {file}:{line}: {message}")]
    Malformed {
        /// The message to be printed for the Malformed error
        message: String,
        /// The source file in which this error occured
        file: &'static str,
        /// The source line in which this error occured
        line: u32,
    },

    /// An out of bound access was attempted while decoding a blob.
    ///
    /// This error occurs when trying to read data beyond the end of the blob.
    #[error("Out of Bound read would have occurred!")]
    OutOfBounds,

    /// Recursion limit reached.
    ///
    /// Signature nesting, reference chains and formatting recursion are all bounded. The
    /// associated value shows the limit that was reached.
    #[error("Reach the maximum recursion level allowed - {0}")]
    RecursionLimit(usize),

    /// A type reference chain points back to a reference that is already being resolved.
    ///
    /// Typically produced by a `TypeSpec` whose signature wraps a reference to the same
    /// `TypeSpec`. The associated [`Token`] is the first revisited reference.
    #[error("Cyclic type reference detected - {0}")]
    CyclicReference(Token),

    /// Failed to insert a new reference into the `TypeRegistry`.
    ///
    /// The associated [`Token`] either targets a table that does not match the reference
    /// kind, or is already occupied.
    #[error("Failed to insert new type into TypeRegistry - {0}")]
    TypeInsert(Token),

    /// Failed to find a reference in the `TypeRegistry`.
    #[error("Failed to find type in TypeRegistry - {0}")]
    TypeNotFound(Token),

    /// The token is not a `TypeDef`, `TypeRef` or `TypeSpec` token and can not be written
    /// as a `TypeDefOrRef` coded index.
    #[error("Token can not be encoded as TypeDefOrRef - {0}")]
    InvalidToken(Token),

    /// A node or calling convention signature can not be represented in a blob.
    #[error("{0}")]
    InvalidSignature(String),
}
