//! Assembly identities.
//!
//! - [`AssemblyIdentity`] - name, version, culture and public key token of an assembly
//! - [`AssemblyVersion`] - four-part version number

pub use assembly::{AssemblyIdentity, AssemblyVersion};

mod assembly;
