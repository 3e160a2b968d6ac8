//! Assembly display names and versions.
//!
//! Assembly-qualified type names (the reflection spelling produced by
//! [`crate::metadata::signatures::FullNameFormatter`]) end with the display name of the
//! defining assembly, e.g. `mscorlib, Version=4.0.0.0, Culture=neutral,
//! PublicKeyToken=b77a5c561934e089`. This module models that identity and converts it from
//! and to its display form.

use std::fmt::{self, Write};

use crate::Result;

/// Identity of an assembly as it appears in an assembly-qualified name.
///
/// Two identities are equal when all four components are equal. A `None` culture is the
/// culture-neutral assembly and a `None` token is an assembly without a strong name.
///
/// # Examples
///
/// ```rust
/// use dotsig::metadata::identity::{AssemblyIdentity, AssemblyVersion};
///
/// let identity = AssemblyIdentity::parse(
///     "mscorlib, Version=4.0.0.0, Culture=neutral, PublicKeyToken=b77a5c561934e089",
/// )?;
/// assert_eq!(identity.name, "mscorlib");
/// assert_eq!(identity.version, AssemblyVersion::new(4, 0, 0, 0));
/// assert!(identity.culture.is_none());
/// # Ok::<(), dotsig::Error>(())
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct AssemblyIdentity {
    /// Simple assembly name (e.g., "mscorlib", "System.Core").
    pub name: String,
    /// Four-part version number.
    pub version: AssemblyVersion,
    /// Culture of a satellite assembly, `None` for culture-neutral assemblies.
    pub culture: Option<String>,
    /// 8-byte public key token in display order, `None` for assemblies without strong name.
    pub public_key_token: Option<[u8; 8]>,
}

impl AssemblyIdentity {
    /// Creates a culture-neutral identity without strong name.
    ///
    /// # Arguments
    /// * `name` - Simple assembly name
    /// * `version` - Four-part version
    #[must_use]
    pub fn new(name: impl Into<String>, version: AssemblyVersion) -> Self {
        AssemblyIdentity {
            name: name.into(),
            version,
            culture: None,
            public_key_token: None,
        }
    }

    /// Sets the public key token.
    #[must_use]
    pub fn with_public_key_token(mut self, token: [u8; 8]) -> Self {
        self.public_key_token = Some(token);
        self
    }

    /// Sets the culture. `"neutral"` is stored as `None`.
    #[must_use]
    pub fn with_culture(mut self, culture: &str) -> Self {
        self.culture = if culture == "neutral" || culture.is_empty() {
            None
        } else {
            Some(culture.to_string())
        };
        self
    }

    /// Parse an assembly display name.
    ///
    /// The simple name comes first, followed by optional comma separated `Version=`,
    /// `Culture=` and `PublicKeyToken=` components in any order. Unknown components are
    /// ignored.
    ///
    /// # Errors
    /// Returns [`crate::Error::Malformed`] for an empty name, an invalid version or a
    /// token that is not 16 hex characters.
    pub fn parse(display_name: &str) -> Result<Self> {
        let mut parts = display_name.split(',').map(str::trim);

        let name = parts.next().unwrap_or_default();
        if name.is_empty() {
            return Err(malformed_error!("Assembly name cannot be empty"));
        }

        let mut identity = AssemblyIdentity::new(name, AssemblyVersion::new(0, 0, 0, 0));
        for part in parts {
            if let Some(value) = part.strip_prefix("Version=") {
                identity.version = AssemblyVersion::parse(value)?;
            } else if let Some(value) = part.strip_prefix("Culture=") {
                identity = identity.with_culture(value);
            } else if let Some(value) = part.strip_prefix("PublicKeyToken=") {
                if value != "null" && !value.is_empty() {
                    identity.public_key_token = Some(parse_public_key_token(value)?);
                }
            }
        }

        Ok(identity)
    }

    /// Generate the display name of this identity.
    ///
    /// All components are always written, using `neutral` and `null` for absent culture
    /// and token.
    #[must_use]
    pub fn display_name(&self) -> String {
        // Typical format: "Name, Version=x.x.x.x, Culture=neutral, PublicKeyToken=xxxxxxxxxxxxxxxx"
        let mut result = String::with_capacity(self.name.len() + 80);

        result.push_str(&self.name);
        let _ = write!(result, ", Version={}", self.version);
        let _ = write!(
            result,
            ", Culture={}",
            self.culture.as_deref().unwrap_or("neutral")
        );

        result.push_str(", PublicKeyToken=");
        match &self.public_key_token {
            Some(token) => {
                for byte in token {
                    let _ = write!(result, "{byte:02x}");
                }
            }
            None => result.push_str("null"),
        }

        result
    }
}

impl fmt::Display for AssemblyIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.display_name())
    }
}

fn parse_public_key_token(value: &str) -> Result<[u8; 8]> {
    if value.len() != 16 || !value.is_ascii() {
        return Err(malformed_error!(
            "PublicKeyToken must be exactly 16 hex characters, got '{}'",
            value
        ));
    }

    let mut token = [0u8; 8];
    for (index, byte) in token.iter_mut().enumerate() {
        let digits = &value[index * 2..index * 2 + 2];
        *byte = u8::from_str_radix(digits, 16)
            .map_err(|_| malformed_error!("Invalid hex in PublicKeyToken '{}'", value))?;
    }

    Ok(token)
}

/// Four-part version numbering for .NET assemblies.
///
/// Versions are compared component-wise in order: major, minor, build, revision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct AssemblyVersion {
    /// Major version component.
    pub major: u16,
    /// Minor version component.
    pub minor: u16,
    /// Build version component.
    pub build: u16,
    /// Revision version component.
    pub revision: u16,
}

impl AssemblyVersion {
    /// Create a new version from its four components.
    #[must_use]
    pub const fn new(major: u16, minor: u16, build: u16, revision: u16) -> Self {
        AssemblyVersion {
            major,
            minor,
            build,
            revision,
        }
    }

    /// Parse a dotted version with one to four components. Missing components are zero.
    ///
    /// # Errors
    /// Returns [`crate::Error::Malformed`] if there are more than four components or a
    /// component is not a 16-bit unsigned number.
    pub fn parse(version_str: &str) -> Result<Self> {
        let parts: Vec<&str> = version_str.split('.').collect();

        if parts.len() > 4 {
            return Err(malformed_error!("Invalid version format: {}", version_str));
        }

        let mut components = [0u16; 4];
        for (i, part) in parts.iter().enumerate() {
            components[i] = part
                .parse::<u16>()
                .map_err(|_| malformed_error!("Invalid version component: {}", part))?;
        }

        Ok(Self::new(
            components[0],
            components[1],
            components[2],
            components[3],
        ))
    }
}

impl fmt::Display for AssemblyVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}.{}.{}.{}",
            self.major, self.minor, self.build, self.revision
        )
    }
}
