use strum::{EnumCount, EnumIter};

#[allow(non_snake_case, dead_code, missing_docs)]
/// Possible bytes that represent varioud 'Types' for a signature - from coreclr
pub mod ELEMENT_TYPE {
    //Marks end of a list
    pub const END: u8 = 0x00;
    pub const VOID: u8 = 0x01;
    pub const BOOLEAN: u8 = 0x02;
    pub const CHAR: u8 = 0x03;
    pub const I1: u8 = 0x04;
    pub const U1: u8 = 0x05;
    pub const I2: u8 = 0x06;
    pub const U2: u8 = 0x07;
    pub const I4: u8 = 0x08;
    pub const U4: u8 = 0x09;
    pub const I8: u8 = 0x0a;
    pub const U8: u8 = 0x0b;
    pub const R4: u8 = 0x0c;
    pub const R8: u8 = 0x0d;
    pub const STRING: u8 = 0x0e;
    // Followed by type
    pub const PTR: u8 = 0x0f;
    // Followed by type
    pub const BYREF: u8 = 0x10;
    // Followed by TypeDef or TypeRef token
    pub const VALUETYPE: u8 = 0x11;
    // Followed by TypeDef or TypeRef token
    pub const CLASS: u8 = 0x12;
    // Generic parameter in a generic type definition, represented as number
    pub const VAR: u8 = 0x13;
    // type rank boundsCount bound1 … loCount lo1 …
    pub const ARRAY: u8 = 0x14;
    // Generic type instantiation. Followed by type type-arg-count type-1 ... type-n
    pub const GENERICINST: u8 = 0x15;
    pub const TYPEDBYREF: u8 = 0x16;
    // Fixed size inline array: followed by type and compressed size
    pub const VALUEARRAY: u8 = 0x17;
    // System.IntPtr
    pub const I: u8 = 0x18;
    // System.UIntPtr
    pub const U: u8 = 0x19;
    // Followed by full method signature
    pub const FNPTR: u8 = 0x1b;
    // System.Object
    pub const OBJECT: u8 = 0x1c;
    // Single-dim array with 0 lower bound
    pub const SZARRAY: u8 = 0x1d;
    // Generic parameter in a generic method definition,represented as number
    pub const MVAR: u8 = 0x1e;
    // Required modifier : followed by a TypeDef or TypeRef token
    pub const CMOD_REQD: u8 = 0x1f;
    // Optional modifier : followed by a TypeDef or TypeRef token
    pub const CMOD_OPT: u8 = 0x20;
    // Implemented within the CLI
    pub const INTERNAL: u8 = 0x21;
    // Module qualified type: followed by compressed module index and type
    pub const MODULE: u8 = 0x3f;
    // Or’d with following element types
    pub const MODIFIER: u8 = 0x40;
    // Sentinel for vararg method signature
    pub const SENTINEL: u8 = 0x41;
    // Denotes a local variable that points at a pinned object
    pub const PINNED: u8 = 0x45;
}

/// Types of the core library that a signature names by element type alone.
///
/// Each primitive has a dedicated element-type byte and is spelled without a token in the
/// blob. [`crate::metadata::typesystem::CorLibTypes`] maps every primitive to one shared
/// signature node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, EnumCount)]
pub enum CorLibPrimitive {
    /// System.Void - represents no value
    Void,
    /// System.Boolean - true/false value
    Boolean,
    /// System.Char - Unicode 16-bit character
    Char,
    /// System.SByte - signed 8-bit integer
    I1,
    /// System.Byte - unsigned 8-bit integer
    U1,
    /// System.Int16 - signed 16-bit integer
    I2,
    /// System.UInt16 - unsigned 16-bit integer
    U2,
    /// System.Int32 - signed 32-bit integer
    I4,
    /// System.UInt32 - unsigned 32-bit integer
    U4,
    /// System.Int64 - signed 64-bit integer
    I8,
    /// System.UInt64 - unsigned 64-bit integer
    U8,
    /// System.Single - 32-bit floating point
    R4,
    /// System.Double - 64-bit floating point
    R8,
    /// System.String - immutable string of Unicode characters
    String,
    /// System.TypedReference - type-safe pointer (used by compiler)
    TypedReference,
    /// System.IntPtr - native sized signed integer
    I,
    /// System.UIntPtr - native sized unsigned integer
    U,
    /// System.Object - base class for all reference types
    Object,
}

impl CorLibPrimitive {
    /// Get the byte representation in type signatures (per ECMA-335 spec)
    #[must_use]
    pub fn element_type(self) -> u8 {
        match self {
            CorLibPrimitive::Void => ELEMENT_TYPE::VOID,
            CorLibPrimitive::Boolean => ELEMENT_TYPE::BOOLEAN,
            CorLibPrimitive::Char => ELEMENT_TYPE::CHAR,
            CorLibPrimitive::I1 => ELEMENT_TYPE::I1,
            CorLibPrimitive::U1 => ELEMENT_TYPE::U1,
            CorLibPrimitive::I2 => ELEMENT_TYPE::I2,
            CorLibPrimitive::U2 => ELEMENT_TYPE::U2,
            CorLibPrimitive::I4 => ELEMENT_TYPE::I4,
            CorLibPrimitive::U4 => ELEMENT_TYPE::U4,
            CorLibPrimitive::I8 => ELEMENT_TYPE::I8,
            CorLibPrimitive::U8 => ELEMENT_TYPE::U8,
            CorLibPrimitive::R4 => ELEMENT_TYPE::R4,
            CorLibPrimitive::R8 => ELEMENT_TYPE::R8,
            CorLibPrimitive::String => ELEMENT_TYPE::STRING,
            CorLibPrimitive::TypedReference => ELEMENT_TYPE::TYPEDBYREF,
            CorLibPrimitive::I => ELEMENT_TYPE::I,
            CorLibPrimitive::U => ELEMENT_TYPE::U,
            CorLibPrimitive::Object => ELEMENT_TYPE::OBJECT,
        }
    }

    /// Try to map a signature byte to a primitive
    ///
    /// ## Arguments
    /// * `byte` - The element type to map
    #[must_use]
    pub fn from_element_type(byte: u8) -> Option<Self> {
        match byte {
            ELEMENT_TYPE::VOID => Some(CorLibPrimitive::Void),
            ELEMENT_TYPE::BOOLEAN => Some(CorLibPrimitive::Boolean),
            ELEMENT_TYPE::CHAR => Some(CorLibPrimitive::Char),
            ELEMENT_TYPE::I1 => Some(CorLibPrimitive::I1),
            ELEMENT_TYPE::U1 => Some(CorLibPrimitive::U1),
            ELEMENT_TYPE::I2 => Some(CorLibPrimitive::I2),
            ELEMENT_TYPE::U2 => Some(CorLibPrimitive::U2),
            ELEMENT_TYPE::I4 => Some(CorLibPrimitive::I4),
            ELEMENT_TYPE::U4 => Some(CorLibPrimitive::U4),
            ELEMENT_TYPE::I8 => Some(CorLibPrimitive::I8),
            ELEMENT_TYPE::U8 => Some(CorLibPrimitive::U8),
            ELEMENT_TYPE::R4 => Some(CorLibPrimitive::R4),
            ELEMENT_TYPE::R8 => Some(CorLibPrimitive::R8),
            ELEMENT_TYPE::STRING => Some(CorLibPrimitive::String),
            ELEMENT_TYPE::TYPEDBYREF => Some(CorLibPrimitive::TypedReference),
            ELEMENT_TYPE::I => Some(CorLibPrimitive::I),
            ELEMENT_TYPE::U => Some(CorLibPrimitive::U),
            ELEMENT_TYPE::OBJECT => Some(CorLibPrimitive::Object),
            _ => None,
        }
    }

    /// Name of the primitive inside the `System` namespace
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            CorLibPrimitive::Void => "Void",
            CorLibPrimitive::Boolean => "Boolean",
            CorLibPrimitive::Char => "Char",
            CorLibPrimitive::I1 => "SByte",
            CorLibPrimitive::U1 => "Byte",
            CorLibPrimitive::I2 => "Int16",
            CorLibPrimitive::U2 => "UInt16",
            CorLibPrimitive::I4 => "Int32",
            CorLibPrimitive::U4 => "UInt32",
            CorLibPrimitive::I8 => "Int64",
            CorLibPrimitive::U8 => "UInt64",
            CorLibPrimitive::R4 => "Single",
            CorLibPrimitive::R8 => "Double",
            CorLibPrimitive::String => "String",
            CorLibPrimitive::TypedReference => "TypedReference",
            CorLibPrimitive::I => "IntPtr",
            CorLibPrimitive::U => "UIntPtr",
            CorLibPrimitive::Object => "Object",
        }
    }

    /// Namespace of every primitive
    #[must_use]
    pub fn namespace(self) -> &'static str {
        "System"
    }

    /// Returns true for the primitives the runtime treats as value types
    #[must_use]
    pub fn is_value_type(self) -> bool {
        !matches!(self, CorLibPrimitive::String | CorLibPrimitive::Object)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use strum::IntoEnumIterator;

    #[test]
    fn test_element_type_constants() {
        assert_eq!(ELEMENT_TYPE::END, 0x00);
        assert_eq!(ELEMENT_TYPE::VOID, 0x01);
        assert_eq!(ELEMENT_TYPE::I4, 0x08);
        assert_eq!(ELEMENT_TYPE::STRING, 0x0e);
        assert_eq!(ELEMENT_TYPE::PTR, 0x0f);
        assert_eq!(ELEMENT_TYPE::BYREF, 0x10);
        assert_eq!(ELEMENT_TYPE::VALUETYPE, 0x11);
        assert_eq!(ELEMENT_TYPE::CLASS, 0x12);
        assert_eq!(ELEMENT_TYPE::VAR, 0x13);
        assert_eq!(ELEMENT_TYPE::ARRAY, 0x14);
        assert_eq!(ELEMENT_TYPE::GENERICINST, 0x15);
        assert_eq!(ELEMENT_TYPE::TYPEDBYREF, 0x16);
        assert_eq!(ELEMENT_TYPE::VALUEARRAY, 0x17);
        assert_eq!(ELEMENT_TYPE::FNPTR, 0x1b);
        assert_eq!(ELEMENT_TYPE::SZARRAY, 0x1d);
        assert_eq!(ELEMENT_TYPE::MVAR, 0x1e);
        assert_eq!(ELEMENT_TYPE::CMOD_REQD, 0x1f);
        assert_eq!(ELEMENT_TYPE::CMOD_OPT, 0x20);
        assert_eq!(ELEMENT_TYPE::MODULE, 0x3f);
        assert_eq!(ELEMENT_TYPE::SENTINEL, 0x41);
        assert_eq!(ELEMENT_TYPE::PINNED, 0x45);
    }

    #[test]
    fn test_primitive_element_type_roundtrip() {
        assert_eq!(CorLibPrimitive::COUNT, 18);
        for primitive in CorLibPrimitive::iter() {
            assert_eq!(
                CorLibPrimitive::from_element_type(primitive.element_type()),
                Some(primitive)
            );
        }

        assert_eq!(CorLibPrimitive::from_element_type(ELEMENT_TYPE::CLASS), None);
        assert_eq!(CorLibPrimitive::from_element_type(ELEMENT_TYPE::END), None);
    }

    #[test]
    fn test_primitive_names() {
        assert_eq!(CorLibPrimitive::I4.name(), "Int32");
        assert_eq!(CorLibPrimitive::I.name(), "IntPtr");
        assert_eq!(CorLibPrimitive::Object.namespace(), "System");
        assert!(CorLibPrimitive::I4.is_value_type());
        assert!(!CorLibPrimitive::String.is_value_type());
    }
}
