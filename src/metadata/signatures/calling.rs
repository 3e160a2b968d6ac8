//! Calling-convention signatures.
//!
//! Every standalone signature blob (method, property, field, local variables and method
//! instantiation, ECMA-335 II.23.2.1 - II.23.2.15) starts with a calling-convention byte. The
//! low nibble selects the kind of blob, the high bits carry the `GENERIC`, `HAS_THIS` and
//! `EXPLICIT_THIS` flags.
//!
//! Function pointer types ([`crate::metadata::signatures::TypeSig::FnPtr`]) embed a complete
//! method signature and store it as a [`CallingConventionSig`].

use bitflags::bitflags;

use crate::metadata::signatures::SigId;

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    /// The calling-convention byte of a signature blob
    ///
    /// The low nibble is the [`CallingConventionKind`], the named flags are the upper bits.
    pub struct CallingConvention: u8 {
        /// The method has generic parameters; a generic parameter count follows
        const GENERIC = 0x10;
        /// The method has a `this` pointer
        const HAS_THIS = 0x20;
        /// The `this` pointer is passed as an explicit first parameter
        const EXPLICIT_THIS = 0x40;

        const _ = !0;
    }
}

/// Mask selecting the kind nibble of a calling-convention byte
pub const CALLING_CONVENTION_KIND_MASK: u8 = 0x0F;

/// The kind nibble of a calling-convention byte
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum CallingConventionKind {
    /// Managed default
    Default = 0x00,
    /// Unmanaged `cdecl`
    C = 0x01,
    /// Unmanaged `stdcall`
    StdCall = 0x02,
    /// Unmanaged `thiscall`
    ThisCall = 0x03,
    /// Unmanaged `fastcall`
    FastCall = 0x04,
    /// Managed variable argument list
    VarArg = 0x05,
    /// Field signature
    Field = 0x06,
    /// Local variable signature
    LocalSig = 0x07,
    /// Property signature
    Property = 0x08,
    /// Unmanaged calling convention encoded in modopts
    Unmanaged = 0x09,
    /// Generic method instantiation
    GenericInst = 0x0A,
    /// Native variable argument list
    NativeVarArg = 0x0B,
}

impl CallingConventionKind {
    /// Maps the low nibble of a calling-convention byte to its kind
    #[must_use]
    pub fn from_bits(bits: u8) -> Option<Self> {
        match bits & CALLING_CONVENTION_KIND_MASK {
            0x00 => Some(CallingConventionKind::Default),
            0x01 => Some(CallingConventionKind::C),
            0x02 => Some(CallingConventionKind::StdCall),
            0x03 => Some(CallingConventionKind::ThisCall),
            0x04 => Some(CallingConventionKind::FastCall),
            0x05 => Some(CallingConventionKind::VarArg),
            0x06 => Some(CallingConventionKind::Field),
            0x07 => Some(CallingConventionKind::LocalSig),
            0x08 => Some(CallingConventionKind::Property),
            0x09 => Some(CallingConventionKind::Unmanaged),
            0x0A => Some(CallingConventionKind::GenericInst),
            0x0B => Some(CallingConventionKind::NativeVarArg),
            _ => None,
        }
    }

    /// Returns true for the kinds that introduce a method signature
    #[must_use]
    pub fn is_method(self) -> bool {
        matches!(
            self,
            CallingConventionKind::Default
                | CallingConventionKind::C
                | CallingConventionKind::StdCall
                | CallingConventionKind::ThisCall
                | CallingConventionKind::FastCall
                | CallingConventionKind::VarArg
                | CallingConventionKind::Unmanaged
                | CallingConventionKind::NativeVarArg
        )
    }
}

impl CallingConvention {
    /// Builds a calling convention of the given kind without flags
    #[must_use]
    pub fn from_kind(kind: CallingConventionKind) -> Self {
        CallingConvention::from_bits_retain(kind as u8)
    }

    /// The kind nibble, `None` for the reserved values `0x0C..=0x0F`
    #[must_use]
    pub fn kind(self) -> Option<CallingConventionKind> {
        CallingConventionKind::from_bits(self.bits())
    }

    /// Returns true if a generic parameter count follows the calling convention
    #[must_use]
    pub fn is_generic(self) -> bool {
        self.contains(CallingConvention::GENERIC)
    }

    /// Returns true if the managed vararg or native vararg kind is set
    #[must_use]
    pub fn is_vararg(self) -> bool {
        matches!(
            self.kind(),
            Some(CallingConventionKind::VarArg | CallingConventionKind::NativeVarArg)
        )
    }
}

/// Method or property signature (II.23.2.1 - II.23.2.3, II.23.2.5)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MethodSig {
    /// The calling convention byte
    pub calling_convention: CallingConvention,
    /// Number of generic parameters, only meaningful with [`CallingConvention::GENERIC`]
    pub generic_param_count: u32,
    /// The return type (the property type for properties)
    pub ret_type: Option<SigId>,
    /// The fixed parameters
    pub params: Vec<SigId>,
    /// The parameters following the vararg sentinel
    ///
    /// `None` when the blob carried no sentinel, `Some` (possibly empty) otherwise.
    pub params_after_sentinel: Option<Vec<SigId>>,
}

impl MethodSig {
    /// Creates a signature with the given calling convention and return type but no
    /// parameters
    #[must_use]
    pub fn new(calling_convention: CallingConvention, ret_type: Option<SigId>) -> Self {
        MethodSig {
            calling_convention,
            generic_param_count: 0,
            ret_type,
            params: Vec::new(),
            params_after_sentinel: None,
        }
    }

    /// Creates a managed static method signature
    #[must_use]
    pub fn new_static(ret_type: SigId, params: Vec<SigId>) -> Self {
        MethodSig {
            params,
            ..MethodSig::new(
                CallingConvention::from_kind(CallingConventionKind::Default),
                Some(ret_type),
            )
        }
    }

    /// Creates a managed instance method signature
    #[must_use]
    pub fn new_instance(ret_type: SigId, params: Vec<SigId>) -> Self {
        MethodSig {
            params,
            ..MethodSig::new(CallingConvention::HAS_THIS, Some(ret_type))
        }
    }

    /// Total number of parameters, including the ones after the sentinel
    #[must_use]
    pub fn param_count(&self) -> usize {
        self.params.len() + self.params_after_sentinel.as_ref().map_or(0, Vec::len)
    }
}

/// Field signature (II.23.2.4)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldSig {
    /// The calling convention byte (kind [`CallingConventionKind::Field`])
    pub calling_convention: CallingConvention,
    /// The type of the field
    pub field_type: Option<SigId>,
}

impl FieldSig {
    /// Creates a field signature of the given type
    #[must_use]
    pub fn new(field_type: Option<SigId>) -> Self {
        FieldSig {
            calling_convention: CallingConvention::from_kind(CallingConventionKind::Field),
            field_type,
        }
    }
}

/// Local variable signature (II.23.2.6)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocalSig {
    /// The calling convention byte (kind [`CallingConventionKind::LocalSig`])
    pub calling_convention: CallingConvention,
    /// The local variables, pinned locals are wrapped in a `Pinned` node
    pub locals: Vec<SigId>,
}

impl LocalSig {
    /// Creates a local variable signature
    #[must_use]
    pub fn new(locals: Vec<SigId>) -> Self {
        LocalSig {
            calling_convention: CallingConvention::from_kind(CallingConventionKind::LocalSig),
            locals,
        }
    }
}

/// Method instantiation signature (II.23.2.15)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenericInstMethodSig {
    /// The calling convention byte (kind [`CallingConventionKind::GenericInst`])
    pub calling_convention: CallingConvention,
    /// The generic method arguments
    pub generic_arguments: Vec<SigId>,
}

impl GenericInstMethodSig {
    /// Creates a method instantiation signature
    #[must_use]
    pub fn new(generic_arguments: Vec<SigId>) -> Self {
        GenericInstMethodSig {
            calling_convention: CallingConvention::from_kind(CallingConventionKind::GenericInst),
            generic_arguments,
        }
    }
}

/// Any standalone signature, dispatched on the calling-convention kind
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CallingConventionSig {
    /// Method signature, including function pointer targets
    Method(MethodSig),
    /// Property signature
    Property(MethodSig),
    /// Field signature
    Field(FieldSig),
    /// Local variable signature
    LocalVars(LocalSig),
    /// Method instantiation signature
    GenericInstMethod(GenericInstMethodSig),
}

impl CallingConventionSig {
    /// The calling convention byte the signature was created with
    #[must_use]
    pub fn calling_convention(&self) -> CallingConvention {
        match self {
            CallingConventionSig::Method(sig) | CallingConventionSig::Property(sig) => {
                sig.calling_convention
            }
            CallingConventionSig::Field(sig) => sig.calling_convention,
            CallingConventionSig::LocalVars(sig) => sig.calling_convention,
            CallingConventionSig::GenericInstMethod(sig) => sig.calling_convention,
        }
    }

    /// The method signature, if this is one
    #[must_use]
    pub fn as_method(&self) -> Option<&MethodSig> {
        match self {
            CallingConventionSig::Method(sig) => Some(sig),
            _ => None,
        }
    }

    /// Every type signature referenced directly by this signature, in blob order
    pub fn referenced_types(&self) -> Vec<SigId> {
        match self {
            CallingConventionSig::Method(sig) | CallingConventionSig::Property(sig) => sig
                .ret_type
                .into_iter()
                .chain(sig.params.iter().copied())
                .chain(sig.params_after_sentinel.iter().flatten().copied())
                .collect(),
            CallingConventionSig::Field(sig) => sig.field_type.into_iter().collect(),
            CallingConventionSig::LocalVars(sig) => sig.locals.clone(),
            CallingConventionSig::GenericInstMethod(sig) => sig.generic_arguments.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_calling_convention_kind() {
        let cc = CallingConvention::from_bits_retain(0x30);
        assert!(cc.is_generic());
        assert!(cc.contains(CallingConvention::HAS_THIS));
        assert_eq!(cc.kind(), Some(CallingConventionKind::Default));

        let vararg = CallingConvention::from_bits_retain(0x05);
        assert!(vararg.is_vararg());
        assert!(!vararg.is_generic());

        assert_eq!(
            CallingConvention::from_bits_retain(0x0C).kind(),
            None
        );
        assert_eq!(
            CallingConvention::from_kind(CallingConventionKind::Property).bits(),
            0x08
        );
    }

    #[test]
    fn test_kind_is_method() {
        assert!(CallingConventionKind::Default.is_method());
        assert!(CallingConventionKind::StdCall.is_method());
        assert!(!CallingConventionKind::Field.is_method());
        assert!(!CallingConventionKind::Property.is_method());
        assert!(!CallingConventionKind::GenericInst.is_method());
    }

    #[test]
    fn test_method_sig_param_count() {
        let mut sig = MethodSig::new_static(SigId::new(0), vec![SigId::new(1), SigId::new(2)]);
        assert_eq!(sig.param_count(), 2);
        assert!(sig.params_after_sentinel.is_none());

        sig.params_after_sentinel = Some(vec![SigId::new(3)]);
        assert_eq!(sig.param_count(), 3);

        let wrapped = CallingConventionSig::Method(sig);
        assert!(wrapped.as_method().is_some());
        assert_eq!(
            wrapped.referenced_types(),
            vec![SigId::new(0), SigId::new(1), SigId::new(2), SigId::new(3)]
        );
    }

    #[test]
    fn test_instance_method_flags() {
        let sig = MethodSig::new_instance(SigId::new(0), Vec::new());
        assert!(sig.calling_convention.contains(CallingConvention::HAS_THIS));
        assert_eq!(
            sig.calling_convention.kind(),
            Some(CallingConventionKind::Default)
        );

        let property = CallingConventionSig::Property(sig);
        assert!(property.as_method().is_none());
    }
}
