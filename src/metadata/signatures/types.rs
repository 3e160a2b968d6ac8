//! Signature nodes and their payloads.
//!
//! [`TypeSig`] is the sum type stored in a [`crate::metadata::signatures::SignatureArena`],
//! one variant per [`SignatureTag`]. Terminal variants carry no child. Wrapping variants
//! carry exactly one possibly absent child next to their payload.

use std::fmt;

use strum::{EnumCount, EnumIter, IntoStaticStr};

use crate::metadata::{
    signatures::{CallingConventionSig, MethodSig},
    token::Token,
    typesystem::{CorLibPrimitive, ELEMENT_TYPE},
};

/// Stable handle of a node inside a [`crate::metadata::signatures::SignatureArena`]
///
/// Ids are plain indices. A node may be referenced by any number of parents, and an id that
/// does not resolve in the arena it is used with is treated as an absent node.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SigId(u32);

impl SigId {
    /// Creates an id from a raw arena index
    #[must_use]
    pub const fn new(index: u32) -> Self {
        SigId(index)
    }

    /// The arena index of this id
    #[must_use]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Debug for SigId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SigId({})", self.0)
    }
}

/// The grammar production a node represents
///
/// Every [`TypeSig`] variant maps to exactly one tag and back. The tag of a node is fixed
/// when it is created.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, EnumCount, IntoStaticStr)]
pub enum SignatureTag {
    /// Declared reference type (`CLASS`)
    Class,
    /// Declared value type (`VALUETYPE`)
    ValueType,
    /// Core library primitive (`VOID` .. `STRING`, `TYPEDBYREF`, `I`, `U`, `OBJECT`)
    CorLib,
    /// Generic type parameter (`VAR`)
    Var,
    /// Generic method parameter (`MVAR`)
    MVar,
    /// Vararg sentinel (`SENTINEL`)
    Sentinel,
    /// Function pointer (`FNPTR`)
    FnPtr,
    /// Generic instantiation (`GENERICINST`)
    GenericInst,
    /// Unmanaged pointer (`PTR`)
    Ptr,
    /// Managed reference (`BYREF`)
    ByRef,
    /// Multi-dimensional array (`ARRAY`)
    Array,
    /// Single dimension zero lower bound array (`SZARRAY`)
    SzArray,
    /// Required custom modifier (`CMOD_REQD`)
    CModReqd,
    /// Optional custom modifier (`CMOD_OPT`)
    CModOpt,
    /// Pinned local (`PINNED`)
    Pinned,
    /// Fixed size inline array (`VALUEARRAY`)
    ValueArray,
    /// Module qualified type (`MODULE`)
    Module,
}

impl SignatureTag {
    /// Returns true for the terminal family, whose nodes never wrap a child
    #[must_use]
    pub fn is_leaf(self) -> bool {
        matches!(
            self,
            SignatureTag::Class
                | SignatureTag::ValueType
                | SignatureTag::CorLib
                | SignatureTag::Var
                | SignatureTag::MVar
                | SignatureTag::Sentinel
                | SignatureTag::FnPtr
                | SignatureTag::GenericInst
        )
    }

    /// Returns true for the terminal nodes that hold a type reference
    #[must_use]
    pub fn is_type_def_or_ref(self) -> bool {
        matches!(
            self,
            SignatureTag::Class | SignatureTag::ValueType | SignatureTag::CorLib
        )
    }

    /// Returns true for the two custom modifier tags
    #[must_use]
    pub fn is_modifier(self) -> bool {
        matches!(self, SignatureTag::CModReqd | SignatureTag::CModOpt)
    }

    /// The element type written for this tag
    ///
    /// `None` for [`SignatureTag::CorLib`], whose code depends on the primitive.
    #[must_use]
    pub fn element_type(self) -> Option<u8> {
        Some(match self {
            SignatureTag::Class => ELEMENT_TYPE::CLASS,
            SignatureTag::ValueType => ELEMENT_TYPE::VALUETYPE,
            SignatureTag::CorLib => return None,
            SignatureTag::Var => ELEMENT_TYPE::VAR,
            SignatureTag::MVar => ELEMENT_TYPE::MVAR,
            SignatureTag::Sentinel => ELEMENT_TYPE::SENTINEL,
            SignatureTag::FnPtr => ELEMENT_TYPE::FNPTR,
            SignatureTag::GenericInst => ELEMENT_TYPE::GENERICINST,
            SignatureTag::Ptr => ELEMENT_TYPE::PTR,
            SignatureTag::ByRef => ELEMENT_TYPE::BYREF,
            SignatureTag::Array => ELEMENT_TYPE::ARRAY,
            SignatureTag::SzArray => ELEMENT_TYPE::SZARRAY,
            SignatureTag::CModReqd => ELEMENT_TYPE::CMOD_REQD,
            SignatureTag::CModOpt => ELEMENT_TYPE::CMOD_OPT,
            SignatureTag::Pinned => ELEMENT_TYPE::PINNED,
            SignatureTag::ValueArray => ELEMENT_TYPE::VALUEARRAY,
            SignatureTag::Module => ELEMENT_TYPE::MODULE,
        })
    }
}

/// A type signature node
///
/// Terminal variants carry their payload and no child. Wrapping variants carry an optional
/// child; `None` is kept when the decoder could not produce one, and every derived
/// operation treats it as "no information".
#[derive(Debug, Clone, PartialEq)]
pub enum TypeSig {
    /// Declared reference type
    Class(TypeDefOrRefSig),
    /// Declared value type
    ValueType(TypeDefOrRefSig),
    /// Core library primitive
    CorLib(CorLibTypeSig),
    /// Generic type parameter
    Var(GenericVarSig),
    /// Generic method parameter
    MVar(GenericVarSig),
    /// Vararg sentinel
    Sentinel,
    /// Function pointer
    FnPtr(FnPtrSig),
    /// Generic instantiation
    GenericInst(GenericInstSig),
    /// Unmanaged pointer
    Ptr(WrapperSig),
    /// Managed reference
    ByRef(WrapperSig),
    /// Multi-dimensional array
    Array(ArraySig),
    /// Single dimension zero lower bound array
    SzArray(WrapperSig),
    /// Required custom modifier
    CModReqd(ModifierSig),
    /// Optional custom modifier
    CModOpt(ModifierSig),
    /// Pinned local
    Pinned(WrapperSig),
    /// Fixed size inline array
    ValueArray(ValueArraySig),
    /// Module qualified type
    Module(ModuleSig),
}

impl TypeSig {
    /// The tag of this node
    #[must_use]
    pub fn tag(&self) -> SignatureTag {
        match self {
            TypeSig::Class(_) => SignatureTag::Class,
            TypeSig::ValueType(_) => SignatureTag::ValueType,
            TypeSig::CorLib(_) => SignatureTag::CorLib,
            TypeSig::Var(_) => SignatureTag::Var,
            TypeSig::MVar(_) => SignatureTag::MVar,
            TypeSig::Sentinel => SignatureTag::Sentinel,
            TypeSig::FnPtr(_) => SignatureTag::FnPtr,
            TypeSig::GenericInst(_) => SignatureTag::GenericInst,
            TypeSig::Ptr(_) => SignatureTag::Ptr,
            TypeSig::ByRef(_) => SignatureTag::ByRef,
            TypeSig::Array(_) => SignatureTag::Array,
            TypeSig::SzArray(_) => SignatureTag::SzArray,
            TypeSig::CModReqd(_) => SignatureTag::CModReqd,
            TypeSig::CModOpt(_) => SignatureTag::CModOpt,
            TypeSig::Pinned(_) => SignatureTag::Pinned,
            TypeSig::ValueArray(_) => SignatureTag::ValueArray,
            TypeSig::Module(_) => SignatureTag::Module,
        }
    }

    /// The wrapped child, always `None` for terminal nodes
    #[must_use]
    pub fn next(&self) -> Option<SigId> {
        match self {
            TypeSig::Class(_)
            | TypeSig::ValueType(_)
            | TypeSig::CorLib(_)
            | TypeSig::Var(_)
            | TypeSig::MVar(_)
            | TypeSig::Sentinel
            | TypeSig::FnPtr(_)
            | TypeSig::GenericInst(_) => None,
            TypeSig::Ptr(sig) | TypeSig::ByRef(sig) | TypeSig::SzArray(sig) | TypeSig::Pinned(sig) => {
                sig.next
            }
            TypeSig::Array(sig) => sig.next,
            TypeSig::CModReqd(sig) | TypeSig::CModOpt(sig) => sig.next,
            TypeSig::ValueArray(sig) => sig.next,
            TypeSig::Module(sig) => sig.next,
        }
    }

    /// Returns true if this node belongs to the terminal family
    #[must_use]
    pub fn is_leaf(&self) -> bool {
        self.tag().is_leaf()
    }

    /// The type reference of a declared-type node
    #[must_use]
    pub fn type_def_or_ref(&self) -> Option<Token> {
        match self {
            TypeSig::Class(sig) | TypeSig::ValueType(sig) => Some(sig.token),
            TypeSig::CorLib(sig) => Some(sig.token),
            _ => None,
        }
    }

    /// The element type byte written for this node
    #[must_use]
    pub fn element_type(&self) -> u8 {
        match self {
            TypeSig::CorLib(sig) => sig.primitive.element_type(),
            other => other.tag().element_type().unwrap_or(ELEMENT_TYPE::END),
        }
    }

    /// Returns true for the generic parameter variables
    #[must_use]
    pub fn is_generic_parameter(&self) -> bool {
        matches!(self, TypeSig::Var(_) | TypeSig::MVar(_))
    }

    /// The generic instantiation payload, if this is one
    #[must_use]
    pub fn as_generic_inst(&self) -> Option<&GenericInstSig> {
        match self {
            TypeSig::GenericInst(sig) => Some(sig),
            _ => None,
        }
    }

    /// The array shape payload, if this is a multi-dimensional array
    #[must_use]
    pub fn as_array(&self) -> Option<&ArraySig> {
        match self {
            TypeSig::Array(sig) => Some(sig),
            _ => None,
        }
    }

    /// The modifier payload and whether it is required, if this is a custom modifier
    #[must_use]
    pub fn as_modifier(&self) -> Option<(&ModifierSig, bool)> {
        match self {
            TypeSig::CModReqd(sig) => Some((sig, true)),
            TypeSig::CModOpt(sig) => Some((sig, false)),
            _ => None,
        }
    }
}

/// Payload of the declared `Class` and `ValueType` terminals
///
/// The referenced type is fixed at construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TypeDefOrRefSig {
    token: Token,
}

impl TypeDefOrRefSig {
    /// Creates the payload for a `TypeDef`, `TypeRef` or `TypeSpec` token
    #[must_use]
    pub fn new(token: Token) -> Self {
        TypeDefOrRefSig { token }
    }

    /// The referenced type
    #[must_use]
    pub fn token(&self) -> Token {
        self.token
    }
}

/// Payload of a core library primitive: the reference to the corlib type plus its code
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CorLibTypeSig {
    token: Token,
    primitive: CorLibPrimitive,
}

impl CorLibTypeSig {
    /// Creates the payload for `primitive`, backed by the corlib type `token`
    #[must_use]
    pub fn new(token: Token, primitive: CorLibPrimitive) -> Self {
        CorLibTypeSig { token, primitive }
    }

    /// The referenced corlib type
    #[must_use]
    pub fn token(&self) -> Token {
        self.token
    }

    /// The primitive code
    #[must_use]
    pub fn primitive(&self) -> CorLibPrimitive {
        self.primitive
    }
}

/// Payload of the `Var` and `MVar` terminals
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct GenericVarSig {
    number: u32,
}

impl GenericVarSig {
    /// Creates the payload for generic parameter `number`
    #[must_use]
    pub fn new(number: u32) -> Self {
        GenericVarSig { number }
    }

    /// Index of the generic parameter
    #[must_use]
    pub fn number(&self) -> u32 {
        self.number
    }
}

/// Payload of a function pointer terminal
///
/// The calling-convention signature is stored verbatim.
#[derive(Debug, Clone, PartialEq)]
pub struct FnPtrSig {
    signature: Box<CallingConventionSig>,
}

impl FnPtrSig {
    /// Creates the payload from a calling-convention signature
    #[must_use]
    pub fn new(signature: CallingConventionSig) -> Self {
        FnPtrSig {
            signature: Box::new(signature),
        }
    }

    /// The calling-convention signature
    #[must_use]
    pub fn signature(&self) -> &CallingConventionSig {
        &self.signature
    }

    /// The method signature, `None` when the stored signature is not a method
    #[must_use]
    pub fn method_sig(&self) -> Option<&MethodSig> {
        self.signature.as_method()
    }
}

/// Payload of a generic instantiation
///
/// Holds the open generic type being closed and the ordered type arguments. The argument
/// list is always a valid, possibly empty sequence; replacing it swaps the whole list at
/// once.
///
/// # Examples
///
/// ```rust
/// use dotsig::metadata::signatures::{GenericInstSig, SigId};
///
/// let (open, a, b) = (SigId::new(0), SigId::new(1), SigId::new(2));
/// let mut inst = GenericInstSig::with_args(Some(open), [a, b]);
/// assert_eq!(inst.generic_arguments(), &[a, b]);
///
/// inst.replace_arguments([b]);
/// assert_eq!(inst.generic_arguments(), &[b]);
///
/// inst.set_generic_arguments(None);
/// assert!(inst.generic_arguments().is_empty());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct GenericInstSig {
    generic_type: Option<SigId>,
    args: Vec<SigId>,
}

impl GenericInstSig {
    /// Creates an instantiation without arguments
    #[must_use]
    pub fn new(generic_type: Option<SigId>) -> Self {
        GenericInstSig {
            generic_type,
            args: Vec::new(),
        }
    }

    /// Creates an instantiation that reserves room for `capacity` arguments
    #[must_use]
    pub fn with_capacity(generic_type: Option<SigId>, capacity: usize) -> Self {
        GenericInstSig {
            generic_type,
            args: Vec::with_capacity(capacity),
        }
    }

    /// Creates an instantiation over the given arguments
    ///
    /// Fixed arity forms are spelled with arrays: `[a]`, `[a, b]`, `[a, b, c]`.
    #[must_use]
    pub fn with_args(generic_type: Option<SigId>, args: impl IntoIterator<Item = SigId>) -> Self {
        GenericInstSig {
            generic_type,
            args: args.into_iter().collect(),
        }
    }

    /// Creates an instantiation that takes ownership of an already built argument list
    #[must_use]
    pub fn from_parts(generic_type: Option<SigId>, args: Vec<SigId>) -> Self {
        GenericInstSig { generic_type, args }
    }

    /// The open generic type
    #[must_use]
    pub fn generic_type(&self) -> Option<SigId> {
        self.generic_type
    }

    /// Replaces the open generic type
    pub fn set_generic_type(&mut self, generic_type: Option<SigId>) {
        self.generic_type = generic_type;
    }

    /// The ordered type arguments
    #[must_use]
    pub fn generic_arguments(&self) -> &[SigId] {
        &self.args
    }

    /// Number of type arguments
    #[must_use]
    pub fn arg_count(&self) -> usize {
        self.args.len()
    }

    /// Appends a single type argument
    pub fn push_argument(&mut self, arg: SigId) {
        self.args.push(arg);
    }

    /// Replaces all type arguments with `args`, in order
    ///
    /// The new list is collected before the old one is dropped, so the previous contents
    /// are either fully present or fully gone.
    pub fn replace_arguments(&mut self, args: impl IntoIterator<Item = SigId>) {
        let replacement: Vec<SigId> = args.into_iter().collect();
        self.args.clear();
        self.args.extend(replacement);
    }

    /// Replaces all type arguments, an absent list clears them
    pub fn set_generic_arguments(&mut self, args: Option<Vec<SigId>>) {
        self.replace_arguments(args.into_iter().flatten());
    }
}

/// Payload of the child-only wrappers (`Ptr`, `ByRef`, `SzArray`, `Pinned`)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct WrapperSig {
    next: Option<SigId>,
}

impl WrapperSig {
    /// Creates a wrapper around `next`
    #[must_use]
    pub fn new(next: Option<SigId>) -> Self {
        WrapperSig { next }
    }

    /// The wrapped child
    #[must_use]
    pub fn next(&self) -> Option<SigId> {
        self.next
    }
}

/// Payload of a multi-dimensional array
///
/// Rank, sizes and lower bounds are independent: either list may be shorter than the rank,
/// meaning the remaining dimensions are unspecified. No cross validation is performed.
///
/// # Examples
///
/// ```rust
/// use dotsig::metadata::signatures::{ArraySig, SigId};
///
/// let mut array = ArraySig::with_rank(Some(SigId::new(0)), 3);
/// assert_eq!(array.rank(), 3);
/// assert!(array.sizes().is_empty());
///
/// array.sizes_mut().push(10);
/// array.set_lower_bounds([-1, 0]);
/// assert_eq!(array.sizes(), &[10]);
/// assert_eq!(array.lower_bounds(), &[-1, 0]);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ArraySig {
    next: Option<SigId>,
    rank: u32,
    sizes: Vec<u32>,
    lower_bounds: Vec<i32>,
}

impl ArraySig {
    /// Creates an array of rank 0 without sizes or bounds
    #[must_use]
    pub fn new(next: Option<SigId>) -> Self {
        Self::with_rank(next, 0)
    }

    /// Creates an array of the given rank without sizes or bounds
    #[must_use]
    pub fn with_rank(next: Option<SigId>, rank: u32) -> Self {
        ArraySig {
            next,
            rank,
            sizes: Vec::new(),
            lower_bounds: Vec::new(),
        }
    }

    /// Creates an array with an explicit shape, collecting fresh lists from the inputs
    #[must_use]
    pub fn with_shape(
        next: Option<SigId>,
        rank: u32,
        sizes: impl IntoIterator<Item = u32>,
        lower_bounds: impl IntoIterator<Item = i32>,
    ) -> Self {
        ArraySig {
            next,
            rank,
            sizes: sizes.into_iter().collect(),
            lower_bounds: lower_bounds.into_iter().collect(),
        }
    }

    /// Creates an array that takes ownership of already built size and bound lists
    ///
    /// No copy is made; the vectors become the node's storage.
    #[must_use]
    pub fn from_parts(
        next: Option<SigId>,
        rank: u32,
        sizes: Vec<u32>,
        lower_bounds: Vec<i32>,
    ) -> Self {
        ArraySig {
            next,
            rank,
            sizes,
            lower_bounds,
        }
    }

    /// The element type
    #[must_use]
    pub fn next(&self) -> Option<SigId> {
        self.next
    }

    /// The number of dimensions
    #[must_use]
    pub fn rank(&self) -> u32 {
        self.rank
    }

    /// Sets the number of dimensions
    pub fn set_rank(&mut self, rank: u32) {
        self.rank = rank;
    }

    /// The specified dimension sizes, in dimension order
    #[must_use]
    pub fn sizes(&self) -> &[u32] {
        &self.sizes
    }

    /// The specified lower bounds, in dimension order
    #[must_use]
    pub fn lower_bounds(&self) -> &[i32] {
        &self.lower_bounds
    }

    /// Mutable access to the size list
    pub fn sizes_mut(&mut self) -> &mut Vec<u32> {
        &mut self.sizes
    }

    /// Mutable access to the lower bound list
    pub fn lower_bounds_mut(&mut self) -> &mut Vec<i32> {
        &mut self.lower_bounds
    }

    /// Replaces all sizes
    pub fn set_sizes(&mut self, sizes: impl IntoIterator<Item = u32>) {
        self.sizes = sizes.into_iter().collect();
    }

    /// Replaces all lower bounds
    pub fn set_lower_bounds(&mut self, lower_bounds: impl IntoIterator<Item = i32>) {
        self.lower_bounds = lower_bounds.into_iter().collect();
    }
}

/// Payload of a required or optional custom modifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ModifierSig {
    modifier: Token,
    next: Option<SigId>,
}

impl ModifierSig {
    /// Creates a modifier of type `modifier` applied to `next`
    #[must_use]
    pub fn new(modifier: Token, next: Option<SigId>) -> Self {
        ModifierSig { modifier, next }
    }

    /// The modifier type
    #[must_use]
    pub fn modifier(&self) -> Token {
        self.modifier
    }

    /// The modified child
    #[must_use]
    pub fn next(&self) -> Option<SigId> {
        self.next
    }
}

/// Payload of a fixed size inline array
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ValueArraySig {
    next: Option<SigId>,
    size: u32,
}

impl ValueArraySig {
    /// Creates an inline array of `size` elements of type `next`
    #[must_use]
    pub fn new(next: Option<SigId>, size: u32) -> Self {
        ValueArraySig { next, size }
    }

    /// The element type
    #[must_use]
    pub fn next(&self) -> Option<SigId> {
        self.next
    }

    /// Number of elements
    #[must_use]
    pub fn size(&self) -> u32 {
        self.size
    }

    /// Sets the number of elements
    pub fn set_size(&mut self, size: u32) {
        self.size = size;
    }
}

/// Payload of a module qualified type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ModuleSig {
    index: u32,
    next: Option<SigId>,
}

impl ModuleSig {
    /// Creates a reference to `next` in module `index`
    #[must_use]
    pub fn new(index: u32, next: Option<SigId>) -> Self {
        ModuleSig { index, next }
    }

    /// The module index
    #[must_use]
    pub fn index(&self) -> u32 {
        self.index
    }

    /// Sets the module index
    pub fn set_index(&mut self, index: u32) {
        self.index = index;
    }

    /// The qualified type
    #[must_use]
    pub fn next(&self) -> Option<SigId> {
        self.next
    }
}
