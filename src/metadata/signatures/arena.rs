//! Node storage for type signatures.
//!
//! Signatures form a DAG: a generic argument may be shared by several instantiations, and a
//! `TypeSpec` signature may (on crafted input) lead back to itself through the type
//! reference table. Nodes therefore live in a [`SignatureArena`] and refer to each other by
//! [`SigId`]. Nodes are appended and never removed, and no API replaces a stored node, so a
//! node's tag and its child link are fixed once it has been pushed. The only mutable state
//! is reachable through the typed payload accessors ([`SignatureArena::generic_inst_mut`],
//! [`SignatureArena::array_mut`], [`SignatureArena::value_array_mut`] and
//! [`SignatureArena::module_sig_mut`]).
//!
//! # Examples
//!
//! ```rust
//! use dotsig::metadata::signatures::{SignatureArena, SignatureTag};
//! use dotsig::metadata::token::Token;
//!
//! let mut arena = SignatureArena::new();
//! let class = arena.class(Token::new(0x0200_0001));
//! let array = arena.sz_array(class);
//! let ptr = arena.ptr(array);
//!
//! assert_eq!(arena.tag(ptr), Some(SignatureTag::Ptr));
//! assert_eq!(arena.next(ptr), Some(array));
//! assert_eq!(arena.next(class), None);
//! ```

use crate::metadata::{
    signatures::{
        ArraySig, CallingConventionSig, CorLibTypeSig, FnPtrSig, GenericInstSig, GenericVarSig,
        ModifierSig, ModuleSig, SigId, SignatureTag, TypeDefOrRefSig, TypeSig, ValueArraySig,
        WrapperSig,
    },
    token::Token,
    typesystem::CorLibPrimitive,
};

/// Append-only storage of [`TypeSig`] nodes
#[derive(Debug, Clone, Default)]
pub struct SignatureArena {
    nodes: Vec<TypeSig>,
}

impl SignatureArena {
    /// Creates an empty arena
    #[must_use]
    pub fn new() -> Self {
        SignatureArena { nodes: Vec::new() }
    }

    /// Creates an empty arena with room for `capacity` nodes
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        SignatureArena {
            nodes: Vec::with_capacity(capacity),
        }
    }

    /// Number of stored nodes
    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Returns true if no node has been stored
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Stores a node and returns its id
    #[allow(clippy::cast_possible_truncation)]
    pub fn push(&mut self, sig: TypeSig) -> SigId {
        let id = SigId::new(self.nodes.len() as u32);
        self.nodes.push(sig);
        id
    }

    /// Returns true if `id` resolves in this arena
    #[must_use]
    pub fn contains(&self, id: SigId) -> bool {
        id.index() < self.nodes.len()
    }

    /// The node behind `id`
    #[must_use]
    pub fn get(&self, id: SigId) -> Option<&TypeSig> {
        self.nodes.get(id.index())
    }

    /// The tag of the node behind `id`
    #[must_use]
    pub fn tag(&self, id: SigId) -> Option<SignatureTag> {
        self.get(id).map(TypeSig::tag)
    }

    /// The child of the node behind `id`
    #[must_use]
    pub fn next(&self, id: SigId) -> Option<SigId> {
        self.get(id).and_then(TypeSig::next)
    }

    /// Iterates all nodes in insertion order
    #[allow(clippy::cast_possible_truncation)]
    pub fn iter(&self) -> impl Iterator<Item = (SigId, &TypeSig)> {
        self.nodes
            .iter()
            .enumerate()
            .map(|(index, sig)| (SigId::new(index as u32), sig))
    }

    /// Declared reference type
    pub fn class(&mut self, token: Token) -> SigId {
        self.push(TypeSig::Class(TypeDefOrRefSig::new(token)))
    }

    /// Declared value type
    pub fn value_type(&mut self, token: Token) -> SigId {
        self.push(TypeSig::ValueType(TypeDefOrRefSig::new(token)))
    }

    /// Core library primitive backed by the corlib type `token`
    ///
    /// Prefer the shared nodes of [`crate::metadata::typesystem::CorLibTypes`].
    pub fn corlib(&mut self, token: Token, primitive: CorLibPrimitive) -> SigId {
        self.push(TypeSig::CorLib(CorLibTypeSig::new(token, primitive)))
    }

    /// Generic type parameter `!number`
    pub fn var(&mut self, number: u32) -> SigId {
        self.push(TypeSig::Var(GenericVarSig::new(number)))
    }

    /// Generic method parameter `!!number`
    pub fn mvar(&mut self, number: u32) -> SigId {
        self.push(TypeSig::MVar(GenericVarSig::new(number)))
    }

    /// Vararg sentinel
    pub fn sentinel(&mut self) -> SigId {
        self.push(TypeSig::Sentinel)
    }

    /// Function pointer over a calling-convention signature
    pub fn fn_ptr(&mut self, signature: CallingConventionSig) -> SigId {
        self.push(TypeSig::FnPtr(FnPtrSig::new(signature)))
    }

    /// Generic instantiation of `generic_type` over `args`
    pub fn generic_inst(
        &mut self,
        generic_type: impl Into<Option<SigId>>,
        args: impl IntoIterator<Item = SigId>,
    ) -> SigId {
        self.push(TypeSig::GenericInst(GenericInstSig::with_args(
            generic_type.into(),
            args,
        )))
    }

    /// Generic instantiation without arguments, reserving room for `capacity` of them
    pub fn generic_inst_with_capacity(
        &mut self,
        generic_type: impl Into<Option<SigId>>,
        capacity: usize,
    ) -> SigId {
        self.push(TypeSig::GenericInst(GenericInstSig::with_capacity(
            generic_type.into(),
            capacity,
        )))
    }

    /// Unmanaged pointer to `next`
    pub fn ptr(&mut self, next: impl Into<Option<SigId>>) -> SigId {
        self.push(TypeSig::Ptr(WrapperSig::new(next.into())))
    }

    /// Managed reference to `next`
    pub fn by_ref(&mut self, next: impl Into<Option<SigId>>) -> SigId {
        self.push(TypeSig::ByRef(WrapperSig::new(next.into())))
    }

    /// Single dimension zero lower bound array of `next`
    pub fn sz_array(&mut self, next: impl Into<Option<SigId>>) -> SigId {
        self.push(TypeSig::SzArray(WrapperSig::new(next.into())))
    }

    /// Pinned local of type `next`
    pub fn pinned(&mut self, next: impl Into<Option<SigId>>) -> SigId {
        self.push(TypeSig::Pinned(WrapperSig::new(next.into())))
    }

    /// Multi-dimensional array of rank 0
    pub fn array(&mut self, next: impl Into<Option<SigId>>) -> SigId {
        self.push(TypeSig::Array(ArraySig::new(next.into())))
    }

    /// Multi-dimensional array of the given rank, sizes and bounds unspecified
    pub fn array_with_rank(&mut self, next: impl Into<Option<SigId>>, rank: u32) -> SigId {
        self.push(TypeSig::Array(ArraySig::with_rank(next.into(), rank)))
    }

    /// Multi-dimensional array with an explicit shape
    pub fn array_with_shape(
        &mut self,
        next: impl Into<Option<SigId>>,
        rank: u32,
        sizes: impl IntoIterator<Item = u32>,
        lower_bounds: impl IntoIterator<Item = i32>,
    ) -> SigId {
        self.push(TypeSig::Array(ArraySig::with_shape(
            next.into(),
            rank,
            sizes,
            lower_bounds,
        )))
    }

    /// Multi-dimensional array adopting already built size and bound vectors
    ///
    /// Ownership of both vectors moves into the node without a copy.
    pub fn array_from_parts(
        &mut self,
        next: impl Into<Option<SigId>>,
        rank: u32,
        sizes: Vec<u32>,
        lower_bounds: Vec<i32>,
    ) -> SigId {
        self.push(TypeSig::Array(ArraySig::from_parts(
            next.into(),
            rank,
            sizes,
            lower_bounds,
        )))
    }

    /// Required custom modifier `modifier` applied to `next`
    pub fn cmod_reqd(&mut self, modifier: Token, next: impl Into<Option<SigId>>) -> SigId {
        self.push(TypeSig::CModReqd(ModifierSig::new(modifier, next.into())))
    }

    /// Optional custom modifier `modifier` applied to `next`
    pub fn cmod_opt(&mut self, modifier: Token, next: impl Into<Option<SigId>>) -> SigId {
        self.push(TypeSig::CModOpt(ModifierSig::new(modifier, next.into())))
    }

    /// Fixed size inline array of `size` elements of `next`
    pub fn value_array(&mut self, next: impl Into<Option<SigId>>, size: u32) -> SigId {
        self.push(TypeSig::ValueArray(ValueArraySig::new(next.into(), size)))
    }

    /// Type `next` qualified with module `index`
    pub fn module(&mut self, index: u32, next: impl Into<Option<SigId>>) -> SigId {
        self.push(TypeSig::Module(ModuleSig::new(index, next.into())))
    }

    /// Mutable access to a generic instantiation payload
    pub fn generic_inst_mut(&mut self, id: SigId) -> Option<&mut GenericInstSig> {
        match self.nodes.get_mut(id.index()) {
            Some(TypeSig::GenericInst(sig)) => Some(sig),
            _ => None,
        }
    }

    /// Mutable access to an array shape payload
    pub fn array_mut(&mut self, id: SigId) -> Option<&mut ArraySig> {
        match self.nodes.get_mut(id.index()) {
            Some(TypeSig::Array(sig)) => Some(sig),
            _ => None,
        }
    }

    /// Mutable access to an inline array payload
    pub fn value_array_mut(&mut self, id: SigId) -> Option<&mut ValueArraySig> {
        match self.nodes.get_mut(id.index()) {
            Some(TypeSig::ValueArray(sig)) => Some(sig),
            _ => None,
        }
    }

    /// Mutable access to a module qualified payload
    pub fn module_sig_mut(&mut self, id: SigId) -> Option<&mut ModuleSig> {
        match self.nodes.get_mut(id.index()) {
            Some(TypeSig::Module(sig)) => Some(sig),
            _ => None,
        }
    }
}
