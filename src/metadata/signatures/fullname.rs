//! Name rendering of type signatures.
//!
//! [`FullNameFormatter`] is a read-only visitor over the nodes of a [`SignatureArena`]. It
//! produces the short name, the namespace and the full name of a node in one of two
//! spellings:
//!
//! | Node | [`TypeNameStyle::Source`] | [`TypeNameStyle::Reflection`] |
//! |------|---------------------------|-------------------------------|
//! | Nested type | `Ns.Outer/Inner` | `Ns.Outer+Inner` |
//! | Generic instantiation | `List`1<System.Int32>` | `List`1[[System.Int32, mscorlib, ...]]` |
//! | Array | `T[0..1,0..2]` | `T[,]` |
//! | Custom modifier | `T modopt(M)` | `T` |
//! | Pinned | `T pinned` | `T` |
//! | Function pointer | `method R *(A,B)` | `(fnptr)` |
//!
//! Tokens the [`TypeReferenceSource`] does not know render as an empty string. Rendering
//! through self-referential type specifications stops at `max_format_depth` and emits
//! [`INFINITE_RECURSION_MARKER`] instead. The same marker ends a rendering that visits more
//! than `max_resolution_steps` nodes.

use std::fmt::Write;

use crate::metadata::{
    limits::SignatureLimits,
    signatures::{
        leaf_sig, ArraySig, CallingConventionSig, OwnershipResolver, SigId, SignatureArena,
        TypeSig,
    },
    token::Token,
    typesystem::{TypeReference, TypeReferenceSource},
};

/// Emitted in place of a name whose rendering exceeded the depth limit
pub const INFINITE_RECURSION_MARKER: &str = "<<<INFRECURSION>>>";

/// Node visits left for one rendering call
///
/// Children may be shared, so the rendered text of a small DAG can be exponential in its
/// node count. Once `max_resolution_steps` visits are spent the marker is emitted once and
/// every further visit renders nothing.
struct RenderBudget {
    remaining: usize,
    exhausted: bool,
}

impl RenderBudget {
    fn new(limits: SignatureLimits) -> Self {
        RenderBudget {
            remaining: limits.max_resolution_steps,
            exhausted: false,
        }
    }

    fn step(&mut self, out: &mut String) -> bool {
        if self.remaining == 0 {
            if !self.exhausted {
                self.exhausted = true;
                out.push_str(INFINITE_RECURSION_MARKER);
            }
            return false;
        }
        self.remaining -= 1;
        true
    }
}

/// Spelling convention of rendered names
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TypeNameStyle {
    /// IL assembler and C#-like spelling
    #[default]
    Source,
    /// Spelling understood by `Type.GetType` and reflection APIs
    Reflection,
}

/// Renders names of signature nodes
///
/// # Examples
///
/// ```rust
/// use dotsig::metadata::identity::{AssemblyIdentity, AssemblyVersion};
/// use dotsig::metadata::signatures::{FullNameFormatter, SignatureArena, TypeNameStyle};
/// use dotsig::metadata::typesystem::{CorLibTypes, TypeRegistry};
///
/// let mut arena = SignatureArena::new();
/// let mut registry = TypeRegistry::new();
/// let corlib = registry.add_assembly(AssemblyIdentity::new("mscorlib", AssemblyVersion::new(4, 0, 0, 0)));
/// let module = registry.add_module("App.dll", None);
/// let types = CorLibTypes::new(&mut arena, &mut registry, module, corlib);
///
/// let array = arena.array_with_rank(types.int32(), 2);
/// let pointer = arena.ptr(array);
///
/// let formatter = FullNameFormatter::new(&arena, &registry);
/// assert_eq!(formatter.full_name(pointer), "System.Int32[,]*");
/// assert_eq!(formatter.name(pointer), "Int32[,]*");
/// assert_eq!(formatter.namespace(pointer), "System");
///
/// let reflection = formatter.with_style(TypeNameStyle::Reflection);
/// assert_eq!(reflection.full_name(pointer), "System.Int32[,]*");
/// ```
pub struct FullNameFormatter<'a, S: TypeReferenceSource + ?Sized> {
    arena: &'a SignatureArena,
    source: &'a S,
    style: TypeNameStyle,
    limits: SignatureLimits,
}

impl<'a, S: TypeReferenceSource + ?Sized> FullNameFormatter<'a, S> {
    /// Create a formatter in [`TypeNameStyle::Source`] spelling
    #[must_use]
    pub fn new(arena: &'a SignatureArena, source: &'a S) -> Self {
        FullNameFormatter {
            arena,
            source,
            style: TypeNameStyle::Source,
            limits: SignatureLimits::default(),
        }
    }

    /// Select the spelling convention
    #[must_use]
    pub fn with_style(mut self, style: TypeNameStyle) -> Self {
        self.style = style;
        self
    }

    /// Set the rendering limits, `max_format_depth` and `max_resolution_steps` are used
    #[must_use]
    pub fn with_limits(mut self, limits: SignatureLimits) -> Self {
        self.limits = limits;
        self
    }

    /// The selected spelling convention
    #[must_use]
    pub fn style(&self) -> TypeNameStyle {
        self.style
    }

    /// Short name: the innermost declared type without namespace or enclosing types, plus
    /// every wrapper suffix
    #[must_use]
    pub fn name(&self, id: SigId) -> String {
        let mut out = String::new();
        let mut budget = RenderBudget::new(self.limits);
        self.write_sig(&mut out, Some(id), false, 0, &mut budget);
        out
    }

    /// Namespace of the innermost declared type, empty for generic parameters and function
    /// pointers
    ///
    /// Nested types report the namespace of their outermost enclosing type.
    #[must_use]
    pub fn namespace(&self, id: SigId) -> String {
        self.namespace_of(Some(id), 0)
    }

    /// Fully qualified name
    #[must_use]
    pub fn full_name(&self, id: SigId) -> String {
        let mut out = String::new();
        let mut budget = RenderBudget::new(self.limits);
        self.write_sig(&mut out, Some(id), true, 0, &mut budget);
        out
    }

    /// Fully qualified name of a declared type or type specification token
    #[must_use]
    pub fn token_full_name(&self, token: Token) -> String {
        let mut out = String::new();
        let mut budget = RenderBudget::new(self.limits);
        self.write_token(&mut out, token, true, 0, &mut budget);
        out
    }

    /// Reflection full name followed by the display name of the defining assembly
    ///
    /// The assembly part is omitted when the defining assembly does not resolve.
    #[must_use]
    pub fn assembly_qualified_name(&self, id: SigId) -> String {
        let reflection = FullNameFormatter {
            style: TypeNameStyle::Reflection,
            ..*self
        };

        let mut out = String::new();
        let mut budget = RenderBudget::new(self.limits);
        reflection.write_assembly_qualified(&mut out, id, 0, &mut budget);
        out
    }

    fn write_assembly_qualified(
        &self,
        out: &mut String,
        id: SigId,
        depth: usize,
        budget: &mut RenderBudget,
    ) {
        self.write_sig(out, Some(id), true, depth, budget);
        if budget.exhausted {
            return;
        }

        let assembly = OwnershipResolver::new(self.arena, self.source)
            .with_limits(self.limits)
            .defining_assembly(id)
            .and_then(|assembly| self.source.assembly(assembly));
        if let Some(identity) = assembly {
            out.push_str(", ");
            out.push_str(&identity.display_name());
        }
    }

    fn write_sig(
        &self,
        out: &mut String,
        id: Option<SigId>,
        qualified: bool,
        depth: usize,
        budget: &mut RenderBudget,
    ) {
        if depth >= self.limits.max_format_depth {
            out.push_str(INFINITE_RECURSION_MARKER);
            return;
        }
        if !budget.step(out) {
            return;
        }
        let Some(sig) = id.and_then(|id| self.arena.get(id)) else {
            return;
        };

        let depth = depth + 1;
        match sig {
            TypeSig::Class(sig) | TypeSig::ValueType(sig) => {
                self.write_token(out, sig.token(), qualified, depth, budget);
            }
            TypeSig::CorLib(sig) => {
                let primitive = sig.primitive();
                if qualified {
                    out.push_str(primitive.namespace());
                    out.push('.');
                }
                out.push_str(primitive.name());
            }
            TypeSig::Var(sig) => {
                let _ = write!(out, "!{}", sig.number());
            }
            TypeSig::MVar(sig) => {
                let _ = write!(out, "!!{}", sig.number());
            }
            TypeSig::Sentinel => out.push_str("..."),
            TypeSig::FnPtr(sig) => self.write_fn_ptr(out, sig.signature(), depth, budget),
            TypeSig::GenericInst(sig) => {
                self.write_sig(out, sig.generic_type(), qualified, depth, budget);
                self.write_generic_arguments(out, sig.generic_arguments(), depth, budget);
            }
            TypeSig::Ptr(sig) => {
                self.write_sig(out, sig.next(), qualified, depth, budget);
                out.push('*');
            }
            TypeSig::ByRef(sig) => {
                self.write_sig(out, sig.next(), qualified, depth, budget);
                out.push('&');
            }
            TypeSig::SzArray(sig) => {
                self.write_sig(out, sig.next(), qualified, depth, budget);
                out.push_str("[]");
            }
            TypeSig::Array(sig) => {
                self.write_sig(out, sig.next(), qualified, depth, budget);
                self.write_array_shape(out, sig);
            }
            TypeSig::CModReqd(sig) => {
                self.write_sig(out, sig.next(), qualified, depth, budget);
                self.write_modifier(out, " modreq(", sig.modifier(), depth, budget);
            }
            TypeSig::CModOpt(sig) => {
                self.write_sig(out, sig.next(), qualified, depth, budget);
                self.write_modifier(out, " modopt(", sig.modifier(), depth, budget);
            }
            TypeSig::Pinned(sig) => {
                self.write_sig(out, sig.next(), qualified, depth, budget);
                if self.style == TypeNameStyle::Source {
                    out.push_str(" pinned");
                }
            }
            TypeSig::ValueArray(sig) => {
                self.write_sig(out, sig.next(), qualified, depth, budget);
                let _ = write!(out, " ValueArray({})", sig.size());
            }
            TypeSig::Module(sig) => {
                let _ = write!(out, "[module:{}]", sig.index());
                self.write_sig(out, sig.next(), qualified, depth, budget);
            }
        }
    }

    fn write_token(
        &self,
        out: &mut String,
        token: Token,
        qualified: bool,
        depth: usize,
        budget: &mut RenderBudget,
    ) {
        if depth >= self.limits.max_format_depth {
            out.push_str(INFINITE_RECURSION_MARKER);
            return;
        }
        if !budget.step(out) {
            return;
        }

        match self.source.type_reference(token) {
            None => {}
            Some(TypeReference::TypeSpec { signature }) => {
                self.write_sig(out, *signature, qualified, depth + 1, budget);
            }
            Some(reference) => {
                if qualified {
                    if let Some(outer) = reference.declaring_type() {
                        self.write_token(out, outer, true, depth + 1, budget);
                        out.push(match self.style {
                            TypeNameStyle::Source => '/',
                            TypeNameStyle::Reflection => '+',
                        });
                    } else if !reference.namespace().is_empty() {
                        out.push_str(reference.namespace());
                        out.push('.');
                    }
                }
                out.push_str(reference.name());
            }
        }
    }

    fn write_modifier(
        &self,
        out: &mut String,
        keyword: &str,
        modifier: Token,
        depth: usize,
        budget: &mut RenderBudget,
    ) {
        if self.style == TypeNameStyle::Source {
            out.push_str(keyword);
            self.write_token(out, modifier, true, depth, budget);
            out.push(')');
        }
    }

    fn write_generic_arguments(
        &self,
        out: &mut String,
        args: &[SigId],
        depth: usize,
        budget: &mut RenderBudget,
    ) {
        match self.style {
            TypeNameStyle::Source => {
                out.push('<');
                for (index, arg) in args.iter().enumerate() {
                    if index > 0 {
                        out.push(',');
                    }
                    self.write_sig(out, Some(*arg), true, depth, budget);
                }
                out.push('>');
            }
            TypeNameStyle::Reflection => {
                out.push('[');
                for (index, arg) in args.iter().enumerate() {
                    if index > 0 {
                        out.push(',');
                    }
                    out.push('[');
                    self.write_assembly_qualified(out, *arg, depth, budget);
                    out.push(']');
                }
                out.push(']');
            }
        }
    }

    fn write_array_shape(&self, out: &mut String, array: &ArraySig) {
        let rank = array.rank();
        out.push('[');
        if rank == 0 {
            out.push_str("<RANK0>");
        } else if self.style == TypeNameStyle::Reflection {
            if rank == 1 {
                out.push('*');
            }
            for _ in 1..rank {
                out.push(',');
            }
        } else {
            for dimension in 0..rank as usize {
                if dimension > 0 {
                    out.push(',');
                }

                let lower = array.lower_bounds().get(dimension).copied();
                let size = array.sizes().get(dimension).copied();
                match (lower, size) {
                    (Some(lower), Some(size)) => {
                        let upper = i64::from(lower) + i64::from(size) - 1;
                        let _ = write!(out, "{lower}..{upper}");
                    }
                    (Some(lower), None) => {
                        let _ = write!(out, "{lower}...");
                    }
                    (None, Some(size)) => {
                        let _ = write!(out, "0..{}", i64::from(size) - 1);
                    }
                    (None, None) => {}
                }
            }
        }
        out.push(']');
    }

    fn write_fn_ptr(
        &self,
        out: &mut String,
        signature: &CallingConventionSig,
        depth: usize,
        budget: &mut RenderBudget,
    ) {
        let method = match (self.style, signature.as_method()) {
            (TypeNameStyle::Source, Some(method)) => method,
            _ => {
                out.push_str("(fnptr)");
                return;
            }
        };

        out.push_str("method ");
        self.write_sig(out, method.ret_type, true, depth, budget);
        out.push_str(" *(");
        for (index, param) in method.params.iter().enumerate() {
            if index > 0 {
                out.push(',');
            }
            self.write_sig(out, Some(*param), true, depth, budget);
        }
        if let Some(varargs) = &method.params_after_sentinel {
            if !method.params.is_empty() {
                out.push(',');
            }
            out.push_str("...");
            for param in varargs {
                out.push(',');
                self.write_sig(out, Some(*param), true, depth, budget);
            }
        }
        out.push(')');
    }

    fn namespace_of(&self, id: Option<SigId>, depth: usize) -> String {
        if depth >= self.limits.max_format_depth {
            return String::new();
        }

        let leaf = id.and_then(|id| leaf_sig(self.arena, id));
        match leaf.and_then(|leaf| self.arena.get(leaf)) {
            Some(TypeSig::Class(sig) | TypeSig::ValueType(sig)) => {
                self.token_namespace(sig.token(), depth + 1)
            }
            Some(TypeSig::CorLib(sig)) => sig.primitive().namespace().to_string(),
            Some(TypeSig::GenericInst(sig)) => self.namespace_of(sig.generic_type(), depth + 1),
            _ => String::new(),
        }
    }

    fn token_namespace(&self, token: Token, depth: usize) -> String {
        if depth >= self.limits.max_format_depth {
            return String::new();
        }

        match self.source.type_reference(token) {
            None => String::new(),
            Some(TypeReference::TypeSpec { signature }) => self.namespace_of(*signature, depth + 1),
            Some(reference) => match reference.declaring_type() {
                Some(outer) => self.token_namespace(outer, depth + 1),
                None => reference.namespace().to_string(),
            },
        }
    }
}

impl<S: TypeReferenceSource + ?Sized> Clone for FullNameFormatter<'_, S> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<S: TypeReferenceSource + ?Sized> Copy for FullNameFormatter<'_, S> {}
