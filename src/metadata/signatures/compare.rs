//! Structural equality and hashing of type signatures.
//!
//! Two nodes are equal when they have the same tag, the same payload and structurally equal
//! children, generic arguments and function pointer signatures. Tokens are compared by
//! value, so `Class(TypeRef 1)` and `Class(TypeDef 1)` differ even if the reference resolves
//! to the definition. A required and an optional modifier are never equal.
//!
//! [`signature_hash`] is consistent with [`SigComparer::equals`]: equal signatures always
//! hash to the same value.
//!
//! Children may be shared, so a signature is a DAG rather than a tree. Both walks remember
//! what they already visited during one call: a pair proven equal is not compared again and
//! a node is hashed once. The work of one call is therefore linear in the number of
//! distinct nodes (or node pairs), and is additionally capped by `max_resolution_steps`.

use std::collections::{HashMap, HashSet};

use crate::metadata::{
    limits::SignatureLimits,
    signatures::{CallingConventionSig, MethodSig, SigId, SignatureArena, TypeSig},
    typesystem::TypeSignatureHash,
};

/// Depth bounded structural comparer over one arena
pub struct SigComparer<'a> {
    arena: &'a SignatureArena,
    limits: SignatureLimits,
}

/// State of one [`SigComparer::equals`] call
#[derive(Default)]
struct PairWalk {
    proven: HashSet<(SigId, SigId)>,
    active: HashSet<(SigId, SigId)>,
    steps: usize,
}

/// State of one [`SigComparer::hash`] call
#[derive(Default)]
struct HashWalk {
    done: HashMap<SigId, u64>,
    active: HashSet<SigId>,
    steps: usize,
}

impl<'a> SigComparer<'a> {
    /// Create a comparer for nodes of `arena`
    #[must_use]
    pub fn new(arena: &'a SignatureArena) -> Self {
        SigComparer {
            arena,
            limits: SignatureLimits::default(),
        }
    }

    /// Set the comparison limits, `max_format_depth` and `max_resolution_steps` are used
    #[must_use]
    pub fn with_limits(mut self, limits: SignatureLimits) -> Self {
        self.limits = limits;
        self
    }

    /// Structural equality of two possibly absent nodes
    ///
    /// Two absent nodes are equal. Comparisons that nest deeper than the configured depth,
    /// that run into a cycle between two distinct nodes or that exceed the step budget are
    /// reported as not equal.
    #[must_use]
    pub fn equals(&self, a: Option<SigId>, b: Option<SigId>) -> bool {
        self.equals_at(&mut PairWalk::default(), a, b, 0)
    }

    /// Structural hash of a possibly absent node
    #[must_use]
    pub fn hash(&self, id: Option<SigId>) -> u64 {
        self.node_hash(&mut HashWalk::default(), id, 0).0
    }

    fn equals_at(
        &self,
        walk: &mut PairWalk,
        a: Option<SigId>,
        b: Option<SigId>,
        depth: usize,
    ) -> bool {
        // A dangling id behaves like an absent node
        let a = a.filter(|id| self.arena.contains(*id));
        let b = b.filter(|id| self.arena.contains(*id));
        let (a, b) = match (a, b) {
            (None, None) => return true,
            (Some(a), Some(b)) => (a, b),
            _ => return false,
        };
        if a == b || walk.proven.contains(&(a, b)) {
            return true;
        }
        if depth >= self.limits.max_format_depth
            || walk.steps >= self.limits.max_resolution_steps
        {
            return false;
        }
        if !walk.active.insert((a, b)) {
            return false;
        }
        walk.steps += 1;

        let equal = self.node_equals(walk, a, b, depth + 1);
        walk.active.remove(&(a, b));
        if equal {
            walk.proven.insert((a, b));
        }
        equal
    }

    fn node_equals(&self, walk: &mut PairWalk, a: SigId, b: SigId, depth: usize) -> bool {
        let (Some(left), Some(right)) = (self.arena.get(a), self.arena.get(b)) else {
            return false;
        };

        match (left, right) {
            (TypeSig::Class(x), TypeSig::Class(y)) | (TypeSig::ValueType(x), TypeSig::ValueType(y)) => {
                x.token() == y.token()
            }
            (TypeSig::CorLib(x), TypeSig::CorLib(y)) => x.primitive() == y.primitive(),
            (TypeSig::Var(x), TypeSig::Var(y)) | (TypeSig::MVar(x), TypeSig::MVar(y)) => {
                x.number() == y.number()
            }
            (TypeSig::Sentinel, TypeSig::Sentinel) => true,
            (TypeSig::FnPtr(x), TypeSig::FnPtr(y)) => {
                self.calling_convention_equals(walk, x.signature(), y.signature(), depth)
            }
            (TypeSig::GenericInst(x), TypeSig::GenericInst(y)) => {
                self.equals_at(walk, x.generic_type(), y.generic_type(), depth)
                    && self.list_equals(walk, x.generic_arguments(), y.generic_arguments(), depth)
            }
            (TypeSig::Ptr(x), TypeSig::Ptr(y))
            | (TypeSig::ByRef(x), TypeSig::ByRef(y))
            | (TypeSig::SzArray(x), TypeSig::SzArray(y))
            | (TypeSig::Pinned(x), TypeSig::Pinned(y)) => {
                self.equals_at(walk, x.next(), y.next(), depth)
            }
            (TypeSig::Array(x), TypeSig::Array(y)) => {
                x.rank() == y.rank()
                    && x.sizes() == y.sizes()
                    && x.lower_bounds() == y.lower_bounds()
                    && self.equals_at(walk, x.next(), y.next(), depth)
            }
            (TypeSig::CModReqd(x), TypeSig::CModReqd(y)) | (TypeSig::CModOpt(x), TypeSig::CModOpt(y)) => {
                x.modifier() == y.modifier() && self.equals_at(walk, x.next(), y.next(), depth)
            }
            (TypeSig::ValueArray(x), TypeSig::ValueArray(y)) => {
                x.size() == y.size() && self.equals_at(walk, x.next(), y.next(), depth)
            }
            (TypeSig::Module(x), TypeSig::Module(y)) => {
                x.index() == y.index() && self.equals_at(walk, x.next(), y.next(), depth)
            }
            _ => false,
        }
    }

    fn list_equals(&self, walk: &mut PairWalk, a: &[SigId], b: &[SigId], depth: usize) -> bool {
        a.len() == b.len()
            && a
                .iter()
                .zip(b)
                .all(|(x, y)| self.equals_at(walk, Some(*x), Some(*y), depth))
    }

    fn method_equals(
        &self,
        walk: &mut PairWalk,
        a: &MethodSig,
        b: &MethodSig,
        depth: usize,
    ) -> bool {
        a.calling_convention == b.calling_convention
            && a.generic_param_count == b.generic_param_count
            && self.equals_at(walk, a.ret_type, b.ret_type, depth)
            && self.list_equals(walk, &a.params, &b.params, depth)
            && match (&a.params_after_sentinel, &b.params_after_sentinel) {
                (None, None) => true,
                (Some(x), Some(y)) => self.list_equals(walk, x, y, depth),
                _ => false,
            }
    }

    fn calling_convention_equals(
        &self,
        walk: &mut PairWalk,
        a: &CallingConventionSig,
        b: &CallingConventionSig,
        depth: usize,
    ) -> bool {
        match (a, b) {
            (CallingConventionSig::Method(x), CallingConventionSig::Method(y))
            | (CallingConventionSig::Property(x), CallingConventionSig::Property(y)) => {
                self.method_equals(walk, x, y, depth)
            }
            (CallingConventionSig::Field(x), CallingConventionSig::Field(y)) => {
                x.calling_convention == y.calling_convention
                    && self.equals_at(walk, x.field_type, y.field_type, depth)
            }
            (CallingConventionSig::LocalVars(x), CallingConventionSig::LocalVars(y)) => {
                x.calling_convention == y.calling_convention
                    && self.list_equals(walk, &x.locals, &y.locals, depth)
            }
            (CallingConventionSig::GenericInstMethod(x), CallingConventionSig::GenericInstMethod(y)) => {
                x.calling_convention == y.calling_convention
                    && self.list_equals(walk, &x.generic_arguments, &y.generic_arguments, depth)
            }
            _ => false,
        }
    }

    /// Hash of one node and whether it covers the whole subgraph
    ///
    /// Only complete hashes are memoized. A hash cut short by the depth limit, the step
    /// budget or a cycle depends on where the node was reached from.
    fn node_hash(&self, walk: &mut HashWalk, id: Option<SigId>, depth: usize) -> (u64, bool) {
        let Some((id, sig)) = id.and_then(|id| self.arena.get(id).map(|sig| (id, sig))) else {
            return (TypeSignatureHash::new().add_absent().finalize(), true);
        };
        if let Some(hash) = walk.done.get(&id) {
            return (*hash, true);
        }

        let truncated = TypeSignatureHash::new().add_tag(sig.tag()).finalize();
        if depth >= self.limits.max_format_depth
            || walk.steps >= self.limits.max_resolution_steps
        {
            return (truncated, false);
        }
        if !walk.active.insert(id) {
            return (truncated, false);
        }
        walk.steps += 1;

        let depth = depth + 1;
        let mut complete = true;
        let hash = TypeSignatureHash::new().add_tag(sig.tag());
        let hash = match sig {
            TypeSig::Class(x) | TypeSig::ValueType(x) => hash.add_token(&x.token()),
            TypeSig::CorLib(x) => hash.add_u64(u64::from(x.primitive().element_type())),
            TypeSig::Var(x) | TypeSig::MVar(x) => hash.add_u64(u64::from(x.number())),
            TypeSig::Sentinel => hash,
            TypeSig::FnPtr(x) => {
                let types = x.signature().referenced_types();
                let hash = hash
                    .add_u64(u64::from(x.signature().calling_convention().bits()))
                    .add_u64(types.len() as u64);
                types.into_iter().fold(hash, |hash, child| {
                    self.add_child(walk, hash, Some(child), depth, &mut complete)
                })
            }
            TypeSig::GenericInst(x) => {
                let hash = self.add_child(walk, hash, x.generic_type(), depth, &mut complete);
                let hash = hash.add_u64(x.arg_count() as u64);
                x.generic_arguments().iter().fold(hash, |hash, arg| {
                    self.add_child(walk, hash, Some(*arg), depth, &mut complete)
                })
            }
            TypeSig::Ptr(x) | TypeSig::ByRef(x) | TypeSig::SzArray(x) | TypeSig::Pinned(x) => {
                self.add_child(walk, hash, x.next(), depth, &mut complete)
            }
            TypeSig::Array(x) => {
                let mut hash = hash
                    .add_u64(u64::from(x.rank()))
                    .add_u64(x.sizes().len() as u64);
                for size in x.sizes() {
                    hash = hash.add_u64(u64::from(*size));
                }
                hash = hash.add_u64(x.lower_bounds().len() as u64);
                for bound in x.lower_bounds() {
                    hash = hash.add_component(bound);
                }
                self.add_child(walk, hash, x.next(), depth, &mut complete)
            }
            TypeSig::CModReqd(x) | TypeSig::CModOpt(x) => {
                let hash = hash.add_token(&x.modifier());
                self.add_child(walk, hash, x.next(), depth, &mut complete)
            }
            TypeSig::ValueArray(x) => {
                let hash = hash.add_u64(u64::from(x.size()));
                self.add_child(walk, hash, x.next(), depth, &mut complete)
            }
            TypeSig::Module(x) => {
                let hash = hash.add_u64(u64::from(x.index()));
                self.add_child(walk, hash, x.next(), depth, &mut complete)
            }
        }
        .finalize();

        walk.active.remove(&id);
        if complete {
            walk.done.insert(id, hash);
        }
        (hash, complete)
    }

    fn add_child(
        &self,
        walk: &mut HashWalk,
        hash: TypeSignatureHash,
        child: Option<SigId>,
        depth: usize,
        complete: &mut bool,
    ) -> TypeSignatureHash {
        let (child_hash, child_complete) = self.node_hash(walk, child, depth);
        *complete &= child_complete;
        hash.add_u64(child_hash)
    }
}

/// Structural 64-bit hash of the node `id`, consistent with [`SigComparer::equals`]
#[must_use]
pub fn signature_hash(arena: &SignatureArena, id: SigId) -> u64 {
    SigComparer::new(arena).hash(Some(id))
}
