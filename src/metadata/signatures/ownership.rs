//! Ownership resolution for type signatures.
//!
//! Every signature node can answer which module owns, and which assembly defines, the type
//! ultimately reachable from it. Wrappers delegate to their child, declared-type terminals
//! delegate to their type reference, generic instantiations delegate to their open type, and
//! generic parameters, sentinels and function pointers have no owner.
//!
//! A `TypeSpec` reference delegates back into a signature, so crafted metadata can form a
//! cycle (a specification whose signature wraps a reference to the same specification).
//! [`OwnershipResolver`] walks iteratively, remembers every reference and generic
//! instantiation it passed, and caps the total number of hops with
//! [`SignatureLimits::max_resolution_steps`]. A cycle or an exhausted budget yields "unknown
//! owner" (`None`) from the plain queries and an error from the `try_*` variants.
//!
//! # Examples
//!
//! ```rust
//! use dotsig::metadata::identity::{AssemblyIdentity, AssemblyVersion};
//! use dotsig::metadata::signatures::{OwnershipResolver, SignatureArena};
//! use dotsig::metadata::typesystem::TypeRegistry;
//!
//! let mut registry = TypeRegistry::new();
//! let asm = registry.add_assembly(AssemblyIdentity::new("App", AssemblyVersion::new(1, 0, 0, 0)));
//! let module = registry.add_module("App.dll", Some(asm));
//! let program = registry.add_type_def(module, "App", "Program", None);
//!
//! let mut arena = SignatureArena::new();
//! let class = arena.class(program);
//! let array = arena.sz_array(class);
//! let ptr = arena.ptr(array);
//!
//! let resolver = OwnershipResolver::new(&arena, &registry);
//! assert_eq!(resolver.owner_module(ptr), Some(module));
//! assert_eq!(resolver.defining_assembly(ptr), Some(asm));
//! ```

use std::collections::HashSet;

use tracing::warn;

use crate::{
    metadata::{
        limits::SignatureLimits,
        signatures::{SigId, SignatureArena, TypeSig},
        token::Token,
        typesystem::{AssemblyId, ModuleId, ResolutionScope, TypeReference, TypeReferenceSource},
    },
    Error, Result,
};

/// Position of the walk: a node or a type reference
#[derive(Debug, Clone, Copy)]
enum Cursor {
    Sig(SigId),
    Ref(Token),
}

/// What the walk is looking for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Query {
    Module,
    Assembly,
}

/// The answer of a finished walk
#[derive(Debug, Clone, Copy)]
enum Owner {
    Module(ModuleId),
    Assembly(AssemblyId),
}

/// Bounded resolver of owning modules and defining assemblies
pub struct OwnershipResolver<'a, S: TypeReferenceSource + ?Sized> {
    /// Arena holding the nodes
    arena: &'a SignatureArena,
    /// Lookup of the type references named by the nodes
    source: &'a S,
    /// Resolution step budget
    limits: SignatureLimits,
}

impl<'a, S: TypeReferenceSource + ?Sized> OwnershipResolver<'a, S> {
    /// Create a new resolver over `arena`, resolving tokens through `source`
    ///
    /// ## Arguments
    /// * 'arena' - The arena the queried ids belong to
    /// * 'source' - The type references the tokens point at
    pub fn new(arena: &'a SignatureArena, source: &'a S) -> Self {
        OwnershipResolver {
            arena,
            source,
            limits: SignatureLimits::default(),
        }
    }

    /// Set the resolution limits
    ///
    /// ## Arguments
    /// * 'limits' - Limits to apply, only `max_resolution_steps` is used
    #[must_use]
    pub fn with_limits(mut self, limits: SignatureLimits) -> Self {
        self.limits = limits;
        self
    }

    /// The module owning the type reachable from `id`, `None` if there is none or it could
    /// not be determined
    #[must_use]
    pub fn owner_module(&self, id: SigId) -> Option<ModuleId> {
        self.try_owner_module(id).ok().flatten()
    }

    /// The assembly defining the type reachable from `id`, `None` if there is none or it
    /// could not be determined
    #[must_use]
    pub fn defining_assembly(&self, id: SigId) -> Option<AssemblyId> {
        self.try_defining_assembly(id).ok().flatten()
    }

    /// The module owning the type behind `token`
    #[must_use]
    pub fn token_owner_module(&self, token: Token) -> Option<ModuleId> {
        self.walk(Cursor::Ref(token), Query::Module)
            .ok()
            .flatten()
            .and_then(Owner::module)
    }

    /// The assembly defining the type behind `token`
    #[must_use]
    pub fn token_defining_assembly(&self, token: Token) -> Option<AssemblyId> {
        self.walk(Cursor::Ref(token), Query::Assembly)
            .ok()
            .flatten()
            .and_then(Owner::assembly)
    }

    /// Checked variant of [`OwnershipResolver::owner_module`]
    ///
    /// # Errors
    /// Returns [`crate::Error::CyclicReference`] if a type reference is revisited and
    /// [`crate::Error::RecursionLimit`] if the step budget is exhausted.
    pub fn try_owner_module(&self, id: SigId) -> Result<Option<ModuleId>> {
        Ok(self
            .walk(Cursor::Sig(id), Query::Module)?
            .and_then(Owner::module))
    }

    /// Checked variant of [`OwnershipResolver::defining_assembly`]
    ///
    /// # Errors
    /// Returns [`crate::Error::CyclicReference`] if a type reference is revisited and
    /// [`crate::Error::RecursionLimit`] if the step budget is exhausted.
    pub fn try_defining_assembly(&self, id: SigId) -> Result<Option<AssemblyId>> {
        Ok(self
            .walk(Cursor::Sig(id), Query::Assembly)?
            .and_then(Owner::assembly))
    }

    fn walk(&self, start: Cursor, query: Query) -> Result<Option<Owner>> {
        let mut cursor = start;
        let mut visited_refs: HashSet<Token> = HashSet::new();
        let mut visited_insts: HashSet<SigId> = HashSet::new();
        let mut steps = 0usize;

        loop {
            steps += 1;
            if steps > self.limits.max_resolution_steps {
                warn!(
                    ?start,
                    limit = self.limits.max_resolution_steps,
                    "ownership resolution step budget exhausted"
                );
                return Err(Error::RecursionLimit(self.limits.max_resolution_steps));
            }

            cursor = match cursor {
                Cursor::Sig(id) => {
                    let Some(sig) = self.arena.get(id) else {
                        return Ok(None);
                    };

                    match sig {
                        TypeSig::Class(_) | TypeSig::ValueType(_) | TypeSig::CorLib(_) => {
                            match sig.type_def_or_ref() {
                                Some(token) => Cursor::Ref(token),
                                None => return Ok(None),
                            }
                        }
                        TypeSig::GenericInst(inst) => {
                            if !visited_insts.insert(id) {
                                warn!(?id, "generic instantiation refers back to itself");
                                return Err(Error::RecursionLimit(steps));
                            }
                            match inst.generic_type() {
                                Some(open) => Cursor::Sig(open),
                                None => return Ok(None),
                            }
                        }
                        TypeSig::Var(_) | TypeSig::MVar(_) | TypeSig::Sentinel | TypeSig::FnPtr(_) => {
                            return Ok(None)
                        }
                        _ => match sig.next() {
                            Some(next) => Cursor::Sig(next),
                            None => return Ok(None),
                        },
                    }
                }
                Cursor::Ref(token) => {
                    if !visited_refs.insert(token) {
                        warn!(%token, "cyclic type reference during ownership resolution");
                        return Err(Error::CyclicReference(token));
                    }

                    match self.source.type_reference(token) {
                        None => return Ok(None),
                        Some(TypeReference::TypeDef { module, .. }) => {
                            return Ok(match query {
                                Query::Module => Some(Owner::Module(*module)),
                                Query::Assembly => {
                                    self.source.module_assembly(*module).map(Owner::Assembly)
                                }
                            })
                        }
                        Some(TypeReference::TypeRef { module, scope, .. }) => match query {
                            Query::Module => return Ok(Some(Owner::Module(*module))),
                            Query::Assembly => match scope {
                                ResolutionScope::Assembly(assembly) => {
                                    return Ok(Some(Owner::Assembly(*assembly)))
                                }
                                ResolutionScope::Module(other) => {
                                    return Ok(self
                                        .source
                                        .module_assembly(*other)
                                        .map(Owner::Assembly))
                                }
                                ResolutionScope::Nested(outer) => Cursor::Ref(*outer),
                                ResolutionScope::None => return Ok(None),
                            },
                        },
                        Some(TypeReference::TypeSpec { signature }) => match signature {
                            Some(sig) => Cursor::Sig(*sig),
                            None => return Ok(None),
                        },
                    }
                }
            };
        }
    }
}

impl Owner {
    fn module(self) -> Option<ModuleId> {
        match self {
            Owner::Module(module) => Some(module),
            Owner::Assembly(_) => None,
        }
    }

    fn assembly(self) -> Option<AssemblyId> {
        match self {
            Owner::Assembly(assembly) => Some(assembly),
            Owner::Module(_) => None,
        }
    }
}
