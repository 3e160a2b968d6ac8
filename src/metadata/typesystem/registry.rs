//! Type reference table backing the signature model.
//!
//! This module provides the [`TypeRegistry`], the collection of assemblies, modules and type
//! references that the tokens inside signatures point at. A signature node never owns the
//! type it names; it holds a [`Token`] and asks a [`TypeReferenceSource`] for the
//! [`TypeReference`] behind it.
//!
//! # Key Components
//!
//! - [`TypeRegistry`] - Owned table of assemblies, modules and type references
//! - [`TypeReference`] - A declared type, a forward reference or a type specification
//! - [`ResolutionScope`] - Where a forward reference points
//! - [`TypeReferenceSource`] - Lookup contract consumed by ownership resolution and naming
//!
//! # Token Assignment
//!
//! The `add_*` methods assign the next free row of the matching table (`TypeDef` 0x02,
//! `TypeRef` 0x01 or `TypeSpec` 0x1B). [`TypeRegistry::insert`] places a reference at an
//! explicit token, for callers that mirror existing metadata tables.
//!
//! # Examples
//!
//! ```rust
//! use dotsig::metadata::identity::{AssemblyIdentity, AssemblyVersion};
//! use dotsig::metadata::typesystem::{ResolutionScope, TypeReferenceSource, TypeRegistry};
//!
//! let mut registry = TypeRegistry::new();
//! let corlib = registry.add_assembly(AssemblyIdentity::new("mscorlib", AssemblyVersion::new(4, 0, 0, 0)));
//! let app = registry.add_assembly(AssemblyIdentity::new("App", AssemblyVersion::new(1, 0, 0, 0)));
//! let module = registry.add_module("App.dll", Some(app));
//!
//! let program = registry.add_type_def(module, "App", "Program", None);
//! let object = registry.add_type_ref(module, ResolutionScope::Assembly(corlib), "System", "Object");
//!
//! assert_eq!(program.value(), 0x0200_0001);
//! assert_eq!(object.value(), 0x0100_0001);
//! assert_eq!(registry.type_reference(object).map(|r| r.name()), Some("Object"));
//! ```

use std::collections::BTreeMap;

use crate::{
    metadata::{identity::AssemblyIdentity, signatures::SigId, token::Token},
    Error, Result,
};

/// Handle of an assembly inside a [`TypeRegistry`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct AssemblyId(u32);

impl AssemblyId {
    /// Creates a handle from a raw index
    #[must_use]
    pub const fn new(index: u32) -> Self {
        AssemblyId(index)
    }

    /// The raw index
    #[must_use]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// Handle of a module inside a [`TypeRegistry`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ModuleId(u32);

impl ModuleId {
    /// Creates a handle from a raw index
    #[must_use]
    pub const fn new(index: u32) -> Self {
        ModuleId(index)
    }

    /// The raw index
    #[must_use]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// A module and the assembly it belongs to
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModuleDef {
    /// Module file name (e.g. "App.dll")
    pub name: String,
    /// The assembly that contains this module, `None` for a standalone netmodule
    pub assembly: Option<AssemblyId>,
}

/// Resolution scope of a forward type reference (II.22.38)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResolutionScope {
    /// The type is defined in another assembly
    Assembly(AssemblyId),
    /// The type is defined in another module of the same assembly
    Module(ModuleId),
    /// The type is nested in the type named by this `TypeRef` token
    Nested(Token),
    /// The scope is unknown (a null `ResolutionScope`)
    None,
}

/// An entry of the type reference table
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeReference {
    /// A type declared in `module`
    TypeDef {
        /// The declaring module
        module: ModuleId,
        /// Namespace, empty for nested and global types
        namespace: String,
        /// Simple name including the generic arity suffix (e.g. "List`1")
        name: String,
        /// The enclosing `TypeDef` of a nested type
        enclosing: Option<Token>,
    },
    /// A forward reference to a type defined elsewhere
    TypeRef {
        /// The module holding the reference
        module: ModuleId,
        /// Where the referenced type lives
        scope: ResolutionScope,
        /// Namespace, empty for nested types
        namespace: String,
        /// Simple name
        name: String,
    },
    /// A constructed type built from a signature
    TypeSpec {
        /// The signature, `None` when it failed to decode or is not bound yet
        signature: Option<SigId>,
    },
}

impl TypeReference {
    /// The metadata table this kind of reference lives in
    #[must_use]
    pub fn table(&self) -> u8 {
        match self {
            TypeReference::TypeDef { .. } => Token::TYPE_DEF,
            TypeReference::TypeRef { .. } => Token::TYPE_REF,
            TypeReference::TypeSpec { .. } => Token::TYPE_SPEC,
        }
    }

    /// Simple name, empty for type specifications
    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            TypeReference::TypeDef { name, .. } | TypeReference::TypeRef { name, .. } => name,
            TypeReference::TypeSpec { .. } => "",
        }
    }

    /// Namespace, empty for type specifications
    #[must_use]
    pub fn namespace(&self) -> &str {
        match self {
            TypeReference::TypeDef { namespace, .. }
            | TypeReference::TypeRef { namespace, .. } => namespace,
            TypeReference::TypeSpec { .. } => "",
        }
    }

    /// The enclosing type of a nested declared type or nested forward reference
    #[must_use]
    pub fn declaring_type(&self) -> Option<Token> {
        match self {
            TypeReference::TypeDef { enclosing, .. } => *enclosing,
            TypeReference::TypeRef {
                scope: ResolutionScope::Nested(outer),
                ..
            } => Some(*outer),
            _ => None,
        }
    }
}

/// Lookup contract for everything a signature token can point at
///
/// Ownership resolution and name rendering only read through this trait, so callers can back
/// signatures with their own metadata model instead of a [`TypeRegistry`].
pub trait TypeReferenceSource {
    /// The type reference behind `token`
    fn type_reference(&self, token: Token) -> Option<&TypeReference>;

    /// The module behind `module`
    fn module(&self, module: ModuleId) -> Option<&ModuleDef>;

    /// The identity of assembly `id`
    fn assembly(&self, id: AssemblyId) -> Option<&AssemblyIdentity>;

    /// The assembly containing `module`
    fn module_assembly(&self, module: ModuleId) -> Option<AssemblyId> {
        self.module(module).and_then(|def| def.assembly)
    }
}

/// Owned table of assemblies, modules and type references
#[derive(Debug, Clone, Default)]
pub struct TypeRegistry {
    assemblies: Vec<AssemblyIdentity>,
    modules: Vec<ModuleDef>,
    types: BTreeMap<Token, TypeReference>,
    next_type_def: u32,
    next_type_ref: u32,
    next_type_spec: u32,
}

impl TypeRegistry {
    /// Creates an empty registry
    #[must_use]
    pub fn new() -> Self {
        TypeRegistry {
            assemblies: Vec::new(),
            modules: Vec::new(),
            types: BTreeMap::new(),
            next_type_def: 1,
            next_type_ref: 1,
            next_type_spec: 1,
        }
    }

    /// Registers an assembly
    #[allow(clippy::cast_possible_truncation)]
    pub fn add_assembly(&mut self, identity: AssemblyIdentity) -> AssemblyId {
        self.assemblies.push(identity);
        AssemblyId::new((self.assemblies.len() - 1) as u32)
    }

    /// Registers a module, optionally as part of `assembly`
    #[allow(clippy::cast_possible_truncation)]
    pub fn add_module(&mut self, name: impl Into<String>, assembly: Option<AssemblyId>) -> ModuleId {
        self.modules.push(ModuleDef {
            name: name.into(),
            assembly,
        });
        ModuleId::new((self.modules.len() - 1) as u32)
    }

    /// Adds a declared type at the next free `TypeDef` row
    pub fn add_type_def(
        &mut self,
        module: ModuleId,
        namespace: impl Into<String>,
        name: impl Into<String>,
        enclosing: Option<Token>,
    ) -> Token {
        let token = Token::from_parts(Token::TYPE_DEF, self.next_type_def);
        self.next_type_def += 1;
        self.types.insert(
            token,
            TypeReference::TypeDef {
                module,
                namespace: namespace.into(),
                name: name.into(),
                enclosing,
            },
        );
        token
    }

    /// Adds a forward reference at the next free `TypeRef` row
    pub fn add_type_ref(
        &mut self,
        module: ModuleId,
        scope: ResolutionScope,
        namespace: impl Into<String>,
        name: impl Into<String>,
    ) -> Token {
        let token = Token::from_parts(Token::TYPE_REF, self.next_type_ref);
        self.next_type_ref += 1;
        self.types.insert(
            token,
            TypeReference::TypeRef {
                module,
                scope,
                namespace: namespace.into(),
                name: name.into(),
            },
        );
        token
    }

    /// Adds a type specification at the next free `TypeSpec` row
    ///
    /// The signature can be bound later with [`TypeRegistry::set_type_spec_signature`],
    /// which is required when the signature refers to the specification itself.
    pub fn add_type_spec(&mut self, signature: Option<SigId>) -> Token {
        let token = Token::from_parts(Token::TYPE_SPEC, self.next_type_spec);
        self.next_type_spec += 1;
        self.types
            .insert(token, TypeReference::TypeSpec { signature });
        token
    }

    /// Places `reference` at an explicit token
    ///
    /// # Errors
    /// Returns [`crate::Error::TypeInsert`] if the token is the null row, belongs to a
    /// table that does not match the kind of `reference`, or is already occupied.
    pub fn insert(&mut self, token: Token, reference: TypeReference) -> Result<()> {
        if token.row() == 0 || token.table() != reference.table() || self.types.contains_key(&token)
        {
            return Err(Error::TypeInsert(token));
        }

        let next = token.row() + 1;
        let counter = match reference.table() {
            Token::TYPE_DEF => &mut self.next_type_def,
            Token::TYPE_REF => &mut self.next_type_ref,
            _ => &mut self.next_type_spec,
        };
        *counter = (*counter).max(next);

        self.types.insert(token, reference);
        Ok(())
    }

    /// Binds the signature of an existing type specification
    ///
    /// # Errors
    /// Returns [`crate::Error::TypeNotFound`] if `token` is not a registered `TypeSpec`.
    pub fn set_type_spec_signature(&mut self, token: Token, signature: Option<SigId>) -> Result<()> {
        match self.types.get_mut(&token) {
            Some(TypeReference::TypeSpec { signature: slot }) => {
                *slot = signature;
                Ok(())
            }
            _ => Err(Error::TypeNotFound(token)),
        }
    }

    /// Looks up a type reference
    #[must_use]
    pub fn get(&self, token: Token) -> Option<&TypeReference> {
        self.types.get(&token)
    }

    /// Finds the first declared type or forward reference with the given full name
    #[must_use]
    pub fn find(&self, namespace: &str, name: &str) -> Option<Token> {
        self.types
            .iter()
            .find(|(_, reference)| {
                !matches!(reference, TypeReference::TypeSpec { .. })
                    && reference.namespace() == namespace
                    && reference.name() == name
            })
            .map(|(token, _)| *token)
    }

    /// Number of type references
    #[must_use]
    pub fn len(&self) -> usize {
        self.types.len()
    }

    /// Returns true if no type reference is registered
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    /// Iterates the type references in token order
    pub fn iter(&self) -> impl Iterator<Item = (Token, &TypeReference)> {
        self.types.iter().map(|(token, reference)| (*token, reference))
    }

    /// All registered assemblies
    #[must_use]
    pub fn assemblies(&self) -> &[AssemblyIdentity] {
        &self.assemblies
    }

    /// All registered modules
    #[must_use]
    pub fn modules(&self) -> &[ModuleDef] {
        &self.modules
    }
}

impl TypeReferenceSource for TypeRegistry {
    fn type_reference(&self, token: Token) -> Option<&TypeReference> {
        self.types.get(&token)
    }

    fn module(&self, module: ModuleId) -> Option<&ModuleDef> {
        self.modules.get(module.index())
    }

    fn assembly(&self, id: AssemblyId) -> Option<&AssemblyIdentity> {
        self.assemblies.get(id.index())
    }
}
