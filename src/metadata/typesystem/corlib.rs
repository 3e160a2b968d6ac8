//! Shared nodes for the core library primitives.
//!
//! Blobs spell primitives with a single element-type byte, but the model treats them as
//! declared types that carry a reference into the core library. [`CorLibTypes`] creates one
//! `TypeRef` per primitive (scoped to the core library assembly) and one node per primitive,
//! and hands out the same node every time a primitive is decoded.

use strum::{EnumCount, IntoEnumIterator};

use crate::metadata::{
    signatures::{SigId, SignatureArena},
    token::Token,
    typesystem::{AssemblyId, CorLibPrimitive, ModuleId, ResolutionScope, TypeRegistry},
};

/// One shared signature node per [`CorLibPrimitive`]
#[derive(Debug, Clone)]
pub struct CorLibTypes {
    nodes: [SigId; CorLibPrimitive::COUNT],
    tokens: [Token; CorLibPrimitive::COUNT],
}

impl CorLibTypes {
    /// Registers the primitive type references and creates their nodes
    ///
    /// ## Arguments
    /// * `arena` - Arena receiving the primitive nodes
    /// * `registry` - Registry receiving one `TypeRef` per primitive
    /// * `owner_module` - Module that holds the references
    /// * `corlib_assembly` - Core library the references resolve to
    pub fn new(
        arena: &mut SignatureArena,
        registry: &mut TypeRegistry,
        owner_module: ModuleId,
        corlib_assembly: AssemblyId,
    ) -> Self {
        let mut nodes = [SigId::new(0); CorLibPrimitive::COUNT];
        let mut tokens = [Token::new(0); CorLibPrimitive::COUNT];

        for (index, primitive) in CorLibPrimitive::iter().enumerate() {
            let token = registry.add_type_ref(
                owner_module,
                ResolutionScope::Assembly(corlib_assembly),
                primitive.namespace(),
                primitive.name(),
            );
            tokens[index] = token;
            nodes[index] = arena.corlib(token, primitive);
        }

        CorLibTypes { nodes, tokens }
    }

    /// The shared node of `primitive`
    #[must_use]
    pub fn get(&self, primitive: CorLibPrimitive) -> SigId {
        self.nodes[primitive as usize]
    }

    /// The `TypeRef` token of `primitive`
    #[must_use]
    pub fn token(&self, primitive: CorLibPrimitive) -> Token {
        self.tokens[primitive as usize]
    }

    /// The shared node for a primitive element type byte
    #[must_use]
    pub fn from_element_type(&self, element_type: u8) -> Option<SigId> {
        CorLibPrimitive::from_element_type(element_type).map(|primitive| self.get(primitive))
    }

    /// The primitive whose shared node is `id`
    #[must_use]
    pub fn primitive_of(&self, id: SigId) -> Option<CorLibPrimitive> {
        CorLibPrimitive::iter().find(|primitive| self.get(*primitive) == id)
    }

    /// The shared node of `System.Void`
    #[must_use]
    pub fn void(&self) -> SigId {
        self.get(CorLibPrimitive::Void)
    }

    /// The shared node of `System.Int32`
    #[must_use]
    pub fn int32(&self) -> SigId {
        self.get(CorLibPrimitive::I4)
    }

    /// The shared node of `System.String`
    #[must_use]
    pub fn string(&self) -> SigId {
        self.get(CorLibPrimitive::String)
    }

    /// The shared node of `System.Object`
    #[must_use]
    pub fn object(&self) -> SigId {
        self.get(CorLibPrimitive::Object)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metadata::{
        identity::{AssemblyIdentity, AssemblyVersion},
        signatures::TypeSig,
        typesystem::{TypeReference, TypeReferenceSource, ELEMENT_TYPE},
    };

    #[test]
    fn test_corlib_types_are_shared() {
        let mut arena = SignatureArena::new();
        let mut registry = TypeRegistry::new();
        let corlib = registry.add_assembly(AssemblyIdentity::new(
            "mscorlib",
            AssemblyVersion::new(4, 0, 0, 0),
        ));
        let module = registry.add_module("App.dll", None);

        let types = CorLibTypes::new(&mut arena, &mut registry, module, corlib);
        assert_eq!(arena.len(), CorLibPrimitive::COUNT);
        assert_eq!(registry.len(), CorLibPrimitive::COUNT);

        let int32 = types.from_element_type(ELEMENT_TYPE::I4).unwrap();
        assert_eq!(int32, types.int32());
        assert_eq!(types.from_element_type(ELEMENT_TYPE::I4), Some(int32));
        assert_eq!(types.from_element_type(ELEMENT_TYPE::CLASS), None);
        assert_eq!(types.primitive_of(int32), Some(CorLibPrimitive::I4));

        match arena.get(int32) {
            Some(TypeSig::CorLib(sig)) => {
                assert_eq!(sig.primitive(), CorLibPrimitive::I4);
                assert_eq!(sig.token(), types.token(CorLibPrimitive::I4));
            }
            other => panic!("unexpected node {other:?}"),
        }

        match registry.type_reference(types.token(CorLibPrimitive::String)) {
            Some(TypeReference::TypeRef {
                scope, namespace, name, ..
            }) => {
                assert_eq!(*scope, ResolutionScope::Assembly(corlib));
                assert_eq!(namespace, "System");
                assert_eq!(name, "String");
            }
            other => panic!("unexpected reference {other:?}"),
        }
    }
}
