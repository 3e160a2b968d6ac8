//! Integration tests for the type signature model.
//!
//! Covers the structural guarantees of the node model end to end through the public API:
//! child links per family, innermost-terminal traversal, generic argument replacement,
//! array shapes, cycle safe ownership resolution, modifier identity and blob decoding.

use dotsig::{
    metadata::signatures::{chain, remove_modifiers, SignatureTag, INFINITE_RECURSION_MARKER},
    prelude::*,
};

/// Registry with a core library, an application assembly and a handful of types
struct World {
    arena: SignatureArena,
    registry: TypeRegistry,
    types: CorLibTypes,
    corlib: dotsig::metadata::typesystem::AssemblyId,
    app: dotsig::metadata::typesystem::AssemblyId,
    module: dotsig::metadata::typesystem::ModuleId,
    program: Token,
    list: Token,
    is_const: Token,
}

fn world() -> World {
    let mut arena = SignatureArena::new();
    let mut registry = TypeRegistry::new();

    let corlib = registry.add_assembly(
        AssemblyIdentity::new("mscorlib", AssemblyVersion::new(4, 0, 0, 0))
            .with_public_key_token([0xb7, 0x7a, 0x5c, 0x56, 0x19, 0x34, 0xe0, 0x89]),
    );
    let app = registry.add_assembly(AssemblyIdentity::new(
        "App",
        AssemblyVersion::new(1, 0, 0, 0),
    ));
    let module = registry.add_module("App.dll", Some(app));
    let types = CorLibTypes::new(&mut arena, &mut registry, module, corlib);

    let program = registry.add_type_def(module, "App", "Program", None);
    let list = registry.add_type_ref(
        module,
        ResolutionScope::Assembly(corlib),
        "System.Collections.Generic",
        "List`1",
    );
    let is_const = registry.add_type_ref(
        module,
        ResolutionScope::Assembly(corlib),
        "System.Runtime.CompilerServices",
        "IsConst",
    );

    World {
        arena,
        registry,
        types,
        corlib,
        app,
        module,
        program,
        list,
        is_const,
    }
}

/// One node of every terminal variant
fn terminals(world: &mut World) -> Vec<SigId> {
    let arena = &mut world.arena;
    let class = arena.class(world.program);
    let value_type = arena.value_type(world.program);
    let var = arena.var(0);
    let mvar = arena.mvar(2);
    let sentinel = arena.sentinel();
    let fn_ptr = arena.fn_ptr(CallingConventionSig::Method(MethodSig::new_static(
        world.types.void(),
        vec![world.types.int32()],
    )));
    let open = arena.class(world.list);
    let inst = arena.generic_inst(open, [world.types.string()]);

    vec![
        class,
        value_type,
        world.types.int32(),
        var,
        mvar,
        sentinel,
        fn_ptr,
        inst,
    ]
}

#[test]
fn terminals_never_expose_a_child() {
    let mut world = world();
    for id in terminals(&mut world) {
        let sig = world.arena.get(id).unwrap();
        assert!(sig.is_leaf(), "{:?} should be a terminal", sig.tag());
        assert!(sig.tag().is_leaf());
        assert_eq!(sig.next(), None);
    }
}

#[test]
fn wrappers_expose_the_constructed_child() {
    let mut world = world();
    let child = world.types.int32();
    let arena = &mut world.arena;

    let wrappers = [
        arena.ptr(child),
        arena.by_ref(child),
        arena.sz_array(child),
        arena.pinned(child),
        arena.array_with_rank(child, 2),
        arena.cmod_reqd(world.is_const, child),
        arena.cmod_opt(world.is_const, child),
        arena.value_array(child, 8),
        arena.module(1, child),
    ];
    for id in wrappers {
        let sig = arena.get(id).unwrap();
        assert!(!sig.is_leaf());
        assert_eq!(sig.next(), Some(child), "{:?}", sig.tag());
    }

    let empty = [
        arena.ptr(None),
        arena.by_ref(None),
        arena.sz_array(None),
        arena.pinned(None),
        arena.array(None),
        arena.cmod_opt(world.is_const, None),
        arena.value_array(None, 1),
        arena.module(0, None),
    ];
    for id in empty {
        assert_eq!(arena.next(id), None);
        assert_eq!(leaf_sig(arena, id), None);
    }
}

#[test]
fn wrapping_three_times_unwraps_to_the_terminal() {
    let mut world = world();
    for terminal in terminals(&mut world) {
        let ptr = world.arena.ptr(terminal);
        let by_ref = world.arena.by_ref(ptr);
        let array = world.arena.sz_array(by_ref);

        assert_eq!(leaf_sig(&world.arena, array), Some(terminal));

        let tags: Vec<SignatureTag> = chain(&world.arena, array)
            .map(|(_, sig)| sig.tag())
            .take(3)
            .collect();
        assert_eq!(
            tags,
            vec![SignatureTag::SzArray, SignatureTag::ByRef, SignatureTag::Ptr]
        );
    }
}

#[test]
fn replace_arguments_is_total() {
    let mut world = world();
    let open = world.arena.class(world.list);
    let (a, b, c) = (world.arena.var(0), world.arena.var(1), world.arena.mvar(0));
    let inst = world
        .arena
        .generic_inst(open, [world.types.int32(), world.types.string()]);

    let sig = world.arena.generic_inst_mut(inst).unwrap();
    sig.replace_arguments([]);
    assert_eq!(sig.arg_count(), 0);

    sig.replace_arguments([a, b, c]);
    assert_eq!(sig.generic_arguments(), &[a, b, c]);

    sig.replace_arguments([c]);
    assert_eq!(sig.generic_arguments().iter().copied().collect::<Vec<_>>(), vec![c]);
    assert_eq!(sig.generic_type(), Some(open));
}

#[test]
fn array_rank_is_independent_of_sizes() {
    let mut world = world();
    let array = world
        .arena
        .array_with_shape(world.types.int32(), 3, [], []);

    let shape = world.arena.get(array).unwrap().as_array().unwrap();
    assert_eq!(shape.rank(), 3);
    assert_eq!(shape.sizes().len(), 0);
    assert_eq!(shape.lower_bounds().len(), 0);

    let shape = world.arena.array_mut(array).unwrap();
    shape.set_sizes([4, 5]);
    shape.set_lower_bounds([1]);
    assert_eq!(shape.rank(), 3);
    assert_eq!(shape.sizes(), &[4, 5]);
    assert_eq!(shape.lower_bounds(), &[1]);

    let formatter = FullNameFormatter::new(&world.arena, &world.registry);
    assert_eq!(formatter.full_name(array), "System.Int32[1..4,0..4,]");
}

#[test]
fn self_referential_spec_has_no_owner() {
    let mut world = world();
    let spec = world.registry.add_type_spec(None);
    let class = world.arena.class(spec);
    let array = world.arena.sz_array(class);
    world
        .registry
        .set_type_spec_signature(spec, Some(array))
        .unwrap();

    let resolver = OwnershipResolver::new(&world.arena, &world.registry);
    assert_eq!(resolver.defining_assembly(array), None);
    assert_eq!(resolver.owner_module(array), None);
    assert!(matches!(
        resolver.try_defining_assembly(array),
        Err(Error::CyclicReference(token)) if token == spec
    ));

    let formatter = FullNameFormatter::new(&world.arena, &world.registry);
    assert!(formatter
        .full_name(array)
        .contains(dotsig::metadata::signatures::INFINITE_RECURSION_MARKER));
}

#[test]
fn long_cyclic_chain_has_no_owner() {
    let mut world = world();
    let spec = world.registry.add_type_spec(None);

    let mut top = world.arena.class(spec);
    for index in 0..1500 {
        top = if index % 2 == 0 {
            world.arena.ptr(top)
        } else {
            world.arena.sz_array(top)
        };
    }
    world.registry.set_type_spec_signature(spec, Some(top)).unwrap();

    let resolver = OwnershipResolver::new(&world.arena, &world.registry);
    assert_eq!(resolver.defining_assembly(top), None);
    assert_eq!(resolver.owner_module(top), None);
    assert!(resolver.try_owner_module(top).is_err());

    // A strict budget gives up before even reaching the reference
    let strict = resolver.with_limits(SignatureLimits::strict());
    assert!(matches!(
        strict.try_defining_assembly(top),
        Err(Error::RecursionLimit(256))
    ));
}

#[test]
fn ownership_tunnels_through_wrappers() {
    let mut world = world();
    let class = world.arena.class(world.program);
    let array = world.arena.array_with_rank(class, 2);
    let ptr = world.arena.ptr(array);

    let var = world.arena.var(0);
    let var_ptr = world.arena.ptr(var);

    let resolver = OwnershipResolver::new(&world.arena, &world.registry);
    assert_eq!(resolver.owner_module(ptr), resolver.owner_module(class));
    assert_eq!(resolver.owner_module(ptr), Some(world.module));
    assert_eq!(resolver.defining_assembly(ptr), Some(world.app));
    assert_eq!(resolver.owner_module(var_ptr), None);
    assert_eq!(resolver.defining_assembly(var_ptr), None);

    let open = world.arena.class(world.list);
    let inst = world.arena.generic_inst(open, [class]);
    let resolver = OwnershipResolver::new(&world.arena, &world.registry);
    assert_eq!(resolver.defining_assembly(inst), Some(world.corlib));
    assert_eq!(
        resolver.defining_assembly(world.types.string()),
        Some(world.corlib)
    );
}

#[test]
fn required_and_optional_modifiers_differ() {
    let mut world = world();
    let int = world.types.int32();
    let required = world.arena.cmod_reqd(world.is_const, int);
    let optional = world.arena.cmod_opt(world.is_const, int);

    assert_ne!(world.arena.tag(required), world.arena.tag(optional));
    assert_ne!(world.arena.get(required), world.arena.get(optional));

    let comparer = SigComparer::new(&world.arena);
    assert!(!comparer.equals(Some(required), Some(optional)));
    assert_ne!(
        signature_hash(&world.arena, required),
        signature_hash(&world.arena, optional)
    );

    let formatter = FullNameFormatter::new(&world.arena, &world.registry);
    assert_ne!(formatter.full_name(required), formatter.full_name(optional));

    assert_ne!(
        encode_type_sig(&world.arena, Some(required)).unwrap(),
        encode_type_sig(&world.arena, Some(optional)).unwrap()
    );
    assert_eq!(remove_modifiers(&world.arena, Some(required)), Some(int));
    assert_eq!(remove_modifiers(&world.arena, Some(optional)), Some(int));
}

#[test]
fn decode_pointer_to_array_of_const_int32() {
    let mut world = world();
    let row = world.is_const.row();
    assert!(row < 0x20);

    // PTR ARRAY CMOD_OPT <IsConst> I4 rank=2 num_sizes=0 num_lo_bounds=0
    #[allow(clippy::cast_possible_truncation)]
    let coded = ((row << 2) | 1) as u8;
    let blob = [0x0F, 0x14, 0x20, coded, 0x08, 0x02, 0x00, 0x00];

    let id = parse_type_sig(&blob, &mut world.arena, &world.types)
        .unwrap()
        .unwrap();

    let tags: Vec<SignatureTag> = chain(&world.arena, id).map(|(_, sig)| sig.tag()).collect();
    assert_eq!(
        tags,
        vec![
            SignatureTag::Ptr,
            SignatureTag::Array,
            SignatureTag::CModOpt,
            SignatureTag::CorLib,
        ]
    );

    let array = world.arena.next(id).unwrap();
    assert!(world.arena.get(array).unwrap().as_array().unwrap().rank() >= 2);

    let modifier = world.arena.next(array).unwrap();
    let (modifier_sig, required) = world.arena.get(modifier).unwrap().as_modifier().unwrap();
    assert!(!required);
    assert_eq!(modifier_sig.modifier(), world.is_const);

    assert_eq!(leaf_sig(&world.arena, id), Some(world.types.int32()));
    assert_eq!(
        world.types.primitive_of(world.types.int32()),
        Some(CorLibPrimitive::I4)
    );

    let formatter = FullNameFormatter::new(&world.arena, &world.registry);
    assert_eq!(
        formatter.full_name(id),
        "System.Int32 modopt(System.Runtime.CompilerServices.IsConst)[,]*"
    );
    assert_eq!(
        formatter
            .with_style(TypeNameStyle::Reflection)
            .full_name(id),
        "System.Int32[,]*"
    );

    assert_eq!(encode_type_sig(&world.arena, Some(id)).unwrap(), blob);
}

#[test]
fn reflection_names_qualify_generic_arguments() {
    let mut world = world();
    let open = world.arena.class(world.list);
    let program = world.arena.class(world.program);
    let inst = world.arena.generic_inst(open, [program, world.types.int32()]);

    let formatter =
        FullNameFormatter::new(&world.arena, &world.registry).with_style(TypeNameStyle::Reflection);
    assert_eq!(
        formatter.full_name(inst),
        "System.Collections.Generic.List`1[[App.Program, App, Version=1.0.0.0, Culture=neutral, PublicKeyToken=null],\
         [System.Int32, mscorlib, Version=4.0.0.0, Culture=neutral, PublicKeyToken=b77a5c561934e089]]"
    );
    assert_eq!(
        formatter.assembly_qualified_name(program),
        "App.Program, App, Version=1.0.0.0, Culture=neutral, PublicKeyToken=null"
    );
}

#[test]
fn hostile_blobs_do_not_panic() {
    let mut world = world();
    let blobs: [&[u8]; 8] = [
        &[],
        &[0xFF],
        &[0x15, 0x15, 0x15, 0x15],
        &[0x14, 0x08, 0xFF, 0xFF, 0xFF, 0xFF],
        &[0x1B, 0x1B, 0x1B, 0x1B, 0x1B],
        &[0x12, 0x03],
        &[0x0F; 4096],
        &[0x15, 0x12, 0x05, 0xDF, 0xFF, 0xFF, 0xFF],
    ];

    for blob in blobs {
        if let Ok(Some(id)) = parse_type_sig(blob, &mut world.arena, &world.types) {
            let resolver = OwnershipResolver::new(&world.arena, &world.registry);
            let _ = resolver.defining_assembly(id);
            let _ = FullNameFormatter::new(&world.arena, &world.registry).full_name(id);
        }
    }
}

#[test]
fn shared_children_stay_linear() {
    let mut world = world();
    let open = world.arena.class(world.list);

    // Each level names the previous one twice, 64 levels expand to 2^64 leaves
    let mut build = |leaf: SigId| {
        let mut level = leaf;
        for _ in 0..64 {
            level = world.arena.generic_inst(open, [level, level]);
        }
        level
    };
    let int = world.types.int32();
    let string = world.types.string();
    let left = build(int);
    let right = build(int);
    let other = build(string);

    let comparer = SigComparer::new(&world.arena);
    assert!(comparer.equals(Some(left), Some(right)));
    assert!(!comparer.equals(Some(left), Some(other)));
    assert_eq!(
        signature_hash(&world.arena, left),
        signature_hash(&world.arena, right)
    );

    let formatter = FullNameFormatter::new(&world.arena, &world.registry);
    let name = formatter.full_name(left);
    assert!(name.starts_with("System.Collections.Generic.List`1<"));
    assert!(name.contains(INFINITE_RECURSION_MARKER));

    let resolver = OwnershipResolver::new(&world.arena, &world.registry);
    assert_eq!(resolver.defining_assembly(left), Some(world.corlib));
}
