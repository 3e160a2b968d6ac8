use criterion::{criterion_group, criterion_main, BatchSize, Criterion};
use dotsig::{
    metadata::signatures::{parse_local_var_sig, parse_method_sig, parse_method_spec_sig},
    prelude::*,
};
use std::hint::black_box;

/// Registry with a core library and a couple of referenced types
struct Fixture {
    arena: SignatureArena,
    registry: TypeRegistry,
    types: CorLibTypes,
    list: Token,
    dictionary: Token,
    is_const: Token,
}

fn fixture() -> Fixture {
    let mut arena = SignatureArena::new();
    let mut registry = TypeRegistry::new();

    let corlib = registry.add_assembly(
        AssemblyIdentity::new("mscorlib", AssemblyVersion::new(4, 0, 0, 0))
            .with_public_key_token([0xb7, 0x7a, 0x5c, 0x56, 0x19, 0x34, 0xe0, 0x89]),
    );
    let app = registry.add_assembly(AssemblyIdentity::new(
        "Bench",
        AssemblyVersion::new(1, 0, 0, 0),
    ));
    let module = registry.add_module("Bench.dll", Some(app));
    let types = CorLibTypes::new(&mut arena, &mut registry, module, corlib);

    let list = registry.add_type_ref(
        module,
        ResolutionScope::Assembly(corlib),
        "System.Collections.Generic",
        "List`1",
    );
    let dictionary = registry.add_type_ref(
        module,
        ResolutionScope::Assembly(corlib),
        "System.Collections.Generic",
        "Dictionary`2",
    );
    let is_const = registry.add_type_ref(
        module,
        ResolutionScope::Assembly(corlib),
        "System.Runtime.CompilerServices",
        "IsConst",
    );

    Fixture {
        arena,
        registry,
        types,
        list,
        dictionary,
        is_const,
    }
}

/// Dictionary<string, List<int>>[]
fn nested_generic(fx: &mut Fixture) -> SigId {
    let int = fx.types.int32();
    let string = fx.types.string();
    let list = fx.arena.class(fx.list);
    let list_of_int = fx.arena.generic_inst(list, [int]);
    let dictionary = fx.arena.class(fx.dictionary);
    let inst = fx.arena.generic_inst(dictionary, [string, list_of_int]);
    fx.arena.sz_array(inst)
}

/// int modopt(IsConst)[,]*
fn const_array_pointer(fx: &mut Fixture) -> SigId {
    let int = fx.types.int32();
    let modified = fx.arena.cmod_opt(fx.is_const, int);
    let array = fx.arena.array_with_rank(modified, 2);
    fx.arena.ptr(array)
}

/// Benchmark decoding a primitive type.
/// Type: int
fn bench_type_sig_primitive(c: &mut Criterion) {
    let fx = fixture();
    let signature = [0x08];

    c.bench_function("sig_type_primitive", |b| {
        b.iter_batched_ref(
            || fx.arena.clone(),
            |arena| parse_type_sig(black_box(&signature), arena, &fx.types).unwrap(),
            BatchSize::SmallInput,
        );
    });
}

/// Benchmark decoding a nested generic instantiation.
/// Type: Dictionary<string, List<int>>[]
fn bench_type_sig_nested_generic(c: &mut Criterion) {
    let mut fx = fixture();
    let id = nested_generic(&mut fx);
    let signature = encode_type_sig(&fx.arena, Some(id)).unwrap();

    c.bench_function("sig_type_nested_generic", |b| {
        b.iter_batched_ref(
            || fx.arena.clone(),
            |arena| parse_type_sig(black_box(&signature), arena, &fx.types).unwrap(),
            BatchSize::SmallInput,
        );
    });
}

/// Benchmark decoding a modified multi-dimensional array behind a pointer.
/// Type: int modopt(IsConst)[,]*
fn bench_type_sig_modified_array(c: &mut Criterion) {
    let mut fx = fixture();
    let id = const_array_pointer(&mut fx);
    let signature = encode_type_sig(&fx.arena, Some(id)).unwrap();

    c.bench_function("sig_type_modified_array", |b| {
        b.iter_batched_ref(
            || fx.arena.clone(),
            |arena| parse_type_sig(black_box(&signature), arena, &fx.types).unwrap(),
            BatchSize::SmallInput,
        );
    });
}

/// Benchmark decoding a generic instance method.
/// Signature: T Method<T>(T item)
fn bench_method_sig_generic(c: &mut Criterion) {
    let fx = fixture();
    // HASTHIS | GENERIC, 1 generic param, 1 method param, MVAR(0) return, MVAR(0) param
    let signature = [0x30, 0x01, 0x01, 0x1E, 0x00, 0x1E, 0x00];

    c.bench_function("sig_method_generic", |b| {
        b.iter_batched_ref(
            || fx.arena.clone(),
            |arena| parse_method_sig(black_box(&signature), arena, &fx.types).unwrap(),
            BatchSize::SmallInput,
        );
    });
}

/// Benchmark decoding a vararg call site.
/// Signature: void Method(int, ..., string)
fn bench_method_sig_vararg(c: &mut Criterion) {
    let fx = fixture();
    // VARARG, 2 params, VOID return, I4, SENTINEL, STRING
    let signature = [0x05, 0x02, 0x01, 0x08, 0x41, 0x0E];

    c.bench_function("sig_method_vararg", |b| {
        b.iter_batched_ref(
            || fx.arena.clone(),
            |arena| parse_method_sig(black_box(&signature), arena, &fx.types).unwrap(),
            BatchSize::SmallInput,
        );
    });
}

/// Benchmark decoding local variables with pinned and byref entries.
/// Locals: pinned int* a; ref string b; object c
fn bench_local_var_sig(c: &mut Criterion) {
    let fx = fixture();
    // LOCAL_SIG, 3 variables, PINNED PTR I4, BYREF STRING, OBJECT
    let signature = [0x07, 0x03, 0x45, 0x0F, 0x08, 0x10, 0x0E, 0x1C];

    c.bench_function("sig_localvar_mixed", |b| {
        b.iter_batched_ref(
            || fx.arena.clone(),
            |arena| parse_local_var_sig(black_box(&signature), arena, &fx.types).unwrap(),
            BatchSize::SmallInput,
        );
    });
}

/// Benchmark decoding a method instantiation.
/// Method<int, string, bool>
fn bench_method_spec_sig(c: &mut Criterion) {
    let fx = fixture();
    // GENRICINST, 3 type args, I4, STRING, BOOLEAN
    let signature = [0x0A, 0x03, 0x08, 0x0E, 0x02];

    c.bench_function("sig_methodspec_multiple", |b| {
        b.iter_batched_ref(
            || fx.arena.clone(),
            |arena| parse_method_spec_sig(black_box(&signature), arena, &fx.types).unwrap(),
            BatchSize::SmallInput,
        );
    });
}

/// Benchmark encoding a nested generic instantiation.
fn bench_encode_nested_generic(c: &mut Criterion) {
    let mut fx = fixture();
    let id = nested_generic(&mut fx);

    c.bench_function("sig_encode_nested_generic", |b| {
        b.iter(|| {
            let blob = encode_type_sig(&fx.arena, black_box(Some(id))).unwrap();
            black_box(blob)
        });
    });
}

/// Benchmark ownership resolution through wrappers and generic arguments.
fn bench_owner_module(c: &mut Criterion) {
    let mut fx = fixture();
    let id = nested_generic(&mut fx);
    let resolver = OwnershipResolver::new(&fx.arena, &fx.registry);

    c.bench_function("sig_owner_module", |b| {
        b.iter(|| black_box(resolver.owner_module(black_box(id))));
    });
}

/// Benchmark source and reflection name rendering.
fn bench_full_name(c: &mut Criterion) {
    let mut fx = fixture();
    let generic = nested_generic(&mut fx);
    let modified = const_array_pointer(&mut fx);

    let source = FullNameFormatter::new(&fx.arena, &fx.registry);
    let reflection = source.with_style(TypeNameStyle::Reflection);

    c.bench_function("sig_full_name_source", |b| {
        b.iter(|| {
            let name = source.full_name(black_box(generic));
            black_box(name)
        });
    });

    c.bench_function("sig_full_name_modified", |b| {
        b.iter(|| {
            let name = source.full_name(black_box(modified));
            black_box(name)
        });
    });

    c.bench_function("sig_assembly_qualified_name", |b| {
        b.iter(|| {
            let name = reflection.assembly_qualified_name(black_box(generic));
            black_box(name)
        });
    });
}

/// Benchmark structural equality and hashing of equal, distinct trees.
fn bench_compare(c: &mut Criterion) {
    let mut fx = fixture();
    let left = nested_generic(&mut fx);
    let right = nested_generic(&mut fx);
    let comparer = SigComparer::new(&fx.arena);

    c.bench_function("sig_compare_equal", |b| {
        b.iter(|| black_box(comparer.equals(black_box(Some(left)), black_box(Some(right)))));
    });

    c.bench_function("sig_hash", |b| {
        b.iter(|| black_box(signature_hash(&fx.arena, black_box(left))));
    });
}

criterion_group!(
    benches,
    // Decoding
    bench_type_sig_primitive,
    bench_type_sig_nested_generic,
    bench_type_sig_modified_array,
    bench_method_sig_generic,
    bench_method_sig_vararg,
    bench_local_var_sig,
    bench_method_spec_sig,
    // Encoding
    bench_encode_nested_generic,
    // Queries
    bench_owner_module,
    bench_full_name,
    bench_compare,
);
criterion_main!(benches);
