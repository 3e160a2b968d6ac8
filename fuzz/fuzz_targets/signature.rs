#![no_main]

use dotsig::prelude::*;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let mut arena = SignatureArena::new();
    let mut registry = TypeRegistry::new();
    let corlib = registry.add_assembly(AssemblyIdentity::new(
        "mscorlib",
        AssemblyVersion::new(4, 0, 0, 0),
    ));
    let module = registry.add_module("Fuzz.dll", Some(corlib));
    let types = CorLibTypes::new(&mut arena, &mut registry, module, corlib);

    let decoded = parse_type_sig(data, &mut arena, &types);
    let _ = parse_calling_convention_sig(data, &mut arena, &types);

    if let Ok(Some(id)) = decoded {
        let resolver = OwnershipResolver::new(&arena, &registry);
        let _ = resolver.try_owner_module(id);
        let _ = resolver.defining_assembly(id);

        let formatter = FullNameFormatter::new(&arena, &registry);
        let _ = formatter.full_name(id);
        let _ = formatter
            .with_style(TypeNameStyle::Reflection)
            .assembly_qualified_name(id);

        let _ = encode_type_sig(&arena, Some(id));
    }
});
