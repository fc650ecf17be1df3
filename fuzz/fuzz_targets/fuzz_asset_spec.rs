#![no_main]

use assetkit::{AssetSpecification, MajorMinorVersioning, SimpleDateVersioning};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if let Ok(spec) = std::str::from_utf8(data) {
        // Parsing must never panic, and accepted specs must print back to themselves
        for parsed in [
            AssetSpecification::parse(spec, &MajorMinorVersioning),
            AssetSpecification::parse(spec, &SimpleDateVersioning),
        ]
        .into_iter()
        .flatten()
        {
            let reparsed = parsed.to_string();
            assert!(!reparsed.is_empty());
            let _ = parsed.subpath_segments();
        }
    }
});
