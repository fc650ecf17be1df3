#![no_main]

use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    // Fuzz versions index parsing - this should never panic
    let _ = assetkit::VersionsIndex::from_json(data);
});
