#![no_main]

use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    // Remote meta objects are untrusted input
    if let Ok(meta) = assetkit::AssetMeta::from_json(data) {
        let json = meta.to_json().unwrap();
        assert_eq!(assetkit::AssetMeta::from_json(&json).unwrap(), meta);
    }
});
