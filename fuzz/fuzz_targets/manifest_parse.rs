#![no_main]
use drgen_core::layout::{check_file_name, MANIFEST_FILE};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if let Ok(manifest) = drgen_core::parse_manifest(data) {
        // accepted manifests never point outside the directory or at themselves
        assert!(manifest.signature().is_absent());
        for name in manifest.files.keys() {
            assert!(check_file_name(name).is_ok());
            assert_ne!(name, MANIFEST_FILE);
        }
    }
});
