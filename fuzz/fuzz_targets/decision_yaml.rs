#![no_main]
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let Ok(s) = std::str::from_utf8(data) else {
        return;
    };
    if let Ok(record) = drgen_core::DecisionRecord::from_yaml_str(s) {
        let name = drgen_core::decision_folder_name(&record);
        assert!(!name.contains('/') && !name.contains('\\'));
        let files = drgen_core::render_output_set(&record, chrono::DateTime::UNIX_EPOCH)
            .expect("rendering a parsed record never fails");
        let manifest = drgen_core::parse_manifest(files["manifest.json"].as_bytes())
            .expect("generated manifest parses");
        assert_eq!(manifest.files.len(), files.len() - 1);
    }
});
