use miette::Report;
use std::fs;
use zodgen_core::{convert, Options};

#[test]
fn test_all_json_fixtures() {
    let fixtures_dir = concat!(env!("CARGO_MANIFEST_DIR"), "/tests/ok");
    let entries = fs::read_dir(fixtures_dir).expect("Failed to read fixtures directory");
    let options = Options::default().strict();
    let mut checked = 0;

    for entry in entries {
        let entry = entry.expect("Failed to read directory entry");
        let path = entry.path();

        if path.is_file() && path.extension().is_some_and(|ext| ext == "json") {
            println!("Converting file: {:?}", path);
            let source = fs::read_to_string(&path)
                .unwrap_or_else(|_| panic!("Failed to read file: {:?}", path));
            let expected = fs::read_to_string(path.with_extension("zod"))
                .unwrap_or_else(|_| panic!("Missing expected output for {:?}", path));
            let schema: serde_json::Value = serde_json::from_str(&source)
                .unwrap_or_else(|err| panic!("Invalid JSON in {:?}: {err}", path));

            match convert(&schema, &options) {
                Ok(conversion) => {
                    assert_eq!(conversion.expression, expected.trim(), "in {:?}", path);
                    assert!(conversion.diagnostics.is_empty(), "in {:?}", path);
                }
                Err(err) => panic!("Failed to convert {:?}. Error: {:?}", path, Report::new(err)),
            }
            checked += 1;
        }
    }

    assert!(checked > 0, "No fixtures found in {fixtures_dir}");
}
