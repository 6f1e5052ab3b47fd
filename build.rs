use std::path::Path;

fn main() {
    let sample_path = Path::new("data/sample_labs.json");
    validate_sample_file(sample_path);
    set_build_dependencies();
}

fn validate_sample_file(sample_path: &Path) {
    // Ensure the sample corpus exists at build time
    assert!(
        sample_path.exists(),
        "\n\nSAMPLE CORPUS BUILD ERROR: File not found\n\
         Path: {}\n\
         Please create the sample corpus before building.\n",
        sample_path.display()
    );

    let contents = std::fs::read_to_string(sample_path).unwrap_or_else(|e| {
        panic!(
            "\n\nSAMPLE CORPUS BUILD ERROR: Failed to read file\n\
             Path: {}\n\
             Error: {e}\n",
            sample_path.display()
        );
    });

    let corpus: serde_json::Value = serde_json::from_str(&contents).unwrap_or_else(|e| {
        panic!(
            "\n\nSAMPLE CORPUS BUILD ERROR: Invalid JSON\n\
             Path: {}\n\
             Error: {e}\n\
             Hint: Check for missing commas, brackets, or invalid syntax.\n",
            sample_path.display()
        );
    });

    validate_corpus_structure(&corpus);
}

fn validate_corpus_structure(corpus: &serde_json::Value) {
    assert!(
        corpus.is_object(),
        "\n\nSAMPLE CORPUS BUILD ERROR: Root must be a JSON object\n"
    );

    let labs = corpus
        .get("labs")
        .and_then(serde_json::Value::as_array)
        .unwrap_or_else(|| {
            panic!(
                "\n\nSAMPLE CORPUS BUILD ERROR: Missing 'labs' array\n\
                 The sample corpus must have a top-level 'labs' array.\n"
            );
        });

    assert!(
        !labs.is_empty(),
        "\n\nSAMPLE CORPUS BUILD ERROR: 'labs' array is empty\n"
    );

    let mut seen = std::collections::HashSet::new();
    for (i, lab) in labs.iter().enumerate() {
        for field in ["id", "name", "major", "keywords", "introduction"] {
            assert!(
                lab.get(field).and_then(serde_json::Value::as_str).is_some(),
                "\n\nSAMPLE CORPUS BUILD ERROR: Lab {i} is missing string field '{field}'\n"
            );
        }
        let id = lab["id"].as_str().unwrap_or_default();
        assert!(
            seen.insert(id.to_string()),
            "\n\nSAMPLE CORPUS BUILD ERROR: Duplicate lab id '{id}'\n"
        );
    }
}

fn set_build_dependencies() {
    println!("cargo:rerun-if-changed=data/sample_labs.json");
    println!("cargo:rerun-if-changed=build.rs");
}
