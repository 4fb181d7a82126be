#![cfg(test)]

use std::fs;

use ccl_compiler::{
    emit, generate, write_artifacts, Artifact, ArtifactKind, CclError, GenerateOptions,
    compile_schema, plan_definition, Strategy,
};

const SHAPES: &str = r#"
// Shapes used by the drawing service.
package shapes;

model Point {
    X int32;
    Y int32;
}

model Line {
    A Point;
    Points []Point;
    Label string;
}
"#;

#[test]
fn test_compile_shapes() {
    let def = compile_schema(SHAPES).expect("compile_schema failed");
    assert_eq!(def.package.as_deref(), Some("shapes"));
    assert_eq!(def.models.len(), 2);
    assert_eq!(def.models[0].name, "Point");
    assert_eq!(def.models[0].model_id, 0);
    assert_eq!(def.models[1].name, "Line");
    assert_eq!(def.models[1].model_id, 1);
    assert_eq!(def.models[1].fields[1].name, "Points");
    assert!(def.models[1].fields[1].is_array);

    let plans = plan_definition(&def).unwrap();
    assert_eq!(plans[1].fields[2].strategy, Strategy::LengthPrefixedText);
    assert!(plans[1].fields[1].element_is_nested);
}

#[test]
fn test_model_ids_are_unique() {
    let err = compile_schema("model A = 1 {}\nmodel B {}").unwrap_err();
    assert!(matches!(err, CclError::SchemaValidation(_)), "{:?}", err);

    let def = compile_schema("model A = 5 {}\nmodel B {}\nmodel C = 0 {}").unwrap();
    let ids: Vec<u32> = def.models.iter().map(|m| m.model_id).collect();
    assert_eq!(ids, vec![5, 1, 0]);
}

#[test]
fn test_parse_error_location() {
    let err = compile_schema("package shapes;\nmodel Point {\n    X int32\n}").unwrap_err();
    match err {
        CclError::ParseError { line, column, .. } => assert_eq!((line, column), (4, 1)),
        other => panic!("unexpected error {:?}", other),
    }
}

#[test]
fn test_emit_go_artifacts() {
    let def = compile_schema(SHAPES).unwrap();
    let artifacts = emit(&def, &GenerateOptions::new("go", "out")).unwrap();
    let names: Vec<&str> = artifacts.iter().map(|a| a.file_name.as_str()).collect();
    assert_eq!(names, vec!["constants.go", "vars.go", "types.go", "helpers.go", "methods.go"]);
    for artifact in &artifacts {
        assert!(artifact.contents.contains("\npackage shapes\n"), "{}", artifact.file_name);
    }
}

#[test]
fn test_emit_rust_artifacts() {
    let def = compile_schema(SHAPES).unwrap();
    let artifacts = emit(&def, &GenerateOptions::new("rust", "out")).unwrap();
    let kinds: Vec<ArtifactKind> = artifacts.iter().map(|a| a.kind).collect();
    assert_eq!(kinds, vec![
        ArtifactKind::Constants,
        ArtifactKind::Types,
        ArtifactKind::Helpers,
        ArtifactKind::Methods,
        ArtifactKind::Index,
    ]);
    assert_eq!(artifacts[4].file_name, "mod.rs");
}

#[test]
fn test_emit_is_deterministic() {
    let def = compile_schema(SHAPES).unwrap();
    for backend in ["go", "rust"] {
        let options = GenerateOptions::new(backend, "out");
        assert_eq!(emit(&def, &options).unwrap(), emit(&def, &options).unwrap());
    }
}

#[test]
fn test_emit_go_without_package() {
    let def = compile_schema("model A { X int32; }").unwrap();
    let err = emit(&def, &GenerateOptions::new("go", "")).unwrap_err();
    assert!(matches!(err, CclError::MissingPackageName(_)), "{:?}", err);
}

#[test]
fn test_generate_writes_files() {
    let dir = tempfile::tempdir().unwrap();
    let source = dir.path().join("shapes.ccl");
    fs::write(&source, SHAPES).unwrap();
    let out = dir.path().join("gen");

    let written = generate(&source, &GenerateOptions::new("go", &out)).unwrap();
    assert_eq!(written.len(), 5);
    let methods = fs::read_to_string(out.join("methods.go")).unwrap();
    assert!(methods.contains("func (m *Line) SerializeBinary() ([]byte, error) {"));
    let types = fs::read_to_string(out.join("types.go")).unwrap();
    assert!(!types.contains("\"time\""));
}

#[test]
fn test_generate_package_override() {
    let dir = tempfile::tempdir().unwrap();
    let source = dir.path().join("shapes.ccl");
    fs::write(&source, SHAPES).unwrap();
    let out = dir.path().join("gen");

    generate(&source, &GenerateOptions::new("go", &out).with_package("geometry")).unwrap();
    let constants = fs::read_to_string(out.join("constants.go")).unwrap();
    assert!(constants.contains("package geometry\n"));
}

#[test]
fn test_generate_missing_source() {
    let dir = tempfile::tempdir().unwrap();
    let err = generate(&dir.path().join("nope.ccl"), &GenerateOptions::new("rust", dir.path())).unwrap_err();
    assert!(matches!(err, CclError::SourceNotFound { .. }), "{:?}", err);
    assert!(err.to_string().contains("does not exist"));
}

#[test]
fn test_generate_unknown_backend_writes_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let source = dir.path().join("shapes.ccl");
    fs::write(&source, SHAPES).unwrap();
    let out = dir.path().join("gen");

    let err = generate(&source, &GenerateOptions::new("cobol", &out)).unwrap_err();
    assert!(matches!(err, CclError::UnknownBackend(_)));
    assert!(!out.exists());
}

#[test]
fn test_write_failure_removes_partial_output() {
    let dir = tempfile::tempdir().unwrap();
    // A directory where the second artifact should go makes that write fail.
    fs::create_dir(dir.path().join("types.rs")).unwrap();
    let artifacts = vec![
        Artifact { kind: ArtifactKind::Constants, file_name: "constants.rs".into(), contents: "a".into() },
        Artifact { kind: ArtifactKind::Types,     file_name: "types.rs".into(),     contents: "b".into() },
    ];

    let err = write_artifacts(&artifacts, dir.path()).unwrap_err();
    assert!(matches!(err, CclError::OutputIo { .. }), "{:?}", err);
    assert!(!dir.path().join("constants.rs").exists());
    assert!(dir.path().join("types.rs").is_dir());
}

#[test]
fn test_rust_output_matches_checked_in_example() {
    let root = std::path::Path::new(env!("CARGO_MANIFEST_DIR")).join("../example");
    let source = root.join("schema/shapes.ccl");
    let def = ccl_compiler::load_definition(&source).unwrap();
    let artifacts = emit(&def, &GenerateOptions::new("rust", "out")).unwrap();
    for artifact in &artifacts {
        let checked_in = fs::read_to_string(root.join("src/generated").join(&artifact.file_name)).unwrap();
        assert_eq!(artifact.contents, checked_in, "{} is stale", artifact.file_name);
    }
}

#[test]
fn test_go_output_matches_checked_in_example() {
    let root = std::path::Path::new(env!("CARGO_MANIFEST_DIR")).join("../example");
    let def = ccl_compiler::load_definition(&root.join("schema/shapes.ccl")).unwrap();
    let artifacts = emit(&def, &GenerateOptions::new("go", "out")).unwrap();
    let names: Vec<&str> = artifacts.iter().map(|a| a.file_name.as_str()).collect();
    assert_eq!(names, vec!["constants.go", "vars.go", "types.go", "helpers.go", "methods.go"]);
    for artifact in &artifacts {
        let checked_in = fs::read_to_string(root.join("go").join(&artifact.file_name)).unwrap();
        assert_eq!(artifact.contents, checked_in, "{} is stale", artifact.file_name);
    }
}

#[test]
fn test_generate_name_conflict_writes_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let source = dir.path().join("clash.ccl");
    fs::write(&source, "package clash;\nmodel Point { X int32; x int32; }\n").unwrap();
    let out = dir.path().join("gen");

    let err = generate(&source, &GenerateOptions::new("rust", &out)).unwrap_err();
    assert_eq!(
        err.to_string(),
        "Cannot generate rust code: fields \"X\" and \"x\" of model \"Point\" both become `x`"
    );
    assert!(!out.exists());
}
