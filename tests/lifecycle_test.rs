//! End-to-end template lifecycle through the library API.
//!
//! An annotated app is finalized into a base template, two layers are
//! recorded on top of it, and the leaf is generated into a project.

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use strata::annotations::{finalize, FinalizeOptions};
use strata::config::EngineConfig;
use strata::layering::{
    create_layer, create_version, materialize, snapshot, LayerOptions, VersionOptions,
};
use strata::registry::{Registry, RootKind, TemplateRoot};
use strata::render::{generate, GenerateOptions};
use strata::template::{
    TemplateVariable, VariableSchema, VariableType, VariableValue, Variables,
};
use strata::StrataError;
use tempfile::TempDir;

fn write(root: &Path, relative: &str, content: &str) {
    let path = root.join(relative);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, content).unwrap();
}

fn registry(root: &Path) -> Registry {
    let config = EngineConfig::new().with_root(TemplateRoot::new(root, 25, RootKind::Project));
    Registry::new(&config)
}

/// Write a layered `template.json`; `parent` is `name` or `name@version`.
fn layered_descriptor(dir: &Path, name: &str, parent: &str) {
    let extends = match parent.split_once('@') {
        Some((template, version)) => format!(r#"{{"template":"{template}","version":"{version}"}}"#),
        None => format!(r#"{{"template":"{parent}"}}"#),
    };
    write(
        dir,
        "template.json",
        &format!(r#"{{"name":"{name}","version":"1.0.0","platform":"ios","extends":{extends}}}"#),
    );
}

/// Build base -> mid -> leaf under `root` and return the leaf directory.
fn build_family(root: &Path) -> PathBuf {
    let authored = TempDir::new().unwrap();
    write(
        authored.path(),
        "MyApp/App.swift",
        "// strata:filename {{appName}}App.swift\nlet appName = \"BaseApp\" // strata:var appName string required \"App name\"\nprint(\"base\")\n",
    );
    write(authored.path(), "README.md", "# App\n");

    finalize(&FinalizeOptions {
        work_dir: authored.path().to_path_buf(),
        output_dir: root.join("base/1.0.0"),
        name: "base".into(),
        platform: "ios".into(),
        version: "1.0.0".into(),
        description: None,
        tags: vec![],
    })
    .unwrap();

    let mid = root.join("mid/1.0.0");
    layered_descriptor(&mid, "mid", "base@1.0.0");
    let registry_with_base = registry(root);
    let base = registry_with_base.resolve("base").unwrap();
    materialize(&registry_with_base, base, &mid.join("work")).unwrap();
    let app = mid.join("work/MyApp/{{appName}}App.swift");
    let mut content = fs::read_to_string(&app).unwrap();
    content.push_str("print(\"mid\")\n");
    fs::write(&app, content).unwrap();
    write(&mid.join("work"), "MyApp/Mid.swift", "// {{appName}} mid\n");
    create_layer(&registry_with_base, &LayerOptions::new(&mid)).unwrap();

    let leaf = root.join("leaf/1.0.0");
    layered_descriptor(&leaf, "leaf", "mid");
    let registry_with_mid = registry(root);
    let mid_entry = registry_with_mid.resolve("mid").unwrap();
    materialize(&registry_with_mid, mid_entry, &leaf.join("work")).unwrap();
    fs::remove_file(leaf.join("work/README.md")).unwrap();
    write(&leaf.join("work"), "MyApp/Leaf.swift", "// {{appName}} leaf\n");
    create_layer(&registry_with_mid, &LayerOptions::new(&leaf)).unwrap();

    leaf
}

#[test]
fn three_level_family_generates_every_layer() {
    let root = TempDir::new().unwrap();
    build_family(root.path());
    let registry = registry(root.path());
    let out = TempDir::new().unwrap();

    let result = generate(
        &registry,
        &GenerateOptions {
            template: "leaf".into(),
            output_dir: out.path().to_path_buf(),
            variables: Variables::from([("appName".to_string(), VariableValue::from("Demo"))]),
            overwrite: false,
        },
    )
    .unwrap();

    assert_eq!(result.template, "leaf@1.0.0");
    let app = fs::read_to_string(out.path().join("MyApp/DemoApp.swift")).unwrap();
    assert!(app.contains("let appName = \"Demo\""));
    assert!(app.contains("print(\"base\")\nprint(\"mid\")\n"));
    assert_eq!(
        fs::read_to_string(out.path().join("MyApp/Mid.swift")).unwrap(),
        "// Demo mid\n"
    );
    assert_eq!(
        fs::read_to_string(out.path().join("MyApp/Leaf.swift")).unwrap(),
        "// Demo leaf\n"
    );
    assert!(!out.path().join("README.md").exists());
    assert!(!out.path().join("variables.json").exists());
}

/// Start a layer's work/ from its parent, then append `word` to the app
/// file and declare a variable for it with `word` as the default.
fn add_word_layer(root: &Path, name: &str, parent: &str, variable: &str, word: &str) {
    let dir = root.join(name).join("1.0.0");
    layered_descriptor(&dir, name, parent);
    let registry = registry(root);
    let work = dir.join("work");
    materialize(&registry, registry.resolve(parent).unwrap(), &work).unwrap();

    let app = work.join("App.txt");
    let content = fs::read_to_string(&app).unwrap();
    fs::write(&app, content.replace('\n', &format!(" {{{{{variable}}}}}\n"))).unwrap();

    let schema_path = work.join("variables.json");
    let mut schema = VariableSchema::load(&schema_path).unwrap();
    schema
        .variables
        .push(TemplateVariable::new(variable, VariableType::String, false).with_default(word));
    schema.save(&schema_path).unwrap();

    create_layer(&registry, &LayerOptions::new(&dir)).unwrap();
}

#[test]
fn each_layer_contributes_its_own_default() {
    let root = TempDir::new().unwrap();
    let base = root.path().join("base/1.0.0");
    write(
        &base,
        "template.json",
        r#"{"name":"base","version":"1.0.0","platform":"ios"}"#,
    );
    write(&base, "template/App.txt", "{{appName}}\n");
    VariableSchema {
        variables: vec![
            TemplateVariable::new("appName", VariableType::String, true).with_default("BaseApp"),
        ],
    }
    .save(&base.join("variables.json"))
    .unwrap();

    add_word_layer(root.path(), "mid", "base", "feature", "mid");
    add_word_layer(root.path(), "leaf", "mid", "flag", "leaf");

    let registry = registry(root.path());
    let out = TempDir::new().unwrap();
    let result = generate(
        &registry,
        &GenerateOptions {
            template: "leaf".into(),
            output_dir: out.path().to_path_buf(),
            variables: Variables::new(),
            overwrite: false,
        },
    )
    .unwrap();

    assert_eq!(
        fs::read_to_string(out.path().join("App.txt")).unwrap(),
        "BaseApp mid leaf\n"
    );
    assert_eq!(result.variables.get("feature"), Some(&VariableValue::from("mid")));
    assert_eq!(result.variables.get("flag"), Some(&VariableValue::from("leaf")));
}

#[test]
fn materialized_layer_matches_its_work_tree() {
    let root = TempDir::new().unwrap();
    let leaf = build_family(root.path());
    let registry = registry(root.path());
    let out = TempDir::new().unwrap();

    materialize(&registry, registry.resolve("leaf").unwrap(), out.path()).unwrap();

    assert_eq!(snapshot(out.path()).unwrap(), snapshot(&leaf.join("work")).unwrap());
}

#[test]
fn relayering_unchanged_work_is_byte_identical() {
    let root = TempDir::new().unwrap();
    let leaf = build_family(root.path());
    let before = fs::read(leaf.join("layer.patch")).unwrap();

    let registry = registry(root.path());
    create_layer(&registry, &LayerOptions::new(&leaf)).unwrap();

    assert_eq!(fs::read(leaf.join("layer.patch")).unwrap(), before);
}

#[test]
fn base_defaults_fill_missing_variables() {
    let root = TempDir::new().unwrap();
    build_family(root.path());
    let registry = registry(root.path());
    let out = TempDir::new().unwrap();

    let result = generate(
        &registry,
        &GenerateOptions {
            template: "mid@1.0.0".into(),
            output_dir: out.path().to_path_buf(),
            variables: Variables::new(),
            overwrite: false,
        },
    )
    .unwrap();

    assert_eq!(
        result.variables.get("appName"),
        Some(&VariableValue::from("BaseApp"))
    );
    assert!(out.path().join("MyApp/BaseAppApp.swift").is_file());
}

#[test]
fn new_version_of_layered_template_is_editable() {
    let root = TempDir::new().unwrap();
    build_family(root.path());
    let registry = registry(root.path());

    let result = create_version(
        &registry,
        &VersionOptions {
            name: "leaf".into(),
            source_version: None,
            new_version: "1.1.0".into(),
            out_root: root.path().to_path_buf(),
        },
    )
    .unwrap();

    assert!(result.layered);
    assert!(result.path.join("work/MyApp/Leaf.swift").is_file());
    let rescanned = self::registry(root.path());
    assert_eq!(rescanned.resolve("leaf").unwrap().version().to_string(), "1.1.0");
}

#[test]
fn strict_pin_to_missing_version_fails_before_writing() {
    let root = TempDir::new().unwrap();
    build_family(root.path());
    layered_descriptor(&root.path().join("pinned/1.0.0"), "pinned", "base@9.9.9");
    fs::write(root.path().join("pinned/1.0.0/layer.patch"), "").unwrap();
    let registry = registry(root.path());
    let out = TempDir::new().unwrap();
    let target = out.path().join("project");

    let err = generate(
        &registry,
        &GenerateOptions {
            template: "pinned".into(),
            output_dir: target.clone(),
            variables: Variables::new(),
            overwrite: false,
        },
    )
    .unwrap_err();

    assert!(matches!(
        err,
        StrataError::ParentNotFound { ref reference, .. } if reference == "base@9.9.9"
    ));
    assert!(!target.exists());
}

#[test]
fn cycles_are_detected_by_version_id() {
    let root = TempDir::new().unwrap();
    layered_descriptor(&root.path().join("a/1.0.0"), "a", "b");
    layered_descriptor(&root.path().join("b/1.0.0"), "b", "a@1.0.0");
    layered_descriptor(&root.path().join("c/1.0.0"), "c", "a");
    let registry = registry(root.path());

    assert!(registry.detect_cycle("c", &mut HashSet::new()));

    let out = TempDir::new().unwrap();
    let entry = registry.resolve("a").unwrap();
    let err = materialize(&registry, entry, &out.path().join("x")).unwrap_err();
    assert!(matches!(err, StrataError::CycleDetected { .. }));
    assert!(!out.path().join("x").exists());
}
