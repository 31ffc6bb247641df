use super::*;
use std::fs;
use tempfile::TempDir;

const MANIFEST: &str = r#"
kind: compose
metadata:
  name: Test Service
  description: A test template
  author: tester
  version: 1.0.0
  date: 2024-05-01
spec:
  general:
    title: General
    vars:
      service_name:
        type: str
        default: app
      unused_var:
        type: str
        default: never
"#;

fn write_file(dir: &TempDir, rel: &str, content: &str) {
    let path = dir.path().join(rel);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, content).unwrap();
}

fn template_dir(manifest: &str, files: &[(&str, &str)]) -> TempDir {
    let dir = TempDir::new().unwrap();
    write_file(&dir, "template.yaml", manifest);
    for (rel, content) in files {
        write_file(&dir, rel, content);
    }
    dir
}

fn load(dir: &TempDir) -> Template {
    Template::load(dir.path(), Some("main"), LibraryType::Git).unwrap()
}

#[test]
fn test_load_template() {
    let dir = template_dir(MANIFEST, &[("compose.yml.j2", "name: {{ service_name }}")]);
    let template = load(&dir);

    assert_eq!(template.kind, "compose");
    assert_eq!(template.metadata.name, "Test Service");
    assert_eq!(template.status(), TemplateStatus::Published);
    assert_eq!(template.files().len(), 1);
}

#[test]
fn test_load_missing_manifest() {
    let dir = TempDir::new().unwrap();
    let err = Template::load(dir.path(), None, LibraryType::Git).unwrap_err();
    assert!(matches!(err, TemplateError::Load { .. }));
}

#[test]
fn test_load_accepts_yml_manifest() {
    let dir = TempDir::new().unwrap();
    write_file(&dir, "template.yml", MANIFEST);
    let template = Template::load(dir.path(), None, LibraryType::Git).unwrap();
    assert_eq!(template.kind, "compose");
}

#[test]
fn test_resolve_collection_filters_to_used() {
    let dir = template_dir(MANIFEST, &[("compose.yml.j2", "name: {{ service_name }}")]);
    let template = load(&dir);

    let collection = template.resolve_collection(None).unwrap();
    assert!(collection.variable("service_name").is_some());
    // Declared in the spec, so kept even though no file references it
    assert!(collection.variable("unused_var").is_some());
}

#[test]
fn test_resolve_collection_merges_module_base() {
    let base_spec: serde_yaml::Mapping = serde_yaml::from_str(
        r#"
general:
  vars:
    service_name:
      type: str
      default: from-module
    restart_policy:
      type: str
      default: always
"#,
    )
    .unwrap();
    let base = bf_core::VariableCollection::from_spec(&base_spec, bf_core::Origin::Module).unwrap();

    let dir = template_dir(
        MANIFEST,
        &[(
            "compose.yml.j2",
            "name: {{ service_name }}\nrestart: {{ restart_policy }}",
        )],
    );
    let template = load(&dir);

    let collection = template.resolve_collection(Some(&base)).unwrap();
    // Template spec wins over the module base
    let service_name = collection.variable("service_name").unwrap();
    assert_eq!(service_name.value, Some(bf_core::Value::Str("app".into())));
    assert_eq!(service_name.origin, bf_core::Origin::Template);
    // Module-only variables survive when referenced
    let restart = collection.variable("restart_policy").unwrap();
    assert_eq!(restart.value, Some(bf_core::Value::Str("always".into())));
    assert_eq!(restart.origin, bf_core::Origin::Module);
}

#[test]
fn test_undefined_variable_fails_before_render() {
    let dir = template_dir(MANIFEST, &[("compose.yml.j2", "value: {{ missing }}")]);
    let template = load(&dir);

    let err = template.resolve_collection(None).unwrap_err();
    match err {
        TemplateError::UndefinedVariables { message, variables } => {
            assert_eq!(variables, vec!["missing".to_string()]);
            assert!(message.contains("compose.yml.j2"));
            // A ready-to-paste spec snippet is part of the message
            assert!(message.contains("missing:"));
            assert!(message.contains("default:"));
        }
        other => panic!("expected undefined-variables error, got {other:?}"),
    }
}

#[test]
fn test_syntax_errors_surface_from_resolution() {
    let dir = template_dir(MANIFEST, &[("bad.yml.j2", "{% if x %}")]);
    let template = load(&dir);
    let err = template.resolve_collection(None).unwrap_err();
    assert!(matches!(err, TemplateError::Syntax { .. }));
}

#[test]
fn test_embedded_default_fills_missing_value() {
    let manifest = r#"
kind: compose
metadata:
  name: t
  description: d
  author: a
  version: "1"
  date: "2024"
spec:
  general:
    vars:
      http_port:
        type: int
"#;
    let dir = template_dir(manifest, &[("conf.j2", "port: {{ http_port | default(8080) }}")]);
    let template = load(&dir);

    let collection = template.resolve_collection(None).unwrap();
    assert_eq!(
        collection.variable("http_port").unwrap().value,
        Some(bf_core::Value::Int(8080))
    );
}

#[test]
fn test_embedded_default_does_not_override_spec_default() {
    let manifest = r#"
kind: compose
metadata:
  name: t
  description: d
  author: a
  version: "1"
  date: "2024"
spec:
  general:
    vars:
      http_port:
        type: int
        default: 9999
"#;
    let dir = template_dir(manifest, &[("conf.j2", "port: {{ http_port | default(8080) }}")]);
    let template = load(&dir);

    let collection = template.resolve_collection(None).unwrap();
    assert_eq!(
        collection.variable("http_port").unwrap().value,
        Some(bf_core::Value::Int(9999))
    );
}

#[test]
fn test_generate_end_to_end() {
    let dir = template_dir(
        MANIFEST,
        &[
            ("compose.yml.j2", "service: {{ service_name }}"),
            ("README.md", "static docs"),
        ],
    );
    let template = load(&dir);

    let output = template
        .generate(
            None,
            &ValueLayers {
                cli: vec![("service_name".to_string(), bf_core::Value::from("web"))],
                ..Default::default()
            },
        )
        .unwrap();

    let compose = output
        .files
        .iter()
        .find(|(path, _)| path.to_string_lossy() == "compose.yml")
        .unwrap();
    assert_eq!(compose.1, "service: web\n");

    let readme = output
        .files
        .iter()
        .find(|(path, _)| path.to_string_lossy() == "README.md")
        .unwrap();
    assert_eq!(readme.1, "static docs");

    assert_eq!(
        output.values.get("service_name"),
        Some(&Some(bf_core::Value::Str("web".into())))
    );
}

#[test]
fn test_generate_validates_before_rendering() {
    let manifest = r#"
kind: compose
metadata:
  name: t
  description: d
  author: a
  version: "1"
  date: "2024"
spec:
  general:
    vars:
      required_thing:
        type: str
"#;
    let dir = template_dir(manifest, &[("out.j2", "{{ required_thing }}")]);
    let template = load(&dir);

    let err = template.generate(None, &ValueLayers::default()).unwrap_err();
    assert!(matches!(err, TemplateError::Core(_)));
    assert!(err.to_string().contains("required_thing"));
}

#[test]
fn test_generate_applies_precedence_order() {
    let dir = template_dir(MANIFEST, &[("compose.yml.j2", "service: {{ service_name }}")]);
    let template = load(&dir);

    let layers = ValueLayers {
        config: vec![("service_name".to_string(), bf_core::Value::from("from-config"))],
        var_file: vec![("service_name".to_string(), bf_core::Value::from("from-file"))],
        cli: vec![("service_name".to_string(), bf_core::Value::from("from-cli"))],
    };
    let output = template.generate(None, &layers).unwrap();
    assert_eq!(output.files[0].1, "service: from-cli\n");
}

#[test]
fn test_draft_status() {
    let manifest = MANIFEST.replace("spec:", "  draft: true\nspec:");
    let dir = template_dir(&manifest, &[]);
    let template = load(&dir);
    assert_eq!(template.status(), TemplateStatus::Draft);
}
