use super::*;

const VALID: &str = r#"
kind: compose
metadata:
  name: Nginx
  description: Web server
  author: someone
  version: 1.0.0
  date: 2024-05-01
spec:
  general:
    vars:
      service_name:
        type: str
"#;

#[test]
fn test_parse_valid_manifest() {
    let manifest = Manifest::parse(VALID, "template.yaml", Some("main"), LibraryType::Git).unwrap();
    assert_eq!(manifest.kind, "compose");
    assert_eq!(manifest.metadata.name, "Nginx");
    assert_eq!(manifest.metadata.library, "main");
    assert_eq!(manifest.metadata.version, "1.0.0");
    assert!(!manifest.metadata.draft);
    assert!(manifest.spec.is_mapping());
}

#[test]
fn test_missing_kind() {
    let text = VALID.replace("kind: compose\n", "");
    let err = Manifest::parse(&text, "template.yaml", None, LibraryType::Git).unwrap_err();
    assert!(err.to_string().contains("kind"));
}

#[test]
fn test_missing_metadata_fields_are_named() {
    let text = "kind: compose\nmetadata:\n  name: x\n  description: y\n";
    let err = Manifest::parse(text, "template.yaml", None, LibraryType::Git).unwrap_err();
    let message = err.to_string();
    assert!(message.contains("author"));
    assert!(message.contains("version"));
    assert!(message.contains("date"));
}

#[test]
fn test_no_metadata_section() {
    let err = Manifest::parse("kind: compose\n", "template.yaml", None, LibraryType::Git)
        .unwrap_err();
    assert!(err.to_string().contains("metadata"));
}

#[test]
fn test_multiple_documents_first_wins() {
    let text = format!("---\n{VALID}\n---\nkind: other\n");
    let manifest = Manifest::parse(&text, "template.yaml", None, LibraryType::Git).unwrap();
    assert_eq!(manifest.kind, "compose");
}

#[test]
fn test_leading_empty_document_is_skipped() {
    let text = format!("---\n\n---\n{VALID}");
    let manifest = Manifest::parse(&text, "template.yaml", None, LibraryType::Git).unwrap();
    assert_eq!(manifest.kind, "compose");
}

#[test]
fn test_block_description_loses_trailing_newline() {
    let text = r#"
kind: compose
metadata:
  name: x
  author: a
  version: "1"
  date: "2024"
  description: |
    Line one
    Line two
"#;
    let manifest = Manifest::parse(text, "template.yaml", None, LibraryType::Git).unwrap();
    assert_eq!(manifest.metadata.description, "Line one\nLine two");
}

#[test]
fn test_draft_flag() {
    let text = VALID.replace("spec:", "  draft: true\nspec:");
    let manifest = Manifest::parse(&text, "template.yaml", None, LibraryType::Git).unwrap();
    assert!(manifest.metadata.draft);
}

#[test]
fn test_empty_manifest() {
    let err = Manifest::parse("", "template.yaml", None, LibraryType::Git).unwrap_err();
    assert!(matches!(err, TemplateError::Manifest { .. }));
}

#[test]
fn test_spec_defaults_to_null() {
    let text = r#"
kind: compose
metadata:
  name: x
  author: a
  version: "1"
  date: "2024"
  description: d
"#;
    let manifest = Manifest::parse(text, "template.yaml", None, LibraryType::Git).unwrap();
    assert!(manifest.spec.is_null());
}
