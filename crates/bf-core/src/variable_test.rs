use super::*;

fn mapping(yaml: &str) -> serde_yaml::Mapping {
    serde_yaml::from_str(yaml).unwrap()
}

#[test]
fn test_from_mapping_minimal() {
    let var = Variable::from_mapping("service_name", &mapping("type: str"), Origin::Module).unwrap();
    assert_eq!(var.name, "service_name");
    assert_eq!(var.var_type, VarType::Str);
    assert!(var.value.is_none());
    assert!(var.is_required());
    assert!(var.is_explicit(Field::Type));
    assert!(!var.is_explicit(Field::Default));
}

#[test]
fn test_from_mapping_defaults_seed_value() {
    let var = Variable::from_mapping(
        "container_timezone",
        &mapping("type: str\ndefault: UTC"),
        Origin::Module,
    )
    .unwrap();
    assert_eq!(var.default, Some(Value::Str("UTC".into())));
    assert_eq!(var.value, Some(Value::Str("UTC".into())));
    assert!(!var.is_required());
}

#[test]
fn test_from_mapping_type_defaults_to_str() {
    let var = Variable::from_mapping("x", &mapping("default: hi"), Origin::Module).unwrap();
    assert_eq!(var.var_type, VarType::Str);
    assert!(!var.is_explicit(Field::Type));
}

#[test]
fn test_from_mapping_enum_options() {
    let var = Variable::from_mapping(
        "restart_policy",
        &mapping("type: enum\noptions: [always, never]\ndefault: always"),
        Origin::Module,
    )
    .unwrap();
    assert_eq!(
        var.var_type.options(),
        Some(&["always".to_string(), "never".to_string()][..])
    );
}

#[test]
fn test_from_mapping_autogenerated_fields() {
    let var = Variable::from_mapping(
        "db_password",
        &mapping("type: str\ndefault: \"\"\nsensitive: true\nautogenerated: true\nautogenerated_length: 16\nautogenerated_base64: true"),
        Origin::Module,
    )
    .unwrap();
    assert!(var.sensitive);
    assert!(var.autogenerated);
    assert!(var.autogenerated_base64);
    assert_eq!(var.autogenerated_length, 16);
    assert!(!var.is_required());
}

#[test]
fn test_autogenerated_length_defaults_to_32() {
    let var =
        Variable::from_mapping("token", &mapping("autogenerated: true"), Origin::Module).unwrap();
    assert_eq!(var.autogenerated_length, 32);
}

#[test]
fn test_from_mapping_needs() {
    let var = Variable::from_mapping(
        "network_name",
        &mapping("type: str\nneeds: network_mode=bridge,macvlan"),
        Origin::Module,
    )
    .unwrap();
    assert_eq!(var.needs.len(), 1);
    assert_eq!(var.needs[0].subject, "network_mode");
}

#[test]
fn test_from_mapping_rejects_bad_type_field() {
    assert!(Variable::from_mapping("x", &mapping("type: [a]"), Origin::Module).is_err());
    assert!(Variable::from_mapping("x", &mapping("sensitive: 3"), Origin::Module).is_err());
}

#[test]
fn test_with_patch_overrides_only_given_fields() {
    let var = Variable::from_mapping(
        "x",
        &mapping("type: str\ndefault: one\ndescription: base"),
        Origin::Module,
    )
    .unwrap();

    let patched = var.with_patch(&VariablePatch {
        origin: Some(Origin::Template),
        value: Some(Some(Value::Str("two".into()))),
        ..Default::default()
    });

    assert_eq!(patched.value, Some(Value::Str("two".into())));
    assert_eq!(patched.origin, Origin::Template);
    // Untouched fields survive
    assert_eq!(patched.description.as_deref(), Some("base"));
    assert_eq!(patched.default, Some(Value::Str("one".into())));
}

#[test]
fn test_with_patch_explicit_clear() {
    let var = Variable::from_mapping(
        "x",
        &mapping("type: str\ndefault: one\nneeds: mode=a"),
        Origin::Module,
    )
    .unwrap();

    let patched = var.with_patch(&VariablePatch {
        value: Some(None),
        needs: Some(Vec::new()),
        ..Default::default()
    });

    assert!(patched.value.is_none());
    assert!(patched.needs.is_empty());
}

#[test]
fn test_typed_value() {
    let var = Variable::from_mapping("port", &mapping("type: int\ndefault: \"8080\""), Origin::Module)
        .unwrap();
    assert_eq!(var.typed_value().unwrap(), Some(Value::Int(8080)));
}
