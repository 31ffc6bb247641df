use super::*;

#[test]
fn test_parse_equality() {
    let need = Need::parse("traefik_enabled=true");
    assert_eq!(need.subject, "traefik_enabled");
    assert!(need.positive);
    assert_eq!(need.expected, Some(vec!["true".to_string()]));
}

#[test]
fn test_parse_multi_value() {
    let need = Need::parse("network_mode=bridge,macvlan");
    assert_eq!(need.subject, "network_mode");
    assert!(need.positive);
    assert_eq!(
        need.expected,
        Some(vec!["bridge".to_string(), "macvlan".to_string()])
    );
}

#[test]
fn test_parse_negation() {
    let need = Need::parse("network_mode!=host,macvlan");
    assert_eq!(need.subject, "network_mode");
    assert!(!need.positive);
    assert_eq!(
        need.expected,
        Some(vec!["host".to_string(), "macvlan".to_string()])
    );
}

#[test]
fn test_parse_legacy_section_form() {
    let need = Need::parse("traefik");
    assert_eq!(need.subject, "traefik");
    assert!(need.positive);
    assert!(need.is_legacy());
}

#[test]
fn test_parse_trims_whitespace() {
    let need = Need::parse(" mode = a , b ");
    assert_eq!(need.subject, "mode");
    assert_eq!(need.expected, Some(vec!["a".to_string(), "b".to_string()]));
}

#[test]
fn test_parse_entry_semicolon_string() {
    let raw = serde_yaml::Value::String("x=1;y=2".to_string());
    let needs = Need::parse_entry(&raw).unwrap();
    assert_eq!(needs.len(), 2);
    assert_eq!(needs[0].subject, "x");
    assert_eq!(needs[1].subject, "y");
}

#[test]
fn test_parse_entry_list() {
    let raw: serde_yaml::Value = serde_yaml::from_str("[\"a=1\", \"b\"]").unwrap();
    let needs = Need::parse_entry(&raw).unwrap();
    assert_eq!(needs.len(), 2);
    assert!(!needs[0].is_legacy());
    assert!(needs[1].is_legacy());
}

#[test]
fn test_parse_entry_null_is_empty() {
    assert!(Need::parse_entry(&serde_yaml::Value::Null).unwrap().is_empty());
}

#[test]
fn test_parse_entry_rejects_mapping() {
    let raw: serde_yaml::Value = serde_yaml::from_str("{a: 1}").unwrap();
    assert!(Need::parse_entry(&raw).is_err());
}

#[test]
fn test_display_round_trip() {
    for s in ["mode=a,b", "mode!=a", "traefik"] {
        assert_eq!(Need::parse(s).to_string(), s);
    }
}
