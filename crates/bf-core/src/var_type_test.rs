use super::*;

#[test]
fn test_from_tag_accepts_str_and_string() {
    assert_eq!(VarType::from_tag("str", None).unwrap(), VarType::Str);
    assert_eq!(VarType::from_tag("string", None).unwrap(), VarType::Str);
}

#[test]
fn test_from_tag_unknown() {
    let err = VarType::from_tag("uuid", None).unwrap_err();
    assert!(matches!(err, CoreError::SpecStructure { .. }));
}

#[test]
fn test_enum_requires_options() {
    assert!(VarType::from_tag("enum", None).is_err());
    assert!(VarType::from_tag("enum", Some(vec![])).is_err());

    let t = VarType::from_tag("enum", Some(vec!["a".into(), "b".into()])).unwrap();
    assert_eq!(t.options(), Some(&["a".to_string(), "b".to_string()][..]));
}

#[test]
fn test_bool_truthy_falsy_strings() {
    for s in ["true", "True", "YES", "on", "1"] {
        assert_eq!(
            VarType::Bool.convert(&Value::Str(s.into())).unwrap(),
            Value::Bool(true),
            "expected '{s}' to be truthy"
        );
    }
    for s in ["false", "False", "NO", "off", "0"] {
        assert_eq!(
            VarType::Bool.convert(&Value::Str(s.into())).unwrap(),
            Value::Bool(false),
            "expected '{s}' to be falsy"
        );
    }
    assert!(VarType::Bool.convert(&Value::Str("maybe".into())).is_err());
}

#[test]
fn test_bool_from_int() {
    assert_eq!(
        VarType::Bool.convert(&Value::Int(1)).unwrap(),
        Value::Bool(true)
    );
    assert_eq!(
        VarType::Bool.convert(&Value::Int(0)).unwrap(),
        Value::Bool(false)
    );
    assert!(VarType::Bool.convert(&Value::Int(2)).is_err());
}

#[test]
fn test_int_rejects_non_numeric() {
    assert_eq!(
        VarType::Int.convert(&Value::Str("1000".into())).unwrap(),
        Value::Int(1000)
    );
    let err = VarType::Int.convert(&Value::Str("abc".into())).unwrap_err();
    assert!(matches!(err, CoreError::Conversion { .. }));
}

#[test]
fn test_int_accepts_exact_float() {
    assert_eq!(
        VarType::Int.convert(&Value::Float(4.0)).unwrap(),
        Value::Int(4)
    );
    assert!(VarType::Int.convert(&Value::Float(4.5)).is_err());
}

#[test]
fn test_float_widens_int() {
    assert_eq!(
        VarType::Float.convert(&Value::Int(2)).unwrap(),
        Value::Float(2.0)
    );
    assert_eq!(
        VarType::Float.convert(&Value::Str("2.5".into())).unwrap(),
        Value::Float(2.5)
    );
}

#[test]
fn test_enum_membership() {
    let t = VarType::Enum(vec!["bridge".into(), "host".into(), "macvlan".into()]);
    assert_eq!(
        t.convert(&Value::Str("host".into())).unwrap(),
        Value::Str("host".into())
    );
    let err = t.convert(&Value::Str("overlay".into())).unwrap_err();
    assert!(err.to_string().contains("one of"));
}

#[test]
fn test_str_stringifies_scalars() {
    assert_eq!(
        VarType::Str.convert(&Value::Int(8080)).unwrap(),
        Value::Str("8080".into())
    );
    assert_eq!(
        VarType::Str.convert(&Value::Bool(true)).unwrap(),
        Value::Str("true".into())
    );
}

#[test]
fn test_hostname() {
    for ok in ["example.com", "sub-domain.example.com", "localhost", "a.b"] {
        assert!(
            VarType::Hostname.convert(&Value::Str(ok.into())).is_ok(),
            "expected '{ok}' to be a valid hostname"
        );
    }
    for bad in ["", "-leading.com", "trailing-.com", "under_score.com", "a..b"] {
        assert!(
            VarType::Hostname.convert(&Value::Str(bad.into())).is_err(),
            "expected '{bad}' to be rejected"
        );
    }
}
