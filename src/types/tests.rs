//! Unit tests for the type signature encoding.

use crate::errors::errors::SemanticError;
use crate::types::types::TypeSig;

#[test]
fn test_parse_base_types() {
    assert_eq!(TypeSig::parse("int"), TypeSig::Int);
    assert_eq!(TypeSig::parse("bool"), TypeSig::Bool);
    assert_eq!(TypeSig::parse("string"), TypeSig::Str);
    assert_eq!(TypeSig::parse(""), TypeSig::Unknown);
    assert_eq!(TypeSig::parse("null"), TypeSig::Null);
    assert_eq!(
        TypeSig::parse("node"),
        TypeSig::Named("node".to_string())
    );
}

#[test]
fn test_parse_array() {
    assert_eq!(
        TypeSig::parse("string[]"),
        TypeSig::array_of(TypeSig::Str)
    );
    assert_eq!(TypeSig::array_of(TypeSig::Int).to_string(), "int[]");
}

#[test]
fn test_signature_parts_return_first() {
    let sig = TypeSig::parse("int(int,int)");
    let parts = sig.signature_parts().unwrap();
    assert_eq!(parts, vec![TypeSig::Int, TypeSig::Int, TypeSig::Int]);
}

#[test]
fn test_signature_parts_no_params() {
    let sig = TypeSig::parse("void()");
    let parts = sig.signature_parts().unwrap();
    assert_eq!(parts, vec![TypeSig::Void]);
}

#[test]
fn test_signature_parts_rejects_non_function() {
    let err = TypeSig::parse("notafunction").signature_parts().unwrap_err();
    assert_eq!(
        err,
        SemanticError::NotAFunctionSignature {
            signature: "notafunction".to_string()
        }
    );
    assert_eq!(err.to_string(), "notafunction is not a function");
}

#[test]
fn test_display_round_trip() {
    for text in ["int", "string[]", "void(int,char)", "node[]", "struct", ""] {
        assert_eq!(TypeSig::parse(text).to_string(), text);
    }
}

#[test]
fn test_strip_array() {
    let array = TypeSig::array_of(TypeSig::Char);
    assert_eq!(*array.strip_array(), TypeSig::Char);
    assert_eq!(*TypeSig::Int.strip_array(), TypeSig::Int);
}
