//! Building types from JSON ABI argument records.

use coda_abi::{decode, encode_any, normalize, Argument, DynValue, Type};

fn roundtrip(ty: &Type, input: DynValue) {
    let expected = normalize(ty, &input).unwrap();
    let encoded = encode_any(&input, ty).unwrap();
    let decoded = decode(ty, &encoded).unwrap();
    assert_eq!(decoded, expected);
}

#[test]
fn test_unnamed_components_are_positional() {
    let arg = Argument::new("tuple").with_components(vec![
        Argument::new("int32"),
        Argument::new("int32"),
    ]);
    let ty = arg.to_type().unwrap();

    roundtrip(&ty, DynValue::map([("0", 1i32), ("1", 2i32)]));
}

#[test]
fn test_mixed_named_and_positional_components() {
    let arg = Argument::new("tuple").with_components(vec![
        Argument::named("a", "int32"),
        Argument::new("int32"),
    ]);
    let ty = arg.to_type().unwrap();

    roundtrip(&ty, DynValue::map([("a", 1i32), ("1", 2i32)]));
}

#[test]
fn test_argument_matches_textual_parse() {
    let arg = Argument::new("tuple[]").with_components(vec![
        Argument::named("a", "int32"),
        Argument::named("b", "int32[2]"),
    ]);
    assert_eq!(
        arg.to_type().unwrap(),
        Type::must("tuple(int32 a, int32[2] b)[]")
    );
}

#[test]
fn test_argument_from_descriptor_json() {
    let json = r#"[
        {"name": "holders", "type": "address[]"},
        {"name": "shares", "type": "tuple[]", "components": [
            {"name": "owner", "type": "address"},
            {"name": "weight", "type": "uint96"}
        ]}
    ]"#;
    let args: Vec<Argument> = serde_json::from_str(json).unwrap();
    let ty = coda_abi::argument::tuple_type(&args).unwrap();
    assert_eq!(
        ty,
        Type::must("tuple(address[] holders, tuple(address owner, uint96 weight)[] shares)")
    );

    roundtrip(
        &ty,
        DynValue::map([
            ("holders", DynValue::Sequence(Vec::new())),
            (
                "shares",
                DynValue::seq([DynValue::map([
                    (
                        "owner",
                        DynValue::from("0xdbb881a51cd4023e4400cef3ef73046743f08da3"),
                    ),
                    ("weight", DynValue::from(100u64)),
                ])]),
            ),
        ]),
    );
}
