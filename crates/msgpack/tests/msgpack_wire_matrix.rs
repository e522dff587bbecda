use msgpack_stream::{
    dump, load, pack, unpack, unpack_with, DecodeError, EncodeError, Extension, UnpackOptions,
    Value,
};
use proptest::prelude::*;

fn text(s: &str) -> Value {
    Value::from(s)
}

fn map(pairs: Vec<(Value, Value)>) -> Value {
    Value::Map(pairs)
}

fn cat(parts: &[&[u8]]) -> Vec<u8> {
    parts.concat()
}

fn make_hash(size: usize) -> (Value, Vec<u8>) {
    let mut pairs = Vec::with_capacity(size);
    let mut body = Vec::with_capacity(size * 6);
    for i in 0..size {
        let key = format!("{:04x}", i);
        body.push(0xa4);
        body.extend_from_slice(key.as_bytes());
        body.push(0xc3);
        pairs.push((Value::Text(key), Value::Bool(true)));
    }
    (Value::Map(pairs), body)
}

fn cases() -> Vec<(&'static str, Value, Vec<u8>)> {
    let (medium_hash, medium_body) = make_hash(0x20);
    let (big_hash, big_body) = make_hash(0x10000);
    vec![
        ("true", Value::Bool(true), vec![0xc3]),
        ("false", Value::Bool(false), vec![0xc2]),
        ("nil", Value::Nil, vec![0xc0]),
        ("zero", Value::Int(0), vec![0x00]),
        ("127", Value::Int(0x7f), vec![0x7f]),
        ("128", Value::Int(0x80), vec![0xcc, 0x80]),
        ("256", Value::Int(0x100), vec![0xcd, 0x01, 0x00]),
        ("23435345", Value::Int(0x01659851), vec![0xce, 0x01, 0x65, 0x98, 0x51]),
        (
            "2342347938475324",
            Value::Int(0x0008525a60d02d3c),
            vec![0xcf, 0x00, 0x08, 0x52, 0x5a, 0x60, 0xd0, 0x2d, 0x3c],
        ),
        ("-1", Value::Int(-1), vec![0xff]),
        ("-33", Value::Int(-33), vec![0xd0, 0xdf]),
        ("-129", Value::Int(-129), vec![0xd1, 0xff, 0x7f]),
        ("-8444910", Value::Int(-8444910), vec![0xd2, 0xff, 0x7f, 0x24, 0x12]),
        (
            "-41957882392009710",
            Value::Int(-41957882392009710),
            vec![0xd3, 0xff, 0x6a, 0xef, 0x87, 0x3c, 0x7f, 0x24, 0x12],
        ),
        ("small integers", Value::Int(42), b"*".to_vec()),
        ("medium integers", Value::Int(333), vec![0xcd, 0x01, b'M']),
        (
            "large integers",
            Value::Int((1 << 31) - 1),
            vec![0xce, 0x7f, 0xff, 0xff, 0xff],
        ),
        (
            "large negative integers",
            Value::Int(-(1 << 31)),
            vec![0xd2, 0x80, 0x00, 0x00, 0x00],
        ),
        (
            "large unsigned integers",
            Value::Int((1 << 32) - 1),
            vec![0xce, 0xff, 0xff, 0xff, 0xff],
        ),
        (
            "huge integers",
            Value::Int((1 << 63) - 1),
            vec![0xcf, 0x7f, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff],
        ),
        (
            "huge negative integers",
            Value::Int(-(1 << 63)),
            vec![0xd3, 0x80, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00],
        ),
        (
            "huge unsigned integers",
            Value::Int((1 << 64) - 1),
            vec![0xcf, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff],
        ),
        (
            "big floats",
            Value::Float(std::f64::consts::PI * 1_000_000_000_000_000_000.0),
            cat(&[&[0xcb], b"C", &[0xc5, 0xcc, 0x96, 0xef, 0xd1, 0x19], b"%"]),
        ),
        (
            "negative floats",
            Value::Float(-2.1),
            vec![0xcb, 0xc0, 0x00, 0xcc, 0xcc, 0xcc, 0xcc, 0xcc, 0xcd],
        ),
        ("strings", text("hello world"), cat(&[&[0xab], b"hello world"])),
        ("utf-8 strings", text("ol\u{e9}"), vec![0xa4, b'o', b'l', 0xc3, 0xa9]),
        ("empty strings", text(""), vec![0xa0]),
        (
            "medium strings",
            text(&"x".repeat(0xdd)),
            cat(&[&[0xd9, 0xdd], "x".repeat(0xdd).as_bytes()]),
        ),
        (
            "big strings",
            text(&"x".repeat(0xdddd)),
            cat(&[&[0xda, 0xdd, 0xdd], "x".repeat(0xdddd).as_bytes()]),
        ),
        (
            "huge strings",
            text(&"x".repeat(0x10000)),
            cat(&[&[0xdb, 0x00, 0x01, 0x00, 0x00], "x".repeat(0x10000).as_bytes()]),
        ),
        (
            "medium binary",
            Value::Bytes(vec![7; 5]),
            cat(&[&[0xc4, 0x05], &[7; 5]]),
        ),
        (
            "big binary",
            Value::Bytes(vec![7; 0x100]),
            cat(&[&[0xc5, 0x01, 0x00], &[7; 0x100]]),
        ),
        (
            "huge binary",
            Value::Bytes(vec![7; 0x10000]),
            cat(&[&[0xc6, 0x00, 0x01, 0x00, 0x00], &vec![7; 0x10000]]),
        ),
        ("empty arrays", Value::Array(vec![]), vec![0x90]),
        (
            "small arrays",
            Value::Array(vec![Value::Int(1), Value::Int(2)]),
            vec![0x92, 0x01, 0x02],
        ),
        (
            "medium arrays",
            Value::Array(vec![Value::Bool(false); 0x111]),
            cat(&[&[0xdc, 0x01, 0x11], &[0xc2; 0x111]]),
        ),
        (
            "big arrays",
            Value::Array(vec![Value::Bool(false); 0x11111]),
            cat(&[&[0xdd, 0x00, 0x01, 0x11, 0x11], &vec![0xc2; 0x11111]]),
        ),
        (
            "arrays with mixed values",
            Value::Array(vec![text("hello"), text("world"), Value::Int(42)]),
            cat(&[&[0x93, 0xa5], b"hello", &[0xa5], b"world*"]),
        ),
        (
            "arrays of arrays",
            Value::Array(vec![Value::Array(vec![
                Value::Array(vec![
                    Value::Array(vec![Value::Int(1), Value::Int(2)]),
                    Value::Int(3),
                ]),
                Value::Int(4),
            ])]),
            vec![0x91, 0x92, 0x92, 0x92, 0x01, 0x02, 0x03, 0x04],
        ),
        ("empty hashes", map(vec![]), vec![0x80]),
        (
            "small hashes",
            map(vec![(text("foo"), text("bar"))]),
            cat(&[&[0x81, 0xa3], b"foo", &[0xa3], b"bar"]),
        ),
        (
            "medium hashes",
            medium_hash,
            cat(&[&[0xde, 0x00, 0x20], &medium_body]),
        ),
        (
            "big hashes",
            big_hash,
            cat(&[&[0xdf, 0x00, 0x01, 0x00, 0x00], &big_body]),
        ),
        (
            "hashes with mixed keys and values",
            map(vec![
                (text("foo"), text("bar")),
                (Value::Int(3), text("three")),
                (text("four"), Value::Int(4)),
                (text("x"), Value::Array(vec![text("y")])),
                (text("a"), text("b")),
            ]),
            cat(&[
                &[0x85, 0xa3],
                b"foo",
                &[0xa3],
                b"bar",
                &[0x03, 0xa5],
                b"three",
                &[0xa4],
                b"four",
                &[0x04, 0xa1],
                b"x",
                &[0x91, 0xa1],
                b"y",
                &[0xa1],
                b"a",
                &[0xa1],
                b"b",
            ]),
        ),
        (
            "hashes of hashes",
            map(vec![(
                map(vec![(text("x"), map(vec![(text("y"), text("z"))]))]),
                text("s"),
            )]),
            cat(&[
                &[0x81, 0x81, 0xa1],
                b"x",
                &[0x81, 0xa1],
                b"y",
                &[0xa1],
                b"z",
                &[0xa1],
                b"s",
            ]),
        ),
        (
            "hashes with nils",
            map(vec![(text("foo"), Value::Nil)]),
            cat(&[&[0x81, 0xa3], b"foo", &[0xc0]]),
        ),
        (
            "micro fixed extensions",
            Value::Extension(Extension::new(1, vec![0])),
            vec![0xd4, 0x01, 0x00],
        ),
        (
            "tiny fixed extensions",
            Value::Extension(Extension::new(1, vec![0; 2])),
            vec![0xd5, 0x01, 0x00, 0x00],
        ),
        (
            "small fixed extensions",
            Value::Extension(Extension::new(1, vec![0; 4])),
            cat(&[&[0xd6, 0x01], &[0; 4]]),
        ),
        (
            "medium fixed extensions",
            Value::Extension(Extension::new(1, vec![0; 8])),
            cat(&[&[0xd7, 0x01], &[0; 8]]),
        ),
        (
            "big fixed extensions",
            Value::Extension(Extension::new(1, vec![0; 16])),
            cat(&[&[0xd8, 0x01], &[0; 16]]),
        ),
        (
            "small variable extensions",
            Value::Extension(Extension::new(3, vec![0; 5])),
            cat(&[&[0xc7, 0x05, 0x03], &[0; 5]]),
        ),
        (
            "medium variable extensions",
            Value::Extension(Extension::new(3, vec![0; 0x101])),
            cat(&[&[0xc8, 0x01, 0x01, 0x03], &[0; 0x101]]),
        ),
        (
            "big variable extensions",
            Value::Extension(Extension::new(3, vec![0; 0x10001])),
            cat(&[&[0xc9, 0x00, 0x01, 0x00, 0x01, 0x03], &vec![0; 0x10001]]),
        ),
    ]
}

#[test]
fn wire_matrix_encodes_and_decodes() {
    for (name, value, bytes) in cases() {
        let packed = pack(&value).unwrap_or_else(|e| panic!("{name}: encode failed: {e}"));
        assert!(packed == bytes, "{name}: unexpected encoding");
        let decoded = unpack(&bytes).unwrap_or_else(|e| panic!("{name}: decode failed: {e}"));
        assert!(decoded == value, "{name}: unexpected decoded value");
    }
}

#[test]
fn non_minimal_forms_decode_and_reencode_minimal() {
    let cases: Vec<(Vec<u8>, Value, Vec<u8>)> = vec![
        // int 32 holding a value that fits uint 32
        (
            vec![0xd2, 0x7f, 0xff, 0xff, 0xff],
            Value::Int((1 << 31) - 1),
            vec![0xce, 0x7f, 0xff, 0xff, 0xff],
        ),
        // int 64 holding i64::MAX
        (
            vec![0xd3, 0x7f, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff],
            Value::Int((1 << 63) - 1),
            vec![0xcf, 0x7f, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff],
        ),
        // uint 16 holding a fixint
        (vec![0xcd, 0x00, 0x05], Value::Int(5), vec![0x05]),
        // str 8 holding a fixstr
        (vec![0xd9, 0x01, b'a'], text("a"), vec![0xa1, b'a']),
        // ext 8 holding a fixext 1 payload
        (
            vec![0xc7, 0x01, 0x02, 0xaa],
            Value::Extension(Extension::new(2, vec![0xaa])),
            vec![0xd4, 0x02, 0xaa],
        ),
    ];
    for (wire, value, minimal) in cases {
        assert_eq!(unpack(&wire).unwrap(), value);
        assert_eq!(pack(&value).unwrap(), minimal);
    }
}

#[test]
fn float32_input_widens() {
    let one = unpack(&[0xca, 0x3f, 0x80, 0x00, 0x00]).unwrap();
    assert_eq!(one, Value::Float(1.0));
    let small = unpack(&[0xca, 0x3d, 0x00, 0x00, 0x00]).unwrap();
    assert!((small.as_f64().unwrap() - 0.03125).abs() < 0.00001);
    assert_eq!(
        pack(&one).unwrap(),
        vec![0xcb, 0x3f, 0xf0, 0, 0, 0, 0, 0, 0]
    );
}

#[test]
fn extension_payload_tiers() {
    let payload_cases: Vec<(usize, Vec<u8>)> = vec![
        (1, vec![0xd4, 0x01]),
        (2, vec![0xd5, 0x01]),
        (3, vec![0xc7, 0x03, 0x01]),
        (4, vec![0xd6, 0x01]),
        (5, vec![0xc7, 0x05, 0x01]),
        (8, vec![0xd7, 0x01]),
        (12, vec![0xc7, 0x0c, 0x01]),
        (16, vec![0xd8, 0x01]),
        (20, vec![0xc7, 0x14, 0x01]),
        (500, vec![0xc8, 0x01, 0xf4, 0x01]),
        (100_000, vec![0xc9, 0x00, 0x01, 0x86, 0xa0, 0x01]),
    ];
    for (len, header) in payload_cases {
        let ext = Value::Extension(Extension::new(1, vec![0x55; len]));
        let packed = pack(&ext).unwrap();
        assert_eq!(&packed[..header.len()], header.as_slice(), "payload {len}");
        assert_eq!(packed.len(), header.len() + len);
        assert_eq!(unpack(&packed).unwrap(), ext);
    }
}

#[test]
fn load_and_dump_aliases() {
    assert_eq!(load(b"\xabhello world").unwrap(), text("hello world"));
    assert_eq!(dump(&text("hello world")).unwrap(), b"\xabhello world".to_vec());
}

#[test]
fn massive_array_round_trips() {
    let array = Value::Array(vec![text("foo"); 10_000]);
    let decoded = unpack(&pack(&array).unwrap()).unwrap();
    assert_eq!(decoded.as_array().map(<[Value]>::len), Some(10_000));
}

#[test]
fn reserved_marker_is_an_unpack_error() {
    let err = unpack(&[0xc1]).unwrap_err();
    assert!(matches!(err, DecodeError::Malformed { byte: 0xc1, offset: 0 }));
    assert!(err.is_malformed());
}

#[test]
fn short_input_is_truncated() {
    let err = unpack(&[0x92, 0x01]).unwrap_err();
    assert!(matches!(err, DecodeError::Truncated { pending: 2 }));
    assert!(matches!(unpack(&[]), Err(DecodeError::Truncated { pending: 0 })));
}

#[test]
fn trailing_bytes_policy() {
    assert_eq!(unpack(&[0xc0, 0xc0]).unwrap(), Value::Nil);
    let err = unpack_with(&[0xc0, 0xc0], &UnpackOptions::strict()).unwrap_err();
    assert!(matches!(
        err,
        DecodeError::TrailingBytes {
            consumed: 1,
            trailing: 1
        }
    ));
    assert_eq!(
        unpack_with(&[0xc0], &UnpackOptions::strict()).unwrap(),
        Value::Nil
    );
}

#[test]
fn unencodable_integer_reports_shape() {
    let err = pack(&Value::Int(1 << 64)).unwrap_err();
    assert!(err.to_string().starts_with("cannot pack type: int"));
    assert!(matches!(err, EncodeError::UnsupportedType { .. }));
}

fn arb_value() -> impl Strategy<Value = Value> {
    let leaf = prop_oneof![
        Just(Value::Nil),
        any::<bool>().prop_map(Value::Bool),
        any::<i64>().prop_map(Value::from),
        any::<u64>().prop_map(Value::from),
        any::<f64>().prop_map(Value::Float),
        ".{0,40}".prop_map(Value::Text),
        proptest::collection::vec(any::<u8>(), 0..40).prop_map(Value::Bytes),
        (any::<i8>(), proptest::collection::vec(any::<u8>(), 0..20))
            .prop_map(|(t, p)| Value::Extension(Extension::new(t, p))),
    ];
    leaf.prop_recursive(4, 64, 8, |inner| {
        prop_oneof![
            proptest::collection::vec(inner.clone(), 0..8).prop_map(Value::Array),
            proptest::collection::vec((inner.clone(), inner), 0..8).prop_map(Value::Map),
        ]
    })
}

proptest! {
    #[test]
    fn any_value_survives_pack_unpack(value in arb_value()) {
        let bytes = pack(&value).unwrap();
        prop_assert_eq!(unpack_with(&bytes, &UnpackOptions::strict()).unwrap(), value);
    }

    #[test]
    fn every_strict_prefix_is_truncated(value in arb_value()) {
        let bytes = pack(&value).unwrap();
        for end in 0..bytes.len() {
            let is_truncated = matches!(unpack(&bytes[..end]), Err(DecodeError::Truncated { .. }));
            prop_assert!(is_truncated);
        }
    }
}
