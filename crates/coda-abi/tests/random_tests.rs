//! Randomized round-trip and corruption tests.
//!
//! The iteration count is controlled by the `RANDOM_TESTS` environment
//! variable (default 100). Each iteration draws a random argument tuple,
//! round-trips a random value through encode/decode, then overwrites every
//! byte position of the encoding with `0xff` and checks the decoder
//! survives each corruption.

use coda_abi::{decode, encode, Address, Type, TupleField, Value, I256, U256};
use rand::distributions::Alphanumeric;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

fn iterations() -> usize {
    std::env::var("RANDOM_TESTS")
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(100)
}

fn random_type(rng: &mut StdRng, depth: usize) -> Type {
    let choice = if depth < 3 {
        rng.gen_range(0..10)
    } else {
        rng.gen_range(0..7)
    };
    match choice {
        0 => Type::Bool,
        1 => Type::Address,
        2 => Type::String,
        3 => Type::Bytes,
        4 => Type::Uint(8 * rng.gen_range(1..=32)),
        5 => Type::Int(8 * rng.gen_range(1..=32)),
        6 => Type::FixedBytes(rng.gen_range(1..=32)),
        7 => Type::Array(Box::new(random_type(rng, depth + 1))),
        8 => Type::FixedArray(Box::new(random_type(rng, depth + 1)), rng.gen_range(1..=3)),
        _ => {
            let fields = (0..rng.gen_range(1..=3))
                .map(|i| TupleField::new(format!("arg{}", i), random_type(rng, depth + 1)))
                .collect();
            Type::Tuple(fields)
        }
    }
}

fn random_args(rng: &mut StdRng) -> Type {
    let fields = (0..rng.gen_range(1..=6))
        .map(|i| TupleField::new(format!("arg{}", i), random_type(rng, 1)))
        .collect();
    Type::Tuple(fields)
}

fn random_bytes(rng: &mut StdRng, len: usize) -> Vec<u8> {
    (0..len).map(|_| rng.gen()).collect()
}

fn random_value(rng: &mut StdRng, ty: &Type) -> Value {
    match ty {
        Type::Bool => Value::Bool(rng.gen()),
        Type::Address => {
            let mut bytes = [0u8; 20];
            rng.fill(&mut bytes);
            Value::Address(Address::from_bytes(bytes))
        }
        Type::String => {
            let len = rng.gen_range(0..=48);
            let s: String = (0..len).map(|_| rng.sample(Alphanumeric) as char).collect();
            Value::String(s)
        }
        Type::Bytes => {
            let len = rng.gen_range(0..=64);
            Value::Bytes(random_bytes(rng, len))
        }
        Type::Uint(bits) => {
            let raw = random_bytes(rng, bits / 8);
            Value::Uint(U256::from_big_endian(&raw))
        }
        Type::Int(bits) => {
            // Re-canonicalizing a random word under the declared width
            // always lands in range.
            let mut word = [0u8; 32];
            rng.fill(&mut word);
            Value::Int(I256::from_word(&word, *bits))
        }
        Type::FixedBytes(size) => Value::FixedBytes(random_bytes(rng, *size)),
        Type::Function => {
            let mut blob = [0u8; 24];
            rng.fill(&mut blob);
            Value::Function(blob)
        }
        Type::Array(elem) => {
            let len = rng.gen_range(0..=3);
            Value::Array((0..len).map(|_| random_value(rng, elem)).collect())
        }
        Type::FixedArray(elem, size) => {
            Value::Array((0..*size).map(|_| random_value(rng, elem)).collect())
        }
        Type::Tuple(fields) => Value::Tuple(
            fields
                .iter()
                .enumerate()
                .map(|(i, field)| (field.key(i), random_value(rng, &field.ty)))
                .collect(),
        ),
    }
}

#[test]
fn test_random_roundtrip_and_corruption() {
    for i in 0..iterations() {
        let mut rng = StdRng::seed_from_u64(0xc0da_0000 + i as u64);

        let ty = random_args(&mut rng);
        let value = random_value(&mut rng, &ty);

        let encoded = encode(&value, &ty)
            .unwrap_or_else(|e| panic!("encode iteration {} ({}): {}", i, ty, e));
        let decoded = decode(&ty, &encoded)
            .unwrap_or_else(|e| panic!("decode iteration {} ({}): {}", i, ty, e));
        assert_eq!(decoded, value, "roundtrip iteration {} ({})", i, ty);

        // Single-byte corruption must never crash the decoder
        let mut buf = encoded.clone();
        for pos in 0..encoded.len() {
            buf.copy_from_slice(&encoded);
            buf[pos] = 0xff;
            let _ = decode(&ty, &buf);
        }
    }
}

#[test]
fn test_truncation_sweep_never_panics() {
    for i in 0..iterations().min(20) {
        let mut rng = StdRng::seed_from_u64(0xdead_0000 + i as u64);
        let ty = random_args(&mut rng);
        let value = random_value(&mut rng, &ty);
        let encoded = encode(&value, &ty).unwrap();

        for cut in 0..encoded.len() {
            let _ = decode(&ty, &encoded[..cut]);
        }
    }
}

#[test]
fn test_random_canonical_render_roundtrip() {
    for i in 0..iterations() {
        let mut rng = StdRng::seed_from_u64(0xbeef_0000 + i as u64);
        let ty = random_args(&mut rng);
        let rendered = ty.to_string();
        let reparsed: Type = rendered.parse().unwrap();
        assert_eq!(reparsed, ty, "render roundtrip of {}", rendered);
    }
}
