use rand::RngCore;
use veil_core::{Error, Seed};

const SEED_HEX: &str = "0x1234567890abcdef1234567890abcdef1234567890abcdef1234567890abcdef";

#[test]
fn same_seed_and_context_yield_the_same_stream() {
    let seed = Seed::from_hex(SEED_HEX).unwrap();

    let mut rng1 = seed.derive_rng(b"focus");
    let mut rng2 = seed.derive_rng(b"focus");
    assert_eq!(rng1.next_u64(), rng2.next_u64());
    assert_eq!(rng1.next_u32(), rng2.next_u32());
}

#[test]
fn different_contexts_yield_independent_streams() {
    let seed = Seed::from_hex(SEED_HEX).unwrap();

    let mut focus = seed.derive_rng(b"focus");
    let mut cap = seed.derive_rng(b"cap");
    assert_ne!(focus.next_u64(), cap.next_u64());
}

#[test]
fn hex_round_trips() {
    let seed = Seed::from_hex(SEED_HEX).unwrap();
    assert_eq!(seed.to_hex(), SEED_HEX);
    assert_eq!(Seed::from_hex(&seed.to_hex()).unwrap(), seed);
}

#[test]
fn invalid_seeds_are_rejected() {
    assert!(matches!(
        Seed::from_hex("0x1234").unwrap_err(),
        Error::InvalidSeedLength(4)
    ));
    assert!(matches!(
        Seed::from_hex(&"zz".repeat(32)).unwrap_err(),
        Error::InvalidSeedHex
    ));
}

#[test]
fn generated_seeds_differ() {
    assert_ne!(Seed::generate(), Seed::generate());
}
