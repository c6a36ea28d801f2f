//! Property tests for the note envelope

use base64::{engine::general_purpose::STANDARD, Engine as _};
use proptest::prelude::*;
use setsunai_core::{
    derive_key, hash_pin, open, seal, verify, Envelope, KeyDerivationParams, NotesError,
};

fn key(pin: &str, salt: &str) -> setsunai_core::DerivedKey {
    derive_key(pin, salt, Some(KeyDerivationParams { iterations: 10 })).unwrap()
}

#[test]
fn pin_123456_scenario() {
    let key = derive_key("123456", "user-42", None).unwrap();
    let envelope = seal("hello world", &key).unwrap();

    assert_eq!(open(&envelope, &key).unwrap().expose(), "hello world");

    let wrong = derive_key("654321", "user-42", None).unwrap();
    assert!(matches!(open(&envelope, &wrong), Err(NotesError::DecryptionError)));
}

#[test]
fn hash_pin_is_stable() {
    let first = hash_pin("000000");
    let second = hash_pin("000000");

    assert_eq!(first.encode(), second.encode());
    assert!(verify(&first, &second));
}

proptest! {
    #[test]
    fn seal_open_round_trip(text in any::<String>(), pin in "[0-9]{6}", salt in "[a-z0-9-]{1,24}") {
        let key = key(&pin, &salt);
        let envelope = seal(&text, &key).unwrap();

        let opened = open(&envelope, &key).unwrap();
        prop_assert_eq!(opened.expose(), text.as_str());
    }

    #[test]
    fn derivation_is_salt_sensitive(pin in "[0-9]{6}", a in "[a-z]{1,12}", b in "[a-z]{1,12}") {
        prop_assume!(a != b);
        let envelope = seal("salted", &key(&pin, &a)).unwrap();

        prop_assert!(open(&envelope, &key(&pin, &b)).is_err());
    }

    #[test]
    fn wrong_pin_never_opens(text in ".{0,64}", a in "[0-9]{6}", b in "[0-9]{6}") {
        prop_assume!(a != b);
        let envelope = seal(&text, &key(&a, "user-42")).unwrap();

        let result = open(&envelope, &key(&b, "user-42"));
        prop_assert!(matches!(result, Err(NotesError::DecryptionError)));
    }

    #[test]
    fn any_bit_flip_is_detected(
        text in ".{0,64}",
        bit in any::<prop::sample::Index>(),
        in_iv in any::<bool>(),
    ) {
        let key = key("123456", "user-42");
        let envelope = seal(&text, &key).unwrap();

        let field = if in_iv { &envelope.iv } else { &envelope.ciphertext };
        let mut bytes = STANDARD.decode(field).unwrap();
        let at = bit.index(bytes.len() * 8);
        bytes[at / 8] ^= 1 << (at % 8);
        let flipped = STANDARD.encode(bytes);

        let tampered = if in_iv {
            Envelope { ciphertext: envelope.ciphertext.clone(), iv: flipped }
        } else {
            Envelope { ciphertext: flipped, iv: envelope.iv.clone() }
        };
        prop_assert!(matches!(open(&tampered, &key), Err(NotesError::DecryptionError)));
    }

    #[test]
    fn distinct_pins_have_distinct_hashes(a in "[0-9]{6}", b in "[0-9]{6}") {
        prop_assume!(a != b);
        prop_assert!(!verify(&hash_pin(&a), &hash_pin(&b)));
    }
}
