//! Property-based tests using proptest
//!
//! Invariants of the codec, the cipher and the hash that must hold for all
//! inputs.

use proptest::prelude::*;
use ttsig::simon::{Mode, expand_key};
use ttsig::{Field, Message, argus, sm3};

// ============================================================================
// Strategies
// ============================================================================

fn field_strategy() -> impl Strategy<Value = Field> {
    let index = 1u32..(1 << 28);
    prop_oneof![
        (index.clone(), 0u64..=u64::from(u32::MAX)).prop_map(|(i, v)| Field::varint(i, v)),
        (index.clone(), any::<u64>()).prop_map(|(i, v)| Field::int64(i, v)),
        (index.clone(), any::<u32>()).prop_map(|(i, v)| Field::int32(i, v)),
        (index, prop::collection::vec(any::<u8>(), 0..300)).prop_map(|(i, v)| Field::bytes(i, v)),
    ]
}

fn message_strategy() -> impl Strategy<Value = Message> {
    prop::collection::vec(field_strategy(), 0..24).prop_map(Message::from_iter)
}

fn mode_strategy() -> impl Strategy<Value = Mode> {
    prop_oneof![Just(Mode::Standard), Just(Mode::Linear)]
}

// ============================================================================
// Codec
// ============================================================================

proptest! {
    // Property: decode(encode(m)) == m for supported field types
    #[test]
    fn codec_roundtrip(msg in message_strategy()) {
        let bytes = msg.encode().expect("encode");
        prop_assert_eq!(Message::decode(&bytes).expect("decode"), msg);
    }

    // Property: nested messages roundtrip as byte strings
    #[test]
    fn nested_roundtrip(inner in message_strategy(), index in 1u32..1000) {
        let inner_bytes = inner.encode().expect("encode inner");
        let mut outer = Message::new();
        outer.put_bytes(index, inner_bytes.clone());
        let decoded = Message::decode(&outer.encode().expect("encode")).expect("decode");
        let payload = decoded.get_bytes(index).expect("bytes").expect("present");
        prop_assert_eq!(payload, inner_bytes.as_slice());
        prop_assert_eq!(Message::decode(payload).expect("decode inner"), inner);
    }

    // Property: varints wider than 32 bits are truncated, never rejected
    #[test]
    fn varint_truncates(value in any::<u64>()) {
        let mut msg = Message::new();
        msg.put_varint(1, value);
        let decoded = Message::decode(&msg.encode().expect("encode")).expect("decode");
        prop_assert_eq!(decoded.get_int(1).expect("int"), Some(value & 0xffff_ffff));
    }

    // Property: decoding arbitrary bytes never panics
    #[test]
    fn decode_total(bytes in prop::collection::vec(any::<u8>(), 0..256)) {
        let _ = Message::decode(&bytes);
    }
}

// ============================================================================
// Cipher and hash
// ============================================================================

proptest! {
    // Property: decryption inverts encryption for every key, block and mode
    #[test]
    fn simon_roundtrip(key in any::<[u64; 4]>(), block in any::<[u64; 2]>(), mode in mode_strategy()) {
        let schedule = expand_key(&key);
        let ct = schedule.encrypt_block(block, mode);
        prop_assert_eq!(schedule.decrypt_block(ct, mode), block);
    }

    // Property: key expansion is a pure function
    #[test]
    fn key_schedule_deterministic(key in any::<[u64; 4]>()) {
        prop_assert_eq!(expand_key(&key), expand_key(&key));
    }

    // Property: hashing is deterministic and split-independent
    #[test]
    fn sm3_incremental(data in prop::collection::vec(any::<u8>(), 0..400), split in 0usize..400) {
        let split = split.min(data.len());
        let mut hasher = sm3::Sm3::new();
        hasher.update(&data[..split]);
        hasher.update(&data[split..]);
        prop_assert_eq!(hasher.finalize(), sm3::hash(&data));
    }
}

// ============================================================================
// Payload builder
// ============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    // Property: sealed payloads open to the same bytes
    #[test]
    fn argus_seal_roundtrip(msg in message_strategy()) {
        let payload = msg.encode().expect("encode");
        let opened = argus::decrypt(&argus::seal(&payload)).expect("decrypt");
        prop_assert_eq!(opened, msg);
    }
}
