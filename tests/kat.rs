//! Known-answer vectors for the hash, the block cipher and the three signers.

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use ttsig::simon::{Mode, decrypt_block, encrypt_block, expand_key};
use ttsig::{SigningParameters, argus, gorgon, ladon, sign_with_nonces, sm3};

// ============================================================================
// SM3
// ============================================================================

struct HashVector {
    input: Vec<u8>,
    digest: &'static str,
}

fn hash_vectors() -> Vec<HashVector> {
    vec![
        HashVector {
            input: Vec::new(),
            digest: "1ab21d8355cfa17f8e61194831e81a8f22bec8c728fefb747ed035eb5082aa2b",
        },
        HashVector {
            input: vec![0u8; 16],
            digest: "106e34a2b8c7bb13156cfdd0d91379dcc47543dcf9787c68ae5eb582620ae6e8",
        },
        HashVector {
            input: b"abc".to_vec(),
            digest: "66c7f0f462eeedd9d1f2d46bdc10e4e24167c4875cf2f7a2297da02b8f4ba8e0",
        },
        HashVector {
            input: b"abcd".repeat(16),
            digest: "debe9ff92275b8a138604889c18e5a4d6fdb70e5387e5765293dcba39c0c5732",
        },
    ]
}

#[test]
fn sm3_vectors() {
    for v in hash_vectors() {
        let digest = sm3::hash(&v.input);
        assert_eq!(digest.len(), sm3::DIGEST_BYTES);
        assert_eq!(hex::encode(digest), v.digest, "input {:?}", v.input);
    }
}

// ============================================================================
// SIMON
// ============================================================================

#[test]
fn simon_vectors() {
    let schedule = expand_key(&[1, 2, 3, 4]);
    let plain = [0x0123_4567_89ab_cdef, 0xfedc_ba98_7654_3210];

    let cases = [
        (Mode::Standard, [0x3eb7_817e_1196_4b0c, 0x1e7b_2930_b3bd_005b]),
        (Mode::Linear, [0x07b5_c36f_ed75_a39e, 0x1d22_ae04_feb9_df3b]),
    ];
    for (mode, expected) in cases {
        let ct = encrypt_block(plain, &schedule, mode);
        assert_eq!(ct, expected, "{mode:?}");
        assert_eq!(decrypt_block(ct, &schedule, mode), plain);
    }
}

#[test]
fn simon_argus_key_zero_block() {
    let key = [
        0x740c_7a65_a9e0_78fc,
        0x03cf_3c90_5915_e58c,
        0xd732_f2cf_d351_0e51,
        0x0453_1c32_8ae8_4313,
    ];
    assert_eq!(
        encrypt_block([0, 0], &expand_key(&key), Mode::Standard),
        [0x039d_9d88_7d90_096d, 0xf99c_6984_bdab_8f0c]
    );
}

// ============================================================================
// Signers
// ============================================================================

fn reference_params() -> SigningParameters {
    SigningParameters::new("device_id=123456789", Vec::new())
        .with_app_id(1233)
        .with_license_id(1_611_921_764)
        .with_timestamp(1_700_000_000.0)
}

#[test]
fn argus_vector() {
    let value = argus::sign_with_random(&reference_params(), 12345).expect("argus");
    assert_eq!(
        value,
        "8oHr8o9bZoRPIjtXzEdqTN/DEIrympHPe0jMDjmcZ4KtnD0Ejp54tT1mxtao6FsZ6uWo5Sghe5MbjKPClVxW\
         317CjyOi0Rcbo+zNut+3P9gw92TZJYmZZ87h47SJzQTqdS4gYkAtjuXqvnAfNd2Tis6PquHklZN6G0Eu0D/p\
         VOG08Q5lylU7o3fDZHcDmiLMy+Wkj+gB/MYnrJYPAA14iaSA"
    );
}

#[test]
fn argus_envelope_shape() {
    let value = argus::sign_with_random(&reference_params(), 7).expect("argus");
    let raw = STANDARD.decode(value).expect("base64");
    assert_eq!(&raw[..2], &[0xf2, 0x81]);
    assert_eq!((raw.len() - 2) % 16, 0);
}

#[test]
fn gorgon_vector() {
    assert_eq!(
        gorgon::sign(&reference_params()),
        "0404b0d300007a09a733eb57387ccee15dbc3694a6177ca72d89"
    );
}

#[test]
fn ladon_vector() {
    assert_eq!(
        ladon::sign_with_nonce(&reference_params(), [1, 2, 3, 4]),
        "AQIDBDVFfP9USKdZmCmktvwqxsZDhD8hxvfmokrn6O+AmKsJ"
    );
}

#[test]
fn request_vector() {
    let headers = sign_with_nonces(&reference_params(), [1, 2, 3, 4], 12345).expect("sign");
    let pairs: Vec<(&str, &str)> = headers.iter().collect();
    assert_eq!(
        pairs.iter().map(|(k, _)| *k).collect::<Vec<_>>(),
        [
            "content-length",
            "x-argus",
            "x-gorgon",
            "x-khronos",
            "x-ladon",
            "x-ss-req-ticket",
            "x-ss-stub"
        ]
    );
    assert_eq!(headers.get("x-ss-stub"), Some("D41D8CD98F00B204E9800998ECF8427E"));
    assert_eq!(
        headers.get("x-argus"),
        argus::sign_with_random(&reference_params(), 12345).ok().as_deref()
    );
}
