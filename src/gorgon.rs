// SPDX-License-Identifier: Apache-2.0 OR MIT

//! `x-gorgon` signer.
//!
//! Twenty bytes are gathered from MD5 digests of the query, body and cookie
//! plus the request time, XORed with a fixed key and then chained through a
//! nibble-swap / bit-reverse transform.

use crate::params::SigningParameters;
use md5::{Digest, Md5};

const LEN: usize = 20;

const KEY: [u8; LEN] = [
    0xdf, 0x77, 0xb9, 0x40, 0xb9, 0x9b, 0x84, 0x83, 0xd1, 0xb9, 0xcb, 0xd1, 0xf7, 0xc2, 0xb9, 0x85,
    0xc3, 0xd0, 0xfb, 0xc3,
];

const SEPARATOR: [u8; 4] = [0x00, 0x06, 0x0b, 0x1c];

/// Version prefix of every `x-gorgon` value.
pub const PREFIX: &str = "0404b0d30000";

/// First four bytes of the MD5 of `data`, or zeros when `data` is empty.
fn digest_prefix(data: &[u8]) -> [u8; 4] {
    let mut out = [0u8; 4];
    if !data.is_empty() {
        out.copy_from_slice(&Md5::digest(data)[..4]);
    }
    out
}

/// `x-gorgon` for the given request parts.
#[allow(clippy::cast_possible_truncation)]
pub fn gorgon(unix_seconds: u64, query: &str, body: &[u8], cookie: Option<&str>) -> String {
    let mut input = [0u8; LEN];
    input[..4].copy_from_slice(&Md5::digest(query.as_bytes())[..4]);
    input[4..8].copy_from_slice(&digest_prefix(body));
    input[8..12].copy_from_slice(&digest_prefix(cookie.unwrap_or_default().as_bytes()));
    input[12..16].copy_from_slice(&SEPARATOR);
    input[16..].copy_from_slice(&(unix_seconds as u32).to_be_bytes());

    let mut e = [0u8; LEN];
    for (out, (a, k)) in e.iter_mut().zip(input.iter().zip(KEY)) {
        *out = a ^ k;
    }
    // sequential: the last round reads the already updated e[0]
    for i in 0..LEN {
        let mixed = e[i].rotate_left(4) ^ e[(i + 1) % LEN];
        e[i] = !mixed.reverse_bits() ^ LEN as u8;
    }

    let mut out = String::with_capacity(PREFIX.len() + LEN * 2);
    out.push_str(PREFIX);
    out.push_str(&hex::encode(e));
    out
}

/// `x-gorgon` for `params`.
pub fn sign(params: &SigningParameters) -> String {
    gorgon(
        params.unix_seconds(),
        &params.query,
        &params.body,
        params.cookie(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn query_only() {
        assert_eq!(
            gorgon(1_700_000_000, "device_id=123456789", b"", None),
            "0404b0d300007a09a733eb57387ccee15dbc3694a6177ca72d89"
        );
    }

    #[test]
    fn query_body_and_cookie() {
        assert_eq!(
            gorgon(
                1_700_000_000,
                "device_id=123456789&aid=1233",
                br#"{"a":1}"#,
                Some("sessionid=abc"),
            ),
            "0404b0d300007be93912009981b7791d2fe13694a6177ca72d09"
        );
    }

    #[test]
    fn empty_cookie_matches_missing_cookie() {
        let a = gorgon(1, "q", b"b", None);
        let b = gorgon(1, "q", b"b", Some(""));
        assert_eq!(a, b);
        assert_eq!(a.len(), PREFIX.len() + 40);
    }

    #[test]
    fn params_use_whole_seconds() {
        let params = SigningParameters::new("device_id=123456789", "").with_timestamp(1_700_000_000.9);
        assert_eq!(
            sign(&params),
            "0404b0d300007a09a733eb57387ccee15dbc3694a6177ca72d89"
        );
    }
}
