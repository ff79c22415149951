// SPDX-License-Identifier: Apache-2.0 OR MIT

//! `x-ladon` signer.
//!
//! `"{khronos}-{license_id}-{app_id}"` is encrypted with a 34-round ARX cipher
//! keyed by the lowercase hex MD5 of `nonce || app_id`, and the result is
//! base64 encoded behind the 4-byte nonce.

use crate::padding;
use crate::params::SigningParameters;
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use md5::{Digest, Md5};
use rand::CryptoRng;
use zeroize::Zeroize;

/// Byte length of the random nonce.
pub const NONCE_BYTES: usize = 4;

const ROUNDS: usize = 0x22;

fn word(bytes: &[u8]) -> u64 {
    let mut buf = [0u8; 8];
    buf.copy_from_slice(bytes);
    u64::from_le_bytes(buf)
}

/// Round keys from 32 bytes of key material.
fn round_keys(material: &[u8; 32]) -> [u64; ROUNDS] {
    let mut k = [0u64; ROUNDS];
    let mut l = [0u64; ROUNDS + 2];
    k[0] = word(&material[..8]);
    for (i, chunk) in material[8..].chunks_exact(8).enumerate() {
        l[i] = word(chunk);
    }
    for i in 0..ROUNDS - 1 {
        l[i + 3] = l[i].rotate_right(8).wrapping_add(k[i]) ^ i as u64;
        k[i + 1] = k[i].rotate_right(61) ^ l[i + 3];
    }
    l.zeroize();
    k
}

fn encrypt_block(keys: &[u64; ROUNDS], chunk: &mut [u8]) {
    let mut d0 = word(&chunk[..8]);
    let mut d1 = word(&chunk[8..]);
    for k in keys {
        d1 = k ^ d0.wrapping_add(d1.rotate_right(8));
        d0 = d1 ^ d0.rotate_right(61);
    }
    chunk[..8].copy_from_slice(&d0.to_le_bytes());
    chunk[8..].copy_from_slice(&d1.to_le_bytes());
}

/// `x-ladon` for explicit inputs.
pub fn encrypt(khronos: u64, license_id: u32, app_id: u32, nonce: [u8; NONCE_BYTES]) -> String {
    let mut keygen = nonce.to_vec();
    keygen.extend_from_slice(app_id.to_string().as_bytes());
    let mut material = [0u8; 32];
    let mut digest_hex = hex::encode(Md5::digest(&keygen));
    material.copy_from_slice(digest_hex.as_bytes());
    let mut keys = round_keys(&material);
    material.zeroize();
    digest_hex.zeroize();

    let mut data = padding::pad(format!("{khronos}-{license_id}-{app_id}").into_bytes());
    for chunk in data.chunks_exact_mut(padding::BLOCK) {
        encrypt_block(&keys, chunk);
    }
    keys.zeroize();

    let mut out = Vec::with_capacity(NONCE_BYTES + data.len());
    out.extend_from_slice(&nonce);
    out.extend_from_slice(&data);
    STANDARD.encode(out)
}

/// `x-ladon` for `params` with a caller supplied nonce.
pub fn sign_with_nonce(params: &SigningParameters, nonce: [u8; NONCE_BYTES]) -> String {
    encrypt(params.unix_seconds(), params.license_id, params.app_id, nonce)
}

/// `x-ladon` for `params`, drawing the nonce from `rng`.
pub fn sign(params: &SigningParameters, rng: &mut impl CryptoRng) -> String {
    let mut nonce = [0u8; NONCE_BYTES];
    rng.fill_bytes(&mut nonce);
    sign_with_nonce(params, nonce)
}
