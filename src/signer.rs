// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Request signing: composes the three signers into one header map.

use crate::argus;
use crate::error::{Error, Result};
use crate::gorgon;
use crate::ladon;
use crate::params::SigningParameters;
use md5::{Digest, Md5};
use rand::CryptoRng;
use std::collections::BTreeMap;

/// `x-argus` header name.
pub const X_ARGUS: &str = "x-argus";
/// `x-gorgon` header name.
pub const X_GORGON: &str = "x-gorgon";
/// `x-ladon` header name.
pub const X_LADON: &str = "x-ladon";
/// Request time in unix seconds.
pub const X_KHRONOS: &str = "x-khronos";
/// Request time in unix milliseconds.
pub const X_SS_REQ_TICKET: &str = "x-ss-req-ticket";
/// Uppercase hex MD5 of the body.
pub const X_SS_STUB: &str = "x-ss-stub";
/// Body length.
pub const CONTENT_LENGTH: &str = "content-length";

/// Header names mapped to values, ordered by name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct SignedHeaders(BTreeMap<String, String>);

impl SignedHeaders {
    fn insert(&mut self, name: &str, value: String) {
        self.0.insert(name.to_string(), value);
    }

    /// The value of header `name`.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.0.get(name).map(String::as_str)
    }

    /// Number of headers.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// True when there are no headers.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// `(name, value)` pairs ordered by name.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// The underlying map.
    pub fn into_inner(self) -> BTreeMap<String, String> {
        self.0
    }
}

impl IntoIterator for SignedHeaders {
    type Item = (String, String);
    type IntoIter = std::collections::btree_map::IntoIter<String, String>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

/// Sign a request, drawing nonces from the operating system.
pub fn sign_request(params: &SigningParameters) -> Result<SignedHeaders> {
    let mut seed = [0u8; 8];
    getrandom::fill(&mut seed).map_err(|e| Error::RandomSourceFailure(e.to_string()))?;
    let [a, b, c, d, rest @ ..] = seed;
    sign_with_nonces(params, [a, b, c, d], u32::from_le_bytes(rest))
}

/// Sign a request, drawing nonces from `rng`.
pub fn sign_request_with_rng(
    params: &SigningParameters,
    rng: &mut impl CryptoRng,
) -> Result<SignedHeaders> {
    params.validate()?;
    let x_ladon = ladon::sign(params, rng);
    let x_argus = argus::sign(params, rng)?;
    Ok(assemble(params, x_argus, x_ladon))
}

/// Sign a request with explicit nonces. Deterministic for fixed inputs.
pub fn sign_with_nonces(
    params: &SigningParameters,
    ladon_nonce: [u8; ladon::NONCE_BYTES],
    argus_random: u32,
) -> Result<SignedHeaders> {
    params.validate()?;
    let x_ladon = ladon::sign_with_nonce(params, ladon_nonce);
    let x_argus = argus::sign_with_random(params, argus_random)?;
    Ok(assemble(params, x_argus, x_ladon))
}

fn assemble(params: &SigningParameters, x_argus: String, x_ladon: String) -> SignedHeaders {
    let mut headers = SignedHeaders::default();
    headers.insert(X_GORGON, gorgon::sign(params));
    headers.insert(X_KHRONOS, params.unix_seconds().to_string());
    headers.insert(X_SS_REQ_TICKET, params.unix_millis().to_string());
    headers.insert(CONTENT_LENGTH, params.body.len().to_string());
    headers.insert(X_SS_STUB, hex::encode_upper(Md5::digest(&params.body)));
    headers.insert(X_LADON, x_ladon);
    headers.insert(X_ARGUS, x_argus);

    tracing::debug!(
        timestamp = params.unix_seconds(),
        body_len = params.body.len(),
        headers = headers.len(),
        "signed request"
    );
    headers
}
