// SPDX-License-Identifier: Apache-2.0 OR MIT

//! `x-argus` payload builder.
//!
//! The header value is produced in layers:
//!
//! 1. The [`Bean`] is serialized with [`crate::codec`] in a fixed field order.
//! 2. The serialized bytes are PKCS#7 padded and encrypted with the SIMON
//!    cipher (mode 0) under a key baked in from an SM3 digest.
//! 3. An 8-byte marker is prepended, the buffer is XOR-scrambled with its
//!    first 8 bytes and reversed, then framed by a 9-byte prefix and `"ao"`.
//! 4. The frame is encrypted with AES-128-CBC (key and IV are MD5 digests of
//!    the two halves of a fixed secret), prefixed with `f2 81` and base64
//!    encoded.

use crate::codec::Message;
use crate::error::{Error, Result};
use crate::padding;
use crate::params::SigningParameters;
use crate::simon::{KeySchedule, Mode};
use crate::sm3;
use aes::cipher::block_padding::Pkcs7;
use aes::cipher::{BlockDecryptMut, BlockEncryptMut, KeyIvInit};
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use md5::{Digest, Md5};
use rand::CryptoRng;
use std::collections::BTreeMap;

type Aes128CbcEnc = cbc::Encryptor<aes::Aes128>;
type Aes128CbcDec = cbc::Decryptor<aes::Aes128>;

/// Field numbers of the bean, in serialization order. Other indices are ignored.
pub const FIELD_ORDER: [u32; 17] = [1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 12, 13, 14, 16, 20, 21, 25];

/// Field order used inside nested values. Nested values currently carry no fields.
const NESTED_FIELD_ORDER: [u32; 0] = [];

/// Secret whose halves derive the AES key and IV.
const SIGN_KEY: [u8; 32] = [
    0xac, 0x1a, 0xda, 0xae, 0x95, 0xa7, 0xaf, 0x94, 0xa5, 0x11, 0x4a, 0xb3, 0xb3, 0xa9, 0x7d, 0xd8,
    0x00, 0x50, 0xaa, 0x0a, 0x39, 0x31, 0x4c, 0x40, 0x52, 0x8c, 0xae, 0xc9, 0x52, 0x56, 0xc2, 0x8c,
];

/// Precomputed SM3 digest used as the SIMON key (four little-endian words).
const SIMON_KEY: [u8; 32] = [
    0xfc, 0x78, 0xe0, 0xa9, 0x65, 0x7a, 0x0c, 0x74, 0x8c, 0xe5, 0x15, 0x59, 0x90, 0x3c, 0xcf, 0x03,
    0x51, 0x0e, 0x51, 0xd3, 0xcf, 0xf2, 0x32, 0xd7, 0x13, 0x43, 0xe8, 0x8a, 0x32, 0x1c, 0x53, 0x04,
];

const INNER_MARKER: [u8; 8] = [0xf2, 0xf7, 0xfc, 0xff, 0xf2, 0xf7, 0xfc, 0xff];
const FRAME_PREFIX: [u8; 9] = [0xa6, 0x6e, 0xad, 0x9f, 0x77, 0x01, 0xd0, 0x0c, 0x18];
const FRAME_SUFFIX: &[u8; 2] = b"ao";
const HEADER_MARKER: [u8; 2] = [0xf2, 0x81];

const MAGIC: u64 = 0x2020_0929 << 1;
const HASH_PREFIX_BYTES: usize = 6;

/// A bean value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Value {
    /// Written as a varint.
    Int(u64),
    /// Written as a length-delimited string.
    Bytes(Vec<u8>),
    /// Written as a length-delimited sub-message.
    Nested(BTreeMap<u32, Value>),
}

impl From<u64> for Value {
    fn from(v: u64) -> Self {
        Self::Int(v)
    }
}

impl From<u32> for Value {
    fn from(v: u32) -> Self {
        Self::Int(u64::from(v))
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Self::Bytes(v.as_bytes().to_vec())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Self::Bytes(v.into_bytes())
    }
}

impl From<Vec<u8>> for Value {
    fn from(v: Vec<u8>) -> Self {
        Self::Bytes(v)
    }
}

impl From<&[u8]> for Value {
    fn from(v: &[u8]) -> Self {
        Self::Bytes(v.to_vec())
    }
}

/// The set of values serialized into an `x-argus` header.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Bean {
    values: BTreeMap<u32, Value>,
}

impl Bean {
    /// An empty bean.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the value at `index`, replacing any previous one.
    pub fn insert(&mut self, index: u32, value: impl Into<Value>) -> &mut Self {
        self.values.insert(index, value.into());
        self
    }

    /// The value at `index`.
    pub fn get(&self, index: u32) -> Option<&Value> {
        self.values.get(&index)
    }

    /// The bean the reference client sends for `params`.
    ///
    /// `random` fills field 3; only its low 31 bits are used.
    pub fn from_parameters(params: &SigningParameters, random: u32) -> Result<Self> {
        let device_id = params.device_id()?;
        let stub = (!params.body.is_empty()).then(|| Md5::digest(&params.body));

        let mut bean = Self::new();
        bean.insert(1, MAGIC)
            .insert(2, 2u64)
            .insert(3, random & 0x7fff_ffff)
            .insert(4, params.app_id.to_string())
            .insert(5, device_id)
            .insert(6, params.license_id.to_string())
            .insert(7, params.app_version.as_str())
            .insert(8, params.sdk_version.as_str())
            .insert(9, params.sdk_version_int)
            .insert(10, vec![0u8; 8])
            .insert(12, params.unix_seconds() << 1)
            .insert(13, hash_prefix(stub.as_deref().unwrap_or_default()))
            .insert(14, hash_prefix(params.query.as_bytes()))
            .insert(16, params.sec_device_id.as_str())
            .insert(20, "none")
            .insert(21, 738u64)
            .insert(25, params.platform);
        Ok(bean)
    }

    /// Serialize the allow-listed fields in [`FIELD_ORDER`].
    pub fn to_message(&self) -> Result<Message> {
        to_message(&self.values, &FIELD_ORDER)
    }
}

fn to_message(values: &BTreeMap<u32, Value>, order: &[u32]) -> Result<Message> {
    let mut msg = Message::new();
    for &index in order {
        match values.get(&index) {
            None => {}
            Some(Value::Int(v)) => msg.put_varint(index, *v),
            Some(Value::Bytes(b)) => msg.put_bytes(index, b.as_slice()),
            Some(Value::Nested(sub)) => {
                let bytes = to_message(sub, &NESTED_FIELD_ORDER)?.encode()?;
                msg.put_bytes(index, bytes);
            }
        }
    }
    Ok(msg)
}

/// First six bytes of the SM3 digest of `data`, or of 16 zero bytes when empty.
fn hash_prefix(data: &[u8]) -> Vec<u8> {
    let digest = if data.is_empty() {
        sm3::hash(&[0u8; 16])
    } else {
        sm3::hash(data)
    };
    digest[..HASH_PREFIX_BYTES].to_vec()
}

fn aes_key_iv() -> ([u8; 16], [u8; 16]) {
    let key = Md5::digest(&SIGN_KEY[..16]).into();
    let iv = Md5::digest(&SIGN_KEY[16..]).into();
    (key, iv)
}

/// XOR every byte from offset 8 with the first 8 bytes (cyclically).
fn mask(buf: &mut [u8]) {
    for i in 8..buf.len() {
        buf[i] ^= buf[i % 8];
    }
}

/// Encrypt serialized bean bytes into an `x-argus` value.
pub fn seal(payload: &[u8]) -> String {
    let mut body = padding::pad(payload.to_vec());
    KeySchedule::from_le_bytes(&SIMON_KEY).encrypt_blocks(&mut body, Mode::Standard);

    let mut inner = Vec::with_capacity(INNER_MARKER.len() + body.len());
    inner.extend_from_slice(&INNER_MARKER);
    inner.extend_from_slice(&body);
    mask(&mut inner);
    inner.reverse();

    let mut frame = Vec::with_capacity(FRAME_PREFIX.len() + inner.len() + FRAME_SUFFIX.len());
    frame.extend_from_slice(&FRAME_PREFIX);
    frame.extend_from_slice(&inner);
    frame.extend_from_slice(FRAME_SUFFIX);

    let (key, iv) = aes_key_iv();
    let ciphertext =
        Aes128CbcEnc::new(&key.into(), &iv.into()).encrypt_padded_vec_mut::<Pkcs7>(&frame);

    let mut out = Vec::with_capacity(HEADER_MARKER.len() + ciphertext.len());
    out.extend_from_slice(&HEADER_MARKER);
    out.extend_from_slice(&ciphertext);
    tracing::debug!(
        payload_len = payload.len(),
        sealed_len = out.len(),
        "sealed argus payload"
    );
    STANDARD.encode(out)
}

/// Serialize and encrypt `bean`.
pub fn build(bean: &Bean) -> Result<String> {
    let payload = bean.to_message()?.encode()?;
    Ok(seal(&payload))
}

/// Reverse [`build`]: decrypt an `x-argus` value and decode its fields.
pub fn decrypt(value: &str) -> Result<Message> {
    let data = STANDARD
        .decode(value)
        .map_err(|_| Error::InvalidEnvelope("not base64"))?;
    let ciphertext = data
        .strip_prefix(&HEADER_MARKER)
        .ok_or(Error::InvalidEnvelope("missing header marker"))?;

    let (key, iv) = aes_key_iv();
    let frame = Aes128CbcDec::new(&key.into(), &iv.into())
        .decrypt_padded_vec_mut::<Pkcs7>(ciphertext)
        .map_err(|_| Error::InvalidEnvelope("bad AES padding"))?;
    let inner = frame
        .strip_prefix(&FRAME_PREFIX)
        .and_then(|rest| rest.strip_suffix(FRAME_SUFFIX))
        .ok_or(Error::InvalidEnvelope("missing frame markers"))?;

    let mut inner = inner.to_vec();
    inner.reverse();
    mask(&mut inner);
    let mut body = inner
        .strip_prefix(&INNER_MARKER)
        .ok_or(Error::InvalidEnvelope("missing inner marker"))?
        .to_vec();
    if body.is_empty() || body.len() % padding::BLOCK != 0 {
        return Err(Error::InvalidEnvelope("ciphertext is not block aligned"));
    }

    KeySchedule::from_le_bytes(&SIMON_KEY).decrypt_blocks(&mut body, Mode::Standard);
    let payload = padding::unpad(&body).ok_or(Error::InvalidEnvelope("bad payload padding"))?;
    Message::decode(payload)
}

/// `x-argus` for `params`, drawing field 3 from `rng`.
pub fn sign(params: &SigningParameters, rng: &mut impl CryptoRng) -> Result<String> {
    sign_with_random(params, rng.next_u32())
}

/// `x-argus` for `params` with an explicit field 3 value.
pub fn sign_with_random(params: &SigningParameters, random: u32) -> Result<String> {
    build(&Bean::from_parameters(params, random)?)
}
