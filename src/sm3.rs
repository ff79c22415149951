// SPDX-License-Identifier: Apache-2.0 OR MIT

//! SM3 message digest.
//!
//! Merkle–Damgård construction over 64-byte blocks with a 256-bit chaining
//! value. Messages are padded with `0x80`, zeros up to 56 mod 64, and the
//! big-endian bit length of the original input.

/// Byte length of an SM3 digest.
pub const DIGEST_BYTES: usize = 32;

const BLOCK_BYTES: usize = 64;

const IV: [u32; 8] = [
    0x7380_166f,
    0x4914_b2b9,
    0x1724_42d7,
    0xda8a_0600,
    0xa96f_30bc,
    0x1631_38aa,
    0xe38d_ee4d,
    0xb0fb_0e4e,
];

/// Round constant for rounds 0..16.
const T_LOW: u32 = 0x79cc_4519;
/// Round constant for rounds 16..64.
const T_HIGH: u32 = 0x7a87_9d8a;

const PADDING: [u8; BLOCK_BYTES] = {
    let mut p = [0u8; BLOCK_BYTES];
    p[0] = 0x80;
    p
};

#[inline]
fn p0(x: u32) -> u32 {
    x ^ x.rotate_left(9) ^ x.rotate_left(17)
}

#[inline]
fn p1(x: u32) -> u32 {
    x ^ x.rotate_left(15) ^ x.rotate_left(23)
}

#[inline]
fn ff(x: u32, y: u32, z: u32, round: usize) -> u32 {
    if round < 16 {
        x ^ y ^ z
    } else {
        (x & y) | (x & z) | (y & z)
    }
}

#[inline]
fn gg(x: u32, y: u32, z: u32, round: usize) -> u32 {
    if round < 16 {
        x ^ y ^ z
    } else {
        (x & y) | (!x & z)
    }
}

/// Compress one 64-byte block into the chaining value.
#[allow(clippy::cast_possible_truncation)]
fn compress(v: &mut [u32; 8], block: &[u8]) {
    let mut w = [0u32; 68];
    for (word, bytes) in w.iter_mut().zip(block.chunks_exact(4)) {
        *word = u32::from_be_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]);
    }
    for j in 16..68 {
        w[j] = p1(w[j - 16] ^ w[j - 9] ^ w[j - 3].rotate_left(15))
            ^ w[j - 13].rotate_left(7)
            ^ w[j - 6];
    }
    let mut w1 = [0u32; 64];
    for (j, word) in w1.iter_mut().enumerate() {
        *word = w[j] ^ w[j + 4];
    }

    let [mut a, mut b, mut c, mut d, mut e, mut f, mut g, mut h] = *v;
    for j in 0..64 {
        let t = if j < 16 { T_LOW } else { T_HIGH };
        let a12 = a.rotate_left(12);
        let ss1 = a12
            .wrapping_add(e)
            .wrapping_add(t.rotate_left((j % 32) as u32))
            .rotate_left(7);
        let ss2 = ss1 ^ a12;
        let tt1 = ff(a, b, c, j)
            .wrapping_add(d)
            .wrapping_add(ss2)
            .wrapping_add(w1[j]);
        let tt2 = gg(e, f, g, j)
            .wrapping_add(h)
            .wrapping_add(ss1)
            .wrapping_add(w[j]);
        d = c;
        c = b.rotate_left(9);
        b = a;
        a = tt1;
        h = g;
        g = f.rotate_left(19);
        f = e;
        e = p0(tt2);
    }

    for (out, reg) in v.iter_mut().zip([a, b, c, d, e, f, g, h]) {
        *out ^= reg;
    }
}

/// Incremental SM3 hasher.
///
/// Each instance owns its chaining value; instances are independent.
#[derive(Clone, Debug)]
pub struct Sm3 {
    state: [u32; 8],
    buffer: [u8; BLOCK_BYTES],
    buffered: usize,
    length: u64,
}

impl Default for Sm3 {
    fn default() -> Self {
        Self {
            state: IV,
            buffer: [0u8; BLOCK_BYTES],
            buffered: 0,
            length: 0,
        }
    }
}

impl Sm3 {
    /// A hasher in its initial state.
    pub fn new() -> Self {
        Self::default()
    }

    /// Absorb `data`.
    pub fn update(&mut self, mut data: &[u8]) {
        self.length = self.length.wrapping_add(data.len() as u64);

        if self.buffered > 0 {
            let take = (BLOCK_BYTES - self.buffered).min(data.len());
            self.buffer[self.buffered..self.buffered + take].copy_from_slice(&data[..take]);
            self.buffered += take;
            data = &data[take..];
            if self.buffered < BLOCK_BYTES {
                return;
            }
            compress(&mut self.state, &self.buffer);
            self.buffered = 0;
        }

        let mut blocks = data.chunks_exact(BLOCK_BYTES);
        for block in &mut blocks {
            compress(&mut self.state, block);
        }
        let rest = blocks.remainder();
        self.buffer[..rest.len()].copy_from_slice(rest);
        self.buffered = rest.len();
    }

    /// Pad, process the final block(s) and return the digest.
    pub fn finalize(mut self) -> [u8; DIGEST_BYTES] {
        let bit_len = self.length.wrapping_mul(8);
        let pad_len = if self.buffered < 56 {
            56 - self.buffered
        } else {
            BLOCK_BYTES + 56 - self.buffered
        };
        self.update(&PADDING[..pad_len]);
        self.update(&bit_len.to_be_bytes());
        debug_assert_eq!(self.buffered, 0);

        let mut out = [0u8; DIGEST_BYTES];
        for (chunk, word) in out.chunks_exact_mut(4).zip(self.state) {
            chunk.copy_from_slice(&word.to_be_bytes());
        }
        out
    }

    /// One-shot digest of `data`.
    pub fn digest(data: &[u8]) -> [u8; DIGEST_BYTES] {
        let mut hasher = Self::new();
        hasher.update(data);
        hasher.finalize()
    }
}

/// Compute the SM3 digest of `data`.
pub fn hash(data: &[u8]) -> [u8; DIGEST_BYTES] {
    Sm3::digest(data)
}
