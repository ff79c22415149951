// SPDX-License-Identifier: Apache-2.0 OR MIT

//! SIMON-style 128/256 block cipher.
//!
//! Blocks are two 64-bit words, keys are four 64-bit words expanded into a
//! 72-word round-key schedule. Byte-oriented helpers read and write words
//! little-endian.

use zeroize::{Zeroize, ZeroizeOnDrop};

/// Number of Feistel rounds, and words in a [`KeySchedule`].
pub const ROUNDS: usize = 72;
/// Number of 64-bit words in a cipher key.
pub const KEY_WORDS: usize = 4;
/// Byte length of one block.
pub const BLOCK_BYTES: usize = 16;

/// Bit sequence mixed into the key schedule, one bit per round (period 62).
const Z: u64 = 0x3dc9_4c3a_046d_678b;

/// Round function selector.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum Mode {
    /// `f(y) = rotl(y, 1) & rotl(y, 8)` (mode 0).
    #[default]
    Standard,
    /// `f(y) = rotl(y, 1)` (mode 1).
    Linear,
}

impl Mode {
    #[inline]
    fn f(self, y: u64) -> u64 {
        match self {
            Self::Standard => y.rotate_left(1) & y.rotate_left(8),
            Self::Linear => y.rotate_left(1),
        }
    }
}

/// Expanded round keys.
#[derive(Clone, PartialEq, Eq, Zeroize, ZeroizeOnDrop)]
pub struct KeySchedule {
    words: [u64; ROUNDS],
}

impl core::fmt::Debug for KeySchedule {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("KeySchedule")
            .field("words", &"**FILTERED**")
            .finish_non_exhaustive()
    }
}

impl KeySchedule {
    /// Expand a four-word key.
    pub fn expand(key: &[u64; KEY_WORDS]) -> Self {
        let mut words = [0u64; ROUNDS];
        words[..KEY_WORDS].copy_from_slice(key);
        for i in KEY_WORDS..ROUNDS {
            let mut t = words[i - 1].rotate_right(3) ^ words[i - 3];
            t ^= t.rotate_right(1);
            let bit = (Z >> ((i - KEY_WORDS) % 62)) & 1;
            words[i] = !words[i - 4] ^ t ^ bit ^ 3;
        }
        Self { words }
    }

    /// Expand a 32-byte key read as four little-endian words.
    pub fn from_le_bytes(key: &[u8; KEY_WORDS * 8]) -> Self {
        let mut words = [0u64; KEY_WORDS];
        for (word, bytes) in words.iter_mut().zip(key.chunks_exact(8)) {
            *word = u64_le(bytes);
        }
        let schedule = Self::expand(&words);
        words.zeroize();
        schedule
    }

    /// The round keys, first round first.
    pub fn words(&self) -> &[u64; ROUNDS] {
        &self.words
    }

    /// Encrypt one block `[x, y]`.
    pub fn encrypt_block(&self, block: [u64; 2], mode: Mode) -> [u64; 2] {
        let [mut x, mut y] = block;
        for k in &self.words {
            let tmp = y;
            y = x ^ mode.f(y) ^ y.rotate_left(2) ^ k;
            x = tmp;
        }
        [x, y]
    }

    /// Decrypt one block; the inverse of [`KeySchedule::encrypt_block`].
    pub fn decrypt_block(&self, block: [u64; 2], mode: Mode) -> [u64; 2] {
        let [mut x, mut y] = block;
        for k in self.words.iter().rev() {
            let tmp = x;
            x = y ^ mode.f(x) ^ x.rotate_left(2) ^ k;
            y = tmp;
        }
        [x, y]
    }

    /// Encrypt `data` in place, block by block.
    ///
    /// `data.len()` must be a multiple of [`BLOCK_BYTES`]; a trailing partial
    /// block is left untouched.
    pub fn encrypt_blocks(&self, data: &mut [u8], mode: Mode) {
        debug_assert_eq!(data.len() % BLOCK_BYTES, 0);
        for chunk in data.chunks_exact_mut(BLOCK_BYTES) {
            let out = self.encrypt_block(read_block(chunk), mode);
            write_block(chunk, out);
        }
    }

    /// Decrypt `data` in place, block by block.
    pub fn decrypt_blocks(&self, data: &mut [u8], mode: Mode) {
        debug_assert_eq!(data.len() % BLOCK_BYTES, 0);
        for chunk in data.chunks_exact_mut(BLOCK_BYTES) {
            let out = self.decrypt_block(read_block(chunk), mode);
            write_block(chunk, out);
        }
    }
}

/// Expand a four-word key into its round-key schedule.
pub fn expand_key(key: &[u64; KEY_WORDS]) -> KeySchedule {
    KeySchedule::expand(key)
}

/// Encrypt one block under `schedule`.
pub fn encrypt_block(plain: [u64; 2], schedule: &KeySchedule, mode: Mode) -> [u64; 2] {
    schedule.encrypt_block(plain, mode)
}

/// Decrypt one block under `schedule`.
pub fn decrypt_block(cipher: [u64; 2], schedule: &KeySchedule, mode: Mode) -> [u64; 2] {
    schedule.decrypt_block(cipher, mode)
}

fn u64_le(bytes: &[u8]) -> u64 {
    let mut buf = [0u8; 8];
    buf.copy_from_slice(bytes);
    u64::from_le_bytes(buf)
}

fn read_block(chunk: &[u8]) -> [u64; 2] {
    [u64_le(&chunk[..8]), u64_le(&chunk[8..])]
}

fn write_block(chunk: &mut [u8], block: [u64; 2]) {
    chunk[..8].copy_from_slice(&block[0].to_le_bytes());
    chunk[8..].copy_from_slice(&block[1].to_le_bytes());
}
