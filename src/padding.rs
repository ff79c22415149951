// SPDX-License-Identifier: Apache-2.0 OR MIT

//! PKCS#7 padding to 16-byte blocks.

/// Block size the signers pad to.
pub(crate) const BLOCK: usize = 16;

/// Padded length of `len` bytes. Always adds 1..=16 bytes.
pub(crate) fn padded_len(len: usize) -> usize {
    len + (BLOCK - len % BLOCK)
}

/// Append PKCS#7 padding. A full block is added when `data` is already aligned.
#[allow(clippy::cast_possible_truncation)]
pub(crate) fn pad(mut data: Vec<u8>) -> Vec<u8> {
    let len = data.len();
    let pad = BLOCK - len % BLOCK;
    data.resize(padded_len(len), pad as u8);
    data
}

/// Strip PKCS#7 padding, returning `None` when it is not well formed.
pub(crate) fn unpad(data: &[u8]) -> Option<&[u8]> {
    let &last = data.last()?;
    let pad = usize::from(last);
    if pad == 0 || pad > BLOCK || pad > data.len() || data.len() % BLOCK != 0 {
        return None;
    }
    let (body, tail) = data.split_at(data.len() - pad);
    tail.iter().all(|&b| b == last).then_some(body)
}
