// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Criterion benchmarks for the hash, the cipher and full request signing.

use criterion::{Criterion, criterion_group, criterion_main};
use std::hint::black_box;
use ttsig::simon::{Mode, expand_key};
use ttsig::{SigningParameters, argus, sign_with_nonces, sm3};

fn params() -> SigningParameters {
    SigningParameters::new("device_id=7351234567890&aid=1233", b"{\"k\":1}".to_vec())
        .with_timestamp(1_700_000_000.0)
}

fn bench_sm3(c: &mut Criterion) {
    let data = vec![0x61u8; 256];
    c.bench_function("sm3/256B", |b| b.iter(|| sm3::hash(black_box(&data))));
}

fn bench_simon(c: &mut Criterion) {
    let key = [1, 2, 3, 4];
    c.bench_function("simon/expand_key", |b| b.iter(|| expand_key(black_box(&key))));

    let schedule = expand_key(&key);
    c.bench_function("simon/encrypt_block", |b| {
        b.iter(|| schedule.encrypt_block(black_box([5, 6]), Mode::Standard))
    });
}

fn bench_sign(c: &mut Criterion) {
    let params = params();
    c.bench_function("argus/sign", |b| {
        b.iter(|| argus::sign_with_random(black_box(&params), 42).expect("argus"))
    });
    c.bench_function("request/sign", |b| {
        b.iter(|| sign_with_nonces(black_box(&params), [1, 2, 3, 4], 42).expect("sign"))
    });
}

criterion_group!(benches, bench_sm3, bench_simon, bench_sign);
criterion_main!(benches);
