// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Deterministic mobile-client request signing.
//!
//! This crate produces the `x-argus`, `x-gorgon` and `x-ladon` header values
//! (plus the timing and body headers that accompany them) that a verifying
//! server expects from the genuine client. Output is byte-for-byte
//! reproducible given the same parameters and nonces.
//!
//! # Building blocks
//!
//! - [`codec`] - tagged-field binary serialization
//! - [`sm3`] - SM3 message digest
//! - [`simon`] - SIMON-style 128/256 block cipher
//! - [`argus`], [`gorgon`], [`ladon`] - the three signers
//!
//! # Example
//!
//! ```
//! use ttsig::{SigningParameters, sign_request};
//!
//! let params = SigningParameters::new("device_id=123456789&aid=1233", Vec::new())
//!     .with_timestamp(1_700_000_000.0);
//! let headers = sign_request(&params).expect("sign");
//!
//! assert_eq!(headers.get("x-khronos"), Some("1700000000"));
//! assert!(headers.get("x-argus").is_some());
//! ```

pub mod argus;
pub mod codec;
pub mod error;
pub mod gorgon;
pub mod ladon;
pub mod params;
pub mod signer;
pub mod simon;
pub mod sm3;

mod padding;

pub use codec::{Field, Message, WireType};
pub use error::{Error, Result};
pub use params::SigningParameters;
pub use signer::{SignedHeaders, sign_request, sign_request_with_rng, sign_with_nonces};
