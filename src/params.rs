// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Signing inputs and their defaults.
//!
//! [`SigningParameters`] carries everything the three signers read. Fields
//! the caller does not set fall back to the values the reference client
//! sends.

use crate::error::{Error, Result};
use std::time::{SystemTime, UNIX_EPOCH};

/// Default application id.
pub const DEFAULT_APP_ID: u32 = 1233;
/// Default license id.
pub const DEFAULT_LICENSE_ID: u32 = 1_611_921_764;
/// Default application version, sent in the Argus payload.
pub const DEFAULT_APP_VERSION: &str = "39.6.3";
/// Default security SDK version string.
pub const DEFAULT_SDK_VERSION: &str = "v05.00.06-ov-android";
/// Default security SDK version number.
pub const DEFAULT_SDK_VERSION_INT: u32 = 167_775_296;
/// Default platform code.
pub const DEFAULT_PLATFORM: u32 = 2;

/// Inputs for one signing call.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct SigningParameters {
    /// Raw request query string, without the leading `?`.
    pub query: String,
    /// Request body.
    pub body: Vec<u8>,
    /// Cookie header value, if any.
    pub cookie: Option<String>,
    /// Security SDK device id. May be empty.
    pub sec_device_id: String,
    /// Application id.
    pub app_id: u32,
    /// License id.
    pub license_id: u32,
    /// Application version.
    pub app_version: String,
    /// Security SDK version string.
    pub sdk_version: String,
    /// Security SDK version number.
    pub sdk_version_int: u32,
    /// Platform code.
    pub platform: u32,
    /// Unix time in seconds.
    pub timestamp: f64,
}

impl Default for SigningParameters {
    fn default() -> Self {
        Self {
            query: String::new(),
            body: Vec::new(),
            cookie: None,
            sec_device_id: String::new(),
            app_id: DEFAULT_APP_ID,
            license_id: DEFAULT_LICENSE_ID,
            app_version: DEFAULT_APP_VERSION.to_string(),
            sdk_version: DEFAULT_SDK_VERSION.to_string(),
            sdk_version_int: DEFAULT_SDK_VERSION_INT,
            platform: DEFAULT_PLATFORM,
            timestamp: now(),
        }
    }
}

fn now() -> f64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs_f64())
        .unwrap_or_default()
}

impl SigningParameters {
    /// Parameters for `query` and `body` with every other field defaulted.
    pub fn new(query: impl Into<String>, body: impl Into<Vec<u8>>) -> Self {
        Self {
            query: query.into(),
            body: body.into(),
            ..Self::default()
        }
    }

    /// Set the cookie header value.
    pub fn with_cookie(mut self, cookie: impl Into<String>) -> Self {
        self.cookie = Some(cookie.into());
        self
    }

    /// Set the security SDK device id.
    pub fn with_sec_device_id(mut self, id: impl Into<String>) -> Self {
        self.sec_device_id = id.into();
        self
    }

    /// Set the application id.
    pub fn with_app_id(mut self, app_id: u32) -> Self {
        self.app_id = app_id;
        self
    }

    /// Set the license id.
    pub fn with_license_id(mut self, license_id: u32) -> Self {
        self.license_id = license_id;
        self
    }

    /// Set the application version.
    pub fn with_app_version(mut self, version: impl Into<String>) -> Self {
        self.app_version = version.into();
        self
    }

    /// Set the security SDK version string and number.
    pub fn with_sdk_version(mut self, version: impl Into<String>, version_int: u32) -> Self {
        self.sdk_version = version.into();
        self.sdk_version_int = version_int;
        self
    }

    /// Set the platform code.
    pub fn with_platform(mut self, platform: u32) -> Self {
        self.platform = platform;
        self
    }

    /// Set the request time, in unix seconds.
    pub fn with_timestamp(mut self, timestamp: f64) -> Self {
        self.timestamp = timestamp;
        self
    }

    /// Whole unix seconds (truncated).
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn unix_seconds(&self) -> u64 {
        self.timestamp as u64
    }

    /// Unix milliseconds (rounded).
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn unix_millis(&self) -> u64 {
        (self.timestamp * 1000.0).round() as u64
    }

    /// The cookie, treating an empty string as absent.
    pub fn cookie(&self) -> Option<&str> {
        self.cookie.as_deref().filter(|c| !c.is_empty())
    }

    /// First `device_id` value of the query string.
    pub fn device_id(&self) -> Result<String> {
        form_urlencoded::parse(self.query.as_bytes())
            .find(|(k, _)| k == "device_id")
            .map(|(_, v)| v.into_owned())
            .filter(|v| !v.is_empty())
            .ok_or(Error::PreconditionFailed("query has no device_id"))
    }

    /// Check the inputs every signer needs.
    pub fn validate(&self) -> Result<()> {
        if self.query.is_empty() {
            return Err(Error::PreconditionFailed("query must not be empty"));
        }
        self.device_id().map(|_| ())
    }
}
