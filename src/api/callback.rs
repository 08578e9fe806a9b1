//! Callback data encoding for inline keyboards.
//!
//! Telegram limits `callback_data` to 64 bytes, which deep paths easily
//! exceed. Short tokens are sent verbatim; long ones are replaced by a
//! digest key and remembered here so the webhook can map presses back.

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use sha2::{Digest, Sha256};
use std::collections::HashMap;
use std::sync::Mutex;

/// Maximum `callback_data` length accepted by Telegram
pub const MAX_CALLBACK_DATA_LEN: usize = 64;

/// Marks callback data that must be looked up in the registry
const DIGEST_PREFIX: char = '#';

/// Digest bytes kept in a key (18 bytes -> 24 base64 chars)
const DIGEST_BYTES: usize = 18;

/// Digest key -> full action token. Entries live as long as the process.
#[derive(Debug, Default)]
pub struct CallbackRegistry {
    tokens: Mutex<HashMap<String, String>>,
}

impl CallbackRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Callback data for `token`, registering a digest key when it is too long
    pub fn encode(&self, token: &str) -> String {
        if token.len() <= MAX_CALLBACK_DATA_LEN && !token.starts_with(DIGEST_PREFIX) {
            return token.to_string();
        }

        let digest = Sha256::digest(token.as_bytes());
        let key = format!("{}{}", DIGEST_PREFIX, URL_SAFE_NO_PAD.encode(&digest[..DIGEST_BYTES]));
        self.tokens
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .insert(key.clone(), token.to_string());
        key
    }

    /// Action token for received callback data; `None` for unknown digest keys
    pub fn decode(&self, data: &str) -> Option<String> {
        if !data.starts_with(DIGEST_PREFIX) {
            return Some(data.to_string());
        }
        self.tokens
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .get(data)
            .cloned()
    }
}
