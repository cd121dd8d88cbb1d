//! Cursor pagination primitives.
//!
//! Cursor format per spec.md §6: base64url-encoded payload of
//! `(created_at, id)` with a 16-byte HMAC-SHA256 tag using a process secret.
//! A tampered cursor is rejected rather than silently truncated or ignored.

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use chrono::{DateTime, Utc};
use hmac::{Hmac, Mac};
use serde::{Deserialize, Serialize};
use sha2::Sha256;
use uuid::Uuid;

type HmacSha256 = Hmac<Sha256>;

/// The decoded cursor payload: the last (created_at, id) pair seen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CursorPayload {
    pub created_at: DateTime<Utc>,
    pub id: Uuid,
}

#[derive(Debug, thiserror::Error)]
pub enum CursorError {
    #[error("cursor is not valid base64")]
    InvalidBase64,
    #[error("cursor payload is malformed")]
    InvalidPayload,
    #[error("cursor signature does not match - tampered or forged cursor")]
    TamperedSignature,
}

fn mac_for(secret: &str) -> HmacSha256 {
    HmacSha256::new_from_slice(secret.as_bytes()).expect("HMAC accepts keys of any length")
}

/// Encode a cursor: `base64url(json(payload) || hmac_tag)`.
#[must_use]
pub fn encode(payload: &CursorPayload, secret: &str) -> String {
    let json = serde_json::to_vec(payload).expect("CursorPayload always serializes");
    let mut mac = mac_for(secret);
    mac.update(&json);
    let tag = mac.finalize().into_bytes();

    let mut buf = Vec::with_capacity(json.len() + tag.len() + 8);
    buf.extend_from_slice(&(json.len() as u32).to_be_bytes());
    buf.extend_from_slice(&json);
    buf.extend_from_slice(&tag[..16]);

    URL_SAFE_NO_PAD.encode(buf)
}

/// Decode and verify a cursor. Rejects anything whose HMAC tag doesn't match
/// - this is the only defense against a client hand-crafting a cursor to
/// skip ahead or behind in a listing.
pub fn decode(cursor: &str, secret: &str) -> Result<CursorPayload, CursorError> {
    let buf = URL_SAFE_NO_PAD
        .decode(cursor)
        .map_err(|_| CursorError::InvalidBase64)?;

    if buf.len() < 4 + 16 {
        return Err(CursorError::InvalidPayload);
    }

    let len_bytes: [u8; 4] = buf[0..4].try_into().map_err(|_| CursorError::InvalidPayload)?;
    let json_len = u32::from_be_bytes(len_bytes) as usize;

    if buf.len() != 4 + json_len + 16 {
        return Err(CursorError::InvalidPayload);
    }

    let json = &buf[4..4 + json_len];
    let tag = &buf[4 + json_len..];

    let mut mac = mac_for(secret);
    mac.update(json);
    mac.verify_slice(tag)
        .map_err(|_| CursorError::TamperedSignature)?;

    serde_json::from_slice(json).map_err(|_| CursorError::InvalidPayload)
}

/// A page of results plus the cursor to fetch the next one.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub next_cursor: Option<String>,
    pub has_more: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "unit-test-secret";

    #[test]
    fn round_trips_a_valid_cursor() {
        let payload = CursorPayload {
            created_at: Utc::now(),
            id: Uuid::new_v4(),
        };
        let encoded = encode(&payload, SECRET);
        let decoded = decode(&encoded, SECRET).unwrap();
        assert_eq!(decoded, payload);
    }

    #[test]
    fn rejects_tampered_cursor() {
        let payload = CursorPayload {
            created_at: Utc::now(),
            id: Uuid::new_v4(),
        };
        let mut encoded = encode(&payload, SECRET);
        // Flip the last character to corrupt the signature.
        encoded.pop();
        encoded.push(if encoded.ends_with('A') { 'B' } else { 'A' });

        let result = decode(&encoded, SECRET);
        assert!(matches!(
            result,
            Err(CursorError::TamperedSignature) | Err(CursorError::InvalidPayload)
        ));
    }

    #[test]
    fn rejects_cursor_signed_with_a_different_secret() {
        let payload = CursorPayload {
            created_at: Utc::now(),
            id: Uuid::new_v4(),
        };
        let encoded = encode(&payload, SECRET);
        let result = decode(&encoded, "a-different-secret");
        assert!(matches!(result, Err(CursorError::TamperedSignature)));
    }

    #[test]
    fn rejects_garbage_input() {
        assert!(decode("not-a-valid-cursor!!", SECRET).is_err());
    }

    #[test]
    fn end_of_list_page_has_no_more() {
        let page: Page<u32> = Page {
            items: vec![],
            next_cursor: None,
            has_more: false,
        };
        assert!(!page.has_more);
        assert!(page.next_cursor.is_none());
    }
}
