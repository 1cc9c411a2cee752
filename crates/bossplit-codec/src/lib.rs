//! Share-link codec.
//!
//! Serializes a full [`SessionState`] to an opaque token safe to embed in a
//! URL query parameter (canonical JSON, then URL-safe base64), and restores
//! it. A malformed token is never fatal: [`decode_or_starter`] falls back to
//! the default starter session, matching the "discard and reset" policy for
//! corrupt share links.

#![deny(unsafe_code)]

use base64::engine::general_purpose::{STANDARD, URL_SAFE_NO_PAD};
use base64::Engine;
use bossplit_types::SessionState;
use thiserror::Error;
use tracing::warn;

/// Query parameter carrying the encoded session.
pub const SHARE_PARAM: &str = "data";

/// Errors from token decoding (and, for non-finite floats, encoding).
#[derive(Debug, Error)]
pub enum CodecError {
    #[error("invalid share token encoding: {0}")]
    Base64(#[from] base64::DecodeError),

    #[error("invalid share token payload: {0}")]
    Json(#[from] serde_json::Error),
}

/// Encode a session into a URL-safe share token.
pub fn encode_session(state: &SessionState) -> Result<String, CodecError> {
    let json = serde_json::to_vec(state)?;
    Ok(URL_SAFE_NO_PAD.encode(json))
}

/// Decode a share token back into a session.
///
/// Tokens are URL-safe base64; the standard alphabet is accepted as a
/// fallback so links minted by older builds keep working.
pub fn decode_session(token: &str) -> Result<SessionState, CodecError> {
    let bytes = match URL_SAFE_NO_PAD.decode(token.trim()) {
        Ok(bytes) => bytes,
        Err(_) => STANDARD.decode(token.trim())?,
    };
    Ok(serde_json::from_slice(&bytes)?)
}

/// Decode a token if present and well-formed, otherwise return the starter
/// session. This is the recoverable path share links arrive through: corrupt
/// input resets the session rather than crashing.
pub fn decode_or_starter(token: Option<&str>) -> SessionState {
    match token {
        None => SessionState::starter(),
        Some(token) => decode_session(token).unwrap_or_else(|err| {
            warn!(%err, "malformed share token, resetting to starter session");
            SessionState::starter()
        }),
    }
}

/// Build a full share URL from a base address.
pub fn share_url(base: &str, state: &SessionState) -> Result<String, CodecError> {
    let token = encode_session(state)?;
    Ok(format!("{}?{}={}", base, SHARE_PARAM, token))
}

/// Extract the share token from a URL, if any.
pub fn token_from_url(url: &str) -> Option<&str> {
    let (_, query) = url.split_once('?')?;
    query
        .split('&')
        .filter_map(|pair| pair.split_once('='))
        .find(|(key, _)| *key == SHARE_PARAM)
        .map(|(_, value)| value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use bossplit_types::{BossGroup, DistributionMethod, ItemValue, LootItem, Participant};

    fn sample_state() -> SessionState {
        let mut average = BossGroup::new("Zakum");
        average.participants = vec!["Alice".into(), "Bob".into(), "Cara".into()];
        average.fee_rate = 0.05;
        average.items.push(LootItem {
            name: "Condensed Power Crystal".into(),
            owner: Some("Alice".into()),
            value: ItemValue::Sellable { price: Some(300.0) },
        });

        let mut custom = BossGroup::new("Horntail");
        custom.participants = vec!["Alice".into(), "Bob".into()];
        custom.method = DistributionMethod::Custom;
        custom.custom_shares.insert("Alice".into(), 70.0);
        custom.custom_shares.insert("Bob".into(), 30.0);
        custom.fee_rate = 0.1;
        custom.hide_unset = true;

        SessionState {
            members: vec![
                Participant::new("Alice", "0xa"),
                Participant::new("Bob", "0xb"),
                Participant::new("Cara", "0xc"),
            ],
            groups: vec![average, custom],
        }
    }

    #[test]
    fn round_trip_reproduces_state() {
        let state = sample_state();
        let token = encode_session(&state).unwrap();
        let restored = decode_session(&token).unwrap();
        assert_eq!(restored, state);
    }

    #[test]
    fn token_is_url_safe() {
        let token = encode_session(&sample_state()).unwrap();
        assert!(token
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_'));
    }

    #[test]
    fn standard_alphabet_tokens_still_decode() {
        let json = serde_json::to_vec(&sample_state()).unwrap();
        let legacy = STANDARD.encode(json);
        let restored = decode_session(&legacy).unwrap();
        assert_eq!(restored, sample_state());
    }

    #[test]
    fn malformed_token_is_an_error() {
        assert!(decode_session("!!!not-base64!!!").is_err());
        let garbage = URL_SAFE_NO_PAD.encode(b"{\"members\": 12}");
        assert!(decode_session(&garbage).is_err());
    }

    #[test]
    fn malformed_token_falls_back_to_starter() {
        let state = decode_or_starter(Some("corrupted###token"));
        assert_eq!(state, SessionState::starter());
    }

    #[test]
    fn absent_token_yields_starter() {
        assert_eq!(decode_or_starter(None), SessionState::starter());
    }

    #[test]
    fn share_url_embeds_extractable_token() {
        let state = sample_state();
        let url = share_url("https://bossplit.example/app", &state).unwrap();
        let token = token_from_url(&url).unwrap();
        assert_eq!(decode_session(token).unwrap(), state);
    }

    #[test]
    fn token_from_url_ignores_other_params() {
        assert_eq!(
            token_from_url("https://x.example/?lang=en&data=abc123&x=1"),
            Some("abc123")
        );
        assert_eq!(token_from_url("https://x.example/"), None);
    }
}
