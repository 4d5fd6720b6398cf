//! Identifier value objects.
//!
//! A player is identified two ways and the distinction matters everywhere:
//!
//! - [`ConnectionId`] is the volatile handle of one WebSocket connection.
//!   It changes whenever the client reconnects.
//! - [`PlayerId`] is the persistent identity of a player inside a room. It
//!   survives reconnects and is the key under which a disconnected player's
//!   seat is held.
//!
//! [`RoomCode`] is the short human-shareable identifier of a room.

use std::fmt;

use rand::Rng;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

/// Characters allowed in a room code. Ambiguous glyphs (0/O, 1/I/L) are
/// excluded so codes survive being read aloud.
pub const ROOM_CODE_ALPHABET: &[u8] = b"ABCDEFGHJKMNPQRSTUVWXYZ23456789";
/// Length of a room code.
pub const ROOM_CODE_LEN: usize = 6;

/// Volatile identifier of a single live connection.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ConnectionId(String);

impl ConnectionId {
    pub fn new(value: String) -> Self {
        Self(value)
    }

    /// Assign a fresh connection identifier.
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Persistent identity of a player, stable across reconnects.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PlayerId(String);

impl PlayerId {
    pub fn new(value: String) -> Self {
        Self(value)
    }

    /// Mint a fresh persistent identity for a newly hosting/joining player.
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Short human-shareable room identifier. Always stored uppercase; parsing
/// normalizes caller input, so codes are case-insensitive on the wire.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct RoomCode(String);

impl RoomCode {
    /// Generate a random code. Callers are responsible for collision
    /// checking against the room store and retrying.
    pub fn generate(rng: &mut impl Rng) -> Self {
        let code: String = (0..ROOM_CODE_LEN)
            .map(|_| ROOM_CODE_ALPHABET[rng.gen_range(0..ROOM_CODE_ALPHABET.len())] as char)
            .collect();
        Self(code)
    }

    /// Parse and normalize caller input.
    pub fn parse(value: &str) -> Result<Self, RoomCodeError> {
        let normalized = value.trim().to_ascii_uppercase();
        if normalized.len() != ROOM_CODE_LEN {
            return Err(RoomCodeError::InvalidLength {
                expected: ROOM_CODE_LEN,
                found: normalized.len(),
            });
        }
        for (index, ch) in normalized.chars().enumerate() {
            if !ROOM_CODE_ALPHABET.contains(&(ch as u8)) {
                return Err(RoomCodeError::InvalidCharacter { ch, index });
            }
        }
        Ok(Self(normalized))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RoomCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RoomCodeError {
    #[error("room code must be {expected} chars, got {found}")]
    InvalidLength { expected: usize, found: usize },
    #[error("invalid character '{ch}' at position {index}")]
    InvalidCharacter { ch: char, index: usize },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generated_room_codes_are_valid() {
        // テスト項目: 生成されたルームコードが常に有効な形式である
        // given (前提条件):
        let mut rng = rand::thread_rng();

        // when (操作) / then (期待する結果):
        for _ in 0..100 {
            let code = RoomCode::generate(&mut rng);
            assert!(RoomCode::parse(code.as_str()).is_ok(), "invalid: {code}");
        }
    }

    #[test]
    fn test_parse_normalizes_to_uppercase() {
        // テスト項目: 小文字・前後空白入りの入力が正規化される
        // given (前提条件):
        let input = "  abcdef  ";

        // when (操作):
        let code = RoomCode::parse(input).unwrap();

        // then (期待する結果):
        assert_eq!(code.as_str(), "ABCDEF");
    }

    #[test]
    fn test_parse_rejects_wrong_length() {
        // テスト項目: 長さ不正のコードが拒否される
        let result = RoomCode::parse("ABC");
        assert!(matches!(
            result,
            Err(RoomCodeError::InvalidLength { found: 3, .. })
        ));
    }

    #[test]
    fn test_parse_rejects_ambiguous_characters() {
        // テスト項目: 紛らわしい文字（0/O/1/I/L）を含むコードが拒否される
        let result = RoomCode::parse("ABC0EF");
        assert!(matches!(
            result,
            Err(RoomCodeError::InvalidCharacter { ch: '0', .. })
        ));
    }

    #[test]
    fn test_fresh_player_ids_are_unique() {
        // テスト項目: 新規発行された PlayerId が重複しない
        let a = PlayerId::generate();
        let b = PlayerId::generate();
        assert_ne!(a, b);
    }
}
