//! Human-entered room codes.

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::EngineError;

/// Number of letters in a room code.
pub const CODE_LEN: usize = 4;

const ALPHABET: &[u8; 26] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ";

/// A four-letter uppercase room code, e.g. `QXAT`.
///
/// Codes are typed by people, so parsing is case-insensitive and always
/// yields the uppercase form.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct RoomCode(String);

impl RoomCode {
    /// Draws a fresh random code.
    ///
    /// Randomness comes from a v4 UUID; collisions are the store's problem.
    #[must_use]
    pub fn generate() -> Self {
        let random = Uuid::new_v4();
        let code = random
            .as_bytes()
            .iter()
            .take(CODE_LEN)
            .map(|byte| ALPHABET[usize::from(*byte) % ALPHABET.len()] as char)
            .collect();
        Self(code)
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RoomCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for RoomCode {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.len() != CODE_LEN || !trimmed.chars().all(|c| c.is_ascii_alphabetic()) {
            return Err(EngineError::InvalidCode(s.to_string()));
        }
        Ok(Self(trimmed.to_ascii_uppercase()))
    }
}

impl TryFrom<String> for RoomCode {
    type Error = EngineError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<RoomCode> for String {
    fn from(value: RoomCode) -> Self {
        value.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generated_codes_are_four_uppercase_letters() {
        for _ in 0..64 {
            let code = RoomCode::generate();
            assert_eq!(code.as_str().len(), CODE_LEN);
            assert!(code.as_str().chars().all(|c| c.is_ascii_uppercase()));
        }
    }

    #[test]
    fn parse_normalizes_case() {
        let code: RoomCode = " abCd ".parse().unwrap();
        assert_eq!(code.as_str(), "ABCD");
    }

    #[test]
    fn parse_rejects_bad_codes() {
        assert!("ABC".parse::<RoomCode>().is_err());
        assert!("ABCDE".parse::<RoomCode>().is_err());
        assert!("AB1D".parse::<RoomCode>().is_err());
        assert!("".parse::<RoomCode>().is_err());
    }

    #[test]
    fn serde_roundtrips_through_string() {
        let code: RoomCode = "wxyz".parse().unwrap();
        let json = serde_json::to_string(&code).unwrap();
        assert_eq!(json, "\"WXYZ\"");
        assert!(serde_json::from_str::<RoomCode>("\"W1\"").is_err());
    }
}
