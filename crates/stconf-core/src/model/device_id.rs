// ── Device identity ──
//
// Syncthing device IDs are the base32 SHA-256 of the device certificate:
// 52 significant characters, optionally carrying one Luhn mod 32 check
// character after each 13-character chunk (56 total). The canonical form
// is the 56-character one, uppercase, in eight dash-separated groups of 7.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

const ALPHABET: &[u8; 32] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ234567";
const CHUNK: usize = 13;
const GROUP: usize = 7;
const BARE_LEN: usize = 52;
const CHECKED_LEN: usize = 56;

/// Why a string is not a device ID.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DeviceIdError {
    #[error("device ID has {0} significant characters, expected 52 or 56")]
    Length(usize),

    #[error("device ID contains invalid character '{0}'")]
    Character(char),

    #[error("device ID check digit mismatch in group {0}")]
    CheckDigit(usize),
}

/// A validated, canonical Syncthing device ID.
///
/// Parsing is case-insensitive, ignores `-` and whitespace, and reads the
/// commonly-mistyped `0`, `1`, `8` as `O`, `I`, `B`. Two spellings of the
/// same device therefore compare equal.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct DeviceId(String);

impl DeviceId {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The first group, Syncthing's "short ID".
    pub fn short(&self) -> &str {
        self.0.get(..GROUP).unwrap_or(&self.0)
    }
}

impl fmt::Display for DeviceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for DeviceId {
    type Err = DeviceIdError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let mut cleaned = Vec::with_capacity(CHECKED_LEN);
        for c in raw.chars().filter(|c| *c != '-' && !c.is_whitespace()) {
            let c = match c.to_ascii_uppercase() {
                '0' => 'O',
                '1' => 'I',
                '8' => 'B',
                other => other,
            };
            let byte = u8::try_from(c)
                .ok()
                .filter(|b| ALPHABET.contains(b))
                .ok_or(DeviceIdError::Character(c))?;
            cleaned.push(byte);
        }

        let checked = match cleaned.len() {
            BARE_LEN => add_check_digits(&cleaned),
            CHECKED_LEN => {
                verify_check_digits(&cleaned)?;
                cleaned
            }
            other => return Err(DeviceIdError::Length(other)),
        };

        let groups: Vec<&str> = checked
            .chunks(GROUP)
            .map(|g| std::str::from_utf8(g).unwrap_or_default())
            .collect();
        Ok(Self(groups.join("-")))
    }
}

impl TryFrom<String> for DeviceId {
    type Error = DeviceIdError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<DeviceId> for String {
    fn from(id: DeviceId) -> Self {
        id.0
    }
}

// ── Luhn mod 32 ──────────────────────────────────────────────────────

fn codepoint(b: u8) -> usize {
    ALPHABET.iter().position(|&a| a == b).unwrap_or(0)
}

fn luhn_base32(chunk: &[u8]) -> u8 {
    let n = ALPHABET.len();
    let mut factor = 1;
    let mut sum = 0;
    for &b in chunk {
        let addend = factor * codepoint(b);
        factor = if factor == 2 { 1 } else { 2 };
        sum += addend / n + addend % n;
    }
    ALPHABET[(n - sum % n) % n]
}

fn add_check_digits(bare: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(CHECKED_LEN);
    for chunk in bare.chunks(CHUNK) {
        out.extend_from_slice(chunk);
        out.push(luhn_base32(chunk));
    }
    out
}

fn verify_check_digits(checked: &[u8]) -> Result<(), DeviceIdError> {
    for (idx, chunk) in checked.chunks(CHUNK + 1).enumerate() {
        let (data, check) = chunk.split_at(CHUNK);
        if check.first() != Some(&luhn_base32(data)) {
            return Err(DeviceIdError::CheckDigit(idx + 1));
        }
    }
    Ok(())
}
