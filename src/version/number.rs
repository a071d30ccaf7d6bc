//! Unbounded version numbers
//!
//! Protocol version components are arbitrary-precision unsigned integers so
//! that no future server can advertise a version this client silently
//! truncates.
//!
//! ## Representation
//! Minimal big-endian base-256 magnitude: no leading zero bytes, and zero is
//! the empty vector. This makes derived equality and hashing exact, and
//! ordering a comparison of length followed by bytes.
//!
//! ## Encodings
//! - Human-readable formats (JSON): a plain number of any size
//! - Binary formats (bincode): the magnitude bytes

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use serde::de::{self, Deserializer, Visitor};
use serde::{Deserialize, Serialize, Serializer};

/// An arbitrary-precision unsigned integer
#[derive(Clone, PartialEq, Eq, Hash, Default)]
pub struct VersionNumber {
    magnitude: Vec<u8>,
}

impl VersionNumber {
    /// Zero
    pub fn zero() -> Self {
        Self::default()
    }

    /// Build from big-endian bytes (leading zeros are stripped)
    pub fn from_be_bytes(bytes: &[u8]) -> Self {
        let first = bytes.iter().position(|&b| b != 0).unwrap_or(bytes.len());
        Self {
            magnitude: bytes[first..].to_vec(),
        }
    }

    /// Minimal big-endian bytes
    pub fn to_be_bytes(&self) -> &[u8] {
        &self.magnitude
    }

    pub fn is_zero(&self) -> bool {
        self.magnitude.is_empty()
    }

    /// The value as a u64, if it fits
    pub fn to_u64(&self) -> Option<u64> {
        if self.magnitude.len() > 8 {
            return None;
        }
        Some(
            self.magnitude
                .iter()
                .fold(0u64, |acc, &b| (acc << 8) | u64::from(b)),
        )
    }

    /// self = self * factor + addend
    fn mul_add(&mut self, factor: u8, addend: u8) {
        let mut carry = u32::from(addend);
        for byte in self.magnitude.iter_mut().rev() {
            let value = u32::from(*byte) * u32::from(factor) + carry;
            *byte = (value & 0xFF) as u8;
            carry = value >> 8;
        }
        if carry > 0 {
            self.magnitude.insert(0, carry as u8);
        }
        self.normalize();
    }

    /// self = self / divisor, returning the remainder
    fn div_rem(&mut self, divisor: u8) -> u8 {
        let mut remainder = 0u32;
        for byte in self.magnitude.iter_mut() {
            let value = (remainder << 8) | u32::from(*byte);
            *byte = (value / u32::from(divisor)) as u8;
            remainder = value % u32::from(divisor);
        }
        self.normalize();
        remainder as u8
    }

    fn normalize(&mut self) {
        let first = self
            .magnitude
            .iter()
            .position(|&b| b != 0)
            .unwrap_or(self.magnitude.len());
        self.magnitude.drain(..first);
    }
}

impl From<u64> for VersionNumber {
    fn from(value: u64) -> Self {
        Self::from_be_bytes(&value.to_be_bytes())
    }
}

impl From<u32> for VersionNumber {
    fn from(value: u32) -> Self {
        Self::from(u64::from(value))
    }
}

impl Ord for VersionNumber {
    fn cmp(&self, other: &Self) -> Ordering {
        self.magnitude
            .len()
            .cmp(&other.magnitude.len())
            .then_with(|| self.magnitude.cmp(&other.magnitude))
    }
}

impl PartialOrd for VersionNumber {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Error parsing a decimal version number
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseVersionNumberError(String);

impl fmt::Display for ParseVersionNumberError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid version number: {:?}", self.0)
    }
}

impl std::error::Error for ParseVersionNumberError {}

impl FromStr for VersionNumber {
    type Err = ParseVersionNumberError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.is_empty() || !s.bytes().all(|b| b.is_ascii_digit()) {
            return Err(ParseVersionNumberError(s.to_string()));
        }
        let mut number = VersionNumber::zero();
        for digit in s.bytes() {
            number.mul_add(10, digit - b'0');
        }
        Ok(number)
    }
}

impl fmt::Display for VersionNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_zero() {
            return f.write_str("0");
        }
        let mut digits = Vec::new();
        let mut rest = self.clone();
        while !rest.is_zero() {
            digits.push(b'0' + rest.div_rem(10));
        }
        digits.reverse();
        // Only ASCII digits were pushed
        f.write_str(&String::from_utf8_lossy(&digits))
    }
}

impl fmt::Debug for VersionNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "VersionNumber({})", self)
    }
}

// =============================================================================
// Serde
// =============================================================================

impl Serialize for VersionNumber {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        if serializer.is_human_readable() {
            match self.to_u64() {
                Some(small) => serializer.serialize_u64(small),
                None => {
                    let number = serde_json::Number::from_str(&self.to_string())
                        .map_err(serde::ser::Error::custom)?;
                    number.serialize(serializer)
                }
            }
        } else {
            serializer.serialize_bytes(&self.magnitude)
        }
    }
}

impl<'de> Deserialize<'de> for VersionNumber {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        if deserializer.is_human_readable() {
            let number = serde_json::Number::deserialize(deserializer)?;
            VersionNumber::from_str(&number.to_string()).map_err(de::Error::custom)
        } else {
            deserializer.deserialize_bytes(MagnitudeVisitor)
        }
    }
}

struct MagnitudeVisitor;

impl<'de> Visitor<'de> for MagnitudeVisitor {
    type Value = VersionNumber;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("big-endian magnitude bytes")
    }

    fn visit_bytes<E: de::Error>(self, v: &[u8]) -> Result<Self::Value, E> {
        Ok(VersionNumber::from_be_bytes(v))
    }

    fn visit_byte_buf<E: de::Error>(self, v: Vec<u8>) -> Result<Self::Value, E> {
        Ok(VersionNumber::from_be_bytes(&v))
    }

    fn visit_seq<A: de::SeqAccess<'de>>(self, mut seq: A) -> Result<Self::Value, A::Error> {
        let mut bytes = Vec::new();
        while let Some(b) = seq.next_element::<u8>()? {
            bytes.push(b);
        }
        Ok(VersionNumber::from_be_bytes(&bytes))
    }
}
