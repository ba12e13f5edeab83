//! Base-40 callsign addressing
//!
//! M17 addresses are 48-bit integers carried big-endian in six bytes.
//! Callsigns of up to nine characters from the alphabet
//! `' ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789-/.'` encode with the first
//! character least significant. Two ranges are reserved: the all-ones
//! address is the `@ALL` broadcast, and `(40^9, 40^9 + 40^8]` carries
//! group callsigns written with a leading `#`. Anything above that is
//! invalid.

use std::fmt;

use thiserror::Error;

/// Length of an encoded address
pub const ENCODED_LEN: usize = 6;

/// Maximum callsign length, in characters
pub const MAX_CALLSIGN_LEN: usize = 9;

/// The broadcast callsign
pub const DESTINATION_ALL: &str = "@ALL";

const ALPHABET: &[u8; 40] = b" ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789-/.";

const BROADCAST: u64 = 0xFFFF_FFFF_FFFF;

// 40^9 and 40^9 + 40^8: group callsigns live between them
const HASH_OFFSET: u64 = 40u64.pow(9);
const RESERVED_START: u64 = HASH_OFFSET + 40u64.pow(8);

/// Errors encoding or decoding a callsign
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum CallsignError {
    /// Callsign exceeds nine characters
    #[error("callsign \"{0}\" is longer than {MAX_CALLSIGN_LEN} characters")]
    TooLong(String),

    /// Character outside the base-40 alphabet
    #[error("invalid character {0:?} in callsign")]
    BadCharacter(char),

    /// Encoded value falls in the invalid reserved range
    #[error("address {0:#014x} is reserved and does not decode")]
    ReservedAddress(u64),

    /// Encoded address is not six bytes long
    #[error("encoded callsign length {0} != {ENCODED_LEN}")]
    BadLength(usize),
}

/// An on-air M17 address
///
/// Addresses compare bytewise and hash cheaply, so they can be used
/// directly as map keys. Use [`Address::encode`] to build one from a
/// callsign string and [`Address::callsign`] to get the string back.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Address(pub [u8; ENCODED_LEN]);

impl Address {
    /// The `@ALL` broadcast address
    pub const BROADCAST: Address = Address([0xFF; ENCODED_LEN]);

    /// Encode a callsign string
    ///
    /// The callsign is uppercased first; `@ALL` and `#`-prefixed
    /// group callsigns are accepted.
    pub fn encode(callsign: &str) -> Result<Address, CallsignError> {
        if callsign.len() > MAX_CALLSIGN_LEN {
            return Err(CallsignError::TooLong(callsign.to_owned()));
        }
        let callsign = callsign.to_ascii_uppercase();
        if callsign == DESTINATION_ALL {
            return Ok(Address::BROADCAST);
        }

        let body = callsign.strip_prefix('#');
        let mut address: u64 = 0;
        for c in body.unwrap_or(&callsign).chars().rev() {
            let val = ALPHABET
                .iter()
                .position(|&a| a == c as u8)
                .ok_or(CallsignError::BadCharacter(c))?;
            address = address * 40 + val as u64;
        }
        if body.is_some() {
            address += HASH_OFFSET;
        }

        let be = address.to_be_bytes();
        let mut out = [0u8; ENCODED_LEN];
        out.copy_from_slice(&be[2..]);
        Ok(Address(out))
    }

    /// Build an address from its six wire bytes
    pub fn from_bytes(encoded: &[u8]) -> Result<Address, CallsignError> {
        let bytes: [u8; ENCODED_LEN] = encoded
            .try_into()
            .map_err(|_| CallsignError::BadLength(encoded.len()))?;
        Ok(Address(bytes))
    }

    /// The six wire bytes, big-endian
    pub fn as_bytes(&self) -> &[u8; ENCODED_LEN] {
        &self.0
    }

    /// The 48-bit integer value
    pub fn value(&self) -> u64 {
        self.0.iter().fold(0u64, |acc, &b| (acc << 8) | b as u64)
    }

    /// Decode back into a callsign string
    ///
    /// Embedded spaces are preserved; addresses in the invalid
    /// reserved range are rejected.
    pub fn callsign(&self) -> Result<String, CallsignError> {
        let mut address = self.value();
        if address == BROADCAST {
            return Ok(DESTINATION_ALL.to_owned());
        }

        let mut callsign = String::new();
        if address >= HASH_OFFSET {
            if address >= RESERVED_START {
                return Err(CallsignError::ReservedAddress(address));
            }
            callsign.push('#');
            address -= HASH_OFFSET;
        }
        while address > 0 {
            callsign.push(ALPHABET[(address % 40) as usize] as char);
            address /= 40;
        }
        Ok(callsign)
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.callsign() {
            Ok(cs) => write!(f, "{}", cs),
            Err(_) => write!(f, "<{:#014x}>", self.value()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode() {
        assert_eq!(
            Address::encode("N1ADJ").unwrap().0,
            [0, 0, 1, 138, 146, 174]
        );
        // lowercase input is canonicalized
        assert_eq!(
            Address::encode("n1adj").unwrap().0,
            [0, 0, 1, 138, 146, 174]
        );
        assert_eq!(Address::encode("@all").unwrap().0, [0xFF; 6]);
        assert_eq!(
            Address::encode("#ALL").unwrap().0,
            [238, 107, 40, 0, 76, 225]
        );
        assert_eq!(
            Address::encode("#OTHER").unwrap().0,
            [238, 107, 42, 196, 55, 47]
        );
        assert_eq!(
            Address::encode("very long call"),
            Err(CallsignError::TooLong("very long call".to_owned()))
        );
        assert_eq!(
            Address::encode("N0C@LL"),
            Err(CallsignError::BadCharacter('@'))
        );
    }

    #[test]
    fn test_decode() {
        assert_eq!(
            Address([0, 0, 1, 138, 146, 174]).callsign().unwrap(),
            "N1ADJ"
        );
        assert_eq!(Address([0xFF; 6]).callsign().unwrap(), "@ALL");
        assert_eq!(
            Address([238, 107, 40, 0, 76, 225]).callsign().unwrap(),
            "#ALL"
        );
        assert_eq!(
            Address([238, 107, 42, 196, 55, 47]).callsign().unwrap(),
            "#OTHER"
        );
        assert!(Address::from_bytes(&[0xFF; 8]).is_err());
    }

    #[test]
    fn test_decode_embedded_spaces() {
        // spaces inside a callsign survive the trip
        assert_eq!(
            Address([0x47, 0x86, 0x8C, 0xC4, 0xCC, 0x5E]).callsign().unwrap(),
            "N7TAE   L"
        );
    }

    #[test]
    fn test_reserved_range_rejected() {
        let reserved = RESERVED_START + 1;
        let be = reserved.to_be_bytes();
        let mut bytes = [0u8; 6];
        bytes.copy_from_slice(&be[2..]);
        assert_eq!(
            Address(bytes).callsign(),
            Err(CallsignError::ReservedAddress(reserved))
        );
    }

    #[test]
    fn test_round_trip() {
        for cs in ["N0CALL", "@ALL", "#ALL", "AB1CDE-9", "W1AW/4", "X"] {
            let addr = Address::encode(cs).unwrap();
            assert_eq!(addr.callsign().unwrap(), cs, "round trip of {cs}");
        }
    }
}
