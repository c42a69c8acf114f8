//! MD5 content fingerprints

use core::fmt;
use core::str::FromStr;

/// 128-bit MD5 digest of a memory region
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Fingerprint(pub [u8; 16]);

const fn hex_nibble(c: u8) -> Option<u8> {
    match c {
        b'0'..=b'9' => Some(c - b'0'),
        b'a'..=b'f' => Some(c - b'a' + 10),
        b'A'..=b'F' => Some(c - b'A' + 10),
        _ => None,
    }
}

impl Fingerprint {
    /// Digest of a complete buffer
    pub fn of(data: &[u8]) -> Self {
        Self(md5::compute(data).0)
    }

    /// Parse 32 hex digits
    pub const fn parse_hex(s: &str) -> Option<Self> {
        let bytes = s.as_bytes();
        if bytes.len() != 32 {
            return None;
        }

        let mut out = [0u8; 16];
        let mut i = 0;
        while i < 16 {
            let hi = match hex_nibble(bytes[2 * i]) {
                Some(v) => v,
                None => return None,
            };
            let lo = match hex_nibble(bytes[2 * i + 1]) {
                Some(v) => v,
                None => return None,
            };
            out[i] = (hi << 4) | lo;
            i += 1;
        }
        Some(Self(out))
    }

    /// Parse a compiled-in hex literal
    ///
    /// Fails the build when used in a const context with a bad literal.
    pub(crate) const fn from_hex(s: &str) -> Self {
        match Self::parse_hex(s) {
            Some(fp) => fp,
            None => panic!("invalid fingerprint literal"),
        }
    }

    /// Digest bytes
    pub fn as_bytes(&self) -> &[u8; 16] {
        &self.0
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for b in self.0 {
            write!(f, "{:02X}", b)?;
        }
        Ok(())
    }
}

/// Error parsing a fingerprint string
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParseFingerprintError;

impl fmt::Display for ParseFingerprintError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "fingerprint must be 32 hex digits")
    }
}

#[cfg(feature = "std")]
impl std::error::Error for ParseFingerprintError {}

impl FromStr for Fingerprint {
    type Err = ParseFingerprintError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse_hex(s.trim()).ok_or(ParseFingerprintError)
    }
}

/// Streaming digest of a memory region
///
/// Tracks whether every byte fed so far was the erased value `0xFF`.
pub struct RegionHasher {
    ctx: md5::Context,
    all_erased: bool,
    len: u32,
}

impl RegionHasher {
    /// Start a new digest
    pub fn new() -> Self {
        Self {
            ctx: md5::Context::new(),
            all_erased: true,
            len: 0,
        }
    }

    /// Feed one byte
    pub fn update(&mut self, byte: u8) {
        if byte != crate::isp::opcodes::ERASED {
            self.all_erased = false;
        }
        self.ctx.consume([byte]);
        self.len += 1;
    }

    /// Number of bytes fed
    pub fn len(&self) -> u32 {
        self.len
    }

    /// Whether no bytes were fed
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Finish, returning the digest and whether every byte was erased
    pub fn finish(self) -> (Fingerprint, bool) {
        (Fingerprint(self.ctx.compute().0), self.all_erased)
    }
}

impl Default for RegionHasher {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::string::ToString;

    #[test]
    fn test_md5_empty() {
        assert_eq!(
            Fingerprint::of(&[]).to_string(),
            "D41D8CD98F00B204E9800998ECF8427E"
        );
    }

    #[test]
    fn test_parse_and_display() {
        let fp: Fingerprint = "0aacf716f43ca2c9277e08b9d690bc02".parse().unwrap();
        assert_eq!(fp.0[0], 0x0A);
        assert_eq!(fp.0[15], 0x02);
        assert_eq!(fp.to_string(), "0AACF716F43CA2C9277E08B9D690BC02");

        assert!("0AACF716".parse::<Fingerprint>().is_err());
        assert!("ZZACF716F43CA2C9277E08B9D690BC02".parse::<Fingerprint>().is_err());
    }

    #[test]
    fn test_streaming_matches_one_shot() {
        let data: alloc::vec::Vec<u8> = (0..=255u8).cycle().take(1000).collect();
        let mut hasher = RegionHasher::new();
        for b in &data {
            hasher.update(*b);
        }
        assert_eq!(hasher.len(), 1000);
        let (fp, erased) = hasher.finish();
        assert_eq!(fp, Fingerprint::of(&data));
        assert!(!erased);
    }

    #[test]
    fn test_erased_tracking() {
        let mut hasher = RegionHasher::new();
        for _ in 0..512 {
            hasher.update(0xFF);
        }
        let (fp, erased) = hasher.finish();
        assert!(erased);
        assert_eq!(fp, Fingerprint::of(&[0xFF; 512]));
    }
}
