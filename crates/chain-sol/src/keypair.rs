//! Secret key parsing and the Ed25519 signing keypair.
//!
//! Solana wallets export a secret key as 64 bytes: the 32-byte Ed25519 seed
//! followed by the 32-byte public key. Users paste it either as a JSON array
//! (`solana-keygen` file format) or as a Base58 string (browser wallets).

use std::fmt;

use ed25519_dalek::{Signer, SigningKey, SECRET_KEY_LENGTH};
use zeroize::Zeroizing;

use crate::address::bytes_to_address;
use crate::error::SolError;

/// Length of a full Solana secret key (seed + public key).
pub const KEYPAIR_LENGTH: usize = 64;

const KEY_FORMAT_ERROR: &str = "Invalid private key format. Must be Base58 or JSON array format";

/// A successfully decoded secret key, tagged with the format it came from.
pub enum ParsedKey {
    /// `[12, 255, ...]` with exactly 64 entries in `0..=255`.
    JsonArray(Zeroizing<Vec<u8>>),
    /// Any other text that Base58-decodes.
    Base58(Zeroizing<Vec<u8>>),
}

impl ParsedKey {
    pub fn as_bytes(&self) -> &[u8] {
        match self {
            ParsedKey::JsonArray(bytes) | ParsedKey::Base58(bytes) => bytes,
        }
    }

    pub fn format_name(&self) -> &'static str {
        match self {
            ParsedKey::JsonArray(_) => "JSON array",
            ParsedKey::Base58(_) => "Base58",
        }
    }
}

impl fmt::Debug for ParsedKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "ParsedKey({}, {} bytes)",
            self.format_name(),
            self.as_bytes().len()
        )
    }
}

/// Decode a secret key from user input.
///
/// The JSON branch is tried first. A JSON value that is not an array of
/// exactly 64 integers in `0..=255` is not reported on its own: the input
/// simply falls through to Base58 decoding. Only if both fail is an error
/// returned. Length is not checked for Base58 here; [`SolKeypair::from_bytes`]
/// does that.
pub fn parse_secret_key(input: &str) -> Result<ParsedKey, SolError> {
    let input = input.trim();

    if let Some(bytes) = parse_json_byte_array(input) {
        return Ok(ParsedKey::JsonArray(bytes));
    }

    match bs58::decode(input).into_vec() {
        Ok(bytes) if !bytes.is_empty() => Ok(ParsedKey::Base58(Zeroizing::new(bytes))),
        _ => Err(SolError::InvalidKeyFormat(KEY_FORMAT_ERROR.into())),
    }
}

fn parse_json_byte_array(input: &str) -> Option<Zeroizing<Vec<u8>>> {
    let value: serde_json::Value = serde_json::from_str(input).ok()?;
    let entries = value.as_array()?;
    if entries.len() != KEYPAIR_LENGTH {
        return None;
    }

    let mut bytes = Zeroizing::new(Vec::with_capacity(KEYPAIR_LENGTH));
    for entry in entries {
        // `12.0` is a JSON float but still a whole byte value.
        let byte = entry
            .as_u64()
            .or_else(|| {
                entry
                    .as_f64()
                    .filter(|f| f.fract() == 0.0 && (0.0..=255.0).contains(f))
                    .map(|f| f as u64)
            })
            .filter(|b| *b <= u8::MAX as u64)?;
        bytes.push(byte as u8);
    }
    Some(bytes)
}

/// An Ed25519 keypair used to sign one transfer.
///
/// The secret half is zeroized on drop (via `ed25519-dalek`).
pub struct SolKeypair {
    signing_key: SigningKey,
}

impl SolKeypair {
    /// Build a keypair from a 64-byte Solana secret key.
    ///
    /// Fails if the length is wrong or if the trailing 32 bytes are not the
    /// public key of the leading 32-byte seed.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, SolError> {
        if bytes.len() != KEYPAIR_LENGTH {
            return Err(SolError::InvalidPrivateKey(format!(
                "expected {KEYPAIR_LENGTH} bytes, got {}",
                bytes.len()
            )));
        }

        let mut raw = Zeroizing::new([0u8; KEYPAIR_LENGTH]);
        raw.copy_from_slice(bytes);

        let signing_key = SigningKey::from_keypair_bytes(&raw).map_err(|e| {
            SolError::InvalidPrivateKey(format!("public key does not match secret key: {e}"))
        })?;

        Ok(Self { signing_key })
    }

    /// Build a keypair from a bare 32-byte Ed25519 seed.
    pub fn from_seed(seed: &[u8; SECRET_KEY_LENGTH]) -> Self {
        Self {
            signing_key: SigningKey::from_bytes(seed),
        }
    }

    /// The 32-byte public key, which is also the account address.
    pub fn pubkey(&self) -> [u8; 32] {
        self.signing_key.verifying_key().to_bytes()
    }

    pub fn address(&self) -> String {
        bytes_to_address(&self.pubkey())
    }

    /// Full 64-byte secret key in Solana's export layout.
    pub fn to_bytes(&self) -> Zeroizing<[u8; KEYPAIR_LENGTH]> {
        Zeroizing::new(self.signing_key.to_keypair_bytes())
    }

    pub fn sign(&self, message: &[u8]) -> [u8; 64] {
        self.signing_key.sign(message).to_bytes()
    }
}

impl fmt::Debug for SolKeypair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SolKeypair")
            .field("address", &self.address())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::RngCore;

    fn random_keypair() -> SolKeypair {
        let mut seed = [0u8; 32];
        rand::thread_rng().fill_bytes(&mut seed);
        SolKeypair::from_seed(&seed)
    }

    fn json_array(bytes: &[u8]) -> String {
        let items: Vec<String> = bytes.iter().map(|b| b.to_string()).collect();
        format!("[{}]", items.join(","))
    }

    // -- JSON branch --------------------------------------------------------

    #[test]
    fn json_array_of_64_bytes_is_accepted() {
        let keypair = random_keypair();
        let parsed = parse_secret_key(&json_array(&keypair.to_bytes()[..])).unwrap();
        assert!(matches!(parsed, ParsedKey::JsonArray(_)));
        assert_eq!(parsed.as_bytes(), &keypair.to_bytes()[..]);
    }

    #[test]
    fn json_array_boundary_values_are_accepted() {
        let mut bytes = vec![0u8; 64];
        bytes[63] = 255;
        let parsed = parse_secret_key(&json_array(&bytes)).unwrap();
        assert!(matches!(parsed, ParsedKey::JsonArray(_)));
        assert_eq!(parsed.as_bytes(), bytes.as_slice());
    }

    #[test]
    fn json_array_with_whitespace_is_accepted() {
        let text = format!("  {}\n", json_array(&[1u8; 64]).replace(',', ", "));
        assert!(matches!(
            parse_secret_key(&text).unwrap(),
            ParsedKey::JsonArray(_)
        ));
    }

    #[test]
    fn json_array_with_float_spelled_bytes_is_accepted() {
        let keypair = random_keypair();
        let items: Vec<String> = keypair.to_bytes().iter().map(|b| format!("{b}.0")).collect();
        let text = format!("[{}]", items.join(","));

        let parsed = parse_secret_key(&text).unwrap();
        assert!(matches!(parsed, ParsedKey::JsonArray(_)));
        let restored = SolKeypair::from_bytes(parsed.as_bytes()).unwrap();
        assert_eq!(restored.address(), keypair.address());
    }

    #[test]
    fn fractional_entry_falls_through() {
        let mut text = json_array(&[1u8; 63]);
        text.insert_str(1, "1.5,");
        let err = parse_secret_key(&text).unwrap_err();
        assert!(matches!(err, SolError::InvalidKeyFormat(_)));
    }

    #[test]
    fn float_entry_above_255_falls_through() {
        let mut text = json_array(&[1u8; 63]);
        text.insert_str(1, "256.0,");
        assert!(parse_secret_key(&text).is_err());
    }

    #[test]
    fn short_json_array_falls_through_and_fails() {
        // '[' is not in the Base58 alphabet, so the fallback fails too.
        let err = parse_secret_key(&json_array(&[1u8; 63])).unwrap_err();
        assert!(matches!(err, SolError::InvalidKeyFormat(_)));
    }

    #[test]
    fn out_of_range_entry_falls_through() {
        let mut text = json_array(&[1u8; 63]);
        text.insert_str(1, "256,");
        let err = parse_secret_key(&text).unwrap_err();
        assert!(err.to_string().contains("Base58 or JSON array"));
    }

    #[test]
    fn non_numeric_entry_falls_through() {
        let mut text = json_array(&[1u8; 63]);
        text.insert_str(1, "\"a\",");
        assert!(parse_secret_key(&text).is_err());
    }

    #[test]
    fn negative_entry_falls_through() {
        let mut text = json_array(&[1u8; 63]);
        text.insert_str(1, "-1,");
        assert!(parse_secret_key(&text).is_err());
    }

    #[test]
    fn json_number_falls_through_to_base58() {
        // Valid JSON, not an array; "123" is valid Base58.
        let parsed = parse_secret_key("123").unwrap();
        assert!(matches!(parsed, ParsedKey::Base58(_)));
    }

    // -- Base58 branch ------------------------------------------------------

    #[test]
    fn base58_secret_key_is_accepted() {
        let keypair = random_keypair();
        let encoded = bs58::encode(&keypair.to_bytes()[..]).into_string();
        let parsed = parse_secret_key(&encoded).unwrap();
        assert!(matches!(parsed, ParsedKey::Base58(_)));
        assert_eq!(parsed.format_name(), "Base58");
        assert_eq!(parsed.as_bytes(), &keypair.to_bytes()[..]);
    }

    #[test]
    fn neither_format_fails_with_dual_format_message() {
        for input in ["", "   ", "0OIl", "not a key!", "{\"k\": 1}"] {
            let err = parse_secret_key(input).unwrap_err();
            assert_eq!(
                err.to_string(),
                "Invalid private key format. Must be Base58 or JSON array format",
                "input {input:?}"
            );
        }
    }

    #[test]
    fn debug_does_not_print_key_bytes() {
        let parsed = parse_secret_key(&json_array(&[42u8; 64])).unwrap();
        let debug = format!("{parsed:?}");
        assert_eq!(debug, "ParsedKey(JSON array, 64 bytes)");
    }

    // -- SolKeypair ---------------------------------------------------------

    #[test]
    fn keypair_roundtrips_through_secret_bytes() {
        let keypair = random_keypair();
        let restored = SolKeypair::from_bytes(&keypair.to_bytes()[..]).unwrap();
        assert_eq!(restored.pubkey(), keypair.pubkey());
        assert_eq!(restored.address(), keypair.address());
    }

    #[test]
    fn keypair_wrong_length_fails() {
        let err = SolKeypair::from_bytes(&[1u8; 32]).unwrap_err();
        assert!(err.to_string().contains("expected 64 bytes, got 32"));
    }

    #[test]
    fn keypair_mismatched_public_half_fails() {
        let keypair = random_keypair();
        let mut bytes = *keypair.to_bytes();
        bytes[40] ^= 0xff;
        assert!(SolKeypair::from_bytes(&bytes).is_err());
    }

    #[test]
    fn keypair_signature_verifies() {
        use ed25519_dalek::{Signature, VerifyingKey};

        let keypair = SolKeypair::from_seed(&[0x42u8; 32]);
        let sig = keypair.sign(b"hello");
        let vk = VerifyingKey::from_bytes(&keypair.pubkey()).unwrap();
        assert!(vk.verify_strict(b"hello", &Signature::from_bytes(&sig)).is_ok());
    }

    #[test]
    fn keypair_debug_shows_only_address() {
        let keypair = SolKeypair::from_seed(&[0x11u8; 32]);
        let debug = format!("{keypair:?}");
        assert!(debug.contains(&keypair.address()));
        assert!(!debug.contains("signing_key"));
    }
}
