//! Ed25519 keys for signing schema objects.
//!
//! Keys and signatures travel as lowercase hex: the secret in the client's
//! key file, the public key inside a `public-key` blob, the signature in
//! a signed object's `camliSig` field.

/// Ed25519 secret key. Never printed.
pub struct SigningKey(ed25519_dalek::SigningKey);

/// Ed25519 public key, as published in a `public-key` blob.
#[derive(Clone, PartialEq, Eq)]
pub struct VerifyingKey(ed25519_dalek::VerifyingKey);

/// Detached Ed25519 signature.
#[derive(Clone, PartialEq, Eq)]
pub struct Signature(ed25519_dalek::Signature);

impl SigningKey {
    /// Fresh key from the OS RNG (`hoard init`).
    pub fn generate() -> Self {
        Self(ed25519_dalek::SigningKey::generate(&mut rand::thread_rng()))
    }

    /// Key from a fixed seed. Tests use this for reproducible signatures.
    pub fn from_bytes(seed: [u8; 32]) -> Self {
        Self(ed25519_dalek::SigningKey::from_bytes(&seed))
    }

    /// Parse the key file contents. Surrounding whitespace is ignored.
    pub fn from_hex(s: &str) -> Result<Self, SignatureError> {
        decode_fixed::<32>(s.trim()).map(Self::from_bytes)
    }

    /// Key file contents.
    pub fn to_hex(&self) -> String {
        hex::encode(self.0.as_bytes())
    }

    pub fn verifying_key(&self) -> VerifyingKey {
        VerifyingKey(self.0.verifying_key())
    }

    /// Ed25519 is deterministic: the same key and payload give the same
    /// signature.
    pub fn sign(&self, payload: &[u8]) -> Signature {
        use ed25519_dalek::Signer;
        Signature(self.0.sign(payload))
    }
}

impl VerifyingKey {
    pub fn verify(&self, payload: &[u8], signature: &Signature) -> Result<(), SignatureError> {
        use ed25519_dalek::Verifier;
        self.0
            .verify(payload, &signature.0)
            .map_err(|_| SignatureError::InvalidSignature)
    }

    /// Value of a public-key blob's `publicKey` field.
    pub fn to_hex(&self) -> String {
        hex::encode(self.0.as_bytes())
    }

    pub fn from_hex(s: &str) -> Result<Self, SignatureError> {
        let raw = decode_fixed::<32>(s)?;
        ed25519_dalek::VerifyingKey::from_bytes(&raw)
            .map(Self)
            .map_err(|_| SignatureError::InvalidKey)
    }
}

impl Signature {
    pub fn to_bytes(&self) -> [u8; 64] {
        self.0.to_bytes()
    }

    /// Decode a raw signature of exactly 64 bytes.
    pub fn from_slice(raw: &[u8]) -> Result<Self, SignatureError> {
        ed25519_dalek::Signature::from_slice(raw)
            .map(Self)
            .map_err(|_| {
                SignatureError::InvalidEncoding(format!("expected 64 bytes, got {}", raw.len()))
            })
    }
}

fn decode_fixed<const N: usize>(s: &str) -> Result<[u8; N], SignatureError> {
    let raw = hex::decode(s).map_err(|e| SignatureError::InvalidEncoding(e.to_string()))?;
    raw.try_into().map_err(|v: Vec<u8>| {
        SignatureError::InvalidEncoding(format!("expected {N} bytes, got {}", v.len()))
    })
}

impl std::fmt::Debug for SigningKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("SigningKey(<redacted>)")
    }
}

impl std::fmt::Debug for VerifyingKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "VerifyingKey({})", self.to_hex())
    }
}

impl std::fmt::Debug for Signature {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Signature({}..)", hex::encode(&self.to_bytes()[..8]))
    }
}

/// Key or signature decoding and verification failures.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum SignatureError {
    #[error("signature does not verify")]
    InvalidSignature,
    #[error("not a valid Ed25519 public key")]
    InvalidKey,
    #[error("bad key or signature encoding: {0}")]
    InvalidEncoding(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sign_and_verify() {
        let sk = SigningKey::generate();
        let vk = sk.verifying_key();
        let message = b"hello world";
        let sig = sk.sign(message);
        assert!(vk.verify(message, &sig).is_ok());
    }

    #[test]
    fn verify_fails_on_wrong_message() {
        let sk = SigningKey::generate();
        let vk = sk.verifying_key();
        let sig = sk.sign(b"correct message");
        assert_eq!(
            vk.verify(b"wrong message", &sig),
            Err(SignatureError::InvalidSignature)
        );
    }

    #[test]
    fn verify_fails_with_wrong_key() {
        let sk1 = SigningKey::generate();
        let sk2 = SigningKey::generate();
        let sig = sk1.sign(b"message");
        assert!(sk2.verifying_key().verify(b"message", &sig).is_err());
    }

    #[test]
    fn signing_is_deterministic() {
        let sk = SigningKey::from_bytes([7; 32]);
        assert_eq!(sk.sign(b"payload"), sk.sign(b"payload"));
    }

    #[test]
    fn secret_hex_roundtrip() {
        let sk = SigningKey::generate();
        let sk2 = SigningKey::from_hex(&format!("{}\n", sk.to_hex())).unwrap();
        assert_eq!(sk.verifying_key(), sk2.verifying_key());
    }

    #[test]
    fn public_hex_roundtrip() {
        let vk = SigningKey::generate().verifying_key();
        assert_eq!(VerifyingKey::from_hex(&vk.to_hex()).unwrap(), vk);
    }

    #[test]
    fn bad_hex_is_rejected() {
        assert!(matches!(
            SigningKey::from_hex("zz"),
            Err(SignatureError::InvalidEncoding(_))
        ));
        assert!(matches!(
            VerifyingKey::from_hex("abcd"),
            Err(SignatureError::InvalidEncoding(_))
        ));
    }

    #[test]
    fn signature_slice_roundtrip() {
        let sig = SigningKey::generate().sign(b"test");
        assert_eq!(Signature::from_slice(&sig.to_bytes()).unwrap(), sig);
        assert!(Signature::from_slice(&[0u8; 10]).is_err());
    }

    #[test]
    fn debug_redacts_signing_key() {
        let sk = SigningKey::generate();
        let debug = format!("{sk:?}");
        assert!(debug.contains("redacted"));
    }
}
