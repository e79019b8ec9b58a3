//! # Identity and Signing
//!
//! secp256k1 ECDSA over pre-hashed digests. Nonces are RFC 6979
//! deterministic, so the same digest always yields the same signature.

use crate::domain::Digest32;
use crate::errors::SigningError;
use k256::ecdsa::{
    signature::hazmat::{PrehashSigner, PrehashVerifier},
    Signature, SigningKey, VerifyingKey,
};
use shared_types::ClientIdentity;
use std::fmt;

/// The signing half of a client or peer identity.
///
/// Loaded once at startup and shared read-only between pipelines.
pub trait Signer: Send + Sync {
    /// Sign a 32-byte digest.
    fn sign(&self, digest: &Digest32) -> Result<Vec<u8>, SigningError>;

    /// SEC1-encoded verifying key matching [`Signer::sign`].
    fn public_key(&self) -> Vec<u8>;
}

/// secp256k1 signer.
pub struct EcdsaSigner {
    signing_key: SigningKey,
}

impl EcdsaSigner {
    /// Generate a fresh random key.
    pub fn generate() -> Self {
        Self {
            signing_key: SigningKey::random(&mut rand::thread_rng()),
        }
    }

    /// Load a key from its 32-byte scalar.
    pub fn from_bytes(bytes: &[u8; 32]) -> Result<Self, SigningError> {
        let signing_key =
            SigningKey::from_bytes(bytes.into()).map_err(|_| SigningError::InvalidPrivateKey)?;
        Ok(Self { signing_key })
    }

    /// Client identity whose credentials are this signer's public key.
    pub fn identity(&self, msp_id: &str, common_name: &str) -> ClientIdentity {
        ClientIdentity::new(msp_id, common_name, self.public_key())
    }
}

impl fmt::Debug for EcdsaSigner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EcdsaSigner")
            .field("public_key", &hex::encode(self.public_key()))
            .finish()
    }
}

impl Signer for EcdsaSigner {
    fn sign(&self, digest: &Digest32) -> Result<Vec<u8>, SigningError> {
        let signature: Signature = self
            .signing_key
            .sign_prehash(digest)
            .map_err(|e| SigningError::SigningFailed(e.to_string()))?;
        Ok(signature.to_bytes().to_vec())
    }

    fn public_key(&self) -> Vec<u8> {
        self.signing_key.verifying_key().to_sec1_bytes().to_vec()
    }
}

/// Check `signature` over `digest` against a SEC1-encoded public key.
pub fn verify_signature(
    public_key: &[u8],
    digest: &Digest32,
    signature: &[u8],
) -> Result<(), SigningError> {
    let verifying_key =
        VerifyingKey::from_sec1_bytes(public_key).map_err(|_| SigningError::InvalidPublicKey)?;
    let signature = Signature::from_slice(signature).map_err(|_| SigningError::InvalidSignature)?;
    verifying_key
        .verify_prehash(digest, &signature)
        .map_err(|_| SigningError::VerificationFailed)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sign_verify() {
        let signer = EcdsaSigner::generate();
        let digest = [7u8; 32];
        let sig = signer.sign(&digest).unwrap();
        assert!(verify_signature(&signer.public_key(), &digest, &sig).is_ok());
    }

    #[test]
    fn test_wrong_digest_fails() {
        let signer = EcdsaSigner::generate();
        let sig = signer.sign(&[1u8; 32]).unwrap();
        assert_eq!(
            verify_signature(&signer.public_key(), &[2u8; 32], &sig),
            Err(SigningError::VerificationFailed)
        );
    }

    #[test]
    fn test_wrong_key_fails() {
        let signer = EcdsaSigner::generate();
        let other = EcdsaSigner::generate();
        let sig = signer.sign(&[1u8; 32]).unwrap();
        assert!(verify_signature(&other.public_key(), &[1u8; 32], &sig).is_err());
    }

    #[test]
    fn test_deterministic_signatures() {
        let signer = EcdsaSigner::from_bytes(&[0x42; 32]).unwrap();
        let sig1 = signer.sign(&[9u8; 32]).unwrap();
        let sig2 = signer.sign(&[9u8; 32]).unwrap();
        assert_eq!(sig1, sig2);
    }

    #[test]
    fn test_zero_key_rejected() {
        assert_eq!(
            EcdsaSigner::from_bytes(&[0u8; 32]).unwrap_err(),
            SigningError::InvalidPrivateKey
        );
    }

    #[test]
    fn test_garbage_inputs() {
        assert_eq!(
            verify_signature(b"nope", &[0u8; 32], &[0u8; 64]),
            Err(SigningError::InvalidPublicKey)
        );
        let signer = EcdsaSigner::generate();
        assert_eq!(
            verify_signature(&signer.public_key(), &[0u8; 32], b"short"),
            Err(SigningError::InvalidSignature)
        );
    }

    #[test]
    fn test_identity_carries_public_key() {
        let signer = EcdsaSigner::generate();
        let identity = signer.identity("Org1MSP", "appUser");
        assert_eq!(identity.credentials, signer.public_key());
        assert_eq!(identity.id(), "x509::CN=appUser,OU=client::Org1MSP");
    }
}
