//! RSA key provider.
//!
//! The key pair is read once at startup from two PEM files and shared behind
//! an `Arc` by the issuer and the verifier. A failure here is fatal: the
//! server must not start without verifiable signing keys.

use std::fmt;
use std::fs;

use base64::{Engine, engine::general_purpose::STANDARD};
use jsonwebtoken::{DecodingKey, EncodingKey};
use rsa::pkcs1::{DecodeRsaPrivateKey, DecodeRsaPublicKey, EncodeRsaPrivateKey, EncodeRsaPublicKey};
use rsa::pkcs8::{DecodePrivateKey, DecodePublicKey};
use rsa::{RsaPrivateKey, RsaPublicKey};
use tracing::info;

use bookease_config::JwtConfig;
use bookease_core::DomainError;

pub struct KeyPair {
    encoding: EncodingKey,
    decoding: DecodingKey,
}

impl KeyPair {
    /// Reads the private and public key files named in `config`.
    pub fn load(config: &JwtConfig) -> Result<Self, DomainError> {
        let private_pem = read_key_file(&config.private_key_path)?;
        let public_pem = read_key_file(&config.public_key_path)?;

        let encoding = encoding_key(&private_pem)
            .map_err(|e| DomainError::KeyLoading(format!("{}: {e}", config.private_key_path)))?;
        let decoding = decoding_key(&public_pem)
            .map_err(|e| DomainError::KeyLoading(format!("{}: {e}", config.public_key_path)))?;

        info!(
            private_key = %config.private_key_path,
            public_key = %config.public_key_path,
            "RS256 signing keys loaded"
        );

        Ok(Self { encoding, decoding })
    }

    /// Builds a key pair from PEM text already in memory.
    pub fn from_pem(private_pem: &str, public_pem: &str) -> Result<Self, DomainError> {
        let encoding = encoding_key(private_pem)
            .map_err(|e| DomainError::KeyLoading(format!("private key: {e}")))?;
        let decoding = decoding_key(public_pem)
            .map_err(|e| DomainError::KeyLoading(format!("public key: {e}")))?;

        Ok(Self { encoding, decoding })
    }

    pub(crate) fn encoding_key(&self) -> &EncodingKey {
        &self.encoding
    }

    pub(crate) fn decoding_key(&self) -> &DecodingKey {
        &self.decoding
    }
}

impl fmt::Debug for KeyPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeyPair").finish_non_exhaustive()
    }
}

fn read_key_file(path: &str) -> Result<String, DomainError> {
    fs::read_to_string(path).map_err(|e| DomainError::KeyLoading(format!("{path}: {e}")))
}

const ARMOR_DASHES: &str = "-----";

/// Removes every `-----BEGIN ...-----` and `-----END ...-----` marker, wherever
/// it sits. An unterminated marker is kept so decoding reports it.
fn strip_armor(pem: &str) -> String {
    let mut body = String::with_capacity(pem.len());
    let mut rest = pem;

    while let Some(start) = rest.find(ARMOR_DASHES) {
        body.push_str(&rest[..start]);
        let label = &rest[start + ARMOR_DASHES.len()..];
        match label.find(ARMOR_DASHES) {
            Some(end) => rest = &label[end + ARMOR_DASHES.len()..],
            None => {
                body.push_str(&rest[start..]);
                rest = "";
            }
        }
    }
    body.push_str(rest);
    body
}

/// Drops the armor and all whitespace, then base64-decodes what is left.
fn pem_to_der(pem: &str) -> Result<Vec<u8>, String> {
    let body: String = strip_armor(pem)
        .chars()
        .filter(|c| !c.is_whitespace())
        .collect();

    if body.is_empty() {
        return Err("no key material found".to_string());
    }

    STANDARD
        .decode(body)
        .map_err(|e| format!("invalid base64: {e}"))
}

/// PKCS#8 first, then PKCS#1.
fn encoding_key(pem: &str) -> Result<EncodingKey, String> {
    let der = pem_to_der(pem)?;
    let key = RsaPrivateKey::from_pkcs8_der(&der)
        .or_else(|_| RsaPrivateKey::from_pkcs1_der(&der))
        .map_err(|e| format!("not an RSA private key: {e}"))?;
    let pkcs1 = key
        .to_pkcs1_der()
        .map_err(|e| format!("cannot encode private key: {e}"))?;

    Ok(EncodingKey::from_rsa_der(pkcs1.as_bytes()))
}

/// X.509 SubjectPublicKeyInfo first, then PKCS#1.
fn decoding_key(pem: &str) -> Result<DecodingKey, String> {
    let der = pem_to_der(pem)?;
    let key = RsaPublicKey::from_public_key_der(&der)
        .or_else(|_| RsaPublicKey::from_pkcs1_der(&der))
        .map_err(|e| format!("not an RSA public key: {e}"))?;
    let pkcs1 = key
        .to_pkcs1_der()
        .map_err(|e| format!("cannot encode public key: {e}"))?;

    Ok(DecodingKey::from_rsa_der(pkcs1.as_bytes()))
}
