//! Key material for tests.
//!
//! Generating a 2048-bit RSA key is slow, so each test binary generates at
//! most two and shares them.

use std::sync::{Arc, OnceLock};

use rsa::pkcs8::{EncodePrivateKey, EncodePublicKey, LineEnding};
use rsa::{RsaPrivateKey, RsaPublicKey};

use bookease_config::JwtConfig;

use crate::jwt::TokenService;
use crate::keys::KeyPair;

/// PKCS#8 private key and SPKI public key, PEM encoded.
pub struct TestPem {
    pub private_pem: String,
    pub public_pem: String,
}

static PRIMARY: OnceLock<TestPem> = OnceLock::new();
static SECONDARY: OnceLock<TestPem> = OnceLock::new();

fn generate() -> TestPem {
    let private = RsaPrivateKey::new(&mut rand::thread_rng(), 2048).expect("generate RSA key");
    let public = RsaPublicKey::from(&private);

    TestPem {
        private_pem: private
            .to_pkcs8_pem(LineEnding::LF)
            .expect("encode private key")
            .to_string(),
        public_pem: public
            .to_public_key_pem(LineEnding::LF)
            .expect("encode public key"),
    }
}

pub fn test_pem() -> &'static TestPem {
    PRIMARY.get_or_init(generate)
}

/// A second, unrelated key. Tokens signed with it fail verification against
/// [`test_key_pair`].
pub fn other_pem() -> &'static TestPem {
    SECONDARY.get_or_init(generate)
}

pub fn test_key_pair() -> Arc<KeyPair> {
    let pem = test_pem();
    Arc::new(KeyPair::from_pem(&pem.private_pem, &pem.public_pem).expect("load test keys"))
}

pub fn other_key_pair() -> Arc<KeyPair> {
    let pem = other_pem();
    Arc::new(KeyPair::from_pem(&pem.private_pem, &pem.public_pem).expect("load test keys"))
}

pub fn test_token_service() -> TokenService {
    TokenService::new(test_key_pair(), &JwtConfig::default()).expect("default token lifetimes")
}

pub fn test_token_service_with(config: &JwtConfig) -> TokenService {
    TokenService::new(test_key_pair(), config).expect("token lifetimes in range")
}
