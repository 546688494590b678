//! Deterministic seeding for the search's randomized choices.

use rand::{rngs::StdRng, RngCore, SeedableRng};
use serde::{Deserialize, Serialize};
use sha3::{Digest, Sha3_256};

use crate::result::Error;

/// A 256-bit seed.
///
/// Every randomized decision in the engine (occurrence shuffles, successor
/// down-sampling, punctuation variants) draws from an RNG derived from one
/// seed plus a per-call context, so a run is reproducible from the seed
/// alone. The default constructor generates a random seed, matching the
/// behavior of an unseeded run.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Seed {
    inner: [u8; 32],
}

impl Seed {
    /// Generate a new random 256-bit seed.
    pub fn generate() -> Self {
        let mut seed = [0u8; 32];
        rand::rng().fill_bytes(&mut seed);
        Self { inner: seed }
    }

    /// Create from a hex string (with or without 0x prefix).
    pub fn from_hex(hex_str: &str) -> Result<Self, Error> {
        let hex_str = hex_str.strip_prefix("0x").unwrap_or(hex_str);
        if hex_str.len() != 64 {
            return Err(Error::InvalidSeedLength(hex_str.len()));
        }

        let bytes = hex::decode(hex_str).map_err(|_| Error::InvalidSeedHex)?;
        let mut seed = [0u8; 32];
        seed.copy_from_slice(&bytes);
        Ok(Self { inner: seed })
    }

    /// Convert to a hex string with 0x prefix.
    pub fn to_hex(&self) -> String {
        format!("0x{}", hex::encode(self.inner))
    }

    /// Derive a deterministic RNG for a specific context.
    ///
    /// The same seed and context always yield the same stream; distinct
    /// contexts (e.g. different search states) yield independent streams.
    pub fn derive_rng(&self, context: &[u8]) -> StdRng {
        let mut hasher = Sha3_256::new();
        hasher.update(b"VEIL_TEXT_OBFUSCATION");
        hasher.update(self.inner);
        hasher.update(context);
        let digest = hasher.finalize();

        let mut seed_bytes = [0u8; 8];
        seed_bytes.copy_from_slice(&digest[..8]);
        StdRng::seed_from_u64(u64::from_le_bytes(seed_bytes))
    }

    /// SHA3-256 hash of this seed for identification purposes.
    pub fn hash(&self) -> [u8; 32] {
        let mut hasher = Sha3_256::new();
        hasher.update(self.inner);
        hasher.finalize().into()
    }
}

impl std::fmt::Debug for Seed {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Seed").field("hex", &self.to_hex()).finish()
    }
}
