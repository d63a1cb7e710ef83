//! Entropy Source
//!
//! OS-backed CSPRNG for wallet generation.
//!
//! SECURITY: a failing OS entropy source is fatal. There is no fallback
//! to a weaker generator.

use rand::rngs::OsRng;
use rand::RngCore;
use zeroize::Zeroizing;

use crate::error::{WalletError, WalletResult};
use crate::types::{Entropy, ENTROPY_LEN};

/// Source of cryptographically secure randomness for wallet generation.
///
/// The production implementation reads the OS CSPRNG; tests inject fixed
/// bytes through the same seam.
pub trait EntropySource: Send + Sync {
    /// Fill `buf` with random bytes, or fail fatally.
    fn fill(&self, buf: &mut [u8]) -> WalletResult<()>;

    /// Draw 128 bits for a 12-word phrase.
    fn entropy(&self) -> WalletResult<Entropy> {
        let mut bytes = Zeroizing::new([0u8; ENTROPY_LEN]);
        self.fill(bytes.as_mut())?;
        Ok(Entropy::from_bytes(*bytes))
    }
}

/// The OS CSPRNG.
#[derive(Debug, Clone, Copy, Default)]
pub struct OsEntropy;

impl EntropySource for OsEntropy {
    fn fill(&self, buf: &mut [u8]) -> WalletResult<()> {
        OsRng
            .try_fill_bytes(buf)
            .map_err(|e| WalletError::EntropySource(e.to_string()))
    }
}

/// Fixed-byte source for deterministic tests.
#[cfg(test)]
pub(crate) struct FixedEntropy(pub [u8; ENTROPY_LEN]);

#[cfg(test)]
impl EntropySource for FixedEntropy {
    fn fill(&self, buf: &mut [u8]) -> WalletResult<()> {
        for (dst, src) in buf.iter_mut().zip(self.0.iter().cycle()) {
            *dst = *src;
        }
        Ok(())
    }
}
