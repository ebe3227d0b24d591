//! Run fingerprinting: deterministic identification of a run's inputs.
//!
//! The fingerprint is a BLAKE3 hash over the validated configuration and the
//! loaded close series. Two runs with the same fingerprint produce the same
//! `rows_processed` and `signal_rate`. It is logged, never written to the
//! metrics document.

use meansig_core::domain::Bar;

use crate::config::SignalConfig;

/// Hex characters kept from the full digest.
const FINGERPRINT_LEN: usize = 16;

/// Hash the configuration and every close value, in row order.
pub fn run_fingerprint(config: &SignalConfig, bars: &[Bar]) -> String {
    let mut hasher = blake3::Hasher::new();

    hasher.update(&config.seed.to_le_bytes());
    hasher.update(&(config.window as u64).to_le_bytes());
    hasher.update(config.version.as_bytes());
    hasher.update(&(bars.len() as u64).to_le_bytes());
    for bar in bars {
        hasher.update(&bar.close.to_le_bytes());
    }

    let hex = hasher.finalize().to_hex();
    hex.as_str()[..FINGERPRINT_LEN].to_string()
}
