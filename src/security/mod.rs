//! Security Module
//!
//! Memory hygiene for secret material:
//! - Zeroization on drop
//! - Volatile buffer scrubbing
//! - Constant-time comparison

pub mod secure_memory;

pub use secure_memory::*;
