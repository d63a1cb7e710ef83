//! Secure Memory Utilities
//!
//! Memory safety for sensitive data:
//! - Zeroization on drop
//! - Secure comparison
//! - Protected buffers

use std::fmt;
use std::ops::{Deref, DerefMut};

use subtle::ConstantTimeEq;

/// A buffer that automatically zeroizes its contents when dropped
pub struct SecureBuffer {
    data: Vec<u8>,
}

impl SecureBuffer {
    /// Create a new secure buffer with the given size
    pub fn new(size: usize) -> Self {
        Self {
            data: vec![0u8; size],
        }
    }

    /// Create a secure buffer from existing data
    pub fn from_bytes(bytes: &[u8]) -> Self {
        let mut buffer = Self::new(bytes.len());
        buffer.data.copy_from_slice(bytes);
        buffer
    }

    /// Create a secure buffer from a Vec, consuming it
    pub fn from_vec(data: Vec<u8>) -> Self {
        Self { data }
    }

    /// Get the buffer length
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Check if buffer is empty
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Expose as byte slice
    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    /// Expose as mutable byte slice
    pub fn as_bytes_mut(&mut self) -> &mut [u8] {
        &mut self.data
    }

    /// Zeroize the buffer contents
    pub fn zeroize(&mut self) {
        zeroize_slice(&mut self.data);
    }
}

impl Deref for SecureBuffer {
    type Target = [u8];

    fn deref(&self) -> &Self::Target {
        &self.data
    }
}

impl DerefMut for SecureBuffer {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.data
    }
}

impl Drop for SecureBuffer {
    fn drop(&mut self) {
        self.zeroize();
    }
}

impl Clone for SecureBuffer {
    fn clone(&self) -> Self {
        Self::from_bytes(&self.data)
    }
}

impl fmt::Debug for SecureBuffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SecureBuffer")
            .field("len", &self.data.len())
            .finish()
    }
}

/// Zeroize a byte slice
#[inline]
pub fn zeroize_slice(slice: &mut [u8]) {
    // Use volatile write to prevent compiler optimization
    for byte in slice.iter_mut() {
        unsafe {
            std::ptr::write_volatile(byte, 0);
        }
    }
    // Memory fence to ensure writes complete
    std::sync::atomic::fence(std::sync::atomic::Ordering::SeqCst);
}

/// Secure comparison (constant-time)
/// Returns true if slices are equal
pub fn secure_compare(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.ct_eq(b).into()
}

/// Secure comparison for strings
pub fn secure_compare_str(a: &str, b: &str) -> bool {
    secure_compare(a.as_bytes(), b.as_bytes())
}

/// Validate that data appears to be properly zeroized
pub fn is_zeroized(data: &[u8]) -> bool {
    data.iter().all(|&b| b == 0)
}
