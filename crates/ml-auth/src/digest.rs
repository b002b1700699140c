//! Server id hash for the session join handshake.
//!
//! The session server expects the SHA-1 output read as a signed big-endian
//! integer and printed in lowercase hex, with a leading `-` for negative values
//! and no leading zeros.

use sha1::{Digest, Sha1};

pub const DIGEST_LEN: usize = 20;

/// SHA-1 of `server_id ‖ shared_secret ‖ public_key`, formatted as a signed hex number
pub fn compute_session_digest(server_id: &str, shared_secret: &[u8], public_key: &[u8]) -> String {
    let mut hasher = Sha1::new();
    hasher.update(server_id.as_bytes());
    hasher.update(shared_secret);
    hasher.update(public_key);

    let mut digest = [0u8; DIGEST_LEN];
    digest.copy_from_slice(&hasher.finalize());
    signed_hex(digest)
}

/// Format a 20-byte big-endian two's complement value as signed hex
pub fn signed_hex(mut digest: [u8; DIGEST_LEN]) -> String {
    let negative = is_negative(&digest);
    if negative {
        negate(&mut digest);
    }

    let hex = base16ct::lower::encode_string(&digest);
    let magnitude = match hex.trim_start_matches('0') {
        "" => "0",
        trimmed => trimmed,
    };

    if negative {
        format!("-{}", magnitude)
    } else {
        magnitude.to_string()
    }
}

pub fn is_negative(bytes: &[u8; DIGEST_LEN]) -> bool {
    bytes[0] & 0x80 != 0
}

/// Two's complement negation in place: flip every bit, then add one from the last byte up
pub fn negate(bytes: &mut [u8; DIGEST_LEN]) {
    let mut carry = true;
    for byte in bytes.iter_mut().rev() {
        let (sum, overflow) = (!*byte).overflowing_add(carry as u8);
        *byte = sum;
        carry = overflow;
    }
}
