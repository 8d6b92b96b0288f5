//! Cache keys and generator seeds derived from image payloads.
//!
//! Both have to be cheap for multi-megabyte data URLs, so neither one looks
//! at the whole payload.

/// How many bytes we take from each end of the payload for the cache key.
const KEY_EDGE_LEN: usize = 10;

/// How many evenly spaced bytes we sample for the cache key.
const KEY_SAMPLE_COUNT: usize = 10;

/// Only this many leading bytes contribute to the seed.
const SEED_PREFIX_LEN: usize = 1000;

/// Only every Nth byte of the prefix contributes to the seed.
const SEED_STRIDE: usize = 3;

/// Compute a short cache key for `payload`.
///
/// The key holds the payload length, its first and last ten bytes, and ten
/// bytes sampled at evenly spaced positions. Bytes are mapped straight to
/// `char`s, so the key is valid text even if a sample lands inside a
/// multi-byte character.
pub fn cache_key(payload: &str) -> String {
    let bytes = payload.as_bytes();
    let len = bytes.len();
    let step = (len / KEY_SAMPLE_COUNT).max(1);

    let head = &bytes[..len.min(KEY_EDGE_LEN)];
    let tail = &bytes[len.saturating_sub(KEY_EDGE_LEN)..];
    let samples = (0..KEY_SAMPLE_COUNT)
        .map(|i| i * step)
        .take_while(|&pos| pos < len)
        .map(|pos| bytes[pos]);

    let mut key = format!("{len}:");
    key.extend(head.iter().copied().map(char::from));
    key.push('|');
    key.extend(samples.map(char::from));
    key.push('|');
    key.extend(tail.iter().copied().map(char::from));
    key
}

/// Compute a generator seed for `payload`.
///
/// This is the classic `hash * 31 + byte` string hash over every third byte
/// of the first 1000, wrapped to 32 bits. We return the magnitude, which
/// always fits in a `u32`.
pub fn seed_for(payload: &str) -> u32 {
    let bytes = payload.as_bytes();
    let hash = bytes[..bytes.len().min(SEED_PREFIX_LEN)]
        .iter()
        .step_by(SEED_STRIDE)
        .fold(0i32, |hash, &byte| {
            hash.wrapping_mul(31).wrapping_add(i32::from(byte))
        });
    hash.unsigned_abs()
}
