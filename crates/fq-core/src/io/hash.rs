//! Content hashing for journal replay

/// Compute BLAKE3 hash of file content
///
/// Journal entries record the hash of a source file before a transition
/// rewrites it, so recovery can tell whether the rewrite already happened.
pub fn compute_hash(content: &[u8]) -> String {
    let hash = blake3::hash(content);
    hash.to_hex().to_string()
}
