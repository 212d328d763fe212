use blake3::Hasher;

/// Prefix marking locally derived content identifiers.
pub const CONTENT_ID_PREFIX: &str = "b3-";

/// Content identifier for an artifact + report pair: `b3-` followed by the hex
/// BLAKE3 digest of both parts.
///
/// Each part is length-prefixed, so moving bytes between the image and the
/// report always changes the identifier.
pub fn content_id(primary: &[u8], report: &[u8]) -> String {
    let mut hasher = Hasher::new();
    hasher.update(&(primary.len() as u64).to_le_bytes());
    hasher.update(primary);
    hasher.update(&(report.len() as u64).to_le_bytes());
    hasher.update(report);
    format!("{CONTENT_ID_PREFIX}{}", hasher.finalize().to_hex())
}
