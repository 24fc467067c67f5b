//! Deterministic SKU assignment
//!
//! SKUs are derived, never random: the same brand, product group and
//! configHash always produce the same SKU, which is what makes generation
//! re-runs idempotent at the SKU level too.

/// Uppercase, strip non-alphanumerics, then truncate or right-pad with `X`
/// to exactly `width` characters.
pub fn token(input: &str, width: usize) -> String {
    let mut out: String = input
        .chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .map(|c| c.to_ascii_uppercase())
        .take(width)
        .collect();
    while out.len() < width {
        out.push('X');
    }
    out
}

/// `token(brand,3) + "-" + token(groupSlug,6) + "-" + upper(hash[0..8])`
pub fn build_sku(brand: Option<&str>, group_slug: &str, config_hash: &str) -> String {
    let hash_part: String = config_hash
        .chars()
        .take(8)
        .map(|c| c.to_ascii_uppercase())
        .collect();
    format!(
        "{}-{}-{}",
        token(brand.unwrap_or_default(), 3),
        token(group_slug, 6),
        hash_part
    )
}
