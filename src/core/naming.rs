//! Public IDs for uploaded assets.
//!
//! The first usable hint wins: Image Alt Text, then Product Name, then SKU.
//! A hint is usable when it is still non-empty after sanitizing. The result
//! only depends on the hints, so re-runs overwrite instead of duplicating.

use sha1::{Digest, Sha1};

const MAX_PUBLIC_ID_LEN: usize = 120;
const SKU_DIGEST_LEN: usize = 12;

/// Naming hints taken from one row, already trimmed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NamingHints<'a> {
    pub alt_text: &'a str,
    pub product_name: &'a str,
    pub sku: &'a str,
}

/// Lowercases, turns every run of characters outside `[a-z0-9]` into a single
/// dash, trims dashes at both ends, and truncates at the last dash before
/// `MAX_PUBLIC_ID_LEN`.
pub fn sanitize_public_id(text: &str) -> String {
    let mut id = String::with_capacity(text.len());
    let mut pending_dash = false;

    for c in text.chars().flat_map(char::to_lowercase) {
        if c.is_ascii_alphanumeric() {
            if pending_dash && !id.is_empty() {
                id.push('-');
            }
            id.push(c);
            pending_dash = false;
        } else {
            pending_dash = true;
        }
    }

    if id.len() <= MAX_PUBLIC_ID_LEN {
        return id;
    }

    let truncated = &id[..MAX_PUBLIC_ID_LEN];
    match truncated.rfind('-') {
        Some(pos) => truncated[..pos].to_string(),
        None => truncated.to_string(),
    }
}

pub fn public_id(hints: &NamingHints<'_>, use_alt_text: bool) -> String {
    let alt = if use_alt_text {
        sanitize_public_id(hints.alt_text)
    } else {
        String::new()
    };
    if !alt.is_empty() {
        return alt;
    }

    let name = sanitize_public_id(hints.product_name);
    if !name.is_empty() {
        return name;
    }

    let sku = sanitize_public_id(hints.sku);
    if !sku.is_empty() {
        return sku;
    }

    // Symbol-only SKUs such as "#" get a digest of the raw value instead.
    let digest = hex::encode(Sha1::digest(hints.sku.as_bytes()));
    format!("sku-{}", &digest[..SKU_DIGEST_LEN])
}
