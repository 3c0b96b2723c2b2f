//! Content fingerprints over canonical renderings.
//!
//! Fingerprints are taken over the canonical form, not the on-disk bytes,
//! so two roots that differ only in formatting or crate-key order hash the
//! same. Listings are folded in sorted trait-path order to keep the digest
//! independent of scan order.

use sha2::{Digest, Sha256};
use traitdex_core::{render_listing, TraitListing};

/// SHA-256 hex digest of one listing's canonical form.
#[must_use]
pub fn fingerprint_listing(listing: &TraitListing) -> String {
    let mut hasher = Sha256::new();
    hasher.update(render_listing(listing).as_bytes());
    to_hex(&hasher.finalize())
}

/// SHA-256 hex digest of a whole listing set.
#[must_use]
pub fn fingerprint_listings(listings: &[TraitListing]) -> String {
    let mut ordered: Vec<&TraitListing> = listings.iter().collect();
    ordered.sort_by(|a, b| a.trait_path.cmp(&b.trait_path));

    let mut hasher = Sha256::new();
    for listing in ordered {
        hasher.update(listing.trait_path.as_str().as_bytes());
        hasher.update([0u8]);
        hasher.update(render_listing(listing).as_bytes());
        hasher.update([0u8]);
    }
    to_hex(&hasher.finalize())
}

fn to_hex(bytes: &[u8]) -> String {
    bytes.iter().fold(String::with_capacity(64), |mut out, b| {
        use std::fmt::Write;
        let _ = write!(out, "{b:02x}");
        out
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use traitdex_core::{Implementor, ImplementorMap, TypePath};

    fn listing(name: &str) -> TraitListing {
        let mut map = ImplementorMap::new();
        map.push(
            "acme_db",
            Implementor::new("impl X for Y", false, vec![TypePath::new("acme_db::Y")]),
        );
        TraitListing::new(TypePath::new(name), map)
    }

    #[test]
    fn fingerprint_is_stable() {
        let l = listing("acme::Group");
        assert_eq!(fingerprint_listing(&l), fingerprint_listing(&l));
        assert_eq!(fingerprint_listing(&l).len(), 64);
    }

    #[test]
    fn fingerprint_is_order_independent() {
        let a = listing("acme::Alpha");
        let b = listing("acme::Beta");
        assert_eq!(
            fingerprint_listings(&[a.clone(), b.clone()]),
            fingerprint_listings(&[b, a])
        );
    }

    #[test]
    fn fingerprint_distinguishes_content() {
        let a = listing("acme::Alpha");
        let mut b = a.clone();
        b.map.push(
            "other",
            Implementor::new("impl X for Z", false, vec![TypePath::new("other::Z")]),
        );
        assert_ne!(fingerprint_listing(&a), fingerprint_listing(&b));
    }
}
