//! Decorative badges shown on listing pages

use reqwest::Url;
use sha2::{Digest, Sha256};

use super::model::{Product, User};

/// Badge value in 75..=99 derived from the last character of the listing id.
/// Not a real assessment; see the AI appraisal for that.
pub fn recyclability_score(product_id: &str) -> u8 {
    let last = product_id.chars().last().map_or(0, |c| c as u32);
    (last % 25 + 75) as u8
}

/// Short ledger-style fingerprint such as `0x3fa2...9c01`
pub fn asset_fingerprint(product_id: &str) -> String {
    if product_id.is_empty() {
        return "0x000...0000".to_string();
    }
    let digest = hex::encode(Sha256::digest(product_id.as_bytes()));
    format!("0x{}...{}", &digest[..4], &digest[digest.len() - 4..])
}

/// WhatsApp deep link to the seller, pre-filled with an enquiry about
/// `product`. Absent when the seller has no phone on their profile.
pub fn contact_link(product: &Product, seller: Option<&User>) -> Option<String> {
    let phone = seller
        .and_then(|s| s.phone.as_deref())
        .filter(|p| !p.trim().is_empty())?;
    let digits: String = phone.chars().filter(char::is_ascii_digit).collect();
    let message = format!(
        "Hi, I'm interested in your waste material listing '{}' on REVO.",
        product.name
    );
    Url::parse_with_params(&format!("https://wa.me/{}", digits), &[("text", message)])
        .ok()
        .map(String::from)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::market::model::fixtures::{product, user};

    #[test]
    fn score_stays_in_badge_range() {
        for id in ["a", "z", "0", "9", "ffff", "6f9619ff-8b86-d011-b42d-00cf4fc964ff"] {
            let score = recyclability_score(id);
            assert!((75..=99).contains(&score), "{id} -> {score}");
        }
        // 'a' is 97, 97 % 25 = 22
        assert_eq!(recyclability_score("a"), 97);
        assert_eq!(recyclability_score(""), 75);
    }

    #[test]
    fn fingerprint_is_stable_and_short() {
        let a = asset_fingerprint("listing-1");
        assert_eq!(a, asset_fingerprint("listing-1"));
        assert_ne!(a, asset_fingerprint("listing-2"));
        assert!(a.starts_with("0x"));
        assert_eq!(a.len(), "0x1234...abcd".len());
    }

    #[test]
    fn contact_link_dials_the_seller_phone() {
        let mut listing = product(1, 1, "PET Flakes", "Plastics", false);
        listing.whatsapp_number = Some("+918888888888".into());
        let seller = user(1, "Asha");

        let link = contact_link(&listing, Some(&seller)).unwrap();
        assert!(link.starts_with("https://wa.me/919876543210?text="));
        assert!(link.contains("PET+Flakes"));
    }

    #[test]
    fn no_link_when_seller_has_no_phone() {
        let mut listing = product(1, 1, "PET Flakes", "Plastics", false);
        listing.whatsapp_number = Some("+918888888888".into());
        let mut seller = user(1, "Asha");
        seller.phone = Some("  ".into());
        assert!(contact_link(&listing, Some(&seller)).is_none());
        seller.phone = None;
        assert!(contact_link(&listing, Some(&seller)).is_none());
        assert!(contact_link(&listing, None).is_none());
    }
}
