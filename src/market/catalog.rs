//! Listing queries run over an in-memory snapshot of the catalog

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::model::{Product, PublicSeller, User};

pub const FEATURED_LIMIT: usize = 4;
pub const SIMILAR_LIMIT: usize = 4;
pub const TOP_SELLERS_LIMIT: usize = 10;

/// Browse filters from the listings page
#[derive(Debug, Clone, Default, Deserialize)]
pub struct BrowseQuery {
    pub category: Option<String>,
    #[serde(alias = "search")]
    pub q: Option<String>,
    pub seller_id: Option<Uuid>,
}

/// Filter listings by exact category (`all` disables it) and a
/// case-insensitive search over name and description
pub fn browse<'a>(products: &'a [Product], query: &BrowseQuery) -> Vec<&'a Product> {
    let category = query
        .category
        .as_deref()
        .map(str::trim)
        .filter(|c| !c.is_empty() && !c.eq_ignore_ascii_case("all"));
    let needle = query
        .q
        .as_deref()
        .map(|q| q.trim().to_lowercase())
        .filter(|q| !q.is_empty());

    products
        .iter()
        .filter(|p| query.seller_id.map_or(true, |id| p.seller_id == id))
        .filter(|p| category.map_or(true, |c| p.category == c))
        .filter(|p| {
            needle.as_deref().map_or(true, |n| {
                p.name.to_lowercase().contains(n) || p.description.to_lowercase().contains(n)
            })
        })
        .collect()
}

/// First unsold listings in the given (newest-first) order
pub fn featured(products: &[Product]) -> Vec<&Product> {
    products.iter().filter(|p| !p.is_sold).take(FEATURED_LIMIT).collect()
}

/// Unsold listings in the same sector, excluding `current`
pub fn similar<'a>(products: &'a [Product], current: &Product) -> Vec<&'a Product> {
    products
        .iter()
        .filter(|p| p.category == current.category && p.id != current.id && !p.is_sold)
        .take(SIMILAR_LIMIT)
        .collect()
}

/// What a public seller page lists: the seller's streams still for sale
pub fn seller_listings(products: Vec<Product>) -> Vec<Product> {
    products.into_iter().filter(|p| !p.is_sold).collect()
}

/// A leaderboard entry
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SellerRanking {
    pub rank: usize,
    pub seller: PublicSeller,
    pub product_count: usize,
}

/// Producers ordered by how many streams they listed, sold ones included
pub fn top_sellers(users: &[User], products: &[Product]) -> Vec<SellerRanking> {
    let mut counts: HashMap<Uuid, usize> = HashMap::new();
    for product in products {
        *counts.entry(product.seller_id).or_default() += 1;
    }

    let mut ranked: Vec<(&User, usize)> = users
        .iter()
        .filter_map(|u| counts.get(&u.id).map(|c| (u, *c)))
        .collect();
    // stable sort keeps profile order for ties
    ranked.sort_by(|a, b| b.1.cmp(&a.1));

    ranked
        .into_iter()
        .take(TOP_SELLERS_LIMIT)
        .enumerate()
        .map(|(i, (user, count))| SellerRanking {
            rank: i + 1,
            seller: user.public_view(),
            product_count: count,
        })
        .collect()
}

/// Seller dashboard counters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardStats {
    pub total_listings: usize,
    pub active_listings: usize,
    pub sold_listings: usize,
    pub profile_complete: bool,
}

pub fn dashboard_stats(user: &User, own_products: &[Product]) -> DashboardStats {
    let active = own_products.iter().filter(|p| !p.is_sold).count();
    DashboardStats {
        total_listings: own_products.len(),
        active_listings: active,
        sold_listings: own_products.len() - active,
        profile_complete: user.profile_complete(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::market::model::fixtures::{product, user};

    fn catalog() -> Vec<Product> {
        vec![
            product(6, 1, "PET Flakes", "Plastics", false),
            product(5, 2, "Copper Wire Scrap", "Metals & Scrap", false),
            product(4, 1, "HDPE Drums", "Plastics", true),
            product(3, 3, "LDPE Film Bales", "Plastics", false),
            product(2, 2, "Fly Ash", "Fly Ash & Slag", false),
            product(1, 1, "PP Granules", "Plastics", false),
        ]
    }

    #[test]
    fn browse_matches_category_and_search() {
        let products = catalog();
        let query = BrowseQuery {
            category: Some("Plastics".into()),
            q: Some("  bales ".into()),
            seller_id: None,
        };
        let found = browse(&products, &query);
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].name, "LDPE Film Bales");

        let all = BrowseQuery {
            category: Some("all".into()),
            q: Some("jumbo".into()),
            seller_id: None,
        };
        // every fixture description mentions jumbo bags
        assert_eq!(browse(&products, &all).len(), products.len());
    }

    #[test]
    fn featured_skips_sold_and_caps() {
        let products = catalog();
        let names: Vec<_> = featured(&products).iter().map(|p| p.name.as_str()).collect();
        assert_eq!(
            names,
            vec!["PET Flakes", "Copper Wire Scrap", "LDPE Film Bales", "Fly Ash"]
        );
    }

    #[test]
    fn similar_excludes_current_and_sold() {
        let products = catalog();
        let found = similar(&products, &products[0]);
        let names: Vec<_> = found.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["LDPE Film Bales", "PP Granules"]);
    }

    #[test]
    fn seller_listings_hide_sold_streams() {
        let own: Vec<Product> = catalog()
            .into_iter()
            .filter(|p| p.seller_id == Uuid::from_u128(1))
            .collect();
        let names: Vec<_> = seller_listings(own).into_iter().map(|p| p.name).collect();
        assert_eq!(names, vec!["PET Flakes", "PP Granules"]);
    }

    #[test]
    fn top_sellers_counts_sold_listings_and_skips_idle_users() {
        let users = vec![user(1, "Asha"), user(2, "Ravi"), user(3, "Meera"), user(4, "Idle")];
        let ranking = top_sellers(&users, &catalog());

        assert_eq!(ranking.len(), 3);
        assert_eq!(ranking[0].seller.name, "Asha");
        assert_eq!(ranking[0].product_count, 3);
        assert_eq!(ranking[0].rank, 1);
        assert_eq!(ranking[2].seller.name, "Meera");
    }

    #[test]
    fn dashboard_counts_active_and_sold() {
        let products = catalog();
        let own: Vec<Product> = products.into_iter().filter(|p| p.seller_id == Uuid::from_u128(1)).collect();
        let stats = dashboard_stats(&user(1, "Asha"), &own);

        assert_eq!(stats.total_listings, 3);
        assert_eq!(stats.active_listings, 2);
        assert_eq!(stats.sold_listings, 1);
        assert!(!stats.profile_complete);
    }
}
