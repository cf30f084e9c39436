//! Merchant normalization.
//!
//! Maps the raw merchant descriptor and MCC carried by a card transaction to a
//! human readable brand, category, group and icon. Brand rules are checked
//! first and take priority over the MCC; the MCC table is only the fallback.

use serde::Serialize;

/// A known brand. `patterns` are alternatives matched as case-insensitive
/// substrings, where `.` matches any single character.
#[derive(Debug)]
pub struct BrandRule {
    pub patterns: &'static [&'static str],
    pub name: &'static str,
    pub category: &'static str,
    pub icon: &'static str,
    pub parent: &'static str,
}

#[derive(Debug)]
pub struct CategoryInfo {
    pub mcc: &'static str,
    pub label: &'static str,
    pub group: &'static str,
}

/// Brand rules in priority order. The first match wins, so order matters.
pub static BRAND_RULES: &[BrandRule] = &[
    BrandRule { patterns: &["AMZN", "AMAZON"], name: "Amazon", category: "Retail", icon: "shopping_cart", parent: "" },
    BrandRule { patterns: &["MSFT", "MICROSOFT", "AZURE", "365"], name: "Microsoft", category: "Tech & Software", icon: "computer", parent: "Microsoft Corp" },
    BrandRule { patterns: &["GOOGLE", "GSUITE", "YOUTUBE"], name: "Google", category: "Tech & Software", icon: "search", parent: "Alphabet Inc" },
    BrandRule { patterns: &["APPLE.COM", "ITUNES"], name: "Apple", category: "Tech & Electronics", icon: "apple", parent: "Apple Inc" },
    BrandRule { patterns: &["WMT", "WAL-MART", "WALMART"], name: "Walmart", category: "Essentials", icon: "store", parent: "" },
    BrandRule { patterns: &["COSTCO"], name: "Costco", category: "Essentials", icon: "shopping_bag", parent: "" },
    BrandRule { patterns: &["NFLX", "NETFLIX"], name: "Netflix", category: "Entertainment", icon: "movie", parent: "" },
    BrandRule { patterns: &["SPOTIFY"], name: "Spotify", category: "Entertainment", icon: "music_note", parent: "" },
    BrandRule { patterns: &["UBER"], name: "Uber", category: "Transport", icon: "directions_car", parent: "" },
    BrandRule { patterns: &["LYFT"], name: "Lyft", category: "Transport", icon: "local_taxi", parent: "" },
    BrandRule { patterns: &["SBUX", "STARBUCKS"], name: "Starbucks", category: "Dining", icon: "local_cafe", parent: "" },
    BrandRule { patterns: &["MCDONALDS"], name: "McDonalds", category: "Dining", icon: "fastfood", parent: "" },
];

/// ISO-18245 merchant category codes the engine knows about.
pub static CATEGORIES: &[CategoryInfo] = &[
    CategoryInfo { mcc: "5411", label: "Groceries", group: "Essentials" },
    CategoryInfo { mcc: "5812", label: "Dining", group: "Dining & Entertainment" },
    CategoryInfo { mcc: "5814", label: "Fast Food", group: "Dining & Entertainment" },
    CategoryInfo { mcc: "4121", label: "Taxis/Rideshare", group: "Transport" },
    CategoryInfo { mcc: "4814", label: "Telecommunications", group: "Tech & Utilities" },
    CategoryInfo { mcc: "5311", label: "Department Stores", group: "Retail" },
    CategoryInfo { mcc: "5732", label: "Electronics", group: "Tech & Software" },
    CategoryInfo { mcc: "5968", label: "Subscriptions", group: "Entertainment & Software" },
    CategoryInfo { mcc: "7372", label: "Cloud Services", group: "Tech & Software" },
    CategoryInfo { mcc: "4511", label: "Airlines", group: "Travel" },
    CategoryInfo { mcc: "7011", label: "Hotels/Lodging", group: "Travel" },
];

const UNKNOWN_MERCHANT: &str = "Unknown Merchant";
const UNCATEGORIZED: &str = "Uncategorized";
const DEFAULT_GROUP: &str = "Others";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EnrichmentResult {
    pub name: String,
    pub category: String,
    pub group: String,
    pub icon: String,
    pub parent_brand: String,
}

impl BrandRule {
    fn matches(&self, descriptor: &[char]) -> bool {
        self.patterns
            .iter()
            .any(|pattern| contains_pattern(descriptor, pattern))
    }
}

fn contains_pattern(haystack: &[char], pattern: &str) -> bool {
    let pattern: Vec<char> = pattern.chars().collect();
    if pattern.is_empty() || pattern.len() > haystack.len() {
        return false;
    }
    haystack.windows(pattern.len()).any(|window| {
        window
            .iter()
            .zip(&pattern)
            .all(|(h, p)| *p == '.' || h == p)
    })
}

pub fn category_for_mcc(mcc: &str) -> Option<&'static CategoryInfo> {
    CATEGORIES.iter().find(|info| info.mcc == mcc)
}

fn category_for_label(label: &str) -> Option<&'static CategoryInfo> {
    CATEGORIES.iter().find(|info| info.label == label)
}

/// Resolves a raw merchant descriptor and MCC. Never fails.
pub fn enrich_merchant(raw_name: &str, mcc: &str) -> EnrichmentResult {
    let mut result = EnrichmentResult {
        name: if raw_name.is_empty() {
            UNKNOWN_MERCHANT.to_string()
        } else {
            raw_name.to_string()
        },
        category: UNCATEGORIZED.to_string(),
        group: DEFAULT_GROUP.to_string(),
        icon: "help_outline".to_string(),
        parent_brand: String::new(),
    };

    let descriptor: Vec<char> = raw_name.to_uppercase().chars().collect();
    let brand = BRAND_RULES.iter().find(|rule| rule.matches(&descriptor));

    match brand {
        Some(rule) => {
            result.name = rule.name.to_string();
            result.category = rule.category.to_string();
            result.icon = rule.icon.to_string();
            result.parent_brand = rule.parent.to_string();
            // Brand categories only borrow a group when the MCC table shares the label.
            result.group = category_for_label(rule.category)
                .map_or("General", |info| info.group)
                .to_string();
        }
        None => match category_for_mcc(mcc) {
            Some(info) => {
                result.category = info.label.to_string();
                result.group = info.group.to_string();
            }
            None => {
                result.category = "Other".to_string();
                result.group = DEFAULT_GROUP.to_string();
            }
        },
    }

    result
}
