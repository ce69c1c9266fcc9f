//! RedFlagDeals forum search.
//!
//! Hot-deal thread titles carry the retailer as a leading `[Retailer]` tag and
//! usually the price inline, e.g. `[Best Buy] Lenovo laptop $449.99`.

use dealfinder_core::{SourceConfig, SourceSelectors};

pub const NAME: &str = "RedFlagDeals";

const BASE_URL: &str = "https://forums.redflagdeals.com";

#[must_use]
pub fn source_config() -> SourceConfig {
    SourceConfig {
        name: NAME.to_string(),
        retailer: NAME.to_string(),
        base_url: BASE_URL.to_string(),
        search_url: format!("{BASE_URL}/search.php?keywords={{query}}&sf=titleonly&sr=topics"),
        enabled: true,
        selectors: SourceSelectors {
            listing: "li.topic".to_string(),
            title: "h3.topictitle".to_string(),
            link: Some("a.topic_title_link".to_string()),
            price: None,
            retailer: Some(".topictitle_retailer".to_string()),
            stock: None,
        },
    }
}
