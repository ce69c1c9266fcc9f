//! Listing-fragment parsing for HTML search result pages.
//!
//! A result page is a sequence of repeated "listing fragments" (one per search
//! hit). Each fragment is turned into a [`Deal`] only when both a title and a
//! price can be extracted from it; incomplete fragments are skipped one by one
//! and never fail the page.

use std::sync::LazyLock;

use dealfinder_core::{Deal, SourceSelectors};
use scraper::{ElementRef, Html, Selector};

use crate::error::ScraperError;
use crate::extract::{clean_text, extract_price, extract_retailer_tag, normalize_stock};
use crate::origin::resolve_url;

static ANCHOR_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("a[href]").expect("valid anchor selector"));

/// Compiled CSS selectors for one source.
#[derive(Debug, Clone)]
pub struct ListingSelectors {
    listing: Selector,
    title: Selector,
    link: Option<Selector>,
    price: Option<Selector>,
    retailer: Option<Selector>,
    stock: Option<Selector>,
}

impl ListingSelectors {
    /// Compiles the selector strings of a source configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ScraperError::InvalidSelector`] for the first selector that
    /// does not parse.
    pub fn compile(selectors: &SourceSelectors) -> Result<Self, ScraperError> {
        let optional = |raw: Option<&String>| -> Result<Option<Selector>, ScraperError> {
            raw.map(|s| s.trim())
                .filter(|s| !s.is_empty())
                .map(compile_selector)
                .transpose()
        };

        Ok(Self {
            listing: compile_selector(&selectors.listing)?,
            title: compile_selector(&selectors.title)?,
            link: optional(selectors.link.as_ref())?,
            price: optional(selectors.price.as_ref())?,
            retailer: optional(selectors.retailer.as_ref())?,
            stock: optional(selectors.stock.as_ref())?,
        })
    }
}

fn compile_selector(raw: &str) -> Result<Selector, ScraperError> {
    Selector::parse(raw).map_err(|e| ScraperError::InvalidSelector {
        selector: raw.to_owned(),
        reason: e.to_string(),
    })
}

/// Source identity needed while turning fragments into deals.
#[derive(Debug, Clone, Copy)]
pub struct ListingContext<'a> {
    pub source_name: &'a str,
    /// Retailer used when neither a selector nor a `[Retailer]` tag names one.
    pub default_retailer: &'a str,
    /// Absolute base URL that relative listing links are resolved against,
    /// and the deal URL for listings that carry no usable link.
    pub base_url: &'a str,
}

/// Why a single fragment did not become a deal.
#[derive(Debug, Clone, PartialEq, Eq)]
enum SkipReason {
    MissingTitle,
    MissingPrice,
    Rejected(String),
}

/// Parses every listing fragment on a result page.
///
/// A page with no fragments is a valid empty result. A page whose fragments
/// all lack a title means the markup drifted away from the selectors.
///
/// # Errors
///
/// Returns [`ScraperError::ParseMismatch`] when fragments were found but none
/// of them contains a title.
pub fn parse_listings(
    html: &str,
    selectors: &ListingSelectors,
    ctx: &ListingContext<'_>,
) -> Result<Vec<Deal>, ScraperError> {
    let document = Html::parse_document(html);
    let fragments: Vec<ElementRef<'_>> = document.select(&selectors.listing).collect();

    if fragments.is_empty() {
        tracing::debug!(source = ctx.source_name, "no listing fragments on page");
        return Ok(Vec::new());
    }

    let mut deals = Vec::with_capacity(fragments.len());
    let mut untitled = 0usize;

    for (index, fragment) in fragments.iter().enumerate() {
        match parse_fragment(*fragment, selectors, ctx) {
            Ok(deal) => deals.push(deal),
            Err(reason) => {
                if reason == SkipReason::MissingTitle {
                    untitled += 1;
                }
                tracing::trace!(
                    source = ctx.source_name,
                    index,
                    reason = ?reason,
                    "skipping incomplete listing fragment"
                );
            }
        }
    }

    if untitled == fragments.len() {
        return Err(ScraperError::ParseMismatch {
            source_name: ctx.source_name.to_owned(),
            reason: format!(
                "{} listing fragments matched but none contained a title",
                fragments.len()
            ),
        });
    }

    tracing::debug!(
        source = ctx.source_name,
        fragments = fragments.len(),
        deals = deals.len(),
        "parsed listing fragments"
    );

    Ok(deals)
}

fn parse_fragment(
    fragment: ElementRef<'_>,
    selectors: &ListingSelectors,
    ctx: &ListingContext<'_>,
) -> Result<Deal, SkipReason> {
    let title_el = fragment
        .select(&selectors.title)
        .next()
        .ok_or(SkipReason::MissingTitle)?;
    let title = element_text(title_el);
    if title.is_empty() {
        return Err(SkipReason::MissingTitle);
    }

    let price = selectors
        .price
        .as_ref()
        .and_then(|sel| first_text(fragment, sel))
        .and_then(|text| extract_price(&text))
        .or_else(|| extract_price(&title))
        .ok_or(SkipReason::MissingPrice)?;

    let href = match &selectors.link {
        Some(sel) => fragment
            .select(sel)
            .find_map(|el| el.value().attr("href").map(str::to_owned)),
        None => title_href(title_el),
    };
    // Unlinked listings point at the source itself.
    let url = href
        .and_then(|h| resolve_url(&h, ctx.base_url))
        .unwrap_or_else(|| ctx.base_url.to_owned());

    let retailer = selectors
        .retailer
        .as_ref()
        .and_then(|sel| first_text(fragment, sel))
        .map(|text| extract_retailer_tag(&text).unwrap_or(text))
        .or_else(|| extract_retailer_tag(&title))
        .unwrap_or_else(|| ctx.default_retailer.to_owned());

    let stock = normalize_stock(
        selectors
            .stock
            .as_ref()
            .and_then(|sel| first_text(fragment, sel))
            .as_deref(),
    );

    Deal::new(retailer, price, title, url, stock).map_err(|e| SkipReason::Rejected(e.to_string()))
}

/// The title element's own `href`, or the first link nested inside it.
fn title_href(title_el: ElementRef<'_>) -> Option<String> {
    title_el
        .value()
        .attr("href")
        .or_else(|| {
            title_el
                .select(&ANCHOR_SELECTOR)
                .next()
                .and_then(|a| a.value().attr("href"))
        })
        .map(str::to_owned)
}

fn first_text(fragment: ElementRef<'_>, selector: &Selector) -> Option<String> {
    fragment
        .select(selector)
        .next()
        .map(element_text)
        .filter(|s| !s.is_empty())
}

fn element_text(el: ElementRef<'_>) -> String {
    clean_text(&el.text().collect::<String>())
}

#[cfg(test)]
#[path = "listing_test.rs"]
mod tests;
