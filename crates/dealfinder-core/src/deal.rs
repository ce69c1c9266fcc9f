use serde::Serialize;
use thiserror::Error;

/// Stock value used when a source cannot report availability.
pub const STOCK_UNKNOWN: &str = "unknown";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DealError {
    #[error("deal title is empty")]
    EmptyTitle,

    #[error("deal price {0} is not a finite, non-negative number")]
    InvalidPrice(String),

    #[error("deal url \"{0}\" is not an absolute URL")]
    RelativeUrl(String),
}

/// One price listing, normalized across sources.
///
/// A `Deal` only exists when a non-empty title and a usable price were both
/// extracted; partial listings never reach this type. Fields are read-only
/// after construction.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Deal {
    retailer: String,
    price: f64,
    title: String,
    url: String,
    stock: String,
}

impl Deal {
    /// Builds a validated deal.
    ///
    /// `title` is trimmed; an empty `stock` becomes [`STOCK_UNKNOWN`].
    ///
    /// # Errors
    ///
    /// - [`DealError::EmptyTitle`] if `title` is blank.
    /// - [`DealError::InvalidPrice`] if `price` is negative, NaN, or infinite.
    /// - [`DealError::RelativeUrl`] if `url` does not parse as an absolute URL.
    pub fn new(
        retailer: impl Into<String>,
        price: f64,
        title: impl Into<String>,
        url: impl Into<String>,
        stock: impl Into<String>,
    ) -> Result<Self, DealError> {
        let title = title.into().trim().to_owned();
        if title.is_empty() {
            return Err(DealError::EmptyTitle);
        }

        if !price.is_finite() || price < 0.0 {
            return Err(DealError::InvalidPrice(price.to_string()));
        }

        let url = url.into();
        if url::Url::parse(&url).is_err() {
            return Err(DealError::RelativeUrl(url));
        }

        let stock = stock.into();
        let stock = if stock.trim().is_empty() {
            STOCK_UNKNOWN.to_owned()
        } else {
            stock.trim().to_owned()
        };

        Ok(Self {
            retailer: retailer.into(),
            price,
            title,
            url,
            stock,
        })
    }

    #[must_use]
    pub fn retailer(&self) -> &str {
        &self.retailer
    }

    #[must_use]
    pub fn price(&self) -> f64 {
        self.price
    }

    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    #[must_use]
    pub fn url(&self) -> &str {
        &self.url
    }

    #[must_use]
    pub fn stock(&self) -> &str {
        &self.stock
    }
}
