use super::*;

fn assert_price(text: &str, expected: f64) {
    let got = extract_price(text).unwrap_or_else(|| panic!("expected a price in {text:?}"));
    assert!(
        (got - expected).abs() < 1e-9,
        "expected {expected} from {text:?}, got {got}"
    );
}

#[test]
fn price_embedded_in_title() {
    assert_price("Widget Pro - $49.99 today", 49.99);
}

#[test]
fn price_without_currency_symbol() {
    assert_price("Laptop deal 450.50 shipped", 450.50);
}

#[test]
fn price_with_thousands_separator() {
    assert_price("[Best Buy] TV $1,049.99", 1049.99);
    assert_price("Camera 12,345.67", 12345.67);
}

#[test]
fn price_without_separator_above_thousand() {
    assert_price("[Best Buy] laptop Deal $1049.99", 1049.99);
}

#[test]
fn first_match_wins() {
    assert_price("Was $599.99, now $449.99", 599.99);
}

#[test]
fn price_at_end_of_text() {
    assert_price("Great laptop $500.00", 500.00);
}

#[test]
fn price_with_space_after_symbol() {
    assert_price("Headphones £ 79.00 at Currys", 79.00);
}

#[test]
fn price_followed_by_letter() {
    assert_price("Deal: $9.99ea", 9.99);
}

#[test]
fn whole_numbers_are_not_prices() {
    assert_eq!(extract_price("only 50 left in stock"), None);
    assert_eq!(extract_price("$100 off"), None);
}

#[test]
fn three_decimal_digits_are_not_prices() {
    assert_eq!(extract_price("ratio 1.234"), None);
}

#[test]
fn single_decimal_digit_is_not_a_price() {
    assert_eq!(extract_price("version 2.5 firmware"), None);
}

#[test]
fn empty_text_has_no_price() {
    assert_eq!(extract_price(""), None);
}

#[test]
fn retailer_tag_from_bracket_prefix() {
    assert_eq!(
        extract_retailer_tag("[Amazon.ca] laptop - On sale now!"),
        Some("Amazon.ca".to_string())
    );
    assert_eq!(
        extract_retailer_tag("  [ Best  Buy ] Laptop"),
        Some("Best Buy".to_string())
    );
}

#[test]
fn retailer_tag_requires_leading_bracket() {
    assert_eq!(extract_retailer_tag("Laptop [Walmart] clearance"), None);
    assert_eq!(extract_retailer_tag("[] empty tag"), None);
}

#[test]
fn clean_text_collapses_whitespace() {
    assert_eq!(clean_text("  Laptop\n\t  Deal  "), "Laptop Deal");
}

#[test]
fn normalize_stock_defaults_to_unknown() {
    assert_eq!(normalize_stock(None), "unknown");
    assert_eq!(normalize_stock(Some("   ")), "unknown");
    assert_eq!(normalize_stock(Some(" In\n stock ")), "In stock");
}
