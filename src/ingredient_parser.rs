use regex::Regex;
use std::sync::LazyLock;

// Leading quantity: digits, vulgar fractions, ranges ("1-2"), "1/2", "2×".
static QUANTITY_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[\d½⅓¼¾⅔⅛/.×\-]+\s*").expect("valid quantity pattern"));

// Units, container/shape words and size/prep adjectives, whole words only so that
// "canned" is never cut down to "ned".
static UNIT_OR_PREP_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)^(cups?|tbsps?|tsps?|oz|lbs?|cans?\s+of|pouche?s?|slices?|leaf|leaves|pieces?|cloves?|pinch|dash|tablespoons?|teaspoons?|pounds?|ounces?|large|medium|small|packed|fresh|dried|ripe|chopped|diced|minced|grated|shredded|crushed|ground|whole|thin|thick)\b\s*",
    )
    .expect("valid unit pattern")
});

static PREP_ADJECTIVE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)^(large|medium|small|packed|fresh|dried|ripe|chopped|diced|minced|grated|shredded|crushed|ground|whole|thin|thick)\b\s*",
    )
    .expect("valid adjective pattern")
});

static OF_PREFIX_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^of\s+").expect("valid 'of' pattern"));

/// Reduces a free-text ingredient line to its canonical base name.
///
/// `"2 slices bacon, crispy and cut in strips"` becomes `"bacon"` and
/// `"1 cup iceberg salad, shredded"` becomes `"iceberg salad"`. The quantity, one unit or
/// adjective, a second stacked adjective and a leading "of" are removed; anything after the
/// first comma is treated as a preparation note and dropped.
///
/// Never fails: an empty or all-noise line yields an empty name, which callers treat as
/// unresolvable.
pub fn normalize(raw: &str) -> String {
    let cleaned = raw.trim();
    let cleaned = QUANTITY_RE.replace(cleaned, "");
    let cleaned = UNIT_OR_PREP_RE.replace(&cleaned, "");
    let cleaned = PREP_ADJECTIVE_RE.replace(&cleaned, "");
    let cleaned = OF_PREFIX_RE.replace(&cleaned, "");
    let identity = cleaned.split(',').next().unwrap_or_default();
    identity.trim().to_lowercase()
}

/// Splits a newline-separated spreadsheet cell into trimmed, non-empty lines.
pub fn split_lines(raw: &str) -> Vec<String> {
    raw.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect()
}
