//! Listing pipeline - Filters, sorts and paginates an in-memory property collection.
//!
//! Everything here is pure and synchronous. The store decides which rows the caller may see
//! (public views only get active listings); this module only narrows and orders that
//! collection for one screen.
//!
//! Input coming from forms and query strings is forgiving: `"all"` or an empty value means
//! "no constraint", and a value that cannot be parsed is treated the same way instead of
//! being reported as an error.

use crate::models::{ListingType, Property, PropertyStatus, PropertyType};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::BTreeSet;
use strum::{AsRefStr, Display, EnumString};

/// Bedroom/bathroom constraint.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum RoomFilter {
    /// No constraint
    #[default]
    Any,
    /// Exactly this many rooms
    Exactly(u32),
    /// This many rooms or more (the `"5+"` bucket)
    AtLeast(u32),
}

impl RoomFilter {
    /// Parses `"all"`, `"3"` or `"5+"`. Anything else is no constraint.
    #[must_use]
    pub fn parse(input: &str) -> Self {
        let input = input.trim();
        if input.is_empty() || input.eq_ignore_ascii_case("all") {
            return Self::Any;
        }
        if let Some(floor) = input.strip_suffix('+') {
            return floor.trim().parse().map_or(Self::Any, Self::AtLeast);
        }
        input.parse().map_or(Self::Any, Self::Exactly)
    }

    /// A listing without a room count never matches an exact filter and counts as zero
    /// for an `N+` filter.
    #[must_use]
    pub fn matches(self, rooms: Option<u32>) -> bool {
        match self {
            Self::Any => true,
            Self::Exactly(n) => rooms == Some(n),
            Self::AtLeast(n) => rooms.unwrap_or(0) >= n,
        }
    }
}

/// Parses one price bound. Blank, non-numeric, negative or non-finite input yields `None`.
#[must_use]
pub fn parse_price_bound(input: &str) -> Option<f64> {
    let input = input.trim();
    if input.is_empty() {
        return None;
    }
    input
        .parse::<f64>()
        .ok()
        .filter(|value| value.is_finite() && *value >= 0.0)
}

/// Inclusive price window. A missing minimum is 0, a missing maximum is unbounded.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PriceRange {
    /// Lowest accepted price
    pub min: Option<f64>,
    /// Highest accepted price
    pub max: Option<f64>,
}

impl PriceRange {
    /// Builds a range from raw form input; malformed bounds are dropped individually.
    #[must_use]
    pub fn from_inputs(min: &str, max: &str) -> Self {
        Self {
            min: parse_price_bound(min),
            max: parse_price_bound(max),
        }
    }

    /// Whether `price` falls inside the window.
    #[must_use]
    pub fn contains(&self, price: f64) -> bool {
        price >= self.min.unwrap_or(0.0) && price <= self.max.unwrap_or(f64::INFINITY)
    }
}

/// Every constraint a listing screen can apply. All active constraints are ANDed.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ListingFilter {
    /// Case-insensitive substring over title, city, region, address and description
    pub search: Option<String>,
    pub property_type: Option<PropertyType>,
    pub listing_type: Option<ListingType>,
    /// Admin screens filter on status; public views are already active-only
    pub status: Option<PropertyStatus>,
    /// Exact city name, as offered by [`distinct_cities`]
    pub city: Option<String>,
    pub bedrooms: RoomFilter,
    pub bathrooms: RoomFilter,
    pub price: PriceRange,
    pub featured_only: bool,
}

impl ListingFilter {
    fn matches_search(property: &Property, term: &str) -> bool {
        [
            property.title.as_str(),
            property.city.as_str(),
            property.region.as_str(),
            property.address.as_str(),
            property.description.as_str(),
        ]
        .iter()
        .any(|field| field.to_lowercase().contains(term))
    }

    /// Whether `property` satisfies every active constraint.
    #[must_use]
    pub fn matches(&self, property: &Property) -> bool {
        if let Some(term) = self.search.as_deref().map(str::trim)
            && !term.is_empty()
            && !Self::matches_search(property, &term.to_lowercase())
        {
            return false;
        }
        if self.property_type.is_some_and(|t| t != property.property_type) {
            return false;
        }
        if self.listing_type.is_some_and(|t| t != property.listing_type) {
            return false;
        }
        if self.status.is_some_and(|s| s != property.status) {
            return false;
        }
        if self.city.as_deref().is_some_and(|city| city != property.city) {
            return false;
        }
        if self.featured_only && !property.featured {
            return false;
        }
        self.bedrooms.matches(property.bedrooms)
            && self.bathrooms.matches(property.bathrooms)
            && self.price.contains(property.price)
    }
}

/// User-selectable ordering.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum SortKey {
    /// Most recently created first
    #[default]
    Newest,
    /// Oldest first
    Oldest,
    /// Cheapest first
    PriceLow,
    /// Most expensive first
    PriceHigh,
    /// Title A to Z
    TitleAsc,
    /// Title Z to A
    TitleDesc,
}

impl SortKey {
    fn compare_titles(a: &Property, b: &Property) -> Ordering {
        a.title
            .to_lowercase()
            .cmp(&b.title.to_lowercase())
            .then_with(|| a.title.cmp(&b.title))
    }

    /// Ordering of two listings under this key alone.
    #[must_use]
    pub fn compare(self, a: &Property, b: &Property) -> Ordering {
        match self {
            Self::Newest => b.created_at.cmp(&a.created_at),
            Self::Oldest => a.created_at.cmp(&b.created_at),
            Self::PriceLow => a.price.total_cmp(&b.price),
            Self::PriceHigh => b.price.total_cmp(&a.price),
            Self::TitleAsc => Self::compare_titles(a, b),
            Self::TitleDesc => Self::compare_titles(b, a),
        }
    }
}

/// Sorts in place. With `featured_first`, featured listings lead and `sort` orders each
/// group; otherwise `sort` alone decides. The sort is stable.
pub fn sort_properties(items: &mut [&Property], sort: SortKey, featured_first: bool) {
    items.sort_by(|a, b| {
        let group = if featured_first {
            b.featured.cmp(&a.featured)
        } else {
            Ordering::Equal
        };
        group.then_with(|| sort.compare(a, b))
    });
}

/// Number of pages needed for `matches` items; never less than 1.
#[must_use]
pub fn total_pages(matches: usize, page_size: usize) -> usize {
    matches.div_ceil(page_size.max(1)).max(1)
}

/// Returns the 1-indexed `page` of `items`. Page 0 is read as page 1; a page past the end
/// is empty.
#[must_use]
pub fn paginate<T: Clone>(items: &[T], page: usize, page_size: usize) -> Vec<T> {
    let page_size = page_size.max(1);
    let start = (page.max(1) - 1).saturating_mul(page_size);
    items.iter().skip(start).take(page_size).cloned().collect()
}

/// Full pipeline configuration for one request.
#[derive(Debug, Clone, PartialEq)]
pub struct ListingQuery {
    pub filter: ListingFilter,
    pub sort: SortKey,
    /// Pull featured listings ahead of the rest before applying `sort`
    pub featured_first: bool,
    /// 1-indexed
    pub page: usize,
    pub page_size: usize,
}

impl Default for ListingQuery {
    fn default() -> Self {
        Self {
            filter: ListingFilter::default(),
            sort: SortKey::default(),
            featured_first: true,
            page: 1,
            page_size: 12,
        }
    }
}

/// One page of results plus the totals a pager needs.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ListingPage {
    pub items: Vec<Property>,
    pub total_matches: usize,
    pub total_pages: usize,
    pub page: usize,
    pub page_size: usize,
}

/// Filters, orders and slices `properties` according to `query`.
#[must_use]
pub fn run(properties: &[Property], query: &ListingQuery) -> ListingPage {
    let mut matches: Vec<&Property> = properties
        .iter()
        .filter(|property| query.filter.matches(property))
        .collect();
    sort_properties(&mut matches, query.sort, query.featured_first);

    let page_size = query.page_size.max(1);
    let page = query.page.max(1);
    let items = paginate(&matches, page, page_size)
        .into_iter()
        .cloned()
        .collect();

    ListingPage {
        items,
        total_matches: matches.len(),
        total_pages: total_pages(matches.len(), page_size),
        page,
        page_size,
    }
}

/// Sorted, de-duplicated, non-empty city names for the city dropdown.
#[must_use]
pub fn distinct_cities(properties: &[Property]) -> Vec<String> {
    properties
        .iter()
        .map(|property| property.city.trim())
        .filter(|city| !city.is_empty())
        .map(str::to_string)
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

/// Raw listing parameters as they arrive from a query string or form.
///
/// Every field is optional text; [`ListingParams::to_query`] applies the forgiving parsing
/// rules described at the top of this module.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ListingParams {
    pub search: Option<String>,
    pub property_type: Option<String>,
    pub listing_type: Option<String>,
    pub status: Option<String>,
    pub city: Option<String>,
    pub bedrooms: Option<String>,
    pub bathrooms: Option<String>,
    pub min_price: Option<String>,
    pub max_price: Option<String>,
    /// `true`/`false`; anything else is false
    pub featured: Option<String>,
    pub sort: Option<String>,
    /// 1-based; anything unparsable is page 1
    pub page: Option<String>,
}

/// Parses an optional choice such as a status or type. Blank, `"all"` and unknown values
/// are None.
#[must_use]
pub fn parse_choice<T: std::str::FromStr>(value: Option<&str>) -> Option<T> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty() && !v.eq_ignore_ascii_case("all"))
        .and_then(|v| v.to_ascii_lowercase().parse().ok())
}

/// Reads a 1-based page number. Missing, blank or malformed input is page 1.
#[must_use]
pub fn parse_page(value: Option<&str>) -> usize {
    value
        .and_then(|v| v.trim().parse::<usize>().ok())
        .unwrap_or(1)
        .max(1)
}

fn parse_flag(value: Option<&str>) -> bool {
    value.is_some_and(|v| v.trim().eq_ignore_ascii_case("true") || v.trim() == "1")
}

impl ListingParams {
    /// Normalises the raw parameters into a [`ListingQuery`].
    #[must_use]
    pub fn to_query(&self, page_size: usize, featured_first: bool) -> ListingQuery {
        let filter = ListingFilter {
            search: self
                .search
                .as_deref()
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string),
            property_type: parse_choice(self.property_type.as_deref()),
            listing_type: parse_choice(self.listing_type.as_deref()),
            status: parse_choice(self.status.as_deref()),
            city: self
                .city
                .as_deref()
                .map(str::trim)
                .filter(|c| !c.is_empty() && !c.eq_ignore_ascii_case("all"))
                .map(str::to_string),
            bedrooms: RoomFilter::parse(self.bedrooms.as_deref().unwrap_or_default()),
            bathrooms: RoomFilter::parse(self.bathrooms.as_deref().unwrap_or_default()),
            price: PriceRange::from_inputs(
                self.min_price.as_deref().unwrap_or_default(),
                self.max_price.as_deref().unwrap_or_default(),
            ),
            featured_only: parse_flag(self.featured.as_deref()),
        };

        ListingQuery {
            filter,
            sort: parse_choice(self.sort.as_deref()).unwrap_or_default(),
            featured_first,
            page: parse_page(self.page.as_deref()),
            page_size,
        }
    }
}
