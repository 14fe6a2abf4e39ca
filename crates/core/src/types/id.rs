//! Shopify resource identifiers.
//!
//! The Admin API speaks two ID dialects: the REST API uses bare numeric IDs
//! (`123456789`) while the GraphQL API uses global IDs
//! (`gid://shopify/Product/123456789`). Agents pass whichever they saw last,
//! so tools accept both and convert at the edge with [`to_gid`] and
//! [`legacy_id`].

use core::fmt;

const GID_PREFIX: &str = "gid://shopify/";

/// Shopify resource types that appear in global IDs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResourceKind {
    Product,
    ProductVariant,
    InventoryItem,
    Location,
    Publication,
    Menu,
    Blog,
    Article,
    Page,
    Customer,
    Order,
    DiscountCodeNode,
}

impl ResourceKind {
    /// The type segment used in a GID (`gid://shopify/<segment>/<id>`).
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Product => "Product",
            Self::ProductVariant => "ProductVariant",
            Self::InventoryItem => "InventoryItem",
            Self::Location => "Location",
            Self::Publication => "Publication",
            Self::Menu => "Menu",
            Self::Blog => "Blog",
            Self::Article => "Article",
            Self::Page => "Page",
            Self::Customer => "Customer",
            Self::Order => "Order",
            Self::DiscountCodeNode => "DiscountCodeNode",
        }
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Convert a numeric ID into a GID for the GraphQL API.
///
/// Values that are already GIDs, or that are not purely numeric, are returned
/// unchanged so Shopify can report on them.
///
/// ```
/// use shopify_admin_mcp_core::{ResourceKind, to_gid};
///
/// assert_eq!(to_gid(ResourceKind::Blog, "42"), "gid://shopify/Blog/42");
/// assert_eq!(
///     to_gid(ResourceKind::Blog, "gid://shopify/Blog/42"),
///     "gid://shopify/Blog/42"
/// );
/// ```
#[must_use]
pub fn to_gid(kind: ResourceKind, raw: &str) -> String {
    let raw = raw.trim();
    if is_numeric(raw) {
        format!("{GID_PREFIX}{kind}/{raw}")
    } else {
        raw.to_string()
    }
}

/// Extract the numeric ID from a GID for the REST API.
///
/// Query strings on GIDs (`gid://shopify/InventoryItem/1?foo=bar`) are dropped.
/// Anything that is not a GID is returned trimmed but otherwise unchanged.
///
/// ```
/// use shopify_admin_mcp_core::legacy_id;
///
/// assert_eq!(legacy_id("gid://shopify/Order/1001"), "1001");
/// assert_eq!(legacy_id("1001"), "1001");
/// ```
#[must_use]
pub fn legacy_id(raw: &str) -> &str {
    let raw = raw.trim();
    raw.strip_prefix(GID_PREFIX).map_or(raw, |rest| {
        let rest = rest.split('?').next().unwrap_or(rest);
        rest.rsplit('/').next().unwrap_or(rest)
    })
}

fn is_numeric(s: &str) -> bool {
    !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_to_gid_from_numeric() {
        assert_eq!(
            to_gid(ResourceKind::Product, "123"),
            "gid://shopify/Product/123"
        );
        assert_eq!(
            to_gid(ResourceKind::DiscountCodeNode, " 77 "),
            "gid://shopify/DiscountCodeNode/77"
        );
    }

    #[test]
    fn test_to_gid_passes_through_gids_and_garbage() {
        assert_eq!(
            to_gid(ResourceKind::Page, "gid://shopify/Page/9"),
            "gid://shopify/Page/9"
        );
        assert_eq!(to_gid(ResourceKind::Page, "about-us"), "about-us");
        assert_eq!(to_gid(ResourceKind::Page, ""), "");
    }

    #[test]
    fn test_legacy_id() {
        assert_eq!(legacy_id("gid://shopify/Product/123"), "123");
        assert_eq!(legacy_id("gid://shopify/InventoryItem/5?x=1"), "5");
        assert_eq!(legacy_id("  987 "), "987");
        assert_eq!(legacy_id("L1"), "L1");
    }

    #[test]
    fn test_resource_kind_display() {
        assert_eq!(ResourceKind::ProductVariant.to_string(), "ProductVariant");
    }
}
