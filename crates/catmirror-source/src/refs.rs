//! Foreign-key extraction from the API's nested `meta.href` links.
//!
//! Relationships arrive as `{"meta": {"href": ".../entity/product/<id>"}}`;
//! the referenced id is the trailing path segment of the link.

use serde_json::Value;

/// Returns the trailing path segment of `href`, ignoring any query string or
/// fragment. Returns `None` when the link has no usable segment.
#[must_use]
pub fn id_from_href(href: &str) -> Option<String> {
    let path = href.split(['?', '#']).next().unwrap_or_default();
    path.trim_end_matches('/')
        .rsplit('/')
        .next()
        .map(str::trim)
        .filter(|segment| !segment.is_empty() && !segment.contains(':'))
        .map(str::to_owned)
}

/// Resolves `record[field].meta.href` to the referenced id.
///
/// An absent or `null` field is an ordinary missing relationship and yields
/// `None` rather than an error.
#[must_use]
pub fn resolve_ref(record: &Value, field: &str) -> Option<String> {
    record
        .get(field)?
        .get("meta")?
        .get("href")?
        .as_str()
        .and_then(id_from_href)
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn id_from_href_takes_trailing_segment() {
        assert_eq!(
            id_from_href("https://api.moysklad.ru/api/remap/1.2/entity/productfolder/7944ef04-f831-11e5-7a69-971500188b19"),
            Some("7944ef04-f831-11e5-7a69-971500188b19".to_string())
        );
    }

    #[test]
    fn id_from_href_strips_query_and_trailing_slash() {
        assert_eq!(
            id_from_href("https://host/entity/product/abc/?expand=supplier"),
            Some("abc".to_string())
        );
        assert_eq!(
            id_from_href("https://host/entity/store/s-1#top"),
            Some("s-1".to_string())
        );
    }

    #[test]
    fn id_from_href_rejects_empty_links() {
        assert_eq!(id_from_href(""), None);
        assert_eq!(id_from_href("https://"), None);
    }

    #[test]
    fn resolve_ref_reads_nested_meta_href() {
        let record = json!({
            "id": "child",
            "productFolder": { "meta": { "href": "https://host/entity/productfolder/parent", "type": "productfolder" } }
        });
        assert_eq!(
            resolve_ref(&record, "productFolder"),
            Some("parent".to_string())
        );
    }

    #[test]
    fn resolve_ref_absent_field_is_none() {
        let record = json!({ "id": "root", "name": "Root" });
        assert_eq!(resolve_ref(&record, "productFolder"), None);
        assert_eq!(
            resolve_ref(&json!({ "productFolder": null }), "productFolder"),
            None
        );
        assert_eq!(
            resolve_ref(&json!({ "productFolder": { "meta": {} } }), "productFolder"),
            None
        );
    }
}
