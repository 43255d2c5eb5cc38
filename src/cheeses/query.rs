use crate::pagination::PAGE_SIZE;

/// Filter values accepted by the listing collection, parsed from the raw
/// query string. Unknown parameters and unparsable values are ignored, as
/// a declarative filter layer would.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct ListingFilter {
    pub is_published: Option<bool>,
    pub title: Option<String>,
    pub description: Option<String>,
    pub owner_email: Option<String>,
    pub price_gt: Option<i64>,
    pub price_gte: Option<i64>,
    pub price_lt: Option<i64>,
    pub price_lte: Option<i64>,
}

/// Everything a client can say about a collection request: page, filters,
/// and an optional field-selection set.
#[derive(Debug, Default)]
pub struct ListQuery {
    pub page: i64,
    pub filter: ListingFilter,
    pub properties: Vec<String>,
}

fn parse_bool(v: &str) -> Option<bool> {
    match v {
        "true" | "1" => Some(true),
        "false" | "0" => Some(false),
        _ => None,
    }
}

impl ListQuery {
    pub fn from_pairs(pairs: &[(String, String)]) -> Self {
        let mut q = ListQuery {
            page: 1,
            ..Default::default()
        };
        for (key, value) in pairs {
            match key.as_str() {
                "page" => {
                    if let Ok(p) = value.parse::<i64>() {
                        q.page = p.max(1);
                    }
                }
                "isPublished" | "is_published" => q.filter.is_published = parse_bool(value),
                "title" => q.filter.title = Some(value.clone()),
                "description" => q.filter.description = Some(value.clone()),
                "owner.email" => q.filter.owner_email = Some(value.clone()),
                "price[gt]" => q.filter.price_gt = value.parse().ok(),
                "price[gte]" => q.filter.price_gte = value.parse().ok(),
                "price[lt]" => q.filter.price_lt = value.parse().ok(),
                "price[lte]" => q.filter.price_lte = value.parse().ok(),
                "properties[]" | "properties" => q.properties.push(value.clone()),
                _ => {}
            }
        }
        q
    }

    pub fn offset(&self) -> i64 {
        (self.page - 1) * PAGE_SIZE
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pairs(raw: &[(&str, &str)]) -> Vec<(String, String)> {
        raw.iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn defaults_to_first_page_and_no_filters() {
        let q = ListQuery::from_pairs(&[]);
        assert_eq!(q.page, 1);
        assert_eq!(q.offset(), 0);
        assert_eq!(q.filter, ListingFilter::default());
        assert!(q.properties.is_empty());
    }

    #[test]
    fn parses_page_and_offset() {
        let q = ListQuery::from_pairs(&pairs(&[("page", "3")]));
        assert_eq!(q.page, 3);
        assert_eq!(q.offset(), 20);
    }

    #[test]
    fn page_below_one_is_clamped() {
        let q = ListQuery::from_pairs(&pairs(&[("page", "0")]));
        assert_eq!(q.page, 1);
    }

    #[test]
    fn parses_boolean_filter() {
        let q = ListQuery::from_pairs(&pairs(&[("isPublished", "true")]));
        assert_eq!(q.filter.is_published, Some(true));
        let q = ListQuery::from_pairs(&pairs(&[("isPublished", "0")]));
        assert_eq!(q.filter.is_published, Some(false));
        let q = ListQuery::from_pairs(&pairs(&[("isPublished", "banana")]));
        assert_eq!(q.filter.is_published, None);
    }

    #[test]
    fn parses_partial_match_filters() {
        let q = ListQuery::from_pairs(&pairs(&[
            ("title", "chedd"),
            ("description", "creamy"),
            ("owner.email", "alice"),
        ]));
        assert_eq!(q.filter.title.as_deref(), Some("chedd"));
        assert_eq!(q.filter.description.as_deref(), Some("creamy"));
        assert_eq!(q.filter.owner_email.as_deref(), Some("alice"));
    }

    #[test]
    fn parses_price_range_brackets() {
        let q = ListQuery::from_pairs(&pairs(&[("price[gte]", "100"), ("price[lt]", "500")]));
        assert_eq!(q.filter.price_gte, Some(100));
        assert_eq!(q.filter.price_lt, Some(500));
        assert_eq!(q.filter.price_gt, None);
    }

    #[test]
    fn collects_repeated_properties() {
        let q = ListQuery::from_pairs(&pairs(&[
            ("properties[]", "title"),
            ("properties[]", "price"),
        ]));
        assert_eq!(q.properties, vec!["title", "price"]);
    }

    #[test]
    fn ignores_unknown_parameters_and_bad_values() {
        let q = ListQuery::from_pairs(&pairs(&[
            ("sort", "price"),
            ("price[gt]", "cheap"),
            ("page", "many"),
        ]));
        assert_eq!(q.page, 1);
        assert_eq!(q.filter, ListingFilter::default());
    }
}
