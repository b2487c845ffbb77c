use reqwest::header::HeaderMap;

/// Merges header sets in order; a later set replaces every value an earlier
/// set holds for the same header name.
///
/// Header names are case-insensitive. `None` entries are skipped.
pub fn merge_headers<'a, I>(sources: I) -> HeaderMap
where
    I: IntoIterator<Item = Option<&'a HeaderMap>>,
{
    let mut merged = HeaderMap::new();
    for source in sources.into_iter().flatten() {
        for name in source.keys() {
            merged.remove(name);
            for value in source.get_all(name) {
                merged.append(name.clone(), value.clone());
            }
        }
    }
    merged
}

#[cfg(test)]
mod tests {
    use reqwest::header::{HeaderMap, HeaderName, HeaderValue};

    use super::merge_headers;

    fn headers(pairs: &[(&'static str, &'static str)]) -> HeaderMap {
        let mut map = HeaderMap::new();
        for &(name, value) in pairs {
            map.append(
                HeaderName::from_static(name),
                HeaderValue::from_static(value),
            );
        }
        map
    }

    #[test]
    fn later_source_wins() {
        let defaults = headers(&[("accept", "application/json"), ("x-trace", "a")]);
        let call = headers(&[("x-trace", "b")]);

        let merged = merge_headers([Some(&defaults), Some(&call)]);

        assert_eq!(merged.len(), 2);
        assert_eq!(merged["accept"], "application/json");
        assert_eq!(merged["x-trace"], "b");
    }

    #[test]
    fn names_are_case_insensitive() {
        let mut first = HeaderMap::new();
        first.insert(
            HeaderName::from_bytes(b"Authorization").unwrap(),
            HeaderValue::from_static("old"),
        );
        let mut second = HeaderMap::new();
        second.insert(
            HeaderName::from_bytes(b"AUTHORIZATION").unwrap(),
            HeaderValue::from_static("new"),
        );

        let merged = merge_headers([Some(&first), Some(&second)]);

        assert_eq!(merged.len(), 1);
        assert_eq!(merged["authorization"], "new");
    }

    #[test]
    fn later_source_replaces_all_values() {
        let first = headers(&[("accept", "text/html"), ("accept", "text/plain")]);
        let second = headers(&[("accept", "application/json")]);

        let merged = merge_headers([Some(&first), Some(&second)]);

        let values: Vec<_> = merged.get_all("accept").iter().collect();
        assert_eq!(values, vec!["application/json"]);
    }

    #[test]
    fn multi_valued_source_is_kept_whole() {
        let first = headers(&[("x-tag", "one"), ("x-tag", "two")]);

        let merged = merge_headers([Some(&first), None]);

        assert_eq!(merged.get_all("x-tag").iter().count(), 2);
    }

    #[test]
    fn absent_and_empty_sources_yield_empty_map() {
        let empty = HeaderMap::new();
        assert!(merge_headers([None, Some(&empty), None]).is_empty());
        assert!(merge_headers(std::iter::empty::<Option<&HeaderMap>>()).is_empty());
    }

    #[test]
    fn merge_is_associative() {
        let a = headers(&[("a", "1"), ("shared", "a")]);
        let b = headers(&[("b", "2"), ("shared", "b")]);
        let c = headers(&[("c", "3"), ("shared", "c"), ("a", "override")]);

        let flat = merge_headers([Some(&a), Some(&b), Some(&c)]);
        let ab = merge_headers([Some(&a), Some(&b)]);
        let nested = merge_headers([Some(&ab), Some(&c)]);
        let bc = merge_headers([Some(&b), Some(&c)]);
        let right = merge_headers([Some(&a), Some(&bc)]);

        assert_eq!(flat, nested);
        assert_eq!(flat, right);
        assert_eq!(flat["shared"], "c");
        assert_eq!(flat["a"], "override");
        assert_eq!(flat["b"], "2");
    }
}
