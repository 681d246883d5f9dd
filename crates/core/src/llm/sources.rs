use crate::domain::analysis::{GroundingSource, UNTITLED_SOURCE};
use crate::llm::Citation;
use std::collections::HashSet;

/// Maps citations to sources, drops entries without a uri and keeps the first entry per uri.
pub fn normalize_sources(citations: &[Citation]) -> Vec<GroundingSource> {
    let mut seen = HashSet::new();
    citations
        .iter()
        .filter_map(|c| {
            let uri = c.uri.as_deref().filter(|u| !u.is_empty())?;
            let title = c
                .title
                .as_deref()
                .filter(|t| !t.is_empty())
                .unwrap_or(UNTITLED_SOURCE);
            Some(GroundingSource {
                uri: uri.to_string(),
                title: title.to_string(),
            })
        })
        .filter(|s| seen.insert(s.uri.clone()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cite(uri: Option<&str>, title: Option<&str>) -> Citation {
        Citation {
            uri: uri.map(str::to_string),
            title: title.map(str::to_string),
        }
    }

    fn pairs(sources: &[GroundingSource]) -> Vec<(&str, &str)> {
        sources
            .iter()
            .map(|s| (s.uri.as_str(), s.title.as_str()))
            .collect()
    }

    #[test]
    fn first_occurrence_wins() {
        let out = normalize_sources(&[
            cite(Some("x"), Some("A")),
            cite(Some("y"), Some("B")),
            cite(Some("x"), Some("C")),
        ]);
        assert_eq!(pairs(&out), [("x", "A"), ("y", "B")]);
    }

    #[test]
    fn empty_or_missing_uri_is_dropped() {
        let out = normalize_sources(&[
            cite(Some(""), Some("Has a title")),
            cite(None, Some("Also titled")),
            cite(Some("z"), None),
        ]);
        assert_eq!(pairs(&out), [("z", UNTITLED_SOURCE)]);
    }

    #[test]
    fn empty_title_becomes_untitled() {
        let out = normalize_sources(&[cite(Some("u"), Some(""))]);
        assert_eq!(out[0].title, UNTITLED_SOURCE);
    }

    #[test]
    fn empty_input_yields_no_sources() {
        assert!(normalize_sources(&[]).is_empty());
    }
}
