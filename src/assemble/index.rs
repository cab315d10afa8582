//! Way lookup table for resolving relation members.

use hashbrown::HashMap;

use crate::models::{RawElement, Way};

/// Ways of one response, keyed by way id. Built once, read-only afterwards.
pub struct ElementIndex<'a> {
    ways: HashMap<i64, &'a Way>,
}

impl<'a> ElementIndex<'a> {
    pub fn build(elements: &'a [RawElement]) -> Self {
        let ways = elements
            .iter()
            .filter_map(|element| match element {
                RawElement::Way(way) => Some((way.id, way)),
                _ => None,
            })
            .collect();
        Self { ways }
    }

    pub fn get(&self, way_id: i64) -> Option<&'a Way> {
        self.ways.get(&way_id).copied()
    }

    pub fn len(&self) -> usize {
        self.ways.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ways.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::OverpassResponse;

    #[test]
    fn test_index_only_ways() {
        let response: OverpassResponse = serde_json::from_str(
            r#"{"elements": [
                {"type": "node", "id": 1, "lat": 0, "lon": 0},
                {"type": "way", "id": 1, "geometry": [{"lat": 0, "lon": 0}, {"lat": 1, "lon": 1}]},
                {"type": "way", "id": 2},
                {"type": "relation", "id": 3, "members": []}
            ]}"#,
        )
        .unwrap();

        let index = ElementIndex::build(&response.elements);
        assert_eq!(index.len(), 2);
        assert_eq!(index.get(1).map(|w| w.geometry.len()), Some(2));
        assert!(index.get(3).is_none());
    }

    #[test]
    fn test_empty_index() {
        let index = ElementIndex::build(&[]);
        assert!(index.is_empty());
        assert!(index.get(1).is_none());
    }
}
