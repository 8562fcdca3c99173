//! Combining per-worker tallies into the final result.

use crate::tally::AggregateMap;

/// Folds `maps`, given in worker-rank order, into one map.
///
/// The first map is the base. Paths of later maps are appended in the order
/// each map first saw them, so the output order depends only on the input
/// order, never on which worker finished first. Dates end up sorted ascending.
pub fn merge(maps: impl IntoIterator<Item = AggregateMap>) -> AggregateMap {
    let mut maps = maps.into_iter();
    let mut merged = maps.next().unwrap_or_default();
    for map in maps {
        merged.absorb(map);
    }
    merged.sort_dates();
    merged
}

#[cfg(test)]
mod test {
    use super::merge;
    use crate::{record::LineFormat, tally::AggregateMap};

    fn map_of(records: &[(&str, &str)]) -> AggregateMap {
        let mut map = AggregateMap::new();
        for (path, date) in records {
            let line = format!("https://stitcher.io{path},{date}T12:00:00+00:00");
            map.record_line(line.as_bytes(), &LineFormat::V1);
        }
        map
    }

    fn path_order(map: &AggregateMap) -> Vec<String> {
        map.paths()
            .map(|p| String::from_utf8_lossy(p).into_owned())
            .collect()
    }

    #[test]
    fn path_order_follows_worker_rank() {
        let first = map_of(&[("/a", "2024-01-01"), ("/b", "2024-01-01")]);
        let second = map_of(&[("/b", "2024-01-01"), ("/c", "2024-01-01")]);
        let merged = merge([first.clone(), second.clone()]);
        assert_eq!(path_order(&merged), ["/a", "/b", "/c"]);
        assert_eq!(merged.count("/b", "2024-01-01"), 2);

        let swapped = merge([second, first]);
        assert_eq!(path_order(&swapped), ["/b", "/c", "/a"]);
    }

    #[test]
    fn dates_sorted_ascending() {
        let merged = merge([
            map_of(&[("/p", "2024-03-05"), ("/p", "2024-01-10")]),
            map_of(&[("/p", "2024-02-20"), ("/p", "2024-03-05")]),
        ]);
        let (_, dates) = merged.iter().next().unwrap();
        let dates: Vec<(String, u64)> = dates.iter().map(|(d, n)| (d.to_string(), *n)).collect();
        assert_eq!(
            dates,
            [
                ("2024-01-10".to_string(), 1),
                ("2024-02-20".to_string(), 1),
                ("2024-03-05".to_string(), 2)
            ]
        );
    }

    #[test]
    fn single_map_still_gets_sorted_dates() {
        let merged = merge([map_of(&[("/x", "2024-02-01"), ("/x", "2023-12-31")])]);
        let json = serde_json::to_string(&merged).unwrap();
        assert_eq!(json, r#"{"/x":{"2023-12-31":1,"2024-02-01":1}}"#);
    }

    #[test]
    fn empty_inputs() {
        assert!(merge(Vec::<AggregateMap>::new()).is_empty());
        assert!(merge([AggregateMap::new(), AggregateMap::new()]).is_empty());

        let merged = merge([AggregateMap::new(), map_of(&[("/late", "2024-01-01")])]);
        assert_eq!(path_order(&merged), ["/late"]);
    }
}
