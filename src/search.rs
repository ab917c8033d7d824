use crate::model::{CatalogRecord, TypeFilter};

/// Catalog records whose name contains `query` (ignoring case) and whose type
/// passes `type_filter`, in input order. An empty query matches everything.
pub fn filter<'a>(
    records: &'a [CatalogRecord],
    query: &str,
    type_filter: TypeFilter,
) -> Vec<&'a CatalogRecord> {
    let needle = query.to_lowercase();
    records
        .iter()
        .filter(|record| match type_filter {
            TypeFilter::All => true,
            TypeFilter::Only(object_type) => record.object_type == object_type,
        })
        .filter(|record| needle.is_empty() || record.name.to_lowercase().contains(&needle))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ObjectType;

    fn record(name: &str, object_type: ObjectType) -> CatalogRecord {
        CatalogRecord {
            name: name.to_string(),
            catalog_id: "0".to_string(),
            object_type,
            mean_motion: 15.0,
            inclination_deg: 51.6,
            eccentricity: 0.001,
            orbit: None,
        }
    }

    fn names(found: &[&CatalogRecord]) -> Vec<String> {
        found.iter().map(|r| r.name.clone()).collect()
    }

    fn sample() -> Vec<CatalogRecord> {
        vec![
            record("ISS", ObjectType::Payload),
            record("DEBRIS-1", ObjectType::Debris),
            record("CZ-2C R/B", ObjectType::RocketBody),
            record("ISS DEB", ObjectType::Debris),
        ]
    }

    #[test]
    fn empty_query_and_all_returns_everything_in_order() {
        let records = sample();
        let found = filter(&records, "", TypeFilter::All);
        assert_eq!(found.len(), records.len());
        assert_eq!(names(&found), ["ISS", "DEBRIS-1", "CZ-2C R/B", "ISS DEB"]);
    }

    #[test]
    fn query_is_case_insensitive() {
        let records = sample();
        assert_eq!(names(&filter(&records, "iss", TypeFilter::All)), ["ISS", "ISS DEB"]);
        assert_eq!(names(&filter(&records, "r/b", TypeFilter::All)), ["CZ-2C R/B"]);
    }

    #[test]
    fn type_filter_narrows_results() {
        let records = sample();
        let found = filter(&records, "iss", TypeFilter::Only(ObjectType::Debris));
        assert_eq!(names(&found), ["ISS DEB"]);
        assert!(filter(&records, "", TypeFilter::Only(ObjectType::Other)).is_empty());
    }

    #[test]
    fn catalog_scenario_matches_only_iss() {
        let records = vec![
            record("ISS", ObjectType::Payload),
            record("DEBRIS-1", ObjectType::Debris),
        ];
        assert_eq!(names(&filter(&records, "iss", TypeFilter::All)), ["ISS"]);
    }
}
