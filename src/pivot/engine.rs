//! Year-by-category pivot.

use crate::models::{PivotRow, YearAggregate};
use indexmap::IndexMap;
use std::collections::HashMap;

/// Pivot per-year breakdowns into one row per year with a fixed column set.
///
/// Every row gets exactly `known_keys` as columns, in that order. Keys a
/// year does not report are filled with `0`; keys a year reports that are
/// not in `known_keys` are dropped. Rows keep the input order of `years`.
/// If a breakdown repeats a key, the last value wins.
pub fn pivot(years: &[YearAggregate], known_keys: &[String]) -> Vec<PivotRow> {
    years
        .iter()
        .map(|entry| {
            let lookup: HashMap<&str, f64> = entry
                .breakdown
                .iter()
                .map(|cv| (cv.key.as_str(), cv.value))
                .collect();

            let values: IndexMap<String, f64> = known_keys
                .iter()
                .map(|key| (key.clone(), lookup.get(key.as_str()).copied().unwrap_or(0.0)))
                .collect();

            PivotRow {
                year: entry.year.clone(),
                values,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::CategoryValue;

    fn keys(list: &[&str]) -> Vec<String> {
        list.iter().map(|k| k.to_string()).collect()
    }

    #[test]
    fn test_missing_keys_are_zero_filled() {
        let years = vec![
            YearAggregate::new("2021", vec![CategoryValue::new("Energia", 10.0)]),
            YearAggregate::new("2022", vec![CategoryValue::new("Indústria", 5.0)]),
        ];
        let known = keys(&["Energia", "Indústria", "Transporte"]);

        let rows = pivot(&years, &known);

        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].year, "2021");
        assert_eq!(rows[0].get("Energia"), Some(10.0));
        assert_eq!(rows[0].get("Indústria"), Some(0.0));
        assert_eq!(rows[0].get("Transporte"), Some(0.0));
        assert_eq!(rows[1].year, "2022");
        assert_eq!(rows[1].get("Energia"), Some(0.0));
        assert_eq!(rows[1].get("Indústria"), Some(5.0));
        assert_eq!(rows[1].get("Transporte"), Some(0.0));

        let json = serde_json::to_value(&rows).unwrap();
        assert_eq!(
            json,
            serde_json::json!([
                {"year": "2021", "Energia": 10.0, "Indústria": 0.0, "Transporte": 0.0},
                {"year": "2022", "Energia": 0.0, "Indústria": 5.0, "Transporte": 0.0},
            ])
        );
    }

    #[test]
    fn test_columns_follow_known_keys_order() {
        let years = vec![
            YearAggregate::new(
                "2020",
                vec![
                    CategoryValue::new("C", 3.0),
                    CategoryValue::new("A", 1.0),
                ],
            ),
            YearAggregate::new("2019", vec![CategoryValue::new("B", 2.0)]),
        ];
        let known = keys(&["B", "A", "C"]);

        for row in pivot(&years, &known) {
            assert_eq!(row.columns().collect::<Vec<_>>(), vec!["B", "A", "C"]);
        }
    }

    #[test]
    fn test_row_order_is_input_order() {
        let years = vec![
            YearAggregate::new("2023", vec![]),
            YearAggregate::new("2019", vec![]),
            YearAggregate::new("2021", vec![]),
        ];

        let rows = pivot(&years, &keys(&["X"]));
        let order: Vec<&str> = rows.iter().map(|r| r.year.as_str()).collect();
        assert_eq!(order, vec!["2023", "2019", "2021"]);
    }

    #[test]
    fn test_unknown_keys_are_dropped() {
        let years = vec![YearAggregate::new(
            "2021",
            vec![
                CategoryValue::new("Energia", 1.0),
                CategoryValue::new("Agricultura", 99.0),
            ],
        )];

        let rows = pivot(&years, &keys(&["Energia"]));
        assert_eq!(rows[0].values.len(), 1);
        assert_eq!(rows[0].get("Agricultura"), None);
    }

    #[test]
    fn test_duplicate_key_last_write_wins() {
        let years = vec![YearAggregate::new(
            "2021",
            vec![
                CategoryValue::new("Energia", 1.0),
                CategoryValue::new("Energia", 7.0),
            ],
        )];

        let rows = pivot(&years, &keys(&["Energia"]));
        assert_eq!(rows[0].get("Energia"), Some(7.0));
    }

    #[test]
    fn test_empty_inputs() {
        assert!(pivot(&[], &keys(&["A"])).is_empty());

        let rows = pivot(
            &[YearAggregate::new("2021", vec![CategoryValue::new("A", 1.0)])],
            &[],
        );
        assert_eq!(rows.len(), 1);
        assert!(rows[0].values.is_empty());
        assert_eq!(
            serde_json::to_string(&rows[0]).unwrap(),
            r#"{"year":"2021"}"#
        );
    }
}
