use std::collections::HashMap;

use anyhow::Result;

use crate::domain::entities::table::{CellValue, DataTable};

/// One distinct hierarchy tuple with its summed value.
#[derive(Debug, Clone, PartialEq)]
pub struct AggregatedRow {
    /// Display values of the hierarchy columns, outermost first.
    pub path: Vec<String>,
    pub total: f64,
}

/// Raw table after missing-value filtering, group-by-sum on the hierarchy
/// tuple, and the strictly-positive filter. Rows keep first-seen order.
#[derive(Debug, Clone, PartialEq)]
pub struct AggregatedTable {
    pub hierarchy: Vec<String>,
    pub value_column: String,
    pub rows: Vec<AggregatedRow>,
}

impl AggregatedTable {
    pub fn grand_total(&self) -> f64 {
        self.rows.iter().map(|row| row.total).sum()
    }
}

/// Collapse the raw table into one row per distinct hierarchy tuple.
///
/// Rows with a missing value in any selected column never contribute.
/// Groups are keyed by the exact display tuple, no normalization. Groups
/// whose sum is not strictly positive are dropped: zero or negative areas
/// make no sense in a proportional chart.
pub fn aggregate(
    table: &DataTable,
    hierarchy: &[String],
    value_column: &str,
) -> Result<AggregatedTable> {
    if hierarchy.is_empty() {
        anyhow::bail!("hierarchy selection is empty");
    }

    let hierarchy_indices = hierarchy
        .iter()
        .map(|name| {
            table
                .column_index(name)
                .ok_or_else(|| anyhow::anyhow!("unknown hierarchy column: {name}"))
        })
        .collect::<Result<Vec<usize>>>()?;
    let value_index = table
        .column_index(value_column)
        .ok_or_else(|| anyhow::anyhow!("unknown value column: {value_column}"))?;
    if !table
        .numeric_columns()
        .iter()
        .any(|name| name == value_column)
    {
        anyhow::bail!("value column is not numeric: {value_column}");
    }

    let mut group_index: HashMap<Vec<String>, usize> = HashMap::new();
    let mut groups: Vec<AggregatedRow> = Vec::new();

    for row in &table.rows {
        let value = match &row[value_index] {
            CellValue::Number(v) => *v,
            _ => continue,
        };
        if hierarchy_indices.iter().any(|idx| row[*idx].is_missing()) {
            continue;
        }
        let path: Vec<String> = hierarchy_indices
            .iter()
            .map(|idx| row[*idx].display())
            .collect();

        match group_index.get(&path) {
            Some(&at) => groups[at].total += value,
            None => {
                group_index.insert(path.clone(), groups.len());
                groups.push(AggregatedRow { path, total: value });
            }
        }
    }

    groups.retain(|group| group.total > 0.0);

    Ok(AggregatedTable {
        hierarchy: hierarchy.to_vec(),
        value_column: value_column.to_string(),
        rows: groups,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text(v: &str) -> CellValue {
        CellValue::Text(v.to_string())
    }

    fn sales_table(rows: Vec<(Option<&str>, &str, f64)>) -> DataTable {
        DataTable::new(
            vec![
                "품목명".to_string(),
                "지역".to_string(),
                "장부금액".to_string(),
            ],
            rows.into_iter()
                .map(|(item, region, amount)| {
                    vec![
                        item.map(text).unwrap_or(CellValue::Missing),
                        text(region),
                        CellValue::Number(amount),
                    ]
                })
                .collect(),
        )
    }

    fn columns(names: &[&str]) -> Vec<String> {
        names.iter().map(|n| n.to_string()).collect()
    }

    #[test]
    fn sums_duplicate_paths_and_drops_non_positive_groups() {
        let table = sales_table(vec![
            (Some("A"), "north", 10.0),
            (Some("A"), "north", 5.0),
            (Some("B"), "south", -3.0),
        ]);

        let result = aggregate(&table, &columns(&["품목명"]), "장부금액")
            .expect("aggregation should succeed");

        assert_eq!(
            result.rows,
            vec![AggregatedRow {
                path: vec!["A".to_string()],
                total: 15.0,
            }]
        );
    }

    #[test]
    fn two_level_hierarchy_groups_by_full_tuple() {
        let table = sales_table(vec![
            (Some("A"), "north", 10.0),
            (Some("A"), "north", 5.0),
            (Some("B"), "south", -3.0),
        ]);

        let result = aggregate(&table, &columns(&["품목명", "지역"]), "장부금액")
            .expect("aggregation should succeed");

        assert_eq!(
            result.rows,
            vec![AggregatedRow {
                path: vec!["A".to_string(), "north".to_string()],
                total: 15.0,
            }]
        );
    }

    #[test]
    fn rows_with_missing_hierarchy_value_never_contribute() {
        let table = sales_table(vec![
            (Some("A"), "north", 10.0),
            (None, "north", 1_000_000.0),
        ]);

        let result = aggregate(&table, &columns(&["품목명"]), "장부금액")
            .expect("aggregation should succeed");

        assert_eq!(result.grand_total(), 10.0);
        assert_eq!(result.rows.len(), 1);
    }

    #[test]
    fn conserves_grand_total_of_contributing_rows() {
        let table = sales_table(vec![
            (Some("A"), "north", 10.0),
            (Some("A"), "south", 2.5),
            (Some("B"), "north", 4.0),
            (Some("B"), "north", 0.5),
            (None, "west", 99.0),
        ]);

        let result = aggregate(&table, &columns(&["품목명"]), "장부금액")
            .expect("aggregation should succeed");

        assert!((result.grand_total() - 17.0).abs() < 1e-9);
    }

    #[test]
    fn output_paths_are_unique() {
        let table = sales_table(vec![
            (Some("A"), "north", 1.0),
            (Some("B"), "north", 1.0),
            (Some("A"), "south", 1.0),
            (Some("B"), "south", 1.0),
        ]);

        let result = aggregate(&table, &columns(&["품목명", "지역"]), "장부금액")
            .expect("aggregation should succeed");

        for (i, left) in result.rows.iter().enumerate() {
            for right in result.rows.iter().skip(i + 1) {
                assert_ne!(left.path, right.path, "paths must be distinct");
            }
        }
        assert!(result.rows.iter().all(|row| row.total > 0.0));
    }

    #[test]
    fn aggregation_is_idempotent() {
        let table = sales_table(vec![
            (Some("A"), "north", 10.0),
            (Some("A"), "south", 5.0),
            (Some("B"), "north", 2.0),
            (Some("A"), "north", 1.0),
        ]);

        let once = aggregate(&table, &columns(&["품목명", "지역"]), "장부금액")
            .expect("first aggregation should succeed");

        let reaggregated_input = DataTable::new(
            vec![
                "품목명".to_string(),
                "지역".to_string(),
                "장부금액".to_string(),
            ],
            once.rows
                .iter()
                .map(|row| {
                    vec![
                        text(&row.path[0]),
                        text(&row.path[1]),
                        CellValue::Number(row.total),
                    ]
                })
                .collect(),
        );
        let twice = aggregate(
            &reaggregated_input,
            &columns(&["품목명", "지역"]),
            "장부금액",
        )
        .expect("second aggregation should succeed");

        assert_eq!(once.rows, twice.rows);
    }

    #[test]
    fn unknown_columns_are_rejected() {
        let table = sales_table(vec![(Some("A"), "north", 1.0)]);

        assert!(aggregate(&table, &columns(&["없는컬럼"]), "장부금액").is_err());
        assert!(aggregate(&table, &columns(&["품목명"]), "없는컬럼").is_err());
        assert!(aggregate(&table, &[], "장부금액").is_err());
    }

    #[test]
    fn non_numeric_value_column_is_rejected() {
        let table = sales_table(vec![(Some("A"), "north", 1.0)]);

        assert!(aggregate(&table, &columns(&["품목명"]), "지역").is_err());
    }
}
