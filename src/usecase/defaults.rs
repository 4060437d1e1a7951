use crate::domain::entities::table::DataTable;

/// Hierarchy column the ERP export is expected to carry.
pub const DEFAULT_HIERARCHY_COLUMN: &str = "품목명";
/// Value column the ERP export is expected to carry.
pub const DEFAULT_VALUE_COLUMN: &str = "장부금액";

/// Default hierarchy selection: the well-known item-name column when
/// present, otherwise the first column in file order.
pub fn default_hierarchy(table: &DataTable) -> Vec<String> {
    if table.column_index(DEFAULT_HIERARCHY_COLUMN).is_some() {
        return vec![DEFAULT_HIERARCHY_COLUMN.to_string()];
    }
    table.columns.first().cloned().into_iter().collect()
}

/// Default value selection among numeric columns only. `None` when the
/// table has no numeric column at all; callers must treat that as
/// "chart disabled", never as index 0 of an empty list.
pub fn default_value_column(table: &DataTable) -> Option<String> {
    let numeric = table.numeric_columns();
    numeric
        .iter()
        .find(|name| name.as_str() == DEFAULT_VALUE_COLUMN)
        .or_else(|| numeric.first())
        .cloned()
}
