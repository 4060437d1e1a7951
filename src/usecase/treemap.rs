use std::cmp::Ordering;

use crate::domain::entities::chart::{branch_color, Margin, Rect, TreemapSpec, TreemapTile};
use crate::usecase::aggregate::AggregatedTable;

pub const CHART_WIDTH: f64 = 1160.0;
pub const CHART_HEIGHT: f64 = 640.0;

const MARGIN: Margin = Margin {
    top: 30.0,
    left: 10.0,
    right: 10.0,
    bottom: 10.0,
};

/// Header band reserved on branch tiles; children are laid below it.
const BRANCH_HEADER: f64 = 22.0;
const BRANCH_PADDING: f64 = 2.0;

/// Turn the aggregated table into a drawable treemap description.
///
/// Ancestor nodes are synthesized from the hierarchy prefixes and sized by
/// the sum of their children. Within a parent, tiles are squarified in
/// descending value order; every tile's percent is relative to its
/// immediate parent (grand total for top-level branches).
pub fn build_treemap(aggregated: &AggregatedTable) -> TreemapSpec {
    let mut roots: Vec<Node> = Vec::new();
    for row in &aggregated.rows {
        insert_path(&mut roots, &row.path, row.total);
    }

    let plot = Rect {
        x: MARGIN.left,
        y: MARGIN.top,
        width: CHART_WIDTH - MARGIN.left - MARGIN.right,
        height: CHART_HEIGHT - MARGIN.top - MARGIN.bottom,
    };
    let grand_total: f64 = roots.iter().map(|node| node.value).sum();

    let mut tiles = Vec::new();
    layout_nodes(&roots, plot, 0, grand_total, None, &mut tiles);

    TreemapSpec {
        width: CHART_WIDTH,
        height: CHART_HEIGHT,
        margin: MARGIN,
        tiles,
    }
}

#[derive(Debug, Clone, PartialEq)]
struct Node {
    label: String,
    value: f64,
    children: Vec<Node>,
}

fn insert_path(nodes: &mut Vec<Node>, path: &[String], total: f64) {
    let Some((head, rest)) = path.split_first() else {
        return;
    };
    let idx = match nodes.iter().position(|node| node.label == *head) {
        Some(idx) => idx,
        None => {
            nodes.push(Node {
                label: head.clone(),
                value: 0.0,
                children: Vec::new(),
            });
            nodes.len() - 1
        }
    };
    nodes[idx].value += total;
    insert_path(&mut nodes[idx].children, rest, total);
}

fn layout_nodes(
    nodes: &[Node],
    rect: Rect,
    depth: usize,
    parent_total: f64,
    inherited_color: Option<&'static str>,
    tiles: &mut Vec<TreemapTile>,
) {
    if nodes.is_empty() || rect.width <= 0.0 || rect.height <= 0.0 {
        return;
    }

    // Largest first for the layout; colors stay keyed to first-seen order.
    let mut order: Vec<usize> = (0..nodes.len()).collect();
    order.sort_by(|a, b| {
        nodes[*b]
            .value
            .partial_cmp(&nodes[*a].value)
            .unwrap_or(Ordering::Equal)
    });
    let values: Vec<f64> = order.iter().map(|idx| nodes[*idx].value).collect();
    let rects = squarify(&values, rect);

    for (slot, node_idx) in order.iter().enumerate() {
        let node = &nodes[*node_idx];
        let tile_rect = rects[slot];
        let color = inherited_color.unwrap_or_else(|| branch_color(*node_idx));
        let percent = safe_div(node.value, parent_total) * 100.0;
        let is_leaf = node.children.is_empty();

        tiles.push(TreemapTile {
            rect: tile_rect,
            label: node.label.clone(),
            text: tile_text(&node.label, node.value, percent),
            hover: hover_text(&node.label, node.value, percent),
            color: color.to_string(),
            depth,
            is_leaf,
        });

        if !is_leaf {
            let inner = Rect {
                x: tile_rect.x + BRANCH_PADDING,
                y: tile_rect.y + BRANCH_HEADER,
                width: tile_rect.width - 2.0 * BRANCH_PADDING,
                height: tile_rect.height - BRANCH_HEADER - BRANCH_PADDING,
            };
            layout_nodes(&node.children, inner, depth + 1, node.value, Some(color), tiles);
        }
    }
}

/// Squarified layout (worst-aspect-ratio row packing). `values` must be
/// sorted descending and strictly positive; returns one rect per value in
/// the same order, all inside `rect`.
fn squarify(values: &[f64], rect: Rect) -> Vec<Rect> {
    let total: f64 = values.iter().sum();
    if total <= 0.0 || rect.area() <= 0.0 {
        return values.iter().map(|_| Rect::default()).collect();
    }
    let scale = rect.area() / total;

    let mut result = Vec::with_capacity(values.len());
    let mut free = rect;
    let mut row: Vec<f64> = Vec::new();
    let mut i = 0;
    while i < values.len() {
        let area = values[i] * scale;
        let side = free.width.min(free.height);
        if row.is_empty() || worst_ratio(&row, Some(area), side) <= worst_ratio(&row, None, side) {
            row.push(area);
            i += 1;
        } else {
            lay_row(&row, &mut free, &mut result);
            row.clear();
        }
    }
    if !row.is_empty() {
        lay_row(&row, &mut free, &mut result);
    }
    result
}

/// Worst tile aspect ratio of `row` (optionally extended by one area)
/// when laid along a side of the given length.
fn worst_ratio(row: &[f64], extra: Option<f64>, side: f64) -> f64 {
    let sum: f64 = row.iter().sum::<f64>() + extra.unwrap_or(0.0);
    if sum <= 0.0 || side <= 0.0 {
        return f64::MAX;
    }
    let thickness = sum / side;
    row.iter()
        .copied()
        .chain(extra)
        .map(|area| {
            let length = area / thickness;
            if length <= 0.0 {
                f64::MAX
            } else {
                (thickness / length).max(length / thickness)
            }
        })
        .fold(0.0_f64, f64::max)
}

fn lay_row(row: &[f64], free: &mut Rect, out: &mut Vec<Rect>) {
    let sum: f64 = row.iter().sum();
    if free.width >= free.height {
        // Vertical strip on the left edge, tiles stacked downwards.
        let strip = safe_div(sum, free.height);
        let mut y = free.y;
        for area in row {
            let height = safe_div(*area, strip);
            out.push(Rect {
                x: free.x,
                y,
                width: strip,
                height,
            });
            y += height;
        }
        free.x += strip;
        free.width -= strip;
    } else {
        // Horizontal strip on the top edge, tiles left to right.
        let strip = safe_div(sum, free.width);
        let mut x = free.x;
        for area in row {
            let width = safe_div(*area, strip);
            out.push(Rect {
                x,
                y: free.y,
                width,
                height: strip,
            });
            x += width;
        }
        free.y += strip;
        free.height -= strip;
    }
}

fn safe_div(numerator: f64, denominator: f64) -> f64 {
    if denominator.abs() < f64::EPSILON {
        0.0
    } else {
        numerator / denominator
    }
}

fn tile_text(label: &str, value: f64, percent: f64) -> String {
    format!(
        "{label}\n{}\n{}",
        format_thousands(value),
        format_percent(percent)
    )
}

fn hover_text(label: &str, value: f64, percent: f64) -> String {
    format!(
        "{label}\n매출액: {}원\n비중: {}",
        format_thousands(value),
        format_percent(percent)
    )
}

fn format_percent(percent: f64) -> String {
    format!("{percent:.2}%")
}

/// Round to whole units and group digits: 1234567.4 → "1,234,567".
pub fn format_thousands(value: f64) -> String {
    let rounded = value.round() as i64;
    let digits = rounded.unsigned_abs().to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (pos, ch) in digits.chars().enumerate() {
        if pos > 0 && (digits.len() - pos) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    if rounded < 0 {
        format!("-{grouped}")
    } else {
        grouped
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::usecase::aggregate::AggregatedRow;

    fn aggregated(rows: Vec<(Vec<&str>, f64)>) -> AggregatedTable {
        AggregatedTable {
            hierarchy: vec!["품목명".to_string(), "지역".to_string()],
            value_column: "장부금액".to_string(),
            rows: rows
                .into_iter()
                .map(|(path, total)| AggregatedRow {
                    path: path.into_iter().map(|p| p.to_string()).collect(),
                    total,
                })
                .collect(),
        }
    }

    #[test]
    fn empty_table_yields_no_tiles() {
        let spec = build_treemap(&aggregated(Vec::new()));
        assert!(spec.tiles.is_empty());
        assert_eq!(spec.width, CHART_WIDTH);
    }

    #[test]
    fn single_node_fills_the_plot_area() {
        let spec = build_treemap(&aggregated(vec![(vec!["A"], 15.0)]));

        assert_eq!(spec.tiles.len(), 1);
        let tile = &spec.tiles[0];
        assert_eq!(tile.label, "A");
        assert!(tile.is_leaf);
        assert_eq!(tile.text, "A\n15\n100.00%");
        assert_eq!(tile.hover, "A\n매출액: 15원\n비중: 100.00%");
        assert!((tile.rect.width - (CHART_WIDTH - 20.0)).abs() < 1e-6);
        assert!((tile.rect.height - (CHART_HEIGHT - 40.0)).abs() < 1e-6);
    }

    #[test]
    fn leaf_areas_are_proportional_to_values() {
        let spec = build_treemap(&aggregated(vec![(vec!["A"], 3.0), (vec!["B"], 1.0)]));

        let a = spec.tiles.iter().find(|t| t.label == "A").expect("A tile");
        let b = spec.tiles.iter().find(|t| t.label == "B").expect("B tile");
        let ratio = a.rect.area() / b.rect.area();
        assert!((ratio - 3.0).abs() < 1e-6, "area ratio should be 3, got {ratio}");
    }

    #[test]
    fn all_tiles_stay_inside_the_viewport() {
        let spec = build_treemap(&aggregated(vec![
            (vec!["A", "north"], 7.0),
            (vec!["A", "south"], 2.0),
            (vec!["B", "north"], 5.0),
            (vec!["C", "west"], 1.0),
            (vec!["C", "east"], 11.0),
        ]));

        let margin = spec.margin;
        for tile in &spec.tiles {
            assert!(tile.rect.x >= margin.left - 1e-6, "{tile:?}");
            assert!(tile.rect.y >= margin.top - 1e-6, "{tile:?}");
            assert!(
                tile.rect.x + tile.rect.width <= spec.width - margin.right + 1e-6,
                "{tile:?}"
            );
            assert!(
                tile.rect.y + tile.rect.height <= spec.height - margin.bottom + 1e-6,
                "{tile:?}"
            );
        }
    }

    #[test]
    fn branches_sum_children_and_children_use_parent_percent() {
        let spec = build_treemap(&aggregated(vec![
            (vec!["A", "north"], 2.0),
            (vec!["A", "south"], 2.0),
            (vec!["B", "west"], 4.0),
        ]));

        let branch_a = spec
            .tiles
            .iter()
            .find(|t| t.label == "A" && !t.is_leaf)
            .expect("branch A");
        assert_eq!(branch_a.text, "A\n4\n50.00%");

        let north = spec
            .tiles
            .iter()
            .find(|t| t.label == "north")
            .expect("leaf north");
        assert_eq!(north.depth, 1);
        assert_eq!(north.text, "north\n2\n50.00%");
        assert_eq!(north.color, branch_a.color);
    }

    #[test]
    fn top_level_branches_get_distinct_palette_colors() {
        let spec = build_treemap(&aggregated(vec![
            (vec!["A", "x"], 1.0),
            (vec!["B", "y"], 2.0),
            (vec!["C", "z"], 3.0),
        ]));

        let mut colors: Vec<&str> = spec
            .tiles
            .iter()
            .filter(|t| t.depth == 0)
            .map(|t| t.color.as_str())
            .collect();
        colors.sort_unstable();
        colors.dedup();
        assert_eq!(colors.len(), 3, "three branches, three colors");
    }

    #[test]
    fn squarify_preserves_total_area_and_order() {
        let rect = Rect {
            x: 0.0,
            y: 0.0,
            width: 100.0,
            height: 60.0,
        };
        let rects = squarify(&[6.0, 3.0, 2.0, 1.0], rect);

        assert_eq!(rects.len(), 4);
        let total: f64 = rects.iter().map(Rect::area).sum();
        assert!((total - rect.area()).abs() < 1e-6);
        assert!(rects[0].area() > rects[3].area());
    }

    #[test]
    fn formats_values_with_thousands_separators() {
        assert_eq!(format_thousands(0.0), "0");
        assert_eq!(format_thousands(999.0), "999");
        assert_eq!(format_thousands(1000.0), "1,000");
        assert_eq!(format_thousands(1_234_567.4), "1,234,567");
        assert_eq!(format_thousands(-12_345.0), "-12,345");
    }
}
