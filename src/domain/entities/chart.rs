/// Axis-aligned tile rectangle in chart coordinates (origin top-left).
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub fn area(&self) -> f64 {
        self.width * self.height
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Margin {
    pub top: f64,
    pub left: f64,
    pub right: f64,
    pub bottom: f64,
}

/// One drawable tile of the treemap. Branch tiles keep a header band on
/// top of their children; leaves are fully filled.
#[derive(Debug, Clone, PartialEq)]
pub struct TreemapTile {
    pub rect: Rect,
    /// Innermost hierarchy value for leaves, branch value otherwise.
    pub label: String,
    /// On-tile text: label, value without decimals, percent of parent.
    pub text: String,
    /// Tooltip text: currency-formatted value and percent of parent.
    pub hover: String,
    pub color: String,
    pub depth: usize,
    pub is_leaf: bool,
}

/// Complete chart description handed to the renderer. Pure data: the UI
/// layer only turns tiles into SVG, it never recomputes values.
#[derive(Debug, Clone, PartialEq)]
pub struct TreemapSpec {
    pub width: f64,
    pub height: f64,
    pub margin: Margin,
    pub tiles: Vec<TreemapTile>,
}

/// Fixed qualitative palette (Pastel); assigned per top-level branch,
/// cycled when branches outnumber entries.
pub const PALETTE: [&str; 11] = [
    "#66C5CC", "#F6CF71", "#F89C74", "#DCB0F2", "#87C55F", "#9EB9F3",
    "#FE88B1", "#C9DB74", "#8BE0A4", "#B497E7", "#D3B484",
];

pub fn branch_color(branch_index: usize) -> &'static str {
    PALETTE[branch_index % PALETTE.len()]
}
