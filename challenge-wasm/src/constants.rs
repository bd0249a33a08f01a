/// Front-end presentation constants. Game rules live in `challenge-core`.
pub const CANVAS_ID: &str = "cv";
/// Fraction of the canvas left as margin around the widget.
pub const MARGIN: f64 = 0.04;

pub const BACKGROUND: &str = "#fafafa";
pub const PANEL: &str = "#ffffff";
pub const INK: &str = "#111";
pub const MUTED: &str = "#777";
pub const ACCENT: &str = "#2f6fe0";
pub const GOOD: &str = "#2e9d4f";
pub const BAD: &str = "#d64541";
pub const SELECTED: &str = "#ffe08a";
pub const BUTTON: &str = "#e8eefc";
pub const EMPTY_CELL: &str = "#eceff4";
