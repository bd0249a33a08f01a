/// Fixed categorical palette shared by the canvas and PNG renderers.
/// Colors are stable and cycle by `index % PALETTE.len()`.
pub const PALETTE: [(&str, [u8; 3]); 8] = [
    ("red", [0xe5, 0x3e, 0x3e]),       // 0
    ("orange", [0xf0, 0x8c, 0x1a]),    // 1
    ("gold", [0xf2, 0xc9, 0x1b]),      // 2
    ("green", [0x3c, 0xb3, 0x71]),     // 3
    ("teal", [0x1f, 0x9e, 0x9e]),      // 4
    ("blue", [0x2f, 0x6f, 0xe0]),      // 5
    ("purple", [0x8a, 0x3f, 0xd1]),    // 6
    ("pink", [0xe8, 0x5d, 0xa8]),      // 7
];

/// Background used for empty cells.
pub const EMPTY_RGB: [u8; 3] = [0x1d, 0x21, 0x2b];

pub fn color_name(i: usize) -> &'static str {
    PALETTE[i % PALETTE.len()].0
}

pub fn color_rgb(i: usize) -> [u8; 3] {
    PALETTE[i % PALETTE.len()].1
}

/// CSS hex string (`#rrggbb`) for a palette slot.
pub fn color_hex(i: usize) -> String {
    let [r, g, b] = color_rgb(i);
    format!("#{r:02x}{g:02x}{b:02x}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn palette_cycles() {
        assert_eq!(color_name(0), color_name(PALETTE.len()));
        assert_eq!(color_hex(5), "#2f6fe0");
    }
}
