use anyhow::Result;
use once_cell::sync::Lazy;
use plotters::style::RGBColor;
use std::collections::HashMap;

use crate::commons::error::MemeMapError;

/// X11 base colours; families marked `true` also have numbered variants 1-4
/// derived from the base value
const X11_COLORS: &[(&str, (u8, u8, u8), bool)] = &[
    ("white", (255, 255, 255), false),
    ("black", (0, 0, 0), false),
    ("red", (255, 0, 0), true),
    ("green", (0, 255, 0), true),
    ("blue", (0, 0, 255), true),
    ("yellow", (255, 255, 0), true),
    ("cyan", (0, 255, 255), true),
    ("magenta", (255, 0, 255), true),
    ("orange", (255, 165, 0), true),
    ("darkorange", (255, 127, 0), true),
    ("gold", (255, 215, 0), true),
    ("tomato", (255, 99, 71), true),
    ("firebrick", (255, 48, 48), true),
    ("brown", (255, 64, 64), true),
    ("orchid", (255, 131, 250), true),
    ("purple", (155, 48, 255), true),
    ("maroon", (255, 52, 179), true),
    ("pink", (255, 181, 197), true),
    ("hotpink", (255, 110, 180), true),
    ("deeppink", (255, 20, 147), true),
    ("springgreen", (0, 255, 127), true),
    ("seagreen", (84, 255, 159), true),
    ("chartreuse", (127, 255, 0), true),
    ("olivedrab", (192, 255, 62), true),
    ("darkolivegreen", (202, 255, 112), true),
    ("palegreen", (154, 255, 154), true),
    ("turquoise", (0, 245, 255), true),
    ("steelblue", (99, 184, 255), true),
    ("royalblue", (72, 118, 255), true),
    ("dodgerblue", (30, 144, 255), true),
    ("deepskyblue", (0, 191, 255), true),
    ("skyblue", (135, 206, 255), true),
    ("slateblue", (131, 111, 255), true),
    ("navyblue", (0, 0, 128), false),
    ("navy", (0, 0, 128), false),
    ("khaki", (255, 246, 143), true),
    ("tan", (255, 165, 79), true),
    ("sienna", (255, 130, 71), true),
    ("salmon", (255, 140, 105), true),
    ("coral", (255, 114, 86), true),
    ("wheat", (255, 231, 186), true),
    ("forestgreen", (34, 139, 34), false),
    ("darkgreen", (0, 100, 0), false),
    ("limegreen", (50, 205, 50), false),
    ("violet", (238, 130, 238), false),
    ("beige", (245, 245, 220), false),
    ("lightgrey", (211, 211, 211), false),
    ("lightgray", (211, 211, 211), false),
    ("darkgrey", (169, 169, 169), false),
    ("darkgray", (169, 169, 169), false),
    ("grey", (190, 190, 190), false),
    ("gray", (190, 190, 190), false),
];

/// X11 shading of variants 1-4
const VARIANT_LEVELS: [u32; 4] = [255, 238, 205, 139];

static NAMED_COLORS: Lazy<HashMap<String, RGBColor>> = Lazy::new(|| {
    let mut colors = HashMap::new();
    for &(name, (r, g, b), numbered) in X11_COLORS {
        colors.insert(name.to_string(), RGBColor(r, g, b));
        if numbered {
            for (i, level) in VARIANT_LEVELS.iter().enumerate() {
                colors.insert(
                    format!("{}{}", name, i + 1),
                    RGBColor(shade(r, *level), shade(g, *level), shade(b, *level)),
                );
            }
        }
    }
    for i in 0..=100u32 {
        let v = ((i * 255 + 50) / 100) as u8;
        colors.insert(format!("grey{}", i), RGBColor(v, v, v));
        colors.insert(format!("gray{}", i), RGBColor(v, v, v));
    }
    colors
});

fn shade(channel: u8, level: u32) -> u8 {
    ((channel as u32 * level + 127) / 255) as u8
}

/// Parse `#rrggbb`, `#rgb` or an X11 colour name (case and spaces ignored)
pub fn parse_color(value: &str) -> Result<RGBColor> {
    let trimmed = value.trim();
    if let Some(hex) = trimmed.strip_prefix('#') {
        return parse_hex(hex).ok_or_else(|| MemeMapError::UnknownColor(value.to_string()).into());
    }

    let key: String = trimmed
        .chars()
        .filter(|c| !c.is_whitespace())
        .collect::<String>()
        .to_ascii_lowercase();
    NAMED_COLORS
        .get(&key)
        .copied()
        .ok_or_else(|| MemeMapError::UnknownColor(value.to_string()).into())
}

fn parse_hex(hex: &str) -> Option<RGBColor> {
    let digits: Vec<u8> = hex
        .chars()
        .map(|c| c.to_digit(16).map(|d| d as u8))
        .collect::<Option<Vec<_>>>()?;
    match digits.as_slice() {
        [r, g, b] => Some(RGBColor(r * 17, g * 17, b * 17)),
        [r1, r2, g1, g2, b1, b2] => Some(RGBColor(r1 * 16 + r2, g1 * 16 + g2, b1 * 16 + b2)),
        _ => None,
    }
}
