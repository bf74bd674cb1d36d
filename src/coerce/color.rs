//! CSS color expressions → normalized RGBA.
//!
//! Accepted forms: `#rgb`, `#rgba`, `#rrggbb`, `#rrggbbaa`, `rgb()`/`rgba()`
//! and `hsl()`/`hsla()` in both comma and space syntax (`rgb(0 0 0 / 50%)`),
//! and the CSS named colors plus `transparent`. Channels are clamped to their
//! CSS ranges.
use once_cell::sync::Lazy;
use regex::Regex;

use crate::error::CoerceError;
use crate::host::Rgba;

static HEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^#([0-9a-fA-F]{3,4}|[0-9a-fA-F]{6}|[0-9a-fA-F]{8})$").expect("hex color regex")
});

static FUNCTIONAL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^(rgba?|hsla?)\(\s*([^()]*?)\s*\)$").expect("functional color regex")
});

pub fn parse_css_color(raw: &str) -> Result<Rgba, CoerceError> {
    let text = raw.trim();
    let invalid = |reason: &str| CoerceError::InvalidColor {
        value: raw.to_string(),
        reason: reason.to_string(),
    };

    if let Some(caps) = HEX.captures(text) {
        return Ok(parse_hex_digits(&caps[1]));
    }
    if text.starts_with('#') {
        return Err(invalid("hex colors need 3, 4, 6 or 8 digits"));
    }
    if let Some(caps) = FUNCTIONAL.captures(text) {
        let func = caps[1].to_ascii_lowercase();
        let args = split_args(&caps[2]);
        if !(3..=4).contains(&args.len()) {
            return Err(invalid("expected 3 or 4 components"));
        }
        let alpha = match args.get(3) {
            Some(a) => parse_alpha(a).ok_or_else(|| invalid("bad alpha component"))?,
            None => 1.0,
        };
        return if func.starts_with("rgb") {
            let mut rgb = [0.0; 3];
            for (slot, arg) in rgb.iter_mut().zip(&args) {
                *slot = parse_rgb_channel(arg).ok_or_else(|| invalid("bad rgb component"))?;
            }
            Ok(Rgba { r: rgb[0] / 255.0, g: rgb[1] / 255.0, b: rgb[2] / 255.0, a: alpha })
        } else {
            let h = parse_hue(args[0]).ok_or_else(|| invalid("bad hue"))?;
            let s = parse_percentage(args[1]).ok_or_else(|| invalid("bad saturation"))?;
            let l = parse_percentage(args[2]).ok_or_else(|| invalid("bad lightness"))?;
            let (r, g, b) = hsl_to_rgb(h, s, l);
            Ok(Rgba { r, g, b, a: alpha })
        };
    }
    named_color(&text.to_ascii_lowercase()).ok_or_else(|| invalid("unrecognized color syntax"))
}

// ------------------------------ Components -------------------------------- //

fn parse_hex_digits(digits: &str) -> Rgba {
    let nibble = |i: usize| u8::from_str_radix(&digits[i..i + 1], 16).unwrap_or(0) as f64 * 17.0;
    let byte = |i: usize| u8::from_str_radix(&digits[i..i + 2], 16).unwrap_or(0) as f64;
    let (r, g, b, a) = match digits.len() {
        3 => (nibble(0), nibble(1), nibble(2), 255.0),
        4 => (nibble(0), nibble(1), nibble(2), nibble(3)),
        6 => (byte(0), byte(2), byte(4), 255.0),
        _ => (byte(0), byte(2), byte(4), byte(6)),
    };
    Rgba { r: r / 255.0, g: g / 255.0, b: b / 255.0, a: a / 255.0 }
}

/// Comma syntax splits on commas; space syntax splits on whitespace and `/`.
fn split_args(inner: &str) -> Vec<&str> {
    if inner.contains(',') {
        inner.split(',').map(str::trim).collect()
    } else {
        inner
            .split(|c: char| c.is_whitespace() || c == '/')
            .filter(|s| !s.is_empty())
            .collect()
    }
}

fn parse_number(s: &str) -> Option<f64> {
    let n: f64 = s.trim().parse().ok()?;
    n.is_finite().then_some(n)
}

/// `0..=255` or a percentage of 255.
fn parse_rgb_channel(s: &str) -> Option<f64> {
    let v = match s.strip_suffix('%') {
        Some(pct) => parse_number(pct)? / 100.0 * 255.0,
        None => parse_number(s)?,
    };
    Some(v.clamp(0.0, 255.0))
}

/// `0..=1` or a percentage.
fn parse_alpha(s: &str) -> Option<f64> {
    let v = match s.strip_suffix('%') {
        Some(pct) => parse_number(pct)? / 100.0,
        None => parse_number(s)?,
    };
    Some(v.clamp(0.0, 1.0))
}

fn parse_percentage(s: &str) -> Option<f64> {
    let v = parse_number(s.strip_suffix('%').unwrap_or(s))?;
    Some((v / 100.0).clamp(0.0, 1.0))
}

fn parse_hue(s: &str) -> Option<f64> {
    let v = parse_number(s.strip_suffix("deg").unwrap_or(s))?;
    Some(v.rem_euclid(360.0))
}

fn hsl_to_rgb(h: f64, s: f64, l: f64) -> (f64, f64, f64) {
    if s == 0.0 {
        return (l, l, l);
    }
    let q = if l < 0.5 { l * (1.0 + s) } else { l + s - l * s };
    let p = 2.0 * l - q;
    let hue = h / 360.0;
    let channel = |t: f64| {
        let t = t.rem_euclid(1.0);
        if t < 1.0 / 6.0 {
            p + (q - p) * 6.0 * t
        } else if t < 0.5 {
            q
        } else if t < 2.0 / 3.0 {
            p + (q - p) * (2.0 / 3.0 - t) * 6.0
        } else {
            p
        }
    };
    (channel(hue + 1.0 / 3.0), channel(hue), channel(hue - 1.0 / 3.0))
}

/// CSS named colors, sorted by name.
static NAMED_COLORS: &[(&str, u32)] = &[
    ("aliceblue", 0xf0f8ff),
    ("antiquewhite", 0xfaebd7),
    ("aqua", 0x00ffff),
    ("aquamarine", 0x7fffd4),
    ("azure", 0xf0ffff),
    ("beige", 0xf5f5dc),
    ("bisque", 0xffe4c4),
    ("black", 0x000000),
    ("blanchedalmond", 0xffebcd),
    ("blue", 0x0000ff),
    ("blueviolet", 0x8a2be2),
    ("brown", 0xa52a2a),
    ("burlywood", 0xdeb887),
    ("cadetblue", 0x5f9ea0),
    ("chartreuse", 0x7fff00),
    ("chocolate", 0xd2691e),
    ("coral", 0xff7f50),
    ("cornflowerblue", 0x6495ed),
    ("cornsilk", 0xfff8dc),
    ("crimson", 0xdc143c),
    ("cyan", 0x00ffff),
    ("darkblue", 0x00008b),
    ("darkcyan", 0x008b8b),
    ("darkgoldenrod", 0xb8860b),
    ("darkgray", 0xa9a9a9),
    ("darkgreen", 0x006400),
    ("darkgrey", 0xa9a9a9),
    ("darkkhaki", 0xbdb76b),
    ("darkmagenta", 0x8b008b),
    ("darkolivegreen", 0x556b2f),
    ("darkorange", 0xff8c00),
    ("darkorchid", 0x9932cc),
    ("darkred", 0x8b0000),
    ("darksalmon", 0xe9967a),
    ("darkseagreen", 0x8fbc8f),
    ("darkslateblue", 0x483d8b),
    ("darkslategray", 0x2f4f4f),
    ("darkslategrey", 0x2f4f4f),
    ("darkturquoise", 0x00ced1),
    ("darkviolet", 0x9400d3),
    ("deeppink", 0xff1493),
    ("deepskyblue", 0x00bfff),
    ("dimgray", 0x696969),
    ("dimgrey", 0x696969),
    ("dodgerblue", 0x1e90ff),
    ("firebrick", 0xb22222),
    ("floralwhite", 0xfffaf0),
    ("forestgreen", 0x228b22),
    ("fuchsia", 0xff00ff),
    ("gainsboro", 0xdcdcdc),
    ("ghostwhite", 0xf8f8ff),
    ("gold", 0xffd700),
    ("goldenrod", 0xdaa520),
    ("gray", 0x808080),
    ("green", 0x008000),
    ("greenyellow", 0xadff2f),
    ("grey", 0x808080),
    ("honeydew", 0xf0fff0),
    ("hotpink", 0xff69b4),
    ("indianred", 0xcd5c5c),
    ("indigo", 0x4b0082),
    ("ivory", 0xfffff0),
    ("khaki", 0xf0e68c),
    ("lavender", 0xe6e6fa),
    ("lavenderblush", 0xfff0f5),
    ("lawngreen", 0x7cfc00),
    ("lemonchiffon", 0xfffacd),
    ("lightblue", 0xadd8e6),
    ("lightcoral", 0xf08080),
    ("lightcyan", 0xe0ffff),
    ("lightgoldenrodyellow", 0xfafad2),
    ("lightgray", 0xd3d3d3),
    ("lightgreen", 0x90ee90),
    ("lightgrey", 0xd3d3d3),
    ("lightpink", 0xffb6c1),
    ("lightsalmon", 0xffa07a),
    ("lightseagreen", 0x20b2aa),
    ("lightskyblue", 0x87cefa),
    ("lightslategray", 0x778899),
    ("lightslategrey", 0x778899),
    ("lightsteelblue", 0xb0c4de),
    ("lightyellow", 0xffffe0),
    ("lime", 0x00ff00),
    ("limegreen", 0x32cd32),
    ("linen", 0xfaf0e6),
    ("magenta", 0xff00ff),
    ("maroon", 0x800000),
    ("mediumaquamarine", 0x66cdaa),
    ("mediumblue", 0x0000cd),
    ("mediumorchid", 0xba55d3),
    ("mediumpurple", 0x9370db),
    ("mediumseagreen", 0x3cb371),
    ("mediumslateblue", 0x7b68ee),
    ("mediumspringgreen", 0x00fa9a),
    ("mediumturquoise", 0x48d1cc),
    ("mediumvioletred", 0xc71585),
    ("midnightblue", 0x191970),
    ("mintcream", 0xf5fffa),
    ("mistyrose", 0xffe4e1),
    ("moccasin", 0xffe4b5),
    ("navajowhite", 0xffdead),
    ("navy", 0x000080),
    ("oldlace", 0xfdf5e6),
    ("olive", 0x808000),
    ("olivedrab", 0x6b8e23),
    ("orange", 0xffa500),
    ("orangered", 0xff4500),
    ("orchid", 0xda70d6),
    ("palegoldenrod", 0xeee8aa),
    ("palegreen", 0x98fb98),
    ("paleturquoise", 0xafeeee),
    ("palevioletred", 0xdb7093),
    ("papayawhip", 0xffefd5),
    ("peachpuff", 0xffdab9),
    ("peru", 0xcd853f),
    ("pink", 0xffc0cb),
    ("plum", 0xdda0dd),
    ("powderblue", 0xb0e0e6),
    ("purple", 0x800080),
    ("rebeccapurple", 0x663399),
    ("red", 0xff0000),
    ("rosybrown", 0xbc8f8f),
    ("royalblue", 0x4169e1),
    ("saddlebrown", 0x8b4513),
    ("salmon", 0xfa8072),
    ("sandybrown", 0xf4a460),
    ("seagreen", 0x2e8b57),
    ("seashell", 0xfff5ee),
    ("sienna", 0xa0522d),
    ("silver", 0xc0c0c0),
    ("skyblue", 0x87ceeb),
    ("slateblue", 0x6a5acd),
    ("slategray", 0x708090),
    ("slategrey", 0x708090),
    ("snow", 0xfffafa),
    ("springgreen", 0x00ff7f),
    ("steelblue", 0x4682b4),
    ("tan", 0xd2b48c),
    ("teal", 0x008080),
    ("thistle", 0xd8bfd8),
    ("tomato", 0xff6347),
    ("turquoise", 0x40e0d0),
    ("violet", 0xee82ee),
    ("wheat", 0xf5deb3),
    ("white", 0xffffff),
    ("whitesmoke", 0xf5f5f5),
    ("yellow", 0xffff00),
    ("yellowgreen", 0x9acd32),
];

fn named_color(name: &str) -> Option<Rgba> {
    if name == "transparent" {
        return Some(Rgba { r: 0.0, g: 0.0, b: 0.0, a: 0.0 });
    }
    let index = NAMED_COLORS.binary_search_by(|(n, _)| n.cmp(&name)).ok()?;
    let rgb = NAMED_COLORS[index].1;
    let channel = |shift: u32| ((rgb >> shift) & 0xff) as f64 / 255.0;
    Some(Rgba { r: channel(16), g: channel(8), b: channel(0), a: 1.0 })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rgb8(c: &Rgba) -> (u8, u8, u8) {
        ((c.r * 255.0).round() as u8, (c.g * 255.0).round() as u8, (c.b * 255.0).round() as u8)
    }

    #[test]
    fn hex_forms_reconstruct_channels() {
        assert_eq!(rgb8(&parse_css_color("#1a2b3c").unwrap()), (0x1a, 0x2b, 0x3c));
        assert_eq!(rgb8(&parse_css_color("#FFF").unwrap()), (255, 255, 255));
        let c = parse_css_color("#00ff0080").unwrap();
        assert_eq!(rgb8(&c), (0, 255, 0));
        assert!((c.a - 128.0 / 255.0).abs() < 1e-12);
        let c = parse_css_color("#f008").unwrap();
        assert_eq!(rgb8(&c), (255, 0, 0));
        assert!((c.a - 136.0 / 255.0).abs() < 1e-12);
    }

    #[test]
    fn every_byte_round_trips_through_hex() {
        for v in 0..=255u8 {
            let c = parse_css_color(&format!("#{v:02x}{v:02x}{v:02x}")).unwrap();
            assert_eq!(rgb8(&c), (v, v, v));
            assert!((0.0..=1.0).contains(&c.r));
        }
    }

    #[test]
    fn functional_rgb_syntaxes() {
        let c = parse_css_color("rgb(12, 34, 56)").unwrap();
        assert_eq!(rgb8(&c), (12, 34, 56));
        assert_eq!(c.a, 1.0);

        let c = parse_css_color("rgba(255, 128, 0, 0.25)").unwrap();
        assert_eq!(rgb8(&c), (255, 128, 0));
        assert_eq!(c.a, 0.25);

        let c = parse_css_color("rgb(10 20 30 / 50%)").unwrap();
        assert_eq!(rgb8(&c), (10, 20, 30));
        assert_eq!(c.a, 0.5);

        let c = parse_css_color("RGB(100%, 0%, 300)").unwrap();
        assert_eq!(rgb8(&c), (255, 0, 255));
    }

    #[test]
    fn hsl_and_named() {
        assert_eq!(rgb8(&parse_css_color("hsl(0, 100%, 50%)").unwrap()), (255, 0, 0));
        assert_eq!(rgb8(&parse_css_color("hsl(120deg 100% 25%)").unwrap()), (0, 128, 0));
        assert_eq!(rgb8(&parse_css_color("hsla(240, 100%, 50%, 0.5)").unwrap()), (0, 0, 255));
        assert_eq!(rgb8(&parse_css_color("hsl(0, 0%, 50%)").unwrap()), (128, 128, 128));
        assert_eq!(parse_css_color("transparent").unwrap().a, 0.0);
        assert_eq!(rgb8(&parse_css_color("White").unwrap()), (255, 255, 255));
    }

    #[test]
    fn full_named_color_table() {
        assert_eq!(rgb8(&parse_css_color("orange").unwrap()), (255, 165, 0));
        assert_eq!(rgb8(&parse_css_color("purple").unwrap()), (128, 0, 128));
        assert_eq!(rgb8(&parse_css_color("RebeccaPurple").unwrap()), (0x66, 0x33, 0x99));
        assert_eq!(rgb8(&parse_css_color("aliceblue").unwrap()), (0xf0, 0xf8, 0xff));
        assert_eq!(rgb8(&parse_css_color("yellowgreen").unwrap()), (0x9a, 0xcd, 0x32));
        assert!(NAMED_COLORS.windows(2).all(|w| w[0].0 < w[1].0));
        assert!(parse_css_color("notacolor").is_err());
    }

    #[test]
    fn malformed_colors_fail() {
        for raw in ["#12", "#12345", "#ggg", "rgb(1, 2)", "rgb(a, b, c)", "rgba(1,2,3,4,5)", "chartreuse-ish", ""] {
            assert!(
                matches!(parse_css_color(raw), Err(CoerceError::InvalidColor { .. })),
                "{raw:?} should fail"
            );
        }
    }
}
