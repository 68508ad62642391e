//! Conversions between the bulbs' native HSV, standard HSV, RGB, web color
//! names and hex strings.
//!
//! Kasa bulbs speak HSV with hue in degrees `[0, 360]` and saturation and
//! value as percentages `[0, 100]`. The standard model used everywhere else
//! in this crate has hue and saturation in `[0, 1]` and value in `[0, 255]`,
//! so that it lines up with 8 bit RGB.
//!
//! Going from vendor to standard rounds the value, going back truncates every
//! component. Converting back and forth is therefore not a bijection: a
//! component can drift down by one on each round trip.
use std::{fmt, str::FromStr};

use palette::{named, FromColor, Hsv, Srgb};

use crate::error::{Error, Result};

/// Vendor HSV to standard HSV.
pub fn vendor_to_standard(hue: u16, saturation: u16, value: u16) -> (f32, f32, f32) {
    (
        f32::from(hue) / 360.0,
        f32::from(saturation) / 100.0,
        (f32::from(value) / 100.0 * 255.0).round(),
    )
}

/// Standard HSV to vendor HSV, truncating toward zero.
///
/// Negative input is outside the domain and saturates to zero.
pub fn standard_to_vendor(hue: f32, saturation: f32, value: f32) -> (u16, u16, u16) {
    (
        (hue * 360.0) as u16,
        (saturation * 100.0) as u16,
        (value * 100.0 / 255.0) as u16,
    )
}

pub fn hsv_to_rgb(hue: f32, saturation: f32, value: f32) -> (u8, u8, u8) {
    let hsv: Hsv = Hsv::new(hue * 360.0, saturation, value / 255.0);
    let rgb: Srgb = Srgb::from_color(hsv);
    let rgb: Srgb<u8> = rgb.into_format();
    (rgb.red, rgb.green, rgb.blue)
}

pub fn rgb_to_hsv(red: u8, green: u8, blue: u8) -> (f32, f32, f32) {
    let hsv: Hsv = Hsv::from_color(Srgb::new(red, green, blue).into_format::<f32>());
    (
        hsv.hue.into_positive_degrees() / 360.0,
        hsv.saturation,
        hsv.value * 255.0,
    )
}

/// Exact web color name for an RGB value.
pub fn rgb_to_name(red: u8, green: u8, blue: u8) -> Result<&'static str> {
    NAMES
        .iter()
        .find(|(_, rgb)| (rgb.red, rgb.green, rgb.blue) == (red, green, blue))
        .map(|(name, _)| *name)
        .ok_or(Error::UnknownColorName(red, green, blue))
}

pub fn name_to_rgb(name: &str) -> Result<(u8, u8, u8)> {
    let normalized: String = name
        .chars()
        .filter(|c| !c.is_whitespace())
        .collect::<String>()
        .to_ascii_lowercase();
    named::from_str(&normalized)
        .map(|rgb| (rgb.red, rgb.green, rgb.blue))
        .ok_or_else(|| Error::InvalidColorSpec(format!("unknown color name '{}'", name)))
}

/// Parse `#RRGGBB` or `#RGB`, the hash being optional.
pub fn hex_to_rgb(hex: &str) -> Result<(u8, u8, u8)> {
    let digits = hex.trim().trim_start_matches('#');
    let invalid = || Error::InvalidColorSpec(format!("malformed hex color '{}'", hex));

    if !digits.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(invalid());
    }

    let channel = |s: &str| u8::from_str_radix(s, 16).map_err(|_| invalid());
    match digits.len() {
        3 => Ok((
            channel(&digits[0..1])? * 17,
            channel(&digits[1..2])? * 17,
            channel(&digits[2..3])? * 17,
        )),
        6 => Ok((
            channel(&digits[0..2])?,
            channel(&digits[2..4])?,
            channel(&digits[4..6])?,
        )),
        _ => Err(invalid()),
    }
}

pub fn hsv_to_name(hue: f32, saturation: f32, value: f32) -> Result<&'static str> {
    let (red, green, blue) = hsv_to_rgb(hue, saturation, value);
    rgb_to_name(red, green, blue)
}

pub fn name_to_hsv(name: &str) -> Result<(f32, f32, f32)> {
    let (red, green, blue) = name_to_rgb(name)?;
    Ok(rgb_to_hsv(red, green, blue))
}

pub fn hex_to_hsv(hex: &str) -> Result<(f32, f32, f32)> {
    let (red, green, blue) = hex_to_rgb(hex)?;
    Ok(rgb_to_hsv(red, green, blue))
}

/// An 8 bit RGB color, convertible to standard and vendor HSV.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Color {
    red: u8,
    green: u8,
    blue: u8,
}

impl Color {
    pub const BLACK: Color = Color::new(0, 0, 0);
    pub const WHITE: Color = Color::new(255, 255, 255);

    pub const fn new(red: u8, green: u8, blue: u8) -> Self {
        Self { red, green, blue }
    }

    pub fn from_hsv(hue: f32, saturation: f32, value: f32) -> Self {
        let (red, green, blue) = hsv_to_rgb(hue, saturation, value);
        Self::new(red, green, blue)
    }

    pub fn from_vendor_hsv(hue: u16, saturation: u16, value: u16) -> Self {
        let (h, s, v) = vendor_to_standard(hue, saturation, value);
        Self::from_hsv(h, s, v)
    }

    pub fn from_name(name: &str) -> Result<Self> {
        let (red, green, blue) = name_to_rgb(name)?;
        Ok(Self::new(red, green, blue))
    }

    pub fn from_hex(hex: &str) -> Result<Self> {
        let (red, green, blue) = hex_to_rgb(hex)?;
        Ok(Self::new(red, green, blue))
    }

    pub fn red(&self) -> u8 {
        self.red
    }

    pub fn green(&self) -> u8 {
        self.green
    }

    pub fn blue(&self) -> u8 {
        self.blue
    }

    pub fn rgb(&self) -> (u8, u8, u8) {
        (self.red, self.green, self.blue)
    }

    /// Standard HSV: hue and saturation in `[0, 1]`, value in `[0, 255]`
    pub fn hsv(&self) -> (f32, f32, f32) {
        rgb_to_hsv(self.red, self.green, self.blue)
    }

    pub fn vendor_hsv(&self) -> (u16, u16, u16) {
        let (h, s, v) = self.hsv();
        standard_to_vendor(h, s, v)
    }

    pub fn name(&self) -> Result<&'static str> {
        rgb_to_name(self.red, self.green, self.blue)
    }

    pub fn hex(&self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.red, self.green, self.blue)
    }

    pub fn is_black(&self) -> bool {
        *self == Color::BLACK
    }

    pub fn summary(&self) -> ColorSummary {
        let (hue, saturation, value) = self.hsv();
        ColorSummary {
            red: self.red,
            green: self.green,
            blue: self.blue,
            hue,
            saturation,
            value,
            hex: self.hex(),
            name: self.name().ok(),
        }
    }
}

impl FromStr for Color {
    type Err = Error;

    /// A web color name, or a hex color
    fn from_str(s: &str) -> Result<Self> {
        Color::from_name(s).or_else(|_| Color::from_hex(s))
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self.name() {
            Ok(name) => f.write_str(name),
            Err(_) => f.write_str(&self.hex()),
        }
    }
}

impl From<(u8, u8, u8)> for Color {
    fn from((red, green, blue): (u8, u8, u8)) -> Self {
        Self::new(red, green, blue)
    }
}

/// Every representation of a color at once, for snapshots
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ColorSummary {
    pub red: u8,
    pub green: u8,
    pub blue: u8,
    pub hue: f32,
    pub saturation: f32,
    pub value: f32,
    pub hex: String,
    pub name: Option<&'static str>,
}

// Reverse lookup table. Where several names share a value only one is listed:
// aqua not cyan, fuchsia not magenta, gray not grey.
const NAMES: &[(&str, Srgb<u8>)] = &[
    ("aliceblue", named::ALICEBLUE),
    ("antiquewhite", named::ANTIQUEWHITE),
    ("aqua", named::AQUA),
    ("aquamarine", named::AQUAMARINE),
    ("azure", named::AZURE),
    ("beige", named::BEIGE),
    ("bisque", named::BISQUE),
    ("black", named::BLACK),
    ("blanchedalmond", named::BLANCHEDALMOND),
    ("blue", named::BLUE),
    ("blueviolet", named::BLUEVIOLET),
    ("brown", named::BROWN),
    ("burlywood", named::BURLYWOOD),
    ("cadetblue", named::CADETBLUE),
    ("chartreuse", named::CHARTREUSE),
    ("chocolate", named::CHOCOLATE),
    ("coral", named::CORAL),
    ("cornflowerblue", named::CORNFLOWERBLUE),
    ("cornsilk", named::CORNSILK),
    ("crimson", named::CRIMSON),
    ("darkblue", named::DARKBLUE),
    ("darkcyan", named::DARKCYAN),
    ("darkgoldenrod", named::DARKGOLDENROD),
    ("darkgray", named::DARKGRAY),
    ("darkgreen", named::DARKGREEN),
    ("darkkhaki", named::DARKKHAKI),
    ("darkmagenta", named::DARKMAGENTA),
    ("darkolivegreen", named::DARKOLIVEGREEN),
    ("darkorange", named::DARKORANGE),
    ("darkorchid", named::DARKORCHID),
    ("darkred", named::DARKRED),
    ("darksalmon", named::DARKSALMON),
    ("darkseagreen", named::DARKSEAGREEN),
    ("darkslateblue", named::DARKSLATEBLUE),
    ("darkslategray", named::DARKSLATEGRAY),
    ("darkturquoise", named::DARKTURQUOISE),
    ("darkviolet", named::DARKVIOLET),
    ("deeppink", named::DEEPPINK),
    ("deepskyblue", named::DEEPSKYBLUE),
    ("dimgray", named::DIMGRAY),
    ("dodgerblue", named::DODGERBLUE),
    ("firebrick", named::FIREBRICK),
    ("floralwhite", named::FLORALWHITE),
    ("forestgreen", named::FORESTGREEN),
    ("fuchsia", named::FUCHSIA),
    ("gainsboro", named::GAINSBORO),
    ("ghostwhite", named::GHOSTWHITE),
    ("gold", named::GOLD),
    ("goldenrod", named::GOLDENROD),
    ("gray", named::GRAY),
    ("green", named::GREEN),
    ("greenyellow", named::GREENYELLOW),
    ("honeydew", named::HONEYDEW),
    ("hotpink", named::HOTPINK),
    ("indianred", named::INDIANRED),
    ("indigo", named::INDIGO),
    ("ivory", named::IVORY),
    ("khaki", named::KHAKI),
    ("lavender", named::LAVENDER),
    ("lavenderblush", named::LAVENDERBLUSH),
    ("lawngreen", named::LAWNGREEN),
    ("lemonchiffon", named::LEMONCHIFFON),
    ("lightblue", named::LIGHTBLUE),
    ("lightcoral", named::LIGHTCORAL),
    ("lightcyan", named::LIGHTCYAN),
    ("lightgoldenrodyellow", named::LIGHTGOLDENRODYELLOW),
    ("lightgray", named::LIGHTGRAY),
    ("lightgreen", named::LIGHTGREEN),
    ("lightpink", named::LIGHTPINK),
    ("lightsalmon", named::LIGHTSALMON),
    ("lightseagreen", named::LIGHTSEAGREEN),
    ("lightskyblue", named::LIGHTSKYBLUE),
    ("lightslategray", named::LIGHTSLATEGRAY),
    ("lightsteelblue", named::LIGHTSTEELBLUE),
    ("lightyellow", named::LIGHTYELLOW),
    ("lime", named::LIME),
    ("limegreen", named::LIMEGREEN),
    ("linen", named::LINEN),
    ("maroon", named::MAROON),
    ("mediumaquamarine", named::MEDIUMAQUAMARINE),
    ("mediumblue", named::MEDIUMBLUE),
    ("mediumorchid", named::MEDIUMORCHID),
    ("mediumpurple", named::MEDIUMPURPLE),
    ("mediumseagreen", named::MEDIUMSEAGREEN),
    ("mediumslateblue", named::MEDIUMSLATEBLUE),
    ("mediumspringgreen", named::MEDIUMSPRINGGREEN),
    ("mediumturquoise", named::MEDIUMTURQUOISE),
    ("mediumvioletred", named::MEDIUMVIOLETRED),
    ("midnightblue", named::MIDNIGHTBLUE),
    ("mintcream", named::MINTCREAM),
    ("mistyrose", named::MISTYROSE),
    ("moccasin", named::MOCCASIN),
    ("navajowhite", named::NAVAJOWHITE),
    ("navy", named::NAVY),
    ("oldlace", named::OLDLACE),
    ("olive", named::OLIVE),
    ("olivedrab", named::OLIVEDRAB),
    ("orange", named::ORANGE),
    ("orangered", named::ORANGERED),
    ("orchid", named::ORCHID),
    ("palegoldenrod", named::PALEGOLDENROD),
    ("palegreen", named::PALEGREEN),
    ("paleturquoise", named::PALETURQUOISE),
    ("palevioletred", named::PALEVIOLETRED),
    ("papayawhip", named::PAPAYAWHIP),
    ("peachpuff", named::PEACHPUFF),
    ("peru", named::PERU),
    ("pink", named::PINK),
    ("plum", named::PLUM),
    ("powderblue", named::POWDERBLUE),
    ("purple", named::PURPLE),
    ("red", named::RED),
    ("rosybrown", named::ROSYBROWN),
    ("royalblue", named::ROYALBLUE),
    ("saddlebrown", named::SADDLEBROWN),
    ("salmon", named::SALMON),
    ("sandybrown", named::SANDYBROWN),
    ("seagreen", named::SEAGREEN),
    ("seashell", named::SEASHELL),
    ("sienna", named::SIENNA),
    ("silver", named::SILVER),
    ("skyblue", named::SKYBLUE),
    ("slateblue", named::SLATEBLUE),
    ("slategray", named::SLATEGRAY),
    ("snow", named::SNOW),
    ("springgreen", named::SPRINGGREEN),
    ("steelblue", named::STEELBLUE),
    ("tan", named::TAN),
    ("teal", named::TEAL),
    ("thistle", named::THISTLE),
    ("tomato", named::TOMATO),
    ("turquoise", named::TURQUOISE),
    ("violet", named::VIOLET),
    ("wheat", named::WHEAT),
    ("white", named::WHITE),
    ("whitesmoke", named::WHITESMOKE),
    ("yellow", named::YELLOW),
    ("yellowgreen", named::YELLOWGREEN),
];
