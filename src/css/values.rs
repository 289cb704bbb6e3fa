//! Typed CSS values: lengths, colors and keyword enums.

use std::fmt;

use crate::geometry::SizeF;

// ---------------------------------------------------------------------------
// Length
// ---------------------------------------------------------------------------

/// A CSS length, e.g. `10px`, `50%`, `20vw`, `auto`.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum Length {
    /// Absolute pixels.
    Px(f32),
    /// Percentage of the containing block dimension.
    Percent(f32),
    /// Viewport width percentage.
    Vw(f32),
    /// Viewport height percentage.
    Vh(f32),
    /// Content- or context-based size.
    #[default]
    Auto,
}

impl Length {
    pub const ZERO: Length = Length::Px(0.0);

    pub fn is_auto(&self) -> bool {
        matches!(self, Length::Auto)
    }

    /// Resolve to pixels against `base` (the containing block dimension).
    ///
    /// Returns `None` for `auto`, and for percentages whose base is not
    /// known yet.
    pub fn resolve(&self, base: Option<f32>, viewport: SizeF) -> Option<f32> {
        let value = match *self {
            Length::Px(v) => v,
            Length::Percent(p) => base? * p / 100.0,
            Length::Vw(v) => viewport.width * v / 100.0,
            Length::Vh(v) => viewport.height * v / 100.0,
            Length::Auto => return None,
        };
        value.is_finite().then_some(value)
    }

    /// Like [`Length::resolve`], treating anything unresolvable as zero.
    pub fn resolve_or_zero(&self, base: Option<f32>, viewport: SizeF) -> f32 {
        self.resolve(base, viewport).unwrap_or(0.0)
    }
}

impl fmt::Display for Length {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Length::Px(v) => write!(f, "{v}px"),
            Length::Percent(v) => write!(f, "{v}%"),
            Length::Vw(v) => write!(f, "{v}vw"),
            Length::Vh(v) => write!(f, "{v}vh"),
            Length::Auto => write!(f, "auto"),
        }
    }
}

// ---------------------------------------------------------------------------
// Color
// ---------------------------------------------------------------------------

/// An RGBA color with straight (non-premultiplied) 8-bit channels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub const TRANSPARENT: Color = Color::rgba(0, 0, 0, 0);
    pub const BLACK: Color = Color::rgb(0, 0, 0);
    pub const WHITE: Color = Color::rgb(255, 255, 255);

    #[inline]
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    #[inline]
    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Same color with alpha scaled by `factor` (0..=255).
    #[inline]
    pub fn with_alpha_scaled(self, factor: u8) -> Self {
        Self { a: mul_div_255(self.a, factor), ..self }
    }

    pub fn is_transparent(&self) -> bool {
        self.a == 0
    }

    /// Parse hex digits without the leading `#`: `rgb`, `rgba`, `rrggbb`,
    /// `rrggbbaa`.
    pub fn from_hex(hex: &str) -> Option<Color> {
        let digit = |i: usize| u8::from_str_radix(hex.get(i..i + 1)?, 16).ok();
        let pair = |i: usize| u8::from_str_radix(hex.get(i..i + 2)?, 16).ok();
        match hex.len() {
            3 | 4 => {
                let r = digit(0)? * 17;
                let g = digit(1)? * 17;
                let b = digit(2)? * 17;
                let a = if hex.len() == 4 { digit(3)? * 17 } else { 255 };
                Some(Color::rgba(r, g, b, a))
            }
            6 | 8 => {
                let a = if hex.len() == 8 { pair(6)? } else { 255 };
                Some(Color::rgba(pair(0)?, pair(2)?, pair(4)?, a))
            }
            _ => None,
        }
    }

    /// Look up a CSS color keyword.
    pub fn named(name: &str) -> Option<Color> {
        let color = match name.to_ascii_lowercase().as_str() {
            "transparent" => Color::TRANSPARENT,
            "black" => Color::BLACK,
            "white" => Color::WHITE,
            "red" => Color::rgb(255, 0, 0),
            "green" => Color::rgb(0, 128, 0),
            "lime" => Color::rgb(0, 255, 0),
            "blue" => Color::rgb(0, 0, 255),
            "yellow" => Color::rgb(255, 255, 0),
            "orange" => Color::rgb(255, 165, 0),
            "purple" => Color::rgb(128, 0, 128),
            "gray" | "grey" => Color::rgb(128, 128, 128),
            "silver" => Color::rgb(192, 192, 192),
            "maroon" => Color::rgb(128, 0, 0),
            "navy" => Color::rgb(0, 0, 128),
            "teal" => Color::rgb(0, 128, 128),
            "olive" => Color::rgb(128, 128, 0),
            "aqua" | "cyan" => Color::rgb(0, 255, 255),
            "fuchsia" | "magenta" => Color::rgb(255, 0, 255),
            _ => return None,
        };
        Some(color)
    }
}

/// `a * b / 255` rounded, in integer arithmetic.
#[inline]
pub fn mul_div_255(a: u8, b: u8) -> u8 {
    let t = a as u32 * b as u32 + 128;
    (((t >> 8) + t) >> 8) as u8
}

// ---------------------------------------------------------------------------
// Keywords
// ---------------------------------------------------------------------------

macro_rules! keyword_enum {
    (
        $(#[$meta:meta])*
        pub enum $name:ident { $( $(#[$vmeta:meta])* $variant:ident => $kw:literal ),+ $(,)? }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
        pub enum $name {
            $( $(#[$vmeta])* $variant ),+
        }

        impl $name {
            /// Parse a CSS keyword (case-insensitive).
            pub fn from_keyword(keyword: &str) -> Option<Self> {
                $( if keyword.eq_ignore_ascii_case($kw) { return Some($name::$variant); } )+
                None
            }

            pub fn keyword(&self) -> &'static str {
                match self { $( $name::$variant => $kw ),+ }
            }
        }
    };
}

keyword_enum! {
    /// Which flow algorithm lays out a widget and its children.
    pub enum Display {
        #[default]
        Block => "block",
        InlineBlock => "inline-block",
        Flex => "flex",
        None => "none",
    }
}

keyword_enum! {
    pub enum Position {
        #[default]
        Static => "static",
        Relative => "relative",
        Absolute => "absolute",
    }
}

keyword_enum! {
    pub enum Visibility {
        #[default]
        Visible => "visible",
        Hidden => "hidden",
    }
}

keyword_enum! {
    /// Which box an explicit width/height constrains.
    pub enum BoxSizing {
        #[default]
        ContentBox => "content-box",
        BorderBox => "border-box",
    }
}

keyword_enum! {
    pub enum BorderStyle {
        #[default]
        None => "none",
        Hidden => "hidden",
        Solid => "solid",
        Dashed => "dashed",
        Dotted => "dotted",
    }
}

keyword_enum! {
    pub enum FlexDirection {
        #[default]
        Row => "row",
        Column => "column",
    }
}

keyword_enum! {
    pub enum FlexWrap {
        #[default]
        NoWrap => "nowrap",
        Wrap => "wrap",
    }
}

keyword_enum! {
    pub enum JustifyContent {
        #[default]
        FlexStart => "flex-start",
        FlexEnd => "flex-end",
        Center => "center",
        SpaceBetween => "space-between",
        SpaceAround => "space-around",
        SpaceEvenly => "space-evenly",
    }
}

keyword_enum! {
    pub enum AlignItems {
        #[default]
        Stretch => "stretch",
        FlexStart => "flex-start",
        FlexEnd => "flex-end",
        Center => "center",
    }
}

keyword_enum! {
    pub enum TextAlign {
        #[default]
        Left => "left",
        Center => "center",
        Right => "right",
    }
}

keyword_enum! {
    pub enum BackgroundRepeat {
        #[default]
        Repeat => "repeat",
        RepeatX => "repeat-x",
        RepeatY => "repeat-y",
        NoRepeat => "no-repeat",
    }
}

impl BorderStyle {
    /// Whether a border with this style draws anything.
    pub fn is_visible(&self) -> bool {
        !matches!(self, BorderStyle::None | BorderStyle::Hidden)
    }
}

/// `background-size`.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum BackgroundSize {
    /// The image's natural size.
    #[default]
    Auto,
    Cover,
    Contain,
    /// Explicit width and height; `auto` on one axis keeps the aspect ratio.
    Explicit(Length, Length),
}

/// A single `box-shadow` layer.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct BoxShadow {
    pub x: f32,
    pub y: f32,
    pub blur: f32,
    pub spread: f32,
    pub color: Color,
    pub inset: bool,
}

impl BoxShadow {
    /// How far an outset shadow reaches past the border box on each side.
    pub fn extent(&self) -> crate::geometry::Edges<f32> {
        if self.inset {
            return crate::geometry::Edges::ZERO;
        }
        let reach = self.blur.max(0.0) + self.spread;
        crate::geometry::Edges {
            top: (reach - self.y).max(0.0),
            right: (reach + self.x).max(0.0),
            bottom: (reach + self.y).max(0.0),
            left: (reach - self.x).max(0.0),
        }
    }
}
