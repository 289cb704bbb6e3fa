//! Property table and value parsing: token values → typed computed fields.
//!
//! Every built-in longhand is listed once in the `properties!` table with its
//! CSS name, the [`ComputedStyle`] field it lands in, whether it inherits, and
//! whether a change to it affects layout (otherwise it is paint-only).
//! Shorthands are expanded into longhands before they reach a declaration
//! store, so the cascade only ever merges longhands.

use std::collections::HashMap;
use std::sync::Arc;

use crate::css::computed::{ComputedStyle, LineHeight};
use crate::css::model::DeclarationValue;
use crate::css::parser::parse_declarations;
use crate::css::values::*;

/// Errors from property parsing.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum PropertyError {
    #[error("invalid value for {property}: {message}")]
    InvalidValue { property: String, message: String },
    #[error("{0} is a built-in property and cannot be registered")]
    Builtin(String),
}

fn invalid(property: &str, message: impl Into<String>) -> PropertyError {
    PropertyError::InvalidValue { property: property.to_string(), message: message.into() }
}

macro_rules! properties {
    ($( $variant:ident => $name:literal, $($field:ident).+, inherited: $inh:literal, layout: $lay:literal; )+) => {
        /// A built-in longhand property.
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub enum Property {
            $( $variant ),+
        }

        impl Property {
            /// Every built-in longhand, in table order.
            pub const ALL: &'static [Property] = &[$( Property::$variant ),+];

            /// The CSS name.
            pub fn name(self) -> &'static str {
                match self { $( Property::$variant => $name ),+ }
            }

            pub fn from_name(name: &str) -> Option<Property> {
                match name { $( $name => Some(Property::$variant), )+ _ => None }
            }

            /// Whether an unset value falls back to the parent's computed value.
            pub fn is_inherited(self) -> bool {
                match self { $( Property::$variant => $inh ),+ }
            }

            /// Whether a change needs a reflow rather than just a repaint.
            pub fn affects_layout(self) -> bool {
                match self { $( Property::$variant => $lay ),+ }
            }
        }

        /// Copy one property's computed value from `src` into `dst`.
        pub(crate) fn copy_property(dst: &mut ComputedStyle, src: &ComputedStyle, prop: Property) {
            match prop { $( Property::$variant => dst.$($field).+ = src.$($field).+.clone() ),+ }
        }

        /// Whether `a` and `b` agree on one property.
        pub(crate) fn property_eq(a: &ComputedStyle, b: &ComputedStyle, prop: Property) -> bool {
            match prop { $( Property::$variant => a.$($field).+ == b.$($field).+ ),+ }
        }
    };
}

properties! {
    Display => "display", display, inherited: false, layout: true;
    Position => "position", position, inherited: false, layout: true;
    Visibility => "visibility", visibility, inherited: true, layout: false;
    BoxSizing => "box-sizing", box_sizing, inherited: false, layout: true;
    Top => "top", inset.top, inherited: false, layout: true;
    Right => "right", inset.right, inherited: false, layout: true;
    Bottom => "bottom", inset.bottom, inherited: false, layout: true;
    Left => "left", inset.left, inherited: false, layout: true;
    Width => "width", width, inherited: false, layout: true;
    Height => "height", height, inherited: false, layout: true;
    MinWidth => "min-width", min_width, inherited: false, layout: true;
    MinHeight => "min-height", min_height, inherited: false, layout: true;
    MaxWidth => "max-width", max_width, inherited: false, layout: true;
    MaxHeight => "max-height", max_height, inherited: false, layout: true;
    MarginTop => "margin-top", margin.top, inherited: false, layout: true;
    MarginRight => "margin-right", margin.right, inherited: false, layout: true;
    MarginBottom => "margin-bottom", margin.bottom, inherited: false, layout: true;
    MarginLeft => "margin-left", margin.left, inherited: false, layout: true;
    PaddingTop => "padding-top", padding.top, inherited: false, layout: true;
    PaddingRight => "padding-right", padding.right, inherited: false, layout: true;
    PaddingBottom => "padding-bottom", padding.bottom, inherited: false, layout: true;
    PaddingLeft => "padding-left", padding.left, inherited: false, layout: true;
    BorderTopWidth => "border-top-width", border.top.width, inherited: false, layout: true;
    BorderRightWidth => "border-right-width", border.right.width, inherited: false, layout: true;
    BorderBottomWidth => "border-bottom-width", border.bottom.width, inherited: false, layout: true;
    BorderLeftWidth => "border-left-width", border.left.width, inherited: false, layout: true;
    BorderTopStyle => "border-top-style", border.top.style, inherited: false, layout: false;
    BorderRightStyle => "border-right-style", border.right.style, inherited: false, layout: false;
    BorderBottomStyle => "border-bottom-style", border.bottom.style, inherited: false, layout: false;
    BorderLeftStyle => "border-left-style", border.left.style, inherited: false, layout: false;
    BorderTopColor => "border-top-color", border.top.color, inherited: false, layout: false;
    BorderRightColor => "border-right-color", border.right.color, inherited: false, layout: false;
    BorderBottomColor => "border-bottom-color", border.bottom.color, inherited: false, layout: false;
    BorderLeftColor => "border-left-color", border.left.color, inherited: false, layout: false;
    BorderTopLeftRadius => "border-top-left-radius", border_radius.top_left, inherited: false, layout: false;
    BorderTopRightRadius => "border-top-right-radius", border_radius.top_right, inherited: false, layout: false;
    BorderBottomRightRadius => "border-bottom-right-radius", border_radius.bottom_right, inherited: false, layout: false;
    BorderBottomLeftRadius => "border-bottom-left-radius", border_radius.bottom_left, inherited: false, layout: false;
    BackgroundColor => "background-color", background_color, inherited: false, layout: false;
    BackgroundImage => "background-image", background_image, inherited: false, layout: false;
    BackgroundPosition => "background-position", background_position, inherited: false, layout: false;
    BackgroundSize => "background-size", background_size, inherited: false, layout: false;
    BackgroundRepeat => "background-repeat", background_repeat, inherited: false, layout: false;
    BoxShadow => "box-shadow", box_shadow, inherited: false, layout: false;
    Opacity => "opacity", opacity, inherited: false, layout: false;
    ZIndex => "z-index", z_index, inherited: false, layout: false;
    FlexDirection => "flex-direction", flex_direction, inherited: false, layout: true;
    FlexWrap => "flex-wrap", flex_wrap, inherited: false, layout: true;
    JustifyContent => "justify-content", justify_content, inherited: false, layout: true;
    AlignItems => "align-items", align_items, inherited: false, layout: true;
    FlexGrow => "flex-grow", flex_grow, inherited: false, layout: true;
    FlexShrink => "flex-shrink", flex_shrink, inherited: false, layout: true;
    FlexBasis => "flex-basis", flex_basis, inherited: false, layout: true;
    Color => "color", color, inherited: true, layout: false;
    FontSize => "font-size", font_size, inherited: true, layout: true;
    FontFamily => "font-family", font_family, inherited: true, layout: true;
    LineHeight => "line-height", line_height, inherited: true, layout: true;
    TextAlign => "text-align", text_align, inherited: true, layout: false;
}

/// The key of one declared longhand: a built-in property or any other name,
/// kept as an opaque custom property.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum PropertyKey {
    Builtin(Property),
    Custom(Arc<str>),
}

impl PropertyKey {
    /// Key for a longhand name. Unknown names become custom keys.
    pub fn from_name(name: &str) -> PropertyKey {
        match Property::from_name(name) {
            Some(prop) => PropertyKey::Builtin(prop),
            None => PropertyKey::Custom(Arc::from(name)),
        }
    }

    pub fn name(&self) -> &str {
        match self {
            PropertyKey::Builtin(prop) => prop.name(),
            PropertyKey::Custom(name) => name,
        }
    }
}

impl From<Property> for PropertyKey {
    fn from(prop: Property) -> Self {
        PropertyKey::Builtin(prop)
    }
}

// ---------------------------------------------------------------------------
// Custom property registry
// ---------------------------------------------------------------------------

/// A registered custom property.
#[derive(Debug, Clone, PartialEq)]
pub struct CustomProperty {
    pub name: Arc<str>,
    pub initial: Option<Vec<DeclarationValue>>,
    pub inherited: bool,
}

/// Definitions of custom properties. Unregistered custom names still
/// cascade, but never inherit and have no initial value.
#[derive(Debug, Clone, Default)]
pub struct PropertyRegistry {
    custom: HashMap<Arc<str>, CustomProperty>,
}

impl PropertyRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register (or redefine) a custom property. `initial` is CSS value
    /// text; an empty string means no initial value.
    pub fn register(
        &mut self,
        name: &str,
        initial: &str,
        inherited: bool,
    ) -> Result<(), PropertyError> {
        if Property::from_name(name).is_some() {
            return Err(PropertyError::Builtin(name.to_string()));
        }
        let initial = if initial.trim().is_empty() {
            None
        } else {
            let parsed = parse_value_text(initial)
                .ok_or_else(|| invalid(name, format!("cannot parse initial value '{initial}'")))?;
            Some(parsed)
        };
        let name: Arc<str> = Arc::from(name);
        self.custom.insert(name.clone(), CustomProperty { name, initial, inherited });
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<&CustomProperty> {
        self.custom.get(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &CustomProperty> {
        self.custom.values()
    }

    /// Whether the custom property `name` inherits.
    pub fn is_inherited(&self, name: &str) -> bool {
        self.custom.get(name).is_some_and(|p| p.inherited)
    }
}

/// Parse a bare value such as `10px solid red` into declaration values.
pub fn parse_value_text(text: &str) -> Option<Vec<DeclarationValue>> {
    parse_declarations(&format!("value: {text}"))
        .into_iter()
        .next()
        .map(|decl| decl.values)
}

// ---------------------------------------------------------------------------
// CSS-wide keywords
// ---------------------------------------------------------------------------

/// `initial` / `inherit`, valid for every property.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WideKeyword {
    Initial,
    Inherit,
}

impl WideKeyword {
    pub fn detect(values: &[DeclarationValue]) -> Option<WideKeyword> {
        match values {
            [DeclarationValue::Ident(kw)] if kw.eq_ignore_ascii_case("initial") => {
                Some(WideKeyword::Initial)
            }
            [DeclarationValue::Ident(kw)] if kw.eq_ignore_ascii_case("inherit") => {
                Some(WideKeyword::Inherit)
            }
            _ => None,
        }
    }
}

// ---------------------------------------------------------------------------
// Value parsers
// ---------------------------------------------------------------------------

/// Parse a length. Unitless numbers are pixels.
pub fn parse_length(value: &DeclarationValue) -> Option<Length> {
    match value {
        DeclarationValue::Number(n) => Some(Length::Px(*n)),
        DeclarationValue::Dimension(n, unit) => match unit.as_str() {
            "px" => Some(Length::Px(*n)),
            "%" => Some(Length::Percent(*n)),
            "vw" => Some(Length::Vw(*n)),
            "vh" => Some(Length::Vh(*n)),
            _ => None,
        },
        DeclarationValue::Ident(kw) if kw.eq_ignore_ascii_case("auto") => Some(Length::Auto),
        _ => None,
    }
}

/// Parse a pixel amount (`4px`, `4`, or a border width keyword).
pub fn parse_px(value: &DeclarationValue) -> Option<f32> {
    match value {
        DeclarationValue::Number(n) => Some(*n),
        DeclarationValue::Dimension(n, unit) if unit == "px" => Some(*n),
        DeclarationValue::Ident(kw) => match kw.to_ascii_lowercase().as_str() {
            "thin" => Some(1.0),
            "medium" => Some(3.0),
            "thick" => Some(5.0),
            _ => None,
        },
        _ => None,
    }
}

/// Parse a color: hex, keyword, `rgb()` or `rgba()`.
pub fn parse_color(value: &DeclarationValue) -> Option<Color> {
    match value {
        DeclarationValue::Color(hex) => Color::from_hex(hex),
        DeclarationValue::Ident(name) => Color::named(name),
        DeclarationValue::Function(name, args) if name == "rgb" || name == "rgba" => {
            let channel = |v: &DeclarationValue| -> Option<u8> {
                match v {
                    DeclarationValue::Number(n) => Some(n.round().clamp(0.0, 255.0) as u8),
                    DeclarationValue::Dimension(n, unit) if unit == "%" => {
                        Some((n * 2.55).round().clamp(0.0, 255.0) as u8)
                    }
                    _ => None,
                }
            };
            let alpha = |v: &DeclarationValue| -> Option<u8> {
                match v {
                    DeclarationValue::Number(n) => Some((n * 255.0).round().clamp(0.0, 255.0) as u8),
                    DeclarationValue::Dimension(n, unit) if unit == "%" => {
                        Some((n * 2.55).round().clamp(0.0, 255.0) as u8)
                    }
                    _ => None,
                }
            };
            match args.as_slice() {
                [r, g, b] => Some(Color::rgb(channel(r)?, channel(g)?, channel(b)?)),
                [r, g, b, a] => Some(Color::rgba(channel(r)?, channel(g)?, channel(b)?, alpha(a)?)),
                _ => None,
            }
        }
        _ => None,
    }
}

fn parse_number(value: &DeclarationValue) -> Option<f32> {
    match value {
        DeclarationValue::Number(n) => Some(*n),
        _ => None,
    }
}

fn keyword(value: &DeclarationValue) -> Option<&str> {
    match value {
        DeclarationValue::Ident(kw) => Some(kw.as_str()),
        _ => None,
    }
}

fn single<'a>(property: &str, values: &'a [DeclarationValue]) -> Result<&'a DeclarationValue, PropertyError> {
    match values {
        [value] => Ok(value),
        _ => Err(invalid(property, format!("expected one value, got {}", values.len()))),
    }
}

fn parse_keyword<T>(
    property: &str,
    values: &[DeclarationValue],
    parse: impl Fn(&str) -> Option<T>,
) -> Result<T, PropertyError> {
    let value = single(property, values)?;
    keyword(value)
        .and_then(parse)
        .ok_or_else(|| invalid(property, format!("unknown keyword {value:?}")))
}

fn parse_single<T>(
    property: &str,
    values: &[DeclarationValue],
    parse: impl Fn(&DeclarationValue) -> Option<T>,
) -> Result<T, PropertyError> {
    let value = single(property, values)?;
    parse(value).ok_or_else(|| invalid(property, format!("unexpected {value:?}")))
}

/// Position keywords map onto percentages.
fn parse_position_component(value: &DeclarationValue) -> Option<Length> {
    match keyword(value).map(|k| k.to_ascii_lowercase()) {
        Some(k) if k == "left" || k == "top" => Some(Length::Percent(0.0)),
        Some(k) if k == "center" => Some(Length::Percent(50.0)),
        Some(k) if k == "right" || k == "bottom" => Some(Length::Percent(100.0)),
        _ => parse_length(value).filter(|l| !l.is_auto()),
    }
}

fn parse_box_shadow(values: &[DeclarationValue]) -> Result<Option<BoxShadow>, PropertyError> {
    const NAME: &str = "box-shadow";
    if let [DeclarationValue::Ident(kw)] = values {
        if kw.eq_ignore_ascii_case("none") {
            return Ok(None);
        }
    }
    let mut lengths = Vec::with_capacity(4);
    let mut shadow = BoxShadow { color: Color::rgba(0, 0, 0, 255), ..Default::default() };
    for value in values {
        if let Some(px) = parse_px(value).filter(|_| !matches!(value, DeclarationValue::Ident(_))) {
            lengths.push(px);
        } else if keyword(value).is_some_and(|k| k.eq_ignore_ascii_case("inset")) {
            shadow.inset = true;
        } else if let Some(color) = parse_color(value) {
            shadow.color = color;
        } else {
            return Err(invalid(NAME, format!("unexpected {value:?}")));
        }
    }
    match lengths.as_slice() {
        [x, y] => {
            shadow.x = *x;
            shadow.y = *y;
        }
        [x, y, blur] => {
            shadow.x = *x;
            shadow.y = *y;
            shadow.blur = blur.max(0.0);
        }
        [x, y, blur, spread] => {
            shadow.x = *x;
            shadow.y = *y;
            shadow.blur = blur.max(0.0);
            shadow.spread = *spread;
        }
        _ => return Err(invalid(NAME, "expected 2 to 4 lengths")),
    }
    Ok(Some(shadow))
}

/// Apply one longhand declaration onto `style`.
///
/// CSS-wide keywords are resolved by the caller.
pub fn apply_property(
    style: &mut ComputedStyle,
    prop: Property,
    values: &[DeclarationValue],
) -> Result<(), PropertyError> {
    let name = prop.name();
    match prop {
        Property::Display => style.display = parse_keyword(name, values, Display::from_keyword)?,
        Property::Position => style.position = parse_keyword(name, values, Position::from_keyword)?,
        Property::Visibility => {
            style.visibility = parse_keyword(name, values, Visibility::from_keyword)?
        }
        Property::BoxSizing => {
            style.box_sizing = parse_keyword(name, values, BoxSizing::from_keyword)?
        }
        Property::Top => style.inset.top = parse_single(name, values, parse_length)?,
        Property::Right => style.inset.right = parse_single(name, values, parse_length)?,
        Property::Bottom => style.inset.bottom = parse_single(name, values, parse_length)?,
        Property::Left => style.inset.left = parse_single(name, values, parse_length)?,
        Property::Width => style.width = parse_single(name, values, parse_length)?,
        Property::Height => style.height = parse_single(name, values, parse_length)?,
        Property::MinWidth => style.min_width = parse_single(name, values, parse_length)?,
        Property::MinHeight => style.min_height = parse_single(name, values, parse_length)?,
        Property::MaxWidth | Property::MaxHeight => {
            let value = single(name, values)?;
            let length = if keyword(value).is_some_and(|k| k.eq_ignore_ascii_case("none")) {
                Length::Auto
            } else {
                parse_length(value).ok_or_else(|| invalid(name, format!("unexpected {value:?}")))?
            };
            if prop == Property::MaxWidth {
                style.max_width = length;
            } else {
                style.max_height = length;
            }
        }
        Property::MarginTop => style.margin.top = parse_single(name, values, parse_length)?,
        Property::MarginRight => style.margin.right = parse_single(name, values, parse_length)?,
        Property::MarginBottom => style.margin.bottom = parse_single(name, values, parse_length)?,
        Property::MarginLeft => style.margin.left = parse_single(name, values, parse_length)?,
        Property::PaddingTop
        | Property::PaddingRight
        | Property::PaddingBottom
        | Property::PaddingLeft => {
            let length = parse_single(name, values, parse_length)?;
            if length.is_auto() {
                return Err(invalid(name, "padding cannot be auto"));
            }
            match prop {
                Property::PaddingTop => style.padding.top = length,
                Property::PaddingRight => style.padding.right = length,
                Property::PaddingBottom => style.padding.bottom = length,
                _ => style.padding.left = length,
            }
        }
        Property::BorderTopWidth => style.border.top.width = parse_single(name, values, parse_px)?.max(0.0),
        Property::BorderRightWidth => {
            style.border.right.width = parse_single(name, values, parse_px)?.max(0.0)
        }
        Property::BorderBottomWidth => {
            style.border.bottom.width = parse_single(name, values, parse_px)?.max(0.0)
        }
        Property::BorderLeftWidth => {
            style.border.left.width = parse_single(name, values, parse_px)?.max(0.0)
        }
        Property::BorderTopStyle => {
            style.border.top.style = parse_keyword(name, values, BorderStyle::from_keyword)?
        }
        Property::BorderRightStyle => {
            style.border.right.style = parse_keyword(name, values, BorderStyle::from_keyword)?
        }
        Property::BorderBottomStyle => {
            style.border.bottom.style = parse_keyword(name, values, BorderStyle::from_keyword)?
        }
        Property::BorderLeftStyle => {
            style.border.left.style = parse_keyword(name, values, BorderStyle::from_keyword)?
        }
        Property::BorderTopColor => style.border.top.color = parse_single(name, values, parse_color)?,
        Property::BorderRightColor => {
            style.border.right.color = parse_single(name, values, parse_color)?
        }
        Property::BorderBottomColor => {
            style.border.bottom.color = parse_single(name, values, parse_color)?
        }
        Property::BorderLeftColor => style.border.left.color = parse_single(name, values, parse_color)?,
        Property::BorderTopLeftRadius => {
            style.border_radius.top_left = parse_single(name, values, parse_px)?.max(0.0)
        }
        Property::BorderTopRightRadius => {
            style.border_radius.top_right = parse_single(name, values, parse_px)?.max(0.0)
        }
        Property::BorderBottomRightRadius => {
            style.border_radius.bottom_right = parse_single(name, values, parse_px)?.max(0.0)
        }
        Property::BorderBottomLeftRadius => {
            style.border_radius.bottom_left = parse_single(name, values, parse_px)?.max(0.0)
        }
        Property::BackgroundColor => {
            style.background_color = parse_single(name, values, parse_color)?
        }
        Property::BackgroundImage => {
            style.background_image = match single(name, values)? {
                DeclarationValue::Url(url) => Some(url.clone()),
                DeclarationValue::Ident(kw) if kw.eq_ignore_ascii_case("none") => None,
                other => return Err(invalid(name, format!("unexpected {other:?}"))),
            }
        }
        Property::BackgroundPosition => {
            let parsed: Option<Vec<Length>> = values.iter().map(parse_position_component).collect();
            style.background_position = match parsed.as_deref() {
                Some([x]) => (*x, Length::Percent(50.0)),
                Some([x, y]) => (*x, *y),
                _ => return Err(invalid(name, "expected one or two positions")),
            }
        }
        Property::BackgroundSize => {
            style.background_size = match values {
                [DeclarationValue::Ident(kw)] if kw.eq_ignore_ascii_case("cover") => {
                    BackgroundSize::Cover
                }
                [DeclarationValue::Ident(kw)] if kw.eq_ignore_ascii_case("contain") => {
                    BackgroundSize::Contain
                }
                [DeclarationValue::Ident(kw)] if kw.eq_ignore_ascii_case("auto") => {
                    BackgroundSize::Auto
                }
                [w] => BackgroundSize::Explicit(
                    parse_length(w).ok_or_else(|| invalid(name, format!("unexpected {w:?}")))?,
                    Length::Auto,
                ),
                [w, h] => BackgroundSize::Explicit(
                    parse_length(w).ok_or_else(|| invalid(name, format!("unexpected {w:?}")))?,
                    parse_length(h).ok_or_else(|| invalid(name, format!("unexpected {h:?}")))?,
                ),
                _ => return Err(invalid(name, "expected one or two values")),
            }
        }
        Property::BackgroundRepeat => {
            style.background_repeat = parse_keyword(name, values, BackgroundRepeat::from_keyword)?
        }
        Property::BoxShadow => style.box_shadow = parse_box_shadow(values)?,
        Property::Opacity => {
            let opacity = parse_single(name, values, |v| match v {
                DeclarationValue::Number(n) => Some(*n),
                DeclarationValue::Dimension(n, unit) if unit == "%" => Some(n / 100.0),
                _ => None,
            })?;
            style.opacity = opacity.clamp(0.0, 1.0);
        }
        Property::ZIndex => {
            style.z_index = match single(name, values)? {
                DeclarationValue::Number(n) => n.round() as i32,
                DeclarationValue::Ident(kw) if kw.eq_ignore_ascii_case("auto") => 0,
                other => return Err(invalid(name, format!("unexpected {other:?}"))),
            }
        }
        Property::FlexDirection => {
            style.flex_direction = parse_keyword(name, values, FlexDirection::from_keyword)?
        }
        Property::FlexWrap => style.flex_wrap = parse_keyword(name, values, FlexWrap::from_keyword)?,
        Property::JustifyContent => {
            style.justify_content = parse_keyword(name, values, JustifyContent::from_keyword)?
        }
        Property::AlignItems => {
            style.align_items = parse_keyword(name, values, AlignItems::from_keyword)?
        }
        Property::FlexGrow => style.flex_grow = parse_single(name, values, parse_number)?.max(0.0),
        Property::FlexShrink => {
            style.flex_shrink = parse_single(name, values, parse_number)?.max(0.0)
        }
        Property::FlexBasis => style.flex_basis = parse_single(name, values, parse_length)?,
        Property::Color => style.color = parse_single(name, values, parse_color)?,
        Property::FontSize => {
            style.font_size = parse_single(name, values, parse_px)?.max(0.0);
        }
        Property::FontFamily => {
            let mut families = Vec::new();
            let mut current = String::new();
            for value in values {
                match value {
                    DeclarationValue::Ident(word) | DeclarationValue::String(word) => {
                        if !current.is_empty() {
                            current.push(' ');
                        }
                        current.push_str(word);
                    }
                    DeclarationValue::Comma => families.push(std::mem::take(&mut current)),
                    other => return Err(invalid(name, format!("unexpected {other:?}"))),
                }
            }
            families.push(current);
            families.retain(|f| !f.is_empty());
            if families.is_empty() {
                return Err(invalid(name, "empty family list"));
            }
            style.font_family = families.join(", ");
        }
        Property::LineHeight => {
            style.line_height = match single(name, values)? {
                DeclarationValue::Ident(kw) if kw.eq_ignore_ascii_case("normal") => LineHeight::Normal,
                DeclarationValue::Number(n) => LineHeight::Factor(n.max(0.0)),
                DeclarationValue::Dimension(n, unit) if unit == "%" => {
                    LineHeight::Factor((n / 100.0).max(0.0))
                }
                DeclarationValue::Dimension(n, unit) if unit == "px" => LineHeight::Px(n.max(0.0)),
                other => return Err(invalid(name, format!("unexpected {other:?}"))),
            }
        }
        Property::TextAlign => {
            style.text_align = parse_keyword(name, values, TextAlign::from_keyword)?
        }
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Shorthands
// ---------------------------------------------------------------------------

/// Spread 1-4 values over top/right/bottom/left, CSS box order.
fn box_values(values: &[DeclarationValue]) -> Option<[DeclarationValue; 4]> {
    let v = |i: usize| values[i].clone();
    match values.len() {
        1 => Some([v(0), v(0), v(0), v(0)]),
        2 => Some([v(0), v(1), v(0), v(1)]),
        3 => Some([v(0), v(1), v(2), v(1)]),
        4 => Some([v(0), v(1), v(2), v(3)]),
        _ => None,
    }
}

const SIDES: [&str; 4] = ["top", "right", "bottom", "left"];

fn longhands(names: [String; 4], values: [DeclarationValue; 4]) -> Vec<(PropertyKey, Vec<DeclarationValue>)> {
    names
        .into_iter()
        .zip(values)
        .map(|(name, value)| (PropertyKey::from_name(&name), vec![value]))
        .collect()
}

fn initial() -> DeclarationValue {
    DeclarationValue::Ident("initial".into())
}

/// Split a `border` value into width, style and color parts.
fn border_parts(
    property: &str,
    values: &[DeclarationValue],
) -> Result<(DeclarationValue, DeclarationValue, DeclarationValue), PropertyError> {
    let mut width = None;
    let mut style = None;
    let mut color = None;
    for value in values {
        if keyword(value).is_some_and(|k| BorderStyle::from_keyword(k).is_some()) && style.is_none() {
            style = Some(value.clone());
        } else if parse_px(value).is_some() && width.is_none() {
            width = Some(value.clone());
        } else if parse_color(value).is_some() && color.is_none() {
            color = Some(value.clone());
        } else {
            return Err(invalid(property, format!("unexpected {value:?}")));
        }
    }
    Ok((
        width.unwrap_or(DeclarationValue::Ident("medium".into())),
        style.unwrap_or(DeclarationValue::Ident("solid".into())),
        color.unwrap_or(DeclarationValue::Ident("black".into())),
    ))
}

/// Expand a declaration into longhands. Longhands and unknown names pass
/// through unchanged.
pub fn expand_shorthand(
    property: &str,
    values: &[DeclarationValue],
) -> Result<Vec<(PropertyKey, Vec<DeclarationValue>)>, PropertyError> {
    let property = property.to_ascii_lowercase();
    let wide = WideKeyword::detect(values);
    let spread = |names: [String; 4]| -> Result<_, PropertyError> {
        if wide.is_some() {
            return Ok(longhands(names, std::array::from_fn(|_| values[0].clone())));
        }
        let values = box_values(values)
            .ok_or_else(|| invalid(&property, "expected one to four values"))?;
        Ok(longhands(names, values))
    };

    match property.as_str() {
        "margin" | "padding" => spread(SIDES.map(|s| format!("{property}-{s}"))),
        "border-width" | "border-style" | "border-color" => {
            let kind = &property["border-".len()..];
            spread(SIDES.map(|s| format!("border-{s}-{kind}")))
        }
        "border-radius" => {
            let names = ["top-left", "top-right", "bottom-right", "bottom-left"]
                .map(|c| format!("border-{c}-radius"));
            spread(names)
        }
        "border" | "border-top" | "border-right" | "border-bottom" | "border-left" => {
            let sides: Vec<&str> = match property.strip_prefix("border-") {
                Some(side) => vec![side],
                None => SIDES.to_vec(),
            };
            let (width, style, color) = match wide {
                Some(_) => (values[0].clone(), values[0].clone(), values[0].clone()),
                None => border_parts(&property, values)?,
            };
            let mut out = Vec::new();
            for side in sides {
                out.push((PropertyKey::from_name(&format!("border-{side}-width")), vec![width.clone()]));
                out.push((PropertyKey::from_name(&format!("border-{side}-style")), vec![style.clone()]));
                out.push((PropertyKey::from_name(&format!("border-{side}-color")), vec![color.clone()]));
            }
            Ok(out)
        }
        "background" => {
            if wide.is_some() {
                return Ok([
                    Property::BackgroundColor,
                    Property::BackgroundImage,
                    Property::BackgroundPosition,
                    Property::BackgroundRepeat,
                ]
                .into_iter()
                .map(|p| (p.into(), vec![values[0].clone()]))
                .collect());
            }
            let mut color = vec![initial()];
            let mut image = vec![initial()];
            let mut repeat = vec![initial()];
            let mut position = Vec::new();
            for value in values {
                match value {
                    DeclarationValue::Url(_) => image = vec![value.clone()],
                    DeclarationValue::Ident(kw) if kw.eq_ignore_ascii_case("none") => {
                        image = vec![value.clone()]
                    }
                    DeclarationValue::Ident(kw) if BackgroundRepeat::from_keyword(kw).is_some() => {
                        repeat = vec![value.clone()]
                    }
                    _ if parse_position_component(value).is_some() => position.push(value.clone()),
                    _ if parse_color(value).is_some() => color = vec![value.clone()],
                    other => return Err(invalid(&property, format!("unexpected {other:?}"))),
                }
            }
            if position.is_empty() {
                position.push(initial());
            }
            Ok(vec![
                (Property::BackgroundColor.into(), color),
                (Property::BackgroundImage.into(), image),
                (Property::BackgroundPosition.into(), position),
                (Property::BackgroundRepeat.into(), repeat),
            ])
        }
        "flex" => {
            let num = |n: f32| DeclarationValue::Number(n);
            let (grow, shrink, basis) = match values {
                _ if wide.is_some() => (values[0].clone(), values[0].clone(), values[0].clone()),
                [DeclarationValue::Ident(kw)] if kw.eq_ignore_ascii_case("none") => {
                    (num(0.0), num(0.0), DeclarationValue::Ident("auto".into()))
                }
                [DeclarationValue::Ident(kw)] if kw.eq_ignore_ascii_case("auto") => {
                    (num(1.0), num(1.0), DeclarationValue::Ident("auto".into()))
                }
                [g @ DeclarationValue::Number(_)] => (g.clone(), num(1.0), num(0.0)),
                [g @ DeclarationValue::Number(_), s @ DeclarationValue::Number(_)] => {
                    (g.clone(), s.clone(), num(0.0))
                }
                [g @ DeclarationValue::Number(_), b] => (g.clone(), num(1.0), b.clone()),
                [g, s, b] => (g.clone(), s.clone(), b.clone()),
                [b] => (num(1.0), num(1.0), b.clone()),
                _ => return Err(invalid(&property, "expected one to three values")),
            };
            Ok(vec![
                (Property::FlexGrow.into(), vec![grow]),
                (Property::FlexShrink.into(), vec![shrink]),
                (Property::FlexBasis.into(), vec![basis]),
            ])
        }
        "flex-flow" => {
            let mut out = Vec::new();
            for value in values {
                let kw = keyword(value).unwrap_or_default();
                if wide.is_some() {
                    out.push((Property::FlexDirection.into(), vec![value.clone()]));
                    out.push((Property::FlexWrap.into(), vec![value.clone()]));
                } else if FlexDirection::from_keyword(kw).is_some() {
                    out.push((Property::FlexDirection.into(), vec![value.clone()]));
                } else if FlexWrap::from_keyword(kw).is_some() {
                    out.push((Property::FlexWrap.into(), vec![value.clone()]));
                } else {
                    return Err(invalid(&property, format!("unexpected {value:?}")));
                }
            }
            Ok(out)
        }
        _ => Ok(vec![(PropertyKey::from_name(&property), values.to_vec())]),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::css::parser::parse_declarations;

    fn values(text: &str) -> Vec<DeclarationValue> {
        parse_value_text(text).unwrap_or_default()
    }

    fn apply(prop: Property, text: &str) -> Result<ComputedStyle, PropertyError> {
        let mut style = ComputedStyle::initial();
        apply_property(&mut style, prop, &values(text))?;
        Ok(style)
    }

    // ── Table ────────────────────────────────────────────────────────

    #[test]
    fn names_round_trip() {
        for prop in Property::ALL {
            assert_eq!(Property::from_name(prop.name()), Some(*prop));
        }
    }

    #[test]
    fn inherited_set() {
        let inherited: Vec<&str> = Property::ALL
            .iter()
            .filter(|p| p.is_inherited())
            .map(|p| p.name())
            .collect();
        assert_eq!(
            inherited,
            vec!["visibility", "color", "font-size", "font-family", "line-height", "text-align"]
        );
    }

    // ── Longhands ────────────────────────────────────────────────────

    #[test]
    fn apply_lengths() {
        assert_eq!(apply(Property::Width, "200px").map(|s| s.width), Ok(Length::Px(200.0)));
        assert_eq!(apply(Property::Width, "50%").map(|s| s.width), Ok(Length::Percent(50.0)));
        assert_eq!(apply(Property::MaxWidth, "none").map(|s| s.max_width), Ok(Length::Auto));
        assert!(apply(Property::Width, "red").is_err());
        assert!(apply(Property::PaddingTop, "auto").is_err());
    }

    #[test]
    fn apply_colors() {
        assert_eq!(
            apply(Property::BackgroundColor, "#ff0000").map(|s| s.background_color),
            Ok(Color::rgb(255, 0, 0))
        );
        assert_eq!(
            apply(Property::Color, "rgba(0, 0, 255, 0.5)").map(|s| s.color),
            Ok(Color::rgba(0, 0, 255, 128))
        );
        assert!(apply(Property::Color, "10px").is_err());
    }

    #[test]
    fn apply_box_shadow() {
        let style = apply(Property::BoxShadow, "2px 3px 4px 1px #000 inset").ok();
        let shadow = style.and_then(|s| s.box_shadow);
        assert_eq!(
            shadow,
            Some(BoxShadow {
                x: 2.0,
                y: 3.0,
                blur: 4.0,
                spread: 1.0,
                color: Color::BLACK,
                inset: true
            })
        );
        assert_eq!(apply(Property::BoxShadow, "none").map(|s| s.box_shadow), Ok(None));
        assert!(apply(Property::BoxShadow, "2px").is_err());
    }

    #[test]
    fn apply_font_family_list() {
        let style = apply(Property::FontFamily, "\"Noto Sans\", Arial, sans-serif");
        assert_eq!(style.map(|s| s.font_family), Ok("Noto Sans, Arial, sans-serif".to_string()));
    }

    #[test]
    fn apply_opacity_clamps() {
        assert_eq!(apply(Property::Opacity, "1.5").map(|s| s.opacity), Ok(1.0));
        assert_eq!(apply(Property::Opacity, "50%").map(|s| s.opacity), Ok(0.5));
    }

    // ── Shorthands ───────────────────────────────────────────────────

    fn expand(text: &str) -> Vec<(String, Vec<DeclarationValue>)> {
        let decl = parse_declarations(text).remove(0);
        expand_shorthand(&decl.property, &decl.values)
            .unwrap_or_default()
            .into_iter()
            .map(|(k, v)| (k.name().to_string(), v))
            .collect()
    }

    #[test]
    fn margin_two_values() {
        let out = expand("margin: 1px 2px");
        let names: Vec<&str> = out.iter().map(|(n, _)| n.as_str()).collect();
        assert_eq!(names, vec!["margin-top", "margin-right", "margin-bottom", "margin-left"]);
        assert_eq!(out[1].1, vec![DeclarationValue::Dimension(2.0, "px".into())]);
        assert_eq!(out[2].1, vec![DeclarationValue::Dimension(1.0, "px".into())]);
    }

    #[test]
    fn border_width_only_defaults_to_solid() {
        let out = expand("border: 5px");
        assert_eq!(out.len(), 12);
        assert_eq!(out[0], ("border-top-width".into(), vec![DeclarationValue::Dimension(5.0, "px".into())]));
        assert_eq!(out[1], ("border-top-style".into(), vec![DeclarationValue::Ident("solid".into())]));
    }

    #[test]
    fn border_side_any_order() {
        let out = expand("border-left: red dashed 2px");
        assert_eq!(out.len(), 3);
        assert_eq!(out[0].0, "border-left-width");
        assert_eq!(out[1].1, vec![DeclarationValue::Ident("dashed".into())]);
        assert_eq!(out[2].1, vec![DeclarationValue::Ident("red".into())]);
    }

    #[test]
    fn flex_single_number() {
        let out = expand("flex: 2");
        assert_eq!(out[0].1, vec![DeclarationValue::Number(2.0)]);
        assert_eq!(out[1].1, vec![DeclarationValue::Number(1.0)]);
        assert_eq!(out[2].1, vec![DeclarationValue::Number(0.0)]);
    }

    #[test]
    fn background_resets_unspecified_parts() {
        let out = expand("background: #00ff00");
        assert_eq!(out[0].1, vec![DeclarationValue::Color("00ff00".into())]);
        assert_eq!(out[1].1, vec![DeclarationValue::Ident("initial".into())]);
    }

    #[test]
    fn unknown_property_passes_through() {
        let out = expand("--accent: 3px");
        assert_eq!(out, vec![("--accent".into(), vec![DeclarationValue::Dimension(3.0, "px".into())])]);
    }

    // ── Registry ─────────────────────────────────────────────────────

    #[test]
    fn register_custom_property() {
        let mut registry = PropertyRegistry::new();
        assert!(registry.register("--gap", "4px", true).is_ok());
        assert!(registry.is_inherited("--gap"));
        assert_eq!(
            registry.get("--gap").and_then(|p| p.initial.clone()),
            Some(vec![DeclarationValue::Dimension(4.0, "px".into())])
        );
        assert_eq!(
            registry.register("width", "1px", false),
            Err(PropertyError::Builtin("width".into()))
        );
    }
}
