//! Computed style: the fully resolved result of a cascade pass.
//!
//! A [`ComputedStyle`] is built in one go by the cascade and then stored
//! behind an `Arc`; nothing outside the cascade mutates one in place.

use std::collections::BTreeMap;
use std::sync::Arc;

use crate::css::model::DeclarationValue;
use crate::css::properties::{property_eq, Property, PropertyRegistry};
use crate::css::values::*;
use crate::geometry::{Corners, Edges};

/// One side of a border.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct BorderSide {
    pub width: f32,
    pub style: BorderStyle,
    pub color: Color,
}

impl BorderSide {
    /// Whether this side draws any pixel.
    pub fn is_painted(&self) -> bool {
        self.width > 0.0 && self.style.is_visible() && !self.color.is_transparent()
    }
}

/// `line-height`.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum LineHeight {
    #[default]
    Normal,
    /// Multiple of the font size.
    Factor(f32),
    Px(f32),
}

/// Fully resolved style values for one widget.
#[derive(Debug, Clone, PartialEq)]
pub struct ComputedStyle {
    pub display: Display,
    pub position: Position,
    pub visibility: Visibility,
    pub box_sizing: BoxSizing,
    /// `top`/`right`/`bottom`/`left` offsets for positioned widgets.
    pub inset: Edges<Length>,
    pub width: Length,
    pub height: Length,
    pub min_width: Length,
    pub min_height: Length,
    /// `auto` stands for `none`.
    pub max_width: Length,
    pub max_height: Length,
    pub margin: Edges<Length>,
    pub padding: Edges<Length>,
    pub border: Edges<BorderSide>,
    pub border_radius: Corners<f32>,
    pub background_color: Color,
    pub background_image: Option<String>,
    pub background_position: (Length, Length),
    pub background_size: BackgroundSize,
    pub background_repeat: BackgroundRepeat,
    pub box_shadow: Option<BoxShadow>,
    pub opacity: f32,
    pub z_index: i32,
    pub flex_direction: FlexDirection,
    pub flex_wrap: FlexWrap,
    pub justify_content: JustifyContent,
    pub align_items: AlignItems,
    pub flex_grow: f32,
    pub flex_shrink: f32,
    pub flex_basis: Length,
    pub color: Color,
    pub font_size: f32,
    pub font_family: String,
    pub line_height: LineHeight,
    pub text_align: TextAlign,
    /// Custom and unknown properties, kept as opaque values.
    pub custom: BTreeMap<Arc<str>, Vec<DeclarationValue>>,
}

impl Default for ComputedStyle {
    fn default() -> Self {
        Self::initial()
    }
}

/// Which kinds of work a style change calls for.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StyleDiff {
    /// A layout-affecting property changed.
    pub layout: bool,
    /// A paint-only property changed.
    pub paint: bool,
    /// An inherited property changed, so children must restyle.
    pub inherited: bool,
}

impl StyleDiff {
    /// Everything changed (first computation).
    pub const ALL: StyleDiff = StyleDiff { layout: true, paint: true, inherited: true };

    pub fn is_empty(&self) -> bool {
        !self.layout && !self.paint && !self.inherited
    }
}

impl ComputedStyle {
    /// The initial value of every property.
    pub fn initial() -> Self {
        Self {
            display: Display::Block,
            position: Position::Static,
            visibility: Visibility::Visible,
            box_sizing: BoxSizing::ContentBox,
            inset: Edges::all(Length::Auto),
            width: Length::Auto,
            height: Length::Auto,
            min_width: Length::ZERO,
            min_height: Length::ZERO,
            max_width: Length::Auto,
            max_height: Length::Auto,
            margin: Edges::all(Length::ZERO),
            padding: Edges::all(Length::ZERO),
            border: Edges::all(BorderSide {
                width: 0.0,
                style: BorderStyle::None,
                color: Color::BLACK,
            }),
            border_radius: Corners::all(0.0),
            background_color: Color::TRANSPARENT,
            background_image: None,
            background_position: (Length::Percent(0.0), Length::Percent(0.0)),
            background_size: BackgroundSize::Auto,
            background_repeat: BackgroundRepeat::Repeat,
            box_shadow: None,
            opacity: 1.0,
            z_index: 0,
            flex_direction: FlexDirection::Row,
            flex_wrap: FlexWrap::NoWrap,
            justify_content: JustifyContent::FlexStart,
            align_items: AlignItems::Stretch,
            flex_grow: 0.0,
            flex_shrink: 1.0,
            flex_basis: Length::Auto,
            color: Color::BLACK,
            font_size: 14.0,
            font_family: String::new(),
            line_height: LineHeight::Normal,
            text_align: TextAlign::Left,
            custom: BTreeMap::new(),
        }
    }

    /// Compare against the previous computed style.
    pub fn diff(&self, previous: &ComputedStyle, registry: &PropertyRegistry) -> StyleDiff {
        let mut diff = StyleDiff::default();
        for &prop in Property::ALL {
            if property_eq(self, previous, prop) {
                continue;
            }
            if prop.affects_layout() {
                diff.layout = true;
            } else {
                diff.paint = true;
            }
            if prop.is_inherited() {
                diff.inherited = true;
            }
        }
        if self.custom != previous.custom {
            let changed = self
                .custom
                .keys()
                .chain(previous.custom.keys())
                .filter(|name| self.custom.get(*name) != previous.custom.get(*name));
            for name in changed {
                if registry.is_inherited(name) {
                    diff.inherited = true;
                }
            }
        }
        diff
    }

    /// Line height in pixels.
    pub fn line_height_px(&self) -> f32 {
        match self.line_height {
            LineHeight::Normal => self.font_size * 1.2,
            LineHeight::Factor(f) => self.font_size * f,
            LineHeight::Px(px) => px,
        }
    }

    /// Border widths, as used by the box model whatever the border style.
    pub fn border_widths(&self) -> Edges<f32> {
        self.border.map(|side| side.width.max(0.0))
    }

    /// Whether the widget's own box paints anything: a visible background,
    /// a background image, a border, or a shadow.
    pub fn is_paintable(&self) -> bool {
        !self.background_color.is_transparent()
            || self.background_image.is_some()
            || self.border.top.is_painted()
            || self.border.right.is_painted()
            || self.border.bottom.is_painted()
            || self.border.left.is_painted()
            || self.box_shadow.is_some_and(|s| {
                !s.color.is_transparent()
                    && (s.blur > 0.0 || s.spread != 0.0 || s.x != 0.0 || s.y != 0.0)
            })
    }

    /// How far painting reaches outside the border box.
    pub fn paint_extent(&self) -> Edges<f32> {
        self.box_shadow.map(|s| s.extent()).unwrap_or(Edges::ZERO)
    }

    /// Whether the widget takes part in its parent's flow.
    pub fn is_in_flow(&self) -> bool {
        self.display != Display::None && self.position != Position::Absolute
    }
}
