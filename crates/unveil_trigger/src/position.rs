//! Scroll offsets
//!
//! An [`Offset`] says where a scroll window starts or ends. The usual form
//! pairs an edge of the element with an edge of the viewport: `"top 80%"`
//! means "when the element's top reaches 80% down the viewport".
//!
//! | Input | Meaning |
//! |---|---|
//! | `"top bottom"` | element top meets viewport bottom |
//! | `"center center"` | element center meets viewport center |
//! | `"top+=150 center"` | 150px below the element top meets viewport center |
//! | `"top"` | element top meets viewport top |
//! | `"+=800"` | 800px after the window start (end offsets only) |
//! | `"1200"` | absolute scroll position |

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use unveil_core::{Error, Rect, Size};

/// A point along an element or the viewport: a fraction of its height plus pixels
#[derive(Clone, Copy, Debug, PartialEq, Default)]
pub struct Edge {
    pub fraction: f32,
    pub px: f32,
}

impl Edge {
    pub const TOP: Edge = Edge::fraction(0.0);
    pub const CENTER: Edge = Edge::fraction(0.5);
    pub const BOTTOM: Edge = Edge::fraction(1.0);

    pub const fn fraction(fraction: f32) -> Self {
        Self { fraction, px: 0.0 }
    }

    pub const fn px(px: f32) -> Self {
        Self { fraction: 0.0, px }
    }

    /// Shift by `px` pixels (builder pattern)
    pub fn plus(mut self, px: f32) -> Self {
        self.px += px;
        self
    }

    /// Distance from the start of a span of `length`
    pub fn along(&self, length: f32) -> f32 {
        self.fraction * length + self.px
    }
}

impl fmt::Display for Edge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.fraction == 0.0 {
            f.write_str("top")?;
        } else if self.fraction == 0.5 {
            f.write_str("center")?;
        } else if self.fraction == 1.0 {
            f.write_str("bottom")?;
        } else {
            write!(f, "{}%", self.fraction * 100.0)?;
        }
        if self.px > 0.0 {
            write!(f, "+={}", self.px)?;
        } else if self.px < 0.0 {
            write!(f, "-={}", -self.px)?;
        }
        Ok(())
    }
}

impl FromStr for Edge {
    type Err = Error;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        let text = input.trim();
        let (base, shift) = match text.find("+=").or_else(|| text.find("-=")) {
            Some(at) if at > 0 => {
                let amount = parse_px(&text[at + 2..], input)?;
                let sign = if text[at..].starts_with('-') { -1.0 } else { 1.0 };
                (&text[..at], sign * amount)
            }
            _ => (text, 0.0),
        };

        let edge = match base {
            "top" => Edge::TOP,
            "center" => Edge::CENTER,
            "bottom" => Edge::BOTTOM,
            "" => return Err(Error::parse("edge", input, "empty edge")),
            other => {
                if let Some(percent) = other.strip_suffix('%') {
                    let value = percent.trim().parse::<f32>().map_err(|_| {
                        Error::parse("edge", input, format!("'{}' is not a percentage", other))
                    })?;
                    Edge::fraction(value / 100.0)
                } else {
                    Edge::px(parse_px(other, input)?)
                }
            }
        };
        Ok(edge.plus(shift))
    }
}

fn parse_px(text: &str, input: &str) -> Result<f32, Error> {
    let text = text.trim();
    let number = text.strip_suffix("px").unwrap_or(text);
    number
        .trim()
        .parse::<f32>()
        .ok()
        .filter(|v| v.is_finite())
        .ok_or_else(|| Error::parse("offset", input, format!("'{}' is not a pixel value", text)))
}

/// Where a scroll window starts or ends
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Offset {
    /// Element edge meets viewport edge
    Anchor { element: Edge, viewport: Edge },
    /// Pixels after the resolved start of the same window
    Relative(f32),
    /// Fixed scroll position in pixels
    Absolute(f32),
}

impl Offset {
    /// Default window start: the element's top enters at the viewport bottom
    pub const START: Offset = Offset::Anchor {
        element: Edge::TOP,
        viewport: Edge::BOTTOM,
    };

    /// Default window end: the element's bottom leaves at the viewport top
    pub const END: Offset = Offset::Anchor {
        element: Edge::BOTTOM,
        viewport: Edge::TOP,
    };

    pub fn anchor(element: Edge, viewport: Edge) -> Self {
        Offset::Anchor { element, viewport }
    }

    /// Scroll position this offset refers to
    ///
    /// `rect` is the element's document rect. `start` is the already resolved
    /// window start, used by [`Offset::Relative`]; without one the offset is
    /// taken from scroll position 0.
    pub fn resolve(&self, rect: &Rect, viewport: Size, start: Option<f32>) -> f32 {
        match *self {
            Offset::Anchor { element, viewport: edge } => {
                rect.top() + element.along(rect.height()) - edge.along(viewport.height)
            }
            Offset::Relative(px) => start.unwrap_or(0.0) + px,
            Offset::Absolute(px) => px,
        }
    }
}

impl fmt::Display for Offset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Offset::Anchor { element, viewport } => write!(f, "{} {}", element, viewport),
            Offset::Relative(px) if px < 0.0 => write!(f, "-={}", -px),
            Offset::Relative(px) => write!(f, "+={}", px),
            Offset::Absolute(px) => write!(f, "{}", px),
        }
    }
}

impl FromStr for Offset {
    type Err = Error;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        let text = input.trim();
        if let Some(rest) = text.strip_prefix("+=") {
            return Ok(Offset::Relative(parse_px(rest, input)?));
        }
        if let Some(rest) = text.strip_prefix("-=") {
            return Ok(Offset::Relative(-parse_px(rest, input)?));
        }

        let mut parts = text.split_whitespace();
        match (parts.next(), parts.next(), parts.next()) {
            (Some(single), None, None) => {
                if let Ok(px) = single.parse::<f32>() {
                    return Ok(Offset::Absolute(px));
                }
                Ok(Offset::Anchor {
                    element: single.parse()?,
                    viewport: Edge::TOP,
                })
            }
            (Some(element), Some(viewport), None) => Ok(Offset::Anchor {
                element: element.parse()?,
                viewport: viewport.parse()?,
            }),
            (None, _, _) => Err(Error::parse("offset", input, "empty offset")),
            _ => Err(Error::parse(
                "offset",
                input,
                "expected '<element-edge> <viewport-edge>'",
            )),
        }
    }
}

impl TryFrom<String> for Offset {
    type Error = Error;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Offset> for String {
    fn from(offset: Offset) -> Self {
        offset.to_string()
    }
}
