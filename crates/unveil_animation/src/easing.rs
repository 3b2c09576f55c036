//! Easing curves
//!
//! An easing maps linear progress (0.0 to 1.0) to eased progress. Curves are
//! named with the same vocabulary page authors already write:
//!
//! | Name | Curve |
//! |---|---|
//! | `linear`, `none` | identity |
//! | `ease`, `easeIn`, `easeOut`, `easeInOut` | CSS cubic-bezier presets |
//! | `power1` .. `power4` + `.in` / `.out` / `.inOut` | polynomial of degree N+1 |
//! | `sine.*`, `expo.*` | trigonometric / exponential |
//! | `back.out(1.6)` | overshooting back curve with the given strength |
//! | `cubic-bezier(x1, y1, x2, y2)` | custom bezier |
//! | `steps(n)` | n discrete jumps |
//!
//! A name without a mode suffix (`power2`, `back`) means `.out`.

use serde::{Deserialize, Serialize};
use std::f32::consts::PI;
use std::fmt;
use std::str::FromStr;
use unveil_core::Error;

/// Default overshoot for `back` curves
pub const BACK_OVERSHOOT: f32 = 1.70158;

/// Which end of the curve is eased
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
pub enum EaseMode {
    In,
    #[default]
    Out,
    InOut,
}

impl EaseMode {
    fn suffix(self) -> &'static str {
        match self {
            EaseMode::In => "in",
            EaseMode::Out => "out",
            EaseMode::InOut => "inOut",
        }
    }

    /// Derive out / in-out variants from an ease-in curve
    fn shape(self, t: f32, ease_in: impl Fn(f32) -> f32) -> f32 {
        match self {
            EaseMode::In => ease_in(t),
            EaseMode::Out => 1.0 - ease_in(1.0 - t),
            EaseMode::InOut => {
                if t < 0.5 {
                    ease_in(t * 2.0) / 2.0
                } else {
                    1.0 - ease_in((1.0 - t) * 2.0) / 2.0
                }
            }
        }
    }
}

/// Easing function
#[derive(Clone, Copy, Debug, PartialEq, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Easing {
    #[default]
    Linear,
    /// CSS `ease`
    Ease,
    /// CSS `ease-in`
    EaseIn,
    /// CSS `ease-out`
    EaseOut,
    /// CSS `ease-in-out`
    EaseInOut,
    /// Polynomial curve of degree `power + 1` (power 1 is quadratic)
    Power { power: u8, mode: EaseMode },
    Sine(EaseMode),
    Expo(EaseMode),
    /// Overshooting curve; `overshoot` controls how far it pulls back
    Back { mode: EaseMode, overshoot: f32 },
    CubicBezier { x1: f32, y1: f32, x2: f32, y2: f32 },
    /// Discrete jumps at the end of each interval
    Steps(u32),
}

impl Easing {
    /// Apply easing to a progress value
    ///
    /// Input is clamped to 0.0-1.0. Output is exactly 0.0 at 0.0 and exactly
    /// 1.0 at 1.0 for every curve; `Back` and some beziers leave that range in
    /// between.
    pub fn apply(&self, t: f32) -> f32 {
        let t = t.clamp(0.0, 1.0);
        if t <= 0.0 {
            return 0.0;
        }
        if t >= 1.0 {
            return 1.0;
        }

        match *self {
            Easing::Linear => t,
            Easing::Ease => cubic_bezier(0.25, 0.1, 0.25, 1.0, t),
            Easing::EaseIn => cubic_bezier(0.42, 0.0, 1.0, 1.0, t),
            Easing::EaseOut => cubic_bezier(0.0, 0.0, 0.58, 1.0, t),
            Easing::EaseInOut => cubic_bezier(0.42, 0.0, 0.58, 1.0, t),
            Easing::Power { power, mode } => {
                let exponent = i32::from(power.clamp(1, 4)) + 1;
                mode.shape(t, |x| x.powi(exponent))
            }
            Easing::Sine(mode) => mode.shape(t, |x| 1.0 - (x * PI / 2.0).cos()),
            Easing::Expo(mode) => mode.shape(t, |x| {
                if x <= 0.0 {
                    0.0
                } else {
                    2f32.powf(10.0 * x - 10.0)
                }
            }),
            Easing::Back { mode, overshoot } => {
                mode.shape(t, |x| x * x * ((overshoot + 1.0) * x - overshoot))
            }
            Easing::CubicBezier { x1, y1, x2, y2 } => cubic_bezier(x1, y1, x2, y2, t),
            Easing::Steps(count) => {
                if count == 0 {
                    t
                } else {
                    let n = count as f32;
                    (t * n).floor() / n
                }
            }
        }
    }

    pub fn power(power: u8, mode: EaseMode) -> Self {
        Easing::Power { power, mode }
    }

    pub fn back_out(overshoot: f32) -> Self {
        Easing::Back {
            mode: EaseMode::Out,
            overshoot,
        }
    }
}

/// Evaluate a cubic bezier curve with endpoints (0,0) and (1,1) at `progress`
fn cubic_bezier(x1: f32, y1: f32, x2: f32, y2: f32, progress: f32) -> f32 {
    let t = solve_bezier_x(x1, x2, progress);
    bezier_coord(y1, y2, t)
}

/// Find the curve parameter whose x equals `target_x`
///
/// Newton-Raphson first; falls back to bisection when the slope is too flat.
fn solve_bezier_x(x1: f32, x2: f32, target_x: f32) -> f32 {
    let mut t = target_x;
    for _ in 0..8 {
        let error = bezier_coord(x1, x2, t) - target_x;
        if error.abs() < 1e-6 {
            return t;
        }
        let slope = bezier_slope(x1, x2, t);
        if slope.abs() < 1e-6 {
            break;
        }
        t = (t - error / slope).clamp(0.0, 1.0);
    }

    let (mut lo, mut hi) = (0.0f32, 1.0f32);
    t = target_x;
    for _ in 0..32 {
        let x = bezier_coord(x1, x2, t);
        if (x - target_x).abs() < 1e-6 {
            break;
        }
        if x < target_x {
            lo = t;
        } else {
            hi = t;
        }
        t = (lo + hi) / 2.0;
    }
    t
}

/// One coordinate of the bezier: 3(1-t)²t·p1 + 3(1-t)t²·p2 + t³
#[inline]
fn bezier_coord(p1: f32, p2: f32, t: f32) -> f32 {
    let mt = 1.0 - t;
    3.0 * mt * mt * t * p1 + 3.0 * mt * t * t * p2 + t * t * t
}

#[inline]
fn bezier_slope(p1: f32, p2: f32, t: f32) -> f32 {
    let mt = 1.0 - t;
    3.0 * mt * mt * p1 + 6.0 * mt * t * (p2 - p1) + 3.0 * t * t * (1.0 - p2)
}

// ============================================================================
// Name grammar
// ============================================================================

impl fmt::Display for Easing {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Easing::Linear => f.write_str("linear"),
            Easing::Ease => f.write_str("ease"),
            Easing::EaseIn => f.write_str("easeIn"),
            Easing::EaseOut => f.write_str("easeOut"),
            Easing::EaseInOut => f.write_str("easeInOut"),
            Easing::Power { power, mode } => write!(f, "power{}.{}", power, mode.suffix()),
            Easing::Sine(mode) => write!(f, "sine.{}", mode.suffix()),
            Easing::Expo(mode) => write!(f, "expo.{}", mode.suffix()),
            Easing::Back { mode, overshoot } => {
                write!(f, "back.{}({})", mode.suffix(), overshoot)
            }
            Easing::CubicBezier { x1, y1, x2, y2 } => {
                write!(f, "cubic-bezier({}, {}, {}, {})", x1, y1, x2, y2)
            }
            Easing::Steps(count) => write!(f, "steps({})", count),
        }
    }
}

impl FromStr for Easing {
    type Err = Error;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        let name = input.trim();
        let fail = |reason: &str| Error::parse("easing", input, reason);

        match name {
            "linear" | "none" | "power0" => return Ok(Easing::Linear),
            "ease" => return Ok(Easing::Ease),
            "easeIn" | "ease-in" => return Ok(Easing::EaseIn),
            "easeOut" | "ease-out" => return Ok(Easing::EaseOut),
            "easeInOut" | "ease-in-out" => return Ok(Easing::EaseInOut),
            _ => {}
        }

        // Functional forms: cubic-bezier(...), steps(n), back.out(1.6)
        let (head, args) = match name.find('(') {
            Some(open) => {
                let close = name
                    .strip_suffix(')')
                    .ok_or_else(|| fail("missing closing parenthesis"))?;
                (&name[..open], Some(&close[open + 1..]))
            }
            None => (name, None),
        };

        if head == "cubic-bezier" {
            let values = parse_args(args.unwrap_or_default()).map_err(|r| fail(&r))?;
            let [x1, y1, x2, y2] = values[..] else {
                return Err(fail("cubic-bezier takes four numbers"));
            };
            if !(0.0..=1.0).contains(&x1) || !(0.0..=1.0).contains(&x2) {
                return Err(fail("bezier x values must be in [0, 1]"));
            }
            return Ok(Easing::CubicBezier { x1, y1, x2, y2 });
        }

        if head == "steps" {
            let count = args
                .unwrap_or_default()
                .trim()
                .parse::<u32>()
                .map_err(|_| fail("steps takes a positive integer"))?;
            if count == 0 {
                return Err(fail("steps must be at least 1"));
            }
            return Ok(Easing::Steps(count));
        }

        let (family, mode) = match head.split_once('.') {
            Some((family, suffix)) => {
                let mode = match suffix {
                    "in" => EaseMode::In,
                    "out" => EaseMode::Out,
                    "inOut" => EaseMode::InOut,
                    _ => return Err(fail("mode must be in, out or inOut")),
                };
                (family, mode)
            }
            None => (head, EaseMode::Out),
        };

        if family == "back" {
            let overshoot = match args {
                Some(args) => {
                    let values = parse_args(args).map_err(|r| fail(&r))?;
                    match values[..] {
                        [strength] => strength,
                        _ => return Err(fail("back takes one strength value")),
                    }
                }
                None => BACK_OVERSHOOT,
            };
            return Ok(Easing::Back { mode, overshoot });
        }

        if args.is_some() {
            return Err(fail("unexpected arguments"));
        }

        match family {
            "sine" => Ok(Easing::Sine(mode)),
            "expo" => Ok(Easing::Expo(mode)),
            // Named power curves use the GSAP aliases quad..quint too
            "quad" => Ok(Easing::power(1, mode)),
            "cubic" => Ok(Easing::power(2, mode)),
            "quart" => Ok(Easing::power(3, mode)),
            "quint" => Ok(Easing::power(4, mode)),
            _ => {
                let power = family
                    .strip_prefix("power")
                    .and_then(|n| n.parse::<u8>().ok())
                    .ok_or_else(|| fail("unknown easing name"))?;
                match power {
                    0 => Ok(Easing::Linear),
                    1..=4 => Ok(Easing::power(power, mode)),
                    _ => Err(fail("power must be 1 to 4")),
                }
            }
        }
    }
}

fn parse_args(args: &str) -> Result<Vec<f32>, String> {
    args.split(',')
        .map(|part| {
            part.trim()
                .parse::<f32>()
                .map_err(|_| format!("'{}' is not a number", part.trim()))
        })
        .collect()
}

impl TryFrom<String> for Easing {
    type Error = Error;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Easing> for String {
    fn from(easing: Easing) -> Self {
        easing.to_string()
    }
}
