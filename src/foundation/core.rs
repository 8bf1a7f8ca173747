use serde::{Deserialize, Deserializer};

use crate::foundation::error::{ZonecastError, ZonecastResult};

pub use kurbo::{Affine, Point};

/// Monotonic session time in milliseconds.
///
/// Every scheduler in a presentation reads the same clock; `Millis(0)` is the instant the
/// presentation started.
#[derive(
    Clone,
    Copy,
    Debug,
    Default,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    serde::Serialize,
    serde::Deserialize,
)]
pub struct Millis(pub u64);

impl Millis {
    /// Session start.
    pub const ZERO: Self = Self(0);

    /// Build from whole seconds.
    pub fn from_secs(secs: u64) -> Self {
        Self(secs.saturating_mul(1000))
    }

    /// Advance by `delta_ms`, saturating at `u64::MAX`.
    pub fn after(self, delta_ms: u64) -> Self {
        Self(self.0.saturating_add(delta_ms))
    }

    /// Milliseconds elapsed since `earlier` (zero when `earlier` is in the future).
    pub fn since(self, earlier: Millis) -> u64 {
        self.0.saturating_sub(earlier.0)
    }

    /// Value in fractional seconds.
    pub fn as_secs_f64(self) -> f64 {
        self.0 as f64 / 1000.0
    }
}

/// Axis-aligned rectangle in canvas percentage space.
///
/// Coordinates are percentages of the canvas (`0..=100`). Overflow past the right or bottom edge
/// is representable; see [`Rect::is_within_canvas`].
#[derive(Clone, Copy, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Rect {
    /// Left edge, percent of canvas width.
    #[serde(default)]
    pub x: f64,
    /// Top edge, percent of canvas height.
    #[serde(default)]
    pub y: f64,
    /// Width, percent of canvas width.
    #[serde(default)]
    pub width: f64,
    /// Height, percent of canvas height.
    #[serde(default)]
    pub height: f64,
}

impl Rect {
    /// Construct a rectangle from position and size.
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// The whole canvas.
    pub fn full() -> Self {
        Self::new(0.0, 0.0, 100.0, 100.0)
    }

    /// Right edge (`x + width`).
    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    /// Bottom edge (`y + height`).
    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }

    /// Center point in percent space.
    pub fn center(&self) -> Point {
        Point::new(self.x + self.width / 2.0, self.y + self.height / 2.0)
    }

    /// Return `true` when every edge lies inside `[0, 100]`.
    pub fn is_within_canvas(&self) -> bool {
        let in_range = |v: f64| (0.0..=100.0).contains(&v);
        in_range(self.x)
            && in_range(self.y)
            && in_range(self.width)
            && in_range(self.height)
            && self.right() <= 100.0
            && self.bottom() <= 100.0
    }

    /// Map this rectangle onto a pixel canvas of `width x height`.
    pub fn to_pixels(&self, width: u32, height: u32) -> kurbo::Rect {
        let sx = f64::from(width) / 100.0;
        let sy = f64::from(height) / 100.0;
        kurbo::Rect::new(
            self.x * sx,
            self.y * sy,
            self.right() * sx,
            self.bottom() * sy,
        )
    }
}

/// Quarter-turn rotation in degrees, serialized as the bare number (`0`, `90`, `180`, `270`).
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize,
)]
#[serde(try_from = "i64", into = "u16")]
pub enum Rotation {
    /// No rotation.
    #[default]
    Deg0,
    /// Quarter turn clockwise.
    Deg90,
    /// Half turn.
    Deg180,
    /// Three quarter turns clockwise.
    Deg270,
}

impl Rotation {
    /// Every supported rotation in ascending order.
    pub const ALL: [Rotation; 4] = [Self::Deg0, Self::Deg90, Self::Deg180, Self::Deg270];

    /// Parse a degree value; only the four quarter turns are accepted.
    pub fn from_degrees(deg: i64) -> ZonecastResult<Self> {
        match deg {
            0 => Ok(Self::Deg0),
            90 => Ok(Self::Deg90),
            180 => Ok(Self::Deg180),
            270 => Ok(Self::Deg270),
            other => Err(ZonecastError::validation(format!(
                "rotation must be one of 0, 90, 180, 270 (got {other})"
            ))),
        }
    }

    /// Degrees in `0..360`.
    pub fn degrees(self) -> u16 {
        match self {
            Self::Deg0 => 0,
            Self::Deg90 => 90,
            Self::Deg180 => 180,
            Self::Deg270 => 270,
        }
    }

    /// Angle in radians (clockwise in screen space).
    pub fn radians(self) -> f64 {
        f64::from(self.degrees()).to_radians()
    }

    /// Rotation about `center` as an affine transform.
    pub fn about(self, center: Point) -> Affine {
        if self == Self::Deg0 {
            return Affine::IDENTITY;
        }
        Affine::rotate_about(self.radians(), center)
    }
}

impl TryFrom<i64> for Rotation {
    type Error = ZonecastError;

    fn try_from(deg: i64) -> Result<Self, Self::Error> {
        Self::from_degrees(deg)
    }
}

impl From<Rotation> for u16 {
    fn from(r: Rotation) -> Self {
        r.degrees()
    }
}

impl std::fmt::Display for Rotation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}deg", self.degrees())
    }
}

/// Deserialize `null` as the type's default.
///
/// Older saved layouts carry `null` where newer ones carry an empty array or `0`.
pub(crate) fn null_as_default<'de, D, T>(d: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(d)?.unwrap_or_default())
}

/// Mint a fresh opaque identifier.
pub fn new_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/core.rs"]
mod tests;
