//! Transition presets, directional geometry and drag inertia.
//!
//! A [`LoadAnim`] preset names a transition style. [`LoadAnimAttr::new`]
//! turns a preset and the screen extents into four start/end pairs (push
//! enter, push exit, pop enter, pop exit) plus the [`Channel`] the values are
//! written to.
//!
//! # Preset Families
//!
//! | Family | Entering page | Exiting page | Drag axis |
//! |--------|---------------|--------------|-----------|
//! | `Over*` | slides in over | stays put underneath | along the slide |
//! | `Move*` | slides in | slides out | along the slide |
//! | `FadeOn` | fades in | stays opaque | none |
//! | `None` | jumps | jumps | none |
//!
//! Only overlay presets with a drag axis allow the entering page to be dragged
//! back out (see [`LoadAnim::is_overlay`]).

use embedded_graphics::geometry::{Point, Size};

use crate::config::{DRAG_THROW_PERCENT, OPA_COVER, OPA_TRANSP};
use crate::error::PageError;

// =============================================================================
// Presets
// =============================================================================

/// Transition style for page switches.
///
/// The raw ids match the table-driven page configs: `0` means "use the
/// manager-wide default" and ids above [`LoadAnim::LAST`] are invalid.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum LoadAnim {
    /// Use the manager-wide default.
    #[default]
    Global = 0,
    /// New page slides over from the right edge towards the left.
    OverLeft = 1,
    /// New page slides over from the left edge towards the right.
    OverRight = 2,
    /// New page slides over from the bottom edge towards the top.
    OverTop = 3,
    /// New page slides over from the top edge towards the bottom.
    OverBottom = 4,
    /// Both pages move to the left.
    MoveLeft = 5,
    /// Both pages move to the right.
    MoveRight = 6,
    /// Both pages move up.
    MoveTop = 7,
    /// Both pages move down.
    MoveBottom = 8,
    /// New page fades in over the old one.
    FadeOn = 9,
    /// No animation.
    None = 10,
}

impl LoadAnim {
    /// Highest valid raw id.
    pub const LAST: u8 = Self::None as u8;

    /// Whether only the entering page moves (the page beneath stays static).
    pub const fn is_overlay(self) -> bool {
        matches!(self, Self::OverLeft | Self::OverRight | Self::OverTop | Self::OverBottom)
    }

    /// Raw preset id.
    #[inline]
    pub const fn id(self) -> u8 { self as u8 }
}

impl TryFrom<u8> for LoadAnim {
    type Error = PageError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Ok(match value {
            0 => Self::Global,
            1 => Self::OverLeft,
            2 => Self::OverRight,
            3 => Self::OverTop,
            4 => Self::OverBottom,
            5 => Self::MoveLeft,
            6 => Self::MoveRight,
            7 => Self::MoveTop,
            8 => Self::MoveBottom,
            9 => Self::FadeOn,
            10 => Self::None,
            _ => return Err(PageError::InvalidPreset),
        })
    }
}

// =============================================================================
// Easing
// =============================================================================

/// Animation curve mapping linear progress to eased progress.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Easing {
    Linear,
    EaseIn,
    #[default]
    EaseOut,
    EaseInOut,
    /// Overshoots the target slightly and settles back.
    Overshoot,
    Bounce,
    /// Holds the start value and jumps to the end.
    Step,
}

impl Easing {
    /// Apply the curve to `t` in `0.0..=1.0`.
    pub fn apply(
        self,
        t: f32,
    ) -> f32 {
        let t = t.clamp(0.0, 1.0);
        match self {
            Self::Linear => t,
            Self::EaseIn => t * t * t,
            Self::EaseOut => {
                let inv = 1.0 - t;
                1.0 - inv * inv * inv
            }
            Self::EaseInOut => 0.5 - 0.5 * micromath::F32(core::f32::consts::PI * t).cos().0,
            Self::Overshoot => {
                const C1: f32 = 1.701_58;
                const C3: f32 = C1 + 1.0;
                let u = t - 1.0;
                1.0 + C3 * u * u * u + C1 * u * u
            }
            Self::Bounce => bounce_out(t),
            Self::Step => {
                if t >= 1.0 {
                    1.0
                } else {
                    0.0
                }
            }
        }
    }
}

fn bounce_out(t: f32) -> f32 {
    const N1: f32 = 7.5625;
    const D1: f32 = 2.75;

    if t < 1.0 / D1 {
        N1 * t * t
    } else if t < 2.0 / D1 {
        let u = t - 1.5 / D1;
        N1 * u * u + 0.75
    } else if t < 2.5 / D1 {
        let u = t - 2.25 / D1;
        N1 * u * u + 0.9375
    } else {
        let u = t - 2.625 / D1;
        N1 * u * u + 0.984_375
    }
}

// =============================================================================
// Animation Spec
// =============================================================================

/// Preset + duration + easing triple.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct AnimSpec {
    pub anim: LoadAnim,
    pub duration_ms: u32,
    pub easing: Easing,
}

impl AnimSpec {
    pub const fn new(
        anim: LoadAnim,
        duration_ms: u32,
        easing: Easing,
    ) -> Self {
        Self {
            anim,
            duration_ms,
            easing,
        }
    }

    /// Duration actually used for the switch (zero for [`LoadAnim::None`]).
    #[inline]
    pub const fn effective_duration_ms(&self) -> u32 {
        if matches!(self.anim, LoadAnim::None) { 0 } else { self.duration_ms }
    }
}

// =============================================================================
// Geometry
// =============================================================================

/// Axis a page can be dragged along.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DragDir {
    #[default]
    None,
    Horizontal,
    Vertical,
}

/// Scene property a transition animates.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Channel {
    X,
    Y,
    Opacity,
}

/// Start and end value of one directional animation.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct AnimRange {
    pub start: i32,
    pub end: i32,
}

impl AnimRange {
    pub const fn new(
        start: i32,
        end: i32,
    ) -> Self {
        Self { start, end }
    }

    /// Lower bound of the range.
    #[inline]
    pub fn min(&self) -> i32 { self.start.min(self.end) }

    /// Upper bound of the range.
    #[inline]
    pub fn max(&self) -> i32 { self.start.max(self.end) }

    /// Signed travel distance.
    #[inline]
    pub const fn travel(&self) -> i32 { self.end - self.start }
}

/// Enter/exit ranges for one navigation direction.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct EnterExit {
    pub enter: AnimRange,
    pub exit: AnimRange,
}

/// Resolved geometry of a preset for a given screen.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct LoadAnimAttr {
    pub drag_dir: DragDir,
    /// Channel the values apply to; `None` for [`LoadAnim::None`].
    pub channel: Option<Channel>,
    pub push: EnterExit,
    pub pop: EnterExit,
}

impl LoadAnimAttr {
    /// Compute the geometry of `anim` on a `screen`-sized display.
    ///
    /// Returns `None` for [`LoadAnim::Global`], which has to be resolved to a
    /// concrete preset first.
    pub fn new(
        anim: LoadAnim,
        screen: Size,
    ) -> Option<Self> {
        let hor = screen.width as i32;
        let ver = screen.height as i32;

        // (drag_dir, push.enter, push.exit, pop.enter, pop.exit)
        let (drag_dir, push_enter, push_exit, pop_enter, pop_exit) = match anim {
            LoadAnim::Global => return None,
            LoadAnim::None => return Some(Self::default()),
            LoadAnim::OverLeft => (DragDir::Horizontal, (hor, 0), (0, 0), (0, 0), (0, hor)),
            LoadAnim::OverRight => (DragDir::Horizontal, (-hor, 0), (0, 0), (0, 0), (0, -hor)),
            LoadAnim::OverTop => (DragDir::Vertical, (ver, 0), (0, 0), (0, 0), (0, ver)),
            LoadAnim::OverBottom => (DragDir::Vertical, (-ver, 0), (0, 0), (0, 0), (0, -ver)),
            LoadAnim::MoveLeft => (DragDir::Horizontal, (hor, 0), (0, -hor), (-hor, 0), (0, hor)),
            LoadAnim::MoveRight => (DragDir::Horizontal, (-hor, 0), (0, hor), (hor, 0), (0, -hor)),
            LoadAnim::MoveTop => (DragDir::Vertical, (ver, 0), (0, -ver), (-ver, 0), (0, ver)),
            LoadAnim::MoveBottom => (DragDir::Vertical, (-ver, 0), (0, ver), (ver, 0), (0, -ver)),
            LoadAnim::FadeOn => (
                DragDir::None,
                (OPA_TRANSP, OPA_COVER),
                (OPA_COVER, OPA_COVER),
                (OPA_COVER, OPA_COVER),
                (OPA_COVER, OPA_TRANSP),
            ),
        };

        let channel = match drag_dir {
            DragDir::Horizontal => Channel::X,
            DragDir::Vertical => Channel::Y,
            DragDir::None => Channel::Opacity,
        };

        let range = |(start, end): (i32, i32)| AnimRange::new(start, end);
        Some(Self {
            drag_dir,
            channel: Some(channel),
            push: EnterExit {
                enter: range(push_enter),
                exit: range(push_exit),
            },
            pop: EnterExit {
                enter: range(pop_enter),
                exit: range(pop_exit),
            },
        })
    }

    /// Geometry for a raw preset id. Fails for ids out of range.
    pub fn from_id(
        id: u8,
        screen: Size,
    ) -> Result<Self, PageError> {
        let anim = LoadAnim::try_from(id)?;
        Self::new(anim, screen).ok_or(PageError::InvalidPreset)
    }

    /// Component of `point` along the drag axis (zero when not draggable).
    pub const fn along_axis(
        &self,
        point: Point,
    ) -> i32 {
        match self.drag_dir {
            DragDir::Horizontal => point.x,
            DragDir::Vertical => point.y,
            DragDir::None => 0,
        }
    }
}

// =============================================================================
// Drag Inertia
// =============================================================================

/// Predict how much further a released drag would travel.
///
/// Each axis is accumulated independently: the velocity is added, then
/// decayed by [`DRAG_THROW_PERCENT`] with integer truncation toward zero,
/// until it reaches exactly zero.
///
/// The sum saturates at the `i32` range.
pub fn predict_drag(velocity: Point) -> Point {
    Point::new(predict_axis(velocity.x), predict_axis(velocity.y))
}

fn predict_axis(mut v: i32) -> i32 {
    let mut sum = 0i32;
    while v != 0 {
        sum = sum.saturating_add(v);
        // |v| shrinks every step, so the i64 result always fits back in i32
        v = (i64::from(v) * i64::from(100 - DRAG_THROW_PERCENT) / 100) as i32;
    }
    sum
}

// =============================================================================
// Tests
// =============================================================================
