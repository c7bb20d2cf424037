use std::fmt;
use std::str::FromStr;

use bitflags::bitflags;
use smallvec::SmallVec;

use crate::errors::StarmapError;

/// Number of lettered layers (`layera` through `layerp`).
pub const LETTERED_LAYER_COUNT: u8 = 16;

/// A partition of a zone's content.
///
/// `Common` is always active. Lettered layers are toggled per scenario by the
/// zone's [`LayerMask`]. Ordering puts `Common` first, then `A` through `P`,
/// which is also the load and resolve order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Layer {
    Common,
    /// Lettered layer by index, 0 = `layera`. Only `0..16` names a real
    /// layer; build one with [`Layer::lettered`] to stay in range.
    Lettered(u8),
}

impl Layer {
    /// Lettered layer by index, `None` past `layerp`.
    #[must_use]
    pub fn lettered(index: u8) -> Option<Self> {
        (index < LETTERED_LAYER_COUNT).then_some(Self::Lettered(index))
    }

    /// Whether this layer can be carried by a zone and saved under its name.
    #[must_use]
    pub fn is_valid(self) -> bool {
        match self {
            Self::Common => true,
            Self::Lettered(i) => i < LETTERED_LAYER_COUNT,
        }
    }

    /// Lettered layer from a letter `'a'..='p'` (case-insensitive).
    #[must_use]
    pub fn from_letter(letter: char) -> Option<Self> {
        let c = letter.to_ascii_lowercase();
        if ('a'..='p').contains(&c) {
            Some(Self::Lettered(c as u8 - b'a'))
        } else {
            None
        }
    }

    /// The mask bit controlling this layer. `None` for `Common` and for
    /// out-of-range lettered layers.
    #[must_use]
    pub fn bit(self) -> Option<LayerMask> {
        match self {
            Self::Common => None,
            Self::Lettered(i) => 1u16.checked_shl(u32::from(i)).and_then(LayerMask::from_bits),
        }
    }

    /// `Common` is always active; an out-of-range layer never is.
    #[must_use]
    pub fn is_active(self, mask: LayerMask) -> bool {
        match self {
            Self::Common => true,
            Self::Lettered(_) => self.bit().is_some_and(|bit| mask.contains(bit)),
        }
    }

    /// Every layer a zone can carry, in order.
    pub fn all() -> impl Iterator<Item = Layer> {
        std::iter::once(Self::Common).chain((0..LETTERED_LAYER_COUNT).map(Self::Lettered))
    }
}

impl fmt::Display for Layer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Common => f.write_str("common"),
            Self::Lettered(i) if *i < LETTERED_LAYER_COUNT => write!(f, "layer{}", (b'a' + i) as char),
            Self::Lettered(i) => write!(f, "layer#{i}"),
        }
    }
}

impl FromStr for Layer {
    type Err = StarmapError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.to_ascii_lowercase();
        if lower == "common" {
            return Ok(Self::Common);
        }
        let mut suffix = lower.strip_prefix("layer").unwrap_or_default().chars();
        match (suffix.next(), suffix.next()) {
            (Some(letter), None) => {
                Self::from_letter(letter).ok_or_else(|| StarmapError::UnknownLayer(s.to_string()))
            }
            _ => Err(StarmapError::UnknownLayer(s.to_string())),
        }
    }
}

bitflags! {
    /// Per-zone, per-scenario selection of active lettered layers.
    ///
    /// Bit *i* enables lettered layer *i*. `common` has no bit and is always
    /// active.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
    pub struct LayerMask: u16 {
        const A = 1 << 0;
        const B = 1 << 1;
        const C = 1 << 2;
        const D = 1 << 3;
        const E = 1 << 4;
        const F = 1 << 5;
        const G = 1 << 6;
        const H = 1 << 7;
        const I = 1 << 8;
        const J = 1 << 9;
        const K = 1 << 10;
        const L = 1 << 11;
        const M = 1 << 12;
        const N = 1 << 13;
        const O = 1 << 14;
        const P = 1 << 15;
    }
}

impl LayerMask {
    /// Active layers, `Common` first then lettered layers ascending.
    #[must_use]
    pub fn active_layers(self) -> SmallVec<[Layer; 4]> {
        Layer::all().filter(|l| l.is_active(self)).collect()
    }
}
