//! Lattice axes.

use std::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::FfdError;

/// One of the three local lattice axes.
///
/// Converts from the numeric axis indices `0`, `1` and `2`:
///
/// ```
/// use mesh_ffd::Axis;
///
/// assert_eq!(Axis::try_from(1).unwrap(), Axis::Y);
/// assert!(Axis::try_from(3).is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Axis {
    /// Local x axis (index 0).
    X,
    /// Local y axis (index 1).
    Y,
    /// Local z axis (index 2).
    Z,
}

impl Axis {
    /// All axes in index order.
    pub const ALL: [Self; 3] = [Self::X, Self::Y, Self::Z];

    /// The numeric index of this axis.
    #[must_use]
    pub const fn index(self) -> usize {
        match self {
            Self::X => 0,
            Self::Y => 1,
            Self::Z => 2,
        }
    }

    /// Lowercase axis name, as used in parameter file keys.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::X => "x",
            Self::Y => "y",
            Self::Z => "z",
        }
    }
}

impl TryFrom<usize> for Axis {
    type Error = FfdError;

    fn try_from(axis: usize) -> Result<Self, Self::Error> {
        match axis {
            0 => Ok(Self::X),
            1 => Ok(Self::Y),
            2 => Ok(Self::Z),
            _ => Err(FfdError::InvalidAxis { axis }),
        }
    }
}

impl fmt::Display for Axis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn index_roundtrip() {
        for axis in Axis::ALL {
            assert_eq!(Axis::try_from(axis.index()).ok(), Some(axis));
        }
    }

    #[test]
    fn rejects_out_of_range() {
        let err = Axis::try_from(7).unwrap_err();
        assert!(matches!(err, FfdError::InvalidAxis { axis: 7 }));
        assert!(err.is_validation());
    }

    #[test]
    fn display_names() {
        assert_eq!(Axis::X.to_string(), "x");
        assert_eq!(Axis::Z.to_string(), "z");
    }
}
