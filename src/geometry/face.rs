//! Cube face identification and enumeration.

use serde::{Deserialize, Serialize};

/// Identifies one of the six faces of a scanner cubemap.
///
/// The discriminant is the face number used in file and job keys
/// (`face0`..`face5`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[repr(u8)]
pub enum CubeFaceId {
    /// -X face (`face0`)
    Back = 0,
    /// +X face (`face1`)
    Right = 1,
    /// +Z face (`face2`)
    Front = 2,
    /// -Z face (`face3`)
    Left = 3,
    /// +Y face (`face4`)
    Top = 4,
    /// -Y face (`face5`)
    Bottom = 5,
}

impl CubeFaceId {
    /// Returns all six cube faces in key order.
    pub const fn all() -> [CubeFaceId; 6] {
        [
            CubeFaceId::Back,
            CubeFaceId::Right,
            CubeFaceId::Front,
            CubeFaceId::Left,
            CubeFaceId::Top,
            CubeFaceId::Bottom,
        ]
    }

    /// Returns the face index (0-5).
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Creates a face from an index (0-5).
    pub const fn from_index(index: usize) -> Option<CubeFaceId> {
        match index {
            0 => Some(CubeFaceId::Back),
            1 => Some(CubeFaceId::Right),
            2 => Some(CubeFaceId::Front),
            3 => Some(CubeFaceId::Left),
            4 => Some(CubeFaceId::Top),
            5 => Some(CubeFaceId::Bottom),
            _ => None,
        }
    }

    /// Returns the job/file key for the face (e.g., "face0", "face4").
    pub const fn key(self) -> &'static str {
        match self {
            CubeFaceId::Back => "face0",
            CubeFaceId::Right => "face1",
            CubeFaceId::Front => "face2",
            CubeFaceId::Left => "face3",
            CubeFaceId::Top => "face4",
            CubeFaceId::Bottom => "face5",
        }
    }

    /// Parses a face key. Accepts any ASCII case (`FACE2`, `Face2`).
    pub fn from_key(key: &str) -> Option<CubeFaceId> {
        let digits = key
            .get(..4)
            .filter(|prefix| prefix.eq_ignore_ascii_case("face"))
            .map(|_| &key[4..])?;
        match digits {
            "0" => Some(CubeFaceId::Back),
            "1" => Some(CubeFaceId::Right),
            "2" => Some(CubeFaceId::Front),
            "3" => Some(CubeFaceId::Left),
            "4" => Some(CubeFaceId::Top),
            "5" => Some(CubeFaceId::Bottom),
            _ => None,
        }
    }

    /// Human-readable name used in log output.
    pub const fn label(self) -> &'static str {
        match self {
            CubeFaceId::Back => "back",
            CubeFaceId::Right => "right",
            CubeFaceId::Front => "front",
            CubeFaceId::Left => "left",
            CubeFaceId::Top => "top",
            CubeFaceId::Bottom => "bottom",
        }
    }
}

impl std::fmt::Display for CubeFaceId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.key(), self.label())
    }
}
