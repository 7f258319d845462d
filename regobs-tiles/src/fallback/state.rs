//! Per-tile fallback state machine.

use std::fmt;
use std::str::FromStr;

use crate::coord::TileCoord;

use super::style::TileStyle;

/// When the offline store is consulted during a fallback chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OfflineLookupPolicy {
    /// Look up the original tile's id once, on the first failure.
    #[default]
    OncePerTile,
    /// Additionally look up each failed ancestor's own id once.
    PerAncestor,
}

impl OfflineLookupPolicy {
    pub fn as_str(&self) -> &'static str {
        match self {
            OfflineLookupPolicy::OncePerTile => "once_per_tile",
            OfflineLookupPolicy::PerAncestor => "per_ancestor",
        }
    }
}

impl fmt::Display for OfflineLookupPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OfflineLookupPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "once_per_tile" | "once" => Ok(OfflineLookupPolicy::OncePerTile),
            "per_ancestor" => Ok(OfflineLookupPolicy::PerAncestor),
            other => Err(format!(
                "unknown offline lookup policy '{}', expected once_per_tile or per_ancestor",
                other
            )),
        }
    }
}

/// Next move of a fallback chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FallbackStep {
    /// Try this ancestor, displayed with `style`.
    Ancestor { coord: TileCoord, style: TileStyle },
    /// Zoom cannot decrease further.
    Exhausted,
}

/// Fallback progress of one in-flight tile.
///
/// Created on the tile's first load failure and dropped when the tile
/// loads, is substituted, exhausts its chain or is discarded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FallbackState {
    original: TileCoord,
    current: TileCoord,
    fallback_zoom_delta: u8,
    scale_factor: u32,
    has_tried_offline_store: bool,
}

impl FallbackState {
    pub fn new(original: TileCoord) -> Self {
        Self {
            original,
            current: original,
            fallback_zoom_delta: 0,
            scale_factor: 1,
            has_tried_offline_store: false,
        }
    }

    pub fn original(&self) -> TileCoord {
        self.original
    }

    /// The coordinate currently being attempted.
    pub fn current(&self) -> TileCoord {
        self.current
    }

    pub fn fallback_zoom_delta(&self) -> u8 {
        self.fallback_zoom_delta
    }

    pub fn scale_factor(&self) -> u32 {
        self.scale_factor
    }

    pub fn has_tried_offline_store(&self) -> bool {
        self.has_tried_offline_store
    }

    /// Whether an offline store lookup is still allowed for the current coordinate.
    pub fn should_try_offline_store(&self) -> bool {
        !self.has_tried_offline_store
    }

    pub fn mark_offline_store_tried(&mut self) {
        self.has_tried_offline_store = true;
    }

    /// Move one zoom level up.
    ///
    /// Increments the delta and doubles the scale, then either reports
    /// exhaustion (`original.z - delta < 1`) or halves the current
    /// coordinate and returns the resulting ancestor with its style.
    /// Under [`OfflineLookupPolicy::PerAncestor`] the new ancestor gets its
    /// own store lookup.
    pub fn advance(&mut self, tile_size: u32, policy: OfflineLookupPolicy) -> FallbackStep {
        self.fallback_zoom_delta = self.fallback_zoom_delta.saturating_add(1);
        self.scale_factor = self.scale_factor.saturating_mul(2);

        if i16::from(self.original.z()) - i16::from(self.fallback_zoom_delta) < 1 {
            return FallbackStep::Exhausted;
        }

        let Some(parent) = self.current.parent() else {
            return FallbackStep::Exhausted;
        };
        self.current = parent;

        if policy == OfflineLookupPolicy::PerAncestor {
            self.has_tried_offline_store = false;
        }

        FallbackStep::Ancestor {
            coord: parent,
            style: TileStyle::for_ancestor(&self.original, &parent, self.scale_factor, tile_size),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn coord(z: u8, x: u32, y: u32) -> TileCoord {
        TileCoord::new(z, x, y).unwrap()
    }

    fn ancestor(step: FallbackStep) -> TileCoord {
        match step {
            FallbackStep::Ancestor { coord, .. } => coord,
            FallbackStep::Exhausted => panic!("unexpected exhaustion"),
        }
    }

    #[test]
    fn test_successive_halving() {
        let mut state = FallbackState::new(coord(10, 513, 341));
        let policy = OfflineLookupPolicy::OncePerTile;

        assert_eq!(ancestor(state.advance(256, policy)), coord(9, 256, 170));
        assert_eq!(state.scale_factor(), 2);
        assert_eq!(ancestor(state.advance(256, policy)), coord(8, 128, 85));
        assert_eq!(state.scale_factor(), 4);
        assert_eq!(state.fallback_zoom_delta(), 2);
        assert_eq!(state.original(), coord(10, 513, 341));
        assert_eq!(state.current(), coord(8, 128, 85));
    }

    #[test]
    fn test_step_style() {
        let mut state = FallbackState::new(coord(10, 513, 341));
        match state.advance(256, OfflineLookupPolicy::OncePerTile) {
            FallbackStep::Ancestor { style, .. } => {
                assert_eq!(style.clip.top, 256);
                assert_eq!(style.clip.left, 256);
                assert_eq!(style.width, 512);
            }
            FallbackStep::Exhausted => panic!("unexpected exhaustion"),
        }
    }

    #[test]
    fn test_chain_length_is_z_minus_one() {
        for z in 0..=18u8 {
            let mut state = FallbackState::new(coord(z, 0, 0));
            let mut attempts = 0u32;
            while let FallbackStep::Ancestor { .. } =
                state.advance(256, OfflineLookupPolicy::OncePerTile)
            {
                attempts += 1;
            }
            assert_eq!(attempts, u32::from(z.saturating_sub(1)), "zoom {}", z);
        }
    }

    #[test]
    fn test_stays_exhausted() {
        let mut state = FallbackState::new(coord(1, 1, 1));
        assert_eq!(
            state.advance(256, OfflineLookupPolicy::OncePerTile),
            FallbackStep::Exhausted
        );
        assert_eq!(
            state.advance(256, OfflineLookupPolicy::OncePerTile),
            FallbackStep::Exhausted
        );
    }

    #[test]
    fn test_once_per_tile_keeps_flag() {
        let mut state = FallbackState::new(coord(5, 10, 12));
        assert!(state.should_try_offline_store());
        state.mark_offline_store_tried();
        state.advance(256, OfflineLookupPolicy::OncePerTile);
        assert!(!state.should_try_offline_store());
    }

    #[test]
    fn test_per_ancestor_resets_flag() {
        let mut state = FallbackState::new(coord(5, 10, 12));
        state.mark_offline_store_tried();
        state.advance(256, OfflineLookupPolicy::PerAncestor);
        assert!(state.should_try_offline_store());
        assert!(!state.has_tried_offline_store());
    }

    #[test]
    fn test_policy_parse() {
        assert_eq!(
            "per_ancestor".parse::<OfflineLookupPolicy>(),
            Ok(OfflineLookupPolicy::PerAncestor)
        );
        assert_eq!(
            " Once_Per_Tile ".parse::<OfflineLookupPolicy>(),
            Ok(OfflineLookupPolicy::OncePerTile)
        );
        assert!("sometimes".parse::<OfflineLookupPolicy>().is_err());
        assert_eq!(OfflineLookupPolicy::default().to_string(), "once_per_tile");
    }
}
