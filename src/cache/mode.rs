//! Cache mode policy: an ordered enumeration with two interleaved tracks.
//!
//! Plain modes (`never < fresh < stale < always`) state which entry tiers
//! are acceptable unconditionally. Fallback modes state the same, but only
//! activate cached data when the device is offline. The two tracks
//! interleave so that fallback modes sit one rank below their plain
//! counterpart and every fallback mode has odd rank.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum LocalCacheMode {
  /// Never touch the local cache.
  Never,
  /// Offline only: use fresh entries.
  FallbackFresh,
  /// Use fresh entries.
  Fresh,
  /// Offline only: use fresh or stale entries.
  #[default]
  Fallback,
  /// Use fresh or stale entries.
  Stale,
  /// Offline only: use any non-expired entry.
  FallbackAlways,
  /// Use any non-expired entry.
  Always,
}

impl LocalCacheMode {
  /// The mode's position in the total order. Kept as an explicit table so
  /// reordering the variants cannot silently change policy.
  pub const fn rank(self) -> u8 {
    match self {
      Self::Never => 0,
      Self::FallbackFresh => 1,
      Self::Fresh => 2,
      Self::Fallback => 3,
      Self::Stale => 4,
      Self::FallbackAlways => 5,
      Self::Always => 6,
    }
  }

  /// Whether this mode only activates cached data when offline.
  pub const fn is_fallback(self) -> bool {
    matches!(self, Self::FallbackFresh | Self::Fallback | Self::FallbackAlways)
  }

  /// The non-fallback successor of a fallback mode (exactly one rank up);
  /// plain modes promote to themselves.
  pub const fn promote(self) -> Self {
    match self {
      Self::FallbackFresh => Self::Fresh,
      Self::Fallback => Self::Stale,
      Self::FallbackAlways => Self::Always,
      other => other,
    }
  }
}

impl Ord for LocalCacheMode {
  fn cmp(&self, other: &Self) -> std::cmp::Ordering {
    self.rank().cmp(&other.rank())
  }
}

impl PartialOrd for LocalCacheMode {
  fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
    Some(self.cmp(other))
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  const ALL: [LocalCacheMode; 7] = [
    LocalCacheMode::Never,
    LocalCacheMode::FallbackFresh,
    LocalCacheMode::Fresh,
    LocalCacheMode::Fallback,
    LocalCacheMode::Stale,
    LocalCacheMode::FallbackAlways,
    LocalCacheMode::Always,
  ];

  #[test]
  fn test_fallback_modes_have_odd_rank() {
    for mode in ALL {
      assert_eq!(mode.is_fallback(), mode.rank() % 2 == 1, "{mode:?}");
    }
  }

  #[test]
  fn test_promotion_raises_rank_by_exactly_one() {
    for mode in ALL {
      if mode.is_fallback() {
        assert_eq!(mode.promote().rank(), mode.rank() + 1, "{mode:?}");
        assert!(!mode.promote().is_fallback(), "{mode:?}");
      } else {
        assert_eq!(mode.promote(), mode, "{mode:?}");
      }
    }
  }

  #[test]
  fn test_total_order() {
    assert!(LocalCacheMode::Never < LocalCacheMode::Fresh);
    assert!(LocalCacheMode::Fresh < LocalCacheMode::Stale);
    assert!(LocalCacheMode::Stale < LocalCacheMode::Always);
    assert!(LocalCacheMode::Fallback >= LocalCacheMode::Fresh);
    assert!(LocalCacheMode::Fallback < LocalCacheMode::Stale);
  }

  #[test]
  fn test_serde_names_are_kebab_case() {
    let mode: LocalCacheMode = serde_json::from_str("\"fallback-fresh\"").expect("valid");
    assert_eq!(mode, LocalCacheMode::FallbackFresh);
    assert_eq!(
      serde_json::to_string(&LocalCacheMode::Always).expect("valid"),
      "\"always\""
    );
  }

  #[test]
  fn test_default_is_fallback() {
    assert_eq!(LocalCacheMode::default(), LocalCacheMode::Fallback);
  }
}
