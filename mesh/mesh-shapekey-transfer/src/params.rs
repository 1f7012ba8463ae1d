//! Transfer parameters and inclusion policy.

use crate::CancelToken;
use std::collections::HashSet;

/// Controls which source keys are provisioned onto the destination.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[non_exhaustive]
pub enum InclusionMode {
    /// Every source key passes, subject only to the exclusion checks.
    #[default]
    All,

    /// Only keys present in the listed set pass.
    IncludeListed,

    /// Only keys absent from the listed set pass.
    ExcludeListed,
}

/// Space in which blended positions are written into the destination store.
///
/// Blending produces a point derived from the destination vertex's *world*
/// position. Historically that point was stored directly as the shape key's
/// local-space value, which is only exact when the destination sits at an
/// identity or translation-only transform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[non_exhaustive]
pub enum ResultSpace {
    /// Store the world-derived position as-is (the historical behavior).
    #[default]
    World,

    /// Convert through the destination's inverse world transform before
    /// storing, reproducing the source edit under rotated or scaled
    /// destination transforms.
    DestinationLocal,
}

/// Parameters for a shape key transfer.
///
/// Use the builder methods to configure the operation.
///
/// # Examples
///
/// ```
/// use mesh_shapekey_transfer::{InclusionMode, TransferParams};
///
/// let params = TransferParams::new()
///     .with_increment_radius(0.1)
///     .with_max_increments(10)
///     .with_single_nearest(false)
///     .with_inclusion_mode(InclusionMode::IncludeListed)
///     .with_listed_keys(["Smile".to_owned()]);
///
/// assert!(params.listed_keys.contains("Smile"));
/// ```
#[derive(Debug, Clone)]
pub struct TransferParams {
    /// World-space radius added to the search sphere on each retry
    /// (default: 0.05). Must be positive.
    pub increment_radius: f64,

    /// Number of radius retries before a vertex is declared unmatched
    /// (default: 20).
    pub max_increments: u32,

    /// Reduce each match set to the single closest source vertex
    /// (default: true). Exact-distance ties go to the lowest vertex index.
    pub use_single_nearest: bool,

    /// When a vertex finds no correspondence, leave it untouched and keep
    /// going instead of aborting the whole transfer (default: true).
    pub skip_unmatched: bool,

    /// Which source keys to provision and transfer (default: [`InclusionMode::All`]).
    pub inclusion_mode: InclusionMode,

    /// Key names consulted by [`InclusionMode::IncludeListed`] and
    /// [`InclusionMode::ExcludeListed`].
    pub listed_keys: HashSet<String>,

    /// Key names that never transfer, regardless of mode or list
    /// (default: the basis aliases).
    pub default_excluded_keys: HashSet<String>,

    /// Space in which blended positions are stored
    /// (default: [`ResultSpace::World`]).
    pub result_space: ResultSpace,

    /// Optional cooperative cancellation flag, checked between vertices.
    pub cancel: Option<CancelToken>,
}

impl Default for TransferParams {
    fn default() -> Self {
        Self {
            increment_radius: 0.05,
            max_increments: 20,
            use_single_nearest: true,
            skip_unmatched: true,
            inclusion_mode: InclusionMode::All,
            listed_keys: HashSet::new(),
            default_excluded_keys: mesh_shapekey::BASIS_ALIASES
                .iter()
                .map(|&s| s.to_owned())
                .collect(),
            result_space: ResultSpace::World,
            cancel: None,
        }
    }
}

impl TransferParams {
    /// Creates parameters with the defaults.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the radius increment added on each search retry.
    #[must_use]
    pub const fn with_increment_radius(mut self, radius: f64) -> Self {
        self.increment_radius = radius;
        self
    }

    /// Sets the number of radius retries before giving up on a vertex.
    #[must_use]
    pub const fn with_max_increments(mut self, retries: u32) -> Self {
        self.max_increments = retries;
        self
    }

    /// Enables or disables single-nearest matching.
    #[must_use]
    pub const fn with_single_nearest(mut self, enabled: bool) -> Self {
        self.use_single_nearest = enabled;
        self
    }

    /// Enables or disables skipping unmatched vertices.
    #[must_use]
    pub const fn with_skip_unmatched(mut self, enabled: bool) -> Self {
        self.skip_unmatched = enabled;
        self
    }

    /// Sets the inclusion mode.
    #[must_use]
    pub const fn with_inclusion_mode(mut self, mode: InclusionMode) -> Self {
        self.inclusion_mode = mode;
        self
    }

    /// Sets the listed key names.
    #[must_use]
    pub fn with_listed_keys(mut self, keys: impl IntoIterator<Item = String>) -> Self {
        self.listed_keys = keys.into_iter().collect();
        self
    }

    /// Replaces the default-excluded key names.
    #[must_use]
    pub fn with_default_excluded_keys(mut self, keys: impl IntoIterator<Item = String>) -> Self {
        self.default_excluded_keys = keys.into_iter().collect();
        self
    }

    /// Sets the space blended positions are stored in.
    #[must_use]
    pub const fn with_result_space(mut self, space: ResultSpace) -> Self {
        self.result_space = space;
        self
    }

    /// Attaches a cancellation token.
    #[must_use]
    pub fn with_cancel_token(mut self, token: CancelToken) -> Self {
        self.cancel = Some(token);
        self
    }

    /// Returns whether a key name passes the inclusion policy.
    ///
    /// Basis aliases and default-excluded names never pass.
    #[must_use]
    pub fn includes_key(&self, name: &str) -> bool {
        if mesh_shapekey::is_basis_name(name) || self.default_excluded_keys.contains(name) {
            return false;
        }
        match self.inclusion_mode {
            InclusionMode::All => true,
            InclusionMode::IncludeListed => self.listed_keys.contains(name),
            InclusionMode::ExcludeListed => !self.listed_keys.contains(name),
        }
    }

    /// Returns whether the attached token, if any, has been cancelled.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.cancel.as_ref().is_some_and(CancelToken::is_cancelled)
    }
}
