//! Distance field generation settings.

use serde::{Deserialize, Serialize};
use sw_spatial::KdSplitPolicy;

/// How the sign of the distance field is determined.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum SignComputation {
    /// Leave the field unsigned.
    None,
    /// Angle-weighted pseudonormal at the closest surface feature.
    ///
    /// Robust for meshes with consistent winding; works per cell with no
    /// global pass.
    PseudoNormal,
    /// Flood fill from the grid boundary through cells outside the narrow
    /// band; unreached cells are interior.
    ///
    /// Requires a closed surface. Non-watertight input may leak sign
    /// through slivers narrower than one cell.
    #[default]
    VoxelFloodFill,
}

/// Optional box-kernel smoothing applied after sign computation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum BlurPostprocessing {
    /// No smoothing.
    #[default]
    None,
    /// Average over the 3x3x3 neighborhood.
    ThreeCubeAverage,
    /// Average over the 5x5x5 neighborhood.
    FiveCubeAverage,
}

impl BlurPostprocessing {
    /// Kernel radius in cells (0 when disabled).
    #[must_use]
    pub const fn radius(&self) -> usize {
        match self {
            Self::None => 0,
            Self::ThreeCubeAverage => 1,
            Self::FiveCubeAverage => 2,
        }
    }
}

/// How narrow-band distances are seeded before fast sweeping.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum FieldPreprocessing {
    /// Per-voxel brute force over every face. No acceleration structure;
    /// only sensible for tiny meshes and tests.
    None,
    /// Per-voxel nearest query against a triangle KD-tree.
    NoOctree,
    /// Face-set octree traversal that only descends into nodes within the
    /// truncation band.
    #[default]
    Octree,
}

/// Settings for [`crate::generate_sdf`].
///
/// # Example
///
/// ```
/// use mesh_sdf::DistanceFieldSettings;
///
/// let settings = DistanceFieldSettings::with_cell_size(0.02)
///     .with_truncation_value(0.2);
/// assert!(settings.validate().is_ok());
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DistanceFieldSettings {
    /// Grid cell size in world units.
    pub cell_size: f64,

    /// The mesh box is expanded by `volume_expansion_factor * min_extent`
    /// on all sides before the grid is allocated.
    pub volume_expansion_factor: f64,

    /// Narrow-band half width in world units; cells farther from the
    /// surface are pinned to this value.
    pub truncation_value: f64,

    /// Split policy of the KD-tree used for seeding and pseudonormal sign.
    pub kdtree_split_policy: KdSplitPolicy,

    /// Sign determination mode.
    pub sign_computation: SignComputation,

    /// Post-sign smoothing.
    pub blur: BlurPostprocessing,

    /// Narrow-band seeding strategy.
    pub preprocessing: FieldPreprocessing,
}

impl Default for DistanceFieldSettings {
    fn default() -> Self {
        Self {
            cell_size: 0.02,
            volume_expansion_factor: 1.0,
            truncation_value: 0.2,
            kdtree_split_policy: KdSplitPolicy::Center,
            sign_computation: SignComputation::VoxelFloodFill,
            blur: BlurPostprocessing::None,
            preprocessing: FieldPreprocessing::Octree,
        }
    }
}

impl DistanceFieldSettings {
    /// Default settings with the given cell size.
    #[must_use]
    pub fn with_cell_size(cell_size: f64) -> Self {
        Self {
            cell_size,
            ..Self::default()
        }
    }

    /// Sets the volume expansion factor.
    #[must_use]
    pub const fn with_expansion_factor(mut self, factor: f64) -> Self {
        self.volume_expansion_factor = factor;
        self
    }

    /// Sets the truncation value.
    #[must_use]
    pub const fn with_truncation_value(mut self, truncation: f64) -> Self {
        self.truncation_value = truncation;
        self
    }

    /// Sets the sign computation mode.
    #[must_use]
    pub const fn with_sign_computation(mut self, sign: SignComputation) -> Self {
        self.sign_computation = sign;
        self
    }

    /// Sets the blur mode.
    #[must_use]
    pub const fn with_blur(mut self, blur: BlurPostprocessing) -> Self {
        self.blur = blur;
        self
    }

    /// Sets the preprocessing mode.
    #[must_use]
    pub const fn with_preprocessing(mut self, preprocessing: FieldPreprocessing) -> Self {
        self.preprocessing = preprocessing;
        self
    }

    /// Sets the KD-tree split policy.
    #[must_use]
    pub const fn with_split_policy(mut self, policy: KdSplitPolicy) -> Self {
        self.kdtree_split_policy = policy;
        self
    }

    /// Checks the numeric fields.
    ///
    /// # Errors
    ///
    /// Returns the first violated constraint.
    pub fn validate(&self) -> Result<(), crate::SdfError> {
        if self.cell_size <= 0.0 || !self.cell_size.is_finite() {
            return Err(crate::SdfError::InvalidCellSize(self.cell_size));
        }
        if self.truncation_value <= 0.0 || !self.truncation_value.is_finite() {
            return Err(crate::SdfError::InvalidTruncation(self.truncation_value));
        }
        if self.volume_expansion_factor < 0.0 || !self.volume_expansion_factor.is_finite() {
            return Err(crate::SdfError::InvalidExpansionFactor(
                self.volume_expansion_factor,
            ));
        }
        Ok(())
    }
}

impl std::fmt::Display for DistanceFieldSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "cell_size: {},", self.cell_size)?;
        writeln!(f, "volume_expansion_factor: {},", self.volume_expansion_factor)?;
        writeln!(f, "truncation_value: {},", self.truncation_value)?;
        writeln!(f, "kdtree_split_policy: {:?},", self.kdtree_split_policy)?;
        writeln!(f, "sign_computation: {:?},", self.sign_computation)?;
        writeln!(f, "blur: {:?},", self.blur)?;
        write!(f, "preprocessing: {:?}", self.preprocessing)
    }
}
