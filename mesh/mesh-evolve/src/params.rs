//! Surface evolution settings.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::error::EvolveError;

/// Settings for a surface evolution run.
///
/// # Example
///
/// ```
/// use mesh_evolve::SurfaceEvolutionSettings;
///
/// let settings = SurfaceEvolutionSettings::named("sphere-wrap")
///     .with_steps(40)
///     .with_time_step(0.01);
/// assert!(settings.validate().is_ok());
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SurfaceEvolutionSettings {
    /// Run name, used in report output and snapshot file names.
    pub name: String,
    /// Number of implicit time steps.
    pub n_steps: u32,
    /// Time step `tau`.
    pub time_step: f64,
    /// Iso-level `c` of the field the surface converges to.
    pub field_iso_level: f64,
    /// Subdivision level of the initial ico-sphere.
    pub ico_sphere_subdivision: u32,
    /// Adaptive remeshing runs every this many steps (0 disables).
    pub remeshing_interval: u32,
    /// Weight of the tangential redistribution term in the right-hand
    /// side (0 disables).
    pub tangential_redistribution_weight: f64,
    /// Multiplier on the expected mean co-volume area in the
    /// stabilization scale factor.
    pub stabilization_factor: f64,
    /// Export an OBJ snapshot of the surface after every step.
    pub export_per_step: bool,
    /// Directory for snapshots; required when `export_per_step` is set.
    pub output_dir: Option<PathBuf>,
}

impl Default for SurfaceEvolutionSettings {
    fn default() -> Self {
        Self {
            name: "evolution".to_owned(),
            n_steps: 20,
            time_step: 0.01,
            field_iso_level: 0.0,
            ico_sphere_subdivision: 3,
            remeshing_interval: 1,
            tangential_redistribution_weight: 0.0,
            stabilization_factor: 1.0,
            export_per_step: false,
            output_dir: None,
        }
    }
}

impl SurfaceEvolutionSettings {
    /// Default settings with a run name.
    #[must_use]
    pub fn named(name: &str) -> Self {
        Self {
            name: name.to_owned(),
            ..Self::default()
        }
    }

    /// Sets the step count.
    #[must_use]
    pub fn with_steps(mut self, n_steps: u32) -> Self {
        self.n_steps = n_steps;
        self
    }

    /// Sets the time step.
    #[must_use]
    pub fn with_time_step(mut self, time_step: f64) -> Self {
        self.time_step = time_step;
        self
    }

    /// Sets the field iso-level.
    #[must_use]
    pub fn with_iso_level(mut self, iso_level: f64) -> Self {
        self.field_iso_level = iso_level;
        self
    }

    /// Sets the initial ico-sphere subdivision.
    #[must_use]
    pub fn with_subdivision(mut self, level: u32) -> Self {
        self.ico_sphere_subdivision = level;
        self
    }

    /// Sets the remeshing interval.
    #[must_use]
    pub fn with_remeshing_interval(mut self, interval: u32) -> Self {
        self.remeshing_interval = interval;
        self
    }

    /// Sets the tangential redistribution weight.
    #[must_use]
    pub fn with_tangential_redistribution(mut self, weight: f64) -> Self {
        self.tangential_redistribution_weight = weight;
        self
    }

    /// Enables per-step snapshot export into `output_dir`.
    #[must_use]
    pub fn with_snapshot_export(mut self, output_dir: PathBuf) -> Self {
        self.export_per_step = true;
        self.output_dir = Some(output_dir);
        self
    }

    /// Checks the numeric fields.
    ///
    /// # Errors
    ///
    /// Returns the first violated constraint.
    pub fn validate(&self) -> Result<(), EvolveError> {
        if self.n_steps == 0 {
            return Err(EvolveError::InvalidSetting {
                name: "n_steps",
                value: 0.0,
            });
        }
        if self.time_step <= 0.0 || !self.time_step.is_finite() {
            return Err(EvolveError::InvalidSetting {
                name: "time_step",
                value: self.time_step,
            });
        }
        if self.stabilization_factor <= 0.0 || !self.stabilization_factor.is_finite() {
            return Err(EvolveError::InvalidSetting {
                name: "stabilization_factor",
                value: self.stabilization_factor,
            });
        }
        if !self.field_iso_level.is_finite() {
            return Err(EvolveError::InvalidSetting {
                name: "field_iso_level",
                value: self.field_iso_level,
            });
        }
        Ok(())
    }
}

impl std::fmt::Display for SurfaceEvolutionSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "> > > > > Initiating surface evolution: {} < < < < <", self.name)?;
        writeln!(f, "n_steps: {},", self.n_steps)?;
        writeln!(f, "time_step: {},", self.time_step)?;
        writeln!(f, "field_iso_level: {},", self.field_iso_level)?;
        writeln!(f, "ico_sphere_subdivision: {},", self.ico_sphere_subdivision)?;
        write!(f, "remeshing_interval: {}", self.remeshing_interval)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        assert!(SurfaceEvolutionSettings::default().validate().is_ok());
    }

    #[test]
    fn invalid_fields_rejected() {
        assert!(SurfaceEvolutionSettings::default()
            .with_steps(0)
            .validate()
            .is_err());
        assert!(SurfaceEvolutionSettings::default()
            .with_time_step(-0.1)
            .validate()
            .is_err());
        assert!(SurfaceEvolutionSettings::default()
            .with_iso_level(f64::NAN)
            .validate()
            .is_err());
    }

    #[test]
    fn display_reports_run_block() {
        let text = SurfaceEvolutionSettings::named("armadillo").to_string();
        assert!(text.contains("armadillo"));
        assert!(text.contains("n_steps"));
        assert!(text.contains("time_step"));
    }
}
