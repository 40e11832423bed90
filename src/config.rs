//! Tunable constants for a maze session.
//!
//! Every number that shapes the maze, the entity batches, the player and the
//! interaction rules lives in [`GameConfig`]. The defaults reproduce the
//! classic 35x35 gallery; a RON file can override any subset of fields.
//!
//! ```ron
//! (
//!     rows: 21,
//!     cols: 21,
//!     seed: Some(7),
//!     player: (run_speed: 18.0),
//! )
//! ```

use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Errors raised while loading or validating a [`GameConfig`].
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{axis} must be odd for doubled-lattice carving, got {value}")]
    EvenDimension { axis: &'static str, value: usize },
    #[error("{axis} must be at least 3, got {value}")]
    TooSmall { axis: &'static str, value: usize },
    #[error("{field} must be positive, got {value}")]
    NonPositive { field: &'static str, value: f32 },
    #[error("{field} must lie in [0, 1], got {value}")]
    OutsideUnit { field: String, value: f32 },
    #[error("{field} has min greater than max")]
    InvertedRange { field: String },
    #[error("click threshold must be at least 1")]
    ZeroThreshold,
    #[error("failed to read config {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: ron::error::SpannedError,
    },
}

/// Inclusive per-axis size range `[x, y, z]`.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct SizeRange {
    pub min: [f32; 3],
    pub max: [f32; 3],
}

impl SizeRange {
    /// Interpolates each axis with its own unit sample.
    pub fn sample(&self, t: [f32; 3]) -> [f32; 3] {
        [
            self.min[0] + (self.max[0] - self.min[0]) * t[0],
            self.min[1] + (self.max[1] - self.min[1]) * t[1],
            self.min[2] + (self.max[2] - self.min[2]) * t[2],
        ]
    }

    fn is_inverted(&self) -> bool {
        (0..3).any(|axis| self.min[axis] > self.max[axis])
    }
}

/// One batch of destructible sculptures sharing a poster and a soundtrack.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct SculptureBatch {
    pub name: String,
    pub image: PathBuf,
    pub audio: Option<PathBuf>,
    pub count: usize,
    pub size: SizeRange,
    /// Fraction of the cell footprint the centre may wander across.
    pub jitter: f32,
    /// Flat colour used when the poster cannot be loaded.
    pub placeholder: [u8; 3],
}

impl SculptureBatch {
    fn named(name: &str, placeholder: [u8; 3]) -> Self {
        Self {
            name: name.to_string(),
            image: PathBuf::from(format!("posters/{name}.webp")),
            audio: Some(PathBuf::from(format!("ost/{name}.mp3"))),
            count: 40,
            size: SizeRange {
                min: [1.5, 2.0, 1.5],
                max: [3.5, 6.0, 3.5],
            },
            jitter: 0.8,
            placeholder,
        }
    }
}

/// The scattered mini figures that open the preview overlay.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct FigureBatch {
    pub count: usize,
    pub color: [u8; 3],
    pub jitter: f32,
    /// Uniform scale applied to the base shape dimensions.
    pub scale: (f32, f32),
}

impl Default for FigureBatch {
    fn default() -> Self {
        Self {
            count: 50,
            color: [0x00, 0xff, 0x00],
            jitter: 1.0 / 3.0,
            scale: (1.0, 1.0),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct PlayerConfig {
    pub radius: f32,
    pub base_speed: f32,
    pub run_speed: f32,
    pub look_sensitivity: f32,
    pub start_height: f32,
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            radius: 0.6,
            base_speed: 6.0,
            run_speed: 12.0,
            look_sensitivity: 0.0025,
            start_height: 1.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct InteractionConfig {
    pub click_threshold: u32,
    pub removal_delay_ms: u64,
    pub escape_duration: f32,
    /// Final vertical displacement of the walls, in world units.
    pub wall_lift: f32,
    /// Constant upward speed of surviving sculptures during escape.
    pub rise_speed: f32,
}

impl Default for InteractionConfig {
    fn default() -> Self {
        Self {
            click_threshold: 3,
            removal_delay_ms: 300,
            escape_duration: 2.0,
            wall_lift: 1000.0,
            rise_speed: 500.0,
        }
    }
}

impl InteractionConfig {
    pub fn removal_delay(&self) -> Duration {
        Duration::from_millis(self.removal_delay_ms)
    }
}

/// Complete configuration for one session.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    pub rows: usize,
    pub cols: usize,
    pub cell_size: f32,
    pub wall_height: f32,
    pub exit_height: f32,
    /// Outward growth of the exit block as a fraction of the cell size.
    pub exit_protrusion: f32,
    pub seed: Option<u64>,
    pub sculptures: Vec<SculptureBatch>,
    pub figures: FigureBatch,
    pub player: PlayerConfig,
    pub interaction: InteractionConfig,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            rows: 35,
            cols: 35,
            cell_size: 6.0,
            wall_height: 5.0,
            exit_height: 1.5,
            exit_protrusion: 0.18,
            seed: None,
            sculptures: vec![
                SculptureBatch::named("terminator", [150, 60, 40]),
                SculptureBatch::named("robocop", [120, 120, 140]),
                SculptureBatch::named("matrix", [30, 140, 60]),
                SculptureBatch::named("ghost-in-the-shell", [70, 90, 160]),
                SculptureBatch::named("serial-experiments-lain", [160, 80, 140]),
            ],
            figures: FigureBatch::default(),
            player: PlayerConfig::default(),
            interaction: InteractionConfig::default(),
        }
    }
}

impl GameConfig {
    /// Loads a RON config, or the defaults when `path` does not exist.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            tracing::debug!("no config at {}, using defaults", path.display());
            return Ok(Self::default());
        }
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_ron(&text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        tracing::info!("loaded config from {}", path.display());
        Ok(config)
    }

    pub fn from_ron(text: &str) -> Result<Self, ron::error::SpannedError> {
        ron::from_str(text)
    }

    /// Rejects configurations that would miscarve the maze or break the
    /// interaction rules.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (axis, value) in [("rows", self.rows), ("cols", self.cols)] {
            if value < 3 {
                return Err(ConfigError::TooSmall { axis, value });
            }
            if value % 2 == 0 {
                return Err(ConfigError::EvenDimension { axis, value });
            }
        }

        let positive = [
            ("cell_size", self.cell_size),
            ("wall_height", self.wall_height),
            ("exit_height", self.exit_height),
            ("player.radius", self.player.radius),
            ("interaction.escape_duration", self.interaction.escape_duration),
        ];
        for (field, value) in positive {
            if value <= 0.0 || value.is_nan() {
                return Err(ConfigError::NonPositive { field, value });
            }
        }
        let non_negative = [
            ("exit_protrusion", self.exit_protrusion),
            ("player.base_speed", self.player.base_speed),
            ("player.run_speed", self.player.run_speed),
        ];
        for (field, value) in non_negative {
            if value < 0.0 || value.is_nan() {
                return Err(ConfigError::NonPositive { field, value });
            }
        }

        if self.interaction.click_threshold == 0 {
            return Err(ConfigError::ZeroThreshold);
        }
        for batch in &self.sculptures {
            if batch.size.is_inverted() {
                return Err(ConfigError::InvertedRange {
                    field: format!("sculptures.{}.size", batch.name),
                });
            }
            check_unit(format!("sculptures.{}.jitter", batch.name), batch.jitter)?;
        }
        check_unit("figures.jitter".to_string(), self.figures.jitter)?;
        // a non-positive scale would turn figure bounds inside out
        if self.figures.scale.0 <= 0.0 || self.figures.scale.0.is_nan() {
            return Err(ConfigError::NonPositive {
                field: "figures.scale",
                value: self.figures.scale.0,
            });
        }
        if self.figures.scale.0 > self.figures.scale.1 {
            return Err(ConfigError::InvertedRange {
                field: "figures.scale".to_string(),
            });
        }
        Ok(())
    }
}

/// Jitter is a fraction of the cell footprint, so it must stay in `[0, 1]`.
fn check_unit(field: String, value: f32) -> Result<(), ConfigError> {
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(ConfigError::OutsideUnit { field, value })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// The defaults describe the classic gallery and pass validation.
    #[test]
    fn test_defaults_are_valid() {
        let config = GameConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.rows, 35);
        assert_eq!(config.sculptures.len(), 5);
        assert_eq!(
            config.sculptures[2].image,
            PathBuf::from("posters/matrix.webp")
        );
        assert_eq!(config.interaction.click_threshold, 3);
    }

    /// Even or degenerate dimensions are refused before any carving happens.
    #[test]
    fn test_rejects_bad_dimensions() {
        let even = GameConfig {
            rows: 10,
            ..GameConfig::default()
        };
        assert!(matches!(
            even.validate(),
            Err(ConfigError::EvenDimension { axis: "rows", value: 10 })
        ));

        let tiny = GameConfig {
            cols: 1,
            ..GameConfig::default()
        };
        assert!(matches!(
            tiny.validate(),
            Err(ConfigError::TooSmall { axis: "cols", value: 1 })
        ));

        let two = GameConfig {
            rows: 2,
            ..GameConfig::default()
        };
        assert!(matches!(two.validate(), Err(ConfigError::TooSmall { .. })));
    }

    #[test]
    fn test_rejects_inverted_size_range() {
        let mut config = GameConfig::default();
        config.sculptures[0].size = SizeRange {
            min: [2.0, 2.0, 2.0],
            max: [1.0, 3.0, 3.0],
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvertedRange { .. })
        ));
    }

    /// Jitter past the cell footprint and non-positive figure scales are refused.
    #[test]
    fn test_rejects_jitter_and_scale() {
        let mut config = GameConfig::default();
        config.sculptures[0].jitter = 5.0;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::OutsideUnit { ref field, .. }) if field == "sculptures.terminator.jitter"
        ));

        let mut config = GameConfig::default();
        config.figures.jitter = -0.1;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::OutsideUnit { .. })
        ));

        let mut config = GameConfig::default();
        config.figures.scale = (-2.0, -1.0);
        assert!(matches!(
            config.validate(),
            Err(ConfigError::NonPositive { field: "figures.scale", .. })
        ));

        let mut config = GameConfig::default();
        config.figures.scale = (0.0, 1.0);
        assert!(config.validate().is_err());

        let mut config = GameConfig::default();
        config.sculptures[1].jitter = 1.0;
        config.figures.jitter = 0.0;
        assert!(config.validate().is_ok());
    }

    /// Partial RON documents only override the fields they name.
    #[test]
    fn test_partial_ron_override() {
        let config = GameConfig::from_ron(
            "(rows: 21, cols: 15, seed: Some(9), player: (run_speed: 20.0))",
        )
        .expect("valid ron");
        assert_eq!(config.rows, 21);
        assert_eq!(config.cols, 15);
        assert_eq!(config.seed, Some(9));
        assert_eq!(config.player.run_speed, 20.0);
        assert_eq!(config.player.base_speed, 6.0);
        assert_eq!(config.sculptures.len(), 5);
    }

    #[test]
    fn test_missing_file_yields_defaults() {
        let config = GameConfig::load(Path::new("definitely/not/here.ron")).expect("defaults");
        assert_eq!(config, GameConfig::default());
    }
}
