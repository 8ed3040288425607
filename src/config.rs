use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Réglages du moteur de génération. Chaque champ a une valeur par défaut.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Heure d'ouverture (incluse).
    pub open_hour: u8,
    /// Heure de fermeture (exclue).
    pub close_hour: u8,
    pub block: BlockPolicy,
    pub weights: ScoreWeights,
    /// Plafond utilisé pour le ratio d'équité quand `max_hours` vaut 0.
    pub default_max_hours: f64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            open_hour: 8,
            close_hour: 18,
            block: BlockPolicy::default(),
            weights: ScoreWeights::default(),
            default_max_hours: 20.0,
        }
    }
}

impl EngineConfig {
    pub fn validate(&self) -> Result<()> {
        if self.close_hour > 24 {
            bail!("close_hour must be <= 24");
        }
        if self.open_hour >= self.close_hour {
            bail!("open_hour must be before close_hour");
        }
        if !(self.default_max_hours.is_finite() && self.default_max_hours > 0.0) {
            bail!("default_max_hours must be a positive number");
        }
        self.block.validate()?;
        Ok(())
    }

    /// Libellé nominal de la fenêtre d'ouverture, ex. `8:00-18:00`.
    pub fn time_slot_label(&self) -> String {
        format!("{}:00-{}:00", self.open_hour, self.close_hour)
    }
}

/// Longueurs de blocs acceptées.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BlockPolicy {
    /// Longueur maximale d'un bloc.
    pub max_hours: u8,
    pub preferred_min: u8,
    pub preferred_max: u8,
}

impl Default for BlockPolicy {
    fn default() -> Self {
        Self {
            max_hours: 5,
            preferred_min: 3,
            preferred_max: 4,
        }
    }
}

impl BlockPolicy {
    fn validate(&self) -> Result<()> {
        if self.preferred_min == 0 {
            bail!("block.preferred_min must be >= 1");
        }
        if self.preferred_min > self.preferred_max {
            bail!("block.preferred_min must not exceed block.preferred_max");
        }
        if self.preferred_max > self.max_hours {
            bail!("block.preferred_max must not exceed block.max_hours");
        }
        Ok(())
    }

    pub fn is_preferred(&self, len: u8) -> bool {
        (self.preferred_min..=self.preferred_max).contains(&len)
    }
}

/// Poids des termes du score d'affectation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoreWeights {
    pub fairness: f64,
    pub day_spread: f64,
    pub preferred_block: f64,
    pub acceptable_block: f64,
    pub continuity: f64,
}

impl Default for ScoreWeights {
    fn default() -> Self {
        Self {
            fairness: 100.0,
            day_spread: 10.0,
            preferred_block: 15.0,
            acceptable_block: 5.0,
            continuity: 8.0,
        }
    }
}

pub fn load_config_from_file<P: AsRef<Path>>(path: P) -> Result<EngineConfig> {
    let path = path.as_ref();
    let data = fs::read(path).with_context(|| format!("reading config {}", path.display()))?;
    let config: EngineConfig = serde_json::from_slice(&data)
        .with_context(|| format!("parsing config {}", path.display()))?;
    config.validate()?;
    Ok(config)
}

pub fn export_config_json<P: AsRef<Path>>(path: P, config: &EngineConfig) -> Result<()> {
    let json = serde_json::to_string_pretty(config)?;
    fs::write(path, json)?;
    Ok(())
}
