//! Configuration loading for the Overseer.
//!
//! All tuning values are loaded once from a TOML file and never change during
//! a session. Every section falls back to its defaults, so a file only needs
//! the keys it overrides.

use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

/// Complete Overseer configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OverseerConfig {
    /// Zone heat model
    #[serde(default)]
    pub suspicion: SuspicionConfig,
    /// Search job leasing
    #[serde(default)]
    pub allocator: AllocatorConfig,
    /// Tension and duty cycle
    #[serde(default)]
    pub tension: TensionConfig,
    /// Pursuer behavior
    #[serde(default)]
    pub pursuer: PursuerConfig,
    /// Player stay reporting
    #[serde(default)]
    pub stay: StayConfig,
}

impl OverseerConfig {
    /// Loads and validates configuration from a TOML file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_str(&content)
    }

    /// Parses and validates configuration from a TOML string.
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(content: &str) -> Result<Self, ConfigError> {
        let config: OverseerConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_toml(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Rejects values the decision components cannot work with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let s = &self.suspicion;
        positive("suspicion.max", s.max)?;
        non_negative("suspicion.decay_per_sec", s.decay_per_sec)?;
        non_negative("suspicion.spread_ratio", s.spread_ratio)?;
        non_negative("suspicion.camp_increment", s.camp_increment)?;
        non_negative("suspicion.camera_increment", s.camera_increment)?;
        non_negative("suspicion.noise_increment", s.noise_increment)?;
        non_negative("suspicion.sight_increment", s.sight_increment)?;
        unit_interval("suspicion.searched_multiplier", s.searched_multiplier)?;
        positive("suspicion.decay_interval_secs", s.decay_interval_secs)?;

        let a = &self.allocator;
        if a.top_k == 0 {
            return Err(invalid("allocator.top_k", "must be at least 1"));
        }
        non_negative("allocator.roulette_power", a.roulette_power)?;
        non_negative("allocator.min_priority", a.min_priority)?;
        non_negative("allocator.lease_ttl_secs", a.lease_ttl_secs)?;

        let t = &self.tension;
        non_negative("tension.increase_per_sec", t.increase_per_sec)?;
        non_negative("tension.decrease_per_sec", t.decrease_per_sec)?;
        within_tension("tension.high_threshold", t.high_threshold)?;
        within_tension("tension.low_threshold", t.low_threshold)?;
        if t.high_threshold <= 0.0 {
            return Err(invalid("tension.high_threshold", "must be positive"));
        }
        if t.low_threshold > t.high_threshold {
            return Err(invalid(
                "tension.low_threshold",
                "must not exceed tension.high_threshold",
            ));
        }
        non_negative("tension.hint_interval_min_secs", t.hint_interval_min_secs)?;
        ordered(
            "tension.hint_interval_min_secs",
            t.hint_interval_min_secs,
            t.hint_interval_max_secs,
        )?;
        non_negative("tension.rest_duration_secs", t.rest_duration_secs)?;
        non_negative("tension.active_duration_secs", t.active_duration_secs)?;

        let p = &self.pursuer;
        non_negative("pursuer.search_duration_min_secs", p.search_duration_min_secs)?;
        ordered(
            "pursuer.search_duration_min_secs",
            p.search_duration_min_secs,
            p.search_duration_max_secs,
        )?;
        non_negative("pursuer.search_radius_min", p.search_radius_min)?;
        ordered(
            "pursuer.search_radius_min",
            p.search_radius_min,
            p.search_radius_max,
        )?;
        unit_interval("pursuer.urgency_on_lose_sight", p.urgency_on_lose_sight)?;
        non_negative("pursuer.urgency_decay_per_sec", p.urgency_decay_per_sec)?;
        positive("pursuer.arrive_distance", p.arrive_distance)?;
        positive("pursuer.waypoint_arrive_distance", p.waypoint_arrive_distance)?;
        non_negative("pursuer.close_distance", p.close_distance)?;
        non_negative("pursuer.hearing_range", p.hearing_range)?;
        non_negative("pursuer.patrol_dwell_secs", p.patrol_dwell_secs)?;

        positive("stay.threshold_secs", self.stay.threshold_secs)?;
        Ok(())
    }
}

fn invalid(field: &'static str, reason: &str) -> ConfigError {
    ConfigError::Invalid {
        field,
        reason: reason.to_string(),
    }
}

fn positive(field: &'static str, value: f32) -> Result<(), ConfigError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(invalid(field, "must be a positive number"))
    }
}

fn non_negative(field: &'static str, value: f32) -> Result<(), ConfigError> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(invalid(field, "must not be negative"))
    }
}

fn unit_interval(field: &'static str, value: f32) -> Result<(), ConfigError> {
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(invalid(field, "must be within [0, 1]"))
    }
}

fn within_tension(field: &'static str, value: f32) -> Result<(), ConfigError> {
    if (0.0..=crate::tension::TENSION_MAX).contains(&value) {
        Ok(())
    } else {
        Err(invalid(field, "must be within [0, 100]"))
    }
}

fn ordered(field: &'static str, min: f32, max: f32) -> Result<(), ConfigError> {
    if min <= max {
        Ok(())
    } else {
        Err(invalid(field, "minimum must not exceed maximum"))
    }
}

/// Zone heat model settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SuspicionConfig {
    /// Upper clamp for every zone
    pub max: f32,
    /// Linear decay applied per simulated second
    pub decay_per_sec: f32,
    /// Fraction of an added amount given to each neighbor
    pub spread_ratio: f32,
    /// Added (with spread) when the player lingers in a zone
    pub camp_increment: f32,
    /// Added directly when a camera spots the player
    pub camera_increment: f32,
    /// Added (with spread) per unit of noise strength
    pub noise_increment: f32,
    /// Added directly to the zone nearest a direct sighting
    pub sight_increment: f32,
    /// Factor applied to a zone after a fruitless search
    pub searched_multiplier: f32,
    /// Seconds between decay steps
    pub decay_interval_secs: f32,
}

impl Default for SuspicionConfig {
    fn default() -> Self {
        Self {
            max: 100.0,
            decay_per_sec: 2.5,
            spread_ratio: 0.2,
            camp_increment: 10.0,
            camera_increment: 40.0,
            noise_increment: 20.0,
            sight_increment: 10.0,
            searched_multiplier: 0.6,
            decay_interval_secs: 1.0,
        }
    }
}

/// Job allocator settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AllocatorConfig {
    /// Shortlist length for the roulette
    pub top_k: usize,
    /// Exponent applied to suspicion before weighting (floored at 0.1)
    pub roulette_power: f32,
    /// Zones below this are never picked (0 disables the cutoff)
    pub min_priority: f32,
    /// Lease lifetime (floored at 0.1)
    pub lease_ttl_secs: f32,
}

impl Default for AllocatorConfig {
    fn default() -> Self {
        Self {
            top_k: 3,
            roulette_power: 1.0,
            min_priority: 0.0,
            lease_ttl_secs: 8.0,
        }
    }
}

/// Tension and duty cycle settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TensionConfig {
    pub increase_per_sec: f32,
    pub decrease_per_sec: f32,
    /// Tension at which the pursuer is sent to rest
    pub high_threshold: f32,
    /// Tension the pursuer must cool down to before resuming
    pub low_threshold: f32,
    /// Job request interval at full tension
    pub hint_interval_min_secs: f32,
    /// Job request interval at zero tension
    pub hint_interval_max_secs: f32,
    /// Minimum length of a rest
    pub rest_duration_secs: f32,
    /// Length of an active shift before a scheduled rest (0 disables)
    pub active_duration_secs: f32,
}

impl Default for TensionConfig {
    fn default() -> Self {
        Self {
            increase_per_sec: 15.0,
            decrease_per_sec: 8.0,
            high_threshold: 85.0,
            low_threshold: 40.0,
            hint_interval_min_secs: 4.0,
            hint_interval_max_secs: 10.0,
            rest_duration_secs: 10.0,
            active_duration_secs: 60.0,
        }
    }
}

/// Pursuer behavior settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PursuerConfig {
    pub search_duration_min_secs: f32,
    pub search_duration_max_secs: f32,
    pub search_radius_min: f32,
    pub search_radius_max: f32,
    /// Urgency gained each time sight is lost
    pub urgency_on_lose_sight: f32,
    pub urgency_decay_per_sec: f32,
    /// Remaining path distance that counts as arrived at a target
    pub arrive_distance: f32,
    /// Remaining path distance that counts as reaching a patrol or sweep point
    pub waypoint_arrive_distance: f32,
    /// Player distance below which the pursuer counts as close
    pub close_distance: f32,
    /// Base hearing range, scaled by noise strength
    pub hearing_range: f32,
    /// Pause at each patrol point
    pub patrol_dwell_secs: f32,
    /// Despawn into a vent when sent to rest
    pub vanish_on_rest: bool,
}

impl Default for PursuerConfig {
    fn default() -> Self {
        Self {
            search_duration_min_secs: 4.0,
            search_duration_max_secs: 12.0,
            search_radius_min: 2.0,
            search_radius_max: 8.0,
            urgency_on_lose_sight: 0.3,
            urgency_decay_per_sec: 0.05,
            arrive_distance: 0.5,
            waypoint_arrive_distance: 0.3,
            close_distance: 15.0,
            hearing_range: 20.0,
            patrol_dwell_secs: 1.0,
            vanish_on_rest: true,
        }
    }
}

/// Player stay reporting settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StayConfig {
    /// Continuous presence that counts as lingering
    pub threshold_secs: f32,
    pub enabled: bool,
}

impl Default for StayConfig {
    fn default() -> Self {
        Self {
            threshold_secs: 3.0,
            enabled: true,
        }
    }
}

/// Errors that can occur during configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("TOML serialize error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),

    #[error("invalid value for {field}: {reason}")]
    Invalid { field: &'static str, reason: String },
}

/// Generates a default configuration file content.
pub fn default_config_toml() -> String {
    r#"# Overseer Configuration

[suspicion]
max = 100.0
decay_per_sec = 2.5
spread_ratio = 0.2
camp_increment = 10.0
camera_increment = 40.0
noise_increment = 20.0
sight_increment = 10.0
searched_multiplier = 0.6
decay_interval_secs = 1.0

[allocator]
top_k = 3
roulette_power = 1.0
min_priority = 0.0
lease_ttl_secs = 8.0

[tension]
increase_per_sec = 15.0
decrease_per_sec = 8.0
high_threshold = 85.0
low_threshold = 40.0
hint_interval_min_secs = 4.0
hint_interval_max_secs = 10.0
rest_duration_secs = 10.0
active_duration_secs = 60.0

[pursuer]
search_duration_min_secs = 4.0
search_duration_max_secs = 12.0
search_radius_min = 2.0
search_radius_max = 8.0
urgency_on_lose_sight = 0.3
urgency_decay_per_sec = 0.05
arrive_distance = 0.5
waypoint_arrive_distance = 0.3
close_distance = 15.0
hearing_range = 20.0
patrol_dwell_secs = 1.0
vanish_on_rest = true

[stay]
threshold_secs = 3.0
enabled = true
"#
    .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = OverseerConfig::default();

        assert_eq!(config.suspicion.max, 100.0);
        assert_eq!(config.suspicion.decay_per_sec, 2.5);
        assert_eq!(config.allocator.top_k, 3);
        assert_eq!(config.tension.high_threshold, 85.0);
        assert_eq!(config.pursuer.close_distance, 15.0);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_default_config_toml_parses() {
        let config = OverseerConfig::from_str(&default_config_toml()).unwrap();
        assert_eq!(config, OverseerConfig::default());
    }

    #[test]
    fn test_partial_config_uses_defaults() {
        let toml = r#"
            [allocator]
            top_k = 5

            [tension]
            high_threshold = 70.0
        "#;

        let config = OverseerConfig::from_str(toml).unwrap();

        assert_eq!(config.allocator.top_k, 5);
        assert_eq!(config.tension.high_threshold, 70.0);
        assert_eq!(config.allocator.lease_ttl_secs, 8.0);
        assert_eq!(config.suspicion.spread_ratio, 0.2);
        assert!(config.pursuer.vanish_on_rest);
    }

    #[test]
    fn test_config_to_toml() {
        let toml = OverseerConfig::default().to_toml().unwrap();
        assert!(toml.contains("[suspicion]"));
        assert!(toml.contains("[allocator]"));
        assert!(toml.contains("[stay]"));

        let reparsed = OverseerConfig::from_str(&toml).unwrap();
        assert_eq!(reparsed, OverseerConfig::default());
    }

    #[test]
    fn test_rejects_inverted_thresholds() {
        let toml = r#"
            [tension]
            high_threshold = 30.0
            low_threshold = 60.0
        "#;

        match OverseerConfig::from_str(toml) {
            Err(ConfigError::Invalid { field, .. }) => assert_eq!(field, "tension.low_threshold"),
            other => panic!("expected invalid config, got {:?}", other),
        }
    }

    #[test]
    fn test_rejects_bad_values() {
        let mut config = OverseerConfig::default();
        config.suspicion.max = 0.0;
        assert!(config.validate().is_err());

        let mut config = OverseerConfig::default();
        config.suspicion.searched_multiplier = 1.5;
        assert!(config.validate().is_err());

        let mut config = OverseerConfig::default();
        config.pursuer.search_radius_min = 9.0;
        assert!(config.validate().is_err());

        let mut config = OverseerConfig::default();
        config.allocator.top_k = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_malformed_toml() {
        assert!(matches!(
            OverseerConfig::from_str("[allocator]\ntop_k = \"three\""),
            Err(ConfigError::Toml(_))
        ));
    }

    #[test]
    fn test_from_file() {
        use std::io::Write;

        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[stay]\nthreshold_secs = 5.0").unwrap();

        let config = OverseerConfig::from_file(file.path()).unwrap();
        assert_eq!(config.stay.threshold_secs, 5.0);

        let missing = OverseerConfig::from_file(Path::new("/nonexistent/overseer.toml"));
        assert!(matches!(missing, Err(ConfigError::Io(_))));
    }
}
