//! Intake workflow configuration

use serde::Deserialize;

use super::error::ValidationError;
use crate::domain::intake::IntakeSettings;

/// Intake workflow tunables
#[derive(Debug, Clone, Deserialize)]
pub struct IntakeConfig {
    /// Failed verification answers allowed before lockout
    #[serde(default = "default_max_verify_attempts")]
    pub max_verify_attempts: u8,

    /// Conversation inactivity window in seconds
    #[serde(default = "default_session_ttl")]
    pub session_ttl_secs: u64,

    /// Interval between background expiry sweeps, in seconds
    #[serde(default = "default_sweep_interval")]
    pub sweep_interval_secs: u64,

    /// Minimum match confidence for a study to qualify
    #[serde(default = "default_match_threshold")]
    pub match_threshold: f32,

    /// Low-confidence suggestions shown when nothing qualifies
    #[serde(default = "default_max_suggestions")]
    pub max_suggestions: usize,

    /// Candidates offered for study disambiguation
    #[serde(default = "default_max_study_options")]
    pub max_study_options: usize,
}

impl IntakeConfig {
    /// Workflow settings derived from this configuration
    pub fn settings(&self) -> IntakeSettings {
        IntakeSettings {
            max_verify_attempts: self.max_verify_attempts,
            match_threshold: self.match_threshold,
            max_suggestions: self.max_suggestions,
            max_study_options: self.max_study_options,
        }
    }

    /// Validate intake configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.max_verify_attempts == 0 {
            return Err(ValidationError::InvalidAttemptBudget);
        }
        if self.session_ttl_secs < 60 {
            return Err(ValidationError::InvalidSessionTtl);
        }
        if !(0.0..=100.0).contains(&self.match_threshold) || self.match_threshold == 0.0 {
            return Err(ValidationError::InvalidMatchThreshold);
        }
        if self.max_suggestions == 0 || self.max_study_options == 0 {
            return Err(ValidationError::InvalidListLimit);
        }
        Ok(())
    }
}

impl Default for IntakeConfig {
    fn default() -> Self {
        Self {
            max_verify_attempts: default_max_verify_attempts(),
            session_ttl_secs: default_session_ttl(),
            sweep_interval_secs: default_sweep_interval(),
            match_threshold: default_match_threshold(),
            max_suggestions: default_max_suggestions(),
            max_study_options: default_max_study_options(),
        }
    }
}

fn default_max_verify_attempts() -> u8 {
    3
}

fn default_session_ttl() -> u64 {
    3600
}

fn default_sweep_interval() -> u64 {
    1800
}

fn default_match_threshold() -> f32 {
    70.0
}

fn default_max_suggestions() -> usize {
    5
}

fn default_max_study_options() -> usize {
    10
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_validate() {
        let config = IntakeConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.settings().max_verify_attempts, 3);
    }

    #[test]
    fn zero_attempt_budget_is_rejected() {
        let config = IntakeConfig {
            max_verify_attempts: 0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn out_of_range_threshold_is_rejected() {
        let config = IntakeConfig {
            match_threshold: 150.0,
            ..Default::default()
        };
        assert!(config.validate().is_err());

        let config = IntakeConfig {
            match_threshold: 0.0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn short_ttl_is_rejected() {
        let config = IntakeConfig {
            session_ttl_secs: 30,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }
}
