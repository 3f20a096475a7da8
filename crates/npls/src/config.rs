//! Fitting options for the N-way PLS engine

use crate::error::{NplsError, NplsResult};

/// Rule for flipping the sign of a new X score vector against its Y score
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SignAlignment {
    /// Flip whenever corr(t, u) < 1, i.e. practically always.
    ///
    /// This is the sign convention of the N-way toolbox models.
    #[default]
    Literal,
    /// Flip only when corr(t, u) < 0, leaving t and u positively correlated
    AntiCorrelated,
}

impl SignAlignment {
    /// Whether a score pair with correlation `corr` is flipped.
    ///
    /// An undefined (NaN) correlation never flips.
    pub fn flips(self, corr: f64) -> bool {
        match self {
            SignAlignment::Literal => corr < 1.0,
            SignAlignment::AntiCorrelated => corr < 0.0,
        }
    }
}

/// N-way PLS configuration
///
/// # Examples
///
/// ```
/// use npls::{NplsConfig, SignAlignment};
///
/// let config = NplsConfig::new(3)
///     .with_seed(7)
///     .with_sign_alignment(SignAlignment::AntiCorrelated);
/// assert!(config.validate().is_ok());
/// assert_eq!(config.tolerance, 1e-10);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct NplsConfig {
    /// Number of latent components to extract
    pub n_components: usize,

    /// Inner loop stops when ||t - t_prev|| / ||t|| falls to this value
    pub tolerance: f64,

    /// Cap on inner loop iterations per component
    pub max_iterations: usize,

    /// Seed for the random initial score vectors; `None` draws one from the
    /// thread RNG
    pub seed: Option<u64>,

    /// Sign rule applied after each component converges
    pub sign_alignment: SignAlignment,
}

impl Default for NplsConfig {
    fn default() -> Self {
        Self {
            n_components: 1,
            tolerance: 1e-10,
            max_iterations: 10_000,
            seed: None,
            sign_alignment: SignAlignment::Literal,
        }
    }
}

impl NplsConfig {
    pub fn new(n_components: usize) -> Self {
        Self {
            n_components,
            ..Default::default()
        }
    }

    pub fn with_tolerance(mut self, tolerance: f64) -> Self {
        self.tolerance = tolerance;
        self
    }

    pub fn with_max_iterations(mut self, max_iterations: usize) -> Self {
        self.max_iterations = max_iterations;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn with_sign_alignment(mut self, sign_alignment: SignAlignment) -> Self {
        self.sign_alignment = sign_alignment;
        self
    }

    /// Check the options before fitting.
    pub fn validate(&self) -> NplsResult<()> {
        if self.n_components == 0 {
            return Err(NplsError::InvalidConfig(
                "n_components must be at least 1".to_string(),
            ));
        }
        if !(self.tolerance > 0.0 && self.tolerance.is_finite()) {
            return Err(NplsError::InvalidConfig(format!(
                "tolerance must be positive and finite, got {}",
                self.tolerance
            )));
        }
        if self.max_iterations == 0 {
            return Err(NplsError::InvalidConfig(
                "max_iterations must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = NplsConfig::default();
        assert_eq!(config.n_components, 1);
        assert_eq!(config.max_iterations, 10_000);
        assert_eq!(config.seed, None);
        assert_eq!(config.sign_alignment, SignAlignment::Literal);
    }

    #[test]
    fn test_validate_rejects_bad_options() {
        assert!(NplsConfig::new(0).validate().is_err());
        assert!(NplsConfig::new(2).with_tolerance(0.0).validate().is_err());
        assert!(NplsConfig::new(2).with_tolerance(f64::NAN).validate().is_err());
        assert!(NplsConfig::new(2).with_max_iterations(0).validate().is_err());
        assert!(NplsConfig::new(2).validate().is_ok());
    }

    #[test]
    fn test_sign_rules() {
        assert!(SignAlignment::Literal.flips(0.999));
        assert!(!SignAlignment::Literal.flips(1.0));
        assert!(!SignAlignment::AntiCorrelated.flips(0.5));
        assert!(SignAlignment::AntiCorrelated.flips(-0.1));
        assert!(!SignAlignment::Literal.flips(f64::NAN));
    }
}
