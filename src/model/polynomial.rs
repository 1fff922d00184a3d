use serde::{Deserialize, Serialize};

use super::{FeatureRow, ModelError};

/// Highest expansion degree accepted from an artifact.
pub const MAX_DEGREE: u32 = 6;

/// Linear fit over a polynomial feature expansion.
///
/// Terms are ordered by degree, and within a degree as combinations with
/// replacement of the feature indices: for two features and degree 2 that is
/// `[1, h, w, h², h·w, w²]`. `coefficients` has one entry per term, the bias
/// term included; `intercept` is added on top.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PolynomialModel {
    pub degree: u32,
    pub coefficients: Vec<f64>,
    pub intercept: f64,
}

/// Index lists of every monomial up to `degree`, in expansion order.
pub(crate) fn monomials(n_features: usize, degree: u32) -> Vec<Vec<usize>> {
    let mut terms: Vec<Vec<usize>> = vec![Vec::new()];
    let mut frontier: Vec<Vec<usize>> = vec![Vec::new()];
    for _ in 0..degree {
        let mut next = Vec::new();
        for term in &frontier {
            let start = term.last().copied().unwrap_or(0);
            for feature in start..n_features {
                let mut t = term.clone();
                t.push(feature);
                next.push(t);
            }
        }
        terms.extend(next.iter().cloned());
        frontier = next;
    }
    terms
}

impl PolynomialModel {
    pub fn term_count(&self) -> usize {
        monomials(FeatureRow::LEN, self.degree).len()
    }

    pub fn validate(&self) -> Result<(), ModelError> {
        if self.degree == 0 || self.degree > MAX_DEGREE {
            return Err(ModelError::Invalid(format!(
                "polynomial degree {} outside 1..={MAX_DEGREE}",
                self.degree
            )));
        }
        let expected = self.term_count();
        if self.coefficients.len() != expected {
            return Err(ModelError::Invalid(format!(
                "degree {} expansion has {expected} terms, artifact carries {} coefficients",
                self.degree,
                self.coefficients.len()
            )));
        }
        if !self.intercept.is_finite() || self.coefficients.iter().any(|c| !c.is_finite()) {
            return Err(ModelError::Invalid(
                "polynomial model parameters must be finite".into(),
            ));
        }
        Ok(())
    }

    pub fn evaluate(&self, x: &[f64; FeatureRow::LEN]) -> f64 {
        monomials(FeatureRow::LEN, self.degree)
            .iter()
            .zip(&self.coefficients)
            .map(|(term, c)| c * term.iter().map(|&i| x[i]).product::<f64>())
            .sum::<f64>()
            + self.intercept
    }
}
