//! Declarative integrands for scenario files.

use serde::{Deserialize, Serialize};

use crate::tensor::Tensor;

/// A function of one real variable, applied elementwise.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum IntegrandSpec {
    /// `c0 + c1·x + c2·x² + ...`
    Polynomial { coefficients: Vec<f64> },
    /// 1 where `x >= threshold`, else 0.
    Indicator { threshold: f64 },
    /// `exp(rate·x)`
    Exp { rate: f64 },
}

impl IntegrandSpec {
    pub fn apply(&self, x: &Tensor) -> Tensor {
        match self {
            IntegrandSpec::Polynomial { coefficients } => {
                x.mapv(|v| coefficients.iter().rev().fold(0.0, |acc, &c| acc * v + c))
            }
            IntegrandSpec::Indicator { threshold } => {
                x.mapv(|v| if v >= *threshold { 1.0 } else { 0.0 })
            }
            IntegrandSpec::Exp { rate } => x.mapv(|v| (rate * v).exp()),
        }
    }

    /// Short human-readable name, used as a key in CLI output.
    pub fn label(&self) -> String {
        match self {
            IntegrandSpec::Polynomial { coefficients } => format!("polynomial{coefficients:?}"),
            IntegrandSpec::Indicator { threshold } => format!("indicator(x >= {threshold})"),
            IntegrandSpec::Exp { rate } => format!("exp({rate}x)"),
        }
    }

    /// Highest power with a non-zero coefficient, for polynomials.
    pub fn degree(&self) -> Option<usize> {
        match self {
            IntegrandSpec::Polynomial { coefficients } => {
                Some(coefficients.iter().rposition(|&c| c != 0.0).unwrap_or(0))
            }
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tensor::vector;

    #[test]
    fn polynomial_horner() {
        let p = IntegrandSpec::Polynomial {
            coefficients: vec![1.0, -2.0, 3.0],
        };
        assert_eq!(p.apply(&vector(vec![0.0, 1.0, 2.0])), vector(vec![1.0, 2.0, 9.0]));
        assert_eq!(p.degree(), Some(2));
    }

    #[test]
    fn empty_polynomial_is_zero() {
        let p = IntegrandSpec::Polynomial { coefficients: vec![] };
        assert_eq!(p.apply(&vector(vec![3.0])), vector(vec![0.0]));
    }

    #[test]
    fn indicator_is_closed_on_the_left() {
        let f = IntegrandSpec::Indicator { threshold: 0.5 };
        assert_eq!(f.apply(&vector(vec![0.4, 0.5, 0.6])), vector(vec![0.0, 1.0, 1.0]));
        assert_eq!(f.degree(), None);
    }

    #[test]
    fn parses_tagged_json() {
        let f: IntegrandSpec = serde_json::from_str(r#"{"kind": "exp", "rate": 2.0}"#).unwrap();
        assert_eq!(f, IntegrandSpec::Exp { rate: 2.0 });
        assert_eq!(f.label(), "exp(2x)");
    }
}
