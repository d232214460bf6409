//! Scenario files: a polytope of minimal points plus the integrands to
//! evaluate against it.
//!
//! Scenarios are JSON or TOML, chosen by file extension:
//!
//! ```toml
//! name = "biased coins"
//! nodes = 20
//!
//! [[points]]
//! family = "bernoulli"
//! p = [0.2, 0.7]
//!
//! [[points]]
//! family = "bernoulli"
//! p = [0.4, 0.5]
//! bias = 0.1
//!
//! [[integrands]]
//! kind = "polynomial"
//! coefficients = [0.0, 1.0]
//! ```
//!
//! Every point must have the same batch shape; points are stacked along a
//! new leading axis, which becomes the reduction axis of the polytope.

use std::path::Path;

use ib_common::{Error, Result};
use ib_math::MAX_NODES;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::distribution::{Bernoulli, Distribution, Normal, Uniform};
use crate::infra::InfraPolytope;
use crate::integrand::IntegrandSpec;
use crate::measure::SaMeasure;
use crate::tensor::{scalar, vector, Tensor};

/// A scalar or a flat vector of parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Param {
    Scalar(f64),
    Vector(Vec<f64>),
}

impl Param {
    pub fn to_tensor(&self) -> Tensor {
        match self {
            Param::Scalar(x) => scalar(*x),
            Param::Vector(v) => vector(v.clone()),
        }
    }
}

/// Family and parameters of one minimal point.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "family", rename_all = "snake_case")]
pub enum DistributionSpec {
    Bernoulli { p: Param },
    Normal { mean: Param, std: Param },
    Uniform { low: Param, high: Param },
}

impl DistributionSpec {
    pub fn build(&self) -> Result<Distribution> {
        Ok(match self {
            DistributionSpec::Bernoulli { p } => Bernoulli::new(p.to_tensor())?.into(),
            DistributionSpec::Normal { mean, std } => {
                Normal::new(mean.to_tensor(), std.to_tensor())?.into()
            }
            DistributionSpec::Uniform { low, high } => {
                Uniform::new(low.to_tensor(), high.to_tensor())?.into()
            }
        })
    }
}

/// One minimal point: a distribution with optional scale and bias.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PointSpec {
    #[serde(flatten)]
    pub distribution: DistributionSpec,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scale: Option<Param>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bias: Option<Param>,
}

impl PointSpec {
    pub fn build(&self) -> Result<SaMeasure> {
        let mut measure = SaMeasure::new(self.distribution.build()?);
        if let Some(scale) = &self.scale {
            measure = measure.with_scale(scale.to_tensor())?;
        }
        if let Some(bias) = &self.bias {
            measure = measure.with_bias(bias.to_tensor())?;
        }
        Ok(measure)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Scenario {
    #[serde(default)]
    pub name: Option<String>,
    /// Quadrature node count; falls back to the evaluation config.
    #[serde(default)]
    pub nodes: Option<usize>,
    pub points: Vec<PointSpec>,
    #[serde(default)]
    pub integrands: Vec<IntegrandSpec>,
}

impl Scenario {
    /// Load a `.json` or `.toml` scenario.
    pub fn load(path: &Path) -> Result<Self> {
        let parse = match path.extension().and_then(|e| e.to_str()) {
            Some("json") => Self::from_json_str,
            Some("toml") => Self::from_toml_str,
            _ => {
                return Err(Error::Scenario(format!(
                    "{}: expected a .json or .toml file",
                    path.display()
                )))
            }
        };
        let scenario = parse(&std::fs::read_to_string(path)?)?;
        debug!(
            path = %path.display(),
            points = scenario.points.len(),
            integrands = scenario.integrands.len(),
            "loaded scenario"
        );
        Ok(scenario)
    }

    pub fn from_json_str(text: &str) -> Result<Self> {
        let scenario: Scenario = serde_json::from_str(text)?;
        scenario.validate()?;
        Ok(scenario)
    }

    pub fn from_toml_str(text: &str) -> Result<Self> {
        let scenario: Scenario = toml::from_str(text)?;
        scenario.validate()?;
        Ok(scenario)
    }

    fn validate(&self) -> Result<()> {
        if self.points.is_empty() {
            return Err(Error::Scenario("at least one point is required".to_string()));
        }
        match self.nodes {
            Some(0) => return Err(Error::Scenario("nodes must be at least 1".to_string())),
            Some(n) if n > MAX_NODES => {
                return Err(Error::Scenario(format!("nodes must be at most {MAX_NODES}")));
            }
            _ => {}
        }
        Ok(())
    }

    /// Build every point as an sa-measure.
    pub fn measures(&self) -> Result<Vec<SaMeasure>> {
        self.points.iter().map(PointSpec::build).collect()
    }

    /// The polytope with the points stacked along axis 0.
    pub fn polytope(&self) -> Result<InfraPolytope> {
        InfraPolytope::from_points(&self.measures()?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::distribution::Family;

    const TOML: &str = r#"
name = "coins"

[[points]]
family = "bernoulli"
p = [0.2, 0.7]

[[points]]
family = "bernoulli"
p = [0.4, 0.5]
bias = 0.1

[[integrands]]
kind = "polynomial"
coefficients = [0.0, 1.0]
"#;

    #[test]
    fn parses_toml() {
        let s = Scenario::from_toml_str(TOML).unwrap();
        assert_eq!(s.name.as_deref(), Some("coins"));
        assert_eq!(s.points.len(), 2);
        assert_eq!(s.points[1].bias, Some(Param::Scalar(0.1)));
        let p = s.polytope().unwrap();
        assert_eq!(p.num_points(), 2);
        assert_eq!(p.measure().batch_shape(), &[2, 2]);
    }

    #[test]
    fn parses_json_normal() {
        let s = Scenario::from_json_str(
            r#"{"points": [{"family": "normal", "mean": [0.0, 1.0], "std": 0.5, "scale": 2.0}]}"#,
        )
        .unwrap();
        let m = s.measures().unwrap().remove(0);
        assert_eq!(m.mu().name(), "normal");
        assert_eq!(m.scale(), Some(&vector(vec![2.0, 2.0])));
        assert!(s.integrands.is_empty());
    }

    #[test]
    fn rejects_empty_points() {
        let err = Scenario::from_json_str(r#"{"points": []}"#).unwrap_err();
        assert!(matches!(err, Error::Scenario(_)));
    }

    #[test]
    fn rejects_out_of_range_node_counts() {
        for nodes in [0, MAX_NODES + 1] {
            let text = format!(r#"{{"nodes": {nodes}, "points": [{{"family": "bernoulli", "p": 0.5}}]}}"#);
            let err = Scenario::from_json_str(&text).unwrap_err();
            assert!(matches!(err, Error::Scenario(_)), "nodes={nodes}");
        }
    }

    #[test]
    fn rejects_unknown_family() {
        let err = Scenario::from_json_str(r#"{"points": [{"family": "cauchy", "loc": 0.0}]}"#);
        assert!(matches!(err, Err(Error::Json(_))));
    }

    #[test]
    fn invalid_parameters_surface_on_build() {
        let s = Scenario::from_json_str(r#"{"points": [{"family": "bernoulli", "p": 1.5}]}"#).unwrap();
        assert!(matches!(s.polytope(), Err(Error::InvalidParameter { .. })));
    }

    #[test]
    fn unknown_extension_rejected() {
        let err = Scenario::load(Path::new("Cargo.toml.bak")).unwrap_err();
        assert!(matches!(err, Error::Scenario(_)));
    }
}
