//! Trained win-probability model
//!
//! Small MLPs exported to JSON are evaluated on the CPU. The network file
//! carries its own shape, optional z-score normalization and metadata:
//! - `metadata.version`: reported as the pick's model version
//! - `metadata.features`: input order (defaults to [`MODEL_FEATURES`])
//! - `metadata.feature_importance`: name -> weight map for rationales

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;
use tracing::info;

use super::{ScoringInput, ScoringStrategy, StrategyOutput};
use crate::domain::{model_version, FactorWeight, Side};
use crate::error::{PickwiseError, Result, ScoringError};
use crate::features::MODEL_FEATURES;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Activation {
    #[default]
    Linear,
    Relu,
    Tanh,
    Sigmoid,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DenseLayer {
    /// Weights shape: [out_dim][in_dim]
    pub weights: Vec<Vec<f64>>,
    /// Bias shape: [out_dim]
    pub bias: Vec<f64>,
    #[serde(default)]
    pub activation: Activation,
}

impl DenseLayer {
    fn out_dim(&self) -> usize {
        self.weights.len()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DenseNetwork {
    pub input_dim: usize,

    /// Optional z-score normalization.
    #[serde(default)]
    pub input_mean: Option<Vec<f64>>,
    #[serde(default)]
    pub input_std: Option<Vec<f64>>,

    pub layers: Vec<DenseLayer>,

    #[serde(default)]
    pub metadata: ModelMetadata,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ModelMetadata {
    #[serde(default)]
    pub version: Option<String>,
    #[serde(default)]
    pub features: Option<Vec<String>>,
    #[serde(default)]
    pub feature_importance: Option<HashMap<String, f64>>,
    #[serde(default)]
    pub trained_on: Option<String>,
}

impl DenseNetwork {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path)?;
        let model: Self = serde_json::from_str(&content)?;
        model.validate().map_err(PickwiseError::Model)?;
        Ok(model)
    }

    pub fn validate(&self) -> std::result::Result<(), String> {
        if self.input_dim == 0 {
            return Err("input_dim must be > 0".to_string());
        }
        if self.layers.is_empty() {
            return Err("layers must not be empty".to_string());
        }
        match (&self.input_mean, &self.input_std) {
            (Some(mean), Some(std)) => {
                if mean.len() != self.input_dim || std.len() != self.input_dim {
                    return Err(format!(
                        "normalization length mismatch: mean {}, std {}, input_dim {}",
                        mean.len(),
                        std.len(),
                        self.input_dim
                    ));
                }
                if std.iter().any(|v| !v.is_finite() || *v <= 0.0) {
                    return Err("input_std must be finite and > 0".to_string());
                }
            }
            (None, None) => {}
            _ => return Err("input_mean and input_std must be provided together".to_string()),
        }

        let mut expected_in = self.input_dim;
        for (idx, layer) in self.layers.iter().enumerate() {
            if layer.out_dim() == 0 {
                return Err(format!("layer[{idx}] out_dim must be > 0"));
            }
            if layer.bias.len() != layer.out_dim() {
                return Err(format!(
                    "layer[{idx}] bias len {} != out_dim {}",
                    layer.bias.len(),
                    layer.out_dim()
                ));
            }
            for (r, row) in layer.weights.iter().enumerate() {
                if row.len() != expected_in {
                    return Err(format!(
                        "layer[{idx}] weights row {r} len {} != expected in_dim {expected_in}",
                        row.len()
                    ));
                }
                if row.iter().any(|v| !v.is_finite()) {
                    return Err(format!("layer[{idx}] weights contain non-finite values"));
                }
            }
            if layer.bias.iter().any(|v| !v.is_finite()) {
                return Err(format!("layer[{idx}] bias contains non-finite values"));
            }
            expected_in = layer.out_dim();
        }
        if expected_in != 1 {
            return Err(format!("output_dim must be 1, got {expected_in}"));
        }
        if let Some(features) = &self.metadata.features {
            if features.len() != self.input_dim {
                return Err(format!(
                    "metadata.features has {} names, input_dim is {}",
                    features.len(),
                    self.input_dim
                ));
            }
        }
        Ok(())
    }

    pub fn forward_scalar(&self, input: &[f64]) -> std::result::Result<f64, ScoringError> {
        if input.len() != self.input_dim {
            return Err(ScoringError::Inference(format!(
                "input dim mismatch: got {}, expected {}",
                input.len(),
                self.input_dim
            )));
        }

        let mut x: Vec<f64> = input.to_vec();
        if let (Some(mean), Some(std)) = (&self.input_mean, &self.input_std) {
            for (i, v) in x.iter_mut().enumerate() {
                *v = (*v - mean[i]) / std[i].max(1e-12);
            }
        }

        for layer in &self.layers {
            x = layer
                .weights
                .iter()
                .zip(&layer.bias)
                .map(|(row, bias)| {
                    let sum = bias + row.iter().zip(&x).map(|(w, v)| w * v).sum::<f64>();
                    apply_activation(sum, layer.activation)
                })
                .collect();
        }

        x.first()
            .copied()
            .ok_or_else(|| ScoringError::Inference("empty network output".to_string()))
    }

    /// Mean absolute first-layer weight per input, normalized to sum to 1
    pub fn input_weight_importance(&self) -> Vec<f64> {
        let mut totals = vec![0.0; self.input_dim];
        if let Some(first) = self.layers.first() {
            for row in &first.weights {
                for (i, w) in row.iter().enumerate() {
                    totals[i] += w.abs();
                }
            }
        }
        let sum: f64 = totals.iter().sum();
        if sum > 0.0 {
            totals.iter_mut().for_each(|t| *t /= sum);
        }
        totals
    }
}

fn apply_activation(x: f64, act: Activation) -> f64 {
    match act {
        Activation::Linear => x,
        Activation::Relu => x.max(0.0),
        Activation::Tanh => x.tanh(),
        Activation::Sigmoid => sigmoid(x),
    }
}

fn sigmoid(x: f64) -> f64 {
    // Numerically-stable sigmoid.
    if x >= 0.0 {
        1.0 / (1.0 + (-x).exp())
    } else {
        let z = x.exp();
        z / (1.0 + z)
    }
}

/// Scoring strategy backed by a [`DenseNetwork`]
#[derive(Debug, Clone)]
pub struct TrainedModel {
    network: DenseNetwork,
    features: Vec<String>,
    importance: Vec<FactorWeight>,
    version: String,
}

impl TrainedModel {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let network = DenseNetwork::from_file(&path)?;
        let model = Self::new(network)?;
        info!(
            "Loaded trained model {} ({} inputs) from {}",
            model.version,
            model.features.len(),
            path.as_ref().display()
        );
        Ok(model)
    }

    pub fn new(network: DenseNetwork) -> Result<Self> {
        network.validate().map_err(PickwiseError::Model)?;

        let features = match &network.metadata.features {
            Some(names) => names.clone(),
            None if network.input_dim == MODEL_FEATURES.len() => {
                MODEL_FEATURES.iter().map(|s| s.to_string()).collect()
            }
            None => {
                return Err(PickwiseError::Model(format!(
                    "input_dim {} needs metadata.features",
                    network.input_dim
                )))
            }
        };

        let mut importance: Vec<FactorWeight> = match &network.metadata.feature_importance {
            Some(map) => map
                .iter()
                .map(|(name, w)| FactorWeight::new(name.clone(), *w))
                .collect(),
            None => features
                .iter()
                .zip(network.input_weight_importance())
                .map(|(name, w)| FactorWeight::new(name.clone(), w))
                .collect(),
        };
        importance.sort_by(|a, b| {
            b.weight
                .total_cmp(&a.weight)
                .then_with(|| a.name.cmp(&b.name))
        });

        let version = network
            .metadata
            .version
            .clone()
            .unwrap_or_else(|| model_version::TRAINED_DEFAULT.to_string());

        Ok(Self {
            network,
            features,
            importance,
            version,
        })
    }
}

impl ScoringStrategy for TrainedModel {
    fn name(&self) -> &'static str {
        "trained_model"
    }

    fn model_version(&self) -> &str {
        &self.version
    }

    fn evaluate(&self, input: &ScoringInput<'_>) -> std::result::Result<StrategyOutput, ScoringError> {
        let mut x = input.features.model_input(&self.features)?;
        if let Some(idx) = self.features.iter().position(|n| n == "home_indicator") {
            x[idx] = if input.side == Side::Home { 1.0 } else { 0.0 };
        }

        let p = self.network.forward_scalar(&x)?;
        if !(0.0..=1.0).contains(&p) {
            return Err(ScoringError::InvalidProbability(p));
        }

        Ok(StrategyOutput {
            win_probability: p,
            confidence: ((p - 0.5).abs() * 200.0 + 50.0).min(100.0),
            feature_importance: self.importance.clone(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Game, League};
    use crate::features::FeatureVector;
    use chrono::Utc;

    fn logistic(weights: Vec<f64>, bias: f64, metadata: ModelMetadata) -> DenseNetwork {
        DenseNetwork {
            input_dim: weights.len(),
            input_mean: None,
            input_std: None,
            layers: vec![DenseLayer {
                weights: vec![weights],
                bias: vec![bias],
                activation: Activation::Sigmoid,
            }],
            metadata,
        }
    }

    #[test]
    fn test_forward_scalar_sigmoid() {
        let net = logistic(vec![1.0, 2.0], 0.0, ModelMetadata::default());
        net.validate().unwrap();
        assert!((net.forward_scalar(&[0.0, 0.0]).unwrap() - 0.5).abs() < 1e-12);
        assert!(net.forward_scalar(&[1.0, 0.0]).unwrap() > 0.5);
        assert!(net.forward_scalar(&[1.0]).is_err());
    }

    #[test]
    fn test_validates_shapes() {
        let mut bad = logistic(vec![1.0, 2.0], 0.0, ModelMetadata::default());
        bad.input_dim = 3;
        assert!(bad.validate().is_err());

        let mut multi = logistic(vec![1.0], 0.0, ModelMetadata::default());
        multi.layers[0].weights.push(vec![1.0]);
        multi.layers[0].bias.push(0.0);
        assert!(multi.validate().is_err());
    }

    #[test]
    fn test_non_finite_bias_rejected_at_load() {
        let net = logistic(vec![1.0], f64::NAN, ModelMetadata::default());
        let err = net.validate().unwrap_err();
        assert!(err.contains("bias"), "{}", err);
        assert!(TrainedModel::new(net).is_err());
    }

    #[test]
    fn test_trained_model_uses_metadata_features() {
        let metadata = ModelMetadata {
            version: Some("3.1.0".into()),
            features: Some(vec!["home_win_rate".into(), "home_indicator".into()]),
            ..Default::default()
        };
        let model = TrainedModel::new(logistic(vec![4.0, 1.0], -3.0, metadata)).unwrap();
        assert_eq!(model.model_version(), "3.1.0");
        // Larger first-layer weight ranks first
        assert_eq!(model.importance[0].name, "home_win_rate");

        let game = Game::new("H", "A", League::MLB, Utc::now()).with_moneyline(-130.0, 110.0);
        let fv = FeatureVector {
            home_win_rate: 0.75,
            ..Default::default()
        };
        let home = model
            .evaluate(&ScoringInput { game: &game, features: &fv, side: Side::Home, odds: -130.0 })
            .unwrap();
        let away = model
            .evaluate(&ScoringInput { game: &game, features: &fv, side: Side::Away, odds: 110.0 })
            .unwrap();
        // logit 4*0.75 + 1 - 3 = 1 for home, 0 for away
        assert!((home.win_probability - sigmoid(1.0)).abs() < 1e-12);
        assert!((away.win_probability - 0.5).abs() < 1e-12);
        assert!((away.confidence - 50.0).abs() < 1e-9);
        assert!(home.confidence > 50.0 && home.confidence <= 100.0);
    }

    #[test]
    fn test_default_feature_order_requires_matching_dim() {
        let net = logistic(vec![0.1; 5], 0.0, ModelMetadata::default());
        assert!(TrainedModel::new(net).is_err());

        let net = logistic(vec![0.1; 16], 0.0, ModelMetadata::default());
        let model = TrainedModel::new(net).unwrap();
        assert_eq!(model.model_version(), "1.0.0");
        assert_eq!(model.features.len(), 16);
    }
}
