//! # Maximum Entropy (Regressão Logística Multinomial)
//!
//! Modelo discriminativo log-linear que serve de [`ProbabilityModel`] para o
//! beam search. Dado um contexto (lista de features ativas), calcula:
//!
//! $$ P(y|x) = \frac{\exp(\sum_i w_{f_i, y})}{Z(x)} $$
//!
//! onde $Z(x)$ normaliza sobre todos os outcomes.
//!
//! Este módulo cobre apenas a **avaliação**: os pesos são definidos via
//! [`MaxEntModel::set_weight`] (ou desserializados) e nunca treinados aqui.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::error::{BeamError, BoxError, Result};
use crate::model::ProbabilityModel;

/// Modelo de Entropia Máxima (MaxEnt).
///
/// Features são binárias: uma feature presente no contexto contribui com o seu
/// peso para cada outcome; features desconhecidas são ignoradas. Features
/// repetidas no contexto contam uma única vez.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MaxEntModel {
    /// Rótulos dos outcomes, na ordem dos índices.
    outcomes: Vec<String>,
    /// Índice reverso rótulo → posição em `outcomes`.
    #[serde(skip)]
    index: HashMap<String, usize>,
    /// Pesos por feature: um valor por outcome.
    weights: HashMap<String, Vec<f64>>,
}

impl MaxEntModel {
    /// Cria um modelo com pesos zerados (distribuição uniforme).
    ///
    /// Rótulos repetidos quebrariam a bijeção índice ↔ rótulo e são rejeitados.
    pub fn new<I, S>(outcomes: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let outcomes: Vec<String> = outcomes.into_iter().map(Into::into).collect();
        let index = build_index(&outcomes)?;
        Ok(Self {
            outcomes,
            index,
            weights: HashMap::new(),
        })
    }

    /// Reconstrói um modelo a partir de JSON (o índice reverso não é serializado).
    ///
    /// Cada linha de `weights` precisa ter exatamente um peso por outcome.
    pub fn from_json(json: &str) -> std::result::Result<Self, BoxError> {
        let mut model: MaxEntModel = serde_json::from_str(json)?;
        model.index = build_index(&model.outcomes)?;
        model.check_rows()?;
        Ok(model)
    }

    fn check_rows(&self) -> Result<()> {
        let expected = self.outcomes.len();
        for (feature, row) in &self.weights {
            if row.len() != expected {
                return Err(BeamError::WeightRowLength {
                    feature: feature.clone(),
                    expected,
                    found: row.len(),
                });
            }
        }
        Ok(())
    }

    /// Define o peso de `feature` para o outcome `outcome`.
    pub fn set_weight(&mut self, feature: impl Into<String>, outcome: &str, weight: f64) -> Result<()> {
        let idx = *self
            .index
            .get(outcome)
            .ok_or_else(|| BeamError::UnknownOutcome(outcome.to_string()))?;
        let n = self.outcomes.len();
        let feature = feature.into();
        let row = self.weights.entry(feature.clone()).or_insert_with(|| vec![0.0; n]);
        if row.len() != n {
            return Err(BeamError::WeightRowLength {
                feature,
                expected: n,
                found: row.len(),
            });
        }
        row[idx] = weight;
        Ok(())
    }

    /// Peso atual de `feature` para `outcome` (0 se ausente).
    pub fn weight(&self, feature: &str, outcome: &str) -> f64 {
        match (self.weights.get(feature), self.index.get(outcome)) {
            (Some(row), Some(&idx)) => row.get(idx).copied().unwrap_or(0.0),
            _ => 0.0,
        }
    }

    /// Número de features com algum peso definido.
    pub fn feature_count(&self) -> usize {
        self.weights.len()
    }

    /// Scores lineares (antes da softmax) de cada outcome.
    pub fn scores(&self, context: &[String]) -> Vec<f64> {
        let mut scores = vec![0.0; self.outcomes.len()];
        let mut seen = std::collections::HashSet::with_capacity(context.len());
        for feature in context {
            if !seen.insert(feature.as_str()) {
                continue;
            }
            if let Some(row) = self.weights.get(feature) {
                for (score, w) in scores.iter_mut().zip(row) {
                    *score += w;
                }
            }
        }
        scores
    }

    /// Outcome mais provável para o contexto e sua probabilidade.
    pub fn best_outcome(&self, context: &[String]) -> Option<(&str, f64)> {
        let probs = softmax(&self.scores(context));
        probs
            .iter()
            .enumerate()
            .fold(None, |best: Option<(usize, f64)>, (i, &p)| match best {
                Some((_, bp)) if bp >= p => best,
                _ => Some((i, p)),
            })
            .map(|(i, p)| (self.outcomes[i].as_str(), p))
    }
}

fn build_index(outcomes: &[String]) -> Result<HashMap<String, usize>> {
    let mut index = HashMap::with_capacity(outcomes.len());
    for (i, label) in outcomes.iter().enumerate() {
        if index.insert(label.clone(), i).is_some() {
            return Err(BeamError::DuplicateOutcome(label.clone()));
        }
    }
    Ok(index)
}

/// Softmax numericamente estável (subtrai o máximo antes de exponenciar).
pub fn softmax(scores: &[f64]) -> Vec<f64> {
    if scores.is_empty() {
        return vec![];
    }
    let max_score = scores.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
    let exps: Vec<f64> = scores.iter().map(|&s| (s - max_score).exp()).collect();
    let sum: f64 = exps.iter().sum();
    exps.iter().map(|e| e / sum).collect()
}

impl ProbabilityModel for MaxEntModel {
    fn evaluate(&self, context: &[String]) -> std::result::Result<Vec<f64>, BoxError> {
        Ok(softmax(&self.scores(context)))
    }

    fn evaluate_into(&self, context: &[String], probs: &mut Vec<f64>) -> std::result::Result<(), BoxError> {
        let scores = self.scores(context);
        probs.clear();
        probs.extend(softmax(&scores));
        Ok(())
    }

    fn outcome_count(&self) -> usize {
        self.outcomes.len()
    }

    fn outcome(&self, index: usize) -> Option<&str> {
        self.outcomes.get(index).map(String::as_str)
    }

    fn outcome_index(&self, label: &str) -> Option<usize> {
        self.index.get(label).copied()
    }
}
