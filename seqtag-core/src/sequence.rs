//! # Sequências e Histórico Compartilhado
//!
//! Uma [`Sequence`] é o resultado ranqueado pelo beam search: a lista de
//! outcomes escolhidos, a probabilidade de cada escolha e o score acumulado
//! `Σ ln p_i`.
//!
//! ## Compartilhamento estrutural
//!
//! Durante a busca, K sequências parciais costumam ter longos prefixos em
//! comum. Copiar o histórico a cada extensão custaria O(n²); em vez disso cada
//! nó do [`HistoryArena`] guarda apenas o **último** outcome e um índice para o
//! nó pai:
//!
//! ```text
//! nó 0: (pai: -, "B-PER")
//! nó 1: (pai: 0, "I-PER")   ──► histórico "B-PER I-PER"
//! nó 2: (pai: 0, "O")       ──► histórico "B-PER O"
//! ```
//!
//! O arena vive apenas durante uma chamada de decodificação; ao final os
//! sobreviventes são materializados em `Sequence`s independentes.

use std::cmp::Ordering;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Sequência de outcomes com score acumulado.
///
/// Invariante: `outcomes.len() == probs.len()`. Valores imutáveis: para
/// estender use [`Sequence::extend`], que devolve uma nova sequência.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sequence {
    outcomes: Vec<String>,
    probs: Vec<f64>,
    score: f64,
}

impl Sequence {
    /// Sequência vazia com score 0.
    pub fn new() -> Self {
        Self {
            outcomes: Vec::new(),
            probs: Vec::new(),
            score: 0.0,
        }
    }

    pub(crate) fn from_parts(outcomes: Vec<String>, probs: Vec<f64>, score: f64) -> Self {
        debug_assert_eq!(outcomes.len(), probs.len());
        Self {
            outcomes,
            probs,
            score,
        }
    }

    /// Nova sequência igual a esta mais `outcome` escolhido com probabilidade `prob`.
    ///
    /// Devolve `None` se `prob` não estiver em (0, 1]: outcomes de
    /// probabilidade zero nunca entram no score.
    pub fn extend(&self, outcome: impl Into<String>, prob: f64) -> Option<Self> {
        if prob.is_nan() || prob <= 0.0 || prob > 1.0 {
            return None;
        }
        let mut outcomes = self.outcomes.clone();
        let mut probs = self.probs.clone();
        outcomes.push(outcome.into());
        probs.push(prob);
        Some(Self {
            outcomes,
            probs,
            score: self.score + prob.ln(),
        })
    }

    pub fn outcomes(&self) -> &[String] {
        &self.outcomes
    }

    /// Probabilidade de cada outcome dado o seu contexto.
    pub fn probs(&self) -> &[f64] {
        &self.probs
    }

    /// Soma dos logaritmos das probabilidades.
    pub fn score(&self) -> f64 {
        self.score
    }

    pub fn len(&self) -> usize {
        self.outcomes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.outcomes.is_empty()
    }

    /// Ordem de ranqueamento: maior score primeiro.
    pub fn rank_cmp(&self, other: &Self) -> Ordering {
        other.score.total_cmp(&self.score)
    }
}

impl Default for Sequence {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for Sequence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.4} [{}]", self.score, self.outcomes.join(" "))
    }
}

/// Índice de um nó no [`HistoryArena`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) struct NodeId(usize);

#[derive(Debug, Clone, Copy)]
struct HistoryNode {
    parent: Option<NodeId>,
    outcome: usize,
    prob: f64,
}

/// Arena de históricos com compartilhamento de prefixos.
///
/// `None` representa o histórico vazio (a raiz da busca).
#[derive(Debug, Default)]
pub(crate) struct HistoryArena {
    nodes: Vec<HistoryNode>,
}

impl HistoryArena {
    pub(crate) fn new() -> Self {
        Self { nodes: Vec::new() }
    }

    /// Anexa `outcome` ao histórico `parent` e devolve o novo nó.
    pub(crate) fn push(&mut self, parent: Option<NodeId>, outcome: usize, prob: f64) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(HistoryNode {
            parent,
            outcome,
            prob,
        });
        id
    }

    /// Pares `(outcome, prob)` da raiz até `tip`.
    pub(crate) fn trail(&self, tip: Option<NodeId>) -> Vec<(usize, f64)> {
        let mut trail = Vec::new();
        let mut cursor = tip;
        while let Some(NodeId(idx)) = cursor {
            let node = &self.nodes[idx];
            trail.push((node.outcome, node.prob));
            cursor = node.parent;
        }
        trail.reverse();
        trail
    }

    /// Índices dos outcomes da raiz até `tip`.
    pub(crate) fn outcomes(&self, tip: Option<NodeId>) -> Vec<usize> {
        self.trail(tip).into_iter().map(|(outcome, _)| outcome).collect()
    }

    pub(crate) fn len(&self) -> usize {
        self.nodes.len()
    }
}
