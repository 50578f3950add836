//! # Modelo de Probabilidade
//!
//! O motor de busca não sabe como as probabilidades são calculadas: ele só
//! precisa de algo que, dado um **contexto** (lista de features em texto),
//! devolva uma distribuição sobre um vocabulário fixo de rótulos (outcomes).
//!
//! ```text
//! contexto ["w=lula", "cap", "prev_tag=O"]  ──►  [0.05, 0.90, 0.05]
//!                                                   O   B-PER I-PER
//! ```
//!
//! O mapeamento índice ↔ rótulo deve ser bijetivo e fixo durante toda a vida
//! da instância. Implementações concretas: [`MaxEntModel`](crate::maxent::MaxEntModel).

use std::sync::Arc;

use crate::error::BoxError;

/// Contrato do modelo de probabilidade consumido pelo beam search.
///
/// O motor só usa `&self`: durante uma decodificação o modelo é somente
/// leitura, e por isso pode ser compartilhado entre threads.
pub trait ProbabilityModel: Send + Sync {
    /// Avalia o contexto e devolve uma probabilidade por outcome, na ordem
    /// dos índices, somando 1.
    fn evaluate(&self, context: &[String]) -> Result<Vec<f64>, BoxError>;

    /// Variante que reaproveita um buffer de saída. A semântica é idêntica a
    /// [`evaluate`](Self::evaluate).
    fn evaluate_into(&self, context: &[String], probs: &mut Vec<f64>) -> Result<(), BoxError> {
        let evaluated = self.evaluate(context)?;
        probs.clear();
        probs.extend_from_slice(&evaluated);
        Ok(())
    }

    /// Tamanho do vocabulário de outcomes.
    fn outcome_count(&self) -> usize;

    /// Rótulo do outcome de índice `index`.
    fn outcome(&self, index: usize) -> Option<&str>;

    /// Índice do rótulo `label`, se pertencer ao vocabulário.
    fn outcome_index(&self, label: &str) -> Option<usize> {
        (0..self.outcome_count()).find(|&i| self.outcome(i) == Some(label))
    }

    /// Todos os rótulos em ordem de índice.
    fn outcomes(&self) -> Vec<&str> {
        (0..self.outcome_count())
            .filter_map(|i| self.outcome(i))
            .collect()
    }
}

impl<M: ProbabilityModel + ?Sized> ProbabilityModel for Arc<M> {
    fn evaluate(&self, context: &[String]) -> Result<Vec<f64>, BoxError> {
        (**self).evaluate(context)
    }

    fn evaluate_into(&self, context: &[String], probs: &mut Vec<f64>) -> Result<(), BoxError> {
        (**self).evaluate_into(context, probs)
    }

    fn outcome_count(&self) -> usize {
        (**self).outcome_count()
    }

    fn outcome(&self, index: usize) -> Option<&str> {
        (**self).outcome(index)
    }

    fn outcome_index(&self, label: &str) -> Option<usize> {
        (**self).outcome_index(label)
    }
}
