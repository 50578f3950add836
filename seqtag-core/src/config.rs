//! # Configuração do Beam Search
//!
//! Todos os parâmetros de construção do motor ficam em [`BeamSearchConfig`],
//! que pode ser montado em código ou desserializado de JSON (campos ausentes
//! assumem os valores padrão).
//!
//! ```rust
//! use seqtag_core::config::{BeamSearchConfig, ExhaustionPolicy};
//!
//! let config: BeamSearchConfig =
//!     serde_json::from_str(r#"{"beam_size": 5, "on_exhausted": "fail_fast"}"#).unwrap();
//! assert_eq!(config.beam_size, 5);
//! assert_eq!(config.on_exhausted, ExhaustionPolicy::FailFast);
//! assert_eq!(config.cache_capacity, 0);
//! ```

use serde::{Deserialize, Serialize};

use crate::error::{BeamError, Result};

/// Largura de beam usada quando nada é informado.
pub const DEFAULT_BEAM_SIZE: usize = 3;

/// O que fazer quando, em alguma posição, **nenhum** candidato sobrevive
/// (o validador rejeitou tudo, todas as probabilidades eram zero ou todos
/// ficaram abaixo de `min_score`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExhaustionPolicy {
    /// **Congelar**: o beam anterior é mantido e a decodificação para ali.
    /// As sequências devolvidas ficam mais curtas que a entrada.
    #[default]
    Freeze,
    /// **Descartar**: o beam esgotado é descartado; `decode` devolve `None`
    /// e `decode_n_best` devolve uma lista vazia.
    DropBranch,
    /// **Falhar**: a chamada devolve [`BeamError::Exhausted`].
    FailFast,
}

/// Parâmetros do motor de beam search.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BeamSearchConfig {
    /// Número máximo de sequências parciais mantidas entre posições (K ≥ 1).
    /// K = 1 equivale à decodificação gulosa.
    pub beam_size: usize,
    /// Capacidade do cache de avaliações do modelo. 0 desliga o cache.
    pub cache_capacity: usize,
    /// Política aplicada quando nenhuma continuação é válida.
    pub on_exhausted: ExhaustionPolicy,
    /// Se presente, sequências com score acumulado `<=` a este valor são
    /// descartadas durante a expansão.
    pub min_score: Option<f64>,
    /// Expande os pais de uma mesma posição em paralelo (rayon).
    pub parallel: bool,
}

impl Default for BeamSearchConfig {
    fn default() -> Self {
        Self {
            beam_size: DEFAULT_BEAM_SIZE,
            cache_capacity: 0,
            on_exhausted: ExhaustionPolicy::Freeze,
            min_score: None,
            parallel: false,
        }
    }
}

impl BeamSearchConfig {
    pub fn new(beam_size: usize) -> Self {
        Self {
            beam_size,
            ..Self::default()
        }
    }

    pub fn with_cache_capacity(mut self, capacity: usize) -> Self {
        self.cache_capacity = capacity;
        self
    }

    pub fn with_exhaustion_policy(mut self, policy: ExhaustionPolicy) -> Self {
        self.on_exhausted = policy;
        self
    }

    pub fn with_min_score(mut self, min_score: f64) -> Self {
        self.min_score = Some(min_score);
        self
    }

    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Verifica os invariantes de construção.
    pub fn validate(&self) -> Result<()> {
        if self.beam_size < 1 {
            return Err(BeamError::InvalidBeamSize(self.beam_size));
        }
        Ok(())
    }
}
