//! # Erros do Decodificador
//!
//! Um único enum cobre as três famílias de falha do sistema:
//!
//! - **Configuração**: parâmetros inválidos detectados na construção (beam < 1,
//!   vocabulário com rótulos duplicados).
//! - **Contrato de colaborador**: o modelo devolveu uma distribuição malformada.
//!   O motor não normaliza nem tolera silenciosamente esses casos.
//! - **Falha de colaborador**: erro levantado pelo gerador de contexto ou pelo
//!   modelo, repassado intacto como `source` junto com a posição.
//!
//! Busca esgotada e entrada vazia **não** são erros, exceto quando a política
//! [`ExhaustionPolicy::FailFast`](crate::config::ExhaustionPolicy) é escolhida.

/// Erro opaco devolvido pelos colaboradores (modelo e gerador de contexto).
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

pub type Result<T, E = BeamError> = std::result::Result<T, E>;

#[derive(Debug, thiserror::Error)]
pub enum BeamError {
    #[error("beam size must be at least 1, got {0}")]
    InvalidBeamSize(usize),

    #[error("duplicate outcome label {0:?}")]
    DuplicateOutcome(String),

    #[error("unknown outcome {0:?}")]
    UnknownOutcome(String),

    #[error("feature {feature:?} has {found} weights for {expected} outcomes")]
    WeightRowLength {
        feature: String,
        expected: usize,
        found: usize,
    },

    #[error("model returned {found} probabilities for {expected} outcomes at position {position}")]
    DistributionLength {
        position: usize,
        expected: usize,
        found: usize,
    },

    #[error("model returned invalid probability {value} for outcome {outcome} at position {position}")]
    InvalidProbability {
        position: usize,
        outcome: usize,
        value: f64,
    },

    #[error("context generator failed at position {position}")]
    Context {
        position: usize,
        #[source]
        source: BoxError,
    },

    #[error("model evaluation failed at position {position}")]
    Model {
        position: usize,
        #[source]
        source: BoxError,
    },

    #[error("no valid continuation at position {position}")]
    Exhausted { position: usize },
}
