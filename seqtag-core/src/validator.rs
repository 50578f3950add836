//! # Validador de Sequências
//!
//! Antes de um candidato entrar na fronteira do beam, o validador decide se o
//! outcome é admissível naquela posição dado o histórico. É a forma de impor
//! restrições estruturais que o modelo sozinho não garante.
//!
//! ## Exemplo: esquema BIO
//!
//! ```text
//! O  B-PER  I-PER   ✔
//! O  I-PER          ✘  (I-PER sem B-PER antes)
//! B-ORG  I-PER      ✘  (categoria diferente)
//! ```
//!
//! Ausência de validador significa "tudo é válido".

use crate::tagger::BioTag;

/// Predicado puro de admissibilidade.
pub trait SequenceValidator<T>: Send + Sync {
    /// `prior` contém os outcomes já escolhidos para as posições `0..position`.
    fn is_valid(&self, position: usize, tokens: &[T], prior: &[&str], outcome: &str) -> bool;
}

impl<T, F> SequenceValidator<T> for F
where
    F: Fn(usize, &[T], &[&str], &str) -> bool + Send + Sync,
{
    fn is_valid(&self, position: usize, tokens: &[T], prior: &[&str], outcome: &str) -> bool {
        self(position, tokens, prior, outcome)
    }
}

/// Aceita qualquer outcome.
#[derive(Debug, Clone, Copy, Default)]
pub struct AlwaysValid;

impl<T> SequenceValidator<T> for AlwaysValid {
    fn is_valid(&self, _position: usize, _tokens: &[T], _prior: &[&str], _outcome: &str) -> bool {
        true
    }
}

/// Impõe o esquema BIO sobre rótulos `B-X`, `I-X` e `O`.
///
/// Regras:
/// - `I-X` só pode seguir `B-X` ou `I-X` (mesma categoria);
/// - `I-X` nunca abre a sequência;
/// - `B-X`, `O` e rótulos fora do esquema são sempre aceitos.
#[derive(Debug, Clone, Copy, Default)]
pub struct BioValidator;

impl BioValidator {
    /// Verifica a transição `prev → next`. `prev = None` indica início de sequência.
    pub fn is_valid_transition(prev: Option<&str>, next: &str) -> bool {
        match BioTag::parse(next) {
            Some(BioTag::Inside(category)) => match prev.and_then(BioTag::parse) {
                Some(BioTag::Begin(prev_cat)) | Some(BioTag::Inside(prev_cat)) => {
                    prev_cat == category
                }
                _ => false,
            },
            _ => true,
        }
    }

    /// Verifica uma sequência completa de rótulos.
    pub fn is_valid_sequence<S: AsRef<str>>(labels: &[S]) -> bool {
        let mut prev: Option<&str> = None;
        for label in labels {
            let label = label.as_ref();
            if !Self::is_valid_transition(prev, label) {
                return false;
            }
            prev = Some(label);
        }
        true
    }
}

impl<T> SequenceValidator<T> for BioValidator {
    fn is_valid(&self, _position: usize, _tokens: &[T], prior: &[&str], outcome: &str) -> bool {
        Self::is_valid_transition(prior.last().copied(), outcome)
    }
}
