//! # Gerador de Contexto
//!
//! Para cada posição visitada pelo beam search, o gerador transforma
//! `(posição, tokens, histórico de outcomes, dados auxiliares)` na lista de
//! features que o modelo vai avaliar.
//!
//! A mesma posição é consultada várias vezes com históricos diferentes (um por
//! entrada do beam), então o gerador precisa ser uma **função pura** das suas
//! entradas: nenhum estado escondido pode alterar a saída.
//!
//! Implementação para tagging: [`TokenContextGenerator`](crate::features::TokenContextGenerator).

use crate::error::BoxError;

/// Produz o contexto de features de uma posição.
///
/// - `T`: tipo dos tokens de entrada.
/// - `A`: tipo dos dados auxiliares por token (ex.: tags POS para um chunker).
pub trait ContextGenerator<T, A = ()>: Send + Sync {
    fn context(
        &self,
        position: usize,
        tokens: &[T],
        prior: &[&str],
        aux: Option<&[A]>,
    ) -> Result<Vec<String>, BoxError>;
}

impl<T, A, F> ContextGenerator<T, A> for F
where
    F: Fn(usize, &[T], &[&str], Option<&[A]>) -> Result<Vec<String>, BoxError> + Send + Sync,
{
    fn context(
        &self,
        position: usize,
        tokens: &[T],
        prior: &[&str],
        aux: Option<&[A]>,
    ) -> Result<Vec<String>, BoxError> {
        self(position, tokens, prior, aux)
    }
}
