//! # Beam Search: Decodificação Aproximada de Sequências
//!
//! Uma busca exaustiva sobre `|V|` rótulos e `N` tokens teria `O(|V|^N)`
//! combinações. O beam search mantém, a cada posição, apenas as **K melhores**
//! sequências parciais e expande somente elas → `O(N × K × |V|)`.
//!
//! ## Algoritmo
//!
//! ```text
//! beam ← [ sequência vazia (score 0) ]
//! para cada posição i:
//!     para cada sequência s no beam:
//!         ctx   ← gerador.context(i, tokens, s.histórico, aux)
//!         probs ← modelo.evaluate(ctx)           (via cache, se ligado)
//!         para cada outcome o com probs[o] > 0 e validador ok:
//!             oferece s + o com score s.score + ln probs[o]
//!     beam ← top-K dos candidatos (empate: o primeiro oferecido vence)
//!     se nenhum candidato: aplica a ExhaustionPolicy
//! devolve o beam ordenado
//! ```
//!
//! Diferente do Viterbi, o resultado **não** é garantidamente o ótimo global:
//! é o melhor encontrado dentro do beam explorado.
//!
//! ## Exemplo
//!
//! ```rust
//! use seqtag_core::error::BoxError;
//! use seqtag_core::maxent::MaxEntModel;
//! use seqtag_core::search::BeamSearch;
//!
//! let mut model = MaxEntModel::new(["A", "B"]).unwrap();
//! model.set_weight("w=b", "B", 3.0).unwrap();
//!
//! let generator = |i: usize, tokens: &[&str], _prior: &[&str], _aux: Option<&[()]>|
//!     -> Result<Vec<String>, BoxError> { Ok(vec![format!("w={}", tokens[i])]) };
//!
//! let search = BeamSearch::new(model, 2).unwrap();
//! let best = search.decode(&["a", "b"], None, &generator, None).unwrap().unwrap();
//! assert_eq!(best.outcomes(), ["A", "B"]);
//! ```

use std::sync::{Arc, Mutex, PoisonError};

use rayon::prelude::*;
use tracing::{debug, trace, warn};

use crate::beam::Beam;
use crate::cache::{CacheStats, EvalCache};
use crate::config::{BeamSearchConfig, ExhaustionPolicy};
use crate::context::ContextGenerator;
use crate::error::{BeamError, Result};
use crate::model::ProbabilityModel;
use crate::sequence::{HistoryArena, NodeId, Sequence};
use crate::validator::SequenceValidator;

/// Uma entrada do beam durante a busca: ponta do histórico no arena + score.
#[derive(Debug, Clone, Copy)]
struct Hypothesis {
    tip: Option<NodeId>,
    score: f64,
}

/// Um filho candidato ainda não materializado no arena.
#[derive(Debug, Clone, Copy)]
struct Candidate {
    parent: Option<NodeId>,
    outcome: usize,
    prob: f64,
}

/// Continuações admissíveis de um pai: `(outcome, prob)`.
type Expansion = Vec<(usize, f64)>;

/// Motor de beam search sobre um modelo de probabilidade.
///
/// O motor é reutilizável: o modelo e o cache vivem nele, enquanto beams e
/// históricos são criados a cada chamada. Todas as operações usam `&self`, de
/// modo que um `Arc<BeamSearch<_>>` pode atender várias threads.
#[derive(Debug)]
pub struct BeamSearch<M> {
    model: M,
    config: BeamSearchConfig,
    cache: Mutex<EvalCache>,
}

impl<M: ProbabilityModel> BeamSearch<M> {
    /// Cria o motor com beam `beam_size` e demais parâmetros padrão.
    pub fn new(model: M, beam_size: usize) -> Result<Self> {
        Self::with_config(model, BeamSearchConfig::new(beam_size))
    }

    /// Cria o motor a partir de uma configuração completa.
    pub fn with_config(model: M, config: BeamSearchConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            model,
            cache: Mutex::new(EvalCache::new(config.cache_capacity)),
            config,
        })
    }

    pub fn model(&self) -> &M {
        &self.model
    }

    pub fn config(&self) -> &BeamSearchConfig {
        &self.config
    }

    pub fn beam_size(&self) -> usize {
        self.config.beam_size
    }

    pub fn cache_stats(&self) -> CacheStats {
        self.cache.lock().unwrap_or_else(PoisonError::into_inner).stats()
    }

    pub fn clear_cache(&self) {
        self.cache.lock().unwrap_or_else(PoisonError::into_inner).clear();
    }

    /// Melhor sequência encontrada.
    ///
    /// `Ok(None)` só acontece com [`ExhaustionPolicy::DropBranch`] quando alguma
    /// posição não tem continuação válida. Entrada vazia devolve uma sequência
    /// vazia com score 0.
    pub fn decode<T, A, C>(
        &self,
        tokens: &[T],
        aux: Option<&[A]>,
        generator: &C,
        validator: Option<&dyn SequenceValidator<T>>,
    ) -> Result<Option<Sequence>>
    where
        T: Sync,
        A: Sync,
        C: ContextGenerator<T, A> + ?Sized,
    {
        Ok(self
            .decode_top(1, tokens, aux, generator, validator)?
            .into_iter()
            .next())
    }

    /// Todas as sequências sobreviventes (no máximo K), da melhor para a pior.
    pub fn decode_n_best<T, A, C>(
        &self,
        tokens: &[T],
        aux: Option<&[A]>,
        generator: &C,
        validator: Option<&dyn SequenceValidator<T>>,
    ) -> Result<Vec<Sequence>>
    where
        T: Sync,
        A: Sync,
        C: ContextGenerator<T, A> + ?Sized,
    {
        self.decode_top(self.config.beam_size, tokens, aux, generator, validator)
    }

    /// As `n` melhores sequências (no máximo `min(n, K)`), da melhor para a pior.
    pub fn decode_top<T, A, C>(
        &self,
        n: usize,
        tokens: &[T],
        aux: Option<&[A]>,
        generator: &C,
        validator: Option<&dyn SequenceValidator<T>>,
    ) -> Result<Vec<Sequence>>
    where
        T: Sync,
        A: Sync,
        C: ContextGenerator<T, A> + ?Sized,
    {
        debug!(
            tokens = tokens.len(),
            beam_size = self.config.beam_size,
            outcomes = self.model.outcome_count(),
            "beam search started"
        );

        let mut arena = HistoryArena::new();
        let mut beam = vec![Hypothesis {
            tip: None,
            score: 0.0,
        }];

        for position in 0..tokens.len() {
            let expansions: Vec<Result<Expansion>> = if self.config.parallel && beam.len() > 1 {
                beam.par_iter()
                    .map(|hyp| self.expand(position, tokens, aux, generator, validator, &arena, hyp))
                    .collect()
            } else {
                beam.iter()
                    .map(|hyp| self.expand(position, tokens, aux, generator, validator, &arena, hyp))
                    .collect()
            };

            let mut next: Beam<Candidate> = Beam::new(self.config.beam_size);
            for (parent, expansion) in beam.iter().zip(expansions) {
                for (outcome, prob) in expansion? {
                    let score = parent.score + prob.ln();
                    if let Some(min_score) = self.config.min_score {
                        if score <= min_score {
                            continue;
                        }
                    }
                    next.offer(
                        score,
                        Candidate {
                            parent: parent.tip,
                            outcome,
                            prob,
                        },
                    );
                }
            }

            trace!(
                position,
                parents = beam.len(),
                candidates = next.offered(),
                survivors = next.len(),
                "position expanded"
            );

            if next.is_empty() {
                match self.config.on_exhausted {
                    ExhaustionPolicy::Freeze => {
                        warn!(position, "no valid continuation, freezing beam");
                        break;
                    }
                    ExhaustionPolicy::DropBranch => {
                        warn!(position, "no valid continuation, dropping beam");
                        beam.clear();
                        break;
                    }
                    ExhaustionPolicy::FailFast => {
                        warn!(position, "no valid continuation");
                        return Err(BeamError::Exhausted { position });
                    }
                }
            }

            beam = next
                .into_sorted()
                .into_iter()
                .map(|(score, candidate)| Hypothesis {
                    tip: Some(arena.push(candidate.parent, candidate.outcome, candidate.prob)),
                    score,
                })
                .collect();
        }

        let sequences = beam
            .iter()
            .take(n)
            .map(|hyp| self.materialize(&arena, hyp))
            .collect::<Result<Vec<_>>>()?;

        debug!(
            returned = sequences.len(),
            best_score = sequences.first().map(Sequence::score),
            history_nodes = arena.len(),
            "beam search finished"
        );
        Ok(sequences)
    }

    /// Gera o contexto de um pai, avalia o modelo e filtra os outcomes.
    #[allow(clippy::too_many_arguments)]
    fn expand<T, A, C>(
        &self,
        position: usize,
        tokens: &[T],
        aux: Option<&[A]>,
        generator: &C,
        validator: Option<&dyn SequenceValidator<T>>,
        arena: &HistoryArena,
        hyp: &Hypothesis,
    ) -> Result<Expansion>
    where
        C: ContextGenerator<T, A> + ?Sized,
    {
        let prior = self.labels(&arena.outcomes(hyp.tip))?;
        let context = generator
            .context(position, tokens, &prior, aux)
            .map_err(|source| BeamError::Context { position, source })?;
        let probs = self.evaluate(position, context)?;

        let mut expansion = Vec::with_capacity(probs.len());
        for (outcome, &prob) in probs.iter().enumerate() {
            if prob == 0.0 {
                continue;
            }
            if let Some(validator) = validator {
                let label = self.label(outcome)?;
                if !validator.is_valid(position, tokens, &prior, label) {
                    continue;
                }
            }
            expansion.push((outcome, prob));
        }
        Ok(expansion)
    }

    /// Avalia o modelo (ou consulta o cache) e verifica o contrato da distribuição.
    fn evaluate(&self, position: usize, context: Vec<String>) -> Result<Arc<[f64]>> {
        if self.config.cache_capacity > 0 {
            let cached = self
                .cache
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .get(&context);
            if let Some(probs) = cached {
                trace!(position, "cache hit");
                return Ok(probs);
            }
        }

        let mut probs = Vec::with_capacity(self.model.outcome_count());
        self.model
            .evaluate_into(&context, &mut probs)
            .map_err(|source| BeamError::Model { position, source })?;
        self.check_distribution(position, &probs)?;

        let probs: Arc<[f64]> = probs.into();
        if self.config.cache_capacity > 0 {
            self.cache
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .insert(context, Arc::clone(&probs));
        }
        Ok(probs)
    }

    fn check_distribution(&self, position: usize, probs: &[f64]) -> Result<()> {
        let expected = self.model.outcome_count();
        if probs.len() != expected {
            return Err(BeamError::DistributionLength {
                position,
                expected,
                found: probs.len(),
            });
        }
        if let Some((outcome, &value)) = probs
            .iter()
            .enumerate()
            .find(|(_, p)| !(0.0..=1.0).contains(*p))
        {
            return Err(BeamError::InvalidProbability {
                position,
                outcome,
                value,
            });
        }
        Ok(())
    }

    fn label(&self, outcome: usize) -> Result<&str> {
        self.model
            .outcome(outcome)
            .ok_or_else(|| BeamError::UnknownOutcome(format!("#{outcome}")))
    }

    fn labels(&self, outcomes: &[usize]) -> Result<Vec<&str>> {
        outcomes.iter().map(|&o| self.label(o)).collect()
    }

    fn materialize(&self, arena: &HistoryArena, hyp: &Hypothesis) -> Result<Sequence> {
        let trail = arena.trail(hyp.tip);
        let mut outcomes = Vec::with_capacity(trail.len());
        let mut probs = Vec::with_capacity(trail.len());
        for (outcome, prob) in trail {
            outcomes.push(self.label(outcome)?.to_string());
            probs.push(prob);
        }
        Ok(Sequence::from_parts(outcomes, probs, hyp.score))
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;
    use crate::error::BoxError;
    use crate::validator::BioValidator;

    /// Modelo de teste: o contexto traz o rótulo "verdadeiro" na primeira
    /// feature; ele recebe 0.8 e os demais dividem 0.2.
    struct FavorContext {
        labels: Vec<String>,
        calls: AtomicUsize,
    }

    impl FavorContext {
        fn new(labels: &[&str]) -> Self {
            Self {
                labels: labels.iter().map(|l| l.to_string()).collect(),
                calls: AtomicUsize::new(0),
            }
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    impl ProbabilityModel for FavorContext {
        fn evaluate(&self, context: &[String]) -> std::result::Result<Vec<f64>, BoxError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let other = 0.2 / (self.labels.len() - 1) as f64;
            Ok(self
                .labels
                .iter()
                .map(|l| if Some(l) == context.first() { 0.8 } else { other })
                .collect())
        }

        fn outcome_count(&self) -> usize {
            self.labels.len()
        }

        fn outcome(&self, index: usize) -> Option<&str> {
            self.labels.get(index).map(String::as_str)
        }
    }

    /// O contexto da posição i é o próprio token i.
    struct EchoToken;

    impl ContextGenerator<String> for EchoToken {
        fn context(
            &self,
            position: usize,
            tokens: &[String],
            _prior: &[&str],
            _aux: Option<&[()]>,
        ) -> std::result::Result<Vec<String>, BoxError> {
            Ok(vec![tokens[position].clone()])
        }
    }

    /// Modelo dependente do histórico que engana a busca gulosa:
    /// começar por "a" parece melhor, mas "b" leva a uma continuação quase certa.
    struct GardenPath;

    impl ProbabilityModel for GardenPath {
        fn evaluate(&self, context: &[String]) -> std::result::Result<Vec<f64>, BoxError> {
            Ok(match context[0].as_str() {
                "prev=^" => vec![0.6, 0.4],
                "prev=a" => vec![0.5, 0.5],
                _ => vec![0.01, 0.99],
            })
        }

        fn outcome_count(&self) -> usize {
            2
        }

        fn outcome(&self, index: usize) -> Option<&str> {
            ["a", "b"].get(index).copied()
        }
    }

    struct PrevOutcome;

    impl ContextGenerator<String> for PrevOutcome {
        fn context(
            &self,
            _position: usize,
            _tokens: &[String],
            prior: &[&str],
            _aux: Option<&[()]>,
        ) -> std::result::Result<Vec<String>, BoxError> {
            Ok(vec![format!("prev={}", prior.last().copied().unwrap_or("^"))])
        }
    }

    /// Modelo que devolve sempre a mesma distribuição (possivelmente malformada).
    struct Constant(Vec<f64>);

    impl ProbabilityModel for Constant {
        fn evaluate(&self, _context: &[String]) -> std::result::Result<Vec<f64>, BoxError> {
            Ok(self.0.clone())
        }

        fn outcome_count(&self) -> usize {
            3
        }

        fn outcome(&self, index: usize) -> Option<&str> {
            ["x", "y", "z"].get(index).copied()
        }
    }

    fn tokens(labels: &[&str]) -> Vec<String> {
        labels.iter().map(|l| l.to_string()).collect()
    }

    fn reject_two(_position: usize, _tokens: &[String], _prior: &[&str], outcome: &str) -> bool {
        outcome != "2"
    }

    fn reject_at_two(position: usize, _tokens: &[String], _prior: &[&str], _outcome: &str) -> bool {
        position != 2
    }

    #[test]
    fn test_zero_length_input() {
        let search = BeamSearch::new(FavorContext::new(&["1", "2", "3"]), 3).unwrap();
        let seq = search
            .decode(&tokens(&[]), None, &EchoToken, None)
            .unwrap()
            .unwrap();
        assert!(seq.is_empty());
        assert_eq!(seq.score(), 0.0);
        assert_eq!(search.model().calls(), 0);
    }

    #[test]
    fn test_one_element_input() {
        let search = BeamSearch::new(FavorContext::new(&["1", "2", "3"]), 3).unwrap();
        let seq = search
            .decode(&tokens(&["1"]), None, &EchoToken, None)
            .unwrap()
            .unwrap();
        assert_eq!(seq.outcomes(), ["1"]);
        assert!((seq.score() - 0.8f64.ln()).abs() < 1e-12);
        assert_eq!(seq.probs(), [0.8]);
    }

    #[test]
    fn test_best_sequence() {
        let input = tokens(&["1", "2", "3", "2", "1"]);
        let search = BeamSearch::new(FavorContext::new(&["1", "2", "3"]), 2).unwrap();
        let seq = search.decode(&input, None, &EchoToken, None).unwrap().unwrap();
        assert_eq!(seq.outcomes(), ["1", "2", "3", "2", "1"]);
    }

    #[test]
    fn test_best_sequence_with_validator() {
        let input = tokens(&["1", "2", "3", "2", "1"]);
        let search = BeamSearch::with_config(
            FavorContext::new(&["1", "2", "3"]),
            BeamSearchConfig::new(2).with_cache_capacity(0),
        )
        .unwrap();
        let seq = search
            .decode(&input, None, &EchoToken, Some(&reject_two))
            .unwrap()
            .unwrap();

        let out = seq.outcomes();
        assert_eq!(out.len(), 5);
        assert_eq!(out[0], "1");
        assert_ne!(out[1], "2");
        assert_eq!(out[2], "3");
        assert_ne!(out[3], "2");
        assert_eq!(out[4], "1");
    }

    #[test]
    fn test_beam_dominates_greedy() {
        let input = tokens(&["t0", "t1"]);
        let greedy = BeamSearch::new(GardenPath, 1).unwrap();
        let beam = BeamSearch::new(GardenPath, 2).unwrap();

        let g = greedy.decode(&input, None, &PrevOutcome, None).unwrap().unwrap();
        let b = beam.decode(&input, None, &PrevOutcome, None).unwrap().unwrap();

        assert_eq!(g.outcomes(), ["a", "a"]);
        assert_eq!(b.outcomes(), ["b", "b"]);
        assert!(b.score() >= g.score());
    }

    #[test]
    fn test_n_best_sorted_and_bounded() {
        let input = tokens(&["1", "3", "2"]);
        let search = BeamSearch::new(FavorContext::new(&["1", "2", "3"]), 4).unwrap();
        let all = search.decode_n_best(&input, None, &EchoToken, None).unwrap();

        assert_eq!(all.len(), 4);
        assert_eq!(all[0].outcomes(), ["1", "3", "2"]);
        for pair in all.windows(2) {
            assert!(pair[0].score() >= pair[1].score());
        }
        for seq in &all {
            assert_eq!(seq.len(), input.len());
            assert_eq!(seq.probs().len(), seq.outcomes().len());
        }

        let top2 = search.decode_top(2, &input, None, &EchoToken, None).unwrap();
        assert_eq!(top2, all[..2].to_vec());
    }

    #[test]
    fn test_deterministic() {
        let input = tokens(&["2", "2", "1", "3", "3", "1"]);
        let search = BeamSearch::new(FavorContext::new(&["1", "2", "3"]), 3).unwrap();
        let first = search.decode_n_best(&input, None, &EchoToken, None).unwrap();
        let second = search.decode_n_best(&input, None, &EchoToken, None).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_parallel_matches_sequential() {
        let input = tokens(&["a", "b", "a", "c"]);
        let labels = ["a", "b", "c"];
        let sequential = BeamSearch::new(FavorContext::new(&labels), 3).unwrap();
        let parallel = BeamSearch::with_config(
            FavorContext::new(&labels),
            BeamSearchConfig::new(3).with_parallel(true),
        )
        .unwrap();

        assert_eq!(
            sequential.decode_n_best(&input, None, &EchoToken, None).unwrap(),
            parallel.decode_n_best(&input, None, &EchoToken, None).unwrap()
        );
    }

    #[test]
    fn test_cache_saves_evaluations_without_changing_result() {
        let input = tokens(&["1", "2", "3", "2", "1"]);
        let uncached = BeamSearch::new(FavorContext::new(&["1", "2", "3"]), 3).unwrap();
        let cached = BeamSearch::with_config(
            FavorContext::new(&["1", "2", "3"]),
            BeamSearchConfig::new(3).with_cache_capacity(16),
        )
        .unwrap();

        let a = uncached.decode_n_best(&input, None, &EchoToken, None).unwrap();
        let b = cached.decode_n_best(&input, None, &EchoToken, None).unwrap();
        assert_eq!(a, b);

        // 1 pai na posição 0 e 3 pais em cada uma das outras 4 posições
        assert_eq!(uncached.model().calls(), 13);
        // apenas 3 contextos distintos: "1", "2" e "3"
        assert_eq!(cached.model().calls(), 3);

        let stats = cached.cache_stats();
        assert_eq!(stats.misses, 3);
        assert_eq!(stats.hits, 10);

        cached.clear_cache();
        assert_eq!(cached.cache_stats().len, 0);
    }

    #[test]
    fn test_evicting_cache_keeps_result() {
        let input = tokens(&["1", "2", "3", "1", "2", "3"]);
        let uncached = BeamSearch::new(FavorContext::new(&["1", "2", "3"]), 3).unwrap();
        let expected = uncached.decode_n_best(&input, None, &EchoToken, None).unwrap();

        for capacity in [1, 2] {
            let cached = BeamSearch::with_config(
                FavorContext::new(&["1", "2", "3"]),
                BeamSearchConfig::new(3).with_cache_capacity(capacity),
            )
            .unwrap();
            assert_eq!(
                cached.decode_n_best(&input, None, &EchoToken, None).unwrap(),
                expected,
                "capacity {capacity}"
            );
            // o contexto de cada posição já foi despejado quando volta a aparecer
            assert_eq!(cached.model().calls(), 6, "capacity {capacity}");
            assert_eq!(cached.cache_stats().misses, 6);
            assert!(cached.cache_stats().len <= capacity);
        }
    }

    #[test]
    fn test_zero_probability_outcomes_are_excluded() {
        let search = BeamSearch::new(Constant(vec![1.0, 0.0, 0.0]), 3).unwrap();
        let all = search
            .decode_n_best(&tokens(&["t"]), None, &EchoToken, None)
            .unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].outcomes(), ["x"]);
        assert_eq!(all[0].score(), 0.0);
    }

    #[test]
    fn test_min_score_prunes_candidates() {
        let search = BeamSearch::with_config(
            FavorContext::new(&["1", "2", "3"]),
            BeamSearchConfig::new(3).with_min_score(-1.0),
        )
        .unwrap();
        let all = search
            .decode_n_best(&tokens(&["2"]), None, &EchoToken, None)
            .unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].outcomes(), ["2"]);
    }

    #[test]
    fn test_exhaustion_freeze_returns_shortened_beam() {
        let input = tokens(&["1", "2", "3", "1"]);
        let search = BeamSearch::new(FavorContext::new(&["1", "2", "3"]), 2).unwrap();
        let seq = search
            .decode(&input, None, &EchoToken, Some(&reject_at_two))
            .unwrap()
            .unwrap();
        assert_eq!(seq.outcomes(), ["1", "2"]);
    }

    #[test]
    fn test_exhaustion_at_first_position_freezes_empty() {
        let reject_all = |_: usize, _: &[String], _: &[&str], _: &str| false;
        let search = BeamSearch::new(FavorContext::new(&["1", "2", "3"]), 2).unwrap();
        let seq = search
            .decode(&tokens(&["1", "2"]), None, &EchoToken, Some(&reject_all))
            .unwrap()
            .unwrap();
        assert!(seq.is_empty());
        assert_eq!(seq.score(), 0.0);
    }

    #[test]
    fn test_exhaustion_drop_branch_returns_none() {
        let search = BeamSearch::with_config(
            FavorContext::new(&["1", "2", "3"]),
            BeamSearchConfig::new(2).with_exhaustion_policy(ExhaustionPolicy::DropBranch),
        )
        .unwrap();
        let input = tokens(&["1", "2", "3"]);
        assert!(search
            .decode(&input, None, &EchoToken, Some(&reject_at_two))
            .unwrap()
            .is_none());
        assert!(search
            .decode_n_best(&input, None, &EchoToken, Some(&reject_at_two))
            .unwrap()
            .is_empty());
    }

    #[test]
    fn test_exhaustion_fail_fast() {
        let search = BeamSearch::with_config(
            FavorContext::new(&["1", "2", "3"]),
            BeamSearchConfig::new(2).with_exhaustion_policy(ExhaustionPolicy::FailFast),
        )
        .unwrap();
        let err = search
            .decode(&tokens(&["1", "2", "3"]), None, &EchoToken, Some(&reject_at_two))
            .unwrap_err();
        assert!(matches!(err, BeamError::Exhausted { position: 2 }));
    }

    #[test]
    fn test_invalid_beam_size() {
        assert!(matches!(
            BeamSearch::new(Constant(vec![1.0, 0.0, 0.0]), 0),
            Err(BeamError::InvalidBeamSize(0))
        ));
    }

    #[test]
    fn test_distribution_length_mismatch() {
        let search = BeamSearch::new(Constant(vec![0.5, 0.5]), 2).unwrap();
        let err = search
            .decode(&tokens(&["t"]), None, &EchoToken, None)
            .unwrap_err();
        assert!(matches!(
            err,
            BeamError::DistributionLength { position: 0, expected: 3, found: 2 }
        ));
    }

    #[test]
    fn test_probability_out_of_range() {
        let search = BeamSearch::new(Constant(vec![1.5, -0.25, 0.0]), 2).unwrap();
        let err = search
            .decode(&tokens(&["t"]), None, &EchoToken, None)
            .unwrap_err();
        assert!(matches!(err, BeamError::InvalidProbability { outcome: 0, .. }));

        let search = BeamSearch::new(Constant(vec![f64::NAN, 0.5, 0.5]), 2).unwrap();
        assert!(search.decode(&tokens(&["t"]), None, &EchoToken, None).is_err());
    }

    #[test]
    fn test_context_failure_propagates() {
        let failing = |position: usize, _: &[String], _: &[&str], _: Option<&[()]>|
            -> std::result::Result<Vec<String>, BoxError> {
            if position == 1 {
                Err("malformed context".into())
            } else {
                Ok(vec!["1".to_string()])
            }
        };
        let search = BeamSearch::new(FavorContext::new(&["1", "2", "3"]), 2).unwrap();
        let err = search
            .decode(&tokens(&["1", "2"]), None, &failing, None)
            .unwrap_err();
        match err {
            BeamError::Context { position, source } => {
                assert_eq!(position, 1);
                assert_eq!(source.to_string(), "malformed context");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_bio_validator_holds_on_every_result() {
        // Modelo que sempre prefere I-PER, inclusive onde ele é inválido
        struct PreferInside;

        impl ProbabilityModel for PreferInside {
            fn evaluate(&self, _context: &[String]) -> std::result::Result<Vec<f64>, BoxError> {
                Ok(vec![0.2, 0.1, 0.7])
            }

            fn outcome_count(&self) -> usize {
                3
            }

            fn outcome(&self, index: usize) -> Option<&str> {
                ["O", "B-PER", "I-PER"].get(index).copied()
            }
        }

        let search = BeamSearch::new(PreferInside, 3).unwrap();
        let input = tokens(&["a", "b", "c", "d"]);
        let all = search
            .decode_n_best(&input, None, &EchoToken, Some(&BioValidator))
            .unwrap();

        assert!(!all.is_empty());
        for seq in &all {
            assert_eq!(seq.len(), input.len());
            assert!(BioValidator::is_valid_sequence(seq.outcomes()));
        }
        assert_eq!(all[0].outcomes(), ["B-PER", "I-PER", "I-PER", "I-PER"]);
    }

    #[test]
    fn test_aux_data_reaches_generator() {
        let generator = |position: usize, _: &[String], _: &[&str], aux: Option<&[String]>|
            -> std::result::Result<Vec<String>, BoxError> {
            let aux = aux.ok_or("missing aux data")?;
            Ok(vec![aux[position].clone()])
        };
        let search = BeamSearch::new(FavorContext::new(&["1", "2", "3"]), 2).unwrap();
        let aux = tokens(&["3", "1"]);
        let seq = search
            .decode(&tokens(&["x", "y"]), Some(aux.as_slice()), &generator, None)
            .unwrap()
            .unwrap();
        assert_eq!(seq.outcomes(), ["3", "1"]);

        let missing: Option<&[String]> = None;
        assert!(search.decode(&tokens(&["x"]), missing, &generator, None).is_err());
    }
}
