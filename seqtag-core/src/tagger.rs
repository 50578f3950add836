//! # Tagging de Sequências com Esquema BIO
//!
//! O [`SequenceTagger`] junta as peças do crate num fluxo texto → entidades:
//!
//! 1. **Tokenização** ([`tokenize`]) preservando offsets;
//! 2. **Decodificação** com [`BeamSearch`], o [`TokenContextGenerator`] e o
//!    [`BioValidator`];
//! 3. **Reconstrução de spans** ([`tokens_to_spans`]) a partir das tags BIO.
//!
//! ## Esquema BIO
//!
//! - `B-TAG`: Begin, primeiro token de uma entidade
//! - `I-TAG`: Inside, tokens subsequentes da mesma entidade
//! - `O`: Outside, não é parte de nenhuma entidade
//!
//! As categorias não são fixas: qualquer rótulo `B-X`/`I-X` do modelo define a
//! categoria `X` (PER, LOC, NP, VP...).

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::BeamSearchConfig;
use crate::error::Result;
use crate::features::TokenContextGenerator;
use crate::model::ProbabilityModel;
use crate::search::BeamSearch;
use crate::sequence::Sequence;
use crate::tokenizer::{token_texts, tokenize, Token};
use crate::validator::BioValidator;

/// Tag BIO decomposta, emprestando a categoria do rótulo original.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BioTag<'a> {
    /// **Begin**: Marca o INÍCIO de uma entidade. Ex: **São** (B-LOC) Paulo.
    Begin(&'a str),
    /// **Inside**: Marca a CONTINUAÇÃO de uma entidade. Ex: São **Paulo** (I-LOC).
    Inside(&'a str),
    /// **Outside**: O token não faz parte de nenhuma entidade.
    Outside,
}

impl<'a> BioTag<'a> {
    /// Parseia um rótulo (ex: "B-PER" → `Begin("PER")`). Rótulos fora do
    /// esquema devolvem `None`.
    pub fn parse(label: &'a str) -> Option<Self> {
        if label == "O" {
            return Some(BioTag::Outside);
        }
        let (prefix, category) = label.split_once('-')?;
        if category.is_empty() {
            return None;
        }
        match prefix {
            "B" => Some(BioTag::Begin(category)),
            "I" => Some(BioTag::Inside(category)),
            _ => None,
        }
    }

    /// Categoria desta tag (se for B- ou I-).
    pub fn category(&self) -> Option<&'a str> {
        match *self {
            BioTag::Begin(c) | BioTag::Inside(c) => Some(c),
            BioTag::Outside => None,
        }
    }
}

/// Um token com sua tag e a probabilidade atribuída a ela pelo modelo.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaggedToken {
    pub token: Token,
    pub tag: String,
    /// Probabilidade da tag dado o contexto (0.0 a 1.0)
    pub confidence: f64,
}

/// Uma entidade identificada no texto (spans de múltiplos tokens)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntitySpan {
    /// Texto da entidade (ex: "São Paulo")
    pub text: String,
    /// Categoria da entidade (ex: "LOC")
    pub category: String,
    /// Índice do primeiro token
    pub start_token: usize,
    /// Índice do último token (inclusivo)
    pub end_token: usize,
    /// Posição de byte inicial no texto original
    pub start: usize,
    /// Posição de byte final no texto original
    pub end: usize,
    /// Confiança média dos tokens
    pub confidence: f64,
}

/// Converte uma sequência de tokens classificados (BIO) em spans de entidades.
///
/// - Inicia uma nova entidade ao encontrar `B-XXX`.
/// - Continua a entidade enquanto encontrar `I-XXX` da **mesma** categoria.
/// - Finaliza a entidade ao encontrar `O`, `B-YYY` ou `I-YYY` (de outra categoria).
///
/// # Exemplo
/// `[B-PER, I-PER, O, B-LOC]` -> `[EntitySpan(PER), EntitySpan(LOC)]`
pub fn tokens_to_spans(tagged: &[TaggedToken], original_text: &str) -> Vec<EntitySpan> {
    let mut spans = Vec::new();
    let mut i = 0;

    while i < tagged.len() {
        let Some(BioTag::Begin(cat)) = BioTag::parse(&tagged[i].tag) else {
            i += 1;
            continue;
        };

        let start_token = tagged[i].token.index;
        let start_byte = tagged[i].token.start;
        let mut end_token = start_token;
        let mut end_byte = tagged[i].token.end;
        let mut conf_sum = tagged[i].confidence;
        let mut count = 1usize;

        // Acumula tokens I-XXX consecutivos da mesma categoria
        let mut j = i + 1;
        while j < tagged.len() {
            match BioTag::parse(&tagged[j].tag) {
                Some(BioTag::Inside(next_cat)) if next_cat == cat => {
                    end_token = tagged[j].token.index;
                    end_byte = tagged[j].token.end;
                    conf_sum += tagged[j].confidence;
                    count += 1;
                    j += 1;
                }
                _ => break,
            }
        }

        let entity_text = original_text
            .get(start_byte..end_byte)
            .unwrap_or_default()
            .trim()
            .to_string();
        spans.push(EntitySpan {
            text: entity_text,
            category: cat.to_string(),
            start_token,
            end_token,
            start: start_byte,
            end: end_byte,
            confidence: conf_sum / count as f64,
        });

        i = j;
    }

    spans
}

/// Resultado completo do tagging de um texto.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaggingResult {
    /// Tokens com a tag da melhor sequência.
    pub tokens: Vec<TaggedToken>,
    /// Entidades reconstruídas a partir da melhor sequência.
    pub entities: Vec<EntitySpan>,
    /// Todas as sequências sobreviventes, da melhor para a pior.
    pub alternatives: Vec<Sequence>,
}

/// Tagger de texto livre: tokenização + beam search com validação BIO.
#[derive(Debug)]
pub struct SequenceTagger<M> {
    search: BeamSearch<M>,
    generator: TokenContextGenerator,
}

impl<M: ProbabilityModel> SequenceTagger<M> {
    pub fn new(model: M, config: BeamSearchConfig) -> Result<Self> {
        Self::with_generator(model, config, TokenContextGenerator::new())
    }

    pub fn with_generator(
        model: M,
        config: BeamSearchConfig,
        generator: TokenContextGenerator,
    ) -> Result<Self> {
        Ok(Self {
            search: BeamSearch::with_config(model, config)?,
            generator,
        })
    }

    pub fn search(&self) -> &BeamSearch<M> {
        &self.search
    }

    pub fn generator(&self) -> &TokenContextGenerator {
        &self.generator
    }

    /// Tokeniza e rotula `text`.
    ///
    /// Se a busca parar antes do fim (política `freeze`), só os tokens
    /// alcançados recebem tag; sem nenhuma sequência (`drop_branch`), o
    /// resultado vem vazio.
    pub fn tag(&self, text: &str) -> Result<TaggingResult> {
        let tokens = tokenize(text);
        let texts = token_texts(&tokens);
        let alternatives = self.tag_tokens(texts.as_slice(), None, self.search.beam_size())?;

        let tagged: Vec<TaggedToken> = match alternatives.first() {
            Some(best) => tokens
                .into_iter()
                .zip(best.outcomes().iter().zip(best.probs()))
                .map(|(token, (tag, &confidence))| TaggedToken {
                    token,
                    tag: tag.clone(),
                    confidence,
                })
                .collect(),
            None => Vec::new(),
        };
        let entities = tokens_to_spans(&tagged, text);

        debug!(
            tokens = tagged.len(),
            entities = entities.len(),
            alternatives = alternatives.len(),
            "text tagged"
        );
        Ok(TaggingResult {
            tokens: tagged,
            entities,
            alternatives,
        })
    }

    /// Decodifica tokens já segmentados, com dados auxiliares opcionais,
    /// devolvendo até `n` sequências.
    pub fn tag_tokens<S>(&self, tokens: &[S], aux: Option<&[String]>, n: usize) -> Result<Vec<Sequence>>
    where
        S: AsRef<str> + Sync,
    {
        self.search
            .decode_top(n, tokens, aux, &self.generator, Some(&BioValidator))
    }
}
