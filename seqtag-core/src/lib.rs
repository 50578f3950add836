//! # seqtag-core — Decodificador Beam Search para Predição Estruturada
//!
//! Este crate implementa um decodificador de sequências **plugável**: dado um
//! modelo de probabilidade, um gerador de contexto e (opcionalmente) um
//! validador, encontra as sequências de rótulos mais prováveis mantendo apenas
//! as K melhores hipóteses parciais a cada posição.
//!
//! ## Arquitetura
//!
//! O motor não conhece a tarefa: ele só fala com três traits.
//!
//! 1.  **Modelo** ([`model`]): contexto → distribuição sobre um vocabulário fixo de outcomes.
//! 2.  **Gerador de contexto** ([`context`]): (posição, tokens, histórico, aux) → features.
//! 3.  **Validador** ([`validator`]): o outcome é admissível dado o histórico?
//! 4.  **Busca** ([`search`]): o [`BeamSearch`] combina os três, com [`beam`] para a
//!     seleção top-K, [`sequence`] para históricos compartilhados e [`cache`] para
//!     não reavaliar contextos repetidos.
//!
//! Para tagging de texto o crate traz implementações de referência:
//! [`maxent`] (modelo log-linear), [`features`] (gerador de features de token),
//! [`tokenizer`], [`tagger`] (fachada texto → entidades) e [`demo`] (pesos
//! heurísticos para NER em português).
//!
//! ## Exemplo de Uso
//!
//! ```rust
//! use seqtag_core::{demo, BeamSearchConfig};
//!
//! let tagger = demo::tagger(BeamSearchConfig::default()).unwrap();
//! let result = tagger.tag("O presidente Lula visitou São Paulo.").unwrap();
//!
//! for entity in &result.entities {
//!     println!("Entidade: {} ({}) - Confiança: {:.2}", entity.text, entity.category, entity.confidence);
//! }
//! assert_eq!(result.entities[0].text, "Lula");
//! ```

pub mod beam;
pub mod cache;
pub mod config;
pub mod context;
pub mod demo;
pub mod error;
pub mod features;
pub mod maxent;
pub mod model;
pub mod search;
pub mod sequence;
pub mod tagger;
pub mod tokenizer;
pub mod validator;

pub use cache::CacheStats;
pub use config::{BeamSearchConfig, ExhaustionPolicy, DEFAULT_BEAM_SIZE};
pub use context::ContextGenerator;
pub use error::{BeamError, BoxError, Result};
pub use features::{Gazetteer, TokenContextGenerator};
pub use maxent::MaxEntModel;
pub use model::ProbabilityModel;
pub use search::BeamSearch;
pub use sequence::Sequence;
pub use tagger::{EntitySpan, SequenceTagger, TaggedToken, TaggingResult};
pub use tokenizer::{tokenize, Token};
pub use validator::{AlwaysValid, BioValidator, SequenceValidator};
