//! # Engenharia de Features para Tagging
//!
//! Para cada posição visitada pelo beam search, o [`TokenContextGenerator`]
//! produz a lista de features binárias que o modelo avalia. As features
//! capturam informações ortográficas, lexicais, contextuais e, diferente de um
//! extrator estático, também o **histórico de tags** já escolhido pelo ramo do
//! beam.
//!
//! ## Features Implementadas
//!
//! ### Token atual
//! - `bias`, `w=<minúsculas>`
//! - Capitalização: `cap`, `allcaps`, `mixed`
//! - Forma: `num` (número, inclusive `1.000,50` e `12%`), `digit`, `hyphen`, `punct`
//! - Prefixos e sufixos de 2 a 4 caracteres: `pre3=pet`, `suf3=ras`
//!
//! ### Janela de contexto (2 tokens para cada lado)
//! - `prev_w=`, `prev2_w=`, `next_w=`, `next2_w=`, `prev_cap`, `next_cap`
//! - `BOS` / `EOS` nas bordas da sentença
//!
//! ### Histórico de outcomes
//! - `prev_tag=<tag>` (`^` no início), `prev_tags=<t-2>,<t-1>`
//! - `prev_tag=<tag>,cap`: conjunção tag anterior + capitalização
//!
//! ### Dados auxiliares e gazetteer
//! - `aux=<valor>` e `prev_aux=`/`next_aux=` quando há dados por token
//!   (ex.: tags POS para um chunker)
//! - `gaz=<CATEGORIA>` para cada lista do [`Gazetteer`] que contém a palavra
//!
//! A ordem das features é determinística e não há repetições.

use std::collections::{BTreeMap, HashSet};
use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::context::ContextGenerator;
use crate::error::BoxError;

/// Marcador de "antes do início" usado nas features de histórico.
pub const START_TAG: &str = "^";

/// Inteiros, decimais com `.` ou `,`, milhares e percentuais ("1.000,50", "12%").
const NUMBER_PATTERN: &str = r"^[+-]?\d+([.,]\d+)*%?$";

fn is_number(word: &str) -> bool {
    static NUMBER: OnceLock<Regex> = OnceLock::new();
    NUMBER
        .get_or_init(|| Regex::new(NUMBER_PATTERN).expect("NUMBER_PATTERN is a valid regex"))
        .is_match(word)
}

/// Listas de palavras conhecidas por categoria (ex.: "PER" → {"lula", ...}).
///
/// As palavras são guardadas em minúsculas; a busca ignora caixa.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Gazetteer {
    categories: BTreeMap<String, HashSet<String>>,
}

impl Gazetteer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, category: &str, word: &str) {
        self.categories
            .entry(category.to_string())
            .or_default()
            .insert(word.to_lowercase());
    }

    /// Adiciona várias palavras a uma categoria.
    pub fn extend<'a>(&mut self, category: &str, words: impl IntoIterator<Item = &'a str>) {
        for word in words {
            self.insert(category, word);
        }
    }

    /// Categorias que contêm `word`, em ordem alfabética.
    pub fn categories_of<'a>(&'a self, word: &'a str) -> impl Iterator<Item = &'a str> + 'a {
        let lower = word.to_lowercase();
        self.categories
            .iter()
            .filter(move |(_, words)| words.contains(&lower))
            .map(|(category, _)| category.as_str())
    }

    pub fn len(&self) -> usize {
        self.categories.values().map(HashSet::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.categories.values().all(HashSet::is_empty)
    }
}

/// Acumula features preservando a ordem de inserção e descartando repetidas.
struct FeatureSet {
    features: Vec<String>,
    seen: HashSet<String>,
}

impl FeatureSet {
    fn with_capacity(capacity: usize) -> Self {
        Self {
            features: Vec::with_capacity(capacity),
            seen: HashSet::with_capacity(capacity),
        }
    }

    fn insert(&mut self, feature: impl Into<String>) {
        let feature = feature.into();
        if self.seen.insert(feature.clone()) {
            self.features.push(feature);
        }
    }

    fn into_vec(self) -> Vec<String> {
        self.features
    }
}

fn is_capitalized(word: &str) -> bool {
    word.chars().next().is_some_and(char::is_uppercase)
}

/// Gerador de contexto para tagging de tokens textuais.
///
/// Tokens podem ser qualquer `AsRef<str>` (`String`, `&str`); os dados
/// auxiliares, quando presentes, são uma `String` por token.
#[derive(Debug, Clone, Default)]
pub struct TokenContextGenerator {
    gazetteer: Gazetteer,
}

impl TokenContextGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_gazetteer(gazetteer: Gazetteer) -> Self {
        Self { gazetteer }
    }

    pub fn gazetteer(&self) -> &Gazetteer {
        &self.gazetteer
    }

    fn word_features(features: &mut FeatureSet, word: &str) {
        let lower = word.to_lowercase();
        features.insert(format!("w={lower}"));

        if is_capitalized(word) {
            features.insert("cap");
        }
        let alphabetic = word.chars().filter(|c| c.is_alphabetic()).count();
        if alphabetic > 1 && word.chars().all(|c| c.is_uppercase() || !c.is_alphabetic()) {
            features.insert("allcaps");
        }
        if word.chars().skip(1).any(char::is_uppercase) {
            features.insert("mixed");
        }

        if is_number(word) {
            features.insert("num");
        } else if word.chars().any(|c| c.is_ascii_digit()) {
            features.insert("digit");
        }
        if word.contains('-') {
            features.insert("hyphen");
        }
        if !word.is_empty() && word.chars().all(|c| !c.is_alphanumeric()) {
            features.insert("punct");
        }

        let chars: Vec<char> = lower.chars().collect();
        for n in 2..=4 {
            if chars.len() >= n {
                let prefix: String = chars[..n].iter().collect();
                let suffix: String = chars[chars.len() - n..].iter().collect();
                features.insert(format!("pre{n}={prefix}"));
                features.insert(format!("suf{n}={suffix}"));
            }
        }
    }
}

impl<S> ContextGenerator<S, String> for TokenContextGenerator
where
    S: AsRef<str> + Sync,
{
    fn context(
        &self,
        position: usize,
        tokens: &[S],
        prior: &[&str],
        aux: Option<&[String]>,
    ) -> Result<Vec<String>, BoxError> {
        if position >= tokens.len() {
            return Err(format!("position {position} out of range for {} tokens", tokens.len()).into());
        }
        if let Some(aux) = aux {
            if aux.len() != tokens.len() {
                return Err(format!(
                    "aux data has {} entries for {} tokens",
                    aux.len(),
                    tokens.len()
                )
                .into());
            }
        }

        let word = tokens[position].as_ref();
        let mut features = FeatureSet::with_capacity(32);
        features.insert("bias");
        Self::word_features(&mut features, word);

        // === Janela de contexto ===
        if position > 0 {
            let prev = tokens[position - 1].as_ref();
            features.insert(format!("prev_w={}", prev.to_lowercase()));
            if is_capitalized(prev) {
                features.insert("prev_cap");
            }
        } else {
            features.insert("BOS");
        }
        if position > 1 {
            features.insert(format!("prev2_w={}", tokens[position - 2].as_ref().to_lowercase()));
        }
        if let Some(next) = tokens.get(position + 1) {
            let next = next.as_ref();
            features.insert(format!("next_w={}", next.to_lowercase()));
            if is_capitalized(next) {
                features.insert("next_cap");
            }
        } else {
            features.insert("EOS");
        }
        if let Some(next2) = tokens.get(position + 2) {
            features.insert(format!("next2_w={}", next2.as_ref().to_lowercase()));
        }

        // === Histórico de outcomes ===
        let prev_tag = prior.last().copied().unwrap_or(START_TAG);
        let prev2_tag = prior
            .len()
            .checked_sub(2)
            .map_or(START_TAG, |i| prior[i]);
        features.insert(format!("prev_tag={prev_tag}"));
        features.insert(format!("prev_tags={prev2_tag},{prev_tag}"));
        if is_capitalized(word) {
            features.insert(format!("prev_tag={prev_tag},cap"));
        }

        // === Dados auxiliares ===
        if let Some(aux) = aux {
            features.insert(format!("aux={}", aux[position]));
            if position > 0 {
                features.insert(format!("prev_aux={}", aux[position - 1]));
            }
            if let Some(next) = aux.get(position + 1) {
                features.insert(format!("next_aux={next}"));
            }
        }

        // === Gazetteer ===
        for category in self.gazetteer.categories_of(word) {
            features.insert(format!("gaz={category}"));
        }

        Ok(features.into_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tokenizer::{token_texts, tokenize};

    fn context_of(
        generator: &TokenContextGenerator,
        text: &str,
        position: usize,
        prior: &[&str],
    ) -> Vec<String> {
        let tokens = token_texts(&tokenize(text));
        generator.context(position, tokens.as_slice(), prior, None).unwrap()
    }

    fn has(features: &[String], feature: &str) -> bool {
        features.iter().any(|f| f == feature)
    }

    #[test]
    fn test_capitalization_feature() {
        let generator = TokenContextGenerator::new();
        let lula = context_of(&generator, "Lula é presidente", 0, &[]);
        let e = context_of(&generator, "Lula é presidente", 1, &["B-PER"]);

        assert!(has(&lula, "cap"));
        assert!(!has(&e, "cap"));
        assert!(has(&e, "prev_cap"));
    }

    #[test]
    fn test_prefix_suffix_features() {
        let features = context_of(&TokenContextGenerator::new(), "Petrobras", 0, &[]);
        assert!(has(&features, "pre2=pe"));
        assert!(has(&features, "suf3=ras"));
        assert!(has(&features, "BOS"));
        assert!(has(&features, "EOS"));
    }

    #[test]
    fn test_context_window() {
        let features = context_of(
            &TokenContextGenerator::new(),
            "o presidente Lula anunciou hoje",
            2,
            &["O", "O"],
        );
        assert!(has(&features, "prev_w=presidente"));
        assert!(has(&features, "prev2_w=o"));
        assert!(has(&features, "next_w=anunciou"));
        assert!(has(&features, "next2_w=hoje"));
    }

    #[test]
    fn test_history_features() {
        let generator = TokenContextGenerator::new();
        let first = context_of(&generator, "São Paulo cresce", 0, &[]);
        assert!(has(&first, "prev_tag=^"));
        assert!(has(&first, "prev_tags=^,^"));

        let second = context_of(&generator, "São Paulo cresce", 1, &["B-LOC"]);
        assert!(has(&second, "prev_tag=B-LOC"));
        assert!(has(&second, "prev_tags=^,B-LOC"));
        assert!(has(&second, "prev_tag=B-LOC,cap"));

        let third = context_of(&generator, "São Paulo cresce", 2, &["B-LOC", "I-LOC"]);
        assert!(has(&third, "prev_tags=B-LOC,I-LOC"));
    }

    #[test]
    fn test_shape_features() {
        let generator = TokenContextGenerator::new();
        let tokens = ["1.000,50", "12%", "COVID-19", "ONU", ","];
        let ctx = |i| generator.context(i, &tokens, &[], None).unwrap();

        assert!(has(&ctx(0), "num"));
        assert!(has(&ctx(1), "num"));
        assert!(has(&ctx(2), "digit"));
        assert!(has(&ctx(2), "hyphen"));
        assert!(has(&ctx(3), "allcaps"));
        assert!(has(&ctx(4), "punct"));
        assert!(!has(&ctx(4), "allcaps"));
    }

    #[test]
    fn test_number_pattern() {
        assert!(Regex::new(NUMBER_PATTERN).is_ok());
        for word in ["42", "-3", "+7", "3,14", "1.000,50", "12%"] {
            assert!(is_number(word), "{word}");
        }
        for word in ["COVID-19", "1a", "12%%", ",5", "abc", ""] {
            assert!(!is_number(word), "{word}");
        }
    }

    #[test]
    fn test_gazetteer_feature() {
        let mut gazetteer = Gazetteer::new();
        gazetteer.insert("LOC", "Brasília");
        gazetteer.extend("PER", ["lula", "dilma"]);
        assert_eq!(gazetteer.len(), 3);

        let generator = TokenContextGenerator::with_gazetteer(gazetteer);
        let features = context_of(&generator, "Brasília é bonita", 0, &[]);
        assert!(has(&features, "gaz=LOC"));
        assert!(!has(&features, "gaz=PER"));
    }

    #[test]
    fn test_aux_features() {
        let generator = TokenContextGenerator::new();
        let tokens = ["o", "gato", "dorme"];
        let pos = vec!["DET".to_string(), "NOUN".to_string(), "VERB".to_string()];
        let features = generator.context(1, &tokens, &["B-NP"], Some(pos.as_slice())).unwrap();

        assert!(has(&features, "aux=NOUN"));
        assert!(has(&features, "prev_aux=DET"));
        assert!(has(&features, "next_aux=VERB"));

        let short = vec!["DET".to_string()];
        assert!(generator.context(0, &tokens, &[], Some(short.as_slice())).is_err());
    }

    #[test]
    fn test_deterministic_without_duplicates() {
        let generator = TokenContextGenerator::new();
        let tokens = ["aa", "aa", "aa"];
        let a = generator.context(1, &tokens, &["O"], None).unwrap();
        let b = generator.context(1, &tokens, &["O"], None).unwrap();
        assert_eq!(a, b);

        let unique: HashSet<&String> = a.iter().collect();
        assert_eq!(unique.len(), a.len());
    }

    #[test]
    fn test_out_of_range_position() {
        let generator = TokenContextGenerator::new();
        let tokens: [&str; 1] = ["a"];
        assert!(generator.context(3, &tokens, &[], None).is_err());
    }
}
