//! # Tokenizador
//!
//! Divide o texto bruto em tokens (palavras, números, pontuação) seguindo as
//! fronteiras de palavra do Unicode (UAX #29). Cada token guarda o offset de
//! bytes no texto original, o que permite reconstruir spans de entidades sem
//! alterar a formatação.
//!
//! ```rust
//! use seqtag_core::tokenizer::tokenize;
//!
//! let tokens = tokenize("O Dr. Silva chegou.");
//! let texts: Vec<&str> = tokens.iter().map(|t| t.text.as_str()).collect();
//! assert_eq!(texts, ["O", "Dr.", "Silva", "chegou", "."]);
//! ```

use serde::{Deserialize, Serialize};
use unicode_segmentation::UnicodeSegmentation;

/// Um token extraído do texto original.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Token {
    /// O texto do token (ex: "Lula", ",", "presidente").
    pub text: String,
    /// Índice de byte inicial no texto original (inclusive).
    pub start: usize,
    /// Índice de byte final no texto original (exclusivo).
    pub end: usize,
    /// Índice sequencial do token na lista (0, 1, 2...).
    pub index: usize,
}

/// Abreviações que mantêm o ponto final colado ao token.
const ABBREVIATIONS: &[&str] = &[
    "Dr", "Dra", "Sr", "Sra", "Prof", "Profa", "Gov", "Dep", "Sen", "Min", "Gen", "Cap",
    "Av", "etc", "Mr", "Mrs", "Ms", "St", "Inc", "Ltd", "Co",
];

/// Tokeniza um texto descartando espaços em branco.
pub fn tokenize(text: &str) -> Vec<Token> {
    let mut tokens: Vec<Token> = Vec::new();

    for (start, segment) in text.split_word_bound_indices() {
        if segment.trim().is_empty() {
            continue;
        }

        // "Dr" + "." → "Dr." quando os dois segmentos são adjacentes
        if segment == "." {
            if let Some(last) = tokens.last_mut() {
                if last.end == start && ABBREVIATIONS.contains(&last.text.as_str()) {
                    last.text.push('.');
                    last.end = start + 1;
                    continue;
                }
            }
        }

        tokens.push(Token {
            text: segment.to_string(),
            start,
            end: start + segment.len(),
            index: tokens.len(),
        });
    }

    tokens
}

/// Atalho para obter apenas os textos dos tokens.
pub fn token_texts(tokens: &[Token]) -> Vec<String> {
    tokens.iter().map(|t| t.text.clone()).collect()
}
