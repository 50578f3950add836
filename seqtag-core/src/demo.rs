//! # Modelo de Demonstração PT-BR
//!
//! Um [`MaxEntModel`] com pesos heurísticos para NER em português, suficiente
//! para rodar o fluxo completo (tokenização → beam search → entidades) sem
//! nenhum treinamento.
//!
//! ## Como os pesos foram escolhidos
//!
//! Os pesos codificam intuições linguísticas, não estatísticas de corpus:
//! - presença num gazetteer é o sinal mais forte (+5.0);
//! - capitalização sozinha é um indício fraco (+1.0), menor que o viés de `O`;
//! - palavras-gatilho antes do token ("presidente", "cidade", "banco")
//!   empurram para a categoria correspondente;
//! - o histórico (`prev_tag=B-X,cap`) favorece continuar uma entidade já aberta.

use crate::config::BeamSearchConfig;
use crate::error::Result;
use crate::features::{Gazetteer, TokenContextGenerator};
use crate::maxent::MaxEntModel;
use crate::tagger::SequenceTagger;

/// Categorias reconhecidas pelo modelo de demonstração.
pub const CATEGORIES: [&str; 4] = ["PER", "ORG", "LOC", "MISC"];

/// Rótulos BIO na ordem dos índices do modelo.
pub fn outcomes() -> Vec<String> {
    let mut labels = vec!["O".to_string()];
    for category in CATEGORIES {
        labels.push(format!("B-{category}"));
        labels.push(format!("I-{category}"));
    }
    labels
}

/// Gazetteer com entidades brasileiras conhecidas.
pub fn gazetteer() -> Gazetteer {
    let mut gazetteer = Gazetteer::new();
    gazetteer.extend(
        "PER",
        [
            "lula", "dilma", "bolsonaro", "pelé", "neymar", "tiradentes", "drummond", "anitta",
            "marielle", "ayrton", "senna", "machado", "assis",
        ],
    );
    gazetteer.extend(
        "LOC",
        [
            "brasil", "brasília", "são", "paulo", "rio", "janeiro", "bahia", "salvador", "recife",
            "minas", "gerais", "amazônia", "curitiba", "manaus", "fortaleza", "portugal",
        ],
    );
    gazetteer.extend(
        "ORG",
        [
            "petrobras", "embraer", "fifa", "stf", "flamengo", "corinthians", "itaú", "bradesco",
            "ibge", "unicamp", "usp", "senado",
        ],
    );
    gazetteer.extend("MISC", ["covid-19", "carnaval", "copa", "olimpíadas", "pib"]);
    gazetteer
}

/// Constrói o modelo MaxEnt com pesos heurísticos.
pub fn model() -> Result<MaxEntModel> {
    let mut model = MaxEntModel::new(outcomes())?;

    // --- Viés e palavras funcionais ---
    model.set_weight("bias", "O", 3.0)?;
    model.set_weight("punct", "O", 4.0)?;
    model.set_weight("num", "O", 1.0)?;
    for word in ["o", "a", "os", "as", "de", "da", "do", "e", "em", "no", "na", "um", "uma"] {
        model.set_weight(format!("w={word}"), "O", 3.0)?;
    }

    // --- Capitalização e gazetteers ---
    for category in CATEGORIES {
        let begin = format!("B-{category}");
        let inside = format!("I-{category}");
        model.set_weight("cap", &begin, 1.0)?;
        model.set_weight(format!("gaz={category}"), &begin, 5.0)?;
        model.set_weight(format!("gaz={category}"), &inside, 4.5)?;
        // Continuação de uma entidade aberta
        model.set_weight(format!("prev_tag={begin},cap"), &inside, 3.5)?;
        model.set_weight(format!("prev_tag={inside},cap"), &inside, 3.0)?;
    }

    // Siglas: ORG ou MISC
    model.set_weight("allcaps", "B-ORG", 1.5)?;
    model.set_weight("allcaps", "B-MISC", 1.0)?;

    // --- Palavras-gatilho ---
    for (trigger, weight) in [
        ("presidente", 2.5),
        ("governador", 2.5),
        ("deputado", 2.0),
        ("senador", 2.0),
        ("ministro", 2.0),
        ("ministra", 2.0),
        ("jogador", 1.8),
        ("dr.", 1.8),
        ("prof.", 1.8),
        ("escritor", 1.5),
        ("cantora", 1.5),
    ] {
        model.set_weight(format!("prev_w={trigger}"), "B-PER", weight)?;
    }
    for (trigger, weight) in [
        ("ministério", 2.5),
        ("instituto", 2.0),
        ("tribunal", 2.0),
        ("empresa", 1.5),
        ("clube", 2.0),
        ("banco", 2.0),
        ("universidade", 2.0),
    ] {
        model.set_weight(format!("prev_w={trigger}"), "B-ORG", weight)?;
    }
    for (trigger, weight) in [
        ("cidade", 1.8),
        ("estado", 1.8),
        ("região", 1.5),
        ("capital", 1.5),
        ("para", 0.8),
    ] {
        model.set_weight(format!("prev_w={trigger}"), "B-LOC", weight)?;
    }

    // --- Morfologia ---
    model.set_weight("suf3=ras", "B-ORG", 1.8)?;
    model.set_weight("suf4=bank", "B-ORG", 2.0)?;
    model.set_weight("suf3=nho", "B-PER", 1.0)?;
    model.set_weight("suf3=nha", "B-PER", 1.0)?;

    Ok(model)
}

/// Tagger pronto para uso com o modelo e o gazetteer de demonstração.
pub fn tagger(config: BeamSearchConfig) -> Result<SequenceTagger<MaxEntModel>> {
    SequenceTagger::with_generator(
        model()?,
        config,
        TokenContextGenerator::with_gazetteer(gazetteer()),
    )
}
