//! Configuração do servidor: JSON opcional apontado por `SEQTAG_CONFIG`.

use std::path::Path;

use anyhow::Context;
use seqtag_core::BeamSearchConfig;
use serde::{Deserialize, Serialize};

pub const CONFIG_ENV: &str = "SEQTAG_CONFIG";
pub const DEFAULT_BIND: &str = "0.0.0.0:3000";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Endereço de escuta (ex: "127.0.0.1:8080")
    pub bind: String,
    /// Parâmetros do beam search usados pelo tagger
    pub beam: BeamSearchConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: DEFAULT_BIND.to_string(),
            beam: BeamSearchConfig::default(),
        }
    }
}

impl ServerConfig {
    /// Lê o arquivo indicado em `SEQTAG_CONFIG`, ou usa os padrões se a
    /// variável não estiver definida.
    pub fn from_env() -> anyhow::Result<Self> {
        match std::env::var_os(CONFIG_ENV) {
            Some(path) => Self::load(Path::new(&path)),
            None => Ok(Self::default()),
        }
    }

    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("reading config file {}", path.display()))?;
        Self::parse(&raw).with_context(|| format!("parsing config file {}", path.display()))
    }

    pub fn parse(raw: &str) -> anyhow::Result<Self> {
        let config: ServerConfig = serde_json::from_str(raw)?;
        config.beam.validate()?;
        Ok(config)
    }
}
