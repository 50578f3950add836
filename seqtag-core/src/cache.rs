//! # Cache de Avaliações do Modelo
//!
//! Ramos diferentes do beam frequentemente produzem o **mesmo contexto** (por
//! exemplo, quando as features só olham para a última tag). Como a saída do
//! modelo é função pura do contexto, a lista de features é a chave exata: ela
//! já incorpora posição, histórico e dados auxiliares na medida em que
//! influenciam o modelo.
//!
//! Política de despejo: LRU (menos recentemente usado). Capacidade 0 desliga o
//! cache; ligar ou desligar nunca muda o resultado da decodificação, só o custo.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use serde::{Deserialize, Serialize};

/// Estatísticas de uso do cache.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    pub len: usize,
    pub capacity: usize,
}

#[derive(Debug)]
struct CacheEntry {
    probs: Arc<[f64]>,
    last_used: u64,
}

/// Cache LRU limitado: contexto → distribuição.
#[derive(Debug)]
pub struct EvalCache {
    capacity: usize,
    entries: HashMap<Vec<String>, CacheEntry>,
    /// `last_used` → chave. O primeiro item é sempre o menos recente.
    recency: BTreeMap<u64, Vec<String>>,
    clock: u64,
    hits: u64,
    misses: u64,
}

impl EvalCache {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            entries: HashMap::with_capacity(capacity),
            recency: BTreeMap::new(),
            clock: 0,
            hits: 0,
            misses: 0,
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.capacity > 0
    }

    /// Busca a distribuição de `context`, marcando-a como usada.
    pub fn get(&mut self, context: &[String]) -> Option<Arc<[f64]>> {
        if !self.is_enabled() {
            return None;
        }
        self.clock += 1;
        let now = self.clock;
        match self.entries.get_mut(context) {
            Some(entry) => {
                if let Some(key) = self.recency.remove(&entry.last_used) {
                    self.recency.insert(now, key);
                }
                entry.last_used = now;
                self.hits += 1;
                Some(Arc::clone(&entry.probs))
            }
            None => {
                self.misses += 1;
                None
            }
        }
    }

    /// Guarda a distribuição de `context`, despejando a entrada menos recente
    /// se o cache estiver cheio.
    pub fn insert(&mut self, context: Vec<String>, probs: Arc<[f64]>) {
        if !self.is_enabled() {
            return;
        }
        self.clock += 1;
        let now = self.clock;

        if let Some(entry) = self.entries.get_mut(&context) {
            if let Some(key) = self.recency.remove(&entry.last_used) {
                self.recency.insert(now, key);
            }
            entry.last_used = now;
            entry.probs = probs;
            return;
        }

        while self.entries.len() >= self.capacity {
            match self.recency.pop_first() {
                Some((_, oldest)) => {
                    self.entries.remove(&oldest);
                }
                None => break,
            }
        }

        self.recency.insert(now, context.clone());
        self.entries.insert(
            context,
            CacheEntry {
                probs,
                last_used: now,
            },
        );
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Remove todas as entradas e zera as estatísticas.
    pub fn clear(&mut self) {
        self.entries.clear();
        self.recency.clear();
        self.hits = 0;
        self.misses = 0;
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            hits: self.hits,
            misses: self.misses,
            len: self.entries.len(),
            capacity: self.capacity,
        }
    }
}
