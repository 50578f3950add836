//! # Beam: seleção top-K limitada
//!
//! A cada posição o pool de candidatos pode ter até `K × |vocabulário|`
//! entradas, mas só os K melhores sobrevivem. Em vez de ordenar o pool
//! inteiro, o [`Beam`] mantém um heap de capacidade fixa cuja raiz é o **pior**
//! sobrevivente: um candidato novo só entra se vencer essa raiz.
//!
//! ## Desempate
//!
//! Scores iguais são decididos pela ordem de chegada: o primeiro candidato
//! oferecido fica com a vaga. Como o motor oferece os candidatos numa ordem
//! determinística (pais na ordem do beam, outcomes na ordem dos índices), o
//! resultado também é determinístico.

use std::cmp::Ordering;
use std::collections::BinaryHeap;

/// Conjunto limitado aos `capacity` itens de maior score.
#[derive(Debug)]
pub struct Beam<T> {
    capacity: usize,
    heap: BinaryHeap<Ranked<T>>,
    offered: u64,
}

#[derive(Debug)]
struct Ranked<T> {
    score: f64,
    arrival: u64,
    item: T,
}

impl<T> Ranked<T> {
    /// `Greater` significa "pior": menor score ou, empatado, chegou depois.
    fn worse_cmp(&self, other: &Self) -> Ordering {
        other
            .score
            .total_cmp(&self.score)
            .then(self.arrival.cmp(&other.arrival))
    }
}

impl<T> PartialEq for Ranked<T> {
    fn eq(&self, other: &Self) -> bool {
        self.worse_cmp(other) == Ordering::Equal
    }
}

impl<T> Eq for Ranked<T> {}

impl<T> PartialOrd for Ranked<T> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<T> Ord for Ranked<T> {
    fn cmp(&self, other: &Self) -> Ordering {
        self.worse_cmp(other)
    }
}

impl<T> Beam<T> {
    /// Cria um beam vazio. `capacity` deve ser ≥ 1.
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            heap: BinaryHeap::with_capacity(capacity + 1),
            offered: 0,
        }
    }

    /// Oferece um candidato. Devolve `true` se ele ocupou uma vaga.
    pub fn offer(&mut self, score: f64, item: T) -> bool {
        if !self.would_accept(score) {
            self.offered += 1;
            return false;
        }
        let ranked = Ranked {
            score,
            arrival: self.offered,
            item,
        };
        self.offered += 1;
        self.heap.push(ranked);
        if self.heap.len() > self.capacity {
            self.heap.pop();
        }
        true
    }

    /// Um candidato com este score entraria agora? Empates perdem para quem
    /// já está no beam.
    pub fn would_accept(&self, score: f64) -> bool {
        if self.capacity == 0 {
            return false;
        }
        if self.heap.len() < self.capacity {
            return true;
        }
        self.heap
            .peek()
            .map_or(true, |worst| score.total_cmp(&worst.score) == Ordering::Greater)
    }

    /// Score do pior sobrevivente, se houver algum.
    pub fn min_score(&self) -> Option<f64> {
        self.heap.peek().map(|worst| worst.score)
    }

    pub fn len(&self) -> usize {
        self.heap.len()
    }

    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Quantos candidatos foram oferecidos no total (aceitos ou não).
    pub fn offered(&self) -> u64 {
        self.offered
    }

    /// Consome o beam e devolve `(score, item)` do melhor para o pior.
    pub fn into_sorted(self) -> Vec<(f64, T)> {
        self.heap
            .into_sorted_vec()
            .into_iter()
            .map(|ranked| (ranked.score, ranked.item))
            .collect()
    }
}
