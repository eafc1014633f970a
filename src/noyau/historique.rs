// src/noyau/historique.rs
//
// Historique en mémoire des calculs réussis (pas de persistance).

use std::collections::VecDeque;

/// Reçoit les paires (expression normalisée, résultat formaté).
pub trait PuitsHistorique {
    fn consigner(&mut self, expression: &str, resultat: &str);
}

pub const ENTREES_MAX: usize = 100;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EntreeHistorique {
    pub expression: String,
    pub resultat: String,
}

#[derive(Clone, Debug, Default)]
pub struct Historique {
    entrees: VecDeque<EntreeHistorique>,
    /// Position de navigation ; `entrees.len()` = ligne d’édition (après la dernière entrée).
    position: usize,
}

impl Historique {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entrees(&self) -> impl Iterator<Item = &EntreeHistorique> {
        self.entrees.iter()
    }

    pub fn len(&self) -> usize {
        self.entrees.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entrees.is_empty()
    }

    pub fn effacer(&mut self) {
        self.entrees.clear();
        self.position = 0;
    }

    /// Entrée sous le curseur de navigation (None sur la ligne d’édition).
    pub fn courante(&self) -> Option<&EntreeHistorique> {
        self.entrees.get(self.position)
    }

    pub fn precedente(&mut self) -> Option<&EntreeHistorique> {
        if self.position == 0 {
            return None;
        }
        self.position -= 1;
        self.entrees.get(self.position)
    }

    pub fn suivante(&mut self) -> Option<&EntreeHistorique> {
        if self.position >= self.entrees.len() {
            return None;
        }
        self.position += 1;
        self.entrees.get(self.position)
    }
}

impl PuitsHistorique for Historique {
    /// Formule vide ignorée ; même formule que la dernière : pas de doublon.
    /// Au-delà de 100 entrées, la plus ancienne est retirée.
    fn consigner(&mut self, expression: &str, resultat: &str) {
        let doublon = self.entrees.back().is_some_and(|e| e.expression == expression);
        if !expression.is_empty() && !doublon {
            if self.entrees.len() >= ENTREES_MAX {
                self.entrees.pop_front();
            }
            self.entrees.push_back(EntreeHistorique {
                expression: expression.to_string(),
                resultat: resultat.to_string(),
            });
        }
        self.position = self.entrees.len();
    }
}
