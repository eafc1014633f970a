//! Erreurs du noyau.
//!
//! Toutes les erreurs sont récupérables : le solveur les retourne typées,
//! l’UI affiche un état d’erreur en ligne, rien ne panique.

use std::fmt;

use thiserror::Error;

/// Dimensions d’une matrice (lignes, colonnes).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Forme {
    pub lignes: usize,
    pub colonnes: usize,
}

impl Forme {
    pub const fn new(lignes: usize, colonnes: usize) -> Self {
        Self { lignes, colonnes }
    }
}

impl fmt::Display for Forme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.lignes, self.colonnes)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum ErreurCalcul {
    /// Expression mal formée, parenthèses irréparables, NaN produit par une fonction…
    #[error("erreur de syntaxe: {0}")]
    Syntaxe(String),

    /// Opérandes matriciels non conformables.
    #[error("formes incompatibles: {gauche} et {droite}")]
    FormesIncompatibles { gauche: Forme, droite: Forme },

    /// Déterminant / fonction spectrale sur une matrice non carrée.
    #[error("matrice non carrée: {0}")]
    NonCarree(Forme),

    /// Nombre trop grand pour 64 bits lors d’un changement de base.
    #[error("dépassement de capacité: {0}")]
    Depassement(String),
}

impl ErreurCalcul {
    pub fn syntaxe(msg: impl Into<String>) -> Self {
        Self::Syntaxe(msg.into())
    }
}
