// src/noyau/symboles.rs
//
// Évaluateur scalaire de référence (complexe) + table de variables.
// Le solveur et le tracé ne connaissent que le trait `EvaluateurScalaire`.

use std::collections::HashMap;

use num_complex::Complex64;
use tracing::trace;

use super::erreur::ErreurCalcul;
use super::fonctions::Fonction;
use super::jetons::{format_tokens, tokenize};
use super::reglages::Reglages;
use super::rpn::{eval_rpn, to_rpn};

pub trait EvaluateurScalaire {
    /// Évalue une expression décimale (constantes pi, e, i + variables définies).
    fn eval_complexe(&self, expression: &str) -> Result<Complex64, ErreurCalcul>;

    /// Lie `nom` à `valeur` pour les évaluations suivantes.
    fn definir(&mut self, nom: &str, valeur: f64) -> Result<(), ErreurCalcul>;

    /// Évaluation réelle : une partie imaginaire non nulle est une erreur.
    fn eval(&self, expression: &str) -> Result<f64, ErreurCalcul> {
        let v = self.eval_complexe(expression)?;
        if v.im != 0.0 {
            return Err(ErreurCalcul::syntaxe(format!("valeur non réelle: {v}")));
        }
        Ok(v.re)
    }
}

#[derive(Clone, Debug, Default)]
pub struct Symboles {
    reglages: Reglages,
    variables: HashMap<String, f64>,
}

impl Symboles {
    pub fn new(reglages: Reglages) -> Self {
        Self {
            reglages,
            variables: HashMap::new(),
        }
    }

    pub fn valeur(&self, nom: &str) -> Option<f64> {
        self.variables.get(nom).copied()
    }

    pub fn oublier(&mut self, nom: &str) {
        self.variables.remove(nom);
    }
}

impl EvaluateurScalaire for Symboles {
    fn eval_complexe(&self, expression: &str) -> Result<Complex64, ErreurCalcul> {
        let jetons = tokenize(expression, &self.reglages)?;
        trace!(jetons = %format_tokens(&jetons), "évaluation scalaire");
        let rpn = to_rpn(&jetons)?;
        eval_rpn(&rpn, &self.variables)
    }

    /// Une variable est une seule lettre (le découpage en jetons ne produit
    /// pas d’autre identifiant libre), hors constantes e / i.
    fn definir(&mut self, nom: &str, valeur: f64) -> Result<(), ErreurCalcul> {
        let mut lettres = nom.chars();
        let une_lettre = matches!((lettres.next(), lettres.next()), (Some(c), None) if c.is_alphabetic());
        if !une_lettre || matches!(nom, "e" | "i") || Fonction::depuis_nom(nom).is_some() {
            return Err(ErreurCalcul::syntaxe(format!("nom de variable invalide: {nom}")));
        }
        self.variables.insert(nom.to_string(), valeur);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn variable_definie_puis_utilisee() {
        let mut s = Symboles::default();
        assert!(s.definir("X", 2.0).is_ok());
        assert_eq!(s.eval("X^2+1"), Ok(5.0));
        assert_eq!(s.valeur("X"), Some(2.0));
        s.oublier("X");
        assert!(s.eval("X").is_err());
    }

    #[test]
    fn noms_refuses() {
        let mut s = Symboles::default();
        for nom in ["", "e", "i", "XY", "2", "+"] {
            assert!(s.definir(nom, 1.0).is_err(), "{nom:?} accepté");
        }
    }

    #[test]
    fn eval_reel_refuse_les_complexes() {
        let s = Symboles::default();
        assert!(s.eval("sqrt(-1)").is_err());
        assert_eq!(s.eval_complexe("sqrt(-1)"), Ok(Complex64::new(0.0, 1.0)));
    }
}
