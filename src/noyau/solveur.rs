// src/noyau/solveur.rs
//
// Pipeline complet d’une évaluation
// ---------------------------------
// texte saisi
//   -> localisation (optionnelle)
//   -> opérateurs finaux retirés ("2+" = saisie en cours, pas une erreur)
//   -> matrice ? moteur matriciel : base active -> décimal -> évaluateur complexe
//   -> précision adaptée à la ligne, retour dans la base active
//   -> composition "R+Ni" puis relocalisation
//
// La base active est un état de session : elle ne change que par `changer_base`.

use tracing::{debug, trace};

use super::base::{convertir, Base};
use super::erreur::ErreurCalcul;
use super::format::{composer_complexe, precision_adaptative};
use super::historique::PuitsHistorique;
use super::localisation::Localisateur;
use super::matrice;
use super::reglages::{Reglages, DIVISE, FOIS, MOINS};
use super::symboles::{EvaluateurScalaire, Symboles};

/// Résultat d’une évaluation, avec l’expression normalisée (pour l’historique).
///
/// `Ok(None)` : rien à afficher (texte vide ou nombre seul), ce n’est pas une erreur.
#[derive(Clone, Debug, PartialEq)]
pub struct Evaluation {
    pub expression: String,
    pub resultat: Result<Option<String>, ErreurCalcul>,
}

fn est_operateur_final(c: char) -> bool {
    matches!(c, '+' | '-' | '*' | '/' | '^' | MOINS | FOIS | DIVISE)
}

pub struct Solveur<E: EvaluateurScalaire = Symboles> {
    symboles: E,
    base: Base,
    reglages: Reglages,
    localisateur: Option<Box<dyn Localisateur>>,
}

impl Default for Solveur<Symboles> {
    fn default() -> Self {
        Self::new(Reglages::default())
    }
}

impl Solveur<Symboles> {
    pub fn new(reglages: Reglages) -> Self {
        Self::avec_evaluateur(Symboles::new(reglages.clone()), reglages)
    }
}

impl<E: EvaluateurScalaire> Solveur<E> {
    pub fn avec_evaluateur(symboles: E, reglages: Reglages) -> Self {
        Self {
            symboles,
            base: Base::default(),
            reglages,
            localisateur: None,
        }
    }

    pub fn base(&self) -> Base {
        self.base
    }

    pub fn reglages(&self) -> &Reglages {
        &self.reglages
    }

    pub fn evaluateur(&self) -> &E {
        &self.symboles
    }

    pub fn set_longueur_ligne(&mut self, longueur: usize) {
        self.reglages.set_longueur_ligne(longueur);
    }

    pub fn activer_localisation(&mut self, localisateur: impl Localisateur + 'static) {
        self.localisateur = Some(Box::new(localisateur));
    }

    /// Ré-exprime `texte` dans `nouvelle` base puis change la base active.
    /// En cas d’échec la base reste inchangée.
    pub fn changer_base(&mut self, texte: &str, nouvelle: Base) -> Result<String, ErreurCalcul> {
        let converti = convertir(texte, self.base, nouvelle, &self.reglages)?;
        debug!(de = self.base.nom(), vers = nouvelle.nom(), "changement de base");
        self.base = nouvelle;
        Ok(converti)
    }

    pub fn convertir_en_decimal(&self, texte: &str) -> Result<String, ErreurCalcul> {
        convertir(texte, self.base, Base::Decimale, &self.reglages)
    }

    pub fn contient_matrice(&self, texte: &str) -> bool {
        matrice::contient_matrice(texte, &self.reglages)
    }

    /// Point d’entrée de l’UI : ne panique jamais, toute erreur est typée.
    pub fn evaluer(&self, texte: &str) -> Evaluation {
        let expression = self.normaliser(texte);
        if expression.trim().is_empty() || self.est_nombre_seul(&expression) {
            return Evaluation {
                expression,
                resultat: Ok(None),
            };
        }

        let resultat = self.resoudre_normalise(&expression).map(Some);
        if let Err(e) = &resultat {
            debug!(%expression, erreur = %e, "évaluation refusée");
        }
        Evaluation {
            expression,
            resultat,
        }
    }

    /// Comme `evaluer`, et transmet les succès non vides au puits d’historique.
    pub fn evaluer_et_consigner(&self, texte: &str, puits: &mut dyn PuitsHistorique) -> Evaluation {
        let evaluation = self.evaluer(texte);
        if let Ok(Some(resultat)) = &evaluation.resultat {
            puits.consigner(&evaluation.expression, resultat);
        }
        evaluation
    }

    fn normaliser(&self, texte: &str) -> String {
        let mut s = match &self.localisateur {
            Some(l) => l.localiser(texte),
            None => texte.to_string(),
        };
        loop {
            let fin = s.trim_end().len();
            s.truncate(fin);
            match s.chars().last() {
                Some(c) if est_operateur_final(c) => {
                    s.pop();
                }
                _ => return s,
            }
        }
    }

    /// "12", "-3", "1,234.5" (dans la base active) : rien à calculer.
    fn est_nombre_seul(&self, expression: &str) -> bool {
        let corps = expression
            .strip_prefix(['-', MOINS])
            .unwrap_or(expression);
        let sep = self.base.separateur(&self.reglages);
        corps.chars().any(|c| self.base.est_chiffre(c))
            && corps
                .chars()
                .all(|c| self.base.est_chiffre(c) || c == self.reglages.point_decimal || c == sep)
    }

    fn resoudre_normalise(&self, expression: &str) -> Result<String, ErreurCalcul> {
        if self.contient_matrice(expression) {
            debug!(%expression, base = self.base.nom(), "voie matricielle");
            let resultat = matrice::evaluer_matrices(expression, self.base, &self.reglages)?;
            return Ok(self.relocaliser(resultat));
        }

        let decimal = self.convertir_en_decimal(expression)?;
        let valeur = self.symboles.eval_complexe(&decimal)?;
        trace!(%decimal, re = valeur.re, im = valeur.im, "valeur complexe");

        let reel = precision_adaptative(valeur.re, &self.reglages)?;
        let imaginaire = precision_adaptative(valeur.im, &self.reglages)?;
        let reel = convertir(&reel, Base::Decimale, self.base, &self.reglages)?;
        let imaginaire = convertir(&imaginaire, Base::Decimale, self.base, &self.reglages)?;

        let compose = composer_complexe(valeur.re, valeur.im, &reel, &imaginaire);
        Ok(self.relocaliser(compose))
    }

    fn relocaliser(&self, texte: String) -> String {
        match &self.localisateur {
            Some(l) => l.relocaliser(&texte),
            None => texte,
        }
    }
}
