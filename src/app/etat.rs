//! src/app/etat.rs
//!
//! État UI : entrée, résultat, erreur, historique, tracé.
//!
//! Rôle : contenir l’état de la calculatrice et offrir des opérations simples
//! (C/CLR/AC, navigation dans l’historique, réception des points du tracé)
//! sans logique d’affichage. Les évaluations passent par vue.rs.
//!
//! Contrats :
//! - Le solveur est le seul détenteur de la base active.
//! - Les points du tracé arrivent par canal ; seule la dernière série compte.

use std::sync::mpsc::{self, Receiver, Sender};

use crate::noyau::{Echantillonneur, Fenetre, Historique, PointTrace, Solveur};

/// Demi-largeur de la fenêtre de tracé par défaut (x et y dans [-10, 10]).
pub const ETENDUE_DEFAUT: f64 = 10.0;

/// Garde-fou : bornes de la demi-largeur (le pas suit, le nombre de points reste fixe).
pub const ETENDUE_MIN: f64 = 0.5;
pub const ETENDUE_MAX: f64 = 1000.0;

pub struct AppCalc {
    // --- entrée utilisateur ---
    pub entree: String,

    // --- sorties ---
    pub resultat: String, // résultat en direct (groupé), vide si rien à montrer
    pub erreur: String,   // message d’erreur (seulement après "=")

    // --- noyau ---
    pub solveur: Solveur,
    pub historique: Historique,

    // --- tracé ---
    pub echantillonneur: Echantillonneur,
    pub fenetre: Fenetre,
    pub points: Vec<PointTrace>,
    pub equation_tracee: String,
    pub emetteur: Sender<Vec<PointTrace>>,
    recepteur: Receiver<Vec<PointTrace>>,

    // --- UX ---
    // Permet à vue.rs de redonner le focus à l’entrée après un clic sur un bouton.
    pub focus_entree: bool,
}

impl Default for AppCalc {
    fn default() -> Self {
        let (emetteur, recepteur) = mpsc::channel();
        Self {
            entree: String::new(),
            resultat: String::new(),
            erreur: String::new(),
            solveur: Solveur::default(),
            historique: Historique::new(),
            echantillonneur: Echantillonneur::default(),
            fenetre: Fenetre::default(),
            points: Vec::new(),
            equation_tracee: String::new(),
            emetteur,
            recepteur,
            focus_entree: true, // au lancement, on veut pouvoir taper tout de suite
        }
    }
}

impl AppCalc {
    /* ------------------------ Actions “boutons” (état seulement) ------------------------ */

    /// AC : remise à zéro totale (entrée + résultats + historique + tracé).
    pub fn reset_total(&mut self) {
        self.entree.clear();
        self.clear_resultats();
        self.historique.effacer();
        self.effacer_trace();
        self.focus_entree = true;
    }

    /// C : effacer seulement l’entrée (sans toucher aux résultats).
    pub fn clear_entree(&mut self) {
        self.entree.clear();
        self.effacer_trace();
        self.focus_entree = true;
    }

    /// CLR : effacer résultat + erreur (sans toucher à l’entrée).
    pub fn clear_resultats(&mut self) {
        self.resultat.clear();
        self.erreur.clear();
        self.focus_entree = true;
    }

    /// Utilitaire : placer une erreur. Le résultat en direct devient caduc.
    pub fn set_erreur(&mut self, msg: impl Into<String>) {
        self.erreur = msg.into();
        self.resultat.clear();
        self.focus_entree = true;
    }

    pub fn set_resultat(&mut self, resultat: impl Into<String>) {
        self.erreur.clear();
        self.resultat = resultat.into();
    }

    /* ------------------------ Historique ------------------------ */

    /// ↑ : formule précédente dans l’entrée (rien au début de l’historique).
    pub fn rappel_precedent(&mut self) -> bool {
        let entree = self.historique.precedente().map(|e| e.expression.clone());
        self.rappeler(entree)
    }

    /// ↓ : formule suivante ; après la dernière, retour à une entrée vide.
    pub fn rappel_suivant(&mut self) -> bool {
        match self.historique.suivante().map(|e| e.expression.clone()) {
            Some(e) => self.rappeler(Some(e)),
            None => {
                self.entree.clear();
                true
            }
        }
    }

    /// Clic dans la liste : la formule revient dans l’entrée.
    pub fn rappel_expression(&mut self, expression: String) {
        self.rappeler(Some(expression));
    }

    fn rappeler(&mut self, expression: Option<String>) -> bool {
        match expression {
            Some(e) => {
                self.entree = e;
                self.focus_entree = true;
                true
            }
            None => false,
        }
    }

    /* ------------------------ Tracé ------------------------ */

    /// Récupère la dernière série livrée (les précédentes sont écartées).
    pub fn recevoir_points(&mut self) -> bool {
        let mut recu = false;
        while let Ok(points) = self.recepteur.try_recv() {
            self.points = points;
            recu = true;
        }
        recu
    }

    pub fn effacer_trace(&mut self) {
        self.echantillonneur.annuler();
        self.points.clear();
        self.equation_tracee.clear();
        // une série livrée avant l’annulation ne doit pas réapparaître
        while self.recepteur.try_recv().is_ok() {}
    }

    /// Fenêtre carrée centrée sur l’origine ; le zoom garde ~2000 points.
    pub fn set_etendue(&mut self, etendue: f64) {
        let e = etendue.clamp(ETENDUE_MIN, ETENDUE_MAX);
        self.fenetre = Fenetre {
            min_x: -e,
            max_x: e,
            min_y: -e,
            max_y: e,
            zoom: e / ETENDUE_DEFAUT,
        };
    }

    pub fn etendue(&self) -> f64 {
        self.fenetre.max_x
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::noyau::historique::PuitsHistorique;

    #[test]
    fn navigation_historique_remplit_l_entree() {
        let mut app = AppCalc::default();
        app.historique.consigner("1+1", "2");
        app.historique.consigner("2×3", "6");

        assert!(app.rappel_precedent());
        assert_eq!(app.entree, "2×3");
        assert!(app.rappel_precedent());
        assert_eq!(app.entree, "1+1");
        assert!(!app.rappel_precedent());
        assert_eq!(app.entree, "1+1");

        assert!(app.rappel_suivant());
        assert_eq!(app.entree, "2×3");
        assert!(app.rappel_suivant());
        assert_eq!(app.entree, "");
    }

    #[test]
    fn seule_la_derniere_serie_compte() {
        let mut app = AppCalc::default();
        let a = vec![PointTrace { x: 0.0, y: 0.0 }];
        let b = vec![PointTrace { x: 1.0, y: 1.0 }, PointTrace { x: 2.0, y: 4.0 }];
        let _ = app.emetteur.send(a);
        let _ = app.emetteur.send(b.clone());
        assert!(app.recevoir_points());
        assert_eq!(app.points, b);
        assert!(!app.recevoir_points());
    }

    #[test]
    fn effacer_trace_vide_le_canal() {
        let mut app = AppCalc::default();
        let _ = app.emetteur.send(vec![PointTrace { x: 0.0, y: 1.0 }]);
        app.effacer_trace();
        assert!(!app.recevoir_points());
        assert!(app.points.is_empty());
    }

    #[test]
    fn etendue_bornee_et_pas_proportionnel() {
        let mut app = AppCalc::default();
        app.set_etendue(1e9);
        assert_eq!(app.etendue(), ETENDUE_MAX);
        app.set_etendue(20.0);
        assert_eq!(app.fenetre.zoom, 2.0);
        assert!(app.fenetre.est_valide());
    }

    #[test]
    fn erreur_efface_le_resultat() {
        let mut app = AppCalc::default();
        app.set_resultat("14");
        app.set_erreur("syntaxe");
        assert!(app.resultat.is_empty());
        app.clear_resultats();
        assert!(app.erreur.is_empty());
    }
}
