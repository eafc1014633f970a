// src/noyau/graphe.rs
//
// Échantillonnage d’une fonction de X pour le tracé
// -------------------------------------------------
// - echantillonner : boucle pure, annulable à chaque pas
// - Echantillonneur : un seul passage actif à la fois, sur un fil dédié
//
// Annulation par numéro de génération : chaque demande incrémente la génération
// courante, un passage dont la génération n’est plus courante s’arrête au pas
// suivant. La livraison se fait sous verrou, génération vérifiée : un passage
// remplacé ne livre jamais.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::thread::{self, JoinHandle};

use tracing::{debug, trace, warn};

use super::base::{convertir, Base};
use super::matrice::contient_matrice;
use super::reglages::{Reglages, DIVISE, FOIS, MOINS};
use super::symboles::{EvaluateurScalaire, Symboles};

/// Pas d’échantillonnage à zoom 1.
const PAS_BASE: f64 = 0.01;

/// Tolérance (en fraction de pas) sur la borne droite, contre l’accumulation d’arrondis.
const TOLERANCE_BORNE: f64 = 1e-9;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PointTrace {
    pub x: f64,
    pub y: f64,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Fenetre {
    pub min_x: f64,
    pub max_x: f64,
    pub min_y: f64,
    pub max_y: f64,
    pub zoom: f64,
}

impl Default for Fenetre {
    fn default() -> Self {
        Self {
            min_x: -10.0,
            max_x: 10.0,
            min_y: -10.0,
            max_y: 10.0,
            zoom: 1.0,
        }
    }
}

impl Fenetre {
    pub fn pas(&self) -> f64 {
        PAS_BASE * self.zoom
    }

    pub fn est_valide(&self) -> bool {
        let pas = self.pas();
        pas.is_finite()
            && pas > 0.0
            && self.min_x.is_finite()
            && self.max_x.is_finite()
            && self.min_x <= self.max_x
    }
}

/// Découpe une série en morceaux continus : un trou plus large qu’un pas et
/// demi (points omis) interrompt la ligne.
pub fn segments(points: &[PointTrace], pas: f64) -> Vec<&[PointTrace]> {
    let mut morceaux = Vec::new();
    let mut debut = 0;
    for i in 1..points.len() {
        if points[i].x - points[i - 1].x > 1.5 * pas {
            morceaux.push(&points[debut..i]);
            debut = i;
        }
    }
    if debut < points.len() {
        morceaux.push(&points[debut..]);
    }
    morceaux
}

/// Parcourt [min_x, max_x] par pas de 0.01 × zoom.
///
/// - point en erreur ou non fini : omis, la série continue
/// - variable impossible à définir : aucune série (None)
/// - `est_annule()` vrai à un pas : None
pub fn echantillonner<E: EvaluateurScalaire>(
    evaluateur: &mut E,
    variable: &str,
    equation: &str,
    fenetre: &Fenetre,
    est_annule: impl Fn() -> bool,
) -> Option<Vec<PointTrace>> {
    if !fenetre.est_valide() {
        return Some(Vec::new());
    }
    let pas = fenetre.pas();
    let mut points = Vec::new();

    // x = min + k·pas (pas d’accumulation d’erreurs d’arrondi)
    let mut k: u64 = 0;
    loop {
        let x = fenetre.min_x + k as f64 * pas;
        if x > fenetre.max_x + pas * TOLERANCE_BORNE {
            break;
        }
        if est_annule() {
            return None;
        }
        if let Err(e) = evaluateur.definir(variable, x) {
            debug!(%e, variable, "variable non définissable");
            return None;
        }
        match evaluateur.eval(equation) {
            Ok(y) if y.is_finite() => points.push(PointTrace { x, y }),
            Ok(_) | Err(_) => {}
        }
        k += 1;
    }

    Some(points)
}

/// Équation prête à tracer : ni opérateur / '(' final, ni littéral matriciel.
pub fn doit_echantillonner(equation: &str, r: &Reglages) -> bool {
    let t = equation.trim_end();
    match t.chars().last() {
        None => false,
        Some(c) if matches!(c, '+' | '-' | '*' | '/' | '^' | '(' | MOINS | FOIS | DIVISE) => false,
        Some(_) => !contient_matrice(t, r),
    }
}

/* ------------------------ Générations ------------------------ */

#[derive(Debug, Default)]
struct Generations {
    courante: AtomicU64,
    livraison: Mutex<()>,
}

impl Generations {
    fn est_courante(&self, generation: u64) -> bool {
        self.courante.load(Ordering::Acquire) == generation
    }

    /// Nouvelle génération : toutes les précédentes deviennent périmées.
    fn suivante(&self) -> u64 {
        let _garde = self.livraison.lock().unwrap_or_else(PoisonError::into_inner);
        self.courante.fetch_add(1, Ordering::AcqRel) + 1
    }

    fn annuler(&self, generation: u64) -> bool {
        let _garde = self.livraison.lock().unwrap_or_else(PoisonError::into_inner);
        self.courante
            .compare_exchange(generation, generation + 1, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
    }

    /// Appelle `rappel` seulement si `generation` est encore courante.
    fn livrer<F>(&self, generation: u64, points: Vec<PointTrace>, rappel: F) -> bool
    where
        F: FnOnce(Vec<PointTrace>),
    {
        let _garde = self.livraison.lock().unwrap_or_else(PoisonError::into_inner);
        if !self.est_courante(generation) {
            return false;
        }
        rappel(points);
        true
    }
}

/// Poignée d’un passage lancé.
#[derive(Clone, Debug)]
pub struct Poignee {
    generations: Arc<Generations>,
    generation: u64,
}

impl Poignee {
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Vrai tant qu’aucune demande plus récente (ni annulation) n’a eu lieu.
    pub fn est_courante(&self) -> bool {
        self.generations.est_courante(self.generation)
    }

    /// Annule ce passage s’il est encore courant. Sans effet sur un passage plus récent.
    pub fn annuler(&self) -> bool {
        self.generations.annuler(self.generation)
    }
}

#[derive(Debug)]
pub enum Demarrage {
    Lance(Poignee),
    /// Rien à tracer (équation incomplète, matrice, conversion impossible).
    Ignore,
}

pub struct Echantillonneur<E = Symboles> {
    evaluateur: E,
    reglages: Reglages,
    generations: Arc<Generations>,
    travailleur: Option<JoinHandle<()>>,
}

impl Default for Echantillonneur<Symboles> {
    fn default() -> Self {
        let reglages = Reglages::default();
        Self::new(Symboles::new(reglages.clone()), reglages)
    }
}

impl<E> Echantillonneur<E>
where
    E: EvaluateurScalaire + Clone + Send + 'static,
{
    pub fn new(evaluateur: E, reglages: Reglages) -> Self {
        Self {
            evaluateur,
            reglages,
            generations: Arc::new(Generations::default()),
            travailleur: None,
        }
    }

    /// Lance un passage sur `equation` (écrite dans `base`).
    ///
    /// Tout passage précédent est périmé puis attendu avant le lancement :
    /// il ne livrera jamais. `rappel` est appelé au plus une fois, depuis le
    /// fil de travail, avec la série complète.
    pub fn demarrer<F>(&mut self, equation: &str, base: Base, fenetre: Fenetre, rappel: F) -> Demarrage
    where
        F: FnOnce(Vec<PointTrace>) + Send + 'static,
    {
        if !doit_echantillonner(equation, &self.reglages) {
            trace!(%equation, "pas de tracé");
            return Demarrage::Ignore;
        }

        let generation = self.remplacer();

        let decimal = match convertir(equation, base, Base::Decimale, &self.reglages) {
            Ok(t) => t,
            Err(e) => {
                debug!(%e, %equation, "conversion impossible, pas de tracé");
                return Demarrage::Ignore;
            }
        };

        let mut evaluateur = self.evaluateur.clone();
        let variable = self.reglages.variable.clone();
        let generations = Arc::clone(&self.generations);

        let lancement = thread::Builder::new()
            .name("echantillonnage".to_string())
            .spawn(move || {
                let points = echantillonner(&mut evaluateur, &variable, &decimal, &fenetre, || {
                    !generations.est_courante(generation)
                });
                match points {
                    Some(points) => {
                        let n = points.len();
                        if generations.livrer(generation, points, rappel) {
                            debug!(generation, points = n, "tracé livré");
                        } else {
                            trace!(generation, "tracé périmé, non livré");
                        }
                    }
                    None => trace!(generation, "tracé annulé"),
                }
            });

        match lancement {
            Ok(h) => {
                debug!(generation, %equation, "tracé lancé");
                self.travailleur = Some(h);
                Demarrage::Lance(Poignee {
                    generations: Arc::clone(&self.generations),
                    generation,
                })
            }
            Err(e) => {
                warn!(%e, "fil d’échantillonnage impossible à créer");
                Demarrage::Ignore
            }
        }
    }

    /// Annule le passage en cours (s’il y en a un) et l’attend.
    pub fn annuler(&mut self) {
        self.remplacer();
    }

    fn remplacer(&mut self) -> u64 {
        let generation = self.generations.suivante();
        if let Some(h) = self.travailleur.take() {
            if h.join().is_err() {
                warn!("fil d’échantillonnage interrompu par une panique");
            }
        }
        generation
    }
}

impl<E> Drop for Echantillonneur<E> {
    fn drop(&mut self) {
        self.generations.suivante();
        if let Some(h) = self.travailleur.take() {
            let _ = h.join();
        }
    }
}
