//! Noyau de la calculatrice multibase
//!
//! Organisation interne :
//! - reglages.rs     : séparateurs, point décimal, longueur de ligne
//! - erreur.rs       : erreurs typées (syntaxe, formes, dépassement)
//! - base.rs         : BIN / DEC / HEX, conversion et regroupement des chiffres
//! - jetons.rs       : tokenisation (partagée par les deux moteurs)
//! - fonctions.rs    : fonctions nommées, réelles puis complexes
//! - rpn.rs          : shunting-yard + évaluation complexe
//! - symboles.rs     : évaluateur scalaire + variables
//! - algebre.rs      : opérandes scalaire / matrice (nalgebra)
//! - matrice.rs      : moteur matriciel (descente récursive)
//! - format.rs       : précision adaptée à la ligne, composition R+Ni
//! - affichage.rs    : exposants, séparateurs, curseur
//! - localisation.rs : langue locale <-> noms canoniques
//! - historique.rs   : calculs réussis, 100 au plus
//! - solveur.rs      : pipeline complet
//! - graphe.rs       : échantillonnage annulable pour le tracé

pub mod affichage;
pub mod algebre;
pub mod base;
pub mod erreur;
pub mod fonctions;
pub mod format;
pub mod graphe;
pub mod historique;
pub mod jetons;
pub mod localisation;
pub mod matrice;
pub mod reglages;
pub mod rpn;
pub mod solveur;
pub mod symboles;

#[cfg(test)]
mod tests_scientifiques;

#[cfg(test)]
mod tests_fuzz_safe;

// API publique minimale (celle de l’UI)
pub use base::Base;
pub use graphe::{Echantillonneur, Fenetre, PointTrace};
pub use historique::Historique;
pub use solveur::Solveur;
