// src/noyau/localisation.rs
//
// Traduction entre la langue de l’interface et les noms canoniques (anglais).
// Le solveur ne l’utilise que si une localisation est activée.

use std::collections::HashMap;

use tracing::trace;

pub trait Localisateur: Send {
    /// Texte saisi (langue locale) -> noms canoniques.
    fn localiser(&self, texte: &str) -> String;

    /// Résultat canonique -> symboles locaux (point décimal, séparateur de matrice).
    fn relocaliser(&self, texte: &str) -> String;
}

/// Ordre de traduction : les fonctions arc avant les fonctions simples
/// ("arcsen" ne doit pas devenir "arcsin" par le biais de "sen").
const ORDRE: [&str; 13] = [
    "asin", "acos", "atan", "sin", "cos", "tan", "log", "ln", "det", "sqrt", "cbrt", ".", ",",
];

#[derive(Clone, Debug, Default)]
pub struct TableLocalisation {
    traductions: HashMap<&'static str, String>,
    degres: bool,
}

impl TableLocalisation {
    pub fn new() -> Self {
        Self::default()
    }

    /// Associe un mot canonique à sa forme locale. Les mots hors table sont ignorés.
    pub fn traduire(mut self, canonique: &str, local: impl Into<String>) -> Self {
        match ORDRE.iter().copied().find(|m| *m == canonique) {
            Some(mot) => {
                self.traductions.insert(mot, local.into());
            }
            None => trace!(canonique, "mot non traduisible ignoré"),
        }
        self
    }

    /// sin/cos/tan deviennent sind/cosd/tand (arguments en degrés).
    pub fn en_degres(mut self, degres: bool) -> Self {
        self.degres = degres;
        self
    }

    fn local(&self, canonique: &str) -> Option<&str> {
        self.traductions
            .get(canonique)
            .map(String::as_str)
            .filter(|l| !l.is_empty() && *l != canonique)
    }
}

/// Ajoute le suffixe 'd' à chaque occurrence de `nom` qui n’en a pas déjà un.
fn suffixe_degres(texte: &str, nom: &str) -> String {
    let mut sortie = String::with_capacity(texte.len() + 4);
    let mut reste = texte;
    while let Some(p) = reste.find(nom) {
        let fin = p + nom.len();
        sortie.push_str(&reste[..fin]);
        if !reste[fin..].starts_with('d') {
            sortie.push('d');
        }
        reste = &reste[fin..];
    }
    sortie.push_str(reste);
    sortie
}

impl Localisateur for TableLocalisation {
    fn localiser(&self, texte: &str) -> String {
        let mut s = texte.to_string();
        for mot in ORDRE {
            if let Some(local) = self.local(mot) {
                s = s.replace(local, mot);
            }
            if mot == "tan" && self.degres {
                for nom in ["sin", "cos", "tan"] {
                    s = suffixe_degres(&s, nom);
                }
            }
        }
        s
    }

    // Une seule passe : échanger '.' et ',' ne doit pas se défaire.
    fn relocaliser(&self, texte: &str) -> String {
        let point = self.local(".");
        let virgule = self.local(",");
        let mut sortie = String::with_capacity(texte.len());
        for c in texte.chars() {
            match (c, point, virgule) {
                ('.', Some(l), _) | (',', _, Some(l)) => sortie.push_str(l),
                _ => sortie.push(c),
            }
        }
        sortie
    }
}
