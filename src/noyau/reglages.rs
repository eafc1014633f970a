//! Réglages du noyau (symboles dépendants de la locale + longueur de ligne).
//!
//! Rien de global : chaque composant reçoit ses `Reglages` explicitement.

/// Marqueur temporaire de la position du curseur dans un texte à regrouper.
pub const MARQUEUR_CURSEUR: char = '\u{2620}';

/// Moins typographique (affichage).
pub const MOINS: char = '\u{2212}';
pub const FOIS: char = '\u{00d7}';
pub const DIVISE: char = '\u{00f7}';
pub const INFINI: &str = "\u{221e}";

/// Longueur de ligne par défaut (précision d’affichage maximale).
pub const LONGUEUR_LIGNE_DEFAUT: usize = 14;

/// Plancher de précision : on ne descend jamais sous 7 chiffres significatifs.
pub const PRECISION_MIN: usize = 7;

/// Garde-fou : borne haute de la longueur de ligne.
const LONGUEUR_LIGNE_MAX: usize = 40;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Reglages {
    pub point_decimal: char,
    pub separateur_decimal: char,
    pub separateur_binaire: char,
    pub separateur_hexa: char,
    /// Sépare les valeurs d’une ligne de matrice ; toujours distinct du point décimal.
    pub separateur_matrice: char,
    pub longueur_ligne: usize,
    /// Variable libre utilisée par le tracé.
    pub variable: String,
}

impl Default for Reglages {
    fn default() -> Self {
        Self::pour_point_decimal('.')
    }
}

impl Reglages {
    /// Dérive les séparateurs à partir du point décimal de la locale.
    ///
    /// Le séparateur de matrice vaut ',' sauf si ',' est déjà le point décimal
    /// (il devient alors une espace).
    pub fn pour_point_decimal(point_decimal: char) -> Self {
        let virgule = point_decimal == ',';
        Self {
            point_decimal,
            separateur_decimal: if virgule { '.' } else { ',' },
            separateur_binaire: ' ',
            separateur_hexa: ' ',
            separateur_matrice: if virgule { ' ' } else { ',' },
            longueur_ligne: LONGUEUR_LIGNE_DEFAUT,
            variable: "X".to_string(),
        }
    }

    /// Garde-fou : borne la longueur de ligne.
    pub fn set_longueur_ligne(&mut self, longueur: usize) {
        self.longueur_ligne = longueur.clamp(PRECISION_MIN, LONGUEUR_LIGNE_MAX);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn separateurs_locale_point() {
        let r = Reglages::default();
        assert_eq!(r.point_decimal, '.');
        assert_eq!(r.separateur_decimal, ',');
        assert_eq!(r.separateur_matrice, ',');
        assert_eq!(r.variable, "X");
    }

    #[test]
    fn separateurs_locale_virgule() {
        let r = Reglages::pour_point_decimal(',');
        assert_eq!(r.separateur_decimal, '.');
        assert_eq!(r.separateur_matrice, ' ');
        assert_ne!(r.separateur_matrice, r.point_decimal);
    }

    #[test]
    fn longueur_ligne_bornee() {
        let mut r = Reglages::default();
        r.set_longueur_ligne(2);
        assert_eq!(r.longueur_ligne, PRECISION_MIN);
        r.set_longueur_ligne(1000);
        assert_eq!(r.longueur_ligne, 40);
        r.set_longueur_ligne(20);
        assert_eq!(r.longueur_ligne, 20);
    }
}
