// src/noyau/base.rs
//
// Bases numériques (binaire / décimale / hexadécimale)
// ----------------------------------------------------
// - convertir : ré-exprime chaque littéral d’une expression dans une autre base
// - grouper_chiffres / grouper_phrase : séparateurs d’affichage (1,234 / 1010 1010 / AB CD)
//
// Un texte est découpé en "numéraux" (chiffres de la base + point + séparateurs
// internes) et en texte libre (opérateurs, fonctions, parenthèses). Seuls les
// numéraux sont réécrits ; le texte libre passe tel quel.

use std::num::IntErrorKind;

use tracing::trace;

use super::erreur::ErreurCalcul;
use super::reglages::{Reglages, MARQUEUR_CURSEUR, MOINS};

/// Chiffres (base cible) gardés après le point lors d’une conversion.
const PRECISION_FRACTION: usize = 8;

/// Au-delà, la fraction source est tronquée : elle sera arrondie de toute façon.
const FRACTION_SOURCE_MAX: usize = 13;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Base {
    Binaire,
    #[default]
    Decimale,
    Hexadecimale,
}

impl Base {
    pub const TOUTES: [Base; 3] = [Base::Binaire, Base::Decimale, Base::Hexadecimale];

    pub const fn radix(self) -> u32 {
        match self {
            Base::Binaire => 2,
            Base::Decimale => 10,
            Base::Hexadecimale => 16,
        }
    }

    /// Nombre de chiffres entre deux séparateurs d’affichage.
    pub const fn distance_groupe(self) -> usize {
        match self {
            Base::Binaire => 4,
            Base::Decimale => 3,
            Base::Hexadecimale => 2,
        }
    }

    pub fn separateur(self, r: &Reglages) -> char {
        match self {
            Base::Binaire => r.separateur_binaire,
            Base::Decimale => r.separateur_decimal,
            Base::Hexadecimale => r.separateur_hexa,
        }
    }

    /// Chiffre de la base. Les lettres minuscules n’en sont jamais
    /// (elles appartiennent aux noms de fonctions : "e", "sin", "det"...).
    pub fn est_chiffre(self, c: char) -> bool {
        match self {
            Base::Binaire => matches!(c, '0' | '1'),
            Base::Decimale => c.is_ascii_digit(),
            Base::Hexadecimale => c.is_ascii_digit() || ('A'..='F').contains(&c),
        }
    }

    pub const fn nom(self) -> &'static str {
        match self {
            Base::Binaire => "BIN",
            Base::Decimale => "DEC",
            Base::Hexadecimale => "HEX",
        }
    }
}

/* ------------------------ Découpage numéraux / texte ------------------------ */

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Segment<'a> {
    Numeral { texte: &'a str, dans_matrice: bool },
    Texte(&'a str),
}

/// Découpe `texte` en numéraux et texte libre.
///
/// Un séparateur de groupe n’appartient au numéral que s’il est suivi d’un chiffre.
/// Dans un littéral matriciel, un séparateur identique au séparateur de matrice
/// reste du texte (sinon "[[1,2]]" deviendrait un seul nombre).
fn segmenter<'a>(texte: &'a str, base: Base, r: &Reglages, avec_marqueur: bool) -> Vec<Segment<'a>> {
    let sep = base.separateur(r);
    let chars: Vec<(usize, char)> = texte.char_indices().collect();
    let est_numeral = |c: char| {
        base.est_chiffre(c) || c == r.point_decimal || (avec_marqueur && c == MARQUEUR_CURSEUR)
    };
    let chiffre_apres = |j: usize| {
        chars
            .get(j)
            .is_some_and(|&(_, c)| base.est_chiffre(c) || (avec_marqueur && c == MARQUEUR_CURSEUR))
    };

    let mut segments = Vec::new();
    let mut profondeur: usize = 0;
    let mut debut_texte = 0;
    let mut i = 0;

    while i < chars.len() {
        let (octet, c) = chars[i];
        if !est_numeral(c) {
            match c {
                '[' => profondeur += 1,
                ']' => profondeur = profondeur.saturating_sub(1),
                _ => {}
            }
            i += 1;
            continue;
        }

        if debut_texte < octet {
            segments.push(Segment::Texte(&texte[debut_texte..octet]));
        }

        let sep_permis = sep != r.separateur_matrice || profondeur == 0;
        let mut j = i + 1;
        while j < chars.len() {
            let c = chars[j].1;
            if est_numeral(c) || (sep_permis && c == sep && chiffre_apres(j + 1)) {
                j += 1;
            } else {
                break;
            }
        }

        let fin = chars.get(j).map_or(texte.len(), |&(o, _)| o);
        segments.push(Segment::Numeral {
            texte: &texte[octet..fin],
            dans_matrice: profondeur > 0,
        });
        debut_texte = fin;
        i = j;
    }

    if debut_texte < texte.len() {
        segments.push(Segment::Texte(&texte[debut_texte..]));
    }
    segments
}

/* ------------------------ Conversion ------------------------ */

/// Ré-exprime tous les numéraux de `texte` de la base `de` vers la base `vers`.
///
/// - bases identiques / texte vide : inchangé
/// - partie entière au-delà de 64 bits : `Depassement`
/// - fraction : au plus 8 chiffres de la base cible
pub fn convertir(texte: &str, de: Base, vers: Base, r: &Reglages) -> Result<String, ErreurCalcul> {
    if de == vers || texte.is_empty() {
        return Ok(texte.to_string());
    }

    let mut sortie = String::with_capacity(texte.len() + 8);
    for segment in segmenter(texte, de, r, false) {
        match segment {
            Segment::Texte(t) => sortie.push_str(t),
            Segment::Numeral { texte: n, .. } => sortie.push_str(&convertir_nombre(n, de, vers, r)?),
        }
    }

    trace!(%texte, %sortie, de = de.nom(), vers = vers.nom(), "conversion de base");
    Ok(sortie)
}

fn convertir_nombre(nombre: &str, de: Base, vers: Base, r: &Reglages) -> Result<String, ErreurCalcul> {
    let sep = de.separateur(r);
    let propre: String = nombre.chars().filter(|&c| c != sep).collect();
    let (entier, fraction) = propre
        .split_once(r.point_decimal)
        .unwrap_or((propre.as_str(), ""));

    // ".5" => "0.5"
    let entier = if entier.is_empty() { "0" } else { entier };
    let valeur = i64::from_str_radix(entier, de.radix()).map_err(|e| match e.kind() {
        IntErrorKind::PosOverflow | IntErrorKind::NegOverflow => {
            ErreurCalcul::Depassement(nombre.to_string())
        }
        _ => ErreurCalcul::syntaxe(format!("nombre invalide: {nombre}")),
    })?;

    let mut sortie = ecrire_entier(valeur, vers);

    let fraction: String = fraction.chars().take(FRACTION_SOURCE_MAX).collect();
    if fraction.is_empty() {
        return Ok(sortie);
    }

    let mut reste = lire_fraction(&fraction, de)?;
    if reste == 0.0 {
        return Ok(sortie);
    }

    // multiplier-et-tronquer, chiffre par chiffre
    sortie.push(r.point_decimal);
    let radix = f64::from(vers.radix());
    let mut i = 0;
    while reste != 0.0 && i < PRECISION_FRACTION {
        reste *= radix;
        let chiffre = reste.floor();
        reste -= chiffre;
        if let Some(c) = char::from_digit(chiffre as u32, vers.radix()) {
            sortie.push(c.to_ascii_uppercase());
        }
        i += 1;
    }

    Ok(sortie)
}

fn ecrire_entier(valeur: i64, base: Base) -> String {
    match base {
        Base::Binaire => format!("{valeur:b}"),
        Base::Decimale => valeur.to_string(),
        Base::Hexadecimale => format!("{valeur:X}"),
    }
}

/// Chiffres après le point (base `de`) -> valeur dans [0, 1).
fn lire_fraction(fraction: &str, de: Base) -> Result<f64, ErreurCalcul> {
    let invalide = || ErreurCalcul::syntaxe(format!("fraction invalide: {fraction}"));

    if de == Base::Decimale {
        return format!("0.{fraction}").parse::<f64>().map_err(|_| invalide());
    }

    let numerateur = u64::from_str_radix(fraction, de.radix()).map_err(|_| invalide())?;
    let denominateur = f64::from(de.radix()).powi(fraction.chars().count() as i32);
    Ok(numerateur as f64 / denominateur)
}

/* ------------------------ Regroupement des chiffres ------------------------ */

/// Insère le séparateur de la base tous les N chiffres de la partie entière
/// (N = 3 décimal, 4 binaire, 2 hexa). Le marqueur de curseur n’est pas compté.
///
/// Les séparateurs déjà présents sont retirés d’abord : regrouper deux fois
/// donne le même texte.
pub fn grouper_chiffres(nombre: &str, base: Base, r: &Reglages) -> String {
    let sep = base.separateur(r);

    let (signe, corps) = match nombre.chars().next() {
        Some(c @ ('-' | MOINS)) => (Some(c), &nombre[c.len_utf8()..]),
        _ => (None, nombre),
    };

    // On ne groupe que la partie entière.
    let (entier, reste) = match corps.find(r.point_decimal) {
        Some(p) => (&corps[..p], &corps[p..]),
        None => (corps, ""),
    };
    let entier: String = entier.chars().filter(|&c| c != sep).collect();

    let mut sortie = String::with_capacity(nombre.len() + entier.len() / 2);
    if let Some(s) = signe {
        sortie.push(s);
    }
    sortie.push_str(&grouper(&entier, base.distance_groupe(), sep));
    sortie.push_str(reste);
    sortie
}

fn grouper(entier: &str, espacement: usize, sep: char) -> String {
    let mut inverse: Vec<char> = Vec::with_capacity(entier.len() * 2);
    let mut vus = 0;
    for c in entier.chars().rev() {
        if c != MARQUEUR_CURSEUR {
            if vus > 0 && vus % espacement == 0 {
                inverse.push(sep);
            }
            vus += 1;
        }
        inverse.push(c);
    }
    inverse.into_iter().rev().collect()
}

/// Regroupe chaque numéral d’une phrase (hors littéraux matriciels).
///
/// Si `curseur` (index en caractères) est fourni, le marqueur de curseur est
/// inséré à cette position avant le regroupement : il se retrouve là où le
/// curseur doit atterrir (voir `extraire_curseur`).
pub fn grouper_phrase(texte: &str, curseur: Option<usize>, base: Base, r: &Reglages) -> String {
    let mut source = String::with_capacity(texte.len() + MARQUEUR_CURSEUR.len_utf8());
    match curseur {
        Some(pos) => {
            let mut place = false;
            for (i, c) in texte.chars().enumerate() {
                if i == pos {
                    source.push(MARQUEUR_CURSEUR);
                    place = true;
                }
                source.push(c);
            }
            if !place {
                source.push(MARQUEUR_CURSEUR);
            }
        }
        None => source.push_str(texte),
    }

    let mut sortie = String::with_capacity(source.len() + source.len() / 3);
    for segment in segmenter(&source, base, r, true) {
        match segment {
            Segment::Numeral {
                texte: n,
                dans_matrice: false,
            } => sortie.push_str(&grouper_chiffres(n, base, r)),
            Segment::Numeral { texte: n, .. } | Segment::Texte(n) => sortie.push_str(n),
        }
    }
    sortie
}

/// Retire les séparateurs d’affichage des numéraux (hors littéraux matriciels).
pub fn degrouper(texte: &str, base: Base, r: &Reglages) -> String {
    let sep = base.separateur(r);
    let mut sortie = String::with_capacity(texte.len());
    for segment in segmenter(texte, base, r, true) {
        match segment {
            Segment::Numeral {
                texte: n,
                dans_matrice: false,
            } => sortie.extend(n.chars().filter(|&c| c != sep)),
            Segment::Numeral { texte: n, .. } | Segment::Texte(n) => sortie.push_str(n),
        }
    }
    sortie
}

/// Retire le marqueur de curseur et renvoie sa position (en caractères).
pub fn extraire_curseur(texte: &str) -> (String, Option<usize>) {
    let mut position = None;
    let mut sortie = String::with_capacity(texte.len());
    for (i, c) in texte.chars().enumerate() {
        if c == MARQUEUR_CURSEUR && position.is_none() {
            position = Some(i);
        } else if c != MARQUEUR_CURSEUR {
            sortie.push(c);
        }
    }
    (sortie, position)
}
