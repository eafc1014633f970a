// src/noyau/affichage.rs
//
// Mise en forme de l’équation affichée (présentation seulement).
// - ajouter_parentheses : ferme les parenthèses restées ouvertes
// - inserer_exposants : 2^3 -> 2<sup><small>\u{200B}3</small></sup> ('^' remplacé)
// - ajouter_separateurs : regroupement des chiffres, avec ou sans curseur

use super::base::{extraire_curseur, grouper_phrase, Base};
use super::reglages::{Reglages, DIVISE, FOIS, MARQUEUR_CURSEUR, MOINS};

/// Caractère invisible inséré après '^' (garde une largeur à l’exposant vide).
pub const PLACEHOLDER: char = '\u{200B}';

/// sin(90 -> sin(90)
pub fn ajouter_parentheses(texte: &str) -> String {
    let ouvertes = texte.chars().fold(0_i64, |n, c| match c {
        '(' => n + 1,
        ')' => n - 1,
        _ => n,
    });
    let mut sortie = texte.to_string();
    for _ in 0..ouvertes.max(0) {
        sortie.push(')');
    }
    sortie
}

/// Caractère "numérique" au sens de l’affichage : chiffre hexa, point,
/// séparateurs de groupe.
fn est_numerique(c: char, r: &Reglages) -> bool {
    c.is_ascii_digit()
        || ('A'..='F').contains(&c)
        || c == r.point_decimal
        || c == r.separateur_decimal
        || c == r.separateur_binaire
        || c == r.separateur_hexa
}

/// Un exposant commencé par '^' se ferme au premier opérateur de même niveau
/// de parenthèses, ou quand un chiffre cède la place à autre chose (2^3log(1)).
fn ferme_exposant(c: char, precedent: char, r: &Reglages) -> bool {
    let num = |x: char| est_numerique(x, r);
    matches!(c, '+' | '*' | '/' | '=' | FOIS | DIVISE)
        || (matches!(c, '-' | MOINS) && precedent != '^')
        || (c == '(' && (num(precedent) || precedent == ')'))
        || (num(c) && precedent == ')')
        || (!num(c) && num(precedent) && c != r.point_decimal)
}

/// Insère les balises HTML d’exposant. Chaque '^' devient PLACEHOLDER,
/// sauf un '^' final, laissé tel quel.
pub fn inserer_exposants(texte: &str, r: &Reglages) -> String {
    let chars: Vec<char> = texte.chars().collect();
    let mut sortie = String::with_capacity(texte.len() * 2);

    let mut ouverts = 0_usize;
    let mut fermes = 0_usize;
    let mut par_ouvertes = 0_i64;
    let mut par_fermees = 0_i64;

    let fermer = |sortie: &mut String, ouverts: usize, fermes: &mut usize| {
        while ouverts > *fermes {
            if *fermes == 0 {
                sortie.push_str("</small>");
            }
            sortie.push_str("</sup>");
            *fermes += 1;
        }
    };

    for (i, &c) in chars.iter().enumerate() {
        if c == '^' {
            sortie.push_str("<sup>");
            if ouverts == 0 {
                sortie.push_str("<small>");
            }
            ouverts += 1;
            if i + 1 == chars.len() {
                sortie.push(c);
                if fermes == 0 {
                    sortie.push_str("</small>");
                }
                sortie.push_str("</sup>");
                fermes += 1;
            } else {
                sortie.push(PLACEHOLDER);
            }
            continue;
        }

        if ouverts > fermes {
            let precedent = if i > 0 { chars[i - 1] } else { '^' };
            if par_ouvertes == par_fermees && ferme_exposant(c, precedent, r) {
                fermer(&mut sortie, ouverts, &mut fermes);
                ouverts = 0;
                fermes = 0;
                par_ouvertes = 0;
                par_fermees = 0;
                // la parenthèse qui ferme l’exposant ne compte pas
                match c {
                    '(' => par_ouvertes -= 1,
                    ')' => par_fermees -= 1,
                    _ => {}
                }
            }
            match c {
                '(' => par_ouvertes += 1,
                ')' => par_fermees += 1,
                _ => {}
            }
        }
        sortie.push(c);
    }

    fermer(&mut sortie, ouverts, &mut fermes);
    sortie
}

/// 12345 -> 12,345 ; 10101010 -> 1010 1010 ; ABCDEF -> AB CD EF
pub fn ajouter_separateurs(texte: &str, base: Base, r: &Reglages) -> String {
    grouper_phrase(texte, None, base, r)
        .chars()
        .filter(|&c| c != MARQUEUR_CURSEUR)
        .collect()
}

/// Comme `ajouter_separateurs`, et renvoie la nouvelle position du curseur
/// (en caractères) après insertion / retrait des séparateurs.
pub fn ajouter_separateurs_curseur(
    texte: &str,
    curseur: usize,
    base: Base,
    r: &Reglages,
) -> (String, usize) {
    let groupe = grouper_phrase(texte, Some(curseur), base, r);
    let (sortie, position) = extraire_curseur(&groupe);
    let fin = sortie.chars().count();
    (sortie, position.unwrap_or(fin))
}

/// Regroupement, puis exposants, puis parenthèses fermées.
pub fn formater(texte: &str, base: Base, r: &Reglages) -> String {
    ajouter_parentheses(&inserer_exposants(&ajouter_separateurs(texte, base, r), r))
}

/// Moins typographique pour l’affichage.
pub fn remplacer_moins(texte: &str) -> String {
    texte.replace('-', &MOINS.to_string())
}
