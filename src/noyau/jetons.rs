// src/noyau/jetons.rs

use super::erreur::ErreurCalcul;
use super::reglages::{Reglages, DIVISE, FOIS, MOINS};

#[derive(Clone, Debug, PartialEq)]
pub enum Tok {
    Num(f64),

    // Fonctions, constantes (pi, e, i) et variables à une lettre.
    // NOTE: c’est le moteur qui décide du sens d’un Ident.
    Ident(String),

    Plus,
    Minus,
    Star,
    Slash,
    Caret, // ^
    Bang,  // ! (factorielle, postfixe)
    Percent,

    LPar,
    RPar,

    // littéraux matriciels
    LBrack,
    RBrack,
    Sep,
}

/// Noms reconnus d’un bloc (le plus long gagne : "asind" avant "asin" avant "sin").
/// Toute autre lettre est un identifiant d’une lettre (X, T, e, i...).
const NOMS: [&str; 20] = [
    "asind", "acosd", "atand", "asin", "acos", "atan", "sind", "cosd", "tand", "sin", "cos", "tan",
    "sqrt", "cbrt", "log", "ln", "det", "abs", "exp", "pi",
];

fn nom_connu(chars: &[char], i: usize) -> Option<&'static str> {
    NOMS.iter()
        .copied()
        .filter(|nom| {
            let n = nom.chars().count();
            i + n <= chars.len() && nom.chars().zip(&chars[i..i + n]).all(|(a, &b)| a == b)
        })
        .max_by_key(|nom| nom.len())
}

/// Fin d’une valeur : un séparateur implicite (espace) peut suivre.
fn fin_de_valeur(t: Option<&Tok>) -> bool {
    matches!(
        t,
        Some(Tok::Num(_) | Tok::Ident(_) | Tok::RPar | Tok::RBrack | Tok::Bang | Tok::Percent)
    )
}

fn debut_de_valeur(c: char, r: &Reglages) -> bool {
    c.is_ascii_digit()
        || c == r.point_decimal
        || c.is_alphabetic()
        || matches!(c, '(' | '[' | '-' | '√' | 'π' | MOINS)
}

/// Tokenize une chaîne en jetons.
/// Supporte:
/// - nombres décimaux avec le point de la locale, exposant optionnel (1.5e-3)
/// - opérateurs + - * / ^ ! % et leurs glyphes (− × ÷)
/// - parenthèses ( ) et crochets [ ] (matrices), séparateur de matrice
/// - √ (=> ident("sqrt")), π (=> ident("pi")), ∞
/// - noms de fonctions, sinon identifiants d’une lettre (la casse est conservée)
pub fn tokenize(s: &str, r: &Reglages) -> Result<Vec<Tok>, ErreurCalcul> {
    let mut out = Vec::new();
    let chars: Vec<char> = s.chars().collect();
    let mut profondeur: usize = 0;
    let mut i: usize = 0;

    while i < chars.len() {
        let c = chars[i];

        // Espaces : séparateur de matrice si c’en est un (entre deux valeurs)
        if c.is_whitespace() {
            let mut j = i;
            while j < chars.len() && chars[j].is_whitespace() {
                j += 1;
            }
            if profondeur > 0
                && r.separateur_matrice.is_whitespace()
                && fin_de_valeur(out.last())
                && chars.get(j).is_some_and(|&n| debut_de_valeur(n, r))
            {
                out.push(Tok::Sep);
            }
            i = j;
            continue;
        }

        if c == r.separateur_matrice {
            if profondeur == 0 {
                return Err(ErreurCalcul::syntaxe(format!("'{c}' hors d’une matrice")));
            }
            out.push(Tok::Sep);
            i += 1;
            continue;
        }

        // Nombre : 12 / 1.5 / .5 / 2e10 / 1.5e-3
        let point_puis_chiffre =
            c == r.point_decimal && chars.get(i + 1).is_some_and(char::is_ascii_digit);
        if c.is_ascii_digit() || point_puis_chiffre {
            let start = i;
            while i < chars.len() && chars[i].is_ascii_digit() {
                i += 1;
            }
            if i < chars.len() && chars[i] == r.point_decimal {
                i += 1;
                while i < chars.len() && chars[i].is_ascii_digit() {
                    i += 1;
                }
            }
            // exposant seulement si un chiffre suit (sinon "2exp(1)" serait mangé)
            if i < chars.len() && chars[i] == 'e' {
                let mut j = i + 1;
                if j < chars.len() && matches!(chars[j], '+' | '-' | MOINS) {
                    j += 1;
                }
                if j < chars.len() && chars[j].is_ascii_digit() {
                    i = j;
                    while i < chars.len() && chars[i].is_ascii_digit() {
                        i += 1;
                    }
                }
            }

            let texte: String = chars[start..i]
                .iter()
                .map(|&c| match c {
                    c if c == r.point_decimal => '.',
                    MOINS => '-',
                    c => c,
                })
                .collect();
            let v: f64 = texte
                .parse()
                .map_err(|_| ErreurCalcul::syntaxe(format!("nombre invalide: {texte}")))?;
            out.push(Tok::Num(v));
            continue;
        }

        let tok = match c {
            '+' => Some(Tok::Plus),
            '-' | MOINS => Some(Tok::Minus),
            '*' | FOIS => Some(Tok::Star),
            '/' | DIVISE => Some(Tok::Slash),
            '^' => Some(Tok::Caret),
            '!' => Some(Tok::Bang),
            '%' => Some(Tok::Percent),
            '(' => Some(Tok::LPar),
            ')' => Some(Tok::RPar),
            '[' => {
                profondeur += 1;
                Some(Tok::LBrack)
            }
            ']' => {
                profondeur = profondeur.saturating_sub(1);
                Some(Tok::RBrack)
            }
            '√' => Some(Tok::Ident("sqrt".to_string())),
            'π' => Some(Tok::Ident("pi".to_string())),
            '∞' => Some(Tok::Num(f64::INFINITY)),
            // marqueurs invisibles de l’affichage
            '\u{200B}' | '\u{FEFF}' => None,
            _ => {
                if !c.is_alphabetic() {
                    return Err(ErreurCalcul::syntaxe(format!("caractère inattendu: '{c}'")));
                }
                match nom_connu(&chars, i) {
                    Some(nom) => {
                        i += nom.chars().count();
                        out.push(Tok::Ident(nom.to_string()));
                    }
                    None => {
                        i += 1;
                        out.push(Tok::Ident(c.to_string()));
                    }
                }
                continue;
            }
        };

        if let Some(t) = tok {
            out.push(t);
        }
        i += 1;
    }

    Ok(out)
}

/// Format utilitaire (journal) : liste de jetons en texte.
pub fn format_tokens(tokens: &[Tok]) -> String {
    let mut out = Vec::with_capacity(tokens.len());
    for t in tokens {
        let s = match t {
            Tok::Num(v) => format!("{v}"),
            Tok::Ident(name) => name.clone(),

            Tok::Plus => "+".to_string(),
            Tok::Minus => "-".to_string(),
            Tok::Star => "*".to_string(),
            Tok::Slash => "/".to_string(),
            Tok::Caret => "^".to_string(),
            Tok::Bang => "!".to_string(),
            Tok::Percent => "%".to_string(),

            Tok::LPar => "(".to_string(),
            Tok::RPar => ")".to_string(),
            Tok::LBrack => "[".to_string(),
            Tok::RBrack => "]".to_string(),
            Tok::Sep => ";".to_string(),
        };
        out.push(s);
    }
    out.join(" ")
}
