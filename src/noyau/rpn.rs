// src/noyau/rpn.rs
//
// Shunting-yard -> RPN -> valeur complexe
// Objectif:
// - Convertir une suite de Tok en RPN (postfix)
// - Puis l’évaluer sur Complex64 avec un jeu de variables
//
// Règles:
// - Ident(name):
//    - fonction connue => opérateur préfixe (sorti après son argument)
//    - sinon => atome (constante pi / e / i, ou variable)
// - Moins unaire: opérateur Neg, plus lié que × ÷ mais moins que ^ (-2^2 = -4)
// - ! et % sont postfixes : sortie directe
// - Multiplication implicite : 2X, 2(3), (1)(2), Xsin(X)...

use std::collections::HashMap;

use num_complex::Complex64;

use super::erreur::ErreurCalcul;
use super::fonctions::Fonction;
use super::jetons::Tok;

/// Au-delà, n! déborde de toute façon en f64.
const FACTORIELLE_MAX: u32 = 170;

/// Partie (imaginaire ou réelle) négligeable devant l’autre : remise à zéro.
const BRUIT_RELATIF: f64 = 1e-12;

#[derive(Clone, Debug, PartialEq)]
pub enum Rpn {
    Nombre(f64),
    Nom(String),
    Fonction(Fonction),
    Plus,
    Moins,
    Fois,
    Divise,
    Puissance,
    Neg,
    Factorielle,
    Pourcent,
}

#[derive(Clone, Copy, Debug, PartialEq)]
enum Operateur {
    Plus,
    Moins,
    Fois,
    Divise,
    Puissance,
    Neg,
    Fonction(Fonction),
    ParG,
}

impl Operateur {
    fn precedence(self) -> i32 {
        match self {
            Operateur::ParG => 0,
            Operateur::Plus | Operateur::Moins => 1,
            Operateur::Fois | Operateur::Divise => 2,
            Operateur::Neg => 3,
            Operateur::Puissance => 4,
            Operateur::Fonction(_) => 5,
        }
    }

    fn est_associatif_droite(self) -> bool {
        matches!(self, Operateur::Puissance)
    }

    fn vers_rpn(self) -> Result<Rpn, ErreurCalcul> {
        Ok(match self {
            Operateur::Plus => Rpn::Plus,
            Operateur::Moins => Rpn::Moins,
            Operateur::Fois => Rpn::Fois,
            Operateur::Divise => Rpn::Divise,
            Operateur::Puissance => Rpn::Puissance,
            Operateur::Neg => Rpn::Neg,
            Operateur::Fonction(f) => Rpn::Fonction(f),
            Operateur::ParG => return Err(ErreurCalcul::syntaxe("parenthèses non fermées")),
        })
    }
}

fn est_fonction(t: &Tok) -> bool {
    matches!(t, Tok::Ident(n) if Fonction::depuis_nom(n).is_some())
}

/// Insère les '*' implicites entre une valeur et ce qui en commence une autre.
fn inserer_multiplications(tokens: &[Tok]) -> Vec<Tok> {
    let mut out: Vec<Tok> = Vec::with_capacity(tokens.len() * 2);
    for t in tokens {
        if let Some(prec) = out.last() {
            let fin = match prec {
                Tok::Num(_) | Tok::RPar | Tok::Bang | Tok::Percent => true,
                Tok::Ident(_) => !est_fonction(prec),
                _ => false,
            };
            let debut = matches!(t, Tok::Num(_) | Tok::Ident(_) | Tok::LPar);
            if fin && debut {
                out.push(Tok::Star);
            }
        }
        out.push(t.clone());
    }
    out
}

/// Dépile tant que la précédence / l’associativité exige de sortir le sommet.
fn depiler(ops: &mut Vec<Operateur>, out: &mut Vec<Rpn>, op: Operateur) -> Result<(), ErreurCalcul> {
    while let Some(&top) = ops.last() {
        if top == Operateur::ParG {
            break;
        }
        let doit_pop = if op.est_associatif_droite() {
            top.precedence() > op.precedence()
        } else {
            top.precedence() >= op.precedence()
        };
        if !doit_pop {
            break;
        }
        ops.pop();
        out.push(top.vers_rpn()?);
    }
    Ok(())
}

/// Convertit une suite de jetons en RPN (notation polonaise inversée).
///
/// Exemple:
///   tokens: [Ident("sin"), LPar, Ident("pi"), Slash, Num(2), RPar]
///   rpn:    [Nom("pi"), Nombre(2), Divise, Fonction(Sin)]
pub fn to_rpn(tokens: &[Tok]) -> Result<Vec<Rpn>, ErreurCalcul> {
    let tokens = inserer_multiplications(tokens);
    let mut out: Vec<Rpn> = Vec::new();
    let mut ops: Vec<Operateur> = Vec::new();

    // “valeur” = un atome ou une expression fermée.
    // Sert à détecter le moins unaire.
    let mut prev_was_value = false;

    for tok in tokens {
        match tok {
            Tok::Num(v) => {
                out.push(Rpn::Nombre(v));
                prev_was_value = true;
            }

            Tok::Ident(name) => match Fonction::depuis_nom(&name) {
                Some(f) => {
                    ops.push(Operateur::Fonction(f));
                    prev_was_value = false;
                }
                None => {
                    out.push(Rpn::Nom(name));
                    prev_was_value = true;
                }
            },

            Tok::LPar => {
                ops.push(Operateur::ParG);
                prev_was_value = false;
            }

            Tok::RPar => {
                loop {
                    match ops.pop() {
                        Some(Operateur::ParG) => break,
                        Some(op) => out.push(op.vers_rpn()?),
                        None => return Err(ErreurCalcul::syntaxe("parenthèse fermante en trop")),
                    }
                }
                // fonction collée à sa parenthèse : elle sort aussi
                if let Some(&Operateur::Fonction(f)) = ops.last() {
                    ops.pop();
                    out.push(Rpn::Fonction(f));
                }
                prev_was_value = true;
            }

            Tok::Bang | Tok::Percent => {
                if !prev_was_value {
                    return Err(ErreurCalcul::syntaxe("opérateur postfixe sans opérande"));
                }
                out.push(if tok == Tok::Bang { Rpn::Factorielle } else { Rpn::Pourcent });
            }

            Tok::Minus if !prev_was_value => ops.push(Operateur::Neg),
            Tok::Plus if !prev_was_value => {}

            Tok::Plus | Tok::Minus | Tok::Star | Tok::Slash | Tok::Caret => {
                if !prev_was_value {
                    return Err(ErreurCalcul::syntaxe("opérateur sans opérande gauche"));
                }
                let op = match tok {
                    Tok::Plus => Operateur::Plus,
                    Tok::Minus => Operateur::Moins,
                    Tok::Star => Operateur::Fois,
                    Tok::Slash => Operateur::Divise,
                    _ => Operateur::Puissance,
                };
                depiler(&mut ops, &mut out, op)?;
                ops.push(op);
                prev_was_value = false;
            }

            Tok::LBrack | Tok::RBrack | Tok::Sep => {
                return Err(ErreurCalcul::syntaxe("matrice hors du moteur matriciel"));
            }
        }
    }

    // vide la pile ops
    while let Some(op) = ops.pop() {
        out.push(op.vers_rpn()?);
    }

    Ok(out)
}

/// Évalue une RPN. Les noms libres sont cherchés dans `variables`.
pub fn eval_rpn(rpn: &[Rpn], variables: &HashMap<String, f64>) -> Result<Complex64, ErreurCalcul> {
    let mut st: Vec<Complex64> = Vec::with_capacity(rpn.len());
    let manque = || ErreurCalcul::syntaxe("expression invalide");

    for el in rpn {
        let v = match el {
            Rpn::Nombre(v) => Complex64::new(*v, 0.0),
            Rpn::Nom(n) => valeur_nom(n, variables)?,
            Rpn::Fonction(f) => f.appliquer_complexe(st.pop().ok_or_else(manque)?),
            Rpn::Neg => -st.pop().ok_or_else(manque)?,
            Rpn::Pourcent => st.pop().ok_or_else(manque)? * 0.01,
            Rpn::Factorielle => factorielle(st.pop().ok_or_else(manque)?)?,
            Rpn::Plus | Rpn::Moins | Rpn::Fois | Rpn::Divise | Rpn::Puissance => {
                let b = st.pop().ok_or_else(manque)?;
                let a = st.pop().ok_or_else(manque)?;
                match el {
                    Rpn::Plus => a + b,
                    Rpn::Moins => a - b,
                    Rpn::Fois => multiplier(a, b),
                    Rpn::Divise => diviser(a, b),
                    _ => puissance(a, b),
                }
            }
        };
        st.push(v);
    }

    match (st.pop(), st.is_empty()) {
        (Some(v), true) => Ok(nettoyer(v)),
        _ => Err(manque()),
    }
}

fn valeur_nom(nom: &str, variables: &HashMap<String, f64>) -> Result<Complex64, ErreurCalcul> {
    match nom {
        "pi" => Ok(Complex64::new(std::f64::consts::PI, 0.0)),
        "e" => Ok(Complex64::new(std::f64::consts::E, 0.0)),
        "i" => Ok(Complex64::i()),
        _ => variables
            .get(nom)
            .map(|&v| Complex64::new(v, 0.0))
            .ok_or_else(|| ErreurCalcul::syntaxe(format!("symbole inconnu: {nom}"))),
    }
}

// Réel × réel reste réel (évite 0 × ∞ -> NaN sur la partie imaginaire).
fn multiplier(a: Complex64, b: Complex64) -> Complex64 {
    if a.im == 0.0 && b.im == 0.0 {
        Complex64::new(a.re * b.re, 0.0)
    } else {
        a * b
    }
}

// Diviseur réel : composante par composante, donc 1/0 = ∞ et pas NaN.
fn diviser(a: Complex64, b: Complex64) -> Complex64 {
    if b.im == 0.0 {
        let im = if a.im == 0.0 { 0.0 } else { a.im / b.re };
        Complex64::new(a.re / b.re, im)
    } else {
        a / b
    }
}

fn puissance(a: Complex64, b: Complex64) -> Complex64 {
    let reels = a.im == 0.0 && b.im == 0.0;
    if reels && (a.re >= 0.0 || b.re.fract() == 0.0) {
        Complex64::new(a.re.powf(b.re), 0.0)
    } else {
        a.powc(b)
    }
}

fn factorielle(x: Complex64) -> Result<Complex64, ErreurCalcul> {
    if x.im != 0.0 || x.re < 0.0 || x.re.fract() != 0.0 {
        return Err(ErreurCalcul::syntaxe("factorielle d’un non-entier"));
    }
    if x.re > f64::from(FACTORIELLE_MAX) {
        return Ok(Complex64::new(f64::INFINITY, 0.0));
    }
    let n = x.re as u32;
    let produit = (2..=n).fold(1.0_f64, |acc, k| acc * f64::from(k));
    Ok(Complex64::new(produit, 0.0))
}

fn nettoyer(v: Complex64) -> Complex64 {
    let mut v = v;
    if v.im != 0.0 && v.im.abs() <= BRUIT_RELATIF * v.re.abs().max(1.0) {
        v.im = 0.0;
    }
    if v.re != 0.0 && v.im != 0.0 && v.re.abs() <= BRUIT_RELATIF * v.im.abs() {
        v.re = 0.0;
    }
    v
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::noyau::jetons::tokenize;
    use crate::noyau::reglages::Reglages;

    fn eval(s: &str) -> Complex64 {
        let t = tokenize(s, &Reglages::default()).unwrap_or_else(|e| panic!("{s}: {e}"));
        let rpn = to_rpn(&t).unwrap_or_else(|e| panic!("{s}: {e}"));
        eval_rpn(&rpn, &HashMap::new()).unwrap_or_else(|e| panic!("{s}: {e}"))
    }

    fn reel(s: &str) -> f64 {
        let v = eval(s);
        assert_eq!(v.im, 0.0, "{s} devrait être réel, obtenu {v}");
        v.re
    }

    #[test]
    fn precedences() {
        assert_eq!(reel("2+3*4"), 14.0);
        assert_eq!(reel("2^3^2"), 512.0);
        assert_eq!(reel("-2^2"), -4.0);
        assert_eq!(reel("2^-1"), 0.5);
        assert_eq!(reel("2*-3"), -6.0);
    }

    #[test]
    fn fonction_et_parentheses() {
        let rpn = to_rpn(&tokenize("sin(pi/2)", &Reglages::default()).unwrap_or_default())
            .unwrap_or_default();
        assert_eq!(
            rpn,
            vec![
                Rpn::Nom("pi".into()),
                Rpn::Nombre(2.0),
                Rpn::Divise,
                Rpn::Fonction(Fonction::Sin)
            ]
        );
        assert!((reel("sin(pi/2)") - 1.0).abs() < 1e-15);
    }

    #[test]
    fn multiplication_implicite() {
        assert_eq!(reel("2(3)"), 6.0);
        assert_eq!(reel("(1+1)(2+1)"), 6.0);
        assert!((reel("2pi") - 2.0 * std::f64::consts::PI).abs() < 1e-15);
    }

    #[test]
    fn postfixes() {
        assert_eq!(reel("5!"), 120.0);
        assert_eq!(reel("50%"), 0.5);
        assert_eq!(reel("3!+1"), 7.0);
    }

    #[test]
    fn division_par_zero_infinie() {
        assert_eq!(reel("1/0"), f64::INFINITY);
    }

    #[test]
    fn complexes() {
        let v = eval("sqrt(-4)");
        assert_eq!((v.re, v.im), (0.0, 2.0));
        let v = eval("i*i");
        assert_eq!((v.re, v.im), (-1.0, 0.0));
        let v = eval("3-2i");
        assert_eq!((v.re, v.im), (3.0, -2.0));
    }

    #[test]
    fn variables() {
        let mut vars = HashMap::new();
        vars.insert("X".to_string(), 3.0);
        let t = tokenize("X^2+1", &Reglages::default()).unwrap_or_default();
        let v = to_rpn(&t).and_then(|r| eval_rpn(&r, &vars));
        assert_eq!(v, Ok(Complex64::new(10.0, 0.0)));
    }

    #[test]
    fn erreurs() {
        let r = Reglages::default();
        for s in ["(1+2", "1+2)", "*3", "2+", "", "Y", "(-1)!", "1.5!"] {
            let res = tokenize(s, &r)
                .and_then(|t| to_rpn(&t))
                .and_then(|rpn| eval_rpn(&rpn, &HashMap::new()));
            assert!(res.is_err(), "{s:?} devrait échouer, obtenu {res:?}");
        }
    }
}
