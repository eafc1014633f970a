// src/noyau/matrice.rs
//
// Moteur matriciel
// ----------------
// Texte -> jetons -> descente récursive (précédence) -> Operande
//
// Grammaire (du moins lié au plus lié):
//   expression := terme (('+' | '-') terme)*
//   terme      := unaire (('×' | '÷') unaire)*
//   unaire     := ('-' | '+') unaire | puissance
//   puissance  := postfixe ('^' unaire)?          (associatif à droite)
//   postfixe   := primaire ('!' | '%' | '^T')*
//   primaire   := nombre | pi | e | fonction argument | '(' expression ')' | matrice
//   matrice    := '[' ('[' expression (sep expression)* ']' sep?)+ ']'
//
// NOTE: -2^2 = -4, comme dans l’évaluateur scalaire.

use nalgebra::DMatrix;
use regex::Regex;
use tracing::{debug, trace};

use super::algebre::{self, Operande};
use super::base::{convertir, Base};
use super::erreur::ErreurCalcul;
use super::fonctions::Fonction;
use super::format::nombre_en_texte;
use super::jetons::{format_tokens, tokenize, Tok};
use super::reglages::Reglages;

/// Évalue une expression (décimale) contenant des littéraux matriciels.
pub fn evaluer(texte: &str, r: &Reglages) -> Result<Operande, ErreurCalcul> {
    let mut jetons = tokenize(texte, r)?;
    equilibrer_parentheses(&mut jetons)?;
    trace!(jetons = %format_tokens(&jetons), "moteur matriciel");

    let mut analyseur = Analyseur {
        jetons: &jetons,
        pos: 0,
    };
    let resultat = analyseur.expression()?;
    if let Some(t) = analyseur.courant() {
        return Err(ErreurCalcul::syntaxe(format!("jeton inattendu: {t:?}")));
    }
    if resultat.contient_nan() {
        return Err(ErreurCalcul::syntaxe("NaN"));
    }
    Ok(resultat)
}

/// Évalue dans la base active : conversion en décimal, calcul, retour dans la base.
pub fn evaluer_matrices(texte: &str, base: Base, r: &Reglages) -> Result<String, ErreurCalcul> {
    let decimal = convertir(texte, base, Base::Decimale, r)?;
    let resultat = evaluer(&decimal, r)?;
    debug!(forme = %resultat.forme(), "résultat matriciel");
    convertir(&en_texte(&resultat, r), Base::Decimale, base, r)
}

/// Scalaire -> nombre ; matrice -> "[[a,b][c,d]]" (séparateur de matrice des réglages).
pub fn en_texte(o: &Operande, r: &Reglages) -> String {
    match o {
        Operande::Scalaire(x) => nombre_en_texte(*x, r),
        Operande::Matrice(m) => ecrire_matrice(m, r),
    }
}

fn ecrire_matrice(m: &DMatrix<f64>, r: &Reglages) -> String {
    let mut s = String::from("[");
    for i in 0..m.nrows() {
        s.push('[');
        for j in 0..m.ncols() {
            if j > 0 {
                s.push(r.separateur_matrice);
            }
            s.push_str(&nombre_en_texte(m[(i, j)], r));
        }
        s.push(']');
    }
    s.push(']');
    s
}

/// Le texte contient-il un littéral matriciel complet ?
pub fn contient_matrice(texte: &str, r: &Reglages) -> bool {
    match motif_matrice(r) {
        Ok(re) => re.is_match(texte),
        Err(e) => {
            debug!(%e, "motif de matrice invalide");
            false
        }
    }
}

fn motif_matrice(r: &Reglages) -> Result<Regex, regex::Error> {
    let point = regex::escape(&r.point_decimal.to_string());
    let sep = regex::escape(&r.separateur_matrice.to_string());
    let valeur = format!("[−-]?[A-F0-9]*(?:{point}[A-F0-9]*)?");
    Regex::new(&format!(
        r"\[(?:\[{valeur}(?:{sep}{valeur})*\]{sep}?)+\]"
    ))
}

/// Une seule parenthèse fermante manquante est ajoutée ; tout autre
/// déséquilibre est une erreur.
fn equilibrer_parentheses(jetons: &mut Vec<Tok>) -> Result<(), ErreurCalcul> {
    let ouvertes = jetons.iter().filter(|t| **t == Tok::LPar).count() as i64;
    let fermees = jetons.iter().filter(|t| **t == Tok::RPar).count() as i64;
    match ouvertes - fermees {
        0 => Ok(()),
        1 => {
            jetons.push(Tok::RPar);
            Ok(())
        }
        n => Err(ErreurCalcul::syntaxe(format!("parenthèses déséquilibrées ({n})"))),
    }
}

/* ------------------------ Analyseur ------------------------ */

struct Analyseur<'a> {
    jetons: &'a [Tok],
    pos: usize,
}

impl Analyseur<'_> {
    fn courant(&self) -> Option<&Tok> {
        self.jetons.get(self.pos)
    }

    fn suivant(&self) -> Option<&Tok> {
        self.jetons.get(self.pos + 1)
    }

    fn consommer(&mut self, attendu: &Tok) -> bool {
        if self.courant() == Some(attendu) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn exiger(&mut self, attendu: &Tok) -> Result<(), ErreurCalcul> {
        if self.consommer(attendu) {
            Ok(())
        } else {
            Err(ErreurCalcul::syntaxe(format!(
                "{attendu:?} attendu, trouvé {:?}",
                self.courant()
            )))
        }
    }

    fn expression(&mut self) -> Result<Operande, ErreurCalcul> {
        let mut gauche = self.terme()?;
        loop {
            if self.consommer(&Tok::Plus) {
                gauche = algebre::additionner(gauche, self.terme()?)?;
            } else if self.consommer(&Tok::Minus) {
                gauche = algebre::soustraire(gauche, self.terme()?)?;
            } else {
                return Ok(gauche);
            }
        }
    }

    fn terme(&mut self) -> Result<Operande, ErreurCalcul> {
        let mut gauche = self.unaire()?;
        loop {
            if self.consommer(&Tok::Star) {
                gauche = algebre::multiplier(gauche, self.unaire()?)?;
            } else if self.consommer(&Tok::Slash) {
                gauche = algebre::diviser(gauche, self.unaire()?)?;
            } else {
                return Ok(gauche);
            }
        }
    }

    fn unaire(&mut self) -> Result<Operande, ErreurCalcul> {
        if self.consommer(&Tok::Minus) {
            Ok(algebre::negation(self.unaire()?))
        } else if self.consommer(&Tok::Plus) {
            self.unaire()
        } else {
            self.puissance()
        }
    }

    fn puissance(&mut self) -> Result<Operande, ErreurCalcul> {
        let base = self.postfixe()?;
        if self.consommer(&Tok::Caret) {
            let exposant = self.unaire()?;
            return algebre::puissance(base, exposant);
        }
        Ok(base)
    }

    fn postfixe(&mut self) -> Result<Operande, ErreurCalcul> {
        let mut valeur = self.primaire()?;
        loop {
            match self.courant() {
                Some(Tok::Bang) => {
                    self.pos += 1;
                    valeur = algebre::factorielle(valeur)?;
                }
                Some(Tok::Percent) => {
                    self.pos += 1;
                    valeur = algebre::multiplier(valeur, Operande::Scalaire(0.01))?;
                }
                Some(Tok::Caret) if matches!(self.suivant(), Some(Tok::Ident(n)) if n == "T") => {
                    self.pos += 2;
                    valeur = algebre::transposer(valeur);
                }
                _ => return Ok(valeur),
            }
        }
    }

    fn primaire(&mut self) -> Result<Operande, ErreurCalcul> {
        let jeton = self
            .courant()
            .cloned()
            .ok_or_else(|| ErreurCalcul::syntaxe("expression incomplète"))?;
        self.pos += 1;

        match jeton {
            Tok::Num(v) => Ok(Operande::Scalaire(v)),
            Tok::LPar => {
                let v = self.expression()?;
                self.exiger(&Tok::RPar)?;
                Ok(v)
            }
            Tok::LBrack => self.matrice(),
            Tok::Ident(nom) => match nom.as_str() {
                "pi" => Ok(Operande::Scalaire(std::f64::consts::PI)),
                "e" => Ok(Operande::Scalaire(std::f64::consts::E)),
                _ => match Fonction::depuis_nom(&nom) {
                    Some(f) => {
                        let argument = self.argument()?;
                        algebre::appliquer_fonction(f, argument)
                    }
                    None => Err(ErreurCalcul::syntaxe(format!("symbole inconnu: {nom}"))),
                },
            },
            autre => Err(ErreurCalcul::syntaxe(format!("jeton inattendu: {autre:?}"))),
        }
    }

    /// Argument de fonction : sin(...), sin 2, sin -2, det[[...]].
    fn argument(&mut self) -> Result<Operande, ErreurCalcul> {
        if self.consommer(&Tok::Minus) {
            Ok(algebre::negation(self.postfixe()?))
        } else {
            self.postfixe()
        }
    }

    /// '[' déjà consommé.
    fn matrice(&mut self) -> Result<Operande, ErreurCalcul> {
        let mut lignes: Vec<Vec<f64>> = Vec::new();
        loop {
            self.exiger(&Tok::LBrack)?;
            let mut ligne = Vec::new();
            loop {
                match self.expression()? {
                    Operande::Scalaire(v) => ligne.push(v),
                    Operande::Matrice(_) => {
                        return Err(ErreurCalcul::syntaxe("matrice dans une matrice"));
                    }
                }
                if !self.consommer(&Tok::Sep) {
                    break;
                }
            }
            self.exiger(&Tok::RBrack)?;
            lignes.push(ligne);

            // "][" ou "],["
            self.consommer(&Tok::Sep);
            if self.consommer(&Tok::RBrack) {
                return algebre::construire(lignes);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::noyau::erreur::Forme;

    fn r() -> Reglages {
        Reglages::default()
    }

    fn matrice(s: &str) -> DMatrix<f64> {
        match evaluer(s, &r()) {
            Ok(Operande::Matrice(m)) => m,
            autre => panic!("{s}: matrice attendue, obtenu {autre:?}"),
        }
    }

    fn scalaire(s: &str) -> f64 {
        match evaluer(s, &r()) {
            Ok(Operande::Scalaire(v)) => v,
            autre => panic!("{s}: scalaire attendu, obtenu {autre:?}"),
        }
    }

    fn proches(a: &DMatrix<f64>, b: &DMatrix<f64>) -> bool {
        a.shape() == b.shape() && (a - b).amax() < 1e-9
    }

    #[test]
    fn identite_inversee() {
        let m = matrice("[[1,0],[0,1]]^-1");
        assert!(proches(&m, &DMatrix::identity(2, 2)), "obtenu {m}");
    }

    #[test]
    fn lignes_sans_separateur() {
        let m = matrice("[[1,2][3,4]]");
        assert_eq!(m, DMatrix::from_row_slice(2, 2, &[1.0, 2.0, 3.0, 4.0]));
    }

    #[test]
    fn produit_non_conformable() {
        let e = evaluer("[[1,2,3]]×[[1,2]]", &r());
        assert_eq!(
            e,
            Err(ErreurCalcul::FormesIncompatibles {
                gauche: Forme::new(1, 3),
                droite: Forme::new(1, 2)
            })
        );
    }

    #[test]
    fn determinant_non_carre() {
        assert_eq!(
            evaluer("det([[1,2,3]])", &r()),
            Err(ErreurCalcul::NonCarree(Forme::new(1, 3)))
        );
    }

    #[test]
    fn transposee_et_produit() {
        let m = matrice("[[1,2]]^T×[[3,4]]");
        assert_eq!(m, DMatrix::from_row_slice(2, 2, &[3.0, 4.0, 6.0, 8.0]));
    }

    #[test]
    fn precedence_et_diffusion() {
        let m = matrice("2+[[1,2]]×3");
        assert_eq!(m, DMatrix::from_row_slice(1, 2, &[5.0, 8.0]));
        assert_eq!(scalaire("2^3^2"), 512.0);
        assert_eq!(scalaire("-2^2"), -4.0);
    }

    #[test]
    fn postfixes_et_fonctions() {
        assert_eq!(scalaire("3!+50%"), 6.5);
        let m = matrice("sqrt[[4,0][0,9]]");
        assert!(proches(&m, &DMatrix::from_row_slice(2, 2, &[2.0, 0.0, 0.0, 3.0])));
        let d = scalaire("det[[1,2][3,4]]");
        assert!((d + 2.0).abs() < 1e-12);
    }

    #[test]
    fn parenthese_manquante_reparee() {
        assert_eq!(scalaire("det([[2,0][0,2]]"), 4.0);
        assert!(evaluer("((det([[2]]", &r()).is_err());
        assert!(evaluer("det([[2]]))", &r()).is_err());
    }

    #[test]
    fn division_par_matrice() {
        let m = matrice("[[2,0][0,4]]/[[2,0][0,4]]");
        assert!(proches(&m, &DMatrix::identity(2, 2)));
        let m = matrice("1/[[2,0][0,4]]");
        assert!(proches(&m, &DMatrix::from_row_slice(2, 2, &[0.5, 0.0, 0.0, 0.25])));
    }

    #[test]
    fn nan_refuse() {
        assert!(evaluer("ln([[-1]])", &r()).is_err());
    }

    #[test]
    fn lignes_inegales() {
        assert!(evaluer("[[1,2][3]]", &r()).is_err());
    }

    #[test]
    fn serialisation() {
        let texte = evaluer_matrices("[[1,2][3,4]]×2", Base::Decimale, &r()).unwrap_or_default();
        assert_eq!(texte, "[[2,4][6,8]]");
        let hexa = evaluer_matrices("[[A,1]]+1", Base::Hexadecimale, &r()).unwrap_or_default();
        assert_eq!(hexa, "[[B,2]]");
    }

    #[test]
    fn detection() {
        assert!(contient_matrice("[[1,2][3,4]]", &r()));
        assert!(contient_matrice("det([[1,2],[3,4]])", &r()));
        assert!(contient_matrice("[[−1.5,2]]", &r()));
        assert!(!contient_matrice("1+2", &r()));
        assert!(!contient_matrice("[[1,2", &r()));
    }
}
