// src/noyau/format.rs
//
// Affichage des résultats
// - formater_g : notation "%g" (précision = chiffres significatifs), zéros inutiles retirés
// - precision_adaptative : plus grande précision qui tient dans la ligne (plancher 7)
// - composer_complexe : "3+2i", "3-i", "i", "-2i", "0"...
// - nombre_en_texte : cellules du moteur matriciel

use super::erreur::ErreurCalcul;
use super::reglages::{Reglages, INFINI, PRECISION_MIN};

/// Sous ce seuil (en valeur absolue) une cellule de matrice s’affiche "0".
const SEUIL_ZERO_MATRICE: f64 = 1e-10;

fn infini(v: f64) -> String {
    if v > 0.0 {
        INFINI.to_string()
    } else {
        format!("-{INFINI}")
    }
}

fn sans_zeros(s: &str) -> &str {
    if s.contains('.') {
        s.trim_end_matches('0').trim_end_matches('.')
    } else {
        s
    }
}

/// "%g" avec `precision` chiffres significatifs :
/// scientifique si l’exposant est < -4 ou >= precision, sinon fixe.
/// L’exposant s’écrit sans '+' ni zéros de tête (1e20, 1.5e-7).
pub fn formater_g(valeur: f64, precision: usize) -> Result<String, ErreurCalcul> {
    if valeur.is_nan() {
        return Err(ErreurCalcul::syntaxe("NaN"));
    }
    if valeur.is_infinite() {
        return Ok(infini(valeur));
    }
    if valeur == 0.0 {
        return Ok("0".to_string());
    }

    let precision = precision.max(1);
    let scientifique = format!("{:.*e}", precision - 1, valeur);
    let (mantisse, exposant) = scientifique
        .split_once('e')
        .ok_or_else(|| ErreurCalcul::syntaxe(format!("format inattendu: {scientifique}")))?;
    let exposant: i32 = exposant
        .parse()
        .map_err(|_| ErreurCalcul::syntaxe(format!("format inattendu: {scientifique}")))?;

    if exposant < -4 || exposant >= precision as i32 {
        Ok(format!("{}e{exposant}", sans_zeros(mantisse)))
    } else {
        let decimales = (precision as i32 - 1 - exposant).max(0) as usize;
        Ok(sans_zeros(&format!("{valeur:.decimales$}")).to_string())
    }
}

/// Essaie les précisions de `longueur_ligne` jusqu’à 7 ; garde la première
/// qui tient dans la ligne (sinon celle à 7). Le point devient celui de la locale.
pub fn precision_adaptative(valeur: f64, r: &Reglages) -> Result<String, ErreurCalcul> {
    let longueur = r.longueur_ligne.max(PRECISION_MIN);
    let mut texte = String::new();
    for precision in (PRECISION_MIN..=longueur).rev() {
        texte = formater_g(valeur, precision)?;
        if texte.chars().count() <= longueur {
            break;
        }
    }
    Ok(localiser_point(texte, r))
}

fn localiser_point(texte: String, r: &Reglages) -> String {
    if r.point_decimal == '.' {
        texte
    } else {
        texte.replace('.', &r.point_decimal.to_string())
    }
}

/// Assemble partie réelle et imaginaire (déjà formatées).
/// Les valeurs numériques servent aux tests de signe / de nullité.
pub fn composer_complexe(re: f64, im: f64, texte_re: &str, texte_im: &str) -> String {
    let un = |v: f64| v == 1.0;
    let moins_un = |v: f64| v == -1.0;

    match (re != 0.0, im != 0.0) {
        (true, true) if un(im) => format!("{texte_re}+i"),
        (true, true) if moins_un(im) => format!("{texte_re}-i"),
        (true, true) if im < 0.0 => format!("{texte_re}{texte_im}i"),
        (true, true) => format!("{texte_re}+{texte_im}i"),
        (true, false) => texte_re.to_string(),
        (false, true) if un(im) => "i".to_string(),
        (false, true) if moins_un(im) => "-i".to_string(),
        (false, true) => format!("{texte_im}i"),
        (false, false) => "0".to_string(),
    }
}

/// Cellule de matrice (ou scalaire du moteur matriciel) en décimal.
pub fn nombre_en_texte(x: f64, r: &Reglages) -> String {
    if x.is_infinite() {
        return infini(x);
    }
    if x.abs() < SEUIL_ZERO_MATRICE {
        return "0".to_string();
    }
    // rendu f64 le plus court sans arrondi : det[[1,2][3,4]] donne -2.0000000000000004
    let texte = if (1e-3..1e7).contains(&x.abs()) {
        format!("{x}")
    } else {
        format!("{x:e}")
    };
    localiser_point(texte, r)
}
