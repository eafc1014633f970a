// src/noyau/algebre.rs
//
// Opérations du moteur matriciel sur des opérandes scalaire / matrice.
// - arithmétique avec diffusion des scalaires
// - inverse = pseudo-inverse (SVD), donc définie aussi pour les matrices singulières
// - puissances entières par carrés successifs
// - fonctions spectrales : V · f(Λ) · V⁻¹

use nalgebra::{DMatrix, DVector};

use super::erreur::{ErreurCalcul, Forme};
use super::fonctions::Fonction;

/// Valeurs singulières sous ce seuil : traitées comme nulles (pseudo-inverse).
const EPSILON_PINV: f64 = 1e-12;

/// Deux valeurs propres plus proches (relativement) forment une valeur multiple.
const TOLERANCE_PROPRE: f64 = 1e-9;

#[derive(Clone, Debug, PartialEq)]
pub enum Operande {
    Scalaire(f64),
    Matrice(DMatrix<f64>),
}

impl Operande {
    pub fn forme(&self) -> Forme {
        match self {
            Operande::Scalaire(_) => Forme::new(1, 1),
            Operande::Matrice(m) => forme(m),
        }
    }

    pub fn contient_nan(&self) -> bool {
        match self {
            Operande::Scalaire(x) => x.is_nan(),
            Operande::Matrice(m) => m.iter().any(|x| x.is_nan()),
        }
    }
}

fn forme(m: &DMatrix<f64>) -> Forme {
    Forme::new(m.nrows(), m.ncols())
}

fn incompatibles(a: &DMatrix<f64>, b: &DMatrix<f64>) -> ErreurCalcul {
    ErreurCalcul::FormesIncompatibles {
        gauche: forme(a),
        droite: forme(b),
    }
}

fn exiger_carree(m: &DMatrix<f64>) -> Result<(), ErreurCalcul> {
    if m.is_square() {
        Ok(())
    } else {
        Err(ErreurCalcul::NonCarree(forme(m)))
    }
}

/// Lignes lues dans un littéral -> matrice. Toutes les lignes ont la même longueur.
pub fn construire(lignes: Vec<Vec<f64>>) -> Result<Operande, ErreurCalcul> {
    let nb = lignes.len();
    let colonnes = lignes.first().map_or(0, Vec::len);
    if nb == 0 || colonnes == 0 || lignes.iter().any(|l| l.len() != colonnes) {
        return Err(ErreurCalcul::syntaxe("lignes de matrice de longueurs différentes"));
    }
    let donnees: Vec<f64> = lignes.into_iter().flatten().collect();
    Ok(Operande::Matrice(DMatrix::from_row_slice(nb, colonnes, &donnees)))
}

/* ------------------------ Arithmétique ------------------------ */

pub fn additionner(a: Operande, b: Operande) -> Result<Operande, ErreurCalcul> {
    use Operande::*;
    match (a, b) {
        (Scalaire(x), Scalaire(y)) => Ok(Scalaire(x + y)),
        (Matrice(m), Scalaire(s)) | (Scalaire(s), Matrice(m)) => Ok(Matrice(m.add_scalar(s))),
        (Matrice(a), Matrice(b)) => {
            if a.shape() != b.shape() {
                return Err(incompatibles(&a, &b));
            }
            Ok(Matrice(a + b))
        }
    }
}

pub fn soustraire(a: Operande, b: Operande) -> Result<Operande, ErreurCalcul> {
    use Operande::*;
    match (a, b) {
        (Scalaire(x), Scalaire(y)) => Ok(Scalaire(x - y)),
        (Matrice(m), Scalaire(s)) => Ok(Matrice(m.add_scalar(-s))),
        (Scalaire(s), Matrice(m)) => Ok(Matrice((-m).add_scalar(s))),
        (Matrice(a), Matrice(b)) => {
            if a.shape() != b.shape() {
                return Err(incompatibles(&a, &b));
            }
            Ok(Matrice(a - b))
        }
    }
}

pub fn multiplier(a: Operande, b: Operande) -> Result<Operande, ErreurCalcul> {
    use Operande::*;
    match (a, b) {
        (Scalaire(x), Scalaire(y)) => Ok(Scalaire(x * y)),
        (Matrice(m), Scalaire(s)) | (Scalaire(s), Matrice(m)) => Ok(Matrice(m * s)),
        (Matrice(a), Matrice(b)) => produit(&a, &b).map(Matrice),
    }
}

fn produit(a: &DMatrix<f64>, b: &DMatrix<f64>) -> Result<DMatrix<f64>, ErreurCalcul> {
    if a.ncols() != b.nrows() {
        return Err(incompatibles(a, b));
    }
    Ok(a * b)
}

/// a / b = a · pinv(b) ; s / M = pinv(M) · s.
pub fn diviser(a: Operande, b: Operande) -> Result<Operande, ErreurCalcul> {
    use Operande::*;
    match (a, b) {
        (Scalaire(x), Scalaire(y)) => Ok(Scalaire(x / y)),
        (Matrice(m), Scalaire(s)) => Ok(Matrice(m / s)),
        (Scalaire(s), Matrice(m)) => Ok(Matrice(pseudo_inverse(&m)? * s)),
        (Matrice(a), Matrice(b)) => {
            if a.ncols() != b.ncols() {
                return Err(incompatibles(&a, &b));
            }
            produit(&a, &pseudo_inverse(&b)?).map(Matrice)
        }
    }
}

pub fn negation(a: Operande) -> Operande {
    match a {
        Operande::Scalaire(x) => Operande::Scalaire(-x),
        Operande::Matrice(m) => Operande::Matrice(-m),
    }
}

pub fn transposer(a: Operande) -> Operande {
    match a {
        Operande::Matrice(m) => Operande::Matrice(m.transpose()),
        s => s,
    }
}

pub fn factorielle(a: Operande) -> Result<Operande, ErreurCalcul> {
    match a {
        Operande::Scalaire(x) if x >= 0.0 && x.fract() == 0.0 => {
            let n = x.min(171.0) as u32;
            Ok(Operande::Scalaire(
                (2..=n).fold(1.0_f64, |acc, k| acc * f64::from(k)),
            ))
        }
        Operande::Scalaire(_) => Err(ErreurCalcul::syntaxe("factorielle d’un non-entier")),
        Operande::Matrice(_) => Err(ErreurCalcul::syntaxe("factorielle d’une matrice")),
    }
}

pub fn pseudo_inverse(m: &DMatrix<f64>) -> Result<DMatrix<f64>, ErreurCalcul> {
    m.clone()
        .pseudo_inverse(EPSILON_PINV)
        .map_err(|e| ErreurCalcul::syntaxe(format!("pseudo-inverse: {e}")))
}

/* ------------------------ Puissances ------------------------ */

/// - M ^ entier : carrés successifs (0 => identité, négatif => pseudo-inverse)
/// - M ^ réel : spectrale sur |λ| (jamais de NaN pour une valeur propre négative)
/// - s ^ M : exponentielle spectrale (s^λ)
/// - M ^ M : refusé
pub fn puissance(a: Operande, b: Operande) -> Result<Operande, ErreurCalcul> {
    use Operande::*;
    match (a, b) {
        (Scalaire(x), Scalaire(y)) => Ok(Scalaire(x.powf(y))),
        (Matrice(m), Scalaire(y)) => {
            exiger_carree(&m)?;
            if y.fract() == 0.0 {
                puissance_entiere(m, y).map(Matrice)
            } else {
                spectrale(&m, |l| l.abs().powf(y)).map(Matrice)
            }
        }
        (Scalaire(s), Matrice(m)) => {
            exiger_carree(&m)?;
            spectrale(&m, |l| s.powf(l)).map(Matrice)
        }
        (Matrice(_), Matrice(_)) => Err(ErreurCalcul::syntaxe("matrice élevée à une matrice")),
    }
}

// exponentiation rapide, dans l’esprit de rational_pow_int
fn puissance_entiere(m: DMatrix<f64>, n: f64) -> Result<DMatrix<f64>, ErreurCalcul> {
    if n.abs() > u64::MAX as f64 {
        return Err(ErreurCalcul::syntaxe("exposant trop grand"));
    }

    let mut base = if n < 0.0 { pseudo_inverse(&m)? } else { m };
    let mut e = n.abs() as u64;
    let mut acc = DMatrix::<f64>::identity(base.nrows(), base.ncols());

    while e > 0 {
        if e & 1 == 1 {
            acc = &acc * &base;
        }
        e >>= 1;
        if e > 0 {
            base = &base * &base;
        }
    }
    Ok(acc)
}

/* ------------------------ Fonctions ------------------------ */

pub fn appliquer_fonction(f: Fonction, a: Operande) -> Result<Operande, ErreurCalcul> {
    let resultat = match (f, a) {
        (Fonction::Det, Operande::Matrice(m)) => {
            exiger_carree(&m)?;
            Operande::Scalaire(m.determinant())
        }
        (f, Operande::Scalaire(x)) => Operande::Scalaire(f.appliquer_reel(x)),
        (f, Operande::Matrice(m)) if f.est_spectrale() => {
            exiger_carree(&m)?;
            // racine carrée prise sur le module de la valeur propre
            let g = |l: f64| match f {
                Fonction::Sqrt => l.abs().sqrt(),
                _ => f.appliquer_reel(l),
            };
            Operande::Matrice(spectrale(&m, g)?)
        }
        (f, Operande::Matrice(m)) => Operande::Matrice(m.map(|x| f.appliquer_reel(x))),
    };

    if resultat.contient_nan() {
        return Err(ErreurCalcul::syntaxe(format!("{}: NaN", f.nom())));
    }
    Ok(resultat)
}

fn est_symetrique(m: &DMatrix<f64>) -> bool {
    m.is_square() && (m - m.transpose()).amax() <= EPSILON_PINV * m.amax().max(1.0)
}

/// f(M) = V · diag(f(λ)) · V⁻¹.
///
/// Valeurs propres complexes ou matrice non diagonalisable : erreur.
pub fn spectrale(m: &DMatrix<f64>, f: impl Fn(f64) -> f64) -> Result<DMatrix<f64>, ErreurCalcul> {
    if est_symetrique(m) {
        let eig = m.clone().symmetric_eigen();
        let d = DMatrix::from_diagonal(&eig.eigenvalues.map(&f));
        return Ok(&eig.eigenvectors * d * eig.eigenvectors.transpose());
    }

    let valeurs = m
        .eigenvalues()
        .ok_or_else(|| ErreurCalcul::syntaxe("valeurs propres complexes"))?;
    let (vecteurs, propres) = vecteurs_propres(m, &valeurs)?;
    let inverse = vecteurs
        .clone()
        .try_inverse()
        .ok_or_else(|| ErreurCalcul::syntaxe("matrice non diagonalisable"))?;

    let d = DMatrix::from_diagonal(&propres.map(&f));
    Ok(vecteurs * d * inverse)
}

/// Vecteurs propres = noyau de (M − λI), lu dans la SVD (valeurs singulières
/// les plus petites). Une valeur de multiplicité k donne k vecteurs.
fn vecteurs_propres(
    m: &DMatrix<f64>,
    valeurs: &DVector<f64>,
) -> Result<(DMatrix<f64>, DVector<f64>), ErreurCalcul> {
    let n = m.nrows();
    let mut triees: Vec<f64> = valeurs.iter().copied().collect();
    triees.sort_by(f64::total_cmp);
    let echelle = m.amax().max(1.0);

    let mut colonnes: Vec<DVector<f64>> = Vec::with_capacity(n);
    let mut propres: Vec<f64> = Vec::with_capacity(n);

    let mut i = 0;
    while i < triees.len() {
        let lambda = triees[i];
        let mut k = 1;
        while i + k < triees.len() && (triees[i + k] - lambda).abs() <= TOLERANCE_PROPRE * echelle {
            k += 1;
        }

        let decalee = m - DMatrix::<f64>::identity(n, n) * lambda;
        let svd = decalee.svd(false, true);
        let v_t = svd
            .v_t
            .ok_or_else(|| ErreurCalcul::syntaxe("décomposition en valeurs singulières"))?;

        let mut ordre: Vec<usize> = (0..svd.singular_values.len()).collect();
        ordre.sort_by(|&a, &b| svd.singular_values[a].total_cmp(&svd.singular_values[b]));
        for &j in ordre.iter().take(k) {
            colonnes.push(v_t.row(j).transpose());
            propres.push(lambda);
        }
        i += k;
    }

    Ok((DMatrix::from_columns(&colonnes), DVector::from_vec(propres)))
}
