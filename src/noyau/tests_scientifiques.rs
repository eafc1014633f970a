//! Tests scientifiques (campagne) : invariants + robustesse + limites contrôlées.
//!
//! But : trouver les limites sans faire chauffer la machine.
//! - budget temps global
//! - tailles bornées (matrices 3x3 au plus, fenêtres de tracé courtes)
//!
//! Notes importantes (aligné avec l’état actuel du noyau) :
//! - Les conversions de base ne portent que sur des entiers signés 64 bits ;
//!   au-delà c’est un dépassement, pas une troncature silencieuse.
//! - Le moteur matriciel divise par pseudo-inverse : A÷B = A·B⁺, donc A÷A = I
//!   seulement pour A inversible.
//! - Le tracé omet les points non finis : la série a un trou, pas de valeur sentinelle.

use std::sync::mpsc;
use std::time::{Duration, Instant};

use nalgebra::DMatrix;

use super::algebre::{pseudo_inverse, Operande};
use super::base::{convertir, grouper_chiffres, Base};
use super::erreur::{ErreurCalcul, Forme};
use super::graphe::{echantillonner, segments, Demarrage, Echantillonneur, Fenetre};
use super::localisation::TableLocalisation;
use super::matrice;
use super::reglages::Reglages;
use super::solveur::Solveur;
use super::symboles::Symboles;

fn budget(start: Instant, max: Duration) {
    if start.elapsed() > max {
        panic!("budget temps dépassé: {:?}", max);
    }
}

fn resultat(s: &Solveur, expr: &str) -> String {
    match s.evaluer(expr).resultat {
        Ok(Some(r)) => r,
        autre => panic!("expr={expr:?} -> {autre:?}"),
    }
}

fn matrice_ok(expr: &str) -> DMatrix<f64> {
    match matrice::evaluer(expr, &Reglages::default()) {
        Ok(Operande::Matrice(m)) => m,
        autre => panic!("expr={expr:?} -> {autre:?}"),
    }
}

fn proche_identite(m: &DMatrix<f64>) -> bool {
    m.is_square() && (m - DMatrix::<f64>::identity(m.nrows(), m.ncols())).amax() < 1e-9
}

/* ------------------------ Bases ------------------------ */

#[test]
fn sci_bases_aller_retour_toutes_paires() {
    let t0 = Instant::now();
    let max = Duration::from_secs(2);
    let r = Reglages::default();

    let valeurs = ["0", "1", "2", "7", "10", "255", "4096", "123456789", "9223372036854775807"];
    for v in valeurs {
        for de in Base::TOUTES {
            for vers in Base::TOUTES {
                budget(t0, max);
                let a = convertir(v, Base::Decimale, de, &r)
                    .unwrap_or_else(|e| panic!("{v} -> {de:?}: {e}"));
                let b = convertir(&a, de, vers, &r).unwrap_or_else(|e| panic!("{a} -> {vers:?}: {e}"));
                let retour = convertir(&b, vers, Base::Decimale, &r)
                    .unwrap_or_else(|e| panic!("{b} -> DEC: {e}"));
                assert_eq!(retour, v, "{de:?} -> {vers:?}");
            }
        }
    }
}

#[test]
fn sci_bases_expression_entiere() {
    let r = Reglages::default();
    let hexa = convertir("12+34×5", Base::Decimale, Base::Hexadecimale, &r);
    assert_eq!(hexa, Ok("C+22×5".to_string()));
    let bin = convertir("C+22×5", Base::Hexadecimale, Base::Binaire, &r);
    assert_eq!(bin, Ok("1100+100010×101".to_string()));
}

#[test]
fn sci_bases_depassement_type() {
    let r = Reglages::default();
    let e = convertir("9223372036854775808", Base::Decimale, Base::Binaire, &r);
    assert!(matches!(e, Err(ErreurCalcul::Depassement(_))), "{e:?}");
}

#[test]
fn sci_regroupement_stable() {
    let r = Reglages::default();
    let cas = [
        (Base::Decimale, "1234567", "1,234,567"),
        (Base::Binaire, "101101", "10 1101"),
        (Base::Hexadecimale, "FFFFF", "F FF FF"),
    ];
    for (b, brut, attendu) in cas {
        let une = grouper_chiffres(brut, b, &r);
        assert_eq!(une, attendu, "{b:?}");
        assert_eq!(grouper_chiffres(&une, b, &r), une, "idempotence {b:?}");
    }
}

/* ------------------------ Solveur ------------------------ */

#[test]
fn sci_solveur_exemples_de_reference() {
    let mut s = Solveur::default();
    assert_eq!(resultat(&s, "2+3×4"), "14");
    assert_eq!(resultat(&s, "-i"), "-i");
    assert_eq!(resultat(&s, "3-2i"), "3-2i");
    assert_eq!(resultat(&s, "2^3^2"), "512");
    assert_eq!(resultat(&s, "5!"), "120");

    assert_eq!(s.changer_base("", Base::Hexadecimale), Ok(String::new()));
    assert_eq!(resultat(&s, "A+1"), "B");
    assert_eq!(resultat(&s, "FF×2"), "1FE");
}

#[test]
fn sci_solveur_degres() {
    let mut s = Solveur::default();
    s.activer_localisation(TableLocalisation::new().en_degres(true));
    let ev = s.evaluer("sin(90)");
    assert_eq!(ev.expression, "sind(90)");
    assert_eq!(ev.resultat, Ok(Some("1".into())));
}

#[test]
fn sci_solveur_longueur_de_ligne() {
    let mut s = Solveur::default();
    for longueur in [10, 14, 20] {
        s.set_longueur_ligne(longueur);
        let r = resultat(&s, "2/3");
        assert!(r.chars().count() <= longueur, "ligne {longueur}: {r}");
        assert!(r.starts_with("0.6"), "{r}");
    }
}

/* ------------------------ Matrices ------------------------ */

#[test]
fn sci_pseudo_inverse_identite() {
    for n in 1..=3 {
        let i = DMatrix::<f64>::identity(n, n);
        let p = pseudo_inverse(&i).unwrap_or_else(|e| panic!("pinv I{n}: {e}"));
        assert!(proche_identite(&p), "pinv(I{n}) = {p}");
    }
}

#[test]
fn sci_inverse_par_puissance() {
    let m = matrice_ok("[[2,1][1,3]]^-1×[[2,1][1,3]]");
    assert!(proche_identite(&m), "{m}");

    let m = matrice_ok("[[4,7][2,6]]÷[[4,7][2,6]]");
    assert!(proche_identite(&m), "{m}");
}

#[test]
fn sci_lois_de_forme() {
    let r = Reglages::default();
    assert_eq!(
        matrice::evaluer("[[1,2]]+[[1,2,3]]", &r),
        Err(ErreurCalcul::FormesIncompatibles {
            gauche: Forme::new(1, 2),
            droite: Forme::new(1, 3),
        })
    );
    assert_eq!(
        matrice::evaluer("[[1,2]]×[[1,2]]", &r),
        Err(ErreurCalcul::FormesIncompatibles {
            gauche: Forme::new(1, 2),
            droite: Forme::new(1, 2),
        })
    );
    assert_eq!(
        matrice::evaluer("det([[1,2,3][4,5,6]])", &r),
        Err(ErreurCalcul::NonCarree(Forme::new(2, 3)))
    );

    let produit = matrice_ok("[[1,2]]×[[1,2]]^T");
    assert_eq!(produit.shape(), (1, 1));
    assert_eq!(produit[(0, 0)], 5.0);
}

#[test]
fn sci_racine_spectrale() {
    // R·R = M suffit
    let m = matrice_ok("sqrt([[2,1][1,2]])");
    let carre = &m * &m;
    let attendu = DMatrix::from_row_slice(2, 2, &[2.0, 1.0, 1.0, 2.0]);
    assert!((carre - attendu).amax() < 1e-9);
}

/* ------------------------ Tracé ------------------------ */

#[test]
fn sci_trace_inverse_a_un_trou() {
    let t0 = Instant::now();
    let max = Duration::from_secs(3);

    let mut symboles = Symboles::new(Reglages::default());
    let fenetre = Fenetre::default();
    let points = echantillonner(&mut symboles, "X", "1/X", &fenetre, || false)
        .unwrap_or_else(|| panic!("échantillonnage refusé"));
    budget(t0, max);

    assert!(points.len() >= 1990, "{}", points.len());
    assert!(points.iter().all(|p| p.y.is_finite()));
    assert!(points.iter().all(|p| p.x.abs() > 1e-12), "x = 0 doit être omis");
    assert!(points.windows(2).all(|w| w[0].x < w[1].x));

    let morceaux = segments(&points, fenetre.pas());
    assert_eq!(morceaux.len(), 2, "le trou en 0 coupe la courbe");
}

#[test]
fn sci_trace_abandonne_a_la_destruction() {
    let t0 = Instant::now();
    let max = Duration::from_secs(2);

    let (tx, rx) = mpsc::channel();
    {
        let mut e = Echantillonneur::default();
        // deux millions de points : impossible à finir avant la destruction
        let fenetre = Fenetre {
            zoom: 1e-3,
            ..Fenetre::default()
        };
        let lance = e.demarrer("X^2", Base::Decimale, fenetre, move |pts| {
            let _ = tx.send(pts.len());
        });
        assert!(matches!(lance, Demarrage::Lance(_)));
    }
    budget(t0, max);
    assert!(rx.recv_timeout(Duration::from_millis(50)).is_err());
}
