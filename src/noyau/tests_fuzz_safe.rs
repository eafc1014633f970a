//! Tests fuzz safe : robustesse + déterminisme + limites contrôlées.
//!
//! But : marteler le solveur sans brûler la machine.
//! - RNG déterministe (seed fixe)
//! - profondeur bornée
//! - budget temps global
//! - invariant clé : le solveur ne panique jamais, toute erreur est typée

use std::time::{Duration, Instant};

use super::base::{convertir, degrouper, grouper_chiffres, Base};
use super::erreur::ErreurCalcul;
use super::reglages::Reglages;
use super::solveur::Solveur;

/* ------------------------ RNG déterministe minimal ------------------------ */

#[derive(Clone)]
struct Rng {
    state: u64,
}
impl Rng {
    fn new(seed: u64) -> Self {
        Self { state: seed }
    }
    fn next_u32(&mut self) -> u32 {
        // LCG simple (déterministe)
        self.state = self.state.wrapping_mul(6364136223846793005).wrapping_add(1);
        (self.state >> 32) as u32
    }
    fn pick(&mut self, n: u32) -> u32 {
        if n == 0 {
            0
        } else {
            self.next_u32() % n
        }
    }
    fn coin(&mut self) -> bool {
        (self.next_u32() & 1) == 1
    }
    fn next_i64(&mut self) -> i64 {
        (u64::from(self.next_u32()) << 32 | u64::from(self.next_u32())) as i64
    }
}

/* ------------------------ Budget anti-gel ------------------------ */

fn budget(start: Instant, max: Duration) {
    if start.elapsed() > max {
        panic!("budget temps dépassé: {:?}", max);
    }
}

/* ------------------------ Génération d’expressions (bornée) ------------------------ */

fn gen_nombre(rng: &mut Rng) -> String {
    match rng.pick(6) {
        0 => "0".to_string(),
        1 => format!("{}", rng.pick(10)),
        2 => format!("{}.{}", rng.pick(100), rng.pick(100)),
        3 => format!("{}", rng.pick(100_000)),
        4 => "pi".to_string(),
        _ => "e".to_string(),
    }
}

fn gen_fonction(rng: &mut Rng) -> &'static str {
    const F: [&str; 10] = ["sin", "cos", "tan", "asin", "ln", "log", "sqrt", "cbrt", "abs", "exp"];
    F[rng.pick(F.len() as u32) as usize]
}

fn gen_expr(rng: &mut Rng, depth: usize) -> String {
    if depth == 0 {
        return gen_nombre(rng);
    }

    match rng.pick(10) {
        0 => gen_nombre(rng),
        1 => format!("({}+{})", gen_expr(rng, depth - 1), gen_expr(rng, depth - 1)),
        2 => format!("({}−{})", gen_expr(rng, depth - 1), gen_expr(rng, depth - 1)),
        3 => format!("({}×{})", gen_expr(rng, depth - 1), gen_expr(rng, depth - 1)),
        4 => format!("({}÷{})", gen_expr(rng, depth - 1), gen_expr(rng, depth - 1)),
        5 => format!("{}^{}", gen_expr(rng, depth - 1), rng.pick(4)),
        6 => format!("{}({})", gen_fonction(rng), gen_expr(rng, depth - 1)),
        7 => format!("−{}", gen_expr(rng, depth - 1)),
        8 => format!("{}!", rng.pick(8)),
        _ => format!("{}%", gen_expr(rng, depth - 1)),
    }
}

fn gen_matrice(rng: &mut Rng, lignes: usize, colonnes: usize) -> String {
    let mut s = String::from("[");
    for _ in 0..lignes {
        s.push('[');
        for j in 0..colonnes {
            if j > 0 {
                s.push(',');
            }
            if rng.coin() {
                s.push('-');
            }
            s.push_str(&rng.pick(10).to_string());
        }
        s.push(']');
    }
    s.push(']');
    s
}

/// Bruit : morceaux d’expressions collés au hasard (souvent invalides).
fn gen_bruit(rng: &mut Rng) -> String {
    const MORCEAUX: [&str; 16] = [
        "1", "2.5", "+", "−", "×", "÷", "^", "(", ")", "[[", "]]", ",", "sin", "X", "!", "%",
    ];
    (0..rng.pick(12))
        .map(|_| MORCEAUX[rng.pick(MORCEAUX.len() as u32) as usize])
        .collect()
}

/* ------------------------ Tests ------------------------ */

#[test]
fn fuzz_safe_solveur_ne_panique_pas() {
    let t0 = Instant::now();
    let max = Duration::from_secs(5);

    let s = Solveur::default();
    let mut rng = Rng::new(0xC0FFEE_u64);

    let mut seen_ok = 0usize;
    let mut seen_err = 0usize;

    for _ in 0..300 {
        budget(t0, max);

        let expr = gen_expr(&mut rng, 4);
        let ev = s.evaluer(&expr);
        match ev.resultat {
            Ok(Some(r)) => {
                assert!(!r.is_empty(), "résultat vide: expr={expr:?}");
                seen_ok += 1;
            }
            Ok(None) => {}
            Err(ErreurCalcul::Syntaxe(_)) => seen_err += 1,
            Err(e) => panic!("erreur inattendue: expr={expr:?} err={e}"),
        }
    }

    // On veut voir un mix des deux, sinon le fuzz ne “balaye” rien.
    assert!(seen_ok > 50, "trop peu de succès: {seen_ok}");
    assert!(seen_err > 0, "aucune erreur vue: fuzz trop “sage”");
}

#[test]
fn fuzz_safe_determinisme() {
    let s = Solveur::default();
    let mut a = Rng::new(0xBADC0DE_u64);
    let mut b = Rng::new(0xBADC0DE_u64);

    for _ in 0..60 {
        let ea = gen_expr(&mut a, 3);
        let eb = gen_expr(&mut b, 3);
        assert_eq!(ea, eb);
        assert_eq!(s.evaluer(&ea), s.evaluer(&eb), "expr={ea:?}");
    }
}

#[test]
fn fuzz_safe_bruit_toujours_type() {
    let t0 = Instant::now();
    let max = Duration::from_secs(3);

    let s = Solveur::default();
    let mut rng = Rng::new(0xDEAD_BEEF_u64);

    for _ in 0..400 {
        budget(t0, max);
        let expr = gen_bruit(&mut rng);
        // seul compte : pas de panique, un résultat ou une erreur
        let _ = s.evaluer(&expr);
        let _ = s.contient_matrice(&expr);
    }
}

#[test]
fn fuzz_safe_matrices_formes() {
    let t0 = Instant::now();
    let max = Duration::from_secs(5);

    let s = Solveur::default();
    let mut rng = Rng::new(0x5EED_u64);

    for _ in 0..80 {
        budget(t0, max);

        let (m, n) = (1 + rng.pick(3) as usize, 1 + rng.pick(3) as usize);
        let (p, q) = (1 + rng.pick(3) as usize, 1 + rng.pick(3) as usize);
        let expr = format!("{}×{}", gen_matrice(&mut rng, m, n), gen_matrice(&mut rng, p, q));

        match s.evaluer(&expr).resultat {
            Ok(Some(r)) => {
                assert_eq!(n, p, "produit accepté malgré {m}x{n} × {p}x{q}: {expr}");
                assert_eq!(r.matches('[').count(), m + 1, "forme du résultat: {r}");
            }
            Err(ErreurCalcul::FormesIncompatibles { .. }) => {
                assert_ne!(n, p, "produit refusé à tort: {expr}");
            }
            autre => panic!("inattendu pour {expr}: {autre:?}"),
        }
    }
}

#[test]
fn fuzz_safe_bases_aller_retour() {
    let t0 = Instant::now();
    let max = Duration::from_secs(2);

    let r = Reglages::default();
    let mut rng = Rng::new(0xB17_u64);

    for _ in 0..500 {
        budget(t0, max);

        let v = rng.next_i64().unsigned_abs() >> rng.pick(60);
        let v = i64::try_from(v).unwrap_or(i64::MAX);
        let dec = v.to_string();
        for b in Base::TOUTES {
            let aller = convertir(&dec, Base::Decimale, b, &r)
                .unwrap_or_else(|e| panic!("{dec} -> {b:?}: {e}"));
            let retour = convertir(&aller, b, Base::Decimale, &r)
                .unwrap_or_else(|e| panic!("{aller} ({b:?}) -> dec: {e}"));
            assert_eq!(retour, dec);
        }
    }
}

#[test]
fn fuzz_safe_regroupement_idempotent() {
    let r = Reglages::default();
    let mut rng = Rng::new(0x6209_u64);

    for _ in 0..300 {
        let v = rng.next_i64().unsigned_abs() >> rng.pick(63);
        for b in Base::TOUTES {
            let brut = convertir(&v.min(i64::MAX as u64).to_string(), Base::Decimale, b, &r)
                .unwrap_or_default();
            let une = grouper_chiffres(&brut, b, &r);
            let deux = grouper_chiffres(&une, b, &r);
            assert_eq!(une, deux, "base {b:?}");
            assert_eq!(degrouper(&une, b, &r), brut, "base {b:?}");
        }
    }
}
