// src/noyau/fonctions.rs
//
// Fonctions nommées communes aux deux moteurs (scalaire complexe + matriciel).
// - appliquer_reel : version réelle (NaN hors domaine)
// - appliquer_complexe : réelle si possible, sinon branche principale complexe

use num_complex::Complex64;

const DEG: f64 = std::f64::consts::PI / 180.0;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Fonction {
    Sin,
    Cos,
    Tan,
    Asin,
    Acos,
    Atan,
    // variantes en degrés
    Sind,
    Cosd,
    Tand,
    Asind,
    Acosd,
    Atand,
    Log,
    Ln,
    Sqrt,
    Cbrt,
    Abs,
    Exp,
    Det,
}

impl Fonction {
    pub const TOUTES: [Fonction; 19] = [
        Fonction::Sin,
        Fonction::Cos,
        Fonction::Tan,
        Fonction::Asin,
        Fonction::Acos,
        Fonction::Atan,
        Fonction::Sind,
        Fonction::Cosd,
        Fonction::Tand,
        Fonction::Asind,
        Fonction::Acosd,
        Fonction::Atand,
        Fonction::Log,
        Fonction::Ln,
        Fonction::Sqrt,
        Fonction::Cbrt,
        Fonction::Abs,
        Fonction::Exp,
        Fonction::Det,
    ];

    pub fn depuis_nom(nom: &str) -> Option<Self> {
        Self::TOUTES.into_iter().find(|f| f.nom() == nom)
    }

    pub const fn nom(self) -> &'static str {
        match self {
            Fonction::Sin => "sin",
            Fonction::Cos => "cos",
            Fonction::Tan => "tan",
            Fonction::Asin => "asin",
            Fonction::Acos => "acos",
            Fonction::Atan => "atan",
            Fonction::Sind => "sind",
            Fonction::Cosd => "cosd",
            Fonction::Tand => "tand",
            Fonction::Asind => "asind",
            Fonction::Acosd => "acosd",
            Fonction::Atand => "atand",
            Fonction::Log => "log",
            Fonction::Ln => "ln",
            Fonction::Sqrt => "sqrt",
            Fonction::Cbrt => "cbrt",
            Fonction::Abs => "abs",
            Fonction::Exp => "exp",
            Fonction::Det => "det",
        }
    }

    /// Sur une matrice, ces fonctions passent par la décomposition spectrale
    /// (les autres s’appliquent terme à terme).
    pub const fn est_spectrale(self) -> bool {
        matches!(self, Fonction::Sqrt | Fonction::Cbrt)
    }

    pub fn appliquer_reel(self, x: f64) -> f64 {
        match self {
            Fonction::Sin => x.sin(),
            Fonction::Cos => x.cos(),
            Fonction::Tan => x.tan(),
            Fonction::Asin => x.asin(),
            Fonction::Acos => x.acos(),
            Fonction::Atan => x.atan(),
            Fonction::Sind => (x * DEG).sin(),
            Fonction::Cosd => (x * DEG).cos(),
            Fonction::Tand => (x * DEG).tan(),
            Fonction::Asind => x.asin() / DEG,
            Fonction::Acosd => x.acos() / DEG,
            Fonction::Atand => x.atan() / DEG,
            Fonction::Log => x.log10(),
            Fonction::Ln => x.ln(),
            Fonction::Sqrt => x.sqrt(),
            Fonction::Cbrt => x.cbrt(),
            Fonction::Abs => x.abs(),
            Fonction::Exp => x.exp(),
            // déterminant d’un scalaire : le scalaire lui-même
            Fonction::Det => x,
        }
    }

    pub fn appliquer_complexe(self, z: Complex64) -> Complex64 {
        if z.im == 0.0 {
            let r = self.appliquer_reel(z.re);
            if !r.is_nan() || z.re.is_nan() {
                return Complex64::new(r, 0.0);
            }
        }

        match self {
            Fonction::Sin => z.sin(),
            Fonction::Cos => z.cos(),
            Fonction::Tan => z.tan(),
            Fonction::Asin => z.asin(),
            Fonction::Acos => z.acos(),
            Fonction::Atan => z.atan(),
            Fonction::Sind => (z * DEG).sin(),
            Fonction::Cosd => (z * DEG).cos(),
            Fonction::Tand => (z * DEG).tan(),
            Fonction::Asind => z.asin() / DEG,
            Fonction::Acosd => z.acos() / DEG,
            Fonction::Atand => z.atan() / DEG,
            Fonction::Log => z.ln() / std::f64::consts::LN_10,
            Fonction::Ln => z.ln(),
            Fonction::Sqrt => z.sqrt(),
            Fonction::Cbrt => z.powf(1.0 / 3.0),
            Fonction::Abs => Complex64::new(z.norm(), 0.0),
            Fonction::Exp => z.exp(),
            Fonction::Det => z,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn proche(a: f64, b: f64) -> bool {
        (a - b).abs() <= 1e-12 * (1.0 + a.abs().max(b.abs()))
    }

    #[test]
    fn noms_aller_retour() {
        for f in Fonction::TOUTES {
            assert_eq!(Fonction::depuis_nom(f.nom()), Some(f));
        }
        assert_eq!(Fonction::depuis_nom("sinh"), None);
    }

    #[test]
    fn degres() {
        assert!(proche(Fonction::Sind.appliquer_reel(30.0), 0.5));
        assert!(proche(Fonction::Asind.appliquer_reel(1.0), 90.0));
    }

    #[test]
    fn racine_negative_devient_complexe() {
        let z = Fonction::Sqrt.appliquer_complexe(Complex64::new(-4.0, 0.0));
        assert!(proche(z.re, 0.0) && proche(z.im, 2.0), "obtenu {z}");
    }

    #[test]
    fn reel_reste_reel() {
        let z = Fonction::Ln.appliquer_complexe(Complex64::new(std::f64::consts::E, 0.0));
        assert_eq!(z.im, 0.0);
        assert!(proche(z.re, 1.0));
    }
}
