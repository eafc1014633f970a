// src/app.rs
//
// Calculatrice multibase : module App (racine)
// -------------------------------------------
// Rôle:
// - Déclarer les sous-modules (etat.rs + vue.rs)
// - Ré-exporter AppCalc (pour main.rs: use crate::app::AppCalc;)
// - Fournir l’impl eframe::App (compatible NATIF + WEB)
//
// Important:
// - Enter / ↑ / ↓ sont gérés dans vue.rs (quand le champ a le focus).
// - Les points du tracé arrivent d’un autre fil : on les relève à chaque frame,
//   le fil demande lui-même un repaint à la livraison.

pub mod etat;
pub mod vue;

// Ré-export pratique : `use crate::app::AppCalc;`
pub use etat::AppCalc;

use eframe::egui;

impl eframe::App for AppCalc {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // ESC = effacer seulement l’entrée (comme bouton "C").
        let esc = ctx.input(|i| i.key_pressed(egui::Key::Escape));
        if esc {
            self.clear_entree();
        }

        self.recevoir_points();

        egui::CentralPanel::default().show(ctx, |ui| {
            self.ui(ui);
        });
    }
}
