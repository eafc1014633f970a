// src/app/vue.rs
//
// Vue (UI egui) : natif + web
// ---------------------------
// Objectifs :
// - Même AppCalc (etat.rs) pour natif + wasm
// - Clavier : Enter valide, ↑/↓ parcourent l’historique (quand le champ est focus)
// - Tactile : gros boutons, focus redonné après clic (focus_entree)
// - Résultat en direct à chaque modification, erreurs seulement sur "="
//
// Note :
// - singleline perd le focus sur Enter : on teste lost_focus() + Enter.
// - En wasm32 pas de fil : le tracé est calculé sur place.

use eframe::egui;

use super::etat::{AppCalc, ETENDUE_MAX, ETENDUE_MIN};
use crate::noyau::affichage::{ajouter_separateurs, remplacer_moins};
use crate::noyau::base::degrouper;
use crate::noyau::graphe::segments;
use crate::noyau::Base;

#[cfg(not(target_arch = "wasm32"))]
use crate::noyau::graphe::Demarrage;

#[cfg(target_arch = "wasm32")]
use crate::noyau::graphe::{doit_echantillonner, echantillonner};

impl AppCalc {
    /// UI principale : à appeler depuis eframe::App::update(...)
    pub fn ui(&mut self, ui: &mut egui::Ui) {
        // Densité “calc”
        ui.spacing_mut().item_spacing = egui::vec2(6.0, 6.0);

        egui::ScrollArea::vertical()
            .auto_shrink([false, false])
            .show(ui, |ui| {
                ui.heading("Calculatrice multibase");
                ui.add_space(6.0);

                self.ui_bases(ui);
                self.ui_entree(ui);

                ui.add_space(8.0);
                ui.separator();
                ui.add_space(8.0);

                self.ui_pave(ui);

                ui.add_space(8.0);
                ui.separator();
                ui.add_space(8.0);

                self.ui_historique(ui);
                self.ui_trace(ui);
            });
    }

    fn ui_bases(&mut self, ui: &mut egui::Ui) {
        ui.horizontal(|ui| {
            ui.label("Base :");
            for b in Base::TOUTES {
                let active = self.solveur.base() == b;
                if ui.selectable_label(active, b.nom()).clicked() && !active {
                    self.changer_base(ui.ctx(), b);
                }
            }
        });
    }

    fn ui_entree(&mut self, ui: &mut egui::Ui) {
        ui.label("Entrée :");

        // IMPORTANT : id stable + focus contrôlé
        let resp = ui.add(
            egui::TextEdit::singleline(&mut self.entree)
                .desired_width(ui.available_width())
                .hint_text("Ex: 2+3×4, sin(X), [[1,2][3,4]]^T")
                .id_source("entree_edit")
                .code_editor(),
        );

        if self.focus_entree {
            resp.request_focus();
            self.focus_entree = false;
        }

        if resp.changed() {
            self.apres_edition(ui.ctx());
        }

        let (enter, haut, bas) = ui.input(|i| {
            (
                i.key_pressed(egui::Key::Enter),
                i.key_pressed(egui::Key::ArrowUp),
                i.key_pressed(egui::Key::ArrowDown),
            )
        });
        if resp.lost_focus() && enter {
            self.valider(ui.ctx());
        }
        if resp.has_focus() && (haut || bas) {
            let rappel = if haut {
                self.rappel_precedent()
            } else {
                self.rappel_suivant()
            };
            if rappel {
                self.apres_edition(ui.ctx());
            }
        }

        ui.add_space(6.0);

        // Résultat en direct (ou erreur du dernier "=")
        let resultat = if self.resultat.is_empty() {
            " ".to_string()
        } else {
            format!("= {}", remplacer_moins(&self.resultat))
        };
        Self::champ_monospace(ui, "resultat_out", &resultat, 1);

        if !self.erreur.is_empty() {
            ui.add_space(6.0);
            ui.colored_label(ui.visuals().error_fg_color, &self.erreur);
        }
    }

    fn ui_pave(&mut self, ui: &mut egui::Ui) {
        ui.horizontal(|ui| {
            // Contrat: C = entrée seulement ; CLR = résultats seulement ; AC = tout
            self.bouton_action(ui, "C", "Efface seulement l’entrée", Action::ClearEntree);
            self.bouton_action(ui, "CLR", "Efface résultat + erreur", Action::ClearResultats);
            self.bouton_action(
                ui,
                "AC",
                "Remise à zéro totale (historique et tracé compris)",
                Action::ResetTotal,
            );
            self.bouton_action(ui, "DEL", "Efface le dernier symbole", Action::Backspace);
        });

        ui.add_space(6.0);

        // Fonctions, constantes, matrices
        ui.horizontal_wrapped(|ui| {
            for (label, texte) in [
                ("sin", "sin("),
                ("cos", "cos("),
                ("tan", "tan("),
                ("ln", "ln("),
                ("log", "log("),
                ("√", "sqrt("),
                ("det", "det("),
                ("!", "!"),
                ("%", "%"),
                ("π", "π"),
                ("e", "e"),
                ("i", "i"),
                ("X", "X"),
                ("[", "["),
                ("]", "]"),
                ("ᵀ", "^T"),
            ] {
                self.bouton_insert(ui, label, texte);
            }
            let sep = self.solveur.reglages().separateur_matrice.to_string();
            self.bouton_insert(ui, &sep, &sep);
        });

        ui.add_space(6.0);

        let point = self.solveur.reglages().point_decimal.to_string();
        egui::Grid::new("pave_multibase")
            .num_columns(6)
            .spacing([6.0, 6.0])
            .show(ui, |ui| {
                for c in ['A', 'B', 'C', 'D', 'E', 'F'] {
                    self.bouton_chiffre(ui, c);
                }
                ui.end_row();

                for c in ['7', '8', '9'] {
                    self.bouton_chiffre(ui, c);
                }
                self.bouton_insert(ui, "÷", "÷");
                self.bouton_insert(ui, "(", "(");
                self.bouton_insert(ui, ")", ")");
                ui.end_row();

                for c in ['4', '5', '6'] {
                    self.bouton_chiffre(ui, c);
                }
                self.bouton_insert(ui, "×", "×");
                self.bouton_insert(ui, "^", "^");
                ui.label("");
                ui.end_row();

                for c in ['1', '2', '3'] {
                    self.bouton_chiffre(ui, c);
                }
                self.bouton_insert(ui, "−", "−");
                ui.label("");
                ui.label("");
                ui.end_row();

                self.bouton_chiffre(ui, '0');
                self.bouton_insert(ui, &point, &point);
                ui.label("");
                self.bouton_insert(ui, "+", "+");
                ui.label("");
                let eq = ui.add_sized([46.0, 28.0], egui::Button::new("="));
                if eq.clicked() {
                    self.valider(ui.ctx());
                }
                ui.end_row();
            });
    }

    fn ui_historique(&mut self, ui: &mut egui::Ui) {
        egui::CollapsingHeader::new(format!("Historique ({})", self.historique.len()))
            .default_open(false)
            .show(ui, |ui| {
                let mut choisie = None;
                for e in self.historique.entrees() {
                    let texte = format!("{} = {}", e.expression, e.resultat);
                    let bouton = egui::Button::new(egui::RichText::new(texte).monospace()).frame(false);
                    if ui.add(bouton).clicked() {
                        choisie = Some(e.expression.clone());
                    }
                }
                if let Some(expression) = choisie {
                    self.rappel_expression(expression);
                    self.apres_edition(ui.ctx());
                }

                if !self.historique.is_empty() && ui.button("Effacer l’historique").clicked() {
                    self.historique.effacer();
                }
            });
    }

    fn ui_trace(&mut self, ui: &mut egui::Ui) {
        egui::CollapsingHeader::new("Tracé")
            .default_open(true)
            .show(ui, |ui| {
                ui.horizontal(|ui| {
                    ui.label(format!("Variable : {}", self.solveur.reglages().variable));
                    ui.separator();
                    let mut etendue = self.etendue();
                    let resp = ui.add(
                        egui::Slider::new(&mut etendue, ETENDUE_MIN..=ETENDUE_MAX)
                            .logarithmic(true)
                            .text("étendue"),
                    );
                    if resp.changed() {
                        self.set_etendue(etendue);
                        // même équation, autre fenêtre : on relance
                        self.equation_tracee.clear();
                        self.lancer_trace(ui.ctx());
                    }
                });

                let taille = egui::vec2(ui.available_width(), 260.0);
                let (resp, painter) = ui.allocate_painter(taille, egui::Sense::hover());
                let rect = resp.rect;
                painter.rect_filled(rect, 0.0, ui.visuals().extreme_bg_color);
                let painter = painter.with_clip_rect(rect);

                let f = self.fenetre;
                let hauteur = f.max_y - f.min_y;
                let vers_ecran = |x: f64, y: f64| {
                    // borne y : une asymptote ne doit pas sortir de la plage f32
                    let y = y.clamp(f.min_y - hauteur, f.max_y + hauteur);
                    egui::pos2(
                        rect.min.x + ((x - f.min_x) / (f.max_x - f.min_x)) as f32 * rect.width(),
                        rect.max.y - ((y - f.min_y) / hauteur) as f32 * rect.height(),
                    )
                };

                let axes = egui::Stroke::new(1.0, ui.visuals().weak_text_color());
                painter.line_segment([vers_ecran(f.min_x, 0.0), vers_ecran(f.max_x, 0.0)], axes);
                painter.line_segment([vers_ecran(0.0, f.min_y), vers_ecran(0.0, f.max_y)], axes);

                let courbe = egui::Stroke::new(1.5, ui.visuals().selection.bg_fill);
                for morceau in segments(&self.points, f.pas()) {
                    for w in morceau.windows(2) {
                        painter.line_segment(
                            [vers_ecran(w[0].x, w[0].y), vers_ecran(w[1].x, w[1].y)],
                            courbe,
                        );
                    }
                }
            });
    }

    fn champ_monospace(ui: &mut egui::Ui, id: &str, contenu: &str, rows: usize) {
        // Affichage lecture seule “stable”, sans TextEdit interactif.
        egui::Frame::group(ui.style())
            .fill(ui.visuals().extreme_bg_color)
            .show(ui, |ui| {
                ui.push_id(id, |ui| {
                    ui.set_min_width(ui.available_width());
                    ui.set_min_height(
                        rows as f32 * ui.text_style_height(&egui::TextStyle::Monospace),
                    );
                    ui.monospace(contenu);
                });
            });
    }

    /* ------------------------ Boutons ------------------------ */

    fn bouton_action(&mut self, ui: &mut egui::Ui, label: &str, tip: &str, action: Action) {
        let resp = ui
            .add_sized([56.0, 30.0], egui::Button::new(label))
            .on_hover_text(tip);

        if resp.clicked() {
            match action {
                Action::ClearEntree => self.clear_entree(),
                Action::ClearResultats => self.clear_resultats(),
                Action::ResetTotal => self.reset_total(),
                Action::Backspace => {
                    self.backspace_entree();
                    self.apres_edition(ui.ctx());
                }
            }
            self.focus_entree = true;
        }
    }

    /// Chiffre : actif seulement s’il existe dans la base courante.
    fn bouton_chiffre(&mut self, ui: &mut egui::Ui, c: char) {
        let actif = self.solveur.base().est_chiffre(c);
        let resp = ui.add_enabled(actif, egui::Button::new(c.to_string()).min_size(egui::vec2(46.0, 28.0)));
        if resp.clicked() {
            self.entree.push(c);
            self.apres_edition(ui.ctx());
            self.focus_entree = true;
        }
    }

    fn bouton_insert(&mut self, ui: &mut egui::Ui, label: &str, to_insert: &str) {
        let resp = ui.add_sized([46.0, 28.0], egui::Button::new(label));
        if resp.clicked() && !to_insert.is_empty() {
            self.entree.push_str(to_insert);
            self.apres_edition(ui.ctx());
            self.focus_entree = true;
        }
    }

    /// Backspace “intelligent” : retire d’un coup les motifs utiles ("sin(", "pi", etc.).
    fn backspace_entree(&mut self) {
        for pat in ["sqrt(", "sin(", "cos(", "tan(", "log(", "ln(", "det(", "^T", "pi"] {
            if let Some(reste) = self.entree.strip_suffix(pat) {
                let n = reste.len();
                self.entree.truncate(n);
                return;
            }
        }
        self.entree.pop();
    }

    /* ------------------------ Noyau ------------------------ */

    /// Texte tel que le solveur l’attend : sans séparateurs de groupe.
    fn entree_brute(&self) -> String {
        degrouper(self.entree.trim(), self.solveur.base(), self.solveur.reglages())
    }

    fn apres_edition(&mut self, ctx: &egui::Context) {
        self.evaluer_en_direct();
        self.lancer_trace(ctx);
    }

    /// Résultat en direct : une erreur de saisie en cours n’est pas montrée.
    fn evaluer_en_direct(&mut self) {
        let texte = self.entree_brute();
        match self.solveur.evaluer(&texte).resultat {
            Ok(Some(r)) => {
                let groupe = ajouter_separateurs(&r, self.solveur.base(), self.solveur.reglages());
                self.set_resultat(groupe);
            }
            Ok(None) | Err(_) => self.resultat.clear(),
        }
    }

    /// "=" : le résultat remplace l’entrée et rejoint l’historique.
    fn valider(&mut self, ctx: &egui::Context) {
        let texte = self.entree_brute();
        if texte.is_empty() {
            self.set_erreur("Entrée vide");
            return;
        }

        let evaluation = self.solveur.evaluer_et_consigner(&texte, &mut self.historique);
        match evaluation.resultat {
            Ok(Some(r)) => {
                self.entree = r;
                self.clear_resultats();
                self.lancer_trace(ctx);
            }
            Ok(None) => self.clear_resultats(),
            Err(e) => self.set_erreur(e.to_string()),
        }
        self.focus_entree = true;
    }

    fn changer_base(&mut self, ctx: &egui::Context, base: Base) {
        let texte = self.entree_brute();
        match self.solveur.changer_base(&texte, base) {
            Ok(converti) => {
                self.entree = converti;
                self.erreur.clear();
                self.apres_edition(ctx);
            }
            Err(e) => self.set_erreur(e.to_string()),
        }
        self.focus_entree = true;
    }

    /// (Re)lance le tracé si l’équation a changé depuis le dernier lancement.
    fn lancer_trace(&mut self, ctx: &egui::Context) {
        let equation = self.entree_brute();
        if equation == self.equation_tracee {
            return;
        }
        self.equation_tracee = equation.clone();

        #[cfg(not(target_arch = "wasm32"))]
        {
            let emetteur = self.emetteur.clone();
            let ctx = ctx.clone();
            let demarrage =
                self.echantillonneur
                    .demarrer(&equation, self.solveur.base(), self.fenetre, move |points| {
                        let _ = emetteur.send(points);
                        ctx.request_repaint();
                    });
            // Ignore : équation incomplète, on garde la dernière courbe
            if let Demarrage::Lance(poignee) = demarrage {
                tracing::trace!(generation = poignee.generation(), "tracé demandé");
            }
        }

        #[cfg(target_arch = "wasm32")]
        {
            if !doit_echantillonner(&equation, self.solveur.reglages()) {
                return;
            }
            let Ok(decimal) = self.solveur.convertir_en_decimal(&equation) else {
                return;
            };
            let mut evaluateur = self.solveur.evaluateur().clone();
            let variable = self.solveur.reglages().variable.clone();
            if let Some(points) =
                echantillonner(&mut evaluateur, &variable, &decimal, &self.fenetre, || false)
            {
                let _ = self.emetteur.send(points);
                ctx.request_repaint();
            }
        }
    }
}

#[derive(Clone, Copy, Debug)]
enum Action {
    ClearEntree,
    ClearResultats,
    ResetTotal,
    Backspace,
}
