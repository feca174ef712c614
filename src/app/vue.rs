// src/app/vue.rs
//
// Vue (UI egui) - natif + web
// ---------------------------
// Objectifs :
// - Même AppCalc (etat.rs) pour natif + wasm
// - Tactile : gros boutons, pavé 4 colonnes, "=" pleine largeur
// - Écran : ligne précédente + ligne principale (police auto si réglage actif)
// - Panneaux : Réglages (gauche) / Historique (droite, ou en ligne en paysage)
// - Un seul dialogue modal à la fois (séquenceur)
//
// La vue ne décide rien : elle lit l’état et appelle les actions de etat.rs.

use std::time::Duration;

use eframe::egui;

use super::etat::{AppCalc, Touche};
use super::flux::ActionConfirmee;
use crate::noyau::panneaux::Panneau;
use crate::noyau::stockage::VERSION_APP;

/// Police de la ligne principale (auto-ajustée entre ces bornes).
const TAILLE_ECRAN_MAX: f32 = 44.0;
const TAILLE_ECRAN_MIN: f32 = 18.0;

/// Largeur moyenne d’un glyphe monospace, en fraction de la taille.
const RATIO_GLYPHE: f32 = 0.62;

const HAUTEUR_TOUCHE: f32 = 54.0;
const ECART: f32 = 6.0;

/// Pavé : (libellé, touche).
const PAVE: [[(&str, Touche); 4]; 5] = [
    [
        ("C", Touche::Clear),
        ("(", Touche::Jeton('(')),
        (")", Touche::Jeton(')')),
        ("÷", Touche::Jeton('/')),
    ],
    [
        ("7", Touche::Jeton('7')),
        ("8", Touche::Jeton('8')),
        ("9", Touche::Jeton('9')),
        ("×", Touche::Jeton('*')),
    ],
    [
        ("4", Touche::Jeton('4')),
        ("5", Touche::Jeton('5')),
        ("6", Touche::Jeton('6')),
        ("−", Touche::Jeton('-')),
    ],
    [
        ("1", Touche::Jeton('1')),
        ("2", Touche::Jeton('2')),
        ("3", Touche::Jeton('3')),
        ("+", Touche::Jeton('+')),
    ],
    [
        ("%", Touche::Jeton('%')),
        ("0", Touche::Jeton('0')),
        (".", Touche::Jeton('.')),
        ("DEL", Touche::Del),
    ],
];

impl AppCalc {
    /// UI principale : à appeler depuis eframe::App::update(...)
    pub fn ui(&mut self, ctx: &egui::Context, maintenant: Duration) {
        // avant tout panneau : surface complète
        let zone = ctx.available_rect();
        self.panneaux.set_paysage(zone.width() > zone.height());

        self.ui_barre(ctx, maintenant);

        match self.panneaux.ouvert() {
            Panneau::Reglages => {
                egui::SidePanel::left("panneau_reglages")
                    .resizable(false)
                    .default_width(260.0)
                    .show(ctx, |ui| self.ui_reglages(ui));
            }
            Panneau::Historique => {
                egui::SidePanel::right("panneau_historique")
                    .resizable(false)
                    .default_width(280.0)
                    .show(ctx, |ui| self.ui_historique(ui));
            }
            Panneau::Aucun => {}
        }

        if self.panneaux.paysage() {
            egui::SidePanel::right("historique_en_ligne")
                .resizable(false)
                .default_width(zone.width() * 0.35)
                .show(ctx, |ui| self.ui_historique(ui));
        }

        egui::CentralPanel::default().show(ctx, |ui| {
            ui.spacing_mut().item_spacing = egui::vec2(ECART, ECART);
            self.ui_ecran(ui);
            ui.add_space(10.0);
            self.ui_pave(ui);

            if self.panneaux.fond_visible() {
                self.ui_fond(ui);
            }
        });

        self.ui_dialogue(ctx, maintenant);
    }

    fn ui_barre(&mut self, ctx: &egui::Context, maintenant: Duration) {
        egui::TopBottomPanel::top("barre").show(ctx, |ui| {
            ui.horizontal(|ui| {
                if ui.button("☰").on_hover_text("Settings").clicked() {
                    self.basculer_panneau(Panneau::Reglages, maintenant);
                }
                ui.label(egui::RichText::new("Calculator").strong());

                if !self.panneaux.paysage() {
                    ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                        if ui.button("History").clicked() {
                            self.basculer_panneau(Panneau::Historique, maintenant);
                        }
                    });
                }
            });
        });
    }

    /* ------------------------ Écran ------------------------ */

    fn ui_ecran(&mut self, ui: &mut egui::Ui) {
        let ecran = self.calc.ecran();
        let principal = ecran.principal().to_string();
        let mut precedent = egui::RichText::new(ecran.precedent()).monospace().size(16.0);
        if ecran.precedent_vide() {
            precedent = precedent.weak();
        }

        let largeur = ui.available_width();
        let taille = if self.reglages.auto_font {
            taille_auto(&principal, largeur)
        } else {
            TAILLE_ECRAN_MAX
        };

        egui::Frame::group(ui.style())
            .fill(ui.visuals().extreme_bg_color)
            .show(ui, |ui| {
                ui.set_min_width(ui.available_width());
                ui.with_layout(egui::Layout::top_down(egui::Align::Max), |ui| {
                    ui.label(precedent);
                    ui.label(egui::RichText::new(principal).monospace().size(taille));
                });
            });
    }

    /* ------------------------ Pavé ------------------------ */

    fn ui_pave(&mut self, ui: &mut egui::Ui) {
        let largeur = ((ui.available_width() - 3.0 * ECART) / 4.0).max(40.0);
        let mut appui = None;

        egui::Grid::new("pave_tactile")
            .num_columns(4)
            .spacing([ECART, ECART])
            .show(ui, |ui| {
                for rangee in PAVE {
                    for (label, touche) in rangee {
                        let b = egui::Button::new(egui::RichText::new(label).size(22.0));
                        if ui.add_sized([largeur, HAUTEUR_TOUCHE], b).clicked() {
                            appui = Some(touche);
                        }
                    }
                    ui.end_row();
                }
            });

        let egal = egui::Button::new(egui::RichText::new("=").size(24.0).strong());
        if ui
            .add_sized([ui.available_width(), HAUTEUR_TOUCHE], egal)
            .clicked()
        {
            appui = Some(Touche::Egal);
        }

        if let Some(t) = appui {
            self.appuyer(t);
        }
    }

    /// Fond assombri : un clic ferme les panneaux.
    fn ui_fond(&mut self, ui: &mut egui::Ui) {
        let r = ui.max_rect();
        ui.painter()
            .rect_filled(r, 0.0, egui::Color32::from_black_alpha(140));
        if ui
            .interact(r, ui.id().with("fond"), egui::Sense::click())
            .clicked()
        {
            self.panneaux.close();
        }
    }

    /* ------------------------ Panneaux ------------------------ */

    fn ui_reglages(&mut self, ui: &mut egui::Ui) {
        ui.horizontal(|ui| {
            ui.heading("Settings");
            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                if ui.button("✕").clicked() {
                    self.panneaux.close();
                }
            });
        });
        ui.separator();

        let mut r = self.reglages;
        ui.checkbox(&mut r.vibration, "Vibration");
        ui.checkbox(&mut r.auto_font, "Auto font size");
        ui.checkbox(&mut r.sounds, "Sounds");
        // thème sombre uniquement
        let mut clair = false;
        ui.add_enabled(false, egui::Checkbox::new(&mut clair, "Light mode"));
        self.set_reglages(r);

        ui.add_space(8.0);
        ui.separator();

        if ui.button("What's New?").clicked() {
            self.montrer_nouveautes();
        }
        if ui.button("Reset Settings").clicked() {
            self.demander(ActionConfirmee::ResetReglages);
        }
        if ui.button("Clear Saved Data").clicked() {
            self.demander(ActionConfirmee::EffacerHistorique);
        }

        ui.add_space(8.0);
        let ko = self.stockage.octets_sauves() as f64 / 1024.0;
        ui.label(format!("Saved Data: {ko:.2} KB"));
        ui.label(egui::RichText::new(format!("Version {VERSION_APP}")).weak());
    }

    fn ui_historique(&mut self, ui: &mut egui::Ui) {
        ui.horizontal(|ui| {
            ui.heading("History");
            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                if !self.panneaux.paysage() && ui.button("✕").clicked() {
                    self.panneaux.close();
                }
                if ui.button("Clear").on_hover_text("Clear Saved Data").clicked() {
                    self.demander(ActionConfirmee::EffacerHistorique);
                }
            });
        });
        ui.separator();

        if self.calc.historique().is_empty() {
            ui.label(egui::RichText::new("No history yet").weak());
            return;
        }

        let mut rejoue = None;
        egui::ScrollArea::vertical()
            .auto_shrink([false, false])
            .show(ui, |ui| {
                for (i, e) in self.calc.historique().entries().iter().enumerate() {
                    let heure = chrono::DateTime::from_timestamp_millis(e.t)
                        .map(|d| d.format("%H:%M").to_string())
                        .unwrap_or_default();
                    let texte = format!("{}  {heure}\n= {}", e.exp, e.res);
                    let b = egui::Button::new(egui::RichText::new(texte).monospace());
                    if ui.add_sized([ui.available_width(), 0.0], b).clicked() {
                        rejoue = Some(i);
                    }
                }
            });

        if let Some(i) = rejoue {
            self.rejouer(i);
        }
    }

    /* ------------------------ Dialogue ------------------------ */

    fn ui_dialogue(&mut self, ctx: &egui::Context, maintenant: Duration) {
        let Some(d) = self.dialogues.courant() else {
            return;
        };
        let titre = d.titre.clone();
        let corps = d.corps.clone();
        let labels: Vec<String> = d.boutons.iter().map(|b| b.label.clone()).collect();

        let mut choix = None;
        egui::Modal::new(egui::Id::new("dialogue")).show(ctx, |ui| {
            ui.set_max_width(360.0);
            ui.heading(titre);
            ui.add_space(6.0);
            ui.label(corps);
            ui.add_space(10.0);
            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                // dernier bouton (OK) à droite
                for (i, l) in labels.iter().enumerate().rev() {
                    if ui.button(l.as_str()).clicked() {
                        choix = Some(i);
                    }
                }
            });
        });

        if let Some(i) = choix {
            self.choisir(i, maintenant);
        }
    }
}

/// Taille de police pour que `texte` tienne sur `largeur`.
fn taille_auto(texte: &str, largeur: f32) -> f32 {
    let n = texte.chars().count().max(1) as f32;
    (largeur / (n * RATIO_GLYPHE)).clamp(TAILLE_ECRAN_MIN, TAILLE_ECRAN_MAX)
}
