// src/app.rs
//
// Calculatrice tactile - module App (racine)
// ------------------------------------------
// Rôle:
// - Déclarer les sous-modules (etat.rs + flux.rs + vue.rs)
// - Ré-exporter AppCalc (pour main.rs: use crate::app::AppCalc;)
// - Fournir l’impl eframe::App (compatible NATIF + WEB)
//
// Ordre d’une frame :
//   horloge (tick) -> clavier -> vue -> flux -> repaint différé
// Ainsi un bouton de dialogue cliqué dans la vue fait avancer son flux dans la même frame.

pub mod etat;
pub mod flux;
pub mod vue;

// Ré-export pratique : `use crate::app::AppCalc;`
pub use etat::AppCalc;

use std::time::Duration;

use eframe::egui;
use tracing::debug;

use crate::noyau::jetons::est_autorise;
use etat::Touche;

/// Écriture fréquente : chaque calcul doit survivre à une fermeture d’onglet.
pub const INTERVALLE_SAUVEGARDE: Duration = Duration::from_secs(1);

impl eframe::App for AppCalc {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        let maintenant = Duration::from_secs_f64(ctx.input(|i| i.time).max(0.0));

        self.tick(maintenant);
        self.clavier(ctx, maintenant);
        self.ui(ctx, maintenant);

        if self.avancer_flux() {
            ctx.request_repaint();
        }
        if let Some(echeance) = self.prochaine_echeance() {
            ctx.request_repaint_after(echeance.saturating_sub(maintenant));
        }
    }

    fn auto_save_interval(&self) -> Duration {
        INTERVALLE_SAUVEGARDE
    }

    /// Vide les clés modifiées vers le stockage eframe (localStorage sur le web).
    fn save(&mut self, storage: &mut dyn eframe::Storage) {
        let modifiees = self.stockage.prendre_modifiees();
        if modifiees.is_empty() {
            return;
        }
        debug!(cles = modifiees.len(), "sauvegarde");
        for (cle, valeur) in modifiees {
            storage.set_string(&cle, valeur);
        }
    }
}

impl AppCalc {
    /// Clavier physique. Pendant un dialogue : seule Échap agit (annulation).
    fn clavier(&mut self, ctx: &egui::Context, maintenant: Duration) {
        let evenements = ctx.input(|i| i.events.clone());

        if self.dialogue_actif() {
            let echap = evenements.iter().any(|e| {
                matches!(
                    e,
                    egui::Event::Key {
                        key: egui::Key::Escape,
                        pressed: true,
                        ..
                    }
                )
            });
            if echap {
                self.annuler_dialogue(maintenant);
            }
            return;
        }

        for e in evenements {
            match e {
                egui::Event::Key {
                    key, pressed: true, ..
                } => match key {
                    egui::Key::Backspace => self.appuyer(Touche::Del),
                    egui::Key::Escape => self.appuyer(Touche::Clear),
                    egui::Key::Enter => self.appuyer(Touche::Egal),
                    _ => {}
                },
                egui::Event::Text(texte) => {
                    for c in texte.chars() {
                        if c == '=' {
                            self.appuyer(Touche::Egal);
                        } else if est_autorise(c) {
                            self.appuyer(Touche::Jeton(c));
                        }
                    }
                }
                _ => {}
            }
        }
    }
}
