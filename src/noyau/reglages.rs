//! Noyau - réglages utilisateur (persistés en JSON).
//!
//! Fusion champ par champ : une clé absente garde sa valeur par défaut ;
//! un objet illisible redonne les défauts (voir `stockage::charger_reglages`).

use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Reglages {
    pub vibration: bool,
    pub auto_font: bool,
    /// Conservé pour le format ; forcé à false (thème sombre uniquement).
    pub light_mode: bool,
    pub sounds: bool,
}

impl Default for Reglages {
    fn default() -> Self {
        Self {
            vibration: false,
            auto_font: true,
            light_mode: false,
            sounds: true,
        }
    }
}

impl Reglages {
    /// Un retour (vibration ou son) est-il souhaité ?
    pub fn retour_actif(&self) -> bool {
        self.vibration || self.sounds
    }
}

/// Retour tactile/sonore : déclenché puis oublié, jamais bloquant.
pub trait Retour {
    fn signal(&mut self, intensite: u32);
}

/// Retour "journal" : la livraison réelle (vibreur, son) est hors du noyau.
#[derive(Debug, Default)]
pub struct RetourTrace {
    pub reglages: Reglages,
}

impl Retour for RetourTrace {
    fn signal(&mut self, intensite: u32) {
        if self.reglages.retour_actif() {
            tracing::trace!(
                intensite,
                vibration = self.reglages.vibration,
                son = self.reglages.sounds,
                "retour utilisateur"
            );
        }
    }
}
