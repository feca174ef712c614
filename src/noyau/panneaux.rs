//! Noyau - panneaux latéraux (Réglages / Historique).
//!
//! Un seul panneau ouvert. Passer de l’un à l’autre ferme d’abord les deux,
//! puis ouvre la cible après un court écart (jamais deux panneaux à l’écran).

use std::time::Duration;

use tracing::debug;

/// Écart entre la fermeture d’un panneau et l’ouverture de l’autre.
pub const ECART_PANNEAUX: Duration = Duration::from_millis(60);

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Panneau {
    #[default]
    Aucun,
    Reglages,
    Historique,
}

#[derive(Clone, Debug, Default)]
pub struct Panneaux {
    ouvert: Panneau,
    /// Bascule différée : (cible, échéance).
    differe: Option<(Panneau, Duration)>,
    /// Paysage : l’historique est affiché en ligne, pas en panneau.
    paysage: bool,
}

impl Panneaux {
    pub fn ouvert(&self) -> Panneau {
        self.ouvert
    }

    /// Fond assombri : un panneau est ouvert ou sur le point de l’être.
    pub fn fond_visible(&self) -> bool {
        self.ouvert != Panneau::Aucun || self.differe.is_some()
    }

    pub fn paysage(&self) -> bool {
        self.paysage
    }

    /// Bouton menu / historique.
    pub fn toggle(&mut self, cible: Panneau, maintenant: Duration) {
        if cible == Panneau::Aucun {
            self.close();
            return;
        }
        if self.paysage && cible == Panneau::Historique {
            return;
        }
        if self.ouvert == cible {
            self.close();
            return;
        }
        if self.ouvert == Panneau::Aucun && self.differe.is_none() {
            self.ouvrir(cible);
            return;
        }

        // l’autre panneau est ouvert (ou une bascule est déjà en cours)
        self.ouvert = Panneau::Aucun;
        self.differe = Some((cible, maintenant + ECART_PANNEAUX));
        debug!(?cible, "bascule de panneau différée");
    }

    /// Croix, fond, ou Échap : tout fermer (annule une bascule en cours).
    pub fn close(&mut self) {
        self.ouvert = Panneau::Aucun;
        self.differe = None;
    }

    pub fn tick(&mut self, maintenant: Duration) {
        if let Some((cible, echeance)) = self.differe {
            if maintenant >= echeance {
                self.differe = None;
                self.ouvrir(cible);
            }
        }
    }

    /// Changement d’orientation : en paysage, un panneau Historique se ferme.
    pub fn set_paysage(&mut self, paysage: bool) {
        if paysage == self.paysage {
            return;
        }
        self.paysage = paysage;
        if paysage {
            if self.ouvert == Panneau::Historique {
                self.close();
            }
            if matches!(self.differe, Some((Panneau::Historique, _))) {
                self.differe = None;
            }
        }
    }

    pub fn prochaine_echeance(&self) -> Option<Duration> {
        self.differe.map(|(_, e)| e)
    }

    fn ouvrir(&mut self, cible: Panneau) {
        debug!(?cible, "panneau ouvert");
        self.ouvert = cible;
    }
}
