//! src/app/etat.rs
//!
//! État de l’application (sans vue).
//!
//! Rôle : posséder le noyau (calculatrice, dialogues, panneaux, réglages, stockage)
//! et offrir les actions des touches / boutons. Aucun dessin ici.
//!
//! Contrats :
//! - Un seul propriétaire : tout l’état vit dans `AppCalc` (pas de globales).
//! - Le temps arrive par argument (`maintenant`, horloge egui).
//! - Toute écriture durable passe par `Stockage` ; eframe la vide dans `App::save`.

use std::time::Duration;

use tracing::{debug, info};

use super::flux::{demande_infini, ActionConfirmee, Effet, Flux, Pas};
use crate::noyau::dialogue::{EtatDialogue, Sequenceur};
use crate::noyau::historique::Historique;
use crate::noyau::panneaux::{Panneau, Panneaux};
use crate::noyau::reglages::{Reglages, Retour, RetourTrace};
use crate::noyau::stockage::{
    charger_historique, charger_reglages, marquer_bienvenue, sauver_historique,
    sauver_reglages, securite_version, EtatInstallation, VERSION_APP,
};
use crate::noyau::{Calculatrice, Issue, Stockage};

/// Intensités du retour tactile (ms de vibration côté appareil).
const RETOUR_CHIFFRE: u32 = 8;
const RETOUR_ACTION: u32 = 10;
const RETOUR_EGAL: u32 = 12;

/// Une touche du pavé (ou du clavier physique).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Touche {
    Jeton(char),
    Del,
    Clear,
    Egal,
}

pub struct AppCalc {
    pub calc: Calculatrice,
    pub dialogues: Sequenceur<bool>,
    pub panneaux: Panneaux,
    pub reglages: Reglages,
    pub stockage: Stockage,
    pub installation: EtatInstallation,

    retour: RetourTrace,
    flux: Vec<Flux>,
    demarre: bool,
}

impl Default for AppCalc {
    fn default() -> Self {
        Self::depuis_stockage(Stockage::default())
    }
}

impl AppCalc {
    /// Démarrage : sécurité de version, puis chargement réglages + historique.
    pub fn depuis_stockage(mut stockage: Stockage) -> Self {
        let installation = securite_version(&mut stockage, VERSION_APP);
        let reglages = charger_reglages(&stockage);
        // lightMode forcé à false : on le réécrit tel quel
        sauver_reglages(&mut stockage, &reglages);

        let historique = Historique::from_entries(charger_historique(&stockage));
        info!(
            version = VERSION_APP,
            historique = historique.len(),
            ?installation,
            "application prête"
        );

        Self {
            calc: Calculatrice::new(historique),
            dialogues: Sequenceur::default(),
            panneaux: Panneaux::default(),
            reglages,
            stockage,
            installation,
            retour: RetourTrace { reglages },
            flux: Vec::new(),
            demarre: false,
        }
    }

    /// Un dialogue est visible (ou en train de se fermer) : clavier ignoré.
    pub fn dialogue_actif(&self) -> bool {
        self.dialogues.etat() != EtatDialogue::Ferme
    }

    /* ------------------------ Horloge ------------------------ */

    /// À appeler une fois par frame, avant la vue.
    pub fn tick(&mut self, maintenant: Duration) {
        self.dialogues.tick(maintenant);
        self.panneaux.tick(maintenant);

        if !self.demarre {
            self.demarre = true;
            self.dialogues_de_demarrage();
        }
    }

    /// Prochaine échéance utile (repaint différé).
    pub fn prochaine_echeance(&self) -> Option<Duration> {
        match (
            self.dialogues.prochaine_echeance(),
            self.panneaux.prochaine_echeance(),
        ) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (a, b) => a.or(b),
        }
    }

    fn dialogues_de_demarrage(&mut self) {
        if !self.installation.montrer_nouveautes(&self.stockage) {
            return;
        }
        debug!(installation = ?self.installation, "dialogues de démarrage");
        if let Some(f) = Flux::nouveautes(&mut self.dialogues, Some(Effet::MarquerBienvenue)) {
            self.flux.push(f);
        }
    }

    /* ------------------------ Touches ------------------------ */

    pub fn appuyer(&mut self, touche: Touche) {
        match touche {
            Touche::Jeton(c) => {
                self.retour.signal(RETOUR_CHIFFRE);
                self.calc.append(c.encode_utf8(&mut [0; 4]));
            }
            Touche::Del => {
                self.retour.signal(RETOUR_ACTION);
                self.calc.delete();
            }
            Touche::Clear => {
                self.retour.signal(RETOUR_ACTION);
                self.calc.clear();
            }
            Touche::Egal => {
                self.retour.signal(RETOUR_EGAL);
                let t = chrono::Utc::now().timestamp_millis();
                if self.calc.egal(t) == Issue::Infini {
                    // explication seule : personne n’attend la réponse
                    let _ = self.dialogues.request(demande_infini());
                }
            }
        }
        self.persister_historique();
    }

    /// Ligne d’historique touchée : reprise + fermeture du panneau.
    pub fn rejouer(&mut self, index: usize) {
        self.retour.signal(RETOUR_ACTION);
        // seul le panneau Historique (portrait) se referme
        if self.calc.replay(index)
            && !self.panneaux.paysage()
            && self.panneaux.ouvert() == Panneau::Historique
        {
            self.panneaux.close();
        }
    }

    /* ------------------------ Panneaux ------------------------ */

    pub fn basculer_panneau(&mut self, cible: Panneau, maintenant: Duration) {
        self.retour.signal(RETOUR_ACTION);
        self.panneaux.toggle(cible, maintenant);
    }

    /* ------------------------ Réglages ------------------------ */

    pub fn set_reglages(&mut self, mut r: Reglages) {
        r.light_mode = false;
        if r == self.reglages {
            return;
        }
        debug!(?r, "réglages modifiés");
        self.reglages = r;
        self.retour.reglages = r;
        sauver_reglages(&mut self.stockage, &r);
        self.retour.signal(RETOUR_ACTION);
    }

    pub fn demander(&mut self, action: ActionConfirmee) {
        self.retour.signal(RETOUR_EGAL);
        debug!(?action, en_file = self.dialogues.en_file(), "confirmation demandée");
        let f = Flux::confirmer(&mut self.dialogues, action);
        self.flux.push(f);
    }

    pub fn montrer_nouveautes(&mut self) {
        self.retour.signal(RETOUR_ACTION);
        if let Some(f) = Flux::nouveautes(&mut self.dialogues, None) {
            self.flux.push(f);
        }
    }

    /* ------------------------ Dialogues ------------------------ */

    /// Bouton `index` du dialogue visible.
    pub fn choisir(&mut self, index: usize, maintenant: Duration) {
        if self.dialogues.dismiss(index, maintenant) {
            self.retour.signal(RETOUR_ACTION);
        }
    }

    /// Échap pendant un dialogue.
    pub fn annuler_dialogue(&mut self, maintenant: Duration) {
        if self.dialogues.cancel(maintenant) {
            self.retour.signal(RETOUR_ACTION);
        }
    }

    /* ------------------------ Flux ------------------------ */

    /// Fait avancer les enchaînements (après la vue, même frame).
    /// Vrai si l’un d’eux a bougé (repaint utile).
    pub fn avancer_flux(&mut self) -> bool {
        let mut bouge = false;
        for f in std::mem::take(&mut self.flux) {
            let pas = f.avancer(&mut self.dialogues);
            bouge |= !matches!(pas, Pas::Attente(_));
            match pas {
                Pas::Attente(f) => self.flux.push(f),
                Pas::Agir(action) => {
                    self.executer(action);
                    if let Some(f) = Flux::apres_action(&mut self.dialogues, action) {
                        self.flux.push(f);
                    }
                }
                Pas::Termine(Some(Effet::MarquerBienvenue)) => {
                    marquer_bienvenue(&mut self.stockage);
                }
                Pas::Termine(None) => {}
            }
        }
        bouge
    }

    fn executer(&mut self, action: ActionConfirmee) {
        match action {
            ActionConfirmee::EffacerHistorique => {
                self.calc.clear_history();
                self.persister_historique();
            }
            ActionConfirmee::ResetReglages => {
                self.set_reglages(Reglages::default());
            }
        }
        info!(?action, "action exécutée");
    }

    fn persister_historique(&mut self) {
        if self.calc.historique_mut().prendre_modifie() {
            sauver_historique(&mut self.stockage, self.calc.historique().entries());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::noyau::stockage::{
        bienvenue_vue, CLE_BIENVENUE, CLE_HISTORIQUE, CLE_REGLAGES, CLE_VERSION,
    };

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    fn taper(app: &mut AppCalc, s: &str) {
        for c in s.chars() {
            let t = match c {
                '=' => Touche::Egal,
                '<' => Touche::Del,
                'C' => Touche::Clear,
                c => Touche::Jeton(c),
            };
            app.appuyer(t);
        }
    }

    /// Ferme tous les dialogues de démarrage.
    fn passer_demarrage(app: &mut AppCalc, mut t: u64) -> u64 {
        app.tick(ms(t));
        while app.dialogues.courant().is_some() {
            app.dialogues.dismiss(0, ms(t));
            app.avancer_flux();
            t += 200;
            app.tick(ms(t));
        }
        t
    }

    #[test]
    fn premiere_installation_montre_les_nouveautes() {
        let mut app = AppCalc::default();
        assert!(app.installation.first_install);
        assert_eq!(app.stockage.get(CLE_VERSION), Some(VERSION_APP));

        app.tick(ms(0));
        assert_eq!(
            app.dialogues.courant().map(|d| d.titre.as_str()),
            Some("What's New?")
        );
        assert!(app.dialogue_actif());

        passer_demarrage(&mut app, 0);
        assert!(bienvenue_vue(&app.stockage));
        assert!(!app.dialogue_actif());
    }

    #[test]
    fn meme_version_bienvenue_vue_pas_de_dialogue() {
        let mut s = Stockage::default();
        s.hydrater(CLE_VERSION, VERSION_APP.to_string());
        s.hydrater(CLE_BIENVENUE, "1".to_string());
        let mut app = AppCalc::depuis_stockage(s);
        app.tick(ms(0));
        assert!(app.dialogues.est_inactif());
    }

    #[test]
    fn egal_persiste_l_historique() {
        let mut app = AppCalc::default();
        passer_demarrage(&mut app, 0);

        taper(&mut app, "2+2=");
        assert_eq!(app.calc.ecran().principal(), "4");
        let json = app.stockage.get(CLE_HISTORIQUE).unwrap();
        assert!(json.contains(r#""res":"4""#));
    }

    #[test]
    fn infini_ouvre_l_explication() {
        let mut app = AppCalc::default();
        let t = passer_demarrage(&mut app, 0);

        taper(&mut app, "1/0=");
        app.tick(ms(t));
        assert_eq!(
            app.dialogues.courant().map(|d| d.titre.as_str()),
            Some("Infinity!")
        );
    }

    #[test]
    fn effacer_historique_apres_confirmation() {
        let mut app = AppCalc::default();
        let mut t = passer_demarrage(&mut app, 0);
        taper(&mut app, "1+1=");
        assert_eq!(app.calc.historique().len(), 1);

        app.demander(ActionConfirmee::EffacerHistorique);
        app.tick(ms(t));
        app.dialogues.dismiss(1, ms(t));
        app.avancer_flux();
        assert!(app.calc.historique().is_empty());
        assert_eq!(app.stockage.get(CLE_HISTORIQUE), Some("[]"));

        t += 200;
        app.tick(ms(t));
        assert_eq!(
            app.dialogues.courant().map(|d| d.corps.as_str()),
            Some("Cleared Saved Data")
        );
    }

    #[test]
    fn reset_reglages_annule() {
        let mut app = AppCalc::default();
        let t = passer_demarrage(&mut app, 0);
        app.set_reglages(Reglages {
            sounds: false,
            ..Reglages::default()
        });

        app.demander(ActionConfirmee::ResetReglages);
        app.tick(ms(t));
        app.annuler_dialogue(ms(t));
        app.avancer_flux();
        assert!(!app.reglages.sounds);

        app.tick(ms(t + 200));
        app.demander(ActionConfirmee::ResetReglages);
        app.choisir(1, ms(t + 200));
        app.avancer_flux();
        assert!(app.reglages.sounds);
        assert!(app.stockage.get(CLE_REGLAGES).unwrap().contains(r#""sounds":true"#));
    }

    #[test]
    fn rejouer_ferme_le_panneau() {
        let mut app = AppCalc::default();
        let t = passer_demarrage(&mut app, 0);
        taper(&mut app, "6*7=C");
        app.basculer_panneau(Panneau::Historique, ms(t));
        assert_eq!(app.panneaux.ouvert(), Panneau::Historique);

        app.rejouer(0);
        assert_eq!(app.panneaux.ouvert(), Panneau::Aucun);
        assert_eq!(app.calc.ecran().principal(), "42");
    }

    #[test]
    fn rejouer_en_paysage_laisse_les_reglages() {
        let mut app = AppCalc::default();
        let t = passer_demarrage(&mut app, 0);
        app.panneaux.set_paysage(true);
        taper(&mut app, "6*7=C");
        app.basculer_panneau(Panneau::Reglages, ms(t));
        assert_eq!(app.panneaux.ouvert(), Panneau::Reglages);

        // historique en ligne : la relecture ne touche pas au panneau ouvert
        app.rejouer(0);
        assert_eq!(app.panneaux.ouvert(), Panneau::Reglages);
        assert_eq!(app.calc.ecran().principal(), "42");
    }
}
