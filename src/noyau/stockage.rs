//! Noyau - stockage clé/valeur + sécurité de version.
//!
//! Le noyau travaille sur un instantané en mémoire (`Stockage`) :
//! - hydraté au démarrage depuis le stockage de la plateforme ;
//! - les clés modifiées sont vidées vers la plateforme par la coquille (`App::save`).
//!
//! Contrat : une panne de stockage (JSON illisible, sérialisation) n’interrompt
//! jamais le calcul. On journalise et on repart des valeurs par défaut.

use std::cmp::Ordering;
use std::collections::{BTreeMap, BTreeSet};

use tracing::{info, warn};

use super::historique::{Entree, HISTORIQUE_MAX};
use super::reglages::Reglages;

/// Version courante (marqueur de schéma).
pub const VERSION_APP: &str = env!("CARGO_PKG_VERSION");

pub const CLE_VERSION: &str = "calc_app_version";
pub const CLE_REGLAGES: &str = "calc_settings";
pub const CLE_HISTORIQUE: &str = "calc_history";
pub const CLE_BIENVENUE: &str = "calc_seen_welcome";

/// Familles de clés d’anciennes versions (migration au mieux).
struct AnciennesCles {
    reglages: &'static str,
    historique: &'static str,
    bienvenue: &'static str,
}

const ANCIENNES_CLES: [AnciennesCles; 2] = [
    AnciennesCles {
        reglages: "calc_v051_settings",
        historique: "calc_v051_history",
        bienvenue: "calc_v051_seen_welcome",
    },
    AnciennesCles {
        reglages: "calc_v050_settings",
        historique: "calc_v050_history",
        bienvenue: "calc_v050_seen_welcome",
    },
];

/// Toutes les clés lues au démarrage.
pub fn cles_connues() -> Vec<&'static str> {
    let mut v = vec![CLE_VERSION, CLE_REGLAGES, CLE_HISTORIQUE, CLE_BIENVENUE];
    for o in &ANCIENNES_CLES {
        v.extend([o.reglages, o.historique, o.bienvenue]);
    }
    v
}

/* ------------------------ Instantané clé/valeur ------------------------ */

#[derive(Clone, Debug, Default)]
pub struct Stockage {
    valeurs: BTreeMap<String, String>,
    modifiees: BTreeSet<String>,
}

impl Stockage {
    /// Chargement initial (ne marque rien comme modifié).
    pub fn hydrater(&mut self, cle: &str, valeur: String) {
        self.valeurs.insert(cle.to_string(), valeur);
    }

    /// Une valeur vide vaut "absente" (le stockage plateforme n’a pas de suppression).
    pub fn get(&self, cle: &str) -> Option<&str> {
        self.valeurs
            .get(cle)
            .map(String::as_str)
            .filter(|v| !v.is_empty())
    }

    pub fn set(&mut self, cle: &str, valeur: impl Into<String>) {
        self.valeurs.insert(cle.to_string(), valeur.into());
        self.modifiees.insert(cle.to_string());
    }

    pub fn remove(&mut self, cle: &str) {
        if self.valeurs.contains_key(cle) {
            self.set(cle, String::new());
        }
    }

    /// Clés modifiées depuis le dernier appel, avec leur valeur.
    pub fn prendre_modifiees(&mut self) -> Vec<(String, String)> {
        std::mem::take(&mut self.modifiees)
            .into_iter()
            .map(|cle| {
                let v = self.valeurs.get(&cle).cloned().unwrap_or_default();
                (cle, v)
            })
            .collect()
    }

    /// Taille approximative des données sauvegardées (clés + valeurs), en octets.
    pub fn octets_sauves(&self) -> usize {
        [CLE_REGLAGES, CLE_HISTORIQUE]
            .iter()
            .map(|c| c.len() + self.get(c).map_or(0, str::len))
            .sum()
    }
}

/* ------------------------ Réglages / historique ------------------------ */

pub fn charger_reglages(s: &Stockage) -> Reglages {
    let mut r = match s.get(CLE_REGLAGES) {
        None => Reglages::default(),
        Some(json) => serde_json::from_str(json).unwrap_or_else(|e| {
            warn!(erreur = %e, "réglages illisibles, valeurs par défaut");
            Reglages::default()
        }),
    };
    // thème sombre uniquement
    r.light_mode = false;
    r
}

pub fn sauver_reglages(s: &mut Stockage, r: &Reglages) {
    match serde_json::to_string(r) {
        Ok(json) => s.set(CLE_REGLAGES, json),
        Err(e) => warn!(erreur = %e, "réglages non sauvegardés"),
    }
}

pub fn charger_historique(s: &Stockage) -> Vec<Entree> {
    let Some(json) = s.get(CLE_HISTORIQUE) else {
        return Vec::new();
    };
    match serde_json::from_str::<Vec<Entree>>(json) {
        Ok(mut v) => {
            v.truncate(HISTORIQUE_MAX);
            v
        }
        Err(e) => {
            warn!(erreur = %e, "historique illisible, on repart à vide");
            Vec::new()
        }
    }
}

pub fn sauver_historique(s: &mut Stockage, entrees: &[Entree]) {
    match serde_json::to_string(entrees) {
        Ok(json) => s.set(CLE_HISTORIQUE, json),
        Err(e) => warn!(erreur = %e, "historique non sauvegardé"),
    }
}

pub fn bienvenue_vue(s: &Stockage) -> bool {
    s.get(CLE_BIENVENUE).is_some()
}

pub fn marquer_bienvenue(s: &mut Stockage) {
    s.set(CLE_BIENVENUE, "1");
}

/* ------------------------ Sécurité de version ------------------------ */

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct EtatInstallation {
    pub upgraded: bool,
    pub first_install: bool,
}

impl EtatInstallation {
    /// "What's New?" puis "NOTICE" au démarrage ?
    pub fn montrer_nouveautes(&self, s: &Stockage) -> bool {
        self.upgraded || self.first_install || !bienvenue_vue(s)
    }
}

/// Compare "1.2.3" et "1.10" composante par composante (manquant / illisible = 0).
pub fn comparer_versions(a: &str, b: &str) -> Ordering {
    let pa: Vec<u64> = a.split('.').map(|n| n.trim().parse().unwrap_or(0)).collect();
    let pb: Vec<u64> = b.split('.').map(|n| n.trim().parse().unwrap_or(0)).collect();
    let len = pa.len().max(pb.len());
    (0..len)
        .map(|i| {
            let da = pa.get(i).copied().unwrap_or(0);
            let db = pb.get(i).copied().unwrap_or(0);
            da.cmp(&db)
        })
        .find(|o| o.is_ne())
        .unwrap_or(Ordering::Equal)
}

/// Montée de version : sauvegarde + migration. Descente : remise à zéro.
pub fn securite_version(s: &mut Stockage, version: &str) -> EtatInstallation {
    let mut etat = EtatInstallation::default();

    let Some(stockee) = s.get(CLE_VERSION).map(str::to_string) else {
        etat.first_install = true;
        s.set(CLE_VERSION, version);
        migrer_anciennes_cles(s);
        info!(version, "première installation");
        return etat;
    };

    match comparer_versions(version, &stockee) {
        Ordering::Greater => {
            etat.upgraded = true;
            sauvegarder_donnees(s, &stockee);
            migrer_anciennes_cles(s);
            s.set(CLE_VERSION, version);
            info!(de = %stockee, vers = version, "mise à jour");
        }
        Ordering::Less => {
            remise_a_zero(s);
            s.set(CLE_VERSION, version);
            warn!(de = %stockee, vers = version, "retour en arrière : données remises à zéro");
        }
        Ordering::Equal => {}
    }

    etat
}

fn sauvegarder_donnees(s: &mut Stockage, ancienne: &str) {
    if let Some(v) = s.get(CLE_REGLAGES).map(str::to_string) {
        s.set(&format!("calc_backup_{ancienne}_settings"), v);
    }
    if let Some(v) = s.get(CLE_HISTORIQUE).map(str::to_string) {
        s.set(&format!("calc_backup_{ancienne}_history"), v);
    }
}

fn migrer_anciennes_cles(s: &mut Stockage) {
    if s.get(CLE_REGLAGES).is_some() || s.get(CLE_HISTORIQUE).is_some() {
        return;
    }

    for o in &ANCIENNES_CLES {
        let reglages = s.get(o.reglages).map(str::to_string);
        let historique = s.get(o.historique).map(str::to_string);
        if reglages.is_none() && historique.is_none() {
            continue;
        }

        if let Some(v) = reglages {
            s.set(CLE_REGLAGES, v);
        }
        if let Some(v) = historique {
            s.set(CLE_HISTORIQUE, v);
        }
        if let Some(v) = s.get(o.bienvenue).map(str::to_string) {
            s.set(CLE_BIENVENUE, v);
        }
        info!(depuis = o.reglages, "anciennes clés migrées");
        break;
    }
}

fn remise_a_zero(s: &mut Stockage) {
    s.remove(CLE_REGLAGES);
    s.remove(CLE_HISTORIQUE);
    s.remove(CLE_BIENVENUE);
}
