//! Noyau - historique (registre des calculs réussis, le plus récent en tête).

use serde::{Deserialize, Serialize};

/// Garde-fou : on ne garde que les 200 derniers calculs.
pub const HISTORIQUE_MAX: usize = 200;

/// Une ligne d’historique. Immuable une fois créée.
///
/// Noms de champs courts : format de stockage stable (`exp`, `res`, `t`).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entree {
    /// Expression telle qu’affichée ("2.4e14 + 33").
    pub exp: String,
    /// Résultat tel qu’affiché ("2.4e14", "0.3", "Infinity!").
    pub res: String,
    /// Horodatage (ms depuis l’époque Unix).
    #[serde(default)]
    pub t: i64,
    /// Valeur canonique exacte du résultat (absente des anciennes données).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub val: Option<String>,
}

#[derive(Clone, Debug, Default)]
pub struct Historique {
    entrees: Vec<Entree>,
    modifie: bool,
}

impl Historique {
    /// Reprend des entrées chargées (tronquées à `HISTORIQUE_MAX`).
    pub fn from_entries(mut entrees: Vec<Entree>) -> Self {
        entrees.truncate(HISTORIQUE_MAX);
        Self {
            entrees,
            modifie: false,
        }
    }

    pub fn entries(&self) -> &[Entree] {
        &self.entrees
    }

    pub fn len(&self) -> usize {
        self.entrees.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entrees.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Entree> {
        self.entrees.get(index)
    }

    /// Ajoute en tête, tronque à 200.
    pub fn record(&mut self, entree: Entree) {
        self.entrees.insert(0, entree);
        self.entrees.truncate(HISTORIQUE_MAX);
        self.modifie = true;
    }

    /// Vide l’historique (ne touche ni aux réglages ni à la saisie).
    pub fn clear_all(&mut self) {
        self.entrees.clear();
        self.modifie = true;
    }

    /// Vrai (une seule fois) si l’historique doit être persisté.
    pub fn prendre_modifie(&mut self) -> bool {
        std::mem::take(&mut self.modifie)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entree(i: usize) -> Entree {
        Entree {
            exp: format!("{i} + 0"),
            res: i.to_string(),
            t: i as i64,
            val: Some(i.to_string()),
        }
    }

    #[test]
    fn plus_recent_en_tete() {
        let mut h = Historique::default();
        h.record(entree(1));
        h.record(entree(2));
        assert_eq!(h.entries()[0].res, "2");
        assert_eq!(h.entries()[1].res, "1");
    }

    #[test]
    fn jamais_plus_de_200() {
        let mut h = Historique::default();
        for i in 0..537 {
            h.record(entree(i));
            assert!(h.len() <= HISTORIQUE_MAX);
            assert_eq!(h.entries()[0].t, i as i64);
        }
        assert_eq!(h.len(), HISTORIQUE_MAX);
        // la plus ancienne conservée
        assert_eq!(h.entries()[HISTORIQUE_MAX - 1].t, 537 - 200);
    }

    #[test]
    fn chargement_tronque() {
        let h = Historique::from_entries((0..250).map(entree).collect());
        assert_eq!(h.len(), HISTORIQUE_MAX);
        assert_eq!(h.entries()[0].t, 0);
    }

    #[test]
    fn drapeau_modifie() {
        let mut h = Historique::default();
        assert!(!h.prendre_modifie());
        h.record(entree(1));
        assert!(h.prendre_modifie());
        assert!(!h.prendre_modifie());
        h.clear_all();
        assert!(h.is_empty());
        assert!(h.prendre_modifie());
    }

    #[test]
    fn format_stockage_stable() {
        let json = r#"[{"exp":"1 + 1","res":"2","t":5}]"#;
        let v: Vec<Entree> = serde_json::from_str(json).unwrap();
        assert_eq!(v[0].val, None);
        let back = serde_json::to_string(&v).unwrap();
        assert_eq!(back, json);
    }
}
