//! Noyau - calculatrice (saisie + évaluation + historique + écran).
//!
//! Toutes les erreurs d’évaluation s’arrêtent ici : l’écran montre "Error",
//! la saisie est vidée, rien n’est ajouté à l’historique.

use tracing::debug;

use super::erreurs::ErreurCalc;
use super::eval::evaluer;
use super::format::{
    est_forme_sci, format_resultat, nombre_canonique, utilise_sci, vue_expression,
    MARQUEUR_ERREUR, MARQUEUR_INFINI,
};
use super::historique::{Entree, Historique};
use super::jetons::sanitize;
use super::saisie::Saisie;

/// Les deux lignes de l’écran.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Ecran {
    precedent: String,
    principal: String,
}

impl Ecran {
    /// Ligne du haut ("--" si vide).
    pub fn precedent(&self) -> &str {
        if self.precedent.is_empty() {
            "--"
        } else {
            &self.precedent
        }
    }

    pub fn precedent_vide(&self) -> bool {
        self.precedent.is_empty()
    }

    /// Ligne principale ("0" si vide).
    pub fn principal(&self) -> &str {
        if self.principal.is_empty() {
            "0"
        } else {
            &self.principal
        }
    }
}

/// Ce que "=" a produit, pour la coquille.
#[derive(Clone, Debug, PartialEq)]
pub enum Issue {
    /// Rien à évaluer.
    Rien,
    /// Résultat affiché (décimal ou scientifique court).
    Resultat(String),
    /// ±inf : la coquille montre l’explication "Infinity!".
    Infini,
    /// Erreur récupérée (écran "Error").
    Erreur(ErreurCalc),
}

#[derive(Clone, Debug, Default)]
pub struct Calculatrice {
    saisie: Saisie,
    historique: Historique,
    ecran: Ecran,
}

impl Calculatrice {
    pub fn new(historique: Historique) -> Self {
        Self {
            historique,
            ..Self::default()
        }
    }

    pub fn saisie(&self) -> &Saisie {
        &self.saisie
    }

    pub fn historique(&self) -> &Historique {
        &self.historique
    }

    pub fn historique_mut(&mut self) -> &mut Historique {
        &mut self.historique
    }

    pub fn ecran(&self) -> &Ecran {
        &self.ecran
    }

    /* ------------------------ Touches ------------------------ */

    pub fn append(&mut self, jeton: &str) -> bool {
        let repart = self.saisie.dernier_egal()
            && sanitize(jeton)
                .chars()
                .next()
                .is_some_and(|c| c.is_ascii_digit() || c == '.' || c == '(');
        if repart {
            self.ecran.precedent.clear();
        }

        let change = self.saisie.append(jeton);
        if change {
            self.synchroniser();
        }
        change
    }

    pub fn delete(&mut self) -> bool {
        let change = self.saisie.delete();
        if change {
            self.synchroniser();
        }
        change
    }

    pub fn clear(&mut self) {
        self.saisie.clear();
        self.ecran = Ecran::default();
    }

    fn synchroniser(&mut self) {
        self.ecran.principal = vue_expression(&self.saisie.affichage());
    }

    /* ------------------------ "=" ------------------------ */

    /// Évalue la forme canonique. `horodatage` : ms depuis l’époque Unix.
    pub fn egal(&mut self, horodatage: i64) -> Issue {
        if self.saisie.est_vide() {
            return Issue::Rien;
        }

        let exp = {
            let v = vue_expression(&self.saisie.affichage());
            if v.is_empty() {
                "--".to_string()
            } else {
                v
            }
        };

        let valeur = match evaluer(self.saisie.canonique()) {
            Ok(v) if v.is_nan() => return self.echec(exp, ErreurCalc::Indetermine),
            Ok(v) => v,
            Err(e) => return self.echec(exp, e),
        };

        self.ecran.precedent = format!("{exp} =");

        if valeur.is_infinite() {
            self.ecran.principal = MARQUEUR_INFINI.to_string();
            self.historique.record(Entree {
                exp,
                res: MARQUEUR_INFINI.to_string(),
                t: horodatage,
                val: None,
            });
            self.saisie.vider_apres_infini();
            debug!("résultat infini");
            return Issue::Infini;
        }

        let affiche = format_resultat(valeur);
        let canonique = nombre_canonique(valeur);
        debug!(%affiche, %canonique, "résultat");

        self.ecran.principal = affiche.clone();
        self.historique.record(Entree {
            exp,
            res: affiche.clone(),
            t: horodatage,
            val: Some(canonique.clone()),
        });

        let courte = utilise_sci(valeur).then(|| affiche.clone());
        self.saisie.semer_resultat(canonique, courte);
        Issue::Resultat(affiche)
    }

    fn echec(&mut self, exp: String, e: ErreurCalc) -> Issue {
        debug!(erreur = %e, "évaluation refusée");
        self.ecran.precedent = exp;
        self.ecran.principal = MARQUEUR_ERREUR.to_string();
        self.saisie.clear();
        Issue::Erreur(e)
    }

    /* ------------------------ Historique ------------------------ */

    /// Reprend le résultat d’une ligne d’historique comme valeur fraîche.
    pub fn replay(&mut self, index: usize) -> bool {
        let Some(e) = self.historique.get(index).cloned() else {
            return false;
        };

        let sci = est_forme_sci(&e.res);
        let canonique = match &e.val {
            Some(v) => sanitize(v),
            None if e.res == MARQUEUR_INFINI => String::new(),
            // ancienne donnée : "2.4e14" -> valeur (approchée) en chiffres
            None if sci => e
                .res
                .parse::<f64>()
                .ok()
                .filter(|v| v.is_finite())
                .map(nombre_canonique)
                .unwrap_or_default(),
            None => sanitize(&e.res),
        };

        self.saisie
            .semer_resultat(canonique, sci.then(|| e.res.clone()));
        self.ecran.precedent = format!("{} =", e.exp);
        self.ecran.principal = e.res;
        true
    }

    pub fn clear_history(&mut self) {
        self.historique.clear_all();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn taper(c: &mut Calculatrice, touches: &str) {
        for ch in touches.chars() {
            c.append(&ch.to_string());
        }
    }

    #[test]
    fn deux_plus_deux() {
        let mut c = Calculatrice::default();
        taper(&mut c, "2+2");
        assert_eq!(c.ecran().principal(), "2 + 2");
        assert_eq!(c.egal(0), Issue::Resultat("4".into()));
        assert_eq!(c.ecran().precedent(), "2 + 2 =");
        assert_eq!(c.ecran().principal(), "4");
        assert_eq!(c.historique().entries()[0].res, "4");
        assert_eq!(c.saisie().canonique(), "4");
    }

    #[test]
    fn chainage_scientifique_reste_court() {
        let mut c = Calculatrice::default();
        taper(&mut c, "240000000000000+1");
        assert_eq!(c.egal(1), Issue::Resultat("2.4e14".into()));

        taper(&mut c, "+33");
        assert_eq!(c.ecran().principal(), "2.4e14 + 33");
        assert_eq!(c.saisie().canonique(), "240000000000001+33");

        assert_eq!(c.egal(2), Issue::Resultat("2.4e14".into()));
        let h = &c.historique().entries()[0];
        assert_eq!(h.exp, "2.4e14 + 33");
        assert_eq!(h.val.as_deref(), Some("240000000000034"));
    }

    #[test]
    fn infini_vide_et_enregistre() {
        let mut c = Calculatrice::default();
        taper(&mut c, "1/0");
        assert_eq!(c.egal(0), Issue::Infini);
        assert_eq!(c.ecran().principal(), MARQUEUR_INFINI);
        assert!(c.saisie().est_vide());
        assert!(c.saisie().dernier_egal());
        assert_eq!(c.historique().len(), 1);
        assert_eq!(c.historique().entries()[0].res, MARQUEUR_INFINI);
    }

    #[test]
    fn erreurs_sans_historique() {
        let mut c = Calculatrice::default();
        taper(&mut c, "(1+2");
        assert_eq!(c.egal(0), Issue::Erreur(ErreurCalc::NonEquilibre));
        assert_eq!(c.ecran().principal(), MARQUEUR_ERREUR);
        assert_eq!(c.ecran().precedent(), "(1 + 2");
        assert!(c.saisie().est_vide());

        taper(&mut c, "0/0");
        assert_eq!(c.egal(0), Issue::Erreur(ErreurCalc::Indetermine));

        taper(&mut c, "5-");
        assert!(matches!(c.egal(0), Issue::Erreur(ErreurCalc::Malforme(_))));

        assert!(c.historique().is_empty());
    }

    #[test]
    fn egal_sur_vide_ne_fait_rien() {
        let mut c = Calculatrice::default();
        assert_eq!(c.egal(0), Issue::Rien);
        assert_eq!(c.ecran().principal(), "0");
        assert_eq!(c.ecran().precedent(), "--");
    }

    #[test]
    fn chiffre_apres_egal_efface_la_ligne_du_haut() {
        let mut c = Calculatrice::default();
        taper(&mut c, "2*3");
        c.egal(0);
        taper(&mut c, "+1");
        assert_eq!(c.ecran().precedent(), "2 × 3 =");
        assert_eq!(c.ecran().principal(), "6 + 1");

        c.egal(0);
        taper(&mut c, "9");
        assert!(c.ecran().precedent_vide());
        assert_eq!(c.ecran().principal(), "9");
    }

    #[test]
    fn replay_repart_de_la_valeur_exacte() {
        let mut c = Calculatrice::default();
        taper(&mut c, "240000000000000+7");
        c.egal(0);
        taper(&mut c, "1+1");
        c.egal(1);

        assert!(c.replay(1));
        assert_eq!(c.ecran().principal(), "2.4e14");
        assert_eq!(c.ecran().precedent(), "240000000000000 + 7 =");
        assert!(c.saisie().dernier_egal());

        taper(&mut c, "-7");
        assert_eq!(c.ecran().principal(), "2.4e14 - 7");
        assert_eq!(c.egal(2), Issue::Resultat("2.4e14".into()));
        assert_eq!(c.historique().entries()[0].val.as_deref(), Some("240000000000000"));

        assert!(!c.replay(99));
    }

    #[test]
    fn replay_anciennes_donnees() {
        let h = Historique::from_entries(vec![
            Entree {
                exp: "a".into(),
                res: "2.4e14".into(),
                t: 0,
                val: None,
            },
            Entree {
                exp: "b".into(),
                res: MARQUEUR_INFINI.into(),
                t: 0,
                val: None,
            },
            Entree {
                exp: "c".into(),
                res: "-12.5".into(),
                t: 0,
                val: None,
            },
        ]);
        let mut c = Calculatrice::new(h);

        c.replay(0);
        assert_eq!(c.saisie().canonique(), "240000000000000");
        assert_eq!(c.saisie().affichage(), "2.4e14");

        c.replay(1);
        assert!(c.saisie().est_vide());
        assert_eq!(c.ecran().principal(), MARQUEUR_INFINI);

        c.replay(2);
        assert_eq!(c.saisie().canonique(), "-12.5");
    }

    #[test]
    fn delete_jusqu_a_vide() {
        let mut c = Calculatrice::default();
        taper(&mut c, "12");
        c.delete();
        assert_eq!(c.ecran().principal(), "1");
        c.delete();
        assert_eq!(c.ecran().principal(), "0");
        assert!(!c.delete());
    }

    #[test]
    fn clear_history_garde_la_saisie() {
        let mut c = Calculatrice::default();
        taper(&mut c, "1+1");
        c.egal(0);
        taper(&mut c, "+2");
        c.clear_history();
        assert!(c.historique().is_empty());
        assert_eq!(c.saisie().canonique(), "2+2");
    }
}
