//! Noyau - saisie (machine à états de l’expression).
//!
//! Deux représentations :
//! - la forme CANONIQUE, seule donnée évaluée ;
//! - la forme AFFICHÉE, dérivée de la canonique + d’une étiquette explicite.
//!
//! Contrats :
//! - la canonique ne commence jamais par `+ * / %` ;
//! - jamais deux opérateurs binaires consécutifs (le plus ancien est remplacé) ;
//! - un seul point par segment numérique ;
//! - `)` seulement s’il reste une `(` ouverte.

use tracing::debug;

use super::jetons::{est_operateur, sanitize, unmatched_open_parens};

/// Garde-fou : longueur maximale de la forme canonique (vérifiée avant chaque ajout).
pub const LONGUEUR_MAX: usize = 60;

/// Étiquette de la forme affichée.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum FormeAffichage {
    /// Affichage == canonique.
    #[default]
    Simple,

    /// Après un résultat scientifique : l’écran garde `courte` ("2.4e14")
    /// tandis que la canonique porte la valeur complète sur ses `graine`
    /// premiers caractères. Affichage == courte + canonique[graine..].
    SciChainee { courte: String, graine: usize },
}

#[derive(Clone, Debug, Default)]
pub struct Saisie {
    canonique: String,
    forme: FormeAffichage,
    dernier_egal: bool,
}

impl Saisie {
    /* ------------------------ Lecture ------------------------ */

    pub fn canonique(&self) -> &str {
        &self.canonique
    }

    pub fn forme(&self) -> &FormeAffichage {
        &self.forme
    }

    /// Texte affiché (avant mise en forme "× ÷").
    pub fn affichage(&self) -> String {
        match &self.forme {
            FormeAffichage::Simple => self.canonique.clone(),
            FormeAffichage::SciChainee { courte, graine } => {
                format!("{courte}{}", &self.canonique[*graine..])
            }
        }
    }

    pub fn est_vide(&self) -> bool {
        self.canonique.is_empty()
    }

    /// Vrai si la dernière action a été "=" (ou une relecture d’historique).
    pub fn dernier_egal(&self) -> bool {
        self.dernier_egal
    }

    /* ------------------------ Actions ------------------------ */

    /// C : tout effacer (formes + drapeaux).
    pub fn clear(&mut self) {
        self.canonique.clear();
        self.forme = FormeAffichage::Simple;
        self.dernier_egal = false;
    }

    /// DEL : retire exactement un caractère. Renvoie false si rien à retirer.
    pub fn delete(&mut self) -> bool {
        if self.canonique.is_empty() {
            return false;
        }
        self.retirer_dernier();
        if self.canonique.is_empty() {
            self.forme = FormeAffichage::Simple;
        }
        true
    }

    /// Ajoute un jeton (filtré, puis caractère par caractère).
    /// Renvoie true si l’expression a changé.
    pub fn append(&mut self, jeton: &str) -> bool {
        let propre = sanitize(jeton);
        let mut change = false;
        for c in propre.chars() {
            change |= self.append_char(c);
        }
        change
    }

    fn append_char(&mut self, c: char) -> bool {
        // Après "=", un chiffre / '.' / '(' repart d’une expression neuve.
        if self.dernier_egal && (c.is_ascii_digit() || c == '.' || c == '(') {
            self.clear();
        }

        if !self.preparer(c) {
            debug!(jeton = %c, canonique = %self.canonique, "saisie refusée");
            return false;
        }

        self.canonique.push(c);
        self.dernier_egal = false;
        true
    }

    /// Règles d’adjacence. Peut modifier la canonique (fusion d’opérateurs,
    /// '0' devant '.', '*' implicite devant '(') uniquement si l’ajout est accepté.
    fn preparer(&mut self, c: char) -> bool {
        if self.canonique.len() >= LONGUEUR_MAX {
            return false;
        }

        let mut fin = self.canonique.chars().rev();
        let dernier = fin.next();
        let avant_dernier = fin.next();

        // Opérateur en début de segment : seul le moins unaire passe.
        let debut_segment = |x: Option<char>| x.is_none() || x == Some('(');

        if est_operateur(c) {
            if c != '-' && debut_segment(dernier) {
                return false;
            }
            if let Some(d) = dernier.filter(|&d| est_operateur(d)) {
                if c != '-' && debut_segment(avant_dernier) {
                    return false;
                }
                if d == c {
                    return false;
                }
                self.retirer_dernier();
                return true;
            }
            return true;
        }

        match c {
            '.' => {
                let segment = self
                    .canonique
                    .rsplit(|x: char| est_operateur(x) || x == '(' || x == ')')
                    .next()
                    .unwrap_or("");
                if segment.contains('.') {
                    return false;
                }
                if segment.is_empty() && dernier.map_or(true, |d| est_operateur(d) || d == '(') {
                    self.canonique.push('0');
                }
                true
            }

            '%' => match dernier {
                None | Some('%' | '(' | '.') => false,
                Some(d) => !est_operateur(d),
            },

            ')' => {
                if unmatched_open_parens(&self.canonique) <= 0 {
                    return false;
                }
                match dernier {
                    None | Some('(') => false,
                    Some(d) => !est_operateur(d),
                }
            }

            '(' => {
                if dernier.is_some_and(|d| d.is_ascii_digit() || d == '%' || d == ')') {
                    self.canonique.push('*');
                }
                true
            }

            _ => true,
        }
    }

    /// Retire le dernier caractère canonique ; si la queue tapée est vide,
    /// la graine scientifique est entamée et l’affichage redevient simple.
    fn retirer_dernier(&mut self) {
        if let FormeAffichage::SciChainee { graine, .. } = &self.forme {
            if self.canonique.len() <= *graine {
                self.forme = FormeAffichage::Simple;
            }
        }
        self.canonique.pop();
    }

    /* ------------------------ Après évaluation ------------------------ */

    /// Re-sème la canonique avec la valeur exacte d’un résultat.
    /// `courte` = forme scientifique affichée, si le formateur l’a choisie.
    pub fn semer_resultat(&mut self, canonique: String, courte: Option<String>) {
        self.forme = match courte {
            Some(courte) if !canonique.is_empty() => FormeAffichage::SciChainee {
                courte,
                graine: canonique.len(),
            },
            _ => FormeAffichage::Simple,
        };
        self.canonique = canonique;
        self.dernier_egal = true;
    }

    /// Résultat infini : plus rien à chaîner, mais le prochain chiffre repart à neuf.
    pub fn vider_apres_infini(&mut self) {
        self.clear();
        self.dernier_egal = true;
    }
}
