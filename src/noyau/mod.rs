//! Noyau calculatrice tactile (sans interface)
//!
//! Organisation interne :
//! - jetons.rs       : alphabet, filtrage, tokenisation
//! - rpn.rs          : shunting-yard + évaluation postfixe
//! - eval.rs         : pipeline complet + arrondi 12 décimales
//! - format.rs       : résultat -> texte, vue de l’expression
//! - saisie.rs       : machine d’état de la saisie (canonique / affichée)
//! - historique.rs   : registre borné des calculs
//! - calculatrice.rs : saisie + "=" + historique + écran
//! - dialogue.rs     : file de dialogues modaux (un à la fois)
//! - panneaux.rs     : panneaux Réglages / Historique
//! - reglages.rs     : réglages utilisateur + retour tactile
//! - stockage.rs     : clés persistées + sécurité de version
//! - erreurs.rs      : erreurs d’évaluation

pub mod calculatrice;
pub mod dialogue;
pub mod erreurs;
pub mod eval;
pub mod format;
pub mod historique;
pub mod jetons;
pub mod panneaux;
pub mod reglages;
pub mod rpn;
pub mod saisie;
pub mod stockage;

#[cfg(test)]
mod tests_fuzz_safe;

// API publique minimale
pub use calculatrice::{Calculatrice, Issue};
pub use stockage::Stockage;
