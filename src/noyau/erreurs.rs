//! Noyau - erreurs d’évaluation.
//!
//! Toutes ces erreurs sont récupérées au niveau de la calculatrice
//! (`Calculatrice::egal`) : l’utilisateur voit "Error", jamais une panique.
//! L’infini n’est PAS une erreur (voir `calculatrice::Issue::Infini`).

use thiserror::Error;

/// Alias pratique pour le noyau.
pub type Resultat<T> = std::result::Result<T, ErreurCalc>;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ErreurCalc {
    /// Caractère hors alphabet, ou paire interdite (`**`, `//`).
    #[error("Invalid")]
    Invalide,

    /// Nombre de '(' différent du nombre de ')'.
    #[error("Unbalanced")]
    NonEquilibre,

    /// Suite de jetons impossible à lire (opérateur pendant, "()", "2(3)", ...).
    #[error("Malformed: {0}")]
    Malforme(String),

    /// Résultat NaN (ex: 0/0).
    #[error("Indeterminate")]
    Indetermine,
}

impl ErreurCalc {
    pub(crate) fn malforme(msg: impl Into<String>) -> Self {
        Self::Malforme(msg.into())
    }
}
