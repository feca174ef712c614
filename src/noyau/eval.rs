//! Noyau - évaluation (pipeline réel)
//!
//! sanitize -> gardes (paires interdites, équilibre) -> jetons -> RPN -> f64 -> arrondi 12 décimales
//!
//! Remarque : ±inf et NaN sortent tels quels. C’est la calculatrice qui décide
//! (infini = cas célébré, NaN = "Error").

use tracing::trace;

use super::erreurs::{ErreurCalc, Resultat};
use super::jetons::{est_autorise, format_tokens, sanitize, tokenize, unmatched_open_parens};
use super::rpn::{eval_rpn, to_rpn};

/// Échelle d’arrondi : 12 décimales (absorbe le bruit binaire, ex: 0.1+0.2).
const ECHELLE_ARRONDI: f64 = 1e12;

/// Au-delà, x×1e12 dépasse 2^53 : round() n’a plus d’effet, seul l’aller-retour ×/÷ abîmerait x.
const SEUIL_SANS_ARRONDI: f64 = 9_007_199_254_740_992.0 / ECHELLE_ARRONDI;

/// API publique : évalue une expression et retourne sa valeur flottante.
///
/// Erreurs :
/// - `Invalide` : paire interdite `**` ou `//` (ou caractère hors alphabet)
/// - `NonEquilibre` : nombre de '(' ≠ nombre de ')'
/// - `Malforme` : suite de jetons illisible
pub fn evaluer(brut: &str) -> Resultat<f64> {
    let s = sanitize(brut);

    // Garde : après sanitize, rien hors alphabet (défense en profondeur).
    if !s.chars().all(est_autorise) {
        return Err(ErreurCalc::Invalide);
    }
    if unmatched_open_parens(&s) != 0 {
        return Err(ErreurCalc::NonEquilibre);
    }
    if s.contains("**") || s.contains("//") {
        return Err(ErreurCalc::Invalide);
    }

    let jetons = tokenize(&s)?;
    let rpn = to_rpn(&jetons)?;
    trace!(jetons = %format_tokens(&jetons), rpn_len = rpn.len(), "évaluation");

    let brut = eval_rpn(&rpn)?;
    Ok(arrondi_12(brut))
}

/// Arrondi à 12 décimales des résultats finis ; ±inf et NaN inchangés.
pub fn arrondi_12(x: f64) -> f64 {
    if !x.is_finite() || x.abs() >= SEUIL_SANS_ARRONDI {
        return x;
    }
    ((x + f64::EPSILON) * ECHELLE_ARRONDI).round() / ECHELLE_ARRONDI
}
