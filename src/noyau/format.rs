// src/noyau/format.rs

use super::eval::arrondi_12;

/// Marqueur "non borné" : la vue montre l’explication dédiée.
pub const MARQUEUR_INFINI: &str = "Infinity!";

/// Marqueur d’erreur (NaN, expression invalide).
pub const MARQUEUR_ERREUR: &str = "Error";

/// À partir de ce module, affichage scientifique court.
const SEUIL_SCI: f64 = 1e10;

/* ------------------------ Résultat -> texte ------------------------ */

/// Vrai si `n` est fini et assez grand pour la notation scientifique courte.
pub fn utilise_sci(n: f64) -> bool {
    n.is_finite() && n.abs() >= SEUIL_SCI
}

/// Texte affiché pour un résultat.
///
/// - ±inf      -> "Infinity!"
/// - NaN       -> "Error"
/// - |n| ≥ 1e10 -> "2.4e14" (mantisse à 1 décimale, pas de '+')
/// - sinon     -> décimal le plus court après arrondi à 12 décimales
pub fn format_resultat(n: f64) -> String {
    if n.is_infinite() {
        return MARQUEUR_INFINI.to_string();
    }
    if n.is_nan() {
        return MARQUEUR_ERREUR.to_string();
    }
    if utilise_sci(n) {
        return format_sci(n);
    }
    nombre_canonique(arrondi_12(n))
}

/// Notation scientifique courte : `format!("{:.1e}")` n’écrit jamais de '+'.
fn format_sci(n: f64) -> String {
    format!("{n:.1e}")
}

/// Chiffres exacts d’un nombre fini, sans exposant (re-semence de la forme canonique).
/// -0 s’écrit "0".
pub fn nombre_canonique(n: f64) -> String {
    if n == 0.0 {
        return "0".to_string();
    }
    format!("{n}")
}

/// Vrai si `s` ressemble à une forme scientifique courte produite par `format_resultat`.
pub fn est_forme_sci(s: &str) -> bool {
    let (mantisse, exposant) = match s.split_once('e') {
        Some(p) => p,
        None => return false,
    };
    let mantisse = mantisse.strip_prefix('-').unwrap_or(mantisse);
    !mantisse.is_empty()
        && mantisse.chars().all(|c| c.is_ascii_digit() || c == '.')
        && !exposant.is_empty()
        && exposant.chars().all(|c| c.is_ascii_digit())
}

/* ------------------------ Expression -> vue ------------------------ */

/// Vue d’une expression pour l’écran : `*`→`×`, `/`→`÷`,
/// un espace de part et d’autre de `+ - × ÷`, espaces fusionnés.
pub fn vue_expression(d: &str) -> String {
    let mut out = String::with_capacity(d.len() * 2);
    for c in d.chars() {
        match c {
            '*' => out.push_str(" × "),
            '/' => out.push_str(" ÷ "),
            '+' | '-' => {
                out.push(' ');
                out.push(c);
                out.push(' ');
            }
            _ => out.push(c),
        }
    }
    out.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn marqueurs() {
        assert_eq!(format_resultat(f64::INFINITY), MARQUEUR_INFINI);
        assert_eq!(format_resultat(f64::NEG_INFINITY), MARQUEUR_INFINI);
        assert_eq!(format_resultat(f64::NAN), MARQUEUR_ERREUR);
    }

    #[test]
    fn scientifique_sans_plus() {
        assert_eq!(format_resultat(1e10), "1.0e10");
        assert_eq!(format_resultat(240_000_000_000_001.0), "2.4e14");
        assert_eq!(format_resultat(-3e12), "-3.0e12");
        assert!(!format_resultat(1e20).contains('+'));
    }

    #[test]
    fn decimal_le_plus_court() {
        assert_eq!(format_resultat(0.1 + 0.2), "0.3");
        assert_eq!(format_resultat(4.0), "4");
        assert_eq!(format_resultat(-0.0), "0");
        assert_eq!(format_resultat(9_999_999_999.0), "9999999999");
        assert_eq!(format_resultat(0.125), "0.125");
    }

    #[test]
    fn canonique_sans_exposant() {
        assert_eq!(nombre_canonique(240_000_000_000_001.0), "240000000000001");
        assert_eq!(nombre_canonique(1e21), "1000000000000000000000");
        assert_eq!(nombre_canonique(-12.5), "-12.5");
    }

    #[test]
    fn reconnait_forme_sci() {
        assert!(est_forme_sci("2.4e14"));
        assert!(est_forme_sci("-1.0e10"));
        assert!(!est_forme_sci("240"));
        assert!(!est_forme_sci(MARQUEUR_INFINI));
        assert!(!est_forme_sci("e5"));
    }

    #[test]
    fn vue_espacee() {
        assert_eq!(vue_expression("2.4e14+33"), "2.4e14 + 33");
        assert_eq!(vue_expression("(1+2)*3/4"), "(1 + 2) × 3 ÷ 4");
        assert_eq!(vue_expression("-5"), "- 5");
        assert_eq!(vue_expression(""), "");
    }
}
