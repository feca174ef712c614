// src/noyau/jetons.rs

use super::erreurs::{ErreurCalc, Resultat};

/// Alphabet autorisé (forme canonique).
pub const ALPHABET: &str = "0123456789+-*/().%";

#[derive(Clone, Debug, PartialEq)]
pub enum Tok {
    Num(f64),

    Plus,
    Minus,
    Star,
    Slash,
    Percent, // postfixe : x% = x/100

    LPar,
    RPar,
}

/// Vrai si `c` fait partie de l’alphabet.
pub fn est_autorise(c: char) -> bool {
    ALPHABET.contains(c)
}

/// Vrai pour les quatre opérateurs binaires.
pub fn est_operateur(c: char) -> bool {
    matches!(c, '+' | '-' | '*' | '/')
}

/// Retire tout caractère hors alphabet. Ne échoue jamais ("" est valide).
pub fn sanitize(brut: &str) -> String {
    brut.chars().filter(|&c| est_autorise(c)).collect()
}

/// Nombre de '(' moins nombre de ')' sur toute la chaîne (pas un minimum courant).
pub fn unmatched_open_parens(s: &str) -> i64 {
    s.chars().fold(0i64, |acc, c| match c {
        '(' => acc + 1,
        ')' => acc - 1,
        _ => acc,
    })
}

/// Tokenize une chaîne déjà filtrée.
/// Supporte:
/// - nombres décimaux (12, 1.5, .5, 5.)
/// - opérateurs + - * /
/// - parenthèses ( )
/// - pourcentage postfixe %
pub fn tokenize(s: &str) -> Resultat<Vec<Tok>> {
    let mut out = Vec::new();
    let chars: Vec<char> = s.chars().collect();
    let mut i: usize = 0;

    while i < chars.len() {
        let c = chars[i];

        let simple = match c {
            '+' => Some(Tok::Plus),
            '-' => Some(Tok::Minus),
            '*' => Some(Tok::Star),
            '/' => Some(Tok::Slash),
            '%' => Some(Tok::Percent),
            '(' => Some(Tok::LPar),
            ')' => Some(Tok::RPar),
            _ => None,
        };
        if let Some(t) = simple {
            out.push(t);
            i += 1;
            continue;
        }

        // Nombre : chiffres avec au plus un point
        if c.is_ascii_digit() || c == '.' {
            let start = i;
            let mut points = 0usize;
            while i < chars.len() && (chars[i].is_ascii_digit() || chars[i] == '.') {
                if chars[i] == '.' {
                    points += 1;
                }
                i += 1;
            }
            let lit: String = chars[start..i].iter().collect();

            if points > 1 {
                return Err(ErreurCalc::malforme(format!("nombre invalide: {lit}")));
            }
            if lit == "." {
                return Err(ErreurCalc::malforme("point isolé"));
            }

            let v = lit
                .parse::<f64>()
                .map_err(|_| ErreurCalc::malforme(format!("nombre invalide: {lit}")))?;
            out.push(Tok::Num(v));
            continue;
        }

        return Err(ErreurCalc::malforme(format!("caractère inattendu: '{c}'")));
    }

    Ok(out)
}

/// Format utilitaire (debug/traces) : liste de jetons en texte.
pub fn format_tokens(tokens: &[Tok]) -> String {
    tokens
        .iter()
        .map(|t| match t {
            Tok::Num(v) => format!("{v}"),
            Tok::Plus => "+".to_string(),
            Tok::Minus => "-".to_string(),
            Tok::Star => "*".to_string(),
            Tok::Slash => "/".to_string(),
            Tok::Percent => "%".to_string(),
            Tok::LPar => "(".to_string(),
            Tok::RPar => ")".to_string(),
        })
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sanitize_garde_seulement_alphabet() {
        assert_eq!(sanitize("2 + 2 = ?"), "2+2");
        assert_eq!(sanitize("abc"), "");
        assert_eq!(sanitize("2.4e14"), "2.414");
        assert_eq!(sanitize("(1+2)%*3/4-5"), "(1+2)%*3/4-5");
    }

    #[test]
    fn parens_compte_global() {
        assert_eq!(unmatched_open_parens("((1)"), 1);
        assert_eq!(unmatched_open_parens(")("), 0);
        assert_eq!(unmatched_open_parens("1)"), -1);
        assert_eq!(unmatched_open_parens(""), 0);
    }

    #[test]
    fn tokenize_decimaux() {
        let t = tokenize(".5+5.").unwrap();
        assert_eq!(t, vec![Tok::Num(0.5), Tok::Plus, Tok::Num(5.0)]);
    }

    #[test]
    fn tokenize_refuse_double_point() {
        assert!(matches!(tokenize("1.2.3"), Err(ErreurCalc::Malforme(_))));
        assert!(matches!(tokenize("."), Err(ErreurCalc::Malforme(_))));
    }

    #[test]
    fn format_tokens_lisible() {
        let t = tokenize("(12%)*3").unwrap();
        assert_eq!(format_tokens(&t), "( 12 % ) * 3");
    }
}
