// src/noyau/rpn.rs
//
// Shunting-yard -> RPN -> valeur f64
// Objectif:
// - Convertir une suite de Tok en RPN (postfix)
// - Puis évaluer la RPN sur une pile de f64
//
// Règles:
// - Moins/plus unaire : si '-' ou '+' arrive quand on n’attend PAS d’opérateur,
//   c’est un préfixe (priorité au-dessus de * et /, associatif à droite).
// - Pourcentage : opérateur POSTFIXE sur un nombre ou un groupe "(...)".
//   Comme il est postfixe et de priorité maximale, il sort directement en RPN
//   derrière son opérande (déjà complet dans la sortie).
// - "%%" est refusé (un seul pourcentage par opérande) ; "(5%)%" est accepté.
// - Juxtaposition ("2(3)", "(2)3", "2%3") refusée : la saisie insère déjà '*'.

use super::erreurs::{ErreurCalc, Resultat};
use super::jetons::Tok;

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Rpn {
    Num(f64),
    Add,
    Sub,
    Mul,
    Div,
    Neg,
    Percent,
}

/// Opérateurs en attente sur la pile du shunting-yard.
#[derive(Clone, Copy, Debug, PartialEq)]
enum OpPile {
    Binaire(Rpn),
    Neg,
    Pos,
    LPar,
}

fn precedence(op: OpPile) -> i32 {
    match op {
        OpPile::Binaire(Rpn::Add | Rpn::Sub) => 1,
        OpPile::Binaire(_) => 2,
        OpPile::Neg | OpPile::Pos => 3,
        OpPile::LPar => 0,
    }
}

fn vers_sortie(op: OpPile, out: &mut Vec<Rpn>) {
    match op {
        OpPile::Binaire(r) => out.push(r),
        OpPile::Neg => out.push(Rpn::Neg),
        // +x == x
        OpPile::Pos | OpPile::LPar => {}
    }
}

/// Convertit une suite de jetons en RPN (notation polonaise inversée).
///
/// Exemple:
///   tokens: [LPar, Num(5), Plus, Num(5), RPar, Percent]
///   rpn:    [Num(5), Num(5), Add, Percent]
pub fn to_rpn(tokens: &[Tok]) -> Resultat<Vec<Rpn>> {
    if tokens.is_empty() {
        return Err(ErreurCalc::malforme("expression vide"));
    }

    let mut out: Vec<Rpn> = Vec::with_capacity(tokens.len());
    let mut ops: Vec<OpPile> = Vec::new();

    // “valeur” = un nombre, un groupe fermé, ou un de ceux-ci suivi de '%'.
    let mut prev_was_value = false;
    let mut prev_was_percent = false;

    for tok in tokens {
        match tok {
            Tok::Num(v) => {
                if prev_was_value {
                    return Err(ErreurCalc::malforme("nombre collé à une valeur"));
                }
                out.push(Rpn::Num(*v));
                prev_was_value = true;
                prev_was_percent = false;
            }

            Tok::LPar => {
                if prev_was_value {
                    return Err(ErreurCalc::malforme("'(' collée à une valeur"));
                }
                ops.push(OpPile::LPar);
            }

            Tok::RPar => {
                if !prev_was_value {
                    return Err(ErreurCalc::malforme("')' sans valeur"));
                }
                let mut ouverte = false;
                while let Some(top) = ops.pop() {
                    if top == OpPile::LPar {
                        ouverte = true;
                        break;
                    }
                    vers_sortie(top, &mut out);
                }
                if !ouverte {
                    return Err(ErreurCalc::malforme("')' sans '(' correspondante"));
                }
                prev_was_percent = false;
            }

            Tok::Percent => {
                if !prev_was_value {
                    return Err(ErreurCalc::malforme("'%' sans opérande"));
                }
                if prev_was_percent {
                    return Err(ErreurCalc::malforme("'%%'"));
                }
                out.push(Rpn::Percent);
                prev_was_percent = true;
            }

            Tok::Plus | Tok::Minus if !prev_was_value => {
                // préfixe : rien à dépiler (un préfixe ne ferme aucun opérande)
                ops.push(if *tok == Tok::Minus {
                    OpPile::Neg
                } else {
                    OpPile::Pos
                });
            }

            Tok::Plus | Tok::Minus | Tok::Star | Tok::Slash => {
                if !prev_was_value {
                    return Err(ErreurCalc::malforme("opérateur sans opérande gauche"));
                }
                let op = OpPile::Binaire(match tok {
                    Tok::Plus => Rpn::Add,
                    Tok::Minus => Rpn::Sub,
                    Tok::Star => Rpn::Mul,
                    _ => Rpn::Div,
                });

                // tous associatifs à gauche
                while let Some(&top) = ops.last() {
                    if top == OpPile::LPar || precedence(top) < precedence(op) {
                        break;
                    }
                    ops.pop();
                    vers_sortie(top, &mut out);
                }

                ops.push(op);
                prev_was_value = false;
                prev_was_percent = false;
            }
        }
    }

    if !prev_was_value {
        return Err(ErreurCalc::malforme("opérateur pendant en fin d’expression"));
    }

    // vide la pile ops
    while let Some(op) = ops.pop() {
        if op == OpPile::LPar {
            return Err(ErreurCalc::NonEquilibre);
        }
        vers_sortie(op, &mut out);
    }

    Ok(out)
}

/// Évalue une RPN en arithmétique flottante ordinaire (IEEE 754).
/// Division par zéro => ±inf, 0/0 => NaN : pas d’erreur ici.
pub fn eval_rpn(rpn: &[Rpn]) -> Resultat<f64> {
    let mut st: Vec<f64> = Vec::with_capacity(rpn.len());

    for op in rpn {
        match op {
            Rpn::Num(v) => st.push(*v),

            Rpn::Neg | Rpn::Percent => {
                let x = st.pop().ok_or_else(|| ErreurCalc::malforme("opérande manquant"))?;
                st.push(if *op == Rpn::Neg { -x } else { x / 100.0 });
            }

            Rpn::Add | Rpn::Sub | Rpn::Mul | Rpn::Div => {
                let b = st.pop().ok_or_else(|| ErreurCalc::malforme("opérande manquant"))?;
                let a = st.pop().ok_or_else(|| ErreurCalc::malforme("opérande manquant"))?;
                st.push(match op {
                    Rpn::Add => a + b,
                    Rpn::Sub => a - b,
                    Rpn::Mul => a * b,
                    _ => a / b,
                });
            }
        }
    }

    match (st.pop(), st.is_empty()) {
        (Some(v), true) => Ok(v),
        _ => Err(ErreurCalc::malforme("expression invalide")),
    }
}
