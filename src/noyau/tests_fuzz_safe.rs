//! Tests fuzz safe : robustesse + déterminisme + limites contrôlées.
//!
//! But : marteler le clavier sans brûler la machine.
//! - RNG déterministe (seed fixe)
//! - nombre de frappes borné
//! - budget temps global
//! - invariants de saisie vérifiés après CHAQUE frappe

use std::time::{Duration, Instant};

use super::calculatrice::{Calculatrice, Issue};
use super::erreurs::ErreurCalc;
use super::eval::evaluer;
use super::historique::HISTORIQUE_MAX;
use super::jetons::{est_operateur, ALPHABET};
use super::saisie::LONGUEUR_MAX;

/* ------------------------ RNG déterministe minimal ------------------------ */

#[derive(Clone)]
struct Rng {
    state: u64,
}
impl Rng {
    fn new(seed: u64) -> Self {
        Self { state: seed }
    }
    fn next_u32(&mut self) -> u32 {
        // LCG simple (déterministe)
        self.state = self.state.wrapping_mul(6364136223846793005).wrapping_add(1);
        (self.state >> 32) as u32
    }
    fn pick(&mut self, n: u32) -> u32 {
        if n == 0 {
            0
        } else {
            self.next_u32() % n
        }
    }
}

/* ------------------------ Budget anti-gel ------------------------ */

fn budget(start: Instant, max: Duration) {
    if start.elapsed() > max {
        panic!("budget temps dépassé: {:?}", max);
    }
}

/* ------------------------ Clavier ------------------------ */

#[derive(Clone, Copy, Debug)]
enum Touche {
    Jeton(&'static str),
    Del,
    Clear,
    Egal,
}

const JETONS: [&str; 17] = [
    "0", "1", "2", "3", "4", "5", "6", "7", "8", "9", ".", "+", "-", "*", "/", "%", "(",
];

fn touche(rng: &mut Rng) -> Touche {
    match rng.pick(24) {
        0..=16 => Touche::Jeton(JETONS[rng.pick(JETONS.len() as u32) as usize]),
        17 | 18 => Touche::Jeton(")"),
        19 | 20 => Touche::Del,
        21 => Touche::Clear,
        _ => Touche::Egal,
    }
}

/* ------------------------ Invariants ------------------------ */

fn check_saisie(c: &Calculatrice, trace: &[Touche]) {
    let canon = c.saisie().canonique();
    let ctx = || format!("canonique={canon:?} après {:?}", trace.last());

    assert!(canon.chars().all(|x| ALPHABET.contains(x)), "{}", ctx());

    if let Some(premier) = canon.chars().next() {
        assert!(!"*/%+)".contains(premier), "début interdit : {}", ctx());
    }

    let cs: Vec<char> = canon.chars().collect();
    for w in cs.windows(2) {
        assert!(
            !(est_operateur(w[0]) && est_operateur(w[1])),
            "deux opérateurs : {}",
            ctx()
        );
        assert!(!(w[0] == '(' && w[1] == ')'), "parenthèses vides : {}", ctx());
        assert!(!(w[0] == '%' && w[1] == '%'), "%% : {}", ctx());
    }

    let mut prof = 0i64;
    for ch in canon.chars() {
        match ch {
            '(' => prof += 1,
            ')' => prof -= 1,
            _ => {}
        }
        assert!(prof >= 0, "')' orpheline : {}", ctx());
    }

    for segment in canon.split(|x: char| est_operateur(x) || x == '(' || x == ')') {
        assert!(segment.matches('.').count() <= 1, "deux points : {}", ctx());
    }

}

/* ------------------------ Tests ------------------------ */

#[test]
fn fuzz_clavier_invariants() {
    let start = Instant::now();
    let max = Duration::from_secs(5);

    for seed in 1..=40u64 {
        let mut rng = Rng::new(seed);
        let mut c = Calculatrice::default();
        let mut trace = Vec::new();

        for i in 0..600 {
            let t = touche(&mut rng);
            trace.push(t);
            match t {
                Touche::Jeton(j) => {
                    // plafond sur la canonique : '0' ou '*' implicite peuvent ajouter un caractère
                    if c.append(j) {
                        assert!(
                            c.saisie().canonique().len() <= LONGUEUR_MAX + 1,
                            "trop long : {:?}",
                            c.saisie().canonique()
                        );
                    }
                }
                Touche::Del => {
                    c.delete();
                }
                Touche::Clear => c.clear(),
                Touche::Egal => match c.egal(i) {
                    Issue::Resultat(r) => {
                        assert!(!r.contains("NaN") && !r.contains("inf"), "résultat {r}");
                    }
                    Issue::Rien | Issue::Infini | Issue::Erreur(_) => {}
                },
            }
            check_saisie(&c, &trace);
            if i % 50 == 0 {
                budget(start, max);
            }
        }

        assert!(c.historique().len() <= HISTORIQUE_MAX);
    }
}

#[test]
fn fuzz_historique_borne() {
    let mut c = Calculatrice::default();
    for i in 0..(HISTORIQUE_MAX as i64 + 50) {
        c.append("1");
        c.append("+");
        c.append("1");
        assert!(matches!(c.egal(i), Issue::Resultat(_)));
        c.clear();
    }
    assert_eq!(c.historique().len(), HISTORIQUE_MAX);
    // le plus récent en tête
    assert_eq!(c.historique().entries()[0].t, HISTORIQUE_MAX as i64 + 49);
}

#[test]
fn fuzz_evaluateur_ne_panique_pas() {
    let start = Instant::now();
    let max = Duration::from_secs(3);
    let alphabet: Vec<char> = "0123456789+-*/().% x".chars().collect();

    let mut rng = Rng::new(0xC0FFEE);
    for i in 0..20_000 {
        let n = 1 + rng.pick(24) as usize;
        let s: String = (0..n)
            .map(|_| alphabet[rng.pick(alphabet.len() as u32) as usize])
            .collect();

        match evaluer(&s) {
            Ok(v) => assert!(v.is_finite() || v.is_infinite() || v.is_nan()),
            Err(
                ErreurCalc::Invalide
                | ErreurCalc::NonEquilibre
                | ErreurCalc::Malforme(_)
                | ErreurCalc::Indetermine,
            ) => {}
        }

        if i % 1000 == 0 {
            budget(start, max);
        }
    }
}

#[test]
fn fuzz_deterministe() {
    let run = |seed| {
        let mut rng = Rng::new(seed);
        let mut c = Calculatrice::default();
        for i in 0..300 {
            match touche(&mut rng) {
                Touche::Jeton(j) => {
                    c.append(j);
                }
                Touche::Del => {
                    c.delete();
                }
                Touche::Clear => c.clear(),
                Touche::Egal => {
                    c.egal(i);
                }
            }
        }
        (
            c.saisie().canonique().to_string(),
            c.ecran().principal().to_string(),
            c.historique().entries().to_vec(),
        )
    };
    assert_eq!(run(7), run(7));
}
