// src/app/flux.rs
//
// Enchaînements de dialogues (confirmation -> action -> alerte, alerte -> alerte).
//
// Chaque flux est une petite machine d’état interrogée à chaque frame :
// la demande suivante n’est faite qu’une fois le ticket précédent résolu.

use std::collections::VecDeque;

use tracing::debug;

use crate::noyau::dialogue::{Demande, Sequenceur, Ticket};
use crate::noyau::stockage::VERSION_APP;

/* ------------------------ Textes ------------------------ */

pub const TITRE_NOUVEAUTES: &str = "What's New?";
pub const TITRE_NOTICE: &str = "NOTICE";
pub const TITRE_INFINI: &str = "Infinity!";

fn texte_nouveautes() -> String {
    format!(
        "{VERSION_APP} (Official Release)\n\
         • Tactile keypad with history and settings panels\n\
         • Scientific typing stays short: 2.4e14 + 33\n\
         • History replays the exact value of scientific results\n\
         • Upgrades keep your saved data (backed up first)\n\
         • Clear Saved Data removes history only\n\
         • Reset Settings asks for confirmation"
    )
}

fn texte_notice() -> String {
    format!(
        "• This is the official release build ({VERSION_APP}). Features may still evolve.\n\
         • Upgrading keeps your saved data. Downgrading resets for safety.\n\
         • Clear Saved Data removes history only.\n\
         • Scientific typing stays short (example: 2.4e14 + 33)."
    )
}

const TEXTE_INFINI: &str = "In mathematics, there is no maximum number before infinity \
because numbers go on forever. Infinity is a concept or a limit, not a specific number.\n\n\
Commonly cited huge finite numbers:\n\
• Googolplex (10^(10^100))\n\
• Googolplexian (10^(googolplex))\n\
• Rayo's Number\n\
• Graham's Number\n\n\
Key facts:\n\
• Any power of 10 is still finite.\n\
• infinity + 1 = infinity (in transfinite arithmetic).\n\
• Observable universe atoms: about 10^80 to 10^82.";

pub fn demande_infini() -> Demande<bool> {
    Demande::alerte(TITRE_INFINI, TEXTE_INFINI)
}

/* ------------------------ Actions confirmées ------------------------ */

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ActionConfirmee {
    /// "Clear Saved Data" : historique seulement.
    EffacerHistorique,
    ResetReglages,
}

impl ActionConfirmee {
    fn question(self) -> Demande<bool> {
        let corps = match self {
            Self::EffacerHistorique => "Do you want to Clear Saved Data?",
            Self::ResetReglages => "Reset settings back to default?",
        };
        Demande::confirmation("Confirm", corps)
    }

    /// Alerte montrée après l’action.
    fn compte_rendu(self) -> Demande<bool> {
        let corps = match self {
            Self::EffacerHistorique => "Cleared Saved Data",
            Self::ResetReglages => "Settings is now back to default...",
        };
        Demande::alerte("Alert", corps)
    }
}

/// Effet appliqué quand une chaîne d’alertes se termine.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Effet {
    MarquerBienvenue,
}

/* ------------------------ Flux ------------------------ */

#[derive(Debug)]
pub enum Flux {
    Confirmation {
        ticket: Ticket<bool>,
        action: ActionConfirmee,
    },
    Alertes {
        ticket: Ticket<bool>,
        suite: VecDeque<Demande<bool>>,
        fin: Option<Effet>,
    },
}

/// Résultat d’un pas de flux.
#[derive(Debug)]
pub enum Pas {
    Attente(Flux),
    /// Confirmé : l’appelant agit, puis lance `Flux::apres_action`.
    Agir(ActionConfirmee),
    Termine(Option<Effet>),
}

impl Flux {
    pub fn confirmer(seq: &mut Sequenceur<bool>, action: ActionConfirmee) -> Self {
        Self::Confirmation {
            ticket: seq.request(action.question()),
            action,
        }
    }

    /// Alertes en chaîne ; la première est demandée tout de suite.
    pub fn alertes(
        seq: &mut Sequenceur<bool>,
        demandes: impl IntoIterator<Item = Demande<bool>>,
        fin: Option<Effet>,
    ) -> Option<Self> {
        let mut suite: VecDeque<_> = demandes.into_iter().collect();
        let premiere = suite.pop_front()?;
        Some(Self::Alertes {
            ticket: seq.request(premiere),
            suite,
            fin,
        })
    }

    /// "What's New?" puis "NOTICE".
    pub fn nouveautes(seq: &mut Sequenceur<bool>, fin: Option<Effet>) -> Option<Self> {
        Self::alertes(
            seq,
            [
                Demande::alerte(TITRE_NOUVEAUTES, texte_nouveautes()),
                Demande::alerte(TITRE_NOTICE, texte_notice()),
            ],
            fin,
        )
    }

    pub fn apres_action(seq: &mut Sequenceur<bool>, action: ActionConfirmee) -> Option<Self> {
        Self::alertes(seq, [action.compte_rendu()], None)
    }

    /// Interroge le ticket courant (non bloquant).
    pub fn avancer(self, seq: &mut Sequenceur<bool>) -> Pas {
        match self {
            Self::Confirmation { mut ticket, action } => match ticket.try_take() {
                None => Pas::Attente(Self::Confirmation { ticket, action }),
                Some(true) => {
                    debug!(?action, "action confirmée");
                    Pas::Agir(action)
                }
                Some(false) => {
                    debug!(?action, "action annulée");
                    Pas::Termine(None)
                }
            },

            Self::Alertes {
                mut ticket,
                mut suite,
                fin,
            } => {
                if ticket.try_take().is_none() {
                    return Pas::Attente(Self::Alertes { ticket, suite, fin });
                }
                match suite.pop_front() {
                    Some(d) => Pas::Attente(Self::Alertes {
                        ticket: seq.request(d),
                        suite,
                        fin,
                    }),
                    None => Pas::Termine(fin),
                }
            }
        }
    }
}
