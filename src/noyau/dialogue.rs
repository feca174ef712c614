//! Noyau - séquenceur de dialogues (un seul modal visible à la fois).
//!
//! Fermé -> Ouvert -> Fermeture -> Fermé
//!
//! - `request` met en file ; si Fermé, la tête s’ouvre tout de suite.
//! - `dismiss` n’agit qu’en Ouvert : résout le ticket, passe en Fermeture.
//! - `tick` : fin du délai de fermeture -> Fermé, puis ouverture de la suivante.
//!
//! Chaque demande rend un `Ticket` (canal oneshot) : résolu au plus une fois,
//! attendable (`.await`) ou interrogeable sans bloquer (`try_take`, boucle egui).
//! Le temps entre par argument (`Duration` depuis le démarrage) : aucun état caché.

use std::collections::VecDeque;
use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};
use std::time::Duration;

use tokio::sync::oneshot;
use tracing::{debug, warn};

/// Animation de sortie (140 ms) + écart avant le suivant (60 ms).
pub const DELAI_FERMETURE: Duration = Duration::from_millis(140 + 60);

/// Libellé reconnu par Échap.
const LIBELLE_ANNULER: &str = "cancel";

#[derive(Clone, Debug, PartialEq)]
pub struct Bouton<V> {
    pub label: String,
    pub valeur: V,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Demande<V> {
    pub titre: String,
    pub corps: String,
    pub boutons: Vec<Bouton<V>>,
}

impl Demande<bool> {
    /// Alerte : un seul bouton "OK".
    pub fn alerte(titre: impl Into<String>, corps: impl Into<String>) -> Self {
        Self {
            titre: titre.into(),
            corps: corps.into(),
            boutons: vec![Bouton {
                label: "OK".into(),
                valeur: true,
            }],
        }
    }

    /// Confirmation : "Cancel" (false) puis "OK" (true).
    pub fn confirmation(titre: impl Into<String>, corps: impl Into<String>) -> Self {
        Self {
            titre: titre.into(),
            corps: corps.into(),
            boutons: vec![
                Bouton {
                    label: "Cancel".into(),
                    valeur: false,
                },
                Bouton {
                    label: "OK".into(),
                    valeur: true,
                },
            ],
        }
    }
}

/* ------------------------ Ticket ------------------------ */

/// Réponse future d’une demande. `None` si la demande a été abandonnée.
#[derive(Debug)]
pub struct Ticket<V> {
    rx: oneshot::Receiver<V>,
}

impl<V> Ticket<V> {
    /// Non bloquant : `Some(v)` une seule fois, quand l’utilisateur a choisi.
    pub fn try_take(&mut self) -> Option<V> {
        self.rx.try_recv().ok()
    }
}

impl<V> Future for Ticket<V> {
    type Output = Option<V>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        Pin::new(&mut self.rx).poll(cx).map(Result::ok)
    }
}

/* ------------------------ Séquenceur ------------------------ */

/// Vue publique de l’état.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EtatDialogue {
    Ferme,
    Ouvert,
    Fermeture { jusqua: Duration },
}

struct EnAttente<V> {
    demande: Demande<V>,
    reponse: oneshot::Sender<V>,
}

enum Etat<V> {
    Ferme,
    Ouvert(EnAttente<V>),
    Fermeture { jusqua: Duration },
}

pub struct Sequenceur<V> {
    etat: Etat<V>,
    file: VecDeque<EnAttente<V>>,
}

impl<V> Default for Sequenceur<V> {
    fn default() -> Self {
        Self {
            etat: Etat::Ferme,
            file: VecDeque::new(),
        }
    }
}

impl<V: Clone> Sequenceur<V> {
    pub fn etat(&self) -> EtatDialogue {
        match &self.etat {
            Etat::Ferme => EtatDialogue::Ferme,
            Etat::Ouvert(_) => EtatDialogue::Ouvert,
            Etat::Fermeture { jusqua } => EtatDialogue::Fermeture { jusqua: *jusqua },
        }
    }

    /// Le dialogue visible, s’il y en a un.
    pub fn courant(&self) -> Option<&Demande<V>> {
        match &self.etat {
            Etat::Ouvert(e) => Some(&e.demande),
            _ => None,
        }
    }

    /// Nombre de demandes en file (hors dialogue visible).
    pub fn en_file(&self) -> usize {
        self.file.len()
    }

    /// Vrai si rien n’est visible, en fermeture, ni en file.
    pub fn est_inactif(&self) -> bool {
        matches!(self.etat, Etat::Ferme) && self.file.is_empty()
    }

    /// Met une demande en file et rend son ticket.
    pub fn request(&mut self, demande: Demande<V>) -> Ticket<V> {
        let (tx, rx) = oneshot::channel();

        if demande.boutons.is_empty() {
            // ticket jamais résolu : l’émetteur est lâché ici
            warn!(titre = %demande.titre, "dialogue sans bouton ignoré");
            return Ticket { rx };
        }

        debug!(titre = %demande.titre, en_file = self.file.len(), "dialogue demandé");
        self.file.push_back(EnAttente {
            demande,
            reponse: tx,
        });
        self.ouvrir_suivant();
        Ticket { rx }
    }

    /// Active le bouton `index`. Sans effet hors de l’état Ouvert.
    pub fn dismiss(&mut self, index: usize, maintenant: Duration) -> bool {
        let valide = matches!(&self.etat, Etat::Ouvert(e) if index < e.demande.boutons.len());
        if !valide {
            debug!(index, "dismiss ignoré (pas de dialogue ouvert)");
            return false;
        }

        let etat = std::mem::replace(
            &mut self.etat,
            Etat::Fermeture {
                jusqua: maintenant + DELAI_FERMETURE,
            },
        );
        if let Etat::Ouvert(EnAttente { demande, reponse }) = etat {
            debug!(titre = %demande.titre, bouton = %demande.boutons[index].label, "dialogue fermé");
            // ticket lâché par l’appelant : rien à prévenir
            let _ = reponse.send(demande.boutons[index].valeur.clone());
        }
        true
    }

    /// Échap : bouton "cancel" s’il existe, sinon le dernier.
    pub fn cancel(&mut self, maintenant: Duration) -> bool {
        let index = match &self.etat {
            Etat::Ouvert(e) => {
                let b = &e.demande.boutons;
                b.iter()
                    .position(|x| x.label.eq_ignore_ascii_case(LIBELLE_ANNULER))
                    .unwrap_or(b.len().saturating_sub(1))
            }
            _ => return false,
        };
        self.dismiss(index, maintenant)
    }

    /// Avance l’horloge : fin de fermeture, puis ouverture de la suivante.
    pub fn tick(&mut self, maintenant: Duration) {
        if let Etat::Fermeture { jusqua } = self.etat {
            if maintenant >= jusqua {
                self.etat = Etat::Ferme;
                self.ouvrir_suivant();
            }
        }
    }

    /// Prochaine échéance utile (pour demander un repaint).
    pub fn prochaine_echeance(&self) -> Option<Duration> {
        match self.etat {
            Etat::Fermeture { jusqua } => Some(jusqua),
            _ => None,
        }
    }

    fn ouvrir_suivant(&mut self) {
        if !matches!(self.etat, Etat::Ferme) {
            return;
        }
        if let Some(suivant) = self.file.pop_front() {
            debug!(titre = %suivant.demande.titre, "dialogue ouvert");
            self.etat = Etat::Ouvert(suivant);
        }
    }
}
