use serde::{Deserialize, Serialize};

use crate::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ReservationStatus {
    #[serde(alias = "pending")]
    Pending,
    #[serde(alias = "confirmed")]
    Confirmed,
    #[serde(alias = "cancelled")]
    Cancelled,
    #[serde(alias = "completed")]
    Completed,
}

impl ReservationStatus {
    /// pending and confirmed reservations hold the room
    pub fn is_active(&self) -> bool {
        matches!(self, ReservationStatus::Pending | ReservationStatus::Confirmed)
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, ReservationStatus::Cancelled | ReservationStatus::Completed)
    }

    /// Pending -> Confirmed -> Completed, Pending|Confirmed -> Cancelled
    pub fn can_transition_to(&self, next: ReservationStatus) -> bool {
        use ReservationStatus::*;
        if self.is_terminal() {
            return false;
        }
        matches!(
            (self, next),
            (Pending, Confirmed) | (Confirmed, Completed) | (_, Cancelled)
        )
    }

    pub fn transition(self, next: ReservationStatus) -> Result<ReservationStatus, Error> {
        if self.can_transition_to(next) {
            Ok(next)
        } else {
            Err(Error::InvalidTransition {
                from: self,
                to: next,
            })
        }
    }
}

db_enum!(ReservationStatus {
    Pending => "pending",
    Confirmed => "confirmed",
    Cancelled => "cancelled" | "canceled",
    Completed => "completed",
} else |s: &str| Error::InvalidStatus(s.to_string()));

#[cfg(test)]
mod tests {
    use super::*;
    use ReservationStatus::*;

    const ALL: [ReservationStatus; 4] = [Pending, Confirmed, Cancelled, Completed];

    #[test]
    fn allowed_transitions_should_follow_lifecycle() {
        assert!(Pending.can_transition_to(Confirmed));
        assert!(Confirmed.can_transition_to(Completed));
        assert!(Pending.can_transition_to(Cancelled));
        assert!(Confirmed.can_transition_to(Cancelled));
    }

    #[test]
    fn terminal_states_should_not_move() {
        for from in [Cancelled, Completed] {
            assert!(from.is_terminal());
            for to in ALL {
                assert!(!from.can_transition_to(to), "{from} -> {to}");
            }
        }
    }

    #[test]
    fn skipping_or_reverting_should_be_rejected() {
        assert!(!Pending.can_transition_to(Completed));
        assert!(!Confirmed.can_transition_to(Pending));
        assert!(!Pending.can_transition_to(Pending));
        assert_eq!(
            Confirmed.transition(Pending).unwrap_err(),
            Error::InvalidTransition {
                from: Confirmed,
                to: Pending
            }
        );
        assert_eq!(Pending.transition(Confirmed).unwrap(), Confirmed);
    }

    #[test]
    fn active_states_should_hold_the_room() {
        let active: Vec<_> = ALL.into_iter().filter(|s| s.is_active()).collect();
        assert_eq!(active, vec![Pending, Confirmed]);
    }

    #[test]
    fn status_should_parse_from_labels() {
        assert_eq!("Confirmed".parse::<ReservationStatus>().unwrap(), Confirmed);
        assert_eq!("canceled".parse::<ReservationStatus>().unwrap(), Cancelled);
        assert_eq!(
            "archived".parse::<ReservationStatus>().unwrap_err(),
            Error::InvalidStatus("archived".to_string())
        );
        for s in ALL {
            assert_eq!(s.to_string().parse::<ReservationStatus>().unwrap(), s);
        }
    }
}
