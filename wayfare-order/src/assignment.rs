use std::collections::HashMap;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use wayfare_catalog::SeatCatalog;

/// Result of a successful `select` call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selection {
    /// The seat now belongs to the passenger. `replaced` is the seat they held before, if any.
    Assigned { replaced: Option<String> },
    /// The passenger already held the seat and has released it.
    Cleared,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AssignmentError {
    #[error("Leg index {0} is out of range")]
    UnknownLeg(usize),

    #[error("Passenger index {0} is out of range")]
    UnknownPassenger(usize),

    #[error("Seat {seat} does not exist on leg {}", .leg_index + 1)]
    UnknownSeat { leg_index: usize, seat: String },

    #[error("Seat {seat} on leg {} is already booked", .leg_index + 1)]
    SeatOccupied { leg_index: usize, seat: String },

    #[error("Seat {seat} on leg {} is held by passenger {}", .leg_index + 1, .holder + 1)]
    SeatTaken { leg_index: usize, seat: String, holder: usize },

    #[error("Seat selection is locked while the booking is submitted")]
    Frozen,
}

#[derive(Debug, Clone, Default)]
struct LegAssignments {
    /// Seat number -> occupied flag, from the current catalog snapshot.
    inventory: HashMap<String, bool>,
    by_passenger: HashMap<usize, String>,
}

impl LegAssignments {
    fn holder_of(&self, seat: &str) -> Option<usize> {
        self.by_passenger
            .iter()
            .find(|(_, s)| s.as_str() == seat)
            .map(|(pax, _)| *pax)
    }
}

/// The (leg, passenger) -> seat relation for the selection phase.
///
/// Every mutator is synchronous and checks the invariants before touching state:
/// a seat has at most one holder per leg and a passenger holds at most one seat per leg.
#[derive(Debug, Clone)]
pub struct SeatAssignmentStore {
    legs: Vec<LegAssignments>,
    passenger_count: usize,
    active_passenger: usize,
    frozen: bool,
}

impl SeatAssignmentStore {
    pub fn new(leg_count: usize, passenger_count: usize) -> Self {
        Self {
            legs: vec![LegAssignments::default(); leg_count],
            passenger_count,
            active_passenger: 0,
            frozen: false,
        }
    }

    pub fn leg_count(&self) -> usize {
        self.legs.len()
    }

    pub fn passenger_count(&self) -> usize {
        self.passenger_count
    }

    pub fn is_frozen(&self) -> bool {
        self.frozen
    }

    /// Install a freshly fetched catalog for `leg_index`.
    ///
    /// Assignments pointing at seats that are now occupied or gone are dropped and
    /// returned as `(passenger_index, seat)` pairs. Rejected while the store is frozen.
    pub fn refresh_leg(
        &mut self,
        leg_index: usize,
        catalog: &SeatCatalog,
    ) -> Result<Vec<(usize, String)>, AssignmentError> {
        if self.frozen {
            return Err(AssignmentError::Frozen);
        }
        let leg = self.legs.get_mut(leg_index).ok_or(AssignmentError::UnknownLeg(leg_index))?;

        leg.inventory = catalog
            .seats
            .values()
            .map(|s| (s.number.clone(), s.occupied))
            .collect();

        let inventory = &leg.inventory;
        let mut dropped: Vec<(usize, String)> = leg
            .by_passenger
            .iter()
            .filter(|(_, seat)| inventory.get(seat.as_str()).copied().unwrap_or(true))
            .map(|(pax, seat)| (*pax, seat.clone()))
            .collect();
        dropped.sort();

        for (pax, seat) in &dropped {
            info!("Seat {} for passenger {} on leg {} is no longer available", seat, pax + 1, leg_index + 1);
            leg.by_passenger.remove(pax);
        }
        Ok(dropped)
    }

    pub fn active_passenger(&self) -> usize {
        self.active_passenger
    }

    /// Switch which passenger the next click selects for. Existing assignments stay.
    pub fn set_active_passenger(&mut self, passenger_index: usize) -> Result<(), AssignmentError> {
        if passenger_index >= self.passenger_count {
            return Err(AssignmentError::UnknownPassenger(passenger_index));
        }
        self.active_passenger = passenger_index;
        Ok(())
    }

    pub fn select_for_active(&mut self, leg_index: usize, seat: &str) -> Result<Selection, AssignmentError> {
        self.select(leg_index, self.active_passenger, seat)
    }

    /// Toggle `seat` for a passenger on a leg.
    ///
    /// Selecting the passenger's current seat clears it. Selecting another free seat
    /// replaces their previous one. Occupied seats and seats held by someone else are
    /// rejected without changing anything.
    pub fn select(
        &mut self,
        leg_index: usize,
        passenger_index: usize,
        seat: &str,
    ) -> Result<Selection, AssignmentError> {
        if self.frozen {
            return Err(AssignmentError::Frozen);
        }
        if passenger_index >= self.passenger_count {
            return Err(AssignmentError::UnknownPassenger(passenger_index));
        }
        let leg = self.legs.get_mut(leg_index).ok_or(AssignmentError::UnknownLeg(leg_index))?;

        match leg.inventory.get(seat) {
            None => {
                return Err(AssignmentError::UnknownSeat { leg_index, seat: seat.to_string() });
            }
            Some(true) => {
                debug!("Rejected occupied seat {} on leg {}", seat, leg_index + 1);
                return Err(AssignmentError::SeatOccupied { leg_index, seat: seat.to_string() });
            }
            Some(false) => {}
        }

        match leg.holder_of(seat) {
            Some(holder) if holder == passenger_index => {
                leg.by_passenger.remove(&passenger_index);
                Ok(Selection::Cleared)
            }
            Some(holder) => {
                debug!("Rejected seat {} on leg {}: held by passenger {}", seat, leg_index + 1, holder + 1);
                Err(AssignmentError::SeatTaken { leg_index, seat: seat.to_string(), holder })
            }
            None => {
                let replaced = leg.by_passenger.insert(passenger_index, seat.to_string());
                Ok(Selection::Assigned { replaced })
            }
        }
    }

    pub fn is_assigned(&self, leg_index: usize, seat: &str) -> bool {
        self.legs
            .get(leg_index)
            .map(|leg| leg.holder_of(seat).is_some())
            .unwrap_or(false)
    }

    pub fn is_assigned_to_passenger(&self, leg_index: usize, passenger_index: usize, seat: &str) -> bool {
        self.seat_for(leg_index, passenger_index) == Some(seat)
    }

    pub fn seat_for(&self, leg_index: usize, passenger_index: usize) -> Option<&str> {
        self.legs
            .get(leg_index)
            .and_then(|leg| leg.by_passenger.get(&passenger_index))
            .map(String::as_str)
    }

    pub fn holder_of(&self, leg_index: usize, seat: &str) -> Option<usize> {
        self.legs.get(leg_index).and_then(|leg| leg.holder_of(seat))
    }

    /// `(leg_index, passenger_index)` pairs without a seat, leg-major order.
    pub fn missing(&self) -> Vec<(usize, usize)> {
        self.snapshot().missing()
    }

    pub fn is_complete(&self) -> bool {
        self.missing().is_empty()
    }

    /// Lock the store and hand out the plan to submit. Rejected if already locked.
    pub fn freeze(&mut self) -> Result<AssignmentSnapshot, AssignmentError> {
        if self.frozen {
            return Err(AssignmentError::Frozen);
        }
        self.frozen = true;
        Ok(self.snapshot())
    }

    /// Reopen selection after a submission that did not complete.
    pub fn thaw(&mut self) {
        self.frozen = false;
    }

    fn snapshot(&self) -> AssignmentSnapshot {
        AssignmentSnapshot {
            seats: self
                .legs
                .iter()
                .map(|leg| {
                    (0..self.passenger_count)
                        .map(|pax| leg.by_passenger.get(&pax).cloned())
                        .collect()
                })
                .collect(),
        }
    }
}

/// Immutable copy of the assignment relation, indexed `[leg][passenger]`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssignmentSnapshot {
    seats: Vec<Vec<Option<String>>>,
}

impl AssignmentSnapshot {
    pub fn leg_count(&self) -> usize {
        self.seats.len()
    }

    pub fn seat(&self, leg_index: usize, passenger_index: usize) -> Option<&str> {
        self.seats
            .get(leg_index)
            .and_then(|leg| leg.get(passenger_index))
            .and_then(|s| s.as_deref())
    }

    pub fn seats_for_leg(&self, leg_index: usize) -> &[Option<String>] {
        self.seats.get(leg_index).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn missing(&self) -> Vec<(usize, usize)> {
        self.seats
            .iter()
            .enumerate()
            .flat_map(|(leg, seats)| {
                seats
                    .iter()
                    .enumerate()
                    .filter(|(_, s)| s.as_deref().map_or(true, str::is_empty))
                    .map(move |(pax, _)| (leg, pax))
            })
            .collect()
    }
}
