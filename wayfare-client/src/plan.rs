use std::str::FromStr;

/// One seat choice given on the command line as `<leg>:<passenger>:<seat>`, 1-based.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlannedSeat {
    pub leg_index: usize,
    pub passenger_index: usize,
    pub seat: String,
}

#[derive(Debug, PartialEq, Eq, thiserror::Error)]
#[error("invalid seat plan '{0}', expected <leg>:<passenger>:<seat> with 1-based numbers")]
pub struct PlanParseError(String);

impl FromStr for PlannedSeat {
    type Err = PlanParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || PlanParseError(s.to_string());
        let mut parts = s.splitn(3, ':');
        let leg: usize = parts.next().and_then(|p| p.parse().ok()).ok_or_else(invalid)?;
        let pax: usize = parts.next().and_then(|p| p.parse().ok()).ok_or_else(invalid)?;
        let seat = parts.next().map(str::trim).filter(|p| !p.is_empty()).ok_or_else(invalid)?;
        if leg == 0 || pax == 0 {
            return Err(invalid());
        }
        Ok(Self {
            leg_index: leg - 1,
            passenger_index: pax - 1,
            seat: seat.to_string(),
        })
    }
}
