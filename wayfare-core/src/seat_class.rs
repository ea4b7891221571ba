use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// Cabin class of a seat or of a whole trip.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SeatClass {
    Business = 0,
    Premium = 1,
    Economy = 2,
}

/// The only place where class names live, indexed by discriminant:
/// `(class, internal name, wire name)`. Both directions go through this table.
const CLASS_NAMES: [(SeatClass, &str, &str); 3] = [
    (SeatClass::Business, "Business", "Business"),
    (SeatClass::Premium, "Premium", "PremiumEconomy"),
    (SeatClass::Economy, "Economy", "Economy"),
];

impl SeatClass {
    pub const ALL: [SeatClass; 3] = [SeatClass::Business, SeatClass::Premium, SeatClass::Economy];

    fn names(self) -> &'static (SeatClass, &'static str, &'static str) {
        &CLASS_NAMES[self as usize]
    }

    /// Name used by the catalog and booking services.
    pub fn wire_name(self) -> &'static str {
        self.names().2
    }

    /// Parse a wire class name. Unknown names yield `None` so callers can fail closed.
    pub fn from_wire(name: &str) -> Option<Self> {
        CLASS_NAMES
            .iter()
            .find(|(_, _, wire)| *wire == name)
            .map(|(class, _, _)| *class)
    }

    /// Lenient parse for trip input: accepts the wire names and the internal names.
    pub fn parse(name: &str) -> Option<Self> {
        let name = name.trim();
        Self::from_wire(name).or_else(|| {
            CLASS_NAMES
                .iter()
                .find(|(_, internal, _)| internal.eq_ignore_ascii_case(name))
                .map(|(class, _, _)| *class)
        })
    }
}

impl fmt::Display for SeatClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.names().1)
    }
}

impl Serialize for SeatClass {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(self.wire_name())
    }
}

impl<'de> Deserialize<'de> for SeatClass {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let name = String::deserialize(deserializer)?;
        SeatClass::parse(&name)
            .ok_or_else(|| serde::de::Error::custom(format!("unknown seat class: {}", name)))
    }
}
