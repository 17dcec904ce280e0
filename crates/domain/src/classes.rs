//! The class catalog - a closed set of role archetypes.
//!
//! Classes determine starting stats and the rank ladder a player climbs.
//! The set is closed by construction: requests are parsed into `PlayerClass`
//! at the boundary, so an unknown class can never reach a use case.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::DomainError;

/// A role archetype in the game.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PlayerClass {
    Desarrollador,
    Tester,
    #[serde(rename = "Diseñador")]
    Disenador,
}

/// Base stats and rank ladder for a class.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClassSpec {
    pub action_points: i64,
    pub energy: i64,
    pub ranks: &'static [&'static str],
}

const DESARROLLADOR: ClassSpec = ClassSpec {
    action_points: 4,
    energy: 10,
    ranks: &["Junior", "SemiSenior", "Senior", "Arquitecto", "Terry"],
};

const TESTER: ClassSpec = ClassSpec {
    action_points: 2,
    energy: 15,
    ranks: &["Junior", "SemiSenior", "Senior", "Líder"],
};

const DISENADOR: ClassSpec = ClassSpec {
    action_points: 2,
    energy: 30,
    ranks: &["Junior", "SemiSenior", "Senior"],
};

impl PlayerClass {
    pub const ALL: [PlayerClass; 3] = [
        PlayerClass::Desarrollador,
        PlayerClass::Tester,
        PlayerClass::Disenador,
    ];

    pub fn spec(&self) -> &'static ClassSpec {
        match self {
            PlayerClass::Desarrollador => &DESARROLLADOR,
            PlayerClass::Tester => &TESTER,
            PlayerClass::Disenador => &DISENADOR,
        }
    }

    /// First rank of the class's ladder, assigned at creation.
    pub fn starting_rank(&self) -> &'static str {
        self.spec().ranks[0]
    }
}

impl fmt::Display for PlayerClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PlayerClass::Desarrollador => "Desarrollador",
            PlayerClass::Tester => "Tester",
            PlayerClass::Disenador => "Diseñador",
        };
        f.write_str(name)
    }
}

impl FromStr for PlayerClass {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Desarrollador" => Ok(PlayerClass::Desarrollador),
            "Tester" => Ok(PlayerClass::Tester),
            "Diseñador" => Ok(PlayerClass::Disenador),
            other => Err(DomainError::parse(format!("Clase no válida: {other}"))),
        }
    }
}
