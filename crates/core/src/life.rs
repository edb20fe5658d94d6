use serde::{Deserialize, Serialize};

/// Life-cycle state of an agent.
///
/// Forward order: `Unborn → Born → Alive → Dying → BreakingDown → Died`.
/// `Died` is a fixed point of [`LifeState::next`] and `Unborn` a fixed point
/// of [`LifeState::previous`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum LifeState {
    Unborn,
    Born,
    Alive,
    Dying,
    BreakingDown,
    Died,
}

impl LifeState {
    pub const ALL: [LifeState; 6] = [
        LifeState::Unborn,
        LifeState::Born,
        LifeState::Alive,
        LifeState::Dying,
        LifeState::BreakingDown,
        LifeState::Died,
    ];

    pub fn next(self) -> Self {
        match self {
            LifeState::Unborn => LifeState::Born,
            LifeState::Born => LifeState::Alive,
            LifeState::Alive => LifeState::Dying,
            LifeState::Dying => LifeState::BreakingDown,
            LifeState::BreakingDown => LifeState::Died,
            LifeState::Died => LifeState::Died,
        }
    }

    pub fn previous(self) -> Self {
        match self {
            LifeState::Unborn => LifeState::Unborn,
            LifeState::Born => LifeState::Unborn,
            LifeState::Alive => LifeState::Born,
            LifeState::Dying => LifeState::Alive,
            LifeState::BreakingDown => LifeState::Dying,
            LifeState::Died => LifeState::BreakingDown,
        }
    }

    /// `Alive` and `Dying`: the agent still has a behaviour to tear down.
    pub fn is_alive(self) -> bool {
        matches!(self, LifeState::Alive | LifeState::Dying)
    }

    pub fn is_lifeless(self) -> bool {
        !self.is_alive()
    }

    pub fn is_prenatal(self) -> bool {
        matches!(self, LifeState::Unborn | LifeState::Born)
    }

    pub fn is_mortuary(self) -> bool {
        matches!(self, LifeState::BreakingDown | LifeState::Died)
    }
}

impl std::fmt::Display for LifeState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            LifeState::Unborn => "UNBORN",
            LifeState::Born => "BORN",
            LifeState::Alive => "ALIVE",
            LifeState::Dying => "DYING",
            LifeState::BreakingDown => "BREAKING_DOWN",
            LifeState::Died => "DIED",
        };
        f.write_str(s)
    }
}
