//! Decision of whether an agent has nothing left to do and may end itself.
//!
//! Two dimensions are observed independently: the role dimension (what the
//! agent's behaviour plays) and the scheduling dimension (the agents it
//! schedules). Each is coded as an [`Activity`]:
//!
//! * `-1` the dimension never applied,
//! * `0` the dimension is currently active,
//! * `1` the dimension was active and has nothing left.
//!
//! Callers also pass a requested code per dimension, the baseline the
//! observed code is compared against.

/// Observed activity of one dimension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Activity {
    Unused,
    Active,
    Exhausted,
}

impl Activity {
    pub fn observe(is_used: bool, has_activable: bool) -> Self {
        match (is_used, has_activable) {
            (false, _) => Activity::Unused,
            (true, true) => Activity::Active,
            (true, false) => Activity::Exhausted,
        }
    }

    pub fn code(self) -> i8 {
        match self {
            Activity::Unused => -1,
            Activity::Active => 0,
            Activity::Exhausted => 1,
        }
    }
}

/// Whether one dimension asks to stop.
///
/// Stops when the observation is at least two steps away from the request,
/// or when both agree on "exhausted".
pub fn wants_to_stop(requested: i8, observed: i8) -> bool {
    let diff = (i16::from(observed) - i16::from(requested)).abs();
    diff >= 2 || (diff == 0 && observed == 1)
}

/// Combines the two dimensions.
pub fn is_self_killable(
    can_commit_suicide: bool,
    role_requested: i8,
    role_observed: i8,
    scheduling_requested: i8,
    scheduling_observed: i8,
) -> bool {
    if !can_commit_suicide {
        return false;
    }
    let role_stop = wants_to_stop(role_requested, role_observed);
    let scheduling_stop = wants_to_stop(scheduling_requested, scheduling_observed);

    (role_stop && scheduling_stop)
        || (role_stop && scheduling_requested < 0 && scheduling_observed < 0)
        || (scheduling_stop && role_requested < 0 && role_observed < 0)
}
