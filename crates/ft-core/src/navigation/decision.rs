//! Pure navigation decision.
//!
//! Maps derived auth/onboarding state and the current route group to the one
//! legal destination. No side effects, no timing.

use super::route::{Destination, RouteSegment};

/// Inputs to the guard.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GuardInput {
    pub is_authenticated: bool,
    pub has_completed_onboarding: bool,
    pub segment: RouteSegment,
}

impl GuardInput {
    pub fn new(is_authenticated: bool, has_completed_onboarding: bool, segment: RouteSegment) -> Self {
        Self {
            is_authenticated,
            has_completed_onboarding,
            segment,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuardDecision {
    Stay,
    Goto(Destination),
}

/// Decide where the user must be.
///
/// | auth | onboarded | segment    | decision        |
/// |------|-----------|------------|-----------------|
/// | no   | no        | onboarding | stay            |
/// | no   | no        | auth, app  | goto onboarding |
/// | no   | yes       | auth       | stay            |
/// | no   | yes       | onboarding, app | goto sign-in |
/// | yes  | any       | app        | stay            |
/// | yes  | yes       | onboarding, auth | goto home |
/// | yes  | no        | onboarding | stay            |
/// | yes  | no        | auth       | goto onboarding |
///
/// Every `Goto` lands in a segment for which the same state yields `Stay`.
pub fn decide(input: GuardInput) -> GuardDecision {
    use GuardDecision::{Goto, Stay};
    use RouteSegment::{App, Auth, Onboarding};

    match (input.is_authenticated, input.has_completed_onboarding, input.segment) {
        (false, false, Onboarding) => Stay,
        (false, false, Auth | App) => Goto(Destination::Onboarding),
        (false, true, Auth) => Stay,
        (false, true, Onboarding | App) => Goto(Destination::SignIn),
        (true, _, App) => Stay,
        (true, true, Onboarding | Auth) => Goto(Destination::Home),
        (true, false, Onboarding) => Stay,
        (true, false, Auth) => Goto(Destination::Onboarding),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(auth: bool, onboarded: bool, segment: RouteSegment) -> GuardDecision {
        decide(GuardInput::new(auth, onboarded, segment))
    }

    #[test]
    fn table_rows() {
        use Destination::*;
        use GuardDecision::*;

        assert_eq!(d(false, false, RouteSegment::App), Goto(Onboarding));
        assert_eq!(d(false, false, RouteSegment::Onboarding), Stay);
        assert_eq!(d(false, true, RouteSegment::Auth), Stay);
        assert_eq!(d(false, true, RouteSegment::App), Goto(SignIn));
        assert_eq!(d(true, true, RouteSegment::Auth), Goto(Home));
        assert_eq!(d(true, true, RouteSegment::App), Stay);
        assert_eq!(d(true, false, RouteSegment::App), Stay);
    }

    #[test]
    fn every_redirect_is_stable_at_its_destination() {
        for auth in [false, true] {
            for onboarded in [false, true] {
                for segment in RouteSegment::ALL {
                    let input = GuardInput::new(auth, onboarded, segment);
                    if let GuardDecision::Goto(destination) = decide(input) {
                        let arrived = GuardInput {
                            segment: destination.segment(),
                            ..input
                        };
                        assert_eq!(
                            decide(arrived),
                            GuardDecision::Stay,
                            "oscillation from {input:?} via {destination:?}"
                        );
                    }
                }
            }
        }
    }
}
