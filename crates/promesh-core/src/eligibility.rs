// Version eligibility gate.
//
// Pure decision over (tier, action, state). The rule table is the whole
// contract; anything not matching a row is ineligible:
//
//   dev/tst  deploy    draft, released
//   dev/tst  undeploy  any
//   acc/prd  deploy    released
//   acc/prd  undeploy  released, deprecated, retired

use crate::model::{DeploymentAction, EnvironmentTier, VersionState};

/// Decide whether a version in `state` may receive `action` on `tier`.
///
/// `Save` persists a preview without mutating any broker and is never
/// gated.
pub fn is_eligible(
    tier: EnvironmentTier,
    action: DeploymentAction,
    state: VersionState,
) -> bool {
    match (tier.is_pre_production(), action) {
        (_, DeploymentAction::Save) => true,
        (true, DeploymentAction::Deploy) => {
            matches!(state, VersionState::Draft | VersionState::Released)
        }
        (true, DeploymentAction::Undeploy) => true,
        (false, DeploymentAction::Deploy) => state == VersionState::Released,
        (false, DeploymentAction::Undeploy) => matches!(
            state,
            VersionState::Released | VersionState::Deprecated | VersionState::Retired
        ),
    }
}

#[cfg(test)]
mod tests {
    use strum::IntoEnumIterator;

    use super::*;

    fn expected(tier: EnvironmentTier, action: DeploymentAction, state: VersionState) -> bool {
        // Independent spelling of the rule table, row by row.
        let pre = matches!(tier, EnvironmentTier::Dev | EnvironmentTier::Tst);
        match action {
            DeploymentAction::Deploy if pre => {
                state == VersionState::Draft || state == VersionState::Released
            }
            DeploymentAction::Undeploy if pre => true,
            DeploymentAction::Deploy => state == VersionState::Released,
            DeploymentAction::Undeploy => state != VersionState::Draft,
            DeploymentAction::Save => true,
        }
    }

    #[test]
    fn full_rule_table() {
        for tier in EnvironmentTier::iter() {
            for action in [DeploymentAction::Deploy, DeploymentAction::Undeploy] {
                for state in VersionState::iter() {
                    assert_eq!(
                        is_eligible(tier, action, state),
                        expected(tier, action, state),
                        "mismatch for ({tier}, {action}, {state})"
                    );
                }
            }
        }
    }

    #[test]
    fn spot_checks_from_the_table() {
        assert!(!is_eligible(
            EnvironmentTier::Prd,
            DeploymentAction::Deploy,
            VersionState::Draft
        ));
        assert!(is_eligible(
            EnvironmentTier::Tst,
            DeploymentAction::Undeploy,
            VersionState::Retired
        ));
        assert!(is_eligible(
            EnvironmentTier::Acc,
            DeploymentAction::Deploy,
            VersionState::Released
        ));
        assert!(!is_eligible(
            EnvironmentTier::Acc,
            DeploymentAction::Deploy,
            VersionState::Deprecated
        ));
        assert!(!is_eligible(
            EnvironmentTier::Prd,
            DeploymentAction::Undeploy,
            VersionState::Draft
        ));
    }

    #[test]
    fn save_is_never_gated() {
        for tier in EnvironmentTier::iter() {
            for state in VersionState::iter() {
                assert!(is_eligible(tier, DeploymentAction::Save, state));
            }
        }
    }
}
