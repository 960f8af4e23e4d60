//! Pure transitions of the per-session SSO state machine.
//!
//! Every function takes the current [`SessionState`] by reference and returns
//! the next one, so the shell can persist the result before committing it.

use super::{AuthError, AuthPurpose, Result, SessionState, VerifiedCharacter};

/// Where a session stands in the two-stage login/registration escalation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    /// No verified identity yet, the login flow must run.
    Anonymous,
    /// Identity known but the registration scopes were never granted.
    NeedsRegistration,
    /// Both flows completed.
    Registered,
}

/// Decide which stage the session is in.
pub fn stage(state: &SessionState) -> Stage {
    match (&state.identity, &state.profile) {
        (None, _) => Stage::Anonymous,
        (Some(_), None) => Stage::NeedsRegistration,
        (Some(_), Some(_)) => Stage::Registered,
    }
}

/// Record a freshly issued state token for `purpose`.
///
/// Any earlier pending token is replaced, which invalidates it.
pub fn begin(state: &SessionState, purpose: AuthPurpose, state_token: String) -> SessionState {
    SessionState {
        auth_purpose: Some(purpose),
        pending_state: Some(state_token),
        ..state.clone()
    }
}

/// Drop the authenticated identity, used before a forced login.
///
/// The registration profile is left for [`authenticate`] to keep or drop
/// once the login names a character.
pub fn forget_identity(state: &SessionState) -> SessionState {
    SessionState {
        identity: None,
        ..state.clone()
    }
}

/// Check a callback's `state` parameter against the session.
///
/// Returns the purpose of the pending flow, which selects the auth context.
pub fn validate_callback(state: &SessionState, callback_state: Option<&str>) -> Result<AuthPurpose> {
    let purpose = state.auth_purpose.ok_or(AuthError::NoPendingFlow)?;

    match (state.pending_state.as_deref(), callback_state) {
        (Some(pending), Some(received)) if pending == received => Ok(purpose),
        _ => Err(AuthError::StateMismatch),
    }
}

/// Clear the flow after a state mismatch so that a fresh start is required.
pub fn reject(state: &SessionState) -> SessionState {
    SessionState {
        auth_purpose: None,
        pending_state: None,
        ..state.clone()
    }
}

/// Mark the pending state token as used without authenticating.
pub fn consume(state: &SessionState) -> SessionState {
    SessionState {
        pending_state: None,
        ..state.clone()
    }
}

/// Record the verified character once the flow for `purpose` succeeded.
pub fn authenticate(
    state: &SessionState,
    purpose: AuthPurpose,
    character: &VerifiedCharacter,
) -> SessionState {
    let profile = match purpose {
        AuthPurpose::Registration => Some(character.clone()),
        AuthPurpose::Login
            if state
                .profile
                .as_ref()
                .is_some_and(|profile| profile.character_id == character.character_id) =>
        {
            state.profile.clone()
        }
        AuthPurpose::Login => None,
    };

    SessionState {
        auth_purpose: Some(purpose),
        pending_state: None,
        identity: Some(character.character_id),
        profile,
    }
}
