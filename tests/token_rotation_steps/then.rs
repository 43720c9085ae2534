//! Then steps for token rotation scenarios.

use super::rotation_world::RotationWorld;
use eyre::{ensure, eyre};
use rstest_bdd_macros::then;
use tokenward::auth::services::GuardDecision;

fn last_decision(world: &RotationWorld) -> Result<&GuardDecision, eyre::Report> {
    world
        .last_decision
        .as_ref()
        .ok_or_else(|| eyre!("no request was authorized"))
}

fn allowed_as<'a>(
    world: &'a RotationWorld,
    username: &str,
) -> Result<&'a GuardDecision, eyre::Report> {
    let decision = last_decision(world)?;
    let identity = decision
        .identity()
        .ok_or_else(|| eyre!("request denied: {:?}", decision.deny_reason()))?;
    ensure!(
        identity.username == username,
        "expected {username}, got {}",
        identity.username
    );
    Ok(decision)
}

#[then(r#"the request is allowed as "{username}" without rotation"#)]
fn allowed_without_rotation(world: &RotationWorld, username: String) -> Result<(), eyre::Report> {
    let decision = allowed_as(world, &username)?;
    ensure!(!decision.tokens_refreshed(), "tokens were unexpectedly rotated");
    Ok(())
}

#[then(r#"the request is allowed as "{username}" with rotated tokens"#)]
fn allowed_with_rotation(world: &RotationWorld, username: String) -> Result<(), eyre::Report> {
    let decision = allowed_as(world, &username)?;
    let action = decision
        .action()
        .ok_or_else(|| eyre!("tokens were not rotated"))?;
    let first = &world.first_session()?.tokens;
    ensure!(
        action.tokens.refresh_token != first.refresh_token,
        "rotation reissued the original refresh token"
    );
    ensure!(
        action.refresh_ttl.as_secs() == 3_600,
        "unexpected refresh ttl {:?}",
        action.refresh_ttl
    );
    Ok(())
}

#[then(r#"the request is denied with reason "{reason}""#)]
fn denied_with_reason(world: &RotationWorld, reason: String) -> Result<(), eyre::Report> {
    let decision = last_decision(world)?;
    let actual = decision
        .deny_reason()
        .ok_or_else(|| eyre!("request was allowed"))?;
    ensure!(actual.to_string() == reason, "expected {reason}, got {actual}");
    ensure!(decision.action().is_none(), "denied request carried new tokens");
    Ok(())
}

#[then(r#"the refresh is rejected with reason "{reason}""#)]
fn refresh_rejected(world: &RotationWorld, reason: String) -> Result<(), eyre::Report> {
    let result = world
        .last_refresh
        .as_ref()
        .ok_or_else(|| eyre!("no refresh was attempted"))?;
    let Err(err) = result else {
        return Err(eyre!("refresh unexpectedly succeeded"));
    };
    let actual = err
        .unauthorized_reason()
        .ok_or_else(|| eyre!("expected unauthorized, got {err}"))?;
    ensure!(actual.to_string() == reason, "expected {reason}, got {actual}");
    Ok(())
}
