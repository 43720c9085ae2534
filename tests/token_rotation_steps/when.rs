//! When steps for token rotation scenarios.

use super::rotation_world::{RotationWorld, run_async};
use eyre::{WrapErr, eyre};
use rstest_bdd_macros::when;
use tokenward::auth::domain::{RefreshTokenSources, RequestCredentials, TokenPair};

fn authorize(world: &mut RotationWorld, tokens: &TokenPair) -> Result<(), eyre::Report> {
    let credentials = RequestCredentials::new()
        .with_access_token(tokens.access_token.clone())
        .with_refresh_sources(RefreshTokenSources::new().with_cookie(tokens.refresh_token.clone()));
    let decision = run_async(world.service.guard().authorize(&credentials))
        .wrap_err("authorize request")?;
    if let Some(action) = decision.action() {
        world.latest_tokens = Some(action.tokens.clone());
    }
    world.last_decision = Some(decision);
    Ok(())
}

#[when("the access token expires")]
fn access_token_expires(world: &mut RotationWorld) {
    world.clock.expire_access();
}

#[when("a request presents the first token pair")]
fn request_with_first_pair(world: &mut RotationWorld) -> Result<(), eyre::Report> {
    let tokens = world.first_session()?.tokens.clone();
    authorize(world, &tokens)
}

#[when("a request presents the latest token pair")]
fn request_with_latest_pair(world: &mut RotationWorld) -> Result<(), eyre::Report> {
    let tokens = world
        .latest_tokens
        .clone()
        .ok_or_else(|| eyre!("no tokens issued yet"))?;
    authorize(world, &tokens)
}

#[when("a request presents a forged access token with the first refresh token")]
fn request_with_forged_access(world: &mut RotationWorld) -> Result<(), eyre::Report> {
    let first = world.first_session()?.tokens.clone();
    let forged = TokenPair {
        access_token: format!("{}x", first.access_token),
        refresh_token: first.refresh_token,
    };
    authorize(world, &forged)
}

#[when("the principal logs out")]
fn principal_logs_out(world: &mut RotationWorld) -> Result<(), eyre::Report> {
    let principal_id = world.first_session()?.identity.subject;
    run_async(world.service.logout(principal_id)).wrap_err("log out")
}

#[when("the principal refreshes with the first refresh token")]
fn principal_refreshes(world: &mut RotationWorld) -> Result<(), eyre::Report> {
    let session = world.first_session()?.clone();
    let result = run_async(
        world
            .service
            .refresh(session.identity.subject, &session.tokens.refresh_token),
    );
    world.last_refresh = Some(result);
    Ok(())
}
