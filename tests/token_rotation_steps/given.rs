//! Given steps for token rotation scenarios.

use super::rotation_world::{RotationWorld, run_async};
use eyre::WrapErr;
use rstest_bdd_macros::given;

#[given(r#"a principal "{username}" signed up with secret "{secret}""#)]
fn principal_signed_up(
    world: &mut RotationWorld,
    username: String,
    secret: String,
) -> Result<(), eyre::Report> {
    let session = run_async(world.service.sign_up(&username, &secret))
        .wrap_err("sign up principal")?;
    world.latest_tokens = Some(session.tokens.clone());
    world.first_session = Some(session);
    Ok(())
}
