//! BDD scenarios for transparent refresh-token rotation.

mod given;
mod then;
mod when;
mod rotation_world;

use rstest_bdd_macros::scenario;
use rotation_world::{RotationWorld, world};

#[scenario(
    path = "tests/features/token_rotation.feature",
    name = "A valid access token passes without rotation"
)]
#[tokio::test(flavor = "multi_thread")]
async fn valid_access_passes(world: RotationWorld) {
    let _ = world;
}

#[scenario(
    path = "tests/features/token_rotation.feature",
    name = "An expired access token is rotated once and the old pair goes stale"
)]
#[tokio::test(flavor = "multi_thread")]
async fn expired_access_rotates_once(world: RotationWorld) {
    let _ = world;
}

#[scenario(
    path = "tests/features/token_rotation.feature",
    name = "An invalid access token never triggers a refresh"
)]
#[tokio::test(flavor = "multi_thread")]
async fn invalid_access_is_denied(world: RotationWorld) {
    let _ = world;
}

#[scenario(
    path = "tests/features/token_rotation.feature",
    name = "Logout ends the session"
)]
#[tokio::test(flavor = "multi_thread")]
async fn logout_ends_session(world: RotationWorld) {
    let _ = world;
}
