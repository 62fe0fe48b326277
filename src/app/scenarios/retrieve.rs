use crate::core::assertions::{ensure_eq, SoftAssert};
use crate::core::context::{assert_retrieved_fields_match, created_id, TestContext};
use crate::core::data_generator;
use crate::core::suite::TestCase;
use crate::utils::error::Result;
use serde_json::json;

const CLASS: &str = "RetrievePlayer";

const NON_EXISTING_ID: i64 = 999_999;

pub fn cases() -> Vec<TestCase> {
    vec![
        TestCase::new(
            CLASS,
            "get_player_by_id",
            "Positive: Get player data by ID",
            |ctx| Box::pin(get_player_by_id(ctx)),
        ),
        TestCase::new(
            CLASS,
            "existing_users_can_get_self",
            "Positive: Existing user can retrieve their own data by ID",
            |ctx| Box::pin(existing_users_can_get_self(ctx)),
        ),
        TestCase::new(
            CLASS,
            "get_non_existing_player",
            "Negative: Get player with non-existing ID",
            |ctx| Box::pin(get_non_existing_player(ctx)),
        ),
        TestCase::new(
            CLASS,
            "get_player_with_incorrect_id_format",
            "Negative: Get player with incorrect ID format (string)",
            |ctx| Box::pin(get_player_with_incorrect_id_format(ctx)),
        ),
        TestCase::new(
            CLASS,
            "user_cannot_get_another_user_info",
            "Negative: Regular user cannot get another user's info",
            |ctx| Box::pin(user_cannot_get_another_user_info(ctx)),
        ),
    ]
}

/// Creates a user as the supervisor, reads it back and compares every field.
async fn create_and_read_back(ctx: &TestContext, read_step: &str) -> Result<()> {
    let details = data_generator::random_user_details();
    let created = ctx
        .create_player_and_register(ctx.supervisor_login(), &details)
        .await?;
    let id = created_id(&created)?;

    ctx.step(read_step);
    let actual = ctx.get_player(id).await?;

    ctx.step("Assert player data matches");
    let mut soft = SoftAssert::new();
    soft.assert_eq(actual.id, Some(id), "Player ID should match");
    assert_retrieved_fields_match(&mut soft, &actual, &details);
    soft.assert_all()
}

async fn get_player_by_id(ctx: &TestContext) -> Result<()> {
    ctx.step("Create a player");
    create_and_read_back(ctx, "Retrieve player by ID").await
}

async fn existing_users_can_get_self(ctx: &TestContext) -> Result<()> {
    ctx.step("Create a user");
    create_and_read_back(ctx, "User retrieves their own data").await
}

async fn get_non_existing_player(ctx: &TestContext) -> Result<()> {
    ctx.step("Attempt to retrieve player with non-existing ID");
    let response = ctx.api().get_player(&json!(NON_EXISTING_ID)).await?;

    ctx.step("Assert retrieval rejected with 404 Not Found");
    ensure_eq(
        response.status(),
        404,
        "Getting non-existing player should return not found",
    )
}

async fn get_player_with_incorrect_id_format(ctx: &TestContext) -> Result<()> {
    ctx.step("Attempt to retrieve player with incorrect ID format");
    let response = ctx.api().get_player(&json!("not-a-number")).await?;

    ctx.step("Assert retrieval rejected with 400 Bad Request");
    ensure_eq(
        response.status(),
        400,
        "Getting player with invalid ID format should return bad request",
    )
}

/// The get endpoint carries no caller identity, so a conforming service
/// cannot tell users apart here. Kept as the access-control probe it is.
async fn user_cannot_get_another_user_info(ctx: &TestContext) -> Result<()> {
    ctx.step("Create first user");
    let first = data_generator::random_user_details();
    let first_created = ctx
        .create_player_and_register(ctx.supervisor_login(), &first)
        .await?;

    ctx.step("Create second user");
    let second = data_generator::random_user_details();
    ctx.create_player_and_register(ctx.supervisor_login(), &second)
        .await?;

    ctx.step("Attempt to retrieve another user's info as first user");
    let response = ctx
        .api()
        .get_player(&json!(created_id(&first_created)?))
        .await?;

    ctx.step("Assert retrieval rejected with 403 Forbidden");
    ensure_eq(
        response.status(),
        403,
        "Regular user should not be able to get another user's info",
    )
}
