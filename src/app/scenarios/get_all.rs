use crate::core::assertions::{ensure, ensure_eq, SoftAssert};
use crate::core::context::{created_id, TestContext};
use crate::core::data_generator::{self, MAX_AGE, MIN_AGE};
use crate::core::suite::TestCase;
use crate::domain::model::PlayerView;
use crate::utils::error::{ApiTestError, Result};

const CLASS: &str = "GetAllPlayers";

const MAX_PLAYERS_VALIDATION_LIMIT: usize = 100;

pub const SANITY_GROUP: &str = "sanity";

pub fn cases() -> Vec<TestCase> {
    vec![
        TestCase::new(
            CLASS,
            "get_all_players_contains_newly_created_player",
            "Positive: Get all players and verify presence of a newly created one",
            |ctx| Box::pin(get_all_players_contains_newly_created_player(ctx)),
        ),
        TestCase::new(
            CLASS,
            "default_system_users_are_present",
            "Sanity: Default system users are present in the list",
            |ctx| Box::pin(default_system_users_are_present(ctx)),
        )
        .in_group(SANITY_GROUP),
        TestCase::new(
            CLASS,
            "players_schema_integrity_in_global_list",
            "Positive: All players can be parsed correctly with all fields populated in correct boundaries",
            |ctx| Box::pin(players_schema_integrity_in_global_list(ctx)),
        ),
        TestCase::new(
            CLASS,
            "regular_user_cannot_get_all_players",
            "Negative: Regular user cannot retrieve the list of all players",
            |ctx| Box::pin(regular_user_cannot_get_all_players(ctx)),
        ),
    ]
}

async fn get_all_players_contains_newly_created_player(ctx: &TestContext) -> Result<()> {
    ctx.step("Create a new player");
    let details = data_generator::random_user_details();
    let created = ctx
        .create_player_and_register(ctx.supervisor_login(), &details)
        .await?;
    let id = created_id(&created)?;

    ctx.step("Get all players from the system");
    let all = ctx.get_all_players().await?;

    ctx.step("Assert players list is not empty");
    ensure(!all.players.is_empty(), "Players list should not be empty")?;

    ctx.step("Find newly created player in the list");
    let item = all
        .players
        .iter()
        .find(|p| p.id == Some(id))
        .ok_or_else(|| ApiTestError::assertion("Newly created player should be present in the list"))?;

    ctx.step("Assert all player details match");
    ensure_eq(item.id, Some(id), "Player ID should match")?;
    ensure_eq(item.age, Some(details.age), "Player age should match")?;
    ensure_eq(item.role_as_enum(), Some(details.role), "Player role should match")?;
    ensure_eq(
        item.gender_as_enum(),
        Some(details.gender),
        "Player gender should match",
    )?;
    ensure_eq(
        item.screen_name.as_deref(),
        Some(details.screen_name.as_str()),
        "Player screenName should match",
    )
}

async fn default_system_users_are_present(ctx: &TestContext) -> Result<()> {
    ctx.step("Get all players from the system");
    let all = ctx.get_all_players().await?;

    ctx.step("Assert supervisor and admin are present");
    let mut soft = SoftAssert::new();
    soft.assert_true(
        all.players.iter().any(|p| p.id == Some(ctx.supervisor_id())),
        "Supervisor should be present in the list",
    );
    soft.assert_true(
        all.players.iter().any(|p| p.id == Some(ctx.admin_id())),
        "Admin should be present in the list",
    );
    soft.assert_all()
}

async fn players_schema_integrity_in_global_list(ctx: &TestContext) -> Result<()> {
    ctx.step("Get all players from the system");
    let all = ctx.get_all_players().await?;

    ctx.step("Assert players list is not empty");
    ensure(!all.players.is_empty(), "Players list should not be empty")?;

    ctx.step("Validate each player has correct schema and boundaries");
    let mut soft = SoftAssert::new();
    for player in all.players.iter().take(MAX_PLAYERS_VALIDATION_LIMIT) {
        let label = player
            .id
            .map(|id| format!("Player {}", id))
            .unwrap_or_else(|| "Player <no id>".to_string());

        soft.assert_some(&player.id, &format!("{}: ID should not be null", label));
        soft.assert_some(&player.age, &format!("{}: age should not be null", label));
        soft.assert_some(&player.gender, &format!("{}: gender should not be null", label));
        soft.assert_some(
            &player.screen_name,
            &format!("{}: screenName should not be null", label),
        );

        if let Some(age) = player.age {
            soft.assert_true(
                age >= MIN_AGE,
                &format!("{}: age {} should be >= {}", label, age, MIN_AGE),
            );
            soft.assert_true(
                age <= MAX_AGE,
                &format!("{}: age {} should be <= {}", label, age, MAX_AGE),
            );
        }

        soft.assert_some(
            &player.gender_as_enum(),
            &format!(
                "{}: gender {:?} should be male or female",
                label, player.gender
            ),
        );
        soft.assert_some(
            &player.role_as_enum(),
            &format!(
                "{}: role {:?} should be supervisor, admin or user",
                label, player.role
            ),
        );
    }
    soft.assert_all()
}

/// Like the get endpoint, the listing carries no caller identity.
async fn regular_user_cannot_get_all_players(ctx: &TestContext) -> Result<()> {
    ctx.step("Create a regular user");
    let user = data_generator::random_user_details();
    ctx.create_player_and_register(ctx.supervisor_login(), &user)
        .await?;

    ctx.step("Attempt to retrieve all players as regular user");
    let response = ctx.api().get_all_players().await?;

    ctx.step("Assert access is forbidden");
    ensure_eq(
        response.status(),
        403,
        "Regular user should not be able to retrieve all players",
    )
}
