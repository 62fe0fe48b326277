use crate::core::assertions::{ensure_eq, SoftAssert};
use crate::core::context::{created_id, TestContext};
use crate::core::data_generator::{
    self, DEFAULT_PASSWORD_LENGTH, MAX_AGE, MAX_PASSWORD_LENGTH, MIN_AGE, MIN_PASSWORD_LENGTH,
};
use crate::core::suite::TestCase;
use crate::domain::model::{
    PlayerDetails, PlayerGetByIdResponse, PlayerUpdateRequest, PlayerUpdateResponse, PlayerView,
    Role,
};
use crate::utils::error::Result;
use serde_json::{json, Value};

const CLASS: &str = "UpdatePlayer";

const NON_EXISTING_ID: i64 = 99_999_999;

#[derive(Debug, Clone, Copy)]
enum BoundaryViolation {
    AgeTooLow,
    AgeTooHigh,
    PasswordTooShort,
    PasswordTooLong,
    PasswordWithoutDigits,
}

impl BoundaryViolation {
    const ALL: [BoundaryViolation; 5] = [
        BoundaryViolation::AgeTooLow,
        BoundaryViolation::AgeTooHigh,
        BoundaryViolation::PasswordTooShort,
        BoundaryViolation::PasswordTooLong,
        BoundaryViolation::PasswordWithoutDigits,
    ];

    fn label(self) -> String {
        match self {
            BoundaryViolation::AgeTooLow => format!("Age {} (too low)", MIN_AGE - 1),
            BoundaryViolation::AgeTooHigh => format!("Age {} (too high)", MAX_AGE + 1),
            BoundaryViolation::PasswordTooShort => {
                format!("Password {} chars (too short)", MIN_PASSWORD_LENGTH - 1)
            }
            BoundaryViolation::PasswordTooLong => {
                format!("Password {} chars (too long)", MAX_PASSWORD_LENGTH + 1)
            }
            BoundaryViolation::PasswordWithoutDigits => "Password without digits".to_string(),
        }
    }

    fn request(self) -> PlayerUpdateRequest {
        let (age, password) = match self {
            BoundaryViolation::AgeTooLow => (Some(MIN_AGE - 1), None),
            BoundaryViolation::AgeTooHigh => (Some(MAX_AGE + 1), None),
            BoundaryViolation::PasswordTooShort => (
                None,
                Some(data_generator::random_password(MIN_PASSWORD_LENGTH - 1)),
            ),
            BoundaryViolation::PasswordTooLong => (
                None,
                Some(data_generator::random_password(MAX_PASSWORD_LENGTH + 1)),
            ),
            BoundaryViolation::PasswordWithoutDigits => (None, Some("onlyletters".to_string())),
        };
        PlayerUpdateRequest {
            age,
            password,
            ..PlayerUpdateRequest::default()
        }
    }
}

pub fn cases() -> Vec<TestCase> {
    let mut cases = Vec::new();

    for editor in [Role::Supervisor, Role::Admin] {
        cases.push(
            TestCase::new(
                CLASS,
                "privileged_user_updates_one_field",
                "Positive: Supervisor/Admin updates one field of a player",
                move |ctx| Box::pin(privileged_user_updates_one_field(ctx, editor)),
            )
            .with_params(vec![editor.to_string()]),
        );
    }

    for (editor, age, length) in [
        (Role::Supervisor, MIN_AGE, MIN_PASSWORD_LENGTH),
        (Role::Admin, MAX_AGE, MAX_PASSWORD_LENGTH),
    ] {
        cases.push(
            TestCase::new(
                CLASS,
                "privileged_user_updates_multiple_fields_with_boundary_values",
                "Positive: Supervisor/Admin updates multiple fields with boundary values",
                move |ctx| {
                    Box::pin(privileged_user_updates_multiple_fields_with_boundary_values(
                        ctx, editor, age, length,
                    ))
                },
            )
            .with_params(vec![editor.to_string(), age.to_string(), length.to_string()]),
        );
    }

    cases.push(TestCase::new(
        CLASS,
        "user_updates_own_one_field",
        "Positive: User updates one field of himself",
        |ctx| Box::pin(user_updates_own_one_field(ctx)),
    ));
    cases.push(TestCase::new(
        CLASS,
        "user_updates_own_multiple_fields",
        "Positive: User updates multiple fields of himself",
        |ctx| Box::pin(user_updates_own_multiple_fields(ctx)),
    ));
    cases.push(TestCase::new(
        CLASS,
        "supervisor_empty_update_does_not_change_fields",
        "Positive: Supervisor updates user with empty body does not change fields",
        |ctx| Box::pin(supervisor_empty_update_does_not_change_fields(ctx)),
    ));
    cases.push(TestCase::new(
        CLASS,
        "update_login_not_allowed",
        "Negative: Attempt to update player login",
        |ctx| Box::pin(update_login_not_allowed(ctx)),
    ));
    cases.push(TestCase::new(
        CLASS,
        "user_cannot_update_another_player",
        "Negative: Regular user cannot update another player's data",
        |ctx| Box::pin(user_cannot_update_another_player(ctx)),
    ));
    cases.push(TestCase::new(
        CLASS,
        "update_non_existing_player_id",
        "Negative: Update non-existing player id",
        |ctx| Box::pin(update_non_existing_player_id(ctx)),
    ));
    cases.push(TestCase::new(
        CLASS,
        "update_null_player_id",
        "Negative: Update null player id",
        |ctx| Box::pin(update_null_player_id(ctx)),
    ));
    cases.push(TestCase::new(
        CLASS,
        "update_with_invalid_age_type",
        "Negative: Invalid data type in update (age as string)",
        |ctx| Box::pin(update_with_invalid_age_type(ctx)),
    ));

    for violation in BoundaryViolation::ALL {
        cases.push(
            TestCase::new(
                CLASS,
                "update_with_boundary_violations",
                "Negative: Update with boundary violations",
                move |ctx| Box::pin(update_with_boundary_violations(ctx, violation)),
            )
            .with_params(vec![violation.label()]),
        );
    }

    cases.push(TestCase::new(
        CLASS,
        "update_with_invalid_gender",
        "Negative: Update player with invalid gender",
        |ctx| Box::pin(update_with_invalid_gender(ctx)),
    ));
    cases.push(TestCase::new(
        CLASS,
        "update_with_non_updatable_field",
        "Negative: Update player with non-updatable field (id) in request",
        |ctx| Box::pin(update_with_non_updatable_field(ctx)),
    ));
    cases.push(TestCase::new(
        CLASS,
        "update_with_duplicate_login",
        "Negative: Cannot update player with duplicate login from another player",
        |ctx| Box::pin(update_with_duplicate_login(ctx)),
    ));
    cases.push(TestCase::new(
        CLASS,
        "update_with_duplicate_screen_name",
        "Negative: Cannot update player with duplicate screenName from another player",
        |ctx| Box::pin(update_with_duplicate_screen_name(ctx)),
    ));

    for (current, target) in [(Role::User, Role::Admin), (Role::Admin, Role::Supervisor)] {
        cases.push(
            TestCase::new(
                CLASS,
                "non_privileged_users_cannot_change_own_role",
                "Negative: Unprivileged users cannot change their own role",
                move |ctx| Box::pin(non_privileged_users_cannot_change_own_role(ctx, current, target)),
            )
            .with_params(vec![current.to_string(), target.to_string()]),
        );
    }

    cases
}

/// Every field the update response carries, id included.
fn assert_retrieved_matches_update_response(
    soft: &mut SoftAssert,
    actual: &PlayerGetByIdResponse,
    expected: &PlayerUpdateResponse,
) {
    soft.assert_eq(actual.id, expected.id, "ID should match");
    soft.assert_eq(&actual.login, &expected.login, "Login should match");
    soft.assert_eq(actual.age, expected.age, "Age should match");
    soft.assert_eq(actual.role_as_enum(), expected.role_as_enum(), "Role should match");
    soft.assert_eq(
        actual.gender_as_enum(),
        expected.gender_as_enum(),
        "Gender should match",
    );
    soft.assert_eq(
        &actual.screen_name,
        &expected.screen_name,
        "ScreenName should match",
    );
}

/// Fields a screen-name-only update must leave alone.
fn assert_update_response_unchanged_fields(
    soft: &mut SoftAssert,
    actual: &PlayerUpdateResponse,
    original: &PlayerDetails,
) {
    soft.assert_eq(
        actual.login.as_deref(),
        Some(original.login.as_str()),
        "Response Login should remain unchanged",
    );
    soft.assert_eq(actual.age, Some(original.age), "Response Age should remain unchanged");
    soft.assert_eq(
        actual.role_as_enum(),
        Some(original.role),
        "Response Role should remain unchanged",
    );
    soft.assert_eq(
        actual.gender_as_enum(),
        Some(original.gender),
        "Response Gender should remain unchanged",
    );
}

/// Creates a user as the supervisor; returns its details and id.
async fn create_user(ctx: &TestContext) -> Result<(PlayerDetails, i64)> {
    let details = data_generator::random_user_details();
    let created = ctx
        .create_player_and_register(ctx.supervisor_login(), &details)
        .await?;
    Ok((details, created_id(&created)?))
}

/// Updates the screen name of `id` as `editor` and checks response and
/// stored state.
async fn update_screen_name_and_verify(
    ctx: &TestContext,
    editor: &str,
    id: i64,
    original: &PlayerDetails,
) -> Result<()> {
    let request = PlayerUpdateRequest::screen_name(data_generator::random_screen_name());
    let updated = ctx.update_player(editor, id, &request).await?;

    ctx.step("Assert update response contains updated fields");
    let mut soft = SoftAssert::new();
    soft.assert_eq(
        &updated.screen_name,
        &request.screen_name,
        "Response ScreenName should be updated",
    );
    assert_update_response_unchanged_fields(&mut soft, &updated, original);
    soft.assert_all()?;

    ctx.step("Assert retrieved player matches update response");
    let stored = ctx.get_player(id).await?;
    let mut soft = SoftAssert::new();
    soft.assert_eq(stored.id, Some(id), "Response id should remain unchanged");
    assert_retrieved_matches_update_response(&mut soft, &stored, &updated);
    soft.assert_all()
}

async fn privileged_user_updates_one_field(ctx: &TestContext, editor: Role) -> Result<()> {
    ctx.step("Create a player");
    let (details, id) = create_user(ctx).await?;

    ctx.step(format!("Update one field as {}", editor));
    update_screen_name_and_verify(ctx, ctx.login_for(editor)?, id, &details).await
}

async fn privileged_user_updates_multiple_fields_with_boundary_values(
    ctx: &TestContext,
    editor: Role,
    age: i32,
    password_length: usize,
) -> Result<()> {
    ctx.step("Create a player");
    let (_, id) = create_user(ctx).await?;

    ctx.step(format!(
        "Update multiple fields with boundary values as {} (age: {}, password length: {})",
        editor, age, password_length
    ));
    let random = data_generator::random_player_details(Role::Admin);
    let request = PlayerUpdateRequest {
        age: Some(age),
        gender: Some(random.gender),
        login: None,
        password: Some(data_generator::random_password(password_length)),
        role: Some(random.role),
        screen_name: Some(random.screen_name),
    };
    let updated = ctx.update_player(ctx.login_for(editor)?, id, &request).await?;

    ctx.step("Assert update response contains updated fields with boundary values");
    let mut soft = SoftAssert::new();
    soft.assert_eq(updated.age, Some(age), "Response Age should match boundary value");
    soft.assert_eq(
        &updated.screen_name,
        &request.screen_name,
        "Response ScreenName should be updated",
    );
    soft.assert_eq(updated.role_as_enum(), request.role, "Response Role should be updated");
    soft.assert_all()?;

    ctx.step("Assert retrieved player matches update response");
    let stored = ctx.get_player(id).await?;
    let mut soft = SoftAssert::new();
    soft.assert_eq(stored.age, Some(age), "Age should match boundary value");
    soft.assert_eq(
        &stored.screen_name,
        &request.screen_name,
        "ScreenName should be updated",
    );
    soft.assert_eq(stored.role_as_enum(), request.role, "Role should be updated");
    soft.assert_all()
}

async fn user_updates_own_one_field(ctx: &TestContext) -> Result<()> {
    ctx.step("Create a user");
    let (details, id) = create_user(ctx).await?;

    ctx.step("Update one field of the user");
    update_screen_name_and_verify(ctx, &details.login, id, &details).await
}

async fn user_updates_own_multiple_fields(ctx: &TestContext) -> Result<()> {
    ctx.step("Create a user");
    let (details, id) = create_user(ctx).await?;

    ctx.step("Update multiple fields of the user");
    let random = data_generator::random_user_details();
    let request = PlayerUpdateRequest {
        age: Some(random.age),
        gender: Some(random.gender),
        login: None,
        password: Some(data_generator::random_password(DEFAULT_PASSWORD_LENGTH)),
        role: None,
        screen_name: Some(random.screen_name),
    };
    let updated = ctx.update_player(&details.login, id, &request).await?;

    ctx.step("Assert update response contains updated fields");
    let mut soft = SoftAssert::new();
    soft.assert_eq(
        &updated.screen_name,
        &request.screen_name,
        "Response ScreenName should be updated",
    );
    soft.assert_eq(updated.age, request.age, "Response Age should be updated");
    soft.assert_eq(
        updated.gender_as_enum(),
        request.gender,
        "Response Gender should be updated",
    );
    soft.assert_eq(
        updated.login.as_deref(),
        Some(details.login.as_str()),
        "Response Login should remain unchanged",
    );
    soft.assert_eq(
        updated.role_as_enum(),
        Some(details.role),
        "Response Role should remain unchanged",
    );
    soft.assert_all()?;

    ctx.step("Assert retrieved user matches update response");
    let stored = ctx.get_player(id).await?;
    let mut soft = SoftAssert::new();
    soft.assert_eq(
        &stored.screen_name,
        &request.screen_name,
        "ScreenName should be updated",
    );
    soft.assert_eq(stored.age, request.age, "Age should be updated");
    soft.assert_eq(stored.gender_as_enum(), request.gender, "Gender should be updated");
    soft.assert_eq(&stored.password, &request.password, "Password should be updated");
    soft.assert_eq(
        stored.login.as_deref(),
        Some(details.login.as_str()),
        "Login should remain unchanged",
    );
    soft.assert_eq(
        stored.role_as_enum(),
        Some(details.role),
        "Role should remain unchanged",
    );
    soft.assert_all()
}

async fn supervisor_empty_update_does_not_change_fields(ctx: &TestContext) -> Result<()> {
    ctx.step("Create a player");
    let (_, id) = create_user(ctx).await?;

    ctx.step("Update with empty body");
    let updated = ctx
        .update_player(ctx.supervisor_login(), id, &PlayerUpdateRequest::default())
        .await?;

    ctx.step("Assert retrieved player matches update response");
    let stored = ctx.get_player(id).await?;
    let mut soft = SoftAssert::new();
    assert_retrieved_matches_update_response(&mut soft, &stored, &updated);
    soft.assert_all()
}

/// Sends a raw update body as the supervisor and expects `expected`.
async fn raw_update_as_supervisor(
    ctx: &TestContext,
    id: i64,
    body: Value,
    expected: u16,
    message: &str,
) -> Result<()> {
    let response = ctx
        .api()
        .update_player(ctx.supervisor_login(), id, &body)
        .await?;

    ctx.step("Assert update rejected");
    ensure_eq(response.status(), expected, message)
}

async fn update_login_not_allowed(ctx: &TestContext) -> Result<()> {
    ctx.step("Create a player");
    let (_, id) = create_user(ctx).await?;

    ctx.step("Attempt to update login");
    let request = PlayerUpdateRequest {
        login: Some("newLogin".to_string()),
        ..PlayerUpdateRequest::default()
    };
    raw_update_as_supervisor(
        ctx,
        id,
        serde_json::to_value(&request)?,
        400,
        "Updating login should be rejected",
    )
    .await
}

async fn user_cannot_update_another_player(ctx: &TestContext) -> Result<()> {
    ctx.step("Create first user");
    let (first, _) = create_user(ctx).await?;

    ctx.step("Create second user");
    let (_, second_id) = create_user(ctx).await?;

    ctx.step("Attempt to update another player's data");
    let request = PlayerUpdateRequest::screen_name(data_generator::random_screen_name());
    let response = ctx
        .api()
        .update_player(&first.login, second_id, &serde_json::to_value(&request)?)
        .await?;

    ctx.step("Assert update rejected");
    ensure_eq(
        response.status(),
        403,
        "Regular user should not update another player's data",
    )
}

async fn update_non_existing_player_id(ctx: &TestContext) -> Result<()> {
    ctx.step("Attempt to update non-existing player id");
    let request = PlayerUpdateRequest::screen_name(data_generator::random_screen_name());
    raw_update_as_supervisor(
        ctx,
        NON_EXISTING_ID,
        serde_json::to_value(&request)?,
        404,
        "Non-existing player id should be rejected",
    )
    .await
}

async fn update_null_player_id(ctx: &TestContext) -> Result<()> {
    ctx.step("Attempt to update with null player id");
    let request = PlayerUpdateRequest::screen_name(data_generator::random_screen_name());
    let response = ctx
        .api()
        .update_player_raw_id(ctx.supervisor_login(), None, &serde_json::to_value(&request)?)
        .await?;

    ctx.step("Assert update rejected");
    ensure_eq(response.status(), 400, "Null player id should be rejected")
}

async fn update_with_invalid_age_type(ctx: &TestContext) -> Result<()> {
    ctx.step("Create a player");
    let (_, id) = create_user(ctx).await?;

    ctx.step("Attempt to update with invalid age type");
    raw_update_as_supervisor(
        ctx,
        id,
        json!({ "age": "not-a-number" }),
        400,
        "Invalid age type should be rejected",
    )
    .await
}

async fn update_with_boundary_violations(
    ctx: &TestContext,
    violation: BoundaryViolation,
) -> Result<()> {
    ctx.step("Create a player");
    let (_, id) = create_user(ctx).await?;

    let label = violation.label();
    ctx.step(format!("Attempt to update with boundary violations: {}", label));
    raw_update_as_supervisor(
        ctx,
        id,
        serde_json::to_value(violation.request())?,
        400,
        &format!("Out-of-bound update should be rejected for: {}", label),
    )
    .await
}

async fn update_with_invalid_gender(ctx: &TestContext) -> Result<()> {
    ctx.step("Create a player");
    let (_, id) = create_user(ctx).await?;

    ctx.step("Attempt to update with invalid gender");
    raw_update_as_supervisor(
        ctx,
        id,
        json!({ "gender": "nonbinary" }),
        400,
        "Invalid gender should be rejected",
    )
    .await
}

async fn update_with_non_updatable_field(ctx: &TestContext) -> Result<()> {
    ctx.step("Create a player");
    let (details, id) = create_user(ctx).await?;

    ctx.step("Attempt to update with non-updatable field (id)");
    let response = ctx
        .api()
        .update_player(ctx.supervisor_login(), id, &json!({ "id": NON_EXISTING_ID }))
        .await?;

    ctx.step("Assert update does not cause error code");
    ensure_eq(
        response.status(),
        200,
        "Update with non-updatable field should be handled gracefully",
    )?;

    ctx.step("Assert retrieved player data unchanged");
    let stored = ctx.get_player(id).await?;
    let mut soft = SoftAssert::new();
    soft.assert_eq(stored.id, Some(id), "Player ID should not change");
    soft.assert_eq(stored.age, Some(details.age), "Player age should not change");
    soft.assert_eq(
        stored.role_as_enum(),
        Some(details.role),
        "Player role should not change",
    );
    soft.assert_eq(
        stored.gender_as_enum(),
        Some(details.gender),
        "Player gender should not change",
    );
    soft.assert_eq(
        stored.screen_name.as_deref(),
        Some(details.screen_name.as_str()),
        "Player screenName should not change",
    );
    soft.assert_eq(
        stored.login.as_deref(),
        Some(details.login.as_str()),
        "Player login should not change",
    );
    soft.assert_eq(
        stored.password.as_deref(),
        Some(details.password.as_str()),
        "Player password should not change",
    );
    soft.assert_all()
}

/// Updates the second of two fresh players with a field copied from the
/// first and checks that the second player is untouched.
async fn assert_duplicate_update_rejected(
    ctx: &TestContext,
    field: &str,
    request_for: fn(&PlayerDetails) -> PlayerUpdateRequest,
) -> Result<()> {
    ctx.step("Create first player");
    let (first, _) = create_user(ctx).await?;

    ctx.step("Create second player");
    let (second, second_id) = create_user(ctx).await?;

    ctx.step(format!("Attempt to update with duplicate {}", field));
    raw_update_as_supervisor(
        ctx,
        second_id,
        serde_json::to_value(request_for(&first))?,
        400,
        &format!("Update with duplicate {} should be rejected", field),
    )
    .await?;

    ctx.step("Assert second player data unchanged");
    let stored = ctx.get_player(second_id).await?;
    let mut soft = SoftAssert::new();
    soft.assert_eq(
        stored.login.as_deref(),
        Some(second.login.as_str()),
        "Player login should not change",
    );
    soft.assert_eq(
        stored.screen_name.as_deref(),
        Some(second.screen_name.as_str()),
        "Player screenName should not change",
    );
    soft.assert_all()
}

async fn update_with_duplicate_login(ctx: &TestContext) -> Result<()> {
    assert_duplicate_update_rejected(ctx, "login", |first| PlayerUpdateRequest {
        login: Some(first.login.clone()),
        ..PlayerUpdateRequest::default()
    })
    .await
}

async fn update_with_duplicate_screen_name(ctx: &TestContext) -> Result<()> {
    assert_duplicate_update_rejected(ctx, "screenName", |first| {
        PlayerUpdateRequest::screen_name(first.screen_name.clone())
    })
    .await
}

async fn non_privileged_users_cannot_change_own_role(
    ctx: &TestContext,
    current: Role,
    target: Role,
) -> Result<()> {
    ctx.step(format!("Create a {} user", current));
    let details = data_generator::random_player_details(current);
    let created = ctx
        .create_player_and_register(ctx.supervisor_login(), &details)
        .await?;
    let id = created_id(&created)?;

    ctx.step(format!("Attempt to elevate {} role to {}", current, target));
    let request = PlayerUpdateRequest {
        role: Some(target),
        ..PlayerUpdateRequest::default()
    };
    let response = ctx
        .api()
        .update_player(&details.login, id, &serde_json::to_value(&request)?)
        .await?;

    ctx.step("Assert update rejected");
    ensure_eq(
        response.status(),
        403,
        &format!(
            "Role {} should not be able to change their own role to {}",
            current, target
        ),
    )?;

    ctx.step(format!("Assert {} role remains unchanged", current));
    let stored = ctx.get_player(id).await?;
    ensure_eq(
        stored.role_as_enum(),
        Some(current),
        &format!(
            "{} role should remain {} after failed elevation attempt",
            current, current
        ),
    )
}
