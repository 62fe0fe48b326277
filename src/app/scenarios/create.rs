use crate::core::assertions::{ensure_eq, SoftAssert};
use crate::core::context::{
    assert_created_fields_match, assert_retrieved_fields_match, created_id, details_params,
    TestContext,
};
use crate::core::data_generator::{
    self, MAX_AGE, MAX_PASSWORD_LENGTH, MIN_AGE, MIN_PASSWORD_LENGTH,
};
use crate::core::suite::TestCase;
use crate::domain::model::{PlayerDetails, Role};
use crate::utils::error::Result;
use serde_json::json;

const CLASS: &str = "CreatePlayer";

#[derive(Debug, Clone, Copy)]
enum InvalidPassword {
    OnlyLetters,
    TooShort,
    TooLong,
}

impl InvalidPassword {
    fn label(self) -> String {
        match self {
            InvalidPassword::OnlyLetters => "Password without digits".to_string(),
            InvalidPassword::TooShort => {
                format!("Password too short ({})", MIN_PASSWORD_LENGTH - 1)
            }
            InvalidPassword::TooLong => format!("Password too long ({})", MAX_PASSWORD_LENGTH + 1),
        }
    }

    fn generate(self) -> String {
        match self {
            InvalidPassword::OnlyLetters => "onlyletters".to_string(),
            InvalidPassword::TooShort => data_generator::random_password(MIN_PASSWORD_LENGTH - 1),
            InvalidPassword::TooLong => data_generator::random_password(MAX_PASSWORD_LENGTH + 1),
        }
    }
}

pub fn cases() -> Vec<TestCase> {
    let mut cases = Vec::new();

    for (creator, role) in [(Role::Supervisor, Role::Admin), (Role::Admin, Role::User)] {
        cases.push(
            TestCase::new(
                CLASS,
                "privileged_user_creates_player_with_role",
                "Positive: Supervisor/Admin can create admin/user players",
                move |ctx| Box::pin(privileged_user_creates_player_with_role(ctx, creator, role)),
            )
            .with_params(vec![creator.to_string(), role.to_string()]),
        );
    }

    for age in [MIN_AGE, MAX_AGE] {
        cases.push(
            TestCase::new(
                CLASS,
                "privileged_user_creates_player_with_boundary_age",
                "Positive: Supervisor creates player with boundary ages",
                move |ctx| Box::pin(privileged_user_creates_player_with_boundary_age(ctx, age)),
            )
            .with_params(vec![age.to_string()]),
        );
    }

    for length in [MIN_PASSWORD_LENGTH, MAX_PASSWORD_LENGTH] {
        cases.push(
            TestCase::new(
                CLASS,
                "privileged_user_creates_player_with_boundary_password",
                "Positive: Supervisor creates player with boundary password lengths",
                move |ctx| {
                    Box::pin(privileged_user_creates_player_with_boundary_password(ctx, length))
                },
            )
            .with_params(vec![length.to_string()]),
        );
    }

    for age in [MIN_AGE - 1, MAX_AGE + 1] {
        cases.push(
            TestCase::new(
                CLASS,
                "create_player_with_invalid_age",
                "Negative: Age boundary constraints",
                move |ctx| Box::pin(create_player_with_invalid_age(ctx, age)),
            )
            .with_params(vec![age.to_string()]),
        );
    }

    cases.push(TestCase::new(
        CLASS,
        "user_cannot_create_other_players",
        "Negative: Regular user cannot create other players",
        |ctx| Box::pin(user_cannot_create_other_players(ctx)),
    ));

    for password in [
        InvalidPassword::OnlyLetters,
        InvalidPassword::TooShort,
        InvalidPassword::TooLong,
    ] {
        cases.push(
            TestCase::new(
                CLASS,
                "invalid_passwords",
                "Negative: Password validation (digits and length)",
                move |ctx| Box::pin(invalid_passwords(ctx, password)),
            )
            .with_params(vec![password.label()]),
        );
    }

    cases.push(TestCase::new(
        CLASS,
        "create_player_with_invalid_gender",
        "Negative: Gender must be 'male' or 'female'",
        |ctx| Box::pin(create_player_with_invalid_gender(ctx)),
    ));
    cases.push(TestCase::new(
        CLASS,
        "cannot_create_player_with_duplicate_login",
        "Negative: Cannot create a player with duplicate login",
        |ctx| Box::pin(cannot_create_player_with_duplicate_login(ctx)),
    ));
    cases.push(TestCase::new(
        CLASS,
        "cannot_create_player_with_duplicate_screen_name",
        "Negative: Cannot create a player with duplicate screenName",
        |ctx| Box::pin(cannot_create_player_with_duplicate_screen_name(ctx)),
    ));

    cases
}

async fn create_and_verify(ctx: &TestContext, editor: &str, details: &PlayerDetails) -> Result<()> {
    let created = ctx.create_player_and_register(editor, details).await?;

    ctx.step("Assert player created with correct fields");
    let mut soft = SoftAssert::new();
    soft.assert_some(&created.id, "ID should not be null");
    assert_created_fields_match(&mut soft, &created, details);
    soft.assert_all()
}

async fn privileged_user_creates_player_with_role(
    ctx: &TestContext,
    creator: Role,
    role: Role,
) -> Result<()> {
    ctx.step(format!("Create a player with role {} as {}", role, creator));
    let details = data_generator::random_player_details(role);
    create_and_verify(ctx, ctx.login_for(creator)?, &details).await
}

async fn privileged_user_creates_player_with_boundary_age(ctx: &TestContext, age: i32) -> Result<()> {
    ctx.step(format!("Create player with boundary age {}", age));
    let details = PlayerDetails {
        age,
        ..data_generator::random_user_details()
    };
    create_and_verify(ctx, ctx.supervisor_login(), &details).await
}

async fn privileged_user_creates_player_with_boundary_password(
    ctx: &TestContext,
    length: usize,
) -> Result<()> {
    ctx.step(format!("Create player with boundary password length {}", length));
    let details = PlayerDetails {
        password: data_generator::random_password(length),
        ..data_generator::random_user_details()
    };
    create_and_verify(ctx, ctx.supervisor_login(), &details).await
}

async fn create_player_with_invalid_age(ctx: &TestContext, age: i32) -> Result<()> {
    ctx.step(format!("Attempt to create player with invalid age {}", age));
    let details = PlayerDetails {
        age,
        ..data_generator::random_user_details()
    };
    let response = ctx
        .api()
        .create_player(ctx.supervisor_login(), &details_params(&details)?)
        .await?;
    ctx.register_from_response(&response);

    let bound = if age < MIN_AGE {
        format!("should be >= {}", MIN_AGE)
    } else {
        format!("should be <= {}", MAX_AGE)
    };
    ctx.step(format!("Assert creation rejected for age {} ({})", age, bound));
    ensure_eq(
        response.status(),
        400,
        &format!("Failed for: boundary value {} ({})", age, bound),
    )
}

async fn user_cannot_create_other_players(ctx: &TestContext) -> Result<()> {
    ctx.step("Create a user");
    let user = data_generator::random_user_details();
    ctx.create_player_and_register(ctx.supervisor_login(), &user)
        .await?;

    ctx.step("Attempt to create another player as regular user");
    let other = data_generator::random_user_details();
    let response = ctx
        .api()
        .create_player(&user.login, &details_params(&other)?)
        .await?;
    ctx.register_from_response(&response);

    ctx.step("Assert creation rejected with 403 Forbidden");
    ensure_eq(
        response.status(),
        403,
        "Regular user should not have permissions to create players",
    )
}

async fn invalid_passwords(ctx: &TestContext, password: InvalidPassword) -> Result<()> {
    let reason = password.label();
    ctx.step(format!("Attempt to create player with invalid password: {}", reason));
    let details = PlayerDetails {
        password: password.generate(),
        ..data_generator::random_user_details()
    };
    let response = ctx
        .api()
        .create_player(ctx.supervisor_login(), &details_params(&details)?)
        .await?;
    ctx.register_from_response(&response);

    ctx.step("Assert creation rejected");
    ensure_eq(
        response.status(),
        400,
        &format!("Invalid password should be rejected: {}", reason),
    )
}

async fn create_player_with_invalid_gender(ctx: &TestContext) -> Result<()> {
    ctx.step("Attempt to create player with invalid gender");
    let details = data_generator::random_user_details();
    let params = json!({
        "age": details.age,
        "login": details.login,
        "password": details.password,
        "role": details.role.as_str(),
        "screenName": details.screen_name,
        "gender": "nonbinary",
    });
    let response = ctx
        .api()
        .create_player(ctx.supervisor_login(), &params)
        .await?;
    ctx.register_from_response(&response);

    ctx.step("Assert creation rejected");
    ensure_eq(response.status(), 400, "Invalid gender should be rejected")
}

/// Sends `duplicate` and checks that it is refused and `original` is intact.
async fn assert_duplicate_rejected(
    ctx: &TestContext,
    original: &PlayerDetails,
    duplicate: &PlayerDetails,
    field: &str,
) -> Result<()> {
    ctx.step("Create first player");
    let created = ctx
        .create_player_and_register(ctx.supervisor_login(), original)
        .await?;
    let original_id = created_id(&created)?;

    ctx.step(format!(
        "Attempt to create second player with duplicate {}",
        field
    ));
    let response = ctx
        .api()
        .create_player(ctx.supervisor_login(), &details_params(duplicate)?)
        .await?;
    ctx.register_from_response(&response);

    ctx.step("Assert creation rejected");
    ensure_eq(
        response.status(),
        400,
        &format!("Second create with duplicate {} should be rejected", field),
    )?;

    ctx.step("Assert first player data unchanged");
    let actual = ctx.get_player(original_id).await?;
    let mut soft = SoftAssert::new();
    soft.assert_eq(actual.id, Some(original_id), "Player ID should not change");
    assert_retrieved_fields_match(&mut soft, &actual, original);
    soft.assert_all()
}

async fn cannot_create_player_with_duplicate_login(ctx: &TestContext) -> Result<()> {
    let first = data_generator::random_user_details();
    let duplicate = PlayerDetails {
        login: first.login.clone(),
        gender: first.gender,
        ..data_generator::random_user_details()
    };
    assert_duplicate_rejected(ctx, &first, &duplicate, "login").await
}

async fn cannot_create_player_with_duplicate_screen_name(ctx: &TestContext) -> Result<()> {
    let first = data_generator::random_user_details();
    let duplicate = PlayerDetails {
        screen_name: first.screen_name.clone(),
        ..data_generator::random_user_details()
    };
    assert_duplicate_rejected(ctx, &first, &duplicate, "screenName").await
}
