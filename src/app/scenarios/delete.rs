use crate::core::assertions::ensure_eq;
use crate::core::context::{created_id, TestContext};
use crate::core::data_generator;
use crate::core::suite::TestCase;
use crate::domain::model::{PlayerCreateResponse, Role};
use crate::utils::error::Result;
use serde_json::json;

const CLASS: &str = "DeletePlayer";

const NON_EXISTING_ID: i64 = 99_999_999;

pub fn cases() -> Vec<TestCase> {
    let mut cases = Vec::new();

    for (deleter, role) in [(Role::Supervisor, Role::User), (Role::Admin, Role::Admin)] {
        cases.push(
            TestCase::new(
                CLASS,
                "supervisor_and_admin_can_delete_player",
                "Positive: Supervisor and Admin can delete players with different roles",
                move |ctx| Box::pin(supervisor_and_admin_can_delete_player(ctx, deleter, role)),
            )
            .with_params(vec![deleter.to_string(), role.to_string()]),
        );
    }

    cases.push(TestCase::new(
        CLASS,
        "admin_can_delete_self",
        "Positive: Admin user can delete itself",
        |ctx| Box::pin(admin_can_delete_self(ctx)),
    ));

    for (actor, protected) in [(Role::User, Role::Admin), (Role::Admin, Role::Admin)] {
        cases.push(
            TestCase::new(
                CLASS,
                "cannot_delete_protected_admin",
                "Negative: Regular user/admin cannot delete protected admin user",
                move |ctx| Box::pin(cannot_delete_protected_admin(ctx, actor, protected)),
            )
            .with_params(vec![actor.to_string(), protected.to_string()]),
        );
    }

    for actor in [Role::User, Role::Admin] {
        cases.push(
            TestCase::new(
                CLASS,
                "cannot_delete_protected_supervisor",
                "Negative: Regular user/admin cannot delete supervisor",
                move |ctx| Box::pin(cannot_delete_protected_supervisor(ctx, actor)),
            )
            .with_params(vec![actor.to_string()]),
        );
    }

    cases.push(TestCase::new(
        CLASS,
        "delete_non_existing_player",
        "Negative: Delete a player that does not exist",
        |ctx| Box::pin(delete_non_existing_player(ctx)),
    ));
    cases.push(TestCase::new(
        CLASS,
        "delete_with_invalid_player_id_type",
        "Negative: Send invalid data type for playerId",
        |ctx| Box::pin(delete_with_invalid_player_id_type(ctx)),
    ));
    cases.push(TestCase::new(
        CLASS,
        "user_cannot_delete_self",
        "Negative: Regular user cannot delete themselves",
        |ctx| Box::pin(user_cannot_delete_self(ctx)),
    ));
    cases.push(TestCase::new(
        CLASS,
        "supervisor_cannot_delete_self",
        "Negative: Supervisor cannot delete themselves",
        |ctx| Box::pin(supervisor_cannot_delete_self(ctx)),
    ));

    cases
}

async fn create_with_role(ctx: &TestContext, role: Role) -> Result<(PlayerCreateResponse, i64)> {
    let details = data_generator::random_player_details(role);
    let created = ctx
        .create_player_and_register(ctx.supervisor_login(), &details)
        .await?;
    let id = created_id(&created)?;
    Ok((created, id))
}

fn login_of(created: &PlayerCreateResponse) -> &str {
    created.login.as_deref().unwrap_or_default()
}

/// Deletes `id` as `editor`, expecting 204 and a 404 on the follow-up read.
async fn delete_and_verify_gone(
    ctx: &TestContext,
    editor: &str,
    id: i64,
    gone_message: &str,
) -> Result<()> {
    let response = ctx.api().delete_player(editor, &json!(id)).await?;

    ctx.step("Assert player deleted with status 204");
    ensure_eq(response.status(), 204, "Delete should return 204 No Content")?;
    ctx.forget(id);

    ctx.step("Assert player no longer exists");
    let read = ctx.api().get_player(&json!(id)).await?;
    ensure_eq(read.status(), 404, gone_message)
}

/// Deletes `id` as `editor`, expecting 403 and the player to survive.
async fn delete_forbidden(
    ctx: &TestContext,
    editor: &str,
    id: i64,
    forbidden_message: &str,
    survive_message: &str,
) -> Result<()> {
    let response = ctx.api().delete_player(editor, &json!(id)).await?;

    ctx.step("Assert deletion rejected with 403 Forbidden");
    ensure_eq(response.status(), 403, forbidden_message)?;

    ctx.step("Assert player still exists");
    let read = ctx.api().get_player(&json!(id)).await?;
    ensure_eq(read.status(), 200, survive_message)
}

async fn supervisor_and_admin_can_delete_player(
    ctx: &TestContext,
    deleter: Role,
    role: Role,
) -> Result<()> {
    ctx.step(format!("Create a player with role {}", role));
    let (_, id) = create_with_role(ctx, role).await?;

    ctx.step(format!("Delete player as {}", deleter));
    delete_and_verify_gone(
        ctx,
        ctx.login_for(deleter)?,
        id,
        "Get should return not found after delete",
    )
    .await
}

async fn admin_can_delete_self(ctx: &TestContext) -> Result<()> {
    ctx.step("Create an admin user");
    let (admin, id) = create_with_role(ctx, Role::Admin).await?;

    ctx.step("Admin deletes itself");
    delete_and_verify_gone(
        ctx,
        login_of(&admin),
        id,
        "Admin should not exist after self-delete",
    )
    .await
}

async fn cannot_delete_protected_admin(
    ctx: &TestContext,
    actor: Role,
    protected: Role,
) -> Result<()> {
    ctx.step(format!("Create a {} actor user", actor));
    let (actor_created, _) = create_with_role(ctx, actor).await?;

    ctx.step(format!("Create a {} user", protected));
    let (_, protected_id) = create_with_role(ctx, protected).await?;

    ctx.step(format!("Attempt to delete {} user as {}", protected, actor));
    delete_forbidden(
        ctx,
        login_of(&actor_created),
        protected_id,
        &format!("Delete should be forbidden for {} on {} user", actor, protected),
        &format!(
            "{} user should still exist after forbidden delete attempt",
            protected
        ),
    )
    .await
}

async fn cannot_delete_protected_supervisor(ctx: &TestContext, actor: Role) -> Result<()> {
    ctx.step(format!("Create a {} actor user", actor));
    let (actor_created, _) = create_with_role(ctx, actor).await?;

    ctx.step(format!("Attempt to delete supervisor as {}", actor));
    delete_forbidden(
        ctx,
        login_of(&actor_created),
        ctx.supervisor_id(),
        &format!("Delete should be forbidden for {} on supervisor user", actor),
        "Supervisor should still exist after forbidden delete attempt",
    )
    .await
}

async fn delete_non_existing_player(ctx: &TestContext) -> Result<()> {
    ctx.step("Attempt to delete non-existing player");
    let response = ctx
        .api()
        .delete_player(ctx.supervisor_login(), &json!(NON_EXISTING_ID))
        .await?;

    ctx.step("Assert deletion rejected with 404 Not Found");
    ensure_eq(
        response.status(),
        404,
        "Deleting non-existing player should return not found",
    )
}

async fn delete_with_invalid_player_id_type(ctx: &TestContext) -> Result<()> {
    ctx.step("Attempt to delete with invalid player ID type");
    let response = ctx
        .api()
        .delete_player(ctx.supervisor_login(), &json!("not-a-number"))
        .await?;

    ctx.step("Assert deletion rejected with 400 Bad Request");
    ensure_eq(response.status(), 400, "Invalid playerId type should be rejected")
}

async fn user_cannot_delete_self(ctx: &TestContext) -> Result<()> {
    ctx.step("Create a user");
    let (user, id) = create_with_role(ctx, Role::User).await?;

    ctx.step("Attempt user self-deletion");
    delete_forbidden(
        ctx,
        login_of(&user),
        id,
        &format!("Self-delete should be forbidden for role: {}", Role::User),
        &format!(
            "User should still exist after forbidden self-delete role: {}",
            Role::User
        ),
    )
    .await
}

async fn supervisor_cannot_delete_self(ctx: &TestContext) -> Result<()> {
    ctx.step("Attempt supervisor self-deletion");
    delete_forbidden(
        ctx,
        ctx.supervisor_login(),
        ctx.supervisor_id(),
        &format!("Self-delete should be forbidden for role: {}", Role::Supervisor),
        &format!(
            "Supervisor should still exist after forbidden self-delete role: {}",
            Role::Supervisor
        ),
    )
    .await
}
