use exm_api::user::{self, LoginRequest, RegisterRequest};
use exm_auth::CredentialStore;
use exm_core::entities::User;
use serde::Serialize;

use crate::cli::GlobalFlags;
use crate::cli::subcommands::AuthCommands;
use crate::context::AppContext;
use crate::output::output;

#[derive(Debug, Serialize)]
struct SignedInResponse {
    user: User,
    token_source: Option<&'static str>,
}

#[derive(Debug, Serialize)]
struct AuthStatusResponse {
    authenticated: bool,
    user: Option<User>,
    user_id: Option<String>,
    token_source: Option<&'static str>,
    expires_at: Option<String>,
    note: Option<String>,
}

/// Handle `exm auth`.
pub async fn handle(
    action: &AuthCommands,
    ctx: &AppContext,
    flags: &GlobalFlags,
) -> anyhow::Result<()> {
    match action {
        AuthCommands::SendCode { phone } => {
            user::send_verification_code(ctx.api.client(), phone).await?;
            output(&serde_json::json!({ "sent": true, "phone": phone }), flags.format)
        }
        AuthCommands::Login { phone, code } => {
            let request = LoginRequest {
                phone: phone.clone(),
                code: code.clone(),
            };
            let session = ctx.api.login(&request).await?;
            signed_in(session.user, ctx, flags)
        }
        AuthCommands::Register { name, phone, code } => {
            let request = RegisterRequest {
                name: name.clone(),
                phone: phone.clone(),
                code: code.clone(),
            };
            let session = ctx.api.register(&request).await?;
            signed_in(session.user, ctx, flags)
        }
        AuthCommands::Logout => {
            ctx.api.logout().await?;
            output(&serde_json::json!({ "signed_out": true }), flags.format)
        }
        AuthCommands::Status { offline } => status(*offline, ctx, flags).await,
    }
}

fn signed_in(user: User, ctx: &AppContext, flags: &GlobalFlags) -> anyhow::Result<()> {
    output(
        &SignedInResponse {
            user,
            token_source: ctx.credentials.token_source(),
        },
        flags.format,
    )
}

async fn status(offline: bool, ctx: &AppContext, flags: &GlobalFlags) -> anyhow::Result<()> {
    let Some(token) = ctx.credentials.token() else {
        return output(&signed_out(None, "no stored token"), flags.format);
    };

    let expires_at = exm_auth::expiry::decode_expiry(&token)
        .ok()
        .map(|at| at.to_rfc3339());
    let token_source = ctx.credentials.token_source();
    let user_id = ctx.credentials.user_id();

    if offline {
        return output(
            &AuthStatusResponse {
                authenticated: exm_auth::expiry::is_near_expiry(&token, 0) != Some(true),
                user: None,
                user_id,
                token_source,
                expires_at,
                note: Some("offline: token not verified with the backend".into()),
            },
            flags.format,
        );
    }

    let response = match ctx.api.user_info().await {
        Ok(user) => AuthStatusResponse {
            authenticated: true,
            user_id: Some(user.id.clone()),
            user: Some(user),
            token_source,
            expires_at,
            note: None,
        },
        // The 401 already cleared the stored credentials.
        Err(error) if error.is_unauthorized() => signed_out(expires_at, "session expired"),
        Err(error) => AuthStatusResponse {
            authenticated: false,
            user: None,
            user_id,
            token_source,
            expires_at,
            note: Some(error.user_message()),
        },
    };
    output(&response, flags.format)
}

fn signed_out(expires_at: Option<String>, note: &str) -> AuthStatusResponse {
    AuthStatusResponse {
        authenticated: false,
        user: None,
        user_id: None,
        token_source: None,
        expires_at,
        note: Some(note.to_string()),
    }
}
