use serde::Serialize;
use skiff_auth::{LoginFlow, LoginOutcome, SystemBrowser};

use crate::cli::GlobalFlags;
use crate::context::{AppContext, CURRENT_VERSION};
use crate::output::{TextRender, output};

#[derive(Debug, Serialize)]
struct AuthLoginResponse {
    authenticated: bool,
    existing_token_valid: bool,
    current_version: String,
    latest_version: Option<String>,
}

impl AuthLoginResponse {
    fn from_outcome(outcome: &LoginOutcome) -> Self {
        match outcome {
            LoginOutcome::AlreadyAuthenticated => Self {
                authenticated: true,
                existing_token_valid: true,
                current_version: CURRENT_VERSION.to_string(),
                latest_version: None,
            },
            LoginOutcome::LoggedIn {
                token_stored,
                update,
            } => Self {
                authenticated: *token_stored,
                existing_token_valid: false,
                current_version: CURRENT_VERSION.to_string(),
                latest_version: update.as_ref().map(|u| u.latest.clone()),
            },
        }
    }
}

impl TextRender for AuthLoginResponse {
    fn render_text(&self) -> String {
        if self.existing_token_valid {
            return "✔  Success! Existing JWT still valid".to_string();
        }

        let mut text = String::from("✔  Success!");
        if !self.authenticated {
            text.push_str("\nThe login page returned an empty token; you are still logged out.");
        }
        if let Some(latest) = &self.latest_version {
            text.push_str(&format!(
                "\n\nFriendly reminder that there's a newer version of skiff available.\n\
                 You're currently using version {} while latest available version is {latest}.\n\
                 Please consider updating to get new features and more stable experience.\n",
                self.current_version
            ));
        }
        text
    }
}

pub async fn handle(ctx: &AppContext, flags: &GlobalFlags) -> anyhow::Result<()> {
    let browser = SystemBrowser;
    let outcome = LoginFlow::new(
        ctx.store.as_ref(),
        &ctx.api,
        &browser,
        ctx.config.api.login_url.clone(),
        CURRENT_VERSION,
    )
    .with_callback_timeout(ctx.config.auth.callback_timeout())
    .run_until(interrupted())
    .await?;

    output(&AuthLoginResponse::from_outcome(&outcome), flags.format)
}

/// Resolves on Ctrl-C. If the handler cannot be installed, never resolves.
async fn interrupted() {
    if let Err(error) = tokio::signal::ctrl_c().await {
        tracing::debug!(%error, "ctrl-c handler unavailable");
        std::future::pending::<()>().await;
    }
}
