use serde::Serialize;
use skiff_auth::LogoutOutcome;

use crate::cli::GlobalFlags;
use crate::context::AppContext;
use crate::output::{TextRender, output};

#[derive(Serialize)]
struct AuthLogoutResponse {
    cleared: bool,
}

impl TextRender for AuthLogoutResponse {
    fn render_text(&self) -> String {
        if self.cleared {
            "Logged out.".to_string()
        } else {
            "No user logged in.".to_string()
        }
    }
}

pub fn handle(ctx: &AppContext, flags: &GlobalFlags) -> anyhow::Result<()> {
    let outcome = skiff_auth::logout(ctx.store.as_ref())?;
    output(
        &AuthLogoutResponse {
            cleared: outcome == LogoutOutcome::LoggedOut,
        },
        flags.format,
    )
}
