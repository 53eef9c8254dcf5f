use serde::Serialize;

use crate::cli::GlobalFlags;
use crate::context::AppContext;
use crate::output::{TextRender, output};

#[derive(Serialize)]
struct AuthTokenResponse {
    token: String,
}

impl TextRender for AuthTokenResponse {
    fn render_text(&self) -> String {
        self.token.clone()
    }
}

pub async fn handle(ctx: &AppContext, flags: &GlobalFlags) -> anyhow::Result<()> {
    let token = skiff_auth::current_token(ctx.store.as_ref(), &ctx.api).await?;
    output(&AuthTokenResponse { token }, flags.format)
}
