use clap::Subcommand;

/// Authentication commands.
#[derive(Clone, Debug, PartialEq, Eq, Subcommand)]
pub enum AuthCommands {
    /// Log in to the platform through the browser.
    Login,
    /// Log out the currently logged in user.
    Logout,
    /// Show the token used for authorization.
    Token,
}
