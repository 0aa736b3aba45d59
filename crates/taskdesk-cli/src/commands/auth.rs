//! Account and session commands.

use anyhow::{Context as _, Result};
use clap::{Args, Subcommand};
use colored::Colorize;

use taskdesk_core::{Credentials, ProfileUpdate, Registration, UserIdentity};

use crate::context::Context;
use crate::output;

#[derive(Args, Debug)]
pub struct AuthCommand {
    #[command(subcommand)]
    pub command: AuthSubcommand,
}

impl AuthCommand {
    /// Whether the saved session must be restored before running.
    pub fn needs_session(&self) -> bool {
        !matches!(
            self.command,
            AuthSubcommand::Login(_) | AuthSubcommand::Register(_) | AuthSubcommand::Logout
        )
    }
}

#[derive(Subcommand, Debug)]
pub enum AuthSubcommand {
    /// Sign in with email and password
    Login(LoginArgs),

    /// Create an account and sign in
    Register(RegisterArgs),

    /// Sign out and forget the saved tokens
    Logout,

    /// Display the signed-in user
    Whoami,

    /// Change name, email, or password
    UpdateProfile(UpdateProfileArgs),

    /// Exchange the refresh token for a new access token
    Refresh,
}

#[derive(Args, Debug)]
pub struct LoginArgs {
    #[arg(long)]
    pub email: String,

    #[arg(long, env = "TASKDESK_PASSWORD", hide_env_values = true)]
    pub password: String,
}

#[derive(Args, Debug)]
pub struct RegisterArgs {
    #[arg(long)]
    pub name: String,

    #[arg(long)]
    pub email: String,

    #[arg(long, env = "TASKDESK_PASSWORD", hide_env_values = true)]
    pub password: String,
}

#[derive(Args, Debug)]
pub struct UpdateProfileArgs {
    #[arg(long)]
    pub name: Option<String>,

    #[arg(long)]
    pub email: Option<String>,

    /// New password
    #[arg(long)]
    pub password: Option<String>,
}

pub async fn handle(ctx: &Context, cmd: AuthCommand) -> Result<()> {
    match cmd.command {
        AuthSubcommand::Login(args) => login(ctx, args).await,
        AuthSubcommand::Register(args) => register(ctx, args).await,
        AuthSubcommand::Logout => logout(ctx).await,
        AuthSubcommand::Whoami => whoami(ctx).await,
        AuthSubcommand::UpdateProfile(args) => update_profile(ctx, args).await,
        AuthSubcommand::Refresh => refresh(ctx).await,
    }
}

fn print_user(ctx: &Context, user: &UserIdentity) -> Result<()> {
    if ctx.json {
        return output::json_pretty(user);
    }
    output::field("ID", &user.id.to_string());
    output::field("Name", &user.name);
    output::field("Email", &user.email);
    Ok(())
}

async fn login(ctx: &Context, args: LoginArgs) -> Result<()> {
    eprintln!("{}", "Logging in...".dimmed());

    let user = ctx
        .client
        .login(Credentials::new(args.email, args.password))
        .await
        .context("Failed to login")?;

    if !ctx.json {
        output::success("Logged in successfully");
        println!();
    }
    print_user(ctx, &user)
}

async fn register(ctx: &Context, args: RegisterArgs) -> Result<()> {
    let user = ctx
        .client
        .register(Registration::new(args.name, args.email, args.password))
        .await
        .context("Failed to register")?;

    if !ctx.json {
        output::success("Account created");
        println!();
    }
    print_user(ctx, &user)
}

async fn logout(ctx: &Context) -> Result<()> {
    ctx.client.logout().await;
    if !ctx.json {
        output::success("Logged out");
    }
    Ok(())
}

async fn whoami(ctx: &Context) -> Result<()> {
    ctx.require_session().await?;
    let user = ctx
        .client
        .session()
        .user()
        .await
        .context(crate::context::LOGIN_HINT)?;
    print_user(ctx, &user)
}

async fn update_profile(ctx: &Context, args: UpdateProfileArgs) -> Result<()> {
    ctx.require_session().await?;

    let mut update = ProfileUpdate::new();
    if let Some(name) = args.name {
        update = update.name(name);
    }
    if let Some(email) = args.email {
        update = update.email(email);
    }
    if let Some(password) = args.password {
        update = update.password(password);
    }
    if update.is_empty() {
        anyhow::bail!("Nothing to update. Pass --name, --email, or --password.");
    }

    let user = ctx
        .client
        .update_profile(update)
        .await
        .context("Failed to update profile")?;

    if !ctx.json {
        output::success("Profile updated");
        println!();
    }
    print_user(ctx, &user)
}

async fn refresh(ctx: &Context) -> Result<()> {
    ctx.require_session().await?;
    ctx.client
        .refresh()
        .await
        .context("Failed to refresh session")?;
    if !ctx.json {
        output::success("Session refreshed");
    }
    Ok(())
}
