//! CLI administration tool for campus-gate.
//!
//! Mints and inspects session cookies for testing protected pages,
//! generates signing secrets, and validates the environment configuration.
//!
//! # Usage
//!
//! ```bash
//! # Mint an admin session cookie
//! cargo run --bin admin -- session mint --user u-1 --role admin
//!
//! # Inspect a cookie value
//! cargo run --bin admin -- session inspect "eyJzdWIiOi...c0ffee"
//!
//! # Generate a SESSION_SECRET
//! cargo run --bin admin -- secret generate
//!
//! # Validate configuration
//! cargo run --bin admin -- config check
//! ```
//!
//! # Environment Variables
//!
//! - `SESSION_SECRET` (required for `session` commands): HMAC signing key

use campus_gate::config;
use campus_gate::domain::entities::{Role, Session};
use campus_gate::infrastructure::session::SignedCookieSessions;

use anyhow::{Context, Result};
use chrono::{Duration, Utc};
use clap::{Parser, Subcommand};
use colored::*;
use dialoguer::{Confirm, Input, Select};

/// CLI tool for managing campus-gate.
#[derive(Parser)]
#[command(name = "admin")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

/// Top-level command groups.
#[derive(Subcommand)]
enum Commands {
    /// Mint and inspect session cookies
    Session {
        #[command(subcommand)]
        action: SessionAction,
    },

    /// Signing secret utilities
    Secret {
        #[command(subcommand)]
        action: SecretAction,
    },

    /// Configuration utilities
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// Session cookie subcommands.
#[derive(Subcommand)]
enum SessionAction {
    /// Mint a signed session cookie
    Mint {
        /// User identifier stored in the session
        #[arg(short, long)]
        user: Option<String>,

        /// Role: student, teacher or admin
        #[arg(short, long)]
        role: Option<Role>,

        /// Lifetime in hours
        #[arg(long, default_value_t = 8)]
        ttl_hours: i64,

        /// Skip confirmation prompt
        #[arg(short = 'y', long)]
        yes: bool,
    },

    /// Decode a session cookie and check its signature
    Inspect {
        /// Cookie value
        token: String,
    },
}

/// Secret subcommands.
#[derive(Subcommand)]
enum SecretAction {
    /// Generate a random signing secret
    Generate {
        /// Print only the secret
        #[arg(long)]
        raw: bool,
    },
}

/// Configuration subcommands.
#[derive(Subcommand)]
enum ConfigAction {
    /// Load and validate configuration from the environment
    Check,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    match cli.command {
        Commands::Session { action } => handle_session_action(action)?,
        Commands::Secret { action } => handle_secret_action(action),
        Commands::Config { action } => handle_config_action(action)?,
    }

    Ok(())
}

fn session_secret() -> Result<String> {
    std::env::var("SESSION_SECRET").context("SESSION_SECRET must be set")
}

/// Dispatches session commands.
fn handle_session_action(action: SessionAction) -> Result<()> {
    let sessions = SignedCookieSessions::new(session_secret()?);

    match action {
        SessionAction::Mint {
            user,
            role,
            ttl_hours,
            yes,
        } => mint_session(&sessions, user, role, ttl_hours, yes),
        SessionAction::Inspect { token } => {
            inspect_session(&sessions, &token);
            Ok(())
        }
    }
}

/// Mints a session cookie with interactive prompts.
///
/// # Flow
///
/// 1. Prompt for user id and role (or use provided)
/// 2. Display session details
/// 3. Confirm (unless `--yes` flag)
/// 4. Sign and print the cookie with a usage example
fn mint_session(
    sessions: &SignedCookieSessions,
    user: Option<String>,
    role: Option<Role>,
    ttl_hours: i64,
    skip_confirm: bool,
) -> Result<()> {
    println!("{}", "🔑 Mint Session Cookie".bright_blue().bold());
    println!();

    if ttl_hours <= 0 {
        anyhow::bail!("--ttl-hours must be positive, got {}", ttl_hours);
    }

    let user_id = match user {
        Some(u) => u,
        None => Input::new().with_prompt("User id").interact_text()?,
    };

    let role = match role {
        Some(r) => r,
        None => {
            let roles = [Role::Student, Role::Teacher, Role::Admin];
            let idx = Select::new()
                .with_prompt("Role")
                .items(&roles)
                .default(0)
                .interact()?;
            roles[idx]
        }
    };

    let expires_at = Utc::now() + Duration::hours(ttl_hours);
    let session = Session::new(user_id, role, expires_at);

    println!();
    println!("{}", "Session details:".bright_white().bold());
    println!("  User:    {}", session.user_id.cyan());
    println!("  Role:    {}", session.role.to_string().cyan());
    println!(
        "  Expires: {}",
        session.expires_at.format("%Y-%m-%d %H:%M UTC").to_string().cyan()
    );
    println!();

    if !skip_confirm {
        let confirmed = Confirm::new()
            .with_prompt("Mint this session?")
            .default(true)
            .interact()?;

        if !confirmed {
            println!("{}", "❌ Cancelled".red());
            return Ok(());
        }
    }

    let token = sessions
        .issue(&session)
        .map_err(|e| anyhow::anyhow!("Failed to sign session: {}", e))?;
    let cookie_name = std::env::var("SESSION_COOKIE").unwrap_or_else(|_| "campus_session".to_string());

    println!();
    println!("{}", "✅ Session minted".green().bold());
    println!();
    println!("  {}", token.bright_yellow());
    println!();
    println!("{}", "Example:".bright_white());
    println!(
        "  curl -H \"Cookie: {}={}\" http://localhost:3000/campus",
        cookie_name,
        token.bright_yellow()
    );
    println!();

    Ok(())
}

/// Prints a session cookie's claims and whether it verifies.
///
/// # Output Format
///
/// ```text
/// 🔍 Session Cookie
///
///   User:      u-1
///   Role:      admin
///   Expires:   2026-10-19 18:00 UTC
///   Signature: VALID
/// ```
fn inspect_session(sessions: &SignedCookieSessions, token: &str) {
    println!("{}", "🔍 Session Cookie".bright_blue().bold());
    println!();

    let Some(claims) = SignedCookieSessions::decode_unverified(token) else {
        println!("{}", "  Malformed cookie value".red());
        return;
    };

    let expires = chrono::DateTime::from_timestamp(claims.exp, 0)
        .map(|t| t.format("%Y-%m-%d %H:%M UTC").to_string())
        .unwrap_or_else(|| claims.exp.to_string());

    println!("  User:      {}", claims.sub.cyan());
    println!("  Role:      {}", claims.role.to_string().cyan());
    println!("  Expires:   {}", expires.cyan());

    let status = if sessions.verify(token).is_some() {
        "VALID".green().bold()
    } else if claims.exp <= Utc::now().timestamp() {
        "EXPIRED".yellow().bold()
    } else {
        "INVALID".red().bold()
    };
    println!("  Signature: {}", status);
    println!();
}

/// Dispatches secret commands.
fn handle_secret_action(action: SecretAction) {
    match action {
        SecretAction::Generate { raw } => {
            let secret = generate_secret();
            if raw {
                println!("{}", secret);
                return;
            }

            println!("{}", "✨ Generated new secret".green());
            println!();
            println!("  SESSION_SECRET={}", secret.bright_yellow());
            println!();
            println!(
                "{}",
                "⚠️  Rotating the secret signs out every active session.".yellow()
            );
        }
    }
}

/// Dispatches configuration commands.
fn handle_config_action(action: ConfigAction) -> Result<()> {
    match action {
        ConfigAction::Check => {
            println!("{}", "🔍 Checking configuration...".bright_blue());

            match config::load_from_env() {
                Ok(cfg) => {
                    println!("{}", "✅ Configuration valid".green().bold());
                    println!("  Listen:   {}", cfg.listen_addr.cyan());
                    println!(
                        "  Store:    {}",
                        if cfg.redis_url.is_some() { "redis" } else { "memory" }.cyan()
                    );
                    println!(
                        "  Login:    {} per {}s",
                        cfg.login_max_requests, cfg.login_window_secs
                    );
                    println!(
                        "  API:      {} per {}s",
                        cfg.api_max_requests, cfg.api_window_secs
                    );
                    println!("  Identity: {}", cfg.identity_source.to_string().cyan());
                }
                Err(e) => {
                    println!("{}", "❌ Configuration invalid".red().bold());
                    return Err(e);
                }
            }
        }
    }

    Ok(())
}

/// Generates a 64-character hex secret from 32 random bytes.
fn generate_secret() -> String {
    let bytes: [u8; 32] = rand::random();
    hex::encode(bytes)
}
