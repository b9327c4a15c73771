use anyhow::{Context, Result, anyhow};
use clap::{Parser, Subcommand};
use std::fs::OpenOptions;

use smart_mail::ai::{GroqChat, HuggingFaceSummarizer, ResponseSuggester};
use smart_mail::auth::{CredentialFile, CredentialProvider, GoogleOAuth, token_store};
use smart_mail::config::{Config, load_config, log_path, resolve_credential_path};
use smart_mail::domain::email::MessageId;
use smart_mail::mail::GmailClient;
use smart_mail::session::{SessionController, SessionState};
use smart_mail::terminal::{run_tui, ui::list_label};

type Controller = SessionController<GmailClient, HuggingFaceSummarizer, GroqChat>;

#[derive(Parser)]
#[command(name = "smart_mail")]
#[command(about = "Browse Gmail, summarize messages and draft replies", long_about = None)]
struct Cli {
    #[command(subcommand)]
    cmd: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Run the interactive inbox (default)
    Tui,

    /// Print the most recent messages
    List {
        #[arg(long)]
        max: Option<u32>,

        /// Case-insensitive filter on subject
        #[arg(long)]
        search: Option<String>,
    },

    /// Summarize one message from the recent listing
    Summarize {
        id: String,
        #[arg(long)]
        max: Option<u32>,
    },

    /// Suggest a reply to one message from the recent listing
    Reply {
        id: String,
        #[arg(long)]
        max: Option<u32>,
    },

    /// Store the OAuth client secret in keyring
    SetClientSecret {
        #[arg(long)]
        client_id: String,
    },

    /// Delete the stored credential so the next run asks for consent again
    Logout,
}

fn init_logging(to_file: bool) -> Result<()> {
    let mut builder =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn"));
    if to_file {
        // the TUI owns the terminal
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(log_path()?)?;
        builder.target(env_logger::Target::Pipe(Box::new(file)));
    }
    builder.init();
    Ok(())
}

/// Authenticate, build the adapters and list the inbox once.
fn connect(cfg: &Config, max: Option<u32>) -> Result<(Controller, SessionState)> {
    let flow = GoogleOAuth::new(
        cfg.client_id.clone(),
        token_store::resolve_client_secret(&cfg.client_id),
        cfg.redirect_uri.clone(),
    );
    let provider = CredentialProvider::new(flow, CredentialFile::new(resolve_credential_path(cfg)?));
    // consent happens here, before the TUI takes the terminal; later renewals are silent
    provider.obtain().context("authentication failed")?;

    let mail = GmailClient::new(provider)?;
    let summarizer = HuggingFaceSummarizer::from_env(&cfg.summarizer)?;
    let responder = ResponseSuggester::new(GroqChat::from_env(&cfg.generator)?);

    let ctl = SessionController::new(
        mail,
        summarizer,
        responder,
        max.unwrap_or(cfg.max_results),
    );
    let state = ctl.authenticate(&SessionState::new())?;
    Ok((ctl, state))
}

fn open_message(cfg: &Config, id: &str, max: Option<u32>) -> Result<(Controller, SessionState)> {
    let (mut ctl, state) = connect(cfg, max)?;
    let state = ctl.refresh(&state)?;
    let id = MessageId::new(id);
    let state = ctl.select(&state, &id).map_err(|e| {
        anyhow!("cannot open {id}: {e} (only the {} most recent messages are listed; try --max)", ctl.messages().len())
    })?;
    Ok((ctl, state))
}

fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    let cmd = cli.cmd.unwrap_or(Command::Tui);
    init_logging(matches!(cmd, Command::Tui))?;

    match cmd {
        Command::SetClientSecret { client_id } => {
            eprintln!("Paste client secret (end with Ctrl-D):");
            let mut secret = String::new();
            std::io::Read::read_to_string(&mut std::io::stdin(), &mut secret)?;
            let secret = secret.trim();
            token_store::save_client_secret(&client_id, secret)?;
            println!("Saved client secret for client_id {}", client_id);
            Ok(())
        }

        Command::Logout => {
            let cfg = load_config().map_err(|e| anyhow!("Configuration error: {e}"))?;
            let file = CredentialFile::new(resolve_credential_path(&cfg)?);
            if file.remove()? {
                println!("Removed {}", file.path().display());
            } else {
                println!("No stored credential at {}", file.path().display());
            }
            Ok(())
        }

        Command::Tui => {
            let cfg = load_config().map_err(|e| anyhow!("Configuration error: {e}"))?;
            let (mut ctl, state) = connect(&cfg, None)?;
            let end = run_tui(&mut ctl, state)?;
            if !end.authenticated {
                println!("Signed out of this session.");
            }
            Ok(())
        }

        Command::List { max, search } => {
            let cfg = load_config().map_err(|e| anyhow!("Configuration error: {e}"))?;
            let (mut ctl, state) = connect(&cfg, max)?;
            let state = ctl.refresh(&state)?;
            let state = ctl.search(&state, search.as_deref().unwrap_or(""))?;
            for (i, m) in ctl.visible(&state).into_iter().enumerate() {
                println!("{}  [{}]  {}", list_label(i, m), m.id, m.date);
                if !m.snippet.is_empty() {
                    println!("    {}", m.snippet);
                }
            }
            Ok(())
        }

        Command::Summarize { id, max } => {
            let cfg = load_config().map_err(|e| anyhow!("Configuration error: {e}"))?;
            let (ctl, state) = open_message(&cfg, &id, max)?;
            println!("{}", ctl.summarize(&state)?);
            Ok(())
        }

        Command::Reply { id, max } => {
            let cfg = load_config().map_err(|e| anyhow!("Configuration error: {e}"))?;
            let (ctl, state) = open_message(&cfg, &id, max)?;
            println!("{}", ctl.generate_response(&state)?.text);
            Ok(())
        }
    }
}
