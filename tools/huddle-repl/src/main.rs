use std::time::Duration;

use clap::Parser;
use huddle::{
    config::Config,
    notification::{Notification, Severity},
    platform::Platform,
    screen::Screen,
    session::{OfflineReason, SessionFault},
};
use huddle_loopback::{LoopbackFactory, LoopbackRemote};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[clap(version, about, long_about = None)]
/// drives the huddle call screen against a loopback session
struct Args {
    /// application identifier. falls back to HUDDLE_APP_ID
    #[clap(long)]
    app_id: Option<String>,
    /// channel to join. falls back to HUDDLE_CHANNEL_NAME
    #[clap(long)]
    channel: Option<String>,
    /// access token. falls back to HUDDLE_APP_TOKEN
    #[clap(long)]
    token: Option<String>,
}

/// test the huddle screen via command line
#[derive(Parser, Debug, Eq, PartialEq)]
enum Repl {
    /// join the configured channel
    StartCall,
    /// leave the channel and clear the roster
    EndCall,
    /// simulate a remote participant joining
    Join { uid: u32 },
    /// simulate a remote participant leaving
    Offline { uid: u32, reason: Option<u32> },
    /// simulate a warning from the session
    Warn { code: i32, message: Option<String> },
    /// simulate an error from the session
    Error { code: i32, message: Option<String> },
    /// show a notification of your own
    Notify {
        header: String,
        body: String,
        /// stay on-screen until dismissed
        #[clap(long)]
        persistent: bool,
        /// show as an error instead of a warning
        #[clap(long)]
        error: bool,
    },
    /// hide the banner
    Dismiss,
    /// clear a rendering fault
    TryAgain,
    /// make the remote surface of a participant fail to render
    BreakSurface { uid: u32 },
    /// make the remote surface of a participant render again
    FixSurface { uid: u32 },
    /// reject the next leave requests
    RejectLeave { reject: bool },
    /// print the screen as json
    Render,
    /// print the peer roster
    Roster,
    /// wait for pending animations
    Wait { millis: u64 },
}

async fn handle_command(screen: &Screen, remote: &LoopbackRemote, cmd: Repl) -> anyhow::Result<()> {
    match cmd {
        Repl::StartCall => screen.start_call().await?,
        Repl::EndCall => screen.end_call().await?,
        Repl::Join { uid } => {
            remote.user_joined(uid);
        }
        Repl::Offline { uid, reason } => {
            remote.user_offline(uid, reason.map(OfflineReason::from).unwrap_or(OfflineReason::Quit));
        }
        Repl::Warn { code, message } => {
            remote.warning(fault(code, message));
        }
        Repl::Error { code, message } => {
            remote.error(fault(code, message));
        }
        Repl::Notify {
            header,
            body,
            persistent,
            error,
        } => {
            let severity = match error {
                true => Severity::Error,
                false => Severity::Warning,
            };
            screen.notify(Notification::new(header, body, severity).persistent(persistent))?;
        }
        Repl::Dismiss => screen.dismiss()?,
        Repl::TryAgain => screen.try_again()?,
        Repl::BreakSurface { uid } => remote.fail_remote_surface(uid, true),
        Repl::FixSurface { uid } => remote.fail_remote_surface(uid, false),
        Repl::RejectLeave { reject } => remote.fail_leave(reject),
        Repl::Render => {
            let view = screen.render().await?;
            println!("{}", serde_json::to_string_pretty(&view)?);
        }
        Repl::Roster => {
            let roster = screen.roster().await?;
            println!("joined: {}", roster.joined());
            println!("peers: {:?}", roster.peers());
        }
        Repl::Wait { millis } => tokio::time::sleep(Duration::from_millis(millis)).await,
    }
    Ok(())
}

fn fault(code: i32, message: Option<String>) -> SessionFault {
    match message {
        Some(message) => SessionFault::with_message(code, message),
        None => SessionFault::new(code),
    }
}

fn load_config(args: Args) -> anyhow::Result<Config> {
    let config = Config::from_lookup(|key| {
        let arg = match key {
            huddle::config::APP_ID_VAR => args.app_id.clone(),
            huddle::config::CHANNEL_NAME_VAR => args.channel.clone(),
            huddle::config::APP_TOKEN_VAR => args.token.clone(),
            _ => None,
        };
        arg.or_else(|| std::env::var(key).ok())
    })?;
    Ok(config)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let args = Args::parse();
    let config = load_config(args)?;
    let channel = config.channel_name().to_string();

    let factory = LoopbackFactory::new();
    let remote = factory.remote();
    let screen = Screen::builder()
        .set_config(config)
        .set_session_factory(factory)
        .finalize()?;

    println!("starting REPL on {} for channel {channel}", Platform::current());
    println!("enter --help to see available commands");

    // stdin is read on a blocking thread so the screen loop keeps running
    let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel();
    std::thread::spawn(move || {
        let mut iter = std::io::stdin().lines();
        while let Some(Ok(line)) = iter.next() {
            if tx.send(line).is_err() {
                break;
            }
        }
    });

    while let Some(line) = rx.recv().await {
        let mut v = vec![""];
        v.extend(line.split_ascii_whitespace());
        let cli = match Repl::try_parse_from(v) {
            Ok(r) => r,
            Err(e) => {
                println!("{e}");
                continue;
            }
        };
        if let Err(e) = handle_command(&screen, &remote, cli).await {
            println!("command failed: {e}");
        }
    }

    Ok(())
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn notify_parses_severity_flags() -> anyhow::Result<()> {
        let cmd = Repl::try_parse_from(["", "notify", "Heads", "up", "--error", "--persistent"])?;
        assert_eq!(
            cmd,
            Repl::Notify {
                header: "Heads".into(),
                body: "up".into(),
                persistent: true,
                error: true,
            }
        );

        let cmd = Repl::try_parse_from(["", "notify", "Heads", "up"])?;
        assert!(matches!(cmd, Repl::Notify { error: false, persistent: false, .. }));
        Ok(())
    }
}
