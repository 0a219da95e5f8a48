//! Entry point and event loops of the peer console application.
use std::io::Write as _;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::Context;
use bittrickle_configuration::SessionPolicy;
use bittrickle_primitives::endpoint::TransferEndpoint;
use bittrickle_primitives::username::Username;
use clap::Parser;
use tokio::io::{AsyncBufReadExt, BufReader, Lines, Stdin};
use tokio::sync::watch;
use tokio::time;

use super::control::ControlClient;
use crate::peers::transfer;
use crate::peers::transfer::server::TransferServer;

/// The BitTrickle peer console.
#[derive(Parser, Debug)]
#[command(name = "bittrickle-peer", version, about = "BitTrickle peer console")]
pub struct Args {
    /// UDP port of the tracker on localhost.
    pub tracker_port: u16,
}

const COMMANDS_PROMPT: &str = "Available commands are: get, lap, lpf, pub, sch, unp, xit";

/// Runs the peer console application until the user exits.
///
/// # Errors
///
/// Will return an error if the tracker is unreachable, the transfer listener
/// can't be opened, or the console streams fail.
pub async fn run() -> anyhow::Result<()> {
    run_with_args(Args::parse()).await
}

/// Same as [`run`], for a pre-parsed argument set.
///
/// # Errors
///
/// Will return an error if the tracker is unreachable, the transfer listener
/// can't be opened, or the console streams fail.
pub async fn run_with_args(args: Args) -> anyhow::Result<()> {
    let tracker_addr = SocketAddr::new(IpAddr::V4(Ipv4Addr::LOCALHOST), args.tracker_port);

    let client = ControlClient::connect(tracker_addr)
        .await
        .context("unable to reach the tracker")?;

    // The transfer listener must exist before `auth`: its port travels in
    // the authentication request.
    let transfer_server = TransferServer::bind().await.context("unable to open the transfer listener")?;
    let transfer_port = transfer_server
        .local_addr()
        .context("unable to read the transfer listener address")?
        .port();

    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    let Some(username) = authenticate(&client, &mut lines, transfer_port).await? else {
        return Ok(()); // console closed before authenticating
    };

    println!("Welcome to BitTrickle!");

    let shared_dir = PathBuf::from(username.as_str());
    tokio::fs::create_dir_all(&shared_dir)
        .await
        .context("unable to create the shared directory")?;

    let (running_tx, running_rx) = watch::channel(true);

    drop(tokio::task::spawn(transfer_server.run(shared_dir.clone())));
    drop(tokio::task::spawn(send_heartbeats(
        client.clone(),
        username,
        SessionPolicy::default().interval(),
        running_rx,
    )));

    command_loop(&client, &shared_dir, &running_tx, &mut lines).await
}

/// The authentication loop: it prompts for credentials until the tracker
/// accepts them. Returns `None` when the console closes first.
async fn authenticate(
    client: &ControlClient,
    lines: &mut Lines<BufReader<Stdin>>,
    transfer_port: u16,
) -> anyhow::Result<Option<Username>> {
    loop {
        let Some(username) = prompt(lines, "Enter username: ").await? else {
            return Ok(None);
        };
        let Some(password) = prompt(lines, "Enter password: ").await? else {
            return Ok(None);
        };

        let Ok(username) = username.parse::<Username>() else {
            println!("Invalid credentials. Please try again.");
            continue;
        };
        if password.is_empty() || password.contains(char::is_whitespace) {
            println!("Invalid credentials. Please try again.");
            continue;
        }

        let response = client
            .send_command(&format!("auth {username} {password} {transfer_port}"))
            .await
            .context("unable to send the authentication request")?;

        if response == "Authentication Success" {
            return Ok(Some(username));
        }

        println!("{response}");
        println!("Authentication failed. Please try again.");
    }
}

/// The heartbeat sender: one liveness signal per interval until the running
/// flag drops or the socket closes.
async fn send_heartbeats(client: ControlClient, username: Username, interval: Duration, mut running: watch::Receiver<bool>) {
    let mut ticker = time::interval(interval);

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                if client.send_heartbeat(&username).await.is_err() {
                    break;
                }
            }
            changed = running.changed() => {
                if changed.is_err() || !*running.borrow() {
                    break;
                }
            }
        }
    }
}

/// The command loop: strict request/response, one command at a time. `xit`
/// flips the running flag so the heartbeat sender winds down too.
async fn command_loop(
    client: &ControlClient,
    shared_dir: &Path,
    running: &watch::Sender<bool>,
    lines: &mut Lines<BufReader<Stdin>>,
) -> anyhow::Result<()> {
    loop {
        println!("{COMMANDS_PROMPT}");

        let Some(line) = prompt(lines, "> ").await? else {
            // console closed: disconnect as if the user had typed `xit`
            drop(client.send_command("xit").await);
            drop(running.send(false));
            return Ok(());
        };

        let command = line.as_str();
        if command.is_empty() {
            continue;
        }

        let response = client
            .send_command(command)
            .await
            .context("unable to reach the tracker")?;

        if let Some(filename) = command.strip_prefix("get ") {
            handle_get_response(&response, filename.trim(), shared_dir).await;
        } else {
            println!("{response}");
        }

        if command == "xit" {
            drop(running.send(false));
            return Ok(());
        }
    }
}

/// It reacts to the tracker's reply to a `get`: either an endpoint to
/// download from, or a failure text to print.
async fn handle_get_response(response: &str, filename: &str, shared_dir: &Path) {
    if response == "File not found" {
        println!("{response}");
        return;
    }

    let Ok(endpoint) = response.parse::<TransferEndpoint>() else {
        println!("{response}");
        return;
    };

    match transfer::client::download(&endpoint, filename, shared_dir).await {
        Ok(_) => println!("{filename} downloaded successfully."),
        Err(e) => println!("Download failed: {e}"),
    }
}

/// It prints a prompt and reads one trimmed line. Returns `None` on EOF.
async fn prompt(lines: &mut Lines<BufReader<Stdin>>, text: &str) -> anyhow::Result<Option<String>> {
    print!("{text}");
    std::io::stdout().flush().context("unable to flush the console")?;

    let line = lines.next_line().await.context("unable to read the console")?;

    Ok(line.map(|line| line.trim().to_owned()))
}
