//! fahrplan-client — companion CLI for the scheduling endpoint.
//!
//! Constructs request payloads and renders replies. No scheduling logic
//! lives here; the server decides every timestamp.
//!
//! # Usage
//!
//! ```bash
//! # Check that the service is alive
//! fahrplan-client health
//!
//! # Schedule a meeting
//! fahrplan-client create "Team Standup" --type meeting --duration 0.5
//!
//! # Walk through one event of each type
//! fahrplan-client demo
//! ```

use std::time::Duration;

use clap::{Parser, Subcommand};
use fahrplan_core::{EventRequest, EventResponse};
use fahrplan_service::channel::{RequestChannel, ZmqRequestClient};
use fahrplan_service::transport::Transport;

/// Companion client for the fahrplan scheduling endpoint.
#[derive(Parser, Debug)]
#[command(name = "fahrplan-client", version, about)]
struct Cli {
    /// Server host.
    #[arg(long, env = "FAHRPLAN_HOST", default_value = "127.0.0.1")]
    host: String,

    /// Server port.
    #[arg(long, env = "FAHRPLAN_PORT", default_value_t = 5555)]
    port: u16,

    /// Seconds to wait for each reply.
    #[arg(long, default_value_t = 10)]
    timeout: u64,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Create an event and print the scheduled slot.
    Create {
        /// Event name.
        name: String,

        /// Event type: meeting, deadline, reminder, appointment, general.
        #[arg(long = "type")]
        event_type: Option<String>,

        /// Duration in hours.
        #[arg(long)]
        duration: Option<f64>,
    },

    /// Check that the service is alive.
    Health,

    /// Health check plus one event of each type, with a summary.
    Demo,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .init();

    let cli = Cli::parse();
    let transport = Transport::tcp(&cli.host, cli.port);
    let timeout = Duration::from_secs(cli.timeout);

    let client = ZmqRequestClient::connect(&transport).await?;

    match cli.command {
        Command::Create {
            name,
            event_type,
            duration,
        } => {
            let request = EventRequest::create(name, event_type, duration);
            print_response(&send(&client, &request, timeout).await?);
        }
        Command::Health => {
            print_response(&send(&client, &EventRequest::health_check(), timeout).await?);
        }
        Command::Demo => run_demo(&client, timeout).await?,
    }

    Ok(())
}

/// Encode the request, round-trip it, decode the reply.
async fn send(
    client: &ZmqRequestClient,
    request: &EventRequest,
    timeout: Duration,
) -> anyhow::Result<EventResponse> {
    let payload = serde_json::to_string(request)?;
    let reply = client.request(payload, timeout).await?;
    Ok(serde_json::from_str(&reply)?)
}

fn print_response(response: &EventResponse) {
    match response {
        EventResponse::Success {
            event_id,
            event_name,
            event_type,
            formatted_time,
            formatted_end_time,
            duration_hours,
            ..
        } => {
            println!("{event_name} ({event_type})");
            println!("  id:    {event_id}");
            println!("  start: {formatted_time}");
            println!("  end:   {formatted_end_time}");
            println!("  hours: {duration_hours}");
        }
        EventResponse::Error { message } => {
            println!("error: {message}");
        }
        EventResponse::Healthy {
            service,
            events_created,
            ..
        } => {
            println!("{service} is healthy ({events_created} events created)");
        }
    }
}

/// One request of each kind against a live server, then a summary count.
async fn run_demo(client: &ZmqRequestClient, timeout: Duration) -> anyhow::Result<()> {
    println!("health check:");
    print_response(&send(client, &EventRequest::health_check(), timeout).await?);

    let samples: &[(&str, Option<&str>, Option<f64>)] = &[
        ("Team Standup Meeting", Some("meeting"), Some(0.5)),
        ("Project Submission", Some("deadline"), Some(2.0)),
        ("Call Client", Some("reminder"), Some(0.25)),
        ("Doctor's Appointment", Some("appointment"), Some(1.5)),
        ("Grocery Run", None, None),
    ];

    for &(name, event_type, duration) in samples {
        let request = EventRequest::create(name, event_type.map(String::from), duration);
        println!();
        print_response(&send(client, &request, timeout).await?);
    }

    println!();
    println!("final health check:");
    print_response(&send(client, &EventRequest::health_check(), timeout).await?);

    Ok(())
}
