use anyhow::{Context, Result};
use app::{
    close_channel, init_logging, print_initiator_report, record_session, CommonArgs,
    PromptedInput,
};
use clap::Parser;
use metrics::{Role, SessionTimer};
use session::run_initiator;
use tokio::io::BufReader;
use tracing::info;

#[derive(Parser, Debug)]
#[command(author, version, about = "Agree on a key with a responder and send it one enciphered line", long_about = None)]
struct Args {
    /// Responder address
    address: String,

    /// Responder port
    port: u16,

    /// Send this text instead of reading a line from stdin
    #[arg(long)]
    message: Option<String>,

    #[command(flatten)]
    common: CommonArgs,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    if args.common.print_config {
        println!("=== Configuration ===");
        println!("Role: initiator");
        println!("Responder: {}:{}", args.address, args.port);
        args.common.print();
        return Ok(());
    }

    init_logging(args.common.log_level);
    let config = args.common.session_config()?;
    let recorder = args.common.recorder()?;

    let peer = format!("{}:{}", args.address, args.port);
    let timer = SessionTimer::start(Role::Initiator, peer.as_str());

    let mut channel =
        match transport::connect(&args.address, args.port, config.channel_config()).await {
            Ok(ch) => ch,
            Err(e) => {
                record_session(recorder.as_ref(), timer, (0, 0), None, 0, false);
                return Err(e).with_context(|| format!("connecting to {peer}"));
            }
        };

    let result = match &args.message {
        Some(text) => run_initiator(&mut channel, text.as_bytes(), &config).await,
        None => {
            let input =
                PromptedInput::stdout(BufReader::new(tokio::io::stdin()), "Enter the message to send:");
            run_initiator(&mut channel, input, &config).await
        }
    };
    close_channel(&mut channel, &peer).await;

    let bytes = (channel.bytes_sent(), channel.bytes_received());
    match result {
        Ok(report) => {
            record_session(
                recorder.as_ref(),
                timer,
                bytes,
                Some(report.scheme.get()),
                report.plaintext.chars().count(),
                true,
            );
            print_initiator_report(&report);
            info!("session complete");
            Ok(())
        }
        Err(e) => {
            record_session(recorder.as_ref(), timer, bytes, None, 0, false);
            Err(e).context("session failed")
        }
    }
}
