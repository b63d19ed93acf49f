use anyhow::{Context, Result};
use app::{init_logging, print_responder_report, record_session, CommonArgs};
use clap::Parser;
use metrics::{Role, SessionTimer};
use session::serve;
use tracing::info;
use transport::TransportListener;

#[derive(Parser, Debug)]
#[command(author, version, about = "Accept initiators one at a time and decrypt their messages", long_about = None)]
struct Args {
    /// Port to listen on
    port: u16,

    /// Address to bind
    #[arg(long, default_value = "0.0.0.0")]
    bind: String,

    /// Exit after this many sessions (default: run forever)
    #[arg(long)]
    max_sessions: Option<usize>,

    #[command(flatten)]
    common: CommonArgs,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    if args.common.print_config {
        println!("=== Configuration ===");
        println!("Role: responder");
        println!("Listen: {}:{}", args.bind, args.port);
        match args.max_sessions {
            Some(n) => println!("Max sessions: {n}"),
            None => println!("Max sessions: unlimited"),
        }
        args.common.print();
        return Ok(());
    }

    init_logging(args.common.log_level);
    let config = args.common.session_config()?;
    let recorder = args.common.recorder()?;

    let addr = format!("{}:{}", args.bind, args.port);
    let listener = TransportListener::bind(&addr, config.channel_config())
        .await
        .with_context(|| format!("binding {addr}"))?;
    info!("waiting for initiators");

    let served = serve(&listener, &config, args.max_sessions, |outcome| {
        let peer = outcome.peer.to_string();
        let timer = SessionTimer::from_elapsed(Role::Responder, peer, outcome.elapsed);
        let bytes = (outcome.bytes_tx, outcome.bytes_rx);
        match &outcome.result {
            Ok(report) => {
                print_responder_report(report);
                record_session(
                    recorder.as_ref(),
                    timer,
                    bytes,
                    Some(report.scheme.get()),
                    report.plaintext.chars().count(),
                    true,
                );
            }
            Err(_) => record_session(recorder.as_ref(), timer, bytes, None, 0, false),
        }
    })
    .await;

    info!(served, "responder done");
    Ok(())
}
