use std::time::Duration;

use crypto::CryptoError;
use session::{run_initiator, serve, SessionConfig, SessionError, SessionOutcome};
use tokio::io::{AsyncReadExt, AsyncWriteExt, BufReader};
use tokio::net::{TcpListener, TcpStream};
use transport::{connect, TransportError, TransportListener};

fn test_config() -> SessionConfig {
    SessionConfig {
        read_timeout: Duration::from_millis(300),
        ..SessionConfig::default()
    }
}

async fn drain(mut stream: TcpStream) {
    let mut sink = Vec::new();
    let _ = stream.read_to_end(&mut sink).await;
}

#[tokio::test]
async fn loop_survives_failed_sessions() {
    let cfg = test_config();
    let listener = TransportListener::bind("127.0.0.1:0", cfg.channel_config())
        .await
        .unwrap();
    let port = listener.local_addr().unwrap().port();

    let clients = tokio::spawn(async move {
        let addr = format!("127.0.0.1:{port}");

        // garbage share
        let mut s = TcpStream::connect(&addr).await.unwrap();
        s.write_all(b"xyz \\EOF\n").await.unwrap();
        drain(s).await;

        // hangs up straight away
        let s = TcpStream::connect(&addr).await.unwrap();
        drop(s);

        // connects and says nothing
        let s = TcpStream::connect(&addr).await.unwrap();
        drain(s).await;

        // a real initiator
        let mut ch = connect("127.0.0.1", port, test_config().channel_config()).await.unwrap();
        run_initiator(&mut ch, &b"STILL SERVING.\n"[..], &test_config())
            .await
            .unwrap()
    });

    let mut outcomes: Vec<SessionOutcome> = Vec::new();
    let served = serve(&listener, &cfg, Some(4), |o| outcomes.push(o)).await;
    let sent = clients.await.unwrap();

    assert_eq!(served, 4);
    assert_eq!(outcomes.len(), 4);

    assert!(matches!(
        outcomes[0].result,
        Err(SessionError::Crypto(CryptoError::MalformedShare(_)))
    ));
    assert_eq!(outcomes[0].bytes_tx, 0);
    assert!(matches!(
        outcomes[1].result,
        Err(SessionError::ConnectionFailure(TransportError::ConnectionClosed))
    ));
    assert!(matches!(
        outcomes[2].result,
        Err(SessionError::ConnectionFailure(TransportError::Timeout(_)))
    ));

    let report = outcomes[3].result.as_ref().unwrap();
    assert_eq!(report.plaintext, "STILL SERVING.  ");
    assert_eq!(report.secret, sent.secret);
    assert_eq!(report.ciphertext, sent.ciphertext);
    assert!(outcomes[3].bytes_rx > 0 && outcomes[3].bytes_tx > 0);
}

#[tokio::test]
async fn initiator_reports_responder_that_hung_up() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();

    // answers the share, then leaves before any message is typed
    let peer = tokio::spawn(async move {
        let (mut s, _) = listener.accept().await.unwrap();
        let mut share = Vec::new();
        while !share.ends_with(b"EOF\n") {
            let mut buf = [0u8; 64];
            let n = s.read(&mut buf).await.unwrap();
            assert!(n > 0);
            share.extend_from_slice(&buf[..n]);
        }
        s.write_all(b"6 \\EOF\n").await.unwrap();
        drop(s);
    });

    let (mut keys, screen) = tokio::io::duplex(64);
    let typist = tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(300)).await;
        keys.write_all(b"TOO LATE.\n").await.unwrap();
        keys
    });

    let cfg = test_config();
    let mut ch = connect("127.0.0.1", port, cfg.channel_config()).await.unwrap();
    let sent = run_initiator(&mut ch, BufReader::new(screen), &cfg).await;
    peer.await.unwrap();
    let _keys = typist.await.unwrap();

    assert!(matches!(
        sent,
        Err(SessionError::ConnectionFailure(TransportError::ConnectionClosed))
    ));
}
