// Server session behaviour driven over a raw control connection.

#[cfg(test)]
mod tests {
    use crate::core_error::FtpError;
    use crate::core_network::control::ControlChannel;
    use crate::core_network::data_channel::DataListener;
    use crate::test_support::{logged_in, payload, raw_control, spawn_server};
    use std::net::Ipv4Addr;
    use std::time::Duration;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpStream;

    async fn assert_closed(control: &mut ControlChannel<TcpStream>) {
        let result = control.read_reply().await;
        assert!(
            matches!(result, Err(FtpError::PeerClosed) | Err(FtpError::Io(_))),
            "session still open: {:?}",
            result
        );
    }

    async fn port(control: &mut ControlChannel<TcpStream>) -> DataListener {
        let listener = DataListener::open(Ipv4Addr::LOCALHOST, None).await.unwrap();
        control
            .send_command("PORT", Some(&listener.endpoint().to_port_argument()))
            .await
            .unwrap();
        assert_eq!(control.read_reply().await.unwrap().code, 200);
        listener
    }

    #[tokio::test]
    async fn test_greeting_comes_first() {
        let server = spawn_server().await;
        let mut control = raw_control(server.addr).await;
        let greeting = control.read_reply().await.unwrap();
        assert_eq!(greeting.code, 220);
        assert_eq!(greeting.text, "srvFtp version 1.0");
    }

    #[tokio::test]
    async fn test_wrong_password_closes_session() {
        let server = spawn_server().await;
        let mut control = raw_control(server.addr).await;
        assert_eq!(control.read_reply().await.unwrap().code, 220);

        control.send_command("USER", Some("alice")).await.unwrap();
        let reply = control.read_reply().await.unwrap();
        assert_eq!(reply.code, 331);
        assert_eq!(reply.text, "Password required for alice");

        control.send_command("PASS", Some("wrongpass")).await.unwrap();
        assert_eq!(control.read_reply().await.unwrap().code, 530);

        let _ = control.send_command("QUIT", None).await;
        assert_closed(&mut control).await;
    }

    #[tokio::test]
    async fn test_login_then_quit() {
        let server = spawn_server().await;
        let mut control = logged_in(server.addr).await;

        control.send_command("QUIT", None).await.unwrap();
        let reply = control.read_reply().await.unwrap();
        assert_eq!(reply.code, 221);
        assert_closed(&mut control).await;
    }

    #[tokio::test]
    async fn test_out_of_order_login_is_refused() {
        let server = spawn_server().await;
        let mut control = raw_control(server.addr).await;
        assert_eq!(control.read_reply().await.unwrap().code, 220);

        control.send_command("PASS", Some("correctpass")).await.unwrap();
        assert_eq!(control.read_reply().await.unwrap().code, 530);
        assert_closed(&mut control).await;
    }

    #[tokio::test]
    async fn test_unrecognized_verb_keeps_session_open() {
        let server = spawn_server().await;
        let mut control = logged_in(server.addr).await;

        control.send_command("NOOP", None).await.unwrap();
        assert_eq!(control.read_reply().await.unwrap().code, 502);
        control.send_command("SITE", Some("help")).await.unwrap();
        assert_eq!(control.read_reply().await.unwrap().code, 502);

        control.send_command("QUIT", None).await.unwrap();
        assert_eq!(control.read_reply().await.unwrap().code, 221);
    }

    #[tokio::test]
    async fn test_retr_missing_file_opens_no_data_channel() {
        let server = spawn_server().await;
        let mut control = logged_in(server.addr).await;
        let listener = port(&mut control).await;

        control.send_command("RETR", Some("missing.txt")).await.unwrap();
        let reply = control.read_reply().await.unwrap();
        assert_eq!(reply.code, 550);
        assert_eq!(reply.text, "missing.txt: no such file or directory");

        let accepted = listener.accept(Duration::from_millis(300)).await;
        assert!(matches!(accepted, Err(FtpError::Timeout)));

        control.send_command("QUIT", None).await.unwrap();
        assert_eq!(control.read_reply().await.unwrap().code, 221);
    }

    #[tokio::test]
    async fn test_retr_streams_announced_length() {
        let server = spawn_server().await;
        let data = payload(1000);
        server.write_file("a.bin", &data);
        let mut control = logged_in(server.addr).await;
        let listener = port(&mut control).await;

        control.send_command("RETR", Some("a.bin")).await.unwrap();
        let reply = control.read_reply().await.unwrap();
        assert_eq!(reply.code, 299);
        assert_eq!(reply.text, "File a.bin size 1000 bytes");

        let mut stream = listener.accept(Duration::from_secs(5)).await.unwrap();
        let mut received = Vec::new();
        stream.read_to_end(&mut received).await.unwrap();
        assert_eq!(received, data);

        assert_eq!(control.read_reply().await.unwrap().code, 226);
    }

    #[tokio::test]
    async fn test_data_endpoint_serves_one_transfer() {
        let server = spawn_server().await;
        server.write_file("a.bin", b"abc");
        let mut control = logged_in(server.addr).await;
        let listener = port(&mut control).await;

        control.send_command("RETR", Some("a.bin")).await.unwrap();
        assert_eq!(control.read_reply().await.unwrap().code, 299);
        let mut stream = listener.accept(Duration::from_secs(5)).await.unwrap();
        let mut sink = Vec::new();
        stream.read_to_end(&mut sink).await.unwrap();
        assert_eq!(control.read_reply().await.unwrap().code, 226);

        control.send_command("RETR", Some("a.bin")).await.unwrap();
        assert_eq!(control.read_reply().await.unwrap().code, 425);

        control.send_command("QUIT", None).await.unwrap();
        assert_eq!(control.read_reply().await.unwrap().code, 221);
    }

    #[tokio::test]
    async fn test_stor_reads_exactly_declared_bytes() {
        let server = spawn_server().await;
        let data = payload(600);
        let mut control = logged_in(server.addr).await;
        let listener = port(&mut control).await;

        control.send_command("STOR", Some("up.bin//600")).await.unwrap();
        let reply = control.read_reply().await.unwrap();
        assert_eq!(reply.code, 150);
        assert_eq!(reply.text, "Opening BINARY mode data connection for up.bin (600 bytes)");

        let mut stream = listener.accept(Duration::from_secs(5)).await.unwrap();
        stream.write_all(&data).await.unwrap();
        stream.shutdown().await.unwrap();

        assert_eq!(control.read_reply().await.unwrap().code, 226);
        assert_eq!(server.read_file("up.bin"), data);
    }

    #[tokio::test]
    async fn test_short_upload_still_completes() {
        let server = spawn_server().await;
        let data = payload(100);
        let mut control = logged_in(server.addr).await;
        let listener = port(&mut control).await;

        control.send_command("STOR", Some("s.bin//600")).await.unwrap();
        assert_eq!(control.read_reply().await.unwrap().code, 150);

        let mut stream = listener.accept(Duration::from_secs(5)).await.unwrap();
        stream.write_all(&data).await.unwrap();
        drop(stream);

        assert_eq!(control.read_reply().await.unwrap().code, 226);
        assert_eq!(server.read_file("s.bin"), data);

        control.send_command("QUIT", None).await.unwrap();
        assert_eq!(control.read_reply().await.unwrap().code, 221);
    }

    #[tokio::test]
    async fn test_abandoned_download_still_completes() {
        let server = spawn_server().await;
        server.write_file("big.bin", &payload(4 * 1024 * 1024));
        let mut control = logged_in(server.addr).await;
        let listener = port(&mut control).await;

        control.send_command("RETR", Some("big.bin")).await.unwrap();
        assert_eq!(control.read_reply().await.unwrap().code, 299);

        let mut stream = listener.accept(Duration::from_secs(5)).await.unwrap();
        let mut head = [0u8; 16];
        stream.read_exact(&mut head).await.unwrap();
        drop(stream);

        assert_eq!(control.read_reply().await.unwrap().code, 226);

        control.send_command("QUIT", None).await.unwrap();
        assert_eq!(control.read_reply().await.unwrap().code, 221);
    }

    #[tokio::test]
    async fn test_malformed_port_ends_session() {
        let server = spawn_server().await;
        let mut control = logged_in(server.addr).await;

        control.send_command("PORT", Some("127,0,0,1,300")).await.unwrap();
        assert_eq!(control.read_reply().await.unwrap().code, 221);
        assert_closed(&mut control).await;
    }

    #[tokio::test]
    async fn test_malformed_stor_parameter_ends_session() {
        let server = spawn_server().await;
        let mut control = logged_in(server.addr).await;
        let _listener = port(&mut control).await;

        control.send_command("STOR", Some("nosize.bin")).await.unwrap();
        assert_eq!(control.read_reply().await.unwrap().code, 221);
        assert_closed(&mut control).await;
    }

    #[tokio::test]
    async fn test_short_verb_ends_session() {
        let server = spawn_server().await;
        let mut control = logged_in(server.addr).await;

        control.send_command("PWD", None).await.unwrap();
        assert_eq!(control.read_reply().await.unwrap().code, 221);
        assert_closed(&mut control).await;
    }

    #[tokio::test]
    async fn test_sessions_are_independent() {
        let server = spawn_server().await;
        let mut first = logged_in(server.addr).await;
        let mut second = raw_control(server.addr).await;
        assert_eq!(second.read_reply().await.unwrap().code, 220);

        // the second session failing login does not disturb the first
        second.send_command("USER", Some("mallory")).await.unwrap();
        assert_eq!(second.read_reply().await.unwrap().code, 331);
        second.send_command("PASS", Some("guess")).await.unwrap();
        assert_eq!(second.read_reply().await.unwrap().code, 530);

        first.send_command("QUIT", None).await.unwrap();
        assert_eq!(first.read_reply().await.unwrap().code, 221);
    }
}
