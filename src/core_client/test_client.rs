// Client against a live loopback server: downloads, uploads, operator loop.

#[cfg(test)]
mod tests {
    use crate::config::ClientConfig;
    use crate::core_client::operate::{operate, run_interactive};
    use crate::core_client::FtpClient;
    use crate::core_error::FtpError;
    use crate::core_network::control::ControlChannel;
    use crate::core_network::port::DataChannelEndpoint;
    use crate::test_support::{payload, spawn_server, TestServer};
    use std::net::Ipv4Addr;
    use tempfile::TempDir;
    use tokio::io::{duplex, AsyncWriteExt, DuplexStream};
    use tokio::net::TcpStream;

    const BLOCK: usize = 512;

    async fn client(server: &TestServer) -> (FtpClient<TcpStream>, TempDir) {
        let downloads = tempfile::tempdir().unwrap();
        let config = ClientConfig {
            download_dir: downloads.path().to_path_buf(),
            buffer_size: BLOCK,
            data_timeout_secs: 5,
        };
        let client = FtpClient::connect(server.control_addr(), config).await.unwrap();
        (client, downloads)
    }

    async fn logged_in_client(server: &TestServer) -> (FtpClient<TcpStream>, TempDir) {
        let (mut client, downloads) = client(server).await;
        client.expect_greeting().await.unwrap();
        client.login("alice", "correctpass").await.unwrap();
        (client, downloads)
    }

    /// A client whose control channel is driven by hand from the test.
    fn scripted_client() -> (FtpClient<DuplexStream>, ControlChannel<DuplexStream>, TempDir) {
        let downloads = tempfile::tempdir().unwrap();
        let config = ClientConfig {
            download_dir: downloads.path().to_path_buf(),
            buffer_size: BLOCK,
            data_timeout_secs: 1,
        };
        let (client_end, server_end) = duplex(4096);
        let client = FtpClient::new(client_end, Ipv4Addr::LOCALHOST, config);
        (client, ControlChannel::new(server_end), downloads)
    }

    async fn expect_verb(peer: &mut ControlChannel<DuplexStream>, verb: &str) -> String {
        let command = peer.read_request().await.unwrap();
        assert_eq!(command.verb, verb);
        command.parameter_or_empty()
    }

    async fn finish_with_quit(peer: &mut ControlChannel<DuplexStream>) {
        expect_verb(peer, "QUIT").await;
        peer.send_reply(221, "Goodbye").await.unwrap();
    }

    #[tokio::test]
    async fn test_download_sizes_around_block_boundary() {
        let server = spawn_server().await;
        let (mut client, downloads) = logged_in_client(&server).await;

        for size in [0, 1, BLOCK - 1, BLOCK, BLOCK + 1] {
            let name = format!("file_{}.bin", size);
            let data = payload(size);
            server.write_file(&name, &data);

            let outcome = client.get(&name).await.unwrap().expect("server refused RETR");
            assert!(outcome.is_complete(), "size {}", size);
            assert_eq!(outcome.transferred, size as u64);
            assert_eq!(std::fs::read(downloads.path().join(&name)).unwrap(), data);
        }

        client.quit().await.unwrap();
    }

    #[tokio::test]
    async fn test_upload_sizes_around_block_boundary() {
        let server = spawn_server().await;
        let (mut client, _downloads) = logged_in_client(&server).await;
        let local = tempfile::tempdir().unwrap();

        for size in [0, 1, BLOCK - 1, BLOCK, BLOCK + 1] {
            let name = format!("up_{}.bin", size);
            let data = payload(size);
            let path = local.path().join(&name);
            std::fs::write(&path, &data).unwrap();

            let outcome = client.put(&path).await.unwrap().expect("server refused STOR");
            assert!(outcome.is_complete(), "size {}", size);
            assert_eq!(server.read_file(&name), data);
        }

        client.quit().await.unwrap();
    }

    #[tokio::test]
    async fn test_sequential_transfers_use_fresh_ports() {
        let server = spawn_server().await;
        server.write_file("one.txt", b"first");
        server.write_file("two.txt", b"second");
        let (mut client, downloads) = logged_in_client(&server).await;

        client.get("one.txt").await.unwrap().unwrap();
        let first_port = client.last_data_port().unwrap();
        client.get("two.txt").await.unwrap().unwrap();
        let second_port = client.last_data_port().unwrap();

        assert_ne!(first_port, second_port);
        assert_eq!(std::fs::read(downloads.path().join("one.txt")).unwrap(), b"first");
        assert_eq!(std::fs::read(downloads.path().join("two.txt")).unwrap(), b"second");
    }

    #[tokio::test]
    async fn test_missing_remote_file_is_not_fatal() {
        let server = spawn_server().await;
        server.write_file("present.txt", b"here");
        let (mut client, downloads) = logged_in_client(&server).await;

        assert!(client.get("absent.txt").await.unwrap().is_none());
        assert!(!downloads.path().join("absent.txt").exists());

        assert!(client.get("present.txt").await.unwrap().is_some());
        client.quit().await.unwrap();
    }

    #[tokio::test]
    async fn test_put_missing_local_file_sends_nothing() {
        let server = spawn_server().await;
        let (mut client, _downloads) = logged_in_client(&server).await;
        let local = tempfile::tempdir().unwrap();

        assert!(client.put(&local.path().join("nope.bin")).await.unwrap().is_none());
        assert_eq!(client.last_data_port(), None);
        client.quit().await.unwrap();
    }

    #[tokio::test]
    async fn test_bad_login_is_reported() {
        let server = spawn_server().await;
        let (mut client, _downloads) = client(&server).await;
        client.expect_greeting().await.unwrap();

        let err = client.login("alice", "wrongpass").await.unwrap_err();
        assert!(matches!(
            err,
            FtpError::UnexpectedReply {
                expected: 230,
                received: 530,
                ..
            }
        ));
    }

    #[tokio::test]
    async fn test_interactive_session() {
        let server = spawn_server().await;
        server.write_file("hello.txt", b"hello, world\n");
        let (mut client, downloads) = client(&server).await;

        let mut input: &[u8] = b"alice\ncorrectpass\nget hello.txt\nls\n\nget\nquit\n";
        run_interactive(&mut client, &mut input).await.unwrap();

        assert_eq!(
            std::fs::read(downloads.path().join("hello.txt")).unwrap(),
            b"hello, world\n"
        );
    }

    #[tokio::test]
    async fn test_end_of_input_quits() {
        let server = spawn_server().await;
        let (mut client, _downloads) = logged_in_client(&server).await;

        let mut input: &[u8] = b"";
        operate(&mut client, &mut input).await.unwrap();
    }

    #[tokio::test]
    async fn test_refused_port_aborts_only_the_transfer() {
        let (mut client, mut peer, _downloads) = scripted_client();
        let script = tokio::spawn(async move {
            expect_verb(&mut peer, "PORT").await;
            peer.send_reply(500, "PORT not understood").await.unwrap();
            finish_with_quit(&mut peer).await;
        });

        assert!(client.get("a.bin").await.unwrap().is_none());
        client.quit().await.unwrap();
        script.await.unwrap();
    }

    #[tokio::test]
    async fn test_unreadable_size_is_drained_and_skipped() {
        let (mut client, mut peer, downloads) = scripted_client();
        let script = tokio::spawn(async move {
            let argument = expect_verb(&mut peer, "PORT").await;
            let endpoint = DataChannelEndpoint::parse_port_argument(&argument).unwrap();
            peer.send_reply(200, "PORT command successful").await.unwrap();
            expect_verb(&mut peer, "RETR").await;

            let mut data = TcpStream::connect(endpoint.socket_addr()).await.unwrap();
            peer.send_reply(299, "File a.bin size unknown").await.unwrap();
            data.write_all(b"mystery bytes").await.unwrap();
            drop(data);
            peer.send_reply(226, "Transfer complete").await.unwrap();
            finish_with_quit(&mut peer).await;
        });

        assert!(client.get("a.bin").await.unwrap().is_none());
        assert!(!downloads.path().join("a.bin").exists());
        client.quit().await.unwrap();
        script.await.unwrap();
    }

    #[tokio::test]
    async fn test_missing_data_connection_aborts_only_the_transfer() {
        let (mut client, mut peer, _downloads) = scripted_client();
        let script = tokio::spawn(async move {
            expect_verb(&mut peer, "PORT").await;
            peer.send_reply(200, "PORT command successful").await.unwrap();
            expect_verb(&mut peer, "RETR").await;
            // announces a transfer but never connects
            peer.send_reply(299, "File a.bin size 5 bytes").await.unwrap();
            peer.send_reply(226, "Transfer complete").await.unwrap();
            finish_with_quit(&mut peer).await;
        });

        assert!(client.get("a.bin").await.unwrap().is_none());
        client.quit().await.unwrap();
        script.await.unwrap();
    }
}
