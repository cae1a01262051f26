mod common;

use std::fs;

use tftpd::packet::{Block, ErrorCode, Packet};
use tftpd::{Summary, TransferError};

use common::{serve_n, start_server, Client, MAX_ATTEMPTS};

#[test]
fn test_get_report_txt() {
    let serve_dir = tempfile::tempdir().unwrap();
    let exemplar = common::random_bytes(1000);
    fs::write(serve_dir.path().join("report.txt"), &exemplar).unwrap();

    let (addr, server) = start_server(serve_dir.path(), serve_dir.path());
    let server_thread = serve_n(server, 1);

    let mut client = Client::new(addr);
    let actual = client.get("report.txt").unwrap();
    client.assert_quiet();

    assert_eq!(actual, exemplar);
    assert_eq!(
        client.received,
        vec![
            Packet::data(Block(1), &exemplar[..512]),
            Packet::data(Block(2), &exemplar[512..]),
        ]
    );
    assert_ne!(client.session_addr(), Some(addr), "transfer runs on its own port");

    let outcome = server_thread.join().unwrap().remove(0).unwrap();
    assert_eq!(outcome, Summary { blocks: 2, bytes: 1000 });
}

#[test]
fn test_get_exact_multiple_ends_with_empty_block() {
    let serve_dir = tempfile::tempdir().unwrap();
    let exemplar = common::random_bytes(1536);
    fs::write(serve_dir.path().join("aligned.bin"), &exemplar).unwrap();

    let (addr, server) = start_server(serve_dir.path(), serve_dir.path());
    let server_thread = serve_n(server, 1);

    let mut client = Client::new(addr);
    assert_eq!(client.get("aligned.bin").unwrap(), exemplar);

    let sizes: Vec<usize> = client
        .received
        .iter()
        .map(|p| match p {
            Packet::Data(data) => data.data.len(),
            other => panic!("unexpected {}", other),
        })
        .collect();
    assert_eq!(sizes, vec![512, 512, 512, 0]);

    server_thread.join().unwrap().remove(0).unwrap();
}

#[test]
fn test_get_empty_file() {
    let serve_dir = tempfile::tempdir().unwrap();
    fs::write(serve_dir.path().join("empty"), b"").unwrap();

    let (addr, server) = start_server(serve_dir.path(), serve_dir.path());
    let server_thread = serve_n(server, 1);

    let mut client = Client::new(addr);
    assert!(client.get("empty").unwrap().is_empty());
    assert_eq!(client.received, vec![Packet::data(Block(1), b"")]);

    let outcome = server_thread.join().unwrap().remove(0).unwrap();
    assert_eq!(outcome, Summary { blocks: 1, bytes: 0 });
}

#[test]
fn test_get_missing_file() {
    let serve_dir = tempfile::tempdir().unwrap();

    let (addr, server) = start_server(serve_dir.path(), serve_dir.path());
    let server_thread = serve_n(server, 1);

    let mut client = Client::new(addr);
    let err = client.get("alice-in-wonderland.txt").unwrap_err();
    client.assert_quiet();

    assert_eq!(err, Packet::error(ErrorCode::FileNotFound, "File not found"));
    let outcome = server_thread.join().unwrap().remove(0);
    assert!(matches!(outcome, Err(TransferError::FileNotFound(_))));
}

#[test]
fn test_get_outside_root_is_refused() {
    let root = tempfile::tempdir().unwrap();
    let serve_dir = root.path().join("public");
    fs::create_dir(&serve_dir).unwrap();
    fs::write(root.path().join("secret.txt"), b"hunter2").unwrap();

    let (addr, server) = start_server(&serve_dir, &serve_dir);
    let server_thread = serve_n(server, 1);

    let mut client = Client::new(addr);
    let err = client.get("../secret.txt").unwrap_err();

    assert_eq!(err, Packet::error(ErrorCode::AccessViolation, "Access violation"));
    let outcome = server_thread.join().unwrap().remove(0);
    assert!(matches!(outcome, Err(TransferError::AccessViolation(_))));
}

#[test]
fn test_get_gives_up_when_client_goes_quiet() {
    let serve_dir = tempfile::tempdir().unwrap();
    fs::write(serve_dir.path().join("big.bin"), vec![b'h'; 4096]).unwrap();

    let (addr, server) = start_server(serve_dir.path(), serve_dir.path());
    let server_thread = serve_n(server, 1);

    // Request the file, then never acknowledge anything.
    let mut client = Client::new(addr);
    client.send(Packet::rrq("big.bin", Default::default()));

    for _ in 0..MAX_ATTEMPTS {
        match client.recv() {
            Some(Packet::Data(data)) => assert_eq!(data.block, Block(1)),
            other => panic!("expected a retransmitted block 1, got {:?}", other),
        }
    }
    match client.recv() {
        Some(Packet::Error(error)) => assert_eq!(error.code, ErrorCode::NotDefined),
        other => panic!("expected an error packet, got {:?}", other),
    }
    client.assert_quiet();

    let outcome = server_thread.join().unwrap().remove(0);
    assert!(matches!(
        outcome,
        Err(TransferError::RetryExhausted { block: Block(1), .. })
    ));
}
