#![allow(clippy::unwrap_used)]
// Gateway endpoint tests against a fake legacy device on loopback TCP.
//
// Mirrors gateway_test.rs for the sentence-protocol path: the same
// `ip/route/print` call that loses its suffix on REST keeps the full
// command text here, because `print` is part of the legacy vocabulary.

use std::net::SocketAddr;
use std::sync::Arc;

use pretty_assertions::assert_eq;
use secrecy::SecretString;
use tokio::net::TcpListener;

use rosgate_api::legacy::proto::{read_sentence, write_sentence};
use rosgate_core::{
    ApiType, DeviceRecord, Error, Gateway, RequestMethod, StaticDirectory,
};

// ── Fake device ─────────────────────────────────────────────────────

fn s(words: &[&str]) -> Vec<String> {
    words.iter().map(|w| (*w).to_owned()).collect()
}

/// Accept one session: answer `/login`, then answer one command with
/// `replies` -- but only if the command sentence matches `expect` exactly
/// (a mismatch traps, failing the calling test).
async fn spawn_device(expect: Vec<String>, replies: Vec<Vec<String>>) -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        let (mut stream, _) = listener.accept().await.unwrap();

        let login = read_sentence(&mut stream).await.unwrap();
        assert_eq!(login[0], "/login");
        write_sentence(&mut stream, &s(&["!done"])).await.unwrap();

        let command = read_sentence(&mut stream).await.unwrap();
        if command == expect {
            for sentence in replies {
                write_sentence(&mut stream, &sentence).await.unwrap();
            }
        } else {
            write_sentence(
                &mut stream,
                &s(&["!trap", &format!("=message=unexpected command {command:?}")]),
            )
            .await
            .unwrap();
            write_sentence(&mut stream, &s(&["!done"])).await.unwrap();
        }

        let _ = read_sentence(&mut stream).await;
    });

    addr
}

fn gateway_for(addr: SocketAddr) -> Gateway {
    let mut directory = StaticDirectory::default();
    directory.insert(DeviceRecord {
        id: "edge-legacy".into(),
        host: addr.ip().to_string(),
        user: "api".to_owned(),
        password: SecretString::from("hunter2".to_owned()),
        port: addr.port(),
        api_type: ApiType::Legacy,
    });
    Gateway::new(Arc::new(directory)).unwrap()
}

// ── Path translation ────────────────────────────────────────────────

#[tokio::test]
async fn read_keeps_print_suffix_for_legacy_devices() {
    let addr = spawn_device(
        s(&["/ip/route/print"]),
        vec![
            s(&["!re", "=.id=*2", "=dst_address=0.0.0.0/0", "=routing_table=main"]),
            s(&["!re", "=.id=*1", "=dst_address=10.0.0.0/8"]),
            s(&["!done"]),
        ],
    )
    .await;
    let gateway = gateway_for(addr);

    let reply = gateway
        .call(
            "edge-legacy",
            RequestMethod::Get,
            "ip/route/print",
            &[],
            None,
        )
        .await
        .unwrap();

    let items = reply.body.as_array().unwrap();
    assert_eq!(items.len(), 2);
    // Legacy normalization: canonical id + underscore-to-hyphen rewrite,
    // device order preserved.
    assert_eq!(items[0]["id"], "*2");
    assert_eq!(items[0]["dst-address"], "0.0.0.0/0");
    assert_eq!(items[0]["routing-table"], "main");
    assert_eq!(items[1]["id"], "*1");
}

#[tokio::test]
async fn read_filters_become_query_words() {
    let addr = spawn_device(
        s(&["/ip/firewall/address-list/print", "?list=authorized"]),
        vec![s(&["!re", "=.id=*7", "=address=10.0.0.5"]), s(&["!done"])],
    )
    .await;
    let gateway = gateway_for(addr);

    let query = vec![("list".to_owned(), "authorized".to_owned())];
    let reply = gateway
        .call(
            "edge-legacy",
            RequestMethod::Get,
            "ip/firewall/address-list/print",
            &query,
            None,
        )
        .await
        .unwrap();
    assert_eq!(reply.body.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn write_body_becomes_attribute_words() {
    let addr = spawn_device(
        s(&[
            "/ip/firewall/address-list/add",
            "=address=10.0.0.9",
            "=list=authorized",
        ]),
        vec![s(&["!done", "=ret=*8"])],
    )
    .await;
    let gateway = gateway_for(addr);

    let body = serde_json::json!({ "address": "10.0.0.9", "list": "authorized" });
    let reply = gateway
        .call(
            "edge-legacy",
            RequestMethod::Post,
            "ip/firewall/address-list/add",
            &[],
            Some(&body),
        )
        .await
        .unwrap();
    assert_eq!(reply.status, 200);
}

#[tokio::test]
async fn empty_result_trap_reads_as_empty_array() {
    let addr = spawn_device(
        s(&["/queue/simple/print", "?name=ghost"]),
        vec![s(&["!trap", "=message=no such item"]), s(&["!done"])],
    )
    .await;
    let gateway = gateway_for(addr);

    let query = vec![("name".to_owned(), "ghost".to_owned())];
    let reply = gateway
        .call(
            "edge-legacy",
            RequestMethod::Get,
            "queue/simple/print",
            &query,
            None,
        )
        .await
        .unwrap();
    assert_eq!(reply.body, serde_json::json!([]));
}

#[tokio::test]
async fn device_trap_surfaces_as_protocol_error() {
    let addr = spawn_device(
        s(&["/bogus/print"]),
        vec![
            s(&["!trap", "=message=no such command prefix"]),
            s(&["!done"]),
        ],
    )
    .await;
    let gateway = gateway_for(addr);

    let err = gateway
        .call("edge-legacy", RequestMethod::Get, "bogus/print", &[], None)
        .await
        .unwrap_err();

    match err {
        Error::Protocol { status, message } => {
            assert_eq!(status, None);
            assert!(message.contains("no such command prefix"), "{message}");
        }
        other => panic!("expected protocol error, got {other:?}"),
    }
}
