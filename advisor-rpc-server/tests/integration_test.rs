/// Integration tests for the JSON-RPC server
///
/// These tests require a running server with its corpus ingested:
///   OPENAI_API_KEY=... advisor-rpc-server --port 7891
///
/// To run: cargo test --package advisor-rpc-server --test integration_test -- --ignored --nocapture
use serde_json::json;
use std::io::{BufRead, BufReader, Write};
use std::net::TcpStream;
use std::time::Duration;

fn roundtrip(request: serde_json::Value) -> serde_json::Value {
    let mut stream = TcpStream::connect("127.0.0.1:7891")
        .expect("Failed to connect to server. Is it running?");
    stream
        .set_read_timeout(Some(Duration::from_secs(30)))
        .unwrap();

    let request_json = serde_json::to_string(&request).unwrap();
    stream.write_all(request_json.as_bytes()).unwrap();
    stream.write_all(b"\n").unwrap();
    stream.flush().unwrap();

    let mut reader = BufReader::new(stream);
    let mut response_line = String::new();
    reader.read_line(&mut response_line).unwrap();

    serde_json::from_str(&response_line).unwrap()
}

#[test]
#[ignore] // Requires a running server and an LLM API key
fn test_chat_envelope() {
    let response = roundtrip(json!({
        "jsonrpc": "2.0",
        "id": 1,
        "method": "advisor.chat",
        "params": {
            "message": "What's the outlook for AAPL earnings?",
            "history": []
        }
    }));

    assert_eq!(response["jsonrpc"], "2.0");
    assert_eq!(response["id"], 1);

    let result = &response["result"];
    assert!(result["response"].as_str().unwrap().len() > 0);
    assert!(result["metadata"]["analysis_type"].is_string());
    assert!(result["metadata"]["relevant_stocks"].is_array());
    assert!(result["metadata"]["sources"].is_array());
    assert!(result["metadata"]["timestamp"].is_string());
}

#[test]
#[ignore] // Requires a running server
fn test_search_matches() {
    let response = roundtrip(json!({
        "jsonrpc": "2.0",
        "id": 2,
        "method": "advisor.search",
        "params": {
            "query": "how does diversification reduce risk",
            "include_context": true
        }
    }));

    let result = &response["result"];
    assert!(result["matches"].is_array());
    for entry in result["matches"].as_array().unwrap() {
        assert!(entry["similarity"].as_f64().unwrap() <= 1.0);
    }
}

#[test]
#[ignore] // Requires a running server
fn test_documents_introspection() {
    let response = roundtrip(json!({
        "jsonrpc": "2.0",
        "id": 3,
        "method": "advisor.documents"
    }));

    let result = &response["result"];
    assert!(result["total"].as_u64().unwrap() > 0);
    assert!(result["documents"][0]["id"].is_string());
    assert!(result["documents"][0].get("embedding").is_none());
}

#[test]
#[ignore] // Requires a running server
fn test_unknown_method() {
    let response = roundtrip(json!({
        "jsonrpc": "2.0",
        "id": 4,
        "method": "advisor.unknown",
        "params": {}
    }));

    assert!(response.get("error").is_some());
    assert_eq!(response["error"]["code"], -32601); // METHOD_NOT_FOUND
}

#[test]
#[ignore] // Requires a running server
fn test_empty_message_rejected() {
    let response = roundtrip(json!({
        "jsonrpc": "2.0",
        "id": 5,
        "method": "advisor.chat",
        "params": {"message": "   "}
    }));

    assert_eq!(response["error"]["code"], -32602); // INVALID_PARAMS
}
