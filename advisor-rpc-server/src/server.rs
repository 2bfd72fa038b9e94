use anyhow::{Context, Result};
use serde_json::Value;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::{TcpListener, TcpStream};

use crate::error::RpcError;
use crate::handler::AdvisorHandler;
use crate::protocol::*;

/// JSON-RPC server for the portfolio advisor
pub struct RpcServer {
    host: String,
    port: u16,
    handler: Arc<AdvisorHandler>,
}

impl RpcServer {
    pub fn new(host: String, port: u16, handler: Arc<AdvisorHandler>) -> Self {
        Self {
            host,
            port,
            handler,
        }
    }

    /// Start the server and handle connections
    pub async fn run(&self) -> Result<()> {
        let addr = format!("{}:{}", self.host, self.port);
        let listener = TcpListener::bind(&addr)
            .await
            .context(format!("Failed to bind to {}", addr))?;

        tracing::info!("Advisor JSON-RPC server listening on {}", addr);

        loop {
            match listener.accept().await {
                Ok((socket, addr)) => {
                    tracing::debug!("New connection from {}", addr);
                    let handler = Arc::clone(&self.handler);

                    tokio::spawn(async move {
                        if let Err(e) = handle_connection(socket, handler).await {
                            tracing::error!("Connection error from {}: {}", addr, e);
                        }
                    });
                }
                Err(e) => {
                    tracing::error!("Failed to accept connection: {}", e);
                }
            }
        }
    }
}

/// Handle a single TCP connection
async fn handle_connection(mut socket: TcpStream, handler: Arc<AdvisorHandler>) -> Result<()> {
    let (reader, mut writer) = socket.split();
    let mut reader = BufReader::new(reader);
    let mut line = String::new();

    loop {
        line.clear();
        let bytes_read = reader.read_line(&mut line).await?;

        if bytes_read == 0 {
            // Connection closed
            break;
        }

        let response = process_request(&line, &handler).await;

        let response_json = serde_json::to_string(&response)?;
        writer.write_all(response_json.as_bytes()).await?;
        writer.write_all(b"\n").await?;
        writer.flush().await?;
    }

    Ok(())
}

/// Process a JSON-RPC request line
async fn process_request(line: &str, handler: &AdvisorHandler) -> Value {
    let request: JsonRpcRequest = match serde_json::from_str(line) {
        Ok(req) => req,
        Err(e) => {
            return error_response(None, RpcError::ParseError(e.to_string()));
        }
    };

    if request.jsonrpc != "2.0" {
        return error_response(
            request.id,
            RpcError::InvalidRequest("JSON-RPC version must be 2.0".to_string()),
        );
    }

    match request.method.as_str() {
        "advisor.chat" => {
            dispatch(request.id, request.params, |params: ChatParams| async move {
                handler.handle_chat(params).await
            })
            .await
        }
        "advisor.search" => {
            dispatch(request.id, request.params, |params: SearchParams| async move {
                handler.handle_search(params).await
            })
            .await
        }
        "advisor.documents" => match serde_json::to_value(handler.handle_documents()) {
            Ok(result) => success_response(request.id, result),
            Err(e) => error_response(request.id, RpcError::InternalError(e.to_string())),
        },
        "advisor.reload" => match handler.handle_reload().await {
            Ok(result) => match serde_json::to_value(result) {
                Ok(result) => success_response(request.id, result),
                Err(e) => error_response(request.id, RpcError::InternalError(e.to_string())),
            },
            Err(e) => error_response(request.id, e),
        },
        _ => error_response(request.id, RpcError::MethodNotFound(request.method.clone())),
    }
}

/// Parse params and run a typed handler, serializing the outcome.
async fn dispatch<P, R, F, Fut>(id: Option<Value>, params: Option<Value>, run: F) -> Value
where
    P: serde::de::DeserializeOwned,
    R: serde::Serialize,
    F: FnOnce(P) -> Fut,
    Fut: std::future::Future<Output = Result<R, RpcError>>,
{
    let params: P = match params {
        Some(params) => match serde_json::from_value(params) {
            Ok(p) => p,
            Err(e) => {
                return error_response(id, RpcError::InvalidParams(e.to_string()));
            }
        },
        None => {
            return error_response(id, RpcError::InvalidParams("missing params".to_string()));
        }
    };

    match run(params).await {
        Ok(result) => match serde_json::to_value(result) {
            Ok(result) => success_response(id, result),
            Err(e) => error_response(id, RpcError::InternalError(e.to_string())),
        },
        Err(e) => error_response(id, e),
    }
}

fn success_response(id: Option<Value>, result: Value) -> Value {
    serde_json::to_value(JsonRpcResponse {
        jsonrpc: "2.0".to_string(),
        id,
        result,
    })
    .unwrap_or(Value::Null)
}

fn error_response(id: Option<Value>, error: RpcError) -> Value {
    serde_json::to_value(JsonRpcError {
        jsonrpc: "2.0".to_string(),
        id,
        error: ErrorObject {
            code: error.code(),
            message: error.to_string(),
        },
    })
    .unwrap_or(Value::Null)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_response_shape() {
        let response = error_response(
            Some(Value::from(1)),
            RpcError::MethodNotFound("advisor.unknown".to_string()),
        );

        assert_eq!(response["jsonrpc"], "2.0");
        assert_eq!(response["id"], 1);
        assert_eq!(response["error"]["code"], METHOD_NOT_FOUND);
        assert!(response["error"]["message"]
            .as_str()
            .unwrap()
            .contains("advisor.unknown"));
    }

    #[test]
    fn test_success_response_shape() {
        let response = success_response(Some(Value::from(7)), serde_json::json!({"ok": true}));
        assert_eq!(response["id"], 7);
        assert_eq!(response["result"]["ok"], true);
    }
}
