mod common;
use common::{respond, restore_env, ScriptedTransport, ENV_LOCK};

use apiprobe::app::App;
use apiprobe::config::EngineDefaults;
use apiprobe::errors::ToolErrorKind;
use apiprobe::mcp::server::McpServer;
use serde_json::{json, Value};
use std::sync::Arc;

fn app(transport: Arc<ScriptedTransport>) -> App {
    App::with_transport(EngineDefaults::default(), transport).expect("tool wiring must be complete")
}

#[tokio::test]
async fn alias_call_reports_canonical_tool_and_trace() {
    let transport = ScriptedTransport::new(vec![respond(200, "{\"ok\":true}")]);
    let envelope = app(transport)
        .tool_executor
        .execute(
            "http_test",
            json!({"action": "send_request", "url": "https://api.test/ping", "trace_id": "t-1"}),
        )
        .await
        .unwrap();

    assert_eq!(envelope["tool"], "mcp_http_test");
    assert_eq!(envelope["action"], "send_request");
    assert_eq!(envelope["meta"]["invoked_as"], "http_test");
    assert_eq!(envelope["meta"]["trace_id"], "t-1");
    assert_eq!(envelope["result"]["success"], true);
    assert_eq!(envelope["result"]["response"]["status_code"], 200);
    assert_eq!(envelope["result"]["response"]["body"], "{\"ok\":true}");
}

#[tokio::test]
async fn execute_test_success_mirrors_rule_outcome() {
    let transport = ScriptedTransport::new(vec![
        respond(200, "{\"items\":[1,2,3]}"),
        respond(200, "{\"items\":[]}"),
    ]);
    let app = app(transport);
    let args = json!({
        "action": "execute_test",
        "url": "https://api.test/items",
        "expected_status": 200,
        "rules": [{"type": "JsonPath", "target": "$.items.length", "operator": "greaterthan", "expected": 0}]
    });

    let first = app.tool_executor.execute("mcp_http_test", args.clone()).await.unwrap();
    assert_eq!(first["result"]["success"], true);
    assert_eq!(first["result"]["test"]["passed_count"], 2);

    let second = app.tool_executor.execute("mcp_http_test", args).await.unwrap();
    assert_eq!(second["result"]["success"], false);
    assert_eq!(second["result"]["test"]["failed_count"], 1);
    assert_eq!(second["result"]["test"]["validations"][1]["actual"], 0);
}

#[tokio::test]
async fn execute_suite_summarizes_results() {
    let transport = ScriptedTransport::new(vec![respond(200, "[]"), respond(404, "")]);
    let envelope = app(transport)
        .tool_executor
        .execute(
            "api_test",
            json!({
                "action": "execute_suite",
                "base_url": "https://api.test",
                "tests": [
                    {"name": "list", "path": "/users", "expected_status": 200},
                    {"name": "missing", "path": "/users/9", "expected_status": 200}
                ]
            }),
        )
        .await
        .unwrap();

    let suite = &envelope["result"]["suite"];
    assert_eq!(envelope["result"]["success"], false);
    assert_eq!(suite["total_tests"], 2);
    assert_eq!(suite["passed_tests"], 1);
    assert_eq!(suite["failed_tests"], 1);
    assert_eq!(suite["results"][1]["name"], "missing");
}

#[tokio::test]
async fn evaluate_path_needs_no_network() {
    let transport = ScriptedTransport::new(Vec::new());
    let app = app(transport.clone());

    let envelope = app
        .tool_executor
        .execute(
            "mcp_http_test",
            json!({
                "action": "evaluate_path",
                "json": "{\"users\":[{\"name\":\"Ana\"},{\"name\":\"Bo\"}]}",
                "path": "$.users[1].name"
            }),
        )
        .await
        .unwrap();
    assert_eq!(envelope["result"]["found"], true);
    assert_eq!(envelope["result"]["value"], "Bo");

    let envelope = app
        .tool_executor
        .execute(
            "mcp_http_test",
            json!({"action": "evaluate_path", "json": {"a": 1}, "path": "$.b"}),
        )
        .await
        .unwrap();
    assert_eq!(envelope["result"]["found"], false);
    assert!(envelope["result"]["value"].is_null());
    assert!(transport.requests().is_empty());
}

#[tokio::test]
async fn unknown_action_suggests_the_closest_one() {
    let transport = ScriptedTransport::new(Vec::new());
    let err = app(transport)
        .tool_executor
        .execute("mcp_http_test", json!({"action": "execute_tset"}))
        .await
        .unwrap_err();

    assert_eq!(err.kind, ToolErrorKind::InvalidParams);
    assert_eq!(err.message, "Unknown http_test action: execute_tset");
    assert!(err.hint.unwrap_or_default().starts_with("Did you mean: execute_test?"));
}

#[tokio::test]
async fn unknown_tool_is_rejected() {
    let transport = ScriptedTransport::new(Vec::new());
    let err = app(transport)
        .tool_executor
        .execute("mcp_http_tset", json!({"action": "send_request"}))
        .await
        .unwrap_err();
    assert_eq!(err.message, "Unknown tool: mcp_http_tset");
}

fn response_json(response: Option<apiprobe::mcp::protocol::JsonRpcResponse>) -> Value {
    serde_json::to_value(response.expect("request must be answered")).unwrap()
}

#[tokio::test]
async fn stdio_protocol_lists_and_calls_tools() {
    let _guard = ENV_LOCK.lock().await;
    let prev_tier = std::env::var("APIPROBE_TOOL_TIER").ok();
    std::env::remove_var("APIPROBE_TOOL_TIER");

    let transport = ScriptedTransport::new(vec![respond(201, "{\"id\":5}")]);
    let server = McpServer::with_app(app(transport.clone()));

    let init = response_json(
        server
            .handle_line(r#"{"jsonrpc":"2.0","id":1,"method":"initialize","params":{}}"#)
            .await,
    );
    assert_eq!(init["result"]["serverInfo"]["name"], "apiprobe");

    assert!(server
        .handle_line(r#"{"jsonrpc":"2.0","method":"notifications/initialized"}"#)
        .await
        .is_none());

    let list = response_json(
        server
            .handle_line(r#"{"jsonrpc":"2.0","id":2,"method":"tools/list"}"#)
            .await,
    );
    let names: Vec<&str> = list["result"]["tools"]
        .as_array()
        .unwrap()
        .iter()
        .filter_map(|tool| tool["name"].as_str())
        .collect();
    assert!(names.contains(&"mcp_http_test"));
    assert!(names.contains(&"http_test"));

    let call = json!({
        "jsonrpc": "2.0",
        "id": 3,
        "method": "tools/call",
        "params": {
            "name": "http_test",
            "arguments": {
                "action": "execute_test",
                "method": "POST",
                "url": "https://api.test/users",
                "body": {"name": "Ana"},
                "expected_status": 201
            }
        }
    });
    let called = response_json(server.handle_line(&call.to_string()).await);
    let text = called["result"]["content"][0]["text"].as_str().unwrap();
    let envelope: Value = serde_json::from_str(text).unwrap();
    assert_eq!(envelope["result"]["success"], true);
    assert_eq!(
        transport.requests()[0].body.as_deref(),
        Some("{\"name\":\"Ana\"}")
    );

    let bad_action = json!({
        "jsonrpc": "2.0",
        "id": 4,
        "method": "tools/call",
        "params": {"name": "mcp_http_test", "arguments": {"action": "explode"}}
    });
    let rejected = response_json(server.handle_line(&bad_action.to_string()).await);
    assert_eq!(rejected["error"]["code"], -32602);

    let unknown = response_json(
        server
            .handle_line(r#"{"jsonrpc":"2.0","id":5,"method":"resources/list"}"#)
            .await,
    );
    assert_eq!(unknown["error"]["code"], -32601);

    restore_env("APIPROBE_TOOL_TIER", prev_tier);
}

#[tokio::test]
async fn tools_call_accepts_loosely_spelled_actions() {
    let transport = ScriptedTransport::new(vec![respond(200, "{\"ok\":true}")]);
    let server = McpServer::with_app(app(transport.clone()));

    let result = server
        .handle_tools_call(
            "mcp_http_test",
            json!({"action": "SendRequest", "url": "https://api.test/ping"}),
        )
        .await
        .unwrap();
    let text = result["content"][0]["text"].as_str().unwrap();
    let envelope: Value = serde_json::from_str(text).unwrap();
    assert_eq!(envelope["action"], "send_request");
    assert_eq!(envelope["result"]["response"]["status_code"], 200);
    assert_eq!(transport.requests().len(), 1);

    let err = server
        .handle_tools_call("mcp_http_test", json!({"action": "SendRequests"}))
        .await
        .unwrap_err();
    assert_eq!(err.code, apiprobe::errors::ErrorCode::InvalidParams);
    assert!(err.message.contains("Did you mean: /action: send_request"));
}
