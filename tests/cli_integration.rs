//! Integration tests for the chattag binary
//!
//! Each test gets its own CHATTAG_DIR with a config file and a chat_history
//! directory, then drives the binary the way a reporting script would.

use std::fs;
use std::path::Path;
use std::process::{Command, Output};

use serde_json::{Value, json};
use tempfile::TempDir;

/// Create an isolated chattag directory with config and history folder
fn setup() -> TempDir {
    let dir = TempDir::new().unwrap();
    let history = dir.path().join("chat_history");
    fs::create_dir_all(&history).unwrap();
    let config = format!("paths:\n  history: {}\nhistory:\n  per_agent_limit: 2\n", history.display());
    fs::write(dir.path().join("chattag.yaml"), config).unwrap();
    dir
}

fn write_history(dir: &Path, user_id: &str, history: &Value) {
    let path = dir.join("chat_history").join(format!("{}.json", user_id));
    fs::write(path, serde_json::to_string_pretty(history).unwrap()).unwrap();
}

fn read_history(dir: &Path, user_id: &str) -> Value {
    let path = dir.join("chat_history").join(format!("{}.json", user_id));
    serde_json::from_str(&fs::read_to_string(path).unwrap()).unwrap()
}

fn run(dir: &Path, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_chattag"))
        .env("CHATTAG_DIR", dir)
        .env_remove("CHATTAG_CONFIG")
        .env_remove("RUST_LOG")
        .args(args)
        .output()
        .expect("Failed to execute chattag")
}

fn run_json(dir: &Path, args: &[&str]) -> Value {
    let output = run(dir, args);
    assert!(
        output.status.success(),
        "chattag {:?} failed: {}",
        args,
        String::from_utf8_lossy(&output.stderr)
    );
    serde_json::from_slice(&output.stdout).unwrap()
}

fn tagged_history() -> Value {
    json!([
        {"role": "system", "content": "O CPF do usuário para esta sessão é 12345678900."},
        {"role": "user", "content": "Quero um empréstimo"},
        {"role": "assistant", "content": "Aprovado em 10 parcelas", "agent": "emprestimo_agent"},
        {"role": "user", "content": "Cotação do dólar?"},
        {"role": "assistant", "content": "R$5,20", "agent": "web_search_agent"},
        {"role": "user", "content": "E a parcela?"},
        {"role": "assistant", "content": "Parcela de R$300", "agent": "emprestimo_agent"}
    ])
}

fn legacy_history() -> Value {
    json!([
        {"role": "assistant", "content": "Olá Ana! Seja bem-vinda."},
        {"role": "user", "content": "Meu saldo?"},
        {"role": "assistant", "content": "Sua transação foi processada, saldo atualizado."},
        {"role": "user", "content": "Empréstimo?"},
        {"role": "assistant", "content": "Seu empréstimo foi aprovado, parcela de R$500."},
        {"role": "user", "content": "Dólar?"},
        {"role": "assistant", "content": "A cotação do dólar hoje é R$5,20."},
        {"role": "user", "content": "Obrigado"},
        {"role": "assistant", "content": "Posso ajudar com outra coisa?"},
        {"role": "user", "content": "Teste"},
        {"role": "assistant", "content": "Mensagem bloqueada.", "agent": "guardrail"}
    ])
}

#[test]
fn test_stats_counts_per_agent() {
    let dir = setup();
    write_history(dir.path(), "12345678900", &tagged_history());

    let stats = run_json(dir.path(), &["stats", "12345678900", "-o", "json"]);
    assert_eq!(stats, json!({"emprestimo_agent": 2, "web_search_agent": 1}));
}

#[test]
fn test_messages_filters_in_order() {
    let dir = setup();
    write_history(dir.path(), "12345678900", &tagged_history());

    let messages = run_json(dir.path(), &["messages", "12345678900", "--agent", "emprestimo_agent"]);
    let contents: Vec<&str> = messages
        .as_array()
        .unwrap()
        .iter()
        .map(|m| m["content"].as_str().unwrap())
        .collect();
    assert_eq!(contents, vec!["Aprovado em 10 parcelas", "Parcela de R$300"]);

    let last = run_json(
        dir.path(),
        &["messages", "12345678900", "--agent", "emprestimo_agent", "--last", "1"],
    );
    assert_eq!(last.as_array().unwrap().len(), 1);
    assert_eq!(last[0]["content"], "Parcela de R$300");

    let grep = run_json(
        dir.path(),
        &["messages", "12345678900", "--agent", "emprestimo_agent", "--grep", "^Aprovado"],
    );
    assert_eq!(grep.as_array().unwrap().len(), 1);
}

#[test]
fn test_agents_sorted() {
    let dir = setup();
    write_history(dir.path(), "12345678900", &tagged_history());

    let agents = run_json(dir.path(), &["agents", "12345678900"]);
    assert_eq!(agents, json!(["emprestimo_agent", "web_search_agent"]));
}

#[test]
fn test_unknown_user_is_empty() {
    let dir = setup();

    assert_eq!(run_json(dir.path(), &["agents", "999"]), json!([]));
    assert_eq!(run_json(dir.path(), &["stats", "999"]), json!({}));
}

#[test]
fn test_stats_agent_summary_uses_configured_limit() {
    let dir = setup();
    write_history(dir.path(), "12345678900", &tagged_history());

    let summary = run_json(dir.path(), &["stats", "12345678900", "--agent", "emprestimo_agent"]);
    assert_eq!(summary["agent"], "emprestimo_agent");
    assert_eq!(summary["total_messages"], 2);
    assert_eq!(summary["recent_messages"], 2);
    assert_eq!(summary["limit"], 2);
    assert_eq!(summary["last_message"], "Parcela de R$300");
}

#[test]
fn test_backfill_tags_and_is_idempotent() {
    let dir = setup();
    write_history(dir.path(), "111", &legacy_history());

    let outcomes = run_json(dir.path(), &["backfill", "111"]);
    assert_eq!(outcomes[0]["saved"], true);
    assert_eq!(
        outcomes[0]["tally"]["tagged"],
        json!({
            "assistant_geral": 1,
            "assistant_inicial": 1,
            "emprestimo_agent": 1,
            "file_search_agent": 1,
            "web_search_agent": 1
        })
    );
    assert_eq!(outcomes[0]["tally"]["already_tagged"], 1);

    let stored = read_history(dir.path(), "111");
    let agents: Vec<Value> = stored.as_array().unwrap().iter().map(|m| m["agent"].clone()).collect();
    assert_eq!(
        agents,
        vec![
            json!("assistant_inicial"),
            Value::Null,
            json!("file_search_agent"),
            Value::Null,
            json!("emprestimo_agent"),
            Value::Null,
            json!("web_search_agent"),
            Value::Null,
            json!("assistant_geral"),
            Value::Null,
            json!("guardrail"),
        ]
    );

    let again = run_json(dir.path(), &["backfill", "111"]);
    assert_eq!(again[0]["saved"], false);
    assert_eq!(again[0]["tally"]["tagged"], json!({}));
    assert_eq!(read_history(dir.path(), "111"), stored);
}

#[test]
fn test_backfill_dry_run_does_not_write() {
    let dir = setup();
    write_history(dir.path(), "111", &legacy_history());

    let outcomes = run_json(dir.path(), &["backfill", "--all", "--dry-run"]);
    assert_eq!(outcomes[0]["user_id"], "111");
    assert_eq!(outcomes[0]["saved"], false);
    assert_eq!(read_history(dir.path(), "111"), legacy_history());
}

#[test]
fn test_backfill_all_covers_every_user() {
    let dir = setup();
    write_history(dir.path(), "111", &legacy_history());
    write_history(dir.path(), "222", &tagged_history());

    let outcomes = run_json(dir.path(), &["backfill", "--all"]);
    let users: Vec<&str> = outcomes
        .as_array()
        .unwrap()
        .iter()
        .map(|o| o["user_id"].as_str().unwrap())
        .collect();
    assert_eq!(users, vec!["111", "222"]);
    assert_eq!(outcomes[1]["saved"], false);
}

#[test]
fn test_backfill_requires_users() {
    let dir = setup();
    let output = run(dir.path(), &["backfill"]);
    assert!(!output.status.success());
}

#[test]
fn test_classify() {
    let dir = setup();
    let output = run(dir.path(), &["classify", "A", "cotação", "do", "dólar"]);
    assert!(output.status.success());
    assert_eq!(String::from_utf8_lossy(&output.stdout).trim(), "web_search_agent");
}

#[test]
fn test_context_pairs_questions_with_replies() {
    let dir = setup();
    write_history(dir.path(), "12345678900", &tagged_history());

    let context = run_json(
        dir.path(),
        &["context", "12345678900", "--agent", "emprestimo_agent", "Posso antecipar?", "--last", "1"],
    );
    assert_eq!(
        context,
        json!([
            {"role": "system", "content": "O CPF do usuário para esta sessão é 12345678900."},
            {"role": "user", "content": "E a parcela?"},
            {"role": "assistant", "content": "Parcela de R$300", "agent": "emprestimo_agent"},
            {"role": "user", "content": "Posso antecipar?"}
        ])
    );
}

#[test]
fn test_invalid_user_id_rejected() {
    let dir = setup();
    let output = run(dir.path(), &["stats", "../secret"]);
    assert!(!output.status.success());
}

#[test]
fn test_unknown_role_is_preserved_and_ignored() {
    let dir = setup();
    let history = json!([
        {"role": "user", "content": "Meu saldo?"},
        {"role": "tool", "content": "{\"saldo\": 10}", "name": "consultar_saldo"},
        {"role": "assistant", "content": "Seu saldo é R$10"}
    ]);
    write_history(dir.path(), "111", &history);

    assert_eq!(run_json(dir.path(), &["stats", "111"]), json!({}));

    let outcomes = run_json(dir.path(), &["backfill", "111"]);
    assert_eq!(outcomes[0]["tally"]["tagged"], json!({"file_search_agent": 1}));

    let stored = read_history(dir.path(), "111");
    assert_eq!(stored[1], history[1]);
    assert_eq!(stored[2]["agent"], "file_search_agent");
    assert_eq!(run_json(dir.path(), &["stats", "111"]), json!({"file_search_agent": 1}));
}

#[test]
fn test_backfill_reports_unreadable_history_and_continues() {
    let dir = setup();
    write_history(dir.path(), "111", &json!([{"role": "assistant", "content": "Seu saldo é R$10"}]));
    fs::write(dir.path().join("chat_history").join("222.json"), "{bad").unwrap();
    write_history(dir.path(), "333", &json!([{"role": "assistant", "content": "O dólar subiu"}]));

    let output = run(dir.path(), &["backfill", "--all", "-o", "json"]);
    assert!(!output.status.success());

    let outcomes: Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(outcomes.as_array().unwrap().len(), 3);
    assert_eq!(outcomes[0]["saved"], true);
    assert!(outcomes[1]["error"].as_str().unwrap().contains("222"));
    assert_eq!(outcomes[2]["saved"], true);

    assert_eq!(read_history(dir.path(), "111")[0]["agent"], "file_search_agent");
    assert_eq!(read_history(dir.path(), "333")[0]["agent"], "web_search_agent");
}

#[test]
fn test_config_set_and_get() {
    let dir = setup();

    let output = run(dir.path(), &["config", "set", "history.preview_chars", "40"]);
    assert!(output.status.success());

    let output = run(dir.path(), &["config", "get", "history.preview_chars"]);
    assert!(output.status.success());
    assert_eq!(String::from_utf8_lossy(&output.stdout).trim(), "40");

    let output = run(dir.path(), &["config", "set", "history.per_agent_limit", "0"]);
    assert!(!output.status.success());
}
