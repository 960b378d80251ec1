#![allow(dead_code, clippy::unwrap_used, clippy::expect_used, clippy::panic)]

pub mod fixtures {
    use serde_json::{json, Value};

    /// Betting service: bearer auth, an apiKey header, a header parameter
    pub fn betting() -> Value {
        json!({
            "openapi": "3.0.3",
            "info": { "title": "Betting", "version": "1.2.0" },
            "servers": [
                { "url": "https://dev.f1-betting.app", "description": "development" },
                { "url": "https://f1-betting.app", "description": "production" }
            ],
            "paths": {
                "/bet/{season}/{race}": {
                    "summary": "Bets for one race",
                    "get": {
                        "operationId": "list_bets",
                        "security": [{ "bearer": [] }]
                    },
                    "post": {
                        "operationId": "place_bet",
                        "security": [{ "bearer": [] }],
                        "parameters": [{ "name": "X-Request-Id", "in": "header" }]
                    }
                },
                "/odds": {
                    "get": {
                        "operationId": "list_odds",
                        "security": [{ "partner": [] }]
                    }
                }
            },
            "components": {
                "securitySchemes": {
                    "bearer": { "type": "http", "scheme": "bearer", "bearerFormat": "JWT" },
                    "partner": { "type": "apiKey", "in": "header", "name": "X-Partner-Key" }
                }
            }
        })
    }

    /// Users service declared as YAML
    pub const USERS_YAML: &str = r#"openapi: 3.0.0
info:
  title: Users
  version: "2.0.0"
servers:
  - url: http://users.internal
paths:
  /users:
    get:
      operationId: list_users
  /users/{id}:
    delete:
      operationId: delete_user
"#;
}

pub mod dirs {
    use serde_json::Value;
    use std::fs;
    use std::path::Path;
    use tempfile::TempDir;

    pub fn write_json(dir: &Path, name: &str, value: &Value) {
        fs::write(dir.join(name), serde_json::to_string_pretty(value).unwrap()).unwrap();
    }

    /// Input folder with the given JSON documents
    pub fn input_with(docs: &[(&str, Value)]) -> TempDir {
        let dir = tempfile::tempdir().unwrap();
        for (name, value) in docs {
            write_json(dir.path(), name, value);
        }
        dir
    }

    /// Write an override file under `<input>/config/`
    pub fn write_override(input: &Path, name: &str, content: &str) {
        let config = input.join("config");
        fs::create_dir_all(&config).unwrap();
        fs::write(config.join(name), content).unwrap();
    }

    pub fn read(path: &Path) -> String {
        fs::read_to_string(path).unwrap_or_else(|e| panic!("{}: {e}", path.display()))
    }
}

pub mod templates {
    use serde_json::Value;

    /// Strip Go template directive lines and parse the remaining array body
    pub fn fragment_records(fragment: &str) -> Vec<Value> {
        let body: Vec<&str> = fragment
            .lines()
            .filter(|line| !line.trim_start().starts_with("{{"))
            .collect();
        serde_json::from_str(&format!("[{}]", body.join("\n"))).unwrap()
    }

    /// Parse `krakend.json` with the dispatcher reference replaced by `[]`
    pub fn manifest_value(manifest: &str) -> Value {
        let parsable = manifest.replace("[{{template \"Endpoints\" .service}}]", "[]");
        serde_json::from_str(&parsable).unwrap()
    }
}
