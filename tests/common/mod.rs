use std::process::{Child, Command, Stdio};
use std::sync::OnceLock;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use reqwest::StatusCode;
use serde_json::json;

static SERVER: OnceLock<TestServer> = OnceLock::new();

pub struct TestServer {
    pub base_url: String,
    #[allow(dead_code)]
    child: Child,
    #[allow(dead_code)]
    upload_dir: tempfile::TempDir,
}

impl TestServer {
    fn spawn() -> Result<Self> {
        // Pick an unused port for isolation
        let port = portpicker::pick_unused_port().context("failed to pick free port")?;
        let base_url = format!("http://127.0.0.1:{}", port);
        let upload_dir = tempfile::tempdir().context("failed to create upload dir")?;

        // The memory backend keeps the test independent of any database;
        // the seeded admin/admin account is the login fixture.
        let mut cmd = Command::new(env!("CARGO_BIN_EXE_workshop-api"));
        cmd.env("WORKSHOP_PORT", port.to_string())
            .env("WORKSHOP_SEED_ADMIN", "true")
            .env("WORKSHOP_JWT_SECRET", "integration-test-secret")
            .env("WORKSHOP_UPLOAD_DIR", upload_dir.path().join("upload-dir"))
            .env_remove("DATABASE_URL")
            .stdin(Stdio::null())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit());

        let child = cmd.spawn().context("failed to spawn server binary")?;

        Ok(Self {
            base_url,
            child,
            upload_dir,
        })
    }

    async fn wait_ready(&self, timeout: Duration) -> Result<()> {
        let client = reqwest::Client::new();
        let deadline = Instant::now() + timeout;
        loop {
            if Instant::now() > deadline {
                break;
            }
            let url = format!("{}/health", self.base_url);
            if let Ok(resp) = client.get(&url).send().await {
                if resp.status() == StatusCode::OK {
                    return Ok(());
                }
            }
            tokio::time::sleep(Duration::from_millis(150)).await;
        }
        anyhow::bail!(
            "server did not become ready on {} within {:?}",
            self.base_url,
            timeout
        )
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}/api/v1{}", self.base_url, path)
    }
}

pub async fn ensure_server() -> Result<&'static TestServer> {
    let server = SERVER.get_or_init(|| TestServer::spawn().expect("failed to spawn server binary"));
    server.wait_ready(Duration::from_secs(10)).await?;
    Ok(server)
}

/// Log in as the seeded dev admin and return a bearer token.
pub async fn login(server: &TestServer) -> Result<String> {
    let client = reqwest::Client::new();
    let resp = client
        .post(server.url("/auth/login"))
        .json(&json!({ "username": "admin", "password": "admin" }))
        .send()
        .await?;
    anyhow::ensure!(resp.status() == StatusCode::OK, "login failed: {}", resp.status());

    let body: serde_json::Value = resp.json().await?;
    let token = body["token"]
        .as_str()
        .context("login response missing token")?
        .to_string();
    Ok(token)
}

/// Authenticated client for the protected API routes.
pub async fn authed_client(server: &TestServer) -> Result<reqwest::Client> {
    let token = login(server).await?;
    let mut headers = reqwest::header::HeaderMap::new();
    let mut value = reqwest::header::HeaderValue::from_str(&format!("Bearer {token}"))?;
    value.set_sensitive(true);
    headers.insert(reqwest::header::AUTHORIZATION, value);

    Ok(reqwest::Client::builder().default_headers(headers).build()?)
}
