//! Shared fixtures for integration tests.
//!
//! Each test gets its own temporary folder holding the database file and
//! the output folders. The store is file-backed so pooled connections share
//! one database.

#![allow(dead_code)]

use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tempfile::TempDir;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

use funnel::adapters::media::PlannedRender;
use funnel::adapters::{
    CommerceAdapter, CommerceRegistry, Listing, ListingRequest, SocialRegistry, SocialUploader,
    UploadRequest,
};
use funnel::config::Config;
use funnel::services::{self, Services};
use funnel::storage::SqliteStore;
use funnel::{FunnelError, Result};

/// An initialized store in a throwaway folder.
pub struct Fixture {
    pub dir: TempDir,
    pub config: Config,
    pub store: SqliteStore,
}

impl Fixture {
    pub async fn new() -> Self {
        Self::with_config(|_| {}).await
    }

    /// Like [`Fixture::new`], with `adjust` applied before the store opens.
    pub async fn with_config(adjust: impl FnOnce(&mut Config)) -> Self {
        let dir = tempfile::tempdir().expect("tempdir");
        let mut config = Config::for_test(dir.path());
        config.paths.templates_dir =
            PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tool_templates");
        adjust(&mut config);
        let store = services::initialize(&config).await.expect("initialize");
        Self { dir, config, store }
    }

    /// Services wired to the given fakes.
    pub fn services(&self, commerce: CommerceRegistry, social: SocialRegistry) -> Services {
        Services::new(
            self.store.clone(),
            &self.config,
            commerce,
            social,
            Arc::new(PlannedRender),
        )
    }

    /// Services with a recording uploader for youtube and pinterest.
    pub fn default_services(&self) -> (Services, Arc<FakeUploader>, Arc<FakeUploader>) {
        let youtube = Arc::new(FakeUploader::new("youtube"));
        let pinterest = Arc::new(FakeUploader::new("pinterest"));
        let social = SocialRegistry::new()
            .with("youtube", youtube.clone())
            .with("pinterest", pinterest.clone());
        let commerce = CommerceRegistry::new().with("lemonsqueezy", Arc::new(FakeCommerce::default()));
        (self.services(commerce, social), youtube, pinterest)
    }
}

// ============================================================================
// Fake adapters
// ============================================================================

/// Social uploader that records calls and can be told to fail or stall.
pub struct FakeUploader {
    name: String,
    calls: AtomicUsize,
    fail: AtomicBool,
    delay: Duration,
}

impl FakeUploader {
    pub fn new(name: &str) -> Self {
        Self::with_delay(name, Duration::ZERO)
    }

    pub fn with_delay(name: &str, delay: Duration) -> Self {
        Self {
            name: name.to_string(),
            calls: AtomicUsize::new(0),
            fail: AtomicBool::new(false),
            delay,
        }
    }

    pub fn set_fail(&self, fail: bool) {
        self.fail.store(fail, Ordering::SeqCst);
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl SocialUploader for FakeUploader {
    async fn upload(&self, request: &UploadRequest) -> Result<String> {
        let n = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        if self.fail.load(Ordering::SeqCst) {
            return Err(FunnelError::ExternalService {
                service: self.name.clone(),
                status: 503,
                body: "unavailable".into(),
            });
        }
        assert!(!request.title.is_empty());
        Ok(format!("https://{}.test/{n}", self.name))
    }

    fn name(&self) -> &str {
        &self.name
    }
}

/// Commerce adapter that hands out sequential listings.
#[derive(Default)]
pub struct FakeCommerce {
    calls: AtomicUsize,
    pub fixed_id: Option<String>,
}

impl FakeCommerce {
    pub fn with_fixed_id(id: &str) -> Self {
        Self {
            calls: AtomicUsize::new(0),
            fixed_id: Some(id.to_string()),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl CommerceAdapter for FakeCommerce {
    async fn create_listing(&self, request: &ListingRequest) -> Result<Listing> {
        let n = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
        let external_id = self.fixed_id.clone().unwrap_or_else(|| format!("prod-{n}"));
        Ok(Listing {
            checkout_url: format!("https://shop.test/{}/{external_id}", request.slug),
            external_id,
        })
    }

    fn name(&self) -> &str {
        "fake"
    }
}

// ============================================================================
// Canned HTTP server
// ============================================================================

/// A response the canned server sends back.
#[derive(Clone)]
pub struct Canned {
    pub status: u16,
    pub headers: Vec<(String, String)>,
    pub body: String,
}

impl Canned {
    pub fn json(status: u16, body: &str) -> Self {
        Self {
            status,
            headers: Vec::new(),
            body: body.to_string(),
        }
    }

    pub fn header(mut self, name: &str, value: &str) -> Self {
        self.headers.push((name.to_string(), value.to_string()));
        self
    }
}

/// One-connection-per-response HTTP/1.1 server on localhost.
pub struct CannedHttp {
    listener: TcpListener,
    pub base: String,
}

impl CannedHttp {
    pub async fn bind() -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
        let base = format!("http://{}", listener.local_addr().expect("addr"));
        Self { listener, base }
    }

    /// Answer one request per canned response, in order. The handle yields
    /// every request received (head and body).
    pub fn serve(self, responses: Vec<Canned>) -> JoinHandle<Vec<String>> {
        tokio::spawn(async move {
            let mut seen = Vec::new();
            for canned in responses {
                let (mut socket, _) = self.listener.accept().await.expect("accept");
                seen.push(read_request(&mut socket).await);

                let mut head = format!(
                    "HTTP/1.1 {} Canned\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n",
                    canned.status,
                    canned.body.len()
                );
                for (name, value) in &canned.headers {
                    head.push_str(&format!("{name}: {value}\r\n"));
                }
                head.push_str("\r\n");

                socket.write_all(head.as_bytes()).await.expect("write head");
                socket.write_all(canned.body.as_bytes()).await.expect("write body");
                socket.shutdown().await.ok();
            }
            seen
        })
    }
}

async fn read_request(socket: &mut tokio::net::TcpStream) -> String {
    let mut buf = Vec::new();
    let mut chunk = [0_u8; 4096];

    let header_end = loop {
        let n = socket.read(&mut chunk).await.expect("read");
        assert!(n > 0, "connection closed before headers");
        buf.extend_from_slice(&chunk[..n]);
        if let Some(pos) = buf.windows(4).position(|w| w == b"\r\n\r\n") {
            break pos + 4;
        }
    };

    let head = String::from_utf8_lossy(&buf[..header_end]).to_string();
    let content_length = head
        .lines()
        .find_map(|line| {
            let (name, value) = line.split_once(':')?;
            name.eq_ignore_ascii_case("content-length")
                .then(|| value.trim().parse::<usize>().ok())
                .flatten()
        })
        .unwrap_or(0);

    while buf.len() < header_end + content_length {
        let n = socket.read(&mut chunk).await.expect("read body");
        if n == 0 {
            break;
        }
        buf.extend_from_slice(&chunk[..n]);
    }

    String::from_utf8_lossy(&buf).to_string()
}
