#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::mpsc;
use std::thread;
use std::time::Duration;

/// Canned response for one path.
#[derive(Debug, Clone)]
pub struct Asset {
    pub status: u16,
    pub content_type: &'static str,
    pub body: String,
}

impl Asset {
    pub fn json(body: impl Into<String>) -> Self {
        Self {
            status: 200,
            content_type: "application/json",
            body: body.into(),
        }
    }

    pub fn html(body: impl Into<String>) -> Self {
        Self {
            status: 200,
            content_type: "text/html; charset=utf-8",
            body: body.into(),
        }
    }
}

/// Static origin for catalog resources and creatives. Unknown paths get 404.
pub struct AssetStub {
    pub base_url: String,
    shutdown_tx: Option<mpsc::Sender<()>>,
    handle: Option<thread::JoinHandle<()>>,
}

impl AssetStub {
    pub fn spawn(assets: HashMap<&'static str, Asset>) -> Self {
        let server = tiny_http::Server::http("127.0.0.1:0").expect("start asset stub server");
        let addr = server.server_addr();
        let base_url = format!("http://{addr}");

        let (shutdown_tx, shutdown_rx) = mpsc::channel::<()>();

        let handle = thread::spawn(move || {
            loop {
                if shutdown_rx.try_recv().is_ok() {
                    break;
                }

                let request = match server.recv_timeout(Duration::from_millis(50)) {
                    Ok(Some(req)) => req,
                    Ok(None) => continue,
                    Err(_) => break,
                };

                let path = request
                    .url()
                    .split('?')
                    .next()
                    .unwrap_or_default()
                    .to_string();
                let Some(asset) = assets.get(path.as_str()) else {
                    let _ = request.respond(
                        tiny_http::Response::from_string("not found").with_status_code(404),
                    );
                    continue;
                };

                let mut resp = tiny_http::Response::from_string(asset.body.clone())
                    .with_status_code(asset.status);
                let header = tiny_http::Header::from_bytes(
                    &b"Content-Type"[..],
                    asset.content_type.as_bytes(),
                )
                .expect("content-type header");
                resp.add_header(header);
                let _ = request.respond(resp);
            }
        });

        Self {
            base_url,
            shutdown_tx: Some(shutdown_tx),
            handle: Some(handle),
        }
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }
}

impl Drop for AssetStub {
    fn drop(&mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}
