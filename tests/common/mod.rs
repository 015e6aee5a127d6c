//! Throwaway HTTP render service for integration tests

#![allow(dead_code)]

use std::io::{Cursor, Result as IoResult};
use std::net::{SocketAddr, TcpListener as StdTcpListener};
use std::sync::{Arc, Mutex};

use image::{DynamicImage, GrayImage, ImageFormat, Luma};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;

use qrgen::{QrClient, ServiceOptions};

/// Canned response served for every request
#[derive(Clone)]
pub struct Reply {
    pub status: u16,
    pub content_type: &'static str,
    pub body: Vec<u8>,
}

impl Reply {
    pub fn png(body: Vec<u8>) -> Self {
        Self {
            status: 200,
            content_type: "image/png",
            body,
        }
    }

    pub fn status(status: u16) -> Self {
        Self {
            status,
            content_type: "text/plain",
            body: b"upstream failure".to_vec(),
        }
    }

    pub fn html() -> Self {
        Self {
            status: 200,
            content_type: "text/html; charset=utf-8",
            body: b"<html>captive portal</html>".to_vec(),
        }
    }
}

pub struct FakeService {
    pub addr: SocketAddr,
    reply: Arc<Mutex<Reply>>,
    requests: Arc<Mutex<Vec<String>>>,
}

impl FakeService {
    pub async fn spawn(reply: Reply) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind service");
        let addr = listener.local_addr().expect("service addr");
        let reply = Arc::new(Mutex::new(reply));
        let requests = Arc::new(Mutex::new(Vec::new()));

        let shared_reply = Arc::clone(&reply);
        let seen = Arc::clone(&requests);
        tokio::spawn(async move {
            while let Ok((mut stream, _)) = listener.accept().await {
                let reply = shared_reply.lock().unwrap().clone();
                let seen = Arc::clone(&seen);
                tokio::spawn(async move {
                    let mut buf = Vec::new();
                    let mut chunk = [0u8; 1024];
                    loop {
                        let n = stream.read(&mut chunk).await.unwrap_or(0);
                        if n == 0 {
                            break;
                        }
                        buf.extend_from_slice(&chunk[..n]);
                        if buf.windows(4).any(|w| w == b"\r\n\r\n") {
                            break;
                        }
                    }

                    let head = String::from_utf8_lossy(&buf);
                    if let Some(target) = head
                        .lines()
                        .next()
                        .and_then(|line| line.split_whitespace().nth(1))
                    {
                        seen.lock().unwrap().push(target.to_string());
                    }

                    let reason = if reply.status == 200 { "OK" } else { "Error" };
                    let header = format!(
                        "HTTP/1.1 {} {reason}\r\nContent-Type: {}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
                        reply.status,
                        reply.content_type,
                        reply.body.len()
                    );
                    let _ = stream.write_all(header.as_bytes()).await;
                    let _ = stream.write_all(&reply.body).await;
                    let _ = stream.shutdown().await;
                });
            }
        });

        Self {
            addr,
            reply,
            requests,
        }
    }

    pub fn base_url(&self) -> String {
        format!("http://{}/v1/create-qr-code/", self.addr)
    }

    pub fn client(&self) -> QrClient {
        QrClient::from_options(&ServiceOptions {
            base_url: self.base_url(),
            timeout_secs: 5,
            ..ServiceOptions::default()
        })
        .expect("build client")
    }

    pub fn set_reply(&self, reply: Reply) {
        *self.reply.lock().unwrap() = reply;
    }

    pub fn requests(&self) -> Vec<String> {
        self.requests.lock().unwrap().clone()
    }
}

/// Address nothing is listening on
pub fn dead_addr() -> IoResult<SocketAddr> {
    let listener = StdTcpListener::bind("127.0.0.1:0")?;
    let addr = listener.local_addr()?;
    drop(listener);
    Ok(addr)
}

/// Small black-and-white PNG standing in for a rendered code
pub fn sample_png() -> Vec<u8> {
    let image = GrayImage::from_fn(8, 8, |x, y| {
        if (x + y) % 2 == 0 { Luma([0]) } else { Luma([255]) }
    });
    let mut out = Cursor::new(Vec::new());
    DynamicImage::ImageLuma8(image)
        .write_to(&mut out, ImageFormat::Png)
        .expect("encode png");
    out.into_inner()
}

/// Fresh directory under the system temp dir
pub fn scratch_dir(tag: &str) -> std::path::PathBuf {
    std::env::temp_dir().join(format!("qrgen-{tag}-{}", uuid::Uuid::new_v4()))
}
