//! Canned-response HTTP server for exercising the entropy client.

use std::io::{BufRead, BufReader, Write};
use std::net::{SocketAddr, TcpListener, TcpStream};
use std::sync::mpsc::{self, Receiver};
use std::thread;
use std::time::Duration;

/// A running mock provider; `requests` yields each request line seen.
pub struct MockProvider {
    pub addr: SocketAddr,
    pub requests: Receiver<String>,
}

impl MockProvider {
    pub fn url(&self) -> String {
        format!("http://{}/API/jsonI.php", self.addr)
    }
}

/// Answer every request with `status` and `body`.
pub fn start_mock_provider(status: u16, body: &'static str) -> MockProvider {
    start(move |mut socket| {
        let reason = match status {
            200 => "OK",
            404 => "Not Found",
            500 => "Internal Server Error",
            503 => "Service Unavailable",
            _ => "Unknown",
        };
        let response = format!(
            "HTTP/1.1 {} {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
            status,
            reason,
            body.len(),
            body
        );
        let _ = socket.write_all(response.as_bytes());
        let _ = socket.flush();
    })
}

/// Accept requests but never answer within `hold`.
pub fn start_stalled_provider(hold: Duration) -> MockProvider {
    start(move |_socket| thread::sleep(hold))
}

fn start<F>(respond: F) -> MockProvider
where
    F: Fn(TcpStream) + Send + Sync + Copy + 'static,
{
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    let (tx, rx) = mpsc::channel();

    thread::spawn(move || {
        for stream in listener.incoming() {
            let Ok(socket) = stream else { break };
            let tx = tx.clone();
            thread::spawn(move || {
                let mut reader = BufReader::new(socket.try_clone().unwrap());
                let mut request_line = String::new();
                let _ = reader.read_line(&mut request_line);
                // Drain headers so the client is not reset mid-write.
                loop {
                    let mut line = String::new();
                    match reader.read_line(&mut line) {
                        Ok(0) | Err(_) => break,
                        Ok(_) if line == "\r\n" => break,
                        Ok(_) => {}
                    }
                }
                let _ = tx.send(request_line.trim_end().to_string());
                respond(socket);
            });
        }
    });

    MockProvider { addr, requests: rx }
}
