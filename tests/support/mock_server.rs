use std::{
    collections::HashMap,
    io::{BufRead, BufReader, Read, Write},
    net::TcpListener,
    thread::{self, JoinHandle},
};

/// Represents the request received by the mock server.
#[derive(Debug)]
pub struct CapturedRequest {
    /// Represents the request line, for example
    /// `POST /v2/accounts/acc/messages HTTP/1.1`.
    pub request_line: String,
    /// Represents the headers, names lowercased.
    pub headers: HashMap<String, String>,
    pub body: String,
}

impl CapturedRequest {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(&name.to_lowercase()).map(String::as_str)
    }
}

/// Represents an HTTP server answering exactly one request.
pub struct MockServer {
    url: String,
    handle: JoinHandle<CapturedRequest>,
}

impl MockServer {
    pub fn respond(status: u16, body: &str) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let url = format!("http://{}", listener.local_addr().unwrap());
        let body = body.to_owned();

        let handle = thread::spawn(move || {
            let (mut stream, _) = listener.accept().unwrap();
            let mut reader = BufReader::new(stream.try_clone().unwrap());

            let mut request_line = String::new();
            reader.read_line(&mut request_line).unwrap();

            let mut headers = HashMap::new();
            loop {
                let mut line = String::new();
                reader.read_line(&mut line).unwrap();
                let line = line.trim_end();
                if line.is_empty() {
                    break;
                }
                if let Some((name, value)) = line.split_once(':') {
                    headers.insert(name.trim().to_lowercase(), value.trim().to_owned());
                }
            }

            let len = headers
                .get("content-length")
                .and_then(|len| len.parse().ok())
                .unwrap_or(0);
            let mut req_body = vec![0; len];
            reader.read_exact(&mut req_body).unwrap();

            let res = format!(
                "HTTP/1.1 {} Mock\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                status,
                body.len(),
                body
            );
            stream.write_all(res.as_bytes()).unwrap();
            stream.flush().unwrap();

            CapturedRequest {
                request_line: request_line.trim_end().to_owned(),
                headers,
                body: String::from_utf8(req_body).unwrap(),
            }
        });

        Self { url, handle }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// Waits for the request to be served and returns it.
    pub fn request(self) -> CapturedRequest {
        self.handle.join().unwrap()
    }
}

/// Returns the URL of a local port nobody listens on.
pub fn refused_url() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let url = format!("http://{}", listener.local_addr().unwrap());
    drop(listener);
    url
}
