//! Minimal Resource Manager stand-in for CLI tests.
//!
//! Answers every request on a background thread, one connection per request,
//! routing on the request path the way the catalog paths are built.

use std::io::{Read, Write};
use std::net::TcpListener;
use std::thread;

const OFFERS: &str = r#"[
    {"name": "sql2017-ws2016", "location": "eastus"},
    {"name": "sql2019-byol-ws2019", "location": "eastus"},
    {"name": "sql2019-ws2019", "location": "eastus"}
]"#;

const SKUS: &str = r#"[{"name": "enterprise"}, {"name": "standard"}]"#;

const VERSIONS: &str = r#"[{"name": "15.0.220510"}]"#;

const SIZES: &str = r#"{"value": [
    {
        "resourceType": "virtualMachines",
        "name": "Standard_D2s_v3",
        "capabilities": [
            {"name": "MaxResourceVolumeMB", "value": "16384"},
            {"name": "vCPUs", "value": "2"},
            {"name": "MemoryGB", "value": "8"},
            {"name": "MaxDataDiskCount", "value": "4"}
        ]
    },
    {"resourceType": "disks", "name": "Premium_LRS"}
]}"#;

fn route(target: &str) -> Option<&'static str> {
    let path = target.split('?').next().unwrap_or(target);
    if path.ends_with("/providers/Microsoft.Compute/skus") {
        Some(SIZES)
    } else if path.ends_with("/versions") {
        Some(VERSIONS)
    } else if path.ends_with("/skus") {
        Some(SKUS)
    } else if path.ends_with("/offers") {
        Some(OFFERS)
    } else {
        None
    }
}

/// Starts the server and returns its base URL.
pub fn start() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();

    thread::spawn(move || {
        for stream in listener.incoming() {
            let Ok(mut stream) = stream else { continue };
            let mut buf = [0u8; 8192];
            let n = stream.read(&mut buf).unwrap_or(0);
            let request = String::from_utf8_lossy(&buf[..n]);
            let target = request.split_whitespace().nth(1).unwrap_or("/");

            let response = match route(target) {
                Some(body) => format!(
                    "HTTP/1.1 200 OK\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
                    body.len()
                ),
                None => "HTTP/1.1 404 Not Found\r\nContent-Length: 0\r\nConnection: close\r\n\r\n"
                    .to_string(),
            };
            let _ = stream.write_all(response.as_bytes());
        }
    });

    format!("http://{addr}")
}
