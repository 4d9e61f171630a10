//! CloudinaryTransport tests against a single-request local HTTP stub.

use std::sync::{Arc, Mutex};

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

use acadex_core::config::UploadConfig;
use acadex_upload::{
    CloudinaryTransport, FilePayload, TransportError, UploadRequest, UploadTransport,
};

fn find_subslice(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    haystack
        .windows(needle.len())
        .position(|window| window == needle)
}

/// Serve exactly one request: capture it fully, answer with the given status
/// line and JSON body, close the connection. Returns the endpoint URL and a
/// handle resolving to the raw captured request.
async fn one_shot_server(
    status_line: &'static str,
    body: &'static str,
) -> (String, JoinHandle<Vec<u8>>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let handle = tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await.unwrap();
        let mut captured = Vec::new();
        let mut chunk = [0u8; 4096];

        let header_end = loop {
            let n = socket.read(&mut chunk).await.unwrap();
            assert!(n > 0, "client closed before sending a full request");
            captured.extend_from_slice(&chunk[..n]);
            if let Some(pos) = find_subslice(&captured, b"\r\n\r\n") {
                break pos + 4;
            }
        };

        let headers = String::from_utf8_lossy(&captured[..header_end]).to_string();
        let content_length = headers
            .lines()
            .find_map(|line| {
                let (name, value) = line.split_once(':')?;
                name.eq_ignore_ascii_case("content-length")
                    .then(|| value.trim().parse::<usize>().ok())
                    .flatten()
            })
            .expect("multipart request must carry a Content-Length");

        while captured.len() < header_end + content_length {
            let n = socket.read(&mut chunk).await.unwrap();
            if n == 0 {
                break;
            }
            captured.extend_from_slice(&chunk[..n]);
        }

        let response = format!(
            "HTTP/1.1 {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
            status_line,
            body.len(),
            body
        );
        socket.write_all(response.as_bytes()).await.unwrap();
        socket.shutdown().await.ok();
        captured
    });
    (format!("http://{}/upload", addr), handle)
}

fn config_for(upload_url: String) -> UploadConfig {
    UploadConfig {
        cloud_name: "testcloud".to_string(),
        upload_preset: "unsigned".to_string(),
        folder: "acadex-notes".to_string(),
        upload_url,
    }
}

fn request(file: &FilePayload) -> UploadRequest<'_> {
    UploadRequest {
        file,
        upload_preset: "unsigned",
        cloud_name: "testcloud",
        folder: "acadex-notes",
    }
}

#[tokio::test]
async fn success_response_maps_to_asset() {
    let (url, server) = one_shot_server(
        "200 OK",
        r#"{"secure_url":"https://res.test/w1.pdf","original_filename":"w1","public_id":"acadex-notes/w1","resource_type":"raw","format":"pdf","bytes":11}"#,
    )
    .await;
    let transport = CloudinaryTransport::new(&config_for(url));
    let file = FilePayload::from_bytes("w1.pdf", &b"hello world"[..], "application/pdf", 7);

    let reported: Arc<Mutex<Vec<(u64, u64)>>> = Arc::new(Mutex::new(Vec::new()));
    let sink = reported.clone();
    let asset = transport
        .upload(
            request(&file),
            Arc::new(move |sent, total| sink.lock().unwrap().push((sent, total))),
        )
        .await
        .unwrap();

    assert_eq!(asset.secure_url, "https://res.test/w1.pdf");
    assert_eq!(asset.public_id, "acadex-notes/w1");
    assert_eq!(asset.bytes, 11);
    // The response omitted the folder, so the requested one is echoed back.
    assert_eq!(asset.folder.as_deref(), Some("acadex-notes"));
    assert!(asset.relative_path.is_none());

    let reported = reported.lock().unwrap();
    assert_eq!(reported.last(), Some(&(11, 11)));

    let captured = server.await.unwrap();
    let text = String::from_utf8_lossy(&captured);
    assert!(text.contains("name=\"upload_preset\""));
    assert!(text.contains("unsigned"));
    assert!(text.contains("name=\"cloud_name\""));
    assert!(text.contains("name=\"folder\""));
    assert!(text.contains("filename=\"w1.pdf\""));
    assert!(find_subslice(&captured, b"hello world").is_some());
}

#[tokio::test]
async fn failure_response_surfaces_specific_detail() {
    let (url, server) =
        one_shot_server("400 Bad Request", r#"{"error":{"message":"invalid format"}}"#).await;
    let transport = CloudinaryTransport::new(&config_for(url));
    let file = FilePayload::from_bytes("bad.xyz", &b"junk"[..], "application/pdf", 7);

    let err = transport
        .upload(request(&file), Arc::new(|_, _| {}))
        .await
        .unwrap_err();

    assert!(matches!(err, TransportError::Endpoint(_)));
    assert_eq!(err.to_string(), "invalid format");
    server.await.unwrap();
}

#[tokio::test]
async fn malformed_success_body_is_an_error() {
    let (url, server) = one_shot_server("200 OK", r#"{"unexpected":true}"#).await;
    let transport = CloudinaryTransport::new(&config_for(url));
    let file = FilePayload::from_bytes("w1.pdf", &b"hello"[..], "application/pdf", 7);

    let err = transport
        .upload(request(&file), Arc::new(|_, _| {}))
        .await
        .unwrap_err();

    assert!(matches!(err, TransportError::MalformedResponse(_)));
    server.await.unwrap();
}

#[tokio::test]
async fn unreachable_endpoint_is_a_network_error() {
    // Bind then drop to get a port with nothing listening.
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let url = format!("http://{}/upload", listener.local_addr().unwrap());
    drop(listener);

    let transport = CloudinaryTransport::new(&config_for(url));
    let file = FilePayload::from_bytes("w1.pdf", &b"hello"[..], "application/pdf", 7);

    let err = transport
        .upload(request(&file), Arc::new(|_, _| {}))
        .await
        .unwrap_err();
    assert!(matches!(err, TransportError::Network(_)));
}
