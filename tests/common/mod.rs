//! Shared fixtures for integration tests.
#![allow(dead_code)]

use std::io::Write as _;
use std::path::Path;
use tempfile::TempDir;
use tokio::io::{AsyncReadExt as _, AsyncWriteExt as _};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

/// A checkout with assets/, a built web bundle and a release binary.
pub fn game_project() -> TempDir {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path();
    write(root, "assets/FiraSans-Regular.ttf", b"font");
    write(root, "assets/BlueEther.mp3", b"menu music");
    write(root, "assets/sfx/move.wav", b"move");
    write(root, "pkg/dynamaze.js", b"export default init;");
    write(root, "pkg/dynamaze_bg.wasm", b"\0asm");
    write(root, "index.html", b"<script type=module src=pkg/dynamaze.js></script>");
    write(root, "target/release/dynamaze", b"\x7fELF");
    dir
}

pub fn write(root: &Path, rel: &str, contents: &[u8]) {
    let path = root.join(rel);
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    std::fs::write(path, contents).unwrap();
}

/// Sorted top-level names inside `dir`
pub fn top_level(dir: &Path) -> Vec<String> {
    let mut names: Vec<String> = std::fs::read_dir(dir)
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();
    names
}

/// Zip holding a shell-script butler that appends its arguments to
/// `butler.log` next to itself. `push` exits with `push_exit`.
pub fn fake_butler_zip(push_exit: i32) -> Vec<u8> {
    let script = format!(
        "#!/bin/sh\n\
         echo \"$@\" >> \"$(dirname \"$0\")/butler.log\"\n\
         if [ \"$1\" = push ]; then exit {push_exit}; fi\n\
         echo 'v15.24.0, built on Jan 01 2024' >&2\n\
         exit 0\n"
    );
    zip_archive(&[("butler", script.as_bytes()), ("7z.so", b"not really a library")])
}

pub fn zip_archive(files: &[(&str, &[u8])]) -> Vec<u8> {
    let mut writer = zip::ZipWriter::new(std::io::Cursor::new(Vec::new()));
    let options = zip::write::SimpleFileOptions::default().unix_permissions(0o644);
    for (name, contents) in files {
        writer.start_file(*name, options).unwrap();
        writer.write_all(contents).unwrap();
    }
    writer.finish().unwrap().into_inner()
}

/// Serve a single HTTP response on localhost.
///
/// Returns a butler URL template pointing at the listener and a handle
/// resolving to the request line that was received.
pub async fn serve_once(status: &'static str, body: Vec<u8>) -> (String, JoinHandle<String>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let handle = tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await.unwrap();
        let mut request = Vec::new();
        let mut buf = [0u8; 1024];
        while !request.windows(4).any(|w| w == b"\r\n\r\n") {
            let n = socket.read(&mut buf).await.unwrap();
            if n == 0 {
                break;
            }
            request.extend_from_slice(&buf[..n]);
        }

        let header = format!(
            "HTTP/1.1 {status}\r\nContent-Type: application/zip\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
            body.len()
        );
        socket.write_all(header.as_bytes()).await.unwrap();
        socket.write_all(&body).await.unwrap();
        socket.shutdown().await.unwrap();

        String::from_utf8_lossy(&request)
            .lines()
            .next()
            .unwrap_or_default()
            .to_string()
    });

    (
        format!("http://{addr}/butler/{{platform}}-amd64/LATEST/archive/default"),
        handle,
    )
}

/// Lines the fake butler logged, or nothing if it never ran
pub fn butler_log(tool_dir: &Path) -> Vec<String> {
    std::fs::read_to_string(tool_dir.join("butler.log"))
        .map(|s| s.lines().map(str::to_string).collect())
        .unwrap_or_default()
}
