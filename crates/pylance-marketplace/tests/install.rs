//! End-to-end install tests against a local stub gallery.

use pylance_core::{ExtensionId, ExtensionVersion, PackageName};
use pylance_marketplace::{
    InstallError, InstallState, MarketplaceEndpoint, ResourceSpec, ServerResource, VSIX_FILE,
};
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;

const SERVER_BINARY: &str = "extension/dist/server.bundle.js";

fn spec(storage_root: &Path) -> ResourceSpec {
    ResourceSpec {
        package_name: PackageName::new("LSP-pylance"),
        extension_id: ExtensionId::parse("ms-python.vscode-pylance").unwrap(),
        extension_version: ExtensionVersion::new("2021.1.4"),
        server_binary_path: PathBuf::from(SERVER_BINARY),
        storage_root: storage_root.to_path_buf(),
        resource_source: None,
        resource_dirs: vec![],
    }
}

/// Builds a minimal `.vsix` (ZIP) containing the expected server bundle.
fn sample_vsix() -> Vec<u8> {
    let mut writer = zip::ZipWriter::new(std::io::Cursor::new(Vec::new()));
    let options = zip::write::SimpleFileOptions::default();

    writer.start_file(SERVER_BINARY, options).unwrap();
    writer.write_all(b"// pylance server bundle").unwrap();
    writer.start_file("extension/package.json", options).unwrap();
    writer.write_all(b"{\"name\": \"vscode-pylance\"}").unwrap();

    writer.finish().unwrap().into_inner()
}

fn gzip(payload: &[u8]) -> Vec<u8> {
    let mut encoder =
        flate2::write::GzEncoder::new(Vec::new(), flate2::Compression::default());
    encoder.write_all(payload).unwrap();
    encoder.finish().unwrap()
}

fn http_response(status_line: &str, extra_headers: &[(&str, &str)], body: &[u8]) -> Vec<u8> {
    let mut out = format!("HTTP/1.1 {status_line}\r\n").into_bytes();
    for (name, value) in extra_headers {
        out.extend_from_slice(format!("{name}: {value}\r\n").as_bytes());
    }
    out.extend_from_slice(format!("Content-Length: {}\r\n", body.len()).as_bytes());
    out.extend_from_slice(b"Connection: close\r\n\r\n");
    out.extend_from_slice(body);
    out
}

/// Serves exactly one canned HTTP response, returning the base URL.
async fn serve_once(response: Vec<u8>) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await.unwrap();

        let mut request = Vec::new();
        let mut buf = [0u8; 1024];
        loop {
            let n = socket.read(&mut buf).await.unwrap();
            if n == 0 {
                break;
            }
            request.extend_from_slice(&buf[..n]);
            if request.windows(4).any(|w| w == b"\r\n\r\n") {
                break;
            }
        }

        socket.write_all(&response).await.unwrap();
        let _ = socket.shutdown().await;
    });

    format!("http://{addr}")
}

#[tokio::test]
async fn install_succeeds_with_valid_archive() {
    let temp = TempDir::new().unwrap();
    let vsix = sample_vsix();
    let base = serve_once(http_response("200 OK", &[], &vsix)).await;

    let resource =
        ServerResource::with_endpoint(spec(temp.path()), MarketplaceEndpoint::new(base)).unwrap();

    assert!(resource.needs_installation());
    resource.install_or_update().await.unwrap();

    assert!(resource.ready());
    assert_eq!(resource.state(), InstallState::Ready);
    assert!(resource.binary_path().is_file());
    assert!(resource.server_directory().join(VSIX_FILE).is_file());
}

#[tokio::test]
async fn install_strips_gzip_transport_envelope() {
    let temp = TempDir::new().unwrap();
    let body = gzip(&sample_vsix());
    let base = serve_once(http_response(
        "200 OK",
        &[("Content-Encoding", "gzip")],
        &body,
    ))
    .await;

    let resource =
        ServerResource::with_endpoint(spec(temp.path()), MarketplaceEndpoint::new(base)).unwrap();
    resource.install_or_update().await.unwrap();

    assert!(resource.ready());
    assert_eq!(
        std::fs::read(resource.binary_path()).unwrap(),
        b"// pylance server bundle"
    );
}

#[tokio::test]
async fn http_404_is_a_terminal_error() {
    let temp = TempDir::new().unwrap();
    let base = serve_once(http_response("404 Not Found", &[], b"")).await;

    let resource =
        ServerResource::with_endpoint(spec(temp.path()), MarketplaceEndpoint::new(base)).unwrap();

    let error = resource.install_or_update().await.unwrap_err();
    assert!(matches!(error, InstallError::Http { status: 404 }));

    // terminal: error state recorded with the package prefix, binary absent
    assert!(!resource.ready());
    let message = resource.error_message().unwrap();
    assert!(message.starts_with("LSP-pylance:"), "{message}");
    assert!(!resource.binary_path().exists());
}

#[tokio::test]
async fn truncated_download_is_a_terminal_error() {
    let temp = TempDir::new().unwrap();
    let vsix = sample_vsix();

    // declare more bytes than are sent, then close the connection; the
    // shortfall is detected either by the HTTP client or by the byte-count
    // check against Content-Length
    let mut response = format!(
        "HTTP/1.1 200 OK\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
        vsix.len() + 512
    )
    .into_bytes();
    response.extend_from_slice(&vsix);
    let base = serve_once(response).await;

    let resource =
        ServerResource::with_endpoint(spec(temp.path()), MarketplaceEndpoint::new(base)).unwrap();

    let error = resource.install_or_update().await.unwrap_err();
    assert!(
        matches!(
            error,
            InstallError::Incomplete { .. } | InstallError::Network(_)
        ),
        "{error}"
    );

    assert!(!resource.ready());
    let message = resource.error_message().unwrap();
    assert!(message.starts_with("LSP-pylance:"), "{message}");
    assert!(!resource.binary_path().exists());
}

#[tokio::test]
async fn archive_without_binary_fails_verification() {
    let temp = TempDir::new().unwrap();

    let mut writer = zip::ZipWriter::new(std::io::Cursor::new(Vec::new()));
    let options = zip::write::SimpleFileOptions::default();
    writer.start_file("extension/readme.md", options).unwrap();
    writer.write_all(b"no server here").unwrap();
    let bogus = writer.finish().unwrap().into_inner();

    let base = serve_once(http_response("200 OK", &[], &bogus)).await;
    let resource =
        ServerResource::with_endpoint(spec(temp.path()), MarketplaceEndpoint::new(base)).unwrap();

    let error = resource.install_or_update().await.unwrap_err();
    assert!(matches!(error, InstallError::Verification { .. }));
    assert!(!resource.ready());
}

#[tokio::test]
async fn resource_dirs_are_copied_before_the_download() {
    let temp = TempDir::new().unwrap();
    let source = temp.path().join("package-source");
    std::fs::create_dir_all(source.join("_resources/typings")).unwrap();
    std::fs::write(source.join("_resources/typings/stub.pyi"), "x: int").unwrap();

    let mut spec = spec(temp.path());
    spec.resource_source = Some(source);
    spec.resource_dirs = vec!["_resources".to_string()];

    // the download fails, but the resource dirs must already be in place
    let base = serve_once(http_response("404 Not Found", &[], b"")).await;
    let resource =
        ServerResource::with_endpoint(spec, MarketplaceEndpoint::new(base)).unwrap();
    resource.install_or_update().await.unwrap_err();

    assert!(
        resource
            .server_directory()
            .join("_resources/typings/stub.pyi")
            .is_file()
    );
}

#[tokio::test]
async fn preinstalled_binary_needs_no_network() {
    let temp = TempDir::new().unwrap();
    // unroutable endpoint: any network attempt would error loudly
    let resource = ServerResource::with_endpoint(
        spec(temp.path()),
        MarketplaceEndpoint::new("http://127.0.0.1:1"),
    )
    .unwrap();

    let binary = resource.binary_path();
    std::fs::create_dir_all(binary.parent().unwrap()).unwrap();
    std::fs::write(&binary, "// bundle").unwrap();

    assert!(!resource.needs_installation());
    assert!(resource.ready());
}

#[tokio::test]
async fn background_install_reports_through_state() {
    let temp = TempDir::new().unwrap();
    let vsix = sample_vsix();
    let base = serve_once(http_response("200 OK", &[], &vsix)).await;

    let resource = std::sync::Arc::new(
        ServerResource::with_endpoint(spec(temp.path()), MarketplaceEndpoint::new(base)).unwrap(),
    );

    let handle = resource.install_in_background();
    handle.await.unwrap();

    assert!(resource.ready());
    assert!(resource.binary_path().is_file());
}
