use std::fs;
use std::path::PathBuf;

use chrono::Utc;
use reqwest::blocking::Client;
use reqwest::header::{ACCEPT, CONTENT_TYPE};
use tracing::{debug, info};

use crate::error::ReportError;
use crate::xml::{self, XmlNode};

pub const DEFAULT_URL: &str = "https://www.tukino.org/assets/snow.txt";

/// Where the report document comes from.
#[derive(Debug)]
pub enum Source {
    Remote { client: Client, url: String },
    File(PathBuf),
}

impl Source {
    pub fn remote(url: impl Into<String>) -> Result<Self, ReportError> {
        let client = Client::builder()
            .user_agent(concat!("skireport/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self::Remote {
            client,
            url: url.into(),
        })
    }

    /// Fetch or read the report and parse it. Every call starts from
    /// scratch; nothing is kept between loads.
    pub fn load(&self) -> Result<XmlNode, ReportError> {
        match self {
            Source::Remote { client, url } => load(client, url),
            Source::File(path) => load_file(path.clone()),
        }
    }
}

/// GET the report, bypassing caches with a `_=<millis>` query parameter.
///
/// The body is parsed as XML whatever content type the server declares.
pub fn load(client: &Client, url: &str) -> Result<XmlNode, ReportError> {
    let stamp = Utc::now().timestamp_millis();
    info!(url, "fetching snow report");

    let response = client
        .get(url)
        .query(&[("_", stamp)])
        .header(ACCEPT, "text/xml")
        .send()?
        .error_for_status()?;
    debug!(
        status = %response.status(),
        content_type = ?response.headers().get(CONTENT_TYPE),
        "snow report received"
    );

    let body = response.bytes()?;
    Ok(xml::parse(&body)?)
}

pub fn load_file(path: PathBuf) -> Result<XmlNode, ReportError> {
    info!(path = %path.display(), "reading snow report");
    let body = fs::read(&path).map_err(|source| ReportError::Io { path, source })?;
    Ok(xml::parse(&body)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{BufRead, BufReader, Write};
    use std::net::TcpListener;
    use std::thread::{self, JoinHandle};

    const REPORT: &str = "<report><skiarea><road><brief>Open</brief></road></skiarea></report>";

    /// Answer one request with `status` and `body`, handing back the request
    /// head the client sent.
    fn serve_once(status: &str, content_type: &str, body: &str) -> (String, JoinHandle<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let url = format!("http://{}/snow.txt", listener.local_addr().unwrap());
        let response = format!(
            "HTTP/1.1 {status}\r\nContent-Type: {content_type}\r\n\
             Content-Length: {}\r\nConnection: close\r\n\r\n{body}",
            body.len()
        );
        let handle = thread::spawn(move || {
            let (mut stream, _) = listener.accept().unwrap();
            let mut reader = BufReader::new(stream.try_clone().unwrap());
            let mut head = String::new();
            loop {
                let mut line = String::new();
                if reader.read_line(&mut line).unwrap() == 0 || line == "\r\n" {
                    break;
                }
                head.push_str(&line);
            }
            stream.write_all(response.as_bytes()).unwrap();
            head
        });
        (url, handle)
    }

    fn client() -> Client {
        Client::builder().no_proxy().build().unwrap()
    }

    #[test]
    fn fetch_sends_cache_buster_and_accept() {
        let (url, server) = serve_once("200 OK", "text/xml", REPORT);
        load(&client(), &url).unwrap();
        let head = server.join().unwrap();

        let request_line = head.lines().next().unwrap();
        let query = request_line
            .strip_prefix("GET /snow.txt?_=")
            .and_then(|rest| rest.strip_suffix(" HTTP/1.1"))
            .unwrap();
        assert!(!query.is_empty() && query.chars().all(|c| c.is_ascii_digit()));
        assert!(head.to_ascii_lowercase().contains("accept: text/xml"));
    }

    #[test]
    fn plain_text_body_is_parsed_as_xml() {
        let (url, server) = serve_once("200 OK", "text/plain", REPORT);
        let document = load(&client(), &url).unwrap();
        server.join().unwrap();
        assert_eq!(document.tag, "report");
        assert_eq!(
            document.first_by_tag("brief").and_then(XmlNode::text),
            Some("Open")
        );
    }

    #[test]
    fn not_found_is_fetch_error() {
        let (url, server) = serve_once("404 Not Found", "text/html", "missing");
        let err = load(&client(), &url).unwrap_err();
        server.join().unwrap();
        assert!(matches!(err, ReportError::Fetch(_)));
        assert!(err.to_string().contains("404"));
    }

    #[test]
    fn file_source_parses_report() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "<report><skiarea><information>Hi</information></skiarea></report>").unwrap();
        let document = Source::File(file.path().to_path_buf()).load().unwrap();
        assert_eq!(document.tag, "report");
        assert!(document.first_by_tag("information").is_some());
    }

    #[test]
    fn missing_file_is_io_error() {
        let err = load_file(PathBuf::from("/nonexistent/snow.txt")).unwrap_err();
        assert!(matches!(err, ReportError::Io { .. }));
        assert!(err.to_string().contains("/nonexistent/snow.txt"));
    }

    #[test]
    fn unreachable_host_is_fetch_error() {
        let source = Source::remote("http://127.0.0.1:9/snow.txt").unwrap();
        assert!(matches!(source.load(), Err(ReportError::Fetch(_))));
    }
}
