//! # Client session
//!
//! Credentials and endpoints for the IAM, resource controller and admin
//! REST services, plus the HTTP implementation of [`EventStreamsApi`].

use std::env;
use std::fmt;
use std::fs::read_to_string;
use std::io::{Error as IoError, ErrorKind};
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use http::header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument};
use url::Url;

use crate::api::EventStreamsApi;
use crate::constants::{
    ADMIN_API_TOPIC_SELECTION, API_KEY_ENVS, CLI_CONFIG_FILE, CLI_CONFIG_PATH, CONFIG_PATH_ENV,
    DEFAULT_IAM_URL, DEFAULT_RESOURCE_CONTROLLER_URL, IAM_API_TOKEN, IAM_GRANT_TYPE_APIKEY,
    RC_API_INSTANCES,
};
use crate::htclient::{self, ResponseExt};
use crate::state::{InstanceDetails, MirroringTopicSelection};
use crate::{MirroringError, Result};

fn config_file_error(msg: &str, source: IoError) -> MirroringError {
    MirroringError::ConfigFile {
        msg: msg.to_owned(),
        source,
    }
}

#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionConfig {
    #[serde(default)]
    pub api_key: String,
    #[serde(default = "default_iam_url")]
    pub iam_url: String,
    #[serde(default = "default_resource_controller_url")]
    pub resource_controller_url: String,
}

fn default_iam_url() -> String {
    DEFAULT_IAM_URL.to_owned()
}

fn default_resource_controller_url() -> String {
    DEFAULT_RESOURCE_CONTROLLER_URL.to_owned()
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            iam_url: default_iam_url(),
            resource_controller_url: default_resource_controller_url(),
        }
    }
}

// keep the api key out of logs
impl fmt::Debug for SessionConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionConfig")
            .field("api_key", &if self.api_key.is_empty() { "" } else { "***" })
            .field("iam_url", &self.iam_url)
            .field("resource_controller_url", &self.resource_controller_url)
            .finish()
    }
}

impl SessionConfig {
    /// Load the config, precedence for the file is:
    /// 1) supplied path
    /// 2) environment variable ES_MIRRORING_CONFIG
    /// 3) home directory ~/.eventstreams/config
    ///
    /// A missing file at a default location gives the default config.
    /// The api key from IC_API_KEY or IBMCLOUD_API_KEY overrides the file.
    pub fn load(optional_path: Option<&Path>) -> Result<Self> {
        let mut config = match optional_path {
            Some(path) => Self::from_file(path)?,
            None => {
                let path = Self::default_file_path()
                    .map_err(|e| config_file_error("default path", e))?;
                if path.exists() {
                    Self::from_file(&path)?
                } else {
                    debug!(?path, "no config file, using defaults");
                    Self::default()
                }
            }
        };

        if let Some(api_key) = API_KEY_ENVS
            .iter()
            .find_map(|var| env::var(var).ok().filter(|v| !v.is_empty()))
        {
            config.api_key = api_key;
        }
        Ok(config)
    }

    pub fn from_file<T: AsRef<Path>>(path: T) -> Result<Self> {
        let path_ref = path.as_ref();
        debug!(?path_ref, "loading from");
        let file_str = read_to_string(path_ref)
            .map_err(|e| config_file_error(&format!("{:?}", path_ref.as_os_str()), e))?;
        toml::from_str(&file_str).map_err(|e| MirroringError::Toml {
            msg: path_ref.display().to_string(),
            source: e,
        })
    }

    fn default_file_path() -> std::result::Result<PathBuf, IoError> {
        env::var(CONFIG_PATH_ENV)
            .map(|p| Ok(PathBuf::from(p)))
            .unwrap_or_else(|_| {
                if let Some(mut path) = dirs::home_dir() {
                    path.push(CLI_CONFIG_PATH);
                    path.push(CLI_CONFIG_FILE);
                    Ok(path)
                } else {
                    Err(IoError::new(
                        ErrorKind::InvalidInput,
                        "can't get config directory",
                    ))
                }
            })
    }

    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = api_key.into();
        self
    }
}

#[derive(Deserialize)]
struct IamToken {
    access_token: String,
    #[serde(default)]
    token_type: Option<String>,
}

/// Authenticated session against the remote services.
///
/// The IAM token is fetched once in [`HttpSession::connect`], the session
/// is not mutated afterwards.
pub struct HttpSession {
    config: SessionConfig,
    authorization: String,
}

impl fmt::Debug for HttpSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HttpSession")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl HttpSession {
    #[instrument(skip(config), fields(iam = %config.iam_url))]
    pub async fn connect(config: SessionConfig) -> Result<Self> {
        if config.api_key.is_empty() {
            return Err(MirroringError::MissingApiKey);
        }

        let url = join_url(&config.iam_url, &[IAM_API_TOKEN])?;
        let form = url::form_urlencoded::Serializer::new(String::new())
            .append_pair("grant_type", IAM_GRANT_TYPE_APIKEY)
            .append_pair("apikey", &config.api_key)
            .finish();
        let req = http::Request::post(url.as_str())
            .header(CONTENT_TYPE, mime::APPLICATION_WWW_FORM_URLENCODED.as_ref())
            .header(ACCEPT, mime::APPLICATION_JSON.as_ref())
            .body(form)
            .map_err(|e| MirroringError::Auth(format!("request formatting error {e}")))?;

        let resp = htclient::send(req)
            .await
            .map_err(|e| MirroringError::Auth(format!("Failed to connect {e}")))?;
        let token: IamToken = match resp.error_for_status(url.as_str()) {
            Ok(resp) => resp.json()?,
            Err(MirroringError::Api {
                status, message, ..
            }) => return Err(MirroringError::Auth(format!("{status}: {message}"))),
            Err(err) => return Err(err),
        };
        info!("authenticated with IAM");

        Ok(Self {
            authorization: bearer(&token),
            config,
        })
    }

    /// session with an already issued authorization header
    #[cfg(test)]
    fn with_authorization(config: SessionConfig, authorization: &str) -> Self {
        Self {
            config,
            authorization: authorization.to_owned(),
        }
    }
}

fn bearer(token: &IamToken) -> String {
    let token_type = token.token_type.as_deref().unwrap_or("Bearer");
    format!("{token_type} {}", token.access_token)
}

/// Append path segments to a base url, each segment is percent encoded.
/// Segments containing `/` are split, a CRN must be passed through
/// [`instance_url`] instead.
fn join_url(base: &str, chunks: &[&str]) -> Result<Url> {
    let mut url = Url::parse(base)?;
    {
        let mut segments = url
            .path_segments_mut()
            .map_err(|_| url::ParseError::RelativeUrlWithCannotBeABaseBase)?;
        segments.pop_if_empty();
        for chunk in chunks {
            segments.extend(chunk.split('/'));
        }
    }
    Ok(url)
}

fn instance_url(resource_controller_url: &str, instance_id: &str) -> Result<Url> {
    let mut url = join_url(resource_controller_url, &[RC_API_INSTANCES])?;
    url.path_segments_mut()
        .map_err(|_| url::ParseError::RelativeUrlWithCannotBeABaseBase)?
        .push(instance_id);
    Ok(url)
}

fn topic_selection_url(admin_url: &str) -> Result<Url> {
    join_url(admin_url, &[ADMIN_API_TOPIC_SELECTION])
}

/// Parse a topic selection body, `null` or an empty body is an error.
fn parse_topic_selection(body: &[u8]) -> Result<MirroringTopicSelection> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Err(MirroringError::EmptyTopicSelection);
    }
    let selection: Option<MirroringTopicSelection> = serde_json::from_slice(body)?;
    selection.ok_or(MirroringError::EmptyTopicSelection)
}

#[async_trait]
impl EventStreamsApi for HttpSession {
    #[instrument(skip(self))]
    async fn instance_details(&self, instance_id: &str) -> Result<InstanceDetails> {
        let url = instance_url(&self.config.resource_controller_url, instance_id)?;
        let req = http::Request::get(url.as_str())
            .header(AUTHORIZATION, &self.authorization)
            .header(ACCEPT, mime::APPLICATION_JSON.as_ref())
            .body(Vec::new())
            .map_err(|e| MirroringError::Transport(format!("request formatting error {e}")))?;

        let resp = htclient::send(req).await?.error_for_status(url.as_str())?;
        let details: InstanceDetails = resp.json()?;
        debug!(crn = %details.crn, plan = %details.resource_plan_id, "instance details");
        Ok(details)
    }

    #[instrument(skip(self))]
    async fn topic_selection(&self, admin_url: &str) -> Result<MirroringTopicSelection> {
        let url = topic_selection_url(admin_url)?;
        let req = http::Request::get(url.as_str())
            .header(AUTHORIZATION, &self.authorization)
            .header(ACCEPT, mime::APPLICATION_JSON.as_ref())
            .body(Vec::new())
            .map_err(|e| MirroringError::Transport(format!("request formatting error {e}")))?;

        let resp = htclient::send(req).await?;
        let resp = match resp.error_for_status(url.as_str()) {
            Ok(resp) => resp,
            Err(err) => {
                debug!(%err, "get mirroring topic selection failed");
                return Err(err);
            }
        };
        parse_topic_selection(resp.body())
    }

    #[instrument(skip(self, selection), fields(patterns = selection.includes.len()))]
    async fn replace_topic_selection(
        &self,
        admin_url: &str,
        selection: &MirroringTopicSelection,
    ) -> Result<MirroringTopicSelection> {
        let url = topic_selection_url(admin_url)?;
        let body = serde_json::to_vec(selection)?;
        let req = http::Request::post(url.as_str())
            .header(AUTHORIZATION, &self.authorization)
            .header(CONTENT_TYPE, mime::APPLICATION_JSON.as_ref())
            .header(ACCEPT, mime::APPLICATION_JSON.as_ref())
            .body(body)
            .map_err(|e| MirroringError::Transport(format!("request formatting error {e}")))?;

        let resp = htclient::send(req).await?.error_for_status(url.as_str())?;
        // some deployments answer 202 with no body
        if resp.body().is_empty() {
            return Ok(selection.clone());
        }
        parse_topic_selection(resp.body())
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::io::{BufRead, BufReader, Read, Write};
    use std::net::TcpListener;
    use std::thread::{self, JoinHandle};

    use http::StatusCode;
    use serde_json::json;

    use super::*;

    /// what the loopback server saw of the one request it accepted
    struct Captured {
        request_line: String,
        headers: HashMap<String, String>,
        body: Vec<u8>,
    }

    /// Accept a single request on a loopback port and answer it with `status`
    /// and `response_body`. Returns the base url to point the session at.
    fn serve_once(status: &'static str, response_body: &'static str) -> (String, JoinHandle<Captured>) {
        let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
        let addr = listener.local_addr().expect("local addr");
        let handle = thread::spawn(move || {
            let (stream, _) = listener.accept().expect("accept");
            let mut reader = BufReader::new(stream);

            let mut request_line = String::new();
            reader.read_line(&mut request_line).expect("request line");
            let mut headers = HashMap::new();
            loop {
                let mut line = String::new();
                reader.read_line(&mut line).expect("header line");
                let line = line.trim_end();
                if line.is_empty() {
                    break;
                }
                if let Some((name, value)) = line.split_once(':') {
                    headers.insert(name.trim().to_ascii_lowercase(), value.trim().to_owned());
                }
            }
            let len: usize = headers
                .get("content-length")
                .and_then(|v| v.parse().ok())
                .unwrap_or_default();
            let mut body = vec![0; len];
            reader.read_exact(&mut body).expect("body");

            let mut stream = reader.into_inner();
            write!(
                stream,
                "HTTP/1.1 {status}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{response_body}",
                response_body.len()
            )
            .expect("write response");
            stream.flush().expect("flush");

            Captured {
                request_line: request_line.trim_end().to_owned(),
                headers,
                body,
            }
        });
        (format!("http://{addr}"), handle)
    }

    fn test_session(resource_controller_url: &str) -> HttpSession {
        let config = SessionConfig {
            resource_controller_url: resource_controller_url.to_owned(),
            ..Default::default()
        };
        HttpSession::with_authorization(config, "Bearer test-token")
    }

    #[test]
    fn test_instance_url_encodes_crn() {
        let url = instance_url(
            "https://resource-controller.cloud.ibm.com",
            "crn:v1:bluemix:public:messagehub:us-south:a/123:guid::",
        )
        .expect("url");
        assert_eq!(
            url.as_str(),
            "https://resource-controller.cloud.ibm.com/v2/resource_instances/crn:v1:bluemix:public:messagehub:us-south:a%2F123:guid::"
        );
    }

    #[test]
    fn test_topic_selection_url() {
        for base in ["https://admin.example.com", "https://admin.example.com/"] {
            assert_eq!(
                topic_selection_url(base).expect("url").as_str(),
                "https://admin.example.com/admin/mirroring/topic-selection"
            );
        }
        assert!(topic_selection_url("not a url").is_err());
    }

    #[test]
    fn test_parse_topic_selection() {
        let sel = parse_topic_selection(br#"{"includes":["a","b.*"]}"#).expect("parse");
        assert_eq!(sel.includes, vec!["a", "b.*"]);
        assert!(matches!(
            parse_topic_selection(b"null"),
            Err(MirroringError::EmptyTopicSelection)
        ));
        assert!(matches!(
            parse_topic_selection(b"  "),
            Err(MirroringError::EmptyTopicSelection)
        ));
        assert!(matches!(
            parse_topic_selection(b"{not json"),
            Err(MirroringError::Json(_))
        ));
    }

    #[test]
    fn test_config_from_file() {
        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        writeln!(
            file,
            r#"
api_key = "secret"
resource_controller_url = "https://rc.test"
"#
        )
        .expect("write");

        let config = SessionConfig::from_file(file.path()).expect("load");
        assert_eq!(config.api_key, "secret");
        assert_eq!(config.iam_url, DEFAULT_IAM_URL);
        assert_eq!(config.resource_controller_url, "https://rc.test");
        assert!(!format!("{config:?}").contains("secret"));
    }

    #[test]
    fn test_config_bad_file() {
        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        writeln!(file, "api_key = ").expect("write");
        assert!(matches!(
            SessionConfig::from_file(file.path()),
            Err(MirroringError::Toml { .. })
        ));
        assert!(matches!(
            SessionConfig::from_file("/does/not/exist/config"),
            Err(MirroringError::ConfigFile { .. })
        ));
    }

    #[fluvio_future::test]
    async fn test_connect_requires_api_key() {
        let result = HttpSession::connect(SessionConfig::default()).await;
        assert!(matches!(result, Err(MirroringError::MissingApiKey)));
    }

    #[test]
    fn test_bearer_header() {
        let token = IamToken {
            access_token: "abc".into(),
            token_type: None,
        };
        assert_eq!(bearer(&token), "Bearer abc");
    }

    #[fluvio_future::test]
    async fn test_replace_posts_selection() {
        let (admin_url, server) = serve_once("200 OK", r#"{"includes":["orders.*","audit"]}"#);
        let session = test_session("https://rc.invalid");
        let selection = MirroringTopicSelection::new(vec!["orders.*".into(), "audit".into()]);

        let applied = session
            .replace_topic_selection(&admin_url, &selection)
            .await
            .expect("replace");
        assert_eq!(applied, selection);

        let seen = server.join().expect("server");
        assert!(
            seen.request_line
                .starts_with("POST /admin/mirroring/topic-selection "),
            "{}",
            seen.request_line
        );
        assert_eq!(
            seen.headers.get("authorization").map(String::as_str),
            Some("Bearer test-token")
        );
        assert_eq!(
            seen.headers.get("content-type").map(String::as_str),
            Some("application/json")
        );
        let sent: serde_json::Value = serde_json::from_slice(&seen.body).expect("json body");
        assert_eq!(sent, json!({"includes": ["orders.*", "audit"]}));
    }

    #[fluvio_future::test]
    async fn test_replace_accepted_without_body() {
        let (admin_url, server) = serve_once("202 Accepted", "");
        let session = test_session("https://rc.invalid");
        let selection = MirroringTopicSelection::empty();

        let applied = session
            .replace_topic_selection(&admin_url, &selection)
            .await
            .expect("replace");
        assert_eq!(applied, selection);

        let seen = server.join().expect("server");
        let sent: serde_json::Value = serde_json::from_slice(&seen.body).expect("json body");
        assert_eq!(sent, json!({"includes": []}));
    }

    #[fluvio_future::test]
    async fn test_topic_selection_forbidden() {
        let (admin_url, server) = serve_once(
            "403 Forbidden",
            r#"{"errors":[{"code":"forbidden","message":"not authorized"}]}"#,
        );
        let session = test_session("https://rc.invalid");

        let err = session
            .topic_selection(&admin_url)
            .await
            .expect_err("forbidden");
        match err {
            MirroringError::Api {
                url,
                status,
                message,
            } => {
                assert_eq!(url, format!("{admin_url}/admin/mirroring/topic-selection"));
                assert_eq!(status, StatusCode::FORBIDDEN);
                assert_eq!(message, "not authorized");
            }
            other => panic!("unexpected error {other:?}"),
        }

        let seen = server.join().expect("server");
        assert!(
            seen.request_line
                .starts_with("GET /admin/mirroring/topic-selection "),
            "{}",
            seen.request_line
        );
        assert_eq!(
            seen.headers.get("authorization").map(String::as_str),
            Some("Bearer test-token")
        );
    }

    #[fluvio_future::test]
    async fn test_instance_details_lookup() {
        let (rc_url, server) = serve_once(
            "200 OK",
            r#"{"id":"crn:v1:bluemix:public:messagehub:us-south:a/123:guid::","crn":"crn:v1:bluemix:public:messagehub:us-south:a/123:guid::","resource_plan_id":"ibm.eventstreams.enterprise","extensions":{"kafka_http_url":"https://admin.example.com"}}"#,
        );
        let session = test_session(&rc_url);

        let details = session
            .instance_details("crn:v1:bluemix:public:messagehub:us-south:a/123:guid::")
            .await
            .expect("details");
        assert_eq!(details.admin_url().expect("admin url"), "https://admin.example.com");

        let seen = server.join().expect("server");
        assert_eq!(
            seen.request_line,
            "GET /v2/resource_instances/crn:v1:bluemix:public:messagehub:us-south:a%2F123:guid:: HTTP/1.1"
        );
        assert_eq!(
            seen.headers.get("authorization").map(String::as_str),
            Some("Bearer test-token")
        );
    }
}
