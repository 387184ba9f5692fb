//! Request URL construction for Download Station endpoints.
//!
//! Endpoints are described by `%s` templates. The first placeholder is always
//! the API origin; the remaining placeholders are filled, in order, with
//! percent-escaped operation arguments. Authenticated requests get
//! `&_sid=<token>` appended once the template is fully substituted.

use std::fmt;

use url::Url;

use super::error::ClientError;

const PLACEHOLDER: &str = "%s";

/// A named endpoint template.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Endpoint {
    /// Operation name used in logs and errors.
    pub name: &'static str,
    /// `%s` template; the first placeholder is the origin.
    pub template: &'static str,
}

/// `SYNO.API.Auth` login, taking `account` and `passwd`.
pub const LOGIN: Endpoint = Endpoint {
    name: "login",
    template: "%s/webapi/entry.cgi?api=SYNO.API.Auth&version=6&method=login&account=%s&passwd=%s&session=DownloadStation&format=sid",
};

/// Task listing with transfer statistics.
pub const LIST_TASKS: Endpoint = Endpoint {
    name: "tasks",
    template: "%s/webapi/DownloadStation/task.cgi?api=SYNO.DownloadStation.Task&version=1&method=list&additional=transfer",
};

/// Task creation from a URL or magnet link, taking `uri`.
pub const CREATE_TASK: Endpoint = Endpoint {
    name: "create task",
    template: "%s/webapi/DownloadStation/task.cgi?api=SYNO.DownloadStation.Task&version=1&method=create&uri=%s",
};

/// Task pause, taking `id`.
pub const PAUSE_TASK: Endpoint = Endpoint {
    name: "pause task",
    template: "%s/webapi/DownloadStation/task.cgi?api=SYNO.DownloadStation.Task&version=1&method=pause&id=%s",
};

/// Task resume, taking `id`.
pub const RESUME_TASK: Endpoint = Endpoint {
    name: "resume task",
    template: "%s/webapi/DownloadStation/task.cgi?api=SYNO.DownloadStation.Task&version=1&method=resume&id=%s",
};

/// Task delete, taking `id`.
pub const DELETE_TASK: Endpoint = Endpoint {
    name: "delete task",
    template: "%s/webapi/DownloadStation/task.cgi?api=SYNO.DownloadStation.Task&version=1&method=delete&id=%s",
};

/// Scheme and authority of the remote API, e.g. `https://nas.local:5001`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiOrigin(String);

impl ApiOrigin {
    /// Parses a bare `host[:port]` (using `default_scheme`) or a full origin.
    ///
    /// # Errors
    ///
    /// Returns a description of the problem when the value is empty, is not a
    /// valid URL, has no host, or carries a path, query or fragment.
    pub fn parse(value: &str, default_scheme: &str) -> Result<Self, String> {
        let value = value.trim();
        if value.is_empty() {
            return Err("host is empty".to_string());
        }

        let candidate = if value.contains("://") {
            value.to_string()
        } else {
            format!("{default_scheme}://{value}")
        };

        let url = Url::parse(&candidate).map_err(|e| format!("invalid host '{value}': {e}"))?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(format!("unsupported scheme '{}'", url.scheme()));
        }
        if url.host_str().is_none_or(str::is_empty) {
            return Err(format!("host '{value}' has no hostname"));
        }
        if url.path() != "/" || url.query().is_some() || url.fragment().is_some() {
            return Err(format!("host '{value}' must not contain a path or query"));
        }

        Ok(Self(url.as_str().trim_end_matches('/').to_string()))
    }

    /// The origin as written into request URLs.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ApiOrigin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Builds the URL for an unauthenticated call.
///
/// # Errors
///
/// Returns [`ClientError::InvalidRequest`] when the argument count does not
/// match the template or the result is not a valid URL.
pub fn build(origin: &ApiOrigin, endpoint: Endpoint, args: &[&str]) -> Result<Url, ClientError> {
    let substituted = substitute(origin, endpoint, args)?;
    parse(endpoint, &substituted)
}

/// Builds the URL for an authenticated call, appending the session id last.
///
/// # Errors
///
/// Same as [`build`].
pub fn build_authenticated(
    origin: &ApiOrigin,
    endpoint: Endpoint,
    args: &[&str],
    sid: &str,
) -> Result<Url, ClientError> {
    let mut substituted = substitute(origin, endpoint, args)?;
    substituted.push_str("&_sid=");
    substituted.push_str(&urlencoding::encode(sid));
    parse(endpoint, &substituted)
}

fn substitute(origin: &ApiOrigin, endpoint: Endpoint, args: &[&str]) -> Result<String, ClientError> {
    let mut pieces = endpoint.template.split(PLACEHOLDER);
    let head = pieces.next().unwrap_or_default();
    let rest: Vec<&str> = pieces.collect();

    let Some((after_origin, tail)) = rest.split_first() else {
        return Err(ClientError::invalid_request(
            endpoint.name,
            "template has no host placeholder",
        ));
    };
    if tail.len() != args.len() {
        return Err(ClientError::invalid_request(
            endpoint.name,
            format!(
                "template expects {} argument(s), got {}",
                tail.len(),
                args.len()
            ),
        ));
    }

    let mut url = String::with_capacity(endpoint.template.len() + origin.as_str().len());
    url.push_str(head);
    url.push_str(origin.as_str());
    url.push_str(after_origin);
    for (arg, piece) in args.iter().zip(tail) {
        url.push_str(&urlencoding::encode(arg));
        url.push_str(piece);
    }
    Ok(url)
}

fn parse(endpoint: Endpoint, url: &str) -> Result<Url, ClientError> {
    Url::parse(url).map_err(|e| ClientError::invalid_request(endpoint.name, e.to_string()))
}

/// Returns the URL with secrets (`_sid`, `passwd`) masked, for logging.
#[must_use]
pub fn redacted(url: &Url) -> String {
    let Some(query) = url.query() else {
        return url.to_string();
    };

    let masked: Vec<String> = query
        .split('&')
        .map(|pair| match pair.split_once('=') {
            Some((key @ ("_sid" | "passwd"), _)) => format!("{key}=***"),
            _ => pair.to_string(),
        })
        .collect();

    let mut out = url.clone();
    out.set_query(Some(&masked.join("&")));
    out.to_string()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    const EXPECTED_LOGIN_URL: &str = "/webapi/entry.cgi?api=SYNO.API.Auth&version=6&method=login&account=user&passwd=pass&session=DownloadStation&format=sid";
    const EXPECTED_TASKS_URL: &str = "/webapi/DownloadStation/task.cgi?api=SYNO.DownloadStation.Task&version=1&method=list&additional=transfer&_sid=SID";
    const EXPECTED_DELETE_TASK_URL: &str = "/webapi/DownloadStation/task.cgi?api=SYNO.DownloadStation.Task&version=1&method=delete&id=ID1&_sid=SID";

    fn origin() -> ApiOrigin {
        ApiOrigin::parse("nas.local:5001", "https").unwrap()
    }

    fn request_uri(url: &Url) -> String {
        format!("{}?{}", url.path(), url.query().unwrap_or_default())
    }

    #[test]
    fn test_origin_from_bare_host_uses_default_scheme() {
        assert_eq!(origin().as_str(), "https://nas.local:5001");
    }

    #[test]
    fn test_origin_accepts_full_origin_and_strips_trailing_slash() {
        let origin = ApiOrigin::parse("http://127.0.0.1:8080/", "https").unwrap();
        assert_eq!(origin.to_string(), "http://127.0.0.1:8080");
    }

    #[test]
    fn test_origin_rejects_paths_and_bad_schemes() {
        assert!(ApiOrigin::parse("", "https").is_err());
        assert!(ApiOrigin::parse("https://nas.local/webapi", "https").is_err());
        assert!(ApiOrigin::parse("ftp://nas.local", "https").is_err());
        assert!(ApiOrigin::parse("nas.local?x=1", "https").is_err());
    }

    #[test]
    fn test_build_login_url() {
        let url = build(&origin(), LOGIN, &["user", "pass"]).unwrap();
        assert_eq!(url.host_str(), Some("nas.local"));
        assert_eq!(url.port(), Some(5001));
        assert_eq!(request_uri(&url), EXPECTED_LOGIN_URL);
    }

    #[test]
    fn test_build_authenticated_appends_sid_last() {
        let url = build_authenticated(&origin(), LIST_TASKS, &[], "SID").unwrap();
        assert_eq!(request_uri(&url), EXPECTED_TASKS_URL);
        assert!(url.as_str().ends_with("&_sid=SID"));

        let url = build_authenticated(&origin(), DELETE_TASK, &["ID1"], "SID").unwrap();
        assert_eq!(request_uri(&url), EXPECTED_DELETE_TASK_URL);
    }

    #[test]
    fn test_build_escapes_reserved_characters_once() {
        let url = build(&origin(), LOGIN, &["john doe", "p&ss=w0rd%"]).unwrap();
        let query = url.query().unwrap();
        assert!(query.contains("account=john%20doe"), "query: {query}");
        assert!(query.contains("passwd=p%26ss%3Dw0rd%25"), "query: {query}");
        assert_eq!(query.matches("passwd=").count(), 1);
    }

    #[test]
    fn test_credentials_round_trip_through_query() {
        let user = "a&b=c d";
        let pass = "x y&z==?#/";
        let url = build(&origin(), LOGIN, &[user, pass]).unwrap();

        let pairs: Vec<(String, String)> = url.query_pairs().into_owned().collect();
        let account = pairs.iter().find(|(k, _)| k == "account").unwrap();
        let passwd = pairs.iter().find(|(k, _)| k == "passwd").unwrap();
        assert_eq!(account.1, user);
        assert_eq!(passwd.1, pass);
        assert_eq!(pairs.iter().filter(|(k, _)| k == "account").count(), 1);
    }

    #[test]
    fn test_create_task_escapes_full_url_argument() {
        let uri = "https://example.com/file.iso?token=a&b=c";
        let url = build_authenticated(&origin(), CREATE_TASK, &[uri], "SID").unwrap();

        let pairs: Vec<(String, String)> = url.query_pairs().into_owned().collect();
        let uri_param = pairs.iter().find(|(k, _)| k == "uri").unwrap();
        assert_eq!(uri_param.1, uri);
        assert!(!pairs.iter().any(|(k, _)| k == "b"), "argument leaked into query");
        assert_eq!(pairs.last().unwrap(), &("_sid".to_string(), "SID".to_string()));
    }

    #[test]
    fn test_create_task_keeps_magnet_link_intact() {
        let magnet = "magnet:?xt=urn:btih:abc123&dn=Some Name";
        let url = build_authenticated(&origin(), CREATE_TASK, &[magnet], "SID").unwrap();
        let uri_param = url
            .query_pairs()
            .find(|(k, _)| k == "uri")
            .map(|(_, v)| v.into_owned())
            .unwrap();
        assert_eq!(uri_param, magnet);
    }

    #[test]
    fn test_host_only_template_needs_no_arguments() {
        let endpoint = Endpoint {
            name: "test request",
            template: "%s/test-request",
        };
        let url = build(&origin(), endpoint, &[]).unwrap();
        assert_eq!(url.as_str(), "https://nas.local:5001/test-request");
    }

    #[test]
    fn test_argument_count_mismatch_is_rejected() {
        let err = build(&origin(), LOGIN, &["only-user"]).unwrap_err();
        assert!(matches!(err, ClientError::InvalidRequest { operation: "login", .. }));

        let err = build(&origin(), LIST_TASKS, &["extra"]).unwrap_err();
        assert!(matches!(err, ClientError::InvalidRequest { .. }));
    }

    #[test]
    fn test_template_without_host_placeholder_is_rejected() {
        let endpoint = Endpoint {
            name: "broken",
            template: "https://nas.local/x",
        };
        assert!(build(&origin(), endpoint, &[]).is_err());
    }

    #[test]
    fn test_sid_is_escaped_exactly_once() {
        let url = build_authenticated(&origin(), LIST_TASKS, &[], "a b").unwrap();
        assert!(url.as_str().ends_with("&_sid=a%20b"), "url: {url}");
    }

    #[test]
    fn test_redacted_masks_secrets() {
        let url = build_authenticated(&origin(), LIST_TASKS, &[], "SECRET").unwrap();
        let logged = redacted(&url);
        assert!(!logged.contains("SECRET"));
        assert!(logged.ends_with("_sid=***"));

        let url = build(&origin(), LOGIN, &["user", "hunter2"]).unwrap();
        let logged = redacted(&url);
        assert!(!logged.contains("hunter2"));
        assert!(logged.contains("account=user"));
    }
}
