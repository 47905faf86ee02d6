//! Retrying JSON GET client.

use std::sync::Arc;
use std::time::Duration;

use serde_json::Value;

use super::transport::{build_url, HttpResponse, HttpTransport};
use crate::retry::{classify_http_status, run_with_retry, ErrorKind, FetchError, RetryPolicy};

/// Sleep hook used between attempts; tests swap in a recorder.
pub type Sleeper = Arc<dyn Fn(Duration) + Send + Sync>;

/// Issues one GET, classifies the outcome, and retries per `RetryPolicy`.
///
/// Cheap to clone; clones share the transport.
#[derive(Clone)]
pub struct RetryingClient {
    transport: Arc<dyn HttpTransport>,
    policy: RetryPolicy,
    sleeper: Sleeper,
}

impl RetryingClient {
    pub fn new(transport: Arc<dyn HttpTransport>, policy: RetryPolicy) -> Self {
        Self {
            transport,
            policy,
            sleeper: Arc::new(std::thread::sleep),
        }
    }

    /// Replace the sleep hook.
    pub fn with_sleeper(mut self, sleeper: Sleeper) -> Self {
        self.sleeper = sleeper;
        self
    }

    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    /// GET `url` with query `params` and decode the body as JSON.
    pub fn call(&self, url: &str, params: &[(&str, String)]) -> Result<Value, FetchError> {
        self.call_with_headers(url, params, &[])
    }

    /// Like `call` with extra request headers (e.g. Authorization).
    ///
    /// An unparsable URL fails immediately; every other failure is retried
    /// until the policy's attempts are exhausted.
    pub fn call_with_headers(
        &self,
        url: &str,
        params: &[(&str, String)],
        headers: &[(String, String)],
    ) -> Result<Value, FetchError> {
        let full_url = build_url(url, params)?;
        run_with_retry(&self.policy, url, |d| (self.sleeper)(d), |_attempt| {
            let response = self.transport.get(&full_url, headers)?;
            decode(response)
        })
    }
}

/// Map a raw response to JSON or a classified failure.
fn decode(response: HttpResponse) -> Result<Value, FetchError> {
    if !response.is_success() {
        return Err(match classify_http_status(response.status) {
            ErrorKind::RateLimited => FetchError::RateLimited,
            _ => FetchError::Http(response.status),
        });
    }
    serde_json::from_slice(&response.body).map_err(|e| FetchError::MalformedResponse(e.to_string()))
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::collections::VecDeque;
    use std::sync::Mutex;

    /// Transport that replays a fixed script of outcomes and records URLs.
    pub(crate) struct ScriptedTransport {
        script: Mutex<VecDeque<Result<HttpResponse, FetchError>>>,
        pub(crate) seen: Mutex<Vec<String>>,
    }

    impl ScriptedTransport {
        pub(crate) fn new(script: Vec<Result<HttpResponse, FetchError>>) -> Self {
            Self {
                script: Mutex::new(script.into()),
                seen: Mutex::new(Vec::new()),
            }
        }
    }

    impl HttpTransport for ScriptedTransport {
        fn get(&self, url: &str, _headers: &[(String, String)]) -> Result<HttpResponse, FetchError> {
            self.seen.lock().unwrap().push(url.to_string());
            self.script
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or(Err(FetchError::Transport("script exhausted".into())))
        }
    }

    pub(crate) fn status(code: u16) -> Result<HttpResponse, FetchError> {
        Ok(HttpResponse { status: code, body: Vec::new() })
    }

    pub(crate) fn json(body: &str) -> Result<HttpResponse, FetchError> {
        Ok(HttpResponse { status: 200, body: body.as_bytes().to_vec() })
    }

    fn recording_client(
        transport: ScriptedTransport,
        max_attempts: u32,
    ) -> (RetryingClient, Arc<Mutex<Vec<Duration>>>) {
        let sleeps = Arc::new(Mutex::new(Vec::new()));
        let rec = Arc::clone(&sleeps);
        let policy = RetryPolicy {
            max_attempts,
            ..RetryPolicy::default()
        };
        let client = RetryingClient::new(Arc::new(transport), policy)
            .with_sleeper(Arc::new(move |d| rec.lock().unwrap().push(d)));
        (client, sleeps)
    }

    #[test]
    fn four_server_errors_then_success() {
        let transport = ScriptedTransport::new(vec![
            status(500),
            status(500),
            status(500),
            status(500),
            json(r#"{"data": {"ok": true}}"#),
        ]);
        let (client, sleeps) = recording_client(transport, 5);
        let value = client.call("http://api.test/x", &[]).unwrap();
        assert_eq!(value["data"]["ok"], Value::Bool(true));
        assert_eq!(*sleeps.lock().unwrap(), vec![Duration::from_secs(1); 4]);
    }

    #[test]
    fn rate_limited_until_exhausted() {
        let transport = ScriptedTransport::new(vec![status(429), status(429), status(429)]);
        let (client, sleeps) = recording_client(transport, 3);
        let err = client.call("http://api.test/x", &[]).unwrap_err();
        assert_eq!(err, FetchError::RateLimited);
        assert_eq!(*sleeps.lock().unwrap(), vec![Duration::from_secs(10); 2]);
    }

    #[test]
    fn malformed_body_is_retried() {
        let transport = ScriptedTransport::new(vec![json("<html>busy</html>"), json("[1, 2]")]);
        let (client, sleeps) = recording_client(transport, 5);
        let value = client.call("http://api.test/x", &[]).unwrap();
        assert_eq!(value, serde_json::json!([1, 2]));
        assert_eq!(sleeps.lock().unwrap().len(), 1);
    }

    #[test]
    fn mixed_failures_report_last_error() {
        let transport = ScriptedTransport::new(vec![
            Err(FetchError::Transport("connection reset".into())),
            status(429),
            status(404),
        ]);
        let (client, sleeps) = recording_client(transport, 3);
        let err = client.call("http://api.test/x", &[]).unwrap_err();
        assert_eq!(err, FetchError::Http(404));
        assert_eq!(
            *sleeps.lock().unwrap(),
            vec![Duration::from_secs(1), Duration::from_secs(10)]
        );
    }

    #[test]
    fn query_params_reach_transport() {
        let transport = Arc::new(ScriptedTransport::new(vec![json("{}")]));
        let client = RetryingClient::new(transport.clone(), RetryPolicy::default());
        client
            .call("http://api.test/data.json", &[("resource", "AS3333".to_string())])
            .unwrap();
        assert_eq!(
            transport.seen.lock().unwrap().as_slice(),
            ["http://api.test/data.json?resource=AS3333"]
        );
    }
}
