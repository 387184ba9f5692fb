//! In-memory [`Transport`] that replays canned bodies and records requests.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;
use url::Url;

use super::error::ClientError;
use super::transport::Transport;

#[derive(Default)]
struct Script {
    responses: VecDeque<String>,
    seen: Vec<Url>,
    cancel: Option<(usize, CancellationToken)>,
}

/// Scripted transport: answers calls in order, panics when out of script.
#[derive(Default)]
pub(crate) struct ScriptedTransport {
    script: Mutex<Script>,
}

#[allow(clippy::unwrap_used)]
impl ScriptedTransport {
    pub(crate) fn new<I, S>(responses: I) -> Arc<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let script = Script {
            responses: responses.into_iter().map(Into::into).collect(),
            ..Script::default()
        };
        Arc::new(Self {
            script: Mutex::new(script),
        })
    }

    /// Cancels `token` and stalls once `served` calls have been answered.
    pub(crate) fn cancel_after(&self, served: usize, token: CancellationToken) {
        self.script.lock().unwrap().cancel = Some((served, token));
    }

    /// Every URL requested so far, in order.
    pub(crate) fn urls(&self) -> Vec<String> {
        let script = self.script.lock().unwrap();
        script.seen.iter().map(ToString::to_string).collect()
    }

    /// The `method` query parameter of every request so far.
    pub(crate) fn methods(&self) -> Vec<String> {
        let script = self.script.lock().unwrap();
        script
            .seen
            .iter()
            .map(|url| {
                url.query_pairs()
                    .find(|(k, _)| k == "method")
                    .map(|(_, v)| v.into_owned())
                    .unwrap_or_default()
            })
            .collect()
    }
}

#[async_trait]
impl Transport for ScriptedTransport {
    #[allow(clippy::unwrap_used)]
    async fn get(
        &self,
        operation: &'static str,
        url: &Url,
        _timeout: Duration,
    ) -> Result<Vec<u8>, ClientError> {
        let stall = {
            let mut script = self.script.lock().unwrap();
            match &script.cancel {
                Some((served, token)) if script.seen.len() >= *served => {
                    token.cancel();
                    true
                }
                _ => {
                    script.seen.push(url.clone());
                    false
                }
            }
        };
        if stall {
            std::future::pending::<()>().await;
        }

        let body = self
            .script
            .lock()
            .unwrap()
            .responses
            .pop_front()
            .unwrap_or_else(|| panic!("unexpected {operation} request to {url}"));
        Ok(body.into_bytes())
    }
}
