// Copyright (c) 2025 Sean McNamara <smcnam@gmail.com>
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Backend activation.
//!
//! A `Configurator` owns the single active backend slot for a session.
//! Activation validates preconditions first and only then replaces the slot,
//! so a failed attempt leaves any earlier backend in place.

use std::env;

use crate::anthropic::RemoteBackend;
use crate::backend::{BackendConfig, BackendKind, GenerationBackend};
use crate::catalog;
use crate::constants::{
    ANTHROPIC_API_BASE, ANTHROPIC_API_KEY_VAR, ANTHROPIC_BASE_URL_VAR, DEFAULT_REMOTE_MODEL,
};
use crate::error::ActivationError;
use crate::ollama::LocalBackend;
use crate::prober::Prober;

pub struct Configurator {
    prober: Prober,
    credential_var: String,
    remote_base_url: String,
    active: Option<Box<dyn GenerationBackend>>,
}

impl Configurator {
    pub fn new(prober: Prober) -> Self {
        let remote_base_url = env::var(ANTHROPIC_BASE_URL_VAR)
            .ok()
            .filter(|url| !url.trim().is_empty())
            .unwrap_or_else(|| ANTHROPIC_API_BASE.to_string());

        Self {
            prober,
            credential_var: ANTHROPIC_API_KEY_VAR.to_string(),
            remote_base_url,
            active: None,
        }
    }

    /// Read the remote credential from a different environment variable
    pub fn with_credential_var(mut self, var: &str) -> Self {
        self.credential_var = var.to_string();
        self
    }

    pub fn with_remote_base_url(mut self, url: &str) -> Self {
        self.remote_base_url = url.to_string();
        self
    }

    pub fn prober(&self) -> &Prober {
        &self.prober
    }

    pub fn active(&self) -> Option<&dyn GenerationBackend> {
        self.active.as_deref()
    }

    pub fn active_config(&self) -> Option<&BackendConfig> {
        self.active.as_ref().map(|backend| backend.config())
    }

    pub fn activate(
        &mut self,
        kind: BackendKind,
        model_name: Option<&str>,
        max_tokens: u32,
    ) -> Result<BackendConfig, ActivationError> {
        match kind {
            BackendKind::Remote => {
                let model = non_empty(model_name).unwrap_or(DEFAULT_REMOTE_MODEL);
                self.activate_remote(model, max_tokens)
            }
            BackendKind::Local => self.activate_local(model_name, max_tokens),
        }
    }

    /// Install the remote provider. Fails without touching the network when
    /// the credential variable is unset or blank.
    pub fn activate_remote(
        &mut self,
        model_name: &str,
        max_tokens: u32,
    ) -> Result<BackendConfig, ActivationError> {
        let api_key = env::var(&self.credential_var)
            .ok()
            .filter(|key| !key.trim().is_empty())
            .ok_or_else(|| ActivationError::MissingCredential {
                var: self.credential_var.clone(),
            })?;

        let model = non_empty(Some(model_name)).unwrap_or(DEFAULT_REMOTE_MODEL);
        let config = BackendConfig::remote(model, max_tokens);
        let backend = RemoteBackend::new(config.clone(), api_key, &self.remote_base_url)?;

        self.active = Some(Box::new(backend));
        Ok(config)
    }

    /// Install the local model server, auto-selecting a model when none is given.
    /// Never tries to start the server.
    pub fn activate_local(
        &mut self,
        model_name: Option<&str>,
        max_tokens: u32,
    ) -> Result<BackendConfig, ActivationError> {
        let endpoint = self.prober.endpoint().to_string();

        if !self.prober.is_server_reachable() {
            return Err(ActivationError::ServerUnreachable { endpoint });
        }

        let model = match non_empty(model_name) {
            Some(model) => model.to_string(),
            None => self
                .prober
                .select_best_model()
                .ok_or_else(|| ActivationError::NoModelAvailable {
                    endpoint: endpoint.clone(),
                    install_hints: catalog::install_hints(),
                })?,
        };

        let config = BackendConfig::local(&model, max_tokens, &endpoint);
        let backend = LocalBackend::new(config.clone(), self.prober.client().clone());

        self.active = Some(Box::new(backend));
        Ok(config)
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const UNSET_VAR: &str = "CTXSYNTH_TEST_CREDENTIAL_THAT_IS_NEVER_SET";

    // Nothing listens on the discard port, so any request would fail fast
    const DEAD_ENDPOINT: &str = "http://127.0.0.1:9/api";

    #[test]
    fn test_remote_without_credential_fails() {
        let prober = Prober::new(DEAD_ENDPOINT).unwrap();
        let mut configurator = Configurator::new(prober).with_credential_var(UNSET_VAR);

        for _ in 0..3 {
            match configurator.activate_remote("claude-3-sonnet-20240229", 4000) {
                Err(ActivationError::MissingCredential { var }) => assert_eq!(var, UNSET_VAR),
                other => panic!("expected MissingCredential, got {:?}", other.map(|c| c.model_name)),
            }
        }
        assert!(configurator.active().is_none());
    }

    #[test]
    fn test_local_with_dead_server_is_unreachable() {
        let prober = Prober::new(DEAD_ENDPOINT).unwrap();
        let mut configurator = Configurator::new(prober);

        let result = configurator.activate_local(Some("qwen3:8b"), 4000);
        assert!(matches!(result, Err(ActivationError::ServerUnreachable { .. })));
        assert!(configurator.active_config().is_none());
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_failed_activation_keeps_previous_backend() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/tags"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"models": []})))
            .up_to_n_times(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/api/tags"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let endpoint = format!("{}/api", server.uri());
        let (first, second, remote, active) = tokio::task::spawn_blocking(move || {
            let prober = Prober::new(&endpoint).unwrap();
            let mut configurator = Configurator::new(prober).with_credential_var(UNSET_VAR);

            let first = configurator.activate_local(Some("qwen3:8b"), 2048);
            let second = configurator.activate_local(Some("opencoder:8b"), 4000);
            let remote = configurator.activate_remote("claude-3-sonnet-20240229", 4000);
            (first, second, remote, configurator.active_config().cloned())
        })
        .await
        .unwrap();

        let first = first.unwrap();
        assert_eq!(first.model_name, "qwen3:8b");
        assert_eq!(first.max_tokens, 2048);
        assert!(matches!(second, Err(ActivationError::ServerUnreachable { .. })));
        assert!(matches!(remote, Err(ActivationError::MissingCredential { .. })));
        assert_eq!(active, Some(first));
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_no_installed_models_reports_install_hints() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/tags"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"models": []})))
            .mount(&server)
            .await;

        let endpoint = format!("{}/api", server.uri());
        let result = tokio::task::spawn_blocking(move || {
            let prober = Prober::new(&endpoint).unwrap();
            let mut configurator = Configurator::new(prober);
            let result = configurator.activate_local(None, 4000);
            assert!(configurator.active().is_none());
            result
        })
        .await
        .unwrap();

        match result {
            Err(ActivationError::NoModelAvailable { install_hints, .. }) => {
                assert_eq!(install_hints.len(), catalog::all().len());
            }
            other => panic!("expected NoModelAvailable, got {:?}", other.map(|c| c.model_name)),
        }
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_local_auto_selects_catalog_model() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/tags"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "models": [{"name": "tinyllama"}, {"name": "llama3:8b-instruct-q4_0"}]
            })))
            .mount(&server)
            .await;

        let endpoint = format!("{}/api", server.uri());
        let expected_endpoint = endpoint.clone();
        let config = tokio::task::spawn_blocking(move || {
            let prober = Prober::new(&endpoint).unwrap();
            Configurator::new(prober).activate(BackendKind::Local, None, 4000)
        })
        .await
        .unwrap()
        .unwrap();

        assert_eq!(config.kind, BackendKind::Local);
        assert_eq!(config.model_name, "llama3:8b-instruct-q4_0");
        assert_eq!(config.endpoint, Some(expected_endpoint));
    }
}
