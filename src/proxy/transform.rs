//! Chat payload transformation.
//!
//! Pure rewrites applied before forwarding: model alias resolution, system
//! directive injection, and provider-label resolution. No I/O here; the
//! forwarder sends whatever this module returns.

use std::collections::HashMap;

use serde_json::Value;

use crate::config::ModelCatalog;

/// Provider label when nothing resolves one.
pub const PROVIDER_PASSTHROUGH: &str = "passthrough";

/// Rewrites chat payloads according to the configured model catalogue.
pub struct RequestTransformer {
    /// alias → upstream model identifier.
    aliases: HashMap<String, String>,
    /// alias → provider label.
    providers: HashMap<String, String>,
    system_directive: String,
}

impl RequestTransformer {
    pub fn new(catalog: &ModelCatalog) -> Self {
        let mut aliases = HashMap::new();
        let mut providers = HashMap::new();
        for entry in &catalog.aliases {
            aliases.insert(entry.alias.clone(), entry.upstream.clone());
            if let Some(ref provider) = entry.provider {
                providers.insert(entry.alias.clone(), provider.clone());
            }
        }
        Self {
            aliases,
            providers,
            system_directive: catalog.system_directive.clone(),
        }
    }

    /// Rewrite a chat-completion payload for the upstream.
    ///
    /// Unknown model names pass through unchanged. The system directive is
    /// prepended only when `messages` is non-empty and carries no system
    /// entry already; an empty `messages` array is left alone. The
    /// `provider` hint is metadata for this proxy and is stripped.
    pub fn transform(&self, mut payload: Value) -> Value {
        if let Some(model) = payload.get("model").and_then(Value::as_str) {
            if let Some(upstream) = self.aliases.get(model) {
                payload["model"] = Value::String(upstream.clone());
            }
        }

        if let Some(messages) = payload.get_mut("messages").and_then(Value::as_array_mut) {
            let has_system = messages
                .iter()
                .any(|msg| msg.get("role").and_then(Value::as_str) == Some("system"));
            if !messages.is_empty() && !has_system {
                messages.insert(
                    0,
                    serde_json::json!({
                        "role": "system",
                        "content": self.system_directive,
                    }),
                );
            }
        }

        if let Some(map) = payload.as_object_mut() {
            map.remove("provider");
        }

        payload
    }

    /// Resolve the provider label for observability.
    ///
    /// Preference order: explicit `provider` field in the payload, the
    /// `X-Client-Provider` header, the catalogue's per-alias mapping, then
    /// the passthrough sentinel. The label is response metadata only.
    pub fn resolve_provider(&self, payload: &Value, header: Option<&str>) -> String {
        if let Some(provider) = payload.get("provider").and_then(Value::as_str) {
            if !provider.is_empty() {
                return provider.to_string();
            }
        }
        if let Some(provider) = header {
            if !provider.is_empty() {
                return provider.to_string();
            }
        }
        if let Some(model) = payload.get("model").and_then(Value::as_str) {
            if let Some(provider) = self.providers.get(model) {
                return provider.clone();
            }
        }
        PROVIDER_PASSTHROUGH.to_string()
    }
}
