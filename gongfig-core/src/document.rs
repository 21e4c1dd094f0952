use crate::certificate::Certificate;
use crate::consumer::Consumer;
use crate::error::SyncError;
use crate::plugin::Plugin;
use crate::service::Service;
use crate::upstream::Upstream;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// The nested, human-editable configuration snapshot.
///
/// Top-level keys are the catalog collection paths. Routes live under their
/// service, targets under their upstream and the key-auth credential on its
/// consumer.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ConfigDocument {
    #[serde(default)]
    pub certificates: Vec<Certificate>,
    #[serde(default)]
    pub consumers: Vec<Consumer>,
    #[serde(default)]
    pub plugins: Vec<Plugin>,
    #[serde(default)]
    pub services: Vec<Service>,
    #[serde(default)]
    pub upstreams: Vec<Upstream>,
}

impl ConfigDocument {
    /// Number of routes across all services.
    pub fn route_count(&self) -> usize {
        self.services.iter().map(|s| s.routes.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.certificates.is_empty()
            && self.consumers.is_empty()
            && self.plugins.is_empty()
            && self.services.is_empty()
            && self.upstreams.is_empty()
    }
}

/// On-disk encoding of a [`ConfigDocument`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentFormat {
    Json,
    Yaml,
}

impl DocumentFormat {
    /// `.yml` / `.yaml` files are YAML, everything else is JSON.
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("yml") || ext.eq_ignore_ascii_case("yaml") => {
                DocumentFormat::Yaml
            }
            _ => DocumentFormat::Json,
        }
    }

    /// JSON is indented with four spaces.
    pub fn encode(self, doc: &ConfigDocument) -> Result<Vec<u8>, SyncError> {
        match self {
            DocumentFormat::Json => {
                let mut out = Vec::new();
                let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
                let mut ser = serde_json::Serializer::with_formatter(&mut out, formatter);
                doc.serialize(&mut ser)?;
                out.push(b'\n');
                Ok(out)
            }
            DocumentFormat::Yaml => Ok(serde_yaml::to_string(doc)?.into_bytes()),
        }
    }

    pub fn decode(self, bytes: &[u8]) -> Result<ConfigDocument, SyncError> {
        match self {
            DocumentFormat::Json => Ok(serde_json::from_slice(bytes)?),
            DocumentFormat::Yaml => Ok(serde_yaml::from_slice(bytes)?),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::route::Route;

    fn sample() -> ConfigDocument {
        ConfigDocument {
            services: vec![Service {
                id: "s1".into(),
                name: Some("mail".into()),
                host: "mail.internal".into(),
                port: 80,
                protocol: "http".into(),
                routes: vec![Route {
                    id: "r1".into(),
                    paths: Some(vec!["/mail".into()]),
                    ..Default::default()
                }],
                ..Default::default()
            }],
            consumers: vec![Consumer {
                id: "c1".into(),
                username: Some("bob".into()),
                key: Some("k1".into()),
                ..Default::default()
            }],
            ..Default::default()
        }
    }

    #[test]
    fn json_uses_four_space_indent_and_sorted_keys() {
        let text = String::from_utf8(DocumentFormat::Json.encode(&sample()).unwrap()).unwrap();
        assert!(text.starts_with("{\n    \"certificates\": []"));
        let consumers = text.find("\"consumers\"").unwrap();
        let services = text.find("\"services\"").unwrap();
        let upstreams = text.find("\"upstreams\"").unwrap();
        assert!(consumers < services && services < upstreams);
    }

    #[test]
    fn json_and_yaml_decode_to_the_same_document() {
        let doc = sample();
        for format in [DocumentFormat::Json, DocumentFormat::Yaml] {
            let bytes = format.encode(&doc).unwrap();
            assert_eq!(format.decode(&bytes).unwrap(), doc, "{format:?}");
        }
    }

    #[test]
    fn missing_keys_mean_no_resources() {
        let doc = DocumentFormat::Json.decode(br#"{"services": []}"#).unwrap();
        assert!(doc.is_empty());
    }

    #[test]
    fn format_follows_extension() {
        assert_eq!(DocumentFormat::from_path(Path::new("kong.yml")), DocumentFormat::Yaml);
        assert_eq!(DocumentFormat::from_path(Path::new("kong.YAML")), DocumentFormat::Yaml);
        assert_eq!(DocumentFormat::from_path(Path::new("kong.json")), DocumentFormat::Json);
        assert_eq!(DocumentFormat::from_path(Path::new("kong")), DocumentFormat::Json);
    }

    #[test]
    fn corrupt_file_is_an_error() {
        assert!(DocumentFormat::Json.decode(b"{not json").is_err());
        assert!(DocumentFormat::Json.decode(br#"{"services": [{"port": "x"}]}"#).is_err());
    }
}
