use serde::Deserialize;
use serde_json::{Map, Value};
use std::collections::HashMap;

/// HTTP verbs that count as operations inside a path item
pub const HTTP_METHODS: [&str; 8] = [
    "get", "put", "post", "delete", "options", "head", "patch", "trace",
];

/// One parsed input document, read-only after load
#[derive(Debug, Clone)]
pub struct SpecDocument {
    /// Filename within the input directory, unique per run
    pub filename: String,
    pub servers: Vec<Server>,
    pub info: Info,
    /// Operations in document order: paths first, then methods within a path
    pub operations: Vec<OperationEntry>,
    pub security_schemes: HashMap<String, SecurityScheme>,
}

impl SpecDocument {
    /// Filename without its `.json` / `.yaml` / `.yml` extension
    pub fn stem(&self) -> &str {
        super::load::strip_document_extension(&self.filename)
    }

    /// Non-empty `info.version`, if declared
    pub fn version(&self) -> Option<&str> {
        self.info
            .version
            .as_deref()
            .map(str::trim)
            .filter(|v| !v.is_empty())
    }
}

#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
pub struct Server {
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub description: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Info {
    #[serde(default)]
    pub title: Option<String>,
    /// Unquoted YAML versions (`version: 1.0`) arrive as numbers
    #[serde(default, deserialize_with = "version_text")]
    pub version: Option<String>,
}

fn version_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Ok(match Option::<Value>::deserialize(deserializer)? {
        Some(Value::String(s)) => Some(s),
        Some(Value::Number(n)) => Some(n.to_string()),
        _ => None,
    })
}

/// A single (path, method) pair
#[derive(Debug, Clone)]
pub struct OperationEntry {
    pub path: String,
    /// Lowercase method key as written in the document
    pub method: String,
    pub operation: Operation,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Operation {
    #[serde(rename = "operationId", default)]
    pub operation_id: Option<String>,
    #[serde(default)]
    pub security: Option<Vec<SecurityRequirement>>,
    #[serde(default)]
    pub parameters: Option<Vec<Parameter>>,
}

impl Operation {
    pub fn header_parameters(&self) -> impl Iterator<Item = &str> {
        self.parameters
            .iter()
            .flatten()
            .filter(|p| p.location == Some(ParameterLocation::Header))
            .filter_map(|p| p.name.as_deref())
    }
}

/// `{schemeName: [scopes]}` map, keys kept in document order
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(transparent)]
pub struct SecurityRequirement(pub Map<String, Value>);

impl SecurityRequirement {
    pub fn scheme_names(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Parameter {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(rename = "in", default)]
    pub location: Option<ParameterLocation>,
    /// `$ref` parameters are not resolved and never contribute headers
    #[serde(rename = "$ref", default)]
    pub reference: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParameterLocation {
    Path,
    Query,
    Header,
    Cookie,
}

impl std::fmt::Display for ParameterLocation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ParameterLocation::Path => write!(f, "path"),
            ParameterLocation::Query => write!(f, "query"),
            ParameterLocation::Header => write!(f, "header"),
            ParameterLocation::Cookie => write!(f, "cookie"),
        }
    }
}

/// Security scheme declared under `components.securitySchemes`
///
/// Types the generator cannot map to a header deserialize as
/// [`SecurityScheme::Unsupported`] rather than failing the load.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "type")]
pub enum SecurityScheme {
    #[serde(rename = "http")]
    Http {
        #[serde(default)]
        scheme: Option<String>,
        #[serde(rename = "bearerFormat", default)]
        bearer_format: Option<String>,
    },
    #[serde(rename = "apiKey")]
    ApiKey {
        name: String,
        #[serde(rename = "in")]
        location: ApiKeyLocation,
    },
    #[serde(rename = "oauth2")]
    OAuth2 {
        #[serde(default)]
        flows: OAuthFlows,
    },
    #[serde(rename = "openIdConnect")]
    OpenIdConnect {
        #[serde(rename = "openIdConnectUrl", default)]
        open_id_connect_url: Option<String>,
    },
    #[serde(other)]
    Unsupported,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ApiKeyLocation {
    Header,
    Query,
    Cookie,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct OAuthFlows {
    #[serde(default)]
    pub implicit: Option<Value>,
    #[serde(default)]
    pub password: Option<Value>,
    #[serde(rename = "clientCredentials", default)]
    pub client_credentials: Option<Value>,
    #[serde(rename = "authorizationCode", default)]
    pub authorization_code: Option<Value>,
}
