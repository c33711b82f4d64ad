//! Postal code lookup against ViaCEP.
//!
//! `GET {base}/{cep}/json/` answers 200 for every well-formed CEP; unknown
//! codes come back as `{"erro": true}` (older deployments send the string
//! `"true"`).

use serde::Deserialize;
use thiserror::Error;
use tracing::instrument;
use url::Url;

use aprova_facil_core::{AddressLookup, Cep};

use crate::config::DEFAULT_REQUEST_TIMEOUT;

/// Errors that can occur when looking up a CEP.
#[derive(Debug, Error)]
pub enum CepError {
    /// The service does not know this CEP.
    #[error("CEP não encontrado")]
    NotFound,

    /// Transport failure or unexpected status. Worth retrying.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The body was not the expected JSON.
    #[error("Parse error: {0}")]
    Parse(String),
}

impl CepError {
    /// Message shown next to the CEP field.
    #[must_use]
    pub const fn user_message(&self) -> &'static str {
        match self {
            Self::NotFound => "CEP não encontrado",
            Self::Http(_) | Self::Parse(_) => "Erro ao buscar CEP. Tente novamente.",
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ViaCepResponse {
    cep: String,
    logradouro: String,
    complemento: String,
    bairro: String,
    localidade: String,
    uf: String,
    erro: Option<serde_json::Value>,
}

impl ViaCepResponse {
    fn is_not_found(&self) -> bool {
        match &self.erro {
            Some(serde_json::Value::Bool(flag)) => *flag,
            Some(serde_json::Value::String(s)) => s.eq_ignore_ascii_case("true"),
            _ => false,
        }
    }

    fn into_lookup(self, cep: &Cep) -> AddressLookup {
        AddressLookup {
            cep: if self.cep.is_empty() {
                cep.formatted()
            } else {
                self.cep
            },
            street: self.logradouro,
            complement: self.complemento,
            neighborhood: self.bairro,
            city: self.localidade,
            state: self.uf.to_uppercase(),
        }
    }
}

/// ViaCEP client.
#[derive(Clone)]
pub struct CepClient {
    client: reqwest::Client,
    base_url: Url,
}

impl CepClient {
    /// # Errors
    ///
    /// Returns error if the HTTP client fails to build.
    pub fn new(base_url: Url) -> Result<Self, CepError> {
        let client = reqwest::Client::builder()
            .timeout(DEFAULT_REQUEST_TIMEOUT)
            .build()?;
        Ok(Self { client, base_url })
    }

    fn endpoint(&self, cep: &Cep) -> String {
        format!(
            "{}/{}/json/",
            self.base_url.as_str().trim_end_matches('/'),
            cep.as_str()
        )
    }

    /// Look up the address for a CEP.
    ///
    /// # Errors
    ///
    /// Returns `CepError::NotFound` for unknown codes, `CepError::Http` for
    /// transport failures and non-success statuses, `CepError::Parse` for
    /// malformed bodies.
    #[instrument(skip(self), fields(cep = %cep.as_str()))]
    pub async fn lookup(&self, cep: &Cep) -> Result<AddressLookup, CepError> {
        let response = self
            .client
            .get(self.endpoint(cep))
            .send()
            .await?
            .error_for_status()?;
        let text = response.text().await?;

        let body: ViaCepResponse = serde_json::from_str(&text).map_err(|e| {
            tracing::warn!(error = %e, "Unexpected CEP lookup body");
            CepError::Parse(e.to_string())
        })?;

        if body.is_not_found() {
            tracing::debug!("CEP not found");
            return Err(CepError::NotFound);
        }

        Ok(body.into_lookup(cep))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use wiremock::matchers::{any, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn parse(json: &str) -> ViaCepResponse {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn test_erro_flag_variants() {
        assert!(parse(r#"{"erro": true}"#).is_not_found());
        assert!(parse(r#"{"erro": "true"}"#).is_not_found());
        assert!(!parse(r#"{"erro": false}"#).is_not_found());
        assert!(!parse(r#"{"cep": "01310-100"}"#).is_not_found());
    }

    #[test]
    fn test_into_lookup_maps_fields() {
        let cep = Cep::parse("01310100").unwrap();
        let lookup = parse(
            r#"{"cep": "01310-100", "logradouro": "Avenida Paulista",
                "complemento": "de 612 a 1510 - lado par", "bairro": "Bela Vista",
                "localidade": "São Paulo", "uf": "sp", "ibge": "3550308"}"#,
        )
        .into_lookup(&cep);

        assert_eq!(lookup.street, "Avenida Paulista");
        assert_eq!(lookup.neighborhood, "Bela Vista");
        assert_eq!(lookup.city, "São Paulo");
        assert_eq!(lookup.state, "SP");
        assert_eq!(lookup.complement, "de 612 a 1510 - lado par");
    }

    #[test]
    fn test_endpoint_format() {
        let client = CepClient::new(Url::parse("https://viacep.com.br/ws/").unwrap()).unwrap();
        let cep = Cep::parse("01310-100").unwrap();
        assert_eq!(
            client.endpoint(&cep),
            "https://viacep.com.br/ws/01310100/json/"
        );
    }

    fn client_for(server: &MockServer) -> CepClient {
        CepClient::new(server.uri().parse().unwrap()).unwrap()
    }

    #[tokio::test]
    async fn test_lookup_unknown_cep() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/99999999/json/"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(serde_json::json!({ "erro": true })),
            )
            .expect(1)
            .mount(&server)
            .await;

        let cep = Cep::parse("99999-999").unwrap();
        let err = client_for(&server).lookup(&cep).await.unwrap_err();
        assert!(matches!(err, CepError::NotFound));
    }

    #[tokio::test]
    async fn test_lookup_server_error_is_http() {
        let server = MockServer::start().await;
        Mock::given(any())
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let cep = Cep::parse("01310100").unwrap();
        let err = client_for(&server).lookup(&cep).await.unwrap_err();
        assert!(matches!(err, CepError::Http(_)));
    }

    #[test]
    fn test_user_messages() {
        assert_eq!(CepError::NotFound.user_message(), "CEP não encontrado");
        assert_eq!(
            CepError::Parse("x".to_string()).user_message(),
            "Erro ao buscar CEP. Tente novamente."
        );
    }
}
