use crate::error::FetchError;
use crate::facility::{Facility, parse_snapshot};
use shared::SourceKind;
use std::future::Future;
use std::time::Duration;
use tracing::{debug, instrument};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(20);

/// Produces the latest raw facility snapshot.
pub trait FacilitySource: Send + Sync + 'static {
    fn fetch(&self) -> impl Future<Output = Result<Vec<Facility>, FetchError>> + Send;
}

#[derive(Debug, Clone)]
pub struct HttpSource {
    client: reqwest::Client,
    url: String,
    kind: SourceKind,
}

impl HttpSource {
    pub fn new(url: impl Into<String>, kind: SourceKind) -> Result<Self, FetchError> {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()?;
        Ok(Self::with_client(client, url, kind))
    }

    pub fn with_client(client: reqwest::Client, url: impl Into<String>, kind: SourceKind) -> Self {
        Self {
            client,
            url: url.into(),
            kind,
        }
    }

    pub fn kind(&self) -> SourceKind {
        self.kind
    }
}

impl FacilitySource for HttpSource {
    #[instrument(skip(self), fields(url = %self.url, kind = %self.kind))]
    async fn fetch(&self) -> Result<Vec<Facility>, FetchError> {
        let resp = self.client.get(&self.url).send().await?;
        let status = resp.status();
        if !status.is_success() {
            return Err(FetchError::Status(status.as_u16()));
        }

        let body = resp.text().await?;
        let facilities = parse_snapshot(self.kind, &body)?;
        debug!(name: "source.fetch.parsed", count = facilities.len(), "parsed facility snapshot");
        Ok(facilities)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ParseError;
    use axum::Router;
    use axum::http::StatusCode;
    use axum::routing::get;
    use tokio::net::TcpListener;

    const STATIONS: &str = r#"{"velos":[
        {"nom":"RIHOUR","adresse":"PLACE RIHOUR","x":3.0617,"y":50.6366,
         "nb_velos_dispo":7,"nb_places_dispo":13,"etat":"EN SERVICE",
         "date_modification":"2024-11-05T09:12:44.000Z"}
    ]}"#;

    async fn serve(app: Router) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{addr}/stations")
    }

    #[tokio::test]
    async fn fetch_parses_a_stations_payload() {
        let url = serve(Router::new().route("/stations", get(|| async { STATIONS }))).await;
        let source = HttpSource::new(url, SourceKind::Stations).unwrap();

        let facilities = source.fetch().await.unwrap();
        assert_eq!(facilities.len(), 1);
        assert_eq!(facilities[0].id, "RIHOUR");
        assert_eq!(facilities[0].available_units, 7);
    }

    #[tokio::test]
    async fn non_success_status_is_a_transport_error() {
        let app = Router::new().route(
            "/stations",
            get(|| async { (StatusCode::SERVICE_UNAVAILABLE, "maintenance") }),
        );
        let url = serve(app).await;
        let source = HttpSource::new(url, SourceKind::Stations).unwrap();

        let err = source.fetch().await.unwrap_err();
        assert!(matches!(err, FetchError::Status(503)));
        assert_eq!(err.kind(), "transport");
    }

    #[tokio::test]
    async fn malformed_body_is_a_parse_error() {
        let url = serve(Router::new().route("/stations", get(|| async { "<html>not json</html>" }))).await;
        let source = HttpSource::new(url, SourceKind::Stations).unwrap();

        let err = source.fetch().await.unwrap_err();
        assert!(matches!(err, FetchError::Parse(ParseError::Json(_))));
        assert_eq!(err.kind(), "parse");
    }

    #[tokio::test]
    async fn unreachable_upstream_is_a_transport_error() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);
        let source = HttpSource::new(format!("http://{addr}/stations"), SourceKind::Stations).unwrap();

        let err = source.fetch().await.unwrap_err();
        assert!(matches!(err, FetchError::Transport(_)));
        assert_eq!(err.kind(), "transport");
    }
}
