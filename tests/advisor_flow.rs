use std::io::Write;

use akiya_advisor::{
    app::{Advisor, AdvisorError, AnalyzeRequest, Collaborators, LocateRequest},
    config::Settings,
    domain::{AreaType, BusinessType, Catalog, Recommendation},
    infra::LookupError,
};
use serde_json::json;
use tempfile::NamedTempFile;
use wiremock::{
    matchers::{method, path},
    Mock, MockServer, ResponseTemplate,
};

const STATIONS: &str = r#"{
    "type": "FeatureCollection",
    "features": [
        { "type": "Feature", "properties": { "name": "Yuigahama" },
          "geometry": { "type": "LineString",
                        "coordinates": [[139.549, 35.311], [139.551, 35.311]] } }
    ]
}"#;

fn embedded_advisor() -> Advisor {
    Advisor::new(Catalog::embedded().unwrap(), AreaType::from("standard"))
}

#[test]
fn hayama_is_split_between_accommodation_and_atelier() {
    let report = embedded_advisor()
        .analyze(&AnalyzeRequest {
            area: AreaType::from("hayama"),
            investment: None,
        })
        .unwrap();

    for record in &report.results {
        assert!((record.market_score - 59.0 / 60.0).abs() < 1e-9);
        assert_eq!(
            record.monthly_profit,
            record.monthly_revenue - record.monthly_cost
        );
    }
    assert_eq!(
        report.recommendation,
        Some(Recommendation::Split {
            best_profit_ratio: 1,
            fastest_payback: 2,
        })
    );
    assert_eq!(
        report.best_profit_ratio().map(|r| r.business),
        Some(BusinessType::Accommodation)
    );
    assert_eq!(
        report.fastest_payback().map(|r| r.business),
        Some(BusinessType::ShareAtelier)
    );
}

#[test]
fn report_json_keeps_unreachable_payback_as_null() {
    let advisor = embedded_advisor();
    let mut report = advisor
        .analyze(&AnalyzeRequest {
            area: AreaType::from("kamakura"),
            investment: None,
        })
        .unwrap();
    report.results[0].payback_period_years = f64::INFINITY;

    let value = serde_json::to_value(&report).unwrap();
    assert!(value["results"][0]["payback_period_years"].is_null());
    assert_eq!(value["recommendation"]["kind"], "split");

    let back: akiya_advisor::domain::RecommendationReport = serde_json::from_value(value).unwrap();
    assert!(back.results[0].payback_period_years.is_infinite());
}

struct Harness {
    server: MockServer,
    settings: Settings,
    _stations: NamedTempFile,
}

async fn harness(zoning: &str) -> Harness {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/geocode"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { "type": "Feature",
              "geometry": { "type": "Point", "coordinates": [139.5505, 35.3105] } }
        ])))
        .mount(&server)
        .await;
    let cell = json!({
        "type": "Polygon",
        "coordinates": [[[139.54, 35.30], [139.56, 35.30], [139.56, 35.32],
                         [139.54, 35.32], [139.54, 35.30]]]
    });
    Mock::given(method("GET"))
        .and(path("/gis/XKT002"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "type": "FeatureCollection",
            "features": [{ "type": "Feature", "geometry": cell,
                           "properties": { "use_area_ja": zoning } }]
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/gis/XKT013"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "type": "FeatureCollection",
            "features": [{ "type": "Feature", "geometry": cell,
                           "properties": { "PTN_2020": 1500 } }]
        })))
        .mount(&server)
        .await;

    let mut stations = NamedTempFile::new().unwrap();
    stations.write_all(STATIONS.as_bytes()).unwrap();

    let mut settings = Settings::default();
    settings.geocoder.base_url = format!("{}/geocode", server.uri());
    settings.gis.base_url = format!("{}/gis", server.uri());
    settings.cache.enabled = false;
    settings.stations.path = Some(stations.path().to_path_buf());

    Harness {
        server,
        settings,
        _stations: stations,
    }
}

fn request(floor_area_m2: f64) -> LocateRequest {
    LocateRequest {
        region: "神奈川県鎌倉市".to_string(),
        address: "由比ガ浜1-2-3".to_string(),
        investment: None,
        floor_area_m2,
    }
}

#[tokio::test]
async fn locate_scores_every_permitted_business() {
    let harness = harness("第一種住居地域").await;
    let collaborators = Collaborators::from_settings(&harness.settings).unwrap();

    let report = embedded_advisor()
        .locate(&collaborators, &request(120.0))
        .await
        .unwrap();

    let location = report.location.as_ref().unwrap();
    assert_eq!(location.zoning, "第一種住居地域");
    assert_eq!(location.population, 1500);
    // half a thousandth of a degree of latitude north of the platform
    assert!((location.station_distance_m - 55.66).abs() < 0.1);

    assert!(report.excluded.is_empty());
    assert_eq!(report.results.len(), 3);
    assert_eq!(report.gaps().count(), 0);

    let cafe = &report.results[0];
    assert!((cafe.market_score - 1.1889).abs() < 1e-3);
    let atelier = &report.results[2];
    assert!((atelier.market_score - 1.2361).abs() < 1e-3);
    assert!(report.recommendation.is_some());
}

#[tokio::test]
async fn zoning_limits_drop_businesses_from_the_ranking() {
    let harness = harness("第二種低層住居専用地域").await;
    let collaborators = Collaborators::from_settings(&harness.settings).unwrap();

    let report = embedded_advisor()
        .locate(&collaborators, &request(120.0))
        .await
        .unwrap();

    let kinds: Vec<_> = report.results.iter().map(|r| r.business).collect();
    assert_eq!(kinds, vec![BusinessType::Cafe, BusinessType::ShareAtelier]);
    assert_eq!(report.excluded.len(), 1);
    assert_eq!(report.excluded[0].business, BusinessType::Accommodation);
    assert_eq!(report.excluded[0].limit, None);
}

#[tokio::test]
async fn oversized_floor_area_excludes_everything() {
    let harness = harness("第一種低層住居専用地域").await;
    let collaborators = Collaborators::from_settings(&harness.settings).unwrap();

    let report = embedded_advisor()
        .locate(&collaborators, &request(120.0))
        .await
        .unwrap();

    assert!(report.results.is_empty());
    assert_eq!(report.excluded.len(), 3);
    assert_eq!(report.recommendation, None);
}

#[tokio::test]
async fn unknown_zoning_category_is_an_error() {
    let harness = harness("特別用途地区").await;
    let collaborators = Collaborators::from_settings(&harness.settings).unwrap();

    let error = embedded_advisor()
        .locate(&collaborators, &request(120.0))
        .await
        .unwrap_err();
    assert!(matches!(error, AdvisorError::UnknownZoning(ref z) if z == "特別用途地区"));
}

#[tokio::test]
async fn failed_lookup_names_its_stage() {
    let harness = harness("第一種住居地域").await;
    harness.server.reset().await;
    Mock::given(method("GET"))
        .and(path("/geocode"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&harness.server)
        .await;
    let collaborators = Collaborators::from_settings(&harness.settings).unwrap();

    let error = embedded_advisor()
        .locate(&collaborators, &request(120.0))
        .await
        .unwrap_err();
    match error {
        AdvisorError::Lookup { stage, source } => {
            assert_eq!(stage, "geocode");
            assert!(matches!(source, LookupError::Status(500)));
            assert!(source.is_retryable());
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn locate_requires_a_station_dataset() {
    let settings = Settings {
        cache: akiya_advisor::config::CacheSettings {
            enabled: false,
            ..Default::default()
        },
        ..Settings::default()
    };
    assert!(matches!(
        Collaborators::from_settings(&settings),
        Err(AdvisorError::MissingStations)
    ));
}

#[tokio::test]
async fn non_positive_floor_area_is_rejected() {
    let harness = harness("第一種住居地域").await;
    let collaborators = Collaborators::from_settings(&harness.settings).unwrap();

    let error = embedded_advisor()
        .locate(&collaborators, &request(0.0))
        .await
        .unwrap_err();
    assert!(matches!(error, AdvisorError::InvalidFloorArea));
}
