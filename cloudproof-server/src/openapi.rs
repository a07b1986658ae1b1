//! OpenAPI document for CloudProof server.

use utoipa::OpenApi;

use cloudproof_core::{
    ActivityEvent, ActivityReport, ActivitySummary, HeatmapCell, HeatmapView, HeatmapWindow,
    IntensityTier, RecentAction, ScoringRule, ScoringRules,
};

use crate::routes::{ErrorResponse, HealthResponse, SpanParam};

#[derive(OpenApi)]
#[openapi(
    servers((url = "/api")),
    paths(
        crate::routes::health,
        crate::routes::heatmap,
        crate::routes::ingest,
        crate::routes::rules,
        crate::routes::openapi_json
    ),
    components(
        schemas(
            HealthResponse,
            ErrorResponse,
            SpanParam,
            HeatmapView,
            HeatmapWindow,
            HeatmapCell,
            IntensityTier,
            ActivitySummary,
            ActivityEvent,
            ActivityReport,
            RecentAction,
            ScoringRule,
            ScoringRules
        )
    ),
    tags(
        (name = "heatmap", description = "Heatmap normalization"),
        (name = "ingest", description = "CloudTrail scoring"),
        (name = "system", description = "System endpoints")
    )
)]
/// OpenAPI document for the CloudProof server.
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    use super::ApiDoc;
    use utoipa::OpenApi;

    #[test]
    fn openapi_includes_expected_paths() {
        let doc = ApiDoc::openapi();
        let paths = doc.paths.paths;

        assert!(paths.contains_key("/health"));
        assert!(paths.contains_key("/heatmap"));
        assert!(paths.contains_key("/ingest"));
        assert!(paths.contains_key("/scoring/rules"));
        assert!(paths.contains_key("/openapi.json"));
    }

    #[test]
    fn openapi_registers_view_schemas() {
        let doc = ApiDoc::openapi();
        let schemas = doc.components.expect("components").schemas;

        for name in ["HeatmapView", "HeatmapCell", "IntensityTier", "ActivityReport"] {
            assert!(schemas.contains_key(name), "{name}");
        }
    }
}
