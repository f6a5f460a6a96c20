// Reading the departments polygons.

use serde_json::Value as JSValue;

use conflict_stats::{PolygonDataset, PolygonFeature, POLYGON_NAME_ATTRIBUTE};

use crate::atlas::*;

/// Reads a GeoJSON feature collection. Every feature must carry a `NAME_1`
/// property; its geometry is kept as is.
pub fn read_polygons(path: &Path) -> AtlasResult<PolygonDataset<JSValue>> {
    let p = path.display().to_string();
    let contents = fs::read_to_string(path).context(OpeningJsonSnafu { path: p.clone() })?;
    let js: JSValue =
        serde_json::from_str(contents.as_str()).context(ParsingJsonSnafu { path: p.clone() })?;
    parse_feature_collection(&p, &js)
}

pub fn parse_feature_collection(path: &str, js: &JSValue) -> AtlasResult<PolygonDataset<JSValue>> {
    let features = js
        .get("features")
        .and_then(|f| f.as_array())
        .context(InvalidGeoJsonSnafu {
            path,
            message: "no features array",
        })?;

    let mut res: Vec<PolygonFeature<JSValue>> = Vec::new();
    for (idx, f) in features.iter().enumerate() {
        let name = f
            .get("properties")
            .and_then(|p| p.get(POLYGON_NAME_ATTRIBUTE))
            .and_then(|n| n.as_str())
            .context(InvalidGeoJsonSnafu {
                path,
                message: format!("feature {} has no {} property", idx, POLYGON_NAME_ATTRIBUTE),
            })?;
        res.push(PolygonFeature {
            name: name.to_string(),
            geometry: f.get("geometry").cloned().unwrap_or(JSValue::Null),
        });
    }
    debug!("parse_feature_collection: {}: {} features", path, res.len());
    Ok(PolygonDataset { features: res })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn features_and_geometries() {
        let js = json!({
            "type": "FeatureCollection",
            "features": [
                {"type": "Feature", "properties": {"NAME_1": "Vaupés", "GID_1": "COL.31_1"},
                 "geometry": {"type": "Polygon", "coordinates": [[[0.0, 0.0], [1.0, 0.0], [0.0, 1.0], [0.0, 0.0]]]}},
                {"type": "Feature", "properties": {"NAME_1": "Vichada"}},
            ]
        });
        let ds = parse_feature_collection("test.geojson", &js).unwrap();
        assert_eq!(ds.len(), 2);
        assert_eq!(ds.features[0].name, "Vaupés");
        assert_eq!(ds.features[0].geometry["type"], json!("Polygon"));
        assert_eq!(ds.features[1].geometry, JSValue::Null);
    }

    #[test]
    fn missing_name_is_an_error() {
        let js = json!({"features": [{"properties": {"NAME_2": "Leticia"}}]});
        let res = parse_feature_collection("test.geojson", &js);
        assert!(matches!(res, Err(AtlasError::InvalidGeoJson { .. })));
        let res = parse_feature_collection("test.geojson", &json!({"type": "Feature"}));
        assert!(matches!(res, Err(AtlasError::InvalidGeoJson { .. })));
    }
}
