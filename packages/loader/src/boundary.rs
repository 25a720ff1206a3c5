//! Strict parsing of serialized boundary polygons.
//!
//! Source tables carry each boundary as text: either a Python-literal
//! style list of numeric `(lon, lat)` pairs, or a GeoJSON `Polygon`
//! geometry object. Both forms go through structured parsers that only
//! accept bracketed numeric data; nothing is ever evaluated.

use std::collections::HashSet;

use geo::{LineString, Polygon};
use geojson::GeoJson;
use thiserror::Error;

/// A boundary value that cannot be turned into a valid polygon.
///
/// Rows with this error are skipped and logged; they never abort the
/// load.
#[derive(Debug, Error)]
pub enum BoundaryParseError {
    /// The text is not a list of numeric pairs.
    #[error("malformed boundary: {reason}")]
    Malformed {
        /// What the parser choked on.
        reason: String,
    },

    /// The text parsed, but too few distinct vertices resulted.
    #[error("boundary has {count} distinct vertices, need at least 3")]
    TooFewVertices {
        /// Distinct vertices found.
        count: usize,
    },

    /// The text is GeoJSON but not a `Polygon` geometry.
    #[error("GeoJSON boundary must be a Polygon geometry")]
    NotAPolygon,
}

fn malformed(reason: impl Into<String>) -> BoundaryParseError {
    BoundaryParseError::Malformed {
        reason: reason.into(),
    }
}

/// Parses a serialized boundary into a polygon.
///
/// Accepts `[(lon, lat), ...]`, `[[lon, lat], ...]`, or a GeoJSON
/// `Polygon` geometry object. Requires at least 3 distinct vertices; a
/// closing repeat of the first vertex is allowed and not counted twice.
///
/// # Errors
///
/// Returns [`BoundaryParseError`] when the text cannot be parsed into
/// numeric pairs, is a non-polygon GeoJSON value, or yields fewer than 3
/// distinct vertices.
pub fn parse_boundary(text: &str) -> Result<Polygon<f64>, BoundaryParseError> {
    let trimmed = text.trim();
    if trimmed.starts_with('{') {
        return parse_geojson_polygon(trimmed);
    }

    let pairs = parse_pair_list(trimmed)?;
    require_distinct_vertices(&pairs)?;
    Ok(Polygon::new(LineString::from(pairs), vec![]))
}

/// Parses a Python-literal style list of 2-tuples into `(lon, lat)`
/// pairs. Tuple parentheses and nested list brackets are both accepted.
fn parse_pair_list(text: &str) -> Result<Vec<(f64, f64)>, BoundaryParseError> {
    let inner = text
        .strip_prefix('[')
        .and_then(|s| s.strip_suffix(']'))
        .ok_or_else(|| malformed("missing enclosing brackets"))?;

    let mut pairs = Vec::new();
    let mut rest = inner.trim_start();

    while !rest.is_empty() {
        let close = match rest.chars().next() {
            Some('(') => ')',
            Some('[') => ']',
            Some(other) => return Err(malformed(format!("expected a pair, found '{other}'"))),
            None => break,
        };
        let end = rest
            .find(close)
            .ok_or_else(|| malformed(format!("unterminated pair, missing '{close}'")))?;

        pairs.push(parse_pair(&rest[1..end])?);

        rest = rest[end + 1..].trim_start();
        if let Some(after_comma) = rest.strip_prefix(',') {
            rest = after_comma.trim_start();
        } else if !rest.is_empty() {
            return Err(malformed("expected ',' between pairs"));
        }
    }

    Ok(pairs)
}

/// Parses the body of a single pair: exactly two comma-separated floats.
fn parse_pair(body: &str) -> Result<(f64, f64), BoundaryParseError> {
    let mut parts = body.split(',');
    let lon = parse_component(parts.next(), "longitude")?;
    let lat = parse_component(parts.next(), "latitude")?;
    if parts.next().is_some() {
        return Err(malformed(format!("pair has more than two values: '{body}'")));
    }
    Ok((lon, lat))
}

fn parse_component(part: Option<&str>, axis: &str) -> Result<f64, BoundaryParseError> {
    let raw = part
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .ok_or_else(|| malformed(format!("pair is missing its {axis}")))?;
    raw.parse::<f64>()
        .map_err(|_| malformed(format!("{axis} is not numeric: '{raw}'")))
}

/// Parses a GeoJSON geometry object, accepting only `Polygon`.
fn parse_geojson_polygon(text: &str) -> Result<Polygon<f64>, BoundaryParseError> {
    let geojson: GeoJson = text
        .parse()
        .map_err(|e: geojson::Error| malformed(format!("invalid GeoJSON: {e}")))?;

    let GeoJson::Geometry(geometry) = geojson else {
        return Err(BoundaryParseError::NotAPolygon);
    };
    let geo_geometry: geo::Geometry<f64> = geometry
        .try_into()
        .map_err(|e: geojson::Error| malformed(format!("invalid GeoJSON geometry: {e}")))?;
    let geo::Geometry::Polygon(polygon) = geo_geometry else {
        return Err(BoundaryParseError::NotAPolygon);
    };

    let pairs: Vec<(f64, f64)> = polygon.exterior().0.iter().map(|c| (c.x, c.y)).collect();
    require_distinct_vertices(&pairs)?;
    Ok(polygon)
}

/// At least 3 distinct vertices, comparing exact float bit patterns.
fn require_distinct_vertices(pairs: &[(f64, f64)]) -> Result<(), BoundaryParseError> {
    let distinct: HashSet<(u64, u64)> = pairs
        .iter()
        .map(|&(lon, lat)| (lon.to_bits(), lat.to_bits()))
        .collect();
    if distinct.len() < 3 {
        return Err(BoundaryParseError::TooFewVertices {
            count: distinct.len(),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_tuple_list() {
        let polygon = parse_boundary(
            "[(30.0, 10.0), (30.2, 10.0), (30.2, 10.2), (30.0, 10.2), (30.0, 10.0)]",
        )
        .unwrap();
        // geo closes the ring, so 4 distinct vertices + closing repeat.
        assert_eq!(polygon.exterior().0.len(), 5);
        assert!((polygon.exterior().0[0].x - 30.0).abs() < f64::EPSILON);
        assert!((polygon.exterior().0[0].y - 10.0).abs() < f64::EPSILON);
    }

    #[test]
    fn parses_nested_list_form() {
        let polygon = parse_boundary("[[78.329, 19.914], [78.330, 19.914], [78.332, 19.905]]");
        assert!(polygon.is_ok());
    }

    #[test]
    fn parses_negative_and_exponent_numbers() {
        let polygon = parse_boundary("[(-87.6278, 41.8827), (-87.6, 41.9), (-87.65, 4.19e1)]");
        assert!(polygon.is_ok());
    }

    #[test]
    fn parses_geojson_polygon() {
        let text = r#"{"type":"Polygon","coordinates":[[[30.0,10.0],[30.2,10.0],[30.2,10.2],[30.0,10.0]]]}"#;
        let polygon = parse_boundary(text).unwrap();
        assert!((polygon.exterior().0[1].x - 30.2).abs() < f64::EPSILON);
    }

    #[test]
    fn rejects_non_polygon_geojson() {
        let text = r#"{"type":"Point","coordinates":[30.0,10.0]}"#;
        assert!(matches!(
            parse_boundary(text),
            Err(BoundaryParseError::NotAPolygon)
        ));
    }

    #[test]
    fn rejects_unbracketed_text() {
        assert!(matches!(
            parse_boundary("(30.0, 10.0), (30.2, 10.0)"),
            Err(BoundaryParseError::Malformed { .. })
        ));
    }

    #[test]
    fn rejects_non_numeric_pairs() {
        assert!(matches!(
            parse_boundary("[(a, b), (c, d), (e, f)]"),
            Err(BoundaryParseError::Malformed { .. })
        ));
    }

    #[test]
    fn rejects_triple_values_in_a_pair() {
        assert!(matches!(
            parse_boundary("[(1.0, 2.0, 3.0), (4.0, 5.0), (6.0, 7.0)]"),
            Err(BoundaryParseError::Malformed { .. })
        ));
    }

    #[test]
    fn rejects_code_like_text() {
        // The original pipeline evaluated boundary text; this parser must
        // reject anything that is not a literal pair list.
        assert!(parse_boundary("__import__('os').system('rm -rf /')").is_err());
    }

    #[test]
    fn closing_repeat_does_not_count_toward_distinct_vertices() {
        assert!(matches!(
            parse_boundary("[(0.0, 0.0), (1.0, 1.0), (0.0, 0.0)]"),
            Err(BoundaryParseError::TooFewVertices { count: 2 })
        ));
    }

    #[test]
    fn empty_list_has_zero_vertices() {
        assert!(matches!(
            parse_boundary("[]"),
            Err(BoundaryParseError::TooFewVertices { count: 0 })
        ));
    }
}
