//! `query_range` response format and its conversion to chart series.
//!
//! ```json
//! {"status": "success",
//!  "data": {"resultType": "matrix",
//!           "result": [{"metric": {"job": "api"}, "values": [[1700000000, "1.5"]]}]}}
//! ```

use panelwatch_types::{LabelSet, Point, Series, Target};
use serde::Deserialize;
use serde_json::Value;

use crate::template::format_legend;
use crate::QueryError;

/// Top-level body returned by the query endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct QueryRangeResponse {
    /// `success` or `error`.
    pub status: String,

    #[serde(default)]
    pub data: Option<QueryData>,

    /// Error message when `status` is `error`.
    #[serde(default)]
    pub error: Option<String>,

    #[serde(default, rename = "errorType")]
    pub error_type: Option<String>,
}

/// The `data` member of a response.
#[derive(Debug, Clone, Deserialize)]
pub struct QueryData {
    #[serde(rename = "resultType")]
    pub result_type: String,

    /// Shape depends on `result_type`; only matrices are decoded.
    #[serde(default)]
    pub result: Value,
}

/// One labelled result of a matrix query.
#[derive(Debug, Clone, PartialEq)]
pub struct MatrixResult {
    pub metric: LabelSet,
    pub points: Vec<Point>,
}

#[derive(Debug, Deserialize)]
struct RawMatrixResult {
    #[serde(default)]
    metric: LabelSet,
    #[serde(default)]
    values: Vec<RawSample>,
}

/// `[unixSeconds, "value"]`
#[derive(Debug, Deserialize)]
struct RawSample(f64, Value);

impl RawSample {
    fn to_point(&self) -> Point {
        let y = match &self.1 {
            Value::String(s) => s.trim().parse::<f64>().unwrap_or(f64::NAN),
            Value::Number(n) => n.as_f64().unwrap_or(f64::NAN),
            _ => f64::NAN,
        };
        Point::new((self.0 * 1000.0).round() as i64, round2(y))
    }
}

fn round2(v: f64) -> f64 {
    (v * 100.0).round() / 100.0
}

impl QueryRangeResponse {
    /// Decode the matrix results.
    ///
    /// An `error` status becomes [`QueryError::Api`]; any other non-success
    /// status, a non-matrix result type, or an empty result yields no results.
    pub fn into_results(self) -> Result<Vec<MatrixResult>, QueryError> {
        if self.status == "error" {
            let message = self
                .error
                .or(self.error_type)
                .unwrap_or_else(|| "query failed".to_string());
            return Err(QueryError::Api(message));
        }

        let Some(data) = self.data.filter(|_| self.status == "success") else {
            return Ok(Vec::new());
        };

        if data.result_type != "matrix" || data.result.is_null() {
            return Ok(Vec::new());
        }

        let raw: Vec<RawMatrixResult> =
            serde_json::from_value(data.result).map_err(|e| QueryError::Parse(e.to_string()))?;

        Ok(raw
            .into_iter()
            .map(|r| MatrixResult {
                points: r.values.iter().map(RawSample::to_point).collect(),
                metric: r.metric,
            })
            .collect())
    }

    /// Decode the results into labelled series using the target's legend.
    pub fn into_series(self, target: &Target) -> Result<Vec<Series>, QueryError> {
        Ok(self
            .into_results()?
            .into_iter()
            .map(|r| Series {
                label: format_legend(target.legend_format.as_deref(), &r.metric),
                points: r.points,
            })
            .collect())
    }
}
