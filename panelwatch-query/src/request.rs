//! Range query requests and the fetch seam.

use std::fmt::Debug;

use async_trait::async_trait;
use chrono::{DateTime, TimeZone};
use panelwatch_types::{Panel, Target};

use crate::response::QueryRangeResponse;
use crate::step::compute_step;
use crate::template::TemplateVars;
use crate::time_range::TimeRange;
use crate::QueryError;

/// One `query_range` call, fully resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryRangeRequest {
    /// Datasource identifier (`ds`).
    pub datasource: String,
    /// Expression with template variables substituted.
    pub query: String,
    /// Unix seconds.
    pub start: i64,
    /// Unix seconds.
    pub end: i64,
    /// Resolution in seconds.
    pub step: i64,
}

impl QueryRangeRequest {
    /// Build the request for one panel target.
    ///
    /// Substitutes `vars` into the expression, resolves `range` against `now`
    /// and picks a step for the resulting window.
    pub fn for_target<Tz: TimeZone>(
        panel: &Panel,
        target: &Target,
        vars: &TemplateVars,
        range: &TimeRange,
        now: DateTime<Tz>,
    ) -> Result<Self, QueryError> {
        let (start, end) = range.unix_seconds_at(now)?;
        Ok(Self {
            datasource: panel.datasource_for(target).to_string(),
            query: vars.apply(&target.expr),
            start,
            end,
            step: compute_step(start, end),
        })
    }

    /// Query string parameters, in request order.
    pub fn query_pairs(&self) -> [(&'static str, String); 5] {
        [
            ("ds", self.datasource.clone()),
            ("query", self.query.clone()),
            ("start", self.start.to_string()),
            ("end", self.end.to_string()),
            ("step", self.step.to_string()),
        ]
    }
}

/// Something that can answer range queries.
///
/// [`QueryClient`](crate::QueryClient) talks HTTP; tests and embedders can
/// supply their own.
#[async_trait]
pub trait RangeQuery: Send + Sync + Debug {
    /// Run one range query.
    async fn query_range(
        &self,
        request: &QueryRangeRequest,
    ) -> Result<QueryRangeResponse, QueryError>;

    /// Returns a human-readable description of the backend.
    ///
    /// Used for display in the TUI status bar.
    fn description(&self) -> String;
}
