//! Explain plan output
//!
//! Produces deterministic, human-readable explain output.

use std::fmt;

use super::errors::PlannerError;
use super::planner::QueryPlan;
use crate::contract::RecordType;

/// Explain plan output
#[derive(Debug, Clone)]
pub struct ExplainPlan {
    /// Whether planning succeeded
    pub accepted: bool,
    /// Concrete types scanned
    pub scan_types: Vec<String>,
    /// Status pushed down to the scan
    pub scan_status: Option<String>,
    /// Rendered row predicate
    pub predicate: Option<String>,
    /// Aggregates in projection order
    pub aggregates: Vec<String>,
    /// Group ordering
    pub group_order: Vec<String>,
    /// Sort columns
    pub sort: Vec<String>,
    /// Page number and size
    pub paging: Option<(i32, i32)>,
    /// Rejection reason (if rejected)
    pub rejection_reason: Option<String>,
    /// Rejection error code (if rejected)
    pub rejection_code: Option<String>,
}

impl ExplainPlan {
    /// Creates an explain plan from a successful query plan
    pub fn from_plan(plan: &QueryPlan) -> Self {
        let (aggregates, group_order) = match &plan.aggregation {
            Some(aggregation) => (
                aggregation
                    .aggregates
                    .iter()
                    .map(|a| a.label.clone())
                    .collect(),
                aggregation
                    .group_order
                    .iter()
                    .filter_map(|(index, direction)| {
                        aggregation
                            .group_keys
                            .get(*index)
                            .map(|key| format!("{} {}", key.attribute(), direction.as_str()))
                    })
                    .collect(),
            ),
            None => (Vec::new(), Vec::new()),
        };

        Self {
            accepted: true,
            scan_types: plan
                .scan_types
                .iter()
                .map(RecordType::to_string)
                .collect(),
            scan_status: Some(plan.scan_status.to_string()),
            predicate: Some(plan.predicate.to_string()),
            aggregates,
            group_order,
            sort: plan
                .sort
                .iter()
                .map(|k| format!("{} {}", k.attribute.attribute(), k.direction.as_str()))
                .collect(),
            paging: Some((plan.paging.page_number, plan.paging.page_size)),
            rejection_reason: None,
            rejection_code: None,
        }
    }

    /// Creates an explain plan from a planning error
    pub fn from_error(err: &PlannerError) -> Self {
        Self {
            accepted: false,
            scan_types: Vec::new(),
            scan_status: None,
            predicate: None,
            aggregates: Vec::new(),
            group_order: Vec::new(),
            sort: Vec::new(),
            paging: None,
            rejection_reason: Some(err.message().to_string()),
            rejection_code: Some(err.code().code().to_string()),
        }
    }
}

impl fmt::Display for ExplainPlan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "=== EXPLAIN PLAN ===")?;

        if self.accepted {
            writeln!(f, "Status: ACCEPTED")?;
            if self.scan_types.is_empty() {
                writeln!(f, "Scan: (no matching types)")?;
            } else {
                writeln!(f, "Scan: {}", self.scan_types.join(", "))?;
            }
            if let Some(status) = &self.scan_status {
                writeln!(f, "Scan Status: {}", status)?;
            }
            if let Some(predicate) = &self.predicate {
                writeln!(f, "Predicate: {}", predicate)?;
            }
            if !self.aggregates.is_empty() {
                writeln!(f, "Aggregates:")?;
                for aggregate in &self.aggregates {
                    writeln!(f, "  - {}", aggregate)?;
                }
                if !self.group_order.is_empty() {
                    writeln!(f, "Group Order: {}", self.group_order.join(", "))?;
                }
            }
            if !self.sort.is_empty() {
                writeln!(f, "Sort: {}", self.sort.join(", "))?;
            }
            if let Some((number, size)) = self.paging {
                writeln!(f, "Page: {} (size {})", number, size)?;
            }
        } else {
            writeln!(f, "Status: REJECTED")?;
            if let Some(code) = &self.rejection_code {
                writeln!(f, "Error Code: {}", code)?;
            }
            if let Some(reason) = &self.rejection_reason {
                writeln!(f, "Reason: {}", reason)?;
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejected_explain() {
        let err = PlannerError::paging_invalid("page size 600 is outside 1..=512");
        let explain = ExplainPlan::from_error(&err);
        let rendered = explain.to_string();
        assert!(rendered.contains("Status: REJECTED"));
        assert!(rendered.contains("VAULT_PAGING_INVALID"));
    }
}
