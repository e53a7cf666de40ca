use super::context::PayrollContext;
use crate::domain::payment::{DispatchToken, ScanCursor};
use crate::error::{PayrollError, Result};
use tracing::{error, trace};

/// Fair rotating search for the next due payment.
///
/// A scan reads the cursor but never moves it, so scanning twice without a
/// dispatch in between yields the same token. The cursor only moves once a
/// token is dispatched, to one company and one employee past the dispatched
/// position. This bounds every scan to one result and keeps later companies
/// from being starved by earlier ones.
pub struct Scanner<'a> {
    ctx: &'a PayrollContext,
}

impl<'a> Scanner<'a> {
    pub fn new(ctx: &'a PayrollContext) -> Self {
        Self { ctx }
    }

    pub async fn scan(&self) -> Result<Option<DispatchToken>> {
        let companies = self.ctx.companies.all().await?;
        if companies.is_empty() {
            return Ok(None);
        }
        let now = self.ctx.now();
        let cursor = self.ctx.cursor.load().await?;
        let company_count = companies.len();
        let mut employee_cursor = cursor.employee_index;

        for step in 0..company_count {
            let company_index = (cursor.company_index + step) % company_count;
            let company = &companies[company_index];
            let employee_count = company.employee_ids.len();
            if !company.active || employee_count == 0 {
                employee_cursor = 0;
                continue;
            }

            let start = employee_cursor % employee_count;
            for offset in 0..employee_count {
                let employee_index = (start + offset) % employee_count;
                let employee_id = company.employee_ids[employee_index];
                let employee = self.ctx.employees.get(employee_id).await?.ok_or_else(|| {
                    error!(company_id = company.id, employee_id, "employee list points at a missing record");
                    PayrollError::InvariantViolation(format!(
                        "company {} lists unknown employee {}",
                        company.id, employee_id
                    ))
                })?;

                if employee.is_due(now) {
                    trace!(company_id = company.id, employee_id, "found due payment");
                    return Ok(Some(DispatchToken {
                        company_id: company.id,
                        employee_id,
                        company_index,
                        employee_index,
                        expected_next_pay_date: employee.next_pay_date,
                    }));
                }
            }
            employee_cursor = 0;
        }

        Ok(None)
    }

    /// Moves the cursor just past a dispatched position.
    pub async fn advance_past(&self, token: &DispatchToken) -> Result<()> {
        self.ctx
            .cursor
            .save(ScanCursor {
                company_index: token.company_index.wrapping_add(1),
                employee_index: token.employee_index.wrapping_add(1),
            })
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::registry::Registry;
    use crate::application::testing::{Harness, START};
    use crate::config::OrchestratorConfig;
    use crate::domain::value::{Address, DestinationId};

    async fn company_with(h: &Harness, owner: &str, employees: usize) -> Vec<u64> {
        let registry = Registry::new(&h.ctx);
        let owner = Address::new(owner);
        registry.register_company(&owner, "Co").await.unwrap();
        let mut ids = Vec::new();
        for n in 0..employees {
            let e = registry
                .add_employee(
                    &owner,
                    "E",
                    Address::new(format!("0xe{n}")),
                    DestinationId(0),
                    10,
                )
                .await
                .unwrap();
            ids.push(e.id);
        }
        ids
    }

    fn config() -> OrchestratorConfig {
        OrchestratorConfig {
            pay_interval: 100,
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_empty_registry_has_nothing_due() {
        let h = Harness::new(config());
        assert!(Scanner::new(&h.ctx).scan().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_nothing_due_before_pay_date() {
        let h = Harness::new(config());
        company_with(&h, "acme", 2).await;
        h.clock.set(START + 99);
        assert!(Scanner::new(&h.ctx).scan().await.unwrap().is_none());
        h.clock.set(START + 100);
        assert!(Scanner::new(&h.ctx).scan().await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_scan_is_idempotent() {
        let h = Harness::new(config());
        company_with(&h, "acme", 3).await;
        h.clock.advance(100).unwrap();
        let scanner = Scanner::new(&h.ctx);

        let first = scanner.scan().await.unwrap();
        let second = scanner.scan().await.unwrap();
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn test_advance_moves_to_next_employee() {
        let h = Harness::new(config());
        let ids = company_with(&h, "acme", 3).await;
        h.clock.advance(100).unwrap();
        let scanner = Scanner::new(&h.ctx);

        let first = scanner.scan().await.unwrap().unwrap();
        assert_eq!(first.employee_id, ids[0]);
        scanner.advance_past(&first).await.unwrap();
        let second = scanner.scan().await.unwrap().unwrap();
        assert_eq!(second.employee_id, ids[1]);
    }

    #[tokio::test]
    async fn test_inactive_company_skipped() {
        let h = Harness::new(config());
        company_with(&h, "acme", 1).await;
        let globex = company_with(&h, "globex", 1).await;
        let admin = h.ctx.config.admin.clone();
        Registry::new(&h.ctx)
            .deactivate_company(&admin, 1)
            .await
            .unwrap();
        h.clock.advance(100).unwrap();

        let token = Scanner::new(&h.ctx).scan().await.unwrap().unwrap();
        assert_eq!(token.company_id, 2);
        assert_eq!(token.employee_id, globex[0]);
    }

    #[tokio::test]
    async fn test_stale_cursor_after_shrink_does_not_panic() {
        let h = Harness::new(config());
        company_with(&h, "acme", 2).await;
        h.ctx
            .cursor
            .save(ScanCursor {
                company_index: 17,
                employee_index: 41,
            })
            .await
            .unwrap();
        h.clock.advance(100).unwrap();

        let token = Scanner::new(&h.ctx).scan().await.unwrap().unwrap();
        assert_eq!(token.company_index, 0);
        assert_eq!(token.employee_index, 1);
    }

    #[tokio::test]
    async fn test_missing_employee_record_fails_loudly() {
        let h = Harness::new(config());
        let ids = company_with(&h, "acme", 1).await;
        h.ctx.employees.remove(ids[0]).await.unwrap();
        h.clock.advance(100).unwrap();

        let result = Scanner::new(&h.ctx).scan().await;
        assert!(matches!(result, Err(PayrollError::InvariantViolation(_))));
    }
}
