use super::context::PayrollContext;
use super::gate::AllowanceGate;
use crate::domain::company::Company;
use crate::domain::employee::Employee;
use crate::domain::event::PayrollEvent;
use crate::domain::payment::{BridgeTransfer, DeferReason, DispatchOutcome, TrackingHandle, Trigger};
use crate::error::{PayrollError, Result};
use tracing::{info, warn};

/// Settles exactly one payment and is the only writer of `next_pay_date`.
///
/// The schedule moves forward only after funds reached the payee or were
/// accepted by the bridge. Every resource shortfall before that point is
/// reported as a deferral and leaves the schedule untouched.
pub struct Dispatcher<'a> {
    ctx: &'a PayrollContext,
}

impl<'a> Dispatcher<'a> {
    pub fn new(ctx: &'a PayrollContext) -> Self {
        Self { ctx }
    }

    pub async fn dispatch(
        &self,
        company_id: u64,
        employee_id: u64,
        trigger: Trigger,
    ) -> Result<DispatchOutcome> {
        let company = self
            .ctx
            .companies
            .get(company_id)
            .await?
            .ok_or(PayrollError::CompanyNotFound(company_id))?;
        let employee = self
            .ctx
            .employees
            .get(employee_id)
            .await?
            .ok_or(PayrollError::EmployeeNotFound(employee_id))?;

        // State may have changed since the scan.
        company.ensure_active()?;
        employee.ensure_belongs_to(company.id)?;
        employee.ensure_active()?;
        self.ctx
            .ensure_destination_allowed(employee.destination)
            .await?;

        let gate = AllowanceGate::new(self.ctx.ledger.as_ref(), &self.ctx.config.orchestrator);
        if !gate.check_allowance(&company.owner, employee.salary).await? {
            return self
                .defer(&company, &employee, DeferReason::InsufficientAllowance)
                .await;
        }

        if self.ctx.is_local(employee.destination) {
            self.settle_locally(company, employee).await
        } else {
            self.submit_to_bridge(company, employee, trigger).await
        }
    }

    async fn settle_locally(&self, company: Company, mut employee: Employee) -> Result<DispatchOutcome> {
        let moved = self
            .ctx
            .ledger
            .transfer_from(
                &self.ctx.config.orchestrator,
                &company.owner,
                &employee.payout_address,
                employee.salary,
            )
            .await;
        if let Err(err) = moved {
            return match err {
                PayrollError::InsufficientBalance { .. } | PayrollError::InsufficientAllowance { .. } => {
                    self.defer(&company, &employee, DeferReason::TransferFailed)
                        .await
                }
                other => Err(other),
            };
        }

        employee.advance_schedule(self.ctx.config.pay_interval)?;
        employee.held = false;
        self.ctx.employees.store(employee.clone()).await?;
        self.ctx
            .record(PayrollEvent::LocalSettled {
                company_id: company.id,
                employee_id: employee.id,
                amount: employee.salary.value(),
                destination: employee.destination,
            })
            .await?;
        info!(
            company_id = company.id,
            employee_id = employee.id,
            amount = %employee.salary,
            next_pay_date = employee.next_pay_date,
            "salary settled locally"
        );
        Ok(DispatchOutcome::LocalSettled {
            employee_id: employee.id,
            amount: employee.salary,
            next_pay_date: employee.next_pay_date,
        })
    }

    async fn submit_to_bridge(
        &self,
        company: Company,
        mut employee: Employee,
        trigger: Trigger,
    ) -> Result<DispatchOutcome> {
        let escrow = &self.ctx.config.orchestrator;
        let transfer = BridgeTransfer {
            source: escrow.clone(),
            amount: employee.salary,
            destination: employee.destination,
            recipient: employee.payout_address.clone(),
            payload: [company.id.to_be_bytes(), employee.id.to_be_bytes()].concat(),
        };

        // Fee shortfalls are settled before any funds move.
        let required = self.ctx.bridge.quote_fee(&transfer).await?;
        let supplied = match trigger {
            Trigger::Automatic => self.ctx.config.automation_fee,
            Trigger::Manual { fee } => fee,
        };
        if supplied < required {
            return match trigger {
                Trigger::Automatic => {
                    self.defer(&company, &employee, DeferReason::BridgeFeeUnavailable)
                        .await
                }
                Trigger::Manual { .. } => Err(PayrollError::InsufficientFee { required, supplied }),
            };
        }

        let escrowed = self
            .ctx
            .ledger
            .transfer_from(escrow, &company.owner, escrow, employee.salary)
            .await;
        if let Err(err) = escrowed {
            return match err {
                PayrollError::InsufficientBalance { .. } | PayrollError::InsufficientAllowance { .. } => {
                    self.defer(&company, &employee, DeferReason::EscrowFailed)
                        .await
                }
                other => Err(other),
            };
        }

        let handle = match self.hand_off(transfer, supplied).await {
            Ok(handle) => handle,
            Err(err) => {
                let message = match err {
                    PayrollError::BridgeSubmit(message) => message,
                    other => other.to_string(),
                };
                warn!(
                    company_id = company.id,
                    employee_id = employee.id,
                    amount = %employee.salary,
                    bridge = self.ctx.bridge.name(),
                    error = %message,
                    "bridge rejected transfer, funds remain in escrow"
                );
                // Escrow already holds this period's salary: hold the
                // employee so automation does not escrow it again.
                employee.held = true;
                self.ctx.employees.store(employee.clone()).await?;
                self.ctx
                    .record(PayrollEvent::EscrowStranded {
                        company_id: company.id,
                        employee_id: employee.id,
                        amount: employee.salary.value(),
                        destination: employee.destination,
                        error: message.clone(),
                    })
                    .await?;
                return Err(PayrollError::BridgeSubmit(message));
            }
        };

        employee.advance_schedule(self.ctx.config.pay_interval)?;
        employee.held = false;
        self.ctx.employees.store(employee.clone()).await?;
        self.ctx
            .record(PayrollEvent::BridgeSubmitted {
                company_id: company.id,
                employee_id: employee.id,
                amount: employee.salary.value(),
                destination: employee.destination,
                handle: handle.clone(),
            })
            .await?;
        info!(
            company_id = company.id,
            employee_id = employee.id,
            amount = %employee.salary,
            %handle,
            bridge = self.ctx.bridge.name(),
            "salary submitted to bridge"
        );
        Ok(DispatchOutcome::BridgeSubmitted {
            employee_id: employee.id,
            amount: employee.salary,
            handle,
            next_pay_date: employee.next_pay_date,
        })
    }

    /// Lets the bridge pull the escrowed amount, then submits.
    async fn hand_off(&self, transfer: BridgeTransfer, fee: u128) -> Result<TrackingHandle> {
        self.ctx
            .ledger
            .approve(
                &self.ctx.config.orchestrator,
                &self.ctx.bridge.spender(),
                transfer.amount.value(),
            )
            .await?;
        self.ctx.bridge.submit(transfer, fee).await
    }

    async fn defer(
        &self,
        company: &Company,
        employee: &Employee,
        reason: DeferReason,
    ) -> Result<DispatchOutcome> {
        self.ctx
            .record(PayrollEvent::PaymentDeferred {
                company_id: company.id,
                employee_id: employee.id,
                amount: 0,
                destination: employee.destination,
                reason,
            })
            .await?;
        warn!(
            company_id = company.id,
            employee_id = employee.id,
            %reason,
            "payment deferred"
        );
        Ok(DispatchOutcome::Deferred {
            employee_id: employee.id,
            reason,
        })
    }
}
