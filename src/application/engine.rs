use super::context::{PayrollContext, PayrollPorts};
use super::dispatcher::Dispatcher;
use super::registry::Registry;
use super::scanner::Scanner;
use crate::config::OrchestratorConfig;
use crate::domain::company::Company;
use crate::domain::employee::{Employee, EmployeeUpdate};
use crate::domain::event::EventRecord;
use crate::domain::payment::{DispatchOutcome, DispatchToken, Trigger};
use crate::domain::value::{Address, DestinationId};
use crate::error::{PayrollError, Result};
use tokio::sync::Mutex;
use tracing::debug;

/// The main entry point of the orchestrator.
///
/// `PayrollEngine` owns the ports and runs every state-changing call under
/// one async mutex, giving all invocations a single global order. Each call
/// therefore sees the effects of every call that completed before it, and
/// two dispatches of the same token cannot both advance a schedule.
pub struct PayrollEngine {
    ctx: PayrollContext,
    serial: Mutex<()>,
}

impl PayrollEngine {
    pub fn new(config: OrchestratorConfig, ports: PayrollPorts) -> Result<Self> {
        Ok(Self {
            ctx: PayrollContext::new(config, ports)?,
            serial: Mutex::new(()),
        })
    }

    pub fn config(&self) -> &OrchestratorConfig {
        &self.ctx.config
    }

    /// Finds the next due payment without side effects.
    pub async fn scan(&self) -> Result<Option<DispatchToken>> {
        let _guard = self.serial.lock().await;
        Scanner::new(&self.ctx).scan().await
    }

    /// Dispatches a token produced by `scan` on the automatic path.
    pub async fn dispatch(&self, token: &DispatchToken) -> Result<DispatchOutcome> {
        let _guard = self.serial.lock().await;
        self.dispatch_token(token).await
    }

    /// Scans and, when something is due, dispatches it.
    pub async fn run_once(&self) -> Result<Option<DispatchOutcome>> {
        let _guard = self.serial.lock().await;
        match Scanner::new(&self.ctx).scan().await? {
            Some(token) => self.dispatch_token(&token).await.map(Some),
            None => Ok(None),
        }
    }

    /// Owner-triggered payment that bypasses the scan. The caller brings the
    /// bridge fee, so cross-chain payments need not wait for automation.
    pub async fn pay_now(
        &self,
        caller: &Address,
        employee_id: u64,
        fee: u128,
    ) -> Result<DispatchOutcome> {
        let _guard = self.serial.lock().await;
        let registry = Registry::new(&self.ctx);
        let company = registry
            .company_of_owner(caller)
            .await?
            .ok_or(PayrollError::NotCompanyOwner)?;
        let employee = registry.employee(employee_id).await?;
        employee.ensure_belongs_to(company.id)?;
        Dispatcher::new(&self.ctx)
            .dispatch(company.id, employee_id, Trigger::Manual { fee })
            .await
    }

    async fn dispatch_token(&self, token: &DispatchToken) -> Result<DispatchOutcome> {
        let employee = self
            .ctx
            .employees
            .get(token.employee_id)
            .await?
            .ok_or(PayrollError::EmployeeNotFound(token.employee_id))?;
        if employee.company_id != token.company_id
            || employee.next_pay_date != token.expected_next_pay_date
            || employee.next_pay_date > self.ctx.now()
            || employee.held
        {
            debug!(employee_id = token.employee_id, "discarding stale dispatch token");
            return Err(PayrollError::StaleDispatch(token.employee_id));
        }

        // The rotation moves on whatever the outcome, so one payment that
        // keeps failing cannot hold the scan in place. The cursor is the one
        // piece of state a rejected dispatch still changes.
        Scanner::new(&self.ctx).advance_past(token).await?;
        Dispatcher::new(&self.ctx)
            .dispatch(token.company_id, token.employee_id, Trigger::Automatic)
            .await
    }

    pub async fn register_company(&self, caller: &Address, name: &str) -> Result<Company> {
        let _guard = self.serial.lock().await;
        Registry::new(&self.ctx).register_company(caller, name).await
    }

    pub async fn add_employee(
        &self,
        caller: &Address,
        name: &str,
        payout_address: Address,
        destination: DestinationId,
        salary: u128,
    ) -> Result<Employee> {
        let _guard = self.serial.lock().await;
        Registry::new(&self.ctx)
            .add_employee(caller, name, payout_address, destination, salary)
            .await
    }

    pub async fn update_employee(
        &self,
        caller: &Address,
        employee_id: u64,
        update: EmployeeUpdate,
    ) -> Result<Employee> {
        let _guard = self.serial.lock().await;
        Registry::new(&self.ctx)
            .update_employee(caller, employee_id, update)
            .await
    }

    pub async fn deactivate_employee(&self, caller: &Address, employee_id: u64) -> Result<()> {
        let _guard = self.serial.lock().await;
        Registry::new(&self.ctx)
            .deactivate_employee(caller, employee_id)
            .await
    }

    pub async fn admin_deactivate_employee(&self, caller: &Address, employee_id: u64) -> Result<()> {
        let _guard = self.serial.lock().await;
        Registry::new(&self.ctx)
            .admin_deactivate_employee(caller, employee_id)
            .await
    }

    pub async fn set_company_active(
        &self,
        caller: &Address,
        company_id: u64,
        active: bool,
    ) -> Result<Company> {
        let _guard = self.serial.lock().await;
        Registry::new(&self.ctx)
            .set_company_active(caller, company_id, active)
            .await
    }

    pub async fn delete_company(&self, caller: &Address, company_id: u64) -> Result<Vec<u64>> {
        let _guard = self.serial.lock().await;
        Registry::new(&self.ctx)
            .delete_company(caller, company_id)
            .await
    }

    pub async fn transfer_company_ownership(
        &self,
        caller: &Address,
        company_id: u64,
        new_owner: Address,
    ) -> Result<Company> {
        let _guard = self.serial.lock().await;
        Registry::new(&self.ctx)
            .transfer_company_ownership(caller, company_id, new_owner)
            .await
    }

    pub async fn allow_destination(&self, caller: &Address, destination: DestinationId) -> Result<()> {
        let _guard = self.serial.lock().await;
        Registry::new(&self.ctx)
            .allow_destination(caller, destination)
            .await
    }

    pub async fn disallow_destination(
        &self,
        caller: &Address,
        destination: DestinationId,
    ) -> Result<()> {
        let _guard = self.serial.lock().await;
        Registry::new(&self.ctx)
            .disallow_destination(caller, destination)
            .await
    }

    pub async fn companies(&self) -> Result<Vec<Company>> {
        Registry::new(&self.ctx).companies().await
    }

    pub async fn company(&self, company_id: u64) -> Result<Company> {
        Registry::new(&self.ctx).company(company_id).await
    }

    pub async fn employee(&self, employee_id: u64) -> Result<Employee> {
        Registry::new(&self.ctx).employee(employee_id).await
    }

    pub async fn employees_of(&self, company_id: u64) -> Result<Vec<Employee>> {
        Registry::new(&self.ctx).employees_of(company_id).await
    }

    pub async fn allowed_destinations(&self) -> Vec<DestinationId> {
        self.ctx.allowed_destinations().await
    }

    pub async fn events(&self) -> Result<Vec<EventRecord>> {
        self.ctx.events.all().await
    }
}
