use super::context::PayrollContext;
use crate::domain::company::Company;
use crate::domain::employee::{Employee, EmployeeUpdate};
use crate::domain::event::PayrollEvent;
use crate::domain::value::{Address, Amount, DestinationId};
use crate::error::{PayrollError, Result};
use tracing::{debug, info};

/// Company and employee records with their invariants and access checks.
pub struct Registry<'a> {
    ctx: &'a PayrollContext,
}

impl<'a> Registry<'a> {
    pub fn new(ctx: &'a PayrollContext) -> Self {
        Self { ctx }
    }

    /// Registers the caller's company after collecting the registration fee.
    ///
    /// The fee is pulled from the caller's approval to the orchestrator and
    /// sent to the fee collector. Nothing is written if collection fails.
    pub async fn register_company(&self, caller: &Address, name: &str) -> Result<Company> {
        if caller.is_zero() {
            return Err(PayrollError::ZeroAddress);
        }
        if let Some(existing) = self.ctx.companies.get_by_owner(caller).await? {
            return Err(PayrollError::DuplicateOwner(existing.id));
        }

        let fee = self.ctx.config.registration_fee;
        if let Ok(fee_amount) = Amount::new(fee) {
            let orchestrator = &self.ctx.config.orchestrator;
            let available = self.ctx.ledger.allowance(caller, orchestrator).await?;
            if available < fee {
                return Err(PayrollError::InsufficientAuthorization {
                    required: fee,
                    available,
                });
            }
            self.ctx
                .ledger
                .transfer_from(
                    orchestrator,
                    caller,
                    &self.ctx.config.fee_collector,
                    fee_amount,
                )
                .await?;
        }

        let id = self.ctx.companies.next_id().await?;
        let company = Company::new(id, caller.clone(), name.to_string(), self.ctx.now());
        self.ctx.companies.store(company.clone()).await?;
        self.ctx
            .record(PayrollEvent::CompanyRegistered {
                company_id: id,
                owner: caller.clone(),
                fee,
            })
            .await?;
        info!(company_id = id, owner = %caller, "company registered");
        Ok(company)
    }

    /// Adds an employee to the caller's company. The first payment falls
    /// due one interval from now.
    pub async fn add_employee(
        &self,
        caller: &Address,
        name: &str,
        payout_address: Address,
        destination: DestinationId,
        salary: u128,
    ) -> Result<Employee> {
        let mut company = self.owned_company(caller).await?;
        company.ensure_active()?;
        if payout_address.is_zero() {
            return Err(PayrollError::ZeroAddress);
        }
        let salary = Amount::new(salary)?;
        self.ctx.ensure_destination_allowed(destination).await?;

        let next_pay_date = self
            .ctx
            .now()
            .checked_add(self.ctx.config.pay_interval)
            .ok_or_else(|| PayrollError::InvariantViolation("pay date overflow".to_string()))?;
        let employee = Employee {
            id: self.ctx.employees.next_id().await?,
            company_id: company.id,
            name: name.to_string(),
            payout_address,
            destination,
            salary,
            next_pay_date,
            active: true,
            held: false,
        };
        self.ctx.employees.store(employee.clone()).await?;
        company.push_employee(employee.id);
        self.ctx.companies.store(company).await?;

        self.ctx
            .record(PayrollEvent::EmployeeAdded {
                company_id: employee.company_id,
                employee_id: employee.id,
                destination,
                amount: salary.value(),
            })
            .await?;
        debug!(employee_id = employee.id, company_id = employee.company_id, "employee added");
        Ok(employee)
    }

    pub async fn update_employee(
        &self,
        caller: &Address,
        employee_id: u64,
        update: EmployeeUpdate,
    ) -> Result<Employee> {
        let (_, mut employee) = self.owned_employee(caller, employee_id).await?;
        if let Some(destination) = update.destination {
            self.ctx.ensure_destination_allowed(destination).await?;
        }
        employee.apply(update)?;
        self.ctx.employees.store(employee.clone()).await?;
        self.ctx
            .record(PayrollEvent::EmployeeUpdated {
                company_id: employee.company_id,
                employee_id,
                destination: employee.destination,
                amount: employee.salary.value(),
            })
            .await?;
        Ok(employee)
    }

    pub async fn deactivate_employee(&self, caller: &Address, employee_id: u64) -> Result<()> {
        let (_, employee) = self.owned_employee(caller, employee_id).await?;
        self.deactivate(employee, false).await
    }

    /// Admin override: deactivates any employee regardless of company owner.
    pub async fn admin_deactivate_employee(&self, caller: &Address, employee_id: u64) -> Result<()> {
        self.ctx.ensure_admin(caller)?;
        let employee = self.employee(employee_id).await?;
        self.deactivate(employee, true).await
    }

    pub async fn set_company_active(
        &self,
        caller: &Address,
        company_id: u64,
        active: bool,
    ) -> Result<Company> {
        self.ctx.ensure_admin(caller)?;
        let mut company = self.company(company_id).await?;
        company.active = active;
        self.ctx.companies.store(company.clone()).await?;
        self.ctx
            .record(PayrollEvent::CompanyStatusChanged { company_id, active })
            .await?;
        info!(company_id, active, "company status changed");
        Ok(company)
    }

    pub async fn deactivate_company(&self, caller: &Address, company_id: u64) -> Result<Company> {
        self.set_company_active(caller, company_id, false).await
    }

    /// Removes a company together with all of its employees, freeing the
    /// owner to register again.
    pub async fn delete_company(&self, caller: &Address, company_id: u64) -> Result<Vec<u64>> {
        self.ctx.ensure_admin(caller)?;
        let company = self.company(company_id).await?;
        for employee_id in &company.employee_ids {
            self.ctx.employees.remove(*employee_id).await?;
        }
        self.ctx.companies.remove(company_id).await?;
        self.ctx
            .record(PayrollEvent::CompanyDeleted {
                company_id,
                removed_employees: company.employee_ids.clone(),
            })
            .await?;
        info!(company_id, removed = company.employee_ids.len(), "company deleted");
        Ok(company.employee_ids)
    }

    pub async fn transfer_company_ownership(
        &self,
        caller: &Address,
        company_id: u64,
        new_owner: Address,
    ) -> Result<Company> {
        self.ctx.ensure_admin(caller)?;
        if new_owner.is_zero() {
            return Err(PayrollError::ZeroAddress);
        }
        let mut company = self.company(company_id).await?;
        if let Some(existing) = self.ctx.companies.get_by_owner(&new_owner).await? {
            return Err(PayrollError::DuplicateOwner(existing.id));
        }
        let previous_owner = std::mem::replace(&mut company.owner, new_owner.clone());
        self.ctx.companies.store(company.clone()).await?;
        self.ctx
            .record(PayrollEvent::CompanyOwnershipTransferred {
                company_id,
                previous_owner,
                new_owner,
            })
            .await?;
        Ok(company)
    }

    pub async fn allow_destination(&self, caller: &Address, destination: DestinationId) -> Result<()> {
        self.ctx.ensure_admin(caller)?;
        if self.ctx.allow_destination(destination).await {
            self.ctx
                .record(PayrollEvent::DestinationAllowed { destination })
                .await?;
        }
        Ok(())
    }

    pub async fn disallow_destination(
        &self,
        caller: &Address,
        destination: DestinationId,
    ) -> Result<()> {
        self.ctx.ensure_admin(caller)?;
        if self.ctx.disallow_destination(destination).await {
            self.ctx
                .record(PayrollEvent::DestinationDisallowed { destination })
                .await?;
        }
        Ok(())
    }

    pub async fn companies(&self) -> Result<Vec<Company>> {
        self.ctx.companies.all().await
    }

    pub async fn company(&self, company_id: u64) -> Result<Company> {
        self.ctx
            .companies
            .get(company_id)
            .await?
            .ok_or(PayrollError::CompanyNotFound(company_id))
    }

    pub async fn company_of_owner(&self, owner: &Address) -> Result<Option<Company>> {
        self.ctx.companies.get_by_owner(owner).await
    }

    pub async fn employee(&self, employee_id: u64) -> Result<Employee> {
        self.ctx
            .employees
            .get(employee_id)
            .await?
            .ok_or(PayrollError::EmployeeNotFound(employee_id))
    }

    /// Employees of a company in insertion order.
    pub async fn employees_of(&self, company_id: u64) -> Result<Vec<Employee>> {
        let company = self.company(company_id).await?;
        let mut employees = Vec::with_capacity(company.employee_ids.len());
        for employee_id in company.employee_ids {
            employees.push(self.employee(employee_id).await?);
        }
        Ok(employees)
    }

    async fn owned_company(&self, caller: &Address) -> Result<Company> {
        self.ctx
            .companies
            .get_by_owner(caller)
            .await?
            .ok_or(PayrollError::NotCompanyOwner)
    }

    async fn owned_employee(&self, caller: &Address, employee_id: u64) -> Result<(Company, Employee)> {
        let company = self.owned_company(caller).await?;
        let employee = self.employee(employee_id).await?;
        employee.ensure_belongs_to(company.id)?;
        Ok((company, employee))
    }

    async fn deactivate(&self, mut employee: Employee, by_admin: bool) -> Result<()> {
        employee.active = false;
        self.ctx.employees.store(employee.clone()).await?;
        self.ctx
            .record(PayrollEvent::EmployeeDeactivated {
                company_id: employee.company_id,
                employee_id: employee.id,
                by_admin,
            })
            .await?;
        Ok(())
    }
}
