use crate::domain::company::Company;
use crate::domain::employee::Employee;
use crate::domain::event::{EventRecord, PayrollEvent};
use crate::domain::payment::ScanCursor;
use crate::domain::ports::{CompanyStore, CursorStore, EmployeeStore, EventLog};
use crate::domain::value::{Address, Timestamp};
use crate::error::Result;
use async_trait::async_trait;
use std::collections::BTreeMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::RwLock;

/// A thread-safe in-memory store for companies.
///
/// Companies are kept in a `BTreeMap` so iteration follows id order, which
/// is registration order since ids are never reused.
#[derive(Clone)]
pub struct InMemoryCompanyStore {
    companies: Arc<RwLock<BTreeMap<u64, Company>>>,
    next_id: Arc<AtomicU64>,
}

impl Default for InMemoryCompanyStore {
    fn default() -> Self {
        Self {
            companies: Arc::default(),
            next_id: Arc::new(AtomicU64::new(1)),
        }
    }
}

impl InMemoryCompanyStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CompanyStore for InMemoryCompanyStore {
    async fn store(&self, company: Company) -> Result<()> {
        let mut companies = self.companies.write().await;
        companies.insert(company.id, company);
        Ok(())
    }

    async fn get(&self, company_id: u64) -> Result<Option<Company>> {
        let companies = self.companies.read().await;
        Ok(companies.get(&company_id).cloned())
    }

    async fn get_by_owner(&self, owner: &Address) -> Result<Option<Company>> {
        let companies = self.companies.read().await;
        Ok(companies.values().find(|c| &c.owner == owner).cloned())
    }

    async fn remove(&self, company_id: u64) -> Result<Option<Company>> {
        let mut companies = self.companies.write().await;
        Ok(companies.remove(&company_id))
    }

    async fn all(&self) -> Result<Vec<Company>> {
        let companies = self.companies.read().await;
        Ok(companies.values().cloned().collect())
    }

    async fn next_id(&self) -> Result<u64> {
        Ok(self.next_id.fetch_add(1, Ordering::SeqCst))
    }
}

/// A thread-safe in-memory store for employees, keyed by global id.
#[derive(Clone)]
pub struct InMemoryEmployeeStore {
    employees: Arc<RwLock<BTreeMap<u64, Employee>>>,
    next_id: Arc<AtomicU64>,
}

impl Default for InMemoryEmployeeStore {
    fn default() -> Self {
        Self {
            employees: Arc::default(),
            next_id: Arc::new(AtomicU64::new(1)),
        }
    }
}

impl InMemoryEmployeeStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl EmployeeStore for InMemoryEmployeeStore {
    async fn store(&self, employee: Employee) -> Result<()> {
        let mut employees = self.employees.write().await;
        employees.insert(employee.id, employee);
        Ok(())
    }

    async fn get(&self, employee_id: u64) -> Result<Option<Employee>> {
        let employees = self.employees.read().await;
        Ok(employees.get(&employee_id).cloned())
    }

    async fn remove(&self, employee_id: u64) -> Result<Option<Employee>> {
        let mut employees = self.employees.write().await;
        Ok(employees.remove(&employee_id))
    }

    async fn next_id(&self) -> Result<u64> {
        Ok(self.next_id.fetch_add(1, Ordering::SeqCst))
    }
}

#[derive(Default, Clone)]
pub struct InMemoryCursorStore {
    cursor: Arc<RwLock<ScanCursor>>,
}

impl InMemoryCursorStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CursorStore for InMemoryCursorStore {
    async fn load(&self) -> Result<ScanCursor> {
        Ok(*self.cursor.read().await)
    }

    async fn save(&self, cursor: ScanCursor) -> Result<()> {
        *self.cursor.write().await = cursor;
        Ok(())
    }
}

/// Append-only in-memory event log. Sequence numbers start at 1.
#[derive(Default, Clone)]
pub struct InMemoryEventLog {
    records: Arc<RwLock<Vec<EventRecord>>>,
}

impl InMemoryEventLog {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl EventLog for InMemoryEventLog {
    async fn append(&self, recorded_at: Timestamp, event: PayrollEvent) -> Result<u64> {
        let mut records = self.records.write().await;
        let sequence = records.len() as u64 + 1;
        records.push(EventRecord {
            sequence,
            recorded_at,
            event,
        });
        Ok(sequence)
    }

    async fn all(&self) -> Result<Vec<EventRecord>> {
        Ok(self.records.read().await.clone())
    }
}
