use crate::domain::company::Company;
use crate::domain::employee::Employee;
use crate::domain::event::{EventRecord, PayrollEvent};
use crate::domain::payment::ScanCursor;
use crate::domain::ports::{CompanyStore, CursorStore, EmployeeStore, EventLog};
use crate::domain::value::{Address, Timestamp};
use crate::error::{PayrollError, Result};
use async_trait::async_trait;
use rocksdb::{ColumnFamily, ColumnFamilyDescriptor, DB, IteratorMode, Options};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::path::Path;
use std::sync::Arc;

/// Column Family for company records.
pub const CF_COMPANIES: &str = "companies";
/// Column Family for employee records.
pub const CF_EMPLOYEES: &str = "employees";
/// Column Family for id counters and the scan cursor.
pub const CF_META: &str = "meta";
/// Column Family for the append-only event log.
pub const CF_EVENTS: &str = "events";

const KEY_NEXT_COMPANY: &[u8] = b"next_company_id";
const KEY_NEXT_EMPLOYEE: &[u8] = b"next_employee_id";
const KEY_CURSOR: &[u8] = b"scan_cursor";

/// A persistent store implementation using RocksDB.
///
/// Companies, employees, bookkeeping and events live in separate Column
/// Families, values are JSON. `Clone` shares the underlying `Arc<DB>`, so one
/// handle can back every port at once.
#[derive(Clone)]
pub struct RocksDBStore {
    db: Arc<DB>,
}

impl RocksDBStore {
    /// Opens or creates a RocksDB instance at the specified path, creating
    /// any missing column family.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let mut opts = Options::default();
        opts.create_if_missing(true);
        opts.create_missing_column_families(true);

        let families = [CF_COMPANIES, CF_EMPLOYEES, CF_META, CF_EVENTS]
            .into_iter()
            .map(|name| ColumnFamilyDescriptor::new(name, Options::default()))
            .collect::<Vec<_>>();

        let db = DB::open_cf_descriptors(&opts, path, families)?;

        Ok(Self { db: Arc::new(db) })
    }

    fn cf(&self, name: &str) -> Result<&ColumnFamily> {
        self.db.cf_handle(name).ok_or_else(|| {
            PayrollError::InternalError(Box::new(std::io::Error::other(format!(
                "{} column family not found",
                name
            ))))
        })
    }

    fn put_json<T: Serialize>(&self, cf: &str, key: &[u8], value: &T) -> Result<()> {
        let handle = self.cf(cf)?;
        let bytes = serde_json::to_vec(value)?;
        self.db.put_cf(handle, key, bytes)?;
        Ok(())
    }

    fn get_json<T: DeserializeOwned>(&self, cf: &str, key: &[u8]) -> Result<Option<T>> {
        let handle = self.cf(cf)?;
        match self.db.get_cf(handle, key)? {
            Some(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
            None => Ok(None),
        }
    }

    fn scan_json<T: DeserializeOwned>(&self, cf: &str, mode: IteratorMode) -> Result<Vec<T>> {
        let handle = self.cf(cf)?;
        let mut values = Vec::new();
        for item in self.db.iterator_cf(handle, mode) {
            let (_key, value) = item?;
            values.push(serde_json::from_slice(&value)?);
        }
        Ok(values)
    }

    /// Reads and bumps a counter in the meta family. Ids start at 1.
    fn bump_counter(&self, key: &[u8]) -> Result<u64> {
        let current: u64 = self.get_json(CF_META, key)?.unwrap_or(1);
        self.put_json(CF_META, key, &(current + 1))?;
        Ok(current)
    }
}

#[async_trait]
impl CompanyStore for RocksDBStore {
    async fn store(&self, company: Company) -> Result<()> {
        self.put_json(CF_COMPANIES, &company.id.to_be_bytes(), &company)
    }

    async fn get(&self, company_id: u64) -> Result<Option<Company>> {
        self.get_json(CF_COMPANIES, &company_id.to_be_bytes())
    }

    async fn get_by_owner(&self, owner: &Address) -> Result<Option<Company>> {
        let companies: Vec<Company> = self.scan_json(CF_COMPANIES, IteratorMode::Start)?;
        Ok(companies.into_iter().find(|c| &c.owner == owner))
    }

    async fn remove(&self, company_id: u64) -> Result<Option<Company>> {
        let existing = CompanyStore::get(self, company_id).await?;
        if existing.is_some() {
            let handle = self.cf(CF_COMPANIES)?;
            self.db.delete_cf(handle, company_id.to_be_bytes())?;
        }
        Ok(existing)
    }

    async fn all(&self) -> Result<Vec<Company>> {
        // Big-endian keys iterate in numeric order.
        self.scan_json(CF_COMPANIES, IteratorMode::Start)
    }

    async fn next_id(&self) -> Result<u64> {
        self.bump_counter(KEY_NEXT_COMPANY)
    }
}

#[async_trait]
impl EmployeeStore for RocksDBStore {
    async fn store(&self, employee: Employee) -> Result<()> {
        self.put_json(CF_EMPLOYEES, &employee.id.to_be_bytes(), &employee)
    }

    async fn get(&self, employee_id: u64) -> Result<Option<Employee>> {
        self.get_json(CF_EMPLOYEES, &employee_id.to_be_bytes())
    }

    async fn remove(&self, employee_id: u64) -> Result<Option<Employee>> {
        let existing = EmployeeStore::get(self, employee_id).await?;
        if existing.is_some() {
            let handle = self.cf(CF_EMPLOYEES)?;
            self.db.delete_cf(handle, employee_id.to_be_bytes())?;
        }
        Ok(existing)
    }

    async fn next_id(&self) -> Result<u64> {
        self.bump_counter(KEY_NEXT_EMPLOYEE)
    }
}

#[async_trait]
impl CursorStore for RocksDBStore {
    async fn load(&self) -> Result<ScanCursor> {
        Ok(self.get_json(CF_META, KEY_CURSOR)?.unwrap_or_default())
    }

    async fn save(&self, cursor: ScanCursor) -> Result<()> {
        self.put_json(CF_META, KEY_CURSOR, &cursor)
    }
}

#[async_trait]
impl EventLog for RocksDBStore {
    async fn append(&self, recorded_at: Timestamp, event: PayrollEvent) -> Result<u64> {
        let handle = self.cf(CF_EVENTS)?;
        let last = match self.db.iterator_cf(handle, IteratorMode::End).next() {
            Some(item) => {
                let (_key, value) = item?;
                serde_json::from_slice::<EventRecord>(&value)?.sequence
            }
            None => 0,
        };
        let record = EventRecord {
            sequence: last + 1,
            recorded_at,
            event,
        };
        self.put_json(CF_EVENTS, &record.sequence.to_be_bytes(), &record)?;
        Ok(record.sequence)
    }

    async fn all(&self) -> Result<Vec<EventRecord>> {
        self.scan_json(CF_EVENTS, IteratorMode::Start)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::value::{Amount, DestinationId};
    use tempfile::tempdir;

    #[tokio::test]
    async fn test_rocksdb_open_cf() {
        let dir = tempdir().unwrap();
        let store = RocksDBStore::open(dir.path()).expect("Failed to open RocksDB");

        for name in [CF_COMPANIES, CF_EMPLOYEES, CF_META, CF_EVENTS] {
            assert!(store.db.cf_handle(name).is_some());
        }
    }

    #[tokio::test]
    async fn test_rocksdb_company_store() {
        let dir = tempdir().unwrap();
        let store = RocksDBStore::open(dir.path()).unwrap();

        let id = CompanyStore::next_id(&store).await.unwrap();
        assert_eq!(id, 1);
        let company = Company::new(id, Address::new("acme"), "Acme".into(), 5);
        CompanyStore::store(&store, company.clone()).await.unwrap();

        let retrieved = CompanyStore::get(&store, 1).await.unwrap().unwrap();
        assert_eq!(retrieved, company);
        let by_owner = store.get_by_owner(&Address::new("acme")).await.unwrap();
        assert_eq!(by_owner, Some(company));

        assert!(CompanyStore::remove(&store, 1).await.unwrap().is_some());
        assert!(CompanyStore::all(&store).await.unwrap().is_empty());
        assert_eq!(CompanyStore::next_id(&store).await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_rocksdb_employee_and_cursor() {
        let dir = tempdir().unwrap();
        let store = RocksDBStore::open(dir.path()).unwrap();

        let employee = Employee {
            id: EmployeeStore::next_id(&store).await.unwrap(),
            company_id: 1,
            name: "Alice".into(),
            payout_address: Address::new("0xa11ce"),
            destination: DestinationId(7),
            salary: Amount::new(250).unwrap(),
            next_pay_date: 99,
            active: true,
            held: false,
        };
        EmployeeStore::store(&store, employee.clone()).await.unwrap();
        assert_eq!(
            EmployeeStore::get(&store, employee.id).await.unwrap(),
            Some(employee)
        );

        assert_eq!(CursorStore::load(&store).await.unwrap(), ScanCursor::default());
        let cursor = ScanCursor {
            company_index: 3,
            employee_index: 1,
        };
        CursorStore::save(&store, cursor).await.unwrap();
        assert_eq!(CursorStore::load(&store).await.unwrap(), cursor);
    }

    #[tokio::test]
    async fn test_rocksdb_event_log_survives_reopen() {
        let dir = tempdir().unwrap();
        let event = PayrollEvent::DestinationAllowed {
            destination: DestinationId(9),
        };
        {
            let store = RocksDBStore::open(dir.path()).unwrap();
            assert_eq!(store.append(1, event.clone()).await.unwrap(), 1);
            assert_eq!(store.append(2, event.clone()).await.unwrap(), 2);
        }
        let store = RocksDBStore::open(dir.path()).unwrap();
        assert_eq!(store.append(3, event).await.unwrap(), 3);
        assert_eq!(EventLog::all(&store).await.unwrap().len(), 3);
    }
}
