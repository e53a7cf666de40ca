use crate::domain::value::{Address, DestinationId};
use crate::error::{PayrollError, Result};
use serde::Deserialize;
use std::io::Read;

#[derive(Debug, Deserialize, PartialEq, Clone, Copy)]
#[serde(rename_all = "snake_case")]
pub enum CommandKind {
    Mint,
    Approve,
    Register,
    AddEmployee,
    UpdateEmployee,
    DeactivateEmployee,
    AdminDeactivateEmployee,
    ActivateCompany,
    DeactivateCompany,
    DeleteCompany,
    TransferCompany,
    Allow,
    Disallow,
    Advance,
    Tick,
    PayNow,
}

/// One row of a command script, as it appears in the file.
///
/// Columns are `op, caller, target, name, address, destination, amount`;
/// which of them an operation needs depends on `op`.
#[derive(Debug, Deserialize, PartialEq, Clone)]
pub struct CommandRecord {
    pub op: CommandKind,
    pub caller: Option<String>,
    pub target: Option<u64>,
    pub name: Option<String>,
    pub address: Option<String>,
    pub destination: Option<u64>,
    pub amount: Option<u128>,
}

/// A validated command.
#[derive(Debug, PartialEq, Clone)]
pub enum Command {
    Mint { to: Address, amount: u128 },
    Approve { owner: Address, spender: Option<Address>, amount: u128 },
    Register { caller: Address, name: String },
    AddEmployee {
        caller: Address,
        name: String,
        payout_address: Address,
        destination: DestinationId,
        salary: u128,
    },
    UpdateEmployee {
        caller: Address,
        employee_id: u64,
        name: Option<String>,
        payout_address: Option<Address>,
        destination: Option<DestinationId>,
        salary: Option<u128>,
    },
    DeactivateEmployee { caller: Address, employee_id: u64 },
    AdminDeactivateEmployee { caller: Address, employee_id: u64 },
    SetCompanyActive { caller: Address, company_id: u64, active: bool },
    DeleteCompany { caller: Address, company_id: u64 },
    TransferCompany { caller: Address, company_id: u64, new_owner: Address },
    Allow { caller: Address, destination: DestinationId },
    Disallow { caller: Address, destination: DestinationId },
    Advance { seconds: u64 },
    Tick,
    PayNow { caller: Address, employee_id: u64, fee: u128 },
}

fn required<T>(value: Option<T>, op: CommandKind, column: &str) -> Result<T> {
    value.ok_or_else(|| PayrollError::CommandError(format!("{:?} needs a {} column", op, column)))
}

impl TryFrom<CommandRecord> for Command {
    type Error = PayrollError;

    fn try_from(record: CommandRecord) -> Result<Self> {
        let op = record.op;
        let caller = || required(record.caller.clone(), op, "caller").map(Address::new);
        let target = || required(record.target, op, "target");
        let destination = || required(record.destination, op, "destination").map(DestinationId);

        Ok(match op {
            CommandKind::Mint => Command::Mint {
                to: Address::new(required(record.address.clone(), op, "address")?),
                amount: required(record.amount, op, "amount")?,
            },
            CommandKind::Approve => Command::Approve {
                owner: caller()?,
                spender: record.address.clone().map(Address::new),
                amount: required(record.amount, op, "amount")?,
            },
            CommandKind::Register => Command::Register {
                caller: caller()?,
                name: record.name.clone().unwrap_or_default(),
            },
            CommandKind::AddEmployee => Command::AddEmployee {
                caller: caller()?,
                name: record.name.clone().unwrap_or_default(),
                payout_address: Address::parse(required(record.address.clone(), op, "address")?)?,
                destination: destination()?,
                salary: required(record.amount, op, "amount")?,
            },
            CommandKind::UpdateEmployee => Command::UpdateEmployee {
                caller: caller()?,
                employee_id: target()?,
                name: record.name.clone(),
                payout_address: record.address.clone().map(Address::parse).transpose()?,
                destination: record.destination.map(DestinationId),
                salary: record.amount,
            },
            CommandKind::DeactivateEmployee => Command::DeactivateEmployee {
                caller: caller()?,
                employee_id: target()?,
            },
            CommandKind::AdminDeactivateEmployee => Command::AdminDeactivateEmployee {
                caller: caller()?,
                employee_id: target()?,
            },
            CommandKind::ActivateCompany | CommandKind::DeactivateCompany => {
                Command::SetCompanyActive {
                    caller: caller()?,
                    company_id: target()?,
                    active: op == CommandKind::ActivateCompany,
                }
            }
            CommandKind::DeleteCompany => Command::DeleteCompany {
                caller: caller()?,
                company_id: target()?,
            },
            CommandKind::TransferCompany => Command::TransferCompany {
                caller: caller()?,
                company_id: target()?,
                new_owner: Address::parse(required(record.address.clone(), op, "address")?)?,
            },
            CommandKind::Allow => Command::Allow {
                caller: caller()?,
                destination: destination()?,
            },
            CommandKind::Disallow => Command::Disallow {
                caller: caller()?,
                destination: destination()?,
            },
            CommandKind::Advance => {
                let seconds = required(record.amount, op, "amount")?;
                Command::Advance {
                    seconds: u64::try_from(seconds).map_err(|_| {
                        PayrollError::CommandError(format!("cannot advance by {}", seconds))
                    })?,
                }
            }
            CommandKind::Tick => Command::Tick,
            CommandKind::PayNow => Command::PayNow {
                caller: caller()?,
                employee_id: target()?,
                fee: record.amount.unwrap_or(0),
            },
        })
    }
}

/// Reads commands from a CSV source.
///
/// Wraps `csv::Reader`, trimming whitespace and tolerating short rows, and
/// yields each row as a validated `Command`.
pub struct CommandReader<R: Read> {
    reader: csv::Reader<R>,
}

impl<R: Read> CommandReader<R> {
    /// Creates a new `CommandReader` from any `Read` source (e.g., File, Stdin).
    pub fn new(source: R) -> Self {
        let reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .flexible(true)
            .from_reader(source);
        Self { reader }
    }

    /// Lazily reads and validates commands, one per row.
    pub fn commands(self) -> impl Iterator<Item = Result<Command>> {
        self.reader
            .into_deserialize::<CommandRecord>()
            .map(|result| result.map_err(PayrollError::from).and_then(Command::try_from))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const HEADER: &str = "op, caller, target, name, address, destination, amount\n";

    fn read(rows: &str) -> Vec<Result<Command>> {
        let data = format!("{HEADER}{rows}");
        CommandReader::new(data.as_bytes()).commands().collect()
    }

    #[test]
    fn test_reader_valid_stream() {
        let results = read(
            "register, acme, , Acme Corp, , , \n\
             add_employee, acme, , Alice, 0xa11ce, 30, 1500\n\
             tick, , , , , , ",
        );

        assert_eq!(results.len(), 3);
        assert_eq!(
            results[0].as_ref().unwrap(),
            &Command::Register {
                caller: Address::new("acme"),
                name: "Acme Corp".into()
            }
        );
        assert_eq!(
            results[1].as_ref().unwrap(),
            &Command::AddEmployee {
                caller: Address::new("acme"),
                name: "Alice".into(),
                payout_address: Address::new("0xa11ce"),
                destination: DestinationId(30),
                salary: 1500,
            }
        );
        assert_eq!(results[2].as_ref().unwrap(), &Command::Tick);
    }

    #[test]
    fn test_reader_unknown_op() {
        let results = read("explode, acme, , , , , ");
        assert!(matches!(results[0], Err(PayrollError::CsvError(_))));
    }

    #[test]
    fn test_reader_missing_column() {
        let results = read("pay_now, acme, , , , , ");
        assert!(matches!(results[0], Err(PayrollError::CommandError(_))));
    }

    #[test]
    fn test_pay_now_fee_defaults_to_zero() {
        let results = read("pay_now, acme, 4, , , , ");
        assert_eq!(
            results[0].as_ref().unwrap(),
            &Command::PayNow {
                caller: Address::new("acme"),
                employee_id: 4,
                fee: 0
            }
        );
    }

    #[test]
    fn test_company_toggles() {
        let results = read("deactivate_company, admin, 2, , , , \nactivate_company, admin, 2, , , , ");
        assert_eq!(
            results[0].as_ref().unwrap(),
            &Command::SetCompanyActive {
                caller: Address::new("admin"),
                company_id: 2,
                active: false
            }
        );
        assert!(matches!(
            results[1].as_ref().unwrap(),
            Command::SetCompanyActive { active: true, .. }
        ));
    }

    #[test]
    fn test_zero_payout_address_is_rejected() {
        let results = read(
            "add_employee, acme, , Alice, 0x000, 0, 10\n\
             update_employee, acme, 1, , 0x0, , \n\
             transfer_company, admin, 1, , 0, , ",
        );
        assert_eq!(results.len(), 3);
        for result in results {
            assert!(matches!(result, Err(PayrollError::ZeroAddress)));
        }
    }
}
